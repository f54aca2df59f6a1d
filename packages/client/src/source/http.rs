use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use offerdesk_shared::{DashboardStats, NewOfferInput, OfferId, OfferRecord};

use crate::config::ClientConfig;
use crate::criteria::{QueryCriteria, QueryResult};
use crate::error::{ClientError, Result, SourceError};
use crate::session::{AccessToken, SessionUser};
use crate::source::OfferSource;

/// Message used when the API answers with an HTML error page.
const HTML_ERROR_MESSAGE: &str = "Server error occurred";

/// Message used when a rejected login carries no message of its own.
const LOGIN_FAILED_MESSAGE: &str = "Login failed";

/// Offer source backed by the remote offers API.
#[derive(Debug, Clone)]
pub struct HttpOfferSource {
    http: reqwest::Client,
    base_url: Url,
}

/// Token and operator returned by a successful login.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub token: AccessToken,
    pub user: SessionUser,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginBody {
    token: AccessToken,
    #[serde(default)]
    user: Option<SessionUser>,
}

#[derive(Deserialize)]
struct OfferPage {
    data: Vec<OfferRecord>,
    meta: PageMeta,
}

#[derive(Deserialize)]
struct PageMeta {
    current_page: usize,
    per_page: usize,
    total: usize,
}

/// Single resources come back either bare or wrapped in `{"data": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl HttpOfferSource {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ClientError::Source(SourceError::Transport(e)))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, SourceError> {
        self.base_url
            .join(path)
            .map_err(|e| SourceError::Decode(format!("invalid endpoint '{path}': {e}")))
    }

    /// Exchange credentials for a bearer token.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> std::result::Result<LoginResponse, SourceError> {
        let url = self.endpoint("login")?;
        let request = self
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .json(&LoginRequest { email, password });

        let response = request.send().await?;
        let status = response.status();

        // A rejected login reports the server's message, never `Unauthorized`.
        if !status.is_success() && !is_html(&response) {
            let body_text = response.text().await.unwrap_or_default();
            let message =
                error_message(&body_text).unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_string());
            warn!(status = status.as_u16(), message = %message, "login rejected");
            return Err(SourceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: LoginBody = read_json(response, None).await?;
        let user = body.user.unwrap_or_else(|| SessionUser {
            email: email.to_string(),
            name: email.to_string(),
        });

        Ok(LoginResponse {
            token: body.token,
            user,
        })
    }

    /// Headline numbers for the dashboard overview.
    #[tracing::instrument(skip(self, token))]
    pub async fn dashboard_stats(
        &self,
        token: Option<&AccessToken>,
    ) -> std::result::Result<DashboardStats, SourceError> {
        let url = self.endpoint("dashboard/stats")?;
        let response = authorized(self.http.get(url), token).send().await?;
        read_json(response, None).await
    }
}

#[async_trait]
impl OfferSource for HttpOfferSource {
    #[tracing::instrument(skip(self, token), fields(page = criteria.page))]
    async fn query(
        &self,
        criteria: &QueryCriteria,
        token: Option<&AccessToken>,
    ) -> std::result::Result<QueryResult, SourceError> {
        let mut url = self.endpoint("offers")?;
        {
            let mut params = url.query_pairs_mut();
            params.append_pair("page", &criteria.page.to_string());
            params.append_pair("limit", &criteria.page_size.to_string());
            if let Some(term) = criteria.search_term() {
                params.append_pair("search", term);
            }
            if let Some(offer_type) = criteria.offer_type {
                params.append_pair("type", offer_type.as_ref());
            }
            if let Some(status) = criteria.status {
                params.append_pair("status", status.as_ref());
            }
        }

        let response = authorized(self.http.get(url), token).send().await?;
        let page: OfferPage = read_json(response, None).await?;

        debug!(
            total = page.meta.total,
            returned = page.data.len(),
            "offer page received"
        );

        Ok(QueryResult {
            items: page.data,
            total_count: page.meta.total,
            page: page.meta.current_page,
            page_size: page.meta.per_page,
        })
    }

    #[tracing::instrument(skip(self, token))]
    async fn get(
        &self,
        id: OfferId,
        token: Option<&AccessToken>,
    ) -> std::result::Result<OfferRecord, SourceError> {
        let url = self.endpoint(&format!("offers/{id}"))?;
        let response = authorized(self.http.get(url), token).send().await?;
        let offer: Envelope<OfferRecord> = read_json(response, Some(id)).await?;
        Ok(offer.into_inner())
    }

    #[tracing::instrument(skip(self, offer, token), fields(user_id = %offer.user_id))]
    async fn create(
        &self,
        offer: &NewOfferInput,
        token: Option<&AccessToken>,
    ) -> std::result::Result<OfferRecord, SourceError> {
        let url = self.endpoint("offers")?;
        let response = authorized(self.http.post(url), token)
            .json(offer)
            .send()
            .await?;
        let created: Envelope<OfferRecord> = read_json(response, None).await?;
        let created = created.into_inner();
        tracing::info!(offer_id = %created.id, "offer created");
        Ok(created)
    }

    #[tracing::instrument(skip(self, offer, token))]
    async fn update(
        &self,
        id: OfferId,
        offer: &NewOfferInput,
        token: Option<&AccessToken>,
    ) -> std::result::Result<OfferRecord, SourceError> {
        let url = self.endpoint(&format!("offers/{id}"))?;
        let response = authorized(self.http.put(url), token)
            .json(offer)
            .send()
            .await?;
        let updated: Envelope<OfferRecord> = read_json(response, Some(id)).await?;
        tracing::info!(offer_id = %id, "offer updated");
        Ok(updated.into_inner())
    }

    #[tracing::instrument(skip(self, token))]
    async fn remove(
        &self,
        id: OfferId,
        token: Option<&AccessToken>,
    ) -> std::result::Result<(), SourceError> {
        let url = self.endpoint(&format!("offers/{id}"))?;
        let response = authorized(self.http.delete(url), token).send().await?;
        check_status(response, Some(id)).await?;
        tracing::info!(offer_id = %id, "offer deleted");
        Ok(())
    }
}

/// Attach the JSON accept header and, when signed in, the bearer token.
fn authorized(request: RequestBuilder, token: Option<&AccessToken>) -> RequestBuilder {
    let request = request.header(ACCEPT, "application/json");
    match token {
        Some(token) => request.bearer_auth(token.secret()),
        None => request,
    }
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/html"))
}

/// Turn non-success responses into a [`SourceError`].
///
/// `offer` names the single offer a request addressed, so a 404 becomes
/// [`SourceError::NotFound`].
async fn check_status(
    response: Response,
    offer: Option<OfferId>,
) -> std::result::Result<Response, SourceError> {
    let status = response.status();

    if is_html(&response) {
        warn!(status = status.as_u16(), "API answered with an HTML page");
        return Err(SourceError::Api {
            status: status.as_u16(),
            message: HTML_ERROR_MESSAGE.into(),
        });
    }

    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED {
        return Err(SourceError::Unauthorized);
    }

    if let (StatusCode::NOT_FOUND, Some(id)) = (status, offer) {
        return Err(SourceError::NotFound(id));
    }

    let body_text = response.text().await.unwrap_or_default();
    let message = error_message(&body_text).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });

    warn!(status = status.as_u16(), message = %message, "API request failed");
    Err(SourceError::Api {
        status: status.as_u16(),
        message,
    })
}

/// The `message` field of a JSON error body, if any.
fn error_message(body_text: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body_text)
        .ok()
        .and_then(|b| b.message)
}

async fn read_json<T: DeserializeOwned>(
    response: Response,
    offer: Option<OfferId>,
) -> std::result::Result<T, SourceError> {
    let response = check_status(response, offer).await?;
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| SourceError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_source() {
        let config = ClientConfig::builder().build().unwrap();
        let source = HttpOfferSource::new(&config).unwrap();
        assert_eq!(
            source.endpoint("offers/3").unwrap().as_str(),
            "https://dummy-1.hiublue.com/api/offers/3"
        );
    }

    #[test]
    fn test_offer_page_decodes() {
        let json = r#"{
            "data": [{
                "id": 1,
                "user_name": "Sharon Flores",
                "email": "ihenderson@yahoo.com",
                "status": "accepted",
                "type": "yearly",
                "price": 4366
            }],
            "links": {"first": "?page=1", "last": "?page=1", "prev": null, "next": null},
            "meta": {
                "current_page": 1, "from": 1, "last_page": 1, "path": "/offers",
                "per_page": 5, "to": 1, "total": 1
            }
        }"#;
        let page: OfferPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.meta.total, 1);
        assert_eq!(page.meta.per_page, 5);
    }

    #[test]
    fn test_envelope_accepts_bare_and_wrapped() {
        let bare = r#"{"id": 2, "user_name": "a", "email": "a@b.c",
            "status": "pending", "type": "monthly", "price": 1}"#;
        let wrapped = format!(r#"{{"data": {bare}}}"#);

        let a: Envelope<OfferRecord> = serde_json::from_str(bare).unwrap();
        let b: Envelope<OfferRecord> = serde_json::from_str(&wrapped).unwrap();
        assert_eq!(a.into_inner(), b.into_inner());
    }
}
