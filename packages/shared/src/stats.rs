use serde::{Deserialize, Serialize};

/// Headline numbers shown above the offer list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_active_users: u64,
    pub total_clicks: u64,
    pub total_appearances: u64,
    pub previous_month: MonthlyTotals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotals {
    pub active_users: u64,
    pub clicks: u64,
    pub appearances: u64,
}

impl DashboardStats {
    /// Percentage change of active users relative to the previous month.
    ///
    /// Returns `None` when there is no previous-month baseline.
    pub fn active_users_change(&self) -> Option<f64> {
        percent_change(self.total_active_users, self.previous_month.active_users)
    }

    pub fn clicks_change(&self) -> Option<f64> {
        percent_change(self.total_clicks, self.previous_month.clicks)
    }

    pub fn appearances_change(&self) -> Option<f64> {
        percent_change(self.total_appearances, self.previous_month.appearances)
    }
}

fn percent_change(current: u64, previous: u64) -> Option<f64> {
    if previous == 0 {
        return None;
    }
    Some((current as f64 - previous as f64) / previous as f64 * 100.0)
}
