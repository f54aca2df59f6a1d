use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// A user as shown in the offer form's user picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}
