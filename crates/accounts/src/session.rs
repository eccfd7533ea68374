use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use palengke_core::AccountId;

/// Active shopper session.
///
/// Held by the session-scoped market context; its presence is what
/// login-gated operations check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub account_id: AccountId,
    pub email: String,
    pub display_name: String,
    pub signed_in_at: DateTime<Utc>,
}
