//! Request DTOs.

use serde::{Deserialize, Serialize};

/// Query string of `POST /api/trigger`.
///
/// Every field is optional at the extractor level so a missing value maps
/// to the specific status (401 for the token, 400 for the phone) rather
/// than a generic rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerQuery {
    /// Shared secret.
    pub token: Option<String>,
    /// Caller number to show in the popup.
    pub phone: Option<String>,
    /// Extension that is ringing.
    pub exten: Option<String>,
}
