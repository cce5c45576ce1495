//! Membership payment shapes. Card handling stays with the payment provider.

use serde::{Deserialize, Serialize};

/// Membership fee in whole dollars.
pub const MEMBERSHIP_FEE: u32 = 10;

/// Response of `POST /create-payment-intent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub client_secret: String,
}
