//! Membership payment endpoints.

use serde::Serialize;

use crate::errors::{require_email, ClientError, ClientResult};
use crate::models::{Badge, PaymentIntent, UserEnvelope};
use crate::transport::{ApiRequest, Transport};

#[derive(Serialize)]
struct AmountBody {
    amount: u32,
}

#[derive(Serialize)]
struct BadgeBody {
    badge: Badge,
}

/// POST /create-payment-intent - Returns the client secret for card confirmation.
pub async fn create_payment_intent(transport: &Transport, amount: u32) -> ClientResult<PaymentIntent> {
    if amount == 0 {
        return Err(ClientError::Validation(
            "Payment amount must be positive".to_string(),
        ));
    }

    let request = ApiRequest::post("create-payment-intent").json(&AmountBody { amount })?;
    transport.plain().send(request).await
}

/// PATCH /users/:email - Grant the gold badge after a confirmed payment.
pub async fn activate_membership(transport: &Transport, email: &str) -> ClientResult<UserEnvelope> {
    require_email(email)?;

    let request = ApiRequest::patch("users")
        .segment(email)
        .json(&BadgeBody { badge: Badge::Gold })?;
    transport.plain().send(request).await
}
