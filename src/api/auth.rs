//! Session token exchange.

use crate::errors::{require, ClientResult};
use crate::models::SessionToken;
use crate::transport::{ApiRequest, Transport};

/// POST /jwt - Trade an identity-provider ID token for the session cookie.
///
/// Always goes through the credentialed client so the httpOnly cookie lands
/// in its cookie store.
pub async fn exchange_token(transport: &Transport, id_token: &str) -> ClientResult<SessionToken> {
    require(id_token, "ID token")?;

    let request = ApiRequest::post("jwt").bearer(id_token.trim());
    transport.credentialed().send(request).await
}
