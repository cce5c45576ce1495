//! User and role administration endpoints.

use serde::Serialize;

use crate::errors::{require_email, ClientResult};
use crate::models::{
    Count, NewUser, User, UserEnvelope, UserList, UserPage, UserQuery, UserRole, UserStatus,
};
use crate::transport::{ApiRequest, Transport};

#[derive(Serialize)]
struct RoleBody {
    role: UserRole,
}

#[derive(Serialize)]
struct StatusBody {
    status: UserStatus,
}

#[derive(Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

/// GET /users - Every user.
pub async fn list_users(transport: &Transport) -> ClientResult<UserList> {
    transport.credentialed().send(ApiRequest::get("users")).await
}

/// GET /users?page&limit&search&status - Filtered admin listing.
pub async fn users_page(transport: &Transport, query: &UserQuery) -> ClientResult<UserPage> {
    query.page.validate()?;

    let request = ApiRequest::get("users")
        .query("page", query.page.page)
        .query("limit", query.page.limit)
        .query_opt("search", query.search.as_deref())
        .query_opt("status", query.status.map(|s| s.as_str()));
    transport.credentialed().send(request).await
}

/// GET /users/:email
pub async fn get_user(transport: &Transport, email: &str) -> ClientResult<User> {
    require_email(email)?;

    transport
        .credentialed()
        .send(ApiRequest::get("users").segment(email))
        .await
}

/// GET /users/count
pub async fn total_user_count(transport: &Transport) -> ClientResult<Count> {
    transport
        .credentialed()
        .send(ApiRequest::get("users").segment("count"))
        .await
}

/// POST /users - Register on first sign-in. Answers 409 when the user exists.
pub async fn create_user(transport: &Transport, user: &NewUser) -> ClientResult<UserEnvelope> {
    user.validate()?;

    let request = ApiRequest::post("users").json(user)?;
    transport.plain().send(request).await
}

/// PUT /users/:email/role
pub async fn update_role(
    transport: &Transport,
    email: &str,
    role: UserRole,
) -> ClientResult<UserEnvelope> {
    require_email(email)?;

    let request = ApiRequest::put("users")
        .segment(email)
        .segment("role")
        .json(&RoleBody { role })?;
    transport.credentialed().send(request).await
}

/// PUT /users/:email/status
pub async fn update_status(
    transport: &Transport,
    email: &str,
    status: UserStatus,
) -> ClientResult<UserEnvelope> {
    require_email(email)?;

    let request = ApiRequest::put("users")
        .segment(email)
        .segment("status")
        .json(&StatusBody { status })?;
    transport.credentialed().send(request).await
}

/// POST /admin/create-admin - Promote an existing user to admin.
pub async fn create_admin(transport: &Transport, email: &str) -> ClientResult<UserEnvelope> {
    require_email(email)?;

    let request = ApiRequest::post("admin")
        .segment("create-admin")
        .json(&EmailBody {
            email: email.trim(),
        })?;
    transport.credentialed().send(request).await
}
