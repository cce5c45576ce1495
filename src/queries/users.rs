use std::sync::Arc;

use crate::api::{payments, users as api};
use crate::cache::QueryOptions;
use crate::client::ForumClient;
use crate::errors::{require_email, ClientResult};
use crate::models::{
    Count, NewUser, PaymentIntent, User, UserEnvelope, UserList, UserPage, UserQuery, UserRole,
    UserStatus,
};
use crate::query_key;

const USERS: QueryOptions = QueryOptions::minutes(5);

/// User administration, registration and membership.
pub struct UserQueries<'a> {
    client: &'a ForumClient,
}

impl<'a> UserQueries<'a> {
    pub(crate) fn new(client: &'a ForumClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ClientResult<Arc<UserList>> {
        self.client
            .read(query_key!["users", "all"], USERS, |t| async move {
                api::list_users(&t).await
            })
            .await
    }

    pub async fn page(&self, query: &UserQuery) -> ClientResult<Arc<UserPage>> {
        query.page.validate()?;
        let key = query_key![
            "users",
            "page",
            query.page.page,
            query.page.limit,
            query.search.clone(),
            query.status.map(|s| s.as_str()),
        ];
        let query = query.clone();
        self.client
            .read(key, USERS, move |t| async move {
                api::users_page(&t, &query).await
            })
            .await
    }

    pub async fn get(&self, email: &str) -> ClientResult<Arc<User>> {
        require_email(email)?;
        let email = email.to_string();
        self.client
            .read(
                query_key!["users", "email", &email],
                USERS,
                move |t| async move { api::get_user(&t, &email).await },
            )
            .await
    }

    pub async fn total_count(&self) -> ClientResult<Arc<Count>> {
        self.client
            .read(query_key!["users", "count"], USERS, |t| async move {
                api::total_user_count(&t).await
            })
            .await
    }

    /// Register the user on first sign-in. A 409 means they already exist.
    pub async fn create(&self, user: &NewUser) -> ClientResult<UserEnvelope> {
        self.client
            .cache()
            .mutate(
                &[query_key!["users"], query_key!["posts", "stats"]],
                api::create_user(self.client.transport(), user),
            )
            .await
    }

    pub async fn update_role(&self, email: &str, role: UserRole) -> ClientResult<UserEnvelope> {
        self.client
            .cache()
            .mutate(
                &[query_key!["users"]],
                api::update_role(self.client.transport(), email, role),
            )
            .await
    }

    pub async fn update_status(
        &self,
        email: &str,
        status: UserStatus,
    ) -> ClientResult<UserEnvelope> {
        self.client
            .cache()
            .mutate(
                &[query_key!["users"], query_key!["posts", "stats"]],
                api::update_status(self.client.transport(), email, status),
            )
            .await
    }

    pub async fn create_admin(&self, email: &str) -> ClientResult<UserEnvelope> {
        self.client
            .cache()
            .mutate(
                &[query_key!["users"]],
                api::create_admin(self.client.transport(), email),
            )
            .await
    }

    /// Start a membership payment. Not cached.
    pub async fn create_payment_intent(&self, amount: u32) -> ClientResult<PaymentIntent> {
        payments::create_payment_intent(self.client.transport(), amount).await
    }

    /// Grant membership after the payment was confirmed. Lifts the post quota.
    pub async fn activate_membership(&self, email: &str) -> ClientResult<UserEnvelope> {
        let user = self
            .client
            .cache()
            .mutate(
                &[query_key!["users"], query_key!["posts", "count", email]],
                payments::activate_membership(self.client.transport(), email),
            )
            .await?;
        tracing::info!("Membership activated for {}", email);
        Ok(user)
    }
}
