use crate::server::ServerError;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use portfolio_common::model::{
    Id,
    user::{User, UserMarker},
};
use portfolio_store::client::PortfolioClient;
use std::sync::Arc;

/// The signed-in identity. Extraction fails with `401` when nobody is signed
/// in.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct AuthenticatedUser {
    user: User,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn user_id(&self) -> &Id<UserMarker> {
        &self.user.id
    }

    #[must_use]
    pub fn into_user(self) -> User {
        self.user
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<PortfolioClient>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = Arc::<PortfolioClient>::from_ref(state)
            .current_user()
            .await
            .ok_or(ServerError::NotSignedIn)?;

        Ok(Self { user })
    }
}
