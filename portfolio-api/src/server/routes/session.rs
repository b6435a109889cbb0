use crate::server::{
    Result, ServerRouter,
    auth::AuthenticatedUser,
    json::{Created, Json},
};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use portfolio_common::model::{
    ValidationError,
    user::{AVATAR_OPTIONS, Credentials, LoginForm, RegistrationForm, User},
};
use portfolio_common::util::non_blank;
use portfolio_store::client::{ClientError, PortfolioClient};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(get_session)
        .typed_post(login)
        .typed_post(register)
        .typed_post(logout)
        .typed_delete(delete_account)
        .typed_put(update_avatar)
        .typed_get(get_avatar_options)
        .typed_get(get_remembered)
        .typed_delete(forget_remembered)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/session")]
struct SessionPath;

async fn get_session(_: SessionPath, user: AuthenticatedUser) -> Json<User> {
    Json(user.into_user())
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/session/login")]
struct LoginPath;

async fn login(
    _: LoginPath,
    State(client): State<Arc<PortfolioClient>>,
    Json(form): Json<LoginForm>,
) -> Result<Json<User>> {
    let user = client.login(form).await?;

    Ok(Json(user))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/session/register")]
struct RegisterPath;

async fn register(
    _: RegisterPath,
    State(client): State<Arc<PortfolioClient>>,
    Json(form): Json<RegistrationForm>,
) -> Result<Created<User>> {
    let user = client.register(form).await?;

    Ok(Created(user))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/session/logout")]
struct LogoutPath;

async fn logout(_: LogoutPath, State(client): State<Arc<PortfolioClient>>) -> Result<StatusCode> {
    client.logout().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/session/account")]
struct AccountPath;

async fn delete_account(
    _: AccountPath,
    State(client): State<Arc<PortfolioClient>>,
    _user: AuthenticatedUser,
) -> Result<Json<User>> {
    let deleted = client.delete_account().await?;

    Ok(Json(deleted))
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct AvatarUpdate {
    avatar: String,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/session/avatar")]
struct AvatarPath;

async fn update_avatar(
    _: AvatarPath,
    State(client): State<Arc<PortfolioClient>>,
    _user: AuthenticatedUser,
    Json(AvatarUpdate { avatar }): Json<AvatarUpdate>,
) -> Result<Json<User>> {
    let avatar = non_blank(&avatar)
        .ok_or(ClientError::from(ValidationError::MissingFields))?;
    let user = client.update_avatar(avatar).await?;

    Ok(Json(user))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/session/avatars")]
struct AvatarOptionsPath;

async fn get_avatar_options(_: AvatarOptionsPath) -> Json<[&'static str; 8]> {
    Json(AVATAR_OPTIONS)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/session/remembered")]
struct RememberedPath;

async fn get_remembered(
    _: RememberedPath,
    State(client): State<Arc<PortfolioClient>>,
) -> Result<Json<Option<Credentials>>> {
    let credentials = client.remembered_credentials().await?;

    Ok(Json(credentials))
}

async fn forget_remembered(
    _: RememberedPath,
    State(client): State<Arc<PortfolioClient>>,
) -> Result<StatusCode> {
    client.forget_credentials().await?;

    Ok(StatusCode::NO_CONTENT)
}
