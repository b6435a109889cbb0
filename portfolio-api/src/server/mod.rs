use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use json::Json;
use portfolio_common::model::{
    Id,
    catalog::Catalog,
    post::{Post, PostMarker},
};
use portfolio_store::{
    client::{ClientError, ClientSettings, PortfolioClient},
    feed::{FeedStore, StoreError},
    notify::ToastBoard,
    persist::{KeyValueStore, PersistError},
    session::SessionStore,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};

mod auth;
mod json;
mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub client: Arc<PortfolioClient>,
    pub toasts: Arc<ToastBoard>,
    pub catalog: Arc<Catalog>,
}

impl ServerState {
    /// Restores the session from `storage` and wires the stores together.
    pub fn new(
        catalog: Catalog,
        posts: Vec<Post>,
        storage: Arc<dyn KeyValueStore>,
        settings: ClientSettings,
    ) -> Result<Self, PersistError> {
        let toasts = Arc::new(ToastBoard::default());
        let session = SessionStore::open(storage)?;
        let client = PortfolioClient::new(FeedStore::new(posts), session, toasts.clone(), settings);

        Ok(Self {
            client: Arc::new(client),
            toasts,
            catalog: Arc::new(catalog),
        })
    }
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Nobody is signed in.")]
    NotSignedIn,
    #[error("Post with id {0} was not found.")]
    PostByIdNotFound(Id<PostMarker>),
    #[error("Notification with id {0} was not found.")]
    NotificationNotFound(u64),
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::PostByIdNotFound(_)
            | ServerError::NotificationNotFound(_)
            | ServerError::Client(ClientError::Store(StoreError::PostNotFound(_))) => {
                StatusCode::NOT_FOUND
            }
            ServerError::NotSignedIn
            | ServerError::Client(ClientError::NotSignedIn | ClientError::InvalidCredentials) => {
                StatusCode::UNAUTHORIZED
            }
            ServerError::Client(ClientError::NotAuthor(_)) => StatusCode::FORBIDDEN,
            ServerError::Client(
                ClientError::EmailTaken | ClientError::Store(StoreError::DuplicatePostId(_)),
            ) => StatusCode::CONFLICT,
            ServerError::Client(ClientError::Invalid(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::JsonRejection(_) => StatusCode::BAD_REQUEST,
            ServerError::JsonResponse(_) | ServerError::Client(ClientError::Persist(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// User-facing messages, one per problem.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ServerError::Client(ClientError::Invalid(errors)) => {
                errors.0.iter().map(ToString::to_string).collect()
            }
            other => vec![other.to_string()],
        }
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
struct ErrorResponse {
    status: u16,
    errors: Vec<String>,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!(error = %self, %status, "Replying with error");
        } else {
            warn!(error = %self, %status, "Replying with error");
        }

        let error_response = ErrorResponse {
            status: status.as_u16(),
            errors: self.messages(),
        };
        (status, Json(error_response)).into_response()
    }
}
