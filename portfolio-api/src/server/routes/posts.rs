use crate::server::{
    Result, ServerError, ServerRouter,
    auth::AuthenticatedUser,
    json::{Created, Json},
};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use portfolio_common::model::{
    Id,
    post::{CreatePost, EditPost, PostMarker},
};
use portfolio_store::client::{PortfolioClient, PostView};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_post(create_post)
        .typed_post(cancel_draft)
        .typed_get(get_post)
        .typed_put(edit_post)
        .typed_delete(delete_post)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts")]
struct PostsPath;

async fn create_post(
    _: PostsPath,
    State(client): State<Arc<PortfolioClient>>,
    user: AuthenticatedUser,
    Json(draft): Json<CreatePost>,
) -> Result<Created<PostView>> {
    let post = client.create_post(draft).await?;

    Ok(Created(PostView::new(post, Some(user.user_id()))))
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Serialize)]
struct DraftCancelled {
    notified: bool,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/draft/cancel")]
struct CancelDraftPath;

async fn cancel_draft(
    _: CancelDraftPath,
    State(client): State<Arc<PortfolioClient>>,
    Json(draft): Json<CreatePost>,
) -> Json<DraftCancelled> {
    Json(DraftCancelled {
        notified: client.cancel_draft(&draft),
    })
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}", rejection(ServerError))]
struct PostPath {
    id: Id<PostMarker>,
}

async fn get_post(
    PostPath { id }: PostPath,
    State(client): State<Arc<PortfolioClient>>,
) -> Result<Json<PostView>> {
    let post = client
        .post(&id)
        .await
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(post))
}

async fn edit_post(
    PostPath { id }: PostPath,
    State(client): State<Arc<PortfolioClient>>,
    user: AuthenticatedUser,
    Json(edit): Json<EditPost>,
) -> Result<Json<PostView>> {
    let post = client.edit_post(&id, edit).await?;

    Ok(Json(PostView::new(post, Some(user.user_id()))))
}

async fn delete_post(
    PostPath { id }: PostPath,
    State(client): State<Arc<PortfolioClient>>,
    _user: AuthenticatedUser,
) -> Result<StatusCode> {
    client.delete_post(&id).await?;

    Ok(StatusCode::NO_CONTENT)
}
