use crate::server::{ServerRouter, json::Json};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use portfolio_store::{
    client::{FeedPage, PortfolioClient},
    pager::LoadOutcome,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_get(get_feed).typed_post(load_more)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/feed")]
struct FeedPath;

async fn get_feed(_: FeedPath, State(client): State<Arc<PortfolioClient>>) -> Json<FeedPage> {
    Json(client.feed_page().await)
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
struct LoadMoreResponse {
    load: LoadOutcome,
    feed: FeedPage,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/feed/more")]
struct LoadMorePath;

/// The scroll proximity signal. Waits for the page load to finish.
async fn load_more(
    _: LoadMorePath,
    State(client): State<Arc<PortfolioClient>>,
) -> Json<LoadMoreResponse> {
    let load = client.load_more().await;

    Json(LoadMoreResponse {
        load,
        feed: client.feed_page().await,
    })
}
