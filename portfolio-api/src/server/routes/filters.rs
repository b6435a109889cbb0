use crate::server::{ServerRouter, json::Json};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use portfolio_common::model::filter::FilterState;
use portfolio_store::client::{FeedPage, PortfolioClient};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(get_filters)
        .typed_put(stage_filters)
        .typed_post(apply_filters)
        .typed_post(reset_filters)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/filters")]
struct FiltersPath;

async fn get_filters(
    _: FiltersPath,
    State(client): State<Arc<PortfolioClient>>,
) -> Json<FilterState> {
    Json(client.filters().await)
}

/// Staged filters do not change the feed until applied.
async fn stage_filters(
    _: FiltersPath,
    State(client): State<Arc<PortfolioClient>>,
    Json(filters): Json<FilterState>,
) -> Json<FilterState> {
    client.stage_filters(filters.clone()).await;
    Json(filters)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/filters/apply")]
struct ApplyFiltersPath;

async fn apply_filters(
    _: ApplyFiltersPath,
    State(client): State<Arc<PortfolioClient>>,
) -> Json<FeedPage> {
    client.apply_filters().await;
    Json(client.feed_page().await)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/filters/reset")]
struct ResetFiltersPath;

async fn reset_filters(
    _: ResetFiltersPath,
    State(client): State<Arc<PortfolioClient>>,
) -> Json<FeedPage> {
    client.reset_filters().await;
    Json(client.feed_page().await)
}
