use crate::server::{ServerRouter, json::Json};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use portfolio_common::model::catalog::Catalog;
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_get(get_catalog)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/catalog")]
struct CatalogPath;

async fn get_catalog(_: CatalogPath, State(catalog): State<Arc<Catalog>>) -> Json<Catalog> {
    Json(Catalog::clone(&catalog))
}
