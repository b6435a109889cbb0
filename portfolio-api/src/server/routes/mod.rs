use crate::server::ServerRouter;
use axum::Router;

mod catalog;
mod feed;
mod filters;
mod notifications;
mod posts;
mod session;

pub fn routes() -> ServerRouter {
    Router::new()
        .merge(catalog::routes())
        .merge(session::routes())
        .merge(filters::routes())
        .merge(feed::routes())
        .merge(posts::routes())
        .merge(notifications::routes())
}
