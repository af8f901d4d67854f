//! Hero Image API 模块

mod handler;

use axum::{
    Router,
    routing::{delete, get},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/hero-images", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_active).post(handler::create))
        .route("/all", get(handler::list_all))
        .route("/{id}", delete(handler::delete))
}
