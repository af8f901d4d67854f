//! Product API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        // Repair endpoint (must be before /{id} to avoid path conflicts)
        .route("/fix-product/{id}", get(handler::fix_product))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/inventory", post(handler::set_variant_stock))
}
