//! Order API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/create", post(handler::create))
        .route("/my-orders", get(handler::my_orders))
        .route("/details/{order_id}", get(handler::details))
        .route("/cancel/{order_id}", post(handler::cancel))
        .route("/calculate-discount", post(handler::calculate_discount))
        // Admin routes
        .route("/all", get(handler::list_all))
        .route("/update-status/{order_id}", put(handler::update_status))
}
