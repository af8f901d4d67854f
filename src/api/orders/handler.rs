//! Order API Handlers
//!
//! 下单支持两种编码：纯 JSON，或 multipart (银行转账需要附回执文件，
//! `orderData` 字段放 JSON，`receipt` 字段放文件)。

use axum::{
    Json,
    extract::{FromRequest, Multipart, Path, Request, State},
};
use http::StatusCode;
use http::header::CONTENT_TYPE;

use crate::api::require_admin;
use crate::auth::{CurrentUser, OptionalUser};
use crate::core::ServerState;
use crate::db::models::{
    DiscountPreview, DiscountPreviewRequest, Order, OrderCreateRequest, PaymentReceipt,
    StatusUpdateRequest,
};
use crate::storage::ObjectStorage;
use crate::utils::{AppError, AppResult};

/// POST /api/orders/create - 下单 (可选认证，游客可下单)
pub async fn create(
    State(state): State<ServerState>,
    OptionalUser(user): OptionalUser,
    request: Request,
) -> AppResult<(StatusCode, Json<Order>)> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let (payload, receipt) = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::Validation(format!("Invalid multipart request: {e}")))?;
        parse_multipart_order(&state, multipart, user.as_ref()).await?
    } else {
        let Json(payload) = Json::<OrderCreateRequest>::from_request(request, &state)
            .await
            .map_err(|e| AppError::Validation(format!("Invalid order payload: {e}")))?;
        (payload, None)
    };

    let order = state
        .order_service()
        .create_order(payload, receipt, user.as_ref())
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// 解析 multipart 下单请求：`orderData` JSON 字段 + 可选 `receipt` 文件。
/// 回执先进对象存储，订单落库失败时流水线自行补偿库存，存储里的
/// 回执作为孤儿对象留给运维清理 (与金额无关，不影响一致性)。
async fn parse_multipart_order(
    state: &ServerState,
    mut multipart: Multipart,
    user: Option<&CurrentUser>,
) -> AppResult<(OrderCreateRequest, Option<PaymentReceipt>)> {
    let mut payload: Option<OrderCreateRequest> = None;
    let mut receipt: Option<PaymentReceipt> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("orderData") => {
                let raw = field.text().await?;
                payload = Some(
                    serde_json::from_str(&raw)
                        .map_err(|e| AppError::Validation(format!("Invalid order data: {e}")))?,
                );
            }
            Some("receipt") => {
                let file_name = field.file_name().map(String::from);
                let bytes = field.bytes().await?;
                let temp = state.storage.spool(&bytes, file_name.as_deref()).await?;
                let folder = format!(
                    "order-payment/{}",
                    user.map(|u| u.id.replace(':', "-"))
                        .unwrap_or_else(|| "guest".to_string())
                );
                let stored = state.storage.upload(&temp, &folder).await?;
                receipt = Some(PaymentReceipt {
                    url: stored.url,
                    public_id: stored.public_id,
                    uploaded: true,
                });
            }
            _ => {}
        }
    }

    let payload = payload
        .ok_or_else(|| AppError::Validation("Missing orderData field".to_string()))?;
    Ok((payload, receipt))
}

/// GET /api/orders/my-orders - 当前用户的订单
pub async fn my_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.order_service().orders_for(&user).await?;
    Ok(Json(orders))
}

/// GET /api/orders/details/:order_id - 订单详情 (本人或管理员)
pub async fn details(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(order_id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.order_service().get_order(&order_id, &user).await?;
    Ok(Json(order))
}

/// POST /api/orders/cancel/:order_id - 取消订单 (本人或管理员)
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(order_id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.order_service().cancel(&order_id, &user).await?;
    Ok(Json(order))
}

/// POST /api/orders/calculate-discount - 折扣预览 (无副作用)
pub async fn calculate_discount(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<DiscountPreviewRequest>,
) -> AppResult<Json<DiscountPreview>> {
    let preview = state.order_service().preview_discount(&user, payload).await?;
    Ok(Json(preview))
}

/// GET /api/orders/all - 全部订单 (管理员)
pub async fn list_all(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    require_admin(&user)?;
    let orders = state.order_service().all_orders().await?;
    Ok(Json(orders))
}

/// PUT /api/orders/update-status/:order_id - 更新订单状态 (管理员)
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(order_id): Path<String>,
    Json(payload): Json<StatusUpdateRequest>,
) -> AppResult<Json<Order>> {
    require_admin(&user)?;
    let order = state
        .order_service()
        .update_status(&order_id, payload)
        .await?;
    Ok(Json(order))
}
