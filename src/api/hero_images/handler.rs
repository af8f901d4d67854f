//! Hero Image API Handlers
//!
//! 创建走 multipart：`title`、`subtitle`、`linkUrl`、`sortOrder` 文本
//! 字段 + `image` 文件。删除时连同存储对象一起清理。

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use http::StatusCode;

use crate::api::require_admin;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::HeroImage;
use crate::db::repository::HeroImageRepository;
use crate::storage::ObjectStorage;
use crate::utils::{AppError, AppResult};

/// GET /api/hero-images - 前台轮播 (仅启用的，按排序)
pub async fn list_active(State(state): State<ServerState>) -> AppResult<Json<Vec<HeroImage>>> {
    let repo = HeroImageRepository::new(state.db.clone());
    let images = repo.find_active().await?;
    Ok(Json(images))
}

/// GET /api/hero-images/all - 全部横幅 (管理员)
pub async fn list_all(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<HeroImage>>> {
    require_admin(&user)?;
    let repo = HeroImageRepository::new(state.db.clone());
    let images = repo.find_all().await?;
    Ok(Json(images))
}

/// POST /api/hero-images - 创建横幅 (管理员)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<HeroImage>)> {
    require_admin(&user)?;

    let mut title: Option<String> = None;
    let mut subtitle: Option<String> = None;
    let mut link_url: Option<String> = None;
    let mut sort_order: i32 = 0;
    let mut image: Option<crate::db::models::ImageRef> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("title") => title = Some(field.text().await?),
            Some("subtitle") => subtitle = Some(field.text().await?),
            Some("linkUrl") => link_url = Some(field.text().await?),
            Some("sortOrder") => {
                let raw = field.text().await?;
                sort_order = raw
                    .parse()
                    .map_err(|_| AppError::Validation(format!("Invalid sort order: {raw}")))?;
            }
            Some("image") => {
                let file_name = field.file_name().map(String::from);
                let bytes = field.bytes().await?;
                let temp = state.storage.spool(&bytes, file_name.as_deref()).await?;
                let stored = state.storage.upload(&temp, "hero-images").await?;
                image = Some(stored.into());
            }
            _ => {}
        }
    }

    let title = title.ok_or_else(|| AppError::Validation("Title is required".to_string()))?;
    let image = image.ok_or_else(|| AppError::Validation("Image is required".to_string()))?;

    let repo = HeroImageRepository::new(state.db.clone());
    let created = repo
        .create(HeroImage {
            id: None,
            title,
            subtitle,
            image,
            link_url,
            sort_order,
            is_active: true,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/hero-images/:id - 删除横幅 (管理员)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<HeroImage>> {
    require_admin(&user)?;

    let repo = HeroImageRepository::new(state.db.clone());
    let record_id = HeroImageRepository::record_id(&id)?;
    let deleted = repo.delete(&record_id).await?;

    // 存储对象删除失败不影响记录删除结果
    if let Err(e) = state.storage.delete(&deleted.image.public_id).await {
        tracing::warn!("Failed to delete stored banner image: {e}");
    }

    Ok(Json(deleted))
}
