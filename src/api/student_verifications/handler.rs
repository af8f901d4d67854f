//! Student Verification API Handlers
//!
//! 提交走 multipart：`studentId`、`institutionName` 文本字段 +
//! `studentIdImage` 证明文件。审核通过后置位用户的学生折扣资格。

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use http::StatusCode;

use crate::api::require_admin;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    StudentVerification, VerificationReview, VerificationStatus,
};
use crate::db::repository::{StudentVerificationRepository, UserRepository};
use crate::notify::{messages, send_in_background};
use crate::storage::ObjectStorage;
use crate::utils::{AppError, AppResult};

/// POST /api/student-verifications - 提交认证申请 (登录用户)
pub async fn submit(
    State(state): State<ServerState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<StudentVerification>)> {
    let mut student_id: Option<String> = None;
    let mut institution_name: Option<String> = None;
    let mut proof: Option<crate::db::models::ImageRef> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("studentId") => student_id = Some(field.text().await?),
            Some("institutionName") => institution_name = Some(field.text().await?),
            Some("studentIdImage") => {
                let file_name = field.file_name().map(String::from);
                let bytes = field.bytes().await?;
                let temp = state.storage.spool(&bytes, file_name.as_deref()).await?;
                let folder = format!("student-verification/{}", user.id.replace(':', "-"));
                let stored = state.storage.upload(&temp, &folder).await?;
                proof = Some(stored.into());
            }
            _ => {}
        }
    }

    let student_id =
        student_id.ok_or_else(|| AppError::Validation("Student ID is required".to_string()))?;
    let institution_name = institution_name
        .ok_or_else(|| AppError::Validation("Institution name is required".to_string()))?;
    let proof =
        proof.ok_or_else(|| AppError::Validation("Please upload your student ID".to_string()))?;

    let user_id = UserRepository::record_id(&user.id)?;
    let repo = StudentVerificationRepository::new(state.db.clone());
    let verification = repo
        .create(StudentVerification {
            id: None,
            user: user_id.clone(),
            student_id,
            institution_name,
            proof_document: Some(proof),
            status: VerificationStatus::Pending,
            rejection_reason: None,
            created_at: Some(chrono::Utc::now()),
        })
        .await?;

    // 提交即视为学生账号，折扣仍需审核通过
    UserRepository::new(state.db.clone())
        .mark_student(&user_id)
        .await?;

    if !state.config.admin_email.is_empty() {
        send_in_background(
            state.notifier.clone(),
            messages::verification_request(&verification, &state.config.admin_email),
        );
    }

    Ok((StatusCode::CREATED, Json(verification)))
}

/// GET /api/student-verifications/my - 当前用户的申请记录
pub async fn my_requests(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<StudentVerification>>> {
    let user_id = UserRepository::record_id(&user.id)?;
    let repo = StudentVerificationRepository::new(state.db.clone());
    let verifications = repo.find_by_user(&user_id).await?;
    Ok(Json(verifications))
}

/// GET /api/student-verifications - 审核队列 (管理员)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<StudentVerification>>> {
    require_admin(&user)?;
    let repo = StudentVerificationRepository::new(state.db.clone());
    let verifications = repo.find_all().await?;
    Ok(Json(verifications))
}

/// PUT /api/student-verifications/:id/review - 审核 (管理员)
pub async fn review(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<VerificationReview>,
) -> AppResult<Json<StudentVerification>> {
    require_admin(&user)?;

    let repo = StudentVerificationRepository::new(state.db.clone());
    let record_id = StudentVerificationRepository::record_id(&id)?;
    let verification = repo.find_by_id(&record_id).await?;

    if verification.status != VerificationStatus::Pending {
        return Err(AppError::BusinessRule(
            "Verification request has already been reviewed".to_string(),
        ));
    }

    let users = UserRepository::new(state.db.clone());
    let student = users.find_by_id(&verification.user).await?;

    let reviewed = if payload.approve {
        let reviewed = repo
            .set_status(&record_id, VerificationStatus::Approved, None)
            .await?;
        users.set_student_verified(&verification.user).await?;
        reviewed
    } else {
        let reason = payload
            .rejection_reason
            .unwrap_or_else(|| "No reason provided".to_string());
        repo.set_status(&record_id, VerificationStatus::Rejected, Some(reason))
            .await?
    };

    send_in_background(
        state.notifier.clone(),
        messages::verification_result(&reviewed, &student.email, payload.approve),
    );

    tracing::info!(
        "Verification {} {}",
        record_id,
        if payload.approve { "approved" } else { "rejected" }
    );
    Ok(Json(reviewed))
}
