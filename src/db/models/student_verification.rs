//! Student Verification Model
//!
//! 审核通过后置位 `User.student_verified`，驱动学生折扣

use super::{ImageRef, serde_helpers};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Verification workflow status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

/// Student verification request entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentVerification {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    pub student_id: String,
    pub institution_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_document: Option<ImageRef>,
    pub status: VerificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Review payload (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReview {
    pub approve: bool,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}
