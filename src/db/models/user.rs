//! User Model

use super::serde_helpers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type UserId = RecordId;

/// User model
///
/// `reward_points` 只由订单流水线 (settle) 和取消 (reverse) 变更，
/// 见 [`crate::loyalty`]。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<UserId>,
    pub username: String,
    pub email: String,
    /// customer | admin
    #[serde(default = "default_role")]
    pub role: String,
    /// Loyalty balance, invariant ≥ 0
    #[serde(default)]
    pub reward_points: i64,
    #[serde(default)]
    pub is_student: bool,
    /// Set by the student-verification review workflow
    #[serde(default)]
    pub student_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_role() -> String {
    "customer".to_string()
}

impl User {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            email: email.into(),
            role: default_role(),
            reward_points: 0,
            is_student: false,
            student_verified: false,
            created_at: Some(Utc::now()),
        }
    }

    /// 是否享受学生折扣
    pub fn is_verified_student(&self) -> bool {
        self.is_student && self.student_verified
    }
}
