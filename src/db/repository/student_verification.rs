//! Student Verification Repository

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{StudentVerification, VerificationStatus};

const TABLE: &str = "student_verification";

#[derive(Clone)]
pub struct StudentVerificationRepository {
    base: BaseRepository,
}

impl StudentVerificationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn db(&self) -> &Surreal<Db> {
        self.base.db()
    }

    /// Parse an API-supplied verification id
    pub fn record_id(id: &str) -> RepoResult<RecordId> {
        parse_record_id(TABLE, id)
    }

    /// Submit a verification request; one open request per user
    pub async fn create(&self, verification: StudentVerification) -> RepoResult<StudentVerification> {
        let existing: Option<StudentVerification> = self
            .db()
            .query("SELECT * FROM type::table($table) WHERE user = $user AND status = $status LIMIT 1")
            .bind(("table", TABLE))
            .bind(("user", verification.user.to_string()))
            .bind(("status", VerificationStatus::Pending))
            .await?
            .take(0)?;
        if existing.is_some() {
            return Err(RepoError::Duplicate(
                "A verification request is already pending".to_string(),
            ));
        }

        let created: Option<StudentVerification> =
            self.db().create(TABLE).content(verification).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create verification".to_string()))
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<StudentVerification> {
        let verification: Option<StudentVerification> = self.db().select(id.clone()).await?;
        verification.ok_or_else(|| RepoError::NotFound(format!("Verification not found: {id}")))
    }

    /// All requests, newest first (admin review queue)
    pub async fn find_all(&self) -> RepoResult<Vec<StudentVerification>> {
        let verifications: Vec<StudentVerification> = self
            .db()
            .query("SELECT * FROM type::table($table) ORDER BY created_at DESC")
            .bind(("table", TABLE))
            .await?
            .take(0)?;
        Ok(verifications)
    }

    pub async fn find_by_user(&self, user: &RecordId) -> RepoResult<Vec<StudentVerification>> {
        let verifications: Vec<StudentVerification> = self
            .db()
            .query("SELECT * FROM type::table($table) WHERE user = $user ORDER BY created_at DESC")
            .bind(("table", TABLE))
            .bind(("user", user.to_string()))
            .await?
            .take(0)?;
        Ok(verifications)
    }

    /// Record the review outcome
    pub async fn set_status(
        &self,
        id: &RecordId,
        status: VerificationStatus,
        rejection_reason: Option<String>,
    ) -> RepoResult<StudentVerification> {
        let updated: Option<StudentVerification> = self
            .db()
            .query("UPDATE $thing SET status = $status, rejection_reason = $reason RETURN AFTER")
            .bind(("thing", id.clone()))
            .bind(("status", status))
            .bind(("reason", rejection_reason))
            .await?
            .take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Verification not found: {id}")))
    }
}
