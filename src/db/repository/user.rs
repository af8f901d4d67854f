//! User Repository
//!
//! 积分余额的原子增减在 [`crate::loyalty`]，这里只做普通 CRUD。

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::User;

const TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn db(&self) -> &Surreal<Db> {
        self.base.db()
    }

    /// Parse an API-supplied user id
    pub fn record_id(id: &str) -> RepoResult<RecordId> {
        parse_record_id(TABLE, id)
    }

    pub async fn create(&self, user: User) -> RepoResult<User> {
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email already registered: {}",
                user.email
            )));
        }
        let created: Option<User> = self.db().create(TABLE).content(user).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<User> {
        let user: Option<User> = self.db().select(id.clone()).await?;
        user.ok_or_else(|| RepoError::NotFound(format!("User not found: {id}")))
    }

    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user: Option<User> = self
            .db()
            .query("SELECT * FROM type::table($table) WHERE email = $email LIMIT 1")
            .bind(("table", TABLE))
            .bind(("email", email.to_string()))
            .await?
            .take(0)?;
        Ok(user)
    }

    /// Submitting a verification request flags the account as a student
    /// (discount still requires the verified flag)
    pub async fn mark_student(&self, id: &RecordId) -> RepoResult<User> {
        let updated: Option<User> = self
            .db()
            .query("UPDATE $thing SET is_student = true RETURN AFTER")
            .bind(("thing", id.clone()))
            .await?
            .take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("User not found: {id}")))
    }

    /// Approval flips the verified flag that unlocks the student discount
    pub async fn set_student_verified(&self, id: &RecordId) -> RepoResult<User> {
        let updated: Option<User> = self
            .db()
            .query("UPDATE $thing SET is_student = true, student_verified = true RETURN AFTER")
            .bind(("thing", id.clone()))
            .await?
            .take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("User not found: {id}")))
    }
}
