//! Hero Image Repository

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::HeroImage;

const TABLE: &str = "hero_image";

#[derive(Clone)]
pub struct HeroImageRepository {
    base: BaseRepository,
}

impl HeroImageRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn db(&self) -> &Surreal<Db> {
        self.base.db()
    }

    /// Parse an API-supplied hero image id
    pub fn record_id(id: &str) -> RepoResult<RecordId> {
        parse_record_id(TABLE, id)
    }

    /// Active banners in display order (public storefront)
    pub async fn find_active(&self) -> RepoResult<Vec<HeroImage>> {
        let images: Vec<HeroImage> = self
            .db()
            .query("SELECT * FROM type::table($table) WHERE is_active = true ORDER BY sort_order ASC")
            .bind(("table", TABLE))
            .await?
            .take(0)?;
        Ok(images)
    }

    /// All banners (admin view)
    pub async fn find_all(&self) -> RepoResult<Vec<HeroImage>> {
        let images: Vec<HeroImage> = self
            .db()
            .query("SELECT * FROM type::table($table) ORDER BY sort_order ASC")
            .bind(("table", TABLE))
            .await?
            .take(0)?;
        Ok(images)
    }

    pub async fn create(&self, image: HeroImage) -> RepoResult<HeroImage> {
        let created: Option<HeroImage> = self.db().create(TABLE).content(image).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create hero image".to_string()))
    }

    /// Delete a banner, returning the removed document
    pub async fn delete(&self, id: &RecordId) -> RepoResult<HeroImage> {
        let deleted: Option<HeroImage> = self.db().delete(id.clone()).await?;
        deleted.ok_or_else(|| RepoError::NotFound(format!("Hero image not found: {id}")))
    }
}
