//! Hero Image Model (促销横幅)

use super::{ImageRef, serde_helpers};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Promotional hero banner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroImage {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub image: ImageRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
