//! Stored object reference
//!
//! 指向对象存储中一个文件的稳定引用 (上传回执、活动图、学生证明等)

use serde::{Deserialize, Serialize};

/// Reference to an uploaded object (URL + storage identifier)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageRef {
    pub url: String,
    pub public_id: String,
}

impl From<crate::storage::StoredObject> for ImageRef {
    fn from(obj: crate::storage::StoredObject) -> Self {
        Self {
            url: obj.url,
            public_id: obj.public_id,
        }
    }
}
