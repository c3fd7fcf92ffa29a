//! Multi-stage image derivation pipeline
//!
//! Public entry point for uploads and status polling. An upload persists a
//! `pending` record and returns immediately; the compression and thumbnail
//! stages run as detached jobs on the worker pool, advancing the persisted
//! status (`pending` → `processing` → `ready`, or terminal `error`) that
//! clients poll through `find_by_id`.

use bytes::Bytes;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub mod compress;
pub mod dispatch;
pub mod processor;
pub mod thumbnails;

pub use dispatch::{StageDispatcher, StageJob};

use crate::db::{ImageRepository, ThumbnailRepository};
use crate::error::{AppError, Result};
use crate::models::{Image, ImageDetail, ImageStatus};
use crate::storage::ObjectStorage;

/// Object store key for an uploaded original
pub fn original_key(id: Uuid) -> String {
    format!("uploads/originals/{id}")
}

/// Object store key for the compressed derivative
pub fn compressed_key(id: Uuid) -> String {
    format!("uploads/compressed/{id}.jpg")
}

/// Object store key for one thumbnail variant
pub fn thumbnail_key(id: Uuid, label: &str) -> String {
    format!("uploads/thumbnails/{id}_{label}.jpg")
}

/// Identity of a freshly accepted upload
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub id: Uuid,
    pub original_key: String,
    pub status: ImageStatus,
}

/// Pipeline coordinator
pub struct ImagePipeline {
    store: Arc<dyn ObjectStorage>,
    images: Arc<dyn ImageRepository>,
    thumbnails: Arc<dyn ThumbnailRepository>,
    dispatcher: StageDispatcher,
}

impl ImagePipeline {
    pub fn new(
        store: Arc<dyn ObjectStorage>,
        images: Arc<dyn ImageRepository>,
        thumbnails: Arc<dyn ThumbnailRepository>,
        dispatcher: StageDispatcher,
    ) -> Self {
        Self {
            store,
            images,
            thumbnails,
            dispatcher,
        }
    }

    pub fn storage(&self) -> &Arc<dyn ObjectStorage> {
        &self.store
    }

    /// Accept an upload and kick off derivation
    ///
    /// Stores the raw bytes, persists the pending record, and dispatches the
    /// compression stage fire-and-forget. Never blocks on derivation work;
    /// failures before the record is persisted abort the call and leave no
    /// trace.
    pub async fn upload_original(&self, data: Bytes, content_type: &str) -> Result<UploadReceipt> {
        let id = Uuid::new_v4();
        let original_key = original_key(id);

        self.store.put(&original_key, data, content_type).await?;

        let image = Image::new_pending(id, original_key.clone());
        self.images.save(&image).await?;

        info!(image_id = %id, %original_key, "upload accepted");

        self.dispatcher.dispatch(compress::stage_job(
            id,
            original_key.clone(),
            self.store.clone(),
            self.images.clone(),
            self.thumbnails.clone(),
            self.dispatcher.clone(),
        ));

        Ok(UploadReceipt {
            id,
            original_key,
            status: ImageStatus::Pending,
        })
    }

    /// Look up an image and its thumbnails; pure read-through
    pub async fn find_by_id(&self, id: Uuid) -> Result<ImageDetail> {
        let image = self
            .images
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("image {id} not found")))?;

        let thumbnails = self.thumbnails.list_for_image(id).await?;

        Ok(ImageDetail { image, thumbnails })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_by_id() {
        let id = Uuid::new_v4();
        assert_eq!(original_key(id), format!("uploads/originals/{id}"));
        assert_eq!(compressed_key(id), format!("uploads/compressed/{id}.jpg"));
        assert_eq!(
            thumbnail_key(id, "100x100"),
            format!("uploads/thumbnails/{id}_100x100.jpg")
        );
    }
}
