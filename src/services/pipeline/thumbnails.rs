//! Thumbnail stage
//!
//! Downloads the compressed blob, decodes it once, and walks the size
//! catalog in order generating, uploading and recording one variant per
//! entry. The batch is all-or-nothing: the first failing entry aborts the
//! stage and no partial-success status is recorded. When every entry
//! succeeds the image becomes `ready`.

use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::dispatch::StageJob;
use super::{processor, thumbnail_key};
use crate::db::{ImageRepository, ThumbnailRepository};
use crate::error::{AppError, Result};
use crate::models::{ImageStatus, Thumbnail, THUMBNAIL_SIZES};
use crate::storage::ObjectStorage;

pub const STAGE_NAME: &str = "thumbnail";

/// Build the detached thumbnail job for one image
pub fn stage_job(
    image_id: Uuid,
    compressed_key: String,
    store: Arc<dyn ObjectStorage>,
    images: Arc<dyn ImageRepository>,
    thumbnails: Arc<dyn ThumbnailRepository>,
) -> StageJob {
    StageJob::new(
        image_id,
        STAGE_NAME,
        Box::pin(async move { run(image_id, compressed_key, store, images, thumbnails).await }),
    )
}

async fn run(
    image_id: Uuid,
    compressed_key: String,
    store: Arc<dyn ObjectStorage>,
    images: Arc<dyn ImageRepository>,
    thumbnails: Arc<dyn ThumbnailRepository>,
) -> Result<()> {
    let compressed = store.get(&compressed_key).await?;

    // Decoded once, reused for every variant
    let decoded = tokio::task::spawn_blocking(move || processor::decode(&compressed))
        .await
        .map_err(|e| AppError::ProcessingError(format!("decode task panicked: {e}")))??;
    let decoded = Arc::new(decoded);

    for size in THUMBNAIL_SIZES {
        let source = decoded.clone();
        let rendered = tokio::task::spawn_blocking(move || processor::render_thumbnail(&source, size))
            .await
            .map_err(|e| AppError::ProcessingError(format!("resize task panicked: {e}")))?
            .map_err(|e| {
                AppError::ProcessingError(format!("thumbnail {} failed: {e}", size.label))
            })?;

        let key = thumbnail_key(image_id, size.label);
        store.put(&key, rendered, "image/jpeg").await?;

        let row = Thumbnail::new(image_id, size, key);
        thumbnails.save(&row).await?;

        debug!(%image_id, label = size.label, "thumbnail stored");
    }

    let mut image = images
        .find_by_id(image_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("image {image_id} not found after thumbnails")))?;

    image.set_status(ImageStatus::Ready);
    images.update(&image).await?;

    info!(%image_id, variants = THUMBNAIL_SIZES.len(), "image ready");

    Ok(())
}
