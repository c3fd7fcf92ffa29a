//! Compression stage
//!
//! Downloads the original blob, decodes it (correcting JPEG orientation),
//! re-encodes at the pipeline quality, uploads the result and advances the
//! image to `processing` before handing off to the thumbnail stage.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::dispatch::{StageDispatcher, StageJob};
use super::{compressed_key, processor, thumbnails};
use crate::db::{ImageRepository, ThumbnailRepository};
use crate::error::{AppError, Result};
use crate::models::ImageStatus;
use crate::storage::ObjectStorage;

pub const STAGE_NAME: &str = "compress";

/// Build the detached compression job for one image
pub fn stage_job(
    image_id: Uuid,
    original_key: String,
    store: Arc<dyn ObjectStorage>,
    images: Arc<dyn ImageRepository>,
    thumbnails: Arc<dyn ThumbnailRepository>,
    dispatcher: StageDispatcher,
) -> StageJob {
    StageJob::new(
        image_id,
        STAGE_NAME,
        Box::pin(async move {
            run(image_id, original_key, store, images, thumbnails, dispatcher).await
        }),
    )
}

async fn run(
    image_id: Uuid,
    original_key: String,
    store: Arc<dyn ObjectStorage>,
    images: Arc<dyn ImageRepository>,
    thumbnail_repo: Arc<dyn ThumbnailRepository>,
    dispatcher: StageDispatcher,
) -> Result<()> {
    let original = store.get(&original_key).await?;

    let encoded = tokio::task::spawn_blocking(move || {
        let decoded = processor::decode_oriented(&original)?;
        processor::encode_jpeg(&decoded)
    })
    .await
    .map_err(|e| AppError::ProcessingError(format!("compression task panicked: {e}")))??;

    let key = compressed_key(image_id);
    store.put(&key, encoded, "image/jpeg").await?;

    let mut image = images
        .find_by_id(image_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("image {image_id} not found after compression")))?;

    image.compressed_key = key.clone();
    image.set_status(ImageStatus::Processing);
    images.update(&image).await?;

    info!(%image_id, compressed_key = %key, "compression complete");

    // Second detached hand-off; the thumbnail stage only ever runs after the
    // record update above has committed.
    dispatcher.dispatch(thumbnails::stage_job(
        image_id,
        key,
        store,
        images,
        thumbnail_repo,
    ));

    Ok(())
}
