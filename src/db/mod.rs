/// Record store contracts and Postgres implementations
///
/// The pipeline talks to the record store through these traits so the stages
/// can run against in-memory fakes in tests.
use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Image, Thumbnail};

pub mod image_repo;
pub mod thumbnail_repo;

pub use image_repo::PgImageRepository;
pub use thumbnail_repo::PgThumbnailRepository;

/// Transactional persistence for Image rows
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Insert a new image row; fails if the id already exists
    async fn save(&self, image: &Image) -> Result<()>;

    /// Persist mutated fields of an existing row
    async fn update(&self, image: &Image) -> Result<()>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Image>>;
}

/// Persistence for Thumbnail rows
///
/// Rows are insert-only; the `(image_id, size_label)` pair is unique.
#[async_trait]
pub trait ThumbnailRepository: Send + Sync {
    async fn save(&self, thumbnail: &Thumbnail) -> Result<()>;

    async fn list_for_image(&self, image_id: Uuid) -> Result<Vec<Thumbnail>>;
}
