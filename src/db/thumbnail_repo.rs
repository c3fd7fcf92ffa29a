/// Thumbnail repository - database operations for thumbnails
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::ThumbnailRepository;
use crate::error::Result;
use crate::models::Thumbnail;

#[derive(Clone)]
pub struct PgThumbnailRepository {
    pool: PgPool,
}

impl PgThumbnailRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ThumbnailRepository for PgThumbnailRepository {
    async fn save(&self, thumbnail: &Thumbnail) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO thumbnails (id, image_id, size_label, key, kind, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(thumbnail.id)
        .bind(thumbnail.image_id)
        .bind(&thumbnail.size_label)
        .bind(&thumbnail.key)
        .bind(&thumbnail.kind)
        .bind(thumbnail.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_for_image(&self, image_id: Uuid) -> Result<Vec<Thumbnail>> {
        let thumbnails = sqlx::query_as::<_, Thumbnail>(
            r#"
            SELECT id, image_id, size_label, key, kind, created_at
            FROM thumbnails
            WHERE image_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(image_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(thumbnails)
    }
}
