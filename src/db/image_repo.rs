/// Image repository - database operations for images
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::ImageRepository;
use crate::error::Result;
use crate::models::Image;

#[derive(Clone)]
pub struct PgImageRepository {
    pool: PgPool,
}

impl PgImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImageRepository for PgImageRepository {
    async fn save(&self, image: &Image) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO images (id, original_key, compressed_key, status, error_message, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(image.id)
        .bind(&image.original_key)
        .bind(&image.compressed_key)
        .bind(&image.status)
        .bind(&image.error_message)
        .bind(image.created_at)
        .bind(image.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update(&self, image: &Image) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE images
            SET compressed_key = $2, status = $3, error_message = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(image.id)
        .bind(&image.compressed_key)
        .bind(&image.status)
        .bind(&image.error_message)
        .bind(image.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Image>> {
        let image = sqlx::query_as::<_, Image>(
            r#"
            SELECT id, original_key, compressed_key, status, error_message, created_at, updated_at
            FROM images
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(image)
    }
}
