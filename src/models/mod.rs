/// Data models for the image service
///
/// - Image: uploaded asset and its pipeline status
/// - Thumbnail: one generated variant per catalog entry
///
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod sizes;

pub use sizes::{ThumbnailKind, ThumbnailSize, THUMBNAIL_SIZES};

// ========================================
// Image Models
// ========================================

/// Image status in the pipeline lifecycle
///
/// `ready` and `error` are terminal; `error` may be reached from any
/// non-terminal state and is never retried in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    Pending,
    Processing,
    Ready,
    Error,
}

impl ImageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "ready" => Some(Self::Ready),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Error)
    }
}

/// Image database entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Image {
    pub id: Uuid,
    pub original_key: String,
    /// Empty until the compression stage succeeds
    pub compressed_key: String,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Image {
    /// Build the initial pending record persisted at upload time
    pub fn new_pending(id: Uuid, original_key: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            original_key,
            compressed_key: String::new(),
            status: ImageStatus::Pending.as_str().to_string(),
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn get_status(&self) -> ImageStatus {
        ImageStatus::from_str(&self.status).unwrap_or(ImageStatus::Pending)
    }

    pub fn set_status(&mut self, status: ImageStatus) {
        self.status = status.as_str().to_string();
        self.updated_at = Utc::now();
    }
}

// ========================================
// Thumbnail Models
// ========================================

/// Thumbnail database entity, one per (image, size label) pair
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Thumbnail {
    pub id: Uuid,
    pub image_id: Uuid,
    pub size_label: String,
    pub key: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

impl Thumbnail {
    pub fn new(image_id: Uuid, size: &ThumbnailSize, key: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            image_id,
            size_label: size.label.to_string(),
            key,
            kind: size.kind.as_str().to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Image together with its eagerly loaded thumbnails
#[derive(Debug, Clone)]
pub struct ImageDetail {
    pub image: Image,
    pub thumbnails: Vec<Thumbnail>,
}

// ========================================
// API DTOs
// ========================================

/// Response for a freshly accepted upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: String,
    pub original_url: String,
    pub status: String,
}

/// One thumbnail entry in an image detail response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailResponse {
    pub size: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Full image detail with presigned URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDetailResponse {
    pub id: String,
    pub original_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compressed_url: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub thumbnails: Vec<ThumbnailResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            ImageStatus::Pending,
            ImageStatus::Processing,
            ImageStatus::Ready,
            ImageStatus::Error,
        ] {
            assert_eq!(ImageStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(ImageStatus::from_str("bogus"), None);
    }

    #[test]
    fn terminal_statuses() {
        assert!(ImageStatus::Ready.is_terminal());
        assert!(ImageStatus::Error.is_terminal());
        assert!(!ImageStatus::Pending.is_terminal());
        assert!(!ImageStatus::Processing.is_terminal());
    }

    #[test]
    fn new_pending_image_has_empty_compressed_key() {
        let image = Image::new_pending(Uuid::new_v4(), "uploads/originals/x".to_string());
        assert_eq!(image.get_status(), ImageStatus::Pending);
        assert!(image.compressed_key.is_empty());
        assert!(image.error_message.is_none());
    }
}
