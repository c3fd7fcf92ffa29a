/// Image handlers - HTTP endpoints for upload and polling
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use bytes::Bytes;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{ImageDetail, ImageDetailResponse, ThumbnailResponse, UploadResponse};
use crate::services::pipeline::UploadReceipt;
use crate::services::ImagePipeline;

/// Presigned GET URL lifetime (15 minutes)
const PRESIGNED_URL_TTL: Duration = Duration::from_secs(900);

const ALLOWED_CONTENT_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Upload an image as a multipart `file` field
pub async fn upload_image(
    pipeline: web::Data<Arc<ImagePipeline>>,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::BadRequest(format!("invalid multipart payload: {e}")))?;

        if field.name() != Some("file") {
            continue;
        }

        let content_type = field
            .content_type()
            .map(|m| m.to_string())
            .ok_or_else(|| AppError::BadRequest("missing file content type".to_string()))?;
        validate_content_type(&content_type)?;

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;
            data.extend_from_slice(&chunk);
        }
        if data.is_empty() {
            return Err(AppError::BadRequest("empty file".to_string()));
        }

        let receipt = pipeline
            .upload_original(Bytes::from(data), &content_type)
            .await?;
        let response = build_upload_response(&pipeline, receipt).await?;
        return Ok(HttpResponse::Ok().json(response));
    }

    Err(AppError::BadRequest("file is required".to_string()))
}

/// Upload an image as a raw request body
pub async fn upload_image_raw(
    pipeline: web::Data<Arc<ImagePipeline>>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let content_type = req
        .headers()
        .get(actix_web::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("missing Content-Type header".to_string()))?
        .to_string();
    validate_content_type(&content_type)?;

    if body.is_empty() {
        return Err(AppError::BadRequest("empty body".to_string()));
    }

    let receipt = pipeline.upload_original(body, &content_type).await?;
    let response = build_upload_response(&pipeline, receipt).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Poll an image and its thumbnails
pub async fn get_image(
    pipeline: web::Data<Arc<ImagePipeline>>,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    let image_id = Uuid::parse_str(&id)
        .map_err(|_| AppError::BadRequest("invalid image id".to_string()))?;

    let detail = pipeline.find_by_id(image_id).await?;
    let response = build_detail_response(&pipeline, detail).await?;
    Ok(HttpResponse::Ok().json(response))
}

fn validate_content_type(content_type: &str) -> Result<()> {
    if ALLOWED_CONTENT_TYPES.contains(&content_type) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "unsupported content type: {content_type}"
        )))
    }
}

async fn build_upload_response(
    pipeline: &ImagePipeline,
    receipt: UploadReceipt,
) -> Result<UploadResponse> {
    let original_url = pipeline
        .storage()
        .url_for(&receipt.original_key, PRESIGNED_URL_TTL)
        .await?;

    Ok(UploadResponse {
        id: receipt.id.to_string(),
        original_url,
        status: receipt.status.as_str().to_string(),
    })
}

async fn build_detail_response(
    pipeline: &ImagePipeline,
    detail: ImageDetail,
) -> Result<ImageDetailResponse> {
    let storage = pipeline.storage();

    let original_url = storage
        .url_for(&detail.image.original_key, PRESIGNED_URL_TTL)
        .await?;

    let compressed_url = if detail.image.compressed_key.is_empty() {
        None
    } else {
        Some(
            storage
                .url_for(&detail.image.compressed_key, PRESIGNED_URL_TTL)
                .await?,
        )
    };

    let mut thumbnails = Vec::with_capacity(detail.thumbnails.len());
    for thumb in &detail.thumbnails {
        let url = storage.url_for(&thumb.key, PRESIGNED_URL_TTL).await?;
        thumbnails.push(ThumbnailResponse {
            size: thumb.size_label.clone(),
            url,
            kind: thumb.kind.clone(),
        });
    }

    Ok(ImageDetailResponse {
        id: detail.image.id.to_string(),
        original_url,
        compressed_url,
        status: detail.image.status.clone(),
        error_message: detail.image.error_message.clone(),
        thumbnails,
    })
}
