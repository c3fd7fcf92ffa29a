//! Detached stage execution: bounded worker pool with stage supervision
//!
//! Stages are submitted fire-and-forget; the submitting request never waits
//! for them. Delivery is best-effort with no durable queue: a saturated
//! queue drops the dispatch, and in-flight work is lost on process crash.
//! Completion is observable only by polling the persisted image status.
//!
//! Each job runs under its own `tokio::spawn` and is joined by a worker, so
//! a panicking stage is contained as a `JoinError` and downgraded to the
//! image's `error` status instead of destabilizing the process.

use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::db::ImageRepository;
use crate::error::Result;
use crate::models::ImageStatus;

/// One detached unit of pipeline work
pub struct StageJob {
    pub image_id: Uuid,
    pub stage: &'static str,
    pub task: BoxFuture<'static, Result<()>>,
}

impl StageJob {
    pub fn new(
        image_id: Uuid,
        stage: &'static str,
        task: BoxFuture<'static, Result<()>>,
    ) -> Self {
        Self {
            image_id,
            stage,
            task,
        }
    }
}

/// Handle for submitting stage jobs to the worker pool
#[derive(Clone)]
pub struct StageDispatcher {
    tx: mpsc::Sender<StageJob>,
}

impl StageDispatcher {
    /// Spawn `workers` worker tasks sharing a bounded queue
    ///
    /// Workers run until every dispatcher handle is dropped.
    pub fn start(
        workers: usize,
        queue_depth: usize,
        images: Arc<dyn ImageRepository>,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<StageJob>(queue_depth.max(1));
        let rx = Arc::new(tokio::sync::Mutex::new(rx));

        for worker in 0..workers.max(1) {
            let rx = rx.clone();
            let images = images.clone();
            tokio::spawn(async move {
                loop {
                    let job = rx.lock().await.recv().await;
                    let Some(job) = job else { break };
                    run_supervised(job, &images, worker).await;
                }
                debug!(worker, "stage worker shutting down");
            });
        }

        Self { tx }
    }

    /// Submit a job, best-effort
    ///
    /// A full or closed queue drops the job; the image stays at its current
    /// status and the client's only recourse is to re-upload.
    pub fn dispatch(&self, job: StageJob) {
        match self.tx.try_send(job) {
            Ok(()) => {}
            Err(TrySendError::Full(job)) => {
                warn!(image_id = %job.image_id, stage = job.stage, "stage queue full, dropping dispatch");
            }
            Err(TrySendError::Closed(job)) => {
                warn!(image_id = %job.image_id, stage = job.stage, "stage queue closed, dropping dispatch");
            }
        }
    }
}

/// Run one job, converting any failure or panic into the image's
/// `error` status
async fn run_supervised(job: StageJob, images: &Arc<dyn ImageRepository>, worker: usize) {
    let StageJob {
        image_id,
        stage,
        task,
    } = job;

    match tokio::spawn(task).await {
        Ok(Ok(())) => {
            debug!(%image_id, stage, worker, "stage completed");
        }
        Ok(Err(err)) => {
            warn!(%image_id, stage, error = %err, "stage failed");
            mark_error(images, image_id, &err.to_string()).await;
        }
        Err(join_err) => {
            error!(%image_id, stage, error = %join_err, "stage panicked");
            mark_error(images, image_id, &format!("{stage} stage panicked: {join_err}")).await;
        }
    }
}

/// Record a terminal error status for the image
///
/// Runs detached with no caller to report to, so failures to even locate or
/// update the row are logged and swallowed.
pub async fn mark_error(images: &Arc<dyn ImageRepository>, image_id: Uuid, message: &str) {
    let mut image = match images.find_by_id(image_id).await {
        Ok(Some(image)) => image,
        Ok(None) => {
            error!(%image_id, "image row missing for error update");
            return;
        }
        Err(err) => {
            error!(%image_id, error = %err, "failed to load image for error update");
            return;
        }
    };

    image.set_status(ImageStatus::Error);
    image.error_message = Some(message.to_string());

    if let Err(err) = images.update(&image).await {
        error!(%image_id, error = %err, "failed to record error status");
    }
}
