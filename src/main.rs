/// Image Service - HTTP server
///
/// Accepts image uploads, runs the compression + thumbnail pipeline in the
/// background, and serves pipeline status with presigned asset URLs.
use actix_web::{middleware as actix_middleware, web, App, HttpResponse, HttpServer};
use image_service::db::{PgImageRepository, PgThumbnailRepository};
use image_service::handlers;
use image_service::services::pipeline::StageDispatcher;
use image_service::services::ImagePipeline;
use image_service::storage::S3ObjectStorage;
use image_service::Config;
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env().expect("Failed to load configuration");

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!(%bind_address, env = %config.app.env, "image-service starting");

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");

    let storage = S3ObjectStorage::new(&config.s3)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("S3 init failed: {e}")))?;
    let storage: Arc<dyn image_service::storage::ObjectStorage> = Arc::new(storage);

    let images: Arc<dyn image_service::db::ImageRepository> =
        Arc::new(PgImageRepository::new(db_pool.clone()));
    let thumbnails: Arc<dyn image_service::db::ThumbnailRepository> =
        Arc::new(PgThumbnailRepository::new(db_pool.clone()));

    let dispatcher = StageDispatcher::start(
        config.pipeline.workers,
        config.pipeline.queue_depth,
        images.clone(),
    );

    let pipeline = Arc::new(ImagePipeline::new(
        storage,
        images,
        thumbnails,
        dispatcher,
    ));

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pipeline.clone()))
            .wrap(actix_middleware::Logger::default())
            .route(
                "/api/v1/health",
                web::get()
                    .to(|| async { HttpResponse::Ok().json(serde_json::json!({"status": "ok"})) }),
            )
            .service(
                web::scope("/api/v1/images")
                    .route("", web::post().to(handlers::upload_image))
                    .route("/raw", web::post().to(handlers::upload_image_raw))
                    .route("/{id}", web::get().to(handlers::get_image)),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
