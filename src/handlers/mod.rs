pub mod images;

pub use images::{get_image, upload_image, upload_image_raw};
