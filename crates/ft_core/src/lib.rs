pub mod app_error;
pub mod config;
pub mod ingest;
pub mod mime;
pub mod record;
pub mod remote;
pub mod remote_fs;
pub mod remote_s3;
pub mod services;
pub mod staging;
pub mod types;

pub use app_error::AppError;
