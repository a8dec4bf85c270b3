pub mod baseline;
pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod logging;
pub mod merger;
pub mod pipeline;
pub mod record;
pub mod status;
