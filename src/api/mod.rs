mod client;
mod models;

pub use client::{ApiClient, Result, Transfer};
pub use models::ApiConfig;
