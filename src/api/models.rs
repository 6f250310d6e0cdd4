use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{DownloadRequest, Provider};

/// Body for the track endpoint. Optional fields serialize as explicit
/// `null` so the service can tell "not provided" from "provided as default".
#[derive(Debug, Clone, Serialize)]
pub struct TrackRequestBody {
    pub url: String,
    pub cookies: Option<String>,
    pub quality: Option<String>,
    pub format: Option<String>,
    pub eq_preset: Option<String>,
    pub volume: Option<f64>,
    pub trim: Option<String>,
}

/// Body for the Rutube endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RutubeRequestBody {
    pub url: String,
    pub format: String,
    pub quality: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    Track(TrackRequestBody),
    Rutube(RutubeRequestBody),
}

impl RequestBody {
    pub fn from_request(request: &DownloadRequest) -> Self {
        match request.provider {
            Provider::YandexMusic => RequestBody::Track(TrackRequestBody {
                url: request.source_url.to_string(),
                cookies: request.credential.clone(),
                quality: Some(request.quality.wire_value().to_string()),
                format: Some(request.format.extension().to_string()),
                eq_preset: Some(request.eq_preset.wire_value().to_string()),
                volume: Some(request.volume),
                trim: request.trim.clone(),
            }),
            Provider::Rutube => RequestBody::Rutube(RutubeRequestBody {
                url: request.source_url.to_string(),
                format: request.format.extension().to_string(),
                quality: Some(request.quality.wire_value().to_string()),
            }),
        }
    }
}

/// Error payload returned by the service: a single message or a list of
/// field-level messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub detail: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldError>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldError {
    pub msg: String,
}

impl ErrorDetail {
    pub fn joined(&self) -> String {
        match self {
            ErrorDetail::Message(message) => message.clone(),
            ErrorDetail::Fields(fields) => fields
                .iter()
                .map(|field| field.msg.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Configuration for the API client. The base URL is supplied at build time.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: option_env!("TRACKDL_API_URL")
                .unwrap_or("http://127.0.0.1:8000")
                .trim_end_matches('/')
                .to_string(),
            request_timeout: Duration::from_secs(300),
        }
    }
}
