use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use log::{info, warn};
use reqwest::{Client, StatusCode};

use crate::domain::{DownloadError, DownloadRequest};
use crate::utils::filename_from_disposition;

use super::models::{ApiConfig, ErrorBody, RequestBody};

pub type Result<T> = std::result::Result<T, DownloadError>;

/// An accepted transfer: derived filename (if the server sent one), the
/// advertised size and the undecoded byte stream.
pub struct Transfer {
    pub filename: Option<String>,
    pub total_bytes: Option<u64>,
    pub stream: BoxStream<'static, Result<bytes::Bytes>>,
}

impl std::fmt::Debug for Transfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transfer")
            .field("filename", &self.filename)
            .field("total_bytes", &self.total_bytes)
            .field("stream", &"<stream>")
            .finish()
    }
}

#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    fn http(&self) -> Result<Client> {
        Client::builder()
            .timeout(self.config.request_timeout)
            .build()
            .map_err(|e| DownloadError::Unknown(e.to_string()))
    }

    /// POST the serialized request and classify the response: an open byte
    /// stream on success, a terminal `DownloadError` otherwise.
    pub async fn submit(&self, request: &DownloadRequest) -> Result<Transfer> {
        let endpoint = format!(
            "{}{}",
            self.config.base_url,
            request.provider.endpoint_path()
        );
        let body = RequestBody::from_request(request);

        info!("submitting download request to {endpoint}");
        let response = self
            .http()?
            .post(&endpoint)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let error = classify_error_body(status, &body);
            warn!("download request failed: {error}");
            return Err(error);
        }

        let filename = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_disposition);
        let total_bytes = response.content_length();
        let stream = response
            .bytes_stream()
            .map_err(classify_transport_error)
            .boxed();

        Ok(Transfer {
            filename,
            total_bytes,
            stream,
        })
    }
}

fn classify_transport_error(err: reqwest::Error) -> DownloadError {
    if err.is_timeout() {
        DownloadError::Timeout
    } else if err.is_connect() || err.is_request() {
        DownloadError::Network(err.to_string())
    } else {
        DownloadError::Unknown(err.to_string())
    }
}

/// Error bodies may be structured JSON or arbitrary bytes. 422 with a
/// decodable detail is a rejection; everything else degrades from JSON
/// detail to raw text to a bare status line.
fn classify_error_body(status: StatusCode, body: &[u8]) -> DownloadError {
    if status == StatusCode::UNPROCESSABLE_ENTITY {
        if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
            return DownloadError::Rejected(parsed.detail.joined());
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(text) {
        return DownloadError::Server(parsed.detail.joined());
    }
    if text.is_empty() {
        DownloadError::Server(format!("Error {}", status.as_u16()))
    } else {
        DownloadError::Server(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{build_request, FormState};
    use futures::StreamExt;
    use std::io::Write;
    use std::time::Duration;

    fn request_for(base_url: &str) -> (ApiClient, DownloadRequest) {
        let client = ApiClient::new(ApiConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(5),
        });
        let form = FormState {
            source_url: "https://music.yandex.ru/track/12345678".to_string(),
            ..FormState::default()
        };
        (client, build_request(&form).unwrap())
    }

    #[tokio::test]
    async fn rejection_concatenates_field_messages() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/download/")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail":[{"msg":"bad url"},{"msg":"bad trim"}]}"#)
            .create_async()
            .await;

        let (client, request) = request_for(&server.url());
        let err = client.submit(&request).await.unwrap_err();
        assert_eq!(err, DownloadError::Rejected("bad url, bad trim".into()));
    }

    #[tokio::test]
    async fn server_error_decodes_json_detail() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/download/")
            .with_status(500)
            .with_body(r#"{"detail":"yt-dlp exploded"}"#)
            .create_async()
            .await;

        let (client, request) = request_for(&server.url());
        let err = client.submit(&request).await.unwrap_err();
        assert_eq!(err, DownloadError::Server("yt-dlp exploded".into()));
    }

    #[tokio::test]
    async fn server_error_falls_back_to_raw_text_then_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/download/")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let (client, request) = request_for(&server.url());
        let err = client.submit(&request).await.unwrap_err();
        assert_eq!(err, DownloadError::Server("bad gateway".into()));

        let mut empty_server = mockito::Server::new_async().await;
        let _mock = empty_server
            .mock("POST", "/download/")
            .with_status(500)
            .with_body("")
            .create_async()
            .await;
        let (client, request) = request_for(&empty_server.url());
        let err = client.submit(&request).await.unwrap_err();
        assert_eq!(err, DownloadError::Server("Error 500".into()));
    }

    #[tokio::test]
    async fn success_derives_filename_from_disposition() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/download/")
            .with_status(200)
            .with_header("content-disposition", "attachment; filename=\"my%20track.mp3\"")
            .with_body(b"abc".as_slice())
            .create_async()
            .await;

        let (client, request) = request_for(&server.url());
        let transfer = client.submit(&request).await.unwrap();
        assert_eq!(transfer.filename.as_deref(), Some("my track.mp3"));
        assert_eq!(transfer.total_bytes, Some(3));

        let chunks: Vec<_> = transfer.stream.collect().await;
        let bytes: Vec<u8> = chunks
            .into_iter()
            .flat_map(|chunk| chunk.unwrap().to_vec())
            .collect();
        assert_eq!(bytes, b"abc");
    }

    #[tokio::test]
    async fn missing_disposition_leaves_filename_unset() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/download/")
            .with_status(200)
            .with_body(b"abc".as_slice())
            .create_async()
            .await;

        let (client, request) = request_for(&server.url());
        let transfer = client.submit(&request).await.unwrap();
        assert_eq!(transfer.filename, None);
    }

    #[tokio::test]
    async fn connection_failure_is_a_network_error() {
        // Nothing listens on port 9 locally.
        let (client, request) = request_for("http://127.0.0.1:9");
        let err = client.submit(&request).await.unwrap_err();
        assert!(matches!(err, DownloadError::Network(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn stalled_transfer_times_out() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/download/")
            .with_status(200)
            .with_chunked_body(|writer| {
                std::thread::sleep(Duration::from_millis(500));
                writer.write_all(b"late")
            })
            .create_async()
            .await;

        let client = ApiClient::new(ApiConfig {
            base_url: server.url(),
            request_timeout: Duration::from_millis(100),
        });
        let form = FormState {
            source_url: "https://music.yandex.ru/track/12345678".to_string(),
            ..FormState::default()
        };
        let request = build_request(&form).unwrap();

        // The timeout may fire while waiting for headers or mid-stream.
        match client.submit(&request).await {
            Err(err) => assert_eq!(err, DownloadError::Timeout),
            Ok(transfer) => {
                let outcome: std::result::Result<Vec<_>, _> =
                    transfer.stream.try_collect().await;
                assert_eq!(outcome.unwrap_err(), DownloadError::Timeout);
            }
        }
    }
}
