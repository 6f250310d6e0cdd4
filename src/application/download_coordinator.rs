use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::StreamExt;
use log::{info, warn};
use tokio::io::AsyncWriteExt;

use crate::api::ApiClient;
use crate::domain::{build_request, DownloadError, FormState};
use crate::utils::sanitize_filename;

/// Fallback denominator when the server does not advertise a length; keeps
/// the percentage renderable at the cost of being an estimate.
const FALLBACK_TOTAL_BYTES: u64 = 10_000_000;

#[derive(Debug, Clone)]
pub enum DownloadEvent {
    /// Response headers received; `filename` is what the save will suggest.
    Accepted { filename: String },
    /// 0-100, never decreasing within one transfer.
    Progress(u8),
    Completed { path: PathBuf, filename: String },
    /// The user declined the save dialog.
    Cancelled,
    Failed(DownloadError),
}

/// Picks where the received bytes land. The GUI implementation opens a save
/// dialog; tests supply a fixed path.
pub trait SavePicker: Send + 'static {
    fn pick(self, suggested_filename: String) -> BoxFuture<'static, Option<PathBuf>>;
}

pub struct DialogPicker;

impl SavePicker for DialogPicker {
    fn pick(self, suggested_filename: String) -> BoxFuture<'static, Option<PathBuf>> {
        Box::pin(async move {
            rfd::AsyncFileDialog::new()
                .set_file_name(&suggested_filename)
                .save_file()
                .await
                .map(|handle| handle.path().to_path_buf())
        })
    }
}

#[derive(Clone)]
pub struct DownloadCoordinator {
    api_client: ApiClient,
}

impl DownloadCoordinator {
    pub fn new(api_client: ApiClient) -> Self {
        Self { api_client }
    }

    /// Run one submission end to end: validate, POST, pick a destination,
    /// stream into `<dest>.part`, then rename into place. Every failure path
    /// removes the partial file, so nothing survives a failed transfer.
    pub fn run(
        &self,
        form: FormState,
        picker: impl SavePicker,
    ) -> BoxStream<'static, DownloadEvent> {
        futures::stream::unfold(
            RunState::Start {
                client: self.api_client.clone(),
                form,
                picker,
            },
            |state| async move {
                match state {
                    RunState::Start {
                        client,
                        form,
                        picker,
                    } => {
                        let request = match build_request(&form) {
                            Ok(request) => request,
                            Err(e) => return Some((DownloadEvent::Failed(e), RunState::Finished)),
                        };

                        match client.submit(&request).await {
                            Ok(transfer) => {
                                let filename = transfer
                                    .filename
                                    .as_deref()
                                    .map(sanitize_filename)
                                    .filter(|name| !name.is_empty())
                                    .unwrap_or_else(|| request.format.default_filename());

                                Some((
                                    DownloadEvent::Accepted {
                                        filename: filename.clone(),
                                    },
                                    RunState::ChoosePath {
                                        transfer,
                                        filename,
                                        picker,
                                    },
                                ))
                            }
                            Err(e) => Some((DownloadEvent::Failed(e), RunState::Finished)),
                        }
                    }
                    RunState::ChoosePath {
                        transfer,
                        filename,
                        picker,
                    } => match picker.pick(filename.clone()).await {
                        None => Some((DownloadEvent::Cancelled, RunState::Finished)),
                        Some(final_path) => {
                            let part_path = partial_path(&final_path);
                            match tokio::fs::File::create(&part_path).await {
                                Ok(file) => Some((
                                    DownloadEvent::Progress(0),
                                    RunState::Streaming {
                                        file,
                                        stream: transfer.stream,
                                        part_path,
                                        final_path,
                                        filename,
                                        downloaded: 0,
                                        total: transfer.total_bytes,
                                        last_percent: 0,
                                    },
                                )),
                                Err(e) => Some((
                                    DownloadEvent::Failed(DownloadError::Io(format!(
                                        "Failed to create file: {e}"
                                    ))),
                                    RunState::Finished,
                                )),
                            }
                        }
                    },
                    RunState::Streaming {
                        mut file,
                        mut stream,
                        part_path,
                        final_path,
                        filename,
                        mut downloaded,
                        total,
                        last_percent,
                    } => match stream.next().await {
                        Some(Ok(chunk)) => {
                            if let Err(e) = file.write_all(&chunk).await {
                                drop(file);
                                discard_partial(&part_path).await;
                                return Some((
                                    DownloadEvent::Failed(DownloadError::Io(format!(
                                        "Write error: {e}"
                                    ))),
                                    RunState::Finished,
                                ));
                            }

                            downloaded += chunk.len() as u64;
                            let percent = last_percent.max(progress_percent(downloaded, total));

                            Some((
                                DownloadEvent::Progress(percent),
                                RunState::Streaming {
                                    file,
                                    stream,
                                    part_path,
                                    final_path,
                                    filename,
                                    downloaded,
                                    total,
                                    last_percent: percent,
                                },
                            ))
                        }
                        Some(Err(e)) => {
                            drop(file);
                            discard_partial(&part_path).await;
                            Some((DownloadEvent::Failed(e), RunState::Finished))
                        }
                        None => {
                            if let Err(e) = file.sync_all().await {
                                drop(file);
                                discard_partial(&part_path).await;
                                return Some((
                                    DownloadEvent::Failed(DownloadError::Io(format!(
                                        "Failed to sync file: {e}"
                                    ))),
                                    RunState::Finished,
                                ));
                            }
                            drop(file);

                            if let Err(e) = tokio::fs::rename(&part_path, &final_path).await {
                                discard_partial(&part_path).await;
                                return Some((
                                    DownloadEvent::Failed(DownloadError::Io(format!(
                                        "Failed to move file into place: {e}"
                                    ))),
                                    RunState::Finished,
                                ));
                            }

                            info!("saved {} ({downloaded} bytes)", final_path.display());
                            Some((
                                DownloadEvent::Completed {
                                    path: final_path,
                                    filename,
                                },
                                RunState::Finished,
                            ))
                        }
                    },
                    RunState::Finished => None,
                }
            },
        )
        .boxed()
    }
}

enum RunState<P> {
    Start {
        client: ApiClient,
        form: FormState,
        picker: P,
    },
    ChoosePath {
        transfer: crate::api::Transfer,
        filename: String,
        picker: P,
    },
    Streaming {
        file: tokio::fs::File,
        stream: BoxStream<'static, crate::api::Result<bytes::Bytes>>,
        part_path: PathBuf,
        final_path: PathBuf,
        filename: String,
        downloaded: u64,
        total: Option<u64>,
        last_percent: u8,
    },
    Finished,
}

/// `floor(received * 100 / total)`, capped at 100 when the fallback
/// denominator is exceeded.
fn progress_percent(downloaded: u64, total: Option<u64>) -> u8 {
    let denominator = match total {
        Some(total) if total > 0 => total,
        _ => FALLBACK_TOTAL_BYTES,
    };
    (downloaded.saturating_mul(100) / denominator).min(100) as u8
}

fn partial_path(path: &Path) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(".part");
    PathBuf::from(raw)
}

async fn discard_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!("failed to remove partial file {}: {e}", path.display());
    }
}
