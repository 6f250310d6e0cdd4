use futures::StreamExt;
use iced::Task;
use log::info;

use crate::api::{ApiClient, ApiConfig};
use crate::application::{DialogPicker, DownloadCoordinator, DownloadEvent};
use crate::auth::{self, AuthMessage, AuthPort, AuthRelay, AuthSession};
use crate::domain::TransferPhase;
use crate::ui::{DownloadMessage, DownloadView};

pub struct DownloadApp {
    view: DownloadView,
    coordinator: DownloadCoordinator,
    auth: AuthSession,
    auth_port: AuthPort,
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    Download(DownloadEvent),
    /// A handshake message that passed the origin filter.
    AuthInbound(AuthMessage),
    AlertClosed,
}

/// Build the app and register the handshake listener once, for the
/// component's lifetime.
pub fn boot() -> (DownloadApp, Task<Message>) {
    let api_client = ApiClient::new(ApiConfig::default());
    let (relay, auth_port) = AuthRelay::channel(auth::APP_ORIGIN);

    let app = DownloadApp {
        view: DownloadView::default(),
        coordinator: DownloadCoordinator::new(api_client),
        auth: AuthSession::default(),
        auth_port,
    };
    let listener = Task::stream(relay.into_stream().map(Message::AuthInbound));
    (app, listener)
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_message) => {
            app.view.update(ui_message.clone());

            match ui_message {
                DownloadMessage::DownloadPressed => {
                    if app.view.can_submit() {
                        app.view.phase = TransferPhase::InFlight;
                        app.view.progress = 0;
                        app.view.status_message = "Requesting download...".to_string();

                        let stream = app.coordinator.run(app.view.form.clone(), DialogPicker);
                        return Task::stream(stream.map(Message::Download));
                    }
                }
                DownloadMessage::SignInPressed => {
                    if !app.auth.helper_open {
                        app.auth.helper_open = true;
                        app.auth.status_message =
                            "Paste your cookies and press Apply".to_string();
                    }
                }
                DownloadMessage::AuthSubmitPressed => {
                    if app.auth.helper_open {
                        let draft = app.view.auth_draft.trim().to_string();
                        let message = if draft.is_empty() {
                            AuthMessage::Failed {
                                message: Some("No cookies were provided".to_string()),
                            }
                        } else {
                            AuthMessage::Success { cookies: draft }
                        };
                        // The sign-in surface only ever talks through the
                        // relay, tagged with its declared origin.
                        app.auth_port.post(auth::APP_ORIGIN, message);
                    }
                }
                DownloadMessage::AuthCancelPressed => {
                    app.auth.helper_open = false;
                    app.auth.status_message = "Sign-in cancelled".to_string();
                }
                DownloadMessage::ClearCookiesPressed => {
                    app.view.form.cookies.clear();
                    app.auth.clear();
                }
                _ => {}
            }
        }
        Message::Download(event) => return apply_download_event(app, event),
        Message::AuthInbound(message) => {
            if let AuthMessage::Success { cookies } = &message {
                app.view.form.cookies = cookies.clone();
                app.view.auth_draft.clear();
            }
            app.auth.apply(message);
        }
        Message::AlertClosed => {}
    }
    Task::none()
}

fn apply_download_event(app: &mut DownloadApp, event: DownloadEvent) -> Task<Message> {
    match event {
        DownloadEvent::Accepted { filename } => {
            app.view.status_message = format!("Choose where to save {filename}");
        }
        DownloadEvent::Progress(percent) => {
            app.view.progress = percent;
            app.view.status_message = format!("Downloading: {percent}%");
        }
        DownloadEvent::Cancelled => {
            app.view.phase = TransferPhase::Idle;
            app.view.progress = 0;
            app.view.status_message = "Download cancelled".to_string();
        }
        DownloadEvent::Completed { path, filename } => {
            app.view.phase = TransferPhase::Succeeded;
            app.view.progress = 100;
            app.view.status_message = format!("Saved: {filename}");
            info!("download finished: {}", path.display());
        }
        DownloadEvent::Failed(error) => {
            app.view.phase = TransferPhase::Failed;
            app.view.progress = 0;
            let text = error.to_string();
            app.view.status_message = text.clone();

            return Task::perform(
                async move {
                    rfd::AsyncMessageDialog::new()
                        .set_level(rfd::MessageLevel::Error)
                        .set_title("Download failed")
                        .set_description(text)
                        .show()
                        .await;
                },
                |_| Message::AlertClosed,
            );
        }
    }
    Task::none()
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view(&app.auth).map(Message::UiMessage)
}
