use iced::{
    widget::{button, column, pick_list, progress_bar, row, text, text_input, Space},
    Element, Length,
};

use crate::auth::AuthSession;
use crate::domain::{FormState, OutputFormat, Provider, TransferPhase};

/// Main view state
pub struct DownloadView {
    pub form: FormState,
    pub status_message: String,
    pub progress: u8,
    pub phase: TransferPhase,
    /// Text being typed into the sign-in surface.
    pub auth_draft: String,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            form: FormState::default(),
            status_message: "Paste a track or video link to download".to_string(),
            progress: 0,
            phase: TransferPhase::Idle,
            auth_draft: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    ProviderSelected(Provider),
    SourceUrlChanged(String),
    CookiesChanged(String),
    FormatPicked(OutputFormat),
    BitratePicked(crate::domain::Bitrate),
    ResolutionPicked(crate::domain::Resolution),
    EqPresetPicked(crate::domain::EqualizerPreset),
    VolumeChanged(String),
    TrimStartChanged(String),
    TrimEndChanged(String),
    DownloadPressed,
    SignInPressed,
    AuthDraftChanged(String),
    AuthSubmitPressed,
    AuthCancelPressed,
    ClearCookiesPressed,
}

impl DownloadView {
    /// Field edits are applied here; actions are handled by the app.
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::ProviderSelected(provider) => {
                self.form.provider = provider;
                self.form.format = provider.formats()[0];
            }
            DownloadMessage::SourceUrlChanged(url) => self.form.source_url = url,
            DownloadMessage::CookiesChanged(cookies) => self.form.cookies = cookies,
            DownloadMessage::FormatPicked(format) => self.form.format = format,
            DownloadMessage::BitratePicked(bitrate) => self.form.bitrate = bitrate,
            DownloadMessage::ResolutionPicked(resolution) => self.form.resolution = resolution,
            DownloadMessage::EqPresetPicked(preset) => self.form.eq_preset = preset,
            DownloadMessage::VolumeChanged(volume) => self.form.volume = volume,
            DownloadMessage::TrimStartChanged(start) => self.form.trim_start = start,
            DownloadMessage::TrimEndChanged(end) => self.form.trim_end = end,
            DownloadMessage::AuthDraftChanged(draft) => self.auth_draft = draft,
            DownloadMessage::DownloadPressed
            | DownloadMessage::SignInPressed
            | DownloadMessage::AuthSubmitPressed
            | DownloadMessage::AuthCancelPressed
            | DownloadMessage::ClearCookiesPressed => {
                // Handled by the app.
            }
        }
    }

    pub fn can_submit(&self) -> bool {
        self.phase != TransferPhase::InFlight && !self.form.source_url.trim().is_empty()
    }

    pub fn view<'a>(&'a self, auth: &'a AuthSession) -> Element<'a, DownloadMessage> {
        let tabs = Provider::ALL.iter().fold(row![].spacing(8), |tabs, provider| {
            tabs.push(
                button(text(provider.to_string()))
                    .on_press_maybe(
                        (*provider != self.form.provider)
                            .then_some(DownloadMessage::ProviderSelected(*provider)),
                    )
                    .padding([6, 14]),
            )
        });

        let url_input = column![
            text("Link").size(16),
            text_input("https://music.yandex.ru/track/...", &self.form.source_url)
                .on_input(DownloadMessage::SourceUrlChanged)
                .padding(10),
        ]
        .spacing(4);

        let options: Element<'_, DownloadMessage> = match self.form.provider {
            Provider::YandexMusic => self.track_options(auth),
            Provider::Rutube => self.rutube_options(),
        };

        let mut content = column![
            text("TrackDL").size(32),
            Space::new().height(Length::Fixed(16.0)),
            tabs,
            Space::new().height(Length::Fixed(8.0)),
            url_input,
            options,
            Space::new().height(Length::Fixed(12.0)),
            button(text(if self.phase == TransferPhase::InFlight {
                "Downloading..."
            } else {
                "Download"
            }))
            .on_press_maybe(self.can_submit().then_some(DownloadMessage::DownloadPressed))
            .padding([10, 20]),
        ]
        .padding(20)
        .spacing(10);

        if self.phase == TransferPhase::InFlight {
            content = content.push(progress_bar(0.0..=100.0, f32::from(self.progress)));
        }
        content = content.push(text(&self.status_message).size(14));

        content.into()
    }

    fn track_options<'a>(&'a self, auth: &'a AuthSession) -> Element<'a, DownloadMessage> {
        let quality = row![
            column![
                text("Format").size(14),
                pick_list(
                    OutputFormat::AUDIO,
                    Some(self.form.format),
                    DownloadMessage::FormatPicked
                ),
            ]
            .spacing(4),
            column![
                text("Bitrate").size(14),
                pick_list(
                    crate::domain::Bitrate::ALL,
                    Some(self.form.bitrate),
                    DownloadMessage::BitratePicked
                ),
            ]
            .spacing(4),
            column![
                text("Equalizer").size(14),
                pick_list(
                    crate::domain::EqualizerPreset::ALL,
                    Some(self.form.eq_preset),
                    DownloadMessage::EqPresetPicked
                ),
            ]
            .spacing(4),
        ]
        .spacing(12);

        let tuning = row![
            column![
                text("Volume (0.5 - 2.0)").size(14),
                text_input("1.0", &self.form.volume)
                    .on_input(DownloadMessage::VolumeChanged)
                    .width(Length::Fixed(80.0)),
            ]
            .spacing(4),
            column![
                text("Trim (MM:SS)").size(14),
                row![
                    text_input("00:00", &self.form.trim_start)
                        .on_input(DownloadMessage::TrimStartChanged)
                        .width(Length::Fixed(80.0)),
                    text("-"),
                    text_input("00:30", &self.form.trim_end)
                        .on_input(DownloadMessage::TrimEndChanged)
                        .width(Length::Fixed(80.0)),
                ]
                .spacing(6),
            ]
            .spacing(4),
        ]
        .spacing(12);

        let mut cookies = column![
            text("Cookies (optional, required for full-length tracks)").size(14),
            text_input("Session_id=...; yandexuid=...", &self.form.cookies)
                .on_input(DownloadMessage::CookiesChanged)
                .padding(10),
            row![
                button(text("Sign in"))
                    .on_press_maybe((!auth.helper_open).then_some(DownloadMessage::SignInPressed)),
                button(text("Clear")).on_press(DownloadMessage::ClearCookiesPressed),
            ]
            .spacing(8),
        ]
        .spacing(4);

        if auth.helper_open {
            cookies = cookies.push(
                column![
                    text("Paste the cookie header copied from your signed-in browser session:")
                        .size(14),
                    text_input("Session_id=...", &self.auth_draft)
                        .on_input(DownloadMessage::AuthDraftChanged)
                        .padding(10),
                    row![
                        button(text("Apply")).on_press(DownloadMessage::AuthSubmitPressed),
                        button(text("Cancel")).on_press(DownloadMessage::AuthCancelPressed),
                    ]
                    .spacing(8),
                ]
                .spacing(6),
            );
        }
        if !auth.status_message.is_empty() {
            cookies = cookies.push(text(&auth.status_message).size(13));
        }

        column![quality, tuning, cookies].spacing(12).into()
    }

    fn rutube_options(&self) -> Element<'_, DownloadMessage> {
        column![
            text("Resolution").size(14),
            pick_list(
                crate::domain::Resolution::ALL,
                Some(self.form.resolution),
                DownloadMessage::ResolutionPicked
            ),
        ]
        .spacing(4)
        .into()
    }
}
