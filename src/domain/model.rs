use std::fmt;

use url::Url;

/// Media provider tab. Selects the endpoint path and which fields the
/// request body carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    YandexMusic,
    Rutube,
}

impl Provider {
    pub const ALL: &'static [Provider] = &[Provider::YandexMusic, Provider::Rutube];

    pub fn endpoint_path(self) -> &'static str {
        match self {
            Provider::YandexMusic => "/download/",
            Provider::Rutube => "/download_rutube/",
        }
    }

    /// Output formats offered on this provider's tab.
    pub fn formats(self) -> &'static [OutputFormat] {
        match self {
            Provider::YandexMusic => OutputFormat::AUDIO,
            Provider::Rutube => OutputFormat::VIDEO,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::YandexMusic => "Yandex Music",
            Provider::Rutube => "Rutube",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Mp3,
    Aac,
    Flac,
    Opus,
    Mp4,
}

impl OutputFormat {
    pub const AUDIO: &'static [OutputFormat] = &[
        OutputFormat::Mp3,
        OutputFormat::Aac,
        OutputFormat::Flac,
        OutputFormat::Opus,
    ];
    pub const VIDEO: &'static [OutputFormat] = &[OutputFormat::Mp4];

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Mp3 => "mp3",
            OutputFormat::Aac => "aac",
            OutputFormat::Flac => "flac",
            OutputFormat::Opus => "opus",
            OutputFormat::Mp4 => "mp4",
        }
    }

    /// Fallback filename when the response carries no disposition header.
    pub fn default_filename(self) -> String {
        match self {
            OutputFormat::Mp4 => "video.mp4".to_string(),
            audio => format!("track.{}", audio.extension()),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Mp3 => "MP3",
            OutputFormat::Aac => "AAC",
            OutputFormat::Flac => "FLAC",
            OutputFormat::Opus => "Opus",
            OutputFormat::Mp4 => "MP4",
        })
    }
}

/// Audio quality choice on the track provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bitrate {
    Kbps128,
    Kbps192,
    Kbps256,
    Kbps320,
}

impl Bitrate {
    pub const ALL: &'static [Bitrate] = &[
        Bitrate::Kbps128,
        Bitrate::Kbps192,
        Bitrate::Kbps256,
        Bitrate::Kbps320,
    ];

    pub fn wire_value(self) -> &'static str {
        match self {
            Bitrate::Kbps128 => "128",
            Bitrate::Kbps192 => "192",
            Bitrate::Kbps256 => "256",
            Bitrate::Kbps320 => "320",
        }
    }
}

impl fmt::Display for Bitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kbps", self.wire_value())
    }
}

/// Video quality choice on the Rutube provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    P360,
    P480,
    P720,
    P1080,
}

impl Resolution {
    pub const ALL: &'static [Resolution] = &[
        Resolution::P360,
        Resolution::P480,
        Resolution::P720,
        Resolution::P1080,
    ];

    pub fn wire_value(self) -> &'static str {
        match self {
            Resolution::P360 => "360",
            Resolution::P480 => "480",
            Resolution::P720 => "720",
            Resolution::P1080 => "1080",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}p", self.wire_value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqualizerPreset {
    None,
    BassBoost,
    TrebleBoost,
    VocalBoost,
    Flat,
}

impl EqualizerPreset {
    pub const ALL: &'static [EqualizerPreset] = &[
        EqualizerPreset::None,
        EqualizerPreset::BassBoost,
        EqualizerPreset::TrebleBoost,
        EqualizerPreset::VocalBoost,
        EqualizerPreset::Flat,
    ];

    pub fn wire_value(self) -> &'static str {
        match self {
            EqualizerPreset::None => "none",
            EqualizerPreset::BassBoost => "bass_boost",
            EqualizerPreset::TrebleBoost => "treble_boost",
            EqualizerPreset::VocalBoost => "vocal_boost",
            EqualizerPreset::Flat => "flat",
        }
    }
}

impl fmt::Display for EqualizerPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EqualizerPreset::None => "None",
            EqualizerPreset::BassBoost => "Bass boost",
            EqualizerPreset::TrebleBoost => "Treble boost",
            EqualizerPreset::VocalBoost => "Vocal boost",
            EqualizerPreset::Flat => "Flat",
        })
    }
}

/// Provider-dependent quality choice carried by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Bitrate(Bitrate),
    Resolution(Resolution),
}

impl Quality {
    pub fn wire_value(self) -> &'static str {
        match self {
            Quality::Bitrate(bitrate) => bitrate.wire_value(),
            Quality::Resolution(resolution) => resolution.wire_value(),
        }
    }
}

/// Lifecycle of the one transfer a form instance may have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPhase {
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

/// A validated request, rebuilt fresh from the form at submit time.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub provider: Provider,
    pub source_url: Url,
    pub credential: Option<String>,
    pub format: OutputFormat,
    pub quality: Quality,
    pub eq_preset: EqualizerPreset,
    pub volume: f64,
    pub trim: Option<String>,
}
