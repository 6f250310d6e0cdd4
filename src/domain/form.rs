use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use super::error::DownloadError;
use super::model::{
    Bitrate, DownloadRequest, EqualizerPreset, OutputFormat, Provider, Quality, Resolution,
};

pub const VOLUME_MIN: f64 = 0.5;
pub const VOLUME_MAX: f64 = 2.0;

/// Everything the user can edit. Owned by the UI loop; a `DownloadRequest`
/// is built from a snapshot of this at submit time only.
#[derive(Debug, Clone)]
pub struct FormState {
    pub provider: Provider,
    pub source_url: String,
    pub cookies: String,
    pub format: OutputFormat,
    pub bitrate: Bitrate,
    pub resolution: Resolution,
    pub eq_preset: EqualizerPreset,
    pub volume: String,
    pub trim_start: String,
    pub trim_end: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            provider: Provider::YandexMusic,
            source_url: String::new(),
            cookies: String::new(),
            format: OutputFormat::Mp3,
            bitrate: Bitrate::Kbps192,
            resolution: Resolution::P720,
            eq_preset: EqualizerPreset::None,
            volume: "1.0".to_string(),
            trim_start: String::new(),
            trim_end: String::new(),
        }
    }
}

/// Build a validated request from the current field values, or name the
/// offending field. Runs before any network use.
pub fn build_request(form: &FormState) -> Result<DownloadRequest, DownloadError> {
    let source_url =
        Url::parse(form.source_url.trim()).map_err(|e| DownloadError::Validation {
            field: "url",
            reason: e.to_string(),
        })?;

    let format = if form.provider.formats().contains(&form.format) {
        form.format
    } else {
        form.provider.formats()[0]
    };

    let quality = match form.provider {
        Provider::YandexMusic => Quality::Bitrate(form.bitrate),
        Provider::Rutube => Quality::Resolution(form.resolution),
    };

    Ok(DownloadRequest {
        provider: form.provider,
        source_url,
        credential: non_empty(&form.cookies),
        format,
        quality,
        eq_preset: form.eq_preset,
        volume: parse_volume(&form.volume)?,
        trim: combine_trim(&form.trim_start, &form.trim_end)?,
    })
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// The slider-less volume field is free text; clamping stands in for what a
/// native numeric control would do.
fn parse_volume(raw: &str) -> Result<f64, DownloadError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(1.0);
    }
    let value: f64 = raw.parse().map_err(|_| DownloadError::Validation {
        field: "volume",
        reason: "must be a number".to_string(),
    })?;
    Ok(value.clamp(VOLUME_MIN, VOLUME_MAX))
}

/// Combine the two trim sub-fields. Exactly one set means "no trim"; both
/// set must form `MM:SS-MM:SS`.
fn combine_trim(start: &str, end: &str) -> Result<Option<String>, DownloadError> {
    static TRIM_RE: OnceLock<Regex> = OnceLock::new();

    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() || end.is_empty() {
        return Ok(None);
    }

    let combined = format!("{start}-{end}");
    let re = TRIM_RE
        .get_or_init(|| Regex::new(r"^\d{1,2}:\d{2}-\d{1,2}:\d{2}$").expect("trim pattern"));
    if re.is_match(&combined) {
        Ok(Some(combined))
    } else {
        Err(DownloadError::Validation {
            field: "trim",
            reason: format!("expected MM:SS-MM:SS, got {combined:?}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with_trim(start: &str, end: &str) -> FormState {
        FormState {
            source_url: "https://music.yandex.ru/track/12345678".to_string(),
            trim_start: start.to_string(),
            trim_end: end.to_string(),
            ..FormState::default()
        }
    }

    #[test]
    fn well_formed_trim_passes() {
        let request = build_request(&form_with_trim("00:15", "00:30")).unwrap();
        assert_eq!(request.trim.as_deref(), Some("00:15-00:30"));
    }

    #[test]
    fn malformed_trim_fails_before_network() {
        for (start, end) in [("15", "30"), ("0:15", "00:3")] {
            let err = build_request(&form_with_trim(start, end)).unwrap_err();
            assert!(
                matches!(err, DownloadError::Validation { field: "trim", .. }),
                "{start}-{end} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn empty_trim_is_no_trim() {
        let request = build_request(&form_with_trim("", "")).unwrap();
        assert_eq!(request.trim, None);
    }

    #[test]
    fn single_trim_endpoint_is_treated_as_absent() {
        let request = build_request(&form_with_trim("00:15", "")).unwrap();
        assert_eq!(request.trim, None);
    }

    #[test]
    fn invalid_url_is_a_validation_error() {
        let form = FormState {
            source_url: "not a url".to_string(),
            ..FormState::default()
        };
        let err = build_request(&form).unwrap_err();
        assert!(matches!(err, DownloadError::Validation { field: "url", .. }));
    }

    #[test]
    fn volume_parses_clamps_and_defaults() {
        let mut form = form_with_trim("", "");
        form.volume = "1.5".to_string();
        assert_eq!(build_request(&form).unwrap().volume, 1.5);

        form.volume = "9".to_string();
        assert_eq!(build_request(&form).unwrap().volume, VOLUME_MAX);

        form.volume = String::new();
        assert_eq!(build_request(&form).unwrap().volume, 1.0);

        form.volume = "loud".to_string();
        let err = build_request(&form).unwrap_err();
        assert!(matches!(
            err,
            DownloadError::Validation { field: "volume", .. }
        ));
    }

    #[test]
    fn empty_cookies_mean_anonymous() {
        let request = build_request(&form_with_trim("", "")).unwrap();
        assert_eq!(request.credential, None);
    }

    #[test]
    fn rutube_tab_selects_video_schema() {
        let form = FormState {
            provider: Provider::Rutube,
            source_url: "https://rutube.ru/video/abc/".to_string(),
            ..FormState::default()
        };
        let request = build_request(&form).unwrap();
        assert_eq!(request.format, OutputFormat::Mp4);
        assert_eq!(request.quality, Quality::Resolution(Resolution::P720));
    }
}
