use percent_encoding::percent_decode_str;
use regex::Regex;

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Extract the quoted `filename` parameter from a disposition header value
/// and percent-decode it.
pub fn filename_from_disposition(value: &str) -> Option<String> {
    let re = Regex::new(r#"filename="([^"]+)""#).ok()?;
    let raw = re.captures(value)?.get(1)?.as_str();
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;
    let decoded = decoded.trim();
    (!decoded.is_empty()).then(|| decoded.to_string())
}
