use crate::error::ShortenerError;

const DEFAULT_SCHEME: &str = "https://";
const ACCEPTED_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Normalizes a user supplied URL before it is stored or compared.
///
/// Blank input is rejected. Anything else is kept byte for byte, so
/// `"example.com "` and `"example.com"` stay distinct links. A URL that does
/// not start with `http://` or `https://` gets `https://` prepended. The
/// prefix check is case-sensitive, so `HTTP://x` becomes `https://HTTP://x`.
pub fn normalize_url(url: &str) -> Result<String, ShortenerError> {
    if url.trim().is_empty() {
        return Err(ShortenerError::InvalidInput(
            "URL is required".to_string(),
        ));
    }

    if ACCEPTED_SCHEMES
        .iter()
        .any(|scheme| url.starts_with(scheme))
    {
        Ok(url.to_string())
    } else {
        Ok(format!("{DEFAULT_SCHEME}{url}"))
    }
}
