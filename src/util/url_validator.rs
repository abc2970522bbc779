use thiserror::Error;
use url::Url;

/// Errors from checking a media URL before handing it to the system opener.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
}

/// Validates a listing-supplied URL before passing it to `open::that`.
///
/// Only `http` and `https` are accepted; anything else (`file://`,
/// `javascript:`, custom handlers) is refused.
///
/// # Examples
///
/// ```
/// use snack_tv::util::validate_url_for_open;
///
/// assert!(validate_url_for_open("https://v.redd.it/abc").is_ok());
/// assert!(validate_url_for_open("file:///etc/passwd").is_err());
/// ```
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(UrlValidationError::UnsupportedScheme(other.to_string())),
    }
}
