use thiserror::Error;
use url::Url;

/// Reasons a URL is refused before it is handed to the browser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
}

/// Check that `url_str` is an absolute http(s) URL that is safe to pass to
/// the system opener.
///
/// Schemes such as `file:` or `javascript:` would let an imported
/// bookmark launch arbitrary handlers, so only web URLs are accepted.
///
/// # Examples
///
/// ```
/// use linkhub::util::validate_url_for_open;
///
/// assert!(validate_url_for_open("https://example.com").is_ok());
/// assert!(validate_url_for_open("file:///etc/passwd").is_err());
/// ```
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
}

/// Hostname to display for a link.
///
/// Unparseable input falls back to the text between the scheme and the
/// first `/`, so hand-typed entries still show something meaningful.
pub fn display_host(url_str: &str) -> String {
    if let Some(host) = Url::parse(url_str).ok().and_then(|u| u.host_str().map(str::to_owned)) {
        return host;
    }

    let trimmed = url_str.trim();
    let rest = ["https://", "http://"]
        .iter()
        .find_map(|prefix| {
            trimmed
                .get(..prefix.len())
                .filter(|head| head.eq_ignore_ascii_case(prefix))
                .map(|_| &trimmed[prefix.len()..])
        })
        .unwrap_or(trimmed);
    rest.split('/').next().unwrap_or(rest).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_urls_accepted() {
        assert!(validate_url_for_open("https://example.com/path?q=1").is_ok());
        assert!(validate_url_for_open("http://192.168.1.1:8080").is_ok());
        assert!(validate_url_for_open("  https://padded.example  ").is_ok());
    }

    #[test]
    fn test_other_schemes_rejected() {
        assert_eq!(
            validate_url_for_open("file:///etc/passwd"),
            Err(UrlValidationError::UnsupportedScheme("file".to_string()))
        );
        assert!(validate_url_for_open("javascript:alert(1)").is_err());
        assert!(validate_url_for_open("ftp://example.com").is_err());
    }

    #[test]
    fn test_relative_rejected() {
        assert!(matches!(
            validate_url_for_open("example.com"),
            Err(UrlValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_display_host_parsed() {
        assert_eq!(display_host("https://www.example.com/a/b"), "www.example.com");
        assert_eq!(display_host("http://a:8080/"), "a");
    }

    #[test]
    fn test_display_host_fallback() {
        assert_eq!(display_host("example.com/path"), "example.com");
        assert_eq!(display_host("https:// bad host/x"), " bad host");
        assert_eq!(display_host(""), "");
    }
}
