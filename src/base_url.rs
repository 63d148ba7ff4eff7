//! Base URL normalization.

use crate::InstallError;
use regex::Regex;
use tracing::debug;
use url::Url;

/// Path extensions that mark an entry-point script rather than a directory.
const SCRIPT_EXTENSIONS: &[&str] = &["php", "cgi", "pl", "py", "asp", "aspx", "jsp"];

/// Normalize a user-supplied base URL.
///
/// Operators often paste whatever is in their browser's address bar, so the
/// value is cleaned up before it is stored:
///
/// 1. Trailing slashes are removed
/// 2. `http://` is prepended when no `scheme://` prefix is present
/// 3. The value is parsed into scheme, host and path
/// 4. A path segment naming an entry-point script (e.g. `index.php`) is
///    dropped together with everything after it
/// 5. `scheme://host[:port]/path` is reassembled without a trailing slash
///
/// Query strings, fragments and credentials are discarded. Normalizing an
/// already normalized URL returns it unchanged.
///
/// # Example
///
/// ```rust
/// use app_installer::normalize_base_url;
///
/// let url = normalize_base_url("example.com/forum/index.php").unwrap();
/// assert_eq!(url, "http://example.com/forum");
///
/// assert_eq!(normalize_base_url("https://example.com//").unwrap(), "https://example.com");
/// assert!(normalize_base_url("http://").is_err());
/// ```
pub fn normalize_base_url(input: &str) -> Result<String, InstallError> {
    let scheme_re =
        Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*)://(.*)$").expect("Invalid scheme regex");
    let trimmed = input.trim();
    let (scheme, rest) = match scheme_re.captures(trimmed) {
        Some(caps) => (
            caps.get(1).map_or("http", |m| m.as_str()),
            caps.get(2).map_or("", |m| m.as_str()),
        ),
        None => ("http", trimmed),
    };
    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        return Err(invalid(input, "no host name".to_string()));
    }
    let absolute = format!("{}://{}", scheme, rest);

    let parsed = Url::parse(&absolute).map_err(|e| invalid(input, e.to_string()))?;
    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => return Err(invalid(input, "no host name".to_string())),
    };

    let mut segments: Vec<&str> = parsed
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    if let Some(script) = segments.iter().position(|s| is_script(s)) {
        segments.truncate(script);
    }

    let mut normalized = format!("{}://{}", parsed.scheme(), host);
    if let Some(port) = parsed.port() {
        normalized.push_str(&format!(":{}", port));
    }
    for segment in segments {
        normalized.push('/');
        normalized.push_str(segment);
    }
    let normalized = normalized.trim_end_matches('/').to_string();

    debug!(input, %normalized, "normalized base URL");
    Ok(normalized)
}

fn is_script(segment: &str) -> bool {
    segment
        .rsplit_once('.')
        .map(|(_, ext)| {
            SCRIPT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

fn invalid(input: &str, reason: String) -> InstallError {
    InstallError::InvalidBaseUrl {
        input: input.to_string(),
        reason,
        fix: "Enter the address of the site root, e.g. example.com/forum".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "example.com",
        "example.com/",
        "example.com///",
        "http://example.com/forum/",
        "https://example.com/forum/index.php",
        "example.com/forum/index.php/",
        "EXAMPLE.com:8080/sub/dir/",
        "localhost/app/public/index.php?page=2",
        "https://user:pw@example.com/forum#top",
        "example.com/my forum/",
    ];

    #[test]
    fn test_prepends_http_when_scheme_missing() {
        assert_eq!(normalize_base_url("example.com").unwrap(), "http://example.com");
        assert_eq!(
            normalize_base_url("localhost:8000/forum").unwrap(),
            "http://localhost:8000/forum"
        );
    }

    #[test]
    fn test_keeps_explicit_scheme() {
        assert_eq!(
            normalize_base_url("https://example.com/forum").unwrap(),
            "https://example.com/forum"
        );
        assert_eq!(
            normalize_base_url("HTTPS://example.com").unwrap(),
            "https://example.com"
        );
    }

    #[test]
    fn test_strips_trailing_slashes() {
        for input in ["example.com/", "example.com//", "http://example.com/forum///"] {
            let normalized = normalize_base_url(input).unwrap();
            assert!(!normalized.ends_with('/'), "{} -> {}", input, normalized);
        }
    }

    #[test]
    fn test_truncates_entry_point_script() {
        assert_eq!(
            normalize_base_url("example.com/forum/index.php").unwrap(),
            "http://example.com/forum"
        );
        assert_eq!(
            normalize_base_url("example.com/index.php").unwrap(),
            "http://example.com"
        );
        assert_eq!(
            normalize_base_url("example.com/forum/index.php/d/1-hello").unwrap(),
            "http://example.com/forum"
        );
        assert_eq!(
            normalize_base_url("example.com/cgi-bin/app.CGI").unwrap(),
            "http://example.com/cgi-bin"
        );
    }

    #[test]
    fn test_dotted_directory_is_kept() {
        assert_eq!(
            normalize_base_url("example.com/v1.2/forum").unwrap(),
            "http://example.com/v1.2/forum"
        );
    }

    #[test]
    fn test_discards_query_fragment_and_credentials() {
        assert_eq!(
            normalize_base_url("localhost/app/public/index.php?page=2").unwrap(),
            "http://localhost/app/public"
        );
        assert_eq!(
            normalize_base_url("https://user:pw@example.com/forum#top").unwrap(),
            "https://example.com/forum"
        );
    }

    #[test]
    fn test_default_port_is_dropped() {
        assert_eq!(
            normalize_base_url("http://example.com:80/forum").unwrap(),
            "http://example.com/forum"
        );
        assert_eq!(
            normalize_base_url("example.com:8080").unwrap(),
            "http://example.com:8080"
        );
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for input in SAMPLES {
            let once = normalize_base_url(input).unwrap();
            let twice = normalize_base_url(&once).unwrap();
            assert_eq!(once, twice, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_every_sample_has_scheme_and_no_trailing_slash() {
        for input in SAMPLES {
            let normalized = normalize_base_url(input).unwrap();
            assert!(normalized.contains("://"), "{}", normalized);
            assert!(!normalized.ends_with('/'), "{}", normalized);
        }
    }

    #[test]
    fn test_rejects_missing_host() {
        let err = normalize_base_url("http://").unwrap_err();
        assert!(matches!(err, InstallError::InvalidBaseUrl { .. }));
        assert!(normalize_base_url("   ").is_err());
        assert!(normalize_base_url("http://exa mple.com").is_err());
    }
}
