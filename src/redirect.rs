//! Helpers for the redirect target passed to the log-in page.

use std::collections::HashMap;

use crate::endpoints;

/// The name of the query parameter holding the page to return to after logging in.
pub const REDIRECT_PARAM: &str = "redirect";

fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    if redirect_url.contains('\\') || redirect_url.chars().any(char::is_control) {
        return false;
    }

    let path = redirect_url
        .split_once(['?', '#'])
        .map(|(path, _)| path)
        .unwrap_or(redirect_url);

    path != endpoints::LOG_IN_VIEW
}

/// Accept `raw_url` as a redirect target only if it is a path on this site.
///
/// Absolute URLs, protocol-relative URLs and the log-in page itself are rejected.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let url = raw_url.trim();

    is_safe_redirect_url(url).then(|| url.to_owned())
}

/// Read the redirect target from a query string such as `redirect=%2Ftransactions`.
///
/// A leading '?' is ignored. Returns `None` if the parameter is missing, the query cannot be
/// parsed or the target is not a safe redirect URL.
pub fn parse_redirect_query(query: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);

    let params: HashMap<String, String> = match serde_urlencoded::from_str(query) {
        Ok(params) => params,
        Err(error) => {
            tracing::warn!("Could not parse log-in query \"{query}\": {error}");
            return None;
        }
    };

    let raw_url = params.get(REDIRECT_PARAM)?;
    let redirect_url = normalize_redirect_url(raw_url);

    if redirect_url.is_none() {
        tracing::warn!("Invalid redirect URL from log-in query: {raw_url}");
    }

    redirect_url
}

#[cfg(test)]
mod tests {
    use super::{normalize_redirect_url, parse_redirect_query};

    #[test]
    fn accepts_local_paths() {
        assert_eq!(
            normalize_redirect_url("/transactions/new"),
            Some("/transactions/new".to_owned())
        );
        assert_eq!(
            normalize_redirect_url("/reports?month=3"),
            Some("/reports?month=3".to_owned())
        );
    }

    #[test]
    fn rejects_external_and_relative_urls() {
        for url in [
            "https://evil.example.com",
            "//evil.example.com",
            "transactions",
            "/\\evil.example.com",
            "",
        ] {
            assert_eq!(normalize_redirect_url(url), None, "{url} should be rejected");
        }
    }

    #[test]
    fn rejects_log_in_page() {
        assert_eq!(normalize_redirect_url("/login"), None);
        assert_eq!(normalize_redirect_url("/login?redirect=%2F"), None);
    }

    #[test]
    fn parses_redirect_from_query() {
        assert_eq!(
            parse_redirect_query("?redirect=%2Ftransactions%2Fnew&x=1"),
            Some("/transactions/new".to_owned())
        );
        assert_eq!(
            parse_redirect_query("redirect=/dashboard"),
            Some("/dashboard".to_owned())
        );
    }

    #[test]
    fn missing_or_unsafe_redirect_is_none() {
        assert_eq!(parse_redirect_query(""), None);
        assert_eq!(parse_redirect_query("other=1"), None);
        assert_eq!(
            parse_redirect_query("redirect=https%3A%2F%2Fevil.example.com"),
            None
        );
    }
}
