use url::Url;

/// Canonicalize a URL for equality comparisons.
///
/// The result is `scheme://host[:port]/path` with:
/// - `https://` added to scheme-less and `www.` inputs
/// - the host lower-cased and a leading `www.` dropped
/// - the trailing slash stripped unless the path is exactly `/`
/// - query string and fragment removed
///
/// `http` and `https` are kept distinct. Input that cannot be parsed is
/// still canonicalized on a best-effort basis, so the function never fails.
pub fn normalize_url(raw: &str) -> String {
    let prefixed = with_scheme(raw.trim());

    match Url::parse(&prefixed) {
        Ok(url) => match url.host_str() {
            Some(host) => {
                let host = host.to_lowercase();
                let host = host.trim_start_matches("www.");
                let mut out = format!("{}://{}", url.scheme(), host);
                if let Some(port) = url.port() {
                    out.push_str(&format!(":{}", port));
                }
                out.push_str(trim_path(url.path()));
                out
            }
            None => best_effort(url.as_str()),
        },
        Err(_) => best_effort(&prefixed),
    }
}

/// Prefix `https://` when the input has no scheme at all.
fn with_scheme(url: &str) -> String {
    if url.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("www.")) {
        return format!("https://{}", url);
    }
    if url.contains("://") || has_opaque_scheme(url) {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Schemes such as `mailto:` or `javascript:` carry no `//` authority.
fn has_opaque_scheme(url: &str) -> bool {
    match url.split_once(':') {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme.chars().all(|c| c.is_ascii_alphabetic())
                && matches!(
                    scheme.to_ascii_lowercase().as_str(),
                    "mailto" | "javascript" | "tel" | "data"
                )
        }
        None => false,
    }
}

fn trim_path(path: &str) -> &str {
    if path.is_empty() {
        return "/";
    }
    if path == "/" {
        return path;
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// Cut query and fragment and drop trailing slashes from an unparseable URL.
fn best_effort(url: &str) -> String {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let base = &url[..end];
    let trimmed = base.trim_end_matches('/');
    if trimmed.ends_with(':') || trimmed.is_empty() {
        base.to_string()
    } else {
        trimmed.to_string()
    }
}
