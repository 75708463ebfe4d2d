use std::fmt;

/// Category of a failed page fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Timeout,
    Connection,
    HttpStatus,
    Browser,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchErrorKind::Timeout => "timeout",
            FetchErrorKind::Connection => "connection",
            FetchErrorKind::HttpStatus => "http-status",
            FetchErrorKind::Browser => "browser",
        };
        f.write_str(name)
    }
}

/// Error returned by a [`crate::fetchers::Fetcher`].
///
/// These are always recoverable: the page is skipped and the batch continues.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("connection failed for {url}: {message}")]
    Connection { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("browser session failed for {url}: {message}")]
    Browser { url: String, message: String },
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Timeout { .. } => FetchErrorKind::Timeout,
            FetchError::Connection { .. } => FetchErrorKind::Connection,
            FetchError::HttpStatus { .. } => FetchErrorKind::HttpStatus,
            FetchError::Browser { .. } => FetchErrorKind::Browser,
        }
    }

    /// URL the failed fetch was made for
    pub fn url(&self) -> &str {
        match self {
            FetchError::Timeout { url }
            | FetchError::Connection { url, .. }
            | FetchError::HttpStatus { url, .. }
            | FetchError::Browser { url, .. } => url,
        }
    }
}

/// Input and configuration errors, reported before any page is scheduled
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    #[error("keyword is empty")]
    EmptyKeyword,

    #[error("invalid source url: {0:?}")]
    InvalidSourceUrl(String),

    #[error("invalid target url: {0:?}")]
    InvalidTargetUrl(String),

    #[error("no valid source urls to process")]
    NoValidSources,

    #[error("no valid keyword/target pairs to process")]
    NoValidPairs,

    #[error("input file is missing the {0:?} column")]
    MissingColumn(String),

    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to build fetcher: {0}")]
    Fetcher(String),
}

pub type Result<T> = std::result::Result<T, FinderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_kind_and_url() {
        let err = FetchError::HttpStatus {
            url: "https://example.com/".to_string(),
            status: 404,
        };
        assert_eq!(err.kind(), FetchErrorKind::HttpStatus);
        assert_eq!(err.url(), "https://example.com/");
        assert_eq!(err.to_string(), "https://example.com/ returned HTTP 404");
        assert_eq!(err.kind().to_string(), "http-status");
    }
}
