use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogHttpError {
    #[error("invalid catalog url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("catalog service returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("catalog response is missing the {header} header")]
    MissingTotal { header: &'static str },
    #[error("catalog response has a malformed {header} header: '{value}'")]
    MalformedTotal { header: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("unknown resolution policy '{0}'")]
    UnknownResolutionPolicy(String),
}
