use thiserror::Error;

/// Failure of a single remote control call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("remote returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{0}")]
    Rejected(String),
}

/// Failure to build a control handle for a region.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid region '{0}'")]
    InvalidRegion(String),

    #[error("credentials unavailable for region '{region}': environment variable {var} is not set")]
    MissingCredentials { region: String, var: String },

    #[error("invalid endpoint url '{url}' for region '{region}'")]
    InvalidUrl { region: String, url: String },

    #[error("failed to build client for region '{region}': {source}")]
    Client {
        region: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("region '{0}' is unavailable")]
    Unavailable(String),
}
