use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Everything that can stop the balancer from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no backend servers configured")]
    EmptyPool,
    #[error("invalid backend address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported scheme {scheme:?} in backend address {address:?}")]
    UnsupportedScheme { address: String, scheme: String },
    #[error("timeout_secs must be greater than zero")]
    ZeroTimeout,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no backend server is available")]
    NoAvailableTarget,
}

impl ResponseError for DispatchError {
    fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::NoAvailableTarget => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body("service unavailable")
    }
}
