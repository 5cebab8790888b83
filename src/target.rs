//! Upstream targets.
//!
//! A [`Target`] is anything the pool can hand a request to. [`HttpTarget`] is
//! the only kind the balancer builds from its config: a single-host reverse
//! proxy to one backend base URL.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use awc::error::SendRequestError;
use awc::Client;
use futures::future::LocalBoxFuture;
use log::{debug, error, warn};
use url::Url;

use crate::error::ConfigError;
use crate::req::{copy_response_headers, create_forward_url, create_forwarded_req};

pub trait Target: Send + Sync {
    /// The backend address exactly as it was configured.
    fn address(&self) -> &str;

    fn is_alive(&self) -> bool;

    /// Relays `req` and its body to the backend. Upstream failures are
    /// turned into a 5xx response rather than returned as errors.
    fn forward<'a>(
        &'a self,
        client: &'a Client,
        req: &'a HttpRequest,
        payload: web::Payload,
    ) -> LocalBoxFuture<'a, HttpResponse>;
}

pub struct HttpTarget {
    address: String,
    url: Url,
    is_alive: AtomicBool,
}

impl HttpTarget {
    pub fn new(address: &str) -> Result<HttpTarget, ConfigError> {
        let url = Url::parse(address).map_err(|source| ConfigError::InvalidAddress {
            address: address.to_string(),
            source,
        })?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(ConfigError::UnsupportedScheme {
                    address: address.to_string(),
                    scheme: scheme.to_string(),
                })
            }
        }

        Ok(HttpTarget {
            address: address.to_string(),
            url,
            is_alive: AtomicBool::new(true),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn set_alive(&self, alive: bool) {
        self.is_alive.store(alive, Ordering::SeqCst);
    }

    async fn relay(&self, client: &Client, req: &HttpRequest, payload: web::Payload) -> HttpResponse {
        let new_url = create_forward_url(req.uri(), self.url());
        debug!("{} {} -> {}", req.method(), req.uri(), new_url);

        let forwarded_req = create_forwarded_req(client, req.head(), &new_url);
        match forwarded_req.send_stream(payload).await {
            Ok(res) => {
                let mut client_resp = HttpResponse::build(res.status());
                copy_response_headers(&mut client_resp, res.headers());
                client_resp.streaming(res)
            }
            Err(SendRequestError::Timeout) => {
                warn!("upstream {} timed out", self.address);
                HttpResponse::new(StatusCode::GATEWAY_TIMEOUT)
            }
            Err(err) => {
                error!("upstream {} failed: {}", self.address, err);
                HttpResponse::new(StatusCode::BAD_GATEWAY)
            }
        }
    }
}

impl Target for HttpTarget {
    fn address(&self) -> &str {
        &self.address
    }

    fn is_alive(&self) -> bool {
        self.is_alive.load(Ordering::SeqCst)
    }

    fn forward<'a>(
        &'a self,
        client: &'a Client,
        req: &'a HttpRequest,
        payload: web::Payload,
    ) -> LocalBoxFuture<'a, HttpResponse> {
        Box::pin(self.relay(client, req, payload))
    }
}

impl fmt::Debug for HttpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTarget")
            .field("address", &self.address)
            .field("is_alive", &self.is_alive())
            .finish()
    }
}
