use actix_web::{web, HttpRequest, HttpResponse};
use awc::Client;
use log::{info, warn};

use crate::error::DispatchError;
use crate::pool::Pool;

pub struct Dispatcher {
    pool: Pool,
}

impl Dispatcher {
    pub fn new(pool: Pool) -> Dispatcher {
        Dispatcher { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Hands the request to the next live target. There is no retry: whatever
    /// the chosen target answers, including an upstream error, is the answer.
    pub async fn serve(
        &self,
        client: &Client,
        req: &HttpRequest,
        payload: web::Payload,
    ) -> Result<HttpResponse, DispatchError> {
        let target = match self.pool.get_next_available() {
            Some(target) => target,
            None => {
                warn!("no backend available for {} {}", req.method(), req.uri());
                return Err(DispatchError::NoAvailableTarget);
            }
        };

        info!("forwarding request to address {:?}", target.address());
        Ok(target.forward(client, req, payload).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::tests::pool_of;
    use actix_web::body::to_bytes;
    use actix_web::test::TestRequest;
    use actix_web::FromRequest;

    async fn body_of(dispatcher: &Dispatcher) -> Result<String, DispatchError> {
        let (req, mut payload) = TestRequest::get().uri("/").to_http_parts();
        let payload = web::Payload::from_request(&req, &mut payload).await.unwrap();
        let resp = dispatcher.serve(&Client::default(), &req, payload).await?;
        let body = to_bytes(resp.into_body()).await.unwrap();
        Ok(String::from_utf8(body.to_vec()).unwrap())
    }

    #[actix_rt::test]
    async fn serves_targets_in_rotation_skipping_dead() {
        let dispatcher = Dispatcher::new(pool_of(&[("A", true), ("B", true), ("C", false)]));
        let mut picked = vec![];
        for _ in 0..4 {
            picked.push(body_of(&dispatcher).await.unwrap());
        }
        assert_eq!(picked, ["A", "B", "A", "B"]);
    }

    #[actix_rt::test]
    async fn fully_down_pool_is_unavailable() {
        let dispatcher = Dispatcher::new(pool_of(&[("A", false), ("B", false)]));
        assert!(matches!(
            body_of(&dispatcher).await,
            Err(DispatchError::NoAvailableTarget)
        ));
    }
}
