use std::time::Duration;

use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer};
use awc::Client;
use log::info;

use crate::config::Configs;
use crate::dispatcher::Dispatcher;
use crate::error::DispatchError;

pub async fn forward(
    req: HttpRequest,
    payload: web::Payload,
    dispatcher: web::Data<Dispatcher>,
    client: web::Data<Client>,
) -> Result<HttpResponse, DispatchError> {
    dispatcher.serve(&client, &req, payload).await
}

pub fn create_client(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).finish()
}

pub async fn proxy(configs: Configs, dispatcher: Dispatcher) -> std::io::Result<()> {
    let proxy_addr = configs.load_balancer.host.clone();
    let proxy_port = configs.load_balancer.port;
    let timeout = configs.timeout();
    let dispatcher = web::Data::new(dispatcher);

    info!("serving requests at '{}:{}'", proxy_addr, proxy_port);
    HttpServer::new(move || {
        App::new()
            .app_data(dispatcher.clone())
            .app_data(web::Data::new(create_client(timeout)))
            .wrap(middleware::Logger::default())
            .default_service(web::route().to(forward))
    })
    .bind((proxy_addr.as_str(), proxy_port))?
    .run()
    .await
}
