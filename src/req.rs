use actix_web::dev::RequestHead;
use actix_web::http::header::{HeaderMap, HeaderName, CONNECTION, HOST};
use actix_web::http::Uri;
use actix_web::HttpResponseBuilder;
use awc::{Client, ClientRequest};
use lazy_static::lazy_static;
use url::Url;

lazy_static! {
    // https://datatracker.ietf.org/doc/html/rfc7230#section-6.1
    static ref HOP_BY_HOP: Vec<HeaderName> = [
        "connection",
        "keep-alive",
        "proxy-authenticate",
        "proxy-authorization",
        "proxy-connection",
        "te",
        "trailer",
        "transfer-encoding",
        "upgrade",
    ]
    .iter()
    .map(|&name| HeaderName::from_static(name))
    .collect();
}

const X_FORWARDED_FOR: &str = "x-forwarded-for";

pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(name)
}

/// Header names listed in the `Connection` header; these only apply to the
/// current hop as well.
fn connection_tokens(headers: &HeaderMap) -> Vec<HeaderName> {
    headers
        .get_all(CONNECTION)
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect()
}

fn joining_slash(a: &str, b: &str) -> String {
    match (a.ends_with('/'), b.starts_with('/')) {
        (true, true) => format!("{}{}", a, &b[1..]),
        (false, false) => format!("{}/{}", a, b),
        _ => format!("{}{}", a, b),
    }
}

/// Builds the upstream URL for `original_url`: the base path of `base` is
/// joined with the request path and both queries are kept.
pub fn create_forward_url(original_url: &Uri, base: &Url) -> Url {
    let mut new_url = base.clone();
    new_url.set_path(&joining_slash(base.path(), original_url.path()));

    let query = [base.query(), original_url.query()]
        .iter()
        .flatten()
        .filter(|query| !query.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("&");
    new_url.set_query(if query.is_empty() { None } else { Some(query.as_str()) });
    new_url.set_fragment(None);
    new_url
}

pub fn create_forwarded_req(client: &Client, head: &RequestHead, new_url: &Url) -> ClientRequest {
    let mut forwarded_req = client.request_from(new_url.as_str(), head).no_decompress();

    let headers = forwarded_req.headers_mut();
    // awc fills in the upstream authority when no Host header is present.
    headers.remove(HOST);
    for name in connection_tokens(&head.headers) {
        headers.remove(name);
    }
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }

    if let Some(addr) = head.peer_addr {
        let client_ip = addr.ip().to_string();
        let prior = head
            .headers
            .get_all(X_FORWARDED_FOR)
            .filter_map(|value| value.to_str().ok())
            .collect::<Vec<_>>();
        let value = if prior.is_empty() {
            client_ip
        } else {
            format!("{}, {}", prior.join(", "), client_ip)
        };
        forwarded_req.insert_header((X_FORWARDED_FOR, value))
    } else {
        forwarded_req
    }
}

/// Copies the upstream response head into `client_resp`, leaving out
/// hop-by-hop headers.
pub fn copy_response_headers(client_resp: &mut HttpResponseBuilder, upstream: &HeaderMap) {
    let tokens = connection_tokens(upstream);
    for (header_name, header_value) in upstream
        .iter()
        .filter(|(h, _)| !is_hop_by_hop(h) && !tokens.contains(h))
    {
        client_resp.append_header((header_name.clone(), header_value.clone()));
    }
}
