//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: routes the request, stamps the
//! `Server` header and writes the access log line.

use crate::config::AppState;
use crate::handler::{contact, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry, AccessLogFormat};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, HeaderValue, REFERER, SERVER, USER_AGENT};
use hyper::{Method, Request, Response, StatusCode, Version};
use std::convert::Infallible;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// The single API route
pub const CONTACT_PATH: &str = "/api/contact";

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    let started = Instant::now();
    let access_entry = state
        .config
        .logging
        .access_log
        .then(|| access_entry(&req, peer_addr));

    let mut response = route_request(req, peer_addr, &state).await;

    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    if let Some(mut entry) = access_entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(
            &entry,
            &AccessLogFormat::from(state.config.logging.access_log_format.as_str()),
        );
    }

    Ok(response)
}

/// API route first, everything else falls through to static files
async fn route_request<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: &AppState,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    if req.method() == Method::POST {
        let path = req.uri().path();
        if path == CONTACT_PATH {
            return contact::submit(req, peer_addr, state).await;
        }
        // A single trailing slash is redirected, method and body preserved
        if path.strip_suffix('/') == Some(CONTACT_PATH) {
            let location = match req.uri().query() {
                Some(query) => format!("{CONTACT_PATH}?{query}"),
                None => CONTACT_PATH.to_string(),
            };
            return http::build_redirect_response(StatusCode::TEMPORARY_REDIRECT, &location);
        }
    }

    let ctx = static_files::StaticRequest::from_request(&req);
    static_files::serve(&ctx, &state.config.static_files).await
}

fn access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_canonical().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
    .to_string();
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}
