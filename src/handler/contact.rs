//! Contact submission handler
//!
//! Parse, validate, stamp, persist, then hand off to the notifier. The
//! response never waits for the notification.

use crate::config::AppState;
use crate::contact::ContactMessage;
use crate::handler::client_ip;
use crate::http;
use crate::logger;
use chrono::Utc;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{CONTENT_LENGTH, USER_AGENT};
use hyper::{HeaderMap, Request, Response, StatusCode};
use std::error::Error;
use std::net::SocketAddr;

/// Handle `POST /api/contact`
pub async fn submit<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: &AppState,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    let max_body_size = state.config.http.max_body_size;
    if let Some(size) = declared_length(req.headers()) {
        if size > max_body_size {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            return payload_too_large();
        }
    }

    let ip = client_ip::resolve(
        req.headers(),
        peer_addr,
        state.config.http.trust_forwarded_headers,
    );
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let body = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => return payload_too_large(),
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return http::json_error(StatusCode::BAD_REQUEST, "Invalid JSON");
        }
    };

    let mut message = match ContactMessage::parse(&body) {
        Ok(message) => message,
        Err(e) => return http::json_error(StatusCode::BAD_REQUEST, &e.to_string()),
    };
    message.stamp(Utc::now(), Some(ip), user_agent.as_deref());

    if let Err(e) = state.store.append(&message).await {
        logger::log_error(&format!("Failed to save contact message: {e}"));
        return http::json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }

    logger::log_contact(&message);
    state.dispatcher.dispatch(message);

    http::no_content()
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers.get(CONTENT_LENGTH)?.to_str().ok()?.parse().ok()
}

fn payload_too_large() -> Response<Full<Bytes>> {
    http::json_error(StatusCode::PAYLOAD_TOO_LARGE, "Payload too large")
}
