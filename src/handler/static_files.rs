//! Static file serving module
//!
//! Files under the assets prefix are served straight from the assets
//! directory. Any other path is looked up under the static root and, when
//! no regular file matches, answered with the root index document so the
//! single-page application can route on the client.

use crate::config::StaticConfig;
use crate::http::{self, cache, mime, CachePolicy};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::IF_NONE_MATCH;
use hyper::{Method, Request, Response};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Hashed build assets rarely change under the same name
const ASSET_MAX_AGE: u32 = 86_400;

/// What the static handler needs from a request
#[derive(Debug, Clone)]
pub struct StaticRequest {
    pub path: String,
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

impl StaticRequest {
    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self {
            path: req.uri().path().to_string(),
            is_head: req.method() == Method::HEAD,
            if_none_match: req
                .headers()
                .get(IF_NONE_MATCH)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string),
        }
    }
}

/// Serve an asset, a file under the root, or the index document
pub async fn serve(ctx: &StaticRequest, config: &StaticConfig) -> Response<Full<Bytes>> {
    let root = Path::new(&config.root);

    let Some(path) = decode_path(&ctx.path) else {
        return serve_index(ctx, config).await;
    };

    if let Some(relative) = strip_assets_prefix(&path, &config.assets_prefix) {
        let assets_dir = root.join(&config.assets_dir);
        return match resolve_file(&assets_dir, relative).await {
            Some(file) => serve_file(ctx, &file, CachePolicy::Public(ASSET_MAX_AGE)).await,
            None => http::build_404_response(),
        };
    }

    match resolve_file(root, &path).await {
        Some(file) => serve_file(ctx, &file, CachePolicy::default()).await,
        None => serve_index(ctx, config).await,
    }
}

async fn serve_index(ctx: &StaticRequest, config: &StaticConfig) -> Response<Full<Bytes>> {
    let index = Path::new(&config.root).join(&config.index_file);
    match fs::metadata(&index).await {
        Ok(meta) if meta.is_file() => serve_file(ctx, &index, CachePolicy::NoCache).await,
        _ => {
            logger::log_warning(&format!(
                "Index document not found: {}",
                index.display()
            ));
            http::build_404_response()
        }
    }
}

async fn serve_file(ctx: &StaticRequest, file: &Path, policy: CachePolicy) -> Response<Full<Bytes>> {
    let data = match fs::read(file).await {
        Ok(data) => data,
        Err(e) => {
            logger::log_error(&format!("Failed to read file '{}': {e}", file.display()));
            return http::build_404_response();
        }
    };

    let etag = cache::generate_etag(&data);
    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return http::build_not_modified_response(&etag, policy);
    }

    http::build_file_response(
        Bytes::from(data),
        mime::content_type_for(file),
        &etag,
        policy,
        ctx.is_head,
    )
}

/// Remainder of `path` below `prefix`, matching whole segments only
fn strip_assets_prefix<'p>(path: &'p str, prefix: &str) -> Option<&'p str> {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return None;
    }
    let rest = path.strip_prefix(prefix)?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}

/// Map a request path onto a regular file inside `base`
///
/// Returns `None` for directories, missing files and anything that would
/// resolve outside `base`.
async fn resolve_file(base: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = Path::new(request_path.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        logger::log_warning(&format!("Path traversal attempt blocked: {request_path}"));
        return None;
    }

    let candidate = base.join(relative);
    let meta = fs::metadata(&candidate).await.ok()?;
    if !meta.is_file() {
        return None;
    }

    // Symlinks may still point outside the root
    let base_canonical = fs::canonicalize(base).await.ok()?;
    let canonical = fs::canonicalize(&candidate).await.ok()?;
    if !canonical.starts_with(&base_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {request_path} -> {}",
            canonical.display()
        ));
        return None;
    }
    Some(canonical)
}

/// Percent-decode a URI path; `None` for malformed escapes or non-UTF-8
fn decode_path(path: &str) -> Option<String> {
    let bytes = path.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = path.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}
