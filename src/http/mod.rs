//! HTTP protocol layer module
//!
//! Response builders, content types and cache validation shared by the
//! contact API and the static file handler.

pub mod cache;
pub mod mime;
pub mod response;

pub use cache::CachePolicy;
pub use response::{
    build_file_response, build_404_response, build_not_modified_response,
    build_redirect_response, json_error, no_content,
};
