//! Request handler module
//!
//! `POST /api/contact` goes to the contact handler; every other request is
//! answered from the static root with SPA fallback.

pub mod client_ip;
pub mod contact;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
