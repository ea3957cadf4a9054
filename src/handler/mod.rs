//! Request handler module
//!
//! Routing dispatch for the file API and the static site.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
