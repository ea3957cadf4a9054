// File API module entry
// JSON endpoints for reading, writing, and log relay

mod handlers;
mod response;
mod types;

pub use handlers::{handle_log, handle_read, handle_write};
pub use response::{bad_request, json_response};
