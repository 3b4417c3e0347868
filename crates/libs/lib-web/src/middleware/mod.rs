//! # Middleware
//!
//! Axum middleware applied to every route.
//!
//! - **[`mw_req_stamp`]**: request id and arrival time
//! - **[`mw_logging`]**: one log line per request and per response

// region: --- Modules
pub mod mw_logging;
pub mod mw_req_stamp;
// endregion: --- Modules

// region: --- Re-exports
pub use mw_logging::log_requests;
pub use mw_req_stamp::{stamp_req, RequestStamp, REQUEST_ID_HEADER};
// endregion: --- Re-exports
