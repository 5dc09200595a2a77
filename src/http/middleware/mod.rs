//! Request middleware.

pub mod timing;

pub use timing::track_request;
