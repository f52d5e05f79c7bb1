//! HTTP surface of the Safe staging service.

pub mod routes;

pub use routes::{router, ApiError};
