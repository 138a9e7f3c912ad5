//! eurofx Server
//!
//! HTTP front end of the rate cache. Requests are answered from the in-memory
//! rate store only; the store is filled in the background by the refresh
//! scheduler.

pub mod config;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use routes::{app_router, parse_path, QueryError, RateQuery};
pub use state::AppState;
