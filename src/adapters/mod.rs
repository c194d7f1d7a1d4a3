// Adapters layer: concrete implementations for external systems (the TAJLINE HTTP API, local
// report storage).

pub mod http;
pub mod storage;

pub use http::{ApiResponse, ApiSession, LoginInfo};
pub use storage::LocalStorage;
