//! Configuration and the injected HTTP capability

pub mod config;
pub mod fetcher;

pub use config::{DEFAULT_INSTANCE_BASE_URL, PackConfig};
pub use fetcher::{FetchRequest, FetchResponse, Fetcher, HttpFetcher};
