//! Mattermost pack - a thin adapter that exposes Mattermost's REST API to a
//! no-code host platform as formulas and sync tables.
//!
//! # Architecture
//!
//! - `core` holds the immutable [`core::PackConfig`] and the [`core::Fetcher`]
//!   capability the host injects (an authenticated HTTP client).
//! - `mattermost` holds the client, one method per operation, and the
//!   declared record schemas.
//! - `pack` declares formulas and sync tables and binds host arguments to
//!   client calls.
//!
//! Every operation is one HTTP request. Nothing is retried, cached, or paged
//! through.
//!
//! # Example
//!
//! ```no_run
//! use mattermost_pack::core::{HttpFetcher, PackConfig};
//! use mattermost_pack::mattermost::MattermostClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     mattermost_pack::setup_logging();
//!
//!     let config = PackConfig::from_env()?;
//!     let client = MattermostClient::new(config, HttpFetcher::new("user-access-token")?);
//!
//!     let channel = client.get_channel("p7ndqtybwinaib83cnj6of599e").await?;
//!     println!("{}", channel["display_name"]);
//!
//!     for team in client.list_teams(None, Some("50")).await? {
//!         println!("{} {}", team.id(), team.display_name().unwrap_or_default());
//!     }
//!
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod core;
pub mod errors;
pub mod mattermost;
pub mod pack;

/// Configure structured logging with JSON output.
///
/// Safe to call more than once; only the first call installs a subscriber.
///
/// # Example
///
/// ```
/// mattermost_pack::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
