//! 4get MCP Library
//!
//! Web, image, and news search through a 4get meta-search instance, with a
//! retrying HTTP client and a TTL response cache.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use fourget_mcp::{Config, FourGetClient, SearchOptions};
//!
//! let client = FourGetClient::new(Config::from_env()?)?;
//! let page = client.web_search("rust async", SearchOptions::default()).await?;
//! if let Some(npt) = page["npt"].as_str() {
//!     let next = client.web_search("", SearchOptions::page(npt)).await?;
//! }
//! ```
//!
//! # Configuration
//! Set `FOURGET_*` environment variables; see [`config`].

pub mod backoff;
pub mod cache;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod params;
pub mod server;

// Re-export main server type
pub use server::FourGetMcpServer;

// Re-export parameter types for direct API usage
pub use server::{ImageSearchParams, NewsSearchParams, WebSearchParams};

pub use cache::TtlCache;
pub use client::{Endpoint, FourGetClient, SearchOptions};
pub use config::{Config, ConfigError};
pub use engine::SearchEngine;
pub use error::{ErrorKind, FourGetError, FourGetResult};
