//! WordPress Redis Doctor Core Library
//!
//! This crate inspects the Redis object-cache integration of a WordPress
//! installation (PHP extensions, plugin state, drop-in, live Redis
//! round-trip, configuration constants) and repairs the two problems it can
//! fix on its own: an inactive plugin and a missing drop-in.

pub mod cache;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod host;
pub mod probe;
pub mod report;

pub use cache::{CacheConnection, CacheConnector, Endpoint, MemoryCache, RedisConnector};
pub use config::{RedisConfig, Settings};
pub use diagnostic::Diagnostic;
pub use error::{CacheError, Error, Result};
pub use host::{Host, HostLayout, WpCli, WpCliHost};
pub use probe::{Capability, CapabilityProbe, CapabilitySnapshot, PhpExtensionProbe};
pub use report::{CheckKind, CheckReport, DiagnosticReport, Finding, Reporter, Status};
