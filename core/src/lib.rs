//! Async client core for a management REST API.
//!
//! # Overview
//! Each manager wraps one resource family: `ResourceServersManager` offers
//! CRUD over `/resource-servers/:id`, `StatsManager` two read-only queries
//! over `/stats/:type`. A manager validates its `ManagerOptions` once, binds
//! a path template to an injected `Transport`, and turns every method call
//! into exactly one HTTP request.
//!
//! # Design
//! - No caching, retries or local state between calls; errors from the
//!   transport reach the caller unchanged.
//! - Requests are built and responses parsed as plain data (`HttpRequest`,
//!   `HttpResponse`), so the network stays behind the `Transport` trait and
//!   tests can run against `testing::RecordingTransport`.
//! - Methods are `async`. Callback-style callers go through
//!   `completion::deliver`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod completion;
pub mod config;
pub mod error;
pub mod http;
pub mod resource_servers;
pub mod rest;
pub mod stats;
pub mod testing;
pub mod transport;
pub mod types;

pub use config::ManagerOptions;
pub use error::{ApiError, ConfigError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use resource_servers::ResourceServersManager;
pub use rest::{Params, PathTemplate, QueryOptions, RestClient, RestOptions};
pub use stats::StatsManager;
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{
    CreateResourceServer, DailyStats, DailyStatsParams, ResourceServer, ResourceServerScope,
    UpdateResourceServer,
};
