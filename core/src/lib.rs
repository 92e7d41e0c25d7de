//! Blocking client for the Dixa integrations REST API.
//!
//! # Overview
//! `DixaClient` exposes one method per remote operation (users,
//! anonymization requests, tags, queues, endpoints, conversations). Each
//! method issues exactly one HTTP request and returns the response body as
//! `serde_json::Value`, or an `ApiError` classified from the status code.
//!
//! # Design
//! - Every operation has a pure `build_*` counterpart producing an
//!   `HttpRequest`, so request construction is testable without I/O.
//! - The network sits behind the `Transport` trait; `UreqTransport` is the
//!   default and the only place that logs.
//! - `ClientConfig` is immutable and the client keeps no per-call state,
//!   so concurrent calls on one client are independent.
//! - No retries, caching or pagination: a failed call fails once.
//!
//! ```no_run
//! use dixa_core::DixaClient;
//!
//! let client = DixaClient::new("my-api-token");
//! let users = client.list_users()?;
//! println!("{users}");
//! # Ok::<(), dixa_core::ApiError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::DixaClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{classify, ApiError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use transport::UreqTransport;
pub use types::{CreateUser, ScheduleAnonymization};
