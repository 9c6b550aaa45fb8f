//! # Core Resources
//!
//! Paginated REST access to the API's collections.
//!
//! - [`ApiTransport`] issues one JSON request per call through the platform
//!   [`HttpClient`](bridge_traits::http::HttpClient) and classifies failures
//!   as [`ResourceError`].
//! - [`ResourceClient`] implements create, get-by-id, update, delete and list
//!   for one collection and mirrors the results locally for the UI.
//! - [`PageRequest`] and [`Page`] model the `page`/`size`/`sort` query and the
//!   paged response envelope.

pub mod client;
pub mod error;
pub mod pagination;
pub mod transport;

pub use client::{BusyGuard, DeleteConfirmation, ResourceClient, ResourceId, ResourceSnapshot};
pub use error::{ResourceError, Result};
pub use pagination::{Page, PageRequest, Sort, SortDirection};
pub use transport::{AccessTokenSource, ApiTransport, Query};
