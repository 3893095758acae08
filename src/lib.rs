//! # isni-reconcile
//!
//! An [OpenRefine reconciliation service](https://reconciliation-api.github.io/specs/latest/)
//! for the ISNI SRU authority-record API.
//!
//! Provides:
//! - **Library**: async client that queries the ISNI SRU endpoint, extracts
//!   authority records from the XML response, and returns a ranked top-3
//!   candidate short-list
//! - **Server**: `isni-reconcile serve` exposes the `/reconcile` route
//!   (single queries, batched queries, service metadata, JSONP)
//!
//! ## Quick Start
//!
//! ```no_run
//! # async fn example() {
//! use isni_reconcile::IsniClient;
//!
//! let client = IsniClient::new();
//!
//! // Reconcile a name against the default search field.
//! let candidates = client.search("Mark Twain", "/isni/name").await;
//! for c in &candidates {
//!     println!("{:3} {} {}", c.score, c.name, c.id);
//! }
//! # }
//! ```
//!
//! Searching never fails: transport errors and malformed responses degrade to
//! an empty candidate list (logged via `tracing`), because the reconciliation
//! protocol gives callers no per-query error channel.

pub mod cache;
pub mod client;
pub mod error;
pub mod fields;
pub mod parse;
pub mod search;
pub mod server;
pub mod text;
pub mod types;

// Re-export key types at the crate root.
pub use client::IsniClient;
pub use error::ReconcileError;
pub use fields::{resolve_field, FieldMapping};
pub use types::Candidate;
