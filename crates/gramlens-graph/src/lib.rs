//! Instagram Graph API client and ingestion pipeline.
//!
//! Wraps `reqwest` with Graph-specific error handling, retry with backoff,
//! the per-media-type insight candidate fallback, bounded-concurrency batch
//! enrichment, and assembly of the full dashboard payload.

pub mod client;
pub mod dashboard;
pub mod enrich;
pub mod error;
pub mod insights;
mod retry;
pub mod types;

pub use client::GraphClient;
pub use dashboard::{build_dashboard, DashboardPayload, Demographics};
pub use enrich::{enrich_media, enrich_stories, EnrichSummary};
pub use error::GraphError;
pub use insights::fetch_media_insights;
