//! factrag Domain Layer
//!
//! This crate contains the domain model shared by every other factrag crate.
//! It depends only on `chrono` and defines the value types and the trait
//! interfaces for the external collaborators (LLM, embeddings, crawler,
//! search) that infrastructure crates implement.
//!
//! ## Key Concepts
//!
//! - **Fact**: an atomic, sourced textual claim with an immutable sequential ID
//! - **CacheEntry**: access-tracking metadata for one fetched URI
//! - **Citation reference**: `[f12]` / `[f3, f7]` markers inside generated prose
//!
//! ## Architecture
//!
//! - No I/O, no network
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod fact;
pub mod message;
pub mod search;
pub mod traits;

// Re-exports for convenience
pub use cache::CacheEntry;
pub use fact::{Fact, FactId};
pub use message::{ChatMessage, Role};
pub use search::SearchHit;
pub use traits::FetchedContent;
