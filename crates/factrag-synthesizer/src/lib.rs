//! factrag Synthesizer
//!
//! Turns model output that cites facts inline (`[f12]`, `[f3, f7]`) into
//! numbered, source-linked footnotes, and answers questions from the fact
//! store.
//!
//! # Example
//!
//! ```
//! use factrag_domain::traits::FactLookup;
//! use factrag_domain::{Fact, FactId};
//! use factrag_synthesizer::CitationResolver;
//!
//! struct OneFact;
//!
//! impl FactLookup for OneFact {
//!     type Error = std::convert::Infallible;
//!
//!     fn lookup_fact(&self, id: FactId) -> Result<Option<Fact>, Self::Error> {
//!         Ok((id.value() == 0)
//!             .then(|| Fact::new(id, "Water boils at 100C", "https://a.example", Default::default()).ok())
//!             .flatten())
//!     }
//! }
//!
//! let resolver = CitationResolver::plain().unwrap();
//! let text = resolver.resolve_text("Boiling point [f0].", &OneFact).unwrap();
//! assert_eq!(text, "Boiling point [1].\n\nSources:\n1 :: https://a.example\n");
//! ```

#![warn(missing_docs)]

mod citation;
mod config;
mod error;
mod factbot;
mod renumber;
mod retry;

pub use citation::{Citation, CitationResolver, CitationStyle, Resolved};
pub use config::SynthesizerConfig;
pub use error::SynthError;
pub use factbot::FactBot;
pub use renumber::{renumber_source_citations, NO_CITATIONS, SOURCES_HEADER};
pub use retry::run_with_retry;
