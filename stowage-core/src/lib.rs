//! Resilient chunked content persistence
//!
//! Content larger than a safe single-write size is split into ordered chunks,
//! each chunk is written under retry/backoff protection, completion is
//! tracked per operation, and the chunks are merged back into the final
//! artifact once all of them have landed.
//!
//! ```no_run
//! use std::sync::Arc;
//! use stowage_core::caching::MemoryContentCache;
//! use stowage_core::config::StowageConfig;
//! use stowage_core::orchestrator::ChunkedWriter;
//!
//! # async fn demo() -> stowage_core::error::StowageResult<()> {
//! let store = Arc::new(MemoryContentCache::new());
//! let writer = ChunkedWriter::new(store, &StowageConfig::default());
//! let outcome = writer.write_content("reports/weekly.md", vec![b'x'; 120_000]).await?;
//! assert_eq!(outcome.chunk_results().len(), 3);
//! # Ok(())
//! # }
//! ```

pub mod caching;
pub mod config;
pub mod content;
pub mod error;
pub mod observability;
pub mod orchestrator;
pub mod patterns;
pub mod storage;
pub mod types;

pub use error::{StowageError, StowageResult};
