//! Error handling for Stowage
//!
//! Every failure in the core is a [`StowageError`]. Each variant carries a
//! kind tag ([`ErrorKind`]) that the retry executor consults to decide what
//! happens next:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Stowage Error Taxonomy                   │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Retryable            │  Permanent          │  Terminal      │
//! │  • TemporaryFailure   │  • Validation       │  • Wrapped     │
//! │  • Transport (>= 500) │                     │  • Cancelled   │
//! │  • ConnectionReset    │  Generic            │                │
//! │  • Timeout            │  • Storage / IO     │                │
//! │                       │  • Config/Internal  │                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lookups that find nothing (an unknown operation id, a missing cache entry)
//! are not errors; they return `Option`.

pub mod constructors;
pub mod context;
pub mod conversions;
pub mod types;

pub use context::ErrorContext;
pub use types::{format_details, ErrorKind, StowageError, StowageResult};
