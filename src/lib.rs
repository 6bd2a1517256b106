//! advocate-events: an event-sourced history of a tree of advocate profiles.
//!
//! The crate walks the version history of a directory of YAML profile
//! files, turns every profile change into a typed lifecycle event
//! (added, modified, removed), keeps those events in an append-only log,
//! and folds the log into point-in-time projections.
//!
//! # Quick Start
//!
//! For simple use cases, use the [`api`] module:
//!
//! ```rust,no_run
//! use advocate_events::api::{EventSource, View};
//! use advocate_events::config::Config;
//! use advocate_events::git::LocalRepository;
//! use advocate_events::store::FsStore;
//!
//! fn main() -> advocate_events::Result<()> {
//!     let jobs = EventSource::new(FsStore::new("artifacts"), Config::default());
//!     let repo = LocalRepository::open("cloud-developer-advocates")?;
//!
//!     // First run walks everything, later runs only what follows the cursor
//!     if jobs.read_cursor()?.is_none() {
//!         jobs.generate_all_events(&repo)?;
//!     } else {
//!         jobs.update_events(&repo)?;
//!     }
//!
//!     jobs.generate_projections()?;
//!     for mapping in jobs.mappings(View::Current)? {
//!         println!("{} -> {}", mapping.github_user_name, mapping.alias);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`extraction`]: profile field parsing and event building
//! - [`history`]: change classification and the commit walker
//! - [`git`]: history from a local clone
//! - [`remote`]: history from the hosting REST API
//! - [`codec`]: the tagged JSON envelope format of the event log
//! - [`projection`]: folding events into current-state and dashboard views
//! - [`store`]: artifact persistence
//! - [`api`]: the jobs tying it all together
//! - [`model`]: events and aggregates
//! - [`cli`]: command-line interface
//! - [`config`]: configuration management
//! - [`error`]: error types and handling
//!
//! # Low-Level Example
//!
//! ```rust
//! use advocate_events::projection::ProjectionEngine;
//! use advocate_events::model::CurrentAdvocate;
//!
//! let log = r#"[{"$type":3,"AdvocateEvent":{"UID":"u1","EventDate":"2020-01-01T00:00:00Z","FileName":"advocates/a.yml"}}]"#;
//! let events = advocate_events::codec::decode(log).unwrap();
//! let current = ProjectionEngine::fold::<CurrentAdvocate>(&events);
//! assert!(current.items.is_empty());
//! assert_eq!(current.diagnostics.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod api;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod extraction;
pub mod git;
pub mod history;
pub mod model;
pub mod projection;
pub mod remote;
pub mod store;
pub mod util;

// Re-export commonly used types at the crate root
pub use error::{AdvocateError, Result};
pub use model::{AdvocateEvent, EventKind};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::api::{EventSource, View};
    pub use crate::error::{AdvocateError, Result};
    pub use crate::history::{CommitWalker, Cursor, HistorySource};
    pub use crate::model::{
        AdvocateEvent, AdvocateMapping, CurrentAdvocate, DashboardAdvocate, EventKind,
    };
    pub use crate::projection::{Projection, ProjectionEngine};
    pub use crate::store::{ContentStore, FsStore, MemoryStore};
}
