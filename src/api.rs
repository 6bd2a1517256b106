//! High-level jobs over an artifact store.
//!
//! [`EventSource`] ties the pieces together: walk a history source into
//! events, persist the log and cursor, and fold the log into projections.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use advocate_events::api::EventSource;
//! use advocate_events::config::Config;
//! use advocate_events::git::LocalRepository;
//! use advocate_events::store::FsStore;
//!
//! fn main() -> advocate_events::Result<()> {
//!     let jobs = EventSource::new(FsStore::new("artifacts"), Config::default());
//!
//!     // Bootstrap the log from a local clone
//!     let repo = LocalRepository::open("cloud-developer-advocates")?;
//!     let report = jobs.generate_all_events(&repo)?;
//!     println!("{} events, cursor {:?}", report.events, report.cursor);
//!
//!     // Rebuild both projections
//!     for projection in jobs.generate_projections()? {
//!         println!("{}: {} advocates", projection.view, projection.items);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! Every job builds its output fully in memory before writing anything, so
//! a failing job leaves previously stored artifacts untouched.

use std::fmt;

use serde::Serialize;
use tracing::instrument;

use crate::codec;
use crate::config::Config;
use crate::error::{AdvocateError, Result};
use crate::extraction::{EventBuilder, FieldExtractor};
use crate::history::{ChangeClassifier, CommitWalker, Cursor, HistorySource, WalkStats};
use crate::model::{
    AdvocateEvent, AdvocateMapping, CurrentAdvocate, DashboardAdvocate, EventDate, EventKind,
};
use crate::projection::{mappings_from_json, Diagnostic, FoldStats, ProjectionEngine};
use crate::store::{ContentStore, JSON_MIME, TEXT_MIME};

/// Which projection a job works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Advocates currently in the tree.
    Current,
    /// Every advocate ever seen, with join and leave dates.
    Dashboard,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => write!(f, "current"),
            Self::Dashboard => write!(f, "dashboard"),
        }
    }
}

/// Outcome of a full generation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
    /// Events written to the log.
    pub events: usize,
    /// Cursor written, if the history was not empty.
    pub cursor: Option<Cursor>,
    /// Walk counters.
    pub stats: WalkStats,
}

/// Outcome of an incremental update.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    /// Cursor the walk started from.
    pub previous_cursor: Cursor,
    /// Cursor stored after the run.
    pub cursor: Cursor,
    /// Events appended.
    pub new_events: usize,
    /// Events in the log after the run.
    pub total_events: usize,
    /// Walk counters.
    pub stats: WalkStats,
}

/// Outcome of a projection job.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionReport {
    /// Projection produced.
    pub view: View,
    /// Artifact written.
    pub artifact: String,
    /// Items in the fold.
    pub items: usize,
    /// Items persisted (the dashboard may drop unpublishable rows).
    pub written: usize,
    /// Lifecycle gaps found.
    pub diagnostics: Vec<Diagnostic>,
    /// Fold counters.
    pub stats: FoldStats,
}

/// Summary of a decoded log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Envelopes decoded.
    pub events: usize,
    /// `Added` events.
    pub added: usize,
    /// `Modified` events.
    pub modified: usize,
    /// `Removed` events.
    pub removed: usize,
    /// Events whose UID is empty.
    pub without_uid: usize,
    /// Earliest event date.
    pub first_event: Option<EventDate>,
    /// Latest event date.
    pub last_event: Option<EventDate>,
    /// Stored cursor, if any.
    pub cursor: Option<Cursor>,
}

impl ValidationReport {
    /// Summarize decoded events.
    #[must_use]
    pub fn from_events(events: &[AdvocateEvent], cursor: Option<Cursor>) -> Self {
        let mut report = Self {
            events: events.len(),
            cursor,
            ..Self::default()
        };
        for event in events {
            match event.kind() {
                EventKind::Added => report.added += 1,
                EventKind::Modified => report.modified += 1,
                EventKind::Removed => report.removed += 1,
            }
            if event.uid().is_empty() {
                report.without_uid += 1;
            }
        }
        report.first_event = events.iter().map(AdvocateEvent::event_date).min();
        report.last_event = events.iter().map(AdvocateEvent::event_date).max();
        report
    }
}

/// Event-sourcing jobs over a [`ContentStore`].
#[derive(Debug)]
pub struct EventSource<S> {
    store: S,
    config: Config,
}

impl<S: ContentStore> EventSource<S> {
    /// Create the job runner.
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    /// Underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Configuration in use.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    fn walker<H: HistorySource>(&self, source: H) -> CommitWalker<H> {
        CommitWalker::new(
            source,
            ChangeClassifier::new(self.config.path_filter()),
            EventBuilder::new(FieldExtractor::new(self.config.filter.twitter_label)),
        )
    }

    /// Rebuild the event log from the whole history of `source`.
    ///
    /// Replaces any stored log. The cursor is written only when the history
    /// had at least one transition.
    #[instrument(skip_all, fields(source = %source.describe(), store = %self.store.describe()))]
    pub fn generate_all_events<H: HistorySource>(&self, source: H) -> Result<GenerateReport> {
        let outcome = self.walker(source).walk(None)?;

        let log = codec::encode(&outcome.events)?;
        self.store.write(&self.config.artifacts.events, &log, JSON_MIME)?;
        if let Some(cursor) = &outcome.cursor {
            self.write_cursor(cursor)?;
        }

        tracing::info!(events = outcome.events.len(), "Event log generated");
        Ok(GenerateReport {
            events: outcome.events.len(),
            cursor: outcome.cursor,
            stats: outcome.stats,
        })
    }

    /// Append the events after the stored cursor and advance it.
    ///
    /// Fails with [`AdvocateError::MissingCursor`] when no cursor is
    /// stored. A missing log counts as empty.
    #[instrument(skip_all, fields(source = %source.describe(), store = %self.store.describe()))]
    pub fn update_events<H: HistorySource>(&self, source: H) -> Result<UpdateReport> {
        let previous_cursor =
            self.read_cursor()?
                .ok_or_else(|| AdvocateError::MissingCursor {
                    artifact: self.config.artifacts.cursor.clone(),
                })?;
        let mut events = self.read_events_or_empty()?;

        let outcome = self.walker(source).walk(Some(&previous_cursor))?;
        let new_events = outcome.events.len();

        if new_events > 0 {
            events.extend(outcome.events);
            let log = codec::encode(&events)?;
            self.store.write(&self.config.artifacts.events, &log, JSON_MIME)?;
        }

        let cursor = outcome.cursor.unwrap_or_else(|| previous_cursor.clone());
        if cursor != previous_cursor {
            self.write_cursor(&cursor)?;
        }

        tracing::info!(
            new_events,
            total = events.len(),
            cursor = %cursor,
            "Event log updated"
        );
        Ok(UpdateReport {
            previous_cursor,
            cursor,
            new_events,
            total_events: events.len(),
            stats: outcome.stats,
        })
    }

    /// Decode the stored log.
    pub fn read_events(&self) -> Result<Vec<AdvocateEvent>> {
        codec::decode(&self.store.read(&self.config.artifacts.events)?)
    }

    fn read_events_or_empty(&self) -> Result<Vec<AdvocateEvent>> {
        match self.store.try_read(&self.config.artifacts.events)? {
            Some(text) => codec::decode(&text),
            None => Ok(Vec::new()),
        }
    }

    /// Stored cursor, if any. A blank cursor artifact counts as none.
    pub fn read_cursor(&self) -> Result<Option<Cursor>> {
        Ok(self
            .store
            .try_read(&self.config.artifacts.cursor)?
            .as_deref()
            .and_then(Cursor::parse))
    }

    fn write_cursor(&self, cursor: &Cursor) -> Result<()> {
        self.store
            .write(&self.config.artifacts.cursor, cursor.as_str(), TEXT_MIME)
    }

    /// Fold the log into the current-state projection and store it.
    #[instrument(skip_all)]
    pub fn generate_current_state(&self) -> Result<ProjectionReport> {
        let events = self.read_events()?;
        self.write_current(&events)
    }

    /// Fold the log into the dashboard projection and store it.
    #[instrument(skip_all)]
    pub fn generate_dashboard(&self) -> Result<ProjectionReport> {
        let events = self.read_events()?;
        self.write_dashboard(&events)
    }

    /// Both projections from one read of the log.
    #[instrument(skip_all)]
    pub fn generate_projections(&self) -> Result<Vec<ProjectionReport>> {
        let events = self.read_events()?;
        Ok(vec![
            self.write_current(&events)?,
            self.write_dashboard(&events)?,
        ])
    }

    fn write_current(&self, events: &[AdvocateEvent]) -> Result<ProjectionReport> {
        let projection = ProjectionEngine::fold::<CurrentAdvocate>(events);
        let artifact = self.config.artifacts.current.clone();
        self.store.write(&artifact, &projection.to_json()?, JSON_MIME)?;

        Ok(ProjectionReport {
            view: View::Current,
            artifact,
            items: projection.items.len(),
            written: projection.items.len(),
            diagnostics: projection.diagnostics,
            stats: projection.stats,
        })
    }

    fn write_dashboard(&self, events: &[AdvocateEvent]) -> Result<ProjectionReport> {
        let projection = ProjectionEngine::fold::<DashboardAdvocate>(events);
        let artifact = self.config.artifacts.dashboard.clone();
        let (json, written) = if self.config.dashboard.publishable_only {
            (projection.publishable_json()?, projection.publishable().len())
        } else {
            (projection.to_json()?, projection.items.len())
        };
        self.store.write(&artifact, &json, JSON_MIME)?;

        Ok(ProjectionReport {
            view: View::Dashboard,
            artifact,
            items: projection.items.len(),
            written,
            diagnostics: projection.diagnostics,
            stats: projection.stats,
        })
    }

    /// De-duplicated account mappings from a stored projection.
    pub fn mappings(&self, view: View) -> Result<Vec<AdvocateMapping>> {
        let artifact = match view {
            View::Current => &self.config.artifacts.current,
            View::Dashboard => &self.config.artifacts.dashboard,
        };
        mappings_from_json(&self.store.read(artifact)?)
    }

    /// Decode the stored log and summarize it without writing anything.
    #[instrument(skip_all)]
    pub fn validate_log(&self) -> Result<ValidationReport> {
        let events = self.read_events()?;
        Ok(ValidationReport::from_events(&events, self.read_cursor()?))
    }
}
