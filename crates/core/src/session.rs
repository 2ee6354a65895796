//! Session context: the collaborators a dispatch loop or planner talks to
//! besides the model: a render sink for the UI and a catalog of datasets.
//!
//! The context is injected into constructors; nothing here is global.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Summary of a dataset currently available to the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDetails {
    /// One-line description shown to the model
    pub summary: String,

    /// Column names
    #[serde(default)]
    pub columns: Vec<String>,

    /// A few sample rows
    #[serde(default)]
    pub sample: serde_json::Value,
}

/// An entry written to the UI. The core only ever writes to the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderEntry {
    User { content: String },
    Assistant { content: String },
    Plot { title: String, spec: serde_json::Value },
    Image { source: String },
    /// A spinner-style indicator labeled with the model's reason for a tool call
    Progress { label: String },
    /// An incremental status line (e.g. one batch summary)
    Status { content: String },
}

/// The per-session collaborator interface.
pub trait SessionContext: Send + Sync {
    /// All datasets currently available, keyed by name.
    fn datasets(&self) -> BTreeMap<String, DatasetDetails>;

    /// Write an entry to the UI.
    fn render(&self, entry: RenderEntry);

    /// Name → one-line summary, pretty-printed for injection into a prompt.
    fn dataset_overview(&self) -> String {
        let overview: BTreeMap<String, String> = self
            .datasets()
            .into_iter()
            .map(|(name, details)| (name, details.summary))
            .collect();
        serde_json::to_string_pretty(&overview).unwrap_or_else(|_| "{}".into())
    }
}

/// A session with no datasets that discards every render entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSession;

impl SessionContext for NullSession {
    fn datasets(&self) -> BTreeMap<String, DatasetDetails> {
        BTreeMap::new()
    }

    fn render(&self, _entry: RenderEntry) {}
}

/// An in-memory session that records everything rendered to it.
#[derive(Debug, Default)]
pub struct MemorySession {
    datasets: Mutex<BTreeMap<String, DatasetDetails>>,
    rendered: Mutex<Vec<RenderEntry>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a dataset.
    pub fn with_dataset(self, name: impl Into<String>, details: DatasetDetails) -> Self {
        self.insert_dataset(name, details);
        self
    }

    pub fn insert_dataset(&self, name: impl Into<String>, details: DatasetDetails) {
        self.datasets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.into(), details);
    }

    /// Everything rendered so far, in order.
    pub fn rendered(&self) -> Vec<RenderEntry> {
        self.rendered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl SessionContext for MemorySession {
    fn datasets(&self) -> BTreeMap<String, DatasetDetails> {
        self.datasets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn render(&self, entry: RenderEntry) {
        self.rendered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry);
    }
}
