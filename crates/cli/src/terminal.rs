//! Terminal session: datasets loaded from a JSON file, render entries
//! written to stderr so stdout carries only replies.

use std::collections::BTreeMap;
use std::path::Path;

use errand_core::session::{DatasetDetails, RenderEntry, SessionContext};

#[derive(Debug, Default)]
pub struct TerminalSession {
    datasets: BTreeMap<String, DatasetDetails>,
}

impl TerminalSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load datasets from a JSON object of `name -> {summary, columns, sample}`.
    pub fn with_datasets_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        let datasets: BTreeMap<String, DatasetDetails> = serde_json::from_str(&content)
            .map_err(|e| format!("Invalid datasets file {}: {e}", path.display()))?;
        tracing::info!(count = datasets.len(), "Loaded datasets");
        Ok(Self { datasets })
    }

    pub fn from_option(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        match path {
            Some(path) => Self::with_datasets_file(path),
            None => Ok(Self::new()),
        }
    }
}

impl SessionContext for TerminalSession {
    fn datasets(&self) -> BTreeMap<String, DatasetDetails> {
        self.datasets.clone()
    }

    fn render(&self, entry: RenderEntry) {
        match entry {
            // The command loop prints the conversation itself
            RenderEntry::User { .. } | RenderEntry::Assistant { .. } => {}
            RenderEntry::Progress { label } => eprintln!("  ... {label}"),
            RenderEntry::Status { content } => eprintln!("  > {content}"),
            RenderEntry::Plot { title, spec } => {
                eprintln!("  [plot] {title}");
                eprintln!("{}", serde_json::to_string_pretty(&spec).unwrap_or_default());
            }
            RenderEntry::Image { source } => eprintln!("  [image] {source}"),
        }
    }
}
