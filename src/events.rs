//! Progress reporting. The scraper and the run loop describe what happened as
//! [`Event`]s; the sink decides where they go.

use std::fmt;
use std::path::PathBuf;

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Regular,
    Extra,
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionKind::Regular => f.write_str("regular"),
            SectionKind::Extra => f.write_str("extra"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    TableNotFound {
        model: String,
    },
    ModelStarted {
        model: String,
    },
    DuplicateItem {
        model: String,
        section: SectionKind,
        part: String,
        name: String,
    },
    SectionParsed {
        model: String,
        section: SectionKind,
        parts: usize,
        quantity: u64,
    },
    ExtraMerged {
        model: String,
        merges: usize,
    },
    FileWritten {
        path: PathBuf,
        rows: usize,
    },
    RunTotals {
        parts: usize,
        quantity: u64,
        /// Only reported when several models were scraped.
        merges: Option<usize>,
    },
}

pub trait EventSink {
    fn emit(&mut self, event: Event);
}

/// Collects events in order.
impl EventSink for Vec<Event> {
    fn emit(&mut self, event: Event) {
        self.push(event);
    }
}

/// Renders events through `tracing`.
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, event: Event) {
        match event {
            Event::TableNotFound { model } => {
                warn!(%model, "no inventory table found, model has no items")
            }
            Event::ModelStarted { model } => info!(%model, "scraping model"),
            Event::DuplicateItem {
                model,
                section,
                part,
                name,
            } => warn!(%model, %section, %part, %name, "duplicated item"),
            Event::SectionParsed {
                model,
                section,
                parts,
                quantity,
            } => info!(%model, %section, parts, quantity, "section parsed"),
            Event::ExtraMerged { model, merges } => {
                info!(%model, merges, "extra items merged")
            }
            Event::FileWritten { path, rows } => {
                info!(path = %path.display(), rows, "wrote items")
            }
            Event::RunTotals {
                parts,
                quantity,
                merges: Some(merges),
            } => info!(parts, quantity, merges, "total items"),
            Event::RunTotals {
                parts,
                quantity,
                merges: None,
            } => info!(parts, quantity, "total items"),
        }
    }
}
