use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::archiver;
use crate::config::{AGGREGATE_FILE, Layout, RunConfig};
use crate::events::{Event, EventSink, SectionKind};
use crate::fetcher::{PageSource, catalog_url};
use crate::models::{Inventory, RunSummary};
use crate::parser::{self, Section};
use crate::sections::Traversal;

/// Fetches and parses one model's inventory, regular and extra items merged.
/// A page without an inventory table yields an empty inventory.
pub fn scrape_model(
    model: &str,
    base_url: &str,
    source: &impl PageSource,
    traversal: Traversal,
    sink: &mut impl EventSink,
) -> Result<Inventory> {
    let url = catalog_url(base_url, model);
    let html = source.fetch_html(&url)?;
    let parsed = parser::parse_inventory(&html, traversal)
        .with_context(|| format!("failed to parse inventory of model {model}"))?;

    let Some(parsed) = parsed else {
        sink.emit(Event::TableNotFound {
            model: model.to_string(),
        });
        return Ok(Inventory::new());
    };

    sink.emit(Event::ModelStarted {
        model: model.to_string(),
    });
    let regular = report_section(model, SectionKind::Regular, parsed.regular, sink);
    let extra = report_section(model, SectionKind::Extra, parsed.extra, sink);

    let (items, merges) = regular.merge(extra);
    sink.emit(Event::ExtraMerged {
        model: model.to_string(),
        merges,
    });
    Ok(items)
}

fn report_section(
    model: &str,
    section: SectionKind,
    parsed: Section,
    sink: &mut impl EventSink,
) -> Inventory {
    for key in parsed.duplicates {
        sink.emit(Event::DuplicateItem {
            model: model.to_string(),
            section,
            part: key.part,
            name: key.name,
        });
    }
    sink.emit(Event::SectionParsed {
        model: model.to_string(),
        section,
        parts: parsed.items.len(),
        quantity: parsed.items.total_quantity(),
    });
    parsed.items
}

/// Model identifiers end up in file and directory names, so they must not
/// be able to leave the output directory.
fn check_model_id(model: &str) -> Result<()> {
    if model.is_empty()
        || model == "."
        || model.contains("..")
        || model.contains(['/', '\\'])
        || Path::new(model).is_absolute()
    {
        bail!("invalid model identifier {model:?}");
    }
    Ok(())
}

/// Removes `path` if present and creates it empty.
fn recreate_dir(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path).with_context(|| format!("failed to remove {}", path.display()))?;
    }
    fs::create_dir_all(path).with_context(|| format!("failed to create {}", path.display()))
}

fn write_file(path: PathBuf, items: &Inventory, files: &mut Vec<PathBuf>, sink: &mut impl EventSink) -> Result<()> {
    let rows = archiver::write_items(&path, items)?;
    sink.emit(Event::FileWritten {
        path: path.clone(),
        rows,
    });
    files.push(path);
    Ok(())
}

/// Scrapes every model in order and writes the CSV files `config.layout`
/// asks for.
pub fn run(
    models: &[String],
    config: &RunConfig,
    source: &impl PageSource,
    sink: &mut impl EventSink,
) -> Result<RunSummary> {
    if models.is_empty() {
        bail!("no models given");
    }
    for model in models {
        check_model_id(model)?;
    }
    let several = models.len() > 1;

    let model_dir = match config.layout {
        Layout::Folder => {
            fs::create_dir_all(&config.out_dir)
                .with_context(|| format!("failed to create {}", config.out_dir.display()))?;
            if several {
                let dir = config.out_dir.join(models.join("_"));
                recreate_dir(&dir)?;
                dir
            } else {
                config.out_dir.clone()
            }
        }
        Layout::Combined => config.out_dir.clone(),
    };

    let mut all_items = Inventory::new();
    let mut total_merges = 0;
    let mut files = Vec::new();

    for model in models {
        let items = scrape_model(model, &config.fetch.base_url, source, config.traversal, sink)?;
        if config.layout.per_model_files() {
            write_file(model_dir.join(format!("{model}.csv")), &items, &mut files, sink)?;
        }
        let (merged, merges) = all_items.merge(items);
        all_items = merged;
        total_merges += merges;
    }

    sink.emit(Event::RunTotals {
        parts: all_items.len(),
        quantity: all_items.total_quantity(),
        merges: several.then_some(total_merges),
    });

    if config.layout.aggregate_file(models.len()) {
        let path = match config.layout {
            Layout::Folder => model_dir.join(AGGREGATE_FILE),
            Layout::Combined => config.combined_file.clone(),
        };
        write_file(path, &all_items, &mut files, sink)?;
    }

    Ok(RunSummary {
        models: models.to_vec(),
        parts: all_items.len(),
        quantity: all_items.total_quantity(),
        merges: total_merges,
        files,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
