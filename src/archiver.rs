use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::{Inventory, RunSummary};

/// Writes `items` as header-less, CRLF-terminated CSV rows ordered by name.
/// Returns the number of rows written.
pub fn write_items_to<W: Write>(writer: W, items: &Inventory) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);
    let sorted = items.sorted();
    for item in &sorted {
        wtr.serialize(item)?;
    }
    wtr.flush()?;
    Ok(sorted.len())
}

pub fn write_items(path: &Path, items: &Inventory) -> Result<usize> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_items_to(file, items).with_context(|| format!("failed to write {}", path.display()))
}

pub fn save_summary(summary: &RunSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    let mut file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Item;

    fn item(quantity: u32, part: &str, name: &str) -> Item {
        Item::new(quantity, "//img.bricklink.com/P/x.jpg", part.to_string(), name.to_string())
    }

    #[test]
    fn rows_are_sorted_by_name() {
        let inv: Inventory = [item(1, "1", "Zed"), item(2, "2", "Apple"), item(3, "3", "Mango")]
            .into_iter()
            .collect();
        let mut out = Vec::new();
        assert_eq!(write_items_to(&mut out, &inv).unwrap(), 3);

        let text = String::from_utf8(out).unwrap();
        let names: Vec<&str> = text
            .lines()
            .map(|line| line.rsplit(',').next().unwrap())
            .collect();
        assert_eq!(names, ["Apple", "Mango", "Zed"]);
    }

    #[test]
    fn row_layout_matches_spreadsheet_import() {
        let inv: Inventory = [item(12, "3001", "Brick 2 x 4")].into_iter().collect();
        let mut out = Vec::new();
        write_items_to(&mut out, &inv).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "12,\"=IMAGE(\"\"//img.bricklink.com/P/x.jpg\"\")\",3001,Brick 2 x 4\r\n"
        );
    }

    #[test]
    fn every_file_row_ends_in_crlf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.csv");
        let inv: Inventory = [item(1, "1", "Apple"), item(2, "2", "Mango")].into_iter().collect();
        write_items(&path, &inv).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("\r\n").count(), 2);
        assert_eq!(text.matches('\n').count(), 2);
        assert!(text.ends_with("Mango\r\n"));
    }

    #[test]
    fn non_ascii_names_survive() {
        let inv: Inventory = [item(1, "973", "Torso Señor")].into_iter().collect();
        let mut out = Vec::new();
        write_items_to(&mut out, &inv).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Torso Señor"));
    }

    #[test]
    fn empty_inventory_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        assert_eq!(write_items(&path, &Inventory::new()).unwrap(), 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("items.csv");
        assert!(write_items(&path, &Inventory::new()).is_err());
    }

    #[test]
    fn summary_is_saved_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let summary = RunSummary {
            models: vec!["6020".into()],
            parts: 3,
            quantity: 7,
            merges: 0,
            files: vec![dir.path().join("6020.csv")],
            timestamp: "2026-01-01T00:00:00+00:00".into(),
        };
        save_summary(&summary, &path).unwrap();
        let loaded: RunSummary = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.models, ["6020"]);
        assert_eq!(loaded.quantity, 7);
    }
}
