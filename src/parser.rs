use std::ops::Range;

use anyhow::{Context, Result, anyhow};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::models::{Inventory, Item, ItemKey};
use crate::sections::{self, RowKind, Traversal};

pub const ITEMS_HEADER: [&str; 5] = ["Image", "Qty", "Item No", "Description", "MID"];
const ITEM_COLUMNS: usize = ITEMS_HEADER.len();
/// Zebra shading of item rows.
const PART_ROW_COLORS: [&str; 2] = ["#EEEEEE", "#FFFFFF"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("expected 5 cells, found {0}")]
    CellCount(usize),
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("invalid quantity {0:?}")]
    Quantity(String),
}

/// Items of one section, plus the keys that showed up more than once.
#[derive(Debug, Default)]
pub struct Section {
    pub items: Inventory,
    pub duplicates: Vec<ItemKey>,
}

#[derive(Debug)]
pub struct ParsedInventory {
    pub regular: Section,
    pub extra: Section,
}

struct Selectors {
    table: Selector,
    image: Selector,
    link: Selector,
    bold: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            table: selector("table.ta")?,
            image: selector("b a img")?,
            link: selector("a")?,
            bold: selector("b")?,
        })
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css:?}: {e}"))
}

/// Replaces non-breaking spaces and trims.
pub fn normalize(s: &str) -> String {
    s.replace('\u{a0}', " ").trim().to_string()
}

fn text_of(el: ElementRef<'_>) -> String {
    normalize(&el.text().collect::<String>())
}

/// Direct rows of a table, looking through the implicit row-group wrappers.
fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|el| el.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

fn cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "td")
        .collect()
}

fn row_has_strings(row: ElementRef<'_>, strings: &[&str]) -> bool {
    let cells = cells(row);
    cells.len() == strings.len() && cells.iter().zip(strings).all(|(cell, s)| text_of(*cell) == *s)
}

/// First `table.ta` whose header row reads exactly [`ITEMS_HEADER`].
fn find_items_table<'a>(doc: &'a Html, sel: &Selectors) -> Option<ElementRef<'a>> {
    doc.select(&sel.table).find(|table| {
        table_rows(*table)
            .first()
            .is_some_and(|row| row_has_strings(*row, &ITEMS_HEADER))
    })
}

fn is_part_row(row: ElementRef<'_>) -> bool {
    row.value()
        .attr("bgcolor")
        .is_some_and(|color| PART_ROW_COLORS.iter().any(|c| c.eq_ignore_ascii_case(color.trim())))
}

pub fn classify_row(row: ElementRef<'_>) -> RowKind {
    let cells = cells(row);
    if cells.len() == ITEM_COLUMNS && is_part_row(row) {
        RowKind::Data
    } else if let [only] = cells.as_slice() {
        RowKind::Label(text_of(*only))
    } else {
        RowKind::Other
    }
}

fn parse_part_row(row: ElementRef<'_>, sel: &Selectors) -> Result<Item, RowError> {
    let cells = cells(row);
    let [image, quantity, part, name, _mid] = cells.as_slice() else {
        return Err(RowError::CellCount(cells.len()));
    };

    let image = image
        .select(&sel.image)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(normalize)
        .ok_or(RowError::Missing("image"))?;
    let quantity_text = text_of(*quantity);
    let quantity = quantity_text
        .parse::<u32>()
        .map_err(|_| RowError::Quantity(quantity_text))?;
    let part = part
        .select(&sel.link)
        .next()
        .map(text_of)
        .ok_or(RowError::Missing("part link"))?;
    let name = name
        .select(&sel.bold)
        .next()
        .map(text_of)
        .ok_or(RowError::Missing("part name"))?;

    Ok(Item::new(quantity, &image, part, name))
}

fn parse_section(rows: &[ElementRef<'_>], span: Range<usize>, sel: &Selectors) -> Result<Section> {
    let mut section = Section::default();
    for i in span {
        let item = parse_part_row(rows[i], sel).with_context(|| format!("row {i}"))?;
        let key = item.key();
        if !section.items.insert_new(item) {
            section.duplicates.push(key);
        }
    }
    Ok(section)
}

/// Parses an inventory page. `Ok(None)` when the page has no items table.
pub fn parse_inventory(html: &str, traversal: Traversal) -> Result<Option<ParsedInventory>> {
    let doc = Html::parse_document(html);
    let sel = Selectors::new()?;
    let Some(table) = find_items_table(&doc, &sel) else {
        return Ok(None);
    };

    let rows = table_rows(table);
    let spans = sections::find_sections(&rows, |row| classify_row(*row), traversal);
    let regular = parse_section(&rows, spans.regular, &sel).context("regular items")?;
    let extra = parse_section(&rows, spans.extra, &sel).context("extra items")?;
    Ok(Some(ParsedInventory { regular, extra }))
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub const HEADER_ROW: &str = "<tr><td><b>Image</b></td><td><b>Qty</b></td><td><b>Item No</b></td><td><b>Description</b></td><td><b>MID</b></td></tr>";

    pub fn part_row(bgcolor: &str, quantity: &str, part: &str, name: &str) -> String {
        format!(
            "<tr bgcolor=\"{bgcolor}\">\
             <td><b><a href=\"/v2/catalog/catalogitem.page?P={part}\"><img src=\"//img.bricklink.com/P/{part}.jpg\"></a></b></td>\
             <td>&nbsp;{quantity}&nbsp;</td>\
             <td><a href=\"/v2/catalog/catalogitem.page?P={part}\">{part}</a></td>\
             <td><b>{name}</b> <font size=\"1\">Catalog: Parts</font></td>\
             <td>&nbsp;</td></tr>"
        )
    }

    pub fn label_row(label: &str) -> String {
        format!("<tr><td colspan=\"5\"><b>{label}</b></td></tr>")
    }

    /// An inventory page with the given regular and extra rows.
    pub fn page(regular: &[String], extra: &[String]) -> String {
        let mut body = String::from(HEADER_ROW);
        body.push_str(&label_row("Regular Items:"));
        body.push_str(HEADER_ROW);
        regular.iter().for_each(|row| body.push_str(row));
        if !extra.is_empty() {
            body.push_str(&label_row("Extra Items:"));
            body.push_str(HEADER_ROW);
            extra.iter().for_each(|row| body.push_str(row));
        }
        body.push_str(&label_row("Summary"));
        format!(
            "<html><body><table class=\"nav\"><tr><td>Catalog</td></tr></table>\
             <table class=\"ta\" width=\"100%\">{body}</table></body></html>"
        )
    }
}
