//! Splits an inventory table's rows into the "Regular Items" and
//! "Extra Items" sections.
//!
//! The scanner knows nothing about HTML: it walks any ordered row sequence
//! and asks a classifier what each row is.

use std::ops::Range;

use clap::ValueEnum;

pub const REGULAR_LABEL: &str = "Regular Items:";
pub const EXTRA_LABEL: &str = "Extra Items:";

/// Rows between a section label and its first data row, label included.
const LABEL_SKIP: usize = 2;
/// Column headers between two sections in fixed-offset mode.
const FIXED_SECTION_GAP: usize = 2;
const FIXED_FIRST_DATA_ROW: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    /// A parseable item row.
    Data,
    /// A single-cell row; carries its normalized text.
    Label(String),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Traversal {
    /// Seek each section by its label row.
    #[default]
    LabelSearch,
    /// Assume regular items start at row 3 and extra items two rows after
    /// the regular run. Deprecated: nothing checks the skipped rows.
    FixedOffset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpans {
    pub regular: Range<usize>,
    pub extra: Range<usize>,
}

pub fn find_sections<R>(
    rows: &[R],
    classify: impl Fn(&R) -> RowKind,
    traversal: Traversal,
) -> SectionSpans {
    match traversal {
        Traversal::LabelSearch => {
            let start = seek_label(rows, &classify, 0, REGULAR_LABEL) + LABEL_SKIP;
            let regular = data_run(rows, &classify, start);
            let start = seek_label(rows, &classify, regular.end, EXTRA_LABEL) + LABEL_SKIP;
            let extra = data_run(rows, &classify, start);
            SectionSpans { regular, extra }
        }
        Traversal::FixedOffset => {
            let regular = data_run(rows, &classify, FIXED_FIRST_DATA_ROW);
            let extra = data_run(rows, &classify, regular.end + FIXED_SECTION_GAP);
            SectionSpans { regular, extra }
        }
    }
}

/// Index of the first label row at or after `from` reading `label`, or
/// `rows.len()` if there is none.
fn seek_label<R>(rows: &[R], classify: &impl Fn(&R) -> RowKind, from: usize, label: &str) -> usize {
    (from..rows.len())
        .find(|&i| matches!(classify(&rows[i]), RowKind::Label(ref text) if text == label))
        .unwrap_or(rows.len())
}

/// The longest run of data rows starting at `start`.
fn data_run<R>(rows: &[R], classify: &impl Fn(&R) -> RowKind, start: usize) -> Range<usize> {
    let start = start.min(rows.len());
    let mut end = start;
    while end < rows.len() && classify(&rows[end]) == RowKind::Data {
        end += 1;
    }
    start..end
}
