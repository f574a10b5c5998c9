use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::sections::Traversal;

pub const DEFAULT_BASE_URL: &str = "https://www.bricklink.com";
pub const DEFAULT_OUT_DIR: &str = "out";
pub const DEFAULT_COMBINED_FILE: &str = "bricklink.csv";
pub const AGGREGATE_FILE: &str = "all.csv";
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";
pub const MAX_REDIRECTS: usize = 10;

/// Where the CSV files of a run end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Layout {
    /// `<out>/<model>.csv` for one model; `<out>/<a_b_..>/` with one file per
    /// model plus `all.csv` for several.
    #[default]
    Folder,
    /// Every model summed into a single file.
    Combined,
}

impl Layout {
    pub fn per_model_files(self) -> bool {
        self == Layout::Folder
    }

    pub fn aggregate_file(self, n_models: usize) -> bool {
        match self {
            Layout::Folder => n_models > 1,
            Layout::Combined => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    pub user_agent: String,
    /// `None` leaves requests without a deadline.
    pub timeout: Option<Duration>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub layout: Layout,
    pub traversal: Traversal,
    pub out_dir: PathBuf,
    pub combined_file: PathBuf,
    pub fetch: FetchConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            traversal: Traversal::default(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            combined_file: PathBuf::from(DEFAULT_COMBINED_FILE),
            fetch: FetchConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_layout_aggregates_only_for_several_models() {
        assert!(Layout::Folder.per_model_files());
        assert!(!Layout::Folder.aggregate_file(1));
        assert!(Layout::Folder.aggregate_file(2));
    }

    #[test]
    fn combined_layout_always_writes_one_file() {
        assert!(!Layout::Combined.per_model_files());
        assert!(Layout::Combined.aggregate_file(1));
        assert!(Layout::Combined.aggregate_file(3));
    }
}
