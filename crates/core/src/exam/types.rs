use std::collections::HashMap;
use std::path::PathBuf;

use crate::macros::MacroTable;
use crate::quota::QuotaSpec;

/// Default accepted distance from the target difficulty.
pub const DEFAULT_TOLERANCE: f64 = 0.5;

/// Default attempt budget of the tolerance search.
pub const DEFAULT_TRIES: usize = 1000;

/// An exam index: what to draw and how to render it.
#[derive(Debug, Clone)]
pub struct ExamSpec {
    /// The index file this spec was read from.
    pub index: PathBuf,
    /// Target summed difficulty.
    pub difficulty: f64,
    pub tolerance: Option<f64>,
    pub tries: Option<usize>,
    pub seed: Option<u64>,
    /// Bank directory as written in the index, relative to the index file.
    pub bank: Option<PathBuf>,
    /// Output file names as written (`description.md`, ...).
    pub files: Vec<String>,
    /// Channel ids, the stems of `files`, in the same order.
    pub channels: Vec<String>,
    /// `begin_<id>` text per channel, empty when absent.
    pub headers: Vec<String>,
    /// `end_<id>` text per channel, empty when absent.
    pub footers: Vec<String>,
    pub macros: MacroTable,
    /// Remaining scalar fields, visible to headers and footers.
    pub metadata: HashMap<String, String>,
    pub parts: QuotaSpec,
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub bank: Option<PathBuf>,
    pub seed: Option<u64>,
    pub tries: Option<usize>,
    pub tolerance: Option<f64>,
}

/// Fully resolved run parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bank: PathBuf,
    pub seed: u64,
    pub tries: usize,
    pub tolerance: f64,
}
