//! Batch generation: one PNG per entry, encoded in parallel.
//!
//! Entries are independent, so they are spread over the rayon pool with no shared state
//! beyond the read-only options. A failing entry is reported in its outcome and never
//! stops the rest of the batch.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::GenerateError;
use crate::output::generate_file;
use crate::version::ErrorCorrectionLevel;

/// Default image side for batch entries, in pixels.
pub const BATCH_SIZE_PX: u32 = 256;

/// Settings shared by every entry of a batch.
#[derive(Clone, Debug)]
pub struct BatchOptions {
    /// Directory receiving `batch_<n>.png`.
    pub output_dir: PathBuf,
    pub size: u32,
    pub level: ErrorCorrectionLevel,
    /// Replace existing files instead of failing the entry.
    pub overwrite: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            size: BATCH_SIZE_PX,
            level: ErrorCorrectionLevel::Medium,
            overwrite: false,
        }
    }
}

/// Result of one batch entry.
#[derive(Debug)]
pub struct BatchOutcome {
    /// 1-based position among the processed entries.
    pub index: usize,
    pub path: PathBuf,
    pub result: Result<u64, GenerateError>,
}

/// Output path for the `index`-th entry.
pub fn batch_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("batch_{index}.png"))
}

/// Encodes every entry to its own file. Outcomes come back in entry order.
pub fn run_batch<S: AsRef<str> + Sync>(entries: &[S], options: &BatchOptions) -> Vec<BatchOutcome> {
    let outcomes: Vec<BatchOutcome> = entries
        .par_iter()
        .enumerate()
        .map(|(i, entry)| {
            let index = i + 1;
            let path = batch_path(&options.output_dir, index);
            let result = generate_file(
                entry.as_ref(),
                options.level,
                &path,
                options.size,
                options.overwrite,
            );
            if let Err(e) = &result {
                warn!(index, error = %e, "batch entry failed");
            }
            BatchOutcome { index, path, result }
        })
        .collect();

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!(total = outcomes.len(), failed, "batch finished");
    outcomes
}
