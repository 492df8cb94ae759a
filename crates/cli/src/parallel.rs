//! Parallel glyph processing utilities.

use anyhow::{Result, bail};
use log::{info, warn};
use rayon::prelude::*;

/// Result of a parallel batch operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchResult {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn ok_or_bail(&self, operation: &str) -> Result<()> {
        if self.failed > 0 {
            bail!("{operation} failed: {} succeeded, {} failed", self.succeeded, self.failed);
        }
        Ok(())
    }
}

/// Process items in parallel, keeping successful outputs in input order.
///
/// Failures are logged and counted, never returned.
pub fn process_parallel_iter<T, R, F>(
    label: &str,
    items: impl IntoIterator<Item = T>,
    op: F,
) -> (BatchResult, Vec<R>)
where
    T: Send,
    R: Send,
    F: Fn(T) -> Result<R> + Sync,
{
    let items: Vec<T> = items.into_iter().collect();
    let results: Vec<_> = items.into_par_iter().map(&op).collect();

    let mut batch = BatchResult::default();
    let mut outputs = Vec::with_capacity(results.len());
    for r in results {
        match r {
            Ok(output) => {
                batch.succeeded += 1;
                outputs.push(output);
            }
            Err(e) => {
                warn!("{e:#}");
                batch.failed += 1;
            }
        }
    }

    info!("{label}: {} succeeded, {} failed", batch.succeeded, batch.failed);
    (batch, outputs)
}
