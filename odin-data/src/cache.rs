//! Memoised assembly keyed on source versions.

use crate::{assembler::AssemblerConfig, model::CoverageDatasets};
use log::trace;
use odin_stac::{imagery::ImageryResult, timeseries::TimeSeriesResponse};
use std::{collections::HashMap, sync::Arc};

/// Versions of the inputs an assembled coverage was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceVersion {
    pub series: u64,
    pub imagery: u64,
}

#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<String, (SourceVersion, Option<Arc<CoverageDatasets>>)>,
    hits: u64,
    misses: u64,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembled datasets for `response`, rebuilt only when either version
    /// moved since the last call for this coverage.
    pub fn get_or_assemble(
        &mut self,
        config: &AssemblerConfig,
        response: &TimeSeriesResponse,
        imagery: &[ImageryResult],
        version: SourceVersion,
    ) -> Option<Arc<CoverageDatasets>> {
        if let Some((cached, datasets)) = self.entries.get(&response.coverage_id) {
            if *cached == version {
                self.hits += 1;
                return datasets.clone();
            }
        }
        self.misses += 1;
        trace!("assembling {} at {:?}", response.coverage_id, version);
        let datasets = config.assemble_coverage(response, imagery).map(Arc::new);
        self.entries.insert(response.coverage_id.clone(), (version, datasets.clone()));
        datasets
    }

    pub fn invalidate(&mut self, coverage_id: &str) {
        self.entries.remove(coverage_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
