//! Turns a time-series response and an imagery list into chart datasets.

use crate::{
    color::SeriesColor,
    matcher::{Candidate, MatcherConfig},
    model::{CoverageDatasets, Dataset, Sample},
    normalize::NormalizerConfig,
};
use log::{debug, warn};
use odin_stac::{imagery::ImageryResult, timeseries::TimeSeriesResponse};
use odin_utils::dates::{display_date, parse_timestamp, DISPLAY_DATE_FORMAT};

#[derive(Debug, Clone, PartialEq)]
pub struct AssemblerConfig {
    pub normalizer: NormalizerConfig,
    pub matcher: MatcherConfig,
    /// `chrono` format used for `Sample::display_date` and axis labels.
    pub display_format: String,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        AssemblerConfig {
            normalizer: NormalizerConfig::default(),
            matcher: MatcherConfig::default(),
            display_format: DISPLAY_DATE_FORMAT.to_string(),
        }
    }
}

impl AssemblerConfig {
    /// One dataset per well-formed attribute of `response`.
    ///
    /// Attributes with malformed values, or with a value count that differs
    /// from the timeline length, are dropped and logged. Colours follow each
    /// attribute's position in the response, so dropping one never shifts the
    /// colours of the others.
    pub fn assemble(
        &self,
        response: &TimeSeriesResponse,
        imagery: &[ImageryResult],
    ) -> Vec<Dataset> {
        if response.timeline.is_empty() || response.attributes.is_empty() {
            return Vec::new();
        }

        let candidates: Vec<Candidate> = imagery.iter().map(Candidate::from).collect();
        // Thumbnails depend only on the date, so resolve them once per index.
        let dates: Vec<(String, Option<String>)> = response
            .timeline
            .iter()
            .map(|raw| {
                let thumbnail = parse_timestamp(raw).and_then(|target| {
                    self.matcher
                        .find_nearest_to(target, candidates.iter().copied())
                });
                (display_date(raw, &self.display_format), thumbnail)
            })
            .collect();

        let mut datasets = Vec::with_capacity(response.attributes.len());
        for (ordinal, attribute) in response.attributes.iter().enumerate() {
            let Some(raw_values) = attribute.raw_values.as_ref() else {
                warn!(
                    "{}: dropping attribute {} with malformed values",
                    response.coverage_id, attribute.name
                );
                continue;
            };
            if raw_values.len() != response.timeline.len() {
                warn!(
                    "{}: dropping attribute {} with {} values for {} dates",
                    response.coverage_id,
                    attribute.name,
                    raw_values.len(),
                    response.timeline.len()
                );
                continue;
            }

            let points = response
                .timeline
                .iter()
                .zip(raw_values)
                .zip(&dates)
                .map(|((raw_date, raw_value), (display, thumbnail))| Sample {
                    raw_date: raw_date.clone(),
                    display_date: display.clone(),
                    value: self.normalizer.normalize(&attribute.name, *raw_value),
                    raw_value: *raw_value,
                    thumbnail: thumbnail.clone(),
                })
                .collect();

            datasets.push(Dataset {
                label: attribute.name.clone(),
                points,
                color_index: ordinal,
                color: SeriesColor::for_index(ordinal),
                scaled: self.normalizer.is_scaled(&attribute.name),
            });
        }
        debug!(
            "{}: assembled {} of {} attributes",
            response.coverage_id,
            datasets.len(),
            response.attributes.len()
        );
        datasets
    }

    /// `assemble` plus the coverage metadata, or `None` for an empty response.
    pub fn assemble_coverage(
        &self,
        response: &TimeSeriesResponse,
        imagery: &[ImageryResult],
    ) -> Option<CoverageDatasets> {
        if response.is_empty() {
            return None;
        }
        let datasets = self.assemble(response, imagery);
        Some(CoverageDatasets {
            coverage_id: response.coverage_id.clone(),
            timeline: response.timeline.clone(),
            labels: response
                .timeline
                .iter()
                .map(|raw| display_date(raw, &self.display_format))
                .collect(),
            coordinates: response.coordinates,
            datasets,
        })
    }
}

/// `assemble` with the default configuration.
pub fn assemble(response: &TimeSeriesResponse, imagery: &[ImageryResult]) -> Vec<Dataset> {
    AssemblerConfig::default().assemble(response, imagery)
}

/// `assemble_coverage` with the default configuration.
pub fn assemble_coverage(
    response: &TimeSeriesResponse,
    imagery: &[ImageryResult],
) -> Option<CoverageDatasets> {
    AssemblerConfig::default().assemble_coverage(response, imagery)
}
