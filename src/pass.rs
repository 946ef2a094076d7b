//! Pass controller.
//!
//! Drives one reduction pass: validates the configuration up front, then for
//! each configured observation type groups the observations and reduces each
//! group, reassembling all output records into one collection.
//!
//! Types are processed independently against the same immutable observation
//! slice; each iteration builds fresh index sets, so filtering for one type
//! can never leak into another's grouping. Groups are provably disjoint and
//! the specs and grid are read-only, so per-group reduction runs in parallel
//! with no locking.

use rayon::prelude::*;
use tracing::{event, Level};

use crate::error::ObReduceError;
use crate::grid::GridDefinition;
use crate::grouping::{self, GroupKey};
use crate::models::{Observation, PassConfig, SuperobRecord};
use crate::reduction;

/// Run one reduction pass.
///
/// Returns the superob records for all configured types, sorted by
/// (type, cell, time bucket) so parallel and sequential runs produce
/// identical output.
///
/// Configuration errors fail the whole pass before any grouping work;
/// per-group conditions never abort it.
///
/// # Arguments
///
/// * `observations`: All observations for the pass, already in memory
/// * `config`: Validated-on-entry pass configuration
/// * `grid`: Grid definition shared read-only across all workers
pub fn run_pass(
    observations: &[Observation],
    config: &PassConfig,
    grid: &GridDefinition,
) -> Result<Vec<SuperobRecord>, ObReduceError> {
    config.validate_against(observations)?;

    let mut records = Vec::new();
    for (&type_code, spec) in &config.types {
        let groups = grouping::group(observations, type_code, grid, config.time_bucket_hours);
        let mut entries: Vec<(GroupKey, Vec<usize>)> = groups.into_iter().collect();
        entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
        event!(
            Level::INFO,
            type_code,
            groups = entries.len(),
            "reducing groups"
        );
        let reduced: Vec<SuperobRecord> = entries
            .par_iter()
            .filter_map(|(key, members)| reduction::reduce(observations, members, spec, key))
            .collect();
        event!(
            Level::DEBUG,
            type_code,
            records = reduced.len(),
            "type complete"
        );
        records.extend(reduced);
    }
    Ok(records)
}
