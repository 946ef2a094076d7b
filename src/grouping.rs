//! Observation grouping.
//!
//! Partitions an observation collection into groups sharing an observation
//! type, a grid cell and (optionally) a time bucket. Grouping is a pure
//! partition over index sets into the shared observation slice: observations
//! are never copied or mutated, every filtered in-coverage observation lands
//! in exactly one group, and the only observations dropped are those outside
//! the grid's coverage.

use hashbrown::HashMap;

use crate::grid::{CellId, GridDefinition};
use crate::models::Observation;

/// Key identifying one superob group.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GroupKey {
    /// Observation type code
    pub type_code: u16,
    /// Grid cell the group occupies
    pub cell: CellId,
    /// Time bucket index, when time bucketing is configured
    pub time_bucket: Option<i64>,
}

/// Partition observations of one type into groups.
///
/// Returns a map from group key to the member indices into `observations`.
/// Map iteration order is unspecified; reduction is order-independent so this
/// never affects output.
///
/// # Arguments
///
/// * `observations`: The shared observation slice; read-only
/// * `type_code`: Only observations with this type code are grouped
/// * `grid`: Grid definition used for cell assignment
/// * `time_bucket_hours`: Optional bucket width applied to `time_offset`
pub fn group(
    observations: &[Observation],
    type_code: u16,
    grid: &GridDefinition,
    time_bucket_hours: Option<f64>,
) -> HashMap<GroupKey, Vec<usize>> {
    let mut groups: HashMap<GroupKey, Vec<usize>> = HashMap::new();
    for (index, ob) in observations.iter().enumerate() {
        if ob.type_code != type_code {
            continue;
        }
        let Some(cell) = grid.cell_id(ob.lat, ob.lon) else {
            // Out of coverage: excluded, not an error.
            continue;
        };
        let time_bucket = match time_bucket_hours {
            Some(width) => {
                let bucket = (ob.time_offset / width).floor();
                // A NaN offset would cast to bucket 0; an unknown time has
                // no bucket, so the observation is excluded like a coverage
                // gap.
                if !bucket.is_finite() {
                    continue;
                }
                Some(bucket as i64)
            }
            None => None,
        };
        let key = GroupKey {
            type_code,
            cell,
            time_bucket,
        };
        groups.entry(key).or_default().push(index);
    }
    groups
}
