//! Group reduction.
//!
//! Reduces one superob group to one output record. Each configured variable
//! is reduced by its own quality-aware method; the representative coordinates
//! (lat, lon, vertical, time offset) are always mean-reduced under the
//! type's primary quality field, independent of the per-variable filters, so
//! a single noisy variable cannot drag the group's position around.
//!
//! All per-group conditions are recovered locally: an empty filtered set
//! yields a NaN variable, degenerate weighting falls back to a plain mean,
//! and a group whose primary markers all fail simply emits no record.

use hashbrown::HashMap;

use crate::grouping::GroupKey;
use crate::models::{Extreme, Observation, Radius, ReductionMethod, SuperobRecord, TypeSpec};
use crate::projection::normalize_lon;

/// True when `marker` passes a quality threshold.
///
/// A NaN marker (unknown quality) never passes.
fn passes(marker: f64, threshold: u8) -> bool {
    marker <= f64::from(threshold)
}

/// Arithmetic mean, NaN for an empty iterator.
fn mean<I: Iterator<Item = f64>>(values: I) -> f64 {
    let (sum, count) = values.fold((0.0, 0_usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Reduce one group to a superob record.
///
/// Returns None when no member passes the primary quality filter; such a
/// group has no usable representative coordinates and is dropped without
/// aborting the pass.
///
/// # Arguments
///
/// * `observations`: The shared observation slice; read-only
/// * `members`: Indices of the group's members into `observations`
/// * `spec`: Reduction spec for the group's observation type
/// * `key`: The group's key
pub fn reduce(
    observations: &[Observation],
    members: &[usize],
    spec: &TypeSpec,
    key: &GroupKey,
) -> Option<SuperobRecord> {
    // Members passing the primary filter drive the representative coordinates.
    let primary: Vec<usize> = members
        .iter()
        .copied()
        .filter(|&index| {
            passes(
                observations[index].marker(&spec.primary_quality_field),
                spec.primary_quality_threshold,
            )
        })
        .collect();
    if primary.is_empty() {
        return None;
    }

    let coordinate = |field: fn(&Observation) -> f64| -> f64 {
        mean(
            primary
                .iter()
                .map(|&index| field(&observations[index]))
                .filter(|value| !value.is_nan()),
        )
    };
    let lat = coordinate(|ob| ob.lat);
    let lon = mean_lon(primary.iter().map(|&index| observations[index].lon));
    let vertical = coordinate(|ob| ob.vertical);
    let time_offset = coordinate(|ob| ob.time_offset);

    let mut variables = HashMap::with_capacity(spec.variables.len());
    for (name, variable_spec) in &spec.variables {
        let mut values: Vec<(f64, f64)> = Vec::with_capacity(members.len());
        for &index in members {
            let ob = &observations[index];
            let value = ob.variable(name);
            if value.is_nan()
                || !passes(
                    ob.marker(&variable_spec.quality_field),
                    variable_spec.quality_threshold,
                )
            {
                continue;
            }
            values.push((value, ob.vertical));
        }
        let reduced = if values.is_empty() {
            // Expected for sparse or low-quality groups: the variable is
            // missing in the output, never zero and never an error.
            f64::NAN
        } else {
            match variable_spec.method {
                ReductionMethod::Mean => mean(values.iter().map(|&(value, _)| value)),
                ReductionMethod::Extremal { kind: Extreme::Min } => values
                    .iter()
                    .map(|&(value, _)| value)
                    .fold(f64::NAN, f64::min),
                ReductionMethod::Extremal { kind: Extreme::Max } => values
                    .iter()
                    .map(|&(value, _)| value)
                    .fold(f64::NAN, f64::max),
                ReductionMethod::VerticalWeighted { radius } => {
                    vertical_weighted(&values, vertical, radius)
                }
            }
        };
        variables.insert(name.clone(), reduced);
    }

    // Inherited summary marker: the worst primary marker that passed.
    let worst = primary
        .iter()
        .map(|&index| observations[index].marker(&spec.primary_quality_field))
        .fold(f64::NAN, f64::max);
    let mut quality = HashMap::with_capacity(1);
    quality.insert(spec.primary_quality_field.clone(), worst);

    // Group members keep input order, so the first passing member is a
    // deterministic representative for the identity fields.
    let first = &observations[primary[0]];
    Some(SuperobRecord {
        type_code: key.type_code,
        station_id: first.station_id.clone(),
        message_id: first.message_id,
        lat,
        lon,
        vertical,
        time_offset,
        variables,
        quality,
        n_members: members.len(),
    })
}

/// Arithmetic mean of longitudes, in [-180, 180), NaN for an empty iterator.
///
/// Members may mix the [-180, 180) and [0, 360) conventions, and a group may
/// straddle the antimeridian; a raw mean of the stored values would land on
/// the far side of the earth. Each longitude is normalised and then unwrapped
/// to within half a turn of the first member before averaging.
fn mean_lon<I: Iterator<Item = f64>>(lons: I) -> f64 {
    let mut reference = f64::NAN;
    let unwrapped = lons.filter(|value| !value.is_nan()).map(|value| {
        let lon = normalize_lon(value);
        if reference.is_nan() {
            reference = lon;
        }
        if lon - reference > 180.0 {
            lon - 360.0
        } else if lon - reference < -180.0 {
            lon + 360.0
        } else {
            lon
        }
    });
    normalize_lon(mean(unwrapped))
}

/// Cressman-weighted mean in the vertical.
///
/// Two phases: all vertical distances from the representative level are
/// computed first, the effective radius is resolved (fixed, or the maximum
/// distance in the group), and only then are the weights
/// `w = (R² − d²) / (R² + d²)` applied. With a derived radius the farthest
/// member's weight is exactly zero. Members beyond a fixed radius (negative
/// weight) are skipped. Degenerate cases fall back to the plain mean.
fn vertical_weighted(values: &[(f64, f64)], level: f64, radius: Radius) -> f64 {
    if values.len() == 1 {
        return values[0].0;
    }
    let distances: Vec<f64> = values
        .iter()
        .map(|&(_, vertical)| (vertical - level).abs())
        .collect();
    let effective = match radius {
        Radius::Fixed { value } => value,
        Radius::MaxDistance => distances.iter().copied().fold(0.0, f64::max),
    };
    if effective <= 0.0 {
        // All members at the representative level.
        return mean(values.iter().map(|&(value, _)| value));
    }
    let radius_2 = effective * effective;
    let mut weight_sum = 0.0;
    let mut weighted_sum = 0.0;
    for (&(value, _), &distance) in values.iter().zip(&distances) {
        let distance_2 = distance * distance;
        let weight = (radius_2 - distance_2) / (radius_2 + distance_2);
        if weight < 0.0 {
            continue;
        }
        weight_sum += weight;
        weighted_sum += weight * value;
    }
    if weight_sum <= 0.0 {
        mean(values.iter().map(|&(value, _)| value))
    } else {
        weighted_sum / weight_sum
    }
}
