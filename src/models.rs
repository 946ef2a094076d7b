//! Data types and associated functions and methods

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::Display;
use validator::{Validate, ValidationError};

use crate::error::ObReduceError;

/// One point observation record.
///
/// `variables` maps variable names (e.g. `TOB`, `UOB`) to measured values and
/// `quality` maps marker names (e.g. `TQM`, `WQM`) to quality codes. Missing
/// values are NaN and must stay NaN through the engine; they are never
/// silently replaced by zero.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Observation {
    /// Observation (report) type code, e.g. 136 or 236
    pub type_code: u16,
    /// Station identifier
    pub station_id: String,
    /// Groups observations emitted together, e.g. one flight or profile
    pub message_id: u32,
    /// Latitude in degrees north
    pub lat: f64,
    /// Longitude in degrees east; both [-180, 180) and [0, 360) conventions
    /// are accepted and normalised before projection
    pub lon: f64,
    /// Vertical coordinate (pressure or height; the kind is fixed per type)
    pub vertical: f64,
    /// Time offset in hours relative to the reference time
    pub time_offset: f64,
    /// Measured variables by name
    #[serde(default)]
    pub variables: HashMap<String, f64>,
    /// Quality markers by name; codes range from 0 (best) to 15 (worst),
    /// NaN meaning unknown
    #[serde(default)]
    pub quality: HashMap<String, f64>,
}

impl Observation {
    /// Return the named variable's value, or NaN if absent.
    pub fn variable(&self, name: &str) -> f64 {
        self.variables.get(name).copied().unwrap_or(f64::NAN)
    }

    /// Return the named quality marker, or NaN if absent.
    pub fn marker(&self, name: &str) -> f64 {
        self.quality.get(name).copied().unwrap_or(f64::NAN)
    }
}

/// One superob: the aggregate record replacing a group of observations.
///
/// Observation-shaped so that the output can re-enter the same pipeline stage
/// as ordinary observations. Variables whose filtered set was empty are NaN.
/// `quality` carries only the inherited summary marker under the group's
/// primary quality field.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SuperobRecord {
    pub type_code: u16,
    pub station_id: String,
    pub message_id: u32,
    pub lat: f64,
    pub lon: f64,
    pub vertical: f64,
    pub time_offset: f64,
    pub variables: HashMap<String, f64>,
    pub quality: HashMap<String, f64>,
    /// Number of observations that contributed to this record
    pub n_members: usize,
}

/// Which extreme an extremal reduction keeps
#[derive(Clone, Copy, Debug, Deserialize, Display, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Extreme {
    Min,
    Max,
}

/// Weighting radius for the vertically weighted reduction
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Radius {
    /// Fixed radius, in the units of the vertical coordinate
    Fixed { value: f64 },
    /// Derive the effective radius from the maximum vertical distance in the
    /// group, so the farthest member's weight is exactly zero
    MaxDistance,
}

/// Reduction method for one variable
///
/// A closed set resolved once at configuration time; the hot path matches on
/// the variant and never dispatches on strings.
#[derive(Clone, Copy, Debug, Deserialize, Display, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "method")]
#[strum(serialize_all = "snake_case")]
pub enum ReductionMethod {
    /// Arithmetic mean of values passing the quality filter
    Mean,
    /// Cressman-weighted mean in the vertical, `w = (R² − d²) / (R² + d²)`
    VerticalWeighted { radius: Radius },
    /// Minimum or maximum of values passing the quality filter
    Extremal { kind: Extreme },
}

/// Per-variable reduction configuration
///
/// No `deny_unknown_fields` here: serde does not support it alongside the
/// flattened method enum.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[validate(schema(function = "validate_variable_spec"))]
pub struct VariableSpec {
    /// Reduction method and its parameters
    #[serde(flatten)]
    pub method: ReductionMethod,
    /// Quality marker field applied as a filter for this variable
    #[validate(length(min = 1, message = "quality_field must not be empty"))]
    pub quality_field: String,
    /// Markers greater than this value (or NaN) fail the filter
    #[validate(range(max = 15, message = "quality_threshold must be at most 15"))]
    pub quality_threshold: u8,
}

/// Validate a variable spec
fn validate_variable_spec(spec: &VariableSpec) -> Result<(), ValidationError> {
    if let ReductionMethod::VerticalWeighted {
        radius: Radius::Fixed { value },
    } = spec.method
    {
        if value <= 0.0 {
            let mut error = ValidationError::new("fixed weighting radius must be positive");
            error.add_param("radius".into(), &value);
            return Err(error);
        }
    }
    Ok(())
}

/// Reduction configuration for one observation type
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TypeSpec {
    /// Quality field used to filter the representative coordinate fields
    /// (lat, lon, vertical, time offset), independent of the per-variable
    /// filters, e.g. `TQM` for thermodynamic types and `WQM` for kinematic
    #[validate(length(min = 1, message = "primary_quality_field must not be empty"))]
    pub primary_quality_field: String,
    /// Threshold applied with the primary quality field
    #[serde(default = "default_primary_threshold")]
    #[validate(range(max = 15, message = "primary_quality_threshold must be at most 15"))]
    pub primary_quality_threshold: u8,
    /// Per-variable reduction specs by variable name
    pub variables: BTreeMap<String, VariableSpec>,
}

fn default_primary_threshold() -> u8 {
    2
}

/// Configuration for one reduction pass
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PassConfig {
    /// Per-type reduction specs; each listed type is processed independently
    pub types: BTreeMap<u16, TypeSpec>,
    /// Optional time bucket width in hours; when set, the group key gains a
    /// time bucket component
    #[serde(default)]
    pub time_bucket_hours: Option<f64>,
}

impl PassConfig {
    /// Validate the configuration's internal consistency.
    ///
    /// Fatal configuration errors surface here, before any grouping work.
    pub fn validate(&self) -> Result<(), ObReduceError> {
        for spec in self.types.values() {
            Validate::validate(spec)?;
            for variable_spec in spec.variables.values() {
                Validate::validate(variable_spec)?;
            }
        }
        if let Some(width) = self.time_bucket_hours {
            if width <= 0.0 {
                let mut error = ValidationError::new("time_bucket_hours must be positive");
                error.add_param("time_bucket_hours".into(), &width);
                return Err(error.into());
            }
        }
        Ok(())
    }

    /// Validate the configuration against the observation schema.
    ///
    /// Every configured quality field must be carried by at least one
    /// observation of the corresponding type. A mismatched field (e.g. a wind
    /// marker configured against a thermodynamic type) is a configuration
    /// error, not something to proceed past silently. Types with no
    /// observations present are skipped; there is no schema to check against.
    pub fn validate_against(&self, observations: &[Observation]) -> Result<(), ObReduceError> {
        self.validate()?;
        for (&type_code, spec) in &self.types {
            let mut fields: HashSet<&str> = HashSet::new();
            let mut seen = false;
            for ob in observations.iter().filter(|ob| ob.type_code == type_code) {
                seen = true;
                fields.extend(ob.quality.keys().map(String::as_str));
            }
            if !seen {
                continue;
            }
            let configured = std::iter::once(spec.primary_quality_field.as_str())
                .chain(spec.variables.values().map(|v| v.quality_field.as_str()));
            for field in configured {
                if !fields.contains(field) {
                    return Err(ObReduceError::UnknownQualityField {
                        type_code,
                        field: field.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[test]
    fn parse_variable_spec_mean() {
        let json = r#"{"method": "mean", "quality_field": "TQM", "quality_threshold": 2}"#;
        let spec = serde_json::from_str::<VariableSpec>(json).unwrap();
        assert_eq!(ReductionMethod::Mean, spec.method);
        assert_eq!("TQM", spec.quality_field);
        assert_eq!(2, spec.quality_threshold);
        spec.validate().unwrap()
    }

    #[test]
    fn parse_variable_spec_vertical_weighted() {
        let json = r#"{"method": "vertical_weighted", "radius": "max_distance",
                       "quality_field": "WQM", "quality_threshold": 2}"#;
        let spec = serde_json::from_str::<VariableSpec>(json).unwrap();
        assert_eq!(
            ReductionMethod::VerticalWeighted {
                radius: Radius::MaxDistance
            },
            spec.method
        );
        spec.validate().unwrap()
    }

    #[test]
    fn parse_variable_spec_fixed_radius() {
        let json = r#"{"method": "vertical_weighted", "radius": {"fixed": {"value": 250.0}},
                       "quality_field": "PQM", "quality_threshold": 3}"#;
        let spec = serde_json::from_str::<VariableSpec>(json).unwrap();
        assert_eq!(
            ReductionMethod::VerticalWeighted {
                radius: Radius::Fixed { value: 250.0 }
            },
            spec.method
        );
        spec.validate().unwrap()
    }

    #[test]
    fn parse_variable_spec_extremal() {
        let json = r#"{"method": "extremal", "kind": "max", "quality_field": "TQM",
                       "quality_threshold": 9}"#;
        let spec = serde_json::from_str::<VariableSpec>(json).unwrap();
        assert_eq!(
            ReductionMethod::Extremal { kind: Extreme::Max },
            spec.method
        );
        spec.validate().unwrap()
    }

    #[test]
    fn unknown_method_rejected() {
        let json = r#"{"method": "median", "quality_field": "TQM", "quality_threshold": 2}"#;
        let result = serde_json::from_str::<VariableSpec>(json);
        assert!(result.is_err());
    }

    #[test]
    #[should_panic(expected = "quality_threshold must be at most 15")]
    fn threshold_over_worst_rejected() {
        let json = r#"{"method": "mean", "quality_field": "TQM", "quality_threshold": 16}"#;
        let spec = serde_json::from_str::<VariableSpec>(json).unwrap();
        spec.validate().unwrap()
    }

    #[test]
    #[should_panic(expected = "fixed weighting radius must be positive")]
    fn non_positive_radius_rejected() {
        let json = r#"{"method": "vertical_weighted", "radius": {"fixed": {"value": 0.0}},
                       "quality_field": "TQM", "quality_threshold": 2}"#;
        let spec = serde_json::from_str::<VariableSpec>(json).unwrap();
        spec.validate().unwrap()
    }

    #[test]
    fn parse_pass_config() {
        let json = r#"{
            "types": {
                "136": {
                    "primary_quality_field": "TQM",
                    "variables": {
                        "TOB": {"method": "vertical_weighted", "radius": "max_distance",
                                "quality_field": "TQM", "quality_threshold": 2},
                        "QOB": {"method": "vertical_weighted", "radius": "max_distance",
                                "quality_field": "QQM", "quality_threshold": 2}
                    }
                }
            },
            "time_bucket_hours": 1.0
        }"#;
        let config = serde_json::from_str::<PassConfig>(json).unwrap();
        config.validate().unwrap();
        assert_eq!(1, config.types.len());
        let spec = &config.types[&136];
        assert_eq!("TQM", spec.primary_quality_field);
        assert_eq!(2, spec.primary_quality_threshold);
        assert_eq!(2, spec.variables.len());
        assert_eq!(Some(1.0), config.time_bucket_hours);
    }

    #[test]
    fn non_positive_time_bucket_rejected() {
        let mut config = test_utils::thermo_config();
        config.time_bucket_hours = Some(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_against_accepts_matching_schema() {
        let config = test_utils::thermo_config();
        let observations = vec![test_utils::thermo_ob(40.0, 260.0, 850.0, 10.0, 1.0)];
        config.validate_against(&observations).unwrap();
    }

    #[test]
    fn validate_against_rejects_foreign_quality_field() {
        let mut config = test_utils::thermo_config();
        let spec = config.types.get_mut(&136).unwrap();
        spec.variables.get_mut("TOB").unwrap().quality_field = "WQM".to_string();
        let observations = vec![test_utils::thermo_ob(40.0, 260.0, 850.0, 10.0, 1.0)];
        let result = config.validate_against(&observations);
        assert!(matches!(
            result,
            Err(ObReduceError::UnknownQualityField { type_code: 136, .. })
        ));
    }

    #[test]
    fn validate_against_skips_absent_types() {
        // Configured types with no observations present have no schema to
        // check; the pass simply produces nothing for them.
        let config = test_utils::thermo_config();
        config.validate_against(&[]).unwrap();
    }

    #[test]
    fn missing_variable_reads_nan() {
        let ob = test_utils::thermo_ob(40.0, 260.0, 850.0, 10.0, 1.0);
        assert!(ob.variable("UOB").is_nan());
        assert!(ob.marker("WQM").is_nan());
    }
}
