//! Shared constructors for tests.

use std::collections::BTreeMap;

use crate::grid::{AnalyticGrid, GridDefinition};
use crate::models::{
    Observation, PassConfig, Radius, ReductionMethod, TypeSpec, VariableSpec,
};
use crate::projection::LambertConformal;

/// The RAP/RRFS-style CONUS projection used throughout the tests.
pub(crate) fn conus_projection() -> LambertConformal {
    LambertConformal::new(25.0, 60.0, 40.0, -97.0)
}

/// Unbounded analytic grid with 20 km cells.
pub(crate) fn coarse_grid() -> GridDefinition {
    GridDefinition::Analytic(
        AnalyticGrid::new(conus_projection(), 20.0, (0, 0), None).unwrap(),
    )
}

/// Analytic grid with a 20x20 cell extent around the reference point.
pub(crate) fn bounded_grid() -> GridDefinition {
    GridDefinition::Analytic(
        AnalyticGrid::new(conus_projection(), 6.0, (10, 10), Some((20, 20))).unwrap(),
    )
}

/// A thermodynamic (type 136) observation with good quality markers.
pub(crate) fn thermo_ob(
    lat: f64,
    lon: f64,
    vertical: f64,
    tob: f64,
    time_offset: f64,
) -> Observation {
    let mut ob = Observation {
        type_code: 136,
        station_id: "UA000001".to_string(),
        message_id: 1,
        lat,
        lon,
        vertical,
        time_offset,
        variables: Default::default(),
        quality: Default::default(),
    };
    ob.variables.insert("TOB".to_string(), tob);
    ob.variables.insert("POB".to_string(), vertical);
    ob.quality.insert("TQM".to_string(), 1.0);
    ob.quality.insert("QQM".to_string(), 1.0);
    ob.quality.insert("PQM".to_string(), 1.0);
    ob
}

/// A kinematic (type 236) observation with good quality markers.
pub(crate) fn kinematic_ob(
    lat: f64,
    lon: f64,
    vertical: f64,
    uob: f64,
    vob: f64,
    time_offset: f64,
) -> Observation {
    let mut ob = Observation {
        type_code: 236,
        station_id: "UA000001".to_string(),
        message_id: 1,
        lat,
        lon,
        vertical,
        time_offset,
        variables: Default::default(),
        quality: Default::default(),
    };
    ob.variables.insert("UOB".to_string(), uob);
    ob.variables.insert("VOB".to_string(), vob);
    ob.variables.insert("POB".to_string(), vertical);
    ob.quality.insert("WQM".to_string(), 1.0);
    ob.quality.insert("PQM".to_string(), 1.0);
    ob
}

fn variable_spec(method: ReductionMethod, quality_field: &str) -> VariableSpec {
    VariableSpec {
        method,
        quality_field: quality_field.to_string(),
        quality_threshold: 2,
    }
}

/// Type 136 spec reducing TOB by plain mean.
pub(crate) fn thermo_spec_mean() -> TypeSpec {
    let mut variables = BTreeMap::new();
    variables.insert("TOB".to_string(), variable_spec(ReductionMethod::Mean, "TQM"));
    TypeSpec {
        primary_quality_field: "TQM".to_string(),
        primary_quality_threshold: 2,
        variables,
    }
}

/// Type 136 spec reducing TOB by vertically weighted Cressman with a derived
/// radius, mirroring the canonical configuration.
pub(crate) fn thermo_spec_cressman() -> TypeSpec {
    let mut variables = BTreeMap::new();
    variables.insert(
        "TOB".to_string(),
        variable_spec(
            ReductionMethod::VerticalWeighted {
                radius: Radius::MaxDistance,
            },
            "TQM",
        ),
    );
    TypeSpec {
        primary_quality_field: "TQM".to_string(),
        primary_quality_threshold: 2,
        variables,
    }
}

/// Pass configuration covering type 136 only.
pub(crate) fn thermo_config() -> PassConfig {
    let mut types = BTreeMap::new();
    types.insert(136, thermo_spec_cressman());
    PassConfig {
        types,
        time_bucket_hours: None,
    }
}

/// Pass configuration covering types 136 and 236.
pub(crate) fn two_type_config() -> PassConfig {
    let mut config = thermo_config();
    let mut variables = BTreeMap::new();
    for name in ["UOB", "VOB"] {
        variables.insert(
            name.to_string(),
            variable_spec(
                ReductionMethod::VerticalWeighted {
                    radius: Radius::MaxDistance,
                },
                "WQM",
            ),
        );
    }
    config.types.insert(
        236,
        TypeSpec {
            primary_quality_field: "WQM".to_string(),
            primary_quality_threshold: 2,
            variables,
        },
    );
    config
}
