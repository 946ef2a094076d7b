//! Command Line Interface (CLI) arguments.

use clap::Parser;

/// Obreduce command line interface
#[derive(Clone, Debug, Parser)]
pub struct CommandLineArgs {
    /// Path to the input observation CSV file
    #[arg(long, env = "OBREDUCE_INPUT")]
    pub input: String,
    /// Path to which the superob CSV file should be written
    #[arg(long, env = "OBREDUCE_OUTPUT")]
    pub output: String,
    /// Path to the pass configuration JSON file
    #[arg(long, env = "OBREDUCE_CONFIG")]
    pub config: String,
    /// Column used as the vertical coordinate
    #[arg(long, default_value = "POB", env = "OBREDUCE_VERTICAL_FIELD")]
    pub vertical_field: String,
    /// First standard parallel of the Lambert conformal projection, degrees
    #[arg(long, default_value_t = 25.0, env = "OBREDUCE_LAT_1")]
    pub lat_1: f64,
    /// Second standard parallel of the Lambert conformal projection, degrees
    #[arg(long, default_value_t = 60.0, env = "OBREDUCE_LAT_2")]
    pub lat_2: f64,
    /// Reference latitude of the Lambert conformal projection, degrees
    #[arg(long, default_value_t = 40.0, env = "OBREDUCE_REF_LAT")]
    pub ref_lat: f64,
    /// Reference longitude of the Lambert conformal projection, degrees
    #[arg(long, default_value_t = -97.0, env = "OBREDUCE_REF_LON")]
    pub ref_lon: f64,
    /// Spacing of the analytic grid in kilometres
    #[arg(long, default_value_t = 6.0, env = "OBREDUCE_GRID_SPACING_KM")]
    pub grid_spacing_km: f64,
    /// Cell index of the analytic grid origin, as `i,j`
    #[arg(long, value_delimiter = ',', num_args = 2, env = "OBREDUCE_GRID_ORIGIN")]
    pub grid_origin: Option<Vec<i64>>,
    /// Maximum cell index of the analytic grid, as `i,j`
    #[arg(long, value_delimiter = ',', num_args = 2, env = "OBREDUCE_GRID_EXTENT")]
    pub grid_extent: Option<Vec<i64>>,
    /// Path to a CSV file of grid point latitudes and longitudes
    ///
    /// When set, observations are assigned to the nearest listed point
    /// instead of to analytic grid cells.
    #[arg(long, env = "OBREDUCE_GRID_POINTS")]
    pub grid_points: Option<String>,
    /// Maximum distance in kilometres from a grid point, beyond which
    /// observations are excluded
    #[arg(long, default_value_t = 100.0, env = "OBREDUCE_CUTOFF_KM")]
    pub cutoff_km: f64,
    /// Observation type codes to process; all types when unset
    #[arg(long, value_delimiter = ',', env = "OBREDUCE_SELECT_TYPES")]
    pub select_types: Option<Vec<u16>>,
    /// Maximum number of messages retained per station
    #[arg(long, env = "OBREDUCE_MAX_MESSAGES_PER_STATION")]
    pub max_messages_per_station: Option<usize>,
}

/// Returns parsed command line arguments.
pub fn parse() -> CommandLineArgs {
    CommandLineArgs::parse()
}
