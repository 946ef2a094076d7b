//! Observation record CSV reading and writing.
//!
//! A collaborator outside the core engine: parses and serialises the
//! PrepBUFR-flavoured CSV record format used to exchange observations with
//! the rest of the pipeline. Fixed columns are `TYP` (type code), `SID`
//! (station), `MSG` (message), `XOB` (longitude, degrees east), `YOB`
//! (latitude) and `DHR` (time offset in hours); one configurable column
//! (usually `POB` or `ZOB`) doubles as the vertical coordinate. Every other
//! column is a variable, except names ending in `QM`, which are quality
//! markers. Missing values round-trip as empty fields.

use std::io::Write;
use std::path::Path;

use crate::error::ObReduceError;
use crate::models::{Observation, SuperobRecord};

const TYPE_COLUMN: &str = "TYP";
const STATION_COLUMN: &str = "SID";
const MESSAGE_COLUMN: &str = "MSG";
const LON_COLUMN: &str = "XOB";
const LAT_COLUMN: &str = "YOB";
const TIME_COLUMN: &str = "DHR";
const COUNT_COLUMN: &str = "NOBS";

/// Suffix identifying quality marker columns.
const QUALITY_SUFFIX: &str = "QM";

fn parse_float(column: &str, raw: &str) -> Result<f64, ObReduceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    trimmed.parse().map_err(|_| ObReduceError::InvalidField {
        column: column.to_string(),
        value: raw.to_string(),
    })
}

fn format_float(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

/// Read observation records from a CSV file.
///
/// # Arguments
///
/// * `path`: CSV file path
/// * `vertical_field`: Column holding the vertical coordinate (e.g. `POB`);
///   the column is also retained as an ordinary variable
pub fn read_observations(
    path: &Path,
    vertical_field: &str,
) -> Result<Vec<Observation>, ObReduceError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let position = |name: &str| -> Result<usize, ObReduceError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ObReduceError::MissingColumn {
                column: name.to_string(),
            })
    };
    let type_idx = position(TYPE_COLUMN)?;
    let station_idx = position(STATION_COLUMN)?;
    let message_idx = position(MESSAGE_COLUMN)?;
    let lon_idx = position(LON_COLUMN)?;
    let lat_idx = position(LAT_COLUMN)?;
    let time_idx = position(TIME_COLUMN)?;
    let vertical_idx = position(vertical_field)?;

    let fixed = [type_idx, station_idx, message_idx, lon_idx, lat_idx, time_idx];
    let mut observations = Vec::new();
    for result in reader.records() {
        let record = result?;
        let field = |idx: usize| record.get(idx).unwrap_or("");
        let type_code = field(type_idx).trim().parse::<u16>().map_err(|_| {
            ObReduceError::InvalidField {
                column: TYPE_COLUMN.to_string(),
                value: field(type_idx).to_string(),
            }
        })?;
        let message_id = field(message_idx).trim().parse::<u32>().map_err(|_| {
            ObReduceError::InvalidField {
                column: MESSAGE_COLUMN.to_string(),
                value: field(message_idx).to_string(),
            }
        })?;
        // Station identifiers arrive single-quoted from the BUFR dump.
        let station_id = field(station_idx).trim().trim_matches('\'').to_string();

        let mut ob = Observation {
            type_code,
            station_id,
            message_id,
            lat: parse_float(LAT_COLUMN, field(lat_idx))?,
            lon: parse_float(LON_COLUMN, field(lon_idx))?,
            vertical: parse_float(vertical_field, field(vertical_idx))?,
            time_offset: parse_float(TIME_COLUMN, field(time_idx))?,
            variables: Default::default(),
            quality: Default::default(),
        };
        for (idx, name) in headers.iter().enumerate() {
            if fixed.contains(&idx) {
                continue;
            }
            let value = parse_float(name, field(idx))?;
            if name.ends_with(QUALITY_SUFFIX) {
                ob.quality.insert(name.clone(), value);
            } else {
                ob.variables.insert(name.clone(), value);
            }
        }
        observations.push(ob);
    }
    Ok(observations)
}

/// Column layout shared by observation and superob writers.
fn column_layout<'a, I>(variable_keys: I, vertical_field: &str) -> (Vec<String>, Vec<String>)
where
    I: Iterator<Item = (&'a str, &'a str)>,
{
    let mut variables: Vec<String> = Vec::new();
    let mut quality: Vec<String> = Vec::new();
    for (var, marker) in variable_keys {
        if !var.is_empty() && var != vertical_field && !variables.iter().any(|v| v == var) {
            variables.push(var.to_string());
        }
        if !marker.is_empty() && !quality.iter().any(|q| q == marker) {
            quality.push(marker.to_string());
        }
    }
    variables.sort_unstable();
    quality.sort_unstable();
    (variables, quality)
}

/// Write observation records to a CSV file, inverse of [read_observations].
pub fn write_observations(
    path: &Path,
    observations: &[Observation],
    vertical_field: &str,
) -> Result<(), ObReduceError> {
    let keys = observations.iter().flat_map(|ob| {
        ob.variables
            .keys()
            .map(|v| (v.as_str(), ""))
            .chain(ob.quality.keys().map(|q| ("", q.as_str())))
    });
    let (variables, quality) = column_layout(keys, vertical_field);
    let mut writer = csv::Writer::from_path(path)?;
    write_header(&mut writer, vertical_field, &variables, &quality, false)?;
    for ob in observations {
        let mut row = vec![
            ob.type_code.to_string(),
            format!("'{}'", ob.station_id),
            ob.message_id.to_string(),
            format_float(ob.lon),
            format_float(ob.lat),
            format_float(ob.time_offset),
            format_float(ob.vertical),
        ];
        row.extend(variables.iter().map(|v| format_float(ob.variable(v))));
        row.extend(quality.iter().map(|q| format_float(ob.marker(q))));
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write superob records to a CSV file.
///
/// The layout is schema-compatible with [read_observations] so the output
/// can re-enter the pipeline as ordinary observations, plus a trailing
/// `NOBS` column with the member count. When the vertical coordinate was
/// itself reduced as a variable, that reduced value wins the shared column.
pub fn write_superobs(
    path: &Path,
    records: &[SuperobRecord],
    vertical_field: &str,
) -> Result<(), ObReduceError> {
    let keys = records.iter().flat_map(|record| {
        record
            .variables
            .keys()
            .map(|v| (v.as_str(), ""))
            .chain(record.quality.keys().map(|q| ("", q.as_str())))
    });
    let (variables, quality) = column_layout(keys, vertical_field);
    let mut writer = csv::Writer::from_path(path)?;
    write_header(&mut writer, vertical_field, &variables, &quality, true)?;
    for record in records {
        let vertical = match record.variables.get(vertical_field) {
            Some(&reduced) if !reduced.is_nan() => reduced,
            _ => record.vertical,
        };
        let mut row = vec![
            record.type_code.to_string(),
            format!("'{}'", record.station_id),
            record.message_id.to_string(),
            format_float(record.lon),
            format_float(record.lat),
            format_float(record.time_offset),
            format_float(vertical),
        ];
        row.extend(
            variables
                .iter()
                .map(|v| format_float(record.variables.get(v).copied().unwrap_or(f64::NAN))),
        );
        row.extend(
            quality
                .iter()
                .map(|q| format_float(record.quality.get(q).copied().unwrap_or(f64::NAN))),
        );
        row.push(record.n_members.to_string());
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read grid point coordinates from a CSV file with `lat` and `lon` columns.
pub fn read_grid_points(path: &Path) -> Result<Vec<(f64, f64)>, ObReduceError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let position = |name: &str| -> Result<usize, ObReduceError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ObReduceError::MissingColumn {
                column: name.to_string(),
            })
    };
    let lat_idx = position("lat")?;
    let lon_idx = position("lon")?;
    let mut points = Vec::new();
    for result in reader.records() {
        let record = result?;
        let lat = parse_float("lat", record.get(lat_idx).unwrap_or(""))?;
        let lon = parse_float("lon", record.get(lon_idx).unwrap_or(""))?;
        points.push((lat, lon));
    }
    Ok(points)
}

fn write_header<W: Write>(
    writer: &mut csv::Writer<W>,
    vertical_field: &str,
    variables: &[String],
    quality: &[String],
    with_count: bool,
) -> Result<(), ObReduceError> {
    let mut header = vec![
        TYPE_COLUMN.to_string(),
        STATION_COLUMN.to_string(),
        MESSAGE_COLUMN.to_string(),
        LON_COLUMN.to_string(),
        LAT_COLUMN.to_string(),
        TIME_COLUMN.to_string(),
        vertical_field.to_string(),
    ];
    header.extend(variables.iter().cloned());
    header.extend(quality.iter().cloned());
    if with_count {
        header.push(COUNT_COLUMN.to_string());
    }
    writer.write_record(&header)?;
    Ok(())
}
