//! This crate provides a superobbing engine for point atmospheric observations.
//! Many correlated point observations (e.g. all levels reported by drone or
//! aircraft profiles crossing one analysis grid cell) are replaced by a single
//! representative "superob" record per (observation type, grid cell) group,
//! so that downstream data assimilation does not see an artificially inflated
//! observation density.
//!
//! The engine is a deterministic batch computation over observations already
//! resident in memory:
//!
//! * [projection] converts geographic coordinates to a planar Lambert
//!   conformal coordinate system.
//! * [grid] assigns planar coordinates to discrete grid cells, either by
//!   rounding onto an analytic grid or by nearest-neighbour lookup against an
//!   externally supplied set of grid points.
//! * [grouping] partitions observations into disjoint groups keyed by
//!   (type, cell, optional time bucket).
//! * [reduction] reduces one group to one output record using configurable,
//!   quality-aware methods (mean, vertically weighted Cressman, extremal).
//! * [pass] drives the above per observation type and reassembles the output.
//!
//! Reading and writing the PrepBUFR-flavoured CSV record format ([io]) and
//! whole-record filtering ([filters]) are collaborators outside the core;
//! they run strictly before or after a reduction pass, never inside it.

pub mod cli;
pub mod error;
pub mod filters;
pub mod grid;
pub mod grouping;
pub mod io;
pub mod models;
pub mod pass;
pub mod projection;
pub mod reduction;
#[cfg(test)]
pub mod test_utils;
pub mod tracing;
