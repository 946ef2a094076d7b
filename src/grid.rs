//! Grid cell assignment.
//!
//! Maps projected planar coordinates to discrete cell identifiers. Two
//! strategies are supported: an analytic grid defined by a cell spacing, and
//! an externally supplied set of grid points resolved by nearest-neighbour
//! lookup through a precomputed spatial index. Observations outside a grid's
//! coverage are excluded from grouping; that is an expected outcome, not an
//! error.

use ndarray::Array2;
use rstar::{RTree, RTreeObject, AABB};

use crate::error::ObReduceError;
use crate::projection::LambertConformal;

/// Discrete cell identifier: integer (i, j) cell indices for an analytic
/// grid, or the (row, column) of the nearest point for an external grid.
pub type CellId = (i64, i64);

/// Grid definition shared read-only by all grouping calls.
#[derive(Clone, Debug)]
pub enum GridDefinition {
    /// Cells at integer multiples of a fixed spacing in projected space
    Analytic(AnalyticGrid),
    /// Externally supplied grid points with arbitrary lat/lon per point
    Points(PointGrid),
}

impl GridDefinition {
    /// Assign (`lat`, `lon`) to a cell, or None for an out-of-coverage
    /// observation.
    pub fn cell_id(&self, lat: f64, lon: f64) -> Option<CellId> {
        match self {
            Self::Analytic(grid) => grid.cell_id(lat, lon),
            Self::Points(grid) => grid.cell_id(lat, lon),
        }
    }
}

/// Analytic grid: nearest-neighbour binning onto integer multiples of the
/// cell spacing.
///
/// An observation exactly on a cell boundary is assigned deterministically by
/// round-half-to-even, so boundary observations do not all drift toward the
/// same neighbour.
#[derive(Clone, Debug)]
pub struct AnalyticGrid {
    projection: LambertConformal,
    spacing_km: f64,
    /// Index offsets of the projection origin within the grid
    origin: (i64, i64),
    /// Valid index extent (ni, nj) counted from cell (0, 0); None means
    /// unbounded coverage
    extent: Option<(i64, i64)>,
}

impl AnalyticGrid {
    /// Return a new analytic grid.
    ///
    /// # Arguments
    ///
    /// * `projection`: Planar projection for the grid
    /// * `spacing_km`: Cell spacing in km; must be positive
    /// * `origin`: Index offsets placing the projection origin on the grid
    /// * `extent`: Optional valid extent (ni, nj); cells outside [0, ni) x
    ///   [0, nj) are out of coverage
    pub fn new(
        projection: LambertConformal,
        spacing_km: f64,
        origin: (i64, i64),
        extent: Option<(i64, i64)>,
    ) -> Result<Self, ObReduceError> {
        if spacing_km <= 0.0 {
            return Err(ObReduceError::NonPositiveSpacing {
                spacing: spacing_km,
            });
        }
        Ok(Self {
            projection,
            spacing_km,
            origin,
            extent,
        })
    }

    /// Assign (`lat`, `lon`) to integer cell indices, or None when the cell
    /// falls outside the configured extent.
    pub fn cell_id(&self, lat: f64, lon: f64) -> Option<CellId> {
        let (x, y) = self.projection.project(lat, lon);
        // NaN coordinates would otherwise cast to cell 0 and contaminate it.
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let i = round_half_even(x / self.spacing_km) + self.origin.0;
        let j = round_half_even(y / self.spacing_km) + self.origin.1;
        if let Some((ni, nj)) = self.extent {
            if i < 0 || i >= ni || j < 0 || j >= nj {
                return None;
            }
        }
        Some((i, j))
    }
}

/// Round to the nearest integer, ties to even.
fn round_half_even(x: f64) -> i64 {
    let floor = x.floor();
    if x - floor == 0.5 {
        let candidate = floor as i64;
        if candidate % 2 == 0 {
            candidate
        } else {
            candidate + 1
        }
    } else {
        x.round() as i64
    }
}

/// An external grid point entry in the spatial index.
#[derive(Clone, Debug)]
struct GridPoint {
    x: f64,
    y: f64,
    cell: CellId,
}

impl RTreeObject for GridPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl rstar::PointDistance for GridPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// External grid: each observation is assigned to its nearest grid point by
/// planar distance.
///
/// The points are indexed in an R-tree built once at construction, so a
/// lookup is O(log M) rather than a brute-force scan over all grid points.
#[derive(Clone, Debug)]
pub struct PointGrid {
    projection: LambertConformal,
    tree: RTree<GridPoint>,
    /// Squared coverage cutoff; observations farther than this from every
    /// grid point are out of coverage
    cutoff_2: f64,
}

impl PointGrid {
    /// Return a new point grid from lat/lon meshes.
    ///
    /// # Arguments
    ///
    /// * `projection`: Planar projection used for distance computations
    /// * `lats`, `lons`: 2-D meshes of grid point coordinates in degrees;
    ///   must have identical shapes and at least one point
    /// * `cutoff_km`: Coverage cutoff distance in km; must be positive
    pub fn new(
        projection: LambertConformal,
        lats: &Array2<f64>,
        lons: &Array2<f64>,
        cutoff_km: f64,
    ) -> Result<Self, ObReduceError> {
        if lats.shape() != lons.shape() {
            return Err(ObReduceError::GridShapeMismatch {
                lat_shape: lats.shape().to_vec(),
                lon_shape: lons.shape().to_vec(),
            });
        }
        if lats.is_empty() {
            return Err(ObReduceError::EmptyGrid);
        }
        if cutoff_km <= 0.0 {
            return Err(ObReduceError::NonPositiveCutoff { cutoff: cutoff_km });
        }
        let mut entries = Vec::with_capacity(lats.len());
        for ((row, col), &lat) in lats.indexed_iter() {
            let lon = lons[(row, col)];
            let (x, y) = projection.project(lat, lon);
            entries.push(GridPoint {
                x,
                y,
                cell: (row as i64, col as i64),
            });
        }
        Ok(Self {
            projection,
            tree: RTree::bulk_load(entries),
            cutoff_2: cutoff_km * cutoff_km,
        })
    }

    /// Return a new point grid from a flat list of (lat, lon) points.
    pub fn from_points(
        projection: LambertConformal,
        points: &[(f64, f64)],
        cutoff_km: f64,
    ) -> Result<Self, ObReduceError> {
        let lats = Array2::from_shape_vec(
            (points.len(), 1),
            points.iter().map(|&(lat, _)| lat).collect(),
        )
        .map_err(|_| ObReduceError::EmptyGrid)?;
        let lons = Array2::from_shape_vec(
            (points.len(), 1),
            points.iter().map(|&(_, lon)| lon).collect(),
        )
        .map_err(|_| ObReduceError::EmptyGrid)?;
        Self::new(projection, &lats, &lons, cutoff_km)
    }

    /// Assign (`lat`, `lon`) to the nearest grid point, or None when no
    /// point lies within the coverage cutoff.
    pub fn cell_id(&self, lat: f64, lon: f64) -> Option<CellId> {
        let (x, y) = self.projection.project(lat, lon);
        // A NaN query would pass the cutoff comparison below.
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let query = [x, y];
        let nearest = self.tree.nearest_neighbor(&query)?;
        let dx = nearest.x - x;
        let dy = nearest.y - y;
        if dx * dx + dy * dy > self.cutoff_2 {
            return None;
        }
        Some(nearest.cell)
    }
}
