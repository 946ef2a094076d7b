//! Lambert conformal conic map projection.
//!
//! Converts geographic coordinates to the planar coordinate system in which
//! grid cells are defined. The projection is conformal with one or two
//! standard parallels on a spherical earth, matching the conventions of the
//! limited-area forecast grids this engine targets.

/// Mean earth radius in km (the NCEP sphere).
pub const EARTH_RADIUS_KM: f64 = 6371.229;

/// Normalise a longitude in degrees into [-180, 180).
///
/// Observation records commonly carry longitudes in [0, 360) degrees east.
/// Projecting an unnormalised longitude silently corrupts cell assignment, so
/// normalisation is applied once inside [LambertConformal::project] rather
/// than ad hoc at call sites.
pub fn normalize_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Lambert conformal conic projection.
///
/// Parameterised by two standard parallels and a reference point. When both
/// standard parallels coincide the cone is tangent and the cone constant
/// degenerates to `sin(lat1)`.
#[derive(Clone, Copy, Debug)]
pub struct LambertConformal {
    /// Cone constant n
    cone: f64,
    /// Projection scale constant F, premultiplied by the earth radius
    rf: f64,
    /// Radial coordinate of the reference latitude
    rho0: f64,
    /// Reference longitude in degrees
    ref_lon: f64,
}

impl LambertConformal {
    /// Return a projection with standard parallels `lat1` and `lat2`,
    /// centred on (`ref_lat`, `ref_lon`). All arguments in degrees.
    pub fn new(lat1: f64, lat2: f64, ref_lat: f64, ref_lon: f64) -> Self {
        let phi1 = lat1.to_radians();
        let phi2 = lat2.to_radians();
        let cone = if (lat1 - lat2).abs() < 1e-10 {
            phi1.sin()
        } else {
            (phi1.cos() / phi2.cos()).ln()
                / (half_tan(phi2).ln() - half_tan(phi1).ln())
        };
        let rf = EARTH_RADIUS_KM * phi1.cos() * half_tan(phi1).powf(cone) / cone;
        let rho0 = rf / half_tan(ref_lat.to_radians()).powf(cone);
        Self {
            cone,
            rf,
            rho0,
            ref_lon: normalize_lon(ref_lon),
        }
    }

    /// Project (`lat`, `lon`) in degrees to planar (x, y) in km.
    ///
    /// The longitude is normalised into [-180, 180) first; callers may supply
    /// either longitude convention.
    pub fn project(&self, lat: f64, lon: f64) -> (f64, f64) {
        let rho = self.rf / half_tan(lat.to_radians()).powf(self.cone);
        let theta = self.cone * (normalize_lon(lon) - self.ref_lon).to_radians();
        (rho * theta.sin(), self.rho0 - rho * theta.cos())
    }

    /// Invert [project]: planar (x, y) in km back to (lat, lon) in degrees,
    /// with the longitude in [-180, 180).
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        let dy = self.rho0 - y;
        let rho = self.cone.signum() * (x * x + dy * dy).sqrt();
        let theta = x.atan2(dy);
        let lat = 2.0 * (self.rf / rho).powf(1.0 / self.cone).atan() - std::f64::consts::FRAC_PI_2;
        let lon = self.ref_lon + (theta / self.cone).to_degrees();
        (lat.to_degrees(), normalize_lon(lon))
    }
}

/// tan(pi/4 + phi/2), the conformal colatitude kernel.
fn half_tan(phi: f64) -> f64 {
    (std::f64::consts::FRAC_PI_4 + 0.5 * phi).tan()
}
