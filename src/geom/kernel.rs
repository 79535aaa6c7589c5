use crate::error::Result;
use crate::value::point::{GeogPoint, GeomPoint};

/// A polyline in projected (planar) space, as traced by a point-valued
/// sequence under linear interpolation (spec's "trajectory").
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub points: Vec<GeomPoint>,
}

impl Line {
    pub fn new(points: Vec<GeomPoint>) -> Self {
        Line { points }
    }
}

/// Replaces the source's process-wide Gauss-Krüger mutable globals (spec
/// §9, design note ii) with a value threaded explicitly through the
/// projection API. Defaults are the classic Bessel-ellipsoid 3-degree-zone
/// constants; callers needing a different zone/ellipsoid construct their
/// own `GaussKruegerParams` rather than mutating shared state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussKruegerParams {
    pub central_meridian_deg: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    pub scale_factor: f64,
    pub semi_major_axis: f64,
    pub flattening: f64,
}

impl Default for GaussKruegerParams {
    fn default() -> Self {
        GaussKruegerParams {
            central_meridian_deg: 9.0,
            false_easting: 500_000.0,
            false_northing: 0.0,
            scale_factor: 1.0,
            semi_major_axis: 6_377_397.155,
            flattening: 1.0 / 299.1528128,
        }
    }
}

/// Capability the core consumes for every geometry/geography operation
/// (spec §6.1, §4.10). Implementations must be deterministic for
/// identical byte inputs, must preserve SRID unless explicitly converting,
/// and must raise a typed error rather than panic on empty/degenerate
/// input.
pub trait GeomKernel: Send + Sync {
    fn line_from_endpoints(&self, a: GeomPoint, b: GeomPoint) -> Result<Line>;
    fn line_locate_point(&self, line: &Line, point: GeomPoint) -> Result<f64>;
    fn line_interpolate_point(&self, line: &Line, fraction: f64) -> Result<GeomPoint>;

    fn best_srid(&self, a: GeogPoint, b: GeogPoint) -> i32;
    fn to_planar(&self, p: GeogPoint, srid: i32, params: &GaussKruegerParams) -> Result<GeomPoint>;
    fn to_geographic(&self, p: GeomPoint, srid: i32, params: &GaussKruegerParams) -> Result<GeogPoint>;

    fn distance_2d(&self, a: GeomPoint, b: GeomPoint) -> f64;
    fn distance_3d(&self, a: GeomPoint, b: GeomPoint) -> f64;
    fn geo_distance(&self, a: GeogPoint, b: GeogPoint) -> f64;

    fn intersects(&self, a: &Line, b: &Line) -> Result<bool>;
    fn dwithin(&self, a: GeomPoint, b: GeomPoint, distance: f64) -> bool;
    fn length(&self, line: &Line) -> f64;
}
