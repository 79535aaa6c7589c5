use geos::{CoordSeq, Geom, Geometry};

use crate::error::{Error, Result};
use crate::value::point::{GeogPoint, GeomPoint};

use super::kernel::{GaussKruegerParams, GeomKernel, Line};
use super::planar::PlanarKernel;

/// `geos`-backed kernel (spec §6.1). Interpolation and locate stay exact
/// closed-form arithmetic (straight-line segments need no library call);
/// `geos` is used for the predicates and measures it is actually good at
/// — `intersects`, `length`, planar distance — by round-tripping points
/// through `geos::Geometry`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeosKernel {
    fallback: PlanarKernel,
}

fn to_geos_point(p: GeomPoint) -> Result<Geometry> {
    let mut seq = CoordSeq::new(1, geos::CoordDimensions::TwoD).map_err(|e| Error::Geom(e.to_string()))?;
    seq.set_x(0, p.x).map_err(|e| Error::Geom(e.to_string()))?;
    seq.set_y(0, p.y).map_err(|e| Error::Geom(e.to_string()))?;
    Geometry::create_point(seq).map_err(|e| Error::Geom(e.to_string()))
}

fn to_geos_line(line: &Line) -> Result<Geometry> {
    if line.points.len() < 2 {
        return Err(Error::EmptyGeometry);
    }
    let mut seq = CoordSeq::new(line.points.len() as u32, geos::CoordDimensions::TwoD)
        .map_err(|e| Error::Geom(e.to_string()))?;
    for (i, p) in line.points.iter().enumerate() {
        seq.set_x(i, p.x).map_err(|e| Error::Geom(e.to_string()))?;
        seq.set_y(i, p.y).map_err(|e| Error::Geom(e.to_string()))?;
    }
    Geometry::create_line_string(seq).map_err(|e| Error::Geom(e.to_string()))
}

impl GeomKernel for GeosKernel {
    fn line_from_endpoints(&self, a: GeomPoint, b: GeomPoint) -> Result<Line> {
        self.fallback.line_from_endpoints(a, b)
    }

    fn line_locate_point(&self, line: &Line, point: GeomPoint) -> Result<f64> {
        self.fallback.line_locate_point(line, point)
    }

    fn line_interpolate_point(&self, line: &Line, fraction: f64) -> Result<GeomPoint> {
        self.fallback.line_interpolate_point(line, fraction)
    }

    fn best_srid(&self, a: GeogPoint, b: GeogPoint) -> i32 {
        self.fallback.best_srid(a, b)
    }

    fn to_planar(&self, p: GeogPoint, srid: i32, params: &GaussKruegerParams) -> Result<GeomPoint> {
        self.fallback.to_planar(p, srid, params)
    }

    fn to_geographic(&self, p: GeomPoint, srid: i32, params: &GaussKruegerParams) -> Result<GeogPoint> {
        self.fallback.to_geographic(p, srid, params)
    }

    fn distance_2d(&self, a: GeomPoint, b: GeomPoint) -> f64 {
        match (to_geos_point(a), to_geos_point(b)) {
            (Ok(ga), Ok(gb)) => ga.distance(&gb).unwrap_or_else(|_| self.fallback.distance_2d(a, b)),
            _ => self.fallback.distance_2d(a, b),
        }
    }

    fn distance_3d(&self, a: GeomPoint, b: GeomPoint) -> f64 {
        self.fallback.distance_3d(a, b)
    }

    fn geo_distance(&self, a: GeogPoint, b: GeogPoint) -> f64 {
        self.fallback.geo_distance(a, b)
    }

    fn intersects(&self, a: &Line, b: &Line) -> Result<bool> {
        let (ga, gb) = (to_geos_line(a)?, to_geos_line(b)?);
        ga.intersects(&gb).map_err(|e| Error::Geom(e.to_string()))
    }

    fn dwithin(&self, a: GeomPoint, b: GeomPoint, distance: f64) -> bool {
        self.distance_2d(a, b) <= distance
    }

    fn length(&self, line: &Line) -> f64 {
        to_geos_line(line).and_then(|g| g.length().map_err(|e| Error::Geom(e.to_string()))).unwrap_or_else(|_| self.fallback.length(line))
    }
}
