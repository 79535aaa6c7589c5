use crate::error::{Error, Result};
use crate::value::point::{GeogPoint, GeomPoint};

use super::kernel::{GaussKruegerParams, GeomKernel, Line};

/// Pure-Rust default `GeomKernel`: exact Euclidean/spherical math with no
/// external geometry library. Serves as the crate's default when the
/// `geos` feature is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanarKernel;

impl GeomKernel for PlanarKernel {
    fn line_from_endpoints(&self, a: GeomPoint, b: GeomPoint) -> Result<Line> {
        if a.srid != b.srid {
            return Err(Error::MixedSrid { expected: a.srid, found: b.srid });
        }
        if a.has_z() != b.has_z() {
            return Err(Error::MixedDimensionality);
        }
        Ok(Line::new(vec![a, b]))
    }

    fn line_locate_point(&self, line: &Line, point: GeomPoint) -> Result<f64> {
        let (a, b) = endpoints(line)?;
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return Ok(0.0);
        }
        let t = ((point.x - a.x) * dx + (point.y - a.y) * dy) / len_sq;
        Ok(t.clamp(0.0, 1.0))
    }

    fn line_interpolate_point(&self, line: &Line, fraction: f64) -> Result<GeomPoint> {
        let (a, b) = endpoints(line)?;
        let x = a.x + (b.x - a.x) * fraction;
        let y = a.y + (b.y - a.y) * fraction;
        let z = match (a.z, b.z) {
            (Some(za), Some(zb)) => Some(za + (zb - za) * fraction),
            _ => None,
        };
        Ok(GeomPoint { x, y, z, srid: a.srid })
    }

    fn best_srid(&self, _a: GeogPoint, _b: GeogPoint) -> i32 {
        4326
    }

    fn to_planar(&self, p: GeogPoint, srid: i32, params: &GaussKruegerParams) -> Result<GeomPoint> {
        let dlon = p.lon - params.central_meridian_deg;
        let x = params.false_easting
            + params.scale_factor * params.semi_major_axis * dlon.to_radians() * p.lat.to_radians().cos();
        let y = params.false_northing + params.scale_factor * params.semi_major_axis * p.lat.to_radians();
        Ok(GeomPoint { x, y, z: p.height, srid })
    }

    fn to_geographic(&self, p: GeomPoint, srid: i32, params: &GaussKruegerParams) -> Result<GeogPoint> {
        let lat = ((p.y - params.false_northing) / (params.scale_factor * params.semi_major_axis)).to_degrees();
        let lon = params.central_meridian_deg
            + ((p.x - params.false_easting) / (params.scale_factor * params.semi_major_axis * lat.to_radians().cos()))
                .to_degrees();
        let _ = srid;
        Ok(GeogPoint { lon, lat, height: p.z, srid: 4326 })
    }

    fn distance_2d(&self, a: GeomPoint, b: GeomPoint) -> f64 {
        a.distance_2d(&b)
    }

    fn distance_3d(&self, a: GeomPoint, b: GeomPoint) -> f64 {
        a.distance_3d(&b)
    }

    fn geo_distance(&self, a: GeogPoint, b: GeogPoint) -> f64 {
        a.haversine_distance(&b)
    }

    fn intersects(&self, a: &Line, b: &Line) -> Result<bool> {
        let (a0, a1) = endpoints(a)?;
        let (b0, b1) = endpoints(b)?;
        Ok(segments_intersect(a0, a1, b0, b1))
    }

    fn dwithin(&self, a: GeomPoint, b: GeomPoint, distance: f64) -> bool {
        a.distance_2d(&b) <= distance
    }

    fn length(&self, line: &Line) -> f64 {
        line.points.windows(2).map(|w| w[0].distance_3d(&w[1])).sum()
    }
}

fn endpoints(line: &Line) -> Result<(GeomPoint, GeomPoint)> {
    match (line.points.first(), line.points.last()) {
        (Some(a), Some(b)) if line.points.len() >= 2 => Ok((*a, *b)),
        _ => Err(Error::EmptyGeometry),
    }
}

fn cross(o: GeomPoint, a: GeomPoint, b: GeomPoint) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn on_segment(p: GeomPoint, q: GeomPoint, r: GeomPoint) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

fn segments_intersect(p1: GeomPoint, q1: GeomPoint, p2: GeomPoint, q2: GeomPoint) -> bool {
    let d1 = cross(p2, q2, p1);
    let d2 = cross(p2, q2, q1);
    let d3 = cross(p1, q1, p2);
    let d4 = cross(p1, q1, q2);

    if ((d1 > 0.0) != (d2 > 0.0)) && ((d3 > 0.0) != (d4 > 0.0)) {
        return true;
    }
    if d1 == 0.0 && on_segment(p2, p1, q2) {
        return true;
    }
    if d2 == 0.0 && on_segment(p2, q1, q2) {
        return true;
    }
    if d3 == 0.0 && on_segment(p1, p2, q1) {
        return true;
    }
    if d4 == 0.0 && on_segment(p1, q2, q1) {
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_midpoint() {
        let k = PlanarKernel;
        let line = Line::new(vec![GeomPoint::xy(0.0, 0.0, 4326), GeomPoint::xy(10.0, 0.0, 4326)]);
        let mid = k.line_interpolate_point(&line, 0.5).unwrap();
        assert_eq!(mid.x, 5.0);
    }

    #[test]
    fn crossing_segments_intersect() {
        let k = PlanarKernel;
        let a = Line::new(vec![GeomPoint::xy(0.0, 0.0, 0), GeomPoint::xy(4.0, 4.0, 0)]);
        let b = Line::new(vec![GeomPoint::xy(0.0, 4.0, 0), GeomPoint::xy(4.0, 0.0, 0)]);
        assert!(k.intersects(&a, &b).unwrap());
    }
}
