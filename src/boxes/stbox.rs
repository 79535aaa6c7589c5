use crate::collections::base::span::Span;
use crate::collections::datetime::{Period, Timestamp};
use crate::error::{Error, Result};

use super::bbox::BoundingBox;

/// Axis-aligned spatial extent, optionally 3D (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialExtent {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub zmin: Option<f64>,
    pub zmax: Option<f64>,
}

impl SpatialExtent {
    pub fn point(x: f64, y: f64, z: Option<f64>) -> Self {
        SpatialExtent { xmin: x, xmax: x, ymin: y, ymax: y, zmin: z, zmax: z }
    }

    fn overlaps(&self, other: &Self) -> bool {
        let xy = self.xmin <= other.xmax && other.xmin <= self.xmax && self.ymin <= other.ymax && other.ymin <= self.ymax;
        let z = match (self.zmin, self.zmax, other.zmin, other.zmax) {
            (Some(a0), Some(a1), Some(b0), Some(b1)) => a0 <= b1 && b0 <= a1,
            (None, None, None, None) => true,
            _ => false,
        };
        xy && z
    }

    fn union(&self, other: &Self) -> Result<Self> {
        let (zmin, zmax) = match (self.zmin, self.zmax, other.zmin, other.zmax) {
            (Some(a0), Some(a1), Some(b0), Some(b1)) => (Some(a0.min(b0)), Some(a1.max(b1))),
            (None, None, None, None) => (None, None),
            _ => return Err(Error::MixedDimensionality),
        };
        Ok(SpatialExtent {
            xmin: self.xmin.min(other.xmin),
            xmax: self.xmax.max(other.xmax),
            ymin: self.ymin.min(other.ymin),
            ymax: self.ymax.max(other.ymax),
            zmin,
            zmax,
        })
    }

    fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        let (zmin, zmax) = match (self.zmin, self.zmax, other.zmin, other.zmax) {
            (Some(a0), Some(a1), Some(b0), Some(b1)) => (Some(a0.max(b0)), Some(a1.min(b1))),
            (None, None, None, None) => (None, None),
            _ => return None,
        };
        Some(SpatialExtent {
            xmin: self.xmin.max(other.xmin),
            xmax: self.xmax.min(other.xmax),
            ymin: self.ymin.max(other.ymin),
            ymax: self.ymax.min(other.ymax),
            zmin,
            zmax,
        })
    }
}

/// A space×time pruning box (spec §4.3), carrying the SRID and the
/// geodetic flag of the geometry/geography it bounds. Either the spatial
/// or the temporal axis may be absent, as in the teacher's `STBox`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct STBox {
    extent: Option<SpatialExtent>,
    period: Option<Period>,
    srid: i32,
    geodetic: bool,
}

impl STBox {
    pub fn new(extent: Option<SpatialExtent>, period: Option<Period>, srid: i32, geodetic: bool) -> Result<Self> {
        if extent.is_none() && period.is_none() {
            return Err(Error::InvalidArgument("STBox requires a spatial extent or a time period".into()));
        }
        Ok(STBox { extent, period, srid, geodetic })
    }

    pub fn from_time(t: Timestamp) -> Self {
        STBox { extent: None, period: Some(Period::instant(t)), srid: 0, geodetic: false }
    }

    pub fn extent(&self) -> Option<SpatialExtent> {
        self.extent
    }

    pub fn period(&self) -> Option<Period> {
        self.period
    }

    pub fn srid(&self) -> i32 {
        self.srid
    }

    pub fn is_geodetic(&self) -> bool {
        self.geodetic
    }

    fn check_srid(&self, other: &Self) -> Result<()> {
        if self.extent.is_some() && other.extent.is_some() && self.srid != other.srid {
            return Err(Error::MixedSrid { expected: self.srid, found: other.srid });
        }
        Ok(())
    }
}

impl BoundingBox for STBox {
    fn is_adjacent(&self, other: &Self) -> bool {
        match (self.period, other.period) {
            (Some(a), Some(b)) => a.adjacent(&b),
            _ => false,
        }
    }

    fn intersection(&self, other: &Self) -> Option<Self> {
        self.check_srid(other).ok()?;
        let extent = match (self.extent, other.extent) {
            (Some(a), Some(b)) => Some(a.intersection(&b)?),
            (None, None) => None,
            _ => return None,
        };
        let period = match (self.period, other.period) {
            (Some(a), Some(b)) => Some(a.intersection(&b)?),
            (None, None) => None,
            _ => return None,
        };
        let srid = if self.extent.is_some() { self.srid } else { other.srid };
        STBox::new(extent, period, srid, self.geodetic || other.geodetic).ok()
    }

    fn union(&self, other: &Self) -> Result<Self> {
        self.check_srid(other)?;
        let extent = match (self.extent, other.extent) {
            (Some(a), Some(b)) => Some(a.union(&b)?),
            (None, None) => None,
            _ => return Err(Error::IncompatibleBox),
        };
        let period = match (self.period, other.period) {
            (Some(a), Some(b)) => Some(Period::new(
                a.lower().min(b.lower()),
                a.upper().max(b.upper()),
                true,
                true,
            )?),
            (None, None) => None,
            _ => return Err(Error::IncompatibleBox),
        };
        let srid = if self.extent.is_some() { self.srid } else { other.srid };
        STBox::new(extent, period, srid, self.geodetic || other.geodetic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(v: i64) -> Timestamp {
        Timestamp::from_micros(v)
    }

    #[test]
    fn mixed_srid_rejected_on_union() {
        let a = STBox::new(Some(SpatialExtent::point(0.0, 0.0, None)), None, 4326, true).unwrap();
        let b = STBox::new(Some(SpatialExtent::point(1.0, 1.0, None)), None, 3857, false).unwrap();
        assert!(matches!(a.union(&b), Err(Error::MixedSrid { .. })));
    }

    #[test]
    fn time_only_boxes_intersect() {
        let a = STBox::from_time(ts(10));
        let b = STBox::new(None, Some(Period::new(ts(0), ts(20), true, true).unwrap()), 0, false).unwrap();
        assert!(a.intersection(&b).is_some());
    }
}
