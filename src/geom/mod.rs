pub mod kernel;
pub mod planar;

#[cfg(feature = "geos")]
pub mod geos_adapter;

pub use kernel::{GaussKruegerParams, GeomKernel, Line};
pub use planar::PlanarKernel;

#[cfg(feature = "geos")]
pub use geos_adapter::GeosKernel;

/// The kernel instantiated by default: `geos`-backed when the feature is
/// on, pure-Rust otherwise.
#[cfg(feature = "geos")]
pub fn default_kernel() -> GeosKernel {
    GeosKernel::default()
}

#[cfg(not(feature = "geos"))]
pub fn default_kernel() -> PlanarKernel {
    PlanarKernel
}
