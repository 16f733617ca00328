//! Frame rendering: overlay placement, draw-list compilation and CPU raster execution.

pub(crate) mod blur;
pub(crate) mod cpu;
pub(crate) mod overlay;
pub(crate) mod plan;
pub(crate) mod surface;
pub(crate) mod text;
