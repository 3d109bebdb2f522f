use crate::{
    error::{MarchingCubesError, Result},
    interp::DEFAULT_NORMAL_STEP,
    region::GridRegion,
    types::Value,
};

/// Settings for one extraction pass.
///
/// ```rust
/// use metaball_mesher::config::ExtractionConfig;
///
/// let config = ExtractionConfig::cube(2.0, 0.25)?.with_normal_step(1e-4);
/// assert_eq!(config.region.cell_counts(), [16, 16, 16]);
/// # Ok::<(), metaball_mesher::error::MarchingCubesError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionConfig {
    /// Region to walk and its cell size.
    pub region: GridRegion,
    /// Finite-difference step used to estimate normals. Default: `0.001`.
    pub normal_step: Value,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            region: GridRegion::default(),
            normal_step: DEFAULT_NORMAL_STEP,
        }
    }
}

impl ExtractionConfig {
    /// Creates a config for `region` with the default normal step.
    pub fn new(region: GridRegion) -> Self {
        Self {
            region,
            normal_step: DEFAULT_NORMAL_STEP,
        }
    }

    /// Creates a config for the cube `[-extent, extent]` with cells of edge `cell_size`.
    pub fn cube(extent: Value, cell_size: Value) -> Result<Self> {
        GridRegion::cube(extent, cell_size).map(Self::new)
    }

    /// Sets the finite-difference step used for normals.
    pub fn with_normal_step(mut self, normal_step: Value) -> Self {
        self.normal_step = normal_step;
        self
    }

    /// Checks the settings that are not validated on construction.
    ///
    /// Returns [`MarchingCubesError::InvalidNormalStep`] if the normal step is not a
    /// positive finite number.
    pub fn validate(&self) -> Result<()> {
        if !(self.normal_step.is_finite() && self.normal_step > 0.0) {
            return Err(MarchingCubesError::InvalidNormalStep(self.normal_step));
        }
        Ok(())
    }
}
