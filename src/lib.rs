//! Marching Cubes extraction of the zero level set of a scalar field.
//!
//! The field is positive inside the surface. [`extract()`] walks a regular grid, looks
//! each cell up in the case table, interpolates vertices along crossed edges and
//! estimates normals by central differences. Every triangle corner is emitted as its
//! own vertex.

pub mod cell;
pub mod config;
pub mod error;
pub mod extract;
pub mod fields;
pub mod interp;
pub mod lattice;
pub mod mesh;
#[cfg(feature = "bevy")]
pub mod plugin;
pub mod region;
pub mod tables;
pub mod types;

pub use config::ExtractionConfig;
pub use extract::{extract, extract_into, extract_par};
pub use mesh::MeshBuffers;
#[cfg(feature = "bevy")]
pub use plugin::MarchingCubesPlugin;
pub use region::GridRegion;
pub use types::ScalarField;
