use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    cell::CellSample,
    config::ExtractionConfig,
    error::Result,
    interp::interpolate_vertex,
    lattice::Lattice,
    mesh::MeshBuffers,
    types::ScalarField,
};

/// Extracts the zero level set of `field` over the configured region.
///
/// ```rust
/// use metaball_mesher::{config::ExtractionConfig, extract::extract, types::Point};
///
/// let sphere = |p: Point| 1.0 - p.coords.norm();
/// let mesh = extract(&sphere, &ExtractionConfig::default())?;
/// assert!(mesh.triangle_count() > 0);
/// # Ok::<(), metaball_mesher::error::MarchingCubesError>(())
/// ```
pub fn extract<F>(field: &F, config: &ExtractionConfig) -> Result<MeshBuffers>
where
    F: ScalarField + ?Sized,
{
    let mut mesh = MeshBuffers::new();
    extract_into(field, config, &mut mesh)?;
    Ok(mesh)
}

/// Like [`extract`], but refills caller-owned buffers so their allocations are reused.
///
/// `mesh` is cleared first. On error it is left empty.
///
/// ```text
/// Per cell (X outer, Z inner):
/// 1. CellSample::sample      →  8 corner values + case index
/// 2. TRI_TABLE[case]         →  edge triples, in winding order
/// 3. interpolate_vertex      →  position + normal per edge
/// 4. MeshBuffers::push_vertex
/// ```
pub fn extract_into<F>(field: &F, config: &ExtractionConfig, mesh: &mut MeshBuffers) -> Result<()>
where
    F: ScalarField + ?Sized,
{
    mesh.clear();
    config.validate()?;

    let region = &config.region;
    let _span = tracing::debug_span!("extract", cells = region.cell_count()).entered();

    let result = region.cells().try_for_each(|cell| {
        let sample = CellSample::sample(field, region, cell)?;
        emit_cell(field, config, &sample, mesh)
    });
    if let Err(err) = result {
        mesh.clear();
        return Err(err);
    }

    tracing::debug!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "extraction finished"
    );
    Ok(())
}

/// Parallel variant of [`extract`] producing identical buffers.
///
/// The lattice is sampled once, then each X slab of cells is meshed on its own
/// Rayon task and the slabs are concatenated in X order.
pub fn extract_par<F>(field: &F, config: &ExtractionConfig) -> Result<MeshBuffers>
where
    F: ScalarField + Sync + ?Sized,
{
    config.validate()?;

    let region = &config.region;
    let _span = tracing::debug_span!("extract_par", cells = region.cell_count()).entered();

    let lattice = Lattice::sample(field, region)?;
    let [size_x, size_y, size_z] = region.cell_counts();

    let per_x: Vec<MeshBuffers> = (0..size_x)
        .into_par_iter()
        .map(|x| -> Result<MeshBuffers> {
            let mut local = MeshBuffers::new();
            for y in 0..size_y {
                for z in 0..size_z {
                    let sample = CellSample::from_lattice(&lattice, region, [x, y, z]);
                    emit_cell(field, config, &sample, &mut local)?;
                }
            }
            Ok(local)
        })
        .collect::<Result<_>>()?;

    // Merge per-X slabs into a single set of buffers
    let total: usize = per_x.iter().map(MeshBuffers::vertex_count).sum();
    let mut mesh = MeshBuffers::with_capacity(total);
    for mut slab in per_x {
        mesh.append(&mut slab)?;
    }

    tracing::debug!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "extraction finished"
    );
    Ok(mesh)
}

/// Appends the triangles of one sampled cell, keeping the table's edge order.
fn emit_cell<F>(
    field: &F,
    config: &ExtractionConfig,
    sample: &CellSample,
    mesh: &mut MeshBuffers,
) -> Result<()>
where
    F: ScalarField + ?Sized,
{
    if sample.is_empty() {
        return Ok(());
    }
    for triangle in sample.triangles() {
        for edge in triangle {
            let vertex = interpolate_vertex(field, sample, edge, config.normal_step)?;
            mesh.push_vertex(vertex)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::MarchingCubesError,
        region::GridRegion,
        types::{Point, Value, Vector},
    };

    #[test]
    fn uniform_fields_produce_nothing() {
        let config = ExtractionConfig::cube(1.0, 0.25).unwrap();
        let inside = extract(&|_: Point| 1.0_f32, &config).unwrap();
        let outside = extract(&|_: Point| -1.0_f32, &config).unwrap();
        let zero = extract(&|_: Point| 0.0_f32, &config).unwrap();

        assert!(inside.is_empty() && outside.is_empty() && zero.is_empty());
        assert_eq!(inside.vertex_count(), 0);
    }

    #[test]
    fn single_inside_corner_gives_octahedron() {
        // Only the origin is strictly inside; its 8 surrounding cells each hold one triangle.
        let config = ExtractionConfig::cube(2.0, 1.0).unwrap();
        let sphere = |p: Point| 1.0 - p.coords.norm();
        let mesh = extract(&sphere, &config).unwrap();

        assert_eq!(mesh.triangle_count(), 8);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.indices, (0..24).collect::<Vec<u32>>());
        for (tri, [a, b, c]) in mesh.triangles().enumerate() {
            let centroid = mesh.tri_coords(tri).iter().map(|p| p.coords).sum::<Vector>() / 3.0;
            assert!(mesh.face_normal(tri).dot(&centroid) > 0.0, "triangle {tri} faces inwards");
            for i in [a, b, c] {
                let p = Point::from(mesh.vertices[i as usize]);
                assert_eq!(p.coords.norm(), 1.0);
            }
        }
    }

    #[test]
    fn extract_into_reuses_buffers() {
        let config = ExtractionConfig::cube(1.5, 0.3).unwrap();
        let sphere = |p: Point| 1.0 - p.coords.norm();
        let expected = extract(&sphere, &config).unwrap();

        let mut mesh = MeshBuffers::new();
        extract_into(&sphere, &config, &mut mesh).unwrap();
        extract_into(&sphere, &config, &mut mesh).unwrap();
        assert_eq!(mesh, expected);
    }

    #[test]
    fn failures_abort_the_pass() {
        let config = ExtractionConfig::cube(1.0, 0.25).unwrap();
        let field = |p: Point| if p.x > 0.5 { Value::NAN } else { 0.2 - p.coords.norm() };

        let mut mesh = MeshBuffers::new();
        let err = extract_into(&field, &config, &mut mesh).unwrap_err();
        assert!(matches!(err, MarchingCubesError::NonFiniteField { .. }));
        assert!(mesh.is_empty());
        assert!(extract_par(&field, &config).is_err());

        let bad_step = config.with_normal_step(0.0);
        assert!(matches!(
            extract(&|p: Point| p.x, &bad_step),
            Err(MarchingCubesError::InvalidNormalStep(_))
        ));
    }

    #[test]
    fn parallel_matches_sequential() {
        let region =
            GridRegion::new(Point::new(-1.3, -1.1, -1.2), Point::new(1.4, 1.2, 1.0), 0.17).unwrap();
        let config = ExtractionConfig::new(region);
        let blob = |p: Point| {
            let a = 0.5 / (p - Point::new(-0.4, 0.0, 0.1)).norm_squared().max(1e-6);
            let b = 0.3 / (p - Point::new(0.5, 0.2, -0.2)).norm_squared().max(1e-6);
            a * 0.25 + b * 0.25 - 0.6
        };

        let sequential = extract(&blob, &config).unwrap();
        let parallel = extract_par(&blob, &config).unwrap();
        assert!(!sequential.is_empty());
        assert_eq!(sequential, parallel);
    }
}
