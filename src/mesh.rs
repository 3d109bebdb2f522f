use crate::{
    error::{MarchingCubesError, Result},
    interp::EdgeVertex,
    types::{Point, Vector},
};

/// Mesh data produced by one extraction pass.
///
/// Vertices are not shared: every triangle corner is its own vertex, so every group
/// of three consecutive indices is `[n, n + 1, n + 2]`. `normals` is index-aligned
/// with `vertices`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    /// Vertex positions: `[[x, y, z], ...]`
    pub vertices: Vec<[f32; 3]>,

    /// Per-vertex outward normals: `[[nx, ny, nz], ...]`
    pub normals: Vec<[f32; 3]>,

    /// Triangle list indices into `vertices`, three per triangle.
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Creates empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates empty buffers with room for `vertices` vertices.
    pub fn with_capacity(vertices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(vertices),
        }
    }

    /// Empties all three buffers, keeping their allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.normals.clear();
        self.indices.clear();
    }

    /// Appends a vertex and its index, returning the index.
    ///
    /// Returns [`MarchingCubesError::IndexOverflow`] once the vertex count no longer
    /// fits in a `u32`.
    pub fn push_vertex(&mut self, vertex: EdgeVertex) -> Result<u32> {
        let index =
            u32::try_from(self.vertices.len()).map_err(|_| MarchingCubesError::IndexOverflow)?;
        let EdgeVertex { position, normal } = vertex;
        self.indices.push(index);
        self.vertices.push([position.x, position.y, position.z]);
        self.normals.push([normal.x, normal.y, normal.z]);
        Ok(index)
    }

    /// Moves everything in `other` to the end of `self`, rebasing its indices.
    pub fn append(&mut self, other: &mut MeshBuffers) -> Result<()> {
        let base = u32::try_from(self.vertices.len()).map_err(|_| MarchingCubesError::IndexOverflow)?;
        if u32::try_from(self.vertices.len() + other.vertices.len()).is_err() {
            return Err(MarchingCubesError::IndexOverflow);
        }
        self.indices.extend(other.indices.drain(..).map(|i| i + base));
        self.vertices.append(&mut other.vertices);
        self.normals.append(&mut other.normals);
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Index triples of every triangle.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Returns the three vertex positions of triangle `tri`.
    pub fn tri_coords(&self, tri: usize) -> [Point; 3] {
        let t = &self.indices[tri * 3..tri * 3 + 3];
        [t[0], t[1], t[2]].map(|i| Point::from(self.vertices[i as usize]))
    }

    /// Computes the geometric normal of triangle `tri` from its winding.
    ///
    /// Returns the zero vector if the triangle is degenerate.
    pub fn face_normal(&self, tri: usize) -> Vector {
        let [a, b, c] = self.tri_coords(tri);
        (b - a)
            .cross(&(c - b))
            .try_normalize(0.0)
            .unwrap_or_else(Vector::zeros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: f32, y: f32, z: f32) -> EdgeVertex {
        EdgeVertex {
            position: Point::new(x, y, z),
            normal: Vector::z(),
        }
    }

    fn triangle() -> MeshBuffers {
        let mut mesh = MeshBuffers::new();
        for v in [vertex(0.0, 0.0, 0.0), vertex(1.0, 0.0, 0.0), vertex(0.0, 1.0, 0.0)] {
            mesh.push_vertex(v).unwrap();
        }
        mesh
    }

    #[test]
    fn push_keeps_buffers_aligned() {
        let mesh = triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.normals.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[0, 1, 2]]);
    }

    #[test]
    fn face_normal_follows_winding() {
        let mesh = triangle();
        assert_eq!(mesh.face_normal(0), Vector::z());

        let mut flat = MeshBuffers::new();
        for _ in 0..3 {
            flat.push_vertex(vertex(1.0, 1.0, 1.0)).unwrap();
        }
        assert_eq!(flat.face_normal(0), Vector::zeros());
    }

    #[test]
    fn append_rebases_indices() {
        let mut mesh = triangle();
        let mut other = triangle();
        mesh.append(&mut other).unwrap();

        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.vertex_count(), 6);
        assert!(other.vertices.is_empty() && other.indices.is_empty());
    }

    #[test]
    fn clear_empties_everything() {
        let mut mesh = triangle();
        mesh.clear();
        assert!(mesh.is_empty());
        assert_eq!(mesh, MeshBuffers::new());
    }
}
