//! Owned triangle mesh with flat vertex and index buffers.

use nalgebra::{Point3, Rotation3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Aabb, MeshError};

/// An owned triangle mesh.
///
/// Vertices are stored as a flat array of coordinate triples and triangles
/// as a flat array of index triples, the layout produced by mesh loaders and
/// consumed directly by the ray engine. Each mesh carries a numeric id used
/// to attribute ray hits back to the mesh that produced them, plus an
/// optional human-readable name.
///
/// # Example
///
/// ```
/// use vantage_mesh::MeshInfo;
///
/// let vertices = vec![
///     -10.0, 10.0, 0.0,
///     -10.0, -10.0, 0.0,
///     10.0, 10.0, 0.0,
///     10.0, -10.0, 0.0,
/// ];
/// let indices = vec![3, 1, 0, 2, 3, 0];
///
/// let plane = MeshInfo::new(0, vertices, indices)
///     .unwrap()
///     .with_name("plane");
///
/// assert_eq!(plane.vertex_count(), 4);
/// assert_eq!(plane.triangle_count(), 2);
/// assert_eq!(plane.name(), Some("plane"));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshInfo {
    id: i32,
    name: Option<String>,
    /// Flat `[x0, y0, z0, x1, y1, z1, ...]` coordinates.
    vertices: Vec<f32>,
    /// Flat `[a0, b0, c0, a1, b1, c1, ...]` triangle indices.
    indices: Vec<u32>,
}

impl MeshInfo {
    /// Euler angles (degrees) rotating a Y-up mesh into the Z-up convention.
    pub const Y_UP_TO_Z_UP: (f32, f32, f32) = (90.0, 0.0, 0.0);

    /// Euler angles (degrees) rotating a Z-up mesh into the Y-up convention.
    pub const Z_UP_TO_Y_UP: (f32, f32, f32) = (-90.0, 0.0, 0.0);

    /// Create a mesh from separate vertex and index buffers.
    ///
    /// # Errors
    ///
    /// - [`MeshError::BufferLength`] if either buffer's length is not a
    ///   multiple of 3
    /// - [`MeshError::Empty`] if the index buffer holds no triangles
    /// - [`MeshError::IndexOutOfRange`] if an index refers past the vertex
    ///   buffer
    pub fn new(id: i32, vertices: Vec<f32>, indices: Vec<u32>) -> Result<Self, MeshError> {
        if vertices.len() % 3 != 0 {
            return Err(MeshError::BufferLength {
                buffer: "vertex",
                len: vertices.len(),
                stride: 3,
            });
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::BufferLength {
                buffer: "index",
                len: indices.len(),
                stride: 3,
            });
        }
        if indices.is_empty() {
            return Err(MeshError::Empty);
        }

        let vertex_count = vertices.len() / 3;
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }

        Ok(Self {
            id,
            name: None,
            vertices,
            indices,
        })
    }

    /// Create a mesh from a flat triangle soup.
    ///
    /// Every nine coordinates form one triangle; indices are sequential.
    ///
    /// # Errors
    ///
    /// - [`MeshError::BufferLength`] if `coords` is not a multiple of 9
    /// - [`MeshError::Empty`] if `coords` is empty
    ///
    /// # Example
    ///
    /// ```
    /// use vantage_mesh::MeshInfo;
    ///
    /// let soup = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    /// let mesh = MeshInfo::from_triangle_soup(0, &soup).unwrap();
    /// assert_eq!(mesh.triangle_count(), 1);
    /// ```
    pub fn from_triangle_soup(id: i32, coords: &[f32]) -> Result<Self, MeshError> {
        if coords.is_empty() {
            return Err(MeshError::Empty);
        }
        if coords.len() % 9 != 0 {
            return Err(MeshError::BufferLength {
                buffer: "triangle soup",
                len: coords.len(),
                stride: 9,
            });
        }

        #[allow(clippy::cast_possible_truncation)]
        let indices: Vec<u32> = (0..coords.len() as u32 / 3).collect();
        Self::new(id, coords.to_vec(), indices)
    }

    /// Attach a name to this mesh.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Rotate every vertex by intrinsic X-Y-Z Euler angles in degrees.
    ///
    /// Used to reconcile Y-up and Z-up authoring conventions at load time;
    /// see [`MeshInfo::Y_UP_TO_Z_UP`].
    pub fn rotate(&mut self, rx_deg: f32, ry_deg: f32, rz_deg: f32) {
        let rotation = Rotation3::from_euler_angles(
            rx_deg.to_radians(),
            ry_deg.to_radians(),
            rz_deg.to_radians(),
        );
        for chunk in self.vertices.chunks_exact_mut(3) {
            let rotated = rotation * Point3::new(chunk[0], chunk[1], chunk[2]);
            chunk[0] = rotated.x;
            chunk[1] = rotated.y;
            chunk[2] = rotated.z;
        }
    }

    /// The mesh's numeric id.
    #[must_use]
    pub const fn id(&self) -> i32 {
        self.id
    }

    /// The mesh's name, if one was set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// The flat vertex coordinate buffer.
    #[must_use]
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// The flat triangle index buffer.
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// The vertex at `index` as a point.
    #[must_use]
    pub fn vertex(&self, index: u32) -> Option<Point3<f32>> {
        let base = index as usize * 3;
        let coords = self.vertices.get(base..base + 3)?;
        Some(Point3::new(coords[0], coords[1], coords[2]))
    }

    /// The corner points of triangle `index`.
    #[must_use]
    pub fn triangle(&self, index: usize) -> Option<[Point3<f32>; 3]> {
        let base = index * 3;
        let tri = self.indices.get(base..base + 3)?;
        Some([
            self.vertex(tri[0])?,
            self.vertex(tri[1])?,
            self.vertex(tri[2])?,
        ])
    }

    /// Iterate over all triangles as corner-point triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f32>; 3]> + '_ {
        (0..self.triangle_count()).filter_map(|i| self.triangle(i))
    }

    /// Axis-aligned bounds of the mesh.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        let mut bounds = Aabb::empty();
        for chunk in self.vertices.chunks_exact(3) {
            bounds.expand_point(&Point3::new(chunk[0], chunk[1], chunk[2]));
        }
        bounds
    }
}
