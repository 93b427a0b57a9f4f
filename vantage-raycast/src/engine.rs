//! The ray engine: shared scene, query surface and parallel fan-out.

use std::sync::Arc;

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use tracing::{debug, info};
use vantage_mesh::{Aabb, MeshInfo};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bvh::Bvh;
use crate::intersect::{moller_trumbore, WatertightRay};
use crate::RaycastError;

/// Result of a closest-hit ray query.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HitRecord {
    /// Parametric distance to the hit. Equals the metric distance when the
    /// query direction is unit length.
    pub distance: f32,
    /// Id of the mesh the hit triangle belongs to.
    pub mesh_id: i32,
    /// Index of the hit triangle within its mesh.
    pub triangle_id: u32,
    /// The hit point in world coordinates.
    pub point: Point3<f32>,
}

/// One triangle of the uploaded scene, tagged with its provenance.
#[derive(Debug, Clone, Copy)]
struct SceneTriangle {
    v0: Point3<f32>,
    v1: Point3<f32>,
    v2: Point3<f32>,
    mesh_id: i32,
    triangle_id: u32,
}

/// The engine's triangle store plus its acceleration structure.
///
/// Triangles past `committed` have been inserted but not committed; the BVH
/// does not cover them and queries do not see them.
#[derive(Debug, Clone, Default)]
struct Scene {
    triangles: Vec<SceneTriangle>,
    mesh_ids: Vec<i32>,
    bvh: Bvh,
    committed: usize,
    bounds: Aabb,
}

impl Scene {
    fn push_mesh(&mut self, mesh: &MeshInfo) -> Result<(), RaycastError> {
        if self.mesh_ids.contains(&mesh.id()) {
            return Err(RaycastError::MeshIdCollision { id: mesh.id() });
        }
        self.mesh_ids.push(mesh.id());

        #[allow(clippy::cast_possible_truncation)]
        for (i, [v0, v1, v2]) in mesh.triangles().enumerate() {
            self.triangles.push(SceneTriangle {
                v0,
                v1,
                v2,
                mesh_id: mesh.id(),
                triangle_id: i as u32,
            });
        }
        Ok(())
    }

    fn commit(&mut self) {
        if self.committed == self.triangles.len() {
            return;
        }

        let bounds: Vec<Aabb> = self
            .triangles
            .iter()
            .map(|t| Aabb::from_triangle(&t.v0, &t.v1, &t.v2))
            .collect();

        let mut scene_bounds = Aabb::empty();
        for b in &bounds {
            scene_bounds.expand(b);
        }

        self.bvh = Bvh::build(&bounds);
        self.committed = self.triangles.len();
        self.bounds = scene_bounds;

        debug!(
            triangles = self.committed,
            meshes = self.mesh_ids.len(),
            "committed scene"
        );
    }
}

/// A thread-safe ray-intersection engine over one or more triangle meshes.
///
/// Cloning shares the underlying scene: clones reference the same immutable
/// acceleration structure, which is freed when the last clone drops.
/// Mutation ([`insert`](Self::insert), [`commit`](Self::commit)) takes
/// `&mut self`; when the scene is shared with clones it is copied on write,
/// so a clone's in-flight queries are never invalidated.
///
/// All queries are read-only and may run concurrently from any number of
/// threads. For a fixed scene and a fixed `(origin, direction, t_max)`,
/// every query returns bitwise-identical results regardless of which thread
/// runs it or what else is running.
#[derive(Debug, Clone)]
pub struct RayEngine {
    scene: Arc<Scene>,
    precise: bool,
}

impl RayEngine {
    /// Build an engine over a single mesh.
    ///
    /// `precise` selects the double-precision watertight triangle test for
    /// every query issued through this engine.
    ///
    /// # Errors
    ///
    /// [`RaycastError::EmptyScene`] if the mesh has no triangles.
    pub fn new(mesh: &MeshInfo, precise: bool) -> Result<Self, RaycastError> {
        Self::from_meshes(std::slice::from_ref(mesh), precise)
    }

    /// Build an engine over several meshes.
    ///
    /// # Errors
    ///
    /// - [`RaycastError::EmptyScene`] if no triangles are supplied
    /// - [`RaycastError::MeshIdCollision`] if two meshes share an id
    pub fn from_meshes(meshes: &[MeshInfo], precise: bool) -> Result<Self, RaycastError> {
        let mut scene = Scene::default();
        for mesh in meshes {
            scene.push_mesh(mesh)?;
        }
        if scene.triangles.is_empty() {
            return Err(RaycastError::EmptyScene);
        }
        scene.commit();

        info!(
            meshes = meshes.len(),
            triangles = scene.committed,
            precise,
            "built ray engine"
        );

        Ok(Self {
            scene: Arc::new(scene),
            precise,
        })
    }

    /// Build an engine over a raw triangle soup.
    ///
    /// Every three consecutive points form one triangle; the whole soup
    /// becomes a single mesh with id 0.
    ///
    /// # Errors
    ///
    /// - [`RaycastError::Mesh`] if the point count is not a multiple of 3
    /// - [`RaycastError::EmptyScene`] if no points are supplied
    pub fn from_triangles(points: &[[f32; 3]], precise: bool) -> Result<Self, RaycastError> {
        if points.is_empty() {
            return Err(RaycastError::EmptyScene);
        }
        let coords: Vec<f32> = points.iter().flatten().copied().collect();
        let mesh = MeshInfo::from_triangle_soup(0, &coords)?;
        Self::new(&mesh, precise)
    }

    /// Insert a mesh into the scene.
    ///
    /// With `commit = false` the geometry is staged: many insertions can be
    /// batched and [`commit`](Self::commit) must be called before queries
    /// will see them. Staged geometry is invisible to queries until then.
    ///
    /// # Errors
    ///
    /// [`RaycastError::MeshIdCollision`] if the mesh id already exists.
    pub fn insert(&mut self, mesh: &MeshInfo, commit: bool) -> Result<(), RaycastError> {
        let scene = Arc::make_mut(&mut self.scene);
        scene.push_mesh(mesh)?;
        if commit {
            scene.commit();
        }
        Ok(())
    }

    /// Rebuild the acceleration structure over all staged geometry.
    ///
    /// A no-op when nothing is staged.
    pub fn commit(&mut self) {
        if self.scene.committed != self.scene.triangles.len() {
            Arc::make_mut(&mut self.scene).commit();
        }
    }

    /// Whether this engine re-tests candidates with the watertight routine.
    #[must_use]
    pub const fn precise(&self) -> bool {
        self.precise
    }

    /// Number of meshes in the scene, staged ones included.
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.scene.mesh_ids.len()
    }

    /// Number of committed triangles visible to queries.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.scene.bvh.triangle_count()
    }

    /// Axis-aligned bounds of the committed scene.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.scene.bounds
    }

    /// Find the closest hit along a ray.
    ///
    /// `t_max` bounds the search and defaults to `+∞`. The direction need
    /// not be unit length; distances are parametric. A miss is `None`,
    /// never an error.
    #[must_use]
    pub fn intersect(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        t_max: Option<f32>,
    ) -> Option<HitRecord> {
        let t_max = t_max.unwrap_or(f32::INFINITY);
        let (tri, distance) = self.closest_hit(&origin, &direction, t_max)?;
        let scene_tri = &self.scene.triangles[tri as usize];
        Some(HitRecord {
            distance,
            mesh_id: scene_tri.mesh_id,
            triangle_id: scene_tri.triangle_id,
            point: origin + direction * distance,
        })
    }

    /// Fire a ray and advance `point` to the hit position.
    ///
    /// On a hit, writes the hit point through `point` and returns `true`;
    /// on a miss, leaves `point` untouched and returns `false`.
    pub fn fire_ray(&self, point: &mut Point3<f32>, direction: Vector3<f32>) -> bool {
        match self.intersect(*point, direction, None) {
            Some(hit) => {
                *point = hit.point;
                true
            }
            None => false,
        }
    }

    /// Fire a ray and report the distance and mesh id of the closest hit.
    #[must_use]
    pub fn fire_any_ray(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        t_max: Option<f32>,
    ) -> Option<(f32, i32)> {
        self.intersect(origin, direction, t_max)
            .map(|hit| (hit.distance, hit.mesh_id))
    }

    /// Any-hit occlusion query.
    ///
    /// Returns `true` when any triangle intersects the ray within
    /// `[0, t_max]`. Cheaper than [`intersect`](Self::intersect) because
    /// traversal stops at the first hit.
    #[must_use]
    pub fn fire_occlusion(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        t_max: f32,
    ) -> bool {
        if direction == Vector3::zeros() {
            return false;
        }
        let triangles = &self.scene.triangles;
        if self.precise {
            let Some(ray) = WatertightRay::new(&origin, &direction) else {
                return false;
            };
            self.scene.bvh.any(&origin, &direction, t_max, |tri| {
                let t = &triangles[tri as usize];
                ray.intersect(&t.v0, &t.v1, &t.v2, t_max).is_some()
            })
        } else {
            self.scene.bvh.any(&origin, &direction, t_max, |tri| {
                let t = &triangles[tri as usize];
                moller_trumbore(&origin, &direction, &t.v0, &t.v1, &t.v2, t_max).is_some()
            })
        }
    }

    /// Closest-hit fan-out over parallel origin/direction arrays.
    ///
    /// Work is dispatched across the rayon pool; the result vector is
    /// positionally aligned with the inputs regardless of completion order.
    ///
    /// # Errors
    ///
    /// [`RaycastError::LengthMismatch`] if the arrays differ in length.
    pub fn fire_many(
        &self,
        origins: &[Point3<f32>],
        directions: &[Vector3<f32>],
        t_max: Option<f32>,
    ) -> Result<Vec<Option<HitRecord>>, RaycastError> {
        if origins.len() != directions.len() {
            return Err(RaycastError::LengthMismatch {
                origins: origins.len(),
                directions: directions.len(),
            });
        }
        Ok(origins
            .par_iter()
            .zip(directions.par_iter())
            .map(|(origin, direction)| self.intersect(*origin, *direction, t_max))
            .collect())
    }

    /// Occlusion fan-out over parallel origin/direction arrays.
    ///
    /// # Errors
    ///
    /// [`RaycastError::LengthMismatch`] if the arrays differ in length.
    pub fn fire_many_occlusions(
        &self,
        origins: &[Point3<f32>],
        directions: &[Vector3<f32>],
        t_max: f32,
    ) -> Result<Vec<bool>, RaycastError> {
        if origins.len() != directions.len() {
            return Err(RaycastError::LengthMismatch {
                origins: origins.len(),
                directions: directions.len(),
            });
        }
        Ok(origins
            .par_iter()
            .zip(directions.par_iter())
            .map(|(origin, direction)| self.fire_occlusion(*origin, *direction, t_max))
            .collect())
    }

    fn closest_hit(
        &self,
        origin: &Point3<f32>,
        direction: &Vector3<f32>,
        t_max: f32,
    ) -> Option<(u32, f32)> {
        if *direction == Vector3::zeros() {
            return None;
        }
        let triangles = &self.scene.triangles;
        if self.precise {
            let ray = WatertightRay::new(origin, direction)?;
            self.scene.bvh.closest(origin, direction, t_max, |tri, cutoff| {
                let t = &triangles[tri as usize];
                let hit = ray.intersect(&t.v0, &t.v1, &t.v2, cutoff)?;
                #[allow(clippy::cast_possible_truncation)]
                let distance = hit as f32;
                Some(distance)
            })
        } else {
            self.scene.bvh.closest(origin, direction, t_max, |tri, cutoff| {
                let t = &triangles[tri as usize];
                moller_trumbore(origin, direction, &t.v0, &t.v1, &t.v2, cutoff)
            })
        }
    }
}
