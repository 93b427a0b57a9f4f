//! Bounding volume hierarchy for ray queries.
//!
//! A binary BVH built by median split along the longest axis, with leaves
//! holding small runs of triangle indices. Closest-hit traversal visits
//! children near-to-far and prunes nodes behind the best hit found so far;
//! occlusion traversal stops at the first accepted triangle.

use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;
use vantage_mesh::Aabb;

/// Maximum triangles per leaf node.
const MAX_LEAF_SIZE: usize = 8;

/// BVH node containing either leaf triangles or child nodes.
#[derive(Debug, Clone)]
enum BvhNode {
    /// Leaf node containing triangle indices.
    Leaf {
        bbox: Aabb,
        triangles: SmallVec<[u32; 8]>,
    },
    /// Internal node with two children.
    Internal {
        bbox: Aabb,
        left: Box<Self>,
        right: Box<Self>,
    },
}

impl BvhNode {
    fn bbox(&self) -> &Aabb {
        match self {
            Self::Leaf { bbox, .. } | Self::Internal { bbox, .. } => bbox,
        }
    }
}

/// Bounding volume hierarchy over a triangle set.
///
/// The structure is immutable once built; traversal takes `&self` and keeps
/// all mutable state on the querying thread's stack, so concurrent queries
/// are safe.
#[derive(Debug, Clone, Default)]
pub(crate) struct Bvh {
    root: Option<BvhNode>,
    triangle_count: usize,
}

impl Bvh {
    /// Build a BVH over triangle bounding boxes.
    ///
    /// `bounds[i]` must be the bounding box of triangle `i`; the indices
    /// stored in the leaves refer back into that numbering.
    pub(crate) fn build(bounds: &[Aabb]) -> Self {
        if bounds.is_empty() {
            return Self {
                root: None,
                triangle_count: 0,
            };
        }

        let indices: Vec<usize> = (0..bounds.len()).collect();
        let root = Self::build_recursive(bounds, indices);

        Self {
            root: Some(root),
            triangle_count: bounds.len(),
        }
    }

    fn build_recursive(bounds: &[Aabb], indices: Vec<usize>) -> BvhNode {
        let mut bbox = Aabb::empty();
        for &i in &indices {
            bbox.expand(&bounds[i]);
        }

        if indices.len() <= MAX_LEAF_SIZE {
            #[allow(clippy::cast_possible_truncation)]
            let triangles: SmallVec<[u32; 8]> = indices.iter().map(|&i| i as u32).collect();
            return BvhNode::Leaf { bbox, triangles };
        }

        // Median split along the longest axis
        let axis = bbox.longest_axis();
        let mut sorted_indices = indices;
        sorted_indices.sort_by(|&a, &b| {
            let ca = bounds[a].center()[axis];
            let cb = bounds[b].center()[axis];
            ca.total_cmp(&cb)
        });

        let mid = sorted_indices.len() / 2;
        let right_indices = sorted_indices.split_off(mid);
        let left = Self::build_recursive(bounds, sorted_indices);
        let right = Self::build_recursive(bounds, right_indices);

        BvhNode::Internal {
            bbox,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Number of triangles indexed by this BVH.
    pub(crate) const fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// Find the closest accepted triangle hit along a ray.
    ///
    /// `test` receives a candidate triangle index and the current cutoff
    /// distance, and returns the candidate's parametric hit distance if it
    /// hits within the cutoff. The result is independent of traversal order:
    /// the minimum distance wins, with the lower triangle index breaking
    /// exact ties.
    pub(crate) fn closest<F>(
        &self,
        origin: &Point3<f32>,
        direction: &Vector3<f32>,
        t_max: f32,
        mut test: F,
    ) -> Option<(u32, f32)>
    where
        F: FnMut(u32, f32) -> Option<f32>,
    {
        let root = self.root.as_ref()?;
        let inv_dir = Vector3::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z);

        let mut best: Option<(u32, f32)> = None;
        Self::closest_recursive(root, origin, &inv_dir, t_max, &mut best, &mut test);
        best
    }

    fn closest_recursive<F>(
        node: &BvhNode,
        origin: &Point3<f32>,
        inv_dir: &Vector3<f32>,
        t_max: f32,
        best: &mut Option<(u32, f32)>,
        test: &mut F,
    ) where
        F: FnMut(u32, f32) -> Option<f32>,
    {
        let cutoff = best.map_or(t_max, |(_, t)| t.min(t_max));

        match node {
            BvhNode::Leaf { triangles, .. } => {
                for &tri in triangles {
                    let cutoff = best.map_or(t_max, |(_, t)| t.min(t_max));
                    if let Some(t) = test(tri, cutoff) {
                        let closer = match *best {
                            None => true,
                            Some((best_tri, best_t)) => {
                                t < best_t || (t == best_t && tri < best_tri)
                            }
                        };
                        if closer {
                            *best = Some((tri, t));
                        }
                    }
                }
            }
            BvhNode::Internal { left, right, .. } => {
                let entry_left = slab_entry(left.bbox(), origin, inv_dir, cutoff);
                let entry_right = slab_entry(right.bbox(), origin, inv_dir, cutoff);

                // Visit the nearer child first so its hits prune the farther one
                let ordered = match (entry_left, entry_right) {
                    (Some(l), Some(r)) if r < l => [(Some(r), right), (Some(l), left)],
                    _ => [(entry_left, left), (entry_right, right)],
                };

                for (entry, child) in ordered {
                    if let Some(entry) = entry {
                        let cutoff = best.map_or(t_max, |(_, t)| t.min(t_max));
                        if entry <= cutoff {
                            Self::closest_recursive(child, origin, inv_dir, t_max, best, test);
                        }
                    }
                }
            }
        }
    }

    /// Return whether any triangle accepts the ray within `t_max`.
    ///
    /// Traversal stops at the first accepted triangle.
    pub(crate) fn any<F>(
        &self,
        origin: &Point3<f32>,
        direction: &Vector3<f32>,
        t_max: f32,
        mut test: F,
    ) -> bool
    where
        F: FnMut(u32) -> bool,
    {
        let Some(root) = self.root.as_ref() else {
            return false;
        };
        let inv_dir = Vector3::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z);
        Self::any_recursive(root, origin, &inv_dir, t_max, &mut test)
    }

    fn any_recursive<F>(
        node: &BvhNode,
        origin: &Point3<f32>,
        inv_dir: &Vector3<f32>,
        t_max: f32,
        test: &mut F,
    ) -> bool
    where
        F: FnMut(u32) -> bool,
    {
        if slab_entry(node.bbox(), origin, inv_dir, t_max).is_none() {
            return false;
        }
        match node {
            BvhNode::Leaf { triangles, .. } => triangles.iter().any(|&tri| test(tri)),
            BvhNode::Internal { left, right, .. } => {
                Self::any_recursive(left, origin, inv_dir, t_max, test)
                    || Self::any_recursive(right, origin, inv_dir, t_max, test)
            }
        }
    }
}

/// Ray-box slab test.
///
/// Returns the parametric entry distance when the ray overlaps the box
/// within `[0, t_max]`. Infinite inverse components from axis-aligned rays
/// produce NaN slab distances when the origin lies on a box face; `f32::min`
/// and `f32::max` discard the NaN operand, which keeps the test conservative.
fn slab_entry(bbox: &Aabb, origin: &Point3<f32>, inv_dir: &Vector3<f32>, t_max: f32) -> Option<f32> {
    let mut t_entry = 0.0_f32;
    let mut t_exit = t_max;

    for axis in 0..3 {
        let inv = inv_dir[axis];
        let t0 = (bbox.min[axis] - origin[axis]) * inv;
        let t1 = (bbox.max[axis] - origin[axis]) * inv;
        let (near, far) = if inv < 0.0 { (t1, t0) } else { (t0, t1) };

        t_entry = t_entry.max(near);
        t_exit = t_exit.min(far);
        if t_entry > t_exit {
            return None;
        }
    }

    Some(t_entry)
}
