//! The spatial graph: quantized keys, hybrid storage, layers, attributes.

use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::debug;

use crate::aggregate::Accumulator;
use crate::node::quantize;
use crate::{Aggregation, Csr, Edge, GraphError, Node};

/// Default number of fractional digits kept by the coordinate key.
const DEFAULT_PRECISION: u32 = 4;

/// The induced view from a single parent node: the node plus its outgoing
/// edges in the default cost layer.
#[derive(Debug, Clone, Copy)]
pub struct Subgraph<'g> {
    /// The parent node.
    pub node: &'g Node,
    /// Outgoing edges of the parent.
    pub edges: &'g [Edge],
}

/// A weighted directed graph keyed by 3-D coordinates.
///
/// Nodes are identified by their position after rounding to a fixed number
/// of fractional digits (4 by default), so re-inserting a coordinate that
/// drifted by less than the rounding unit returns the existing node. Ids
/// are dense, stable, and never reused.
///
/// Mutation goes to per-node adjacency lists. Analysis reads the CSR built
/// by [`compress`](Self::compress); any mutation invalidates it, and it is
/// rebuilt on demand. Named cost layers overlay alternate scores on the
/// default topology; they cannot introduce edges of their own.
///
/// # Example
///
/// ```
/// use vantage_graph::{Aggregation, Graph};
/// use nalgebra::Point3;
///
/// let mut graph = Graph::new();
/// let a = Point3::new(0.0, 0.0, 0.0);
/// let b = Point3::new(3.0, 0.0, 0.0);
/// let c = Point3::new(0.0, 4.0, 0.0);
///
/// graph.add_edge(a, b, 3.0);
/// graph.add_edge(a, c, 4.0);
///
/// let sums = graph
///     .aggregate_costs(Aggregation::Sum, true, None)
///     .unwrap();
/// assert_eq!(sums, vec![7.0, 0.0, 0.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Graph {
    precision: u32,
    nodes: Vec<Node>,
    index: HashMap<[i64; 3], u32>,
    /// Default-layer adjacency, one row per node id.
    adjacency: Vec<Vec<Edge>>,
    /// Alternate cost layers keyed by name; values map `(parent, child)`
    /// to the overlay score.
    layers: HashMap<String, HashMap<(u32, u32), f32>>,
    /// Named node attributes keyed by name, then by node id.
    attributes: HashMap<String, HashMap<u32, String>>,
    default_csr: Option<Csr>,
    layer_csr: HashMap<String, Csr>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Create an empty graph with the default coordinate precision.
    #[must_use]
    pub fn new() -> Self {
        Self::with_precision(DEFAULT_PRECISION)
    }

    /// Create an empty graph keyed at `precision` fractional digits.
    #[must_use]
    pub fn with_precision(precision: u32) -> Self {
        Self {
            precision,
            nodes: Vec::new(),
            index: HashMap::new(),
            adjacency: Vec::new(),
            layers: HashMap::new(),
            attributes: HashMap::new(),
            default_csr: None,
            layer_csr: HashMap::new(),
        }
    }

    /// Insert a node, returning its id.
    ///
    /// Re-inserting an equivalent coordinate returns the existing id.
    pub fn insert_node(&mut self, position: Point3<f32>) -> u32 {
        self.insert_node_inner(position, None)
    }

    /// Insert a node carrying an application-defined tag.
    ///
    /// The tag is only recorded when the coordinate mints a new node.
    pub fn insert_node_with_tag(&mut self, position: Point3<f32>, tag: i32) -> u32 {
        self.insert_node_inner(position, Some(tag))
    }

    fn insert_node_inner(&mut self, position: Point3<f32>, tag: Option<i32>) -> u32 {
        let key = quantize(&position, self.precision);
        if let Some(&id) = self.index.get(&key) {
            return id;
        }

        #[allow(clippy::cast_possible_truncation)]
        let id = self.nodes.len() as u32;
        self.index.insert(key, id);
        self.nodes.push(Node { id, position, tag });
        self.adjacency.push(Vec::new());
        self.invalidate();
        id
    }

    /// Look up the id of a coordinate, if present.
    #[must_use]
    pub fn get_id(&self, position: &Point3<f32>) -> Option<u32> {
        self.index
            .get(&quantize(position, self.precision))
            .copied()
    }

    /// All nodes in id order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges in the default layer.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Add an edge to the default layer, inserting either endpoint if absent.
    ///
    /// Returns the `(parent, child)` ids. An existing edge between the two
    /// nodes has its score overwritten.
    pub fn add_edge(&mut self, parent: Point3<f32>, child: Point3<f32>, score: f32) -> (u32, u32) {
        self.add_edge_with_type(parent, child, score, 0)
    }

    /// Add an edge with an explicit step-type classifier.
    pub fn add_edge_with_type(
        &mut self,
        parent: Point3<f32>,
        child: Point3<f32>,
        score: f32,
        step_type: i32,
    ) -> (u32, u32) {
        let parent_id = self.insert_node(parent);
        let child_id = self.insert_node(child);
        self.upsert_edge(parent_id, child_id, score, step_type);
        (parent_id, child_id)
    }

    /// Add an edge between existing nodes by id.
    ///
    /// # Errors
    ///
    /// [`GraphError::NoSuchNode`] if either id is out of range.
    pub fn add_edge_by_id(
        &mut self,
        parent: u32,
        child: u32,
        score: f32,
    ) -> Result<(), GraphError> {
        self.check_node(parent)?;
        self.check_node(child)?;
        self.upsert_edge(parent, child, score, 0);
        Ok(())
    }

    /// Bulk default-layer insertion; equivalent to repeated
    /// [`add_edge`](Self::add_edge).
    pub fn add_edges(&mut self, batch: &[(Point3<f32>, Point3<f32>, f32)]) {
        for &(parent, child, score) in batch {
            self.add_edge(parent, child, score);
        }
    }

    /// Write an edge score into a named cost layer.
    ///
    /// Layers overlay the default topology: the edge must already exist in
    /// the default layer. The layer is created on first write.
    ///
    /// # Errors
    ///
    /// - [`GraphError::NoSuchNode`] if either id is out of range
    /// - [`GraphError::EdgeNotInDefaultLayer`] if the default layer has no
    ///   such edge
    pub fn add_edge_to_layer(
        &mut self,
        parent: u32,
        child: u32,
        score: f32,
        layer: &str,
    ) -> Result<(), GraphError> {
        self.check_node(parent)?;
        self.check_node(child)?;
        if !self.adjacency[parent as usize]
            .iter()
            .any(|e| e.child == child)
        {
            return Err(GraphError::EdgeNotInDefaultLayer { parent, child });
        }

        self.layers
            .entry(layer.to_owned())
            .or_default()
            .insert((parent, child), score);
        self.layer_csr.remove(layer);
        Ok(())
    }

    /// Bulk overlay insertion into a named cost layer.
    ///
    /// # Errors
    ///
    /// As [`add_edge_to_layer`](Self::add_edge_to_layer); fails on the first
    /// offending entry.
    pub fn add_edges_to_layer(
        &mut self,
        layer: &str,
        batch: &[(u32, u32, f32)],
    ) -> Result<(), GraphError> {
        for &(parent, child, score) in batch {
            self.add_edge_to_layer(parent, child, score, layer)?;
        }
        Ok(())
    }

    /// The cost of traversing `parent -> child`.
    ///
    /// # Errors
    ///
    /// - [`GraphError::NoSuchNode`] if either id is out of range
    /// - [`GraphError::CostLayerNotFound`] for an unknown layer name
    /// - [`GraphError::NoSuchEdge`] if the edge is absent from the layer
    pub fn get_cost(
        &self,
        parent: u32,
        child: u32,
        layer: Option<&str>,
    ) -> Result<f32, GraphError> {
        self.check_node(parent)?;
        self.check_node(child)?;
        match layer {
            None => self.adjacency[parent as usize]
                .iter()
                .find(|e| e.child == child)
                .map(|e| e.score)
                .ok_or(GraphError::NoSuchEdge { parent, child }),
            Some(name) => self
                .layers
                .get(name)
                .ok_or_else(|| GraphError::CostLayerNotFound {
                    name: name.to_owned(),
                })?
                .get(&(parent, child))
                .copied()
                .ok_or(GraphError::NoSuchEdge { parent, child }),
        }
    }

    /// Outgoing default-layer edges of a node.
    ///
    /// # Errors
    ///
    /// [`GraphError::NoSuchNode`] if the id is out of range.
    pub fn edges_from(&self, id: u32) -> Result<&[Edge], GraphError> {
        self.check_node(id)?;
        Ok(&self.adjacency[id as usize])
    }

    /// Iterate over the subgraphs of every node with at least one outgoing
    /// edge, in ascending parent id.
    pub fn subgraphs(&self) -> impl Iterator<Item = Subgraph<'_>> {
        self.nodes
            .iter()
            .zip(self.adjacency.iter())
            .filter(|(_, edges)| !edges.is_empty())
            .map(|(node, edges)| Subgraph {
                node,
                edges: edges.as_slice(),
            })
    }

    /// Drop all nodes, edges, layers and attributes.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.adjacency.clear();
        self.layers.clear();
        self.attributes.clear();
        self.invalidate();
    }

    /// Remove a named cost layer entirely.
    ///
    /// # Errors
    ///
    /// [`GraphError::CostLayerNotFound`] if no such layer exists.
    pub fn clear_layer(&mut self, layer: &str) -> Result<(), GraphError> {
        if self.layers.remove(layer).is_none() {
            return Err(GraphError::CostLayerNotFound {
                name: layer.to_owned(),
            });
        }
        self.layer_csr.remove(layer);
        Ok(())
    }

    /// Whether the CSR form is current.
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        self.default_csr.is_some()
    }

    /// Build the default-layer CSR from the adjacency lists.
    ///
    /// Sorts each row's children ascending. Idempotent: recompressing an
    /// already-compressed graph is a no-op.
    pub fn compress(&mut self) {
        if self.default_csr.is_some() {
            return;
        }

        for row in &mut self.adjacency {
            row.sort_unstable_by_key(|e| e.child);
        }

        let nnz = self.edge_count();
        let mut data = Vec::with_capacity(nnz);
        let mut inner = Vec::with_capacity(nnz);
        let mut outer = Vec::with_capacity(self.nodes.len() + 1);
        outer.push(0);
        for row in &self.adjacency {
            for edge in row {
                data.push(edge.score);
                inner.push(edge.child);
            }
            outer.push(data.len());
        }

        debug!(nodes = self.nodes.len(), nnz, "compressed graph");
        self.default_csr = Some(Csr::new(data, inner, outer));
    }

    /// The CSR form for the default layer (`None`) or a named cost layer.
    ///
    /// Compresses the graph first if needed. A layer CSR covers only the
    /// edges present in that layer, but its row-offset array still spans
    /// every node.
    ///
    /// # Errors
    ///
    /// [`GraphError::CostLayerNotFound`] for an unknown layer name.
    pub fn csr(&mut self, layer: Option<&str>) -> Result<&Csr, GraphError> {
        self.compress();
        match layer {
            None => self.default_csr.as_ref().ok_or(GraphError::InvariantViolated {
                detail: "compress left no default CSR",
            }),
            Some(name) => {
                let overlay = self
                    .layers
                    .get(name)
                    .ok_or_else(|| GraphError::CostLayerNotFound {
                        name: name.to_owned(),
                    })?;
                if !self.layer_csr.contains_key(name) {
                    let csr = build_overlay_csr(&self.adjacency, overlay);
                    self.layer_csr.insert(name.to_owned(), csr);
                }
                self.layer_csr
                    .get(name)
                    .ok_or(GraphError::InvariantViolated {
                        detail: "layer CSR vanished after build",
                    })
            }
        }
    }

    /// Reduce each node's incident edge scores to a single value.
    ///
    /// With `directed = true` only outgoing edges count; otherwise incoming
    /// edges are included as well, each directed edge contributing once to
    /// each incident endpoint. Compresses the graph if needed.
    ///
    /// # Errors
    ///
    /// [`GraphError::CostLayerNotFound`] for an unknown layer name.
    pub fn aggregate_costs(
        &mut self,
        aggregation: Aggregation,
        directed: bool,
        layer: Option<&str>,
    ) -> Result<Vec<f32>, GraphError> {
        let node_count = self.nodes.len();
        let csr = self.csr(layer)?;

        let mut accumulators = vec![Accumulator::default(); node_count];
        for parent in 0..csr.rows() {
            let Some((children, scores)) = csr.row(parent) else {
                continue;
            };
            for (&child, &score) in children.iter().zip(scores) {
                accumulators[parent].push(score);
                if !directed {
                    accumulators[child as usize].push(score);
                }
            }
        }

        Ok(accumulators
            .iter()
            .map(|acc| acc.finish(aggregation))
            .collect())
    }

    /// Assign a named attribute to the listed nodes.
    ///
    /// `ids` and `values` are parallel arrays. The attribute is created on
    /// first write; existing values for a node are overwritten.
    ///
    /// # Errors
    ///
    /// - [`GraphError::LengthMismatch`] if the arrays differ in length
    /// - [`GraphError::NoSuchNode`] if any id is out of range
    pub fn add_node_attribute(
        &mut self,
        name: &str,
        ids: &[u32],
        values: &[String],
    ) -> Result<(), GraphError> {
        if ids.len() != values.len() {
            return Err(GraphError::LengthMismatch {
                left: ids.len(),
                right: values.len(),
            });
        }
        for &id in ids {
            self.check_node(id)?;
        }

        let entries = self.attributes.entry(name.to_owned()).or_default();
        for (&id, value) in ids.iter().zip(values) {
            entries.insert(id, value.clone());
        }
        Ok(())
    }

    /// Read a named attribute as a dense vector indexed by node id.
    ///
    /// Nodes without a value for the attribute yield `None`.
    ///
    /// # Errors
    ///
    /// [`GraphError::AttributeNotFound`] if no such attribute exists.
    pub fn node_attribute(&self, name: &str) -> Result<Vec<Option<String>>, GraphError> {
        let entries = self
            .attributes
            .get(name)
            .ok_or_else(|| GraphError::AttributeNotFound {
                name: name.to_owned(),
            })?;

        #[allow(clippy::cast_possible_truncation)]
        let dense = (0..self.nodes.len() as u32)
            .map(|id| entries.get(&id).cloned())
            .collect();
        Ok(dense)
    }

    /// Remove a named attribute and all its values.
    ///
    /// # Errors
    ///
    /// [`GraphError::AttributeNotFound`] if no such attribute exists.
    pub fn clear_attribute(&mut self, name: &str) -> Result<(), GraphError> {
        if self.attributes.remove(name).is_none() {
            return Err(GraphError::AttributeNotFound {
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    /// Check that the compressed form, when present, matches the adjacency
    /// lists.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvariantViolated`] on any desync; such an error is a
    /// bug in this crate.
    pub fn validate_compressed(&self) -> Result<(), GraphError> {
        let Some(csr) = &self.default_csr else {
            return Ok(());
        };
        csr.validate()?;
        if csr.rows() != self.nodes.len() {
            return Err(GraphError::InvariantViolated {
                detail: "CSR row count differs from node count",
            });
        }
        if csr.nnz() != self.edge_count() {
            return Err(GraphError::InvariantViolated {
                detail: "CSR nnz differs from adjacency edge count",
            });
        }
        Ok(())
    }

    fn upsert_edge(&mut self, parent: u32, child: u32, score: f32, step_type: i32) {
        let row = &mut self.adjacency[parent as usize];
        if let Some(edge) = row.iter_mut().find(|e| e.child == child) {
            edge.score = score;
            edge.step_type = step_type;
        } else {
            row.push(Edge {
                child,
                score,
                step_type,
            });
        }
        self.invalidate();
    }

    fn check_node(&self, id: u32) -> Result<(), GraphError> {
        if (id as usize) < self.nodes.len() {
            Ok(())
        } else {
            Err(GraphError::NoSuchNode { id })
        }
    }

    /// Drop every cached CSR; called on any mutation.
    fn invalidate(&mut self) {
        self.default_csr = None;
        self.layer_csr.clear();
    }
}

/// Build a layer's CSR: default-layer topology filtered to overlay edges.
fn build_overlay_csr(adjacency: &[Vec<Edge>], overlay: &HashMap<(u32, u32), f32>) -> Csr {
    let mut data = Vec::with_capacity(overlay.len());
    let mut inner = Vec::with_capacity(overlay.len());
    let mut outer = Vec::with_capacity(adjacency.len() + 1);
    outer.push(0);

    #[allow(clippy::cast_possible_truncation)]
    for (parent, row) in adjacency.iter().enumerate() {
        for edge in row {
            if let Some(&score) = overlay.get(&(parent as u32, edge.child)) {
                data.push(score);
                inner.push(edge.child);
            }
        }
        outer.push(data.len());
    }

    Csr::new(data, inner, outer)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32, z: f32) -> Point3<f32> {
        Point3::new(x, y, z)
    }

    /// Three nodes, all six directed edges, scores 1..=6.
    fn triangle_graph() -> Graph {
        let mut graph = Graph::new();
        let n0 = p(0.0, 0.0, 0.0);
        let n1 = p(1.0, 0.0, 0.0);
        let n2 = p(2.0, 0.0, 0.0);

        graph.add_edge(n0, n1, 1.0);
        graph.add_edge(n0, n2, 2.0);
        graph.add_edge(n1, n0, 3.0);
        graph.add_edge(n1, n2, 4.0);
        graph.add_edge(n2, n0, 5.0);
        graph.add_edge(n2, n1, 6.0);
        graph
    }

    #[test]
    fn test_ids_are_dense_and_stable() {
        let mut graph = Graph::new();
        assert_eq!(graph.insert_node(p(0.0, 0.0, 0.0)), 0);
        assert_eq!(graph.insert_node(p(1.0, 0.0, 0.0)), 1);
        // Re-insertion returns the existing id
        assert_eq!(graph.insert_node(p(0.0, 0.0, 0.0)), 0);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_quantized_lookup() {
        let mut graph = Graph::new();
        let id = graph.insert_node(p(1.0, 2.0, 3.0));

        // Drift below the rounding unit resolves to the same node
        assert_eq!(graph.get_id(&p(1.000_04, 1.999_96, 3.0)), Some(id));
        assert_eq!(graph.get_id(&p(1.001, 2.0, 3.0)), None);
    }

    #[test]
    fn test_add_edge_mints_nodes() {
        let mut graph = Graph::new();
        let (parent, child) = graph.add_edge(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0), 2.5);
        assert_eq!((parent, child), (0, 1));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.get_cost(0, 1, None).unwrap(), 2.5);
    }

    #[test]
    fn test_add_edge_overwrites() {
        let mut graph = Graph::new();
        graph.add_edge(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), 1.0);
        graph.add_edge(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), 9.0);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.get_cost(0, 1, None).unwrap(), 9.0);
    }

    #[test]
    fn test_compress_layout() {
        let mut graph = triangle_graph();
        let csr = graph.csr(None).unwrap();

        assert_eq!(csr.nnz(), 6);
        assert_eq!(csr.rows(), 3);
        assert_eq!(csr.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(csr.inner_indices(), &[1, 2, 0, 2, 0, 1]);
        assert_eq!(csr.outer_indices(), &[0, 2, 4, 6]);
    }

    #[test]
    fn test_compress_is_idempotent() {
        let mut graph = triangle_graph();
        graph.compress();
        let first = graph.csr(None).unwrap().clone();
        graph.compress();
        let second = graph.csr(None).unwrap().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_mutation_invalidates_csr() {
        let mut graph = triangle_graph();
        graph.compress();
        assert!(graph.is_compressed());

        graph.add_edge(p(0.0, 0.0, 0.0), p(9.0, 0.0, 0.0), 1.0);
        assert!(!graph.is_compressed());

        graph.compress();
        assert!(graph.validate_compressed().is_ok());
    }

    #[test]
    fn test_clear_and_rebuild_equivalent() {
        let mut graph = triangle_graph();
        let before = graph.csr(None).unwrap().clone();

        graph.clear();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);

        let mut rebuilt = triangle_graph();
        let after = rebuilt.csr(None).unwrap().clone();
        assert_eq!(before, after);
    }

    #[test]
    fn test_layer_requires_default_edge() {
        let mut graph = triangle_graph();
        assert_eq!(
            graph.add_edge_to_layer(0, 0, 1.0, "alt"),
            Err(GraphError::EdgeNotInDefaultLayer { parent: 0, child: 0 })
        );
        assert!(graph.add_edge_to_layer(0, 1, 10.0, "alt").is_ok());
        assert_eq!(graph.get_cost(0, 1, Some("alt")).unwrap(), 10.0);
        // The default layer is untouched
        assert_eq!(graph.get_cost(0, 1, None).unwrap(), 1.0);
    }

    #[test]
    fn test_layer_csr_covers_only_layer_edges() {
        let mut graph = triangle_graph();
        graph.add_edge_to_layer(1, 2, 40.0, "alt").unwrap();
        graph.add_edge_to_layer(2, 0, 50.0, "alt").unwrap();

        let csr = graph.csr(Some("alt")).unwrap();
        assert_eq!(csr.nnz(), 2);
        // Offsets still span every node
        assert_eq!(csr.outer_indices(), &[0, 0, 1, 2]);
        assert_eq!(csr.inner_indices(), &[2, 0]);
        assert_eq!(csr.data(), &[40.0, 50.0]);
    }

    #[test]
    fn test_unknown_layer() {
        let mut graph = triangle_graph();
        assert!(matches!(
            graph.csr(Some("nope")),
            Err(GraphError::CostLayerNotFound { .. })
        ));
        assert!(matches!(
            graph.get_cost(0, 1, Some("nope")),
            Err(GraphError::CostLayerNotFound { .. })
        ));
    }

    #[test]
    fn test_clear_layer() {
        let mut graph = triangle_graph();
        graph.add_edge_to_layer(0, 1, 10.0, "alt").unwrap();
        graph.clear_layer("alt").unwrap();
        assert!(matches!(
            graph.clear_layer("alt"),
            Err(GraphError::CostLayerNotFound { .. })
        ));
    }

    #[test]
    fn test_aggregate_sum_directed() {
        let mut graph = triangle_graph();
        let sums = graph.aggregate_costs(Aggregation::Sum, true, None).unwrap();
        assert_eq!(sums, vec![3.0, 7.0, 11.0]);
    }

    #[test]
    fn test_aggregate_sum_undirected() {
        // Each directed edge also contributes to its child
        let mut graph = triangle_graph();
        let sums = graph
            .aggregate_costs(Aggregation::Sum, false, None)
            .unwrap();
        assert_eq!(sums, vec![11.0, 14.0, 17.0]);
    }

    #[test]
    fn test_aggregate_other_reductions() {
        let mut graph = triangle_graph();
        assert_eq!(
            graph
                .aggregate_costs(Aggregation::Count, true, None)
                .unwrap(),
            vec![2.0, 2.0, 2.0]
        );
        assert_eq!(
            graph.aggregate_costs(Aggregation::Max, true, None).unwrap(),
            vec![2.0, 4.0, 6.0]
        );
        assert_eq!(
            graph.aggregate_costs(Aggregation::Min, true, None).unwrap(),
            vec![1.0, 3.0, 5.0]
        );
        assert_eq!(
            graph
                .aggregate_costs(Aggregation::Average, true, None)
                .unwrap(),
            vec![1.5, 3.5, 5.5]
        );
    }

    #[test]
    fn test_aggregate_isolated_node() {
        let mut graph = Graph::new();
        graph.add_edge(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), 5.0);
        graph.insert_node(p(2.0, 0.0, 0.0));

        let sums = graph.aggregate_costs(Aggregation::Sum, true, None).unwrap();
        assert_eq!(sums, vec![5.0, 0.0, 0.0]);

        let avgs = graph
            .aggregate_costs(Aggregation::Average, true, None)
            .unwrap();
        assert_eq!(avgs[0], 5.0);
        assert!(avgs[1].is_nan());
        assert!(avgs[2].is_nan());
    }

    #[test]
    fn test_aggregate_over_layer() {
        let mut graph = triangle_graph();
        graph.add_edge_to_layer(0, 1, 100.0, "alt").unwrap();
        let sums = graph
            .aggregate_costs(Aggregation::Sum, true, Some("alt"))
            .unwrap();
        assert_eq!(sums, vec![100.0, 0.0, 0.0]);
    }

    #[test]
    fn test_edges_from_and_subgraphs() {
        let mut graph = triangle_graph();
        graph.insert_node(p(9.0, 9.0, 9.0));

        let edges = graph.edges_from(0).unwrap();
        assert_eq!(edges.len(), 2);
        assert!(matches!(
            graph.edges_from(99),
            Err(GraphError::NoSuchNode { id: 99 })
        ));

        // The isolated node contributes no subgraph
        let subgraphs: Vec<_> = graph.subgraphs().collect();
        assert_eq!(subgraphs.len(), 3);
        assert_eq!(subgraphs[0].node.id, 0);
        assert_eq!(subgraphs[0].edges.len(), 2);
    }

    #[test]
    fn test_step_type_round_trip() {
        let mut graph = Graph::new();
        graph.add_edge_with_type(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), 1.0, 7);
        assert_eq!(graph.edges_from(0).unwrap()[0].step_type, 7);
    }

    #[test]
    fn test_node_tags() {
        let mut graph = Graph::new();
        let id = graph.insert_node_with_tag(p(0.0, 0.0, 0.0), 3);
        assert_eq!(graph.nodes()[id as usize].tag, Some(3));

        // Re-insertion does not overwrite the tag
        graph.insert_node_with_tag(p(0.0, 0.0, 0.0), 9);
        assert_eq!(graph.nodes()[id as usize].tag, Some(3));
    }

    #[test]
    fn test_attributes() {
        let mut graph = triangle_graph();
        graph
            .add_node_attribute("kind", &[0, 2], &["start".into(), "goal".into()])
            .unwrap();

        let dense = graph.node_attribute("kind").unwrap();
        assert_eq!(dense.len(), 3);
        assert_eq!(dense[0].as_deref(), Some("start"));
        assert_eq!(dense[1], None);
        assert_eq!(dense[2].as_deref(), Some("goal"));

        graph.clear_attribute("kind").unwrap();
        assert!(matches!(
            graph.node_attribute("kind"),
            Err(GraphError::AttributeNotFound { .. })
        ));
    }

    #[test]
    fn test_attribute_errors() {
        let mut graph = triangle_graph();
        assert_eq!(
            graph.add_node_attribute("a", &[0, 1], &["x".into()]),
            Err(GraphError::LengthMismatch { left: 2, right: 1 })
        );
        assert_eq!(
            graph.add_node_attribute("a", &[42], &["x".into()]),
            Err(GraphError::NoSuchNode { id: 42 })
        );
        assert!(matches!(
            graph.clear_attribute("a"),
            Err(GraphError::AttributeNotFound { .. })
        ));
    }

    #[test]
    fn test_add_edge_by_id_requires_nodes() {
        let mut graph = Graph::new();
        assert_eq!(
            graph.add_edge_by_id(0, 1, 1.0),
            Err(GraphError::NoSuchNode { id: 0 })
        );
    }

    #[test]
    fn test_empty_graph_compress() {
        let mut graph = Graph::new();
        let csr = graph.csr(None).unwrap();
        assert_eq!(csr.nnz(), 0);
        assert_eq!(csr.rows(), 0);
        assert_eq!(csr.outer_indices(), &[0]);
    }
}
