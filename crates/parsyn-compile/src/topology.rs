//! Device topology with precomputed restricted shortest paths.
//!
//! A [`Topology`] is the undirected connectivity graph of a device: two
//! rows of a parity matrix may only be combined if their nodes share an edge.
//!
//! ## Precomputed tables
//!
//! Elimination of column `k` must not route through rows that already hold
//! an earlier pivot, and back-substitution may only move information from
//! higher to lower rows. On construction the topology therefore builds two
//! families of all-pairs shortest-path tables, one per restriction index
//! `k`:
//!
//! - [`RoutingMode::Upper`]: nodes `>= k`, edges usable in both directions.
//! - [`RoutingMode::Full`]: nodes `<= k`, an edge `(a, b)` usable only from
//!   the larger index to the smaller one.
//!
//! Every entry stores the concrete edge list of the path, so the router can
//! materialize a Steiner tree without re-deriving paths. A missing entry
//! means the pair is unreachable under that restriction, which is a normal
//! outcome.
//!
//! ## Serialization
//!
//! Only `num_nodes` and `edges` are serialized. Deserialization goes through
//! the validating constructor and rebuilds the tables.

use std::fmt;
use std::ops::RangeInclusive;

use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use tracing::debug;

use parsyn_linalg::BitMatrix;

use crate::error::{CompileError, CompileResult};

/// Which restricted distance table a lookup uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
    /// Nodes at or above the restriction index, bidirectional edges.
    Upper,
    /// Nodes at or below the restriction index, edges only point downward.
    Full,
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingMode::Upper => write!(f, "upper"),
            RoutingMode::Full => write!(f, "full"),
        }
    }
}

/// A shortest path: hop count plus the ordered edges walking it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    hops: usize,
    edges: Vec<(usize, usize)>,
}

impl Route {
    fn empty() -> Self {
        Self {
            hops: 0,
            edges: vec![],
        }
    }

    fn edge(src: usize, dst: usize) -> Self {
        Self {
            hops: 1,
            edges: vec![(src, dst)],
        }
    }

    fn join(&self, next: &Route) -> Self {
        let mut edges = Vec::with_capacity(self.edges.len() + next.edges.len());
        edges.extend_from_slice(&self.edges);
        edges.extend_from_slice(&next.edges);
        Self {
            hops: self.hops + next.hops,
            edges,
        }
    }

    /// Number of edges on the path.
    #[inline]
    pub fn hops(&self) -> usize {
        self.hops
    }

    /// The edges in walking order.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Nodes entered along the path, excluding the start node.
    pub fn visited(&self) -> impl Iterator<Item = usize> + '_ {
        self.edges.iter().map(|&(_, dst)| dst)
    }
}

/// All-pairs shortest paths for one restriction.
#[derive(Debug, Clone)]
pub struct DistanceTable {
    num_nodes: usize,
    entries: Vec<Option<Route>>,
}

impl DistanceTable {
    /// Look up the route `src → dst`, `None` if unreachable.
    pub fn get(&self, src: usize, dst: usize) -> Option<&Route> {
        if src >= self.num_nodes || dst >= self.num_nodes {
            return None;
        }
        self.entries[src * self.num_nodes + dst].as_ref()
    }
}

/// Serialized form of a [`Topology`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologySpec {
    /// Number of nodes.
    pub num_nodes: usize,
    /// Undirected edges.
    pub edges: Vec<(usize, usize)>,
}

/// Device connectivity graph with precomputed routing tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TopologySpec", into = "TopologySpec")]
pub struct Topology {
    num_nodes: usize,
    /// Connected node pairs, each stored once.
    edges: Vec<(usize, usize)>,
    adjacency: Vec<Vec<usize>>,
    /// `upper[k]`: nodes `>= k`, bidirectional.
    upper: Vec<DistanceTable>,
    /// `full[k]`: nodes `<= k`, downward only.
    full: Vec<DistanceTable>,
}

impl Topology {
    /// Build from a symmetric adjacency matrix with zero diagonal.
    pub fn from_adjacency(adjacency: &BitMatrix) -> CompileResult<Self> {
        if !adjacency.is_square() {
            return Err(CompileError::InvalidTopology(format!(
                "adjacency matrix is {}x{}, expected square",
                adjacency.rows(),
                adjacency.cols()
            )));
        }
        let n = adjacency.rows();
        let mut edges = Vec::new();
        for r in 0..n {
            if adjacency.get(r, r) {
                return Err(CompileError::InvalidTopology(format!(
                    "self-loop on node {r}"
                )));
            }
            for c in (r + 1)..n {
                if adjacency.get(r, c) != adjacency.get(c, r) {
                    return Err(CompileError::InvalidTopology(format!(
                        "adjacency is asymmetric at ({r}, {c})"
                    )));
                }
                if adjacency.get(r, c) {
                    edges.push((r, c));
                }
            }
        }
        Ok(Self::assemble(n, edges))
    }

    /// Build from an explicit undirected edge list.
    ///
    /// Duplicate edges (including reversed pairs) are ignored.
    pub fn from_edges(num_nodes: usize, edges: &[(usize, usize)]) -> CompileResult<Self> {
        let mut unique: Vec<(usize, usize)> = Vec::with_capacity(edges.len());
        for &(a, b) in edges {
            if a >= num_nodes || b >= num_nodes {
                return Err(CompileError::InvalidTopology(format!(
                    "edge ({a}, {b}) references a node outside 0..{num_nodes}"
                )));
            }
            if a == b {
                return Err(CompileError::InvalidTopology(format!(
                    "self-loop on node {a}"
                )));
            }
            if !unique
                .iter()
                .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
            {
                unique.push((a, b));
            }
        }
        Ok(Self::assemble(num_nodes, unique))
    }

    /// Build from a pre-built petgraph graph. Node `i` of the graph becomes
    /// node `i` of the topology.
    pub fn from_graph<N, E>(graph: &UnGraph<N, E>) -> CompileResult<Self> {
        let edges: Vec<(usize, usize)> = graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
            .collect();
        Self::from_edges(graph.node_count(), &edges)
    }

    /// Create a linear topology (0-1-2-3-...).
    pub fn linear(n: usize) -> Self {
        Self::assemble(n, (1..n).map(|i| (i - 1, i)).collect())
    }

    /// Create a fully connected topology.
    pub fn full(n: usize) -> Self {
        let edges = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();
        Self::assemble(n, edges)
    }

    /// Create a star topology (node 0 connected to all others).
    pub fn star(n: usize) -> Self {
        Self::assemble(n, (1..n).map(|i| (0, i)).collect())
    }

    /// Assemble from validated, duplicate-free edges and precompute tables.
    fn assemble(num_nodes: usize, edges: Vec<(usize, usize)>) -> Self {
        let mut adjacency = vec![Vec::new(); num_nodes];
        for &(a, b) in &edges {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
        let mut topology = Self {
            num_nodes,
            edges,
            adjacency,
            upper: Vec::with_capacity(num_nodes),
            full: Vec::with_capacity(num_nodes),
        };
        for k in 0..num_nodes {
            let upper = topology.shortest_paths(k..=num_nodes - 1, RoutingMode::Upper);
            let full = topology.shortest_paths(0..=k, RoutingMode::Full);
            topology.upper.push(upper);
            topology.full.push(full);
        }
        debug!(
            nodes = num_nodes,
            edges = topology.edges.len(),
            "precomputed restricted distance tables"
        );
        topology
    }

    /// Floyd-Warshall over the nodes in `members`, keeping concrete paths.
    fn shortest_paths(&self, members: RangeInclusive<usize>, mode: RoutingMode) -> DistanceTable {
        let n = self.num_nodes;
        let mut entries: Vec<Option<Route>> = vec![None; n * n];

        for &(a, b) in &self.edges {
            if !members.contains(&a) || !members.contains(&b) {
                continue;
            }
            match mode {
                RoutingMode::Upper => {
                    entries[a * n + b] = Some(Route::edge(a, b));
                    entries[b * n + a] = Some(Route::edge(b, a));
                }
                RoutingMode::Full => {
                    let (hi, lo) = (a.max(b), a.min(b));
                    entries[hi * n + lo] = Some(Route::edge(hi, lo));
                }
            }
        }
        for v in members.clone() {
            entries[v * n + v] = Some(Route::empty());
        }

        for via in members.clone() {
            for src in members.clone() {
                let Some(first_hops) = entries[src * n + via].as_ref().map(Route::hops) else {
                    continue;
                };
                for dst in members.clone() {
                    let Some(second_hops) = entries[via * n + dst].as_ref().map(Route::hops) else {
                        continue;
                    };
                    let hops = first_hops + second_hops;
                    let improves = entries[src * n + dst]
                        .as_ref()
                        .is_none_or(|current| current.hops > hops);
                    if improves {
                        if let (Some(first), Some(second)) =
                            (&entries[src * n + via], &entries[via * n + dst])
                        {
                            entries[src * n + dst] = Some(first.join(second));
                        }
                    }
                }
            }
        }

        DistanceTable {
            num_nodes: n,
            entries,
        }
    }

    /// Number of nodes.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// The undirected edges, each listed once.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Neighbors of a node.
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency.get(node).into_iter().flatten().copied()
    }

    /// Check if two nodes share an edge.
    #[inline]
    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        self.adjacency.get(a).is_some_and(|n| n.contains(&b))
    }

    /// The distance table of `mode` restricted at index `k`.
    pub fn table(&self, mode: RoutingMode, k: usize) -> Option<&DistanceTable> {
        match mode {
            RoutingMode::Upper => self.upper.get(k),
            RoutingMode::Full => self.full.get(k),
        }
    }

    /// Route `src → dst` in the table of `mode` restricted at `k`.
    pub fn route(&self, src: usize, dst: usize, mode: RoutingMode, k: usize) -> Option<&Route> {
        self.table(mode, k).and_then(|t| t.get(src, dst))
    }

    /// Route `src → dst` in the least restricted table of `mode`.
    ///
    /// For [`RoutingMode::Upper`] that is the table over all nodes; for
    /// [`RoutingMode::Full`] it is the table over all nodes with downward
    /// edges only.
    pub fn distance(&self, src: usize, dst: usize, mode: RoutingMode) -> Option<&Route> {
        let k = match mode {
            RoutingMode::Upper => 0,
            RoutingMode::Full => self.num_nodes.checked_sub(1)?,
        };
        self.route(src, dst, mode, k)
    }

    /// Whether the graph is connected.
    pub fn is_connected(&self) -> bool {
        if self.num_nodes <= 1 {
            return true;
        }
        let mut graph = UnGraph::<(), ()>::with_capacity(self.num_nodes, self.edges.len());
        let nodes: Vec<_> = (0..self.num_nodes).map(|_| graph.add_node(())).collect();
        for &(a, b) in &self.edges {
            graph.add_edge(nodes[a], nodes[b], ());
        }
        petgraph::algo::connected_components(&graph) == 1
    }

    /// Whether Steiner elimination can succeed for every matrix.
    ///
    /// Requires that from every node `k` all nodes above `k` are reachable
    /// without leaving `k..n`, and all nodes below `k` are reachable along
    /// strictly decreasing paths.
    pub fn supports_elimination(&self) -> bool {
        (0..self.num_nodes).all(|k| {
            (k..self.num_nodes).all(|j| self.upper[k].get(k, j).is_some())
                && (0..=k).all(|j| self.full[k].get(k, j).is_some())
        })
    }

    /// The adjacency matrix of the graph.
    pub fn to_adjacency(&self) -> BitMatrix {
        BitMatrix::from_fn(self.num_nodes, self.num_nodes, |r, c| {
            self.is_adjacent(r, c)
        })
    }
}

impl TryFrom<TopologySpec> for Topology {
    type Error = CompileError;

    fn try_from(spec: TopologySpec) -> Result<Self, Self::Error> {
        Self::from_edges(spec.num_nodes, &spec.edges)
    }
}

impl From<Topology> for TopologySpec {
    fn from(topology: Topology) -> Self {
        Self {
            num_nodes: topology.num_nodes,
            edges: topology.edges,
        }
    }
}
