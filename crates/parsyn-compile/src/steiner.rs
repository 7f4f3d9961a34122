//! Approximate Steiner trees and their two-phase walk.
//!
//! [`route`] connects a root to a set of target nodes with a Prim-style
//! 2-approximation over the precomputed shortest paths of a [`Topology`],
//! then walks the tree twice:
//!
//! 1. top-down, level by level from the root,
//! 2. bottom-up, repeatedly stripping the current leaves.
//!
//! Each phase is terminated by [`WalkStep::PhaseEnd`]. The walk is an
//! explicit state machine driven through [`Iterator`], so the caller can
//! interleave matrix updates with the steps.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::error::{CompileError, CompileResult};
use crate::topology::{RoutingMode, Topology};

/// One step of a Steiner walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStep {
    /// A tree edge, directed away from the root.
    Edge(usize, usize),
    /// The current phase has emitted all of its edges.
    PhaseEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkState {
    BuildingTree,
    EmittingTopDown,
    PhaseBoundary,
    EmittingBottomUp,
    Done,
}

/// Walk a Steiner tree rooted at `root` that spans `targets`.
///
/// Paths come from the `mode` table restricted at `root`. The walk yields
/// every tree edge once top-down, a [`WalkStep::PhaseEnd`], every tree edge
/// once bottom-up, and a final [`WalkStep::PhaseEnd`].
pub fn route<'a>(
    topology: &'a Topology,
    root: usize,
    targets: &[usize],
    mode: RoutingMode,
) -> SteinerWalk<'a> {
    SteinerWalk {
        topology,
        root,
        mode,
        state: WalkState::BuildingTree,
        targets: targets.to_vec(),
        tree_nodes: vec![root],
        steiner_points: Vec::new(),
        tree_edges: Vec::new(),
        pending: VecDeque::new(),
        active: vec![root],
        emitted: FxHashSet::default(),
        remaining: Vec::new(),
    }
}

/// Iterator over the steps of a Steiner tree walk.
///
/// Produced by [`route`]. Once an error has been yielded the walk is done.
#[derive(Debug)]
pub struct SteinerWalk<'a> {
    topology: &'a Topology,
    root: usize,
    mode: RoutingMode,
    state: WalkState,
    /// Targets not yet attached, in input order.
    targets: Vec<usize>,
    tree_nodes: Vec<usize>,
    steiner_points: Vec<usize>,
    /// Deduplicated, in insertion order.
    tree_edges: Vec<(usize, usize)>,
    pending: VecDeque<WalkStep>,
    /// Sources allowed in the next top-down round.
    active: Vec<usize>,
    emitted: FxHashSet<(usize, usize)>,
    /// Edges not yet emitted bottom-up.
    remaining: Vec<(usize, usize)>,
}

impl SteinerWalk<'_> {
    /// Root of the tree.
    pub fn root(&self) -> usize {
        self.root
    }

    /// Which distance table the tree is built from.
    pub fn mode(&self) -> RoutingMode {
        self.mode
    }

    /// Edges of the tree. Empty until the first step has been pulled.
    pub fn tree_edges(&self) -> &[(usize, usize)] {
        &self.tree_edges
    }

    /// Root and attached targets, in attachment order.
    pub fn tree_nodes(&self) -> &[usize] {
        &self.tree_nodes
    }

    /// Intermediate nodes that were not targets.
    pub fn steiner_points(&self) -> &[usize] {
        &self.steiner_points
    }

    fn build_tree(&mut self) -> CompileResult<()> {
        let mut in_tree: FxHashSet<usize> = self.tree_nodes.iter().copied().collect();
        let mut edge_set: FxHashSet<(usize, usize)> = FxHashSet::default();
        self.targets.retain(|t| !in_tree.contains(t));

        while !self.targets.is_empty() {
            // First minimum over (target, attach point), targets in input order.
            let mut best: Option<(usize, usize, usize)> = None;
            for (slot, &target) in self.targets.iter().enumerate() {
                for &attach in self.tree_nodes.iter().chain(&self.steiner_points) {
                    let Some(path) = self.topology.route(attach, target, self.mode, self.root)
                    else {
                        continue;
                    };
                    if best.is_none_or(|(_, _, hops)| path.hops() < hops) {
                        best = Some((slot, attach, path.hops()));
                    }
                }
            }

            let Some((slot, attach, _)) = best else {
                return Err(CompileError::UnreachableTarget {
                    root: self.root,
                    target: self.targets[0],
                    mode: self.mode,
                });
            };
            let target = self.targets.remove(slot);
            self.tree_nodes.push(target);
            in_tree.insert(target);

            let Some(path) = self.topology.route(attach, target, self.mode, self.root) else {
                continue;
            };
            for &(a, b) in path.edges() {
                if edge_set.insert((a, b)) {
                    self.tree_edges.push((a, b));
                }
                for v in [a, b] {
                    if in_tree.insert(v) {
                        self.steiner_points.push(v);
                    }
                }
            }
        }

        debug!(
            root = self.root,
            mode = %self.mode,
            nodes = self.tree_nodes.len(),
            steiner = self.steiner_points.len(),
            edges = self.tree_edges.len(),
            "built Steiner tree"
        );
        self.remaining = self.tree_edges.clone();
        self.state = WalkState::EmittingTopDown;
        Ok(())
    }

    fn top_down_round(&mut self) -> CompileResult<()> {
        let total = self.tree_edges.len();
        if self.emitted.len() == total {
            self.state = WalkState::PhaseBoundary;
            return Ok(());
        }

        let mut round = Vec::new();
        for &(src, dst) in &self.tree_edges {
            if !self.active.contains(&src) {
                continue;
            }
            if !self.emitted.insert((src, dst)) {
                return Err(CompileError::DuplicateEdge {
                    src,
                    dst,
                    phase: "top-down",
                });
            }
            round.push((src, dst));
        }

        if round.is_empty() {
            return Err(CompileError::RoutingStall {
                root: self.root,
                phase: "top-down",
                remaining: total - self.emitted.len(),
                total,
            });
        }

        self.active = round.iter().map(|&(_, dst)| dst).collect();
        for (src, dst) in round {
            trace!(src, dst, "top-down edge");
            self.pending.push_back(WalkStep::Edge(src, dst));
        }
        Ok(())
    }

    fn bottom_up_round(&mut self) -> CompileResult<()> {
        if self.remaining.is_empty() {
            self.pending.push_back(WalkStep::PhaseEnd);
            self.state = WalkState::Done;
            return Ok(());
        }

        let sources: FxHashSet<usize> = self.remaining.iter().map(|&(src, _)| src).collect();
        let leaves: Vec<usize> = self
            .tree_nodes
            .iter()
            .chain(&self.steiner_points)
            .copied()
            .filter(|v| !sources.contains(v))
            .collect();

        let before = self.remaining.len();
        for leaf in leaves {
            let mut kept = Vec::with_capacity(self.remaining.len());
            for (src, dst) in self.remaining.drain(..) {
                if dst == leaf {
                    trace!(src, dst, "bottom-up edge");
                    self.pending.push_back(WalkStep::Edge(src, dst));
                } else {
                    kept.push((src, dst));
                }
            }
            self.remaining = kept;
        }

        if self.remaining.len() == before {
            return Err(CompileError::RoutingStall {
                root: self.root,
                phase: "bottom-up",
                remaining: before,
                total: self.tree_edges.len(),
            });
        }
        Ok(())
    }
}

impl Iterator for SteinerWalk<'_> {
    type Item = CompileResult<WalkStep>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(step) = self.pending.pop_front() {
                return Some(Ok(step));
            }
            let advanced = match self.state {
                WalkState::BuildingTree => self.build_tree(),
                WalkState::EmittingTopDown => self.top_down_round(),
                WalkState::PhaseBoundary => {
                    self.pending.push_back(WalkStep::PhaseEnd);
                    self.state = WalkState::EmittingBottomUp;
                    Ok(())
                }
                WalkState::EmittingBottomUp => self.bottom_up_round(),
                WalkState::Done => return None,
            };
            if let Err(e) = advanced {
                self.pending.clear();
                self.state = WalkState::Done;
                return Some(Err(e));
            }
        }
    }
}

impl FusedIterator for SteinerWalk<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use WalkStep::{Edge, PhaseEnd};

    fn collect(walk: SteinerWalk<'_>) -> Vec<WalkStep> {
        walk.collect::<CompileResult<Vec<_>>>().unwrap()
    }

    #[test]
    fn test_line_walk_order() {
        let t = Topology::linear(5);
        let steps = collect(route(&t, 0, &[2, 4], RoutingMode::Upper));
        assert_eq!(
            steps,
            vec![
                Edge(0, 1),
                Edge(1, 2),
                Edge(2, 3),
                Edge(3, 4),
                PhaseEnd,
                Edge(3, 4),
                Edge(2, 3),
                Edge(1, 2),
                Edge(0, 1),
                PhaseEnd,
            ]
        );
    }

    #[test]
    fn test_tree_bookkeeping() {
        let t = Topology::linear(5);
        let mut walk = route(&t, 0, &[2, 4], RoutingMode::Upper);
        assert!(walk.tree_edges().is_empty());
        walk.next();
        assert_eq!(walk.tree_nodes(), &[0, 2, 4]);
        assert_eq!(walk.steiner_points(), &[1, 3]);
        assert_eq!(walk.tree_edges().len(), 4);
    }

    #[test]
    fn test_star_shaped_tree_emits_level_at_once() {
        let t = Topology::full(4);
        let steps = collect(route(&t, 0, &[1, 2, 3], RoutingMode::Upper));
        assert_eq!(
            steps,
            vec![
                Edge(0, 1),
                Edge(0, 2),
                Edge(0, 3),
                PhaseEnd,
                Edge(0, 1),
                Edge(0, 2),
                Edge(0, 3),
                PhaseEnd,
            ]
        );
    }

    #[test]
    fn test_no_targets_yields_two_markers() {
        let t = Topology::linear(3);
        assert_eq!(
            collect(route(&t, 1, &[], RoutingMode::Upper)),
            vec![PhaseEnd, PhaseEnd]
        );
        // The root itself is already attached.
        assert_eq!(
            collect(route(&t, 1, &[1], RoutingMode::Upper)),
            vec![PhaseEnd, PhaseEnd]
        );
    }

    #[test]
    fn test_full_mode_routes_downward() {
        let t = Topology::linear(4);
        let steps = collect(route(&t, 3, &[0], RoutingMode::Full));
        assert_eq!(
            steps,
            vec![
                Edge(3, 2),
                Edge(2, 1),
                Edge(1, 0),
                PhaseEnd,
                Edge(1, 0),
                Edge(2, 1),
                Edge(3, 2),
                PhaseEnd,
            ]
        );
    }

    #[test]
    fn test_unreachable_target_is_an_error() {
        // Upper table 1 excludes the hub, so 1 cannot reach 2.
        let t = Topology::star(3);
        let mut walk = route(&t, 1, &[2], RoutingMode::Upper);
        match walk.next() {
            Some(Err(CompileError::UnreachableTarget { root, target, mode })) => {
                assert_eq!((root, target, mode), (1, 2, RoutingMode::Upper));
            }
            other => panic!("expected unreachable target, got {other:?}"),
        }
        assert!(walk.next().is_none());
    }

    #[test]
    fn test_each_edge_once_per_phase() {
        let t = Topology::full(6);
        let steps = collect(route(&t, 0, &[5, 3, 1], RoutingMode::Upper));
        let boundary = steps.iter().position(|s| *s == PhaseEnd).unwrap();
        let mut first: Vec<_> = steps[..boundary].to_vec();
        let mut second: Vec<_> = steps[boundary + 1..steps.len() - 1].to_vec();
        first.sort_by_key(|s| format!("{s:?}"));
        second.sort_by_key(|s| format!("{s:?}"));
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }
}
