/*
 * Quadtree Module
 *
 * Recursive spatial index over a rectangular boundary, used for neighbour
 * lookups, frustum culling and the quadtree demo. Replaces the fixed-cell
 * grid: dense clusters get deeper subdivision while empty space stays as a
 * single leaf.
 *
 * Layout:
 * - All nodes live in one Vec owned by the tree and are addressed by NodeId.
 *   A node stores its parent's id (never owning it), which is what collapse
 *   walks up after a removal.
 * - A node is either a leaf holding entities or an internal node holding
 *   exactly four children (NE, NW, SE, SW). Slots freed by a collapse are
 *   recycled on the next subdivision.
 * - Children split their parent at the midpoint, half-open: a point on the
 *   split line belongs to the east / north child.
 *
 * A leaf subdivides when it would go over `capacity`, unless it is already
 * at `max_divisions` depth, in which case it just keeps growing. That keeps
 * coincident points from recursing forever.
 */

use log::{debug, trace, warn};

use crate::entity::Entity;
use crate::error::SpatialError;
use crate::shapes::{Rect, Shape};
use crate::vector::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    NorthEast = 0,
    NorthWest = 1,
    SouthEast = 2,
    SouthWest = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [Quadrant::NorthEast, Quadrant::NorthWest, Quadrant::SouthEast, Quadrant::SouthWest];

    // Which quadrant of `bounds` a point falls in, by comparing to the midpoint
    #[inline]
    fn of(bounds: &Rect, p: Point) -> Quadrant {
        let (mid_x, mid_y) = midpoint(bounds);
        match (p.x >= mid_x, p.y >= mid_y) {
            (true, true) => Quadrant::NorthEast,
            (false, true) => Quadrant::NorthWest,
            (true, false) => Quadrant::SouthEast,
            (false, false) => Quadrant::SouthWest,
        }
    }
}

#[inline]
fn midpoint(bounds: &Rect) -> (f32, f32) {
    (bounds.x + bounds.w / 2.0, bounds.y + bounds.h / 2.0)
}

// Bounds of the four children, indexed by Quadrant
fn child_bounds(bounds: &Rect) -> [Rect; 4] {
    let (mid_x, mid_y) = midpoint(bounds);
    let (x0, y0, x1, y1) = (bounds.min_x(), bounds.min_y(), bounds.max_x(), bounds.max_y());
    [
        Rect::new(mid_x, mid_y, x1 - mid_x, y1 - mid_y),
        Rect::new(x0, mid_y, mid_x - x0, y1 - mid_y),
        Rect::new(mid_x, y0, x1 - mid_x, mid_y - y0),
        Rect::new(x0, y0, mid_x - x0, mid_y - y0),
    ]
}

/// Per-query counters, supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStats {
    pub queries: usize,
    pub nodes_visited: usize,
    pub entities_tested: usize,
}

impl QueryStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn merge(&mut self, other: &QueryStats) {
        self.queries += other.queries;
        self.nodes_visited += other.nodes_visited;
        self.entities_tested += other.entities_tested;
    }
}

/// Anything the tree can draw its node boundaries onto.
pub trait DrawSurface {
    fn stroke_rect(&mut self, bounds: &Rect, depth: u32);
}

#[derive(Debug, Clone)]
enum NodeKind<E> {
    Leaf(Vec<E>),
    Internal([NodeId; 4]),
    // Slot released by a collapse, waiting to be reused
    Free,
}

#[derive(Debug, Clone)]
struct Node<E> {
    bounds: Rect,
    depth: u32,
    parent: Option<NodeId>,
    kind: NodeKind<E>,
}

enum Step {
    Descend(NodeId),
    Split,
    Store,
}

#[derive(Debug, Clone)]
pub struct QuadTree<E> {
    nodes: Vec<Node<E>>,
    free: Vec<NodeId>,
    capacity: usize,
    max_divisions: u32,
    len: usize,
}

impl<E: Entity> QuadTree<E> {
    pub fn new(bounds: Rect, capacity: usize, max_divisions: u32) -> Result<Self, SpatialError> {
        if !bounds.is_valid() {
            return Err(SpatialError::InvalidBounds { w: bounds.w, h: bounds.h });
        }
        if capacity == 0 {
            return Err(SpatialError::ZeroCapacity);
        }

        Ok(Self {
            nodes: vec![Node {
                bounds,
                depth: 0,
                parent: None,
                kind: NodeKind::Leaf(Vec::new()),
            }],
            free: Vec::new(),
            capacity,
            max_divisions,
            len: 0,
        })
    }

    pub fn bounds(&self) -> &Rect {
        &self.nodes[NodeId::ROOT.0].bounds
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn max_divisions(&self) -> u32 {
        self.max_divisions
    }

    // Number of stored entities
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // Number of live nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn is_divided(&self) -> bool {
        matches!(self.nodes[NodeId::ROOT.0].kind, NodeKind::Internal(_))
    }

    pub fn max_depth_reached(&self) -> u32 {
        self.live_nodes().map(|n| n.depth).max().unwrap_or(0)
    }

    fn live_nodes(&self) -> impl Iterator<Item = &Node<E>> {
        self.nodes.iter().filter(|n| !matches!(n.kind, NodeKind::Free))
    }

    fn alloc(&mut self, node: Node<E>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = node;
                id
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.0];
        node.kind = NodeKind::Free;
        node.parent = None;
        self.free.push(id);
    }

    /// Store an entity in the leaf that covers its position.
    ///
    /// Returns false (and stores nothing) when the position is outside the
    /// tree's bounds.
    pub fn insert(&mut self, entity: E) -> bool {
        let position = entity.position();
        if !self.bounds().contains(position) {
            trace!("entity {} at ({}, {}) is outside the tree", entity.id(), position.x, position.y);
            return false;
        }

        let mut id = NodeId::ROOT;
        loop {
            let node = &self.nodes[id.0];
            let step = match &node.kind {
                NodeKind::Internal(children) => Step::Descend(children[Quadrant::of(&node.bounds, position) as usize]),
                NodeKind::Leaf(entities) if entities.len() >= self.capacity && node.depth < self.max_divisions => Step::Split,
                NodeKind::Leaf(_) => Step::Store,
                NodeKind::Free => {
                    // Only a corrupted arena links a released slot
                    warn!("insert routed to freed node {}, entity {} dropped", id.0, entity.id());
                    return false;
                }
            };

            match step {
                Step::Descend(child) => id = child,
                Step::Split => {
                    self.subdivide(id);
                }
                Step::Store => break,
            }
        }

        if let NodeKind::Leaf(entities) = &mut self.nodes[id.0].kind {
            entities.push(entity);
        }
        self.len += 1;
        true
    }

    /// Split a leaf into four children and hand its entities down.
    ///
    /// Returns false when `id` is not a live leaf or is already at the depth
    /// ceiling.
    pub fn subdivide(&mut self, id: NodeId) -> bool {
        let (bounds, depth) = match self.nodes.get(id.0) {
            Some(node) if matches!(node.kind, NodeKind::Leaf(_)) && node.depth < self.max_divisions => {
                (node.bounds, node.depth)
            }
            _ => return false,
        };

        let children = child_bounds(&bounds).map(|child| {
            self.alloc(Node {
                bounds: child,
                depth: depth + 1,
                parent: Some(id),
                kind: NodeKind::Leaf(Vec::new()),
            })
        });

        let previous = std::mem::replace(&mut self.nodes[id.0].kind, NodeKind::Internal(children));
        if let NodeKind::Leaf(entities) = previous {
            for entity in entities {
                let child = children[Quadrant::of(&bounds, entity.position()) as usize];
                if let NodeKind::Leaf(child_entities) = &mut self.nodes[child.0].kind {
                    child_entities.push(entity);
                }
            }
        }

        trace!("subdivided node {} at depth {}", id.0, depth);
        true
    }

    fn leaf_for(&self, position: Point) -> NodeId {
        let mut id = NodeId::ROOT;
        while let NodeKind::Internal(children) = &self.nodes[id.0].kind {
            id = children[Quadrant::of(&self.nodes[id.0].bounds, position) as usize];
        }
        id
    }

    /// Remove the entity with the same id as `entity`, looking in the leaf
    /// that covers `entity`'s current position. Empty subtrees above that
    /// leaf are collapsed.
    pub fn remove(&mut self, entity: &E) -> bool {
        let position = entity.position();
        if !self.bounds().contains(position) {
            return false;
        }

        let target = entity.id();
        let leaf = self.leaf_for(position);
        let removed = match &mut self.nodes[leaf.0].kind {
            NodeKind::Leaf(entities) => match entities.iter().position(|e| e.id() == target) {
                Some(index) => {
                    entities.swap_remove(index);
                    true
                }
                None => false,
            },
            _ => false,
        };

        if removed {
            self.len -= 1;
            if let Some(parent) = self.nodes[leaf.0].parent {
                self.collapse_upwards(parent);
            }
        }
        removed
    }

    // Turn an internal node whose children are all empty leaves back into
    // an empty leaf
    fn try_collapse(&mut self, id: NodeId) -> bool {
        let children = match &self.nodes[id.0].kind {
            NodeKind::Internal(children) => *children,
            _ => return false,
        };

        let all_empty = children
            .iter()
            .all(|c| matches!(&self.nodes[c.0].kind, NodeKind::Leaf(entities) if entities.is_empty()));
        if !all_empty {
            return false;
        }

        for child in children {
            self.release(child);
        }
        self.nodes[id.0].kind = NodeKind::Leaf(Vec::new());
        trace!("collapsed node {}", id.0);
        true
    }

    fn collapse_upwards(&mut self, start: NodeId) {
        let mut current = Some(start);
        while let Some(id) = current {
            // A node that stays internal keeps its ancestors internal too
            if !self.try_collapse(id) {
                break;
            }
            current = self.nodes[id.0].parent;
        }
    }

    /// Collapse every empty subtree in the tree, deepest first.
    /// Returns the number of nodes that reverted to leaves.
    pub fn cleanup(&mut self) -> usize {
        let mut internal = Vec::new();
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            if let NodeKind::Internal(children) = &self.nodes[id.0].kind {
                internal.push(id);
                stack.extend_from_slice(children);
            }
        }

        // Parents are pushed before their children, so walking backwards
        // handles children first
        internal.into_iter().rev().filter(|&id| self.try_collapse(id)).count()
    }

    /// Call `visit` for every entity whose position `shape` contains.
    /// Subtrees whose bounds the shape does not touch are skipped.
    pub fn visit<'a, S, F>(&'a self, shape: &S, stats: &mut QueryStats, mut visit: F)
    where
        S: Shape + ?Sized,
        F: FnMut(&'a E),
    {
        stats.queries += 1;
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if !shape.intersects_rect(&node.bounds) {
                continue;
            }
            stats.nodes_visited += 1;

            match &node.kind {
                NodeKind::Leaf(entities) => {
                    for entity in entities {
                        stats.entities_tested += 1;
                        if shape.contains(entity.position()) {
                            visit(entity);
                        }
                    }
                }
                NodeKind::Internal(children) => stack.extend_from_slice(children),
                NodeKind::Free => {}
            }
        }
    }

    pub fn query<S: Shape + ?Sized>(&self, shape: &S) -> Vec<&E> {
        let mut stats = QueryStats::default();
        self.query_with_stats(shape, &mut stats)
    }

    pub fn query_with_stats<S: Shape + ?Sized>(&self, shape: &S, stats: &mut QueryStats) -> Vec<&E> {
        let mut found = Vec::new();
        self.visit(shape, stats, |e| found.push(e));
        found
    }

    pub fn all_entities(&self) -> Vec<&E> {
        self.leaves().flat_map(|(_, _, entities)| entities.iter()).collect()
    }

    /// Every live leaf as (bounds, depth, entities).
    pub fn leaves(&self) -> impl Iterator<Item = (&Rect, u32, &[E])> {
        self.nodes.iter().filter_map(|n| match &n.kind {
            NodeKind::Leaf(entities) => Some((&n.bounds, n.depth, entities.as_slice())),
            _ => None,
        })
    }

    /// Bounds and depth of every live node, leaves and internal nodes alike.
    pub fn node_bounds(&self) -> impl Iterator<Item = (Rect, u32)> + '_ {
        self.live_nodes().map(|n| (n.bounds, n.depth))
    }

    /// Drop every entity and child node, leaving an empty root leaf.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[NodeId::ROOT.0].kind = NodeKind::Leaf(Vec::new());
        self.free.clear();
        self.len = 0;
    }

    /// Clear and re-insert. Returns how many entities were stored; the rest
    /// were outside the bounds.
    pub fn rebuild<I: IntoIterator<Item = E>>(&mut self, entities: I) -> usize {
        self.clear();
        let mut rejected = 0;
        for entity in entities {
            if !self.insert(entity) {
                rejected += 1;
            }
        }
        if rejected > 0 {
            debug!("quadtree rebuild skipped {} out-of-bounds entities", rejected);
        }
        self.len
    }

    /// Stroke every node's boundary, for debug views.
    pub fn render<D: DrawSurface + ?Sized>(&self, surface: &mut D) {
        for (bounds, depth) in self.node_bounds() {
            surface.stroke_rect(&bounds, depth);
        }
    }

    /// Walk the tree from the root and report the first broken structural
    /// rule, if any.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut reachable = 0;
        let mut stored = 0;
        let mut stack = vec![NodeId::ROOT];

        while let Some(id) = stack.pop() {
            reachable += 1;
            let node = &self.nodes[id.0];
            match &node.kind {
                NodeKind::Free => return Err(format!("node {} is free but reachable", id.0)),
                NodeKind::Internal(children) => {
                    for child in children {
                        let c = &self.nodes[child.0];
                        if c.parent != Some(id) {
                            return Err(format!("node {} does not point back to parent {}", child.0, id.0));
                        }
                        if c.depth != node.depth + 1 {
                            return Err(format!("node {} has depth {} under depth {}", child.0, c.depth, node.depth));
                        }
                        if !node.bounds.contains_rect(&c.bounds) {
                            return Err(format!("node {} extends past its parent", child.0));
                        }
                    }
                    stack.extend_from_slice(children);
                }
                NodeKind::Leaf(entities) => {
                    if entities.len() > self.capacity && node.depth < self.max_divisions {
                        return Err(format!(
                            "leaf {} holds {} entities above capacity {} at depth {}",
                            id.0,
                            entities.len(),
                            self.capacity,
                            node.depth
                        ));
                    }
                    if let Some(e) = entities.iter().find(|e| !node.bounds.contains(e.position())) {
                        return Err(format!("entity {} lies outside leaf {}", e.id(), id.0));
                    }
                    stored += entities.len();
                }
            }
        }

        if reachable != self.node_count() {
            return Err(format!("{} nodes reachable but {} live", reachable, self.node_count()));
        }
        if stored != self.len {
            return Err(format!("{} entities stored but len is {}", stored, self.len));
        }
        Ok(())
    }
}
