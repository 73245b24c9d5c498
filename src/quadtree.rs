use std::collections::HashSet;

use glam::Vec2;
use tracing::trace;

use crate::types::{Aabb, BodyHandle, WorldConfig};

/// Children per node.
pub const BRANCHING: usize = 4;

#[derive(Copy, Clone, Debug)]
struct Entry {
    handle: BodyHandle,
    min: Vec2,
    max: Vec2,
}

impl Entry {
    fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

/// Broad-phase quadtree over body boxes.
///
/// Entries are stored in leaves only; a leaf splits into four equal quadrants
/// once it holds more than `max_objects` entries, unless it is already deeper
/// than `max_depth`. A box straddling quadrant borders is stored in every leaf
/// it overlaps.
#[derive(Clone, Debug)]
pub struct QuadTree {
    level: u32,
    bounds: Aabb,
    max_depth: u32,
    max_objects: usize,
    children: Option<Box<[QuadTree; BRANCHING]>>,
    entries: Vec<Entry>,
}

impl QuadTree {
    pub fn new(level: u32, bounds: Aabb, max_depth: u32, max_objects: usize) -> Self {
        Self {
            level,
            bounds,
            max_depth,
            max_objects,
            children: None,
            entries: Vec::new(),
        }
    }

    /// Root node using the world's depth and occupancy limits.
    pub fn with_config(bounds: Aabb, cfg: &WorldConfig) -> Self {
        Self::new(0, bounds, cfg.max_tree_depth, cfg.max_node_objects)
    }

    /// Drop all children and entries.
    pub fn clear(&mut self) {
        self.children = None;
        self.entries.clear();
    }

    /// Subdivide into quadrants (bottom-left, bottom-right, top-left, top-right)
    /// and push the local entries down.
    pub fn split(&mut self) {
        if self.level > self.max_depth || self.children.is_some() {
            return;
        }

        let level = self.level + 1;
        let (max_depth, max_objects) = (self.max_depth, self.max_objects);
        let origin = self.bounds.bottom_left;
        let half = self.bounds.size() * 0.5;
        let quadrant = |ix: f32, iy: f32| {
            let min = origin + Vec2::new(ix * half.x, iy * half.y);
            QuadTree::new(level, Aabb::from_corners(min, min + half), max_depth, max_objects)
        };
        self.children = Some(Box::new([
            quadrant(0.0, 0.0),
            quadrant(1.0, 0.0),
            quadrant(0.0, 1.0),
            quadrant(1.0, 1.0),
        ]));

        trace!(level = self.level, entries = self.entries.len(), "quadtree split");
        let entries = std::mem::take(&mut self.entries);
        for e in entries {
            self.insert_entry(e);
        }
    }

    pub fn insert(&mut self, handle: BodyHandle, aabb: &Aabb) {
        self.insert_entry(Entry {
            handle,
            min: aabb.bottom_left,
            max: aabb.top_right,
        });
    }

    fn insert_entry(&mut self, e: Entry) {
        if let Some(children) = self.children.as_mut() {
            let mut placed = false;
            for child in children.iter_mut() {
                if overlaps(&child.bounds, e.min, e.max) {
                    child.insert_entry(e);
                    placed = true;
                }
            }
            if !placed {
                let idx = quadrant_of(&self.bounds, e.center());
                children[idx].insert_entry(e);
            }
            return;
        }

        self.entries.push(e);
        if self.entries.len() > self.max_objects {
            self.split();
        }
    }

    /// Every other handle sharing a leaf with the query box, in traversal order
    /// and without duplicates.
    pub fn retrieve(&self, handle: BodyHandle, aabb: &Aabb) -> Vec<BodyHandle> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(handle);
        self.collect(aabb.bottom_left, aabb.top_right, &mut out, &mut seen);
        out
    }

    fn collect(
        &self,
        min: Vec2,
        max: Vec2,
        out: &mut Vec<BodyHandle>,
        seen: &mut HashSet<BodyHandle>,
    ) {
        let Some(children) = self.children.as_ref() else {
            for e in &self.entries {
                if seen.insert(e.handle) {
                    out.push(e.handle);
                }
            }
            return;
        };

        // Mirror the routing used by insert
        let mut visited = false;
        for child in children.iter() {
            if overlaps(&child.bounds, min, max) {
                child.collect(min, max, out, seen);
                visited = true;
            }
        }
        if !visited {
            let idx = quadrant_of(&self.bounds, (min + max) * 0.5);
            children[idx].collect(min, max, out, seen);
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    #[inline]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn children(&self) -> Option<&[QuadTree; BRANCHING]> {
        self.children.as_deref()
    }

    /// Handles stored directly in this node (always empty for inner nodes).
    pub fn objects(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.entries.iter().map(|e| e.handle)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.children.is_none()
    }

    /// Number of distinct handles stored anywhere in the tree.
    pub fn len(&self) -> usize {
        let mut seen = HashSet::new();
        self.for_each_leaf(&mut |leaf| {
            seen.extend(leaf.objects());
        });
        seen.len()
    }

    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map_or(0, |c| c.iter().map(QuadTree::node_count).sum())
    }

    /// Deepest level present below (and including) this node.
    pub fn depth(&self) -> u32 {
        self.children
            .as_ref()
            .map_or(self.level, |c| c.iter().map(QuadTree::depth).max().unwrap_or(self.level))
    }

    pub fn for_each_leaf(&self, f: &mut impl FnMut(&QuadTree)) {
        match self.children.as_ref() {
            Some(children) => {
                for child in children.iter() {
                    child.for_each_leaf(f);
                }
            }
            None => f(self),
        }
    }
}

fn overlaps(bounds: &Aabb, min: Vec2, max: Vec2) -> bool {
    bounds.bottom_left.x <= max.x
        && min.x <= bounds.top_right.x
        && bounds.bottom_left.y <= max.y
        && min.y <= bounds.top_right.y
}

/// Quadrant index (same order as `split`) holding `p` after clamping to `bounds`.
fn quadrant_of(bounds: &Aabb, p: Vec2) -> usize {
    let mid = bounds.center();
    let ix = usize::from(p.x >= mid.x);
    let iy = usize::from(p.y >= mid.y);
    iy * 2 + ix
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(max_objects: usize) -> QuadTree {
        QuadTree::new(0, Aabb::from_corners(Vec2::ZERO, Vec2::splat(100.0)), 5, max_objects)
    }

    fn small_box(x: f32, y: f32) -> Aabb {
        Aabb::from_center(Vec2::new(x, y), Vec2::splat(1.0))
    }

    fn assert_leaves_only(node: &QuadTree) {
        if let Some(children) = node.children() {
            assert_eq!(node.objects().count(), 0, "inner node stores objects");
            for c in children {
                assert_leaves_only(c);
            }
        }
    }

    #[test]
    fn test_split_quadrant_layout() {
        let mut t = root(4);
        t.split();
        let c = t.children().unwrap();
        assert_eq!(c[0].bounds().bottom_left, Vec2::ZERO);
        assert_eq!(c[1].bounds().bottom_left, Vec2::new(50.0, 0.0));
        assert_eq!(c[2].bounds().bottom_left, Vec2::new(0.0, 50.0));
        assert_eq!(c[3].bounds().top_right, Vec2::splat(100.0));
        assert!(c.iter().all(|n| n.level() == 1));
    }

    #[test]
    fn test_overflow_triggers_exactly_one_split() {
        let mut t = root(4);
        let spots = [(10.0, 10.0), (90.0, 10.0), (10.0, 90.0), (90.0, 90.0)];
        for (i, (x, y)) in spots.iter().enumerate() {
            t.insert(BodyHandle(i as u32), &small_box(*x, *y));
        }
        assert!(t.is_leaf());
        assert_eq!(t.node_count(), 1);

        t.insert(BodyHandle(4), &small_box(20.0, 20.0));
        assert_eq!(t.node_count(), 1 + BRANCHING);
        assert_eq!(t.len(), 5);
        assert_leaves_only(&t);
    }

    #[test]
    fn test_straddling_box_lands_in_all_quadrants() {
        let mut t = root(0);
        t.insert(BodyHandle(0), &Aabb::from_center(Vec2::splat(50.0), Vec2::splat(5.0)));
        // max_objects 0 forces splits down to the depth limit
        assert!(!t.is_leaf());
        let mut leaves_with_entry = 0;
        t.for_each_leaf(&mut |leaf| {
            if leaf.objects().count() > 0 {
                leaves_with_entry += 1;
            }
        });
        assert!(leaves_with_entry >= 4);
        assert_eq!(t.len(), 1);
        assert_leaves_only(&t);
    }

    #[test]
    fn test_depth_is_bounded() {
        let mut t = root(1);
        for i in 0..50 {
            t.insert(BodyHandle(i), &small_box(1.0, 1.0));
        }
        // Nodes deeper than max_depth refuse to split
        assert!(t.depth() <= 6);
        assert_eq!(t.len(), 50);
    }

    #[test]
    fn test_retrieve_returns_leaf_neighbours() {
        let mut t = root(2);
        t.insert(BodyHandle(0), &small_box(10.0, 10.0));
        t.insert(BodyHandle(1), &small_box(12.0, 12.0));
        t.insert(BodyHandle(2), &small_box(90.0, 90.0));
        assert!(!t.is_leaf());

        let near = t.retrieve(BodyHandle(0), &small_box(10.0, 10.0));
        assert_eq!(near, vec![BodyHandle(1)]);
        let far = t.retrieve(BodyHandle(2), &small_box(90.0, 90.0));
        assert!(far.is_empty());
    }

    #[test]
    fn test_outside_entry_is_kept() {
        let mut t = root(2);
        t.insert(BodyHandle(0), &small_box(-50.0, -50.0));
        t.insert(BodyHandle(1), &small_box(10.0, 10.0));
        t.insert(BodyHandle(2), &small_box(90.0, 90.0));
        assert!(!t.is_leaf());
        assert_eq!(t.len(), 3);
        let r = t.retrieve(BodyHandle(1), &small_box(10.0, 10.0));
        assert_eq!(r, vec![BodyHandle(0)]);
    }

    #[test]
    fn test_clear_resets() {
        let mut t = root(1);
        for i in 0..8 {
            t.insert(BodyHandle(i), &small_box(i as f32 * 12.0, 5.0));
        }
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.node_count(), 1);
    }
}
