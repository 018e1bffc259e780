//! Named rectangular regions organized by geometric containment.
//!
//! Every node owns a private tile grid the size of its rect. The root covers
//! the whole canvas and its grid is the shared feature surface; every other
//! node is a named layer. A node is inserted under the deepest existing node
//! whose rect contains it. Names are unique across the tree.

use std::fmt::Write as _;

use thiserror::Error;
use town_rules::TileId;

use crate::geometry::{Point, Rect};
use crate::grid::TileGrid;

/// Errors raised by layer tree mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayerError {
    #[error("A layer named '{0}' already exists")]
    DuplicateName(String),
    #[error("Layer '{0}' not found")]
    NotFound(String),
    #[error("Layer names must not be empty")]
    EmptyName,
    #[error("The root layer '{0}' cannot be deleted or moved")]
    RootProtected(String),
    #[error("Rect {0} is not contained by any layer")]
    NotContained(Rect),
    #[error("Moving '{name}' under '{parent}' would create a cycle")]
    WouldCreateCycle { name: String, parent: String },
}

/// One node of the layer tree.
#[derive(Debug, Clone)]
pub struct LayerNode {
    name: String,
    rect: Rect,
    grid: TileGrid,
    seq: u64,
    children: Vec<LayerNode>,
}

impl LayerNode {
    fn new(name: String, rect: Rect, seq: u64) -> Self {
        Self {
            name,
            rect,
            grid: TileGrid::new(rect.width, rect.height),
            seq,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn rect(&self) -> Rect {
        self.rect
    }

    /// Tiles in layer-local coordinates.
    pub const fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Registration order. Earlier layers draw above later ones.
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Tile at a canvas point, `EMPTY` if the point is outside this layer.
    pub fn tile_at(&self, point: Point) -> TileId {
        if !self.rect.contains_point(point) {
            return TileId::EMPTY;
        }
        self.grid
            .get(point.x - self.rect.x, point.y - self.rect.y)
            .copied()
            .unwrap_or(TileId::EMPTY)
    }

    /// Writes at a canvas point. Returns false when the point is outside this layer.
    pub(crate) fn set_tile(&mut self, point: Point, tile: TileId) -> bool {
        if !self.rect.contains_point(point) {
            return false;
        }
        self.grid
            .set(point.x - self.rect.x, point.y - self.rect.y, tile)
    }

    /// Searches this node and its subtree.
    pub fn find(&self, name: &str) -> Option<&Self> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut Self> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(name))
    }

    fn find_parent(&self, name: &str) -> Option<&Self> {
        if self.children.iter().any(|c| c.name == name) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_parent(name))
    }

    /// Deepest node in this subtree containing `rect`, with its depth.
    fn deepest_container(&self, rect: &Rect, depth: usize) -> Option<(usize, &Self)> {
        if !self.rect.contains_rect(rect) {
            return None;
        }
        let mut best = (depth, self);
        for child in &self.children {
            if let Some(found) = child.deepest_container(rect, depth + 1) {
                // strictly deeper only, so earlier siblings win ties
                if found.0 > best.0 {
                    best = found;
                }
            }
        }
        Some(best)
    }

    /// Removes the direct or indirect child called `name`.
    ///
    /// Without `cascade` the removed node's children are spliced into its
    /// parent at the removed node's position and the returned node has none.
    fn remove_descendant(&mut self, name: &str, cascade: bool) -> Option<Self> {
        if let Some(idx) = self.children.iter().position(|c| c.name == name) {
            let mut removed = self.children.remove(idx);
            if !cascade {
                let orphans = std::mem::take(&mut removed.children);
                for (offset, orphan) in orphans.into_iter().enumerate() {
                    self.children.insert(idx + offset, orphan);
                }
            }
            return Some(removed);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.remove_descendant(name, cascade))
    }

    fn for_each_mut(&mut self, f: &mut impl FnMut(&mut Self)) {
        f(self);
        for child in &mut self.children {
            child.for_each_mut(f);
        }
    }
}

/// Preorder iterator over a subtree.
pub struct Preorder<'a> {
    stack: Vec<(usize, &'a LayerNode)>,
}

impl<'a> Iterator for Preorder<'a> {
    /// `(depth, node)`, depth 0 being the node the walk started from.
    type Item = (usize, &'a LayerNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

/// The layer hierarchy.
#[derive(Debug, Clone)]
pub struct LayerTree {
    root: LayerNode,
    next_seq: u64,
}

impl LayerTree {
    /// Creates a tree whose root spans `rect`.
    pub fn new(root_name: impl Into<String>, rect: Rect) -> Self {
        Self {
            root: LayerNode::new(root_name.into(), rect, 0),
            next_seq: 1,
        }
    }

    pub const fn root(&self) -> &LayerNode {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut LayerNode {
        &mut self.root
    }

    pub fn root_name(&self) -> &str {
        &self.root.name
    }

    pub fn is_root(&self, name: &str) -> bool {
        self.root.name == name
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn find(&self, name: &str) -> Option<&LayerNode> {
        self.root.find(name)
    }

    pub(crate) fn find_mut(&mut self, name: &str) -> Option<&mut LayerNode> {
        self.root.find_mut(name)
    }

    /// Parent of `name`; `None` for the root or an unknown name.
    pub fn find_parent(&self, name: &str) -> Option<&LayerNode> {
        self.root.find_parent(name)
    }

    /// Walks the whole tree, root first.
    pub fn iter(&self) -> Preorder<'_> {
        Preorder {
            stack: vec![(0, &self.root)],
        }
    }

    /// Named layers (everything except the root), in preorder.
    pub fn layers(&self) -> impl Iterator<Item = &LayerNode> {
        self.iter().skip(1).map(|(_, node)| node)
    }

    /// Number of named layers.
    pub fn len(&self) -> usize {
        self.layers().count()
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Named layers covering `point`, in registration order.
    pub fn covering(&self, point: Point) -> Vec<&LayerNode> {
        let mut nodes: Vec<_> = self
            .layers()
            .filter(|node| node.rect.contains_point(point))
            .collect();
        nodes.sort_by_key(|node| node.seq);
        nodes
    }

    /// Inserts a new empty layer under the deepest node that contains `rect`.
    pub fn insert(&mut self, name: &str, rect: Rect) -> Result<&LayerNode, LayerError> {
        if name.trim().is_empty() {
            return Err(LayerError::EmptyName);
        }
        if self.contains(name) {
            log::warn!("Refusing to insert layer '{name}': name already in use");
            return Err(LayerError::DuplicateName(name.to_string()));
        }
        let parent_name = self
            .root
            .deepest_container(&rect, 0)
            .map(|(_, node)| node.name.clone())
            .ok_or(LayerError::NotContained(rect))?;

        let seq = self.next_seq;
        self.next_seq += 1;
        let parent = self
            .find_mut(&parent_name)
            .ok_or_else(|| LayerError::NotFound(parent_name.clone()))?;
        parent.children.push(LayerNode::new(name.to_string(), rect, seq));
        log::debug!("Inserted layer '{name}' {rect} under '{parent_name}'");

        let inserted = parent
            .children
            .last()
            .ok_or_else(|| LayerError::NotFound(name.to_string()))?;
        Ok(inserted)
    }

    /// Renames a node. Refuses unknown names and names already in use.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        if new.trim().is_empty() || (old != new && self.contains(new)) {
            log::warn!("Cannot rename '{old}' to '{new}': name is empty or taken");
            return false;
        }
        match self.find_mut(old) {
            Some(node) => {
                node.name = new.to_string();
                log::debug!("Renamed layer '{old}' to '{new}'");
                true
            }
            None => {
                log::warn!("Cannot rename '{old}': no such layer");
                false
            }
        }
    }

    /// Removes a node from the tree and hands it back.
    ///
    /// With `cascade` the whole subtree is returned. Without it the node's
    /// children are re-parented to the node's parent first.
    pub fn detach(&mut self, name: &str, cascade: bool) -> Result<LayerNode, LayerError> {
        if self.is_root(name) {
            return Err(LayerError::RootProtected(name.to_string()));
        }
        self.root
            .remove_descendant(name, cascade)
            .ok_or_else(|| LayerError::NotFound(name.to_string()))
    }

    /// Deletes a node. Returns false for the root or an unknown name.
    pub fn delete(&mut self, name: &str, cascade: bool) -> bool {
        match self.detach(name, cascade) {
            Ok(_) => {
                log::debug!("Deleted layer '{name}' (cascade: {cascade})");
                true
            }
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    /// Re-parents `name` (and its subtree) under `new_parent`.
    ///
    /// Containment is not re-checked, so a moved child's rect may extend past
    /// its new parent. Moves that would put a node inside its own subtree are
    /// refused.
    pub fn move_node(&mut self, name: &str, new_parent: &str) -> Result<(), LayerError> {
        if self.is_root(name) {
            return Err(LayerError::RootProtected(name.to_string()));
        }
        let node = self
            .find(name)
            .ok_or_else(|| LayerError::NotFound(name.to_string()))?;
        if node.find(new_parent).is_some() {
            return Err(LayerError::WouldCreateCycle {
                name: name.to_string(),
                parent: new_parent.to_string(),
            });
        }
        if !self.contains(new_parent) {
            return Err(LayerError::NotFound(new_parent.to_string()));
        }

        let moved = self.detach(name, true)?;
        let parent = self
            .find_mut(new_parent)
            .ok_or_else(|| LayerError::NotFound(new_parent.to_string()))?;
        parent.children.push(moved);
        log::debug!("Moved layer '{name}' under '{new_parent}'");
        Ok(())
    }

    /// Re-parents `name` directly under the root.
    pub fn move_to_root(&mut self, name: &str) -> Result<(), LayerError> {
        let root = self.root.name.clone();
        self.move_node(name, &root)
    }

    pub(crate) fn for_each_mut(&mut self, mut f: impl FnMut(&mut LayerNode)) {
        self.root.for_each_mut(&mut f);
    }

    /// Indented outline of the tree, one node per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (depth, node) in self.iter() {
            let _ = writeln!(
                out,
                "{}{} {}",
                "  ".repeat(depth),
                node.name,
                node.rect
            );
        }
        out.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> LayerTree {
        LayerTree::new("Root", Rect::new(0, 0, 40, 25))
    }

    fn parent_of(tree: &LayerTree, name: &str) -> String {
        tree.find_parent(name)
            .map(|p| p.name().to_string())
            .unwrap_or_default()
    }

    #[test]
    fn insert_picks_deepest_container() {
        let mut tree = tree();
        tree.insert("Farm", Rect::new(0, 0, 20, 20)).unwrap();
        tree.insert("Barn", Rect::new(2, 2, 5, 5)).unwrap();
        tree.insert("Stall", Rect::new(3, 3, 2, 2)).unwrap();
        tree.insert("Pond", Rect::new(25, 5, 5, 5)).unwrap();

        assert_eq!(parent_of(&tree, "Farm"), "Root");
        assert_eq!(parent_of(&tree, "Barn"), "Farm");
        assert_eq!(parent_of(&tree, "Stall"), "Barn");
        assert_eq!(parent_of(&tree, "Pond"), "Root");
    }

    #[test]
    fn full_canvas_layer_becomes_child_of_root() {
        let mut tree = tree();
        tree.insert("Everything", Rect::new(0, 0, 40, 25)).unwrap();
        assert_eq!(parent_of(&tree, "Everything"), "Root");
    }

    #[test]
    fn insert_rejects_duplicates_and_uncontained_rects() {
        let mut tree = tree();
        tree.insert("Farm", Rect::new(0, 0, 5, 5)).unwrap();
        assert_eq!(
            tree.insert("Farm", Rect::new(6, 6, 2, 2)).unwrap_err(),
            LayerError::DuplicateName("Farm".into())
        );
        assert!(matches!(
            tree.insert("Outside", Rect::new(38, 20, 5, 5)),
            Err(LayerError::NotContained(_))
        ));
    }

    #[test]
    fn rename_refuses_taken_names() {
        let mut tree = tree();
        tree.insert("A", Rect::new(0, 0, 5, 5)).unwrap();
        tree.insert("B", Rect::new(10, 0, 5, 5)).unwrap();
        assert!(!tree.rename("A", "B"));
        assert!(!tree.rename("Missing", "C"));
        assert!(tree.rename("A", "C"));
        assert!(tree.contains("C") && !tree.contains("A"));
    }

    #[test]
    fn delete_without_cascade_reparents_children() {
        let mut tree = tree();
        tree.insert("Farm", Rect::new(0, 0, 20, 20)).unwrap();
        tree.insert("Barn", Rect::new(2, 2, 5, 5)).unwrap();
        assert!(tree.delete("Farm", false));
        assert_eq!(parent_of(&tree, "Barn"), "Root");
    }

    #[test]
    fn delete_with_cascade_removes_subtree() {
        let mut tree = tree();
        tree.insert("Farm", Rect::new(0, 0, 20, 20)).unwrap();
        tree.insert("Barn", Rect::new(2, 2, 5, 5)).unwrap();
        assert!(tree.delete("Farm", true));
        assert!(tree.is_empty());
        assert!(!tree.delete("Root", true));
    }

    #[test]
    fn move_does_not_recheck_containment() {
        let mut tree = tree();
        tree.insert("Small", Rect::new(0, 0, 3, 3)).unwrap();
        tree.insert("Big", Rect::new(10, 10, 10, 10)).unwrap();
        tree.move_node("Big", "Small").unwrap();
        assert_eq!(parent_of(&tree, "Big"), "Small");

        tree.move_to_root("Big").unwrap();
        assert_eq!(parent_of(&tree, "Big"), "Root");
    }

    #[test]
    fn move_refuses_cycles() {
        let mut tree = tree();
        tree.insert("Farm", Rect::new(0, 0, 20, 20)).unwrap();
        tree.insert("Barn", Rect::new(2, 2, 5, 5)).unwrap();
        assert!(matches!(
            tree.move_node("Farm", "Barn"),
            Err(LayerError::WouldCreateCycle { .. })
        ));
        assert!(matches!(
            tree.move_node("Farm", "Farm"),
            Err(LayerError::WouldCreateCycle { .. })
        ));
    }

    #[test]
    fn render_indents_by_depth() {
        let mut tree = tree();
        tree.insert("Farm", Rect::new(0, 0, 20, 20)).unwrap();
        tree.insert("Barn", Rect::new(2, 2, 5, 5)).unwrap();
        let rendered = tree.render();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Root"));
        assert!(lines[1].starts_with("  Farm"));
        assert!(lines[2].starts_with("    Barn"));
    }

    #[test]
    fn node_tiles_use_canvas_coordinates() {
        let mut tree = tree();
        tree.insert("Barn", Rect::new(4, 4, 2, 2)).unwrap();
        let barn = tree.find_mut("Barn").unwrap();
        assert!(barn.set_tile(Point::new(5, 5), TileId(77)));
        assert!(!barn.set_tile(Point::new(6, 5), TileId(77)));
        assert_eq!(barn.tile_at(Point::new(5, 5)), TileId(77));
        assert_eq!(barn.grid().get(1, 1), Some(&TileId(77)));
    }
}
