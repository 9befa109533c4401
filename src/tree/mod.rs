//! Variation tree
//!
//! An arena of explored positions rooted at a starting position, plus the
//! cursor the user is looking at. The tree only does bookkeeping: it never
//! checks move legality itself, callers hand it positions that the move
//! oracle already produced.
//!
//! Nodes are never removed. The only way to drop nodes is to build a new
//! tree from a new starting position.

mod node;

pub use node::{NodeId, NodeMark, PositionKey, PositionNode};

use shakmaty::{Chess, Move};
use tracing::debug;

use crate::error::{Error, Result};

/// A child to attach below an existing node.
pub struct NewNode {
    pub position: Chess,
    pub key: PositionKey,
    pub mv: Move,
    pub san: String,
}

#[derive(Clone, Debug)]
pub struct VariationTree {
    nodes: Vec<PositionNode>,
    cursor: NodeId,
}

impl VariationTree {
    pub fn new(position: Chess, key: PositionKey) -> Self {
        let root = PositionNode {
            id: NodeId::ROOT,
            parent: None,
            children: Vec::new(),
            position,
            key,
            mv: None,
            san: None,
            ply: 0,
            comment: None,
            nags: Vec::new(),
            mark: None,
        };
        VariationTree {
            nodes: vec![root],
            cursor: NodeId::ROOT,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn root_node(&self) -> &PositionNode {
        &self.nodes[0]
    }

    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    /// The node under the cursor.
    pub fn current(&self) -> &PositionNode {
        &self.nodes[self.cursor.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&PositionNode> {
        self.nodes.get(id.index())
    }

    pub fn node(&self, id: NodeId) -> Result<&PositionNode> {
        self.get(id).ok_or(Error::NodeNotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut PositionNode> {
        self.nodes.get_mut(id.index()).ok_or(Error::NodeNotFound(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its root, so it is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &PositionNode> {
        self.nodes.iter()
    }

    /// Child of `parent` whose position has the given key.
    pub fn find_child(&self, parent: NodeId, key: PositionKey) -> Option<NodeId> {
        let parent = self.get(parent)?;
        parent
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c.index()].key == key)
    }

    /// Attach `child` below `parent`, reusing an existing child that reaches
    /// the same position. Returns the node id and whether it was created.
    pub fn insert_child(&mut self, parent: NodeId, child: NewNode) -> Result<(NodeId, bool)> {
        let ply = self.node(parent)?.ply + 1;
        if let Some(existing) = self.find_child(parent, child.key) {
            return Ok((existing, false));
        }

        let id = NodeId::new(self.nodes.len());
        self.nodes.push(PositionNode {
            id,
            parent: Some(parent),
            children: Vec::new(),
            position: child.position,
            key: child.key,
            mv: Some(child.mv),
            san: Some(child.san),
            ply,
            comment: None,
            nags: Vec::new(),
            mark: None,
        });
        self.nodes[parent.index()].children.push(id);
        Ok((id, true))
    }

    pub fn jump_to(&mut self, id: NodeId) -> Result<NodeId> {
        if !self.contains(id) {
            return Err(Error::NodeNotFound(id));
        }
        self.cursor = id;
        debug!(node = %id, "jump");
        Ok(id)
    }

    /// Step back to the parent of the cursor.
    pub fn undo(&mut self) -> Result<NodeId> {
        let parent = self.current().parent.ok_or(Error::AtRoot)?;
        self.cursor = parent;
        debug!(node = %parent, "undo");
        Ok(parent)
    }

    /// Step into a child of the cursor, the main line when `index` is `None`.
    pub fn advance(&mut self, index: Option<usize>) -> Result<NodeId> {
        let index = index.unwrap_or(0);
        let children = &self.current().children;
        let child = *children.get(index).ok_or(Error::NoChildren {
            index,
            available: children.len(),
        })?;
        self.cursor = child;
        debug!(node = %child, "advance");
        Ok(child)
    }

    /// Reorder children along the path to `id` so that path becomes the
    /// main line. Membership and positions are untouched.
    pub fn promote_line(&mut self, id: NodeId) -> Result<()> {
        let path = self.path_to(id)?;
        for pair in path.windows(2) {
            let (parent, child) = (pair[0], pair[1]);
            let children = &mut self.nodes[parent.index()].children;
            if let Some(at) = children.iter().position(|&c| c == child) {
                let promoted = children.remove(at);
                children.insert(0, promoted);
            }
        }
        debug!(node = %id, "promoted line");
        Ok(())
    }

    /// Nodes from the root down to `id`, both included.
    pub fn path_to(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut path = vec![id];
        let mut node = self.node(id)?;
        while let Some(parent) = node.parent {
            path.push(parent);
            node = &self.nodes[parent.index()];
        }
        path.reverse();
        Ok(path)
    }

    /// First-child chain starting at `from` (included).
    pub fn main_line_from(&self, from: NodeId) -> Vec<NodeId> {
        let mut line = Vec::new();
        let mut next = self.get(from).map(|n| n.id);
        while let Some(id) = next {
            line.push(id);
            next = self.nodes[id.index()].children.first().copied();
        }
        line
    }

    /// Root followed by the first child at every level.
    pub fn main_line(&self) -> Vec<NodeId> {
        self.main_line_from(self.root())
    }

    /// Path to the cursor, continued along the main line below it.
    pub fn current_line(&self) -> Vec<NodeId> {
        let mut line = self.path_to(self.cursor).unwrap_or_default();
        line.pop();
        line.extend(self.main_line_from(self.cursor));
        line
    }

    /// SAN moves of the main line.
    pub fn main_line_san(&self) -> Vec<String> {
        self.main_line()
            .iter()
            .filter_map(|&id| self.nodes[id.index()].san.clone())
            .collect()
    }

    pub fn set_comment(&mut self, id: NodeId, comment: Option<String>) -> Result<()> {
        self.node_mut(id)?.comment = comment.filter(|c| !c.trim().is_empty());
        Ok(())
    }

    /// Append a comment, keeping what is already there.
    pub(crate) fn append_comment(&mut self, id: NodeId, comment: &str) -> Result<()> {
        let node = self.node_mut(id)?;
        let comment = comment.trim();
        if comment.is_empty() {
            return Ok(());
        }
        node.comment = Some(match node.comment.take() {
            Some(existing) if existing != comment => format!("{} {}", existing, comment),
            _ => comment.to_string(),
        });
        Ok(())
    }

    pub fn add_nag(&mut self, id: NodeId, nag: u8) -> Result<()> {
        let node = self.node_mut(id)?;
        if !node.nags.contains(&nag) {
            node.nags.push(nag);
        }
        Ok(())
    }

    pub fn set_mark(&mut self, id: NodeId, mark: Option<NodeMark>) -> Result<()> {
        self.node_mut(id)?.mark = mark;
        Ok(())
    }
}
