use indextree::{Arena, NodeId};

use crate::parser::types::AstNode;

/// Arena-backed syntax tree.
#[derive(Debug, Clone)]
pub struct Ast {
    arena: Arena<AstNode>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    pub fn add_node(&mut self, parent_id: Option<NodeId>, data: AstNode) -> NodeId {
        let node_id = self.arena.new_node(data);

        if let Some(parent) = parent_id {
            parent.append(node_id, &mut self.arena);
        } else if self.root.is_none() {
            self.root = Some(node_id);
        }

        node_id
    }

    pub fn get_node(&self, node_id: NodeId) -> Option<&AstNode> {
        self.arena.get(node_id).map(|n| n.get())
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn root_node(&self) -> Option<&AstNode> {
        self.root.and_then(|id| self.get_node(id))
    }

    pub fn get_children(&self, node_id: NodeId) -> Vec<NodeId> {
        node_id.children(&self.arena).collect()
    }

    pub fn len(&self) -> usize {
        self.arena.count()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// All nodes in pre-order.
    pub fn nodes(&self) -> Vec<&AstNode> {
        match self.root {
            Some(root) => root
                .descendants(&self.arena)
                .filter_map(|id| self.get_node(id))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn find_all(&self, predicate: impl Fn(&AstNode) -> bool) -> Vec<&AstNode> {
        self.nodes().into_iter().filter(|n| predicate(n)).collect()
    }

    /// Copy the subtree rooted at `node_id` into a fresh tree.
    pub fn subtree(&self, node_id: NodeId) -> Ast {
        let mut out = Ast::new();
        self.copy_into(node_id, None, &mut out);
        out
    }

    fn copy_into(&self, node_id: NodeId, parent: Option<NodeId>, out: &mut Ast) {
        let Some(data) = self.get_node(node_id) else {
            return;
        };
        let new_id = out.add_node(parent, data.clone());
        for child_id in self.get_children(node_id) {
            self.copy_into(child_id, Some(new_id), out);
        }
    }
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}
