//! Rooted, ordered tree with arena-allocated nodes.
//!
//! Used for BFS shortest-path trees and for walking them in pre-, post- or
//! level order. Nodes are addressed by [`NodeId`]; detached nodes stay in
//! the arena but are unreachable from the root.

use std::collections::VecDeque;
use std::fmt;

/// Handle to a node of one [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A tree where every node owns a value and an ordered list of children.
#[derive(Debug, Clone)]
pub struct Tree<T> {
    nodes: Vec<Node<T>>,
    root: NodeId,
}

impl<T> Tree<T> {
    pub fn new(root: T) -> Self {
        Self {
            nodes: vec![Node {
                value: root,
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Nodes reachable from the root.
    pub fn len(&self) -> usize {
        self.pre_order().count()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    fn node(&self, id: NodeId) -> &Node<T> {
        assert!(id.0 < self.nodes.len(), "node {id} does not belong to this tree");
        &self.nodes[id.0]
    }

    pub fn value(&self, id: NodeId) -> &T {
        &self.node(id).value
    }

    pub fn value_mut(&mut self, id: NodeId) -> &mut T {
        assert!(id.0 < self.nodes.len(), "node {id} does not belong to this tree");
        &mut self.nodes[id.0].value
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).children.is_empty()
    }

    /// Distance from the root; the root itself is at depth 0.
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// Parent, grandparent, and so on up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// Append a new node holding `value` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, value: T) -> NodeId {
        assert!(parent.0 < self.nodes.len(), "node {parent} does not belong to this tree");
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            value,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Move `node` (with its subtree) to the end of `new_parent`'s children,
    /// detaching it from its current parent first.
    ///
    /// Returns false, changing nothing, if the move would make a node its
    /// own ancestor or tries to move the root.
    pub fn reattach(&mut self, node: NodeId, new_parent: NodeId) -> bool {
        if node == self.root
            || node == new_parent
            || self.ancestors(new_parent).any(|a| a == node)
        {
            return false;
        }
        self.detach(node);
        self.nodes[node.0].parent = Some(new_parent);
        self.nodes[new_parent.0].children.push(node);
        true
    }

    /// Cut `node` loose from its parent. Its subtree goes with it and is no
    /// longer reachable from the root.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.node(node).parent {
            self.nodes[parent.0].children.retain(|&c| c != node);
            self.nodes[node.0].parent = None;
        }
    }

    /// Pre-order walk from the root: parent before children, children in
    /// insertion order.
    pub fn pre_order(&self) -> PreOrder<'_, T> {
        self.pre_order_from(self.root)
    }

    pub fn pre_order_from(&self, start: NodeId) -> PreOrder<'_, T> {
        PreOrder {
            tree: self,
            stack: vec![start],
        }
    }

    /// Pre-order walk with pruning: when `visit` returns false the walk
    /// does not descend into that node's children, but carries on with its
    /// siblings.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(NodeId, &T) -> bool,
    {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if visit(id, self.value(id)) {
                stack.extend(self.children(id).iter().rev().copied());
            }
        }
    }

    /// Children before parent.
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![(self.root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                out.push(id);
                continue;
            }
            stack.push((id, true));
            for &child in self.children(id).iter().rev() {
                stack.push((child, false));
            }
        }
        out
    }

    /// Breadth-first from the root.
    pub fn level_order(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut queue = VecDeque::from([self.root]);
        while let Some(id) = queue.pop_front() {
            out.push(id);
            queue.extend(self.children(id).iter().copied());
        }
        out
    }

    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.pre_order().filter(|&n| self.is_leaf(n))
    }

    /// Values from the root down to `id`.
    pub fn path_from_root(&self, id: NodeId) -> Vec<&T> {
        let mut path: Vec<&T> = std::iter::once(id)
            .chain(self.ancestors(id))
            .map(|n| self.value(n))
            .collect();
        path.reverse();
        path
    }

    /// Build a tree of the same shape with every value mapped.
    pub fn map<U, F>(&self, mut f: F) -> Tree<U>
    where
        F: FnMut(&T) -> U,
    {
        let mut out = Tree::new(f(self.value(self.root)));
        let mut stack = vec![(self.root, out.root())];
        while let Some((from, to)) = stack.pop() {
            for &child in self.children(from) {
                let copy = out.add_child(to, f(self.value(child)));
                stack.push((child, copy));
            }
        }
        out
    }
}

impl<T: Clone> Tree<T> {
    /// Deep copy of the subtree rooted at `node` as a standalone tree.
    pub fn subtree(&self, node: NodeId) -> Tree<T> {
        let mut out = Tree::new(self.value(node).clone());
        let mut stack = vec![(node, out.root())];
        while let Some((from, to)) = stack.pop() {
            for &child in self.children(from) {
                let copy = out.add_child(to, self.value(child).clone());
                stack.push((child, copy));
            }
        }
        out
    }
}

impl<T: PartialEq> Tree<T> {
    /// First node in pre-order whose value equals `value`.
    pub fn find(&self, value: &T) -> Option<NodeId> {
        self.pre_order().find(|&n| self.value(n) == value)
    }
}

/// Iterator returned by [`Tree::pre_order`].
pub struct PreOrder<'t, T> {
    tree: &'t Tree<T>,
    stack: Vec<NodeId>,
}

impl<T> Iterator for PreOrder<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
