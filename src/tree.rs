//! The adaptive Huffman tree.
//!
//! Nodes live in an arena addressed by [`NodeId`]. A second table maps each
//! *order* to the node currently holding it: the root has order 0 and orders
//! grow away from it. Frequency never increases with order (the sibling
//! property), and [`Tree::rebalance`] restores that after every symbol.
//!
//! # The two updates
//!
//! A symbol seen for the first time splits the NYT leaf `z`:
//!
//! ```text
//!       p                p
//!       |                |
//!       z      ==>       U          order(U) = k
//!   (order k)           / \         order(X) = k + 1
//!                      z   X        order(z) = k + 2
//! ```
//!
//! and then the new internal node `U` is rebalanced. Every later occurrence
//! rebalances the symbol's leaf directly. Rebalancing walks towards the root;
//! at each step the node first trades places with the lowest-order node of
//! equal frequency (never its own parent), then gains one count.
//!
//! Encoder and decoder apply the same updates to the same symbol sequence,
//! so their trees stay identical without any table in the stream.

use smallvec::SmallVec;
use tracing::trace;

use crate::error::{Error, Result};

/// Number of distinct symbols (all byte values).
pub const ALPHABET_SIZE: usize = 256;

/// Maximum number of live nodes: one leaf and one internal node per symbol, plus NYT.
pub const MAX_NODES: usize = 2 * ALPHABET_SIZE + 1;

/// Root-to-leaf branch decisions: `false` goes left, `true` goes right.
pub type CodePath = SmallVec<[bool; 32]>;

/// Stable handle of a node inside a [`Tree`].
///
/// Handles are assigned in creation order and never reused within a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    /// Leaf for a byte value that has been seen.
    Byte(u8),
    /// The "not yet transmitted" leaf.
    Nyt,
    /// Internal node with two children.
    Internal,
}

/// A single tree node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    freq: u64,
    symbol: Symbol,
    order: usize,
    /// `[left, right]`, indexed by the code bit.
    children: Option<[NodeId; 2]>,
    parent: Option<NodeId>,
}

impl Node {
    /// Occurrence count (sum of descendant leaves for internal nodes).
    pub fn freq(&self) -> u64 {
        self.freq
    }

    /// Symbol tag.
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// Current order (0 = root).
    pub fn order(&self) -> usize {
        self.order
    }

    /// Parent handle, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// `[left, right]` children, `None` for leaves.
    pub fn children(&self) -> Option<[NodeId; 2]> {
        self.children
    }

    /// True for symbol leaves and the NYT leaf.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Adaptive Huffman tree for a single encode or decode run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
    by_order: Vec<NodeId>,
    nyt: NodeId,
}

impl Tree {
    /// Create a tree consisting of the NYT leaf alone.
    pub fn new() -> Self {
        let nyt = NodeId(0);
        let mut nodes = Vec::with_capacity(MAX_NODES);
        nodes.push(Node {
            freq: 0,
            symbol: Symbol::Nyt,
            order: 0,
            children: None,
            parent: None,
        });

        let mut by_order = Vec::with_capacity(MAX_NODES);
        by_order.push(nyt);

        Self {
            nodes,
            by_order,
            nyt,
        }
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The root always holds order 0.
    pub fn root(&self) -> NodeId {
        self.by_order[0]
    }

    /// The NYT leaf.
    pub fn nyt(&self) -> NodeId {
        self.nyt
    }

    /// Borrow a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Node holding `order`, if that order is in use.
    pub fn node_at(&self, order: usize) -> Option<NodeId> {
        self.by_order.get(order).copied()
    }

    /// Leaf of `byte`, if it has been seen.
    ///
    /// A linear scan in order; there are at most [`MAX_NODES`] nodes.
    pub fn find_by_symbol(&self, byte: u8) -> Option<NodeId> {
        self.by_order
            .iter()
            .copied()
            .find(|&id| self.node(id).symbol == Symbol::Byte(byte))
    }

    /// Child of `id` along `bit`, or `None` at a leaf.
    pub fn step(&self, id: NodeId, bit: bool) -> Option<NodeId> {
        self.node(id)
            .children
            .map(|children| children[usize::from(bit)])
    }

    /// Code of `id`: the branch decisions from the root down to it.
    pub fn path_of(&self, id: NodeId) -> CodePath {
        let mut path = CodePath::new();
        let mut node = id;
        while let Some(parent) = self.node(node).parent {
            path.push(self.side_of(node, parent) == 1);
            node = parent;
        }
        // Collected leaf-to-root.
        path.reverse();
        path
    }

    /// Split the NYT leaf to make room for `byte` and count its first occurrence.
    ///
    /// Returns the new leaf.
    ///
    /// # Errors
    /// `DuplicateLiteral` if `byte` already has a leaf, `TreeFull` if the arena
    /// has no room for two more nodes.
    pub fn insert_new_symbol(&mut self, byte: u8) -> Result<NodeId> {
        if self.find_by_symbol(byte).is_some() {
            return Err(Error::DuplicateLiteral(byte));
        }
        if self.nodes.len() + 2 > MAX_NODES {
            return Err(Error::TreeFull {
                capacity: MAX_NODES,
            });
        }

        let z = self.nyt;
        let order = self.node(z).order;
        let parent = self.node(z).parent;
        debug_assert_eq!(order + 1, self.by_order.len(), "NYT holds the last order");

        let internal = NodeId(self.nodes.len());
        let leaf = NodeId(self.nodes.len() + 1);

        self.nodes.push(Node {
            freq: 0,
            symbol: Symbol::Internal,
            order,
            children: Some([z, leaf]),
            parent,
        });
        self.nodes.push(Node {
            freq: 1,
            symbol: Symbol::Byte(byte),
            order: order + 1,
            children: None,
            parent: Some(internal),
        });

        if let Some(parent) = parent {
            let side = self.side_of(z, parent);
            self.set_child(parent, side, internal);
        }

        let nyt = &mut self.nodes[z.0];
        nyt.parent = Some(internal);
        nyt.order = order + 2;

        self.by_order[order] = internal;
        self.by_order.push(leaf);
        self.by_order.push(z);

        trace!(symbol = byte, nodes = self.nodes.len(), "split NYT");

        self.rebalance(internal);
        Ok(leaf)
    }

    /// Count one occurrence at `start` and every ancestor, restoring the sibling property.
    pub fn rebalance(&mut self, start: NodeId) {
        let mut node = start;
        while let Some(parent) = self.node(node).parent {
            let parent = match self.swap_candidate(node, parent) {
                Some(candidate) => self.swap_subtrees(node, candidate),
                None => parent,
            };
            self.nodes[node.0].freq += 1;
            node = parent;
        }
        self.nodes[node.0].freq += 1;
    }

    /// Check every structural invariant of the tree.
    ///
    /// # Errors
    /// `InvariantViolation` describing the first broken invariant.
    pub fn validate(&self) -> Result<()> {
        let violation = |msg: String| Err(Error::InvariantViolation(msg));

        if self.by_order.len() != self.nodes.len() {
            return violation(format!(
                "{} orders for {} nodes",
                self.by_order.len(),
                self.nodes.len()
            ));
        }
        if self.nodes.len() > MAX_NODES {
            return violation(format!("{} nodes exceed {MAX_NODES}", self.nodes.len()));
        }

        let mut seen = [false; ALPHABET_SIZE];
        let mut nyt_count = 0;
        let mut prev_freq = u64::MAX;

        for (order, &id) in self.by_order.iter().enumerate() {
            let node = self.node(id);
            if node.order != order {
                return violation(format!("{id:?} at order {order} records {}", node.order));
            }
            if node.freq > prev_freq {
                return violation(format!("frequency rises at order {order}"));
            }
            prev_freq = node.freq;

            match (node.parent, order) {
                (None, 0) => {}
                (Some(parent), _) if order > 0 => {
                    if self.node(parent).order >= order {
                        return violation(format!("{id:?} is not below its parent in order"));
                    }
                }
                _ => return violation(format!("{id:?} has a misplaced root link")),
            }

            match (node.symbol, node.children) {
                (Symbol::Internal, Some(children)) => {
                    for child in children {
                        if self.node(child).parent != Some(id) {
                            return violation(format!("{child:?} does not point back to {id:?}"));
                        }
                    }
                    let sum = children.iter().map(|&c| self.node(c).freq).sum::<u64>();
                    if node.freq != sum {
                        return violation(format!("{id:?} weighs {} but children sum {sum}", node.freq));
                    }
                }
                (Symbol::Nyt, None) => {
                    nyt_count += 1;
                    if id != self.nyt || node.freq != 0 {
                        return violation(format!("stray NYT leaf {id:?}"));
                    }
                }
                (Symbol::Byte(byte), None) => {
                    if std::mem::replace(&mut seen[usize::from(byte)], true) {
                        return violation(format!("byte {byte:#04x} has two leaves"));
                    }
                }
                _ => return violation(format!("{id:?} has the wrong shape for its symbol")),
            }
        }

        if nyt_count != 1 {
            return violation(format!("{nyt_count} NYT leaves"));
        }
        Ok(())
    }

    /// Lowest-order node sharing `node`'s frequency, excluding `parent`.
    fn swap_candidate(&self, node: NodeId, parent: NodeId) -> Option<NodeId> {
        let Node { freq, order, .. } = *self.node(node);
        self.by_order[..order]
            .iter()
            .copied()
            .find(|&id| id != parent && self.node(id).freq == freq)
    }

    /// Exchange the subtrees rooted at `a` and `b`, orders included.
    ///
    /// Returns `a`'s new parent.
    fn swap_subtrees(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let (Some(parent_a), Some(parent_b)) = (self.node(a).parent, self.node(b).parent) else {
            unreachable!("the root never trades places");
        };
        debug_assert_ne!(a, b);

        let side_a = self.side_of(a, parent_a);
        let side_b = self.side_of(b, parent_b);
        self.set_child(parent_b, side_b, a);
        self.set_child(parent_a, side_a, b);

        self.nodes[a.0].parent = Some(parent_b);
        self.nodes[b.0].parent = Some(parent_a);
        self.swap_positions(a, b);

        trace!(
            node = a.0,
            with = b.0,
            order = self.node(a).order,
            "swapped subtrees"
        );
        parent_b
    }

    /// Exchange the orders of `a` and `b`; tree shape is untouched.
    fn swap_positions(&mut self, a: NodeId, b: NodeId) {
        let (order_a, order_b) = (self.node(a).order, self.node(b).order);
        self.by_order.swap(order_a, order_b);
        self.nodes[a.0].order = order_b;
        self.nodes[b.0].order = order_a;
    }

    /// 0 if `child` is `parent`'s left child, 1 if right.
    fn side_of(&self, child: NodeId, parent: NodeId) -> usize {
        match self.node(parent).children {
            Some([left, _]) if left == child => 0,
            Some([_, right]) if right == child => 1,
            _ => unreachable!("{child:?} is not a child of {parent:?}"),
        }
    }

    fn set_child(&mut self, parent: NodeId, side: usize, child: NodeId) {
        if let Some(children) = self.nodes[parent.0].children.as_mut() {
            children[side] = child;
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
