//! A memo store indexed by choice sequences.
//!
//! During backtracking search, many partial assignments share a long common
//! prefix of choices (the first k components' selections repeat across every
//! alternative tried for component k + 1). Rather than hashing a serialized
//! copy of the full key for every lookup, the cache is a prefix tree over the
//! small-integer alphabet of stream indices: walking a key visits exactly the
//! nodes its prefixes map to, and both partial and complete assignments are
//! addressed by the same structure.
//!
//! The tree is stored as an arena of nodes indexed by [`NodeId`]; a parent
//! holds a map from choice index to either a child node or a leaf value.
//! A slot holds a value or a sub-branch, never both: storing a value at a
//! key that currently roots a branch discards that branch, and extending a
//! key past a stored value discards the value.

use crate::containers::HashMap;
use crate::timetable_assert_simple;

/// A reserved choice index, usable as the final element of a key to give a
/// prefix a memo entry that coexists with entries for its extensions.
///
/// A value and a sub-branch are mutually exclusive at one key, so storing
/// directly at a prefix would discard everything memoized below it (and
/// vice versa). Keying the prefix's entry at `prefix + [TERMINATOR]`
/// instead puts it in a slot no real choice can occupy: stream indices are
/// always bounded by their component's stream count.
pub(crate) const TERMINATOR: usize = usize::MAX;

/// Index of a node in the [`PrefixCache`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NodeId(u32);

impl NodeId {
    const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
enum Slot<V> {
    Branch(NodeId),
    Leaf(V),
}

#[derive(Clone, Debug)]
struct Node<V> {
    children: HashMap<usize, Slot<V>>,
}

impl<V> Node<V> {
    fn new() -> Node<V> {
        Node {
            children: HashMap::default(),
        }
    }
}

/// A prefix tree mapping choice sequences to memoized values.
///
/// Keys are sequences of chosen stream indices, one per component in the
/// fixed component order; any prefix of a valid key is itself a valid key.
/// Lookups are exact: [`PrefixCache::get`] on a key whose slot is an
/// internal branch (or which was never set) is absent, never an error.
///
/// Nodes detached by overwrites remain allocated until [`PrefixCache::clear`];
/// the cache lives for a single search invocation (or a sequence of
/// invocations over an unchanged problem), so the arena is reclaimed
/// wholesale rather than per-operation.
#[derive(Clone, Debug)]
pub struct PrefixCache<V> {
    nodes: Vec<Node<V>>,
}

// Implemented explicitly to avoid imposing Default on the value type.
impl<V> Default for PrefixCache<V> {
    fn default() -> Self {
        PrefixCache::new()
    }
}

impl<V> PrefixCache<V> {
    pub fn new() -> PrefixCache<V> {
        PrefixCache {
            nodes: vec![Node::new()],
        }
    }

    /// Return the value stored exactly at `key`, if any.
    pub fn get(&self, key: &[usize]) -> Option<&V> {
        let (last, prefix) = key.split_last()?;

        let mut current = NodeId::ROOT;
        for step in prefix {
            match self.nodes[current.index()].children.get(step) {
                Some(Slot::Branch(id)) => current = *id,
                _ => return None,
            }
        }

        match self.nodes[current.index()].children.get(last) {
            Some(Slot::Leaf(value)) => Some(value),
            _ => None,
        }
    }

    /// Whether a value is stored exactly at `key`.
    pub fn has(&self, key: &[usize]) -> bool {
        self.get(key).is_some()
    }

    /// Store `value` at `key`, creating branch nodes for any unseen prefix.
    ///
    /// A leaf occupying an intermediate position of `key` is displaced by
    /// the new branch, and a branch rooted at `key` itself is displaced by
    /// the new leaf; sibling keys and keys that merely share a prefix with
    /// `key` are unaffected.
    ///
    /// The engine never stores at the empty key; doing so is a programming
    /// error.
    pub fn set(&mut self, key: &[usize], value: V) {
        timetable_assert_simple!(!key.is_empty(), "cannot store at the empty choice sequence");
        let Some((last, prefix)) = key.split_last() else {
            return;
        };

        let mut current = NodeId::ROOT;
        for step in prefix {
            current = self.branch_at(current, *step);
        }

        let _ = self.nodes[current.index()]
            .children
            .insert(*last, Slot::Leaf(value));
    }

    /// Remove the leaf value at `key`, if one is stored there.
    ///
    /// A branch at `key` is left untouched: the key already reads as absent
    /// and the descendants' own entries must survive.
    pub fn delete(&mut self, key: &[usize]) {
        timetable_assert_simple!(!key.is_empty(), "cannot delete the empty choice sequence");
        let Some((last, prefix)) = key.split_last() else {
            return;
        };

        let mut current = NodeId::ROOT;
        for step in prefix {
            match self.nodes[current.index()].children.get(step) {
                Some(Slot::Branch(id)) => current = *id,
                _ => return,
            }
        }

        if let Some(Slot::Leaf(_)) = self.nodes[current.index()].children.get(last) {
            let _ = self.nodes[current.index()].children.remove(last);
        }
    }

    /// Reset the cache to empty, reclaiming the arena.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[NodeId::ROOT.index()].children.clear();
    }

    /// Return the existing branch under `node` at `step`, or allocate one,
    /// displacing any leaf stored in that slot.
    fn branch_at(&mut self, node: NodeId, step: usize) -> NodeId {
        if let Some(Slot::Branch(id)) = self.nodes[node.index()].children.get(&step) {
            return *id;
        }

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new());
        let _ = self.nodes[node.index()]
            .children
            .insert(step, Slot::Branch(id));
        id
    }
}
