// src/object.rs
// Result graph: an arena of nodes addressed by `ObjectId`. Copy actions
// create `Alias` forwarders; pending attributes are replaced in place, so an
// id keeps its identity from allocation to the end of the parse.

use serde::Serialize;

use crate::host::{Origin, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectId(u32);

impl ObjectId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The semantic action a pending attribute waits to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub rule: u32,
    pub action: u32,
    pub params: Vec<ObjectId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pending {
    /// Set once the defining action has been reached.
    pub binding: Option<Binding>,
    /// Attributes to re-attempt once this one resolves.
    pub declic: Vec<ObjectId>,
    pub origin: Origin,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node<V> {
    /// Raw token text.
    String {
        text: String,
        pos: Position,
        error: bool,
    },
    /// Hard-function result; `value` is `None` when the host refused.
    User {
        value: Option<V>,
        pos: Position,
        function: u32,
        error: bool,
    },
    /// Soft-function result.
    Term {
        function: u32,
        children: Vec<ObjectId>,
        pos: Position,
        error: bool,
    },
    /// Stands for a syntax error at this slot.
    Null,
    Alias(ObjectId),
    Pending(Pending),
}

impl<V> Node<V> {
    pub fn is_error(&self) -> bool {
        match self {
            Node::String { error, .. } | Node::User { error, .. } | Node::Term { error, .. } => {
                *error
            }
            Node::Null => true,
            Node::Alias(_) | Node::Pending(_) => false,
        }
    }

    pub fn pos(&self) -> Option<Position> {
        match self {
            Node::String { pos, .. } | Node::User { pos, .. } | Node::Term { pos, .. } => {
                Some(*pos)
            }
            Node::Pending(p) => Some(p.origin.pos),
            Node::Null | Node::Alias(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Graph<V> {
    nodes: Vec<Node<V>>,
}

impl<V> Default for Graph<V> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<V> Graph<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn alloc(&mut self, node: Node<V>) -> ObjectId {
        let id = ObjectId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// The node stored at `id`, without following aliases.
    pub fn node(&self, id: ObjectId) -> &Node<V> {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: ObjectId) -> &mut Node<V> {
        &mut self.nodes[id.index()]
    }

    /// Replaces the node at `id` in place, returning the old one.
    pub(crate) fn replace(&mut self, id: ObjectId, node: Node<V>) -> Node<V> {
        std::mem::replace(&mut self.nodes[id.index()], node)
    }

    /// Follows alias links to the first non-alias node.
    pub fn representative(&self, mut id: ObjectId) -> ObjectId {
        while let Node::Alias(next) = self.nodes[id.index()] {
            id = next;
        }
        id
    }

    pub fn resolve(&self, id: ObjectId) -> &Node<V> {
        self.node(self.representative(id))
    }

    pub fn is_pending(&self, id: ObjectId) -> bool {
        matches!(self.resolve(id), Node::Pending(_))
    }

    pub fn is_error(&self, id: ObjectId) -> bool {
        self.resolve(id).is_error()
    }

    pub fn text(&self, id: ObjectId) -> Option<&str> {
        match self.resolve(id) {
            Node::String { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn value(&self, id: ObjectId) -> Option<&V> {
        match self.resolve(id) {
            Node::User { value, .. } => value.as_ref(),
            _ => None,
        }
    }

    pub fn children(&self, id: ObjectId) -> &[ObjectId] {
        match self.resolve(id) {
            Node::Term { children, .. } => children,
            _ => &[],
        }
    }

    pub fn pending_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Pending(_)))
            .count()
    }

    /// Replaces every leftover pending node with `Null`; returns how many.
    pub(crate) fn settle(&mut self) -> usize {
        let mut n = 0;
        for node in &mut self.nodes {
            if matches!(node, Node::Pending(_)) {
                *node = Node::Null;
                n += 1;
            }
        }
        n
    }
}

/// Owned, alias-free copy of a subgraph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Snapshot<V> {
    String {
        text: String,
        pos: Position,
        error: bool,
    },
    User {
        function: u32,
        value: Option<V>,
        pos: Position,
        error: bool,
    },
    Term {
        function: u32,
        children: Vec<Snapshot<V>>,
        pos: Position,
        error: bool,
    },
    Null,
    Pending,
}

impl<V: Clone> Graph<V> {
    /// Copies the subgraph under `id`. Walks with an explicit stack, so deep
    /// left-recursive trees do not exhaust the call stack.
    pub fn snapshot(&self, id: ObjectId) -> Snapshot<V> {
        enum Work {
            Visit(ObjectId),
            Close {
                function: u32,
                arity: usize,
                pos: Position,
                error: bool,
            },
        }

        let mut work = vec![Work::Visit(id)];
        let mut built: Vec<Snapshot<V>> = Vec::new();
        while let Some(item) = work.pop() {
            match item {
                Work::Visit(id) => match self.resolve(id) {
                    Node::String { text, pos, error } => built.push(Snapshot::String {
                        text: text.clone(),
                        pos: *pos,
                        error: *error,
                    }),
                    Node::User {
                        value,
                        pos,
                        function,
                        error,
                    } => built.push(Snapshot::User {
                        function: *function,
                        value: value.clone(),
                        pos: *pos,
                        error: *error,
                    }),
                    Node::Term {
                        function,
                        children,
                        pos,
                        error,
                    } => {
                        work.push(Work::Close {
                            function: *function,
                            arity: children.len(),
                            pos: *pos,
                            error: *error,
                        });
                        work.extend(children.iter().rev().map(|&c| Work::Visit(c)));
                    }
                    Node::Null => built.push(Snapshot::Null),
                    Node::Pending(_) => built.push(Snapshot::Pending),
                    Node::Alias(_) => unreachable!("resolve never stops on an alias"),
                },
                Work::Close {
                    function,
                    arity,
                    pos,
                    error,
                } => {
                    let children = built.split_off(built.len() - arity);
                    built.push(Snapshot::Term {
                        function,
                        children,
                        pos,
                        error,
                    });
                }
            }
        }
        built.pop().unwrap_or(Snapshot::Null)
    }
}
