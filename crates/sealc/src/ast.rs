use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::seq::Seq;
use crate::strings::{StrRef, StringTable};

/// Index of a node in its [`Ast`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    /// 1-based source line the node starts on.
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Block {
        children: Vec<NodeId>,
    },
    VarDeclr {
        name: StrRef,
        value: NodeId,
    },
    BinOp {
        op: BinOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    NumInt(i64),
    Access(StrRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl Node {
    /// Nodes this node references, in evaluation order.
    pub fn children(&self) -> Vec<NodeId> {
        match &self.kind {
            NodeKind::Block { children } => children.clone(),
            NodeKind::VarDeclr { value, .. } => vec![*value],
            NodeKind::BinOp { lhs, rhs, .. } => vec![*lhs, *rhs],
            NodeKind::NumInt(_) | NodeKind::Access(_) => Vec::new(),
        }
    }
}

/// Growable node arena. Nodes are only ever appended, and a node may only
/// reference nodes already in the arena, so the graph is acyclic and
/// children always precede their parents.
#[derive(Debug, Default)]
pub struct Arena {
    nodes: Seq<Node>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: Node) -> Result<NodeId, CompileError> {
        let next = self.nodes.len();
        debug_assert!(
            node.children().iter().all(|child| child.index() < next),
            "node references a node that does not precede it"
        );
        let index = self.nodes.push(node)?;
        let id = u32::try_from(index).map_err(|_| CompileError::OutOfMemory)?;
        Ok(NodeId(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Parsed compilation unit: the node arena, the root block and the string
/// table node names point into.
#[derive(Debug)]
pub struct Ast {
    nodes: Seq<Node>,
    pub root: NodeId,
    pub strings: StringTable,
}

/// Output still owed by [`Ast::render`], innermost last.
enum Piece {
    Node(NodeId),
    Text(&'static str),
}

#[derive(Serialize)]
struct AstDump<'a> {
    root: NodeId,
    nodes: &'a [Node],
}

impl Ast {
    pub fn new(arena: Arena, root: NodeId, strings: StringTable) -> Self {
        Ast {
            nodes: arena.nodes,
            root,
            strings,
        }
    }

    /// Look up a node. Ids are only produced by this tree's arena, so an
    /// unknown id is a bug in the caller.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Render a subtree as nested constructor syntax, e.g.
    /// `BinOp(Add, NumInt(1), Access(x))`.
    pub fn render(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut pending = vec![Piece::Node(id)];
        // Writing into a String cannot fail.
        while let Some(piece) = pending.pop() {
            let id = match piece {
                Piece::Text(text) => {
                    out.push_str(text);
                    continue;
                }
                Piece::Node(id) => id,
            };
            match &self.node(id).kind {
                NodeKind::Block { children } => {
                    out.push_str("Block[");
                    pending.push(Piece::Text("]"));
                    for (i, child) in children.iter().enumerate().rev() {
                        pending.push(Piece::Node(*child));
                        if i > 0 {
                            pending.push(Piece::Text(", "));
                        }
                    }
                }
                NodeKind::VarDeclr { name, value } => {
                    let _ = write!(out, "VarDeclr({}, ", self.strings.text(*name));
                    pending.push(Piece::Text(")"));
                    pending.push(Piece::Node(*value));
                }
                NodeKind::BinOp { op, lhs, rhs } => {
                    let _ = write!(out, "BinOp({op:?}, ");
                    pending.push(Piece::Text(")"));
                    pending.push(Piece::Node(*rhs));
                    pending.push(Piece::Text(", "));
                    pending.push(Piece::Node(*lhs));
                }
                NodeKind::NumInt(value) => {
                    let _ = write!(out, "NumInt({value})");
                }
                NodeKind::Access(name) => {
                    let _ = write!(out, "Access({})", self.strings.text(*name));
                }
            }
        }
        out
    }

    /// Dump the arena as JSON, nodes in creation order.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&AstDump {
            root: self.root,
            nodes: &self.nodes,
        })
    }
}
