//! Owned syntax tree
//!
//! The parser adapter lowers the grammar's concrete tree into this
//! closed set of node kinds. A tree lives for one highlight pass and
//! is rebuilt from scratch on the next successful parse.

use crate::text::TextRange;

/// An identifier and where it sits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub range: TextRange,
    pub text: String,
}

/// One imported name with its optional `as` target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: TextRange,
    pub asname: Option<TextRange>,
}

/// Literal constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Number,
    Str,
    /// A string that is the first statement of a body
    Docstring,
    Boolean,
    None,
}

/// Every node kind the classification engine understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Module,
    ClassDef {
        keyword: TextRange,
        name: Ident,
        bases: Vec<TextRange>,
        decorators: Vec<TextRange>,
    },
    FunctionDef {
        keyword: TextRange,
        name: Ident,
        decorators: Vec<TextRange>,
        returns: Option<TextRange>,
    },
    AsyncFunctionDef {
        /// Covers both `async` and `def`
        keyword: TextRange,
        name: Ident,
        decorators: Vec<TextRange>,
        returns: Option<TextRange>,
    },
    /// A parameter of a function or lambda
    Arg {
        name: TextRange,
        annotation: Option<TextRange>,
    },
    Name(Ident),
    Call {
        /// Set when the callee is a bare name
        callee: Option<Ident>,
    },
    Constant(Literal),
    AnnAssign {
        target: TextRange,
        annotation: TextRange,
    },
    Import {
        names: Vec<Alias>,
    },
    ImportFrom {
        module: Option<TextRange>,
        names: Vec<Alias>,
    },
    Attribute {
        /// Set when the base is a bare name
        base: Option<TextRange>,
        attr: TextRange,
    },
    Assign {
        targets: Vec<TextRange>,
        /// Set when the assigned value is a bare name
        value: Option<TextRange>,
    },
    BinaryOp,
    Compare,
    BoolOp,
    UnaryOp,
    Try {
        /// Exception-type expression of each handler that names one
        handlers: Vec<TextRange>,
    },
    JoinedStr {
        /// Embedded `{...}` expressions
        fields: Vec<TextRange>,
    },
    Bytes,
    /// A reserved word token
    Keyword(String),
    Punctuation,
    /// A `#` comment and its text
    Comment(String),
    /// Structure without a category of its own (blocks, statements, ...)
    Other,
}

/// A node with its source span and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub range: TextRange,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, range: TextRange) -> Self {
        Self {
            kind,
            range,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }

    /// Pre-order traversal: each node before its children, children in source order
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

/// Pre-order iterator over a subtree
pub struct Walk<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<&'a SyntaxNode> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// The result of a successful parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    pub root: SyntaxNode,
}

impl SyntaxTree {
    pub fn walk(&self) -> Walk<'_> {
        self.root.walk()
    }

    pub fn node_count(&self) -> usize {
        self.walk().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_is_preorder() {
        let leaf = |col| SyntaxNode::new(NodeKind::Punctuation, TextRange::on_line(0, col, col + 1));
        let inner = SyntaxNode::new(NodeKind::Other, TextRange::on_line(0, 1, 3))
            .with_children(vec![leaf(1), leaf(2)]);
        let root = SyntaxNode::new(NodeKind::Module, TextRange::on_line(0, 0, 4))
            .with_children(vec![leaf(0), inner, leaf(3)]);
        let starts: Vec<usize> = root.walk().map(|n| n.range.start.col).collect();
        assert_eq!(starts, vec![0, 0, 1, 1, 2, 3]);
        assert_eq!(SyntaxTree { root }.node_count(), 6);
    }
}
