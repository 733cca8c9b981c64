//! Structural parser adapter
//!
//! Wraps the tree-sitter Python grammar. A concrete tree containing
//! ERROR or MISSING nodes is reported as a `ParseError` at the first
//! such node; otherwise the tree is lowered into [`SyntaxTree`].
//!
//! Bare names whose role is fixed by their parent (class bases,
//! decorators, annotations, callees, imported names, handler exception
//! types) are folded into the parent node and not lowered again as
//! `Name` references.

use tree_sitter::{Node, Parser};

use super::tree::{Alias, Ident, Literal, NodeKind, SyntaxNode, SyntaxTree};
use crate::error::{HighlightError, ParseError, Result};
use crate::text::{LineIndex, TextRange};

/// Anonymous tokens tagged as punctuation
const PUNCTUATION: &[&str] = &["(", ")", "[", "]", "{", "}", ",", ":", ";", ".", "->"];

/// Node kinds that list several assignment targets
const TARGET_LISTS: &[&str] = &[
    "pattern_list",
    "tuple_pattern",
    "list_pattern",
    "expression_list",
    "tuple",
    "list",
];

/// Python parser producing owned syntax trees
pub struct ParserAdapter {
    parser: Parser,
}

impl ParserAdapter {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(tree_sitter_python::language())
            .map_err(|e| HighlightError::Language(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Parse the whole buffer
    pub fn parse(&mut self, source: &str) -> std::result::Result<SyntaxTree, ParseError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ParseError::new(0, 0, "parser returned no tree"))?;
        let index = LineIndex::new(source);
        let root = tree.root_node();
        if root.has_error() {
            return Err(first_error(root, source, &index));
        }
        let lowering = Lowering { source, index };
        Ok(SyntaxTree {
            root: lowering.module(root),
        })
    }
}

/// Locate the first ERROR or MISSING node in document order
fn first_error(root: Node<'_>, source: &str, index: &LineIndex<'_>) -> ParseError {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = index.position(node.start_byte()).unwrap_or_default();
            let message = if node.is_missing() {
                format!("missing `{}`", node.kind())
            } else {
                let snippet: String = source
                    .get(node.start_byte()..node.end_byte())
                    .unwrap_or("")
                    .chars()
                    .take(20)
                    .collect();
                format!("unexpected `{}`", snippet.trim())
            };
            return ParseError::new(pos.line, pos.col, message);
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    ParseError::new(0, 0, "invalid syntax")
}

/// Lowers concrete grammar nodes into `SyntaxNode`s
struct Lowering<'s> {
    source: &'s str,
    index: LineIndex<'s>,
}

impl<'s> Lowering<'s> {
    fn range(&self, node: Node<'_>) -> TextRange {
        self.bytes(node.start_byte(), node.end_byte())
    }

    fn bytes(&self, start: usize, end: usize) -> TextRange {
        self.index.range(start, end).unwrap_or_default()
    }

    fn text(&self, node: Node<'_>) -> &'s str {
        self.source.get(node.start_byte()..node.end_byte()).unwrap_or("")
    }

    fn ident(&self, node: Node<'_>) -> Ident {
        Ident {
            range: self.range(node),
            text: self.text(node).to_string(),
        }
    }

    fn leaf(&self, kind: NodeKind, node: Node<'_>) -> SyntaxNode {
        SyntaxNode::new(kind, self.range(node))
    }

    fn module(&self, node: Node<'_>) -> SyntaxNode {
        SyntaxNode::new(NodeKind::Module, self.range(node)).with_children(self.body(node, true))
    }

    fn lower(&self, node: Node<'_>) -> Option<SyntaxNode> {
        if !node.is_named() {
            return self.token(node);
        }
        let range = self.range(node);
        let lowered = match node.kind() {
            "block" => SyntaxNode::new(NodeKind::Other, range).with_children(self.body(node, false)),
            "decorated_definition" => self.decorated(node),
            "class_definition" => self.class_def(node, Vec::new()),
            "function_definition" => self.function_def(node, Vec::new()),
            "parameters" | "lambda_parameters" => {
                SyntaxNode::new(NodeKind::Other, range).with_children(self.parameters(node))
            }
            "identifier" => SyntaxNode::new(NodeKind::Name(self.ident(node)), range),
            "call" => self.call(node),
            "keyword_argument" => self.keyword_argument(node),
            "integer" | "float" => SyntaxNode::new(NodeKind::Constant(Literal::Number), range),
            "true" | "false" => SyntaxNode::new(NodeKind::Constant(Literal::Boolean), range),
            "none" => SyntaxNode::new(NodeKind::Constant(Literal::None), range),
            "string" => self.string(node),
            "assignment" => self.assignment(node),
            "augmented_assignment" => self.augmented_assignment(node),
            "import_statement" => self.import(node),
            "import_from_statement" | "future_import_statement" => self.import_from(node),
            "attribute" => self.attribute(node),
            "binary_operator" => self.operator(NodeKind::BinaryOp, node),
            "boolean_operator" => self.operator(NodeKind::BoolOp, node),
            "comparison_operator" => self.operator(NodeKind::Compare, node),
            "unary_operator" | "not_operator" => self.operator(NodeKind::UnaryOp, node),
            "try_statement" => self.try_statement(node),
            "comment" => SyntaxNode::new(NodeKind::Comment(self.text(node).to_string()), range),
            _ => SyntaxNode::new(NodeKind::Other, range).with_children(self.children_except(node, &[])),
        };
        Some(lowered)
    }

    /// Anonymous tokens: keywords and punctuation survive, the rest is dropped
    fn token(&self, node: Node<'_>) -> Option<SyntaxNode> {
        let kind = node.kind();
        if PUNCTUATION.contains(&kind) {
            Some(self.leaf(NodeKind::Punctuation, node))
        } else if !kind.is_empty() && kind.chars().all(|c| c.is_ascii_alphabetic()) {
            Some(self.leaf(NodeKind::Keyword(kind.to_string()), node))
        } else {
            None
        }
    }

    fn children_except<'t>(&self, node: Node<'t>, claimed: &[Node<'t>]) -> Vec<SyntaxNode> {
        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
        children
            .into_iter()
            .filter(|child| !claimed.contains(child))
            .filter_map(|child| self.lower(child))
            .collect()
    }

    /// Statements of a module or block, marking a leading docstring
    fn body(&self, node: Node<'_>, allow_docstring: bool) -> Vec<SyntaxNode> {
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        let mut seen_statement = !allow_docstring;
        let mut lowered = Vec::with_capacity(children.len());
        for child in children {
            if !seen_statement && child.is_named() && child.kind() != "comment" {
                seen_statement = true;
                if let Some(doc) = self.docstring(child) {
                    lowered.push(doc);
                    continue;
                }
            }
            lowered.extend(self.lower(child));
        }
        lowered
    }

    fn docstring(&self, statement: Node<'_>) -> Option<SyntaxNode> {
        if statement.kind() != "expression_statement" || statement.named_child_count() != 1 {
            return None;
        }
        let string = statement.named_child(0)?;
        if string.kind() != "string" || !matches!(self.string_kind(string), StringKind::Plain) {
            return None;
        }
        let doc = self.leaf(NodeKind::Constant(Literal::Docstring), string);
        Some(SyntaxNode::new(NodeKind::Other, self.range(statement)).with_children(vec![doc]))
    }

    fn decorated(&self, node: Node<'_>) -> SyntaxNode {
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        let definition = node.child_by_field_name("definition");
        let mut decorators = Vec::new();
        let mut lowered = Vec::new();
        for child in children {
            if child.kind() == "decorator" {
                let (range, args) = self.decorator(child);
                decorators.push(range);
                lowered.extend(args);
            } else if Some(child) != definition {
                lowered.extend(self.lower(child));
            }
        }
        if let Some(def) = definition {
            let def = match def.kind() {
                "class_definition" => Some(self.class_def(def, decorators)),
                "function_definition" => Some(self.function_def(def, decorators)),
                _ => self.lower(def),
            };
            lowered.extend(def);
        }
        SyntaxNode::new(NodeKind::Other, self.range(node)).with_children(lowered)
    }

    /// Range from `@` through the decorator name, plus lowered call
    /// arguments and trailing comments
    fn decorator(&self, node: Node<'_>) -> (TextRange, Vec<SyntaxNode>) {
        let mut cursor = node.walk();
        let named: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        let mut lowered: Vec<SyntaxNode> = Vec::new();
        let mut range = self.range(node);
        if let Some(expr) = named.iter().find(|c| c.kind() != "comment") {
            let function = expr.child_by_field_name("function").filter(|_| expr.kind() == "call");
            match function {
                Some(function) => {
                    lowered.extend(expr.child_by_field_name("arguments").and_then(|args| self.lower(args)));
                    range = self.bytes(node.start_byte(), function.end_byte());
                }
                None => range = self.bytes(node.start_byte(), expr.end_byte()),
            }
        }
        lowered.extend(named.iter().filter(|c| c.kind() == "comment").filter_map(|c| self.lower(*c)));
        (range, lowered)
    }

    fn class_def(&self, node: Node<'_>, decorators: Vec<TextRange>) -> SyntaxNode {
        let name = node.child_by_field_name("name");
        let superclasses = node.child_by_field_name("superclasses");
        let body = node.child_by_field_name("body");
        let keyword = node.child(0).filter(|c| c.kind() == "class");
        let (Some(name), Some(keyword)) = (name, keyword) else {
            return self.other(node);
        };

        let mut claimed = vec![name, keyword];
        let mut bases = Vec::new();
        let mut children = Vec::new();
        if let Some(args) = superclasses {
            claimed.push(args);
            let mut cursor = args.walk();
            let items: Vec<Node<'_>> = args.children(&mut cursor).collect();
            for item in items {
                if item.is_named() && !matches!(item.kind(), "keyword_argument" | "comment") {
                    bases.push(self.range(item));
                } else {
                    children.extend(self.lower(item));
                }
            }
        }
        if let Some(body) = body {
            claimed.push(body);
            children.push(SyntaxNode::new(NodeKind::Other, self.range(body)).with_children(self.body(body, true)));
        }
        children.extend(self.children_except(node, &claimed));

        let kind = NodeKind::ClassDef {
            keyword: self.range(keyword),
            name: self.ident(name),
            bases,
            decorators,
        };
        SyntaxNode::new(kind, self.range(node)).with_children(children)
    }

    fn function_def(&self, node: Node<'_>, decorators: Vec<TextRange>) -> SyntaxNode {
        let name = node.child_by_field_name("name");
        let returns = node.child_by_field_name("return_type");
        let body = node.child_by_field_name("body");
        let Some(name) = name else {
            return self.other(node);
        };

        let mut claimed = vec![name];
        let mut is_async = false;
        let mut keyword_start = None;
        let mut keyword_end = None;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "async" if !child.is_named() => {
                    is_async = true;
                    keyword_start.get_or_insert(child.start_byte());
                    claimed.push(child);
                }
                "def" if !child.is_named() => {
                    keyword_start.get_or_insert(child.start_byte());
                    keyword_end = Some(child.end_byte());
                    claimed.push(child);
                    break;
                }
                _ => {}
            }
        }
        let (Some(start), Some(end)) = (keyword_start, keyword_end) else {
            return self.other(node);
        };
        if let Some(returns) = returns {
            claimed.push(returns);
        }

        let mut children = Vec::new();
        if let Some(body) = body {
            claimed.push(body);
            children.push(SyntaxNode::new(NodeKind::Other, self.range(body)).with_children(self.body(body, true)));
        }
        children.extend(self.children_except(node, &claimed));

        let keyword = self.bytes(start, end);
        let name = self.ident(name);
        let returns = returns.map(|r| self.range(r));
        let kind = if is_async {
            NodeKind::AsyncFunctionDef {
                keyword,
                name,
                decorators,
                returns,
            }
        } else {
            NodeKind::FunctionDef {
                keyword,
                name,
                decorators,
                returns,
            }
        };
        SyntaxNode::new(kind, self.range(node)).with_children(children)
    }

    /// Parameter list of a function or lambda
    fn parameters(&self, node: Node<'_>) -> Vec<SyntaxNode> {
        let mut cursor = node.walk();
        let params: Vec<Node<'_>> = node.children(&mut cursor).collect();
        params
            .into_iter()
            .filter_map(|param| match param.kind() {
                "identifier" | "typed_parameter" | "default_parameter" | "typed_default_parameter"
                | "list_splat_pattern" | "dictionary_splat_pattern"
                    if param.is_named() =>
                {
                    Some(self.arg(param))
                }
                _ => self.lower(param),
            })
            .collect()
    }

    fn arg(&self, node: Node<'_>) -> SyntaxNode {
        let annotation = node.child_by_field_name("type");
        let value = node.child_by_field_name("value");
        let name = match node.kind() {
            "identifier" => Some(node),
            "default_parameter" | "typed_default_parameter" => node.child_by_field_name("name"),
            _ => node.named_child(0),
        };
        // `*args` / `**kwargs`: tag the bare identifier
        let name = name.map(|n| match n.kind() {
            "list_splat_pattern" | "dictionary_splat_pattern" => n.named_child(0).unwrap_or(n),
            _ => n,
        });
        let name = name.map_or_else(|| self.range(node), |n| self.range(n));

        let children = value.and_then(|v| self.lower(v)).into_iter().collect();
        let kind = NodeKind::Arg {
            name,
            annotation: annotation.map(|a| self.range(a)),
        };
        SyntaxNode::new(kind, self.range(node)).with_children(children)
    }

    fn keyword_argument(&self, node: Node<'_>) -> SyntaxNode {
        let (Some(name), value) = (node.child_by_field_name("name"), node.child_by_field_name("value")) else {
            return self.other(node);
        };
        let children = value.and_then(|v| self.lower(v)).into_iter().collect();
        let kind = NodeKind::Arg {
            name: self.range(name),
            annotation: None,
        };
        SyntaxNode::new(kind, self.range(node)).with_children(children)
    }

    fn call(&self, node: Node<'_>) -> SyntaxNode {
        let function = node.child_by_field_name("function");
        let callee = function.filter(|f| f.kind() == "identifier");
        let claimed: Vec<Node<'_>> = callee.into_iter().collect();
        let children = self.children_except(node, &claimed);
        let kind = NodeKind::Call {
            callee: callee.map(|c| self.ident(c)),
        };
        SyntaxNode::new(kind, self.range(node)).with_children(children)
    }

    fn string_kind(&self, node: Node<'_>) -> StringKind {
        let text = self.text(node);
        let prefix = text.split(|c| c == '"' || c == '\'').next().unwrap_or("");
        if prefix.chars().any(|c| c.eq_ignore_ascii_case(&'f')) {
            StringKind::Formatted
        } else if prefix.chars().any(|c| c.eq_ignore_ascii_case(&'b')) {
            StringKind::Bytes
        } else {
            StringKind::Plain
        }
    }

    fn string(&self, node: Node<'_>) -> SyntaxNode {
        let range = self.range(node);
        match self.string_kind(node) {
            StringKind::Plain => SyntaxNode::new(NodeKind::Constant(Literal::Str), range),
            StringKind::Bytes => SyntaxNode::new(NodeKind::Bytes, range),
            StringKind::Formatted => {
                let mut fields = Vec::new();
                let mut children = Vec::new();
                let mut cursor = node.walk();
                let parts: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
                for part in parts.into_iter().filter(|p| p.kind() == "interpolation") {
                    let mut inner = part.walk();
                    let expr = part.named_children(&mut inner).find(|c| {
                        !matches!(c.kind(), "type_conversion" | "format_specifier" | "comment")
                    });
                    if let Some(expr) = expr {
                        fields.push(self.range(expr));
                        children.extend(self.lower(expr));
                    }
                }
                SyntaxNode::new(NodeKind::JoinedStr { fields }, range).with_children(children)
            }
        }
    }

    fn targets(&self, left: Node<'_>) -> Vec<TextRange> {
        if TARGET_LISTS.contains(&left.kind()) {
            let mut cursor = left.walk();
            let items: Vec<TextRange> = left
                .named_children(&mut cursor)
                .filter(|c| c.kind() != "comment")
                .map(|c| self.range(c))
                .collect();
            items
        } else {
            vec![self.range(left)]
        }
    }

    fn assignment(&self, node: Node<'_>) -> SyntaxNode {
        let Some(left) = node.child_by_field_name("left") else {
            return self.other(node);
        };
        let right = node.child_by_field_name("right");
        if let Some(annotation) = node.child_by_field_name("type") {
            let kind = NodeKind::AnnAssign {
                target: self.range(left),
                annotation: self.range(annotation),
            };
            return SyntaxNode::new(kind, self.range(node)).with_children(self.children_except(node, &[annotation]));
        }
        let kind = NodeKind::Assign {
            targets: self.targets(left),
            value: right.filter(|r| r.kind() == "identifier").map(|r| self.range(r)),
        };
        SyntaxNode::new(kind, self.range(node)).with_children(self.children_except(node, &[]))
    }

    fn augmented_assignment(&self, node: Node<'_>) -> SyntaxNode {
        let Some(left) = node.child_by_field_name("left") else {
            return self.other(node);
        };
        let right = node.child_by_field_name("right");
        let kind = NodeKind::Assign {
            targets: vec![self.range(left)],
            value: right.filter(|r| r.kind() == "identifier").map(|r| self.range(r)),
        };
        SyntaxNode::new(kind, self.range(node)).with_children(self.children_except(node, &[]))
    }

    /// Collect `name` / `name as alias` entries, lowering everything else
    fn import_names<'t>(&self, node: Node<'t>, skip: Option<Node<'t>>) -> (Vec<Alias>, Vec<SyntaxNode>) {
        let mut names = Vec::new();
        let mut children = Vec::new();
        let mut cursor = node.walk();
        let items: Vec<Node<'_>> = node.children(&mut cursor).collect();
        for item in items {
            if Some(item) == skip {
                continue;
            }
            match item.kind() {
                "dotted_name" => names.push(Alias {
                    name: self.range(item),
                    asname: None,
                }),
                "aliased_import" => {
                    let name = item.child_by_field_name("name");
                    let alias = item.child_by_field_name("alias");
                    names.push(Alias {
                        name: name.map_or_else(|| self.range(item), |n| self.range(n)),
                        asname: alias.map(|a| self.range(a)),
                    });
                    let claimed: Vec<Node<'_>> = name.into_iter().chain(alias).collect();
                    children.extend(self.children_except(item, &claimed));
                }
                _ => children.extend(self.lower(item)),
            }
        }
        (names, children)
    }

    fn import(&self, node: Node<'_>) -> SyntaxNode {
        let (names, children) = self.import_names(node, None);
        SyntaxNode::new(NodeKind::Import { names }, self.range(node)).with_children(children)
    }

    fn import_from(&self, node: Node<'_>) -> SyntaxNode {
        let module = node.child_by_field_name("module_name");
        let (names, children) = self.import_names(node, module);
        let kind = NodeKind::ImportFrom {
            module: module.map(|m| self.range(m)),
            names,
        };
        SyntaxNode::new(kind, self.range(node)).with_children(children)
    }

    fn attribute(&self, node: Node<'_>) -> SyntaxNode {
        let Some(attr) = node.child_by_field_name("attribute") else {
            return self.other(node);
        };
        let object = node.child_by_field_name("object");
        let kind = NodeKind::Attribute {
            base: object.filter(|o| o.kind() == "identifier").map(|o| self.range(o)),
            attr: self.range(attr),
        };
        SyntaxNode::new(kind, self.range(node)).with_children(self.children_except(node, &[attr]))
    }

    fn operator(&self, kind: NodeKind, node: Node<'_>) -> SyntaxNode {
        SyntaxNode::new(kind, self.range(node)).with_children(self.children_except(node, &[]))
    }

    fn try_statement(&self, node: Node<'_>) -> SyntaxNode {
        let mut handlers = Vec::new();
        let mut children = Vec::new();
        let mut cursor = node.walk();
        let items: Vec<Node<'_>> = node.children(&mut cursor).collect();
        for item in items {
            if !matches!(item.kind(), "except_clause" | "except_group_clause") {
                children.extend(self.lower(item));
                continue;
            }
            let mut inner = item.walk();
            let exception = item
                .named_children(&mut inner)
                .find(|c| !matches!(c.kind(), "block" | "comment"));
            let claimed: Vec<Node<'_>> = exception.into_iter().collect();
            let mut lowered = Vec::new();
            match exception {
                // `except E as name`: only `E` is the handler type
                Some(pattern) if pattern.kind() == "as_pattern" => {
                    let expr = pattern.named_child(0);
                    if let Some(expr) = expr {
                        handlers.push(self.range(expr));
                    }
                    let target: Vec<Node<'_>> = expr.into_iter().collect();
                    lowered.push(
                        SyntaxNode::new(NodeKind::Other, self.range(pattern))
                            .with_children(self.children_except(pattern, &target)),
                    );
                }
                Some(exception) => handlers.push(self.range(exception)),
                None => {}
            }
            lowered.extend(self.children_except(item, &claimed));
            children.push(SyntaxNode::new(NodeKind::Other, self.range(item)).with_children(lowered));
        }
        SyntaxNode::new(NodeKind::Try { handlers }, self.range(node)).with_children(children)
    }

    /// Generic lowering for nodes whose expected fields are absent
    fn other(&self, node: Node<'_>) -> SyntaxNode {
        SyntaxNode::new(NodeKind::Other, self.range(node)).with_children(self.children_except(node, &[]))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringKind {
    Plain,
    Formatted,
    Bytes,
}
