//! Classification engine
//!
//! Walks a syntax tree in pre-order and maps each node to zero or more
//! category spans. Every node is classified from its own kind and
//! payload only. Spans come out in traversal order; when two spans
//! cover the same character the later one wins at render time.

use super::category::Category;
use super::python::{is_dunder, PythonTables};
use super::style::Span;
use super::tree::{Alias, Literal, NodeKind, SyntaxNode, SyntaxTree};
use crate::text::{char_col, TextRange};

/// Classify every node of a tree
pub fn classify(tree: &SyntaxTree, tables: &PythonTables) -> Vec<Span> {
    let mut spans = Spans::default();
    for node in tree.walk() {
        classify_node(node, tables, &mut spans);
    }
    spans.0
}

#[derive(Default)]
struct Spans(Vec<Span>);

impl Spans {
    fn push(&mut self, range: TextRange, category: Category) {
        let span = Span::new(range, category);
        if !span.is_empty() {
            self.0.push(span);
        }
    }

    fn push_all(&mut self, ranges: &[TextRange], category: Category) {
        for range in ranges {
            self.push(*range, category);
        }
    }

    fn push_aliases(&mut self, names: &[Alias]) {
        for alias in names {
            self.push(alias.name, Category::Namespace);
            if let Some(asname) = alias.asname {
                self.push(asname, Category::Variable);
            }
        }
    }
}

fn classify_node(node: &SyntaxNode, tables: &PythonTables, out: &mut Spans) {
    match &node.kind {
        NodeKind::Module | NodeKind::Other => {}
        NodeKind::ClassDef {
            keyword,
            name,
            bases,
            decorators,
        } => {
            out.push_all(decorators, Category::Decorator);
            out.push(*keyword, Category::Keyword);
            out.push(name.range, Category::Class);
            out.push_all(bases, Category::Class);
        }
        NodeKind::FunctionDef {
            keyword,
            name,
            decorators,
            returns,
        }
        | NodeKind::AsyncFunctionDef {
            keyword,
            name,
            decorators,
            returns,
        } => {
            out.push_all(decorators, Category::Decorator);
            out.push(*keyword, Category::Keyword);
            let category = if is_dunder(&name.text) {
                Category::Method
            } else {
                Category::Function
            };
            out.push(name.range, category);
            if let Some(returns) = returns {
                out.push(*returns, Category::Type);
            }
        }
        NodeKind::Arg { name, annotation } => {
            out.push(*name, Category::Parameter);
            if let Some(annotation) = annotation {
                out.push(*annotation, Category::TypeAnnotation);
            }
        }
        NodeKind::Name(ident) => out.push(ident.range, tables.classify_name(&ident.text)),
        NodeKind::Call { callee } => {
            if let Some(callee) = callee {
                out.push(callee.range, tables.classify_callee(&callee.text));
            }
        }
        NodeKind::Constant(literal) => {
            let category = match literal {
                Literal::Number => Category::Number,
                Literal::Str => Category::String,
                Literal::Docstring => Category::Docstring,
                Literal::Boolean => Category::Boolean,
                Literal::None => Category::Null,
            };
            out.push(node.range, category);
        }
        NodeKind::AnnAssign { target, annotation } => {
            out.push(*target, Category::Variable);
            out.push(*annotation, Category::TypeAnnotation);
        }
        NodeKind::Import { names } => out.push_aliases(names),
        NodeKind::ImportFrom { module, names } => {
            if let Some(module) = module {
                out.push(*module, Category::Namespace);
            }
            out.push_aliases(names);
        }
        NodeKind::Attribute { base, attr } => {
            if let Some(base) = base {
                out.push(*base, Category::Variable);
            }
            out.push(*attr, Category::Property);
        }
        NodeKind::Assign { targets, value } => {
            out.push_all(targets, Category::Variable);
            if let Some(value) = value {
                out.push(*value, Category::Variable);
            }
        }
        NodeKind::BinaryOp | NodeKind::Compare | NodeKind::BoolOp | NodeKind::UnaryOp => {
            out.push(node.range, Category::Operator);
        }
        NodeKind::Try { handlers } => out.push_all(handlers, Category::Exception),
        NodeKind::JoinedStr { fields } => {
            out.push(node.range, Category::FString);
            out.push_all(fields, Category::Variable);
        }
        NodeKind::Bytes => out.push(node.range, Category::Bytes),
        NodeKind::Keyword(word) => {
            if let Some(category) = tables.keyword_category(word) {
                out.push(node.range, category);
            }
        }
        NodeKind::Punctuation => out.push(node.range, Category::Punctuation),
        NodeKind::Comment(text) => {
            out.push(node.range, Category::Comment);
            if let Some(rule) = &tables.todo_rule {
                let start = node.range.start;
                for (s, e) in rule.find_all(text) {
                    let range = TextRange::on_line(start.line, start.col + char_col(text, s), start.col + char_col(text, e));
                    out.push(range, Category::Todo);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parser::ParserAdapter;
    use crate::syntax::tree::Ident;
    use crate::text::Position;

    fn spans_for(source: &str) -> Vec<Span> {
        let tree = ParserAdapter::new().unwrap().parse(source).unwrap();
        classify(&tree, &PythonTables::new())
    }

    /// Category that renders at a position: the last span covering it
    fn category_at(spans: &[Span], line: usize, col: usize) -> Option<Category> {
        let pos = Position::new(line, col);
        spans.iter().rev().find(|s| s.range.contains(pos)).map(|s| s.category)
    }

    #[test]
    fn test_class_and_method_example() {
        let spans = spans_for("class Foo(Bar):\n    def __init__(self):\n        self.x = 1");
        assert_eq!(category_at(&spans, 0, 0), Some(Category::Keyword));
        assert_eq!(category_at(&spans, 0, 6), Some(Category::Class));
        assert_eq!(category_at(&spans, 0, 10), Some(Category::Class));
        assert_eq!(category_at(&spans, 1, 4), Some(Category::Keyword));
        assert_eq!(category_at(&spans, 1, 8), Some(Category::Method));
        assert_eq!(category_at(&spans, 1, 17), Some(Category::Parameter));
        assert_eq!(category_at(&spans, 2, 8), Some(Category::SelfRef));
        assert_eq!(category_at(&spans, 2, 13), Some(Category::Property));
        assert_eq!(category_at(&spans, 2, 17), Some(Category::Number));
    }

    #[test]
    fn test_calls_and_names() {
        let spans = spans_for("print(len(items), compute(MAX))\n");
        assert_eq!(category_at(&spans, 0, 0), Some(Category::Builtin));
        assert_eq!(category_at(&spans, 0, 6), Some(Category::Builtin));
        assert_eq!(category_at(&spans, 0, 10), Some(Category::Variable));
        assert_eq!(category_at(&spans, 0, 18), Some(Category::Function));
        assert_eq!(category_at(&spans, 0, 26), Some(Category::Constant));
        assert_eq!(category_at(&spans, 0, 5), Some(Category::Punctuation));
    }

    #[test]
    fn test_decorators_annotations_and_returns() {
        let source = "@staticmethod\ndef area(r: float) -> float:\n    return r\n";
        let spans = spans_for(source);
        assert_eq!(category_at(&spans, 0, 0), Some(Category::Decorator));
        assert_eq!(category_at(&spans, 0, 5), Some(Category::Decorator));
        assert_eq!(category_at(&spans, 1, 4), Some(Category::Function));
        assert_eq!(category_at(&spans, 1, 9), Some(Category::Parameter));
        assert_eq!(category_at(&spans, 1, 12), Some(Category::TypeAnnotation));
        assert_eq!(category_at(&spans, 1, 22), Some(Category::Type));
        assert_eq!(category_at(&spans, 2, 4), Some(Category::Control));
    }

    #[test]
    fn test_imports() {
        let spans = spans_for("import numpy as np\nfrom os import path\n");
        assert_eq!(category_at(&spans, 0, 0), Some(Category::Keyword));
        assert_eq!(category_at(&spans, 0, 7), Some(Category::Namespace));
        assert_eq!(category_at(&spans, 0, 13), Some(Category::Keyword));
        assert_eq!(category_at(&spans, 0, 16), Some(Category::Variable));
        assert_eq!(category_at(&spans, 1, 5), Some(Category::Namespace));
        assert_eq!(category_at(&spans, 1, 15), Some(Category::Namespace));
    }

    #[test]
    fn test_literals_and_operators() {
        let source = "ok = a + 1 > 2 and not None\nname = f\"{user}\"\nraw = b'x'\nflag = True\n";
        let spans = spans_for(source);
        assert!(spans.iter().any(|s| s.category == Category::Operator && s.range == TextRange::on_line(0, 5, 27)));
        assert_eq!(category_at(&spans, 0, 9), Some(Category::Number));
        assert_eq!(category_at(&spans, 0, 15), Some(Category::Keyword));
        assert_eq!(category_at(&spans, 0, 23), Some(Category::Null));
        assert_eq!(category_at(&spans, 1, 7), Some(Category::FString));
        assert_eq!(category_at(&spans, 1, 10), Some(Category::Variable));
        assert_eq!(category_at(&spans, 2, 6), Some(Category::Bytes));
        assert_eq!(category_at(&spans, 3, 7), Some(Category::Boolean));
    }

    #[test]
    fn test_try_handlers_and_comments() {
        let source = "try:\n    run()\nexcept KeyError as err:  # TODO narrow\n    pass\n";
        let spans = spans_for(source);
        assert_eq!(category_at(&spans, 0, 0), Some(Category::Control));
        assert_eq!(category_at(&spans, 2, 7), Some(Category::Exception));
        assert_eq!(category_at(&spans, 2, 14), Some(Category::Exception));
        assert_eq!(category_at(&spans, 2, 16), Some(Category::Keyword));
        assert_eq!(category_at(&spans, 2, 19), Some(Category::Variable));
        assert_eq!(category_at(&spans, 2, 25), Some(Category::Comment));
        assert_eq!(category_at(&spans, 2, 27), Some(Category::Todo));
        assert_eq!(category_at(&spans, 2, 32), Some(Category::Comment));
    }

    #[test]
    fn test_decorator_trailing_comment() {
        let spans = spans_for("@dec  # why\ndef f():\n    pass\n");
        assert_eq!(category_at(&spans, 0, 0), Some(Category::Decorator));
        assert_eq!(category_at(&spans, 0, 3), Some(Category::Decorator));
        assert_eq!(category_at(&spans, 0, 6), Some(Category::Comment));
        assert_eq!(category_at(&spans, 0, 10), Some(Category::Comment));

        let spans = spans_for("@route('/x')  # TODO auth\ndef f():\n    pass\n");
        assert_eq!(category_at(&spans, 0, 7), Some(Category::String));
        assert_eq!(category_at(&spans, 0, 14), Some(Category::Comment));
        assert_eq!(category_at(&spans, 0, 16), Some(Category::Todo));
    }

    #[test]
    fn test_docstring_and_annotated_assignment() {
        let spans = spans_for("def f():\n    \"\"\"Doc.\"\"\"\n    total: int = 0\n");
        assert_eq!(category_at(&spans, 1, 4), Some(Category::Docstring));
        assert_eq!(category_at(&spans, 2, 4), Some(Category::Variable));
        assert_eq!(category_at(&spans, 2, 11), Some(Category::TypeAnnotation));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let source = "class A:\n    def b(self, *args, **kw):\n        return self.c(*args)\n";
        assert_eq!(spans_for(source), spans_for(source));
    }

    #[test]
    fn test_empty_ranges_are_dropped() {
        let tree = SyntaxTree {
            root: SyntaxNode::new(
                NodeKind::Name(Ident {
                    range: TextRange::on_line(0, 3, 3),
                    text: String::new(),
                }),
                TextRange::on_line(0, 3, 3),
            ),
        };
        assert!(classify(&tree, &PythonTables::new()).is_empty());
    }
}
