//! Python language tables
//!
//! Keyword and builtin sets plus the fallback regex rules. Built once
//! at startup and shared by reference with the classification engine.

use std::collections::HashSet;

use super::category::Category;
use super::rules::{MultilineRule, PatternRule};

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class", "continue",
    "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if", "import",
    "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while",
    "with", "yield",
];

/// Context-dependent keywords; only keywords where the grammar says so
const SOFT_KEYWORDS: &[&str] = &["match", "case", "type"];

const CONTROL: &[&str] = &[
    "if", "elif", "else", "for", "while", "break", "continue", "return", "try", "except",
    "finally", "raise", "with", "yield", "await", "pass", "match", "case",
];

const BUILTINS: &[&str] = &[
    "abs", "aiter", "all", "anext", "any", "ascii", "bin", "bool", "breakpoint", "bytearray",
    "bytes", "callable", "chr", "classmethod", "compile", "complex", "delattr", "dict", "dir",
    "divmod", "enumerate", "eval", "exec", "filter", "float", "format", "frozenset", "getattr",
    "globals", "hasattr", "hash", "help", "hex", "id", "input", "int", "isinstance",
    "issubclass", "iter", "len", "list", "locals", "map", "max", "memoryview", "min", "next",
    "object", "oct", "open", "ord", "pow", "print", "property", "range", "repr", "reversed",
    "round", "set", "setattr", "slice", "sorted", "staticmethod", "str", "sum", "super",
    "tuple", "type", "vars", "zip", "__import__", "NotImplemented", "Ellipsis",
];

const TODO_MARKERS: &str = r"\b(?:TODO|FIXME|XXX|HACK)\b";

/// Immutable classification tables for Python
pub struct PythonTables {
    keywords: HashSet<&'static str>,
    soft_keywords: HashSet<&'static str>,
    control: HashSet<&'static str>,
    builtins: HashSet<&'static str>,
    /// Conventional self-reference name
    pub self_name: &'static str,
    /// Keyword regex for the fallback path
    pub keyword_rule: Option<PatternRule>,
    /// Markers highlighted inside comments
    pub todo_rule: Option<PatternRule>,
    /// Triple-quoted string rules, tried in order
    pub triple_quote_rules: Vec<MultilineRule>,
}

impl PythonTables {
    pub fn new() -> Self {
        let keyword_pattern = format!(r"\b(?:{})\b", KEYWORDS.join("|"));
        let mut triple_quote_rules = Vec::new();
        // Triple-quoted strings (docstrings)
        if let Some(rule) = MultilineRule::with_escape(
            "triple_double",
            r#"(?i)[rbuf]{0,2}""""#,
            r#"""""#,
            Category::String,
            '\\',
        ) {
            triple_quote_rules.push(rule);
        }
        if let Some(rule) =
            MultilineRule::with_escape("triple_single", r"(?i)[rbuf]{0,2}'''", r"'''", Category::String, '\\')
        {
            triple_quote_rules.push(rule);
        }

        Self {
            keywords: KEYWORDS.iter().copied().collect(),
            soft_keywords: SOFT_KEYWORDS.iter().copied().collect(),
            control: CONTROL.iter().copied().collect(),
            builtins: BUILTINS.iter().copied().collect(),
            self_name: "self",
            keyword_rule: PatternRule::new("keyword", &keyword_pattern, Category::Keyword),
            todo_rule: PatternRule::new("todo", TODO_MARKERS, Category::Todo),
            triple_quote_rules,
        }
    }

    pub fn is_keyword(&self, name: &str) -> bool {
        self.keywords.contains(name)
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtins.contains(name)
    }

    /// Category of a keyword token found in the tree
    ///
    /// Returns `None` for tokens that are not reserved words.
    pub fn keyword_category(&self, token: &str) -> Option<Category> {
        if self.control.contains(token) {
            Some(Category::Control)
        } else if self.keywords.contains(token) || self.soft_keywords.contains(token) {
            Some(Category::Keyword)
        } else {
            None
        }
    }

    /// Category of a name reference
    ///
    /// Checked in priority order: keyword, builtin, constant, self, variable.
    pub fn classify_name(&self, name: &str) -> Category {
        if self.is_keyword(name) {
            Category::Keyword
        } else if self.is_builtin(name) {
            Category::Builtin
        } else if is_constant_name(name) {
            Category::Constant
        } else if name == self.self_name {
            Category::SelfRef
        } else {
            Category::Variable
        }
    }

    /// Category of a call whose callee is a bare name
    pub fn classify_callee(&self, name: &str) -> Category {
        if self.is_builtin(name) {
            Category::Builtin
        } else {
            Category::Function
        }
    }
}

impl Default for PythonTables {
    fn default() -> Self {
        Self::new()
    }
}

/// `__name__`-style dunder identifier
pub fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

/// Fully upper-case identifier such as `MAX_SIZE`
fn is_constant_name(name: &str) -> bool {
    name.chars().any(|c| c.is_alphabetic()) && !name.chars().any(|c| c.is_lowercase())
}
