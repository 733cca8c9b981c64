//! Semantic categories for syntax highlighting
//!
//! Every span the engine produces carries one of these categories.
//! Themes map each category to exactly one color.

use std::fmt;

/// Semantic roles a span of source text can play
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Reserved words (def, class, import, lambda, ...)
    Keyword,
    /// Control-flow keywords (if, for, return, ...)
    Control,
    /// Operator expressions and tokens
    Operator,
    /// Brackets, commas, colons, dots
    Punctuation,
    /// Class names at definition and as bases
    Class,
    /// Function names at definition and call sites
    Function,
    /// Dunder method names at definition
    Method,
    Variable,
    Parameter,
    /// Attribute names after a dot
    Property,
    String,
    Number,
    /// True / False
    Boolean,
    /// None
    Null,
    /// ALL_CAPS names
    Constant,
    Comment,
    Docstring,
    /// TODO / FIXME markers inside comments
    Todo,
    Decorator,
    /// Names from the builtin namespace
    Builtin,
    /// The conventional self-reference name
    SelfRef,
    /// Imported module and alias names
    Namespace,
    /// Return type annotations
    Type,
    /// Parameter and variable annotations
    TypeAnnotation,
    Interface,
    /// f"..." literals
    FString,
    /// b"..." literals
    Bytes,
    /// Exception types named in handlers
    Exception,
    MagicMethod,
}

impl Category {
    /// Number of categories
    pub const COUNT: usize = 29;

    /// All categories, in declaration order
    pub const ALL: [Category; Category::COUNT] = [
        Category::Keyword,
        Category::Control,
        Category::Operator,
        Category::Punctuation,
        Category::Class,
        Category::Function,
        Category::Method,
        Category::Variable,
        Category::Parameter,
        Category::Property,
        Category::String,
        Category::Number,
        Category::Boolean,
        Category::Null,
        Category::Constant,
        Category::Comment,
        Category::Docstring,
        Category::Todo,
        Category::Decorator,
        Category::Builtin,
        Category::SelfRef,
        Category::Namespace,
        Category::Type,
        Category::TypeAnnotation,
        Category::Interface,
        Category::FString,
        Category::Bytes,
        Category::Exception,
        Category::MagicMethod,
    ];

    /// Position of this category in [`Category::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Tag name used by themes and the rendering layer
    pub fn name(&self) -> &'static str {
        match self {
            Category::Keyword => "keyword",
            Category::Control => "control",
            Category::Operator => "operator",
            Category::Punctuation => "punctuation",
            Category::Class => "class",
            Category::Function => "function",
            Category::Method => "method",
            Category::Variable => "variable",
            Category::Parameter => "parameter",
            Category::Property => "property",
            Category::String => "string",
            Category::Number => "number",
            Category::Boolean => "boolean",
            Category::Null => "null",
            Category::Constant => "constant",
            Category::Comment => "comment",
            Category::Docstring => "docstring",
            Category::Todo => "todo",
            Category::Decorator => "decorator",
            Category::Builtin => "builtin",
            Category::SelfRef => "self",
            Category::Namespace => "namespace",
            Category::Type => "type",
            Category::TypeAnnotation => "type_annotation",
            Category::Interface => "interface",
            Category::FString => "f_string",
            Category::Bytes => "bytes",
            Category::Exception => "exception",
            Category::MagicMethod => "magic_method",
        }
    }

    /// Parse a category from its tag name (for theme loading)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_declaration_order() {
        for (i, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.index(), i, "{category} out of order");
        }
    }

    #[test]
    fn test_from_name_roundtrip() {
        for category in Category::ALL {
            assert_eq!(Category::from_name(category.name()), Some(category));
        }
    }

    #[test]
    fn test_from_name_invalid() {
        assert_eq!(Category::from_name("Keyword"), None);
        assert_eq!(Category::from_name(""), None);
        assert_eq!(Category::from_name("self_ref"), None);
    }
}
