//! Color themes
//!
//! A theme maps every [`Category`] to exactly one color and carries the
//! base widget colors. Two presets are built in; user themes are TOML
//! files:
//!
//! ```toml
//! name = "Solarized"
//! extends = "Dark"
//!
//! [base]
//! background = "#002b36"
//!
//! [colors]
//! keyword = "#859900"
//! string = "#2aa198"
//! ```
//!
//! Without `extends` the `[base]` table and every category are required.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{HighlightError, Result};
use crate::syntax::{Category, Color};

/// Colors of the widget itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseColors {
    pub background: Color,
    pub foreground: Color,
    pub caret: Color,
    pub selection_background: Color,
    pub selection_foreground: Color,
}

/// A complete theme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeConfig {
    pub name: String,
    pub base: BaseColors,
    colors: [Color; Category::COUNT],
}

impl ThemeConfig {
    /// Build a theme from a color function covering every category
    pub fn from_fn(name: impl Into<String>, base: BaseColors, color: impl Fn(Category) -> Color) -> Self {
        Self {
            name: name.into(),
            base,
            colors: Category::ALL.map(color),
        }
    }

    pub fn color(&self, category: Category) -> Color {
        self.colors[category.index()]
    }

    /// Every category with its color, in category order
    pub fn entries(&self) -> impl Iterator<Item = (Category, Color)> + '_ {
        Category::ALL.iter().map(move |&c| (c, self.color(c)))
    }

    pub fn light() -> Self {
        let base = BaseColors {
            background: Color::hex(0xffffff),
            foreground: Color::hex(0x1f1f1f),
            caret: Color::hex(0x000000),
            selection_background: Color::hex(0xadd6ff),
            selection_foreground: Color::hex(0x000000),
        };
        Self::from_fn("Light", base, |category| match category {
            Category::Keyword => Color::hex(0x0000ff),
            Category::Control => Color::hex(0xaf00db),
            Category::Operator => Color::hex(0x383838),
            Category::Punctuation => Color::hex(0x5f5f5f),
            Category::Class => Color::hex(0x267f99),
            Category::Function => Color::hex(0x795e26),
            Category::Method => Color::hex(0x795e26),
            Category::Variable => Color::hex(0x001080),
            Category::Parameter => Color::hex(0x0070c1),
            Category::Property => Color::hex(0x001080),
            Category::String => Color::hex(0xa31515),
            Category::Number => Color::hex(0x098658),
            Category::Boolean => Color::hex(0x0000ff),
            Category::Null => Color::hex(0x0000ff),
            Category::Constant => Color::hex(0x0070c1),
            Category::Comment => Color::hex(0x008000),
            Category::Docstring => Color::hex(0x6a8759),
            Category::Todo => Color::hex(0xd16969),
            Category::Decorator => Color::hex(0xaf00db),
            Category::Builtin => Color::hex(0x267f99),
            Category::SelfRef => Color::hex(0x9b2393),
            Category::Namespace => Color::hex(0x267f99),
            Category::Type => Color::hex(0x267f99),
            Category::TypeAnnotation => Color::hex(0x2b91af),
            Category::Interface => Color::hex(0x267f99),
            Category::FString => Color::hex(0xa31515),
            Category::Bytes => Color::hex(0x811f3f),
            Category::Exception => Color::hex(0xcd3131),
            Category::MagicMethod => Color::hex(0x795e26),
        })
    }

    pub fn dark() -> Self {
        let base = BaseColors {
            background: Color::hex(0x1e1e1e),
            foreground: Color::hex(0xd4d4d4),
            caret: Color::hex(0xaeafad),
            selection_background: Color::hex(0x264f78),
            selection_foreground: Color::hex(0xffffff),
        };
        Self::from_fn("Dark", base, |category| match category {
            Category::Keyword => Color::hex(0x569cd6),
            Category::Control => Color::hex(0xc586c0),
            Category::Operator => Color::hex(0xd4d4d4),
            Category::Punctuation => Color::hex(0x808080),
            Category::Class => Color::hex(0x4ec9b0),
            Category::Function => Color::hex(0xdcdcaa),
            Category::Method => Color::hex(0xdcdcaa),
            Category::Variable => Color::hex(0x9cdcfe),
            Category::Parameter => Color::hex(0x9cdcfe),
            Category::Property => Color::hex(0x9cdcfe),
            Category::String => Color::hex(0xce9178),
            Category::Number => Color::hex(0xb5cea8),
            Category::Boolean => Color::hex(0x569cd6),
            Category::Null => Color::hex(0x569cd6),
            Category::Constant => Color::hex(0x4fc1ff),
            Category::Comment => Color::hex(0x6a9955),
            Category::Docstring => Color::hex(0x6a9955),
            Category::Todo => Color::hex(0xff8c00),
            Category::Decorator => Color::hex(0xc586c0),
            Category::Builtin => Color::hex(0x4ec9b0),
            Category::SelfRef => Color::hex(0x569cd6),
            Category::Namespace => Color::hex(0x4ec9b0),
            Category::Type => Color::hex(0x4ec9b0),
            Category::TypeAnnotation => Color::hex(0x4ec9b0),
            Category::Interface => Color::hex(0xb8d7a3),
            Category::FString => Color::hex(0xd69d85),
            Category::Bytes => Color::hex(0xd7ba7d),
            Category::Exception => Color::hex(0xf44747),
            Category::MagicMethod => Color::hex(0xdcdcaa),
        })
    }

    /// Parse a TOML theme; `extends` resolves against `registry`
    pub fn from_toml(contents: &str, registry: &ThemeRegistry) -> Result<Self> {
        let file: ThemeFile = toml::from_str(contents)?;

        let parent = match &file.extends {
            Some(name) => Some(
                registry
                    .get(name)
                    .ok_or_else(|| HighlightError::Theme(format!("unknown parent theme '{name}'")))?,
            ),
            None => None,
        };

        let mut colors: [Option<Color>; Category::COUNT] =
            Category::ALL.map(|c| parent.map(|p| p.color(c)));
        for (key, value) in &file.colors {
            let category = Category::from_name(key)
                .ok_or_else(|| HighlightError::Theme(format!("unknown category '{key}'")))?;
            colors[category.index()] = Some(value.parse()?);
        }

        let base = file.base.resolve(parent.map(|p| &p.base))?;

        let mut resolved = [Color::default(); Category::COUNT];
        for category in Category::ALL {
            resolved[category.index()] = colors[category.index()].ok_or_else(|| {
                HighlightError::Theme(format!("theme '{}' has no color for '{}'", file.name, category))
            })?;
        }

        Ok(Self {
            name: file.name,
            base,
            colors: resolved,
        })
    }

    /// Load a TOML theme file
    pub fn load(path: &Path, registry: &ThemeRegistry) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents, registry)
    }
}

#[derive(Debug, Deserialize)]
struct ThemeFile {
    name: String,
    extends: Option<String>,
    #[serde(default)]
    base: BaseFile,
    #[serde(default)]
    colors: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct BaseFile {
    background: Option<String>,
    foreground: Option<String>,
    caret: Option<String>,
    selection_background: Option<String>,
    selection_foreground: Option<String>,
}

impl BaseFile {
    fn resolve(&self, parent: Option<&BaseColors>) -> Result<BaseColors> {
        let pick = |value: &Option<String>, inherited: Option<Color>, key: &str| -> Result<Color> {
            match (value, inherited) {
                (Some(v), _) => v.parse(),
                (None, Some(c)) => Ok(c),
                (None, None) => Err(HighlightError::Theme(format!("missing base color '{key}'"))),
            }
        };
        Ok(BaseColors {
            background: pick(&self.background, parent.map(|p| p.background), "background")?,
            foreground: pick(&self.foreground, parent.map(|p| p.foreground), "foreground")?,
            caret: pick(&self.caret, parent.map(|p| p.caret), "caret")?,
            selection_background: pick(
                &self.selection_background,
                parent.map(|p| p.selection_background),
                "selection_background",
            )?,
            selection_foreground: pick(
                &self.selection_foreground,
                parent.map(|p| p.selection_foreground),
                "selection_foreground",
            )?,
        })
    }
}

/// Themes selectable by name
#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    themes: Vec<ThemeConfig>,
}

impl ThemeRegistry {
    /// Registry with the Light and Dark presets
    pub fn new() -> Self {
        Self {
            themes: vec![ThemeConfig::light(), ThemeConfig::dark()],
        }
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&ThemeConfig> {
        self.themes.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Add a theme, replacing any with the same name
    pub fn insert(&mut self, theme: ThemeConfig) {
        self.themes.retain(|t| !t.name.eq_ignore_ascii_case(&theme.name));
        self.themes.push(theme);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.themes.iter().map(|t| t.name.as_str())
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
