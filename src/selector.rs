use serde::{Deserialize, Serialize};
use std::fmt;

/// A way of locating elements on a page
///
/// Strings starting with `//`, `(//` or `xpath=` are XPath expressions,
/// everything else is a CSS selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selector {
    Css(String),
    XPath(String),
}

impl Selector {
    pub fn css(selector: impl Into<String>) -> Self {
        Selector::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Selector::XPath(expression.into())
    }

    /// Parse a selector string, detecting XPath expressions
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(expr) = raw.strip_prefix("xpath=") {
            Selector::XPath(expr.to_string())
        } else if raw.starts_with("//") || raw.starts_with("(//") {
            Selector::XPath(raw.to_string())
        } else {
            Selector::Css(raw.to_string())
        }
    }

    /// The raw selector text without the kind prefix
    pub fn as_str(&self) -> &str {
        match self {
            Selector::Css(s) | Selector::XPath(s) => s,
        }
    }

    /// Convert to a fantoccini locator borrowing this selector
    pub fn locator(&self) -> fantoccini::Locator<'_> {
        match self {
            Selector::Css(s) => fantoccini::Locator::Css(s),
            Selector::XPath(s) => fantoccini::Locator::XPath(s),
        }
    }
}

impl From<String> for Selector {
    fn from(raw: String) -> Self {
        Selector::parse(&raw)
    }
}

impl From<&str> for Selector {
    fn from(raw: &str) -> Self {
        Selector::parse(raw)
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        match selector {
            Selector::Css(s) => s,
            Selector::XPath(s) if s.starts_with("//") || s.starts_with("(//") => s,
            Selector::XPath(s) => format!("xpath={}", s),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(s) => write!(f, "css={}", s),
            Selector::XPath(s) => write!(f, "xpath={}", s),
        }
    }
}

/// A named selector in an ordered fallback list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorStrategy {
    /// Label used in logs when this strategy wins
    pub name: String,

    /// Selector evaluated by this strategy
    pub selector: Selector,
}

impl SelectorStrategy {
    pub fn new(name: impl Into<String>, selector: impl Into<Selector>) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
        }
    }
}
