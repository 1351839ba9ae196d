use std::fmt;

use serde::Deserialize;

/// How a selector string is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Css,
    Xpath,
    Id,
}

/// Identifies one element (or a set of elements) on a page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocatorDescriptor {
    pub strategy: Strategy,
    pub selector: String,
}

impl LocatorDescriptor {
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::Css,
            selector: selector.into(),
        }
    }

    pub fn xpath(selector: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::Xpath,
            selector: selector.into(),
        }
    }

    pub fn id(selector: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::Id,
            selector: selector.into(),
        }
    }
}

impl fmt::Display for LocatorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategy = match self.strategy {
            Strategy::Css => "css",
            Strategy::Xpath => "xpath",
            Strategy::Id => "id",
        };
        write!(f, "{strategy}={}", self.selector)
    }
}
