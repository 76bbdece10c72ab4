//! Serializable element trees and page descriptions.
//!
//! [`ElementSpec`] is the owned, detached form of an element subtree. Pages
//! are written as YAML or JSON [`PageSpec`]s, and templates render to element
//! specs before they are inserted into a [`Document`](crate::Document).
//!
//! ```yaml
//! title: Admission
//! body:
//!   tag: body
//!   children:
//!     - tag: form
//!       classes: [needs-validation]
//!       children:
//!         - tag: input
//!           attrs: { name: first_name, required: "" }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DomError, Result};

/// An owned element subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ElementSpec {
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }

    /// Number of elements in this subtree, including itself.
    pub fn element_count(&self) -> usize {
        1 + self.children.iter().map(Self::element_count).sum::<usize>()
    }
}

/// A page: a title plus the body element tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
    #[serde(default)]
    pub title: String,
    pub body: ElementSpec,
}

impl PageSpec {
    /// Parse a YAML page description.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let page: PageSpec =
            serde_yaml::from_str(content).map_err(|e| DomError::PageParse(e.to_string()))?;
        page.check()?;
        Ok(page)
    }

    /// Parse a JSON page description.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let page: PageSpec =
            serde_json::from_str(content).map_err(|e| DomError::PageParse(e.to_string()))?;
        page.check()?;
        Ok(page)
    }

    fn check(&self) -> Result<()> {
        fn walk(spec: &ElementSpec, path: &str) -> Result<()> {
            if spec.tag.trim().is_empty() {
                return Err(DomError::PageParse(format!("element at {path} has no tag")));
            }
            for (i, child) in spec.children.iter().enumerate() {
                walk(child, &format!("{path}/{}[{i}]", spec.tag))?;
            }
            Ok(())
        }
        walk(&self.body, "")
    }
}
