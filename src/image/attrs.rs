//! `<img>` attribute serialization

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::ImageToken;
use crate::helpers::html_escape;

/// How a token attribute is written into the emitted tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapePolicy {
    /// Not written as a pass-through attribute
    Omit,
    /// Value is HTML-escaped
    Escape,
    /// Value is written as-is
    Verbatim,
}

/// Attribute name to escape policy table.
///
/// `src` and `alt` are always written first by the tag renderer and never
/// repeated in the pass-through list, whatever the table says about them.
/// Anything not in the table falls back to `default_policy`, which keeps
/// values verbatim unless configured otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributePolicies {
    pub attributes: HashMap<String, EscapePolicy>,
    pub default_policy: EscapePolicy,
}

impl Default for AttributePolicies {
    fn default() -> Self {
        let attributes = HashMap::from([
            ("src".to_string(), EscapePolicy::Omit),
            ("alt".to_string(), EscapePolicy::Omit),
            ("title".to_string(), EscapePolicy::Escape),
        ]);
        Self {
            attributes,
            default_policy: EscapePolicy::Verbatim,
        }
    }
}

impl AttributePolicies {
    pub fn policy(&self, name: &str) -> EscapePolicy {
        self.attributes
            .get(name)
            .copied()
            .unwrap_or(self.default_policy)
    }

    /// Serialize pass-through attributes as `key="value"` pairs joined by spaces
    pub fn render_attributes(&self, token: &ImageToken) -> String {
        token
            .attrs()
            .filter(|(key, _)| !matches!(*key, "src" | "alt"))
            .filter_map(|(key, value)| match self.policy(key) {
                EscapePolicy::Omit => None,
                EscapePolicy::Escape => Some(format!(r#"{}="{}""#, key, html_escape(value))),
                EscapePolicy::Verbatim => Some(format!(r#"{}="{}""#, key, value)),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Build the complete `<img>` tag.
    ///
    /// Size attributes are written only when both sides are non-zero.
    pub fn render_tag(&self, token: &ImageToken, size: Option<(f64, f64)>) -> String {
        let dimensions = match size {
            Some((width, height)) if width != 0.0 && height != 0.0 => {
                format!(r#" width="{}" height="{}""#, width, height)
            }
            _ => String::new(),
        };

        let others = self.render_attributes(token);
        let others = if others.is_empty() {
            others
        } else {
            format!(" {}", others)
        };

        format!(
            r#"<img src="{}" alt="{}"{}{}>"#,
            token.src(),
            html_escape(token.alt()),
            dimensions,
            others
        )
    }
}
