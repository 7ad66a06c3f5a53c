//! Document metadata model.
//!
//! Apps attach a [`DocumentMeta`] to the render context while rendering.
//! The injector later asks it for a [`MetaInfo`] and writes each group
//! into its placeholder.

use std::fmt;

/// Where in the document a tag belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetaPosition {
    /// Inside `<head>`.
    #[default]
    Head,
    /// Right after the opening `<body>` tag.
    PreBody,
    /// Right before the closing `</body>` tag.
    Body,
}

/// A group of tags of one kind (styles, scripts, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaGroup {
    entries: Vec<(MetaPosition, String)>,
}

impl MetaGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rendered tag at a position.
    pub fn push(&mut self, position: MetaPosition, html: impl Into<String>) {
        self.entries.push((position, html.into()));
    }

    /// Builder form of [`MetaGroup::push`].
    pub fn with(mut self, position: MetaPosition, html: impl Into<String>) -> Self {
        self.push(position, html);
        self
    }

    /// Tags at `position`, concatenated.
    pub fn text(&self, position: MetaPosition) -> String {
        self.entries
            .iter()
            .filter(|(p, _)| *p == position)
            .map(|(_, html)| html.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<String> for MetaGroup {
    fn from(html: String) -> Self {
        Self::new().with(MetaPosition::Head, html)
    }
}

impl From<&str> for MetaGroup {
    fn from(html: &str) -> Self {
        Self::from(html.to_string())
    }
}

/// Resolved metadata fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaInfo {
    pub title: MetaGroup,
    pub html_attrs: MetaGroup,
    pub head_attrs: MetaGroup,
    pub body_attrs: MetaGroup,
    pub meta: MetaGroup,
    pub link: MetaGroup,
    pub style: MetaGroup,
    pub script: MetaGroup,
    pub noscript: MetaGroup,
}

/// Structured document metadata attached by the app.
pub trait DocumentMeta: Send + Sync {
    /// Resolve the current metadata into fragments.
    fn inject(&self) -> MetaInfo;
}

impl DocumentMeta for MetaInfo {
    fn inject(&self) -> MetaInfo {
        self.clone()
    }
}

impl fmt::Debug for dyn DocumentMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DocumentMeta")
    }
}
