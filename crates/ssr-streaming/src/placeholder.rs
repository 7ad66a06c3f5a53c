//! Fixed template markers.

/// A marker embedded in the HTML template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `<html>` attribute slot.
    HtmlAttrs,
    /// `<head>` attribute slot.
    HeadAttrs,
    /// Head content sink; receives the env script and the metadata.
    HeadOutlet,
    /// `<body>` attribute slot.
    BodyAttrs,
    /// Start of `<body>`.
    PreBodyOutlet,
    /// End of `<body>`.
    BodyOutlet,
    /// Render-generated scripts and state, development only.
    RendererHeadOutlet,
}

impl Placeholder {
    /// Markers substituted from document metadata, in substitution order.
    pub const META_ORDER: [Placeholder; 6] = [
        Placeholder::HtmlAttrs,
        Placeholder::HeadAttrs,
        Placeholder::HeadOutlet,
        Placeholder::BodyAttrs,
        Placeholder::PreBodyOutlet,
        Placeholder::BodyOutlet,
    ];

    /// The literal marker text.
    pub fn token(&self) -> &'static str {
        match self {
            Self::HtmlAttrs => "data-vue-template-html",
            Self::HeadAttrs => "data-vue-template-head",
            Self::HeadOutlet => "<!--vue-head-outlet-->",
            Self::BodyAttrs => "data-vue-template-body",
            Self::PreBodyOutlet => "<!--vue-pbody-outlet-->",
            Self::BodyOutlet => "<!--vue-body-outlet-->",
            Self::RendererHeadOutlet => "<!--vue-renderer-head-outlet-->",
        }
    }

    /// Whether `text` contains this marker.
    pub fn is_in(&self, text: &str) -> bool {
        text.contains(self.token())
    }
}

/// Content placeholder the engine renders the app into.
pub const APP_OUTLET: &str = "<!--vue-ssr-outlet-->";
