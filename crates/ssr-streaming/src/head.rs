//! Builder for document metadata.

use ssr_core::{DocumentMeta, MetaGroup, MetaInfo, MetaPosition};

/// Document metadata assembled in code.
///
/// Apps without a metadata library of their own can build one of these
/// inside a context hook and attach it with `RenderContext::set_meta`.
#[derive(Debug, Clone, Default)]
pub struct HeadMeta {
    /// Page title.
    pub title: Option<String>,
    /// Meta tags as (name, content).
    pub meta: Vec<(String, String)>,
    /// Attributes for `<html>`.
    pub html_attrs: Vec<(String, String)>,
    /// Attributes for `<body>`.
    pub body_attrs: Vec<(String, String)>,
    /// Link tags (stylesheets, icons, ...).
    pub links: Vec<String>,
    styles: MetaGroup,
    scripts: MetaGroup,
    noscripts: MetaGroup,
}

impl HeadMeta {
    /// Create new head metadata with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Add a meta tag.
    pub fn with_meta(mut self, name: &str, content: &str) -> Self {
        self.meta.push((name.to_string(), content.to_string()));
        self
    }

    /// Add an attribute to `<html>`.
    pub fn with_html_attr(mut self, name: &str, value: &str) -> Self {
        self.html_attrs.push((name.to_string(), value.to_string()));
        self
    }

    /// Add an attribute to `<body>`.
    pub fn with_body_attr(mut self, name: &str, value: &str) -> Self {
        self.body_attrs.push((name.to_string(), value.to_string()));
        self
    }

    /// Add a stylesheet link.
    pub fn with_stylesheet(mut self, href: &str) -> Self {
        self.links
            .push(format!(r#"<link rel="stylesheet" href="{}">"#, escape_attr(href)));
        self
    }

    /// Add inline CSS at a position.
    pub fn with_style(mut self, css: &str, position: MetaPosition) -> Self {
        self.styles.push(position, format!("<style>{}</style>", css));
        self
    }

    /// Add an external script at a position.
    pub fn with_script_src(mut self, src: &str, position: MetaPosition) -> Self {
        self.scripts.push(
            position,
            format!(r#"<script src="{}"></script>"#, escape_attr(src)),
        );
        self
    }

    /// Add a noscript block at a position.
    pub fn with_noscript(mut self, html: &str, position: MetaPosition) -> Self {
        self.noscripts
            .push(position, format!("<noscript>{}</noscript>", html));
        self
    }
}

impl DocumentMeta for HeadMeta {
    fn inject(&self) -> MetaInfo {
        let title = self
            .title
            .as_ref()
            .map(|t| format!("<title>{}</title>", escape_text(t)))
            .unwrap_or_default();

        let meta = self
            .meta
            .iter()
            .map(|(name, content)| {
                format!(
                    r#"<meta name="{}" content="{}">"#,
                    escape_attr(name),
                    escape_attr(content)
                )
            })
            .collect::<String>();

        MetaInfo {
            title: title.into(),
            html_attrs: render_attrs(&self.html_attrs).into(),
            head_attrs: MetaGroup::new(),
            body_attrs: render_attrs(&self.body_attrs).into(),
            meta: meta.into(),
            link: self.links.concat().into(),
            style: self.styles.clone(),
            script: self.scripts.clone(),
            noscript: self.noscripts.clone(),
        }
    }
}

fn render_attrs(attrs: &[(String, String)]) -> String {
    attrs
        .iter()
        .map(|(k, v)| format!(r#"{}="{}""#, k, escape_attr(v)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_and_meta() {
        let info = HeadMeta::new("Shop & Co")
            .with_meta("description", "All \"things\"")
            .inject();

        assert_eq!(info.title.text(MetaPosition::Head), "<title>Shop &amp; Co</title>");
        assert_eq!(
            info.meta.text(MetaPosition::Head),
            r#"<meta name="description" content="All &quot;things&quot;">"#
        );
    }

    #[test]
    fn test_attributes() {
        let info = HeadMeta::default()
            .with_html_attr("lang", "de")
            .with_body_attr("class", "home")
            .with_body_attr("id", "top")
            .inject();

        assert_eq!(info.html_attrs.text(MetaPosition::Head), r#"lang="de""#);
        assert_eq!(
            info.body_attrs.text(MetaPosition::Head),
            r#"class="home" id="top""#
        );
    }

    #[test]
    fn test_positioned_groups() {
        let info = HeadMeta::default()
            .with_stylesheet("/app.css")
            .with_style("body{}", MetaPosition::Head)
            .with_script_src("/late.js", MetaPosition::Body)
            .with_noscript("enable js", MetaPosition::PreBody)
            .inject();

        assert_eq!(
            info.link.text(MetaPosition::Head),
            r#"<link rel="stylesheet" href="/app.css">"#
        );
        assert_eq!(info.style.text(MetaPosition::Head), "<style>body{}</style>");
        assert_eq!(info.script.text(MetaPosition::Head), "");
        assert_eq!(
            info.script.text(MetaPosition::Body),
            r#"<script src="/late.js"></script>"#
        );
        assert_eq!(
            info.noscript.text(MetaPosition::PreBody),
            "<noscript>enable js</noscript>"
        );
    }
}
