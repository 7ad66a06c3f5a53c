//! Placeholder substitution for rendered chunks.
//!
//! Substitution works on whole chunks of text. Markers split across two
//! chunks are not matched; templates keep each marker on its own line,
//! which the engines never split.

use ssr_core::{EnvMap, MetaPosition, RenderContext, RenderMode};

use crate::placeholder::Placeholder;

const NL: &str = "\r\n";

/// Inline script exposing the public variables as `window.VUE_ENV`.
///
/// `</` is escaped so a value cannot close the script element.
pub fn env_script(env: &EnvMap) -> String {
    let json = serde_json::Value::Object(env.clone())
        .to_string()
        .replace("</", "<\\/");
    format!("<script type='text/javascript'>window.VUE_ENV = {};</script>", json)
}

/// Substitute the environment script and document metadata.
///
/// The head outlet is first re-emitted with the env script appended, so a
/// metadata pass can still use it as its final sink. Without metadata the
/// marker stays in the output.
pub fn apply_meta_data(ctx: &RenderContext, chunk: &str) -> String {
    let head = Placeholder::HeadOutlet.token();
    let mut chunk = chunk.replace(head, &format!("{}{}{}", head, NL, env_script(&ctx.env)));

    let Some(meta) = ctx.meta() else {
        return chunk;
    };
    let info = meta.inject();
    let head_text = |g: &ssr_core::MetaGroup| g.text(MetaPosition::Head);

    for placeholder in Placeholder::META_ORDER {
        let replacement = match placeholder {
            Placeholder::HtmlAttrs => {
                format!("data-vue-meta-server-rendered {}", head_text(&info.html_attrs))
            }
            Placeholder::HeadAttrs => head_text(&info.head_attrs),
            Placeholder::HeadOutlet => [
                head_text(&info.meta),
                head_text(&info.title),
                head_text(&info.link),
                head_text(&info.style),
                head_text(&info.script),
                head_text(&info.noscript),
            ]
            .join(NL),
            Placeholder::BodyAttrs => head_text(&info.body_attrs),
            Placeholder::PreBodyOutlet => positioned(&info, MetaPosition::PreBody),
            Placeholder::BodyOutlet => positioned(&info, MetaPosition::Body),
            Placeholder::RendererHeadOutlet => continue,
        };
        chunk = chunk.replace(placeholder.token(), &replacement);
    }

    chunk
}

fn positioned(info: &ssr_core::MetaInfo, position: MetaPosition) -> String {
    format!(
        "{}{}{}{}",
        info.style.text(position),
        NL,
        info.script.text(position),
        info.noscript.text(position)
    )
}

/// Substitute the renderer head outlet.
///
/// Development gets the engine's scripts and state inline; production
/// leaves injection to the engine and empties the marker.
pub fn apply_renderer_meta_data(ctx: &RenderContext, chunk: &str, mode: RenderMode) -> String {
    let token = Placeholder::RendererHeadOutlet.token();
    if !chunk.contains(token) {
        return chunk.to_string();
    }

    let mut replacement = String::new();
    if mode.is_dev() {
        if let Some(scripts) = ctx.render_scripts() {
            replacement.push_str(&scripts);
            replacement.push(' ');
        }
        if let Some(state) = ctx.render_state() {
            replacement.push_str(&state);
            replacement.push(' ');
        }
    }

    chunk.replace(token, &replacement)
}

/// Both substitutions, in handler order.
pub fn inject_chunk(ctx: &RenderContext, chunk: &str, mode: RenderMode) -> String {
    apply_renderer_meta_data(ctx, &apply_meta_data(ctx, chunk), mode)
}
