// HTML rendering
// Pure functions from controller state to markup. Nothing here keeps state;
// re-render whenever the controller publishes a change.

use crate::link_controller::LinkController;
use crate::link_editor::LinkEditorForm;
use crate::link_state::LinkState;
use crate::richtext::content_state::{BlockType, ContentBlock, ContentState, TextStyle};
use crate::richtext::decorator::CompositeDecorator;
use crate::richtext::entity::{Entity, EntityStore};

/// Escape text for use in element content and quoted attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The whole page: intro paragraph followed by the editor (or the link form)
pub fn render_page(controller: &LinkController) -> String {
    format!(
        "<div>\n<p>{}</p>\n{}\n</div>",
        escape(&controller.config().intro),
        render(controller)
    )
}

/// The link form while it is open, the editor otherwise
pub fn render(controller: &LinkController) -> String {
    match controller.link_editor() {
        Some(form) => render_link_editor(form),
        None => render_editor(controller),
    }
}

/// Title, Link button and editor surface
pub fn render_editor(controller: &LinkController) -> String {
    let config = controller.config();
    let editor_state = controller.editor_state();
    let content = editor_state.current_content();

    let mut lines = vec![
        "<div>".to_string(),
        format!("<h2>{}</h2>", escape(&config.title)),
        render_link_button(controller.link_state()),
        "<div class=\"editor\">".to_string(),
    ];
    if !content.has_text() {
        lines.push(format!(
            "<div class=\"placeholder\">{}</div>",
            escape(&config.placeholder)
        ));
    }
    lines.push(render_blocks(
        content,
        editor_state.decorator(),
        controller.entities(),
    ));
    lines.push("</div>".to_string());
    lines.push("</div>".to_string());
    lines.join("\n")
}

/// The Link button reflects whether the selection is inside a link
pub fn render_link_button(link_state: &LinkState) -> String {
    let class = match link_state {
        LinkState::ExistingLink(_) => "active",
        _ => "newlink",
    };
    let disabled = if link_state.is_disabled() {
        " disabled"
    } else {
        ""
    };
    format!("<button class=\"{}\"{}>Link</button>", class, disabled)
}

/// The inline link editing form
pub fn render_link_editor(form: &LinkEditorForm) -> String {
    let mut lines = vec![
        "<div>".to_string(),
        "<h4>Link editing</h4>".to_string(),
        format!(
            "<div>Text: <input name=\"text\" value=\"{}\"/></div>",
            escape(form.text())
        ),
        format!(
            "<div>Url: <input name=\"url\" value=\"{}\"/></div>",
            escape(form.url())
        ),
        format!(
            "<button name=\"submit\"{}>{}</button>",
            if form.can_submit() { "" } else { " disabled" },
            form.submit_label()
        ),
    ];
    if form.can_remove() {
        lines.push("<button name=\"remove\">Remove link</button>".to_string());
    }
    lines.push("<button name=\"cancel\">Cancel</button>".to_string());
    lines.push("</div>".to_string());
    lines.join("\n")
}

fn block_tag(block_type: BlockType) -> &'static str {
    match block_type {
        BlockType::Unstyled => "div",
        BlockType::HeaderOne => "h1",
        BlockType::HeaderTwo => "h2",
        BlockType::HeaderThree => "h3",
        BlockType::Blockquote => "blockquote",
        BlockType::UnorderedListItem | BlockType::OrderedListItem => "li",
        BlockType::CodeBlock => "pre",
    }
}

fn list_tag(block_type: BlockType) -> Option<&'static str> {
    match block_type {
        BlockType::UnorderedListItem => Some("ul"),
        BlockType::OrderedListItem => Some("ol"),
        _ => None,
    }
}

/// All blocks of the document, consecutive list items grouped into lists
pub fn render_blocks(
    content: &ContentState,
    decorator: Option<&CompositeDecorator>,
    entities: &EntityStore,
) -> String {
    let mut lines = Vec::new();
    let mut open_list: Option<&'static str> = None;

    for block in content.blocks() {
        let list = list_tag(block.block_type());
        if list != open_list {
            if let Some(tag) = open_list {
                lines.push(format!("</{}>", tag));
            }
            if let Some(tag) = list {
                lines.push(format!("<{}>", tag));
            }
            open_list = list;
        }

        let tag = block_tag(block.block_type());
        let body = if block.is_empty() {
            "<br>".to_string()
        } else {
            render_block(block, decorator, entities)
        };
        lines.push(format!(
            "<{} data-block=\"{}\">{}</{}>",
            tag,
            escape(block.key().as_str()),
            body,
            tag
        ));
    }
    if let Some(tag) = open_list {
        lines.push(format!("</{}>", tag));
    }
    lines.join("\n")
}

/// Inline markup of one block: decorated ranges wrap their styled text
pub fn render_block(
    block: &ContentBlock,
    decorator: Option<&CompositeDecorator>,
    entities: &EntityStore,
) -> String {
    let chars: Vec<char> = block.text().chars().collect();
    let decorations = match decorator {
        Some(d) => d.decorations(block, entities),
        None => vec![None; chars.len()],
    };

    let mut html = String::new();
    let mut start = 0;
    while start < chars.len() {
        let decoration = decorations[start];
        let mut end = start + 1;
        while end < chars.len() && decorations[end] == decoration {
            end += 1;
        }

        let inner = render_styled(block, &chars, start, end);
        let name = decoration.and_then(|d| decorator?.decorator_name(d.decorator));
        match name {
            Some("link") => {
                let url = block
                    .entity_at(start)
                    .and_then(|key| entities.get(key))
                    .and_then(Entity::url)
                    .unwrap_or_default();
                html.push_str(&format!("<a href=\"{}\">{}</a>", escape(url), inner));
            }
            Some(name) => {
                html.push_str(&format!("<span class=\"{}\">{}</span>", name, inner));
            }
            None => html.push_str(&inner),
        }
        start = end;
    }
    html
}

/// Text of [start..end), split into runs of uniform style
fn render_styled(block: &ContentBlock, chars: &[char], start: usize, end: usize) -> String {
    let mut html = String::new();
    let mut run_start = start;
    while run_start < end {
        let style = block.style_at(run_start);
        let mut run_end = run_start + 1;
        while run_end < end && block.style_at(run_end) == style {
            run_end += 1;
        }
        let text: String = chars[run_start..run_end].iter().collect();
        html.push_str(&wrap_style(style, escape(&text)));
        run_start = run_end;
    }
    html
}

fn wrap_style(style: TextStyle, mut html: String) -> String {
    // Innermost first
    let tags = [
        (style.strikethrough, "s"),
        (style.code, "code"),
        (style.underline, "u"),
        (style.italic, "em"),
        (style.bold, "strong"),
    ];
    for (set, tag) in tags {
        if set {
            html = format!("<{}>{}</{}>", tag, html, tag);
        }
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::content_state::BlockKey;
    use crate::richtext::modifier;
    use crate::richtext::selection::SelectionState;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_block_with_link() {
        let mut store = EntityStore::new();
        let key = store.add(Entity::link("http://x?a=1&b=2"));
        let content = ContentState::create_from_text("go <here> now");
        let content = modifier::apply_entity(
            &content,
            &SelectionState::range(BlockKey::from("b0"), 3, 9),
            Some(key),
        )
        .unwrap();

        let html = render_block(
            content.first_block(),
            Some(&CompositeDecorator::links()),
            &store,
        );
        assert_eq!(
            html,
            "go <a href=\"http://x?a=1&amp;b=2\">&lt;here&gt;</a> now"
        );

        // Without a decorator links are plain text
        let plain = render_block(content.first_block(), None, &store);
        assert_eq!(plain, "go &lt;here&gt; now");
    }

    #[test]
    fn test_wrap_style_nesting() {
        let style = TextStyle {
            bold: true,
            italic: true,
            ..Default::default()
        };
        assert_eq!(
            wrap_style(style, "x".to_string()),
            "<strong><em>x</em></strong>"
        );
        assert_eq!(wrap_style(TextStyle::plain(), "x".to_string()), "x");
    }

    #[test]
    fn test_link_button_states() {
        assert_eq!(
            render_link_button(&LinkState::Disabled),
            "<button class=\"newlink\" disabled>Link</button>"
        );
        let no_link = LinkState::NoLink {
            block_key: BlockKey::from("b0"),
            sel_start: 0,
            sel_end: 0,
        };
        assert_eq!(
            render_link_button(&no_link),
            "<button class=\"newlink\">Link</button>"
        );
    }
}
