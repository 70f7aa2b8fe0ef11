// Snapshot tests for the HTML view

use linkpad::config::EditorConfig;
use linkpad::content::ContentLoader;
use linkpad::html;
use linkpad::link_controller::LinkController;
use linkpad::richtext::content_state::BlockKey;
use linkpad::richtext::selection::SelectionState;

fn controller(text: &str) -> LinkController {
    LinkController::new(EditorConfig {
        title: "Links".to_string(),
        placeholder: "Type...".to_string(),
        intro: "Intro".to_string(),
        initial_text: text.to_string(),
        ..Default::default()
    })
}

/// "Visit site today" with "site" linked, caret inside the link
fn linked_controller() -> LinkController {
    let mut c = controller("Visit site today");
    c.select(SelectionState::range(BlockKey::from("b0"), 6, 10));
    c.update_link("site", "http://example.com").unwrap();
    c.select(SelectionState::caret(BlockKey::from("b0"), 7));
    c
}

#[test]
fn page_with_link() {
    insta::assert_snapshot!(html::render_page(&linked_controller()), @r#"
<div>
<p>Intro</p>
<div>
<h2>Links</h2>
<button class="active">Link</button>
<div class="editor">
<div data-block="b0">Visit <a href="http://example.com">site</a> today</div>
</div>
</div>
</div>
"#);
}

#[test]
fn empty_document_shows_placeholder() {
    insta::assert_snapshot!(html::render(&controller("")), @r#"
<div>
<h2>Links</h2>
<button class="newlink">Link</button>
<div class="editor">
<div class="placeholder">Type...</div>
<div data-block="b0"><br></div>
</div>
</div>
"#);
}

#[test]
fn multi_block_selection_disables_button() {
    let mut c = controller("one\ntwo");
    c.select(
        SelectionState::create_empty(BlockKey::from("b0"))
            .with_anchor_offset(1)
            .with_focus_key(BlockKey::from("b1"))
            .with_focus_offset(1),
    );
    insta::assert_snapshot!(html::render(&c), @r#"
<div>
<h2>Links</h2>
<button class="newlink" disabled>Link</button>
<div class="editor">
<div data-block="b0">one</div>
<div data-block="b1">two</div>
</div>
</div>
"#);
}

#[test]
fn form_for_existing_link() {
    let mut c = linked_controller();
    c.toggle_link_editor();
    insta::assert_snapshot!(html::render(&c), @r#"
<div>
<h4>Link editing</h4>
<div>Text: <input name="text" value="site"/></div>
<div>Url: <input name="url" value="http://example.com"/></div>
<button name="submit" disabled>Update link</button>
<button name="remove">Remove link</button>
<button name="cancel">Cancel</button>
</div>
"#);
}

#[test]
fn form_for_new_link() {
    let mut c = controller("Visit site today");
    c.select(SelectionState::range(BlockKey::from("b0"), 6, 10));
    c.toggle_link_editor();
    c.set_link_form_url("http://a.com/?q=\"x\"");
    insta::assert_snapshot!(html::render(&c), @r#"
<div>
<h4>Link editing</h4>
<div>Text: <input name="text" value="site"/></div>
<div>Url: <input name="url" value="http://a.com/?q=&quot;x&quot;"/></div>
<button name="submit">Add link</button>
<button name="cancel">Cancel</button>
</div>
"#);

    // Cancel closes the form again
    c.toggle_link_editor();
    assert!(!c.is_showing_link_editor());
}

#[test]
fn styled_lists_from_raw() {
    let mut c = controller("");
    c.set_content_from_raw(
        r#"{
            "blocks": [
                {"key": "a", "text": "bold move", "type": "unordered-list-item",
                 "inlineStyleRanges": [{"offset": 0, "length": 4, "style": "BOLD"}],
                 "entityRanges": [{"offset": 5, "length": 4, "key": 0}]},
                {"key": "b", "text": "a & b", "type": "unordered-list-item"},
                {"key": "c", "text": "end", "type": "unstyled",
                 "inlineStyleRanges": [
                    {"offset": 0, "length": 3, "style": "ITALIC"},
                    {"offset": 1, "length": 1, "style": "UNDERLINE"}
                 ]}
            ],
            "entityMap": {
                "0": {"type": "LINK", "mutability": "MUTABLE", "data": {"url": "http://move"}}
            }
        }"#,
    )
    .unwrap();
    insta::assert_snapshot!(html::render(&c), @r#"
<div>
<h2>Links</h2>
<button class="newlink">Link</button>
<div class="editor">
<ul>
<li data-block="a"><strong>bold</strong> <a href="http://move">move</a></li>
<li data-block="b">a &amp; b</li>
</ul>
<div data-block="c"><em>e</em><em><u>n</u></em><em>d</em></div>
</div>
</div>
"#);
}
