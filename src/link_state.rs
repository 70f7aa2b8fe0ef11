// Link state derivation and link mutations
//
// The link state classifies the current selection with respect to LINK
// entities. The view uses it to decide which link actions are available; the
// mutations below turn those actions into new editor states.

use crate::error::{EditError, EditResult};
use crate::richtext::content_state::{BlockKey, CharacterMetadata};
use crate::richtext::editor_state::{ChangeType, EditorState};
use crate::richtext::entity::{Entity, EntityKey, EntityStore};
use crate::richtext::modifier;
use crate::richtext::raw;
use crate::richtext::selection::SelectionState;
use serde::Serialize;

/// A selection lying completely inside a link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExistingLink {
    pub entity_key: EntityKey,
    pub block_key: BlockKey,
    pub link_start: usize,
    pub link_end: usize,
    pub sel_start: usize,
    pub sel_end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LinkState {
    /// The selection spans several blocks
    Disabled,
    /// A single-block selection that is not inside a link
    NoLink {
        block_key: BlockKey,
        sel_start: usize,
        sel_end: usize,
    },
    ExistingLink(ExistingLink),
}

impl LinkState {
    pub fn status(&self) -> &'static str {
        match self {
            LinkState::Disabled => "disabled",
            LinkState::NoLink { .. } => "nolink",
            LinkState::ExistingLink(_) => "existinglink",
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, LinkState::Disabled)
    }

    pub fn existing_link(&self) -> Option<&ExistingLink> {
        match self {
            LinkState::ExistingLink(link) => Some(link),
            _ => None,
        }
    }

    pub fn block_key(&self) -> Option<&BlockKey> {
        match self {
            LinkState::Disabled => None,
            LinkState::NoLink { block_key, .. } => Some(block_key),
            LinkState::ExistingLink(link) => Some(&link.block_key),
        }
    }

    /// The range a link edit applies to: the link itself when there is one,
    /// otherwise the selection
    pub fn target_range(&self) -> Option<(usize, usize)> {
        match self {
            LinkState::Disabled => None,
            LinkState::NoLink {
                sel_start, sel_end, ..
            } => Some((*sel_start, *sel_end)),
            LinkState::ExistingLink(link) => Some((link.link_start, link.link_end)),
        }
    }
}

/// Classify the selection of `editor_state` with respect to LINK entities
pub fn derive_link_state(editor_state: &EditorState, entities: &EntityStore) -> LinkState {
    let selection = editor_state.selection();
    let block_key = selection.start_key();
    if block_key != selection.end_key() {
        return LinkState::Disabled;
    }

    let Some(block) = editor_state.current_content().block_for_key(block_key) else {
        log::warn!("selection refers to unknown block {}", block_key);
        return LinkState::Disabled;
    };

    // Within one block the edges are ordered by offset, even when the
    // backward flag does not match the anchor and focus
    let (sel_start, sel_end) = {
        let (a, b) = (selection.start_offset(), selection.end_offset());
        (a.min(b), a.max(b))
    };

    // Both bounds are inclusive: a caret right behind a link still counts as
    // inside it. With adjacent links the last matching range wins.
    let mut existing = None;
    block.find_entity_ranges(
        |c| c.entity.is_some_and(|key| entities.is_link(key)),
        |link_start, link_end| {
            if sel_start >= link_start && sel_end <= link_end {
                if let Some(entity_key) = block.entity_at(link_start) {
                    existing = Some(ExistingLink {
                        entity_key,
                        block_key: block_key.clone(),
                        link_start,
                        link_end,
                        sel_start,
                        sel_end,
                    });
                }
            }
        },
    );

    match existing {
        Some(link) => LinkState::ExistingLink(link),
        None => LinkState::NoLink {
            block_key: block_key.clone(),
            sel_start,
            sel_end,
        },
    }
}

/// Strip the link annotation from the whole link range. The text stays; the
/// entity stays in the store, unreferenced.
pub fn apply_remove_link(editor_state: &EditorState, link: &ExistingLink) -> EditResult<EditorState> {
    let link_selection =
        SelectionState::range(link.block_key.clone(), link.link_start, link.link_end);
    editor_state.toggle_link(&link_selection, None)
}

/// Replace the target range of `link_state` with `text` and link it to `url`.
///
/// A new entity is created for every call; when updating an existing link the
/// previous entity is orphaned. The selection ends up covering the new text.
pub fn apply_set_link(
    editor_state: &EditorState,
    link_state: &LinkState,
    text: &str,
    url: &str,
    entities: &mut EntityStore,
) -> EditResult<EditorState> {
    let (Some(block_key), Some((start, end))) = (link_state.block_key(), link_state.target_range())
    else {
        return Err(EditError::LinkActionsDisabled);
    };

    log_raw("before linking", editor_state, entities);

    // Update the text
    let link_selection = SelectionState::range(block_key.clone(), start, end);
    let content = modifier::replace_text(
        editor_state.current_content(),
        &link_selection,
        text,
        CharacterMetadata::default(),
        entities,
    )?;
    let editor_state = editor_state.push(content, ChangeType::InsertCharacters);

    // Make the new text a link
    let link_selection = link_selection.with_focus_offset(start + text.chars().count());
    let entity_key = entities.add(Entity::link(url));
    let editor_state = editor_state.toggle_link(&link_selection, Some(entity_key))?;

    let editor_state = editor_state.force_selection(link_selection);

    log_raw("after linking", &editor_state, entities);
    Ok(editor_state)
}

fn log_raw(label: &str, editor_state: &EditorState, entities: &EntityStore) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    match raw::to_json(editor_state.current_content(), entities) {
        Ok(json) => log::debug!("content {}: {}", label, json),
        Err(err) => log::debug!("content {}: <unavailable: {}>", label, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::content_state::ContentState;

    fn key(s: &str) -> BlockKey {
        BlockKey::from(s)
    }

    /// "Visit site today" with "site" linked to http://site
    fn linked_editor(store: &mut EntityStore) -> (EditorState, EntityKey) {
        let link = store.add(Entity::link("http://site"));
        let state = EditorState::create_with_content(
            ContentState::create_from_text("Visit site today\nsecond line"),
            None,
        );
        let state = state
            .toggle_link(&SelectionState::range(key("b0"), 6, 10), Some(link))
            .unwrap();
        (state, link)
    }

    fn select(state: &EditorState, start: usize, end: usize) -> EditorState {
        state.accept_selection(SelectionState::range(key("b0"), start, end))
    }

    #[test]
    fn test_multi_block_selection_is_disabled() {
        let mut store = EntityStore::new();
        let (state, _) = linked_editor(&mut store);
        let state = state.accept_selection(
            SelectionState::create_empty(key("b0"))
                .with_anchor_offset(7)
                .with_focus_key(key("b1"))
                .with_focus_offset(2),
        );
        assert_eq!(derive_link_state(&state, &store), LinkState::Disabled);
    }

    #[test]
    fn test_selection_inside_link() {
        let mut store = EntityStore::new();
        let (state, link) = linked_editor(&mut store);

        let link_state = derive_link_state(&select(&state, 7, 9), &store);
        assert_eq!(
            link_state,
            LinkState::ExistingLink(ExistingLink {
                entity_key: link,
                block_key: key("b0"),
                link_start: 6,
                link_end: 10,
                sel_start: 7,
                sel_end: 9,
            })
        );
        assert_eq!(link_state.target_range(), Some((6, 10)));
    }

    #[test]
    fn test_partial_overlap_is_no_link() {
        let mut store = EntityStore::new();
        let (state, _) = linked_editor(&mut store);

        for (start, end) in [(4, 8), (8, 12), (0, 16)] {
            let link_state = derive_link_state(&select(&state, start, end), &store);
            assert_eq!(
                link_state,
                LinkState::NoLink {
                    block_key: key("b0"),
                    sel_start: start,
                    sel_end: end,
                }
            );
        }
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let mut store = EntityStore::new();
        let (state, _) = linked_editor(&mut store);

        assert_eq!(derive_link_state(&select(&state, 10, 10), &store).status(), "existinglink");
        assert_eq!(derive_link_state(&select(&state, 6, 6), &store).status(), "existinglink");
        assert_eq!(derive_link_state(&select(&state, 6, 10), &store).status(), "existinglink");
        // Abutting the link from outside
        assert_eq!(derive_link_state(&select(&state, 10, 12), &store).status(), "nolink");
        assert_eq!(derive_link_state(&select(&state, 3, 6), &store).status(), "nolink");
    }

    #[test]
    fn test_adjacent_links_last_wins() {
        let mut store = EntityStore::new();
        let (state, _) = linked_editor(&mut store);
        let other = store.add(Entity::link("http://today"));
        let state = state
            .toggle_link(&SelectionState::range(key("b0"), 10, 16), Some(other))
            .unwrap();

        let link_state = derive_link_state(&select(&state, 10, 10), &store);
        assert_eq!(link_state.existing_link().map(|l| l.entity_key), Some(other));
    }

    #[test]
    fn test_non_link_entities_are_ignored() {
        use crate::richtext::entity::{EntityData, EntityType, Mutability};
        let mut store = EntityStore::new();
        let token = store.create(EntityType::Token, Mutability::Immutable, EntityData::new());
        let state =
            EditorState::create_with_content(ContentState::create_from_text("a @token"), None)
                .toggle_link(&SelectionState::range(key("b0"), 2, 8), Some(token))
                .unwrap();

        assert_eq!(derive_link_state(&select(&state, 3, 5), &store).status(), "nolink");
    }

    #[test]
    fn test_unknown_block_is_disabled() {
        let store = EntityStore::new();
        let state = EditorState::create_with_content(ContentState::create_from_text("x"), None)
            .accept_selection(SelectionState::caret(key("nope"), 0));
        assert_eq!(derive_link_state(&state, &store), LinkState::Disabled);
    }

    #[test]
    fn test_set_link_on_selection() {
        let mut store = EntityStore::new();
        let state = EditorState::create_with_content(
            ContentState::create_from_text("Visit site today"),
            None,
        );
        let state = select(&state, 6, 10);
        let link_state = derive_link_state(&state, &store);

        let next =
            apply_set_link(&state, &link_state, "website", "http://example.com", &mut store)
                .unwrap();

        let block = next.current_content().first_block();
        assert_eq!(block.text(), "Visit website today");
        assert_eq!(next.selection().start_offset(), 6);
        assert_eq!(next.selection().end_offset(), 13);
        assert!(next.selection().has_focus());

        let derived = derive_link_state(&next, &store);
        let link = derived.existing_link().unwrap();
        assert_eq!((link.link_start, link.link_end), (6, 13));
        assert_eq!(store.get(link.entity_key).unwrap().url(), Some("http://example.com"));
    }

    #[test]
    fn test_update_link_orphans_previous_entity() {
        let mut store = EntityStore::new();
        let (state, old) = linked_editor(&mut store);
        let state = select(&state, 7, 7);
        let link_state = derive_link_state(&state, &store);

        let next = apply_set_link(&state, &link_state, "place", "http://place", &mut store).unwrap();

        assert_eq!(store.len(), 2);
        let block = next.current_content().first_block();
        assert_eq!(block.text(), "Visit place today");
        let derived = derive_link_state(&next, &store);
        let link = derived.existing_link().unwrap();
        assert_ne!(link.entity_key, old);
        assert_eq!((link.link_start, link.link_end), (6, 11));
        assert!((0..block.len()).all(|i| block.entity_at(i) != Some(old)));
    }

    #[test]
    fn test_set_link_is_undoable() {
        let mut store = EntityStore::new();
        let state = select(
            &EditorState::create_with_content(ContentState::create_from_text("go here"), None),
            3,
            7,
        );
        let link_state = derive_link_state(&state, &store);
        let next = apply_set_link(&state, &link_state, "there", "http://there", &mut store).unwrap();

        let unlinked = next.undo();
        assert_eq!(unlinked.current_content().first_block().text(), "go there");
        assert_eq!(unlinked.current_content().first_block().entity_at(4), None);
        let original = unlinked.undo();
        assert_eq!(original.current_content().first_block().text(), "go here");
    }

    #[test]
    fn test_set_link_disabled() {
        let mut store = EntityStore::new();
        let state = EditorState::create_with_content(ContentState::create_from_text("x"), None);
        let err = apply_set_link(&state, &LinkState::Disabled, "a", "b", &mut store);
        assert_eq!(err.unwrap_err(), EditError::LinkActionsDisabled);
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_link() {
        let mut store = EntityStore::new();
        let (state, _) = linked_editor(&mut store);
        let state = select(&state, 7, 8);
        let link_state = derive_link_state(&state, &store);

        let next = apply_remove_link(&state, link_state.existing_link().unwrap()).unwrap();

        assert_eq!(next.current_content().first_block().text(), "Visit site today");
        let after = derive_link_state(&select(&next, 6, 10), &store);
        assert_eq!(after.status(), "nolink");
        assert_eq!(store.len(), 1);
    }

    /// Anchor after focus without the backward flag set
    fn select_unflagged(state: &EditorState, anchor: usize, focus: usize) -> EditorState {
        state.accept_selection(
            SelectionState::create_empty(key("b0"))
                .with_anchor_offset(anchor)
                .with_focus_offset(focus),
        )
    }

    #[test]
    fn test_right_to_left_selection_is_ordered() {
        let mut store = EntityStore::new();
        let state = EditorState::create_with_content(
            ContentState::create_from_text("Visit site today"),
            None,
        );
        let state = select_unflagged(&state, 10, 6);
        let link_state = derive_link_state(&state, &store);
        assert_eq!(
            link_state,
            LinkState::NoLink {
                block_key: key("b0"),
                sel_start: 6,
                sel_end: 10,
            }
        );

        let next =
            apply_set_link(&state, &link_state, "website", "http://example.com", &mut store)
                .unwrap();
        let block = next.current_content().first_block();
        assert_eq!(block.text(), "Visit website today");
        let mut ranges = Vec::new();
        block.find_entity_ranges(|c| c.entity.is_some(), |s, e| ranges.push((s, e)));
        assert_eq!(ranges, vec![(6, 13)]);
        assert_eq!(next.selection().start_offset(), 6);
        assert_eq!(next.selection().end_offset(), 13);
    }

    #[test]
    fn test_right_to_left_selection_inside_link() {
        let mut store = EntityStore::new();
        let (state, link) = linked_editor(&mut store);

        for state in [
            select_unflagged(&state, 9, 7),
            select(&state, 9, 7),
        ] {
            let link_state = derive_link_state(&state, &store);
            let existing = link_state.existing_link().unwrap();
            assert_eq!(existing.entity_key, link);
            assert_eq!((existing.sel_start, existing.sel_end), (7, 9));

            let next = apply_remove_link(&state, existing).unwrap();
            let after = derive_link_state(&select(&next, 6, 10), &store);
            assert_eq!(after.status(), "nolink");
        }
    }

    #[test]
    fn test_link_state_json() {
        let state = LinkState::NoLink {
            block_key: key("b0"),
            sel_start: 1,
            sel_end: 3,
        };
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"status":"nolink","block_key":"b0","sel_start":1,"sel_end":3}"#);
        assert_eq!(
            serde_json::to_string(&LinkState::Disabled).unwrap(),
            r#"{"status":"disabled"}"#
        );
    }
}
