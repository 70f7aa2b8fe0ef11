// Content Modifier
// Pure transformations of a ContentState. Every function returns a new
// snapshot and leaves its input untouched.

use super::content_state::{BlockKey, CharacterMetadata, ContentState};
use super::entity::{EntityKey, EntityStore, Mutability};
use super::selection::SelectionState;
use crate::error::{EditError, EditResult};

/// A selection resolved to block indices, ordered start <= end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResolvedRange {
    start_block: usize,
    start_offset: usize,
    end_block: usize,
    end_offset: usize,
}

impl ResolvedRange {
    fn is_single_block(&self) -> bool {
        self.start_block == self.end_block
    }
}

/// Look up the blocks of `range` and validate its offsets
fn resolve(content: &ContentState, range: &SelectionState) -> EditResult<ResolvedRange> {
    content
        .require_block(range.start_key())?
        .check_range(range.start_offset(), range.start_offset())?;
    content
        .require_block(range.end_key())?
        .check_range(range.end_offset(), range.end_offset())?;

    let index_of = |key: &BlockKey| {
        content
            .block_index(key)
            .ok_or_else(|| EditError::UnknownBlock(key.clone()))
    };
    let mut a = (index_of(range.start_key())?, range.start_offset());
    let mut b = (index_of(range.end_key())?, range.end_offset());
    if b < a {
        std::mem::swap(&mut a, &mut b);
    }
    Ok(ResolvedRange {
        start_block: a.0,
        start_offset: a.1,
        end_block: b.0,
        end_offset: b.1,
    })
}

/// Replace the text of `range` with `text`. The new characters carry `meta`.
/// Afterwards `selection_before` is `range` and `selection_after` a caret
/// behind the inserted text.
pub fn replace_text(
    content: &ContentState,
    range: &SelectionState,
    text: &str,
    meta: CharacterMetadata,
    entities: &EntityStore,
) -> EditResult<ContentState> {
    let resolved = resolve(content, range)?;
    let without_entities = remove_entities_at_edges(content, resolved, entities);
    let removed = remove_resolved(&without_entities, resolved);

    let block = removed
        .block_at(resolved.start_block)
        .ok_or_else(|| EditError::UnknownBlock(range.start_key().clone()))?;
    let offset = resolved.start_offset;
    let inserted = block.with_replaced_range(offset, offset, text, meta);
    let key = inserted.key().clone();

    Ok(removed
        .with_block(inserted)
        .with_selection_before(range.clone())
        .with_selection_after(SelectionState::caret(key, offset + text.chars().count())))
}

/// Remove the text of `range`, merging blocks when it spans several of them
pub fn remove_range(
    content: &ContentState,
    range: &SelectionState,
    entities: &EntityStore,
) -> EditResult<ContentState> {
    let resolved = resolve(content, range)?;
    let without_entities = remove_entities_at_edges(content, resolved, entities);
    let removed = remove_resolved(&without_entities, resolved);
    let key = removed
        .block_at(resolved.start_block)
        .map(|b| b.key().clone())
        .unwrap_or_else(|| range.start_key().clone());

    Ok(removed
        .with_selection_before(range.clone())
        .with_selection_after(SelectionState::caret(key, resolved.start_offset)))
}

/// Set the entity of every character in `range`, or clear it with `None`
pub fn apply_entity(
    content: &ContentState,
    range: &SelectionState,
    entity: Option<EntityKey>,
) -> EditResult<ContentState> {
    let resolved = resolve(content, range)?;
    let mut next = content.clone();

    for idx in resolved.start_block..=resolved.end_block {
        let Some(block) = content.block_at(idx) else {
            continue;
        };
        let start = if idx == resolved.start_block {
            resolved.start_offset
        } else {
            0
        };
        let end = if idx == resolved.end_block {
            resolved.end_offset
        } else {
            block.len()
        };
        if start < end {
            next = next.with_block(block.with_entity(start, end, entity));
        }
    }

    Ok(next
        .with_selection_before(range.clone())
        .with_selection_after(range.clone()))
}

fn remove_resolved(content: &ContentState, range: ResolvedRange) -> ContentState {
    let Some(start) = content.block_at(range.start_block) else {
        return content.clone();
    };

    if range.is_single_block() {
        let block = start.with_replaced_range(
            range.start_offset,
            range.end_offset,
            "",
            CharacterMetadata::default(),
        );
        return content.with_block(block);
    }

    // Keep the head of the start block, append the tail of the end block and
    // drop everything in between.
    let Some(end) = content.block_at(range.end_block) else {
        return content.clone();
    };
    let (tail_text, tail_characters) = end.tail(range.end_offset);
    let merged = start.with_tail(range.start_offset, tail_text, tail_characters);
    content.with_merged_blocks(range.start_block, range.end_block, merged)
}

/// Editing inside an immutable or segmented entity invalidates it, so the
/// entity is stripped from its whole range when an edge of the edit falls
/// strictly inside it.
fn remove_entities_at_edges(
    content: &ContentState,
    range: ResolvedRange,
    entities: &EntityStore,
) -> ContentState {
    let mut next = content.clone();
    for (block_idx, offset) in [
        (range.start_block, range.start_offset),
        (range.end_block, range.end_offset),
    ] {
        let Some(block) = next.block_at(block_idx) else {
            continue;
        };
        if offset == 0 {
            continue;
        }
        let before = block.entity_at(offset - 1);
        let after = block.entity_at(offset);
        let Some(key) = after else {
            continue;
        };
        if before != Some(key) {
            continue;
        }
        let mutable = entities
            .get(key)
            .is_none_or(|e| e.mutability == Mutability::Mutable);
        if mutable {
            continue;
        }

        let mut removal = None;
        block.find_entity_ranges(
            |c| c.entity == Some(key),
            |start, end| {
                if start <= offset && offset < end {
                    removal = Some((start, end));
                }
            },
        );
        if let Some((start, end)) = removal {
            let stripped = block.with_entity(start, end, None);
            next = next.with_block(stripped);
        }
    }
    next
}
