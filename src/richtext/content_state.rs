// Content Model
// An immutable document made of text blocks. Every character carries metadata
// (inline style and an optional entity reference). Snapshots share unchanged
// blocks, so older states stay valid after an edit.

use super::entity::EntityKey;
use super::selection::SelectionState;
use crate::error::{EditError, EditResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Unique identifier of a block within a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKey(String);

impl BlockKey {
    pub fn new(key: impl Into<String>) -> Self {
        BlockKey(key.into())
    }

    /// Key for the block at `index` in a freshly created document
    pub fn generate(index: usize) -> Self {
        BlockKey(format!("b{}", index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BlockKey {
    fn from(key: &str) -> Self {
        BlockKey(key.to_string())
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text styling (semantic, not syntactic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub code: bool,
    pub strikethrough: bool,
}

impl TextStyle {
    /// Names used by the raw format, in rendering order
    pub const NAMES: [&'static str; 5] = ["BOLD", "ITALIC", "UNDERLINE", "CODE", "STRIKETHROUGH"];

    pub fn plain() -> Self {
        Self::default()
    }

    pub fn bold() -> Self {
        TextStyle {
            bold: true,
            ..Default::default()
        }
    }

    pub fn italic() -> Self {
        TextStyle {
            italic: true,
            ..Default::default()
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::plain()
    }

    /// Whether the named style is set. Unknown names are never set.
    pub fn has(&self, name: &str) -> bool {
        match name {
            "BOLD" => self.bold,
            "ITALIC" => self.italic,
            "UNDERLINE" => self.underline,
            "CODE" => self.code,
            "STRIKETHROUGH" => self.strikethrough,
            _ => false,
        }
    }

    /// Set the named style. Returns false for unknown names.
    pub fn set(&mut self, name: &str) -> bool {
        let flag = match name {
            "BOLD" => &mut self.bold,
            "ITALIC" => &mut self.italic,
            "UNDERLINE" => &mut self.underline,
            "CODE" => &mut self.code,
            "STRIKETHROUGH" => &mut self.strikethrough,
            _ => return false,
        };
        *flag = true;
        true
    }
}

/// Per-character metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharacterMetadata {
    pub style: TextStyle,
    pub entity: Option<EntityKey>,
}

impl CharacterMetadata {
    pub fn new(style: TextStyle, entity: Option<EntityKey>) -> Self {
        CharacterMetadata { style, entity }
    }

    pub fn with_entity(self, entity: Option<EntityKey>) -> Self {
        CharacterMetadata { entity, ..self }
    }
}

/// Block-level content types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    #[default]
    Unstyled,
    HeaderOne,
    HeaderTwo,
    HeaderThree,
    Blockquote,
    UnorderedListItem,
    OrderedListItem,
    CodeBlock,
}

/// A block of text with per-character metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBlock {
    key: BlockKey,
    block_type: BlockType,
    depth: u8,
    text: String,
    characters: Vec<CharacterMetadata>,
}

impl ContentBlock {
    /// Unstyled text without entities
    pub fn new(key: BlockKey, block_type: BlockType, text: impl Into<String>) -> Self {
        let text = text.into();
        let characters = vec![CharacterMetadata::default(); text.chars().count()];
        ContentBlock {
            key,
            block_type,
            depth: 0,
            text,
            characters,
        }
    }

    /// Build a block from already computed character metadata.
    /// `characters` must hold one entry per char of `text`.
    pub fn from_parts(
        key: BlockKey,
        block_type: BlockType,
        depth: u8,
        text: String,
        characters: Vec<CharacterMetadata>,
    ) -> Self {
        debug_assert_eq!(text.chars().count(), characters.len());
        ContentBlock {
            key,
            block_type,
            depth,
            text,
            characters,
        }
    }

    pub fn key(&self) -> &BlockKey {
        &self.key
    }

    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn characters(&self) -> &[CharacterMetadata] {
        &self.characters
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn entity_at(&self, offset: usize) -> Option<EntityKey> {
        self.characters.get(offset).and_then(|c| c.entity)
    }

    pub fn style_at(&self, offset: usize) -> TextStyle {
        self.characters
            .get(offset)
            .map(|c| c.style)
            .unwrap_or_default()
    }

    /// Text of the character range [start..end), clamped to the block
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.len());
        if start >= end {
            return String::new();
        }
        self.text.chars().skip(start).take(end - start).collect()
    }

    /// Ensure [start..end) is a valid range within this block
    pub fn check_range(&self, start: usize, end: usize) -> EditResult {
        let len = self.len();
        let bad = if start > len {
            Some(start)
        } else if end > len || end < start {
            Some(end)
        } else {
            None
        };
        match bad {
            Some(offset) => Err(EditError::OffsetOutOfRange {
                key: self.key.clone(),
                offset,
                len,
            }),
            None => Ok(()),
        }
    }

    /// Report maximal runs of characters sharing the same entity key.
    /// `filter` decides on the first character of a run whether the run is
    /// reported to `callback` as (start, end).
    pub fn find_entity_ranges<F, C>(&self, filter: F, callback: C)
    where
        F: Fn(&CharacterMetadata) -> bool,
        C: FnMut(usize, usize),
    {
        find_ranges(
            &self.characters,
            |a, b| a.entity == b.entity,
            filter,
            callback,
        );
    }

    /// Report maximal runs of characters sharing the same inline style
    pub fn find_style_ranges<F, C>(&self, filter: F, callback: C)
    where
        F: Fn(&CharacterMetadata) -> bool,
        C: FnMut(usize, usize),
    {
        find_ranges(&self.characters, |a, b| a.style == b.style, filter, callback);
    }

    /// Replace [start..end) with `text`, every new character carrying `meta`.
    /// The range must have been validated with [`check_range`](Self::check_range).
    pub(crate) fn with_replaced_range(
        &self,
        start: usize,
        end: usize,
        text: &str,
        meta: CharacterMetadata,
    ) -> ContentBlock {
        let start_byte = byte_index(&self.text, start);
        let end_byte = byte_index(&self.text, end);

        let mut new_text = String::with_capacity(self.text.len() + text.len());
        new_text.push_str(&self.text[..start_byte]);
        new_text.push_str(text);
        new_text.push_str(&self.text[end_byte..]);

        let mut characters = Vec::with_capacity(self.characters.len() + text.len());
        characters.extend_from_slice(&self.characters[..start]);
        characters.extend(std::iter::repeat_n(meta, text.chars().count()));
        characters.extend_from_slice(&self.characters[end..]);

        ContentBlock {
            characters,
            text: new_text,
            ..self.clone()
        }
    }

    /// Set (or clear) the entity of every character in [start..end)
    pub(crate) fn with_entity(
        &self,
        start: usize,
        end: usize,
        entity: Option<EntityKey>,
    ) -> ContentBlock {
        let mut block = self.clone();
        for c in &mut block.characters[start..end] {
            c.entity = entity;
        }
        block
    }

    /// Keep [0..offset) and append the given tail
    pub(crate) fn with_tail(
        &self,
        offset: usize,
        tail_text: &str,
        tail_characters: &[CharacterMetadata],
    ) -> ContentBlock {
        let mut text = self.text[..byte_index(&self.text, offset)].to_string();
        text.push_str(tail_text);
        let mut characters = self.characters[..offset].to_vec();
        characters.extend_from_slice(tail_characters);
        ContentBlock {
            text,
            characters,
            ..self.clone()
        }
    }

    /// Text and metadata from `offset` to the end of the block
    pub(crate) fn tail(&self, offset: usize) -> (&str, &[CharacterMetadata]) {
        (
            &self.text[byte_index(&self.text, offset)..],
            &self.characters[offset..],
        )
    }
}

/// Byte index of the character at `char_offset` (or the text length past the end)
fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn find_ranges<T, E, F, C>(items: &[T], are_equal: E, filter: F, mut callback: C)
where
    E: Fn(&T, &T) -> bool,
    F: Fn(&T) -> bool,
    C: FnMut(usize, usize),
{
    if items.is_empty() {
        return;
    }
    let mut cursor = 0;
    for i in 1..=items.len() {
        if i == items.len() || !are_equal(&items[cursor], &items[i]) {
            if filter(&items[cursor]) {
                callback(cursor, i);
            }
            cursor = i;
        }
    }
}

/// The document: an ordered, never empty, sequence of blocks
#[derive(Debug, Clone, PartialEq)]
pub struct ContentState {
    blocks: Vec<Rc<ContentBlock>>,
    selection_before: SelectionState,
    selection_after: SelectionState,
}

impl ContentState {
    /// Build a document from blocks. An empty list yields a single empty block.
    pub fn from_blocks(blocks: Vec<ContentBlock>) -> Self {
        let mut blocks: Vec<Rc<ContentBlock>> = blocks.into_iter().map(Rc::new).collect();
        if blocks.is_empty() {
            blocks.push(Rc::new(ContentBlock::new(
                BlockKey::generate(0),
                BlockType::Unstyled,
                "",
            )));
        }
        let selection = SelectionState::create_empty(blocks[0].key().clone());
        ContentState {
            blocks,
            selection_before: selection.clone(),
            selection_after: selection,
        }
    }

    /// One unstyled block per line of `text`
    pub fn create_from_text(text: &str) -> Self {
        let blocks = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .enumerate()
            .map(|(i, line)| ContentBlock::new(BlockKey::generate(i), BlockType::Unstyled, line))
            .collect();
        Self::from_blocks(blocks)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &ContentBlock> {
        self.blocks.iter().map(|b| b.as_ref())
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block_at(&self, index: usize) -> Option<&ContentBlock> {
        self.blocks.get(index).map(|b| b.as_ref())
    }

    pub fn block_for_key(&self, key: &BlockKey) -> Option<&ContentBlock> {
        self.blocks
            .iter()
            .find(|b| b.key() == key)
            .map(|b| b.as_ref())
    }

    pub fn block_index(&self, key: &BlockKey) -> Option<usize> {
        self.blocks.iter().position(|b| b.key() == key)
    }

    /// Like [`block_for_key`](Self::block_for_key) but reports unknown keys as errors
    pub fn require_block(&self, key: &BlockKey) -> EditResult<&ContentBlock> {
        self.block_for_key(key)
            .ok_or_else(|| EditError::UnknownBlock(key.clone()))
    }

    pub fn first_block(&self) -> &ContentBlock {
        &self.blocks[0]
    }

    pub fn last_block(&self) -> &ContentBlock {
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn selection_before(&self) -> &SelectionState {
        &self.selection_before
    }

    pub fn selection_after(&self) -> &SelectionState {
        &self.selection_after
    }

    pub fn with_selection_before(mut self, selection: SelectionState) -> Self {
        self.selection_before = selection;
        self
    }

    pub fn with_selection_after(mut self, selection: SelectionState) -> Self {
        self.selection_after = selection;
        self
    }

    /// Replace the block with the same key. Other blocks are shared with `self`.
    pub(crate) fn with_block(&self, block: ContentBlock) -> Self {
        let mut next = self.clone();
        if let Some(idx) = self.block_index(block.key()) {
            next.blocks[idx] = Rc::new(block);
        }
        next
    }

    /// Replace blocks [first..=last] with a single block
    pub(crate) fn with_merged_blocks(&self, first: usize, last: usize, block: ContentBlock) -> Self {
        let mut next = self.clone();
        next.blocks
            .splice(first..=last, std::iter::once(Rc::new(block)));
        next
    }

    /// Whether the document contains any text at all
    pub fn has_text(&self) -> bool {
        self.blocks.len() > 1 || !self.blocks[0].is_empty()
    }

    /// Convert to plain text, joining blocks with `delimiter`
    pub fn plain_text(&self, delimiter: &str) -> String {
        self.blocks
            .iter()
            .map(|b| b.text())
            .collect::<Vec<_>>()
            .join(delimiter)
    }
}

impl Default for ContentState {
    fn default() -> Self {
        Self::from_blocks(Vec::new())
    }
}

impl fmt::Display for ContentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ContentState ({} blocks):", self.blocks.len())?;
        for (i, block) in self.blocks.iter().enumerate() {
            write!(f, "  [{}] {} {:?}", i, block.key(), block.block_type())?;
            writeln!(f, ": {:?}", block.text())?;
        }
        Ok(())
    }
}
