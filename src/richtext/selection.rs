// Selection model
// Anchor is where the selection started, focus where it ends.
// Offsets are character offsets within the block's text.

use super::content_state::BlockKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    anchor_key: BlockKey,
    anchor_offset: usize,
    focus_key: BlockKey,
    focus_offset: usize,
    is_backward: bool,
    has_focus: bool,
}

impl SelectionState {
    /// A collapsed, unfocused selection at the start of the given block
    pub fn create_empty(key: BlockKey) -> Self {
        SelectionState {
            anchor_key: key.clone(),
            anchor_offset: 0,
            focus_key: key,
            focus_offset: 0,
            is_backward: false,
            has_focus: false,
        }
    }

    /// A selection from `start` to `end` in a single block. It is backward
    /// when `end` lies before `start`.
    pub fn range(key: BlockKey, start: usize, end: usize) -> Self {
        Self::create_empty(key)
            .with_anchor_offset(start)
            .with_focus_offset(end)
            .with_is_backward(end < start)
    }

    /// A collapsed selection at `offset`
    pub fn caret(key: BlockKey, offset: usize) -> Self {
        Self::range(key, offset, offset)
    }

    pub fn with_anchor_key(mut self, key: BlockKey) -> Self {
        self.anchor_key = key;
        self
    }

    pub fn with_anchor_offset(mut self, offset: usize) -> Self {
        self.anchor_offset = offset;
        self
    }

    pub fn with_focus_key(mut self, key: BlockKey) -> Self {
        self.focus_key = key;
        self
    }

    pub fn with_focus_offset(mut self, offset: usize) -> Self {
        self.focus_offset = offset;
        self
    }

    pub fn with_is_backward(mut self, is_backward: bool) -> Self {
        self.is_backward = is_backward;
        self
    }

    pub fn with_has_focus(mut self, has_focus: bool) -> Self {
        self.has_focus = has_focus;
        self
    }

    pub fn anchor_key(&self) -> &BlockKey {
        &self.anchor_key
    }

    pub fn anchor_offset(&self) -> usize {
        self.anchor_offset
    }

    pub fn focus_key(&self) -> &BlockKey {
        &self.focus_key
    }

    pub fn focus_offset(&self) -> usize {
        self.focus_offset
    }

    pub fn is_backward(&self) -> bool {
        self.is_backward
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn start_key(&self) -> &BlockKey {
        if self.is_backward {
            &self.focus_key
        } else {
            &self.anchor_key
        }
    }

    pub fn start_offset(&self) -> usize {
        if self.is_backward {
            self.focus_offset
        } else {
            self.anchor_offset
        }
    }

    pub fn end_key(&self) -> &BlockKey {
        if self.is_backward {
            &self.anchor_key
        } else {
            &self.focus_key
        }
    }

    pub fn end_offset(&self) -> usize {
        if self.is_backward {
            self.anchor_offset
        } else {
            self.focus_offset
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor_key == self.focus_key && self.anchor_offset == self.focus_offset
    }

    /// Whether start and end lie in the same block
    pub fn is_single_block(&self) -> bool {
        self.anchor_key == self.focus_key
    }
}
