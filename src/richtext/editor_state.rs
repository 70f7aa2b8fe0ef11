// Editor State
// An immutable snapshot of everything the editor shows: the current content,
// the selection, and the undo/redo history. Every operation returns a new
// snapshot.

use super::content_state::ContentState;
use super::decorator::CompositeDecorator;
use super::entity::EntityKey;
use super::modifier;
use super::selection::SelectionState;
use crate::error::EditResult;
use serde::Serialize;
use std::rc::Rc;

pub const DEFAULT_UNDO_LIMIT: usize = 100;

/// Kind of change recorded with every pushed content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeType {
    InsertCharacters,
    RemoveRange,
    ApplyEntity,
    Undo,
    Redo,
}

impl ChangeType {
    /// Changes that coalesce with an immediately preceding change of the same kind
    fn is_typing(self) -> bool {
        self == ChangeType::InsertCharacters
    }
}

#[derive(Debug, Clone)]
pub struct EditorState {
    current_content: ContentState,
    selection: SelectionState,
    decorator: Option<Rc<CompositeDecorator>>,
    undo_stack: Vec<ContentState>,
    redo_stack: Vec<ContentState>,
    last_change_type: Option<ChangeType>,
    force_selection: bool,
    undo_limit: usize,
}

impl EditorState {
    /// An editor holding a single empty block
    pub fn create_empty(decorator: Option<Rc<CompositeDecorator>>) -> Self {
        Self::create_with_content(ContentState::default(), decorator)
    }

    pub fn create_with_content(
        content: ContentState,
        decorator: Option<Rc<CompositeDecorator>>,
    ) -> Self {
        let selection = SelectionState::create_empty(content.first_block().key().clone());
        EditorState {
            current_content: content,
            selection,
            decorator,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            last_change_type: None,
            force_selection: false,
            undo_limit: DEFAULT_UNDO_LIMIT,
        }
    }

    /// Limit the number of undo steps kept (at least one)
    pub fn with_undo_limit(mut self, limit: usize) -> Self {
        self.undo_limit = limit.max(1);
        self.undo_stack = trimmed(self.undo_stack, self.undo_limit);
        self
    }

    pub fn current_content(&self) -> &ContentState {
        &self.current_content
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn decorator(&self) -> Option<&CompositeDecorator> {
        self.decorator.as_deref()
    }

    pub fn last_change_type(&self) -> Option<ChangeType> {
        self.last_change_type
    }

    /// Whether the view must apply the selection even if it thinks it is current
    pub fn must_force_selection(&self) -> bool {
        self.force_selection
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Publish new content. The previous content becomes an undo step unless
    /// the change continues a run of typing at the same spot.
    pub fn push(&self, content: ContentState, change_type: ChangeType) -> EditorState {
        if content == self.current_content {
            return self.clone();
        }

        let mut next = self.clone();
        let must_become_boundary =
            self.last_change_type != Some(change_type) || !change_type.is_typing();

        let content = if self.selection != *self.current_content.selection_after()
            || must_become_boundary
        {
            next.undo_stack.push(self.current_content.clone());
            next.undo_stack = trimmed(next.undo_stack, next.undo_limit);
            next.redo_stack.clear();
            content
        } else {
            // Coalesced typing keeps the selection from before the whole run
            content.with_selection_before(self.current_content.selection_before().clone())
        };

        next.selection = content
            .selection_after()
            .clone()
            .with_has_focus(self.selection.has_focus());
        next.force_selection = !change_type.is_typing();
        next.last_change_type = Some(change_type);
        next.current_content = content;
        next
    }

    /// Restore the content before the last undo step
    pub fn undo(&self) -> EditorState {
        let mut next = self.clone();
        let Some(previous) = next.undo_stack.pop() else {
            return next;
        };
        next.selection = self
            .current_content
            .selection_before()
            .clone()
            .with_has_focus(self.selection.has_focus());
        next.redo_stack
            .push(std::mem::replace(&mut next.current_content, previous));
        next.force_selection = true;
        next.last_change_type = Some(ChangeType::Undo);
        next
    }

    /// Re-apply the content removed by the last undo
    pub fn redo(&self) -> EditorState {
        let mut next = self.clone();
        let Some(content) = next.redo_stack.pop() else {
            return next;
        };
        next.selection = content
            .selection_after()
            .clone()
            .with_has_focus(self.selection.has_focus());
        next.undo_stack
            .push(std::mem::replace(&mut next.current_content, content));
        next.force_selection = true;
        next.last_change_type = Some(ChangeType::Redo);
        next
    }

    /// Set the selection and make the view apply it, giving the editor focus
    pub fn force_selection(&self, selection: SelectionState) -> EditorState {
        EditorState {
            selection: selection.with_has_focus(true),
            force_selection: true,
            ..self.clone()
        }
    }

    /// Take over a selection reported by the view
    pub fn accept_selection(&self, selection: SelectionState) -> EditorState {
        EditorState {
            selection,
            force_selection: false,
            ..self.clone()
        }
    }

    /// Annotate `target` with a link entity, or strip annotations with `None`
    pub fn toggle_link(
        &self,
        target: &SelectionState,
        entity: Option<EntityKey>,
    ) -> EditResult<EditorState> {
        let content = modifier::apply_entity(&self.current_content, target, entity)?;
        Ok(self.push(content, ChangeType::ApplyEntity))
    }
}

fn trimmed(mut stack: Vec<ContentState>, limit: usize) -> Vec<ContentState> {
    if stack.len() > limit {
        let excess = stack.len() - limit;
        stack.drain(..excess);
    }
    stack
}
