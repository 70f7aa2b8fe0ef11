// Link Interaction Controller
//
// Owns the current editor state, the entity table and the derived link state.
// Every published change re-derives the link state and notifies subscribers,
// which typically re-render the view from the controller.

use crate::config::EditorConfig;
use crate::error::{EditError, EditResult};
use crate::link_editor::{LinkEditOptions, LinkEditorForm, LinkField};
use crate::link_state::{LinkState, apply_remove_link, apply_set_link, derive_link_state};
use crate::richtext::content_state::ContentState;
use crate::richtext::decorator::CompositeDecorator;
use crate::richtext::editor_state::EditorState;
use crate::richtext::entity::EntityStore;
use crate::richtext::selection::SelectionState;
use std::rc::Rc;

/// Called after every published change
pub type Listener = Box<dyn FnMut(&LinkController)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

pub struct LinkController {
    editor_state: EditorState,
    entities: EntityStore,
    link_state: LinkState,
    link_editor: Option<LinkEditorForm>,
    config: EditorConfig,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: usize,
}

impl LinkController {
    /// A controller editing the configured initial text
    pub fn new(config: EditorConfig) -> Self {
        let content = ContentState::create_from_text(&config.initial_text);
        Self::with_content(content, EntityStore::new(), config)
    }

    /// A controller editing `content`, whose entities live in `entities`
    pub fn with_content(content: ContentState, entities: EntityStore, config: EditorConfig) -> Self {
        let editor_state = Self::fresh_editor_state(content, &config);
        let link_state = derive_link_state(&editor_state, &entities);
        LinkController {
            editor_state,
            entities,
            link_state,
            link_editor: None,
            config,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    fn fresh_editor_state(content: ContentState, config: &EditorConfig) -> EditorState {
        let decorator = Rc::new(CompositeDecorator::links());
        EditorState::create_with_content(content, Some(decorator)).with_undo_limit(config.undo_limit)
    }

    pub fn editor_state(&self) -> &EditorState {
        &self.editor_state
    }

    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    pub fn link_state(&self) -> &LinkState {
        &self.link_state
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The open link form, if any
    pub fn link_editor(&self) -> Option<&LinkEditorForm> {
        self.link_editor.as_ref()
    }

    pub fn is_showing_link_editor(&self) -> bool {
        self.link_editor.is_some()
    }

    /// Give the editor focus
    pub fn focus(&mut self) {
        let selection = self.editor_state.selection().clone().with_has_focus(true);
        let editor_state = self.editor_state.accept_selection(selection);
        self.publish(editor_state);
    }

    /// Take over a new editor state produced by the view
    pub fn on_change(&mut self, editor_state: EditorState) {
        self.publish(editor_state);
    }

    /// Move the selection, as the view does when the user selects text
    pub fn select(&mut self, selection: SelectionState) {
        let editor_state = self.editor_state.accept_selection(selection);
        self.publish(editor_state);
    }

    /// Open the link form pre-populated from the link state, or close it
    pub fn toggle_link_editor(&mut self) {
        if self.link_editor.take().is_none() {
            let opts = LinkEditOptions::from_link_state(
                &self.link_state,
                self.editor_state.current_content(),
                &self.entities,
            );
            match opts {
                Some(opts) => self.link_editor = Some(LinkEditorForm::new(opts)),
                None => {
                    log::warn!("link editor requested while link actions are disabled");
                    return;
                }
            }
        }
        self.notify();
    }

    /// Remove the link around the selection
    pub fn remove_link(&mut self) -> EditResult {
        let link = self
            .link_state
            .existing_link()
            .ok_or(EditError::NoLinkAtSelection)?;
        let editor_state = apply_remove_link(&self.editor_state, link)?;
        self.link_editor = None;
        self.publish(editor_state);
        Ok(())
    }

    /// Add a link over the selection, or update the link around it
    pub fn update_link(&mut self, text: &str, url: &str) -> EditResult {
        let editor_state = apply_set_link(
            &self.editor_state,
            &self.link_state,
            text,
            url,
            &mut self.entities,
        )?;
        self.link_editor = None;
        self.publish(editor_state);
        Ok(())
    }

    /// Edit one input of the open link form. Returns false when no form is open.
    pub fn set_link_form_field(&mut self, field: LinkField, value: &str) -> bool {
        let Some(form) = self.link_editor.as_mut() else {
            return false;
        };
        form.set(field, value);
        self.notify();
        true
    }

    pub fn set_link_form_text(&mut self, text: &str) -> bool {
        self.set_link_form_field(LinkField::Text, text)
    }

    pub fn set_link_form_url(&mut self, url: &str) -> bool {
        self.set_link_form_field(LinkField::Url, url)
    }

    /// Apply the open form. Returns false when there is nothing valid to submit.
    pub fn submit_link_form(&mut self) -> EditResult<bool> {
        let Some(form) = self.link_editor.as_ref().filter(|f| f.can_submit()) else {
            return Ok(false);
        };
        let (text, url) = (form.text().to_string(), form.url().to_string());
        self.update_link(&text, &url)?;
        Ok(true)
    }

    pub fn undo(&mut self) {
        let editor_state = self.editor_state.undo();
        self.publish(editor_state);
    }

    pub fn redo(&mut self) {
        let editor_state = self.editor_state.redo();
        self.publish(editor_state);
    }

    /// Replace the document, starting a fresh history
    pub fn load(&mut self, content: ContentState) {
        self.link_editor = None;
        let editor_state = Self::fresh_editor_state(content, &self.config);
        self.publish(editor_state);
    }

    /// Mutable access to the entity table, for loading content that brings
    /// its own entities
    pub(crate) fn entities_mut(&mut self) -> &mut EntityStore {
        &mut self.entities
    }

    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn publish(&mut self, editor_state: EditorState) {
        self.link_state = derive_link_state(&editor_state, &self.entities);
        log::debug!("link state: {:?}", self.link_state);
        self.editor_state = editor_state;
        self.notify();
    }

    fn notify(&mut self) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in listeners.iter_mut() {
            listener(self);
        }
        self.listeners = listeners;
    }
}
