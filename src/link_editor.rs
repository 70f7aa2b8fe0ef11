use crate::link_state::LinkState;
use crate::richtext::content_state::ContentState;
use crate::richtext::entity::EntityStore;

/// Options to configure the link editor form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkEditOptions {
    /// Initial link text to show in the form.
    pub init_text: String,
    /// Initial link target (URL) to show in the form.
    pub init_url: String,
    /// When editing an existing link. Enables the Remove button and labels
    /// the submit button "Update link".
    pub mode_existing_link: bool,
}

impl LinkEditOptions {
    /// Pre-populate from the link state: the link's text and URL when the
    /// selection is inside a link, otherwise the selected text and no URL.
    /// Returns `None` when link actions are disabled.
    pub fn from_link_state(
        link_state: &LinkState,
        content: &ContentState,
        entities: &EntityStore,
    ) -> Option<Self> {
        let block = content.block_for_key(link_state.block_key()?)?;
        let (start, end) = link_state.target_range()?;
        let existing = link_state.existing_link();
        let init_url = existing
            .and_then(|link| entities.get(link.entity_key))
            .and_then(|entity| entity.url())
            .unwrap_or_default()
            .to_string();

        Some(LinkEditOptions {
            init_text: block.slice(start, end),
            init_url,
            mode_existing_link: existing.is_some(),
        })
    }
}

/// Which input of the form is edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkField {
    Text,
    Url,
}

/// State of the inline link editing form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEditorForm {
    opts: LinkEditOptions,
    text: String,
    url: String,
}

impl LinkEditorForm {
    pub fn new(opts: LinkEditOptions) -> Self {
        LinkEditorForm {
            text: opts.init_text.clone(),
            url: opts.init_url.clone(),
            opts,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn initial(&self) -> &LinkEditOptions {
        &self.opts
    }

    pub fn set(&mut self, field: LinkField, value: impl Into<String>) {
        match field {
            LinkField::Text => self.text = value.into(),
            LinkField::Url => self.url = value.into(),
        }
    }

    /// Both inputs filled in, and at least one of them changed
    pub fn can_submit(&self) -> bool {
        let unchanged = self.text == self.opts.init_text && self.url == self.opts.init_url;
        !self.text.is_empty() && !self.url.is_empty() && !unchanged
    }

    pub fn can_remove(&self) -> bool {
        self.opts.mode_existing_link
    }

    pub fn submit_label(&self) -> &'static str {
        if self.opts.mode_existing_link {
            "Update link"
        } else {
            "Add link"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::content_state::BlockKey;
    use crate::richtext::entity::Entity;
    use crate::richtext::modifier;
    use crate::richtext::selection::SelectionState;
    use crate::link_state::ExistingLink;

    #[test]
    fn test_new_link_form() {
        let content = ContentState::create_from_text("Visit site today");
        let link_state = LinkState::NoLink {
            block_key: BlockKey::from("b0"),
            sel_start: 6,
            sel_end: 10,
        };
        let opts =
            LinkEditOptions::from_link_state(&link_state, &content, &EntityStore::new()).unwrap();
        let mut form = LinkEditorForm::new(opts);

        assert_eq!(form.text(), "site");
        assert_eq!(form.url(), "");
        assert_eq!(form.submit_label(), "Add link");
        assert!(!form.can_remove());
        assert!(!form.can_submit());

        form.set(LinkField::Url, "http://site");
        assert!(form.can_submit());

        form.set(LinkField::Text, "");
        assert!(!form.can_submit());
    }

    #[test]
    fn test_existing_link_form() {
        let mut store = EntityStore::new();
        let key = store.add(Entity::link("http://site"));
        let content = ContentState::create_from_text("Visit site today");
        let content = modifier::apply_entity(
            &content,
            &SelectionState::range(BlockKey::from("b0"), 6, 10),
            Some(key),
        )
        .unwrap();
        let link_state = LinkState::ExistingLink(ExistingLink {
            entity_key: key,
            block_key: BlockKey::from("b0"),
            link_start: 6,
            link_end: 10,
            sel_start: 7,
            sel_end: 7,
        });

        let opts = LinkEditOptions::from_link_state(&link_state, &content, &store).unwrap();
        let mut form = LinkEditorForm::new(opts);

        assert_eq!(form.text(), "site");
        assert_eq!(form.url(), "http://site");
        assert_eq!(form.submit_label(), "Update link");
        assert!(form.can_remove());
        // Nothing changed yet
        assert!(!form.can_submit());

        form.set(LinkField::Url, "http://other");
        assert!(form.can_submit());
        form.set(LinkField::Url, "http://site");
        assert!(!form.can_submit());
    }

    #[test]
    fn test_disabled_has_no_form() {
        let content = ContentState::create_from_text("x");
        assert!(
            LinkEditOptions::from_link_state(&LinkState::Disabled, &content, &EntityStore::new())
                .is_none()
        );
    }
}
