// Common content access traits so front ends (the CLI, a future GUI) can load
// and save documents without knowing how the controller stores them.

use crate::error::RawError;
use crate::link_controller::LinkController;
use crate::richtext::content_state::ContentState;
use crate::richtext::raw;

/// Provides read access to the current content in the raw interchange format.
pub trait ContentProvider {
    fn get_content(&self) -> Result<String, RawError>;
}

impl ContentProvider for LinkController {
    fn get_content(&self) -> Result<String, RawError> {
        raw::to_json(self.editor_state().current_content(), self.entities())
    }
}

/// Provides a unified way to load content into an editor.
pub trait ContentLoader {
    fn set_content_from_raw(&mut self, json: &str) -> Result<(), RawError>;
    fn set_content_from_text(&mut self, text: &str);
}

impl ContentLoader for LinkController {
    fn set_content_from_raw(&mut self, json: &str) -> Result<(), RawError> {
        let content = raw::from_json(json, self.entities_mut())?;
        self.load(content);
        Ok(())
    }

    fn set_content_from_text(&mut self, text: &str) {
        self.load(ContentState::create_from_text(text));
    }
}
