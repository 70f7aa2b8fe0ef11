use crate::error::ConfigError;
use crate::richtext::editor_state::DEFAULT_UNDO_LIMIT;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "Linkpad";
const APPLICATION: &str = "linkpad";
const CONFIG_FILE_NAME: &str = "linkpad.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Heading shown above the editor
    pub title: String,
    /// Shown while the document has no text
    pub placeholder: String,
    /// Paragraph rendered before the editor
    pub intro: String,
    /// Text the editor starts with, one block per line
    pub initial_text: String,
    pub undo_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            title: "Our amazing editor WITH LINKS OMG!".to_string(),
            placeholder: "Enter some text...".to_string(),
            intro: "Try out the link functionality: select some text, or none, \
                    and press Link. Note the behaviour around existing links too!"
                .to_string(),
            initial_text: String::new(),
            undo_limit: DEFAULT_UNDO_LIMIT,
        }
    }
}

pub fn config_file_path() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Load the configuration at `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<EditorConfig, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(EditorConfig::default()),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            });
        }
    };
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Load the configuration from the default location, falling back to the
/// defaults when it cannot be read.
pub fn load_default_config() -> EditorConfig {
    let Some(path) = config_file_path() else {
        return EditorConfig::default();
    };
    match load_config(&path) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("{err}; using default settings");
            EditorConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EditorConfig = toml::from_str(
            r#"
            title = "Links!"
            undo_limit = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.title, "Links!");
        assert_eq!(config.undo_limit, 5);
        assert_eq!(config.placeholder, "Enter some text...");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("linkpad-does-not-exist.toml");
        assert_eq!(load_config(&path).unwrap(), EditorConfig::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("linkpad-bad-{}.toml", std::process::id()));
        fs::write(&path, "title = [").unwrap();
        let err = load_config(&path).unwrap_err();
        let _ = fs::remove_file(&path);
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
