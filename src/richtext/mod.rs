pub mod content_state;
pub mod decorator;
pub mod editor_state;
pub mod entity;
pub mod modifier;
pub mod raw;
pub mod selection;
