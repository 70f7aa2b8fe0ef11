// Library exports for linkpad

pub mod config;
pub mod content;
pub mod error;
pub mod html;
pub mod link_controller;
pub mod link_editor;
pub mod link_state;
pub mod richtext;
