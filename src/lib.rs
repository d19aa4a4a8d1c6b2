//! Strongroom library - staged vault-door unlock with procedural sound

pub mod audio;
pub mod cli;
pub mod error;
pub mod media;
pub mod params;
pub mod particles;
pub mod session;
pub mod stage;
pub mod timeline;
pub mod view;
