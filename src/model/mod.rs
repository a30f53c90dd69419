//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the
//! application. It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (repeat mode, UI state)
//! - `track`: Track data shape delivered by the catalog
//! - `queue`: Queue advance policy (repeat/shuffle decision table)
//! - `playback`: The playback state machine and its snapshots
//! - `app_model`: Main application model with state management methods

mod types;
mod track;
mod queue;
mod playback;
mod app_model;

// Re-export all public types for convenient access
pub use types::{ActiveSection, RepeatMode, UiState};

pub use track::{ImageVariant, StreamSource, Track};

pub use queue::{advance, Advance, AdvanceTrigger};

pub use playback::{
    LoadRequest, PlaybackSnapshot, PlayerState, SeekRequest, StateChange, DEFAULT_VOLUME,
};

pub use app_model::AppModel;
