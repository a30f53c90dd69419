//! Error types for the playback engine

use thiserror::Error;

/// Failures surfaced by playback operations.
///
/// All of these are user-visible; the UI shows them as a dismissible
/// notice and decides whether to offer a retry. The engine itself never
/// retries.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The track carries no playable stream URL
    #[error("No audio available for \"{0}\"")]
    NoStreamAvailable(String),

    /// The stream failed to load, decode, or play
    #[error("Playback failed: {0}")]
    StreamFailed(String),

    /// Audio output device errors
    #[error("Audio output error: {0}")]
    AudioOutput(String),
}
