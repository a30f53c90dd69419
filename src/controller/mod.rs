//! Controller module - Application logic and event handling
//!
//! The controller is the only writer of playback state. It is organized
//! into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `transport`: Transport operations (play, seek, volume, repeat, ...)
//! - `output_events`: Listener for asynchronous audio output events

mod input;
mod transport;
mod output_events;

use std::sync::Arc;

use crate::audio::AudioOutput;
use crate::error::PlaybackError;
use crate::model::{AppModel, StateChange};
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<AppModel>,
    pub(crate) output: Arc<AudioOutput>,
    pub(crate) session: SessionStore,
}

impl AppController {
    pub fn new(model: Arc<AppModel>, output: Arc<AudioOutput>, session: SessionStore) -> Self {
        Self { model, output, session }
    }

    /// Drop the persisted session. The top bar updates through the auth
    /// change bus rather than directly.
    pub async fn sign_out(&self) {
        if let Err(e) = self.session.logout() {
            tracing::warn!(error = %e, "Sign-out failed");
            self.model.set_error(format!("Sign-out failed: {}", e)).await;
        }
    }

    /// An advance rolled the model back to not-playing; the output must
    /// halt with it so the previous stream does not keep sounding.
    pub(crate) async fn halt_with_error(&self, error: PlaybackError) {
        self.output.stop();
        self.model.set_error(error.to_string()).await;
    }

    /// Carry a synchronous state transition over to the audio output.
    pub(crate) fn apply_change(&self, change: StateChange) {
        match change {
            StateChange::Load(req) => {
                tracing::info!(generation = req.generation, "Loading stream");
                self.output.load(req.url, req.generation, req.volume);
            }
            StateChange::Seek(req) => self.output.seek(req.seconds, req.generation),
            StateChange::Resume => self.output.resume(),
            StateChange::Pause => self.output.pause(),
            StateChange::Stopped => self.output.stop(),
            StateChange::None => {}
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::mpsc::Receiver;
    use std::sync::Arc;

    use crate::audio::{AudioOutput, OutputCommand};
    use crate::bus::AuthEventBus;
    use crate::model::{AppModel, StreamSource, Track};
    use crate::session::SessionStore;

    use super::AppController;

    pub(crate) fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            name: format!("Track {}", id),
            artists: vec!["Artist".into()],
            images: vec![],
            streams: vec![StreamSource {
                quality: "320kbps".into(),
                url: format!("https://cdn/{}", id),
            }],
            duration: Some(200.0),
        }
    }

    pub(crate) fn silent_track(id: &str) -> Track {
        Track { streams: vec![], ..track(id) }
    }

    /// Controller over a detached output so tests can read the command
    /// stream an operation produces.
    pub(crate) fn harness() -> (AppController, Arc<AppModel>, Receiver<OutputCommand>) {
        let (output, commands) = AudioOutput::detached();
        let model = Arc::new(AppModel::new());
        let store = SessionStore::new(
            std::env::temp_dir().join(format!("serenity-controller-{}.json", std::process::id())),
            AuthEventBus::new(),
        );
        let controller = AppController::new(model.clone(), Arc::new(output), store);
        (controller, model, commands)
    }
}
