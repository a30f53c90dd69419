//! Listener for asynchronous audio output events
//!
//! Events race with user-initiated operations; the model discards any
//! event whose generation no longer matches, so a play or seek issued
//! after a callback was queued but before it fired always wins.

use tokio::sync::mpsc::UnboundedReceiver;

use crate::audio::OutputEvent;
use crate::error::PlaybackError;

use super::AppController;

impl AppController {
    pub fn start_output_event_listener(&self, mut events: UnboundedReceiver<OutputEvent>) {
        let controller = self.clone();
        tracing::info!("Starting audio output event listener");

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if controller.model.should_quit().await {
                    tracing::debug!("Output event listener shutting down");
                    break;
                }

                match event {
                    OutputEvent::Position { generation, seconds } => {
                        tracing::trace!(generation, seconds, "OutputEvent::Position");
                        controller.model.apply_position(generation, seconds).await;
                    }
                    OutputEvent::DurationKnown { generation, seconds } => {
                        tracing::debug!(generation, seconds, "OutputEvent::DurationKnown");
                        controller.model.apply_duration(generation, seconds).await;
                    }
                    OutputEvent::Ended { generation } => {
                        tracing::debug!(generation, "OutputEvent::Ended");
                        match controller.model.apply_ended(generation).await {
                            Ok(change) => controller.apply_change(change),
                            Err(e) => {
                                // Auto-advance hit an unplayable track
                                controller.halt_with_error(e).await;
                            }
                        }
                    }
                    OutputEvent::Failed { generation, reason } => {
                        if controller.model.apply_failed(generation).await {
                            tracing::error!(generation, %reason, "Stream failed");
                            let message =
                                PlaybackError::StreamFailed(reason).to_string();
                            controller.model.set_error(message).await;
                        } else {
                            tracing::debug!(generation, %reason, "Ignoring failure of a superseded stream");
                        }
                    }
                }
            }
        });
    }
}
