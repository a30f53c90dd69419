//! Audio output engine
//!
//! The one underlying audio resource: a dedicated thread owning the rodio
//! output stream and at most one sink at a time. The controller drives it
//! over a command channel; the engine reports what actually happened over
//! an event channel. Every command that (re)positions a stream carries the
//! generation of the player state that issued it, and every event echoes
//! the generation it belongs to, so stale callbacks can be discarded.

use std::io::Cursor;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::error::PlaybackError;

const TICK: Duration = Duration::from_millis(200);
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub(crate) enum OutputCommand {
    Load { url: String, generation: u64, volume: f32 },
    Resume,
    Pause,
    Stop,
    Seek { seconds: f64, generation: u64 },
    SetVolume(f32),
    Shutdown,
}

/// Asynchronous reports from the engine thread
#[derive(Clone, Debug)]
pub enum OutputEvent {
    /// Stream metadata decoded; this duration is authoritative
    DurationKnown { generation: u64, seconds: f64 },
    /// Periodic playhead position
    Position { generation: u64, seconds: f64 },
    /// The loaded stream played to completion (emitted once per load)
    Ended { generation: u64 },
    /// The stream could not be fetched, decoded, or started
    Failed { generation: u64, reason: String },
}

/// Handle to the engine thread. Dropping it shuts the engine down.
pub struct AudioOutput {
    cmd_tx: Sender<OutputCommand>,
}

impl AudioOutput {
    /// Start the engine thread. Output device problems are reported as
    /// `Failed` events rather than panics, since the device may appear or
    /// vanish while the application runs.
    pub fn spawn() -> Result<(Self, UnboundedReceiver<OutputEvent>), PlaybackError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = unbounded_channel();

        thread::Builder::new()
            .name("audio-engine".into())
            .spawn(move || match Engine::new(event_tx.clone()) {
                Ok(mut engine) => engine.run(cmd_rx),
                Err(e) => {
                    tracing::error!(error = %e, "Audio output unavailable");
                    let _ = event_tx.send(OutputEvent::Failed {
                        generation: 0,
                        reason: e.to_string(),
                    });
                }
            })
            .map_err(|e| PlaybackError::AudioOutput(e.to_string()))?;

        Ok((Self { cmd_tx }, event_rx))
    }

    pub fn load(&self, url: String, generation: u64, volume: f32) {
        self.send(OutputCommand::Load { url, generation, volume });
    }

    pub fn resume(&self) {
        self.send(OutputCommand::Resume);
    }

    pub fn pause(&self) {
        self.send(OutputCommand::Pause);
    }

    pub fn stop(&self) {
        self.send(OutputCommand::Stop);
    }

    pub fn seek(&self, seconds: f64, generation: u64) {
        self.send(OutputCommand::Seek { seconds, generation });
    }

    pub fn set_volume(&self, volume: f32) {
        self.send(OutputCommand::SetVolume(volume));
    }

    fn send(&self, cmd: OutputCommand) {
        // The engine going away mid-shutdown is not actionable here
        let _ = self.cmd_tx.send(cmd);
    }
}

#[cfg(test)]
impl AudioOutput {
    /// Handle wired to a bare channel instead of an engine thread, so
    /// tests can observe the commands an operation produces.
    pub(crate) fn detached() -> (Self, Receiver<OutputCommand>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        (Self { cmd_tx }, cmd_rx)
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(OutputCommand::Shutdown);
    }
}

struct Engine {
    // Keep alive for the lifetime of the engine
    stream: OutputStream,
    sink: Option<Sink>,
    http: reqwest::blocking::Client,
    event_tx: UnboundedSender<OutputEvent>,
    /// Generation of the most recent load/seek command
    generation: u64,
    volume: f32,
    ended_emitted: bool,
}

impl Engine {
    fn new(event_tx: UnboundedSender<OutputEvent>) -> Result<Self, PlaybackError> {
        let stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlaybackError::AudioOutput(e.to_string()))?;
        let http = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| PlaybackError::AudioOutput(e.to_string()))?;

        Ok(Self {
            stream,
            sink: None,
            http,
            event_tx,
            generation: 0,
            volume: 1.0,
            ended_emitted: false,
        })
    }

    fn run(&mut self, cmd_rx: Receiver<OutputCommand>) {
        tracing::info!("Audio engine started");
        loop {
            match cmd_rx.recv_timeout(TICK) {
                Ok(cmd) => {
                    if self.handle_command(cmd) {
                        break;
                    }
                    // Drain anything queued behind the first command so a
                    // burst of user input settles before the next tick
                    while let Ok(cmd) = cmd_rx.try_recv() {
                        if self.handle_command(cmd) {
                            return;
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            self.tick();
        }
        self.drop_sink();
        tracing::info!("Audio engine stopped");
    }

    /// Returns true on shutdown.
    fn handle_command(&mut self, cmd: OutputCommand) -> bool {
        match cmd {
            OutputCommand::Load { url, generation, volume } => {
                self.generation = generation;
                self.volume = volume;
                if let Err(reason) = self.start_stream(&url) {
                    tracing::error!(generation, %reason, "Stream load failed");
                    self.drop_sink();
                    let _ = self.event_tx.send(OutputEvent::Failed { generation, reason });
                }
            }
            OutputCommand::Resume => {
                if let Some(sink) = &self.sink {
                    sink.play();
                }
            }
            OutputCommand::Pause => {
                if let Some(sink) = &self.sink {
                    sink.pause();
                }
            }
            OutputCommand::Stop => {
                self.drop_sink();
            }
            OutputCommand::Seek { seconds, generation } => {
                self.generation = generation;
                if let Some(sink) = &self.sink {
                    if let Err(e) = sink.try_seek(Duration::from_secs_f64(seconds)) {
                        tracing::warn!(seconds, error = %e, "Seek not supported for this stream");
                    }
                }
            }
            OutputCommand::SetVolume(volume) => {
                self.volume = volume;
                if let Some(sink) = &self.sink {
                    sink.set_volume(volume);
                }
            }
            OutputCommand::Shutdown => return true,
        }
        false
    }

    fn tick(&mut self) {
        let (empty, position) = match &self.sink {
            Some(sink) => (sink.empty(), sink.get_pos()),
            None => return,
        };

        if empty {
            if !self.ended_emitted {
                self.ended_emitted = true;
                tracing::debug!(generation = self.generation, "Stream played to completion");
                let _ = self.event_tx.send(OutputEvent::Ended { generation: self.generation });
                self.drop_sink();
            }
            return;
        }

        let _ = self.event_tx.send(OutputEvent::Position {
            generation: self.generation,
            seconds: position.as_secs_f64(),
        });
    }

    /// Fetch the stream and start it from time 0, replacing any previous
    /// sink. Fetching happens on this thread; a new Load command simply
    /// supersedes the result via its higher generation.
    fn start_stream(&mut self, url: &str) -> Result<(), String> {
        self.drop_sink();

        tracing::debug!(url, generation = self.generation, "Fetching stream");
        let bytes = self
            .http
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.bytes())
            .map_err(|e| e.to_string())?
            .to_vec();

        let decoder = Decoder::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
        if let Some(duration) = decoder.total_duration() {
            let _ = self.event_tx.send(OutputEvent::DurationKnown {
                generation: self.generation,
                seconds: duration.as_secs_f64(),
            });
        }

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(decoder);
        sink.play();

        self.sink = Some(sink);
        self.ended_emitted = false;
        Ok(())
    }

    fn drop_sink(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.ended_emitted = false;
    }
}
