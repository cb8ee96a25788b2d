// Drives a captcha session over a frame source, one frame at a time
use super::session::CaptchaSession;
use super::types::{SessionCommand, SessionEvent};
use crate::capture::FrameSource;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Default bound of both runner channels
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// Caller side of a runner: send commands, receive events
#[derive(Debug)]
pub struct SessionHandle {
    pub commands: mpsc::Sender<SessionCommand>,
    pub events: mpsc::Receiver<SessionEvent>,
}

/// Runner side of the same channels, consumed by [`SessionRunner::new`]
#[derive(Debug)]
pub struct RunnerChannels {
    command_rx: mpsc::Receiver<SessionCommand>,
    event_tx: mpsc::Sender<SessionEvent>,
}

/// Create the command and event channels, each bounded to `capacity` (at least 1).
/// The runner blocks on a full event channel, so the caller must keep draining.
pub fn create_session_channels(capacity: usize) -> (SessionHandle, RunnerChannels) {
    let capacity = capacity.max(1);
    let (command_tx, command_rx) = mpsc::channel(capacity);
    let (event_tx, event_rx) = mpsc::channel(capacity);
    (
        SessionHandle {
            commands: command_tx,
            events: event_rx,
        },
        RunnerChannels {
            command_rx,
            event_tx,
        },
    )
}

/// Totals for one run, returned when the loop exits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub frame_errors: u64,
    pub challenges: u64,
    pub aborts: u64,
    pub targets: u64,
}

impl RunSummary {
    fn record(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::ChallengeStarted { .. } => self.challenges += 1,
            SessionEvent::ChallengeAborted { .. } => self.aborts += 1,
            SessionEvent::TargetUpdated(_) => self.targets += 1,
            _ => {}
        }
    }
}

pub struct SessionRunner<S: FrameSource> {
    session: CaptchaSession,
    source: S,
    command_rx: mpsc::Receiver<SessionCommand>,
    event_tx: mpsc::Sender<SessionEvent>,
    summary: RunSummary,
}

impl<S: FrameSource> SessionRunner<S> {
    pub fn new(session: CaptchaSession, source: S, channels: RunnerChannels) -> Self {
        Self {
            session,
            source,
            command_rx: channels.command_rx,
            event_tx: channels.event_tx,
            summary: RunSummary::default(),
        }
    }

    pub fn session(&self) -> &CaptchaSession {
        &self.session
    }

    /// Process frames until the source ends or a shutdown arrives.
    /// Either way the session is reset to `Idle` before returning.
    pub async fn run(&mut self) -> RunSummary {
        log::info!("🎮 Captcha session loop started");

        loop {
            // Commands are checked between frames, never mid-frame
            let mut shutdown = false;
            while let Ok(command) = self.command_rx.try_recv() {
                log::debug!("📨 Processing session command: {:?}", command);
                match command {
                    SessionCommand::Reset => {
                        let events = self.session.reset();
                        self.forward(events).await;
                    }
                    SessionCommand::Shutdown => shutdown = true,
                }
            }
            if shutdown {
                log::info!("🛑 Captcha session shutting down");
                break;
            }

            let frame = match self.source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    log::info!("🏁 Frame stream ended after {} frame(s)", self.summary.frames);
                    break;
                }
                Err(e) => {
                    log::warn!("⚠️ Skipping unreadable frame: {e}");
                    self.summary.frame_errors += 1;
                    continue;
                }
            };

            let started = Instant::now();
            let outcome = self.session.process_frame(&frame.image).await;
            self.summary.frames += 1;
            self.forward(outcome.events).await;

            let duration_ms = started.elapsed().as_millis();
            log::debug!(
                "⏱️ Frame #{} processed in {}ms (state {:?})",
                frame.index,
                duration_ms,
                outcome.state
            );
            self.forward(vec![SessionEvent::FrameProcessed {
                index: frame.index,
                duration_ms,
            }])
            .await;
        }

        // End of stream and shutdown both act as an external reset
        let events = self.session.reset();
        self.forward(events).await;
        self.summary.clone()
    }

    async fn forward(&mut self, events: Vec<SessionEvent>) {
        for event in events {
            self.summary.record(&event);
            let _ = self.event_tx.send(event).await;
        }
    }
}
