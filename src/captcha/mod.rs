// Captcha module
// This module sequences banner detection, name resolution and marker
// tracking across a stream of frames.

pub mod assets;
pub mod config;
pub mod runner;
pub mod session;
pub mod types;


// Re-export the main types and functions for easy access
pub use assets::{TemplateAssets, load_template};
pub use config::SessionConfig;
pub use runner::{
    DEFAULT_CHANNEL_CAPACITY, RunSummary, RunnerChannels, SessionHandle, SessionRunner,
    create_session_channels,
};
pub use session::CaptchaSession;
pub use types::{AbortReason, FrameOutcome, SessionCommand, SessionEvent, SessionState};
