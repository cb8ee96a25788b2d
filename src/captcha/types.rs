// Types and enums for the captcha session
use crate::error::CaptchaError;
use crate::names::ResolvedName;
use crate::tracking::TrackedPosition;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    /// Setup phase; entered and left on the frame that showed the banner
    ChallengeDetected,
    Tracking,
}

impl SessionState {
    /// Edges of the session state machine
    pub fn can_transition_to(self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (SessionState::Idle, SessionState::ChallengeDetected)
                | (SessionState::ChallengeDetected, SessionState::Tracking)
                | (SessionState::ChallengeDetected, SessionState::Idle)
                | (SessionState::Tracking, SessionState::Idle)
        )
    }
}

/// Why a challenge was dropped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AbortReason {
    /// OCR text did not resolve to a catalog name
    NoConfidentName { text: String },
    /// The recognizer raised or timed out; handled like `NoConfidentName`
    RecognizerFailure { description: String },
    /// Per-creature template missing or unreadable
    AssetNotFound { path: PathBuf },
    /// Template present but unusable
    InvalidAsset { description: String },
    /// The creature icon was not found on the setup frame
    CreatureNotVisible { name: String },
    /// Caller reset or end of the frame stream
    Reset,
}

impl From<CaptchaError> for AbortReason {
    fn from(error: CaptchaError) -> Self {
        if !error.is_session_abort() {
            log::warn!("⚠️ Unexpected error while setting up a challenge: {error}");
        }
        match error {
            CaptchaError::NoConfidentName { text } => AbortReason::NoConfidentName { text },
            CaptchaError::AssetNotFound { path } => AbortReason::AssetNotFound { path },
            CaptchaError::AssetDecode { path, source } => AbortReason::InvalidAsset {
                description: format!("{}: {source}", path.display()),
            },
            CaptchaError::InvalidTemplate { name, reason } => AbortReason::InvalidAsset {
                description: format!("{name}: {reason}"),
            },
            other if other.is_name_failure() => AbortReason::RecognizerFailure {
                description: other.to_string(),
            },
            // I/O while reading a creature file
            other => AbortReason::InvalidAsset {
                description: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SessionEvent {
    StateChanged(SessionState),
    ChallengeStarted {
        name: ResolvedName,
        seed: TrackedPosition,
    },
    /// Current best click target
    TargetUpdated(TrackedPosition),
    ChallengeAborted {
        reason: AbortReason,
    },
    /// Emitted by the runner after every frame
    FrameProcessed {
        index: u64,
        duration_ms: u128,
    },
}

#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Drop the active challenge and return to `Idle`
    Reset,
    Shutdown,
}

/// Result of feeding one frame to the session
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    /// State after the frame
    pub state: SessionState,
    /// Click target emitted on this frame, if any
    pub target: Option<TrackedPosition>,
    pub events: Vec<SessionEvent>,
}

impl FrameOutcome {
    pub fn entered(&self, state: SessionState) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, SessionEvent::StateChanged(s) if *s == state))
    }

    pub fn abort_reason(&self) -> Option<&AbortReason> {
        self.events.iter().find_map(|e| match e {
            SessionEvent::ChallengeAborted { reason } => Some(reason),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_abort_reason_from_error() {
        let reason = AbortReason::from(CaptchaError::RecognizerTimeout {
            duration: Duration::from_secs(5),
        });
        assert!(matches!(reason, AbortReason::RecognizerFailure { .. }));

        let reason = AbortReason::from(CaptchaError::NoConfidentName { text: "xyz".into() });
        assert_eq!(reason, AbortReason::NoConfidentName { text: "xyz".into() });

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let reason = AbortReason::from(CaptchaError::from(io));
        assert!(matches!(reason, AbortReason::InvalidAsset { .. }));
    }
}
