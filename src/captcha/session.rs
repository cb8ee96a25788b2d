// Captcha session state machine: banner detection -> name resolution -> marker tracking
use super::assets::TemplateAssets;
use super::config::SessionConfig;
use super::types::{AbortReason, FrameOutcome, SessionEvent, SessionState};
use crate::error::{CaptchaError, CaptchaResult};
use crate::names::{NameCatalog, ResolvedName, select_name};
use crate::ocr::{RecognizedText, TextRecognizer};
use crate::preprocess::FramePreprocessor;
use crate::template_matching::{Match, TemplateMatcher};
use crate::tracking::{MarkerTracker, TrackedPosition};
use image::RgbImage;
use image::imageops::{self, FilterType};
use std::sync::Arc;

/// One captcha session per frame stream. Frames must be fed strictly in order;
/// the session mutates its state in place.
pub struct CaptchaSession {
    config: SessionConfig,
    assets: TemplateAssets,
    catalog: NameCatalog,
    recognizer: Arc<dyn TextRecognizer>,
    preprocessor: Arc<dyn FramePreprocessor>,
    matcher: TemplateMatcher,
    state: SessionState,
    target_name: Option<ResolvedName>,
    tracker: MarkerTracker,
    // Events of the frame being processed
    events: Vec<SessionEvent>,
}

impl CaptchaSession {
    pub fn new(
        config: SessionConfig,
        assets: TemplateAssets,
        catalog: NameCatalog,
        recognizer: Arc<dyn TextRecognizer>,
        preprocessor: Arc<dyn FramePreprocessor>,
    ) -> Self {
        Self {
            config,
            assets,
            catalog,
            recognizer,
            preprocessor,
            matcher: TemplateMatcher::new(),
            state: SessionState::Idle,
            target_name: None,
            tracker: MarkerTracker::new(),
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Creature being tracked, when not `Idle`
    pub fn target_name(&self) -> Option<&ResolvedName> {
        self.target_name.as_ref()
    }

    pub fn tracked_position(&self) -> Option<TrackedPosition> {
        self.tracker.position()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Advance the state machine by one frame
    pub async fn process_frame(&mut self, frame: &RgbImage) -> FrameOutcome {
        let mut target = None;

        match self.state {
            SessionState::Idle => {
                if self.banner_present(frame) {
                    self.change_state(SessionState::ChallengeDetected);
                    match self.setup_challenge(frame).await {
                        Ok(()) => {}
                        Err(reason) => self.abort(reason),
                    }
                }
            }
            SessionState::ChallengeDetected => {
                // Setup always leaves this state on the frame that entered it
                log::warn!("⚠️ Session found mid-setup on a new frame, aborting challenge");
                self.abort(AbortReason::Reset);
            }
            SessionState::Tracking => {
                target = self.track(frame);
            }
        }

        debug_assert_eq!(
            self.tracker.position().is_some(),
            self.state != SessionState::Idle,
            "tracked position must exist exactly when a challenge is active"
        );

        FrameOutcome {
            state: self.state,
            target,
            events: std::mem::take(&mut self.events),
        }
    }

    /// Drop any active challenge (caller reset or end of stream)
    pub fn reset(&mut self) -> Vec<SessionEvent> {
        if self.state != SessionState::Idle {
            log::info!("🔄 Session reset by caller");
            self.abort(AbortReason::Reset);
        }
        std::mem::take(&mut self.events)
    }

    /// Idle check: does the top banner match clear the presence threshold?
    fn banner_present(&self, frame: &RgbImage) -> bool {
        let view = self.preprocessor.banner_view(frame);
        let best = self
            .matcher
            .find_best(&view.image, self.assets.banner(), &self.config.banner);

        match best {
            Some(m) if m.score > self.config.presence_threshold => {
                log::debug!("🚩 Banner match {m} (origin {:?})", view.origin);
                true
            }
            Some(m) => {
                log::debug!(
                    "👀 Banner best score {:.3} <= {:.3}",
                    m.score,
                    self.config.presence_threshold
                );
                false
            }
            None => false,
        }
    }

    /// ChallengeDetected: read the name, find the creature icon, seed the tracker
    async fn setup_challenge(&mut self, frame: &RgbImage) -> Result<(), AbortReason> {
        let text_view = self.ocr_input(frame);
        let hypotheses = self.recognize(text_view).await?;
        log::debug!(
            "📝 OCR hypotheses: {:?}",
            hypotheses.iter().map(|h| h.text.as_str()).collect::<Vec<_>>()
        );

        let hit = select_name(
            &hypotheses,
            &self.config.name_selection,
            &self.catalog,
            self.config.max_name_distance,
        )
        .ok_or_else(|| CaptchaError::NoConfidentName {
            text: hypotheses
                .iter()
                .map(|h| h.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        })?;
        let name = hit.name;
        log::info!(
            "🔤 Challenge asks for '{}' (read '{}', distance {})",
            name.canonical,
            hit.source.text,
            name.distance
        );

        let view = self.preprocessor.marker_view(frame);
        let creature = self.assets.creature(&name.canonical)?;
        let (dx, dy) = (view.origin.0 as i32, view.origin.1 as i32);
        let seed = self
            .matcher
            .find_best(&view.image, creature, &self.config.creature)
            .map(|m| m.translated(dx, dy))
            .ok_or_else(|| AbortReason::CreatureNotVisible {
                name: name.canonical.clone(),
            })?;

        let seed = TrackedPosition::from(&seed);
        self.tracker.seed(seed);
        self.target_name = Some(name.clone());
        self.change_state(SessionState::Tracking);
        self.events.push(SessionEvent::ChallengeStarted { name, seed });
        Ok(())
    }

    /// Tracking: re-anchor to the nearest marker when enough markers are visible
    fn track(&mut self, frame: &RgbImage) -> Option<TrackedPosition> {
        let view = self.preprocessor.marker_view(frame);
        let (dx, dy) = (view.origin.0 as i32, view.origin.1 as i32);
        let markers: Vec<Match> = self
            .matcher
            .find_with(&view.image, self.assets.marker(), &self.config.marker)
            .into_iter()
            .map(|m| m.translated(dx, dy))
            .collect();

        if markers.len() < self.config.min_marker_candidates {
            log::debug!(
                "👀 {} marker(s) visible, need {} - keeping last position",
                markers.len(),
                self.config.min_marker_candidates
            );
            return None;
        }

        let position = self.tracker.reanchor(&markers)?;
        self.events.push(SessionEvent::TargetUpdated(position));
        Some(position)
    }

    /// Text view handed to the recognizer, downscaled as configured
    fn ocr_input(&self, frame: &RgbImage) -> RgbImage {
        let view = self.preprocessor.text_view(frame);
        let scale = self.config.ocr_downscale;
        if (scale - 1.0).abs() <= f32::EPSILON {
            return view;
        }
        let width = ((view.width() as f32 * scale).round() as u32).max(1);
        let height = ((view.height() as f32 * scale).round() as u32).max(1);
        imageops::resize(&view, width, height, FilterType::Triangle)
    }

    /// Run the recognizer off the async thread, bounded by the configured timeout
    async fn recognize(&self, image: RgbImage) -> CaptchaResult<Vec<RecognizedText>> {
        let recognizer = Arc::clone(&self.recognizer);
        let duration = self.config.recognizer_timeout();
        let task = tokio::task::spawn_blocking(move || recognizer.recognize(&image));

        match tokio::time::timeout(duration, task).await {
            Ok(joined) => joined?,
            Err(_) => Err(CaptchaError::RecognizerTimeout { duration }),
        }
    }

    fn abort(&mut self, reason: AbortReason) {
        log::warn!("🛑 Challenge aborted: {:?}", reason);
        self.tracker.clear();
        self.target_name = None;
        self.events.push(SessionEvent::ChallengeAborted { reason });
        self.change_state(SessionState::Idle);
    }

    fn change_state(&mut self, new_state: SessionState) {
        if self.state == new_state {
            return;
        }
        debug_assert!(
            self.state.can_transition_to(new_state),
            "illegal session transition {:?} -> {:?}",
            self.state,
            new_state
        );
        log::info!("🎮 Captcha session state: {:?} -> {:?}", self.state, new_state);
        self.state = new_state;
        self.events.push(SessionEvent::StateChanged(new_state));
    }
}
