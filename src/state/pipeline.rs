//! Capture-to-result pipeline state
//!
//! The pipeline is the single owner of "what image is selected, is it being
//! analyzed, and what came back". The shell only changes it through
//! `submit`, `complete`, `retry` and `reset`.

use tracing::{debug, error, info};

use super::data::{DetectionResult, EncodedImage};

/// Identifies one submission. Completions carrying an older generation are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

/// Everything the shell needs to launch the network call for a submission
#[derive(Debug, Clone)]
pub struct Submission {
    pub generation: Generation,
    pub image: EncodedImage,
}

/// The authoritative pipeline state
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PipelineState {
    /// Nothing selected, image sources are available
    #[default]
    Idle,
    /// Request in flight for `image`
    Analyzing { image: EncodedImage },
    /// The service answered
    Complete {
        image: EncodedImage,
        result: DetectionResult,
    },
    /// The request failed; `reason` is shown to the user
    Failed { image: EncodedImage, reason: String },
}

impl PipelineState {
    /// The currently selected image, if any
    pub fn selected_image(&self) -> Option<&EncodedImage> {
        match self {
            PipelineState::Idle => None,
            PipelineState::Analyzing { image }
            | PipelineState::Complete { image, .. }
            | PipelineState::Failed { image, .. } => Some(image),
        }
    }

    /// The latest result, only present once analysis has finished successfully
    pub fn result(&self) -> Option<&DetectionResult> {
        match self {
            PipelineState::Complete { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self, PipelineState::Analyzing { .. })
    }

    /// Failure reason of the last submission
    pub fn failure(&self) -> Option<&str> {
        match self {
            PipelineState::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Owns `PipelineState` and the generation counter
#[derive(Debug, Default)]
pub struct Pipeline {
    state: PipelineState,
    /// Last generation handed out
    generation: u64,
    /// Generation whose completion is still awaited
    outstanding: Option<Generation>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Select `image` and start analyzing it.
    ///
    /// Any previous result is dropped before the caller issues the request,
    /// so the UI never shows a stale verdict next to a new image.
    pub fn submit(&mut self, image: EncodedImage) -> Submission {
        let generation = self.next_generation();
        self.outstanding = Some(generation);
        self.state = PipelineState::Analyzing {
            image: image.clone(),
        };

        info!("🔬 Submitting {} for analysis ({:?})", image.media_type(), generation);

        Submission { generation, image }
    }

    /// Resubmit the selected image after a failure
    pub fn retry(&mut self) -> Option<Submission> {
        match &self.state {
            PipelineState::Failed { image, .. } => {
                let image = image.clone();
                Some(self.submit(image))
            }
            _ => None,
        }
    }

    /// Apply the outcome of a submission.
    ///
    /// Returns `false` when the outcome belongs to a submission that was
    /// reset or superseded; state is left untouched in that case.
    pub fn complete(
        &mut self,
        generation: Generation,
        outcome: Result<DetectionResult, String>,
    ) -> bool {
        if self.outstanding != Some(generation) {
            debug!("Discarding stale analysis response ({:?})", generation);
            return false;
        }
        self.outstanding = None;

        let image = match std::mem::take(&mut self.state) {
            PipelineState::Analyzing { image } => image,
            other => {
                // outstanding is only set while analyzing
                self.state = other;
                return false;
            }
        };

        self.state = match outcome {
            Ok(result) => {
                info!(
                    "✅ Analysis complete: cataract={} confidence={:.1}",
                    result.has_cataract, result.confidence
                );
                PipelineState::Complete { image, result }
            }
            Err(reason) => {
                error!("❌ Error analyzing image: {}", reason);
                PipelineState::Failed { image, reason }
            }
        };

        true
    }

    /// Back to the initial state. Any outstanding submission becomes stale.
    pub fn reset(&mut self) {
        if self.outstanding.take().is_some() {
            debug!("Reset while a request was in flight, its response will be ignored");
        }
        self.state = PipelineState::Idle;
    }

    fn next_generation(&mut self) -> Generation {
        self.generation += 1;
        Generation(self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_image() -> EncodedImage {
        EncodedImage::from_bytes("image/jpeg", &[0xFF, 0xD8, 0xFF, 0xD9])
    }

    #[test]
    fn test_initial_state_is_idle() {
        let pipeline = Pipeline::new();
        let state = pipeline.state();
        assert!(state.selected_image().is_none());
        assert!(state.result().is_none());
        assert!(!state.is_analyzing());
    }

    #[test]
    fn test_submit_enters_analyzing_immediately() {
        let mut pipeline = Pipeline::new();
        let image = sample_image();

        let submission = pipeline.submit(image.clone());

        assert_eq!(submission.image, image);
        let state = pipeline.state();
        assert_eq!(state.selected_image(), Some(&image));
        assert!(state.result().is_none());
        assert!(state.is_analyzing());
    }

    #[test]
    fn test_submit_discards_previous_result() {
        let mut pipeline = Pipeline::new();
        let first = pipeline.submit(sample_image());
        pipeline.complete(first.generation, Ok(DetectionResult::new(true, 95.0)));
        assert!(pipeline.state().result().is_some());

        let other = EncodedImage::from_bytes("image/png", &[0x89, 0x50]);
        pipeline.submit(other.clone());

        assert!(pipeline.state().result().is_none());
        assert!(pipeline.state().is_analyzing());
        assert_eq!(pipeline.state().selected_image(), Some(&other));
    }

    #[test]
    fn test_successful_completion() {
        let mut pipeline = Pipeline::new();
        let image = sample_image();
        let submission = pipeline.submit(image.clone());

        let result = DetectionResult::new(true, 95.0);
        assert!(pipeline.complete(submission.generation, Ok(result.clone())));

        let state = pipeline.state();
        assert!(!state.is_analyzing());
        assert_eq!(state.result(), Some(&result));
        assert_eq!(state.selected_image(), Some(&image));
    }

    #[test]
    fn test_failure_keeps_image_without_result() {
        let mut pipeline = Pipeline::new();
        let image = sample_image();
        let submission = pipeline.submit(image.clone());

        let reason = "analysis service returned 500 Internal Server Error".to_string();
        assert!(pipeline.complete(submission.generation, Err(reason.clone())));

        let state = pipeline.state();
        assert!(!state.is_analyzing());
        assert!(state.result().is_none());
        assert_eq!(state.selected_image(), Some(&image));
        assert_eq!(state.failure(), Some(reason.as_str()));
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut pipeline = Pipeline::new();
        pipeline.reset();
        assert_eq!(pipeline.state(), &PipelineState::Idle);

        pipeline.submit(sample_image());
        pipeline.reset();
        assert_eq!(pipeline.state(), &PipelineState::Idle);

        let submission = pipeline.submit(sample_image());
        pipeline.complete(submission.generation, Ok(DetectionResult::new(false, 60.0)));
        pipeline.reset();
        assert_eq!(pipeline.state(), &PipelineState::Idle);

        let submission = pipeline.submit(sample_image());
        pipeline.complete(submission.generation, Err("offline".to_string()));
        pipeline.reset();
        assert_eq!(pipeline.state(), &PipelineState::Idle);
    }

    #[test]
    fn test_late_response_after_reset_is_ignored() {
        let mut pipeline = Pipeline::new();
        let submission = pipeline.submit(sample_image());
        pipeline.reset();

        let applied = pipeline.complete(submission.generation, Ok(DetectionResult::new(true, 95.0)));

        assert!(!applied);
        assert_eq!(pipeline.state(), &PipelineState::Idle);
    }

    #[test]
    fn test_superseded_response_is_ignored() {
        let mut pipeline = Pipeline::new();
        let first = pipeline.submit(sample_image());
        let second_image = EncodedImage::from_bytes("image/png", &[0x89, 0x50]);
        let second = pipeline.submit(second_image.clone());

        assert!(!pipeline.complete(first.generation, Ok(DetectionResult::new(true, 95.0))));
        assert!(pipeline.state().is_analyzing());

        assert!(pipeline.complete(second.generation, Ok(DetectionResult::new(false, 10.0))));
        assert_eq!(pipeline.state().selected_image(), Some(&second_image));
        assert_eq!(pipeline.state().result().map(|r| r.has_cataract), Some(false));
    }

    #[test]
    fn test_duplicate_completion_is_ignored() {
        let mut pipeline = Pipeline::new();
        let submission = pipeline.submit(sample_image());
        assert!(pipeline.complete(submission.generation, Err("timeout".to_string())));
        assert!(!pipeline.complete(submission.generation, Ok(DetectionResult::new(true, 99.0))));
        assert_eq!(pipeline.state().failure(), Some("timeout"));
    }

    #[test]
    fn test_retry_only_after_failure() {
        let mut pipeline = Pipeline::new();
        assert!(pipeline.retry().is_none());

        let image = sample_image();
        let first = pipeline.submit(image.clone());
        assert!(pipeline.retry().is_none());

        pipeline.complete(first.generation, Err("connection refused".to_string()));
        let second = pipeline.retry().expect("retry after failure");

        assert!(second.generation > first.generation);
        assert_eq!(second.image, image);
        assert!(pipeline.state().is_analyzing());
    }
}
