//! patchfit: point selection on a patch grid and circle/ellipse fitting
//! (sans-IO).
//!
//! A canvas is divided into square patches. Patches are toggled into a
//! selection (or picked as a click pair) and one of three fitters turns
//! them into a shape:
//!
//! - two-point radius circle, with pixel-level boundary diagnostics
//! - centroid mean-radius circle
//! - direct least-squares ellipse
//!
//! The [`Session`] owns all state and renders frames as [`RgbImage`]s.
//! This crate has **no I/O dependencies**: event scripts, PNG output and
//! logging setup live in `patchfit-replay`.

pub mod boundary;
pub mod conic;
pub mod diagnostics;
pub mod fit;
pub mod grid;
pub mod render;
pub mod selection;
pub mod session;
pub mod types;

pub use diagnostics::FitReport;
pub use fit::{ShapeFitter, fitter_for};
pub use grid::PatchGrid;
pub use render::{Renderer, SceneView};
pub use selection::{SelectionState, Toggle};
pub use session::{EventOutcome, Phase, Session};
pub use types::{
    Action, Color, FitError, FitMode, FittedShape, InputEvent, MouseButton, Palette, PatchIndex,
    Point, PointerAction, RgbImage, SessionConfig, Severity,
};

/// A session after replaying a script of events.
#[derive(Debug, Clone)]
pub struct Replay {
    /// Final session state.
    pub session: Session,
    /// Outcome of each event, in script order.
    pub outcomes: Vec<Result<EventOutcome, FitError>>,
}

/// Start a session and feed it `events` in order.
///
/// A failing event is recorded and the replay carries on: no session
/// error is fatal.
///
/// # Errors
///
/// Returns [`FitError::InvalidConfig`] if `config` fails validation.
pub fn replay(
    config: SessionConfig,
    mode: FitMode,
    events: &[InputEvent],
) -> Result<Replay, FitError> {
    let mut session = Session::new(config, mode)?;
    let outcomes = events.iter().map(|event| session.handle(*event)).collect();
    Ok(Replay { session, outcomes })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn replay_records_every_outcome() {
        let events = [
            InputEvent::Generate,
            InputEvent::Pointer {
                x: 40,
                y: 40,
                button: MouseButton::Left,
                action: PointerAction::Up,
            },
            InputEvent::Generate,
        ];
        let replay = replay(SessionConfig::default(), FitMode::CentroidCircle, &events).unwrap();
        assert_eq!(replay.outcomes.len(), 3);
        assert!(matches!(
            replay.outcomes[0],
            Err(FitError::InsufficientPoints { .. })
        ));
        assert_eq!(
            replay.outcomes[1],
            Ok(EventOutcome::Toggled(PatchIndex::new(1, 1), Toggle::Selected))
        );
        assert_eq!(replay.outcomes[2], Ok(EventOutcome::Fitted));
        assert_eq!(replay.session.phase(), Phase::Fitted);
    }

    #[test]
    fn replay_rejects_invalid_config() {
        let config = SessionConfig {
            marker_size: 0,
            ..SessionConfig::default()
        };
        assert!(replay(config, FitMode::Ellipse, &[]).is_err());
    }
}
