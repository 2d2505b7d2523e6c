//! Session: the owned state of one selection-and-fit interaction.
//!
//! A [`Session`] holds the grid, the renderer, the selection, the click
//! pair and the fitted shape, and exposes the operations a controller
//! invokes once per input event. Every failing operation leaves the
//! session exactly as it was.

use log::{debug, error, info, warn};

use crate::diagnostics::FitReport;
use crate::fit::{self, ClickPair, TwoPointFit};
use crate::grid::PatchGrid;
use crate::render::{Renderer, SceneView};
use crate::selection::{SelectionState, Toggle};
use crate::types::{
    Action, FitError, FitMode, FittedShape, InputEvent, MouseButton, PatchIndex, Point,
    PointerAction, RgbImage, SessionConfig, Severity,
};

/// Where a session is in its fit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing captured, or points being toggled.
    #[default]
    Idle,
    /// Two-point center captured, waiting for the circumference.
    CenterPicked,
    /// A shape is held until reset.
    Fitted,
}

/// What [`Session::handle`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// A patch was toggled.
    Toggled(PatchIndex, Toggle),
    /// The two-point center was captured.
    CenterPicked(PatchIndex),
    /// A shape was fitted.
    Fitted,
    /// The session was reset.
    Reset,
    /// The event has no effect in the current mode or phase.
    Ignored,
}

/// One selection-and-fit session.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    mode: FitMode,
    grid: PatchGrid,
    renderer: Renderer,
    selection: SelectionState,
    click: ClickPair,
    phase: Phase,
    shape: Option<FittedShape>,
    report: Option<FitReport>,
}

impl Session {
    /// Start an empty session.
    ///
    /// The control strip is only added in the button-driven modes.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: SessionConfig, mode: FitMode) -> Result<Self, FitError> {
        let grid = PatchGrid::from_config(&config)?;
        let strip = if mode.uses_selection() {
            config.control_strip_height
        } else {
            0
        };
        let renderer = Renderer::new(grid, config.palette, strip);
        debug!(
            "new {mode} session: {0}x{0} grid, {1}x{2} frame",
            grid.dimension(),
            renderer.width(),
            renderer.height(),
        );
        Ok(Self {
            config,
            mode,
            grid,
            renderer,
            selection: SelectionState::new(),
            click: ClickPair::new(),
            phase: Phase::Idle,
            shape: None,
            report: None,
        })
    }

    /// Active fitter.
    #[must_use]
    pub const fn mode(&self) -> FitMode {
        self.mode
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Grid geometry.
    #[must_use]
    pub const fn grid(&self) -> &PatchGrid {
        &self.grid
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Toggled patches.
    #[must_use]
    pub const fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Two-point capture.
    #[must_use]
    pub const fn click(&self) -> &ClickPair {
        &self.click
    }

    /// The fitted shape, if any.
    #[must_use]
    pub const fn shape(&self) -> Option<&FittedShape> {
        self.shape.as_ref()
    }

    /// Toggle a patch in the selection.
    ///
    /// Returns `Ok(None)` while a shape is held: toggles are ignored
    /// until reset.
    ///
    /// # Errors
    ///
    /// [`FitError::UnsupportedAction`] in two-point mode,
    /// [`FitError::OutOfBounds`] for an index off the grid.
    pub fn toggle(&mut self, index: PatchIndex) -> Result<Option<Toggle>, FitError> {
        self.require_selection_mode(Action::Toggle)?;
        if self.phase == Phase::Fitted {
            debug!("toggle {index} ignored: shape held until reset");
            return Ok(None);
        }
        let toggle = self.selection.toggle(&self.grid, index).map_err(logged)?;
        debug!(
            "toggle {index}: {toggle:?}, {} selected",
            self.selection.len()
        );
        Ok(Some(toggle))
    }

    /// Capture the two-point center. A second press before the release
    /// moves the center.
    ///
    /// # Errors
    ///
    /// [`FitError::UnsupportedAction`] outside two-point mode,
    /// [`FitError::Locked`] while a shape is held,
    /// [`FitError::OutOfBounds`] for an index off the grid.
    pub fn press(&mut self, index: PatchIndex) -> Result<(), FitError> {
        self.require_two_point(Action::Press)?;
        self.require_unlocked()?;
        let index = self.grid.check(index).map_err(logged)?;
        self.click.press(index);
        self.phase = Phase::CenterPicked;
        debug!("center picked at {index}");
        Ok(())
    }

    /// Capture the circumference point and fit the two-point circle.
    ///
    /// Returns `Ok(None)` when no center has been pressed.
    ///
    /// # Errors
    ///
    /// Same as [`press`](Self::press).
    pub fn release(&mut self, index: PatchIndex) -> Result<Option<&FittedShape>, FitError> {
        self.require_two_point(Action::Release)?;
        self.require_unlocked()?;
        let index = self.grid.check(index).map_err(logged)?;
        let Some((center, edge)) = self.click.release(index) else {
            debug!("release at {index} ignored: no center picked");
            return Ok(None);
        };

        let fit = TwoPointFit::fit(&self.grid, center, edge).map_err(logged)?;
        let boundary = self.renderer.measure_ring(&fit);
        let shape = fit.into_shape(boundary);
        Ok(Some(self.store(shape, &[])))
    }

    /// Run the multi-point fitter over the selection.
    ///
    /// # Errors
    ///
    /// [`FitError::UnsupportedAction`] in two-point mode,
    /// [`FitError::Locked`] while a shape is held,
    /// [`FitError::InsufficientPoints`] or [`FitError::DegenerateFit`]
    /// from the fitter. None of these change the session.
    pub fn generate(&mut self) -> Result<&FittedShape, FitError> {
        self.require_selection_mode(Action::Generate)?;
        self.require_unlocked()?;
        let fitter =
            fit::fitter_for(self.mode, self.config.snap_center_to_pixel).ok_or_else(|| {
                logged(FitError::UnsupportedAction {
                    action: Action::Generate,
                    mode: self.mode,
                })
            })?;
        let shape = fitter
            .fit_selection(&self.selection, &self.grid)
            .map_err(logged)?;
        let points = self.selection.points(&self.grid);
        Ok(self.store(shape, &points))
    }

    /// Discard the selection, the click pair and any fitted shape.
    pub fn reset(&mut self) {
        self.selection.clear();
        self.click.clear();
        self.shape = None;
        self.report = None;
        self.phase = Phase::Idle;
        debug!("session reset");
    }

    /// Dispatch a controller event.
    ///
    /// Left-button events toggle on release in the button-driven modes
    /// and capture the click pair in two-point mode. The right button
    /// resets on the mode's reset action. Pixels are resolved through
    /// the grid.
    ///
    /// # Errors
    ///
    /// [`FitError::OutOfBounds`] for a left-button pixel off the canvas,
    /// plus whatever the dispatched operation returns.
    pub fn handle(&mut self, event: InputEvent) -> Result<EventOutcome, FitError> {
        match event {
            InputEvent::Generate => self.generate().map(|_| EventOutcome::Fitted),
            InputEvent::Pointer {
                button: MouseButton::Right,
                action,
                ..
            } => {
                if action == self.mode.reset_action() {
                    self.reset();
                    Ok(EventOutcome::Reset)
                } else {
                    Ok(EventOutcome::Ignored)
                }
            }
            InputEvent::Pointer {
                x,
                y,
                button: MouseButton::Left,
                action,
            } => match (self.mode, action) {
                (FitMode::TwoPointCircle, PointerAction::Down) => {
                    let index = self.grid.locate(x, y).map_err(logged)?;
                    self.press(index)?;
                    Ok(EventOutcome::CenterPicked(index))
                }
                (FitMode::TwoPointCircle, PointerAction::Up) => {
                    let index = self.grid.locate(x, y).map_err(logged)?;
                    Ok(match self.release(index)? {
                        Some(_) => EventOutcome::Fitted,
                        None => EventOutcome::Ignored,
                    })
                }
                (_, PointerAction::Down) => Ok(EventOutcome::Ignored),
                (_, PointerAction::Up) => {
                    let index = self.grid.locate(x, y).map_err(logged)?;
                    Ok(self
                        .toggle(index)?
                        .map_or(EventOutcome::Ignored, |t| EventOutcome::Toggled(index, t)))
                }
            },
        }
    }

    /// Borrowed view of everything a frame is rendered from.
    #[must_use]
    pub fn scene(&self) -> SceneView<'_> {
        SceneView {
            grid: &self.grid,
            palette: &self.config.palette,
            mode: self.mode,
            selection: &self.selection,
            click: &self.click,
            shape: self.shape.as_ref(),
        }
    }

    /// Render the current state.
    #[must_use]
    pub fn frame(&self) -> RgbImage {
        self.renderer.render(&self.scene())
    }

    /// Diagnostics of the held shape.
    #[must_use]
    pub const fn report(&self) -> Option<&FitReport> {
        self.report.as_ref()
    }

    fn store(&mut self, shape: FittedShape, points: &[Point]) -> &FittedShape {
        let fit_report = FitReport::new(self.mode, &shape, points, &self.grid);
        info!(
            "fitted {} from {} point(s), rms residual {:.3}px",
            self.mode, fit_report.input_points, fit_report.rms_residual,
        );
        self.report = Some(fit_report);
        self.phase = Phase::Fitted;
        self.shape.insert(shape)
    }

    fn require_selection_mode(&self, action: Action) -> Result<(), FitError> {
        if self.mode.uses_selection() {
            Ok(())
        } else {
            Err(logged(FitError::UnsupportedAction {
                action,
                mode: self.mode,
            }))
        }
    }

    fn require_two_point(&self, action: Action) -> Result<(), FitError> {
        if self.mode.uses_selection() {
            Err(logged(FitError::UnsupportedAction {
                action,
                mode: self.mode,
            }))
        } else {
            Ok(())
        }
    }

    fn require_unlocked(&self) -> Result<(), FitError> {
        if self.phase == Phase::Fitted {
            Err(logged(FitError::Locked))
        } else {
            Ok(())
        }
    }
}

/// Log an error at the level its severity calls for and hand it back.
fn logged(err: FitError) -> FitError {
    match err.severity() {
        Severity::Warning => warn!("{err}"),
        Severity::Error => error!("{err}"),
    }
    err
}
