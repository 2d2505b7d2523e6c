//! Integration test: drive sessions through scripted controller events
//! in every mode and check the rendered frames.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use patchfit::{
    Color, EventOutcome, FitError, FitMode, FittedShape, InputEvent, MouseButton, Phase,
    PointerAction, SessionConfig, replay,
};

fn click(x: u32, y: u32, button: MouseButton, action: PointerAction) -> InputEvent {
    InputEvent::Pointer {
        x,
        y,
        button,
        action,
    }
}

/// Left click (press and release) on the reference pixel of a patch.
fn tap(row: u32, col: u32) -> [InputEvent; 2] {
    let (x, y) = (col * 27 + 5, row * 27 + 5);
    [
        click(x, y, MouseButton::Left, PointerAction::Down),
        click(x, y, MouseButton::Left, PointerAction::Up),
    ]
}

#[test]
fn centroid_script_from_json() {
    let script = r#"[
        {"event": "pointer", "x": 194, "y": 275, "button": "left", "action": "up"},
        {"event": "pointer", "x": 356, "y": 275, "button": "left", "action": "up"},
        {"event": "pointer", "x": 275, "y": 194, "button": "left", "action": "up"},
        {"event": "pointer", "x": 275, "y": 356, "button": "left", "action": "up"},
        {"event": "generate"}
    ]"#;
    let events: Vec<InputEvent> = serde_json::from_str(script).unwrap();
    let run = replay(SessionConfig::default(), FitMode::CentroidCircle, &events).unwrap();

    assert!(run.outcomes.iter().all(Result::is_ok));
    let Some(FittedShape::Circle { center, radius }) = run.session.shape() else {
        panic!("expected a circle, got {:?}", run.session.shape());
    };
    assert!((center.x - 275.0).abs() < 1e-9);
    assert!((center.y - 275.0).abs() < 1e-9);
    assert!((radius - 81.0).abs() < 1e-9);

    let report = run.session.report().expect("fitted session has a report");
    assert_eq!(report.input_points, 4);
    assert!(report.rms_residual < 1e-9);

    let frame = run.session.frame();
    assert_eq!(frame.dimensions(), (540, 640));
    assert_eq!(*frame.get_pixel(275, 275), Color::BLUE.rgb());
}

#[test]
fn ellipse_script_survives_early_generate() {
    let mut events = vec![InputEvent::Generate];
    for (row, col) in [(5, 10), (15, 10), (10, 4), (10, 16), (7, 14)] {
        events.extend(tap(row, col));
    }
    events.push(InputEvent::Generate);
    events.extend(tap(13, 6));
    events.push(InputEvent::Generate);

    let run = replay(SessionConfig::default(), FitMode::Ellipse, &events).unwrap();
    assert!(matches!(
        run.outcomes[0],
        Err(FitError::InsufficientPoints { selected: 0, .. })
    ));
    assert!(matches!(
        run.outcomes[11],
        Err(FitError::InsufficientPoints { selected: 5, .. })
    ));
    assert_eq!(run.outcomes.last(), Some(&Ok(EventOutcome::Fitted)));

    let Some(FittedShape::Ellipse {
        center, semi_axes, ..
    }) = run.session.shape()
    else {
        panic!("expected an ellipse, got {:?}", run.session.shape());
    };
    // The six patches are symmetric about (10, 10).
    assert!((center.x - 275.0).abs() < 1e-6);
    assert!((center.y - 275.0).abs() < 1e-6);
    assert!(semi_axes[0] >= semi_axes[1]);
    assert!(run.session.report().unwrap().rms_residual < 1e-6);
}

#[test]
fn two_point_script_locks_until_right_press() {
    let events = [
        click(100, 100, MouseButton::Left, PointerAction::Down),
        click(275, 275, MouseButton::Left, PointerAction::Down),
        click(356, 275, MouseButton::Left, PointerAction::Up),
        click(10, 10, MouseButton::Left, PointerAction::Down),
        click(10, 10, MouseButton::Right, PointerAction::Up),
    ];
    let run = replay(SessionConfig::default(), FitMode::TwoPointCircle, &events).unwrap();
    assert_eq!(run.outcomes[2], Ok(EventOutcome::Fitted));
    assert_eq!(run.outcomes[3], Err(FitError::Locked));
    assert_eq!(run.outcomes[4], Ok(EventOutcome::Ignored));
    assert_eq!(run.session.phase(), Phase::Fitted);

    let Some(FittedShape::TwoPointCircle {
        center,
        radius,
        target_radius,
        min_radius,
        max_radius,
        ..
    }) = run.session.shape()
    else {
        panic!("expected a two-point circle");
    };
    // The second press moved the center.
    assert!((center.x - 275.0).abs() < f64::EPSILON);
    assert!((radius - 81.0).abs() < 1e-12);
    assert!((target_radius - radius).abs() <= 1.0);

    // Boundary bands are painted at the measured radii.
    let frame = run.session.frame();
    assert_eq!(frame.dimensions(), (540, 540));
    let red = Color::RED.rgb();
    let outer_x = 275 + max_radius.round() as u32;
    let inner_x = 275 + min_radius.round() as u32;
    assert_eq!(*frame.get_pixel(outer_x, 275), red);
    assert_eq!(*frame.get_pixel(inner_x, 275), red);
}
