//! Controller behaviour through the real output stage and mock peripherals.

use crate::mock_hw::{board, board_with, EventLog, FixedEntropy, HwCall, HwLog, ToneRecorder};

use doormode::app::commands::ToneLevel;
use doormode::app::events::AppEvent;
use doormode::app::ports::OutputPort;
use doormode::app::service::ModeController;
use doormode::classifier::Verdict;
use doormode::config::ControllerConfig;
use doormode::drivers::led_patterns::RainbowPalette;
use doormode::error::{ClassificationError, Effector};
use doormode::events::{ButtonId, ControllerEvent};
use doormode::fsm::Mode;

fn make_controller() -> ModeController<FixedEntropy> {
    let config = ControllerConfig::default().with_api_key("test-key");
    ModeController::new(&config, FixedEntropy::new(vec![3, 1, 4, 1, 5, 9, 2, 6]))
}

fn verdict(label: &str, score: f32) -> Verdict {
    Verdict {
        label: label.into(),
        score,
    }
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn startup_leaves_door_unrendered_and_chirps_low() {
    let log = HwLog::new();
    let mut out = board(&log);
    let (tone, mut ev) = (ToneRecorder::default(), EventLog::default());
    let mut c = make_controller();

    c.start(&mut out, &tone, &mut ev);

    assert_eq!(c.current_mode(), Mode::Door);
    assert_eq!(
        log.calls(),
        vec![
            HwCall::StripBrightness(1),
            HwCall::DisplayEnabled(true),
            HwCall::DisplayClear,
        ]
    );
    assert_eq!(*tone.0.borrow(), vec![ToneLevel::Low]);
    assert_eq!(ev.0, vec![AppEvent::Started(Mode::Door)]);
}

// ── Button transitions ────────────────────────────────────────

#[test]
fn button_b_toggles_between_out_and_in() {
    let log = HwLog::new();
    let mut out = board(&log);
    let (tone, mut ev) = (ToneRecorder::default(), EventLog::default());
    let mut c = make_controller();

    c.press(ButtonId::B, &mut out, &tone, &mut ev);
    assert_eq!(c.current_mode(), Mode::Out);
    assert_eq!(log.display_text().as_deref(), Some("OUT"));

    c.press(ButtonId::B, &mut out, &tone, &mut ev);
    assert_eq!(c.current_mode(), Mode::In);
    assert_eq!(log.display_text().as_deref(), Some("IN"));

    c.press(ButtonId::B, &mut out, &tone, &mut ev);
    assert_eq!(c.current_mode(), Mode::Out);

    assert_eq!(log.lit_pins(), vec!['g']);
    assert_eq!(*tone.0.borrow(), vec![ToneLevel::Med; 3]);
    assert_eq!(log.last_brightness(), Some(1));
}

#[test]
fn button_b_from_clear_goes_out() {
    let log = HwLog::new();
    let mut out = board(&log);
    let (tone, mut ev) = (ToneRecorder::default(), EventLog::default());
    let mut c = make_controller();

    c.press(ButtonId::C, &mut out, &tone, &mut ev);
    c.press(ButtonId::B, &mut out, &tone, &mut ev);
    assert_eq!(c.current_mode(), Mode::Out);
}

#[test]
fn button_b_strip_uses_palette_colors_only() {
    let log = HwLog::new();
    let mut out = board(&log);
    let (tone, mut ev) = (ToneRecorder::default(), EventLog::default());
    let mut c = make_controller();

    c.press(ButtonId::B, &mut out, &tone, &mut ev);

    let palette = RainbowPalette::new();
    let frame = log.last_strip_frame().unwrap();
    assert_eq!(frame.len(), 7);
    assert!(frame.iter().all(|px| palette.colors().contains(px)));
}

#[test]
fn button_a_alternates_rainbow_direction() {
    let log = HwLog::new();
    let mut out = board(&log);
    let (tone, mut ev) = (ToneRecorder::default(), EventLog::default());
    let mut c = make_controller();
    let palette = RainbowPalette::new();

    c.press(ButtonId::A, &mut out, &tone, &mut ev);
    let first = log.last_strip_frame().unwrap();
    c.press(ButtonId::A, &mut out, &tone, &mut ev);
    let second = log.last_strip_frame().unwrap();

    let mut reversed = first.clone();
    reversed.reverse();
    assert_eq!(second, reversed);
    assert!(first == palette.ordered(true) || first == palette.ordered(false));

    assert_eq!(c.current_mode(), Mode::Door);
    assert_eq!(log.display_text().as_deref(), Some("DOOR"));
    assert_eq!(log.lit_pins(), vec!['r']);
    assert!(tone.0.borrow().is_empty(), "ButtonA plays no tone");
}

#[test]
fn button_a_requests_classification_from_image_set() {
    let log = HwLog::new();
    let mut out = board(&log);
    let (tone, mut ev) = (ToneRecorder::default(), EventLog::default());
    let mut c = make_controller();
    let images = ControllerConfig::default().classification.images;

    let req = c.press(ButtonId::A, &mut out, &tone, &mut ev).unwrap();
    assert_eq!(req.id, 1);
    assert!(images.contains(&req.image_uri));
    assert!(ev.0.contains(&AppEvent::ClassificationRequested {
        request_id: 1,
        image_uri: req.image_uri.clone(),
    }));
}

#[test]
fn button_c_blanks_everything_but_blue() {
    let log = HwLog::new();
    let mut out = board(&log);
    let (tone, mut ev) = (ToneRecorder::default(), EventLog::default());
    let mut c = make_controller();

    c.press(ButtonId::B, &mut out, &tone, &mut ev);
    c.press(ButtonId::C, &mut out, &tone, &mut ev);

    assert_eq!(c.current_mode(), Mode::Clear);
    assert_eq!(log.last_strip_frame(), Some(vec![(0, 0, 0); 7]));
    assert_eq!(log.last_brightness(), Some(0));
    assert_eq!(log.display_text().as_deref(), Some(""));
    assert_eq!(log.lit_pins(), vec!['b']);
    assert_eq!(tone.0.borrow().last(), Some(&ToneLevel::High));
}

#[test]
fn indicator_is_exclusive_after_every_press() {
    let log = HwLog::new();
    let mut out = board(&log);
    let (tone, mut ev) = (ToneRecorder::default(), EventLog::default());
    let mut c = make_controller();

    for (id, pin) in [
        (ButtonId::A, 'r'),
        (ButtonId::C, 'b'),
        (ButtonId::B, 'g'),
        (ButtonId::A, 'r'),
    ] {
        c.press(id, &mut out, &tone, &mut ev);
        assert_eq!(log.lit_pins(), vec![pin]);
    }
}

// ── Classification results ────────────────────────────────────

#[test]
fn negative_classification_updates_display_only() {
    let log = HwLog::new();
    let mut out = board(&log);
    let (tone, mut ev) = (ToneRecorder::default(), EventLog::default());
    let mut c = make_controller();

    c.press(ButtonId::A, &mut out, &tone, &mut ev);
    log.clear();

    c.complete(1, Ok(vec![verdict("Anger", 0.8)]), &mut out, &mut ev);

    assert_eq!(c.current_mode(), Mode::Out);
    assert_eq!(log.calls(), vec![HwCall::DisplayText("OUT".into())]);
    assert!(tone.0.borrow().is_empty());
}

#[test]
fn weak_or_unrelated_verdicts_go_in() {
    for verdicts in [
        vec![verdict("Anger", 0.5)],
        vec![verdict("Cat", 0.99)],
        vec![],
    ] {
        let log = HwLog::new();
        let mut out = board(&log);
        let mut ev = EventLog::default();
        let mut c = make_controller();
        c.complete(1, Ok(verdicts), &mut out, &mut ev);
        assert_eq!(c.current_mode(), Mode::In);
        assert_eq!(log.display_text().as_deref(), Some("IN"));
    }
}

#[test]
fn last_verdict_decides() {
    let log = HwLog::new();
    let mut out = board(&log);
    let mut ev = EventLog::default();
    let mut c = make_controller();

    let verdicts = vec![verdict("Anger", 0.9), verdict("Door", 0.7)];
    c.complete(1, Ok(verdicts), &mut out, &mut ev);
    assert_eq!(c.current_mode(), Mode::In);
}

#[test]
fn failed_classification_makes_no_peripheral_writes() {
    let log = HwLog::new();
    let mut out = board(&log);
    let (tone, mut ev) = (ToneRecorder::default(), EventLog::default());
    let mut c = make_controller();

    c.press(ButtonId::B, &mut out, &tone, &mut ev);
    c.press(ButtonId::A, &mut out, &tone, &mut ev);
    log.clear();

    for error in [
        ClassificationError::Transport("refused".into()),
        ClassificationError::Status(403),
        ClassificationError::EmptyBody,
        ClassificationError::NoResponse,
    ] {
        let t = c.complete(1, Err(error.clone()), &mut out, &mut ev);
        assert!(t.is_none());
        assert_eq!(
            ev.0.last(),
            Some(&AppEvent::ClassificationFailed {
                request_id: 1,
                error
            })
        );
    }

    assert_eq!(c.current_mode(), Mode::Door);
    assert_eq!(log.len(), 0);
}

// ── Degraded hardware ─────────────────────────────────────────

#[test]
fn broken_strip_does_not_block_other_effectors() {
    let log = HwLog::new();
    let mut out = board_with(&log, true, true);
    let (tone, mut ev) = (ToneRecorder::default(), EventLog::default());
    let mut c = make_controller();

    c.press(ButtonId::B, &mut out, &tone, &mut ev);

    assert_eq!(c.current_mode(), Mode::Out);
    assert_eq!(log.lit_pins(), vec!['g']);
    assert_eq!(log.display_text().as_deref(), Some("OUT"));
    assert!(ev.0.iter().any(
        |e| matches!(e, AppEvent::PeripheralFault(f) if f.effector == Effector::Strip)
    ));
    assert_eq!(*tone.0.borrow(), vec![ToneLevel::Med]);
}

#[test]
fn missing_display_is_skipped() {
    let log = HwLog::new();
    let mut out = board_with(&log, false, false);
    let (tone, mut ev) = (ToneRecorder::default(), EventLog::default());
    let mut c = make_controller();

    c.start(&mut out, &tone, &mut ev);
    c.press(ButtonId::C, &mut out, &tone, &mut ev);

    assert_eq!(c.current_mode(), Mode::Clear);
    assert_eq!(log.display_text(), None);
    assert!(!ev.0.iter().any(|e| matches!(e, AppEvent::PeripheralFault(_))));
}

// ── Shutdown ──────────────────────────────────────────────────

#[test]
fn shutdown_drives_outputs_dark() {
    let log = HwLog::new();
    let mut out = board(&log);
    let (tone, mut ev) = (ToneRecorder::default(), EventLog::default());
    let mut c = make_controller();

    c.press(ButtonId::A, &mut out, &tone, &mut ev);
    c.handle(ControllerEvent::Shutdown, &mut out, &tone, &mut ev);

    assert!(log.lit_pins().is_empty());
    assert_eq!(log.last_strip_frame(), Some(vec![(0, 0, 0); 7]));
    assert_eq!(log.last_brightness(), Some(0));
    assert_eq!(log.calls().last(), Some(&HwCall::DisplayEnabled(false)));
    assert_eq!(ev.0.last(), Some(&AppEvent::Released));
}

#[test]
fn release_twice_is_harmless() {
    let log = HwLog::new();
    let mut out = board(&log);
    assert!(out.release().is_ok());
    assert!(out.release().is_ok());
    assert!(log.lit_pins().is_empty());
}
