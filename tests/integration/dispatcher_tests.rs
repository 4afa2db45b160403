//! Dispatch loop ordering, worker round trips and tone muting.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::mock_hw::{
    board, entities_body, CannedTransport, EventLog, FixedEntropy, HwCall, HwLog, ManualLauncher,
    MockOutputs, MockSpeaker, NoDelay, ToneRecorder,
};

use doormode::app::events::AppEvent;
use doormode::adapters::http::UreqTransport;
use doormode::app::ports::{ClassificationRequest, RequestLauncher, ToneSink};
use doormode::app::service::ModeController;
use doormode::classifier::{ClassificationClient, Verdict};
use doormode::config::{ClassificationConfig, ControllerConfig};
use doormode::dispatcher::{Dispatcher, ThreadLauncher};
use doormode::drivers::tone::ToneScheduler;
use doormode::error::ClassificationError;
use doormode::events::{ButtonId, ControllerEvent, EventQueue, EVENT_QUEUE_DEPTH};
use doormode::fsm::Mode;

fn config() -> ControllerConfig {
    ControllerConfig::default().with_api_key("test-key")
}

fn make_dispatcher<T: ToneSink, L: RequestLauncher>(
    log: &HwLog,
    tone: T,
    launcher: L,
    queue: Arc<EventQueue>,
) -> Dispatcher<FixedEntropy, MockOutputs, T, EventLog, L> {
    let controller = ModeController::new(&config(), FixedEntropy::new(vec![7, 2, 5]));
    Dispatcher::new(
        controller,
        board(log),
        tone,
        EventLog::default(),
        launcher,
        queue,
    )
}

fn angry() -> ControllerEvent {
    ControllerEvent::ClassificationCompleted {
        request_id: 1,
        result: Ok(vec![Verdict {
            label: "Anger".into(),
            score: 0.9,
        }]),
    }
}

// ── Ordering ──────────────────────────────────────────────────

#[test]
fn completion_then_clear_ends_clear() {
    let log = HwLog::new();
    let queue = Arc::new(EventQueue::new());
    let mut d = make_dispatcher(&log, ToneRecorder::default(), ManualLauncher::default(), queue.clone());

    queue.push(angry());
    queue.push(ControllerEvent::press(ButtonId::C));
    assert_eq!(d.drain(), 2);

    assert_eq!(d.controller().current_mode(), Mode::Clear);
    assert_eq!(d.shared_mode().get(), Mode::Clear);
    assert_eq!(log.display_text().as_deref(), Some(""));
    assert_eq!(log.last_brightness(), Some(0));
}

#[test]
fn clear_then_completion_ends_out() {
    let log = HwLog::new();
    let queue = Arc::new(EventQueue::new());
    let mut d = make_dispatcher(&log, ToneRecorder::default(), ManualLauncher::default(), queue.clone());

    queue.push(ControllerEvent::press(ButtonId::C));
    queue.push(angry());
    assert_eq!(d.drain(), 2);

    // The completion only rewrites the display; the strip stays dark.
    assert_eq!(d.controller().current_mode(), Mode::Out);
    assert_eq!(log.display_text().as_deref(), Some("OUT"));
    assert_eq!(log.last_brightness(), Some(0));
    assert_eq!(log.lit_pins(), vec!['b']);
}

#[test]
fn every_transition_is_reported_once() {
    let log = HwLog::new();
    let queue = Arc::new(EventQueue::new());
    let mut d = make_dispatcher(&log, ToneRecorder::default(), ManualLauncher::default(), queue.clone());

    for id in [ButtonId::A, ButtonId::B, ButtonId::B, ButtonId::C] {
        queue.push(ControllerEvent::press(id));
    }
    d.drain();

    let changes: Vec<(Mode, Mode)> = d
        .sink()
        .0
        .iter()
        .filter_map(|e| match e {
            AppEvent::ModeChanged { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        vec![
            (Mode::Door, Mode::Door),
            (Mode::Door, Mode::Out),
            (Mode::Out, Mode::In),
            (Mode::In, Mode::Clear),
        ]
    );
    assert_eq!(d.controller().transition_count(), 4);
}

#[test]
fn button_a_hands_request_to_launcher() {
    let log = HwLog::new();
    let queue = Arc::new(EventQueue::new());
    let mut d = make_dispatcher(&log, ToneRecorder::default(), ManualLauncher::default(), queue.clone());

    d.dispatch(ControllerEvent::press(ButtonId::A));
    d.dispatch(ControllerEvent::press(ButtonId::B));
    d.dispatch(ControllerEvent::press(ButtonId::A));

    let ids: Vec<u64> = d.launcher().launched.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(d.controller().latest_request(), 2);
}

#[test]
fn stale_completion_still_applies() {
    let log = HwLog::new();
    let queue = Arc::new(EventQueue::new());
    let mut d = make_dispatcher(&log, ToneRecorder::default(), ManualLauncher::default(), queue.clone());

    d.dispatch(ControllerEvent::press(ButtonId::A));
    d.dispatch(ControllerEvent::press(ButtonId::A));
    d.dispatch(angry());

    assert_eq!(d.controller().current_mode(), Mode::Out);
    assert!(d
        .sink()
        .0
        .contains(&AppEvent::StaleClassification { request_id: 1, latest: 2 }));
}

// ── Worker round trip ─────────────────────────────────────────

#[test]
fn worker_result_comes_back_through_queue() {
    let log = HwLog::new();
    let queue = Arc::new(EventQueue::new());
    let transport = CannedTransport::json(200, &entities_body(&[("Anger", 0.93)]));
    let launcher = ThreadLauncher::new(
        ClassificationClient::new(transport, &config().classification),
        queue.clone(),
    );
    let mut d = make_dispatcher(&log, ToneRecorder::default(), launcher, queue.clone());

    d.dispatch(ControllerEvent::press(ButtonId::A));
    assert_eq!(d.shared_mode().get(), Mode::Door);

    let completion = queue.recv();
    assert!(matches!(
        completion,
        ControllerEvent::ClassificationCompleted { request_id: 1, .. }
    ));
    d.dispatch(completion);

    assert_eq!(d.shared_mode().get(), Mode::Out);
    assert_eq!(log.display_text().as_deref(), Some("OUT"));
}

#[test]
fn worker_failure_leaves_mode_alone() {
    let log = HwLog::new();
    let queue = Arc::new(EventQueue::new());
    let transport = CannedTransport::json(403, r#"{"error":{"code":403}}"#);
    let launcher = ThreadLauncher::new(
        ClassificationClient::new(transport, &config().classification),
        queue.clone(),
    );
    let mut d = make_dispatcher(&log, ToneRecorder::default(), launcher, queue.clone());

    d.dispatch(ControllerEvent::press(ButtonId::A));
    let writes = log.len();
    d.dispatch(queue.recv());

    assert_eq!(d.shared_mode().get(), Mode::Door);
    assert_eq!(log.len(), writes);
    assert!(d.sink().0.contains(&AppEvent::ClassificationFailed {
        request_id: 1,
        error: ClassificationError::Status(403),
    }));
}

#[test]
fn tls_handshake_failure_comes_back_as_transport_error() {
    // Accepts one connection and answers the ClientHello with plaintext.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut hello = [0u8; 512];
        let _ = stream.read(&mut hello);
        let _ = stream.write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n");
    });

    let cfg = ClassificationConfig {
        endpoint: format!("https://127.0.0.1:{port}/v1/images:annotate"),
        api_key: "test-key".into(),
        ..ClassificationConfig::default()
    };
    let queue = Arc::new(EventQueue::new());
    let mut launcher = ThreadLauncher::new(
        ClassificationClient::new(UreqTransport::new(Duration::from_secs(5)), &cfg),
        queue.clone(),
    );

    launcher.launch(ClassificationRequest {
        id: 1,
        image_uri: cfg.images[0].clone(),
    });
    let completion = queue.recv();
    server.join().unwrap();

    assert!(matches!(
        completion,
        ControllerEvent::ClassificationCompleted {
            request_id: 1,
            result: Err(ClassificationError::Transport(_)),
        }
    ));
}

#[test]
fn stopped_dispatcher_does_not_park_workers() {
    let log = HwLog::new();
    let queue = Arc::new(EventQueue::new());
    let mut d = make_dispatcher(&log, ToneRecorder::default(), ManualLauncher::default(), queue.clone());
    assert!(!d.dispatch(ControllerEvent::Shutdown));
    assert!(queue.is_closed());

    for _ in 0..EVENT_QUEUE_DEPTH {
        queue.push(ControllerEvent::press(ButtonId::B));
    }
    let transport = CannedTransport::json(200, &entities_body(&[("Anger", 0.93)]));
    let mut launcher = ThreadLauncher::new(
        ClassificationClient::new(transport, &config().classification),
        queue.clone(),
    );
    launcher.launch(ClassificationRequest {
        id: 1,
        image_uri: "https://example.com/a.jpg".into(),
    });

    // A parked worker would fill the freed slot.
    thread::sleep(Duration::from_millis(200));
    assert!(queue.pop().is_some());
    thread::sleep(Duration::from_millis(100));
    assert_eq!(queue.len(), EVENT_QUEUE_DEPTH - 1);
}

// ── Run loop / shutdown ───────────────────────────────────────

#[test]
fn run_stops_at_shutdown_and_releases() {
    let log = HwLog::new();
    let queue = Arc::new(EventQueue::new());
    let mut d = make_dispatcher(&log, ToneRecorder::default(), ManualLauncher::default(), queue.clone());

    queue.push(ControllerEvent::press(ButtonId::B));
    queue.push(ControllerEvent::Shutdown);
    queue.push(ControllerEvent::press(ButtonId::C));
    d.run();

    assert_eq!(d.shared_mode().get(), Mode::Out);
    assert_eq!(queue.len(), 1, "events after shutdown stay queued");
    assert!(log.lit_pins().is_empty());
    assert_eq!(d.sink().0.last(), Some(&AppEvent::Released));
}

#[test]
fn run_consumes_events_from_other_threads() {
    let log = HwLog::new();
    let queue = Arc::new(EventQueue::new());
    let mut d = make_dispatcher(&log, ToneRecorder::default(), ManualLauncher::default(), queue.clone());
    let mode = d.shared_mode();

    let producer = {
        let queue = queue.clone();
        thread::spawn(move || {
            for _ in 0..40 {
                queue.push(ControllerEvent::press(ButtonId::B));
            }
            queue.push(ControllerEvent::Shutdown);
        })
    };
    d.run();
    producer.join().unwrap();

    // 40 toggles from DOOR: OUT, IN, ... ends IN.
    assert_eq!(mode.get(), Mode::In);
    assert_eq!(d.controller().transition_count(), 40);
}

// ── Tone thread ───────────────────────────────────────────────

#[test]
fn startup_chirp_reaches_speaker() {
    let log = HwLog::new();
    let queue = Arc::new(EventQueue::new());
    let mut cfg = config().tone;
    cfg.repeats = 0;
    let tone = ToneScheduler::spawn(MockSpeaker::new(&log), NoDelay, cfg).unwrap();
    let mut d = make_dispatcher(&log, tone, ManualLauncher::default(), queue);

    d.start();
    let (_outputs, mut tone, _sink, _launcher) = d.into_parts();
    tone.shutdown();

    let first_tone = log
        .calls()
        .into_iter()
        .find(|c| matches!(c, HwCall::TonePlay(_)));
    assert_eq!(first_tone, Some(HwCall::TonePlay(100.0)));
    assert_eq!(log.calls().last(), Some(&HwCall::ToneStop));
}

#[test]
fn muted_tone_never_touches_speaker() {
    let log = HwLog::new();
    let queue = Arc::new(EventQueue::new());
    let mut cfg = config().tone;
    cfg.muted = true;
    let tone = ToneScheduler::spawn(MockSpeaker::new(&log), NoDelay, cfg).unwrap();
    let mut d = make_dispatcher(&log, tone, ManualLauncher::default(), queue);

    d.start();
    d.dispatch(ControllerEvent::press(ButtonId::B));
    d.dispatch(ControllerEvent::press(ButtonId::C));
    let (_outputs, mut tone, _sink, _launcher) = d.into_parts();
    tone.shutdown();

    assert_eq!(log.tone_writes(), 0);
    assert!(log.len() > 0, "visual outputs still rendered");
}
