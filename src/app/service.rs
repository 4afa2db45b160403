//! Mode controller: the hexagonal core.
//!
//! [`ModeController`] owns the mode machine, the rainbow palette and the
//! image set. All I/O flows through port traits injected at call sites,
//! so the whole controller is testable with mock adapters.
//!
//! ```text
//!  ControllerEvent ──▶ ┌────────────────────────┐ ──▶ OutputPort
//!                      │     ModeController     │ ──▶ ToneSink
//!                      │  Fsm · palette · ids   │ ──▶ EventSink
//!                      └────────────────────────┘ ──▶ ClassificationRequest
//! ```

use log::{debug, info, warn};

use crate::classifier::{evaluate, Verdict, VerdictRules};
use crate::config::ControllerConfig;
use crate::drivers::led_patterns::RainbowPalette;
use crate::error::ClassificationError;
use crate::events::{ButtonId, ControllerEvent};
use crate::fsm::states::{effects_for, StripPlan};
use crate::fsm::{Fsm, Mode, Transition, Trigger};

use super::commands::{OutputCommand, StripFrame, ToneLevel};
use super::events::AppEvent;
use super::ports::{ClassificationRequest, EntropySource, EventSink, OutputPort, ToneSink};

// ───────────────────────────────────────────────────────────────
// ModeController
// ───────────────────────────────────────────────────────────────

pub struct ModeController<R> {
    fsm: Fsm,
    palette: RainbowPalette,
    rng: R,
    rules: VerdictRules,
    images: Vec<String>,
    brightness: u8,
    /// Id of the most recently launched request (0 = none yet).
    latest_request: u64,
}

impl<R: EntropySource> ModeController<R> {
    pub fn new(config: &ControllerConfig, rng: R) -> Self {
        Self {
            fsm: Fsm::default(),
            palette: RainbowPalette::new(),
            rng,
            rules: VerdictRules::from_config(&config.classification),
            images: config.classification.images.clone(),
            brightness: config.strip.brightness,
            latest_request: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Initialise outputs and play the startup chirp. Mode stays DOOR and
    /// nothing is rendered for it until the first trigger.
    pub fn start(
        &mut self,
        out: &mut impl OutputPort,
        tone: &impl ToneSink,
        sink: &mut impl EventSink,
    ) {
        if let Err(e) = out.init() {
            sink.emit(&AppEvent::PeripheralFault(e));
        }
        tone.play_slide(ToneLevel::Low);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("controller started in {}", self.fsm.current_state());
    }

    /// Drive outputs dark.
    pub fn shutdown(&mut self, out: &mut impl OutputPort, sink: &mut impl EventSink) {
        if let Err(e) = out.release() {
            sink.emit(&AppEvent::PeripheralFault(e));
        }
        sink.emit(&AppEvent::Released);
    }

    // ── Event dispatch ────────────────────────────────────────

    /// Handle one queued event. Returns a request to launch, if any.
    pub fn handle(
        &mut self,
        event: ControllerEvent,
        out: &mut impl OutputPort,
        tone: &impl ToneSink,
        sink: &mut impl EventSink,
    ) -> Option<ClassificationRequest> {
        match event {
            ControllerEvent::Button { id, pressed: true } => self.press(id, out, tone, sink),
            ControllerEvent::Button { id, pressed: false } => {
                debug!("controller: {id:?} released");
                None
            }
            ControllerEvent::ClassificationCompleted { request_id, result } => {
                self.complete(request_id, result, out, sink);
                None
            }
            ControllerEvent::Shutdown => {
                self.shutdown(out, sink);
                None
            }
        }
    }

    /// A button press: transition, render, chirp, maybe classify.
    pub fn press(
        &mut self,
        id: ButtonId,
        out: &mut impl OutputPort,
        tone: &impl ToneSink,
        sink: &mut impl EventSink,
    ) -> Option<ClassificationRequest> {
        let trigger = id.trigger();
        let effects = effects_for(trigger);
        let t = self.fsm.fire(trigger);

        let strip = match effects.strip {
            StripPlan::Ordered => Some(StripFrame::Lit {
                colors: self.palette.ordered(t.strip_forward),
                brightness: self.brightness,
            }),
            StripPlan::Random => Some(StripFrame::Lit {
                colors: self.palette.random(&mut self.rng),
                brightness: self.brightness,
            }),
            StripPlan::Off => Some(StripFrame::Off),
            StripPlan::Unchanged => None,
        };
        let cmd = OutputCommand {
            mode: t.to,
            strip,
            indicator: effects.indicator,
        };
        self.render(&cmd, out, sink);

        if let Some(level) = effects.tone {
            tone.play_slide(level);
        }
        self.announce(&t, sink);

        if effects.request_classification {
            return self.next_request(sink);
        }
        None
    }

    /// Apply a classification result. Errors leave the mode unchanged.
    pub fn complete(
        &mut self,
        request_id: u64,
        result: Result<Vec<Verdict>, ClassificationError>,
        out: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) -> Option<Transition> {
        let verdicts = match result {
            Ok(v) => v,
            Err(error) => {
                warn!("controller: request #{request_id} failed: {error}");
                sink.emit(&AppEvent::ClassificationFailed { request_id, error });
                return None;
            }
        };

        if request_id < self.latest_request {
            sink.emit(&AppEvent::StaleClassification {
                request_id,
                latest: self.latest_request,
            });
        }

        let outcome = evaluate(&verdicts, &self.rules);
        let t = self.fsm.fire(Trigger::Classified(outcome));
        self.render(&OutputCommand::display_only(t.to), out, sink);
        self.announce(&t, sink);
        Some(t)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn current_mode(&self) -> Mode {
        self.fsm.current_state()
    }

    pub fn latest_request(&self) -> u64 {
        self.latest_request
    }

    pub fn transition_count(&self) -> u64 {
        self.fsm.transition_count()
    }

    // ── Internal ──────────────────────────────────────────────

    fn render(&mut self, cmd: &OutputCommand, out: &mut impl OutputPort, sink: &mut impl EventSink) {
        if let Err(e) = out.render(cmd) {
            sink.emit(&AppEvent::PeripheralFault(e));
        }
    }

    fn announce(&self, t: &Transition, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::ModeChanged {
            from: t.from,
            to: t.to,
            trigger: t.trigger,
        });
    }

    fn next_request(&mut self, sink: &mut impl EventSink) -> Option<ClassificationRequest> {
        if self.images.is_empty() {
            warn!("controller: no images configured, classification skipped");
            return None;
        }
        let image_uri = self.images[self.rng.pick(self.images.len())].clone();
        self.latest_request += 1;
        let request = ClassificationRequest {
            id: self.latest_request,
            image_uri,
        };
        sink.emit(&AppEvent::ClassificationRequested {
            request_id: request.id,
            image_uri: request.image_uri.clone(),
        });
        Some(request)
    }
}
