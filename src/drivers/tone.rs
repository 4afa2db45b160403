//! Tone slide generator and its background scheduler.
//!
//! A slide is an ascending frequency sweep from `level × 100 Hz` to the
//! configured ceiling, played once plus `repeats` more times after a
//! speaker settle delay:
//!
//! ```text
//!   settle ─┬─ pass 0: start ──▶ ceiling ─┬─ ... ─┬─ pass N ─┬─ stop
//!           └── steps_per_sweep × dwell ──┘       └──────────┘
//! ```
//!
//! [`ToneScheduler`] owns the speaker on a dedicated thread fed by an
//! unbounded channel, so `play_slide()` never blocks the dispatcher.
//! Requests play back-to-back in submission order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use embedded_hal::delay::DelayNs;
use log::{debug, warn};

use crate::app::commands::ToneLevel;
use crate::app::ports::{ToneOutput, ToneSink};
use crate::config::ToneConfig;
use crate::error::{self, Error, PeripheralError};

const TONE_STACK_SIZE: usize = 4096;

/// Frequencies of one pass, start to ceiling inclusive.
pub fn slide_steps(level: ToneLevel, cfg: &ToneConfig) -> impl Iterator<Item = f32> {
    let start = level.start_hz();
    let ceiling = cfg.ceiling_hz;
    let steps = cfg.steps_per_sweep.max(2);
    let last = f32::from(steps - 1);
    (0..steps).map(move |i| start + (ceiling - start) * f32::from(i) / last)
}

/// Time spent on each step of a pass.
pub fn step_dwell_us(cfg: &ToneConfig) -> u32 {
    cfg.sweep_ms.saturating_mul(1000) / u32::from(cfg.steps_per_sweep.max(2))
}

/// Play one complete slide, blocking the calling thread.
///
/// A failed write stops the speaker and aborts the slide.
pub fn run_slide<O, D>(
    output: &mut O,
    delay: &mut D,
    level: ToneLevel,
    cfg: &ToneConfig,
) -> Result<(), PeripheralError>
where
    O: ToneOutput,
    D: DelayNs,
{
    delay.delay_ms(cfg.settle_delay_ms);
    let dwell = step_dwell_us(cfg);
    for _ in 0..=cfg.repeats {
        for hz in slide_steps(level, cfg) {
            if let Err(e) = output.play(hz) {
                let _ = output.stop();
                return Err(e);
            }
            delay.delay_us(dwell);
        }
    }
    output.stop()
}

/// Fire-and-forget front end for the speaker.
pub struct ToneScheduler {
    tx: Option<Sender<ToneLevel>>,
    muted: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ToneScheduler {
    /// Move `output` onto a dedicated tone thread.
    pub fn spawn<O, D>(output: O, delay: D, cfg: ToneConfig) -> error::Result<Self>
    where
        O: ToneOutput + Send + 'static,
        D: DelayNs + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let muted = Arc::new(AtomicBool::new(cfg.muted));
        let worker_muted = muted.clone();
        let worker = thread::Builder::new()
            .name("tone".into())
            .stack_size(TONE_STACK_SIZE)
            .spawn(move || tone_worker(rx, output, delay, cfg, worker_muted))
            .map_err(|e| {
                warn!("tone: worker not started: {e}");
                Error::Init("tone thread")
            })?;
        Ok(Self {
            tx: Some(tx),
            muted,
            worker: Some(worker),
        })
    }

    /// No speaker attached; every slide is skipped.
    pub fn detached() -> Self {
        Self {
            tx: None,
            muted: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::Relaxed);
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Relaxed)
    }

    /// Let queued slides finish, then join the tone thread.
    pub fn shutdown(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("tone: worker panicked");
            }
        }
    }
}

impl ToneSink for ToneScheduler {
    fn play_slide(&self, level: ToneLevel) {
        if self.is_muted() {
            debug!("tone: muted, {level:?} skipped");
            return;
        }
        match &self.tx {
            Some(tx) => {
                if tx.send(level).is_err() {
                    warn!("tone: worker gone, {level:?} dropped");
                }
            }
            None => debug!("tone: no speaker, {level:?} skipped"),
        }
    }
}

impl Drop for ToneScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn tone_worker<O, D>(
    rx: Receiver<ToneLevel>,
    mut output: O,
    mut delay: D,
    cfg: ToneConfig,
    muted: Arc<AtomicBool>,
) where
    O: ToneOutput,
    D: DelayNs,
{
    while let Ok(level) = rx.recv() {
        // Mute may have been set after the slide was queued.
        if muted.load(Ordering::Relaxed) {
            continue;
        }
        debug!("tone: slide {level:?} from {} Hz", level.start_hz());
        if let Err(e) = run_slide(&mut output, &mut delay, level, &cfg) {
            warn!("tone: slide aborted: {e}");
        }
    }
    debug!("tone: worker exiting");
}
