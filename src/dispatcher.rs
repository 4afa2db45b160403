//! Single-consumer dispatch loop and classification workers.
//!
//! ```text
//!   EventQueue ──recv──▶ Dispatcher ──▶ ModeController::handle
//!        ▲                   │
//!        │                   └─ ClassificationRequest ──▶ RequestLauncher
//!        │                                                   │
//!        └──── ClassificationCompleted { request_id, result } ┘
//! ```
//!
//! Only the dispatcher mutates mode. Workers never touch outputs; they
//! post their result back onto the queue. Other threads observe the mode
//! through [`SharedMode`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread;

use log::{debug, info, warn};

use crate::app::ports::{
    ClassificationRequest, EntropySource, EventSink, HttpTransport, OutputPort, RequestLauncher,
    ToneSink,
};
use crate::app::service::ModeController;
use crate::classifier::ClassificationClient;
use crate::events::{ControllerEvent, EventQueue};
use crate::fsm::Mode;

/// Classification workers run a full TLS handshake.
#[cfg(target_os = "espidf")]
const WORKER_STACK_SIZE: usize = 16 * 1024;
#[cfg(not(target_os = "espidf"))]
const WORKER_STACK_SIZE: usize = 256 * 1024;

/// Lock-free snapshot of the current mode, readable from any thread.
#[derive(Debug, Clone)]
pub struct SharedMode(Arc<AtomicU8>);

impl SharedMode {
    pub fn new(mode: Mode) -> Self {
        Self(Arc::new(AtomicU8::new(mode as u8)))
    }

    pub fn get(&self) -> Mode {
        Mode::from_index(self.0.load(Ordering::Acquire))
    }

    fn set(&self, mode: Mode) {
        self.0.store(mode as u8, Ordering::Release);
    }
}

// ───────────────────────────────────────────────────────────────
// Classification workers
// ───────────────────────────────────────────────────────────────

/// One short-lived thread per request; the result goes back on `queue`.
pub struct ThreadLauncher<T> {
    client: Arc<ClassificationClient<T>>,
    queue: Arc<EventQueue>,
}

impl<T> ThreadLauncher<T>
where
    T: HttpTransport + Send + Sync + 'static,
{
    pub fn new(client: ClassificationClient<T>, queue: Arc<EventQueue>) -> Self {
        Self {
            client: Arc::new(client),
            queue,
        }
    }
}

impl<T> RequestLauncher for ThreadLauncher<T>
where
    T: HttpTransport + Send + Sync + 'static,
{
    fn launch(&mut self, request: ClassificationRequest) {
        let client = self.client.clone();
        let queue = self.queue.clone();
        let id = request.id;
        let spawned = thread::Builder::new()
            .name(format!("classify-{id}"))
            .stack_size(WORKER_STACK_SIZE)
            .spawn(move || {
                let result = client.classify(&request.image_uri);
                let done = ControllerEvent::ClassificationCompleted {
                    request_id: request.id,
                    result,
                };
                if queue.push_until_closed(done).is_err() {
                    warn!("dispatcher: stopped, result of #{} dropped", request.id);
                }
            });
        if let Err(e) = spawned {
            // Nothing will complete this request; mode stays as it is.
            warn!("dispatcher: request #{id} not started: {e}");
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Dispatcher
// ───────────────────────────────────────────────────────────────

pub struct Dispatcher<R, O, T, S, L> {
    controller: ModeController<R>,
    outputs: O,
    tone: T,
    sink: S,
    launcher: L,
    queue: Arc<EventQueue>,
    mode: SharedMode,
}

impl<R, O, T, S, L> Dispatcher<R, O, T, S, L>
where
    R: EntropySource,
    O: OutputPort,
    T: ToneSink,
    S: EventSink,
    L: RequestLauncher,
{
    pub fn new(
        controller: ModeController<R>,
        outputs: O,
        tone: T,
        sink: S,
        launcher: L,
        queue: Arc<EventQueue>,
    ) -> Self {
        let mode = SharedMode::new(controller.current_mode());
        Self {
            controller,
            outputs,
            tone,
            sink,
            launcher,
            queue,
            mode,
        }
    }

    /// Initialise outputs and play the startup chirp.
    pub fn start(&mut self) {
        self.controller
            .start(&mut self.outputs, &self.tone, &mut self.sink);
        self.mode.set(self.controller.current_mode());
    }

    /// Handle one event. Returns `false` once shutdown has been processed.
    pub fn dispatch(&mut self, event: ControllerEvent) -> bool {
        let shutdown = matches!(event, ControllerEvent::Shutdown);
        let request = self
            .controller
            .handle(event, &mut self.outputs, &self.tone, &mut self.sink);
        self.mode.set(self.controller.current_mode());
        if shutdown {
            self.queue.close();
        }
        if let Some(request) = request {
            debug!("dispatcher: launching #{}", request.id);
            self.launcher.launch(request);
        }
        !shutdown
    }

    /// Block on the queue until a shutdown event is handled.
    pub fn run(&mut self) {
        info!("dispatcher: running");
        while self.dispatch(self.queue.recv()) {}
        info!("dispatcher: stopped in {}", self.mode.get());
    }

    /// Handle everything already queued without blocking.
    /// Returns the number of events handled.
    pub fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.queue.pop() {
            handled += 1;
            if !self.dispatch(event) {
                break;
            }
        }
        handled
    }

    pub fn shared_mode(&self) -> SharedMode {
        self.mode.clone()
    }

    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    pub fn controller(&self) -> &ModeController<R> {
        &self.controller
    }

    pub fn outputs(&self) -> &O {
        &self.outputs
    }

    pub fn tone(&self) -> &T {
        &self.tone
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Hand back the adapters, e.g. to join the tone thread.
    pub fn into_parts(self) -> (O, T, S, L) {
        (self.outputs, self.tone, self.sink, self.launcher)
    }
}
