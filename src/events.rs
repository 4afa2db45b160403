//! Controller event queue.
//!
//! Every state change goes through this one queue, consumed by the
//! dispatcher in arrival order:
//!
//! ```text
//! ┌───────────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Button task       │────▶│              │     │              │
//! │ Classify workers  │────▶│  EventQueue  │────▶│  Dispatcher  │
//! │ Shutdown request  │────▶│  (bounded)   │     │  (consumer)  │
//! └───────────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! Producers block while the queue is full; nothing is dropped while the
//! dispatcher is running. Once it has stopped the queue is closed and
//! [`EventQueue::push_until_closed`] hands events back instead of waiting.
//!
//! The embassy channel keeps a single sender waker, so two producers
//! blocked on a full queue keep re-waking each other until a slot frees.
//! That spin is cheap with a handful of producers at this depth; revisit
//! before adding more concurrent senders.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use futures_lite::future::block_on;

use crate::classifier::Verdict;
use crate::error::ClassificationError;
use crate::fsm::Trigger;

/// Maximum number of pending events.
pub const EVENT_QUEUE_DEPTH: usize = 16;

/// Poll interval of [`EventQueue::push_until_closed`] while full.
const FULL_RETRY: Duration = Duration::from_millis(2);

/// The three mode buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonId {
    A,
    B,
    C,
}

impl ButtonId {
    pub const fn trigger(self) -> Trigger {
        match self {
            Self::A => Trigger::ButtonA,
            Self::B => Trigger::ButtonB,
            Self::C => Trigger::ButtonC,
        }
    }
}

/// Everything the dispatcher reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// Debounced edge. Only presses (`pressed == true`) act.
    Button { id: ButtonId, pressed: bool },

    /// A classification round trip finished.
    ClassificationCompleted {
        request_id: u64,
        result: Result<Vec<Verdict>, ClassificationError>,
    },

    /// Release outputs and stop dispatching.
    Shutdown,
}

impl ControllerEvent {
    pub const fn press(id: ButtonId) -> Self {
        Self::Button { id, pressed: true }
    }
}

/// Bounded multi-producer, single-consumer event queue.
pub struct EventQueue {
    channel: Channel<CriticalSectionRawMutex, ControllerEvent, EVENT_QUEUE_DEPTH>,
    closed: AtomicBool,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Mark the consumer as gone. Pending events stay queued.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Enqueue, waiting while full for as long as the queue is open.
    /// Hands the event back if the queue is full and closed.
    pub fn push_until_closed(&self, mut event: ControllerEvent) -> Result<(), ControllerEvent> {
        loop {
            match self.try_push(event) {
                Ok(()) => return Ok(()),
                Err(back) if self.is_closed() => return Err(back),
                Err(back) => {
                    event = back;
                    thread::sleep(FULL_RETRY);
                }
            }
        }
    }

    /// Enqueue, blocking the producer while the queue is full.
    pub fn push(&self, event: ControllerEvent) {
        block_on(self.channel.send(event));
    }

    /// Enqueue without blocking; hands the event back if full.
    pub fn try_push(&self, event: ControllerEvent) -> Result<(), ControllerEvent> {
        self.channel.try_send(event).map_err(|e| match e {
            TrySendError::Full(event) => event,
        })
    }

    /// Next event, blocking until one arrives.
    pub fn recv(&self) -> ControllerEvent {
        block_on(self.channel.receive())
    }

    /// Next event if one is pending.
    pub fn pop(&self) -> Option<ControllerEvent> {
        self.channel.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
