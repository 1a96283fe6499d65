//! The conversion controller.
//!
//! One task owns the converter inputs and its visible state. Input changes
//! arrive as [`InputEvent`]s, finished conversions come back on a second
//! channel, and every change is published as a [`Snapshot`] on a
//! `tokio::sync::watch` channel. Each dispatched conversion carries a
//! generation number; only the latest generation may update the state.

use super::conversion::{
    CONVERSION_FAILED_MESSAGE, Conversion, ConversionFailed, ConversionInputs, ConversionRequest,
    convert,
};
use super::currency::CurrencyCode;
use super::rates::RateProvider;
use anyhow::{Result, anyhow};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Loading,
    Success(Conversion),
    Failure { message: String },
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn conversion(&self) -> Option<&Conversion> {
        match self {
            ViewState::Success(c) => Some(c),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Failure { message } => Some(message),
            _ => None,
        }
    }
}

/// What observers of the controller see.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub inputs: ConversionInputs,
    pub state: ViewState,
    /// Number of input events applied so far.
    pub revision: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    SetAmount(String),
    SetSource(CurrencyCode),
    SetTarget(CurrencyCode),
    Swap,
}

/// An input event plus the channel its post-apply snapshot is returned on.
struct Envelope {
    event: InputEvent,
    ack: oneshot::Sender<Snapshot>,
}

struct Completion {
    generation: u64,
    result: Result<Conversion, ConversionFailed>,
}

pub struct ConversionController {
    provider: Arc<dyn RateProvider>,
    inputs: ConversionInputs,
    generation: u64,
    revision: u64,
    in_flight: Option<JoinHandle<()>>,
    events: mpsc::Receiver<Envelope>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions: mpsc::UnboundedReceiver<Completion>,
    state_tx: watch::Sender<Snapshot>,
}

impl ConversionController {
    /// Starts the controller on the current runtime. A conversion for the
    /// initial inputs is dispatched right away when they are valid.
    pub fn spawn(provider: Arc<dyn RateProvider>, initial: ConversionInputs) -> ControllerHandle {
        let (mut controller, handle) = Self::new(provider, initial);
        // Dispatch before handing out the handle so the first snapshot a
        // caller sees is already Loading.
        controller.trigger();
        tokio::spawn(controller.run());
        handle
    }

    fn new(provider: Arc<dyn RateProvider>, initial: ConversionInputs) -> (Self, ControllerHandle) {
        let (events_tx, events) = mpsc::channel(32);
        let (completions_tx, completions) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(Snapshot {
            inputs: initial.clone(),
            state: ViewState::Idle,
            revision: 0,
        });

        let controller = ConversionController {
            provider,
            inputs: initial,
            generation: 0,
            revision: 0,
            in_flight: None,
            events,
            completions_tx,
            completions,
            state_tx,
        };
        let handle = ControllerHandle {
            events: events_tx,
            state: state_rx,
            sent: AtomicU64::new(0),
        };
        (controller, handle)
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(Envelope { event, ack }) => {
                        self.apply(event);
                        // The sender may have given up waiting
                        let _ = ack.send(self.state_tx.borrow().clone());
                    }
                    None => break,
                },
                Some(completion) = self.completions.recv() => self.complete(completion),
            }
        }
        debug!("All controller handles dropped, stopping");
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }

    fn apply(&mut self, event: InputEvent) {
        debug!(?event, "Applying input event");
        match event {
            InputEvent::SetAmount(amount) => self.inputs.amount = amount,
            InputEvent::SetSource(code) => self.inputs.source = code,
            InputEvent::SetTarget(code) => self.inputs.target = code,
            InputEvent::Swap => self.inputs.swap(),
        }
        self.revision += 1;
        self.trigger();
    }

    /// Starts a new conversion cycle for the current inputs, superseding any
    /// cycle still in flight.
    fn trigger(&mut self) {
        self.generation += 1;
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }

        match self.inputs.request() {
            Some(request) => {
                self.dispatch(request);
                self.publish(ViewState::Loading);
            }
            None => {
                debug!(amount = %self.inputs.amount, "No valid amount, not converting");
                self.publish(ViewState::Idle);
            }
        }
    }

    fn dispatch(&mut self, request: ConversionRequest) {
        let generation = self.generation;
        let provider = Arc::clone(&self.provider);
        let completions = self.completions_tx.clone();
        debug!(generation, ?request, "Dispatching conversion");

        self.in_flight = Some(tokio::spawn(async move {
            let result = convert(provider.as_ref(), request).await;
            // The controller may already be gone
            let _ = completions.send(Completion { generation, result });
        }));
    }

    fn complete(&mut self, completion: Completion) {
        if completion.generation != self.generation {
            debug!(
                generation = completion.generation,
                current = self.generation,
                "Dropping stale conversion result"
            );
            return;
        }
        self.in_flight = None;

        let state = match completion.result {
            Ok(conversion) => ViewState::Success(conversion),
            Err(e) => {
                error!(error = ?e.cause(), "Currency conversion failed");
                ViewState::Failure {
                    message: CONVERSION_FAILED_MESSAGE.to_string(),
                }
            }
        };
        self.publish(state);
    }

    fn publish(&self, state: ViewState) {
        self.state_tx.send_replace(Snapshot {
            inputs: self.inputs.clone(),
            state,
            revision: self.revision,
        });
    }
}

/// Client side of a running [`ConversionController`]. Dropping it stops the
/// controller and aborts any request still in flight.
pub struct ControllerHandle {
    events: mpsc::Sender<Envelope>,
    state: watch::Receiver<Snapshot>,
    sent: AtomicU64,
}

impl ControllerHandle {
    /// Sends an input event and waits until the controller has applied it.
    /// The returned snapshot already shows the new inputs; the conversion
    /// they trigger may still be loading.
    pub async fn send(&self, event: InputEvent) -> Result<Snapshot> {
        let (ack, applied) = oneshot::channel();
        self.events
            .send(Envelope { event, ack })
            .await
            .map_err(|_| anyhow!("Conversion controller has stopped"))?;
        self.sent.fetch_add(1, Ordering::SeqCst);
        applied
            .await
            .map_err(|_| anyhow!("Conversion controller has stopped"))
    }

    pub async fn set_amount(&self, amount: impl Into<String>) -> Result<Snapshot> {
        self.send(InputEvent::SetAmount(amount.into())).await
    }

    pub async fn set_source(&self, code: CurrencyCode) -> Result<Snapshot> {
        self.send(InputEvent::SetSource(code)).await
    }

    pub async fn set_target(&self, code: CurrencyCode) -> Result<Snapshot> {
        self.send(InputEvent::SetTarget(code)).await
    }

    pub async fn swap(&self) -> Result<Snapshot> {
        self.send(InputEvent::Swap).await
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.clone()
    }

    /// Waits until every event sent through this handle has been applied and
    /// the resulting cycle is no longer loading.
    pub async fn settled(&self) -> Result<Snapshot> {
        let sent = self.sent.load(Ordering::SeqCst);
        let mut state = self.state.clone();
        let snapshot = state
            .wait_for(|s| s.revision >= sent && !s.state.is_loading())
            .await
            .map_err(|_| anyhow!("Conversion controller has stopped"))?;
        Ok(snapshot.clone())
    }
}
