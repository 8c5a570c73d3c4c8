use crate::events::{ChatMessage, ChatMessageKind, GameState, NestEvent};
use crate::types::{DialogWidget, ItemId, ItemObservation, ObservationSink};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// State of the single in-flight nest interaction.
///
/// `last_placed_item_id` only means something while `awaiting_retrieval`
/// is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerCycleState {
    pub awaiting_retrieval: bool,
    pub last_placed_item_id: Option<ItemId>,
}

/// Second half of a two-phase handler, run on the tick after the message
/// that scheduled it, once the dialog widget has been populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredLookup {
    CapturePlacement { session: u64, sequence: u64 },
    ResolveRetrieval { epoch: u64, transformed: bool },
}

/// Infers nest outcomes from message-box texts and submits at most one
/// observation per place/retrieve cycle.
pub struct NestTracker {
    dialog: Box<dyn DialogWidget>,
    sink: Box<dyn ObservationSink>,
    state: TrackerCycleState,
    // Advances when a cycle starts or ends and on session boundaries.
    // Retrieval lookups from an older cycle are dropped.
    epoch: u64,
    // Placement lookups are only invalidated by a session boundary, and
    // each one runs at most once.
    session: u64,
    placements_scheduled: u64,
    placements_resolved: u64,
    deferred_tx: mpsc::UnboundedSender<DeferredLookup>,
    deferred_rx: mpsc::UnboundedReceiver<DeferredLookup>,
    pending: usize,
}

impl NestTracker {
    pub fn new(dialog: Box<dyn DialogWidget>, sink: Box<dyn ObservationSink>) -> Self {
        let (deferred_tx, deferred_rx) = mpsc::unbounded_channel();

        Self {
            dialog,
            sink,
            state: TrackerCycleState::default(),
            epoch: 0,
            session: 0,
            placements_scheduled: 0,
            placements_resolved: 0,
            deferred_tx,
            deferred_rx,
            pending: 0,
        }
    }

    pub fn state(&self) -> TrackerCycleState {
        self.state
    }

    /// Number of lookups waiting for the next `tick`.
    pub fn pending_lookups(&self) -> usize {
        self.pending
    }

    pub fn on_chat_message(&mut self, message: &ChatMessage) {
        if message.kind != ChatMessageKind::MessageBox {
            return;
        }

        let Some(event) = NestEvent::classify(&message.text) else {
            return;
        };

        match event {
            NestEvent::Placed => {
                self.placements_scheduled += 1;
                self.schedule(DeferredLookup::CapturePlacement {
                    session: self.session,
                    sequence: self.placements_scheduled,
                });
            }
            NestEvent::ValuableRejected => self.reject_valuable(),
            NestEvent::RetrievedUnchanged | NestEvent::RetrievedReplaced => {
                if !self.state.awaiting_retrieval {
                    debug!("Ignoring {:?} outside of a nest cycle", event);
                    return;
                }
                self.schedule(DeferredLookup::ResolveRetrieval {
                    epoch: self.epoch,
                    transformed: event == NestEvent::RetrievedReplaced,
                });
            }
        }
    }

    pub fn on_game_state_changed(&mut self, state: GameState) {
        if state.is_session_boundary() {
            self.on_session_boundary();
        }
    }

    /// Ends the session's cycle. The placed id is left as is; the next
    /// placement overwrites it.
    pub fn on_session_boundary(&mut self) {
        if self.state.awaiting_retrieval {
            debug!("Session boundary while awaiting retrieval, dropping cycle");
        }
        self.state.awaiting_retrieval = false;
        self.epoch += 1;
        self.session += 1;
    }

    /// Runs every lookup scheduled before this call and returns them in
    /// the order they ran.
    pub fn tick(&mut self) -> Vec<DeferredLookup> {
        let mut due = Vec::with_capacity(self.pending);
        while let Ok(lookup) = self.deferred_rx.try_recv() {
            due.push(lookup);
        }
        self.pending = 0;

        for lookup in &due {
            self.resolve(*lookup);
        }

        due
    }

    /// Resolves one deferred lookup against the current state and returns
    /// the observation it submitted, if any. Stale lookups are no-ops.
    pub fn resolve(&mut self, lookup: DeferredLookup) -> Option<ItemObservation> {
        match lookup {
            DeferredLookup::CapturePlacement { session, sequence } => {
                if session != self.session || sequence <= self.placements_resolved {
                    debug!("Dropping stale placement lookup #{}", sequence);
                    return None;
                }
                self.placements_resolved = sequence;
                let item_id = self.dialog_item_id()?;

                debug!("Item {} placed in nest", item_id);
                self.state.awaiting_retrieval = true;
                self.state.last_placed_item_id = Some(item_id);
                self.epoch += 1;
                None
            }
            DeferredLookup::ResolveRetrieval { epoch, transformed } => {
                if epoch != self.epoch || !self.state.awaiting_retrieval {
                    debug!("Dropping stale retrieval lookup");
                    return None;
                }
                let item_id = self.dialog_item_id()?;

                let observation = if transformed {
                    match self.state.last_placed_item_id {
                        Some(placed) => Some(ItemObservation::new(placed, true)),
                        None => {
                            debug!("Item was replaced but its placement id was never captured");
                            None
                        }
                    }
                } else {
                    Some(ItemObservation::new(item_id, false))
                };

                if let Some(observation) = observation {
                    self.emit(observation);
                }
                self.clear_cycle();
                observation
            }
        }
    }

    fn reject_valuable(&mut self) {
        let Some(item_id) = self.dialog_item_id() else {
            return;
        };

        self.emit(ItemObservation::new(item_id, false));
        self.clear_cycle();
    }

    fn schedule(&mut self, lookup: DeferredLookup) {
        // The receiver lives as long as `self`, so sending cannot fail.
        if self.deferred_tx.send(lookup).is_ok() {
            self.pending += 1;
        }
    }

    fn emit(&self, observation: ItemObservation) {
        info!(
            "Submitting nest observation: item {} transformed={}",
            observation.item_id, observation.transformed
        );
        self.sink.submit(observation);
    }

    fn clear_cycle(&mut self) {
        self.state = TrackerCycleState::default();
        self.epoch += 1;
    }

    /// Dialog item id, or `None` while the widget is absent or unpopulated.
    fn dialog_item_id(&self) -> Option<ItemId> {
        match self.dialog.current_item_id() {
            Some(id) if id > 0 => Some(id),
            other => {
                debug!("Dialog item not available ({:?})", other);
                None
            }
        }
    }
}
