use crate::events::{ChatMessage, ChatMessageKind, GameState};
use crate::tracker::{NestTracker, TrackerCycleState};
use crate::types::{DialogWidget, ItemId, ItemObservation, ObservationSink, Result, TrackerError};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Chat(ChatMessage),
    Dialog(Option<ItemId>),
    GameState(GameState),
    Tick,
}

/// Parses a recorded host session used to drive a tracker.
///
/// One directive per line:
///
/// ```text
/// # comment
/// dialog 995          # item id shown by the dialog sprite, or `none`
/// chat You place your item in the nest.
/// other Some public chat line
/// tick                # run lookups deferred by earlier messages
/// state hopping
/// ```
pub fn parse_script(text: &str) -> Result<Vec<ScriptStep>> {
    let mut steps = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (directive, rest) = match line.split_once(char::is_whitespace) {
            Some((directive, rest)) => (directive, rest.trim()),
            None => (line, ""),
        };
        let invalid = |reason: String| TrackerError::InvalidScript { line: index + 1, reason };

        let step = match directive {
            "chat" => ScriptStep::Chat(ChatMessage::message_box(rest)),
            "other" => ScriptStep::Chat(ChatMessage::new(ChatMessageKind::Public, rest)),
            "tick" => ScriptStep::Tick,
            "dialog" => {
                let value = strip_comment(rest);
                if value.eq_ignore_ascii_case("none") {
                    ScriptStep::Dialog(None)
                } else {
                    let id = value
                        .parse::<ItemId>()
                        .map_err(|_| invalid(format!("bad dialog item id '{}'", value)))?;
                    ScriptStep::Dialog(Some(id))
                }
            }
            "state" => ScriptStep::GameState(strip_comment(rest).parse().map_err(invalid)?),
            other => return Err(invalid(format!("unknown directive '{}'", other))),
        };
        steps.push(step);
    }

    Ok(steps)
}

fn strip_comment(value: &str) -> &str {
    value.split('#').next().unwrap_or("").trim()
}

/// Dialog widget whose content the host (or a script) sets directly.
#[derive(Debug, Clone, Default)]
pub struct SharedDialog {
    item_id: Rc<Cell<Option<ItemId>>>,
}

impl SharedDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&self, item_id: Option<ItemId>) {
        self.item_id.set(item_id);
    }
}

impl DialogWidget for SharedDialog {
    fn current_item_id(&self) -> Option<ItemId> {
        self.item_id.get()
    }
}

/// Keeps every observation it is handed, optionally forwarding it.
#[derive(Clone, Default)]
pub struct RecordingSink {
    observations: Rc<RefCell<Vec<ItemObservation>>>,
    forward: Option<Rc<dyn ObservationSink>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forwarding_to(sink: Rc<dyn ObservationSink>) -> Self {
        Self {
            observations: Rc::default(),
            forward: Some(sink),
        }
    }

    pub fn observations(&self) -> Vec<ItemObservation> {
        self.observations.borrow().clone()
    }
}

impl ObservationSink for RecordingSink {
    fn submit(&self, observation: ItemObservation) {
        self.observations.borrow_mut().push(observation);
        if let Some(forward) = &self.forward {
            forward.submit(observation);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub steps: usize,
    pub ticks: usize,
    pub final_state: TrackerCycleState,
}

/// Feeds `steps` to `tracker`. Lookups still pending after the last step
/// get one final tick, as the host would run them on its next turn.
pub fn run_script(steps: &[ScriptStep], dialog: &SharedDialog, tracker: &mut NestTracker) -> ReplayReport {
    let mut ticks = 0;

    for step in steps {
        match step {
            ScriptStep::Chat(message) => tracker.on_chat_message(message),
            ScriptStep::Dialog(item_id) => dialog.show(*item_id),
            ScriptStep::GameState(state) => tracker.on_game_state_changed(*state),
            ScriptStep::Tick => {
                tracker.tick();
                ticks += 1;
            }
        }
    }

    if tracker.pending_lookups() > 0 {
        debug!("Flushing {} pending lookups at end of script", tracker.pending_lookups());
        tracker.tick();
        ticks += 1;
    }

    ReplayReport {
        steps: steps.len(),
        ticks,
        final_state: tracker.state(),
    }
}
