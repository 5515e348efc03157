use std::fmt;
use std::str::FromStr;

use persona_core::model::FinalResult;
use tracing::warn;

use crate::error::UnknownEventError;

/// Lifecycle hooks exposed to UI code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineEvent {
    Start,
    Progress,
    Complete,
}

impl EngineEvent {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineEvent::Start => "start",
            EngineEvent::Progress => "progress",
            EngineEvent::Complete => "complete",
        }
    }
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineEvent {
    type Err = UnknownEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "progress" => Ok(Self::Progress),
            "complete" => Ok(Self::Complete),
            other => Err(UnknownEventError {
                name: other.to_string(),
            }),
        }
    }
}

/// Position reported after a successful navigation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub current_index: usize,
    pub total: usize,
    pub progress: f64,
}

/// Data handed to a handler when its event fires.
#[derive(Debug, Clone, Copy)]
pub enum EventPayload<'a> {
    Start,
    Progress(&'a ProgressUpdate),
    Complete(&'a FinalResult),
}

impl EventPayload<'_> {
    #[must_use]
    pub fn event(&self) -> EngineEvent {
        match self {
            EventPayload::Start => EngineEvent::Start,
            EventPayload::Progress(_) => EngineEvent::Progress,
            EventPayload::Complete(_) => EngineEvent::Complete,
        }
    }
}

type Handler = Box<dyn FnMut(&EventPayload<'_>)>;

/// One handler slot per lifecycle event.
///
/// Registering a handler for an event that already has one replaces it;
/// handlers are not accumulated.
#[derive(Default)]
pub struct EventNotifier {
    on_start: Option<Handler>,
    on_progress: Option<Handler>,
    on_complete: Option<Handler>,
}

impl EventNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler by event name.
    ///
    /// Unknown names are logged and ignored. Returns whether a handler was
    /// installed.
    pub fn on(&mut self, event: &str, handler: impl FnMut(&EventPayload<'_>) + 'static) -> bool {
        match event.parse::<EngineEvent>() {
            Ok(event) => {
                self.set(event, handler);
                true
            }
            Err(err) => {
                warn!(event = %err.name, "ignoring handler for unknown event");
                false
            }
        }
    }

    /// Register a handler for a known event, replacing any previous one.
    pub fn set(&mut self, event: EngineEvent, handler: impl FnMut(&EventPayload<'_>) + 'static) {
        *self.slot(event) = Some(Box::new(handler));
    }

    #[must_use]
    pub fn has_handler(&self, event: EngineEvent) -> bool {
        match event {
            EngineEvent::Start => self.on_start.is_some(),
            EngineEvent::Progress => self.on_progress.is_some(),
            EngineEvent::Complete => self.on_complete.is_some(),
        }
    }

    /// Invoke the handler registered for the payload's event, if any.
    pub fn emit(&mut self, payload: &EventPayload<'_>) {
        if let Some(handler) = self.slot(payload.event()).as_mut() {
            handler(payload);
        }
    }

    fn slot(&mut self, event: EngineEvent) -> &mut Option<Handler> {
        match event {
            EngineEvent::Start => &mut self.on_start,
            EngineEvent::Progress => &mut self.on_progress,
            EngineEvent::Complete => &mut self.on_complete,
        }
    }
}

impl fmt::Debug for EventNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventNotifier")
            .field("start", &self.on_start.is_some())
            .field("progress", &self.on_progress.is_some())
            .field("complete", &self.on_complete.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn parses_known_event_names() {
        assert_eq!("start".parse::<EngineEvent>(), Ok(EngineEvent::Start));
        assert_eq!("progress".parse::<EngineEvent>(), Ok(EngineEvent::Progress));
        assert_eq!("complete".parse::<EngineEvent>(), Ok(EngineEvent::Complete));
        assert!("finish".parse::<EngineEvent>().is_err());
    }

    #[test]
    fn unknown_event_is_ignored() {
        let mut notifier = EventNotifier::new();
        assert!(!notifier.on("finish", |_| {}));
        assert!(!notifier.has_handler(EngineEvent::Complete));
    }

    #[test]
    fn second_registration_replaces_first() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = EventNotifier::new();

        let first = Rc::clone(&calls);
        notifier.on("start", move |_| first.borrow_mut().push("first"));
        let second = Rc::clone(&calls);
        notifier.on("start", move |_| second.borrow_mut().push("second"));

        notifier.emit(&EventPayload::Start);
        assert_eq!(*calls.borrow(), vec!["second"]);
    }

    #[test]
    fn emit_only_reaches_matching_slot() {
        let hits = Rc::new(RefCell::new(0));
        let mut notifier = EventNotifier::new();

        let counter = Rc::clone(&hits);
        notifier.set(EngineEvent::Progress, move |payload| {
            if let EventPayload::Progress(update) = payload {
                *counter.borrow_mut() += update.current_index;
            }
        });

        notifier.emit(&EventPayload::Start);
        notifier.emit(&EventPayload::Progress(&ProgressUpdate {
            current_index: 2,
            total: 4,
            progress: 75.0,
        }));
        assert_eq!(*hits.borrow(), 2);
    }
}
