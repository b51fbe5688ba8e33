// File: crates/curve-core/src/events.rs
// Summary: Notification contract: observers are told about every committed state change.

use std::cell::RefCell;
use std::rc::Rc;

use crate::history::OperationKind;

/// What changed. Emitted after the store already holds the new state.
#[derive(Clone, Debug, PartialEq)]
pub enum EditEvent {
    Committed { operation_id: String, kind: OperationKind, series_ids: Vec<String> },
    Undone { operation_id: String, series_ids: Vec<String> },
    Redone { operation_id: String, series_ids: Vec<String> },
    SelectionChanged,
    SeriesAdded { id: String },
    SeriesRemoved { id: String },
}

/// Receives editor notifications (e.g. to refresh a chart).
pub trait EditObserver {
    fn id(&self) -> &'static str;
    fn on_event(&self, event: &EditEvent);
}

// Allow sharing a single observer instance with the caller
impl<T: EditObserver + ?Sized> EditObserver for Rc<T> {
    fn id(&self) -> &'static str { (**self).id() }
    fn on_event(&self, event: &EditEvent) { (**self).on_event(event) }
}

/// Observer that keeps every event it sees.
#[derive(Default)]
pub struct EventRecorder {
    events: RefCell<Vec<EditEvent>>,
}

impl EventRecorder {
    pub fn new() -> Self { Self::default() }

    pub fn events(&self) -> Vec<EditEvent> { self.events.borrow().clone() }

    pub fn take(&self) -> Vec<EditEvent> { std::mem::take(&mut *self.events.borrow_mut()) }
}

impl EditObserver for EventRecorder {
    fn id(&self) -> &'static str { "event_recorder" }

    fn on_event(&self, event: &EditEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
