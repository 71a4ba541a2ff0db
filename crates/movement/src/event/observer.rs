use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::types::MovementEvent;

/// Telemetry sink injected into the movement controller.
pub trait MovementObserver {
    fn record(&mut self, tick: u32, event: &MovementEvent);
}

impl<T: MovementObserver> MovementObserver for Rc<RefCell<T>> {
    fn record(&mut self, tick: u32, event: &MovementEvent) {
        self.borrow_mut().record(tick, event);
    }
}

/// Forwards events to the `log` facade under the `deft::movement` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl MovementObserver for LogObserver {
    fn record(&mut self, tick: u32, event: &MovementEvent) {
        if event.is_transient() {
            log::trace!(target: "deft::movement", "[{}] {:?}", tick, event);
        } else {
            log::debug!(target: "deft::movement", "[{}] {:?}", tick, event);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub tick: u32,
    pub event: MovementEvent,
}

/// Bounded in-memory history. Transient events are evicted first when full.
pub struct EventLog {
    events: VecDeque<RecordedEvent>,
    max_events: usize,
}

impl EventLog {
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events: max_events.max(1),
        }
    }

    pub fn shared(max_events: usize) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(max_events)))
    }

    pub fn push(&mut self, tick: u32, event: MovementEvent) {
        if self.events.len() >= self.max_events {
            self.evict_one();
        }

        self.events.push_back(RecordedEvent { tick, event });
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordedEvent> {
        self.events.iter()
    }

    pub fn events_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a RecordedEvent> {
        self.events.iter().filter(move |e| e.event.name() == name)
    }

    pub fn count(&self, name: &str) -> usize {
        self.events_named(name).count()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn evict_one(&mut self) {
        match self.events.iter().position(|e| e.event.is_transient()) {
            Some(idx) => {
                self.events.remove(idx);
            }
            None => {
                self.events.pop_front();
            }
        }
    }
}

impl MovementObserver for EventLog {
    fn record(&mut self, tick: u32, event: &MovementEvent) {
        self.push(tick, event.clone());
    }
}
