//! Per-transaction execution context

use crate::events::PeggyEvent;
use crate::ports::outbound::KvStore;

/// Store, height and event sink handed to every handler.
pub struct Context<'a> {
    pub block_height: u64,
    pub store: &'a mut dyn KvStore,
    events: Vec<PeggyEvent>,
}

impl<'a> Context<'a> {
    pub fn new(block_height: u64, store: &'a mut dyn KvStore) -> Self {
        Self {
            block_height,
            store,
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: PeggyEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[PeggyEvent] {
        &self.events
    }

    pub fn extend_events(&mut self, events: Vec<PeggyEvent>) {
        self.events.extend(events);
    }

    pub fn into_events(self) -> Vec<PeggyEvent> {
        self.events
    }
}
