use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use voicechain_core::{Page, TransactionKind};

/// Caller-side receiver for responder directives. Implementations perform
/// the actual navigation, picker toggling or flow routing.
pub trait DirectiveSink: Send + Sync {
    fn navigate(&self, page: Page);
    fn set_address_book_open(&self, open: bool);
    fn trigger_transaction(&self, kind: TransactionKind, payload: Value);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SinkEvent {
    Navigated { page: Page },
    AddressBook { open: bool },
    Transaction { kind: TransactionKind, payload: Value },
}

/// Keeps every directive it receives, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    pub fn take(&self) -> Vec<SinkEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    fn push(&self, event: SinkEvent) {
        self.events.lock().push(event);
    }
}

impl DirectiveSink for RecordingSink {
    fn navigate(&self, page: Page) {
        self.push(SinkEvent::Navigated { page });
    }

    fn set_address_book_open(&self, open: bool) {
        self.push(SinkEvent::AddressBook { open });
    }

    fn trigger_transaction(&self, kind: TransactionKind, payload: Value) {
        self.push(SinkEvent::Transaction { kind, payload });
    }
}
