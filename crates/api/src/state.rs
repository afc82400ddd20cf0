use std::sync::Arc;

use engine::{BookingLedger, CatalogStore, EventHub};

#[derive(Clone)]
pub struct AppState {
    catalog: Arc<CatalogStore>,
    ledger: Arc<BookingLedger>,
    events: EventHub,
}

impl AppState {
    pub fn new() -> Self {
        let events = EventHub::new();
        let catalog = Arc::new(CatalogStore::new(events.clone()));
        let ledger = Arc::new(BookingLedger::new());

        Self {
            catalog,
            ledger,
            events,
        }
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn ledger(&self) -> &BookingLedger {
        &self.ledger
    }

    pub fn events(&self) -> &EventHub {
        &self.events
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
