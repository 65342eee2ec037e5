//! Handlers that consume routed board events

use super::events::RealtimeEvent;
use crate::application::SharedStore;
use realtime::MessageHandler;
use tracing::debug;

/// Applies realtime events to the shared store
///
/// Opt-in: channels built without it only log what they receive.
pub struct StoreSyncHandler {
    store: SharedStore,
}

impl StoreSyncHandler {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

impl MessageHandler<RealtimeEvent> for StoreSyncHandler {
    fn handle(&mut self, message: RealtimeEvent) -> realtime::Result<()> {
        match message {
            RealtimeEvent::Board(event) => {
                let kind = event.event_type();
                if !self.store.write().apply_event(&event) {
                    debug!("Event {} did not change the store", kind);
                }
            }
            RealtimeEvent::Other(value) => {
                debug!("Ignoring unrecognised envelope: {}", value);
            }
        }
        Ok(())
    }
}
