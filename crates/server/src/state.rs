use std::sync::Arc;

use service::restaurant::ReservationStore;

/// Shared handler state; cloned per request.
#[derive(Clone)]
pub struct ServerState {
    pub reservations: Arc<ReservationStore>,
}

impl ServerState {
    pub fn new(reservations: ReservationStore) -> Self {
        Self { reservations: Arc::new(reservations) }
    }
}
