use shopfloor_store::JobStore;

/// Shared application state passed to every route handler.
///
/// Deliberately small: handlers never hold a worker or adapter reference.
/// Control requests are store writes, and the worker picks them up on its own
/// polls.
#[derive(Clone)]
pub struct AppState {
    pub store: JobStore,
}

impl AppState {
    pub fn new(store: JobStore) -> Self {
        Self { store }
    }
}
