/// Persistence of the shared event state document.
pub mod app_state_store;
/// Database model definitions.
pub mod models;
/// Read-only access to awards, guests and rooms.
pub mod roster_store;
/// Backend-independent storage errors.
pub mod storage;
