pub mod connection;
pub mod memory;
pub mod migrations;
pub mod preferences;

pub use connection::{connect, connect_with_settings, DbPool};
pub use memory::InMemoryPreferenceStore;
pub use preferences::SqlPreferenceStore;
