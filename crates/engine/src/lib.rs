pub mod memory;
pub mod processor;
pub mod store;

pub use memory::InMemoryVerificationStore;
pub use processor::{DispatchOutcome, ProcessOutcome, dispatch, process_registration, record};
pub use store::{MySqlVerificationStore, VerificationStore, upsert_verification};
