//! Core domain entities
//!
//! Pure data structures with their invariants - no I/O or store access.

mod account;
mod journal;
mod pipeline;
pub mod result;
mod resultset;

pub use account::Account;
pub use journal::JournalEntry;
pub use pipeline::PipelineState;
pub use resultset::ResultSet;
