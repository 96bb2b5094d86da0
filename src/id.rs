//! Unique memory ID generation.
//!
//! IDs must be collision-free within a collection and are never reused after
//! deletion; time-ordered IDs keep `created_at`-adjacent records adjacent in
//! the store. UUID v7 satisfies both, but any conforming generator can be
//! swapped in via [`IdGenerator`].

/// Source of unique, ideally time-ordered, memory IDs.
pub trait IdGenerator: Send + Sync {
    /// Produce the next unique ID.
    fn generate(&self) -> String;
}

/// Default generator: UUID v7 (time-sortable).
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn generate(&self) -> String {
        uuid::Uuid::now_v7().to_string()
    }
}
