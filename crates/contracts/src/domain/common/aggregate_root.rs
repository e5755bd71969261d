use super::{AggregateId, EntityMetadata};

/// Trait for aggregate roots
///
/// Defines the instance accessors and the static naming metadata that the
/// generic CRUD layer needs for every aggregate of the system.
pub trait AggregateRoot {
    /// Aggregate identifier type
    type Id: AggregateId;

    // ============================================================================
    // Instance methods
    // ============================================================================

    /// Record id
    fn id(&self) -> Self::Id;

    /// Lifecycle metadata
    fn metadata(&self) -> &EntityMetadata;

    /// Mutable lifecycle metadata
    fn metadata_mut(&mut self) -> &mut EntityMetadata;

    // ============================================================================
    // Class metadata
    // ============================================================================

    /// Aggregate index in the system (e.g. "a002")
    fn aggregate_index() -> &'static str;

    /// Collection name used for storage (e.g. "worker")
    fn collection_name() -> &'static str;

    /// Singular display name (e.g. "Worker")
    fn element_name() -> &'static str;

    /// Plural display name (e.g. "Workers")
    fn list_name() -> &'static str;

    // ============================================================================
    // Default implementations
    // ============================================================================

    /// Full aggregate name, also the table name (e.g. "a002_worker")
    fn full_name() -> String {
        format!("{}_{}", Self::aggregate_index(), Self::collection_name())
    }

    /// Hook executed before every insert
    fn before_insert(&mut self) {
        self.metadata_mut().touch();
    }

    /// Hook executed before every update
    fn before_update(&mut self) {
        let metadata = self.metadata_mut();
        metadata.touch();
        metadata.increment_version();
    }
}
