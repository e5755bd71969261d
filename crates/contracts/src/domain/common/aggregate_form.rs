use serde::{de::DeserializeOwned, Serialize};

use super::AggregateRoot;
use crate::shared::validation::FieldErrors;

/// Submitted form of an aggregate.
///
/// Holds the raw field values exactly as the client sent them, so a failed
/// submission can be rendered back with the input preserved. Cleaning a form
/// performs the field-level validation; record-level checks (uniqueness)
/// belong to the repository.
pub trait AggregateForm:
    Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Aggregate: AggregateRoot;

    /// Validate the form and build a new aggregate from it
    fn create(&self) -> Result<Self::Aggregate, FieldErrors>;

    /// Validate the form and copy its values onto an existing aggregate.
    /// The aggregate is left untouched when validation fails.
    fn apply_to(&self, aggregate: &mut Self::Aggregate) -> Result<(), FieldErrors>;

    /// Pre-fill a form from a stored aggregate (update pages)
    fn from_aggregate(aggregate: &Self::Aggregate) -> Self;
}
