use async_trait::async_trait;
use contracts::domain::common::AggregateRoot;
use contracts::shared::validation::FieldErrors;

use super::error::RepositoryError;

/// Id type of a repository's aggregate
pub type IdOf<R> = <<R as CrudRepository>::Aggregate as AggregateRoot>::Id;

/// Persistence seam of the generic CRUD flow.
///
/// `search` is an already normalized, non-empty query; `None` lists
/// everything. Listing order is fixed per aggregate.
#[async_trait]
pub trait CrudRepository: Send + Sync {
    type Aggregate: AggregateRoot + Send + Sync;

    async fn count(&self, search: Option<&str>) -> Result<u64, RepositoryError>;

    async fn fetch_page(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Self::Aggregate>, RepositoryError>;

    async fn get(&self, id: IdOf<Self>) -> Result<Option<Self::Aggregate>, RepositoryError>;

    async fn insert(&self, aggregate: &Self::Aggregate) -> Result<(), RepositoryError>;

    /// Returns `false` when the record no longer exists
    async fn update(&self, aggregate: &Self::Aggregate) -> Result<bool, RepositoryError>;

    /// Returns `false` when the record no longer exists
    async fn delete(&self, id: IdOf<Self>) -> Result<bool, RepositoryError>;

    /// Unique fields of `aggregate` already used by another record.
    /// Advisory only, the unique indexes have the final word.
    async fn find_conflicts(
        &self,
        _aggregate: &Self::Aggregate,
    ) -> Result<FieldErrors, RepositoryError> {
        Ok(FieldErrors::new())
    }
}
