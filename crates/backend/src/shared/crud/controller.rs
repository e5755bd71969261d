use std::marker::PhantomData;

use contracts::domain::common::{AggregateForm, AggregateId, AggregateRoot};
use contracts::shared::pagination::{num_pages, page_offset, resolve_page_number, Page};
use serde::Deserialize;

use super::error::{unique_violation, CrudError, RepositoryError};
use super::repository::{CrudRepository, IdOf};
use super::search::normalize_query;

/// Query string of a list page: `?page=<n|last>&q=<text>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub q: Option<String>,
}

/// Create/read/update/delete over one aggregate type.
///
/// `F` is the form that cleans submitted text into the aggregate.
pub struct CrudController<R, F> {
    repository: R,
    page_size: u64,
    _form: PhantomData<fn() -> F>,
}

impl<R, F> CrudController<R, F>
where
    R: CrudRepository,
    F: AggregateForm<Aggregate = R::Aggregate>,
{
    pub fn new(repository: R, page_size: u64) -> Self {
        Self {
            repository,
            page_size: page_size.max(1),
            _form: PhantomData,
        }
    }

    /// One page of records matching the optional search text.
    /// The page token is clamped into the existing pages.
    pub async fn list(&self, query: &ListQuery) -> Result<Page<R::Aggregate>, CrudError> {
        let search = normalize_query(query.q.as_deref());
        let total = self.repository.count(search.as_deref()).await?;
        let pages = num_pages(total, self.page_size);
        let number = resolve_page_number(query.page.as_deref(), pages);
        let items = self
            .repository
            .fetch_page(
                search.as_deref(),
                self.page_size,
                page_offset(number, self.page_size),
            )
            .await?;
        Ok(Page::new(items, number, total, self.page_size))
    }

    /// Path ids that do not parse address no record
    pub fn parse_id(id: &str) -> Result<IdOf<R>, CrudError> {
        <IdOf<R> as AggregateId>::from_string(id).map_err(|_| CrudError::NotFound)
    }

    pub async fn get(&self, id: &str) -> Result<R::Aggregate, CrudError> {
        let id = Self::parse_id(id)?;
        self.repository.get(id).await?.ok_or(CrudError::NotFound)
    }

    pub fn blank_form(&self) -> F {
        F::default()
    }

    /// Record together with a form prefilled from it
    pub async fn edit_form(&self, id: &str) -> Result<(R::Aggregate, F), CrudError> {
        let aggregate = self.get(id).await?;
        let form = F::from_aggregate(&aggregate);
        Ok((aggregate, form))
    }

    pub async fn create(&self, form: &F) -> Result<R::Aggregate, CrudError> {
        let mut aggregate = form.create().map_err(CrudError::Validation)?;
        self.check_conflicts(&aggregate).await?;

        aggregate.before_insert();
        self.repository
            .insert(&aggregate)
            .await
            .map_err(Self::write_error)?;

        tracing::info!(
            "{} {} created",
            R::Aggregate::full_name(),
            aggregate.id().as_string()
        );
        Ok(aggregate)
    }

    pub async fn update(&self, id: &str, form: &F) -> Result<R::Aggregate, CrudError> {
        let mut aggregate = self.get(id).await?;
        form.apply_to(&mut aggregate)
            .map_err(CrudError::Validation)?;
        self.check_conflicts(&aggregate).await?;

        aggregate.before_update();
        let updated = self
            .repository
            .update(&aggregate)
            .await
            .map_err(Self::write_error)?;
        if !updated {
            return Err(CrudError::NotFound);
        }

        tracing::info!(
            "{} {} updated",
            R::Aggregate::full_name(),
            aggregate.id().as_string()
        );
        Ok(aggregate)
    }

    pub async fn delete(&self, id: &str) -> Result<(), CrudError> {
        let id = Self::parse_id(id)?;
        if !self.repository.delete(id).await? {
            return Err(CrudError::NotFound);
        }
        tracing::info!("{} {} deleted", R::Aggregate::full_name(), id.as_string());
        Ok(())
    }

    async fn check_conflicts(&self, aggregate: &R::Aggregate) -> Result<(), CrudError> {
        let conflicts = self.repository.find_conflicts(aggregate).await?;
        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(CrudError::Conflict(conflicts))
        }
    }

    fn write_error(err: RepositoryError) -> CrudError {
        match err {
            RepositoryError::UniqueViolation { column } => {
                CrudError::Conflict(unique_violation(R::Aggregate::element_name(), &column))
            }
            other => CrudError::Repository(other),
        }
    }
}
