use contracts::domain::a001_company::aggregate::{Company, CompanyForm};
use contracts::domain::common::{AggregateId, AggregateRoot};
use sea_orm::DatabaseConnection;

use super::repository::CompanyRepository;
use crate::shared::crud::{unique_violation, CrudError, RepositoryError};

/// Singleton company profile: at most one record, addressed without an id
pub struct CompanyService {
    repository: CompanyRepository,
}

impl CompanyService {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            repository: CompanyRepository::new(conn),
        }
    }

    /// `Ok(None)` means no company has been recorded yet
    pub async fn get_singleton(&self) -> Result<Option<Company>, CrudError> {
        Ok(self.repository.get_singleton().await?)
    }

    pub async fn exists(&self) -> Result<bool, CrudError> {
        Ok(self.repository.exists().await?)
    }

    /// Create the company unless one already exists
    pub async fn create_if_absent(
        &self,
        form: &CompanyForm,
        current_year: i32,
    ) -> Result<Company, CrudError> {
        if self.repository.exists().await? {
            return Err(CrudError::AlreadyExists);
        }
        let data = form.clean(current_year).map_err(CrudError::Validation)?;

        let mut company = Company::new_for_insert(data);
        company.before_insert();
        self.insert(&company).await?;
        Ok(company)
    }

    /// Store a new company. A concurrent create that got there first trips the
    /// singleton index and is reported as `AlreadyExists`.
    async fn insert(&self, company: &Company) -> Result<(), CrudError> {
        match self.repository.insert(company).await {
            Ok(()) => {}
            // Both unique indexes of the table can only fire once a row exists
            Err(RepositoryError::UniqueViolation { .. }) => return Err(CrudError::AlreadyExists),
            Err(e) => return Err(e.into()),
        }
        tracing::info!("Company {} created", company.id().as_string());
        Ok(())
    }

    pub async fn update_singleton(
        &self,
        form: &CompanyForm,
        current_year: i32,
    ) -> Result<Company, CrudError> {
        let mut company = self
            .repository
            .get_singleton()
            .await?
            .ok_or(CrudError::NotFound)?;
        let data = form.clean(current_year).map_err(CrudError::Validation)?;
        company.assign(data);

        company.before_update();
        match self.repository.update(&company).await {
            Ok(true) => {}
            Ok(false) => return Err(CrudError::NotFound),
            Err(RepositoryError::UniqueViolation { column }) => {
                return Err(CrudError::Conflict(unique_violation(
                    Company::element_name(),
                    &column,
                )))
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!("Company {} updated", company.id().as_string());
        Ok(company)
    }

    pub async fn delete_singleton(&self) -> Result<(), CrudError> {
        let company = self
            .repository
            .get_singleton()
            .await?
            .ok_or(CrudError::NotFound)?;
        if !self.repository.delete(company.id()).await? {
            return Err(CrudError::NotFound);
        }
        tracing::info!("Company {} deleted", company.id().as_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::{initialize_database, IN_MEMORY};

    const YEAR: i32 = 2026;

    async fn service() -> CompanyService {
        CompanyService::new(initialize_database(IN_MEMORY).await.unwrap())
    }

    fn form(name: &str) -> CompanyForm {
        CompanyForm {
            name: name.into(),
            address: "Av. 6 de Diciembre N24-253, Quito".into(),
            mission: "Cosmética natural al alcance de todos".into(),
            vision: "Ser la cadena de belleza de referencia del país".into(),
            founding_year: "2015".into(),
            tax_id: "1790012345001".into(),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_empty_company_is_no_information() {
        let service = service().await;
        assert!(service.get_singleton().await.unwrap().is_none());
        assert!(!service.exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_second_create_is_refused() {
        let service = service().await;
        let created = service.create_if_absent(&form("Bella"), YEAR).await.unwrap();
        assert_eq!(created.years_of_operation(YEAR), 11);

        assert!(matches!(
            service.create_if_absent(&form("Otra"), YEAR).await,
            Err(CrudError::AlreadyExists)
        ));
        let stored = service.get_singleton().await.unwrap().unwrap();
        assert_eq!(stored.name, "Bella");
    }

    #[tokio::test]
    async fn test_racing_insert_is_refused_by_storage() {
        let service = service().await;
        service.create_if_absent(&form("Bella"), YEAR).await.unwrap();

        // Passed the existence check before the first row landed
        let mut late = form("Otra");
        late.tax_id = "0990000000001".into();
        let mut company = Company::new_for_insert(late.clean(YEAR).unwrap());
        company.before_insert();
        assert!(matches!(
            service.insert(&company).await,
            Err(CrudError::AlreadyExists)
        ));

        let stored = service.get_singleton().await.unwrap().unwrap();
        assert_eq!(stored.name, "Bella");
    }

    #[tokio::test]
    async fn test_invalid_form_creates_nothing() {
        let service = service().await;
        let mut invalid = form("Bella");
        invalid.founding_year = "1799".into();
        assert!(matches!(
            service.create_if_absent(&invalid, YEAR).await,
            Err(CrudError::Validation(_))
        ));
        assert!(!service.exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_update_and_delete_singleton() {
        let service = service().await;
        assert!(matches!(
            service.update_singleton(&form("Bella"), YEAR).await,
            Err(CrudError::NotFound)
        ));

        service.create_if_absent(&form("Bella"), YEAR).await.unwrap();
        let updated = service.update_singleton(&form("Bella Cosmetics"), YEAR).await.unwrap();
        assert_eq!(updated.name, "Bella Cosmetics");
        assert_eq!(updated.base.metadata.version, 1);

        service.delete_singleton().await.unwrap();
        assert!(service.get_singleton().await.unwrap().is_none());
        assert!(matches!(service.delete_singleton().await, Err(CrudError::NotFound)));

        // A fresh company may be created once the old one is gone
        service.create_if_absent(&form("Nueva"), YEAR).await.unwrap();
    }
}
