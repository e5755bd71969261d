use async_trait::async_trait;
use chrono::Utc;
use contracts::domain::a002_worker::aggregate::{Worker, WorkerId};
use contracts::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};
use contracts::shared::validation::FieldErrors;
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{Condition, QueryOrder, QuerySelect, Set};

use crate::shared::crud::search::contains_any;
use crate::shared::crud::{unique_violation, CrudRepository, RepositoryError};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "a002_worker")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub national_id: String,
    pub employee_code: String,
    pub image: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Worker {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        Worker {
            base: BaseAggregate::with_metadata(WorkerId(uuid), metadata),
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            national_id: m.national_id,
            employee_code: m.employee_code,
            image: m.image,
        }
    }
}

fn to_active(worker: &Worker) -> ActiveModel {
    ActiveModel {
        id: Set(worker.base.id.value().to_string()),
        first_name: Set(worker.first_name.clone()),
        last_name: Set(worker.last_name.clone()),
        email: Set(worker.email.clone()),
        national_id: Set(worker.national_id.clone()),
        employee_code: Set(worker.employee_code.clone()),
        image: Set(worker.image.clone()),
        created_at: Set(Some(worker.base.metadata.created_at)),
        updated_at: Set(Some(worker.base.metadata.updated_at)),
        version: Set(worker.base.metadata.version),
    }
}

/// Columns matched by the list search box
const SEARCH_COLUMNS: [Column; 5] = [
    Column::FirstName,
    Column::LastName,
    Column::Email,
    Column::NationalId,
    Column::EmployeeCode,
];

#[derive(Clone)]
pub struct WorkerRepository {
    conn: DatabaseConnection,
}

impl WorkerRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn taken_by_other(
        &self,
        column: Column,
        value: &str,
        id: &str,
    ) -> Result<bool, RepositoryError> {
        let found = Entity::find()
            .filter(
                Condition::all()
                    .add(column.eq(value))
                    .add(Column::Id.ne(id)),
            )
            .one(&self.conn)
            .await?;
        Ok(found.is_some())
    }
}

#[async_trait]
impl CrudRepository for WorkerRepository {
    type Aggregate = Worker;

    async fn count(&self, search: Option<&str>) -> Result<u64, RepositoryError> {
        Ok(Entity::find()
            .filter(contains_any(&SEARCH_COLUMNS, search))
            .count(&self.conn)
            .await?)
    }

    async fn fetch_page(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Worker>, RepositoryError> {
        let items = Entity::find()
            .filter(contains_any(&SEARCH_COLUMNS, search))
            .order_by_asc(Column::FirstName)
            .order_by_asc(Column::LastName)
            .order_by_asc(Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok(items)
    }

    async fn get(&self, id: WorkerId) -> Result<Option<Worker>, RepositoryError> {
        let result = Entity::find_by_id(id.value().to_string())
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn insert(&self, worker: &Worker) -> Result<(), RepositoryError> {
        to_active(worker).insert(&self.conn).await?;
        Ok(())
    }

    async fn update(&self, worker: &Worker) -> Result<bool, RepositoryError> {
        let mut active = to_active(worker);
        active.created_at = sea_orm::ActiveValue::NotSet;
        let result = Entity::update_many()
            .set(active)
            .filter(Column::Id.eq(worker.base.id.value().to_string()))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, id: WorkerId) -> Result<bool, RepositoryError> {
        let result = Entity::delete_by_id(id.value().to_string())
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn find_conflicts(&self, worker: &Worker) -> Result<FieldErrors, RepositoryError> {
        let id = worker.base.id.value().to_string();
        let mut errors = FieldErrors::new();
        if self
            .taken_by_other(Column::NationalId, &worker.national_id, &id)
            .await?
        {
            errors.merge(unique_violation(Worker::element_name(), "national_id"));
        }
        if self
            .taken_by_other(Column::EmployeeCode, &worker.employee_code, &id)
            .await?
        {
            errors.merge(unique_violation(Worker::element_name(), "employee_code"));
        }
        Ok(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a002_worker::aggregate::WorkerForm;
    use contracts::domain::common::AggregateForm;

    use crate::shared::crud::{CrudController, CrudError, ListQuery};
    use crate::shared::data::db::{initialize_database, IN_MEMORY};

    type Controller = CrudController<WorkerRepository, WorkerForm>;

    async fn controller() -> Controller {
        let conn = initialize_database(IN_MEMORY).await.unwrap();
        CrudController::new(WorkerRepository::new(conn), 8)
    }

    fn form(first_name: &str, national_id: &str, employee_code: &str) -> WorkerForm {
        WorkerForm {
            first_name: first_name.into(),
            last_name: "Paredes".into(),
            email: format!("{}@cosmetica.ec", first_name.to_lowercase()),
            national_id: national_id.into(),
            employee_code: employee_code.into(),
            image: None,
        }
    }

    fn query(page: Option<&str>, q: Option<&str>) -> ListQuery {
        ListQuery {
            page: page.map(str::to_string),
            q: q.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let controller = controller().await;
        let created = controller.create(&form("Ana", "0912345678", "EMP-001")).await.unwrap();

        let loaded = controller.get(&created.base.id.to_string()).await.unwrap();
        assert_eq!(loaded.full_name(), "Ana Paredes");
        assert_eq!(loaded.national_id, "0912345678");
        assert_eq!(loaded.base.metadata.version, 0);
    }

    #[tokio::test]
    async fn test_duplicate_national_id_is_a_field_error() {
        let controller = controller().await;
        controller.create(&form("Ana", "0912345678", "EMP-001")).await.unwrap();

        match controller.create(&form("Luis", "0912345678", "EMP-002")).await {
            Err(CrudError::Conflict(errors)) => {
                assert_eq!(
                    errors.get("national_id"),
                    ["Worker with this national id already exists.".to_string()]
                );
                assert!(!errors.has("employee_code"));
            }
            other => panic!("expected conflict, got {:?}", other.map(|w| w.full_name())),
        }
        assert_eq!(controller.list(&ListQuery::default()).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_unique_index_backs_up_advisory_check() {
        let conn = initialize_database(IN_MEMORY).await.unwrap();
        let repository = WorkerRepository::new(conn);
        let first = form("Ana", "0912345678", "EMP-001").create().unwrap();
        let second = form("Luis", "0987654321", "EMP-001").create().unwrap();

        repository.insert(&first).await.unwrap();
        match repository.insert(&second).await {
            Err(RepositoryError::UniqueViolation { column }) => assert_eq!(column, "employee_code"),
            other => panic!("expected unique violation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_keeps_own_unique_values() {
        let controller = controller().await;
        let created = controller.create(&form("Ana", "0912345678", "EMP-001")).await.unwrap();
        let id = created.base.id.to_string();

        let mut edit = WorkerForm::from_aggregate(&created);
        edit.last_name = "Villacís".into();
        let updated = controller.update(&id, &edit).await.unwrap();

        assert_eq!(updated.last_name, "Villacís");
        assert_eq!(updated.base.metadata.version, 1);
        assert_eq!(controller.get(&id).await.unwrap().base.metadata.version, 1);
    }

    #[tokio::test]
    async fn test_invalid_update_persists_nothing() {
        let controller = controller().await;
        let created = controller.create(&form("Ana", "0912345678", "EMP-001")).await.unwrap();
        let id = created.base.id.to_string();

        let mut edit = WorkerForm::from_aggregate(&created);
        edit.email = "not-an-email".into();
        assert!(matches!(
            controller.update(&id, &edit).await,
            Err(CrudError::Validation(_))
        ));
        assert_eq!(controller.get(&id).await.unwrap().email, "ana@cosmetica.ec");
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let controller = controller().await;
        let unknown = Uuid::new_v4().to_string();
        assert!(matches!(controller.get(&unknown).await, Err(CrudError::NotFound)));
        assert!(matches!(controller.get("42").await, Err(CrudError::NotFound)));
        assert!(matches!(controller.delete(&unknown).await, Err(CrudError::NotFound)));
        assert!(matches!(
            controller.update(&unknown, &form("Ana", "0912345678", "EMP-001")).await,
            Err(CrudError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_pagination_and_ordering() {
        let controller = controller().await;
        let names = ["Valeria", "Andrés", "Carla", "Bruno", "Diana", "Elena", "Fabián", "Gabriela", "Hugo", "Inés"];
        for (i, name) in names.iter().enumerate() {
            controller
                .create(&form(name, &format!("09000000{:02}", i), &format!("EMP-{:03}", i)))
                .await
                .unwrap();
        }

        let first = controller.list(&query(None, None)).await.unwrap();
        assert_eq!(first.total, 10);
        assert_eq!(first.num_pages, 2);
        assert_eq!(first.items.len(), 8);
        assert_eq!(first.items[0].first_name, "Andrés");
        assert!(first.has_next);

        let last = controller.list(&query(Some("last"), None)).await.unwrap();
        assert_eq!(last.number, 2);
        assert_eq!(last.items.len(), 2);
        assert_eq!(last.items[1].first_name, "Valeria");

        assert_eq!(controller.list(&query(Some("99"), None)).await.unwrap().number, 2);
        assert_eq!(controller.list(&query(Some("0"), None)).await.unwrap().number, 1);
        assert_eq!(controller.list(&query(Some("abc"), None)).await.unwrap().number, 1);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let controller = controller().await;
        controller.create(&form("Ana", "0912345678", "EMP-001")).await.unwrap();
        controller.create(&form("Mariana", "0923456789", "EMP-002")).await.unwrap();
        controller.create(&form("Luis", "0934567890", "VND-003")).await.unwrap();

        let found = controller.list(&query(None, Some("  ANA "))).await.unwrap();
        assert_eq!(found.total, 2);

        let by_code = controller.list(&query(None, Some("vnd"))).await.unwrap();
        assert_eq!(by_code.total, 1);
        assert_eq!(by_code.items[0].first_name, "Luis");

        let wildcard = controller.list(&query(None, Some("%"))).await.unwrap();
        assert_eq!(wildcard.total, 0);

        let empty = controller.list(&query(None, Some("zzz"))).await.unwrap();
        assert_eq!(empty.total, 0);
        assert_eq!(empty.num_pages, 1);
        assert!(empty.items.is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let controller = controller().await;
        let created = controller.create(&form("Ana", "0912345678", "EMP-001")).await.unwrap();
        let id = created.base.id.to_string();

        controller.delete(&id).await.unwrap();
        assert!(matches!(controller.get(&id).await, Err(CrudError::NotFound)));
        assert_eq!(controller.list(&ListQuery::default()).await.unwrap().total, 0);
    }
}
