use async_trait::async_trait;
use chrono::Utc;
use contracts::domain::a004_supplier::aggregate::{Supplier, SupplierId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, QuerySelect, Set};

use crate::shared::crud::search::contains_any;
use crate::shared::crud::{CrudRepository, RepositoryError};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "a004_supplier")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: String,
    pub phone: String,
    pub country: String,
    pub email: String,
    pub address: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Supplier {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        Supplier {
            base: BaseAggregate::with_metadata(SupplierId(uuid), metadata),
            name: m.name,
            description: m.description,
            phone: m.phone,
            country: m.country,
            email: m.email,
            address: m.address,
        }
    }
}

fn to_active(supplier: &Supplier) -> ActiveModel {
    ActiveModel {
        id: Set(supplier.base.id.value().to_string()),
        name: Set(supplier.name.clone()),
        description: Set(supplier.description.clone()),
        phone: Set(supplier.phone.clone()),
        country: Set(supplier.country.clone()),
        email: Set(supplier.email.clone()),
        address: Set(supplier.address.clone()),
        created_at: Set(Some(supplier.base.metadata.created_at)),
        updated_at: Set(Some(supplier.base.metadata.updated_at)),
        version: Set(supplier.base.metadata.version),
    }
}

const SEARCH_COLUMNS: [Column; 4] = [
    Column::Name,
    Column::Description,
    Column::Country,
    Column::Email,
];

#[derive(Clone)]
pub struct SupplierRepository {
    conn: DatabaseConnection,
}

impl SupplierRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl CrudRepository for SupplierRepository {
    type Aggregate = Supplier;

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
    ) -> Result<Vec<Supplier>, RepositoryError> {
        let items = Entity::find()
            .filter(contains_any(&SEARCH_COLUMNS, search))
            .order_by_asc(Column::Name)
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

    async fn get(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
        let result = Entity::find_by_id(id.value().to_string())
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn insert(&self, supplier: &Supplier) -> Result<(), RepositoryError> {
        to_active(supplier).insert(&self.conn).await?;
        Ok(())
    }

    async fn update(&self, supplier: &Supplier) -> Result<bool, RepositoryError> {
        let mut active = to_active(supplier);
        active.created_at = sea_orm::ActiveValue::NotSet;
        let result = Entity::update_many()
            .set(active)
            .filter(Column::Id.eq(supplier.base.id.value().to_string()))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, id: SupplierId) -> Result<bool, RepositoryError> {
        let result = Entity::delete_by_id(id.value().to_string())
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a004_supplier::aggregate::SupplierForm;

    use crate::shared::crud::{CrudController, ListQuery};
    use crate::shared::data::db::{initialize_database, IN_MEMORY};

    fn form(name: &str, country: &str) -> SupplierForm {
        SupplierForm {
            name: name.into(),
            description: "Distribuidor de fragancias".into(),
            phone: "+593 2 255 0101".into(),
            country: country.into(),
            email: "ventas@proveedor.com".into(),
            address: "Av. Amazonas N34-12".into(),
        }
    }

    #[tokio::test]
    async fn test_search_by_country_and_page_size() {
        let conn = initialize_database(IN_MEMORY).await.unwrap();
        let controller: CrudController<SupplierRepository, SupplierForm> =
            CrudController::new(SupplierRepository::new(conn), 12);

        for i in 0..13 {
            let country = if i % 2 == 0 { "Ecuador" } else { "Perú" };
            controller
                .create(&form(&format!("Proveedor {:02}", i), country))
                .await
                .unwrap();
        }

        let all = controller.list(&ListQuery::default()).await.unwrap();
        assert_eq!(all.total, 13);
        assert_eq!(all.num_pages, 2);
        assert_eq!(all.items.len(), 12);
        assert_eq!(all.items[0].name, "Proveedor 00");

        let query = ListQuery {
            page: Some("last".into()),
            q: Some("ecuador".into()),
        };
        let ecuador = controller.list(&query).await.unwrap();
        assert_eq!(ecuador.total, 7);
        assert_eq!(ecuador.number, 1);
    }
}
