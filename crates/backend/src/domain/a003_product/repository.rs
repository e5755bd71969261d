use async_trait::async_trait;
use chrono::Utc;
use contracts::domain::a003_product::aggregate::{Product, ProductId, TaxRate};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, QuerySelect, Set};

use crate::shared::crud::search::contains_any;
use crate::shared::crud::{CrudRepository, RepositoryError};

/// `price` is kept as decimal text so no binary float ever touches it
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "a003_product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub tax_rate: i32,
    pub image: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Product {
    type Error = RepositoryError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let price = Decimal::from_str(&m.price).map_err(|e| {
            RepositoryError::InvalidRow(format!("product {} price {:?}: {}", m.id, m.price, e))
        })?;
        let tax_rate = TaxRate::try_from(m.tax_rate)
            .map_err(|e| RepositoryError::InvalidRow(format!("product {}: {}", m.id, e)))?;
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        Ok(Product {
            base: BaseAggregate::with_metadata(ProductId(uuid), metadata),
            name: m.name,
            description: m.description,
            price,
            tax_rate,
            image: m.image,
        })
    }
}

fn to_active(product: &Product) -> ActiveModel {
    ActiveModel {
        id: Set(product.base.id.value().to_string()),
        name: Set(product.name.clone()),
        description: Set(product.description.clone()),
        price: Set(product.price.to_string()),
        tax_rate: Set(product.tax_rate.percent()),
        image: Set(product.image.clone()),
        created_at: Set(Some(product.base.metadata.created_at)),
        updated_at: Set(Some(product.base.metadata.updated_at)),
        version: Set(product.base.metadata.version),
    }
}

const SEARCH_COLUMNS: [Column; 2] = [Column::Name, Column::Description];

#[derive(Clone)]
pub struct ProductRepository {
    conn: DatabaseConnection,
}

impl ProductRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl CrudRepository for ProductRepository {
    type Aggregate = Product;

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
    ) -> Result<Vec<Product>, RepositoryError> {
        Entity::find()
            .filter(contains_any(&SEARCH_COLUMNS, search))
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Entity::find_by_id(id.value().to_string())
            .one(&self.conn)
            .await?
            .map(Product::try_from)
            .transpose()
    }

    async fn insert(&self, product: &Product) -> Result<(), RepositoryError> {
        to_active(product).insert(&self.conn).await?;
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<bool, RepositoryError> {
        let mut active = to_active(product);
        active.created_at = sea_orm::ActiveValue::NotSet;
        let result = Entity::update_many()
            .set(active)
            .filter(Column::Id.eq(product.base.id.value().to_string()))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = Entity::delete_by_id(id.value().to_string())
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a003_product::aggregate::ProductForm;

    use crate::shared::crud::{CrudController, CrudError, ListQuery};
    use crate::shared::data::db::{initialize_database, IN_MEMORY};

    async fn controller() -> CrudController<ProductRepository, ProductForm> {
        let conn = initialize_database(IN_MEMORY).await.unwrap();
        CrudController::new(ProductRepository::new(conn), 12)
    }

    fn form(name: &str, price: &str, tax_rate: &str) -> ProductForm {
        ProductForm {
            name: name.into(),
            description: format!("{} para todo tipo de piel", name),
            price: price.into(),
            tax_rate: tax_rate.into(),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_price_survives_storage_exactly() {
        let controller = controller().await;
        let created = controller.create(&form("Sérum Vitamina C", "28.99", "15")).await.unwrap();

        let loaded = controller.get(&created.base.id.to_string()).await.unwrap();
        assert_eq!(loaded.price.to_string(), "28.99");
        assert_eq!(loaded.tax_rate, TaxRate::Standard);
        assert_eq!(loaded.price_with_tax_rounded().to_string(), "33.34");
    }

    #[tokio::test]
    async fn test_invalid_price_is_not_saved() {
        let controller = controller().await;
        match controller.create(&form("Tónico", "0", "15")).await {
            Err(CrudError::Validation(errors)) => assert!(errors.has("price")),
            other => panic!("expected validation error, got {:?}", other.map(|p| p.name)),
        }
        assert_eq!(controller.list(&ListQuery::default()).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_list_orders_by_name_and_searches_description() {
        let controller = controller().await;
        controller.create(&form("Labial Mate", "9.50", "15")).await.unwrap();
        controller.create(&form("Crema Hidratante", "15.00", "0")).await.unwrap();
        controller.create(&form("Base Líquida", "25.99", "15")).await.unwrap();

        let page = controller.list(&ListQuery::default()).await.unwrap();
        let names: Vec<&str> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Base Líquida", "Crema Hidratante", "Labial Mate"]);

        let query = ListQuery {
            page: None,
            q: Some("TIPO DE PIEL".into()),
        };
        assert_eq!(controller.list(&query).await.unwrap().total, 3);
    }

    #[test]
    fn test_corrupt_price_is_reported() {
        let model = Model {
            id: Uuid::new_v4().to_string(),
            name: "x".into(),
            description: "x".into(),
            price: "twelve".into(),
            tax_rate: 15,
            image: None,
            created_at: None,
            updated_at: None,
            version: 0,
        };
        assert!(matches!(
            Product::try_from(model),
            Err(RepositoryError::InvalidRow(_))
        ));
    }
}
