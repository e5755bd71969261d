use chrono::Utc;
use contracts::domain::a001_company::aggregate::{Company, CompanyId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, Set};

use crate::shared::crud::RepositoryError;

/// The table also holds `singleton_key`, fixed to 1 by the schema
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "a001_company")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub address: String,
    pub mission: String,
    pub vision: String,
    pub founding_year: i32,
    pub tax_id: String,
    pub image: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Company {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        Company {
            base: BaseAggregate::with_metadata(CompanyId(uuid), metadata),
            name: m.name,
            address: m.address,
            mission: m.mission,
            vision: m.vision,
            founding_year: m.founding_year,
            tax_id: m.tax_id,
            image: m.image,
        }
    }
}

fn to_active(company: &Company) -> ActiveModel {
    ActiveModel {
        id: Set(company.base.id.value().to_string()),
        name: Set(company.name.clone()),
        address: Set(company.address.clone()),
        mission: Set(company.mission.clone()),
        vision: Set(company.vision.clone()),
        founding_year: Set(company.founding_year),
        tax_id: Set(company.tax_id.clone()),
        image: Set(company.image.clone()),
        created_at: Set(Some(company.base.metadata.created_at)),
        updated_at: Set(Some(company.base.metadata.updated_at)),
        version: Set(company.base.metadata.version),
    }
}

#[derive(Clone)]
pub struct CompanyRepository {
    conn: DatabaseConnection,
}

impl CompanyRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// The company record, if one has been created
    pub async fn get_singleton(&self) -> Result<Option<Company>, RepositoryError> {
        let result = Entity::find()
            .order_by_asc(Column::CreatedAt)
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    pub async fn exists(&self) -> Result<bool, RepositoryError> {
        Ok(Entity::find().count(&self.conn).await? > 0)
    }

    pub async fn insert(&self, company: &Company) -> Result<(), RepositoryError> {
        to_active(company).insert(&self.conn).await?;
        Ok(())
    }

    pub async fn update(&self, company: &Company) -> Result<bool, RepositoryError> {
        let mut active = to_active(company);
        active.created_at = sea_orm::ActiveValue::NotSet;
        let result = Entity::update_many()
            .set(active)
            .filter(Column::Id.eq(company.base.id.value().to_string()))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn delete(&self, id: CompanyId) -> Result<bool, RepositoryError> {
        let result = Entity::delete_by_id(id.value().to_string())
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
