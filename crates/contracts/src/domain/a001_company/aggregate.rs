use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::validation::{FieldErrors, ValidationRules};

// ============================================================================
// ID Type
// ============================================================================

crate::uuid_aggregate_id!(
    /// Company id
    CompanyId
);

/// Earliest accepted founding year
pub const MIN_FOUNDING_YEAR: i32 = 1800;

/// Current calendar year (UTC)
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// The business itself. At most one record exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    #[serde(flatten)]
    pub base: BaseAggregate<CompanyId>,

    pub name: String,
    pub address: String,
    pub mission: String,
    pub vision: String,
    pub founding_year: i32,
    /// Tax identification number (RUC)
    pub tax_id: String,
    pub image: Option<String>,
}

impl Company {
    pub fn new_for_insert(data: CompanyData) -> Self {
        let mut company = Self {
            base: BaseAggregate::new(CompanyId::new_v4()),
            name: String::new(),
            address: String::new(),
            mission: String::new(),
            vision: String::new(),
            founding_year: 0,
            tax_id: String::new(),
            image: None,
        };
        company.assign(data);
        company
    }

    pub fn assign(&mut self, data: CompanyData) {
        self.name = data.name;
        self.address = data.address;
        self.mission = data.mission;
        self.vision = data.vision;
        self.founding_year = data.founding_year;
        self.tax_id = data.tax_id;
        self.image = data.image;
    }

    /// Years since foundation, computed against `current_year`
    pub fn years_of_operation(&self, current_year: i32) -> i32 {
        current_year - self.founding_year
    }
}

impl AggregateRoot for Company {
    type Id = CompanyId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a001"
    }

    fn collection_name() -> &'static str {
        "company"
    }

    fn element_name() -> &'static str {
        "Company"
    }

    fn list_name() -> &'static str {
        "Company"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// Raw company form as submitted
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CompanyForm {
    pub name: String,
    pub address: String,
    pub mission: String,
    pub vision: String,
    pub founding_year: String,
    pub tax_id: String,
    pub image: Option<String>,
}

/// Cleaned company values
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyData {
    pub name: String,
    pub address: String,
    pub mission: String,
    pub vision: String,
    pub founding_year: i32,
    pub tax_id: String,
    pub image: Option<String>,
}

impl CompanyForm {
    /// Field-level validation. The founding year must fall within
    /// [`MIN_FOUNDING_YEAR`, `current_year`].
    pub fn clean(&self, current_year: i32) -> Result<CompanyData, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = errors.text("name", &self.name, ValidationRules::required().max_length(200));
        let address = errors.text("address", &self.address, ValidationRules::required());
        let mission = errors.text("mission", &self.mission, ValidationRules::required());
        let vision = errors.text("vision", &self.vision, ValidationRules::required());
        let tax_id = errors.text("tax_id", &self.tax_id, ValidationRules::required().max_length(20));
        let image = errors.image("image", self.image.as_deref());

        let founding_year = match self.founding_year.trim() {
            "" => {
                errors.add("founding_year", crate::shared::validation::REQUIRED_MESSAGE);
                0
            }
            raw => match raw.parse::<i32>() {
                Ok(year) if (MIN_FOUNDING_YEAR..=current_year).contains(&year) => year,
                Ok(year) => {
                    errors.add(
                        "founding_year",
                        format!(
                            "The year must be between {} and {}.",
                            MIN_FOUNDING_YEAR, current_year
                        ),
                    );
                    year
                }
                Err(_) => {
                    errors.add("founding_year", "Enter a whole number.");
                    0
                }
            },
        };

        errors.into_result(CompanyData {
            name,
            address,
            mission,
            vision,
            founding_year,
            tax_id,
            image,
        })
    }
}

impl From<&Company> for CompanyForm {
    fn from(company: &Company) -> Self {
        Self {
            name: company.name.clone(),
            address: company.address.clone(),
            mission: company.mission.clone(),
            vision: company.vision.clone(),
            founding_year: company.founding_year.to_string(),
            tax_id: company.tax_id.clone(),
            image: company.image.clone(),
        }
    }
}
