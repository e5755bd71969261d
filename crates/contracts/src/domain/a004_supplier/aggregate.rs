use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateForm, AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::validation::{count_digits, FieldErrors, ValidationRules};

// ============================================================================
// ID Type
// ============================================================================

crate::uuid_aggregate_id!(
    /// Supplier id
    SupplierId
);

/// Digits a phone number needs once separators are stripped
pub const PHONE_MIN_DIGITS: usize = 7;

// ============================================================================
// Aggregate Root
// ============================================================================

/// Product supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    #[serde(flatten)]
    pub base: BaseAggregate<SupplierId>,

    pub name: String,
    pub description: String,
    /// Stored as entered, separators included
    pub phone: String,
    pub country: String,
    pub email: String,
    pub address: String,
}

impl Supplier {
    fn from_data(data: SupplierData) -> Self {
        Self {
            base: BaseAggregate::new(SupplierId::new_v4()),
            name: data.name,
            description: data.description,
            phone: data.phone,
            country: data.country,
            email: data.email,
            address: data.address,
        }
    }

    fn assign(&mut self, data: SupplierData) {
        self.name = data.name;
        self.description = data.description;
        self.phone = data.phone;
        self.country = data.country;
        self.email = data.email;
        self.address = data.address;
    }
}

impl AggregateRoot for Supplier {
    type Id = SupplierId;

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
        "a004"
    }

    fn collection_name() -> &'static str {
        "supplier"
    }

    fn element_name() -> &'static str {
        "Supplier"
    }

    fn list_name() -> &'static str {
        "Suppliers"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// Raw supplier form as submitted
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SupplierForm {
    pub name: String,
    pub description: String,
    pub phone: String,
    pub country: String,
    pub email: String,
    pub address: String,
}

/// Cleaned supplier values
#[derive(Debug, Clone, PartialEq)]
pub struct SupplierData {
    pub name: String,
    pub description: String,
    pub phone: String,
    pub country: String,
    pub email: String,
    pub address: String,
}

impl SupplierForm {
    pub fn clean(&self) -> Result<SupplierData, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = errors.text("name", &self.name, ValidationRules::required().max_length(200));
        let description = errors.text("description", &self.description, ValidationRules::required());
        let phone = errors.text("phone", &self.phone, ValidationRules::required().max_length(20));
        if !phone.is_empty() && !errors.has("phone") && count_digits(&phone) < PHONE_MIN_DIGITS {
            errors.add(
                "phone",
                format!("Phone must have at least {} digits.", PHONE_MIN_DIGITS),
            );
        }
        let country = errors.text("country", &self.country, ValidationRules::required().max_length(100));
        let email = errors.email("email", &self.email, 254);
        let address = errors.text("address", &self.address, ValidationRules::required());

        errors.into_result(SupplierData {
            name,
            description,
            phone,
            country,
            email,
            address,
        })
    }
}

impl AggregateForm for SupplierForm {
    type Aggregate = Supplier;

    fn create(&self) -> Result<Supplier, FieldErrors> {
        self.clean().map(Supplier::from_data)
    }

    fn apply_to(&self, supplier: &mut Supplier) -> Result<(), FieldErrors> {
        let data = self.clean()?;
        supplier.assign(data);
        Ok(())
    }

    fn from_aggregate(supplier: &Supplier) -> Self {
        Self {
            name: supplier.name.clone(),
            description: supplier.description.clone(),
            phone: supplier.phone.clone(),
            country: supplier.country.clone(),
            email: supplier.email.clone(),
            address: supplier.address.clone(),
        }
    }
}
