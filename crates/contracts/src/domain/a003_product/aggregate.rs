use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::common::{AggregateForm, AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::validation::{FieldErrors, ValidationRules, REQUIRED_MESSAGE};

// ============================================================================
// ID Type
// ============================================================================

crate::uuid_aggregate_id!(
    /// Product id
    ProductId
);

/// Digits allowed in a price, including the two decimal places
pub const PRICE_MAX_DIGITS: u32 = 10;
/// Decimal places stored for a price
pub const PRICE_DECIMAL_PLACES: u32 = 2;

// ============================================================================
// Tax rate
// ============================================================================

/// VAT rate applied to a product, in percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum TaxRate {
    Exempt,
    Standard,
}

impl TaxRate {
    pub const ALL: [TaxRate; 2] = [TaxRate::Standard, TaxRate::Exempt];

    pub fn percent(self) -> i32 {
        match self {
            TaxRate::Exempt => 0,
            TaxRate::Standard => 15,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaxRate::Exempt => "0%",
            TaxRate::Standard => "15%",
        }
    }

    /// `1 + rate / 100`
    pub fn multiplier(self) -> Decimal {
        Decimal::ONE + Decimal::from(self.percent()) / Decimal::ONE_HUNDRED
    }
}

impl TryFrom<i32> for TaxRate {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        TaxRate::ALL
            .into_iter()
            .find(|rate| rate.percent() == value)
            .ok_or_else(|| {
                format!(
                    "Select a valid choice. {} is not one of the available choices.",
                    value
                )
            })
    }
}

impl From<TaxRate> for i32 {
    fn from(rate: TaxRate) -> Self {
        rate.percent()
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Catalog product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(flatten)]
    pub base: BaseAggregate<ProductId>,

    pub name: String,
    pub description: String,
    /// Price before tax
    pub price: Decimal,
    pub tax_rate: TaxRate,
    pub image: Option<String>,
}

impl Product {
    /// `price × (1 + tax_rate / 100)`, exact
    pub fn price_with_tax(&self) -> Decimal {
        self.price * self.tax_rate.multiplier()
    }

    /// Tax-inclusive price rounded to cents, half away from zero
    pub fn price_with_tax_rounded(&self) -> Decimal {
        self.price_with_tax()
            .round_dp_with_strategy(PRICE_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
    }

    fn from_data(data: ProductData) -> Self {
        Self {
            base: BaseAggregate::new(ProductId::new_v4()),
            name: data.name,
            description: data.description,
            price: data.price,
            tax_rate: data.tax_rate,
            image: data.image,
        }
    }

    fn assign(&mut self, data: ProductData) {
        self.name = data.name;
        self.description = data.description;
        self.price = data.price;
        self.tax_rate = data.tax_rate;
        self.image = data.image;
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

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
        "a003"
    }

    fn collection_name() -> &'static str {
        "product"
    }

    fn element_name() -> &'static str {
        "Product"
    }

    fn list_name() -> &'static str {
        "Products"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// Raw product form as submitted. Numbers stay text until cleaned.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub tax_rate: String,
    pub image: Option<String>,
}

/// Cleaned product values
#[derive(Debug, Clone, PartialEq)]
pub struct ProductData {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub tax_rate: TaxRate,
    pub image: Option<String>,
}

/// Parse and check a price: a decimal number with at most
/// [`PRICE_MAX_DIGITS`] digits, [`PRICE_DECIMAL_PLACES`] of them after the
/// point, strictly greater than zero. The result carries exactly two places.
pub fn clean_price(raw: &str) -> Result<Decimal, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(REQUIRED_MESSAGE.to_string());
    }
    let mut price = Decimal::from_str(raw).map_err(|_| "Enter a number.".to_string())?;
    let normalized = price.normalize();
    if normalized.scale() > PRICE_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {} decimal places.",
            PRICE_DECIMAL_PLACES
        ));
    }
    let max_whole = Decimal::from(10_i64.pow(PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES));
    if normalized.abs().trunc() >= max_whole {
        return Err(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES
        ));
    }
    if price <= Decimal::ZERO {
        return Err("Price must be greater than zero.".to_string());
    }
    price.rescale(PRICE_DECIMAL_PLACES);
    Ok(price)
}

/// Parse a tax rate choice
pub fn clean_tax_rate(raw: &str) -> Result<TaxRate, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(REQUIRED_MESSAGE.to_string());
    }
    let value = raw.parse::<i32>().map_err(|_| {
        format!(
            "Select a valid choice. {} is not one of the available choices.",
            raw
        )
    })?;
    TaxRate::try_from(value)
}

impl ProductForm {
    pub fn clean(&self) -> Result<ProductData, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = errors.text("name", &self.name, ValidationRules::required().max_length(200));
        let description = errors.text("description", &self.description, ValidationRules::required());
        let price = clean_price(&self.price).unwrap_or_else(|message| {
            errors.add("price", message);
            Decimal::ZERO
        });
        let tax_rate = clean_tax_rate(&self.tax_rate).unwrap_or_else(|message| {
            errors.add("tax_rate", message);
            TaxRate::Standard
        });
        let image = errors.image("image", self.image.as_deref());

        errors.into_result(ProductData {
            name,
            description,
            price,
            tax_rate,
            image,
        })
    }
}

impl AggregateForm for ProductForm {
    type Aggregate = Product;

    fn create(&self) -> Result<Product, FieldErrors> {
        self.clean().map(Product::from_data)
    }

    fn apply_to(&self, product: &mut Product) -> Result<(), FieldErrors> {
        let data = self.clean()?;
        product.assign(data);
        Ok(())
    }

    fn from_aggregate(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            tax_rate: product.tax_rate.percent().to_string(),
            image: product.image.clone(),
        }
    }
}
