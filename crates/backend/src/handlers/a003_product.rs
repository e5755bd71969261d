use contracts::domain::a003_product::aggregate::{Product, ProductForm};

use super::crud::CrudResource;
use crate::domain::a003_product::repository::ProductRepository;
use crate::shared::format::format_price;
use crate::shared::state::AppState;

pub struct ProductResource;

impl CrudResource for ProductResource {
    type Aggregate = Product;
    type Repository = ProductRepository;
    type Form = ProductForm;

    const BASE_PATH: &'static str = "/product";
    const PAGE_SIZE: u64 = 12;

    fn repository(state: &AppState) -> ProductRepository {
        ProductRepository::new(state.db.clone())
    }

    /// Prices are shown as 2-place strings, tax-inclusive price included
    fn present(product: &Product) -> serde_json::Result<serde_json::Value> {
        let mut value = serde_json::to_value(product)?;
        value["price"] = format_price(product.price).into();
        value["price_with_tax"] = format_price(product.price_with_tax_rounded()).into();
        value["tax_rate_label"] = product.tax_rate.label().into();
        Ok(value)
    }
}
