use contracts::domain::a004_supplier::aggregate::{Supplier, SupplierForm};

use super::crud::CrudResource;
use crate::domain::a004_supplier::repository::SupplierRepository;
use crate::shared::state::AppState;

pub struct SupplierResource;

impl CrudResource for SupplierResource {
    type Aggregate = Supplier;
    type Repository = SupplierRepository;
    type Form = SupplierForm;

    const BASE_PATH: &'static str = "/supplier";
    const PAGE_SIZE: u64 = 12;

    fn repository(state: &AppState) -> SupplierRepository {
        SupplierRepository::new(state.db.clone())
    }
}
