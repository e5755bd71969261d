pub mod a001_company;
pub mod a002_worker;
pub mod a003_product;
pub mod a004_supplier;
pub mod crud;
pub mod media;
