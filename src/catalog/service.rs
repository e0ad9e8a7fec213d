//! Catalog service: transaction boundaries over the repository.

use crate::db::Db;
use crate::types::Money;

use super::errors::CatalogResult;
use super::model::{
    Category, ComboGroup, MenuCategory, NewProduct, Product, UpdateCategory, UpdateProduct,
    Variant,
};
use super::repository as repo;

#[derive(Clone)]
pub struct CatalogService {
    db: Db,
}

impl CatalogService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn create_category(&self, name: &str) -> CatalogResult<Category> {
        self.db.with_tx(|tx| repo::insert_category(tx, name))
    }

    pub fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        self.db.with_conn(repo::list_categories)
    }

    pub fn update_category(&self, id: i64, update: UpdateCategory) -> CatalogResult<Category> {
        self.db.with_tx(|tx| {
            repo::update_category(tx, id, update.name.as_deref(), update.active)
        })
    }

    pub fn delete_category(&self, id: i64) -> CatalogResult<()> {
        self.db.with_tx(|tx| repo::delete_category(tx, id))
    }

    /// Apply a drag-and-drop result: the full permutation, atomically.
    pub fn reorder_categories(&self, ids: &[i64]) -> CatalogResult<()> {
        self.db.with_tx(|tx| repo::reorder_categories(tx, ids))
    }

    pub fn create_product(&self, new: NewProduct) -> CatalogResult<Product> {
        self.db.with_tx(|tx| {
            repo::insert_product(tx, new.category_id, &new.name, &new.description, new.kind)
        })
    }

    pub fn get_product(&self, id: i64) -> CatalogResult<Product> {
        self.db.with_conn(|conn| repo::get_product(conn, id))
    }

    pub fn list_products(&self, category_id: i64) -> CatalogResult<Vec<Product>> {
        self.db.with_conn(|conn| repo::list_products(conn, category_id))
    }

    pub fn update_product(&self, id: i64, update: UpdateProduct) -> CatalogResult<Product> {
        self.db.with_tx(|tx| {
            repo::update_product(
                tx,
                id,
                update.name.as_deref(),
                update.description.as_deref(),
                update.active,
            )
        })
    }

    pub fn reorder_products(&self, category_id: i64, ids: &[i64]) -> CatalogResult<()> {
        self.db
            .with_tx(|tx| repo::reorder_products(tx, category_id, ids))
    }

    pub fn create_variant(&self, product_id: i64, name: &str) -> CatalogResult<Variant> {
        self.db.with_tx(|tx| repo::insert_variant(tx, product_id, name))
    }

    pub fn list_variants(&self, product_id: i64) -> CatalogResult<Vec<Variant>> {
        self.db.with_conn(|conn| repo::list_variants(conn, product_id))
    }

    pub fn set_variant_active(&self, id: i64, active: bool) -> CatalogResult<()> {
        self.db.with_tx(|tx| repo::set_variant_active(tx, id, active))
    }

    pub fn create_group(&self, product_id: i64, name: &str) -> CatalogResult<ComboGroup> {
        self.db.with_tx(|tx| repo::insert_group(tx, product_id, name))
    }

    pub fn add_option(
        &self,
        group_id: i64,
        variant_id: i64,
        surcharge: Money,
    ) -> CatalogResult<()> {
        self.db
            .with_tx(|tx| repo::insert_option(tx, group_id, variant_id, surcharge))
    }

    pub fn remove_option(&self, group_id: i64, variant_id: i64) -> CatalogResult<()> {
        self.db
            .with_tx(|tx| repo::remove_option(tx, group_id, variant_id))
    }

    /// Storefront menu: active categories, products and variants only.
    pub fn menu(&self) -> CatalogResult<Vec<MenuCategory>> {
        self.db.with_conn(repo::menu)
    }
}
