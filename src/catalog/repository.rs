//! SQLite persistence for the catalog.
//!
//! All functions take a connection (or transaction, via deref) so the
//! service layer decides transaction boundaries.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::types::Money;

use super::errors::{CatalogError, CatalogResult};
use super::model::{
    Category, ComboGroup, ComboOption, MenuCategory, MenuProduct, MenuVariant, Product,
    ProductKind, Variant,
};

fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get("id")?,
        name: row.get("name")?,
        position: row.get("position")?,
        active: row.get::<_, i64>("active")? != 0,
    })
}

fn row_to_product(row: &Row<'_>) -> rusqlite::Result<Product> {
    let kind: String = row.get("kind")?;
    Ok(Product {
        id: row.get("id")?,
        category_id: row.get("category_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        kind: kind.parse().unwrap_or(ProductKind::Simple),
        position: row.get("position")?,
        active: row.get::<_, i64>("active")? != 0,
    })
}

fn row_to_variant(row: &Row<'_>) -> rusqlite::Result<Variant> {
    Ok(Variant {
        id: row.get("id")?,
        product_id: row.get("product_id")?,
        name: row.get("name")?,
        position: row.get("position")?,
        active: row.get::<_, i64>("active")? != 0,
    })
}

// ==================
// Categories
// ==================

pub fn insert_category(conn: &Connection, name: &str) -> CatalogResult<Category> {
    let position: i64 = conn.query_row(
        "SELECT COALESCE(MAX(position), 0) + 1 FROM categories;",
        [],
        |row| row.get(0),
    )?;

    conn.execute(
        "INSERT INTO categories (name, position, active) VALUES (?1, ?2, 1);",
        params![name, position],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            CatalogError::DuplicateName
        }
        other => CatalogError::from(other),
    })?;

    let id = conn.last_insert_rowid();
    Ok(Category {
        id,
        name: name.to_string(),
        position,
        active: true,
    })
}

pub fn get_category(conn: &Connection, id: i64) -> CatalogResult<Category> {
    conn.query_row(
        "SELECT id, name, position, active FROM categories WHERE id = ?1;",
        [id],
        row_to_category,
    )
    .optional()?
    .ok_or(CatalogError::CategoryNotFound(id))
}

pub fn list_categories(conn: &Connection) -> CatalogResult<Vec<Category>> {
    let mut stmt =
        conn.prepare("SELECT id, name, position, active FROM categories ORDER BY position;")?;
    let categories = stmt
        .query_map([], row_to_category)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(categories)
}

pub fn update_category(
    conn: &Connection,
    id: i64,
    name: Option<&str>,
    active: Option<bool>,
) -> CatalogResult<Category> {
    let current = get_category(conn, id)?;
    let name = name.unwrap_or(&current.name);
    let active = active.unwrap_or(current.active);

    conn.execute(
        "UPDATE categories SET name = ?2, active = ?3 WHERE id = ?1;",
        params![id, name, active as i64],
    )?;
    get_category(conn, id)
}

pub fn delete_category(conn: &Connection, id: i64) -> CatalogResult<()> {
    let in_use: i64 = conn.query_row(
        "SELECT COUNT(*) FROM products WHERE category_id = ?1;",
        [id],
        |row| row.get(0),
    )?;
    if in_use > 0 {
        return Err(CatalogError::CategoryNotEmpty(id));
    }

    let changed = conn.execute("DELETE FROM categories WHERE id = ?1;", [id])?;
    if changed == 0 {
        return Err(CatalogError::CategoryNotFound(id));
    }
    Ok(())
}

pub fn reorder_categories(conn: &Connection, ids: &[i64]) -> CatalogResult<()> {
    let stored: Vec<i64> = {
        let mut stmt = conn.prepare("SELECT id FROM categories;")?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows
    };
    check_permutation(&stored, ids)?;

    for (index, id) in ids.iter().enumerate() {
        conn.execute(
            "UPDATE categories SET position = ?2 WHERE id = ?1;",
            params![id, index as i64 + 1],
        )?;
    }
    Ok(())
}

// ==================
// Products
// ==================

pub fn insert_product(
    conn: &Connection,
    category_id: i64,
    name: &str,
    description: &str,
    kind: ProductKind,
) -> CatalogResult<Product> {
    // FK alone would surface as a constraint error; check first for a 404.
    get_category(conn, category_id)?;

    let position: i64 = conn.query_row(
        "SELECT COALESCE(MAX(position), 0) + 1 FROM products WHERE category_id = ?1;",
        [category_id],
        |row| row.get(0),
    )?;

    conn.execute(
        "INSERT INTO products (category_id, name, description, kind, position, active)
         VALUES (?1, ?2, ?3, ?4, ?5, 1);",
        params![category_id, name, description, kind.as_str(), position],
    )?;

    get_product(conn, conn.last_insert_rowid())
}

pub fn get_product(conn: &Connection, id: i64) -> CatalogResult<Product> {
    conn.query_row(
        "SELECT id, category_id, name, description, kind, position, active
         FROM products WHERE id = ?1;",
        [id],
        row_to_product,
    )
    .optional()?
    .ok_or(CatalogError::ProductNotFound(id))
}

pub fn list_products(conn: &Connection, category_id: i64) -> CatalogResult<Vec<Product>> {
    let mut stmt = conn.prepare(
        "SELECT id, category_id, name, description, kind, position, active
         FROM products WHERE category_id = ?1 ORDER BY position;",
    )?;
    let products = stmt
        .query_map([category_id], row_to_product)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(products)
}

pub fn update_product(
    conn: &Connection,
    id: i64,
    name: Option<&str>,
    description: Option<&str>,
    active: Option<bool>,
) -> CatalogResult<Product> {
    let current = get_product(conn, id)?;
    let name = name.unwrap_or(&current.name);
    let description = description.unwrap_or(&current.description);
    let active = active.unwrap_or(current.active);

    conn.execute(
        "UPDATE products SET name = ?2, description = ?3, active = ?4 WHERE id = ?1;",
        params![id, name, description, active as i64],
    )?;
    get_product(conn, id)
}

pub fn reorder_products(conn: &Connection, category_id: i64, ids: &[i64]) -> CatalogResult<()> {
    let stored: Vec<i64> = {
        let mut stmt = conn.prepare("SELECT id FROM products WHERE category_id = ?1;")?;
        let rows = stmt
            .query_map([category_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows
    };
    check_permutation(&stored, ids)?;

    for (index, id) in ids.iter().enumerate() {
        conn.execute(
            "UPDATE products SET position = ?2 WHERE id = ?1 AND category_id = ?3;",
            params![id, index as i64 + 1, category_id],
        )?;
    }
    Ok(())
}

// ==================
// Variants
// ==================

pub fn insert_variant(conn: &Connection, product_id: i64, name: &str) -> CatalogResult<Variant> {
    get_product(conn, product_id)?;

    let position: i64 = conn.query_row(
        "SELECT COALESCE(MAX(position), 0) + 1 FROM variants WHERE product_id = ?1;",
        [product_id],
        |row| row.get(0),
    )?;

    conn.execute(
        "INSERT INTO variants (product_id, name, position, active) VALUES (?1, ?2, ?3, 1);",
        params![product_id, name, position],
    )?;

    get_variant(conn, conn.last_insert_rowid())
}

pub fn get_variant(conn: &Connection, id: i64) -> CatalogResult<Variant> {
    conn.query_row(
        "SELECT id, product_id, name, position, active FROM variants WHERE id = ?1;",
        [id],
        row_to_variant,
    )
    .optional()?
    .ok_or(CatalogError::VariantNotFound(id))
}

pub fn list_variants(conn: &Connection, product_id: i64) -> CatalogResult<Vec<Variant>> {
    let mut stmt = conn.prepare(
        "SELECT id, product_id, name, position, active
         FROM variants WHERE product_id = ?1 ORDER BY position;",
    )?;
    let variants = stmt
        .query_map([product_id], row_to_variant)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(variants)
}

pub fn set_variant_active(conn: &Connection, id: i64, active: bool) -> CatalogResult<()> {
    let changed = conn.execute(
        "UPDATE variants SET active = ?2 WHERE id = ?1;",
        params![id, active as i64],
    )?;
    if changed == 0 {
        return Err(CatalogError::VariantNotFound(id));
    }
    Ok(())
}

/// Variant joined with its product and category, as order lines and
/// promotion scopes need all three.
#[derive(Debug, Clone)]
pub struct VariantRef {
    pub variant_id: i64,
    pub product_id: i64,
    pub category_id: i64,
    pub display_name: String,
    pub kind: ProductKind,
    pub active: bool,
}

pub fn resolve_variant(conn: &Connection, variant_id: i64) -> CatalogResult<VariantRef> {
    conn.query_row(
        "SELECT v.id, v.product_id, p.category_id,
                p.name || ' ' || v.name AS display_name,
                p.kind,
                v.active AND p.active AND c.active AS active
         FROM variants v
         JOIN products p ON p.id = v.product_id
         JOIN categories c ON c.id = p.category_id
         WHERE v.id = ?1;",
        [variant_id],
        |row| {
            let kind: String = row.get("kind")?;
            Ok(VariantRef {
                variant_id: row.get("id")?,
                product_id: row.get("product_id")?,
                category_id: row.get("category_id")?,
                display_name: row.get("display_name")?,
                kind: kind.parse().unwrap_or(ProductKind::Simple),
                active: row.get::<_, i64>("active")? != 0,
            })
        },
    )
    .optional()?
    .ok_or(CatalogError::VariantNotFound(variant_id))
}

// ==================
// Combo groups
// ==================

pub fn insert_group(conn: &Connection, product_id: i64, name: &str) -> CatalogResult<ComboGroup> {
    let product = get_product(conn, product_id)?;
    if product.kind != ProductKind::Combo {
        return Err(CatalogError::NotACombo(product_id));
    }

    let position: i64 = conn.query_row(
        "SELECT COALESCE(MAX(position), 0) + 1 FROM combo_groups WHERE product_id = ?1;",
        [product_id],
        |row| row.get(0),
    )?;

    conn.execute(
        "INSERT INTO combo_groups (product_id, name, position) VALUES (?1, ?2, ?3);",
        params![product_id, name, position],
    )?;

    Ok(ComboGroup {
        id: conn.last_insert_rowid(),
        product_id,
        name: name.to_string(),
        position,
        options: Vec::new(),
    })
}

pub fn insert_option(
    conn: &Connection,
    group_id: i64,
    variant_id: i64,
    surcharge: Money,
) -> CatalogResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM combo_groups WHERE id = ?1);",
        [group_id],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(CatalogError::GroupNotFound(group_id));
    }
    get_variant(conn, variant_id)?;

    conn.execute(
        "INSERT OR REPLACE INTO combo_options (group_id, variant_id, surcharge)
         VALUES (?1, ?2, ?3);",
        params![group_id, variant_id, surcharge],
    )?;
    Ok(())
}

/// Surcharge for one option, or `None` when the option does not exist
/// in that group.
pub fn option_surcharge(
    conn: &Connection,
    group_id: i64,
    variant_id: i64,
) -> CatalogResult<Option<Money>> {
    let surcharge = conn
        .query_row(
            "SELECT surcharge FROM combo_options WHERE group_id = ?1 AND variant_id = ?2;",
            params![group_id, variant_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(surcharge)
}

pub fn remove_option(conn: &Connection, group_id: i64, variant_id: i64) -> CatalogResult<()> {
    conn.execute(
        "DELETE FROM combo_options WHERE group_id = ?1 AND variant_id = ?2;",
        params![group_id, variant_id],
    )?;
    Ok(())
}

pub fn list_groups(conn: &Connection, product_id: i64) -> CatalogResult<Vec<ComboGroup>> {
    let mut stmt = conn.prepare(
        "SELECT id, product_id, name, position FROM combo_groups
         WHERE product_id = ?1 ORDER BY position;",
    )?;
    let mut groups = stmt
        .query_map([product_id], |row| {
            Ok(ComboGroup {
                id: row.get("id")?,
                product_id: row.get("product_id")?,
                name: row.get("name")?,
                position: row.get("position")?,
                options: Vec::new(),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut option_stmt = conn.prepare(
        "SELECT group_id, variant_id, surcharge FROM combo_options WHERE group_id = ?1;",
    )?;
    for group in &mut groups {
        group.options = option_stmt
            .query_map([group.id], |row| {
                Ok(ComboOption {
                    group_id: row.get("group_id")?,
                    variant_id: row.get("variant_id")?,
                    surcharge: row.get("surcharge")?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
    }

    Ok(groups)
}

// ==================
// Menu read model
// ==================

pub fn menu(conn: &Connection) -> CatalogResult<Vec<MenuCategory>> {
    let mut menu = Vec::new();

    for category in list_categories(conn)? {
        if !category.active {
            continue;
        }

        let mut products = Vec::new();
        for product in list_products(conn, category.id)? {
            if !product.active {
                continue;
            }

            let variants: Vec<MenuVariant> = list_variants(conn, product.id)?
                .into_iter()
                .filter(|v| v.active)
                .map(|v| MenuVariant {
                    id: v.id,
                    name: v.name,
                })
                .collect();
            if variants.is_empty() {
                continue;
            }

            let groups = if product.kind == ProductKind::Combo {
                list_groups(conn, product.id)?
            } else {
                Vec::new()
            };

            products.push(MenuProduct {
                id: product.id,
                name: product.name,
                description: product.description,
                kind: product.kind,
                variants,
                groups,
            });
        }

        if !products.is_empty() {
            menu.push(MenuCategory {
                id: category.id,
                name: category.name,
                products,
            });
        }
    }

    Ok(menu)
}

fn check_permutation(stored: &[i64], proposed: &[i64]) -> CatalogResult<()> {
    let mut stored_sorted = stored.to_vec();
    let mut proposed_sorted = proposed.to_vec();
    stored_sorted.sort_unstable();
    proposed_sorted.sort_unstable();

    if stored_sorted != proposed_sorted {
        return Err(CatalogError::InvalidReorder(format!(
            "expected a permutation of {} ids, got {}",
            stored.len(),
            proposed.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Db;

    fn db() -> Db {
        Db::open_in_memory().unwrap()
    }

    #[test]
    fn test_category_positions_are_dense() {
        let db = db();
        db.with_conn::<_, CatalogError>(|conn| {
            let a = insert_category(conn, "Subs")?;
            let b = insert_category(conn, "Drinks")?;
            assert_eq!(a.position, 1);
            assert_eq!(b.position, 2);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_duplicate_category_name_rejected() {
        let db = db();
        db.with_conn::<_, CatalogError>(|conn| {
            insert_category(conn, "Subs")?;
            assert!(matches!(
                insert_category(conn, "Subs"),
                Err(CatalogError::DuplicateName)
            ));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_reorder_validates_permutation() {
        let db = db();
        db.with_conn::<_, CatalogError>(|conn| {
            let a = insert_category(conn, "Subs")?;
            let b = insert_category(conn, "Drinks")?;

            reorder_categories(conn, &[b.id, a.id])?;
            let listed = list_categories(conn)?;
            assert_eq!(listed[0].id, b.id);
            assert_eq!(listed[1].id, a.id);

            assert!(matches!(
                reorder_categories(conn, &[a.id]),
                Err(CatalogError::InvalidReorder(_))
            ));
            assert!(matches!(
                reorder_categories(conn, &[a.id, a.id]),
                Err(CatalogError::InvalidReorder(_))
            ));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_delete_category_in_use_rejected() {
        let db = db();
        db.with_conn::<_, CatalogError>(|conn| {
            let category = insert_category(conn, "Subs")?;
            insert_product(conn, category.id, "Italiano", "", ProductKind::Simple)?;

            assert!(matches!(
                delete_category(conn, category.id),
                Err(CatalogError::CategoryNotEmpty(_))
            ));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_menu_hides_inactive_chains() {
        let db = db();
        db.with_conn::<_, CatalogError>(|conn| {
            let category = insert_category(conn, "Subs")?;
            let product = insert_product(conn, category.id, "Italiano", "", ProductKind::Simple)?;
            let variant = insert_variant(conn, product.id, "15cm")?;

            assert_eq!(menu(conn)?.len(), 1);

            // Deactivating the product hides the whole chain.
            update_product(conn, product.id, None, None, Some(false))?;
            assert!(menu(conn)?.is_empty());

            update_product(conn, product.id, None, None, Some(true))?;
            set_variant_active(conn, variant.id, false)?;
            assert!(menu(conn)?.is_empty());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_resolve_variant_reflects_active_chain() {
        let db = db();
        db.with_conn::<_, CatalogError>(|conn| {
            let category = insert_category(conn, "Subs")?;
            let product = insert_product(conn, category.id, "Italiano", "", ProductKind::Simple)?;
            let variant = insert_variant(conn, product.id, "15cm")?;

            let resolved = resolve_variant(conn, variant.id)?;
            assert_eq!(resolved.display_name, "Italiano 15cm");
            assert!(resolved.active);

            update_category(conn, category.id, None, Some(false))?;
            assert!(!resolve_variant(conn, variant.id)?.active);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_combo_groups_require_combo_product() {
        let db = db();
        db.with_conn::<_, CatalogError>(|conn| {
            let category = insert_category(conn, "Combos")?;
            let simple = insert_product(conn, category.id, "Italiano", "", ProductKind::Simple)?;
            assert!(matches!(
                insert_group(conn, simple.id, "Side"),
                Err(CatalogError::NotACombo(_))
            ));

            let combo = insert_product(conn, category.id, "Combo Personal", "", ProductKind::Combo)?;
            let group = insert_group(conn, combo.id, "Side")?;
            let chips = insert_variant(conn, simple.id, "Chips")?;
            insert_option(conn, group.id, chips.id, 0)?;

            let groups = list_groups(conn, combo.id)?;
            assert_eq!(groups.len(), 1);
            assert_eq!(groups[0].options.len(), 1);
            Ok(())
        })
        .unwrap();
    }
}
