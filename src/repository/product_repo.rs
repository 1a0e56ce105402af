// ==========================================
// Vendi Backoffice - Product repository
// ==========================================
// CRUD + uniqueness lookups for the products table, always scoped to
// one account. No business rules here, data access only.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::product::{Product, ProductAttributes};
use crate::domain::slug::slugify;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const PRODUCT_COLUMNS: &str = "id, account_id, name, name_slug, description, sku, supplier_code, \
     category, brand, color, size, cost_price, base_price, stock_quantity, active, \
     product_import_id, created_at, updated_at";

pub struct ProductRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insert a new product for the account.
    ///
    /// name_slug is derived here so every write path keeps the
    /// composite-key lookup consistent.
    pub fn insert(
        &self,
        account_id: i64,
        attrs: &ProductAttributes,
        product_import_id: Option<i64>,
    ) -> RepositoryResult<Product> {
        let conn = self.get_conn()?;
        let now = Utc::now();

        conn.execute(
            r#"
            INSERT INTO products (
                account_id, name, name_slug, description, sku, supplier_code,
                category, brand, color, size, cost_price, base_price,
                stock_quantity, active, product_import_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
            params![
                account_id,
                attrs.name,
                slugify(&attrs.name),
                attrs.description,
                attrs.sku,
                attrs.supplier_code,
                attrs.category,
                attrs.brand,
                attrs.color,
                attrs.size,
                attrs.cost_price,
                attrs.base_price,
                attrs.stock_quantity,
                attrs.active,
                product_import_id,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        drop(conn);
        self.find_by_id(account_id, id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Product".to_string(),
                id: id.to_string(),
            })
    }

    /// Update the mutable fields of an existing product.
    pub fn update(
        &self,
        account_id: i64,
        id: i64,
        attrs: &ProductAttributes,
    ) -> RepositoryResult<Product> {
        let conn = self.get_conn()?;
        let now = Utc::now();

        let changed = conn.execute(
            r#"
            UPDATE products SET
                name = ?1, name_slug = ?2, description = ?3, sku = ?4,
                supplier_code = ?5, category = ?6, brand = ?7, color = ?8,
                size = ?9, cost_price = ?10, base_price = ?11,
                stock_quantity = ?12, active = ?13, updated_at = ?14
            WHERE account_id = ?15 AND id = ?16
            "#,
            params![
                attrs.name,
                slugify(&attrs.name),
                attrs.description,
                attrs.sku,
                attrs.supplier_code,
                attrs.category,
                attrs.brand,
                attrs.color,
                attrs.size,
                attrs.cost_price,
                attrs.base_price,
                attrs.stock_quantity,
                attrs.active,
                now.to_rfc3339(),
                account_id,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Product".to_string(),
                id: id.to_string(),
            });
        }

        drop(conn);
        self.find_by_id(account_id, id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Product".to_string(),
                id: id.to_string(),
            })
    }

    /// Overwrite stock_quantity only. Callers are responsible for
    /// emitting the matching stock movement.
    pub fn set_stock_quantity(
        &self,
        account_id: i64,
        id: i64,
        quantity: i64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE products SET stock_quantity = ?1, updated_at = ?2
             WHERE account_id = ?3 AND id = ?4",
            params![quantity, Utc::now().to_rfc3339(), account_id, id],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Product".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    pub fn find_by_id(&self, account_id: i64, id: i64) -> RepositoryResult<Option<Product>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE account_id = ?1 AND id = ?2"
        ))?;
        let result = stmt
            .query_row(params![account_id, id], map_product_row)
            .optional()?;
        Ok(result)
    }

    /// First product of the account carrying the given supplier code.
    pub fn find_by_supplier_code(
        &self,
        account_id: i64,
        supplier_code: &str,
    ) -> RepositoryResult<Option<Product>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE account_id = ?1 AND supplier_code = ?2
             ORDER BY id LIMIT 1"
        ))?;
        let result = stmt
            .query_row(params![account_id, supplier_code], map_product_row)
            .optional()?;
        Ok(result)
    }

    /// Does any product of the account carry this SKU?
    ///
    /// exclude_id skips the product being updated so it does not
    /// collide with itself.
    pub fn sku_exists(
        &self,
        account_id: i64,
        sku: &str,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM products
             WHERE account_id = ?1 AND sku = ?2 AND (?3 IS NULL OR id <> ?3)",
            params![account_id, sku, exclude_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Composite identity lookup: same slugified name AND same
    /// (trimmed, empty-coalesced) size, brand and color.
    pub fn composite_key_exists(
        &self,
        account_id: i64,
        name_slug: &str,
        size: &str,
        brand: &str,
        color: &str,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM products
             WHERE account_id = ?1 AND name_slug = ?2
               AND COALESCE(TRIM(size), '') = ?3
               AND COALESCE(TRIM(brand), '') = ?4
               AND COALESCE(TRIM(color), '') = ?5
               AND (?6 IS NULL OR id <> ?6)",
            params![account_id, name_slug, size, brand, color, exclude_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Products created by a given import job.
    pub fn list_by_import(
        &self,
        account_id: i64,
        product_import_id: i64,
    ) -> RepositoryResult<Vec<Product>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE account_id = ?1 AND product_import_id = ?2
             ORDER BY id"
        ))?;
        let rows = stmt.query_map(params![account_id, product_import_id], map_product_row)?;
        let mut products = Vec::new();
        for row in rows {
            products.push(row?);
        }
        Ok(products)
    }

    pub fn delete(&self, account_id: i64, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "DELETE FROM products WHERE account_id = ?1 AND id = ?2",
            params![account_id, id],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Product".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    pub fn count(&self, account_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM products WHERE account_id = ?1",
            params![account_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn map_product_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        account_id: row.get(1)?,
        name: row.get(2)?,
        name_slug: row.get(3)?,
        description: row.get(4)?,
        sku: row.get(5)?,
        supplier_code: row.get(6)?,
        category: row.get(7)?,
        brand: row.get(8)?,
        color: row.get(9)?,
        size: row.get(10)?,
        cost_price: row.get(11)?,
        base_price: row.get(12)?,
        stock_quantity: row.get(13)?,
        active: row.get(14)?,
        product_import_id: row.get(15)?,
        created_at: parse_timestamp(row.get::<_, String>(16)?),
        updated_at: parse_timestamp(row.get::<_, String>(17)?),
    })
}

/// Timestamps are stored as RFC3339 by the repositories and as
/// SQLite datetime('now') by the schema defaults; accept both.
pub(crate) fn parse_timestamp(value: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(&value, "%Y-%m-%d %H:%M:%S")
                .map(|naive| naive.and_utc())
        })
        .unwrap_or_else(|_| Utc::now())
}
