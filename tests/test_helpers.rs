// ==========================================
// Test helpers
// ==========================================
// Temp database bootstrap, tenant seeding and small query helpers
// shared by the integration tests.
// ==========================================

use rusqlite::{params, Connection};
use std::error::Error;
use tempfile::NamedTempFile;
use vendi_backoffice::api::ImportApi;
use vendi_backoffice::db;

/// Create a temp database with the full schema and a default tenant
/// (account 1 / user 1).
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = db::open_sqlite_connection(&db_path)?;
    db::init_schema(&conn)?;
    seed_account(&conn, 1, "Loja Teste")?;

    Ok((temp_file, db_path))
}

/// Insert an account and a same-numbered user.
pub fn seed_account(conn: &Connection, id: i64, name: &str) -> Result<(), Box<dyn Error>> {
    conn.execute(
        "INSERT OR IGNORE INTO accounts (id, name) VALUES (?1, ?2)",
        params![id, name],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO users (id, account_id, name) VALUES (?1, ?1, 'Operador')",
        params![id],
    )?;
    Ok(())
}

/// Build the API facade over the temp database.
pub fn create_api(db_path: &str) -> ImportApi {
    ImportApi::new(db_path).expect("Failed to create ImportApi")
}

pub fn open_conn(db_path: &str) -> Connection {
    db::open_sqlite_connection(db_path).expect("Failed to open test db")
}

pub fn count_products(conn: &Connection, account_id: i64) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM products WHERE account_id = ?1",
        params![account_id],
        |row| row.get(0),
    )
    .unwrap()
}

pub fn count_movements(conn: &Connection, movement_type: &str) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM stock_movements WHERE movement_type = ?1",
        params![movement_type],
        |row| row.get(0),
    )
    .unwrap()
}

/// Insert a product directly (pre-existing catalog state).
pub fn insert_product(
    conn: &Connection,
    account_id: i64,
    name: &str,
    sku: Option<&str>,
    supplier_code: Option<&str>,
    stock_quantity: i64,
) -> i64 {
    conn.execute(
        "INSERT INTO products (account_id, name, name_slug, sku, supplier_code, stock_quantity)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            account_id,
            name,
            vendi_backoffice::domain::slug::slugify(name),
            sku,
            supplier_code,
            stock_quantity
        ],
    )
    .unwrap();
    conn.last_insert_rowid()
}

/// Insert a sale with one item for the product.
pub fn insert_sale_with_item(
    conn: &Connection,
    account_id: i64,
    product_id: i64,
    status: &str,
    quantity: i64,
    unit_price: f64,
) -> i64 {
    let total = quantity as f64 * unit_price;
    conn.execute(
        "INSERT INTO sales (account_id, status, total_amount) VALUES (?1, ?2, ?3)",
        params![account_id, status, total],
    )
    .unwrap();
    let sale_id = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO sale_items (sale_id, product_id, quantity, unit_price, total_price)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![sale_id, product_id, quantity, unit_price, total],
    )
    .unwrap();
    sale_id
}
