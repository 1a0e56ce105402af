// ==========================================
// Vendi Backoffice - Sale repository (revert collaborator)
// ==========================================
// Just enough of the sales subsystem for the import core: detect
// confirmed sales on a product, pull a product out of draft sales
// and recompute those sales' totals.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct SaleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SaleRepository {
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

    /// True when the product appears on any sale that is not a draft.
    pub fn product_has_non_draft_sales(&self, product_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*)
             FROM sale_items si
             JOIN sales s ON s.id = si.sale_id
             WHERE si.product_id = ?1 AND s.status <> 'draft'",
            params![product_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Remove the product from every draft sale of the account and
    /// recompute the totals of the affected sales. Returns the ids of
    /// the sales that were touched.
    pub fn remove_product_from_draft_sales(
        &self,
        account_id: i64,
        product_id: i64,
    ) -> RepositoryResult<Vec<i64>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT DISTINCT si.sale_id
             FROM sale_items si
             JOIN sales s ON s.id = si.sale_id
             WHERE s.account_id = ?1 AND si.product_id = ?2 AND s.status = 'draft'",
        )?;
        let affected: Vec<i64> = stmt
            .query_map(params![account_id, product_id], |row| row.get(0))?
            .collect::<Result<_, _>>()?;
        drop(stmt);

        if affected.is_empty() {
            return Ok(affected);
        }

        conn.execute(
            "DELETE FROM sale_items
             WHERE product_id = ?1
               AND sale_id IN (
                   SELECT id FROM sales WHERE account_id = ?2 AND status = 'draft'
               )",
            params![product_id, account_id],
        )?;

        for sale_id in &affected {
            recalculate_totals(&conn, *sale_id)?;
        }

        Ok(affected)
    }

    /// Recompute total_amount from the remaining items.
    pub fn recalculate_totals(&self, sale_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        recalculate_totals(&conn, sale_id)
    }
}

fn recalculate_totals(conn: &Connection, sale_id: i64) -> RepositoryResult<()> {
    let total: f64 = conn.query_row(
        "SELECT COALESCE(SUM(total_price), 0) FROM sale_items WHERE sale_id = ?1",
        params![sale_id],
        |row| row.get(0),
    )?;
    conn.execute(
        "UPDATE sales SET total_amount = ?1, updated_at = ?2 WHERE id = ?3",
        params![total, Utc::now().to_rfc3339(), sale_id],
    )?;
    Ok(())
}
