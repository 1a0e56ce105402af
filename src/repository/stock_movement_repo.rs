// ==========================================
// Vendi Backoffice - Stock movement repository
// ==========================================
// Append-only audit trail for stock_quantity mutations. The acting
// user is always an explicit argument; there is no ambient identity.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::stock_movement::{MovementMetadata, StockMovement};
use crate::domain::types::MovementKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::product_repo::parse_timestamp;
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

pub struct StockMovementRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StockMovementRepository {
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

    /// Append one movement. quantity_change must not be zero; the
    /// before/after snapshot is the caller's responsibility.
    #[allow(clippy::too_many_arguments)]
    pub fn insert(
        &self,
        product_id: i64,
        account_id: i64,
        user_id: Option<i64>,
        movement_type: MovementKind,
        quantity_change: i64,
        quantity_before: i64,
        quantity_after: i64,
        observations: Option<&str>,
        metadata: &MovementMetadata,
    ) -> RepositoryResult<i64> {
        if quantity_change == 0 {
            return Err(RepositoryError::InternalError(
                "quantity_change não pode ser zero".to_string(),
            ));
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO stock_movements (
                product_id, account_id, user_id, movement_type,
                quantity_change, quantity_before, quantity_after,
                observations, metadata, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                product_id,
                account_id,
                user_id,
                movement_type.as_str(),
                quantity_change,
                quantity_before,
                quantity_after,
                observations,
                serde_json::to_string(metadata)?,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Movements of one product, newest first.
    pub fn list_by_product(&self, product_id: i64) -> RepositoryResult<Vec<StockMovement>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, product_id, account_id, user_id, movement_type,
                    quantity_change, quantity_before, quantity_after,
                    observations, metadata, created_at
             FROM stock_movements
             WHERE product_id = ?1
             ORDER BY id DESC",
        )?;
        let rows = stmt.query_map(params![product_id], map_movement_row)?;
        let mut movements = Vec::new();
        for row in rows {
            movements.push(decode_movement(row?)?);
        }
        Ok(movements)
    }
}

struct MovementRowRaw {
    id: i64,
    product_id: i64,
    account_id: i64,
    user_id: Option<i64>,
    movement_type: String,
    quantity_change: i64,
    quantity_before: i64,
    quantity_after: i64,
    observations: Option<String>,
    metadata: String,
    created_at: String,
}

fn map_movement_row(row: &Row<'_>) -> rusqlite::Result<MovementRowRaw> {
    Ok(MovementRowRaw {
        id: row.get(0)?,
        product_id: row.get(1)?,
        account_id: row.get(2)?,
        user_id: row.get(3)?,
        movement_type: row.get(4)?,
        quantity_change: row.get(5)?,
        quantity_before: row.get(6)?,
        quantity_after: row.get(7)?,
        observations: row.get(8)?,
        metadata: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn decode_movement(raw: MovementRowRaw) -> RepositoryResult<StockMovement> {
    let movement_type = MovementKind::parse(&raw.movement_type).ok_or_else(|| {
        RepositoryError::InternalError(format!(
            "movement_type desconhecido: {}",
            raw.movement_type
        ))
    })?;

    Ok(StockMovement {
        id: raw.id,
        product_id: raw.product_id,
        account_id: raw.account_id,
        user_id: raw.user_id,
        movement_type,
        quantity_change: raw.quantity_change,
        quantity_before: raw.quantity_before,
        quantity_after: raw.quantity_after,
        observations: raw.observations,
        metadata: serde_json::from_str(&raw.metadata)?,
        created_at: parse_timestamp(raw.created_at),
    })
}
