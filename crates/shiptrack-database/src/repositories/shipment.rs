//! Shipment repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use shiptrack_core::error::{AppError, ErrorKind};
use shiptrack_core::result::AppResult;
use shiptrack_entity::shipment::model::CreateShipment;
use shiptrack_entity::Shipment;

/// Repository for shipment CRUD and status updates.
#[derive(Debug, Clone)]
pub struct ShipmentRepository {
    pool: PgPool,
}

impl ShipmentRepository {
    /// Create a new shipment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all shipments owned by a user, newest first.
    pub async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<Shipment>> {
        sqlx::query_as::<_, Shipment>(
            "SELECT * FROM shipments WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list shipments", e))
    }

    /// Find one shipment by its owner and tracking number.
    pub async fn find_by_tracking(
        &self,
        user_id: Uuid,
        tracking_number: &str,
    ) -> AppResult<Option<Shipment>> {
        sqlx::query_as::<_, Shipment>(
            "SELECT * FROM shipments WHERE user_id = $1 AND tracking_number = $2",
        )
        .bind(user_id)
        .bind(tracking_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find shipment", e)
        })
    }

    /// List all shipments across users whose status is not terminal.
    ///
    /// Used by the background refresh cycle; terminal shipments are
    /// excluded to bound polling cost.
    pub async fn find_active(&self) -> AppResult<Vec<Shipment>> {
        sqlx::query_as::<_, Shipment>(
            "SELECT * FROM shipments \
             WHERE LOWER(status) NOT IN ('delivered', 'cancelled', 'returned') \
             ORDER BY updated_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list active shipments", e)
        })
    }

    /// Insert a new shipment.
    pub async fn create(&self, shipment: &CreateShipment) -> AppResult<Shipment> {
        sqlx::query_as::<_, Shipment>(
            "INSERT INTO shipments \
             (id, user_id, tracking_number, carrier, description, origin, destination, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(shipment.user_id)
        .bind(&shipment.tracking_number)
        .bind(&shipment.carrier)
        .bind(&shipment.description)
        .bind(&shipment.origin)
        .bind(&shipment.destination)
        .bind(&shipment.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create shipment", e))
    }

    /// Update a shipment's status, carrier, and estimated delivery.
    ///
    /// Last write wins; `updated_at` is advanced with GREATEST so a slow
    /// concurrent writer can never move it backwards.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: &str,
        carrier: Option<&str>,
        estimated_delivery: Option<chrono::DateTime<chrono::Utc>>,
    ) -> AppResult<Shipment> {
        sqlx::query_as::<_, Shipment>(
            "UPDATE shipments SET \
               status = $2, \
               carrier = COALESCE($3, carrier), \
               estimated_delivery = COALESCE($4, estimated_delivery), \
               updated_at = GREATEST(NOW(), updated_at) \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(carrier)
        .bind(estimated_delivery)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update shipment status", e)
        })
    }

    /// Delete a shipment owned by a user. Returns whether a row was removed.
    pub async fn delete(&self, user_id: Uuid, tracking_number: &str) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM shipments WHERE user_id = $1 AND tracking_number = $2")
                .bind(user_id)
                .bind(tracking_number)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to delete shipment", e)
                })?;
        Ok(result.rows_affected() > 0)
    }
}
