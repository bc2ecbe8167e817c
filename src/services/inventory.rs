use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, TransactionError, TransactionTrait,
};
use tracing::{info, instrument};

use crate::config::RemoveMissingPolicy;
use crate::entities::activity_log::{self, Entity as ActivityLog, LogAction};
use crate::entities::inventory_item::{self, Entity as InventoryItem};
use crate::errors::ServiceError;

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAction {
    Add,
    Remove,
}

/// A validated quantity delta against one barcode.
#[derive(Debug, Clone)]
pub struct ApplyRequest {
    pub barcode: String,
    pub action: StockAction,
    pub quantity: i32,
    /// Display name; only written when the add creates the row.
    pub name: Option<String>,
}

/// What a reconciliation did to the inventory table.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    Created(inventory_item::Model),
    Updated(inventory_item::Model),
    /// The remove drained the row (remainder clamped, never stored negative).
    Deleted { barcode: String },
    /// Remove against an unknown barcode under the `Ignore` policy.
    Ignored { barcode: String },
}

/// Applies quantity deltas to the inventory table and appends the matching
/// activity-log row, both inside one transaction.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
    remove_missing: RemoveMissingPolicy,
}

impl InventoryService {
    pub fn new(db: Arc<DatabaseConnection>, remove_missing: RemoveMissingPolicy) -> Self {
        Self { db, remove_missing }
    }

    /// Applies one signed quantity delta. Not idempotent: the same request
    /// applied twice moves stock twice, which is the intended model of
    /// physical movement.
    #[instrument(skip(self), fields(barcode = %request.barcode, quantity = request.quantity))]
    pub async fn apply(&self, request: ApplyRequest) -> Result<ApplyOutcome, ServiceError> {
        let barcode = request.barcode.trim().to_string();
        if barcode.is_empty() {
            return Err(ServiceError::InvalidInput(
                "barcode must not be empty".to_string(),
            ));
        }
        if request.quantity <= 0 {
            return Err(ServiceError::InvalidInput(
                "quantity must be a positive integer".to_string(),
            ));
        }

        let request = ApplyRequest { barcode, ..request };
        let policy = self.remove_missing;

        let outcome = self
            .db
            .transaction::<_, ApplyOutcome, ServiceError>(move |txn| {
                Box::pin(async move { apply_in_txn(txn, &request, policy).await })
            })
            .await
            .map_err(flatten_txn_err)?;

        match &outcome {
            ApplyOutcome::Created(item) => {
                info!(quantity = item.quantity, "created inventory row")
            }
            ApplyOutcome::Updated(item) => {
                info!(quantity = item.quantity, "updated inventory row")
            }
            ApplyOutcome::Deleted { .. } => info!("inventory row drained and deleted"),
            ApplyOutcome::Ignored { .. } => info!("remove ignored, barcode unknown"),
        }

        Ok(outcome)
    }

    /// Full inventory snapshot, newest row first.
    pub async fn snapshot(&self) -> Result<Vec<inventory_item::Model>, ServiceError> {
        let items = InventoryItem::find()
            .order_by_desc(inventory_item::Column::Id)
            .all(self.db.as_ref())
            .await?;
        Ok(items)
    }

    /// Full activity log, newest entry first.
    pub async fn activity(&self) -> Result<Vec<activity_log::Model>, ServiceError> {
        let entries = ActivityLog::find()
            .order_by_desc(activity_log::Column::Id)
            .all(self.db.as_ref())
            .await?;
        Ok(entries)
    }

    /// Unconditional delete by barcode. Returns whether a row was removed.
    /// Does not append to the activity log.
    #[instrument(skip(self))]
    pub async fn delete_by_barcode(&self, barcode: &str) -> Result<bool, ServiceError> {
        let result = InventoryItem::delete_many()
            .filter(inventory_item::Column::Barcode.eq(barcode))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Unconditional delete by row id. Returns whether a row was removed.
    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: i32) -> Result<bool, ServiceError> {
        let result = InventoryItem::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Clears both tables. Destructive and irreversible.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<(), ServiceError> {
        self.db
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    ActivityLog::delete_many().exec(txn).await?;
                    InventoryItem::delete_many().exec(txn).await?;
                    Ok(())
                })
            })
            .await
            .map_err(flatten_txn_err)?;
        info!("inventory and activity log cleared");
        Ok(())
    }
}

async fn apply_in_txn(
    txn: &DatabaseTransaction,
    request: &ApplyRequest,
    policy: RemoveMissingPolicy,
) -> Result<ApplyOutcome, ServiceError> {
    let now = Utc::now();
    let existing = InventoryItem::find()
        .filter(inventory_item::Column::Barcode.eq(request.barcode.as_str()))
        .one(txn)
        .await?;

    let outcome = match (request.action, existing) {
        (StockAction::Add, Some(row)) => {
            // Rejected, not wrapped: a wrapped sum would store a negative
            // quantity and break the no-non-positive-row invariant.
            let new_quantity = row.quantity.checked_add(request.quantity).ok_or_else(|| {
                ServiceError::InvalidInput(format!(
                    "quantity for barcode {} would overflow",
                    request.barcode
                ))
            })?;
            let mut item: inventory_item::ActiveModel = row.into();
            item.quantity = Set(new_quantity);
            item.updated_at = Set(now);
            let updated = item.update(txn).await?;
            record_log(txn, &request.barcode, LogAction::Added, request.quantity, now).await?;
            ApplyOutcome::Updated(updated)
        }
        (StockAction::Add, None) => {
            let created = inventory_item::ActiveModel {
                barcode: Set(request.barcode.clone()),
                name: Set(request.name.clone()),
                quantity: Set(request.quantity),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(txn)
            .await?;
            record_log(txn, &request.barcode, LogAction::Added, request.quantity, now).await?;
            ApplyOutcome::Created(created)
        }
        (StockAction::Remove, None) => match policy {
            RemoveMissingPolicy::Error => {
                return Err(ServiceError::NotFound(format!(
                    "no inventory row for barcode {}",
                    request.barcode
                )))
            }
            RemoveMissingPolicy::Ignore => ApplyOutcome::Ignored {
                barcode: request.barcode.clone(),
            },
        },
        (StockAction::Remove, Some(row)) => {
            let remaining = row.quantity - request.quantity;
            let applied = if remaining > 0 {
                let mut item: inventory_item::ActiveModel = row.into();
                item.quantity = Set(remaining);
                item.updated_at = Set(now);
                ApplyOutcome::Updated(item.update(txn).await?)
            } else {
                let barcode = row.barcode.clone();
                row.delete(txn).await?;
                ApplyOutcome::Deleted { barcode }
            };
            // The requested delta is logged even when it clamped past zero.
            record_log(
                txn,
                &request.barcode,
                LogAction::Removed,
                request.quantity,
                now,
            )
            .await?;
            applied
        }
    };

    Ok(outcome)
}

async fn record_log(
    txn: &DatabaseTransaction,
    barcode: &str,
    action: LogAction,
    quantity: i32,
    at: DateTime<Utc>,
) -> Result<(), ServiceError> {
    activity_log::ActiveModel {
        barcode: Set(barcode.to_string()),
        action: Set(action),
        quantity: Set(quantity),
        created_at: Set(at),
        ..Default::default()
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn flatten_txn_err(err: TransactionError<ServiceError>) -> ServiceError {
    match err {
        TransactionError::Connection(db) => ServiceError::Database(db),
        TransactionError::Transaction(service) => service,
    }
}
