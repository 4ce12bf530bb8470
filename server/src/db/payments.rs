// server/src/db/payments.rs

use crate::errors::Result as AppResult;
use crate::models::Payment;
use carshare_core::{PaymentStatus, PaymentType};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

const PAYMENT_COLUMNS: &str = "id, booking_id, amount_cents, payment_type, status, transaction_id, payment_date";

pub async fn list_for_booking<'e>(exec: impl PgExecutor<'e>, booking_id: Uuid) -> AppResult<Vec<Payment>> {
  let sql = format!(
    "SELECT {} FROM payments WHERE booking_id = $1 ORDER BY payment_date ASC",
    PAYMENT_COLUMNS
  );
  Ok(sqlx::query_as::<_, Payment>(&sql).bind(booking_id).fetch_all(exec).await?)
}

pub async fn get_payment<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> AppResult<Option<Payment>> {
  let sql = format!("SELECT {} FROM payments WHERE id = $1", PAYMENT_COLUMNS);
  Ok(sqlx::query_as::<_, Payment>(&sql).bind(id).fetch_optional(exec).await?)
}

pub async fn insert_payment<'e>(
  exec: impl PgExecutor<'e>,
  booking_id: Uuid,
  amount_cents: i64,
  payment_type: PaymentType,
  status: PaymentStatus,
  transaction_id: Option<&str>,
) -> AppResult<Payment> {
  let sql = format!(
    "INSERT INTO payments (booking_id, amount_cents, payment_type, status, transaction_id) \
     VALUES ($1, $2, $3, $4, $5) RETURNING {}",
    PAYMENT_COLUMNS
  );
  Ok(
    sqlx::query_as::<_, Payment>(&sql)
      .bind(booking_id)
      .bind(amount_cents)
      .bind(payment_type)
      .bind(status)
      .bind(transaction_id)
      .fetch_one(exec)
      .await?,
  )
}

/// Flips a `succeeded` payment to `refunded`. False when the row was not `succeeded` any more,
/// which is how a concurrent refund of the same payment shows up.
pub async fn mark_refunded<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> AppResult<bool> {
  let result = sqlx::query("UPDATE payments SET status = $2 WHERE id = $1 AND status = $3")
    .bind(id)
    .bind(PaymentStatus::Refunded)
    .bind(PaymentStatus::Succeeded)
    .execute(exec)
    .await?;
  Ok(result.rows_affected() == 1)
}

/// Sum of final prices over all bookings, 0 when there are none.
pub async fn total_revenue(pool: &PgPool) -> AppResult<i64> {
  Ok(
    sqlx::query_scalar::<_, i64>("SELECT COALESCE(SUM(final_price_cents), 0)::BIGINT FROM bookings")
      .fetch_one(pool)
      .await?,
  )
}
