use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument, warn};

use crate::modules::payments::model::{
    CreatePaymentDto, Payment, PaymentFilterParams, PaymentStats, PaymentStatus,
    PaymentStatusStat, PaymentType, UpdatePaymentDto, UpdatePaymentStatusDto,
};
use unibase_core::{AppError, validate_id};

const PAYMENT_COLUMNS: &str = "id, student_id, installment_id, amount, payment_type, status, \
     paid_at, notes, created_at, updated_at";

const SORTABLE_COLUMNS: &[&str] = &["id", "amount", "paid_at", "created_at"];

/// Apply a signed delta to a student's running balance. The caller holds the
/// student row lock.
async fn adjust_balance(
    tx: &mut Transaction<'_, Postgres>,
    student_id: i32,
    delta: Decimal,
) -> Result<(), AppError> {
    sqlx::query("UPDATE students SET balance = balance + $1, updated_at = NOW() WHERE id = $2")
        .bind(delta)
        .bind(student_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

async fn lock_student(
    tx: &mut Transaction<'_, Postgres>,
    student_id: i32,
) -> Result<(), AppError> {
    sqlx::query_scalar::<_, i32>(
        "SELECT id FROM students WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
    )
    .bind(student_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))?;

    Ok(())
}

pub struct PaymentService;

impl PaymentService {
    /// Create a payment. A payment created directly in SUCCESS credits the
    /// student's balance in the same transaction.
    #[instrument(skip(db, dto), fields(student.id = %dto.student_id, db.table = "payments"))]
    pub async fn create_payment(db: &PgPool, dto: CreatePaymentDto) -> Result<Payment, AppError> {
        if dto.amount <= Decimal::ZERO {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Payment amount must be positive"
            )));
        }

        if let Some(installment_id) = dto.installment_id {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM installments WHERE id = $1)",
            )
            .bind(installment_id)
            .fetch_one(db)
            .await?;

            if !exists {
                return Err(AppError::not_found(anyhow::anyhow!(
                    "Installment not found"
                )));
            }
        }

        let payment_type = dto.payment_type.unwrap_or(PaymentType::Cash);
        let status = dto.status.unwrap_or(PaymentStatus::Pending);
        let is_success = status.as_str() == "SUCCESS";

        let mut tx = db.begin().await?;

        lock_student(&mut tx, dto.student_id).await?;

        let payment = sqlx::query_as::<_, Payment>(&format!(
            "INSERT INTO payments (student_id, installment_id, amount, payment_type, status,
                                   paid_at, notes)
             VALUES ($1, $2, $3, $4, $5, CASE WHEN $5 = 'SUCCESS' THEN NOW() END, $6)
             RETURNING {}",
            PAYMENT_COLUMNS
        ))
        .bind(dto.student_id)
        .bind(dto.installment_id)
        .bind(dto.amount)
        .bind(payment_type.as_str())
        .bind(status.as_str())
        .bind(&dto.notes)
        .fetch_one(&mut *tx)
        .await?;

        if is_success {
            adjust_balance(&mut tx, dto.student_id, dto.amount).await?;
        }

        tx.commit().await?;

        info!(payment.id = %payment.id, status = %payment.status, "Payment created");

        Ok(payment)
    }

    #[instrument(skip(db, filters), fields(db.table = "payments"))]
    pub async fn get_all_payments(
        db: &PgPool,
        filters: PaymentFilterParams,
    ) -> Result<Vec<Payment>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut query = format!("SELECT {} FROM payments WHERE 1=1", PAYMENT_COLUMNS);

        if let Some(student_id) = filters.student_id {
            query.push_str(&format!(" AND student_id = {}", student_id));
        }

        if let Some(status) = filters.status {
            query.push_str(&format!(" AND status = '{}'", status.as_str()));
        }

        if let Some(payment_type) = filters.payment_type {
            query.push_str(&format!(" AND payment_type = '{}'", payment_type.as_str()));
        }

        if let Some(min_amount) = filters.min_amount {
            query.push_str(&format!(" AND amount >= {}", min_amount));
        }

        if let Some(max_amount) = filters.max_amount {
            query.push_str(&format!(" AND amount <= {}", max_amount));
        }

        query.push_str(&filters.sort.order_clause(SORTABLE_COLUMNS, "created_at")?);
        query.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));

        let payments = sqlx::query_as::<_, Payment>(&query).fetch_all(db).await?;

        Ok(payments)
    }

    #[instrument(skip(db), fields(payment.id = %payment_id, db.table = "payments"))]
    pub async fn get_payment_by_id(db: &PgPool, payment_id: i32) -> Result<Payment, AppError> {
        validate_id(payment_id)?;

        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {} FROM payments WHERE id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(payment_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Payment not found")))?;

        Ok(payment)
    }

    /// Update payment details. An amount change on a SUCCESS payment applies
    /// the difference to the student's balance in the same transaction.
    #[instrument(skip(db, dto), fields(payment.id = %payment_id, db.table = "payments"))]
    pub async fn update_payment(
        db: &PgPool,
        payment_id: i32,
        dto: UpdatePaymentDto,
    ) -> Result<Payment, AppError> {
        validate_id(payment_id)?;

        if let Some(amount) = dto.amount
            && amount <= Decimal::ZERO
        {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Payment amount must be positive"
            )));
        }

        let mut tx = db.begin().await?;

        let existing = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {} FROM payments WHERE id = $1 FOR UPDATE",
            PAYMENT_COLUMNS
        ))
        .bind(payment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Payment not found")))?;

        if existing.status == "CANCELLED" {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Cannot modify a cancelled payment"
            )));
        }

        let amount = dto.amount.unwrap_or(existing.amount);
        let payment_type = match dto.payment_type {
            Some(t) => t.as_str().to_string(),
            None => existing.payment_type.clone(),
        };
        let notes = if dto.notes.is_some() {
            dto.notes
        } else {
            existing.notes.clone()
        };

        if existing.status == "SUCCESS" && amount != existing.amount {
            lock_student(&mut tx, existing.student_id).await?;
            adjust_balance(&mut tx, existing.student_id, amount - existing.amount).await?;
        }

        let payment = sqlx::query_as::<_, Payment>(&format!(
            "UPDATE payments
             SET amount = $1, payment_type = $2, notes = $3, updated_at = NOW()
             WHERE id = $4
             RETURNING {}",
            PAYMENT_COLUMNS
        ))
        .bind(amount)
        .bind(&payment_type)
        .bind(&notes)
        .bind(payment_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(payment)
    }

    /// Change a payment's status, cascading to the student's balance:
    /// entering SUCCESS credits the amount, leaving SUCCESS debits it back.
    /// Everything happens inside one transaction with the payment and
    /// student rows locked, so concurrent status flips serialize.
    #[instrument(skip(db, dto), fields(payment.id = %payment_id, db.table = "payments,students"))]
    pub async fn update_status(
        db: &PgPool,
        payment_id: i32,
        dto: UpdatePaymentStatusDto,
    ) -> Result<Payment, AppError> {
        validate_id(payment_id)?;

        let new_status = dto.status.as_str();

        let mut tx = db.begin().await?;

        let existing = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {} FROM payments WHERE id = $1 FOR UPDATE",
            PAYMENT_COLUMNS
        ))
        .bind(payment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Payment not found")))?;

        if existing.status == new_status {
            tx.commit().await?;
            return Ok(existing);
        }

        if existing.status == "CANCELLED" {
            warn!(payment.id = %payment_id, "Status change attempted on cancelled payment");
            return Err(AppError::conflict(anyhow::anyhow!(
                "Cannot change the status of a cancelled payment"
            )));
        }

        let was_success = existing.status == "SUCCESS";
        let becomes_success = new_status == "SUCCESS";

        if was_success || becomes_success {
            lock_student(&mut tx, existing.student_id).await?;
        }

        if becomes_success && !was_success {
            adjust_balance(&mut tx, existing.student_id, existing.amount).await?;
        } else if was_success && !becomes_success {
            adjust_balance(&mut tx, existing.student_id, -existing.amount).await?;
        }

        let payment = sqlx::query_as::<_, Payment>(&format!(
            "UPDATE payments
             SET status = $1,
                 paid_at = CASE WHEN $1 = 'SUCCESS' THEN NOW() ELSE paid_at END,
                 updated_at = NOW()
             WHERE id = $2
             RETURNING {}",
            PAYMENT_COLUMNS
        ))
        .bind(new_status)
        .bind(payment_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            payment.id = %payment_id,
            from = %existing.status,
            to = %new_status,
            "Payment status changed"
        );

        Ok(payment)
    }

    #[instrument(skip(db), fields(payment.id = %payment_id, db.table = "payments"))]
    pub async fn delete_payment(db: &PgPool, payment_id: i32) -> Result<(), AppError> {
        let existing = Self::get_payment_by_id(db, payment_id).await?;

        // A successful payment is part of the balance history; revert it
        // through a status change first
        if existing.status == "SUCCESS" {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Cannot delete a successful payment"
            )));
        }

        sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(payment_id)
            .execute(db)
            .await?;

        Ok(())
    }

    #[instrument(skip(db), fields(db.table = "payments"))]
    pub async fn get_stats(db: &PgPool) -> Result<PaymentStats, AppError> {
        let by_status = sqlx::query_as::<_, PaymentStatusStat>(
            "SELECT status, COUNT(*) AS count, COALESCE(SUM(amount), 0) AS total_amount
             FROM payments
             GROUP BY status
             ORDER BY status",
        )
        .fetch_all(db)
        .await?;

        Ok(PaymentStats { by_status })
    }
}
