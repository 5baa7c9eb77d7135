use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::modules::installments::model::{
    CreateInstallmentDto, Installment, InstallmentFilterParams, InstallmentResponse,
    PayInstallmentDto, SweepOverdueResponse, UpdateInstallmentDto,
};
use unibase_core::{AppError, validate_id};

const INSTALLMENT_COLUMNS: &str = "id, contract_id, sequence_no, amount, paid_amount, due_date, \
     payment_date, status, notes, created_at, updated_at";

const SORTABLE_COLUMNS: &[&str] = &["id", "sequence_no", "amount", "due_date", "created_at"];

pub struct InstallmentService;

impl InstallmentService {
    #[instrument(skip(db, dto), fields(contract.id = %dto.contract_id, db.table = "installments"))]
    pub async fn create_installment(
        db: &PgPool,
        dto: CreateInstallmentDto,
    ) -> Result<InstallmentResponse, AppError> {
        if dto.amount <= Decimal::ZERO {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Installment amount must be positive"
            )));
        }

        let contract_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM contracts WHERE id = $1)",
        )
        .bind(dto.contract_id)
        .fetch_one(db)
        .await?;

        if !contract_exists {
            return Err(AppError::not_found(anyhow::anyhow!("Contract not found")));
        }

        let sequence_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM installments WHERE contract_id = $1 AND sequence_no = $2)",
        )
        .bind(dto.contract_id)
        .bind(dto.sequence_no)
        .fetch_one(db)
        .await?;

        if sequence_taken {
            return Err(AppError::conflict(anyhow::anyhow!(
                "An installment with this sequence number already exists for this contract"
            )));
        }

        let installment = sqlx::query_as::<_, Installment>(&format!(
            "INSERT INTO installments (contract_id, sequence_no, amount, due_date, notes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            INSTALLMENT_COLUMNS
        ))
        .bind(dto.contract_id)
        .bind(dto.sequence_no)
        .bind(dto.amount)
        .bind(dto.due_date)
        .bind(&dto.notes)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow::anyhow!(
                    "An installment with this sequence number already exists for this contract"
                ));
            }
            AppError::from(e)
        })?;

        Ok(installment.into())
    }

    #[instrument(skip(db, filters), fields(db.table = "installments"))]
    pub async fn get_all_installments(
        db: &PgPool,
        filters: InstallmentFilterParams,
    ) -> Result<Vec<InstallmentResponse>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut query = format!("SELECT {} FROM installments WHERE 1=1", INSTALLMENT_COLUMNS);

        if let Some(contract_id) = filters.contract_id {
            query.push_str(&format!(" AND contract_id = {}", contract_id));
        }

        if let Some(status) = filters.status {
            query.push_str(&format!(" AND status = '{}'", status.as_str()));
        }

        if let Some(due_before) = filters.due_before {
            query.push_str(&format!(" AND due_date <= '{}'", due_before));
        }

        if let Some(due_after) = filters.due_after {
            query.push_str(&format!(" AND due_date >= '{}'", due_after));
        }

        query.push_str(&filters.sort.order_clause(SORTABLE_COLUMNS, "due_date")?);
        query.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));

        let installments = sqlx::query_as::<_, Installment>(&query)
            .fetch_all(db)
            .await?;

        Ok(installments.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(db), fields(installment.id = %installment_id, db.table = "installments"))]
    pub async fn get_installment_by_id(
        db: &PgPool,
        installment_id: i32,
    ) -> Result<InstallmentResponse, AppError> {
        validate_id(installment_id)?;

        let installment = sqlx::query_as::<_, Installment>(&format!(
            "SELECT {} FROM installments WHERE id = $1",
            INSTALLMENT_COLUMNS
        ))
        .bind(installment_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Installment not found")))?;

        Ok(installment.into())
    }

    #[instrument(skip(db, dto), fields(installment.id = %installment_id, db.table = "installments"))]
    pub async fn update_installment(
        db: &PgPool,
        installment_id: i32,
        dto: UpdateInstallmentDto,
    ) -> Result<InstallmentResponse, AppError> {
        validate_id(installment_id)?;

        let existing = sqlx::query_as::<_, Installment>(&format!(
            "SELECT {} FROM installments WHERE id = $1",
            INSTALLMENT_COLUMNS
        ))
        .bind(installment_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Installment not found")))?;

        if let Some(amount) = dto.amount {
            if amount <= Decimal::ZERO {
                return Err(AppError::bad_request(anyhow::anyhow!(
                    "Installment amount must be positive"
                )));
            }

            // The amount is frozen once money has been received against it
            if existing.paid_amount > Decimal::ZERO && amount != existing.amount {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "Cannot change the amount of a partially paid installment"
                )));
            }
        }

        let amount = dto.amount.unwrap_or(existing.amount);
        let due_date = dto.due_date.unwrap_or(existing.due_date);
        let notes = if dto.notes.is_some() {
            dto.notes
        } else {
            existing.notes
        };

        let installment = sqlx::query_as::<_, Installment>(&format!(
            "UPDATE installments
             SET amount = $1, due_date = $2, notes = $3, updated_at = NOW()
             WHERE id = $4
             RETURNING {}",
            INSTALLMENT_COLUMNS
        ))
        .bind(amount)
        .bind(due_date)
        .bind(&notes)
        .bind(installment_id)
        .fetch_one(db)
        .await?;

        Ok(installment.into())
    }

    /// Record a payment against an installment.
    ///
    /// Runs in a transaction with the row locked so concurrent payments
    /// serialize: the second caller sees the first one's `paid_amount`.
    /// Overpayment fails rather than clamping. Reaching the full amount
    /// transitions the installment to PAID; a partial payment on an OVERDUE
    /// installment moves it back to PENDING.
    #[instrument(skip(db, dto), fields(installment.id = %installment_id, db.table = "installments"))]
    pub async fn pay(
        db: &PgPool,
        installment_id: i32,
        dto: PayInstallmentDto,
    ) -> Result<InstallmentResponse, AppError> {
        validate_id(installment_id)?;

        if dto.paid_amount <= Decimal::ZERO {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Payment amount must be positive"
            )));
        }

        let mut tx = db.begin().await?;

        let existing = sqlx::query_as::<_, Installment>(&format!(
            "SELECT {} FROM installments WHERE id = $1 FOR UPDATE",
            INSTALLMENT_COLUMNS
        ))
        .bind(installment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Installment not found")))?;

        match existing.status.as_str() {
            "CANCELLED" => {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "Cannot pay a cancelled installment"
                )));
            }
            "PAID" => {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "Installment is already fully paid"
                )));
            }
            _ => {}
        }

        let new_paid = existing.paid_amount + dto.paid_amount;

        if new_paid > existing.amount {
            warn!(
                installment.id = %installment_id,
                paid = %existing.paid_amount,
                attempted = %dto.paid_amount,
                "Rejected overpayment"
            );
            return Err(AppError::conflict(anyhow::anyhow!(
                "Payment of {} exceeds the remaining amount of {}",
                dto.paid_amount,
                existing.amount - existing.paid_amount
            )));
        }

        let new_status = if new_paid >= existing.amount {
            "PAID"
        } else {
            // Partial payment keeps the installment under active tracking,
            // including the OVERDUE -> PENDING transition
            "PENDING"
        };

        let payment_date = dto
            .payment_date
            .unwrap_or_else(|| Utc::now().date_naive());
        let notes = if dto.notes.is_some() {
            dto.notes
        } else {
            existing.notes
        };

        let installment = sqlx::query_as::<_, Installment>(&format!(
            "UPDATE installments
             SET paid_amount = $1, status = $2, payment_date = $3, notes = $4, updated_at = NOW()
             WHERE id = $5
             RETURNING {}",
            INSTALLMENT_COLUMNS
        ))
        .bind(new_paid)
        .bind(new_status)
        .bind(payment_date)
        .bind(&notes)
        .bind(installment_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            installment.id = %installment_id,
            paid_amount = %new_paid,
            status = %new_status,
            "Installment payment recorded"
        );

        Ok(installment.into())
    }

    /// Cancel an installment. PAID installments cannot be cancelled.
    #[instrument(skip(db), fields(installment.id = %installment_id, db.table = "installments"))]
    pub async fn cancel(
        db: &PgPool,
        installment_id: i32,
    ) -> Result<InstallmentResponse, AppError> {
        validate_id(installment_id)?;

        let mut tx = db.begin().await?;

        let existing = sqlx::query_as::<_, Installment>(&format!(
            "SELECT {} FROM installments WHERE id = $1 FOR UPDATE",
            INSTALLMENT_COLUMNS
        ))
        .bind(installment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Installment not found")))?;

        match existing.status.as_str() {
            "PAID" => {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "Cannot cancel a paid installment"
                )));
            }
            "CANCELLED" => {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "Installment is already cancelled"
                )));
            }
            _ => {}
        }

        let installment = sqlx::query_as::<_, Installment>(&format!(
            "UPDATE installments SET status = 'CANCELLED', updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            INSTALLMENT_COLUMNS
        ))
        .bind(installment_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(installment.into())
    }

    /// Batch sweep: every PENDING installment whose due date is strictly in
    /// the past becomes OVERDUE. Reads stay accurate either way because
    /// `overdue_days` is derived; the sweep persists the status for filtering.
    #[instrument(skip(db), fields(db.table = "installments"))]
    pub async fn sweep_overdue(db: &PgPool) -> Result<SweepOverdueResponse, AppError> {
        let result = sqlx::query(
            "UPDATE installments SET status = 'OVERDUE', updated_at = NOW()
             WHERE status = 'PENDING' AND due_date < CURRENT_DATE",
        )
        .execute(db)
        .await?;

        let swept = result.rows_affected();

        info!(swept = %swept, "Overdue sweep completed");

        Ok(SweepOverdueResponse { swept })
    }

    #[instrument(skip(db), fields(installment.id = %installment_id, db.table = "installments"))]
    pub async fn delete_installment(db: &PgPool, installment_id: i32) -> Result<(), AppError> {
        let existing = Self::get_installment_by_id(db, installment_id).await?;

        // A paid-against installment is part of the money trail
        if existing.paid_amount > Decimal::ZERO {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Cannot delete an installment with recorded payments"
            )));
        }

        sqlx::query("DELETE FROM installments WHERE id = $1")
            .bind(installment_id)
            .execute(db)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::NaiveDate;

    async fn seed_contract(pool: &PgPool) -> i32 {
        let faculty_id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO faculties (name, code) VALUES ('Engineering', 'ENG') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();

        let group_id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO groups (name, course_year, faculty_id) VALUES ('SE-101', 1, $1) RETURNING id",
        )
        .bind(faculty_id)
        .fetch_one(pool)
        .await
        .unwrap();

        let student_id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO students
                 (first_name, last_name, passport_series, jshshir, birth_date, gender,
                  group_id, faculty_id)
             VALUES ('Aziz', 'Karimov', 'AB1234567', '12345678901234', '2004-05-14', 'MALE',
                     $1, $2)
             RETURNING id",
        )
        .bind(group_id)
        .bind(faculty_id)
        .fetch_one(pool)
        .await
        .unwrap();

        sqlx::query_scalar::<_, i32>(
            "INSERT INTO contracts (contract_number, student_id, academic_year, total_amount,
                                    start_date, end_date)
             VALUES ('CN-1', $1, 2025, 5000000, '2025-09-01', '2026-06-30')
             RETURNING id",
        )
        .bind(student_id)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn seed_installment(pool: &PgPool, contract_id: i32, amount: i64) -> i32 {
        let dto = CreateInstallmentDto {
            contract_id,
            sequence_no: 1,
            amount: Decimal::new(amount, 0),
            due_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            notes: None,
        };
        InstallmentService::create_installment(pool, dto)
            .await
            .unwrap()
            .id
    }

    fn pay_dto(amount: i64) -> PayInstallmentDto {
        PayInstallmentDto {
            paid_amount: Decimal::new(amount, 0),
            payment_date: None,
            notes: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_partial_then_full_payment_transitions_to_paid(pool: PgPool) {
        let contract_id = seed_contract(&pool).await;
        let id = seed_installment(&pool, contract_id, 500_000).await;

        let after_partial = InstallmentService::pay(&pool, id, pay_dto(200_000))
            .await
            .unwrap();
        assert_eq!(after_partial.status, "PENDING");
        assert_eq!(after_partial.remaining_amount, Decimal::new(300_000, 0));
        assert!(!after_partial.is_fully_paid);

        let after_full = InstallmentService::pay(&pool, id, pay_dto(300_000))
            .await
            .unwrap();
        assert_eq!(after_full.status, "PAID");
        assert!(after_full.is_fully_paid);
        assert!(after_full.payment_date.is_some());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_exact_payment_transitions_to_paid(pool: PgPool) {
        let contract_id = seed_contract(&pool).await;
        let id = seed_installment(&pool, contract_id, 500_000).await;

        let paid = InstallmentService::pay(&pool, id, pay_dto(500_000))
            .await
            .unwrap();
        assert_eq!(paid.status, "PAID");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_overpayment_rejected_and_state_unchanged(pool: PgPool) {
        let contract_id = seed_contract(&pool).await;
        let id = seed_installment(&pool, contract_id, 500_000).await;

        InstallmentService::pay(&pool, id, pay_dto(400_000))
            .await
            .unwrap();

        let err = InstallmentService::pay(&pool, id, pay_dto(200_000))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        // paid_amount must be untouched by the failed payment
        let installment = InstallmentService::get_installment_by_id(&pool, id)
            .await
            .unwrap();
        assert_eq!(installment.paid_amount, Decimal::new(400_000, 0));
        assert_eq!(installment.status, "PENDING");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_paying_a_paid_installment_conflicts(pool: PgPool) {
        let contract_id = seed_contract(&pool).await;
        let id = seed_installment(&pool, contract_id, 500_000).await;

        InstallmentService::pay(&pool, id, pay_dto(500_000))
            .await
            .unwrap();

        let err = InstallmentService::pay(&pool, id, pay_dto(1))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_paying_a_cancelled_installment_conflicts(pool: PgPool) {
        let contract_id = seed_contract(&pool).await;
        let id = seed_installment(&pool, contract_id, 500_000).await;

        InstallmentService::cancel(&pool, id).await.unwrap();

        let err = InstallmentService::pay(&pool, id, pay_dto(100))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_partial_payment_reverts_overdue_to_pending(pool: PgPool) {
        let contract_id = seed_contract(&pool).await;
        let id = seed_installment(&pool, contract_id, 500_000).await;

        sqlx::query("UPDATE installments SET status = 'OVERDUE' WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await
            .unwrap();

        let after = InstallmentService::pay(&pool, id, pay_dto(100_000))
            .await
            .unwrap();
        assert_eq!(after.status, "PENDING");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_sweep_marks_past_due_pending_rows(pool: PgPool) {
        let contract_id = seed_contract(&pool).await;

        // One past due, one in the future
        sqlx::query(
            "INSERT INTO installments (contract_id, sequence_no, amount, due_date)
             VALUES ($1, 1, 1000, CURRENT_DATE - 5), ($1, 2, 1000, CURRENT_DATE + 5)",
        )
        .bind(contract_id)
        .execute(&pool)
        .await
        .unwrap();

        let result = InstallmentService::sweep_overdue(&pool).await.unwrap();
        assert_eq!(result.swept, 1);

        let statuses = sqlx::query_scalar::<_, String>(
            "SELECT status FROM installments WHERE contract_id = $1 ORDER BY sequence_no",
        )
        .bind(contract_id)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(statuses, vec!["OVERDUE", "PENDING"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_cancel_paid_installment_rejected(pool: PgPool) {
        let contract_id = seed_contract(&pool).await;
        let id = seed_installment(&pool, contract_id, 500_000).await;

        InstallmentService::pay(&pool, id, pay_dto(500_000))
            .await
            .unwrap();

        let err = InstallmentService::cancel(&pool, id).await.unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_blocked_after_payment(pool: PgPool) {
        let contract_id = seed_contract(&pool).await;
        let id = seed_installment(&pool, contract_id, 500_000).await;

        InstallmentService::pay(&pool, id, pay_dto(1_000))
            .await
            .unwrap();

        let err = InstallmentService::delete_installment(&pool, id)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }
}
