use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, instrument};

use crate::modules::contracts::model::{
    Contract, ContractFilterParams, ContractStatus, ContractWithInstallments, CreateContractDto,
    UpdateContractDto,
};
use crate::modules::installments::model::{Installment, InstallmentResponse};
use unibase_core::{AppError, validate_id};

const CONTRACT_COLUMNS: &str = "id, contract_number, student_id, academic_year, total_amount, \
     start_date, end_date, status, notes, created_at, updated_at";

const SORTABLE_COLUMNS: &[&str] = &[
    "id",
    "contract_number",
    "academic_year",
    "total_amount",
    "created_at",
];

async fn ensure_student_exists(db: &PgPool, student_id: i32) -> Result<(), AppError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM students WHERE id = $1 AND deleted_at IS NULL)",
    )
    .bind(student_id)
    .fetch_one(db)
    .await?;

    if !exists {
        return Err(AppError::not_found(anyhow::anyhow!("Student not found")));
    }

    Ok(())
}

pub struct ContractService;

impl ContractService {
    #[instrument(skip(db, dto), fields(contract.number = %dto.contract_number, db.table = "contracts"))]
    pub async fn create_contract(
        db: &PgPool,
        dto: CreateContractDto,
    ) -> Result<Contract, AppError> {
        if dto.total_amount <= Decimal::ZERO {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Contract amount must be positive"
            )));
        }

        if dto.end_date <= dto.start_date {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Contract end date must be after the start date"
            )));
        }

        let number_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM contracts WHERE contract_number = $1)",
        )
        .bind(&dto.contract_number)
        .fetch_one(db)
        .await?;

        if number_taken {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Contract number already exists"
            )));
        }

        ensure_student_exists(db, dto.student_id).await?;

        let contract = sqlx::query_as::<_, Contract>(&format!(
            "INSERT INTO contracts
                 (contract_number, student_id, academic_year, total_amount,
                  start_date, end_date, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            CONTRACT_COLUMNS
        ))
        .bind(&dto.contract_number)
        .bind(dto.student_id)
        .bind(dto.academic_year)
        .bind(dto.total_amount)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .bind(&dto.notes)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow::anyhow!("Contract number already exists"));
            }
            AppError::from(e)
        })?;

        info!(contract.id = %contract.id, "Contract created");

        Ok(contract)
    }

    #[instrument(skip(db, filters), fields(db.table = "contracts"))]
    pub async fn get_all_contracts(
        db: &PgPool,
        filters: ContractFilterParams,
    ) -> Result<Vec<Contract>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut query = format!("SELECT {} FROM contracts WHERE 1=1", CONTRACT_COLUMNS);
        let mut params: Vec<String> = Vec::new();

        if let Some(search) = &filters.search {
            params.push(format!("%{}%", search));
            query.push_str(&format!(" AND contract_number ILIKE ${}", params.len()));
        }

        if let Some(student_id) = filters.student_id {
            query.push_str(&format!(" AND student_id = {}", student_id));
        }

        if let Some(academic_year) = filters.academic_year {
            query.push_str(&format!(" AND academic_year = {}", academic_year));
        }

        if let Some(status) = filters.status {
            query.push_str(&format!(" AND status = '{}'", status.as_str()));
        }

        query.push_str(&filters.sort.order_clause(SORTABLE_COLUMNS, "created_at")?);
        query.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));

        let mut sql = sqlx::query_as::<_, Contract>(&query);
        for param in &params {
            sql = sql.bind(param);
        }
        let contracts = sql.fetch_all(db).await?;

        Ok(contracts)
    }

    #[instrument(skip(db), fields(contract.id = %contract_id, db.table = "contracts"))]
    pub async fn get_contract_by_id(db: &PgPool, contract_id: i32) -> Result<Contract, AppError> {
        validate_id(contract_id)?;

        let contract = sqlx::query_as::<_, Contract>(&format!(
            "SELECT {} FROM contracts WHERE id = $1",
            CONTRACT_COLUMNS
        ))
        .bind(contract_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Contract not found")))?;

        Ok(contract)
    }

    #[instrument(skip(db), fields(contract.id = %contract_id, db.table = "contracts,installments"))]
    pub async fn get_contract_with_installments(
        db: &PgPool,
        contract_id: i32,
    ) -> Result<ContractWithInstallments, AppError> {
        let contract = Self::get_contract_by_id(db, contract_id).await?;

        let installments = sqlx::query_as::<_, Installment>(
            "SELECT id, contract_id, sequence_no, amount, paid_amount, due_date, payment_date,
                    status, notes, created_at, updated_at
             FROM installments
             WHERE contract_id = $1
             ORDER BY sequence_no",
        )
        .bind(contract_id)
        .fetch_all(db)
        .await?
        .into_iter()
        .map(InstallmentResponse::from)
        .collect();

        Ok(ContractWithInstallments {
            contract,
            installments,
        })
    }

    #[instrument(skip(db, dto), fields(contract.id = %contract_id, db.table = "contracts"))]
    pub async fn update_contract(
        db: &PgPool,
        contract_id: i32,
        dto: UpdateContractDto,
    ) -> Result<Contract, AppError> {
        let existing = Self::get_contract_by_id(db, contract_id).await?;

        if let Some(number) = &dto.contract_number
            && number != &existing.contract_number
        {
            let number_taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM contracts WHERE contract_number = $1 AND id <> $2)",
            )
            .bind(number)
            .bind(contract_id)
            .fetch_one(db)
            .await?;

            if number_taken {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "Contract number already exists"
                )));
            }
        }

        if let Some(status) = dto.status
            && !ContractStatus::can_transition_from(&existing.status, status)
        {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Cannot change a {} contract to {}",
                existing.status,
                status.as_str()
            )));
        }

        if let Some(total_amount) = dto.total_amount
            && total_amount <= Decimal::ZERO
        {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Contract amount must be positive"
            )));
        }

        let contract_number = dto.contract_number.unwrap_or(existing.contract_number);
        let academic_year = dto.academic_year.unwrap_or(existing.academic_year);
        let total_amount = dto.total_amount.unwrap_or(existing.total_amount);
        let start_date = dto.start_date.unwrap_or(existing.start_date);
        let end_date = dto.end_date.unwrap_or(existing.end_date);
        let status = match dto.status {
            Some(s) => s.as_str().to_string(),
            None => existing.status,
        };
        let notes = if dto.notes.is_some() {
            dto.notes
        } else {
            existing.notes
        };

        if end_date <= start_date {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Contract end date must be after the start date"
            )));
        }

        let contract = sqlx::query_as::<_, Contract>(&format!(
            "UPDATE contracts
             SET contract_number = $1, academic_year = $2, total_amount = $3,
                 start_date = $4, end_date = $5, status = $6, notes = $7, updated_at = NOW()
             WHERE id = $8
             RETURNING {}",
            CONTRACT_COLUMNS
        ))
        .bind(&contract_number)
        .bind(academic_year)
        .bind(total_amount)
        .bind(start_date)
        .bind(end_date)
        .bind(&status)
        .bind(&notes)
        .bind(contract_id)
        .fetch_one(db)
        .await?;

        Ok(contract)
    }

    #[instrument(skip(db), fields(contract.id = %contract_id, db.table = "contracts"))]
    pub async fn delete_contract(db: &PgPool, contract_id: i32) -> Result<(), AppError> {
        let _ = Self::get_contract_by_id(db, contract_id).await?;

        let installment_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM installments WHERE contract_id = $1",
        )
        .bind(contract_id)
        .fetch_one(db)
        .await?;

        if installment_count > 0 {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Cannot delete contract: {} installments still reference it",
                installment_count
            )));
        }

        sqlx::query("DELETE FROM contracts WHERE id = $1")
            .bind(contract_id)
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

    pub(crate) async fn seed_student(pool: &PgPool) -> i32 {
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

        sqlx::query_scalar::<_, i32>(
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
        .unwrap()
    }

    fn contract_dto(number: &str, student_id: i32) -> CreateContractDto {
        CreateContractDto {
            contract_number: number.to_string(),
            student_id,
            academic_year: 2025,
            total_amount: Decimal::new(12_000_000, 0),
            start_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
            notes: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_contract(pool: PgPool) {
        let student_id = seed_student(&pool).await;

        let contract = ContractService::create_contract(&pool, contract_dto("CN-1", student_id))
            .await
            .unwrap();

        assert_eq!(contract.status, "ACTIVE");
        assert_eq!(contract.contract_number, "CN-1");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_duplicate_contract_number(pool: PgPool) {
        let student_id = seed_student(&pool).await;

        ContractService::create_contract(&pool, contract_dto("CN-1", student_id))
            .await
            .unwrap();

        let err = ContractService::create_contract(&pool, contract_dto("CN-1", student_id))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_missing_student_rejected(pool: PgPool) {
        let err = ContractService::create_contract(&pool, contract_dto("CN-1", 9999))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_terminal_status_transition_rejected(pool: PgPool) {
        let student_id = seed_student(&pool).await;
        let contract = ContractService::create_contract(&pool, contract_dto("CN-1", student_id))
            .await
            .unwrap();

        let dto = UpdateContractDto {
            contract_number: None,
            academic_year: None,
            total_amount: None,
            start_date: None,
            end_date: None,
            status: Some(ContractStatus::Completed),
            notes: None,
        };
        ContractService::update_contract(&pool, contract.id, dto)
            .await
            .unwrap();

        let dto = UpdateContractDto {
            contract_number: None,
            academic_year: None,
            total_amount: None,
            start_date: None,
            end_date: None,
            status: Some(ContractStatus::Active),
            notes: None,
        };
        let err = ContractService::update_contract(&pool, contract.id, dto)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_blocked_by_installments(pool: PgPool) {
        let student_id = seed_student(&pool).await;
        let contract = ContractService::create_contract(&pool, contract_dto("CN-1", student_id))
            .await
            .unwrap();

        sqlx::query(
            "INSERT INTO installments (contract_id, sequence_no, amount, due_date)
             VALUES ($1, 1, 1000, '2025-10-01')",
        )
        .bind(contract.id)
        .execute(&pool)
        .await
        .unwrap();

        let err = ContractService::delete_contract(&pool, contract.id)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }
}
