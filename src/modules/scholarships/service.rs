use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use crate::modules::scholarships::model::{
    CreateScholarshipDto, Scholarship, ScholarshipFilterParams, UpdateScholarshipDto,
};
use unibase_core::{AppError, validate_id};

const SCHOLARSHIP_COLUMNS: &str = "id, student_id, scholarship_type, percentage, academic_year, \
     monthly_amount, is_active, created_at, updated_at";

const SORTABLE_COLUMNS: &[&str] = &["id", "academic_year", "percentage", "created_at"];

pub struct ScholarshipService;

impl ScholarshipService {
    #[instrument(skip(db, dto), fields(student.id = %dto.student_id, db.table = "scholarships"))]
    pub async fn create_scholarship(
        db: &PgPool,
        dto: CreateScholarshipDto,
    ) -> Result<Scholarship, AppError> {
        let student_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM students WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(dto.student_id)
        .fetch_one(db)
        .await?;

        if !student_exists {
            return Err(AppError::not_found(anyhow::anyhow!("Student not found")));
        }

        let already_granted = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM scholarships WHERE student_id = $1 AND academic_year = $2)",
        )
        .bind(dto.student_id)
        .bind(dto.academic_year)
        .fetch_one(db)
        .await?;

        if already_granted {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Student already has a scholarship for this academic year"
            )));
        }

        let scholarship = sqlx::query_as::<_, Scholarship>(&format!(
            "INSERT INTO scholarships
                 (student_id, scholarship_type, percentage, academic_year, monthly_amount)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            SCHOLARSHIP_COLUMNS
        ))
        .bind(dto.student_id)
        .bind(dto.scholarship_type.as_str())
        .bind(dto.percentage)
        .bind(dto.academic_year)
        .bind(dto.monthly_amount.unwrap_or(Decimal::ZERO))
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow::anyhow!(
                    "Student already has a scholarship for this academic year"
                ));
            }
            AppError::from(e)
        })?;

        Ok(scholarship)
    }

    #[instrument(skip(db, filters), fields(db.table = "scholarships"))]
    pub async fn get_all_scholarships(
        db: &PgPool,
        filters: ScholarshipFilterParams,
    ) -> Result<Vec<Scholarship>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut query = format!("SELECT {} FROM scholarships WHERE 1=1", SCHOLARSHIP_COLUMNS);

        if let Some(student_id) = filters.student_id {
            query.push_str(&format!(" AND student_id = {}", student_id));
        }

        if let Some(scholarship_type) = filters.scholarship_type {
            query.push_str(&format!(
                " AND scholarship_type = '{}'",
                scholarship_type.as_str()
            ));
        }

        if let Some(academic_year) = filters.academic_year {
            query.push_str(&format!(" AND academic_year = {}", academic_year));
        }

        if let Some(is_active) = filters.is_active {
            query.push_str(&format!(" AND is_active = {}", is_active));
        }

        query.push_str(&filters.sort.order_clause(SORTABLE_COLUMNS, "created_at")?);
        query.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));

        let scholarships = sqlx::query_as::<_, Scholarship>(&query)
            .fetch_all(db)
            .await?;

        Ok(scholarships)
    }

    #[instrument(skip(db), fields(scholarship.id = %scholarship_id, db.table = "scholarships"))]
    pub async fn get_scholarship_by_id(
        db: &PgPool,
        scholarship_id: i32,
    ) -> Result<Scholarship, AppError> {
        validate_id(scholarship_id)?;

        let scholarship = sqlx::query_as::<_, Scholarship>(&format!(
            "SELECT {} FROM scholarships WHERE id = $1",
            SCHOLARSHIP_COLUMNS
        ))
        .bind(scholarship_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Scholarship not found")))?;

        Ok(scholarship)
    }

    #[instrument(skip(db, dto), fields(scholarship.id = %scholarship_id, db.table = "scholarships"))]
    pub async fn update_scholarship(
        db: &PgPool,
        scholarship_id: i32,
        dto: UpdateScholarshipDto,
    ) -> Result<Scholarship, AppError> {
        let existing = Self::get_scholarship_by_id(db, scholarship_id).await?;

        if let Some(academic_year) = dto.academic_year
            && academic_year != existing.academic_year
        {
            let already_granted = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM scholarships
                 WHERE student_id = $1 AND academic_year = $2 AND id <> $3)",
            )
            .bind(existing.student_id)
            .bind(academic_year)
            .bind(scholarship_id)
            .fetch_one(db)
            .await?;

            if already_granted {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "Student already has a scholarship for this academic year"
                )));
            }
        }

        let scholarship_type = match dto.scholarship_type {
            Some(t) => t.as_str().to_string(),
            None => existing.scholarship_type,
        };
        let percentage = dto.percentage.unwrap_or(existing.percentage);
        let academic_year = dto.academic_year.unwrap_or(existing.academic_year);
        let monthly_amount = dto.monthly_amount.unwrap_or(existing.monthly_amount);

        let scholarship = sqlx::query_as::<_, Scholarship>(&format!(
            "UPDATE scholarships
             SET scholarship_type = $1, percentage = $2, academic_year = $3,
                 monthly_amount = $4, updated_at = NOW()
             WHERE id = $5
             RETURNING {}",
            SCHOLARSHIP_COLUMNS
        ))
        .bind(&scholarship_type)
        .bind(percentage)
        .bind(academic_year)
        .bind(monthly_amount)
        .bind(scholarship_id)
        .fetch_one(db)
        .await?;

        Ok(scholarship)
    }

    #[instrument(skip(db), fields(scholarship.id = %scholarship_id, db.table = "scholarships"))]
    pub async fn delete_scholarship(db: &PgPool, scholarship_id: i32) -> Result<(), AppError> {
        validate_id(scholarship_id)?;

        let result = sqlx::query("DELETE FROM scholarships WHERE id = $1")
            .bind(scholarship_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Scholarship not found")));
        }

        Ok(())
    }

    #[instrument(skip(db), fields(scholarship.id = %scholarship_id, db.table = "scholarships"))]
    pub async fn toggle_status(
        db: &PgPool,
        scholarship_id: i32,
    ) -> Result<Scholarship, AppError> {
        validate_id(scholarship_id)?;

        let scholarship = sqlx::query_as::<_, Scholarship>(&format!(
            "UPDATE scholarships SET is_active = NOT is_active, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            SCHOLARSHIP_COLUMNS
        ))
        .bind(scholarship_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Scholarship not found")))?;

        Ok(scholarship)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    use crate::modules::scholarships::model::ScholarshipType;

    async fn seed_student(pool: &PgPool) -> i32 {
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

    fn dto(student_id: i32, year: i32) -> CreateScholarshipDto {
        CreateScholarshipDto {
            student_id,
            scholarship_type: ScholarshipType::Merit,
            percentage: 50,
            academic_year: year,
            monthly_amount: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_one_scholarship_per_year(pool: PgPool) {
        let student_id = seed_student(&pool).await;

        ScholarshipService::create_scholarship(&pool, dto(student_id, 2025))
            .await
            .unwrap();

        let err = ScholarshipService::create_scholarship(&pool, dto(student_id, 2025))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        // A different year is fine
        assert!(
            ScholarshipService::create_scholarship(&pool, dto(student_id, 2026))
                .await
                .is_ok()
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_missing_student_rejected(pool: PgPool) {
        let err = ScholarshipService::create_scholarship(&pool, dto(9999, 2025))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
