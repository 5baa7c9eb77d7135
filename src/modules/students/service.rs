use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};

use crate::modules::students::model::{
    CreateStudentDto, Student, StudentFilterParams, StudentWithRelations, UpdateStudentDto,
};
use unibase_core::{AppError, validate_id};

const STUDENT_COLUMNS: &str = "id, first_name, last_name, middle_name, passport_series, jshshir, \
     email, phone, birth_date, gender, group_id, faculty_id, dormitory_room_id, balance, \
     is_active, created_at, updated_at";

const SORTABLE_COLUMNS: &[&str] =
    &["id", "last_name", "first_name", "balance", "created_at"];

/// Relations that block removal; a student with financial history keeps a
/// tombstone either way, but rows in these tables must be resolved first.
const DELETE_GUARDS: &[(&str, &str)] = &[
    ("contracts", "SELECT COUNT(*) FROM contracts WHERE student_id = $1"),
    ("payments", "SELECT COUNT(*) FROM payments WHERE student_id = $1"),
    ("scholarships", "SELECT COUNT(*) FROM scholarships WHERE student_id = $1"),
];

async fn ensure_unique_among_live(
    db: &PgPool,
    column: &str,
    value: &str,
    exclude_id: Option<i32>,
) -> Result<(), AppError> {
    // `column` comes from call sites below, never from input
    let query = match exclude_id {
        Some(_) => format!(
            "SELECT EXISTS(SELECT 1 FROM students WHERE {} = $1 AND deleted_at IS NULL AND id <> $2)",
            column
        ),
        None => format!(
            "SELECT EXISTS(SELECT 1 FROM students WHERE {} = $1 AND deleted_at IS NULL)",
            column
        ),
    };

    let mut sql = sqlx::query_scalar::<_, bool>(&query).bind(value);
    if let Some(id) = exclude_id {
        sql = sql.bind(id);
    }

    if sql.fetch_one(db).await? {
        return Err(AppError::conflict(anyhow::anyhow!(
            "A student with this {} already exists",
            column
        )));
    }

    Ok(())
}

async fn ensure_group_exists(db: &PgPool, group_id: i32) -> Result<(), AppError> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM groups WHERE id = $1)")
        .bind(group_id)
        .fetch_one(db)
        .await?;

    if !exists {
        return Err(AppError::not_found(anyhow::anyhow!("Group not found")));
    }

    Ok(())
}

async fn ensure_faculty_exists(db: &PgPool, faculty_id: i32) -> Result<(), AppError> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM faculties WHERE id = $1)")
            .bind(faculty_id)
            .fetch_one(db)
            .await?;

    if !exists {
        return Err(AppError::not_found(anyhow::anyhow!("Faculty not found")));
    }

    Ok(())
}

pub struct StudentService;

impl StudentService {
    #[instrument(skip(db, dto), fields(student.jshshir = %dto.jshshir, db.table = "students"))]
    pub async fn create_student(
        db: &PgPool,
        dto: CreateStudentDto,
    ) -> Result<StudentWithRelations, AppError> {
        ensure_unique_among_live(db, "passport_series", &dto.passport_series, None).await?;
        ensure_unique_among_live(db, "jshshir", &dto.jshshir, None).await?;
        if let Some(email) = &dto.email {
            ensure_unique_among_live(db, "email", email, None).await?;
        }

        ensure_group_exists(db, dto.group_id).await?;
        ensure_faculty_exists(db, dto.faculty_id).await?;

        let student_id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO students
                 (first_name, last_name, middle_name, passport_series, jshshir,
                  email, phone, birth_date, gender, group_id, faculty_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING id",
        )
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.middle_name)
        .bind(&dto.passport_series)
        .bind(&dto.jshshir)
        .bind(&dto.email)
        .bind(&dto.phone)
        .bind(dto.birth_date)
        .bind(dto.gender.as_str())
        .bind(dto.group_id)
        .bind(dto.faculty_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                warn!("Unique index rejected concurrent duplicate student");
                return AppError::conflict(anyhow::anyhow!(
                    "A student with this passport or JSHSHIR already exists"
                ));
            }
            AppError::from(e)
        })?;

        info!(student.id = %student_id, "Student created");

        // Reload through the detail query so defaults and relations are
        // observed the same way a later GET would see them
        Self::get_student_by_id(db, student_id).await
    }

    #[instrument(skip(db, filters), fields(db.table = "students"))]
    pub async fn get_all_students(
        db: &PgPool,
        filters: StudentFilterParams,
    ) -> Result<Vec<Student>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut query = format!(
            "SELECT {} FROM students WHERE deleted_at IS NULL",
            STUDENT_COLUMNS
        );
        let mut params: Vec<String> = Vec::new();

        if let Some(search) = &filters.search {
            params.push(format!("%{}%", search));
            query.push_str(&format!(
                " AND (first_name ILIKE ${0} OR last_name ILIKE ${0} OR middle_name ILIKE ${0} \
                 OR passport_series ILIKE ${0} OR jshshir ILIKE ${0})",
                params.len()
            ));
        }

        if let Some(group_id) = filters.group_id {
            query.push_str(&format!(" AND group_id = {}", group_id));
        }

        if let Some(faculty_id) = filters.faculty_id {
            query.push_str(&format!(" AND faculty_id = {}", faculty_id));
        }

        if let Some(gender) = filters.gender {
            query.push_str(&format!(" AND gender = '{}'", gender.as_str()));
        }

        if let Some(is_active) = filters.is_active {
            query.push_str(&format!(" AND is_active = {}", is_active));
        }

        if let Some(min_balance) = filters.min_balance {
            query.push_str(&format!(" AND balance >= {}", min_balance));
        }

        if let Some(max_balance) = filters.max_balance {
            query.push_str(&format!(" AND balance <= {}", max_balance));
        }

        query.push_str(&filters.sort.order_clause(SORTABLE_COLUMNS, "created_at")?);
        query.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));

        debug!(limit = %limit, offset = %offset, "Fetching students");

        let mut sql = sqlx::query_as::<_, Student>(&query);
        for param in &params {
            sql = sql.bind(param);
        }
        let students = sql.fetch_all(db).await?;

        Ok(students)
    }

    #[instrument(skip(db), fields(student.id = %student_id, db.table = "students"))]
    pub async fn get_student_by_id(
        db: &PgPool,
        student_id: i32,
    ) -> Result<StudentWithRelations, AppError> {
        validate_id(student_id)?;

        let student = sqlx::query_as::<_, StudentWithRelations>(
            "SELECT s.id, s.first_name, s.last_name, s.middle_name, s.passport_series,
                    s.jshshir, s.email, s.phone, s.birth_date, s.gender,
                    s.group_id, g.name AS group_name,
                    s.faculty_id, f.name AS faculty_name,
                    s.dormitory_room_id, r.room_number AS dormitory_room_number,
                    s.balance, s.is_active, s.created_at, s.updated_at
             FROM students s
             INNER JOIN groups g ON g.id = s.group_id
             INNER JOIN faculties f ON f.id = s.faculty_id
             LEFT JOIN dormitory_rooms r ON r.id = s.dormitory_room_id
             WHERE s.id = $1 AND s.deleted_at IS NULL",
        )
        .bind(student_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))?;

        Ok(student)
    }

    #[instrument(skip(db, dto), fields(student.id = %student_id, db.table = "students"))]
    pub async fn update_student(
        db: &PgPool,
        student_id: i32,
        dto: UpdateStudentDto,
    ) -> Result<StudentWithRelations, AppError> {
        let existing = Self::get_student_by_id(db, student_id).await?;

        if let Some(passport) = &dto.passport_series
            && passport != &existing.passport_series
        {
            ensure_unique_among_live(db, "passport_series", passport, Some(student_id)).await?;
        }

        if let Some(jshshir) = &dto.jshshir
            && jshshir != &existing.jshshir
        {
            ensure_unique_among_live(db, "jshshir", jshshir, Some(student_id)).await?;
        }

        if let Some(email) = &dto.email
            && Some(email) != existing.email.as_ref()
        {
            ensure_unique_among_live(db, "email", email, Some(student_id)).await?;
        }

        if let Some(group_id) = dto.group_id
            && group_id != existing.group_id
        {
            ensure_group_exists(db, group_id).await?;
        }

        if let Some(faculty_id) = dto.faculty_id
            && faculty_id != existing.faculty_id
        {
            ensure_faculty_exists(db, faculty_id).await?;
        }

        let first_name = dto.first_name.unwrap_or(existing.first_name);
        let last_name = dto.last_name.unwrap_or(existing.last_name);
        let middle_name = if dto.middle_name.is_some() {
            dto.middle_name
        } else {
            existing.middle_name
        };
        let passport_series = dto.passport_series.unwrap_or(existing.passport_series);
        let jshshir = dto.jshshir.unwrap_or(existing.jshshir);
        let email = if dto.email.is_some() {
            dto.email
        } else {
            existing.email
        };
        let phone = if dto.phone.is_some() {
            dto.phone
        } else {
            existing.phone
        };
        let birth_date = dto.birth_date.unwrap_or(existing.birth_date);
        let gender = match dto.gender {
            Some(g) => g.as_str().to_string(),
            None => existing.gender,
        };
        let group_id = dto.group_id.unwrap_or(existing.group_id);
        let faculty_id = dto.faculty_id.unwrap_or(existing.faculty_id);

        sqlx::query(
            "UPDATE students
             SET first_name = $1, last_name = $2, middle_name = $3, passport_series = $4,
                 jshshir = $5, email = $6, phone = $7, birth_date = $8, gender = $9,
                 group_id = $10, faculty_id = $11, updated_at = NOW()
             WHERE id = $12 AND deleted_at IS NULL",
        )
        .bind(&first_name)
        .bind(&last_name)
        .bind(&middle_name)
        .bind(&passport_series)
        .bind(&jshshir)
        .bind(&email)
        .bind(&phone)
        .bind(birth_date)
        .bind(&gender)
        .bind(group_id)
        .bind(faculty_id)
        .bind(student_id)
        .execute(db)
        .await?;

        Self::get_student_by_id(db, student_id).await
    }

    /// Soft delete: the row stays for audit purposes with a tombstone
    /// timestamp, and any dormitory bed is released.
    #[instrument(skip(db), fields(student.id = %student_id, db.table = "students"))]
    pub async fn remove_student(db: &PgPool, student_id: i32) -> Result<(), AppError> {
        let existing = Self::get_student_by_id(db, student_id).await?;

        for (relation, count_query) in DELETE_GUARDS {
            let dependents = sqlx::query_scalar::<_, i64>(count_query)
                .bind(student_id)
                .fetch_one(db)
                .await?;

            if dependents > 0 {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "Cannot delete student: {} {} still reference them",
                    dependents,
                    relation
                )));
            }
        }

        let mut tx = db.begin().await?;

        sqlx::query(
            "UPDATE students
             SET deleted_at = NOW(), dormitory_room_id = NULL, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(student_id)
        .execute(&mut *tx)
        .await?;

        if let Some(room_id) = existing.dormitory_room_id {
            sqlx::query(
                "UPDATE dormitory_rooms SET is_available = TRUE, updated_at = NOW() WHERE id = $1",
            )
            .bind(room_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(student.id = %student_id, "Student soft-deleted");

        Ok(())
    }

    #[instrument(skip(db), fields(student.id = %student_id, db.table = "students"))]
    pub async fn toggle_status(db: &PgPool, student_id: i32) -> Result<Student, AppError> {
        validate_id(student_id)?;

        let student = sqlx::query_as::<_, Student>(&format!(
            "UPDATE students SET is_active = NOT is_active, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {}",
            STUDENT_COLUMNS
        ))
        .bind(student_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))?;

        Ok(student)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::NaiveDate;

    use crate::modules::students::model::Gender;

    pub(crate) async fn seed_group_and_faculty(pool: &PgPool) -> (i32, i32) {
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

        (group_id, faculty_id)
    }

    pub(crate) fn student_dto(
        passport: &str,
        jshshir: &str,
        group_id: i32,
        faculty_id: i32,
    ) -> CreateStudentDto {
        CreateStudentDto {
            first_name: "Aziz".to_string(),
            last_name: "Karimov".to_string(),
            middle_name: None,
            passport_series: passport.to_string(),
            jshshir: jshshir.to_string(),
            email: None,
            phone: None,
            birth_date: NaiveDate::from_ymd_opt(2004, 5, 14).unwrap(),
            gender: Gender::Male,
            group_id,
            faculty_id,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_student_with_relations(pool: PgPool) {
        let (group_id, faculty_id) = seed_group_and_faculty(&pool).await;

        let student = StudentService::create_student(
            &pool,
            student_dto("AB1234567", "12345678901234", group_id, faculty_id),
        )
        .await
        .unwrap();

        assert_eq!(student.group_name, "SE-101");
        assert_eq!(student.faculty_name, "Engineering");
        assert_eq!(student.balance, rust_decimal::Decimal::ZERO);
        assert!(student.is_active);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_duplicate_jshshir_conflict(pool: PgPool) {
        let (group_id, faculty_id) = seed_group_and_faculty(&pool).await;

        StudentService::create_student(
            &pool,
            student_dto("AB1234567", "12345678901234", group_id, faculty_id),
        )
        .await
        .unwrap();

        let err = StudentService::create_student(
            &pool,
            student_dto("CD7654321", "12345678901234", group_id, faculty_id),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_missing_group_fails_before_write(pool: PgPool) {
        let (_, faculty_id) = seed_group_and_faculty(&pool).await;

        let err = StudentService::create_student(
            &pool,
            student_dto("AB1234567", "12345678901234", 9999, faculty_id),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_soft_delete_hides_student(pool: PgPool) {
        let (group_id, faculty_id) = seed_group_and_faculty(&pool).await;

        let student = StudentService::create_student(
            &pool,
            student_dto("AB1234567", "12345678901234", group_id, faculty_id),
        )
        .await
        .unwrap();

        StudentService::remove_student(&pool, student.id).await.unwrap();

        let err = StudentService::get_student_by_id(&pool, student.id)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        // Row is still physically present
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM students WHERE deleted_at IS NOT NULL",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_tombstoned_passport_can_be_reused(pool: PgPool) {
        let (group_id, faculty_id) = seed_group_and_faculty(&pool).await;

        let student = StudentService::create_student(
            &pool,
            student_dto("AB1234567", "12345678901234", group_id, faculty_id),
        )
        .await
        .unwrap();

        StudentService::remove_student(&pool, student.id).await.unwrap();

        // Uniqueness only applies to the live row set
        assert!(
            StudentService::create_student(
                &pool,
                student_dto("AB1234567", "12345678901234", group_id, faculty_id),
            )
            .await
            .is_ok()
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_blocked_by_contract(pool: PgPool) {
        let (group_id, faculty_id) = seed_group_and_faculty(&pool).await;

        let student = StudentService::create_student(
            &pool,
            student_dto("AB1234567", "12345678901234", group_id, faculty_id),
        )
        .await
        .unwrap();

        sqlx::query(
            "INSERT INTO contracts (contract_number, student_id, academic_year, total_amount,
                                    start_date, end_date)
             VALUES ('CN-1', $1, 2025, 1000, '2025-09-01', '2026-06-30')",
        )
        .bind(student.id)
        .execute(&pool)
        .await
        .unwrap();

        let err = StudentService::remove_student(&pool, student.id)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_rechecks_uniqueness(pool: PgPool) {
        let (group_id, faculty_id) = seed_group_and_faculty(&pool).await;

        StudentService::create_student(
            &pool,
            student_dto("AB1234567", "12345678901234", group_id, faculty_id),
        )
        .await
        .unwrap();

        let second = StudentService::create_student(
            &pool,
            student_dto("CD7654321", "98765432109876", group_id, faculty_id),
        )
        .await
        .unwrap();

        let dto = UpdateStudentDto {
            first_name: None,
            last_name: None,
            middle_name: None,
            passport_series: Some("AB1234567".to_string()),
            jshshir: None,
            email: None,
            phone: None,
            birth_date: None,
            gender: None,
            group_id: None,
            faculty_id: None,
        };

        let err = StudentService::update_student(&pool, second.id, dto)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }
}
