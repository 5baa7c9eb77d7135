use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::modules::faculties::model::{
    CreateFacultyDto, Faculty, FacultyFilterParams, FacultyStats, UpdateFacultyDto,
};
use unibase_core::{AppError, validate_id};

const FACULTY_COLUMNS: &str = "id, name, code, description, is_active, created_at, updated_at";

const SORTABLE_COLUMNS: &[&str] = &["id", "name", "code", "created_at"];

/// Child relations that block faculty deletion, checked in order.
const DELETE_GUARDS: &[(&str, &str)] = &[
    ("departments", "SELECT COUNT(*) FROM departments WHERE faculty_id = $1"),
    ("groups", "SELECT COUNT(*) FROM groups WHERE faculty_id = $1"),
    (
        "students",
        "SELECT COUNT(*) FROM students WHERE faculty_id = $1 AND deleted_at IS NULL",
    ),
];

pub struct FacultyService;

impl FacultyService {
    #[instrument(skip(db, dto), fields(faculty.name = %dto.name, db.table = "faculties"))]
    pub async fn create_faculty(db: &PgPool, dto: CreateFacultyDto) -> Result<Faculty, AppError> {
        let name_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM faculties WHERE name = $1)",
        )
        .bind(&dto.name)
        .fetch_one(db)
        .await?;

        if name_taken {
            warn!(faculty.name = %dto.name, "Attempted to create faculty with existing name");
            return Err(AppError::conflict(anyhow::anyhow!(
                "Faculty name already exists"
            )));
        }

        let code_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM faculties WHERE code = $1)",
        )
        .bind(&dto.code)
        .fetch_one(db)
        .await?;

        if code_taken {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Faculty code already exists"
            )));
        }

        let faculty = sqlx::query_as::<_, Faculty>(&format!(
            "INSERT INTO faculties (name, code, description)
             VALUES ($1, $2, $3)
             RETURNING {}",
            FACULTY_COLUMNS
        ))
        .bind(&dto.name)
        .bind(&dto.code)
        .bind(&dto.description)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow::anyhow!("Faculty name already exists"));
            }
            AppError::from(e)
        })?;

        info!(faculty.id = %faculty.id, faculty.name = %faculty.name, "Faculty created");

        Ok(faculty)
    }

    #[instrument(skip(db, filters), fields(db.table = "faculties"))]
    pub async fn get_all_faculties(
        db: &PgPool,
        filters: FacultyFilterParams,
    ) -> Result<Vec<Faculty>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut query = format!("SELECT {} FROM faculties WHERE 1=1", FACULTY_COLUMNS);
        let mut params: Vec<String> = Vec::new();

        if let Some(search) = &filters.search {
            params.push(format!("%{}%", search));
            query.push_str(&format!(
                " AND (name ILIKE ${0} OR code ILIKE ${0})",
                params.len()
            ));
        }

        if let Some(is_active) = filters.is_active {
            query.push_str(&format!(" AND is_active = {}", is_active));
        }

        query.push_str(&filters.sort.order_clause(SORTABLE_COLUMNS, "created_at")?);
        query.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));

        let mut sql = sqlx::query_as::<_, Faculty>(&query);
        for param in &params {
            sql = sql.bind(param);
        }
        let faculties = sql.fetch_all(db).await?;

        Ok(faculties)
    }

    #[instrument(skip(db), fields(faculty.id = %faculty_id, db.table = "faculties"))]
    pub async fn get_faculty_by_id(db: &PgPool, faculty_id: i32) -> Result<Faculty, AppError> {
        validate_id(faculty_id)?;

        let faculty = sqlx::query_as::<_, Faculty>(&format!(
            "SELECT {} FROM faculties WHERE id = $1",
            FACULTY_COLUMNS
        ))
        .bind(faculty_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Faculty not found")))?;

        Ok(faculty)
    }

    #[instrument(skip(db, dto), fields(faculty.id = %faculty_id, db.table = "faculties"))]
    pub async fn update_faculty(
        db: &PgPool,
        faculty_id: i32,
        dto: UpdateFacultyDto,
    ) -> Result<Faculty, AppError> {
        let existing = Self::get_faculty_by_id(db, faculty_id).await?;

        if let Some(name) = &dto.name
            && name != &existing.name
        {
            let name_taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM faculties WHERE name = $1 AND id <> $2)",
            )
            .bind(name)
            .bind(faculty_id)
            .fetch_one(db)
            .await?;

            if name_taken {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "Faculty name already exists"
                )));
            }
        }

        if let Some(code) = &dto.code
            && code != &existing.code
        {
            let code_taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM faculties WHERE code = $1 AND id <> $2)",
            )
            .bind(code)
            .bind(faculty_id)
            .fetch_one(db)
            .await?;

            if code_taken {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "Faculty code already exists"
                )));
            }
        }

        let name = dto.name.unwrap_or(existing.name);
        let code = dto.code.unwrap_or(existing.code);
        let description = if dto.description.is_some() {
            dto.description
        } else {
            existing.description
        };

        let faculty = sqlx::query_as::<_, Faculty>(&format!(
            "UPDATE faculties
             SET name = $1, code = $2, description = $3, updated_at = NOW()
             WHERE id = $4
             RETURNING {}",
            FACULTY_COLUMNS
        ))
        .bind(&name)
        .bind(&code)
        .bind(&description)
        .bind(faculty_id)
        .fetch_one(db)
        .await?;

        Ok(faculty)
    }

    #[instrument(skip(db), fields(faculty.id = %faculty_id, db.table = "faculties"))]
    pub async fn delete_faculty(db: &PgPool, faculty_id: i32) -> Result<(), AppError> {
        let _ = Self::get_faculty_by_id(db, faculty_id).await?;

        for (relation, count_query) in DELETE_GUARDS {
            let dependents = sqlx::query_scalar::<_, i64>(count_query)
                .bind(faculty_id)
                .fetch_one(db)
                .await?;

            if dependents > 0 {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "Cannot delete faculty: {} {} still reference it",
                    dependents,
                    relation
                )));
            }
        }

        sqlx::query("DELETE FROM faculties WHERE id = $1")
            .bind(faculty_id)
            .execute(db)
            .await?;

        info!(faculty.id = %faculty_id, "Faculty deleted");

        Ok(())
    }

    #[instrument(skip(db), fields(faculty.id = %faculty_id, db.table = "faculties"))]
    pub async fn toggle_status(db: &PgPool, faculty_id: i32) -> Result<Faculty, AppError> {
        validate_id(faculty_id)?;

        let faculty = sqlx::query_as::<_, Faculty>(&format!(
            "UPDATE faculties SET is_active = NOT is_active, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            FACULTY_COLUMNS
        ))
        .bind(faculty_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Faculty not found")))?;

        Ok(faculty)
    }

    #[instrument(skip(db), fields(faculty.id = %faculty_id, db.table = "faculties"))]
    pub async fn get_faculty_stats(db: &PgPool, faculty_id: i32) -> Result<FacultyStats, AppError> {
        let faculty = Self::get_faculty_by_id(db, faculty_id).await?;

        let total_departments =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM departments WHERE faculty_id = $1")
                .bind(faculty_id)
                .fetch_one(db)
                .await?;

        let total_groups =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM groups WHERE faculty_id = $1")
                .bind(faculty_id)
                .fetch_one(db)
                .await?;

        let total_students = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM students WHERE faculty_id = $1 AND deleted_at IS NULL",
        )
        .bind(faculty_id)
        .fetch_one(db)
        .await?;

        Ok(FacultyStats {
            id: faculty.id,
            name: faculty.name,
            total_departments,
            total_groups,
            total_students,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use unibase_core::{PaginationParams, SortParams};

    fn create_dto(name: &str, code: &str) -> CreateFacultyDto {
        CreateFacultyDto {
            name: name.to_string(),
            code: code.to_string(),
            description: None,
        }
    }

    fn no_filters() -> FacultyFilterParams {
        FacultyFilterParams {
            search: None,
            is_active: None,
            pagination: PaginationParams::default(),
            sort: SortParams::default(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_faculty_success(pool: PgPool) {
        let faculty = FacultyService::create_faculty(&pool, create_dto("Engineering", "ENG"))
            .await
            .unwrap();

        assert_eq!(faculty.name, "Engineering");
        assert_eq!(faculty.code, "ENG");
        assert!(faculty.is_active);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_faculty_duplicate_name_conflict(pool: PgPool) {
        FacultyService::create_faculty(&pool, create_dto("Engineering", "ENG"))
            .await
            .unwrap();

        let result = FacultyService::create_faculty(&pool, create_dto("Engineering", "ENG2")).await;

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        // Only the first row committed
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM faculties")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_faculty_duplicate_code_conflict(pool: PgPool) {
        FacultyService::create_faculty(&pool, create_dto("Engineering", "ENG"))
            .await
            .unwrap();

        let result = FacultyService::create_faculty(&pool, create_dto("Economics", "ENG")).await;

        assert_eq!(result.unwrap_err().status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_search_is_case_insensitive(pool: PgPool) {
        FacultyService::create_faculty(&pool, create_dto("Engineering", "ENG"))
            .await
            .unwrap();
        FacultyService::create_faculty(&pool, create_dto("Economics", "ECO"))
            .await
            .unwrap();

        let filters = FacultyFilterParams {
            search: Some("engin".to_string()),
            ..no_filters()
        };

        let faculties = FacultyService::get_all_faculties(&pool, filters).await.unwrap();
        assert_eq!(faculties.len(), 1);
        assert_eq!(faculties[0].name, "Engineering");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_pagination_never_repeats_rows(pool: PgPool) {
        for i in 1..=5 {
            FacultyService::create_faculty(
                &pool,
                create_dto(&format!("Faculty {}", i), &format!("F{}", i)),
            )
            .await
            .unwrap();
        }

        let page = |n| FacultyFilterParams {
            pagination: PaginationParams {
                page: Some(n),
                limit: Some(2),
            },
            sort: SortParams {
                sort_by: Some("id".to_string()),
                sort_order: Some(unibase_core::SortOrder::Asc),
            },
            ..no_filters()
        };

        let first = FacultyService::get_all_faculties(&pool, page(1)).await.unwrap();
        let second = FacultyService::get_all_faculties(&pool, page(2)).await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        for row in &second {
            assert!(first.iter().all(|f| f.id != row.id));
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_unknown_sort_column_rejected(pool: PgPool) {
        let filters = FacultyFilterParams {
            sort: SortParams {
                sort_by: Some("password".to_string()),
                sort_order: None,
            },
            ..no_filters()
        };

        let err = FacultyService::get_all_faculties(&pool, filters)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_get_faculty_invalid_id(pool: PgPool) {
        let err = FacultyService::get_faculty_by_id(&pool, 0).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_get_faculty_not_found(pool: PgPool) {
        let err = FacultyService::get_faculty_by_id(&pool, 9999)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_rechecks_uniqueness(pool: PgPool) {
        FacultyService::create_faculty(&pool, create_dto("Engineering", "ENG"))
            .await
            .unwrap();
        let economics = FacultyService::create_faculty(&pool, create_dto("Economics", "ECO"))
            .await
            .unwrap();

        let dto = UpdateFacultyDto {
            name: Some("Engineering".to_string()),
            code: None,
            description: None,
        };

        let err = FacultyService::update_faculty(&pool, economics.id, dto)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_keeps_own_name(pool: PgPool) {
        let faculty = FacultyService::create_faculty(&pool, create_dto("Engineering", "ENG"))
            .await
            .unwrap();

        let dto = UpdateFacultyDto {
            name: Some("Engineering".to_string()),
            code: None,
            description: Some("Updated".to_string()),
        };

        let updated = FacultyService::update_faculty(&pool, faculty.id, dto)
            .await
            .unwrap();
        assert_eq!(updated.description, Some("Updated".to_string()));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_blocked_by_department(pool: PgPool) {
        let faculty = FacultyService::create_faculty(&pool, create_dto("Engineering", "ENG"))
            .await
            .unwrap();

        sqlx::query("INSERT INTO departments (name, faculty_id) VALUES ($1, $2)")
            .bind("Software Engineering")
            .bind(faculty.id)
            .execute(&pool)
            .await
            .unwrap();

        let err = FacultyService::delete_faculty(&pool, faculty.id)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        // Removing the dependent unblocks deletion
        sqlx::query("DELETE FROM departments WHERE faculty_id = $1")
            .bind(faculty.id)
            .execute(&pool)
            .await
            .unwrap();

        assert!(FacultyService::delete_faculty(&pool, faculty.id).await.is_ok());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_toggle_status(pool: PgPool) {
        let faculty = FacultyService::create_faculty(&pool, create_dto("Engineering", "ENG"))
            .await
            .unwrap();
        assert!(faculty.is_active);

        let toggled = FacultyService::toggle_status(&pool, faculty.id).await.unwrap();
        assert!(!toggled.is_active);

        let toggled = FacultyService::toggle_status(&pool, faculty.id).await.unwrap();
        assert!(toggled.is_active);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_faculty_stats_counts(pool: PgPool) {
        let faculty = FacultyService::create_faculty(&pool, create_dto("Engineering", "ENG"))
            .await
            .unwrap();

        sqlx::query("INSERT INTO departments (name, faculty_id) VALUES ('SE', $1), ('CS', $1)")
            .bind(faculty.id)
            .execute(&pool)
            .await
            .unwrap();

        let stats = FacultyService::get_faculty_stats(&pool, faculty.id)
            .await
            .unwrap();
        assert_eq!(stats.total_departments, 2);
        assert_eq!(stats.total_groups, 0);
        assert_eq!(stats.total_students, 0);
    }
}
