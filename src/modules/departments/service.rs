use sqlx::PgPool;
use tracing::instrument;

use crate::modules::departments::model::{
    CreateDepartmentDto, Department, DepartmentFilterParams, DepartmentWithFaculty,
    UpdateDepartmentDto,
};
use unibase_core::{AppError, validate_id};

const DEPARTMENT_COLUMNS: &str =
    "id, name, description, faculty_id, is_active, created_at, updated_at";

const SORTABLE_COLUMNS: &[&str] = &["id", "name", "created_at"];

async fn ensure_faculty_exists(db: &PgPool, faculty_id: i32) -> Result<(), AppError> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM faculties WHERE id = $1)")
        .bind(faculty_id)
        .fetch_one(db)
        .await?;

    if !exists {
        return Err(AppError::not_found(anyhow::anyhow!("Faculty not found")));
    }

    Ok(())
}

pub struct DepartmentService;

impl DepartmentService {
    #[instrument(skip(db, dto))]
    pub async fn create_department(
        db: &PgPool,
        dto: CreateDepartmentDto,
    ) -> Result<Department, AppError> {
        ensure_faculty_exists(db, dto.faculty_id).await?;

        let name_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM departments WHERE faculty_id = $1 AND name = $2)",
        )
        .bind(dto.faculty_id)
        .bind(&dto.name)
        .fetch_one(db)
        .await?;

        if name_taken {
            return Err(AppError::conflict(anyhow::anyhow!(
                "A department with this name already exists in this faculty"
            )));
        }

        let department = sqlx::query_as::<_, Department>(&format!(
            "INSERT INTO departments (name, description, faculty_id)
             VALUES ($1, $2, $3)
             RETURNING {}",
            DEPARTMENT_COLUMNS
        ))
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(dto.faculty_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow::anyhow!(
                    "A department with this name already exists in this faculty"
                ));
            }
            AppError::from(e)
        })?;

        Ok(department)
    }

    #[instrument(skip(db, filters))]
    pub async fn get_all_departments(
        db: &PgPool,
        filters: DepartmentFilterParams,
    ) -> Result<Vec<Department>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut query = format!("SELECT {} FROM departments WHERE 1=1", DEPARTMENT_COLUMNS);
        let mut params: Vec<String> = Vec::new();

        if let Some(search) = &filters.search {
            params.push(format!("%{}%", search));
            query.push_str(&format!(" AND name ILIKE ${}", params.len()));
        }

        if let Some(faculty_id) = filters.faculty_id {
            query.push_str(&format!(" AND faculty_id = {}", faculty_id));
        }

        if let Some(is_active) = filters.is_active {
            query.push_str(&format!(" AND is_active = {}", is_active));
        }

        query.push_str(&filters.sort.order_clause(SORTABLE_COLUMNS, "created_at")?);
        query.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));

        let mut sql = sqlx::query_as::<_, Department>(&query);
        for param in &params {
            sql = sql.bind(param);
        }
        let departments = sql.fetch_all(db).await?;

        Ok(departments)
    }

    #[instrument(skip(db))]
    pub async fn get_department_by_id(
        db: &PgPool,
        department_id: i32,
    ) -> Result<DepartmentWithFaculty, AppError> {
        validate_id(department_id)?;

        let department = sqlx::query_as::<_, DepartmentWithFaculty>(
            "SELECT d.id, d.name, d.description, d.faculty_id, f.name AS faculty_name,
                    d.is_active, d.created_at, d.updated_at
             FROM departments d
             INNER JOIN faculties f ON f.id = d.faculty_id
             WHERE d.id = $1",
        )
        .bind(department_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Department not found")))?;

        Ok(department)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_department(
        db: &PgPool,
        department_id: i32,
        dto: UpdateDepartmentDto,
    ) -> Result<Department, AppError> {
        let existing = Self::get_department_by_id(db, department_id).await?;

        if let Some(faculty_id) = dto.faculty_id
            && faculty_id != existing.faculty_id
        {
            ensure_faculty_exists(db, faculty_id).await?;
        }

        let name = dto.name.unwrap_or(existing.name);
        let faculty_id = dto.faculty_id.unwrap_or(existing.faculty_id);
        let description = if dto.description.is_some() {
            dto.description
        } else {
            existing.description
        };

        let name_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM departments WHERE faculty_id = $1 AND name = $2 AND id <> $3)",
        )
        .bind(faculty_id)
        .bind(&name)
        .bind(department_id)
        .fetch_one(db)
        .await?;

        if name_taken {
            return Err(AppError::conflict(anyhow::anyhow!(
                "A department with this name already exists in this faculty"
            )));
        }

        let department = sqlx::query_as::<_, Department>(&format!(
            "UPDATE departments
             SET name = $1, description = $2, faculty_id = $3, updated_at = NOW()
             WHERE id = $4
             RETURNING {}",
            DEPARTMENT_COLUMNS
        ))
        .bind(&name)
        .bind(&description)
        .bind(faculty_id)
        .bind(department_id)
        .fetch_one(db)
        .await?;

        Ok(department)
    }

    #[instrument(skip(db))]
    pub async fn delete_department(db: &PgPool, department_id: i32) -> Result<(), AppError> {
        validate_id(department_id)?;

        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(department_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Department not found")));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn toggle_status(db: &PgPool, department_id: i32) -> Result<Department, AppError> {
        validate_id(department_id)?;

        let department = sqlx::query_as::<_, Department>(&format!(
            "UPDATE departments SET is_active = NOT is_active, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            DEPARTMENT_COLUMNS
        ))
        .bind(department_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Department not found")))?;

        Ok(department)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    async fn create_test_faculty(pool: &PgPool, name: &str, code: &str) -> i32 {
        sqlx::query_scalar::<_, i32>(
            "INSERT INTO faculties (name, code) VALUES ($1, $2) RETURNING id",
        )
        .bind(name)
        .bind(code)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_department_missing_faculty(pool: PgPool) {
        let dto = CreateDepartmentDto {
            name: "Software Engineering".to_string(),
            description: None,
            faculty_id: 9999,
        };

        let err = DepartmentService::create_department(&pool, dto).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        // Nothing was written
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM departments")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_department_duplicate_in_faculty(pool: PgPool) {
        let faculty_id = create_test_faculty(&pool, "Engineering", "ENG").await;

        let dto = CreateDepartmentDto {
            name: "Software Engineering".to_string(),
            description: None,
            faculty_id,
        };
        DepartmentService::create_department(&pool, dto).await.unwrap();

        let dto = CreateDepartmentDto {
            name: "Software Engineering".to_string(),
            description: None,
            faculty_id,
        };
        let err = DepartmentService::create_department(&pool, dto).await.unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_same_name_different_faculties_allowed(pool: PgPool) {
        let eng = create_test_faculty(&pool, "Engineering", "ENG").await;
        let eco = create_test_faculty(&pool, "Economics", "ECO").await;

        for faculty_id in [eng, eco] {
            let dto = CreateDepartmentDto {
                name: "General Studies".to_string(),
                description: None,
                faculty_id,
            };
            DepartmentService::create_department(&pool, dto).await.unwrap();
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_detail_view_includes_faculty_name(pool: PgPool) {
        let faculty_id = create_test_faculty(&pool, "Engineering", "ENG").await;

        let dto = CreateDepartmentDto {
            name: "Software Engineering".to_string(),
            description: None,
            faculty_id,
        };
        let created = DepartmentService::create_department(&pool, dto).await.unwrap();

        let detail = DepartmentService::get_department_by_id(&pool, created.id)
            .await
            .unwrap();
        assert_eq!(detail.faculty_name, "Engineering");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_to_missing_faculty_rejected(pool: PgPool) {
        let faculty_id = create_test_faculty(&pool, "Engineering", "ENG").await;

        let dto = CreateDepartmentDto {
            name: "Software Engineering".to_string(),
            description: None,
            faculty_id,
        };
        let created = DepartmentService::create_department(&pool, dto).await.unwrap();

        let update = UpdateDepartmentDto {
            name: None,
            description: None,
            faculty_id: Some(9999),
        };

        let err = DepartmentService::update_department(&pool, created.id, update)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
