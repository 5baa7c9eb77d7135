use sqlx::PgPool;
use tracing::instrument;

use crate::modules::classrooms::model::{
    Classroom, ClassroomFilterParams, ClassroomType, CreateClassroomDto, UpdateClassroomDto,
};
use unibase_core::{AppError, validate_id};

const CLASSROOM_COLUMNS: &str =
    "id, name, building, floor, capacity, classroom_type, is_active, created_at, updated_at";

const SORTABLE_COLUMNS: &[&str] = &["id", "name", "building", "capacity", "created_at"];

pub struct ClassroomService;

impl ClassroomService {
    #[instrument(skip(db, dto))]
    pub async fn create_classroom(
        db: &PgPool,
        dto: CreateClassroomDto,
    ) -> Result<Classroom, AppError> {
        let name_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM classrooms WHERE building = $1 AND name = $2)",
        )
        .bind(&dto.building)
        .bind(&dto.name)
        .fetch_one(db)
        .await?;

        if name_taken {
            return Err(AppError::conflict(anyhow::anyhow!(
                "A classroom with this name already exists in this building"
            )));
        }

        let classroom_type = dto.classroom_type.unwrap_or(ClassroomType::Lecture);

        let classroom = sqlx::query_as::<_, Classroom>(&format!(
            "INSERT INTO classrooms (name, building, floor, capacity, classroom_type)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            CLASSROOM_COLUMNS
        ))
        .bind(&dto.name)
        .bind(&dto.building)
        .bind(dto.floor.unwrap_or(1))
        .bind(dto.capacity)
        .bind(classroom_type.as_str())
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow::anyhow!(
                    "A classroom with this name already exists in this building"
                ));
            }
            AppError::from(e)
        })?;

        Ok(classroom)
    }

    #[instrument(skip(db, filters))]
    pub async fn get_all_classrooms(
        db: &PgPool,
        filters: ClassroomFilterParams,
    ) -> Result<Vec<Classroom>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut query = format!("SELECT {} FROM classrooms WHERE 1=1", CLASSROOM_COLUMNS);
        let mut params: Vec<String> = Vec::new();

        if let Some(search) = &filters.search {
            params.push(format!("%{}%", search));
            query.push_str(&format!(
                " AND (name ILIKE ${0} OR building ILIKE ${0})",
                params.len()
            ));
        }

        if let Some(building) = &filters.building {
            params.push(building.clone());
            query.push_str(&format!(" AND building = ${}", params.len()));
        }

        if let Some(classroom_type) = filters.classroom_type {
            query.push_str(&format!(" AND classroom_type = '{}'", classroom_type.as_str()));
        }

        if let Some(min_capacity) = filters.min_capacity {
            query.push_str(&format!(" AND capacity >= {}", min_capacity));
        }

        if let Some(max_capacity) = filters.max_capacity {
            query.push_str(&format!(" AND capacity <= {}", max_capacity));
        }

        if let Some(is_active) = filters.is_active {
            query.push_str(&format!(" AND is_active = {}", is_active));
        }

        query.push_str(&filters.sort.order_clause(SORTABLE_COLUMNS, "created_at")?);
        query.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));

        let mut sql = sqlx::query_as::<_, Classroom>(&query);
        for param in &params {
            sql = sql.bind(param);
        }
        let classrooms = sql.fetch_all(db).await?;

        Ok(classrooms)
    }

    #[instrument(skip(db))]
    pub async fn get_classroom_by_id(db: &PgPool, classroom_id: i32) -> Result<Classroom, AppError> {
        validate_id(classroom_id)?;

        let classroom = sqlx::query_as::<_, Classroom>(&format!(
            "SELECT {} FROM classrooms WHERE id = $1",
            CLASSROOM_COLUMNS
        ))
        .bind(classroom_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Classroom not found")))?;

        Ok(classroom)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_classroom(
        db: &PgPool,
        classroom_id: i32,
        dto: UpdateClassroomDto,
    ) -> Result<Classroom, AppError> {
        let existing = Self::get_classroom_by_id(db, classroom_id).await?;

        let name = dto.name.unwrap_or(existing.name);
        let building = dto.building.unwrap_or(existing.building);
        let floor = dto.floor.unwrap_or(existing.floor);
        let capacity = dto.capacity.unwrap_or(existing.capacity);
        let classroom_type = match dto.classroom_type {
            Some(t) => t.as_str().to_string(),
            None => existing.classroom_type,
        };

        let name_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM classrooms WHERE building = $1 AND name = $2 AND id <> $3)",
        )
        .bind(&building)
        .bind(&name)
        .bind(classroom_id)
        .fetch_one(db)
        .await?;

        if name_taken {
            return Err(AppError::conflict(anyhow::anyhow!(
                "A classroom with this name already exists in this building"
            )));
        }

        let classroom = sqlx::query_as::<_, Classroom>(&format!(
            "UPDATE classrooms
             SET name = $1, building = $2, floor = $3, capacity = $4,
                 classroom_type = $5, updated_at = NOW()
             WHERE id = $6
             RETURNING {}",
            CLASSROOM_COLUMNS
        ))
        .bind(&name)
        .bind(&building)
        .bind(floor)
        .bind(capacity)
        .bind(&classroom_type)
        .bind(classroom_id)
        .fetch_one(db)
        .await?;

        Ok(classroom)
    }

    #[instrument(skip(db))]
    pub async fn delete_classroom(db: &PgPool, classroom_id: i32) -> Result<(), AppError> {
        validate_id(classroom_id)?;

        let result = sqlx::query("DELETE FROM classrooms WHERE id = $1")
            .bind(classroom_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Classroom not found")));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn toggle_status(db: &PgPool, classroom_id: i32) -> Result<Classroom, AppError> {
        validate_id(classroom_id)?;

        let classroom = sqlx::query_as::<_, Classroom>(&format!(
            "UPDATE classrooms SET is_active = NOT is_active, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            CLASSROOM_COLUMNS
        ))
        .bind(classroom_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Classroom not found")))?;

        Ok(classroom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use unibase_core::{PaginationParams, SortParams};

    fn create_dto(name: &str, building: &str, capacity: i32) -> CreateClassroomDto {
        CreateClassroomDto {
            name: name.to_string(),
            building: building.to_string(),
            floor: Some(2),
            capacity,
            classroom_type: Some(ClassroomType::Lab),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_and_fetch_classroom(pool: PgPool) {
        let classroom = ClassroomService::create_classroom(&pool, create_dto("101", "Main", 30))
            .await
            .unwrap();

        assert_eq!(classroom.classroom_type, "LAB");
        assert_eq!(classroom.floor, 2);

        let fetched = ClassroomService::get_classroom_by_id(&pool, classroom.id)
            .await
            .unwrap();
        assert_eq!(fetched.name, "101");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_duplicate_name_same_building_conflict(pool: PgPool) {
        ClassroomService::create_classroom(&pool, create_dto("101", "Main", 30))
            .await
            .unwrap();

        let err = ClassroomService::create_classroom(&pool, create_dto("101", "Main", 50))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        // Same number in another building is fine
        assert!(
            ClassroomService::create_classroom(&pool, create_dto("101", "Annex", 50))
                .await
                .is_ok()
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_capacity_range_filter(pool: PgPool) {
        ClassroomService::create_classroom(&pool, create_dto("101", "Main", 20))
            .await
            .unwrap();
        ClassroomService::create_classroom(&pool, create_dto("102", "Main", 80))
            .await
            .unwrap();
        ClassroomService::create_classroom(&pool, create_dto("103", "Main", 200))
            .await
            .unwrap();

        let filters = ClassroomFilterParams {
            search: None,
            building: None,
            classroom_type: None,
            min_capacity: Some(50),
            max_capacity: Some(100),
            is_active: None,
            pagination: PaginationParams::default(),
            sort: SortParams::default(),
        };

        let rooms = ClassroomService::get_all_classrooms(&pool, filters)
            .await
            .unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].name, "102");
    }
}
