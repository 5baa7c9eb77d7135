use sqlx::PgPool;
use tracing::instrument;

use crate::modules::groups::model::{
    CreateGroupDto, Group, GroupFilterParams, GroupWithStats, UpdateGroupDto,
};
use unibase_core::{AppError, validate_id};

const GROUP_COLUMNS: &str = "id, name, course_year, faculty_id, is_active, created_at, updated_at";

const SORTABLE_COLUMNS: &[&str] = &["id", "name", "course_year", "created_at"];

pub struct GroupService;

impl GroupService {
    #[instrument(skip(db, dto))]
    pub async fn create_group(db: &PgPool, dto: CreateGroupDto) -> Result<Group, AppError> {
        let faculty_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM faculties WHERE id = $1)",
        )
        .bind(dto.faculty_id)
        .fetch_one(db)
        .await?;

        if !faculty_exists {
            return Err(AppError::not_found(anyhow::anyhow!("Faculty not found")));
        }

        let name_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM groups WHERE faculty_id = $1 AND name = $2)",
        )
        .bind(dto.faculty_id)
        .bind(&dto.name)
        .fetch_one(db)
        .await?;

        if name_taken {
            return Err(AppError::conflict(anyhow::anyhow!(
                "A group with this name already exists in this faculty"
            )));
        }

        let group = sqlx::query_as::<_, Group>(&format!(
            "INSERT INTO groups (name, course_year, faculty_id)
             VALUES ($1, $2, $3)
             RETURNING {}",
            GROUP_COLUMNS
        ))
        .bind(&dto.name)
        .bind(dto.course_year)
        .bind(dto.faculty_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow::anyhow!(
                    "A group with this name already exists in this faculty"
                ));
            }
            AppError::from(e)
        })?;

        Ok(group)
    }

    #[instrument(skip(db, filters))]
    pub async fn get_all_groups(
        db: &PgPool,
        filters: GroupFilterParams,
    ) -> Result<Vec<Group>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut query = format!("SELECT {} FROM groups WHERE 1=1", GROUP_COLUMNS);
        let mut params: Vec<String> = Vec::new();

        if let Some(search) = &filters.search {
            params.push(format!("%{}%", search));
            query.push_str(&format!(" AND name ILIKE ${}", params.len()));
        }

        if let Some(faculty_id) = filters.faculty_id {
            query.push_str(&format!(" AND faculty_id = {}", faculty_id));
        }

        if let Some(course_year) = filters.course_year {
            query.push_str(&format!(" AND course_year = {}", course_year));
        }

        if let Some(is_active) = filters.is_active {
            query.push_str(&format!(" AND is_active = {}", is_active));
        }

        query.push_str(&filters.sort.order_clause(SORTABLE_COLUMNS, "created_at")?);
        query.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));

        let mut sql = sqlx::query_as::<_, Group>(&query);
        for param in &params {
            sql = sql.bind(param);
        }
        let groups = sql.fetch_all(db).await?;

        Ok(groups)
    }

    #[instrument(skip(db))]
    pub async fn get_group_by_id(db: &PgPool, group_id: i32) -> Result<GroupWithStats, AppError> {
        validate_id(group_id)?;

        let group = sqlx::query_as::<_, GroupWithStats>(
            "SELECT g.id, g.name, g.course_year, g.faculty_id, f.name AS faculty_name,
                    COUNT(s.id) AS student_count,
                    g.is_active, g.created_at, g.updated_at
             FROM groups g
             INNER JOIN faculties f ON f.id = g.faculty_id
             LEFT JOIN students s ON s.group_id = g.id AND s.deleted_at IS NULL
             WHERE g.id = $1
             GROUP BY g.id, g.name, g.course_year, g.faculty_id, f.name,
                      g.is_active, g.created_at, g.updated_at",
        )
        .bind(group_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Group not found")))?;

        Ok(group)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_group(
        db: &PgPool,
        group_id: i32,
        dto: UpdateGroupDto,
    ) -> Result<Group, AppError> {
        let existing = Self::get_group_by_id(db, group_id).await?;

        if let Some(faculty_id) = dto.faculty_id
            && faculty_id != existing.faculty_id
        {
            let faculty_exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM faculties WHERE id = $1)",
            )
            .bind(faculty_id)
            .fetch_one(db)
            .await?;

            if !faculty_exists {
                return Err(AppError::not_found(anyhow::anyhow!("Faculty not found")));
            }
        }

        let name = dto.name.unwrap_or(existing.name);
        let course_year = dto.course_year.unwrap_or(existing.course_year);
        let faculty_id = dto.faculty_id.unwrap_or(existing.faculty_id);

        let name_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM groups WHERE faculty_id = $1 AND name = $2 AND id <> $3)",
        )
        .bind(faculty_id)
        .bind(&name)
        .bind(group_id)
        .fetch_one(db)
        .await?;

        if name_taken {
            return Err(AppError::conflict(anyhow::anyhow!(
                "A group with this name already exists in this faculty"
            )));
        }

        let group = sqlx::query_as::<_, Group>(&format!(
            "UPDATE groups
             SET name = $1, course_year = $2, faculty_id = $3, updated_at = NOW()
             WHERE id = $4
             RETURNING {}",
            GROUP_COLUMNS
        ))
        .bind(&name)
        .bind(course_year)
        .bind(faculty_id)
        .bind(group_id)
        .fetch_one(db)
        .await?;

        Ok(group)
    }

    #[instrument(skip(db))]
    pub async fn delete_group(db: &PgPool, group_id: i32) -> Result<(), AppError> {
        validate_id(group_id)?;

        let student_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM students WHERE group_id = $1 AND deleted_at IS NULL",
        )
        .bind(group_id)
        .fetch_one(db)
        .await?;

        if student_count > 0 {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Cannot delete group: {} students still reference it",
                student_count
            )));
        }

        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(group_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Group not found")));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn toggle_status(db: &PgPool, group_id: i32) -> Result<Group, AppError> {
        validate_id(group_id)?;

        let group = sqlx::query_as::<_, Group>(&format!(
            "UPDATE groups SET is_active = NOT is_active, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            GROUP_COLUMNS
        ))
        .bind(group_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Group not found")))?;

        Ok(group)
    }
}
