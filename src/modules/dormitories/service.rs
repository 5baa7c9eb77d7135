use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::modules::dormitories::model::{
    CreateDormitoryDto, CreateRoomDto, Dormitory, DormitoryFilterParams, DormitoryStats,
    RoomFilterParams, RoomWithOccupancy, UpdateDormitoryDto, UpdateRoomDto,
};
use unibase_core::{AppError, validate_id};

const DORMITORY_COLUMNS: &str =
    "id, name, address, description, is_active, created_at, updated_at";

const DORMITORY_SORTABLE: &[&str] = &["id", "name", "created_at"];

const ROOM_SORTABLE: &[&str] = &["id", "room_number", "floor", "beds_count", "created_at"];

/// Room columns plus derived occupancy, aliased `r` against live students.
const ROOM_OCCUPANCY_SELECT: &str =
    "SELECT r.id, r.dormitory_id, r.room_number, r.floor, r.beds_count, r.monthly_fee,
            r.is_available,
            COUNT(s.id) AS occupied_beds,
            r.beds_count - COUNT(s.id) AS free_beds,
            r.created_at, r.updated_at
     FROM dormitory_rooms r
     LEFT JOIN students s ON s.dormitory_room_id = r.id AND s.deleted_at IS NULL";

const ROOM_OCCUPANCY_GROUP_BY: &str =
    " GROUP BY r.id, r.dormitory_id, r.room_number, r.floor, r.beds_count, r.monthly_fee,
              r.is_available, r.created_at, r.updated_at";

pub struct DormitoryService;

impl DormitoryService {
    #[instrument(skip(db, dto), fields(dormitory.name = %dto.name, db.table = "dormitories"))]
    pub async fn create_dormitory(
        db: &PgPool,
        dto: CreateDormitoryDto,
    ) -> Result<Dormitory, AppError> {
        let name_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM dormitories WHERE name = $1)",
        )
        .bind(&dto.name)
        .fetch_one(db)
        .await?;

        if name_taken {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Dormitory name already exists"
            )));
        }

        let dormitory = sqlx::query_as::<_, Dormitory>(&format!(
            "INSERT INTO dormitories (name, address, description)
             VALUES ($1, $2, $3)
             RETURNING {}",
            DORMITORY_COLUMNS
        ))
        .bind(&dto.name)
        .bind(&dto.address)
        .bind(&dto.description)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow::anyhow!("Dormitory name already exists"));
            }
            AppError::from(e)
        })?;

        info!(dormitory.id = %dormitory.id, "Dormitory created");

        Ok(dormitory)
    }

    #[instrument(skip(db, filters), fields(db.table = "dormitories"))]
    pub async fn get_all_dormitories(
        db: &PgPool,
        filters: DormitoryFilterParams,
    ) -> Result<Vec<Dormitory>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut query = format!("SELECT {} FROM dormitories WHERE 1=1", DORMITORY_COLUMNS);
        let mut params: Vec<String> = Vec::new();

        if let Some(search) = &filters.search {
            params.push(format!("%{}%", search));
            query.push_str(&format!(
                " AND (name ILIKE ${0} OR address ILIKE ${0})",
                params.len()
            ));
        }

        if let Some(is_active) = filters.is_active {
            query.push_str(&format!(" AND is_active = {}", is_active));
        }

        query.push_str(&filters.sort.order_clause(DORMITORY_SORTABLE, "created_at")?);
        query.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));

        let mut sql = sqlx::query_as::<_, Dormitory>(&query);
        for param in &params {
            sql = sql.bind(param);
        }
        let dormitories = sql.fetch_all(db).await?;

        Ok(dormitories)
    }

    #[instrument(skip(db), fields(dormitory.id = %dormitory_id, db.table = "dormitories"))]
    pub async fn get_dormitory_by_id(
        db: &PgPool,
        dormitory_id: i32,
    ) -> Result<Dormitory, AppError> {
        validate_id(dormitory_id)?;

        let dormitory = sqlx::query_as::<_, Dormitory>(&format!(
            "SELECT {} FROM dormitories WHERE id = $1",
            DORMITORY_COLUMNS
        ))
        .bind(dormitory_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Dormitory not found")))?;

        Ok(dormitory)
    }

    #[instrument(skip(db, dto), fields(dormitory.id = %dormitory_id, db.table = "dormitories"))]
    pub async fn update_dormitory(
        db: &PgPool,
        dormitory_id: i32,
        dto: UpdateDormitoryDto,
    ) -> Result<Dormitory, AppError> {
        let existing = Self::get_dormitory_by_id(db, dormitory_id).await?;

        if let Some(name) = &dto.name
            && name != &existing.name
        {
            let name_taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM dormitories WHERE name = $1 AND id <> $2)",
            )
            .bind(name)
            .bind(dormitory_id)
            .fetch_one(db)
            .await?;

            if name_taken {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "Dormitory name already exists"
                )));
            }
        }

        let name = dto.name.unwrap_or(existing.name);
        let address = dto.address.unwrap_or(existing.address);
        let description = if dto.description.is_some() {
            dto.description
        } else {
            existing.description
        };

        let dormitory = sqlx::query_as::<_, Dormitory>(&format!(
            "UPDATE dormitories
             SET name = $1, address = $2, description = $3, updated_at = NOW()
             WHERE id = $4
             RETURNING {}",
            DORMITORY_COLUMNS
        ))
        .bind(&name)
        .bind(&address)
        .bind(&description)
        .bind(dormitory_id)
        .fetch_one(db)
        .await?;

        Ok(dormitory)
    }

    #[instrument(skip(db), fields(dormitory.id = %dormitory_id, db.table = "dormitories"))]
    pub async fn delete_dormitory(db: &PgPool, dormitory_id: i32) -> Result<(), AppError> {
        let _ = Self::get_dormitory_by_id(db, dormitory_id).await?;

        let room_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM dormitory_rooms WHERE dormitory_id = $1",
        )
        .bind(dormitory_id)
        .fetch_one(db)
        .await?;

        if room_count > 0 {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Cannot delete dormitory: {} rooms still reference it",
                room_count
            )));
        }

        sqlx::query("DELETE FROM dormitories WHERE id = $1")
            .bind(dormitory_id)
            .execute(db)
            .await?;

        Ok(())
    }

    #[instrument(skip(db), fields(dormitory.id = %dormitory_id, db.table = "dormitories"))]
    pub async fn toggle_status(db: &PgPool, dormitory_id: i32) -> Result<Dormitory, AppError> {
        validate_id(dormitory_id)?;

        let dormitory = sqlx::query_as::<_, Dormitory>(&format!(
            "UPDATE dormitories SET is_active = NOT is_active, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            DORMITORY_COLUMNS
        ))
        .bind(dormitory_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Dormitory not found")))?;

        Ok(dormitory)
    }

    #[instrument(skip(db), fields(dormitory.id = %dormitory_id, db.table = "dormitories"))]
    pub async fn get_dormitory_stats(
        db: &PgPool,
        dormitory_id: i32,
    ) -> Result<DormitoryStats, AppError> {
        let dormitory = Self::get_dormitory_by_id(db, dormitory_id).await?;

        let (total_rooms, total_beds) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COALESCE(SUM(beds_count), 0)::BIGINT
             FROM dormitory_rooms WHERE dormitory_id = $1",
        )
        .bind(dormitory_id)
        .fetch_one(db)
        .await?;

        let occupied_beds = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM students s
             INNER JOIN dormitory_rooms r ON r.id = s.dormitory_room_id
             WHERE r.dormitory_id = $1 AND s.deleted_at IS NULL",
        )
        .bind(dormitory_id)
        .fetch_one(db)
        .await?;

        let occupancy_rate = if total_beds > 0 {
            occupied_beds as f64 / total_beds as f64
        } else {
            0.0
        };

        Ok(DormitoryStats {
            id: dormitory.id,
            name: dormitory.name,
            total_rooms,
            total_beds,
            occupied_beds,
            occupancy_rate,
        })
    }

    #[instrument(skip(db, dto), fields(dormitory.id = %dormitory_id, db.table = "dormitory_rooms"))]
    pub async fn create_room(
        db: &PgPool,
        dormitory_id: i32,
        dto: CreateRoomDto,
    ) -> Result<RoomWithOccupancy, AppError> {
        let _ = Self::get_dormitory_by_id(db, dormitory_id).await?;

        let number_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM dormitory_rooms WHERE dormitory_id = $1 AND room_number = $2)",
        )
        .bind(dormitory_id)
        .bind(&dto.room_number)
        .fetch_one(db)
        .await?;

        if number_taken {
            return Err(AppError::conflict(anyhow::anyhow!(
                "A room with this number already exists in this dormitory"
            )));
        }

        let room_id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO dormitory_rooms (dormitory_id, room_number, floor, beds_count, monthly_fee)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(dormitory_id)
        .bind(&dto.room_number)
        .bind(dto.floor.unwrap_or(1))
        .bind(dto.beds_count)
        .bind(dto.monthly_fee.unwrap_or_default())
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow::anyhow!(
                    "A room with this number already exists in this dormitory"
                ));
            }
            AppError::from(e)
        })?;

        Self::get_room_by_id(db, room_id).await
    }

    #[instrument(skip(db, filters), fields(dormitory.id = %dormitory_id, db.table = "dormitory_rooms"))]
    pub async fn get_rooms(
        db: &PgPool,
        dormitory_id: i32,
        filters: RoomFilterParams,
    ) -> Result<Vec<RoomWithOccupancy>, AppError> {
        let _ = Self::get_dormitory_by_id(db, dormitory_id).await?;

        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut query = format!("{} WHERE r.dormitory_id = $1", ROOM_OCCUPANCY_SELECT);

        if let Some(floor) = filters.floor {
            query.push_str(&format!(" AND r.floor = {}", floor));
        }

        if let Some(is_available) = filters.is_available {
            query.push_str(&format!(" AND r.is_available = {}", is_available));
        }

        query.push_str(ROOM_OCCUPANCY_GROUP_BY);

        let order = filters.sort.order_clause(ROOM_SORTABLE, "room_number")?;
        // qualify the sort column against the rooms alias
        query.push_str(&order.replace("ORDER BY ", "ORDER BY r."));
        query.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));

        let rooms = sqlx::query_as::<_, RoomWithOccupancy>(&query)
            .bind(dormitory_id)
            .fetch_all(db)
            .await?;

        Ok(rooms)
    }

    #[instrument(skip(db), fields(room.id = %room_id, db.table = "dormitory_rooms"))]
    pub async fn get_room_by_id(db: &PgPool, room_id: i32) -> Result<RoomWithOccupancy, AppError> {
        validate_id(room_id)?;

        let room = sqlx::query_as::<_, RoomWithOccupancy>(&format!(
            "{} WHERE r.id = $1 {}",
            ROOM_OCCUPANCY_SELECT, ROOM_OCCUPANCY_GROUP_BY
        ))
        .bind(room_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Room not found")))?;

        Ok(room)
    }

    #[instrument(skip(db, dto), fields(room.id = %room_id, db.table = "dormitory_rooms"))]
    pub async fn update_room(
        db: &PgPool,
        room_id: i32,
        dto: UpdateRoomDto,
    ) -> Result<RoomWithOccupancy, AppError> {
        let existing = Self::get_room_by_id(db, room_id).await?;

        if let Some(room_number) = &dto.room_number
            && room_number != &existing.room_number
        {
            let number_taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM dormitory_rooms
                 WHERE dormitory_id = $1 AND room_number = $2 AND id <> $3)",
            )
            .bind(existing.dormitory_id)
            .bind(room_number)
            .bind(room_id)
            .fetch_one(db)
            .await?;

            if number_taken {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "A room with this number already exists in this dormitory"
                )));
            }
        }

        let beds_count = dto.beds_count.unwrap_or(existing.beds_count);

        // Beds cannot shrink below the current occupancy
        if (beds_count as i64) < existing.occupied_beds {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Cannot reduce beds below current occupancy ({} students)",
                existing.occupied_beds
            )));
        }

        let room_number = dto.room_number.unwrap_or(existing.room_number);
        let floor = dto.floor.unwrap_or(existing.floor);
        let monthly_fee = dto.monthly_fee.unwrap_or(existing.monthly_fee);
        let is_available = existing.occupied_beds < beds_count as i64;

        sqlx::query(
            "UPDATE dormitory_rooms
             SET room_number = $1, floor = $2, beds_count = $3, monthly_fee = $4,
                 is_available = $5, updated_at = NOW()
             WHERE id = $6",
        )
        .bind(&room_number)
        .bind(floor)
        .bind(beds_count)
        .bind(monthly_fee)
        .bind(is_available)
        .bind(room_id)
        .execute(db)
        .await?;

        Self::get_room_by_id(db, room_id).await
    }

    #[instrument(skip(db), fields(room.id = %room_id, db.table = "dormitory_rooms"))]
    pub async fn delete_room(db: &PgPool, room_id: i32) -> Result<(), AppError> {
        let existing = Self::get_room_by_id(db, room_id).await?;

        if existing.occupied_beds > 0 {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Cannot delete room: {} students still live in it",
                existing.occupied_beds
            )));
        }

        sqlx::query("DELETE FROM dormitory_rooms WHERE id = $1")
            .bind(room_id)
            .execute(db)
            .await?;

        Ok(())
    }

    /// Assign a student to a room.
    ///
    /// Runs in a transaction with the room row locked: two concurrent
    /// assignments to the last bed serialize, and the loser sees a full room.
    #[instrument(skip(db), fields(room.id = %room_id, student.id = %student_id))]
    pub async fn assign_student(
        db: &PgPool,
        room_id: i32,
        student_id: i32,
    ) -> Result<RoomWithOccupancy, AppError> {
        validate_id(room_id)?;
        validate_id(student_id)?;

        let mut tx = db.begin().await?;

        let room = sqlx::query_as::<_, (i32, bool)>(
            "SELECT beds_count, is_available FROM dormitory_rooms WHERE id = $1 FOR UPDATE",
        )
        .bind(room_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Room not found")))?;

        let (beds_count, is_available) = room;

        if !is_available {
            return Err(AppError::conflict(anyhow::anyhow!("Room is not available")));
        }

        let occupied = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM students WHERE dormitory_room_id = $1 AND deleted_at IS NULL",
        )
        .bind(room_id)
        .fetch_one(&mut *tx)
        .await?;

        if occupied >= beds_count as i64 {
            warn!(room.id = %room_id, "Assignment attempted on full room");
            return Err(AppError::conflict(anyhow::anyhow!("Room has no free beds")));
        }

        let current_room = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT dormitory_room_id FROM students
             WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(student_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))?;

        if current_room.is_some() {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Student already has a room assignment"
            )));
        }

        sqlx::query(
            "UPDATE students SET dormitory_room_id = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(room_id)
        .bind(student_id)
        .execute(&mut *tx)
        .await?;

        // The room closes exactly when the last bed fills
        if occupied + 1 == beds_count as i64 {
            sqlx::query(
                "UPDATE dormitory_rooms SET is_available = FALSE, updated_at = NOW() WHERE id = $1",
            )
            .bind(room_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(room.id = %room_id, student.id = %student_id, "Student assigned to room");

        Self::get_room_by_id(db, room_id).await
    }

    /// Remove a student from a room, re-opening it if beds free up.
    #[instrument(skip(db), fields(room.id = %room_id, student.id = %student_id))]
    pub async fn unassign_student(
        db: &PgPool,
        room_id: i32,
        student_id: i32,
    ) -> Result<RoomWithOccupancy, AppError> {
        validate_id(room_id)?;
        validate_id(student_id)?;

        let mut tx = db.begin().await?;

        sqlx::query_scalar::<_, i32>("SELECT id FROM dormitory_rooms WHERE id = $1 FOR UPDATE")
            .bind(room_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Room not found")))?;

        let result = sqlx::query(
            "UPDATE students SET dormitory_room_id = NULL, updated_at = NOW()
             WHERE id = $1 AND dormitory_room_id = $2 AND deleted_at IS NULL",
        )
        .bind(student_id)
        .bind(room_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!(
                "Student is not assigned to this room"
            )));
        }

        sqlx::query(
            "UPDATE dormitory_rooms SET is_available = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(room_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Self::get_room_by_id(db, room_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::NaiveDate;

    async fn seed_students(pool: &PgPool, count: i32) -> Vec<i32> {
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

        let mut ids = Vec::new();
        for i in 0..count {
            let id = sqlx::query_scalar::<_, i32>(
                "INSERT INTO students
                     (first_name, last_name, passport_series, jshshir, birth_date, gender,
                      group_id, faculty_id)
                 VALUES ('Test', 'Student', $1, $2, $3, 'MALE', $4, $5)
                 RETURNING id",
            )
            .bind(format!("AA00000{:02}", i))
            .bind(format!("100000000000{:02}", i))
            .bind(NaiveDate::from_ymd_opt(2004, 1, 1).unwrap())
            .bind(group_id)
            .bind(faculty_id)
            .fetch_one(pool)
            .await
            .unwrap();
            ids.push(id);
        }
        ids
    }

    async fn seed_room(pool: &PgPool, beds: i32) -> i32 {
        let dormitory = DormitoryService::create_dormitory(
            pool,
            CreateDormitoryDto {
                name: "Dormitory A".to_string(),
                address: "Campus 1".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();

        let room = DormitoryService::create_room(
            pool,
            dormitory.id,
            CreateRoomDto {
                room_number: "101".to_string(),
                floor: Some(1),
                beds_count: beds,
                monthly_fee: None,
            },
        )
        .await
        .unwrap();

        room.id
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_room_fills_and_closes_on_last_bed(pool: PgPool) {
        let room_id = seed_room(&pool, 2).await;
        let students = seed_students(&pool, 3).await;

        let room = DormitoryService::assign_student(&pool, room_id, students[0])
            .await
            .unwrap();
        assert_eq!(room.occupied_beds, 1);
        assert!(room.is_available);

        let room = DormitoryService::assign_student(&pool, room_id, students[1])
            .await
            .unwrap();
        assert_eq!(room.occupied_beds, 2);
        assert_eq!(room.free_beds, 0);
        assert!(!room.is_available);

        // One past capacity must fail with Conflict
        let err = DormitoryService::assign_student(&pool, room_id, students[2])
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_student_cannot_hold_two_rooms(pool: PgPool) {
        let room_id = seed_room(&pool, 4).await;
        let students = seed_students(&pool, 1).await;

        DormitoryService::assign_student(&pool, room_id, students[0])
            .await
            .unwrap();

        let err = DormitoryService::assign_student(&pool, room_id, students[0])
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_unassign_reopens_room(pool: PgPool) {
        let room_id = seed_room(&pool, 1).await;
        let students = seed_students(&pool, 1).await;

        let room = DormitoryService::assign_student(&pool, room_id, students[0])
            .await
            .unwrap();
        assert!(!room.is_available);

        let room = DormitoryService::unassign_student(&pool, room_id, students[0])
            .await
            .unwrap();
        assert!(room.is_available);
        assert_eq!(room.occupied_beds, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_unassign_student_not_in_room(pool: PgPool) {
        let room_id = seed_room(&pool, 2).await;
        let students = seed_students(&pool, 1).await;

        let err = DormitoryService::unassign_student(&pool, room_id, students[0])
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_cannot_shrink_beds_below_occupancy(pool: PgPool) {
        let room_id = seed_room(&pool, 2).await;
        let students = seed_students(&pool, 2).await;

        DormitoryService::assign_student(&pool, room_id, students[0])
            .await
            .unwrap();
        DormitoryService::assign_student(&pool, room_id, students[1])
            .await
            .unwrap();

        let dto = UpdateRoomDto {
            room_number: None,
            floor: None,
            beds_count: Some(1),
            monthly_fee: None,
        };

        let err = DormitoryService::update_room(&pool, room_id, dto)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_occupancy_rate(pool: PgPool) {
        let room_id = seed_room(&pool, 4).await;
        let students = seed_students(&pool, 1).await;

        DormitoryService::assign_student(&pool, room_id, students[0])
            .await
            .unwrap();

        let dormitory_id = sqlx::query_scalar::<_, i32>(
            "SELECT dormitory_id FROM dormitory_rooms WHERE id = $1",
        )
        .bind(room_id)
        .fetch_one(&pool)
        .await
        .unwrap();

        let stats = DormitoryService::get_dormitory_stats(&pool, dormitory_id)
            .await
            .unwrap();
        assert_eq!(stats.total_rooms, 1);
        assert_eq!(stats.total_beds, 4);
        assert_eq!(stats.occupied_beds, 1);
        assert!((stats.occupancy_rate - 0.25).abs() < f64::EPSILON);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_dormitory_blocked_by_rooms(pool: PgPool) {
        let room_id = seed_room(&pool, 2).await;

        let dormitory_id = sqlx::query_scalar::<_, i32>(
            "SELECT dormitory_id FROM dormitory_rooms WHERE id = $1",
        )
        .bind(room_id)
        .fetch_one(&pool)
        .await
        .unwrap();

        let err = DormitoryService::delete_dormitory(&pool, dormitory_id)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }
}
