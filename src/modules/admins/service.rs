use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::modules::admins::model::{
    ADMIN_COLUMNS, Admin, AdminFilterParams, AdminRole, CreateAdminDto, UpdateAdminDto,
};
use unibase_core::{AppError, hash_password, validate_id};

const SORTABLE_COLUMNS: &[&str] = &["id", "full_name", "email", "created_at"];

pub struct AdminService;

impl AdminService {
    #[instrument(skip(db, dto), fields(admin.email = %dto.email, db.table = "admins"))]
    pub async fn create_admin(
        db: &PgPool,
        dto: CreateAdminDto,
        bcrypt_cost: u32,
    ) -> Result<Admin, AppError> {
        let email_taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM admins WHERE email = $1)")
                .bind(&dto.email)
                .fetch_one(db)
                .await?;

        if email_taken {
            warn!(admin.email = %dto.email, "Attempted to create admin with existing email");
            return Err(AppError::conflict(anyhow::anyhow!(
                "Admin email already exists"
            )));
        }

        let password_hash = hash_password(&dto.password, bcrypt_cost)?;
        let role = dto.role.unwrap_or(AdminRole::Admin);

        let admin = sqlx::query_as::<_, Admin>(&format!(
            "INSERT INTO admins (full_name, email, password_hash, phone, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            ADMIN_COLUMNS
        ))
        .bind(&dto.full_name)
        .bind(&dto.email)
        .bind(&password_hash)
        .bind(&dto.phone)
        .bind(role.as_str())
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow::anyhow!("Admin email already exists"));
            }
            AppError::from(e)
        })?;

        info!(admin.id = %admin.id, "Admin created; waiting for approval");

        Ok(admin)
    }

    #[instrument(skip(db, filters), fields(db.table = "admins"))]
    pub async fn get_all_admins(
        db: &PgPool,
        filters: AdminFilterParams,
    ) -> Result<Vec<Admin>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut query = format!("SELECT {} FROM admins WHERE 1=1", ADMIN_COLUMNS);
        let mut params: Vec<String> = Vec::new();

        if let Some(search) = &filters.search {
            params.push(format!("%{}%", search));
            query.push_str(&format!(
                " AND (full_name ILIKE ${0} OR email ILIKE ${0})",
                params.len()
            ));
        }

        if let Some(role) = filters.role {
            query.push_str(&format!(" AND role = '{}'", role.as_str()));
        }

        if let Some(is_approved) = filters.is_approved {
            query.push_str(&format!(" AND is_approved = {}", is_approved));
        }

        if let Some(is_active) = filters.is_active {
            query.push_str(&format!(" AND is_active = {}", is_active));
        }

        query.push_str(&filters.sort.order_clause(SORTABLE_COLUMNS, "created_at")?);
        query.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));

        let mut sql = sqlx::query_as::<_, Admin>(&query);
        for param in &params {
            sql = sql.bind(param);
        }
        let admins = sql.fetch_all(db).await?;

        Ok(admins)
    }

    #[instrument(skip(db), fields(admin.id = %admin_id, db.table = "admins"))]
    pub async fn get_admin_by_id(db: &PgPool, admin_id: i32) -> Result<Admin, AppError> {
        validate_id(admin_id)?;

        let admin = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {} FROM admins WHERE id = $1",
            ADMIN_COLUMNS
        ))
        .bind(admin_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Admin not found")))?;

        Ok(admin)
    }

    #[instrument(skip(db, dto), fields(admin.id = %admin_id, db.table = "admins"))]
    pub async fn update_admin(
        db: &PgPool,
        admin_id: i32,
        dto: UpdateAdminDto,
        bcrypt_cost: u32,
    ) -> Result<Admin, AppError> {
        let existing = Self::get_admin_by_id(db, admin_id).await?;

        if let Some(email) = &dto.email
            && email != &existing.email
        {
            let email_taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM admins WHERE email = $1 AND id <> $2)",
            )
            .bind(email)
            .bind(admin_id)
            .fetch_one(db)
            .await?;

            if email_taken {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "Admin email already exists"
                )));
            }
        }

        let full_name = dto.full_name.unwrap_or(existing.full_name);
        let email = dto.email.unwrap_or(existing.email);
        let phone = if dto.phone.is_some() {
            dto.phone
        } else {
            existing.phone
        };

        let password_hash = match &dto.password {
            Some(password) => Some(hash_password(password, bcrypt_cost)?),
            None => None,
        };

        let admin = sqlx::query_as::<_, Admin>(&format!(
            "UPDATE admins
             SET full_name = $1, email = $2, phone = $3,
                 password_hash = COALESCE($4, password_hash), updated_at = NOW()
             WHERE id = $5
             RETURNING {}",
            ADMIN_COLUMNS
        ))
        .bind(&full_name)
        .bind(&email)
        .bind(&phone)
        .bind(&password_hash)
        .bind(admin_id)
        .fetch_one(db)
        .await?;

        Ok(admin)
    }

    #[instrument(skip(db), fields(admin.id = %admin_id, db.table = "admins"))]
    pub async fn delete_admin(db: &PgPool, admin_id: i32) -> Result<(), AppError> {
        validate_id(admin_id)?;

        let result = sqlx::query("DELETE FROM admins WHERE id = $1")
            .bind(admin_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Admin not found")));
        }

        info!(admin.id = %admin_id, "Admin deleted");

        Ok(())
    }

    #[instrument(skip(db), fields(admin.id = %admin_id, db.table = "admins"))]
    pub async fn approve_admin(db: &PgPool, admin_id: i32) -> Result<Admin, AppError> {
        validate_id(admin_id)?;

        let admin = sqlx::query_as::<_, Admin>(&format!(
            "UPDATE admins SET is_approved = TRUE, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            ADMIN_COLUMNS
        ))
        .bind(admin_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Admin not found")))?;

        info!(admin.id = %admin_id, "Admin approved");

        Ok(admin)
    }

    #[instrument(skip(db), fields(admin.id = %admin_id, db.table = "admins"))]
    pub async fn toggle_status(db: &PgPool, admin_id: i32) -> Result<Admin, AppError> {
        validate_id(admin_id)?;

        let admin = sqlx::query_as::<_, Admin>(&format!(
            "UPDATE admins SET is_active = NOT is_active, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            ADMIN_COLUMNS
        ))
        .bind(admin_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Admin not found")))?;

        Ok(admin)
    }
}
