use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::admins::model::{Admin, AdminFilterParams, CreateAdminDto, UpdateAdminDto};
use crate::modules::auth::model::{LoginRequest, LoginResponse, MessageResponse, RefreshResponse};
use crate::modules::contracts::model::{Contract, ContractWithInstallments, CreateContractDto};
use crate::modules::dormitories::model::{
    AssignStudentDto, Dormitory, DormitoryStats, RoomWithOccupancy,
};
use crate::modules::faculties::model::{
    CreateFacultyDto, Faculty, FacultyFilterParams, FacultyStats, UpdateFacultyDto,
};
use crate::modules::installments::model::{
    InstallmentResponse, PayInstallmentDto, SweepOverdueResponse,
};
use crate::modules::payments::model::{CreatePaymentDto, Payment, PaymentStats};
use crate::modules::students::model::{
    CreateStudentDto, Student, StudentFilterParams, StudentWithRelations, UpdateStudentDto,
};
use unibase_core::pagination::{PaginationParams, SortOrder, SortParams};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::refresh,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::me,
        crate::modules::admins::controller::create_admin,
        crate::modules::admins::controller::get_admins,
        crate::modules::admins::controller::get_admin_by_id,
        crate::modules::admins::controller::update_admin,
        crate::modules::admins::controller::delete_admin,
        crate::modules::admins::controller::approve_admin,
        crate::modules::faculties::controller::create_faculty,
        crate::modules::faculties::controller::get_faculties,
        crate::modules::faculties::controller::get_faculty_by_id,
        crate::modules::faculties::controller::update_faculty,
        crate::modules::faculties::controller::delete_faculty,
        crate::modules::faculties::controller::get_faculty_stats,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student_by_id,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::dormitories::controller::assign_student,
        crate::modules::dormitories::controller::unassign_student,
        crate::modules::dormitories::controller::get_dormitory_stats,
        crate::modules::contracts::controller::create_contract,
        crate::modules::contracts::controller::get_contract_with_installments,
        crate::modules::installments::controller::pay_installment,
        crate::modules::installments::controller::sweep_overdue,
        crate::modules::payments::controller::create_payment,
        crate::modules::payments::controller::update_payment_status,
        crate::modules::payments::controller::get_payment_stats,
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            RefreshResponse,
            MessageResponse,
            Admin,
            CreateAdminDto,
            UpdateAdminDto,
            AdminFilterParams,
            Faculty,
            CreateFacultyDto,
            UpdateFacultyDto,
            FacultyFilterParams,
            FacultyStats,
            Student,
            StudentWithRelations,
            CreateStudentDto,
            UpdateStudentDto,
            StudentFilterParams,
            Dormitory,
            DormitoryStats,
            RoomWithOccupancy,
            AssignStudentDto,
            Contract,
            ContractWithInstallments,
            CreateContractDto,
            InstallmentResponse,
            PayInstallmentDto,
            SweepOverdueResponse,
            Payment,
            CreatePaymentDto,
            PaymentStats,
            PaginationParams,
            SortOrder,
            SortParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Admin authentication endpoints"),
        (name = "Admins", description = "Administrator account management"),
        (name = "Faculties", description = "Faculty management"),
        (name = "Departments", description = "Department management"),
        (name = "Groups", description = "Student group management"),
        (name = "Classrooms", description = "Classroom management"),
        (name = "Students", description = "Student records"),
        (name = "Dormitories", description = "Dormitories, rooms, and bed assignment"),
        (name = "Contracts", description = "Tuition contracts"),
        (name = "Installments", description = "Installment schedules and payments"),
        (name = "Payments", description = "Payments and balance bookkeeping"),
        (name = "Scholarships", description = "Scholarship management"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
