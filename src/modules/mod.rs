pub mod admins;
pub mod auth;
pub mod classrooms;
pub mod contracts;
pub mod departments;
pub mod dormitories;
pub mod faculties;
pub mod groups;
pub mod installments;
pub mod payments;
pub mod scholarships;
pub mod students;
