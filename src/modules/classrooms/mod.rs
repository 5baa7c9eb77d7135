pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::Classroom;
pub use router::init_classrooms_router;
