pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::Scholarship;
pub use router::init_scholarships_router;
