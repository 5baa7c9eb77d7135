pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::{Dormitory, DormitoryRoom};
pub use router::init_dormitories_router;
