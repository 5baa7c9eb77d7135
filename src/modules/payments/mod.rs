pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::Payment;
pub use router::init_payments_router;
