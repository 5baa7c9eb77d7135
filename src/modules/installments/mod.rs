pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::{Installment, InstallmentResponse};
pub use router::init_installments_router;
