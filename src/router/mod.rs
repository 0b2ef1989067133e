pub mod confirm_router;
pub mod contractor_router;
pub mod intake_router;

pub use confirm_router::confirm_router;
pub use contractor_router::contractor_router;
pub use intake_router::intake_router;
