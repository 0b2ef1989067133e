pub mod confirm_handler;
pub mod contractor_handler;
pub mod intake_handler;
