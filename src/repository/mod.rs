pub mod contractor_repo;
pub mod job_repo;
pub mod memory;
pub mod repository_error;
pub mod request_repo;
pub mod user_repo;
