pub mod confirm_dto;
pub mod intake_dto;
pub mod job_dto;
