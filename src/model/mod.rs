pub mod contractor;
pub mod job;
pub mod request;
pub mod user;
