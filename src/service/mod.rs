pub mod confirmation_service;
pub mod dispatch_service;
pub mod fields;
pub mod intake_service;
pub mod job_confirmation_service;
pub mod notifications;
