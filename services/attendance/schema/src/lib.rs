//! sea-orm entities for the attendance service.

pub mod attendance_records;
pub mod class_sessions;
pub mod profiles;
pub mod session_codes;
pub mod verification_codes;
