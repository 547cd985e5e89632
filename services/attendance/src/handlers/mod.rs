pub mod attendance;
pub mod health;
pub mod session_code;
pub mod verification;
