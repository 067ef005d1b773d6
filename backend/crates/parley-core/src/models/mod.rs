pub mod identity;
pub mod pending_otp;
pub mod public_profile;
pub mod role;
pub mod session;
pub mod turn;
