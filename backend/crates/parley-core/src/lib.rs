pub mod api;
pub mod clock;
pub mod error;
pub mod models;
pub mod store;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, Result};
pub use models::identity::{DEFAULT_PROFILE_PHOTO, Identity, NewIdentity};
pub use models::pending_otp::PendingOtp;
pub use models::public_profile::PublicProfile;
pub use models::role::Role;
pub use models::session::Session;
pub use models::turn::Turn;
pub use store::{IdentityStore, InMemoryStore, OtpStore, SessionStore, Store};
