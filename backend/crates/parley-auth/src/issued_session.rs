use parley_core::{PublicProfile, Session};

/// A fresh session plus the profile of the identity it is bound to, when
/// one exists
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub session: Session,
    pub profile: Option<PublicProfile>,
}
