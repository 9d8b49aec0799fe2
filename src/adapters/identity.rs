use crate::domain::ports::{CustomerIdentity, IdentityProvider};

/// Identity handed over by the host application (or CLI flags). `None` means
/// the visitor is not signed in.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    identity: Option<CustomerIdentity>,
}

impl StaticIdentity {
    pub fn signed_in(identity: CustomerIdentity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_identity(&self) -> Option<CustomerIdentity> {
        self.identity.clone()
    }
}
