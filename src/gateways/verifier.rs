use crate::gateways::{jazzcash, CallbackParams, Gateway};

/// Shared-secret checks for gateways that sign their callbacks. A gateway
/// without a configured secret is passed through unchecked.
#[derive(Debug, Clone, Default)]
pub struct CallbackVerifier {
    pub jazzcash_integrity_salt: Option<String>,
}

impl CallbackVerifier {
    pub fn verify(&self, gateway: Gateway, params: &CallbackParams) -> bool {
        match (gateway, self.jazzcash_integrity_salt.as_deref()) {
            (Gateway::JazzCash, Some(salt)) => jazzcash::verify_secure_hash(params, salt),
            _ => true,
        }
    }
}
