use crate::gateways::{CallbackParams, ExtractionTable, EMAIL, ORDER_ID, STATUS, TRANSACTION_ID};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SECURE_HASH: &str = "pp_SecureHash";

pub const SUCCESS_TOKENS: &[&str] = &["000", "success"];

pub static TABLE: ExtractionTable = ExtractionTable {
    order_id: &[ORDER_ID, "pp_TxnRef", "pp_BillReference"],
    status: &[STATUS, "pp_ResponseCode"],
    transaction_id: &[TRANSACTION_ID, "pp_TxnRefNo"],
};

/// Extracted keys the secure hash does not cover. A signed callback must not
/// carry any of them, or they would override the signed `pp_` values.
const UNSIGNED_KEYS: &[&str] = &[ORDER_ID, STATUS, TRANSACTION_ID, EMAIL];

/// HMAC-SHA256 over `salt&v1&v2...`, raw values of the non-empty `pp_`
/// fields in key order, keyed by the integrity salt.
fn mac_for(params: &CallbackParams, salt: &str) -> Option<HmacSha256> {
    let mut message = salt.to_string();
    for (_, value) in params
        .raw_present()
        .filter(|(key, _)| key.starts_with("pp_") && *key != SECURE_HASH)
    {
        message.push('&');
        message.push_str(value);
    }

    let mut mac = HmacSha256::new_from_slice(salt.as_bytes()).ok()?;
    mac.update(message.as_bytes());
    Some(mac)
}

pub fn secure_hash(params: &CallbackParams, salt: &str) -> Option<String> {
    mac_for(params, salt).map(|mac| hex::encode_upper(mac.finalize().into_bytes()))
}

pub fn verify_secure_hash(params: &CallbackParams, salt: &str) -> bool {
    if UNSIGNED_KEYS.iter().any(|key| params.get(key).is_some()) {
        return false;
    }
    let Some(provided) = params.get(SECURE_HASH).and_then(|h| hex::decode(h).ok()) else {
        return false;
    };
    match mac_for(params, salt) {
        Some(mac) => mac.verify_slice(&provided).is_ok(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateways::Gateway;

    fn signed(salt: &str) -> CallbackParams {
        let mut params: CallbackParams = vec![
            ("pp_TxnRef", Some("ORD123".to_string())),
            ("pp_ResponseCode", Some("000".to_string())),
            ("pp_TxnRefNo", Some("TXN999".to_string())),
            ("pp_Amount", Some("150000".to_string())),
        ]
        .into_iter()
        .collect();
        let hash = secure_hash(&params, salt).unwrap();
        params.insert(SECURE_HASH, Some(hash));
        params
    }

    #[test]
    fn extracts_wallet_fields() {
        let cb = Gateway::JazzCash.extract(&signed("salt"));
        assert_eq!(cb.order_id.as_deref(), Some("ORD123"));
        assert_eq!(cb.status.as_deref(), Some("000"));
        assert_eq!(cb.transaction_id, "TXN999");
    }

    #[test]
    fn valid_hash_verifies() {
        let params = signed("s3cr3t");
        assert!(verify_secure_hash(&params, "s3cr3t"));
        assert!(!verify_secure_hash(&params, "other"));
    }

    #[test]
    fn altered_field_fails_verification() {
        let mut params = signed("s3cr3t");
        params.insert("pp_ResponseCode", Some("000".to_string()));
        assert!(verify_secure_hash(&params, "s3cr3t"));
        params.insert("pp_TxnRef", Some("ORD124".to_string()));
        assert!(!verify_secure_hash(&params, "s3cr3t"));
    }

    #[test]
    fn hash_covers_raw_values() {
        let mut params = signed("s3cr3t");
        params.insert("pp_BillReference", Some(" bill 7 ".to_string()));
        let hash = secure_hash(&params, "s3cr3t").unwrap();
        params.insert(SECURE_HASH, Some(hash));
        assert!(verify_secure_hash(&params, "s3cr3t"));

        params.insert("pp_BillReference", Some("bill 7".to_string()));
        assert!(!verify_secure_hash(&params, "s3cr3t"));
    }

    #[test]
    fn unsigned_override_fails_verification() {
        for key in UNSIGNED_KEYS {
            let mut params = signed("s3cr3t");
            params.insert(*key, Some("000".to_string()));
            assert!(!verify_secure_hash(&params, "s3cr3t"), "{key}");
        }
    }

    #[test]
    fn missing_hash_fails_verification() {
        let mut params = signed("s3cr3t");
        params.insert(SECURE_HASH, None);
        assert!(!verify_secure_hash(&params, "s3cr3t"));
    }
}
