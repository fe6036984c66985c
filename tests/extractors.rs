use payment_callbacks::gateways::{CallbackParams, Gateway};

fn params(pairs: &[(&str, &str)]) -> CallbackParams {
    pairs
        .iter()
        .map(|(k, v)| (*k, Some(v.to_string())))
        .collect()
}

#[test]
fn jazzcash_order_id_priority() {
    let only_bill = params(&[("pp_BillReference", "ORD3")]);
    assert_eq!(Gateway::JazzCash.extract(&only_bill).order_id.as_deref(), Some("ORD3"));

    let ref_and_bill = params(&[("pp_TxnRef", "ORD2"), ("pp_BillReference", "ORD3")]);
    assert_eq!(Gateway::JazzCash.extract(&ref_and_bill).order_id.as_deref(), Some("ORD2"));

    let all = params(&[
        ("orderId", "ORD1"),
        ("pp_TxnRef", "ORD2"),
        ("pp_BillReference", "ORD3"),
    ]);
    assert_eq!(Gateway::JazzCash.extract(&all).order_id.as_deref(), Some("ORD1"));
}

#[test]
fn jazzcash_blank_primary_falls_through() {
    let input = params(&[("pp_TxnRef", ""), ("pp_BillReference", "ORD3")]);
    let cb = Gateway::JazzCash.extract(&input);
    assert_eq!(cb.order_id.as_deref(), Some("ORD3"));
    assert_eq!(cb.transaction_id, "ORD3");
}

#[test]
fn jazzcash_status_prefers_generic_field() {
    let input = params(&[("status", "success"), ("pp_ResponseCode", "124")]);
    assert_eq!(Gateway::JazzCash.extract(&input).status.as_deref(), Some("success"));

    let input = params(&[("pp_ResponseCode", "124")]);
    assert_eq!(Gateway::JazzCash.extract(&input).status.as_deref(), Some("124"));
}

#[test]
fn easypaisa_fallbacks() {
    let only_order = params(&[("order_id", "ORD5"), ("status", "0000")]);
    let cb = Gateway::Easypaisa.extract(&only_order);
    assert_eq!(cb.order_id.as_deref(), Some("ORD5"));
    assert_eq!(cb.status.as_deref(), Some("0000"));
    assert_eq!(cb.transaction_id, "ORD5");

    let both = params(&[
        ("reference_id", "ORD4"),
        ("order_id", "ORD5"),
        ("transaction_id", "EP-77"),
    ]);
    let cb = Gateway::Easypaisa.extract(&both);
    assert_eq!(cb.order_id.as_deref(), Some("ORD4"));
    assert_eq!(cb.transaction_id, "EP-77");
}

#[test]
fn nothing_usable_yields_empty_callback() {
    let input = params(&[("utm_source", "mail"), ("pp_Amount", "100")]);
    for gateway in Gateway::ALL {
        let cb = gateway.extract(&input);
        assert_eq!(cb.gateway, gateway);
        assert_eq!(cb.order_id, None);
        assert_eq!(cb.status, None);
        assert_eq!(cb.transaction_id, "");
        assert_eq!(cb.payer_email, None);
    }
}

#[test]
fn other_gateways_ignore_wallet_fields() {
    let input = params(&[("pp_TxnRef", "ORD2"), ("reference_id", "ORD4")]);
    assert_eq!(Gateway::Stripe.extract(&input).order_id, None);
    assert_eq!(Gateway::JazzCash.extract(&input).order_id.as_deref(), Some("ORD2"));
    assert_eq!(Gateway::Easypaisa.extract(&input).order_id.as_deref(), Some("ORD4"));
}
