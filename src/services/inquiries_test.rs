use super::*;
use serde_json::json;

fn input() -> InquiryInput {
    InquiryInput {
        event_id: Some("free-website".into()),
        full_name: Some("Tomba Singh".into()),
        email: Some("tomba@example.test".into()),
        message: Some("Need a shop page".into()),
        ..InquiryInput::default()
    }
}

#[test]
fn validate_requires_core_fields() {
    let err = InquiryInput { email: Some("x@example.test".into()), ..InquiryInput::default() }
        .validate(None)
        .unwrap_err();
    match err {
        FormError::MissingFields(fields) => assert_eq!(fields, vec!["full_name", "message", "event_id"]),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn validate_without_extras_has_no_additional_info() {
    let inquiry = input().validate(None).unwrap();
    assert_eq!(inquiry.additional_info, None);
    assert_eq!(inquiry.event_id, "free-website");
}

#[test]
fn extras_are_folded_into_additional_info() {
    let mut with_extras = input();
    with_extras.website_type = Some("shop".into());
    with_extras.does_delivery = Some("yes".into());
    with_extras.established_year = Some(" 2019 ".into());
    with_extras.can_deliver_within_city = Some(String::new());

    let inquiry = with_extras.validate(None).unwrap();
    assert_eq!(
        inquiry.additional_info,
        Some(json!({ "website_type": "shop", "does_delivery": "yes", "established_year": "2019" }))
    );
}

#[test]
fn extras_merge_with_submitted_object() {
    let mut merged = input();
    merged.additional_info = Some(json!({ "referrer": "poster" }));
    merged.website_type = Some("portfolio".into());

    let inquiry = merged.validate(None).unwrap();
    assert_eq!(
        inquiry.additional_info,
        Some(json!({ "referrer": "poster", "website_type": "portfolio" }))
    );
}

#[test]
fn scalar_additional_info_is_kept_as_notes() {
    let mut scalar = input();
    scalar.additional_info = Some(json!("call after 5pm"));
    let inquiry = scalar.validate(None).unwrap();
    assert_eq!(inquiry.additional_info, Some(json!({ "notes": "call after 5pm" })));
}

#[test]
fn optional_columns_are_trimmed() {
    let mut full = input();
    full.business_name = Some("  Ima Keithel Crafts ".into());
    full.has_domain = Some("   ".into());
    let user = Uuid::new_v4();
    let inquiry = full.validate(Some(user)).unwrap();
    assert_eq!(inquiry.business_name.as_deref(), Some("Ima Keithel Crafts"));
    assert_eq!(inquiry.has_domain, None);
    assert_eq!(inquiry.user_id, Some(user));
}
