use super::*;
use time::macros::datetime;

fn form(name: &str, item_type: &str) -> DiscoveryItemForm {
    DiscoveryItemForm { name: name.into(), item_type: item_type.into(), ..DiscoveryItemForm::default() }
}

// =============================================================================
// DiscoveryItemType
// =============================================================================

#[test]
fn item_type_round_trips_through_str() {
    for t in [DiscoveryItemType::Event, DiscoveryItemType::Place, DiscoveryItemType::Business] {
        assert_eq!(DiscoveryItemType::from_str(t.as_str()), Some(t));
    }
}

#[test]
fn item_type_rejects_unknown() {
    assert_eq!(DiscoveryItemType::from_str("restaurant"), None);
    assert_eq!(DiscoveryItemType::from_str("Event"), None);
}

#[test]
fn parse_filter_treats_all_as_none() {
    assert_eq!(DiscoveryItemType::parse_filter(Some("all")).unwrap(), None);
    assert_eq!(DiscoveryItemType::parse_filter(None).unwrap(), None);
    assert_eq!(DiscoveryItemType::parse_filter(Some("")).unwrap(), None);
}

#[test]
fn parse_filter_accepts_known_type() {
    assert_eq!(DiscoveryItemType::parse_filter(Some("place")).unwrap(), Some(DiscoveryItemType::Place));
}

#[test]
fn parse_filter_rejects_unknown_type() {
    let err = DiscoveryItemType::parse_filter(Some("zoo")).unwrap_err();
    assert!(matches!(err, DiscoveryError::Invalid(_)));
}

#[test]
fn item_type_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&DiscoveryItemType::Business).unwrap(), "\"business\"");
}

// =============================================================================
// parse_event_date
// =============================================================================

#[test]
fn parse_event_date_accepts_date_only_as_utc_midnight() {
    let parsed = parse_event_date("2024-12-31").unwrap();
    assert_eq!(parsed, datetime!(2024-12-31 00:00 UTC));
}

#[test]
fn parse_event_date_accepts_rfc3339() {
    let parsed = parse_event_date("2024-12-31T18:30:00+05:30").unwrap();
    assert_eq!(parsed, datetime!(2024-12-31 13:00 UTC));
}

#[test]
fn parse_event_date_reads_zoneless_date_time_as_utc() {
    assert_eq!(parse_event_date("2024-12-31T18:00:00").unwrap(), datetime!(2024-12-31 18:00 UTC));
    assert_eq!(parse_event_date("2024-12-31T18:00").unwrap(), datetime!(2024-12-31 18:00 UTC));
    assert_eq!(parse_event_date("2024-12-31 18:00").unwrap(), datetime!(2024-12-31 18:00 UTC));
    assert_eq!(parse_event_date("2024-12-31 18:00:15").unwrap(), datetime!(2024-12-31 18:00:15 UTC));
}

#[test]
fn parse_event_date_rejects_garbage() {
    assert!(parse_event_date("next friday").is_err());
    assert!(parse_event_date("2024-13-40").is_err());
    assert!(parse_event_date("2024-12-31T25:00").is_err());
}

// =============================================================================
// Form coercion
// =============================================================================

#[test]
fn form_splits_comma_tags_and_drops_empties() {
    let mut f = form("Cafe", "business");
    f.tags = Some(" coffee, , local ,".into());
    let item = f.into_new_item().unwrap();
    assert_eq!(item.tags, Some(vec!["coffee".to_owned(), "local".to_owned()]));
}

#[test]
fn form_empty_tags_become_none() {
    let mut f = form("Cafe", "business");
    f.tags = Some(" , ".into());
    assert_eq!(f.into_new_item().unwrap().tags, None);
}

#[test]
fn form_blank_strings_become_none() {
    let mut f = form("Park", "place");
    f.description = Some("   ".into());
    f.address = Some(String::new());
    f.image_url = Some(" https://img.example.test/a.jpg ".into());
    let item = f.into_new_item().unwrap();
    assert_eq!(item.description, None);
    assert_eq!(item.address, None);
    assert_eq!(item.image_url.as_deref(), Some("https://img.example.test/a.jpg"));
}

#[test]
fn form_requires_name() {
    let err = form("  ", "event").into_new_item().unwrap_err();
    assert!(matches!(err, DiscoveryError::Invalid(ref m) if m.contains("name")));
}

#[test]
fn form_rejects_unknown_type() {
    assert!(matches!(form("Fair", "festival").into_new_item(), Err(DiscoveryError::Invalid(_))));
}

#[test]
fn form_rejects_bad_category_id() {
    let mut f = form("Fair", "event");
    f.category_id = Some("not-a-uuid".into());
    assert!(matches!(f.into_new_item(), Err(DiscoveryError::Invalid(_))));
}

#[test]
fn form_parses_category_and_date() {
    let category = Uuid::new_v4();
    let mut f = form("Fair", "event");
    f.category_id = Some(category.to_string());
    f.event_date = Some("2025-06-29".into());
    f.event_time = Some("14:00".into());
    f.is_featured = true;
    let item = f.into_new_item().unwrap();
    assert_eq!(item.category_id, Some(category));
    assert_eq!(item.event_date, Some(datetime!(2025-06-29 00:00 UTC)));
    assert_eq!(item.event_time.as_deref(), Some("14:00"));
    assert!(item.is_featured);
}

#[test]
fn form_deserializes_type_field() {
    let json = r#"{"name":"Market","type":"place","tags":"food"}"#;
    let f: DiscoveryItemForm = serde_json::from_str(json).unwrap();
    let item = f.into_new_item().unwrap();
    assert_eq!(item.item_type, DiscoveryItemType::Place);
    assert!(!item.is_featured);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn discovery_error_statuses() {
    assert_eq!(DiscoveryError::NotFound(Uuid::nil()).status(), StatusCode::NOT_FOUND);
    assert_eq!(DiscoveryError::Invalid("x".into()).status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        DiscoveryError::Database(sqlx::Error::RowNotFound).status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
