use super::*;

#[test]
fn admit_card_response_flattens_status_and_adds_message() {
    let body = serde_json::to_value(AdmitCardResponse::from(AdmitCardStatus::RollNumberPending)).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "status": "roll_number_pending",
            "message": "Application received. Roll number not assigned yet. Please check back later.",
        })
    );
}

#[test]
fn admit_card_not_found_is_a_status_not_an_error() {
    let body = serde_json::to_value(AdmitCardResponse::from(AdmitCardStatus::NotFound)).unwrap();
    assert_eq!(body["status"], "not_found");
    assert_eq!(body["message"], "No application found for this form number.");
}

#[test]
fn lookup_queries_default_to_blank() {
    let q: AdmitCardQuery = serde_json::from_str("{}").unwrap();
    assert!(q.form_no.is_empty());
    let q: ResultQuery = serde_json::from_str(r#"{"roll_number":"R-7"}"#).unwrap();
    assert_eq!(q.roll_number, "R-7");
}
