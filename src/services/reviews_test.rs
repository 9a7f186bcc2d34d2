use super::*;

fn review(item: Uuid, user: Uuid, rating: i32) -> Review {
    Review {
        id: Uuid::new_v4(),
        discovery_item_id: item,
        user_id: user,
        rating,
        comment: Some("nice".into()),
        is_anonymous: Some(false),
        created_at: OffsetDateTime::UNIX_EPOCH,
        updated_at: OffsetDateTime::UNIX_EPOCH,
    }
}

// =============================================================================
// ReviewListing::for_viewer
// =============================================================================

#[test]
fn create_control_shown_when_viewer_has_no_review() {
    let item = Uuid::new_v4();
    let viewer = Uuid::new_v4();
    let reviews = vec![review(item, Uuid::new_v4(), 4)];

    let listing = ReviewListing::for_viewer(item, reviews, Some(viewer));
    assert!(listing.can_create_review);
    assert_eq!(listing.viewer_review_id, None);
    assert!(!listing.requires_sign_in);
}

#[test]
fn create_control_hidden_once_viewer_review_present() {
    let item = Uuid::new_v4();
    let viewer = Uuid::new_v4();
    let mine = review(item, viewer, 5);
    let mine_id = mine.id;
    let reviews = vec![review(item, Uuid::new_v4(), 2), mine];

    let listing = ReviewListing::for_viewer(item, reviews, Some(viewer));
    assert!(!listing.can_create_review);
    assert_eq!(listing.viewer_review_id, Some(mine_id));
}

#[test]
fn signed_out_viewer_cannot_create() {
    let item = Uuid::new_v4();
    let listing = ReviewListing::for_viewer(item, vec![], None);
    assert!(!listing.can_create_review);
    assert!(listing.requires_sign_in);
    assert_eq!(listing.review_count, 0);
}

#[test]
fn edit_and_delete_only_on_own_review() {
    let item = Uuid::new_v4();
    let viewer = Uuid::new_v4();
    let other = review(item, Uuid::new_v4(), 3);
    let other_id = other.id;
    let reviews = vec![other, review(item, viewer, 5)];

    let listing = ReviewListing::for_viewer(item, reviews, Some(viewer));
    for view in &listing.reviews {
        let mine = view.id != other_id;
        assert_eq!(view.can_edit, mine);
        assert_eq!(view.can_delete, mine);
    }
}

#[test]
fn listing_preserves_fetch_order() {
    let item = Uuid::new_v4();
    let first = review(item, Uuid::new_v4(), 1);
    let second = review(item, Uuid::new_v4(), 2);
    let ids = [first.id, second.id];

    let listing = ReviewListing::for_viewer(item, vec![first, second], None);
    let got: Vec<Uuid> = listing.reviews.iter().map(|r| r.id).collect();
    assert_eq!(got, ids);
    assert_eq!(listing.review_count, 2);
}

#[test]
fn anonymous_review_hides_author_from_others() {
    let item = Uuid::new_v4();
    let author = Uuid::new_v4();
    let mut anon = review(item, author, 4);
    anon.is_anonymous = Some(true);

    let as_stranger = ReviewListing::for_viewer(item, vec![anon.clone()], Some(Uuid::new_v4()));
    assert_eq!(as_stranger.reviews[0].user_id, None);
    assert!(as_stranger.reviews[0].is_anonymous);

    let as_author = ReviewListing::for_viewer(item, vec![anon], Some(author));
    assert_eq!(as_author.reviews[0].user_id, Some(author));
    assert_eq!(as_author.viewer_review_id, Some(as_author.reviews[0].id));
}

#[test]
fn missing_anonymity_flag_means_public() {
    let item = Uuid::new_v4();
    let author = Uuid::new_v4();
    let mut r = review(item, author, 4);
    r.is_anonymous = None;
    let listing = ReviewListing::for_viewer(item, vec![r], None);
    assert_eq!(listing.reviews[0].user_id, Some(author));
    assert!(!listing.reviews[0].is_anonymous);
}

// =============================================================================
// ReviewInput::validate
// =============================================================================

#[test]
fn validate_accepts_rating_bounds() {
    for rating in [1, 5] {
        let input = ReviewInput { rating, comment: None, is_anonymous: false };
        assert!(input.validate().is_ok());
    }
}

#[test]
fn validate_rejects_out_of_range_rating() {
    for rating in [0, 6, -1] {
        let input = ReviewInput { rating, comment: None, is_anonymous: false };
        assert!(matches!(input.validate(), Err(ReviewError::InvalidRating(r)) if r == rating));
    }
}

#[test]
fn validate_drops_blank_comment() {
    let input = ReviewInput { rating: 3, comment: Some("   ".into()), is_anonymous: true };
    let validated = input.validate().unwrap();
    assert_eq!(validated.comment, None);
    assert!(validated.is_anonymous);
}

#[test]
fn review_input_defaults_anonymity() {
    let input: ReviewInput = serde_json::from_str(r#"{"rating":4,"comment":"good"}"#).unwrap();
    assert!(!input.is_anonymous);
    assert_eq!(input.comment.as_deref(), Some("good"));
}

// =============================================================================
// Ownership and errors
// =============================================================================

#[test]
fn ensure_owner_allows_author() {
    let author = Uuid::new_v4();
    let r = review(Uuid::new_v4(), author, 3);
    assert!(ensure_owner(&r, author).is_ok());
}

#[test]
fn ensure_owner_rejects_others() {
    let r = review(Uuid::new_v4(), Uuid::new_v4(), 3);
    assert!(matches!(ensure_owner(&r, Uuid::new_v4()), Err(ReviewError::NotOwner)));
}

#[tokio::test]
async fn delete_without_confirmation_is_refused_before_any_query() {
    let state = crate::state::test_helpers::test_app_state();
    let err = delete_review(&state.pool, Uuid::new_v4(), Uuid::new_v4(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::ConfirmationRequired));
}

#[tokio::test]
async fn create_with_bad_rating_is_refused_before_any_query() {
    let state = crate::state::test_helpers::test_app_state();
    let input = ReviewInput { rating: 9, comment: None, is_anonymous: false };
    let err = create_review(&state.pool, Uuid::new_v4(), Uuid::new_v4(), input)
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::InvalidRating(9)));
}

#[test]
fn review_error_statuses() {
    assert_eq!(ReviewError::AlreadyReviewed.status(), StatusCode::CONFLICT);
    assert_eq!(ReviewError::NotOwner.status(), StatusCode::FORBIDDEN);
    assert_eq!(ReviewError::ConfirmationRequired.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ReviewError::NotFound(Uuid::nil()).status(), StatusCode::NOT_FOUND);
    assert_eq!(ReviewError::InvalidRating(0).status(), StatusCode::BAD_REQUEST);
}
