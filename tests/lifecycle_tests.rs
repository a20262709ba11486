mod common;

use carematch::db;
use carematch::error::AppError;
use carematch::models::*;
use carematch::services::lifecycle;
use common::*;

#[tokio::test]
async fn created_request_is_open_with_zero_counts() {
    let pool = test_pool().await;

    let input = CreateRequestInput {
        pin_user_id: Some(7),
        title: Some("  Groceries  ".to_string()),
        description: Some(" Weekly grocery run ".to_string()),
        location: Some("Tampines".to_string()),
        category_id: None,
    };
    let request = lifecycle::create_request(&pool, &input).await.unwrap();

    assert_eq!(request.pin_user_id, 7);
    assert_eq!(request.title, "Groceries");
    assert_eq!(request.description, "Weekly grocery run");
    assert_eq!(request.status, "Open");
    assert_eq!(request.view_count, 0);
    assert_eq!(request.shortlist_count, 0);
}

#[tokio::test]
async fn create_rejects_invalid_input() {
    let pool = test_pool().await;

    let blank_title = CreateRequestInput {
        pin_user_id: Some(7),
        title: Some("   ".to_string()),
        description: Some("d".to_string()),
        location: Some("Tampines".to_string()),
        category_id: None,
    };
    let err = lifecycle::create_request(&pool, &blank_title).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(ref msg) if msg == "title is required"));

    let bad_owner = CreateRequestInput {
        pin_user_id: Some(0),
        title: Some("t".to_string()),
        description: Some("d".to_string()),
        location: Some("l".to_string()),
        category_id: None,
    };
    assert!(matches!(
        lifecycle::create_request(&pool, &bad_owner).await,
        Err(AppError::Validation(_))
    ));

    let unknown_category = CreateRequestInput {
        pin_user_id: Some(7),
        title: Some("t".to_string()),
        description: Some("d".to_string()),
        location: Some("l".to_string()),
        category_id: Some(999),
    };
    assert!(matches!(
        lifecycle::create_request(&pool, &unknown_category).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn completing_twice_yields_one_match() {
    let pool = test_pool().await;
    let request = create_request(&pool, 7, "Groceries", None).await;

    let first = complete(&pool, 7, request.request_id, 3).await;
    let second = complete(&pool, 7, request.request_id, 3).await;

    assert_eq!(first.status, "Completed");
    assert_eq!(second.status, "Completed");

    let matches = matches_for(&pool, request.request_id).await;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].csr_user_id, 3);
    assert_eq!(matches[0].status, MATCH_STATUS_COMPLETED);
    assert!(matches[0].completion_date.is_some());
}

#[tokio::test]
async fn completion_without_csr_rolls_back_the_update() {
    let pool = test_pool().await;
    let request = create_request(&pool, 7, "Groceries", None).await;

    let mut change = status_change(7, request.request_id, "Completed", None);
    change.title = Some("Renamed".to_string());
    let err = lifecycle::update_request(&pool, &change).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let mut conn = pool.acquire().await.unwrap();
    let unchanged = db::get_request(&mut conn, request.request_id, Some(7))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.status, "Open");
    assert_eq!(unchanged.title, "Groceries");
    drop(conn);

    assert!(matches_for(&pool, request.request_id).await.is_empty());
}

#[tokio::test]
async fn update_changes_only_supplied_fields() {
    let pool = test_pool().await;
    let request = create_request(&pool, 7, "Groceries", None).await;

    let change = UpdateRequestInput {
        pin_user_id: Some(7),
        request_id: Some(request.request_id),
        location: Some(" Bedok ".to_string()),
        ..Default::default()
    };
    let updated = lifecycle::update_request(&pool, &change).await.unwrap();

    assert_eq!(updated.location, "Bedok");
    assert_eq!(updated.title, "Groceries");
    assert_eq!(updated.status, "Open");
    assert!(updated.updated_at >= request.updated_at);

    let unknown_status = status_change(7, request.request_id, "Done", None);
    assert!(matches!(
        lifecycle::update_request(&pool, &unknown_status).await,
        Err(AppError::Validation(_))
    ));

    let other_owner = status_change(8, request.request_id, "In Progress", None);
    assert!(matches!(
        lifecycle::update_request(&pool, &other_owner).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn undo_then_complete_again_yields_one_match() {
    let pool = test_pool().await;
    let request = create_request(&pool, 7, "Groceries", None).await;
    complete(&pool, 7, request.request_id, 3).await;

    let summary = lifecycle::undo_complete(
        &pool,
        &UndoCompleteInput {
            request_id: Some(request.request_id),
            pin_user_id: Some(7),
            new_status: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(summary.matches_deleted, 1);
    assert!(summary.request_updated);
    assert_eq!(summary.status, "Open");
    assert!(matches_for(&pool, request.request_id).await.is_empty());

    complete(&pool, 7, request.request_id, 3).await;
    assert_eq!(matches_for(&pool, request.request_id).await.len(), 1);
}

#[tokio::test]
async fn undo_complete_validates_status_and_owner() {
    let pool = test_pool().await;
    let request = create_request(&pool, 7, "Groceries", None).await;
    complete(&pool, 7, request.request_id, 3).await;

    let to_completed = UndoCompleteInput {
        request_id: Some(request.request_id),
        pin_user_id: Some(7),
        new_status: Some("Completed".to_string()),
    };
    assert!(matches!(
        lifecycle::undo_complete(&pool, &to_completed).await,
        Err(AppError::Validation(_))
    ));

    let not_owner = UndoCompleteInput {
        request_id: Some(request.request_id),
        pin_user_id: Some(8),
        new_status: Some("Cancelled".to_string()),
    };
    assert!(matches!(
        lifecycle::undo_complete(&pool, &not_owner).await,
        Err(AppError::NotFound)
    ));

    // 실패한 되돌리기는 아무것도 바꾸지 않음
    assert_eq!(matches_for(&pool, request.request_id).await.len(), 1);
}

#[tokio::test]
async fn undo_complete_without_matches_still_moves_status() {
    let pool = test_pool().await;
    let request = create_request(&pool, 7, "Groceries", None).await;

    let summary = lifecycle::undo_complete(
        &pool,
        &UndoCompleteInput {
            request_id: Some(request.request_id),
            pin_user_id: Some(7),
            new_status: Some("Cancelled".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(summary.matches_deleted, 0);
    assert!(summary.request_updated);
    assert_eq!(summary.status, "Cancelled");
}

#[tokio::test]
async fn deleting_a_request_with_a_match_conflicts() {
    let pool = test_pool().await;
    let request = create_request(&pool, 7, "Groceries", None).await;
    complete(&pool, 7, request.request_id, 3).await;

    let input = DeleteRequestInput {
        pin_user_id: Some(7),
        request_id: Some(request.request_id),
    };
    let err = lifecycle::delete_request(&pool, &input).await.unwrap_err();
    assert!(matches!(err, AppError::InUse { references: 1, .. }));

    // 매치를 되돌린 뒤에는 삭제 가능
    lifecycle::undo_complete(
        &pool,
        &UndoCompleteInput {
            request_id: Some(request.request_id),
            pin_user_id: Some(7),
            new_status: None,
        },
    )
    .await
    .unwrap();
    assert!(lifecycle::delete_request(&pool, &input).await.unwrap());
    assert!(!lifecycle::delete_request(&pool, &input).await.unwrap());
}

#[tokio::test]
async fn delete_is_scoped_to_the_owner() {
    let pool = test_pool().await;
    let request = create_request(&pool, 7, "Groceries", None).await;

    let wrong_owner = DeleteRequestInput {
        pin_user_id: Some(8),
        request_id: Some(request.request_id),
    };
    assert!(!lifecycle::delete_request(&pool, &wrong_owner).await.unwrap());

    let mut conn = pool.acquire().await.unwrap();
    assert!(db::get_request(&mut conn, request.request_id, None)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn search_and_list_never_return_other_owners_rows() {
    let pool = test_pool().await;
    create_request(&pool, 7, "Groceries for mum", None).await;
    create_request(&pool, 8, "Groceries for dad", None).await;
    create_request(&pool, 7, "Wheelchair repair", None).await;

    let query = SearchRequestsQuery {
        pin_user_id: Some(7),
        keyword: Some("GROC".to_string()),
        ..Default::default()
    };
    let found = lifecycle::search_my_requests(&pool, &query).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Groceries for mum");

    let listed = lifecycle::list_my_requests(
        &pool,
        &ListRequestsQuery {
            pin_user_id: Some(7),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|r| r.pin_user_id == 7));
    // 기본 정렬은 최신순
    assert_eq!(listed[0].title, "Wheelchair repair");

    let ascending = lifecycle::list_my_requests(
        &pool,
        &ListRequestsQuery {
            pin_user_id: Some(7),
            order: Some(SortOrder::Asc),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(ascending[0].title, "Groceries for mum");
}

#[tokio::test]
async fn search_filters_combine_and_validate_ranges() {
    let pool = test_pool().await;
    let category = create_category(&pool, "Hunger Relief").await;
    let food = create_request(&pool, 7, "Food parcel", Some(category.id)).await;
    let ride = create_request(&pool, 7, "Ride to clinic", None).await;
    complete(&pool, 7, ride.request_id, 3).await;

    let by_category = SearchRequestsQuery {
        pin_user_id: Some(7),
        category_id: Some(category.id),
        ..Default::default()
    };
    let found = lifecycle::search_my_requests(&pool, &by_category).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].request_id, food.request_id);

    let by_status = SearchRequestsQuery {
        pin_user_id: Some(7),
        status: Some("Completed".to_string()),
        date_from: Some("2000-01-01".to_string()),
        ..Default::default()
    };
    let found = lifecycle::search_my_requests(&pool, &by_status).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].request_id, ride.request_id);

    let future = SearchRequestsQuery {
        pin_user_id: Some(7),
        date_from: Some("2999-01-01T00:00:00Z".to_string()),
        ..Default::default()
    };
    assert!(lifecycle::search_my_requests(&pool, &future).await.unwrap().is_empty());

    let inverted = SearchRequestsQuery {
        pin_user_id: Some(7),
        date_from: Some("2025-10-21".to_string()),
        date_to: Some("2025-10-20".to_string()),
        ..Default::default()
    };
    let err = lifecycle::search_my_requests(&pool, &inverted).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(ref msg) if msg.contains("start > end")));
}

#[tokio::test]
async fn owner_seven_and_csr_three_end_to_end() {
    let pool = test_pool().await;
    let category = create_category(&pool, "Transport").await;
    let request = create_request(&pool, 7, "Ride to hospital", Some(category.id)).await;

    // CSR 3이 요청을 열람하고 숏리스트에 담음
    let viewed = lifecycle::read_request(&pool, request.request_id).await.unwrap();
    assert_eq!(viewed.view_count, 1);
    carematch::services::shortlists::toggle(
        &pool,
        &ToggleShortlistInput {
            csr_id: Some(3),
            request_id: Some(request.request_id),
            notes: Some("can drive on Friday".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(lifecycle::shortlist_count(&pool, request.request_id).await.unwrap(), 1);

    // 진행 중 → 완료
    lifecycle::update_request(&pool, &status_change(7, request.request_id, "In Progress", None))
        .await
        .unwrap();
    let done = complete(&pool, 7, request.request_id, 3).await;
    assert_eq!(done.status, "Completed");
    assert_eq!(done.view_count, 1);
    assert_eq!(done.shortlist_count, 1);

    let past = lifecycle::list_past_matches(&pool, &past_query(7)).await.unwrap();
    assert_eq!(past.len(), 1);
    let record = &past[0];
    assert_eq!(record.csr_user_id, 3);
    assert_eq!(record.pin_user_id, 7);
    assert_eq!(record.request_title, "Ride to hospital");
    assert_eq!(record.location, "Tampines");
    assert_eq!(record.category_id, Some(category.id));
    assert_eq!(record.category_name.as_deref(), Some("Transport"));

    let searched = lifecycle::search_past_matches(
        &pool,
        &PastMatchQuery {
            keyword: Some("hospital".to_string()),
            ..past_query(7)
        },
    )
    .await
    .unwrap();
    assert_eq!(searched.len(), 1);
    assert!(lifecycle::list_past_matches(&pool, &past_query(8))
        .await
        .unwrap()
        .is_empty());

    // 매치 단위 되돌리기: 요청은 In Progress, 매치는 삭제
    let summary = lifecycle::undo_match(&pool, record.match_id, Some(7)).await.unwrap();
    assert!(summary.success);
    assert!(summary.request_updated);
    assert!(summary.match_deleted);
    assert_eq!(summary.request_id, request.request_id);

    let mut conn = pool.acquire().await.unwrap();
    let reopened = db::get_request(&mut conn, request.request_id, Some(7))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reopened.status, "In Progress");
    drop(conn);
    assert!(lifecycle::list_past_matches(&pool, &past_query(7))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn match_lookups_are_owner_scoped() {
    let pool = test_pool().await;
    let request = create_request(&pool, 7, "Groceries", None).await;
    complete(&pool, 7, request.request_id, 3).await;
    let match_id = matches_for(&pool, request.request_id).await[0].match_id;

    assert!(matches!(
        lifecycle::get_match(&pool, match_id, Some(8)).await,
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        lifecycle::undo_match(&pool, match_id, Some(8)).await,
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        lifecycle::delete_match(&pool, match_id, Some(8)).await,
        Err(AppError::NotFound)
    ));

    let snapshot = lifecycle::delete_match(&pool, match_id, Some(7)).await.unwrap();
    assert_eq!(snapshot.match_id, match_id);
    assert!(matches!(
        lifecycle::get_match(&pool, match_id, None).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn ensure_completed_backfills_missing_completion_date() {
    let pool = test_pool().await;
    let request = create_request(&pool, 7, "Groceries", None).await;

    let mut conn = pool.acquire().await.unwrap();
    let inserted = sqlx::query(
        "INSERT INTO matches (request_id, pin_user_id, csr_user_id, service_date, completion_date, status)
         VALUES (?, 7, 3, '2025-01-15', NULL, 'Completed')",
    )
    .bind(request.request_id)
    .execute(&mut *conn)
    .await
    .unwrap()
    .last_insert_rowid();

    // 이미 있으면 CSR이 없어도 기존 매치를 돌려줌
    let match_id = db::ensure_completed(&mut conn, request.request_id, 7, None, None, None)
        .await
        .unwrap();
    assert_eq!(match_id, inserted);

    let found = db::get_match(&mut conn, match_id, Some(7)).await.unwrap().unwrap();
    assert!(found.completion_date.is_some());
    assert_eq!(found.service_date, "2025-01-15");
}

#[tokio::test]
async fn ensure_completed_requires_csr_for_a_new_match() {
    let pool = test_pool().await;
    let request = create_request(&pool, 7, "Groceries", None).await;

    let mut conn = pool.acquire().await.unwrap();
    let err = db::ensure_completed(&mut conn, request.request_id, 7, None, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let id = db::ensure_completed(
        &mut conn,
        request.request_id,
        7,
        Some(3),
        Some("2025-03-01"),
        Some("2025-03-01T10:00:00.000Z"),
    )
    .await
    .unwrap();
    let again = db::ensure_completed(&mut conn, request.request_id, 7, Some(4), None, None)
        .await
        .unwrap();
    assert_eq!(id, again);

    let found = db::get_match(&mut conn, id, None).await.unwrap().unwrap();
    assert_eq!(found.csr_user_id, 3);
    assert_eq!(found.completion_date.as_deref(), Some("2025-03-01T10:00:00.000Z"));
}

#[tokio::test]
async fn past_matches_filter_by_dates_and_tolerate_status_casing() {
    let pool = test_pool().await;
    let january = create_request(&pool, 7, "January visit", None).await;
    let legacy = create_request(&pool, 7, "Legacy record", None).await;

    let mut conn = pool.acquire().await.unwrap();
    db::ensure_completed(
        &mut conn,
        january.request_id,
        7,
        Some(3),
        Some("2025-01-15"),
        Some("2025-01-16T09:30:00.000Z"),
    )
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO matches (request_id, pin_user_id, csr_user_id, service_date, completion_date, status)
         VALUES (?, 7, 3, '2025-02-10', '2025-02-11T12:00:00.000Z', ' complete ')",
    )
    .bind(legacy.request_id)
    .execute(&mut *conn)
    .await
    .unwrap();
    drop(conn);

    let all = lifecycle::list_past_matches(&pool, &past_query(7)).await.unwrap();
    assert_eq!(all.len(), 2);
    // completion_date 최신순
    assert_eq!(all[0].request_id, legacy.request_id);

    let in_january = PastMatchQuery {
        service_date_from: Some("2025-01-01".to_string()),
        service_date_to: Some("2025-01-31".to_string()),
        ..past_query(7)
    };
    let found = lifecycle::list_past_matches(&pool, &in_january).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].request_id, january.request_id);

    let completed_in_february = PastMatchQuery {
        completion_from: Some("2025-02-01 00:00".to_string()),
        ..past_query(7)
    };
    let found = lifecycle::list_past_matches(&pool, &completed_in_february).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].request_id, legacy.request_id);

    let inverted = PastMatchQuery {
        service_date_from: Some("2025-02-01".to_string()),
        service_date_to: Some("2025-01-01".to_string()),
        ..past_query(7)
    };
    assert!(matches!(
        lifecycle::list_past_matches(&pool, &inverted).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn active_requests_exclude_completed_and_cancelled() {
    let pool = test_pool().await;
    let open = create_request(&pool, 7, "Open groceries", None).await;
    let done = create_request(&pool, 8, "Done groceries", None).await;
    let cancelled = create_request(&pool, 9, "Cancelled groceries", None).await;
    complete(&pool, 8, done.request_id, 3).await;
    lifecycle::update_request(&pool, &status_change(9, cancelled.request_id, "Cancelled", None))
        .await
        .unwrap();

    let active = lifecycle::list_active_requests(&pool, &ActiveRequestsQuery::default())
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].request_id, open.request_id);

    let none = lifecycle::list_active_requests(
        &pool,
        &ActiveRequestsQuery {
            search: Some("wheelchair".to_string()),
        },
    )
    .await
    .unwrap();
    assert!(none.is_empty());

    assert!(matches!(
        lifecycle::read_request(&pool, 9999).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn completing_over_legacy_completed_row_does_not_duplicate() {
    let pool = test_pool().await;
    let request = create_request(&pool, 7, "Legacy ride", None).await;

    // 예전 데이터: 상태 문자열에 공백/소문자가 섞여 있음
    let mut conn = pool.acquire().await.unwrap();
    let legacy_id = sqlx::query(
        "INSERT INTO matches (request_id, pin_user_id, csr_user_id, service_date, completion_date, status)
         VALUES (?, 7, 3, '2025-03-01', '2025-03-02T08:00:00.000Z', ' completed ')",
    )
    .bind(request.request_id)
    .execute(&mut *conn)
    .await
    .unwrap()
    .last_insert_rowid();
    drop(conn);

    complete(&pool, 7, request.request_id, 3).await;

    let past = lifecycle::list_past_matches(&pool, &past_query(7)).await.unwrap();
    assert_eq!(past.len(), 1);
    assert_eq!(past[0].match_id, legacy_id);
    assert_eq!(matches_for(&pool, request.request_id).await.len(), 1);
}

#[tokio::test]
async fn ignored_insert_returns_the_surviving_match() {
    let pool = test_pool().await;
    let request = create_request(&pool, 7, "Race", None).await;
    complete(&pool, 7, request.request_id, 3).await;
    let first = matches_for(&pool, request.request_id).await;
    assert_eq!(first.len(), 1);

    let mut conn = pool.acquire().await.unwrap();

    // 동시에 늦게 도착한 호출의 INSERT: 유니크 인덱스에 막혀 무시됨
    let inserted = db::insert_completed(&mut conn, request.request_id, 7, 4, None, None)
        .await
        .unwrap();
    assert!(!inserted);

    // 무시된 쪽도 다시 읽어서 같은 ID를 받음
    let id = db::ensure_completed(&mut conn, request.request_id, 7, Some(4), None, None)
        .await
        .unwrap();
    assert_eq!(id, first[0].match_id);

    // OR IGNORE 없이 넣으면 인덱스가 직접 거부함
    let err = sqlx::query(
        "INSERT INTO matches (request_id, pin_user_id, csr_user_id, service_date, completion_date, status)
         VALUES (?, 7, 4, '2025-01-01', NULL, 'Completed')",
    )
    .bind(request.request_id)
    .execute(&mut *conn)
    .await
    .unwrap_err();
    assert!(AppError::from(err).is_unique_violation());
    drop(conn);

    let after = matches_for(&pool, request.request_id).await;
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].csr_user_id, 3);
}

#[tokio::test]
async fn keyword_search_folds_non_ascii_case() {
    let pool = test_pool().await;
    let medical = create_request(&pool, 7, "Ärztliche Hilfe", None).await;
    create_request(&pool, 7, "Groceries", None).await;

    let query = SearchRequestsQuery {
        pin_user_id: Some(7),
        keyword: Some("ärztliche".to_string()),
        ..Default::default()
    };
    let found = lifecycle::search_my_requests(&pool, &query).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].request_id, medical.request_id);

    let active = lifecycle::list_active_requests(
        &pool,
        &ActiveRequestsQuery {
            search: Some("ÄRZTLICHE".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].request_id, medical.request_id);

    complete(&pool, 7, medical.request_id, 3).await;
    let searched = lifecycle::search_past_matches(
        &pool,
        &PastMatchQuery {
            keyword: Some("ärztliche hilfe".to_string()),
            ..past_query(7)
        },
    )
    .await
    .unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].request_id, medical.request_id);
}
