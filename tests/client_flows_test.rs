//! Client view models driven against a stub HTTP server.
//!
//! The stub counts every request it receives so the tests can assert that
//! invalid forms and missing sessions never reach the network.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use uuid::Uuid;

use smartlearn::client::auth::{LoginForm, SubmitOutcome};
use smartlearn::client::dashboard::AdminDashboard;
use smartlearn::client::ratings::RatingsBrowser;
use smartlearn::client::{ApiClient, CredentialStore, NoticeLevel, Notices, ViewState};
use smartlearn::models::rating::RatingType;
use smartlearn::models::user::UserResponse;

struct Stub {
    client: ApiClient,
    hits: Arc<AtomicUsize>,
}

impl Stub {
    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn count(State(hits): State<Arc<AtomicUsize>>, request: Request, next: Next) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);
    next.run(request).await
}

/// Serve `api` under `/api` on an ephemeral port.
async fn spawn(api: Router) -> Stub {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(hits.clone(), count));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Stub {
        client: ApiClient::new(format!("http://{addr}/api")),
        hits,
    }
}

fn signed_in() -> CredentialStore {
    let mut store = CredentialStore::default();
    let user: UserResponse = serde_json::from_value(user_json("admin")).unwrap();
    store.sign_in(user, "stub-token".to_string());
    store
}

fn user_json(role: &str) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "full_name": "Test User",
        "email": "test@cug.edu.gh",
        "role": role,
        "student_id": null,
        "faculty": null,
        "program": null,
        "year_of_study": null,
        "is_active": true,
        "last_login": null,
        "created_at": "2024-09-01T08:00:00Z"
    })
}

fn stats_json() -> Value {
    json!({
        "users": { "total": 7, "students": 4, "lecturers": 2, "admins": 1, "active": 7 },
        "academic": { "courses": 3, "documents": 1, "faculties": 2, "programs": 3 },
        "community": { "announcements": 2, "discussions": 1, "replies": 3 },
        "ratings": { "total": 8, "course_ratings": 4, "lecturer_ratings": 4, "average_score": 3.25 },
        "votes": { "total": 3, "upvotes": 2, "downvotes": 1 },
        "faculty": [ { "label": "Engineering", "count": 3 }, { "label": "Business", "count": 1 } ],
        "program": [ { "label": "Computer Science", "count": 2 } ],
        "year": [ { "label": "2", "count": 1 } ]
    })
}

fn rating_json(kind: &str, name: &str, semester: &str) -> Value {
    let mut rating = json!({
        "id": Uuid::new_v4(),
        "reviewer_id": null,
        "reviewer_name": null,
        "is_anonymous": true,
        "type": kind,
        "semester": semester,
        "score": 4,
        "comment": null,
        "clarity": null,
        "engagement": null,
        "organization": null,
        "fairness": null,
        "created_at": "2024-10-01T10:00:00Z"
    });
    let fields = if kind == "course" {
        [("course_id", json!(Uuid::new_v4())), ("course_name", json!(name))]
    } else {
        [("lecturer_id", json!(Uuid::new_v4())), ("lecturer_name", json!(name))]
    };
    for (key, value) in fields {
        rating[key] = value;
    }
    rating
}

#[tokio::test]
async fn dashboard_loads_stats_with_one_request() {
    let stub = spawn(Router::new().route(
        "/stats/admin",
        get(|| async { Json(json!({ "success": true, "data": stats_json() })) }),
    ))
    .await;

    let mut dashboard = AdminDashboard::new();
    assert!(dashboard.state().is_loading());
    dashboard.mount(&stub.client, &signed_in()).await;

    let stats = dashboard.stats().expect("stats loaded");
    assert_eq!(stats.users.total, 7);
    assert_eq!(stats.ratings.average_score, 3.25);
    assert_eq!(stats.faculty[0].label, "Engineering");
    assert!(dashboard.notices().all().is_empty());
    assert_eq!(stub.hits(), 1);
}

#[tokio::test]
async fn dashboard_treats_success_false_as_failure() {
    let stub = spawn(Router::new().route(
        "/stats/admin",
        get(|| async { Json(json!({ "success": false, "message": "Stats unavailable" })) }),
    ))
    .await;

    let mut dashboard = AdminDashboard::new();
    dashboard.mount(&stub.client, &signed_in()).await;

    assert!(dashboard.stats().is_none());
    let errors: Vec<_> = dashboard.notices().errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Stats unavailable");
    assert_eq!(stub.hits(), 1);
}

#[tokio::test]
async fn dashboard_fails_on_server_error_without_retrying() {
    let stub = spawn(Router::new().route(
        "/stats/admin",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "An internal error occurred" })),
            )
                .into_response()
        }),
    ))
    .await;

    let mut dashboard = AdminDashboard::new();
    dashboard.mount(&stub.client, &signed_in()).await;

    assert_eq!(
        dashboard.state(),
        &ViewState::Failed("An internal error occurred".to_string())
    );
    assert_eq!(dashboard.notices().errors().count(), 1);
    assert_eq!(stub.hits(), 1);
}

#[tokio::test]
async fn dashboard_without_session_sends_nothing() {
    let stub = spawn(Router::new().route(
        "/stats/admin",
        get(|| async { Json(json!({ "success": true, "data": stats_json() })) }),
    ))
    .await;

    let mut dashboard = AdminDashboard::new();
    dashboard.mount(&stub.client, &CredentialStore::default()).await;

    assert!(matches!(dashboard.state(), ViewState::Failed(_)));
    assert_eq!(dashboard.notices().errors().count(), 1);
    assert_eq!(stub.hits(), 0);
}

#[tokio::test]
async fn invalid_login_form_never_reaches_server() {
    let stub = spawn(Router::new().route(
        "/auth/login",
        post(|| async { Json(json!({ "success": false })) }),
    ))
    .await;

    let mut store = CredentialStore::default();
    let mut notices = Notices::default();
    let outcome = LoginForm::new("a@b.com", "short")
        .submit(&stub.client, &mut store, &mut notices)
        .await;

    match outcome {
        SubmitOutcome::Invalid(errors) => {
            assert!(errors.contains_key("password"));
            assert!(!errors.contains_key("email"));
        }
        other => panic!("expected Invalid, got {other:?}"),
    }
    assert_eq!(stub.hits(), 0);
    assert!(store.token().is_none());
}

#[tokio::test]
async fn rejected_login_shows_server_message_once() {
    let stub = spawn(Router::new().route(
        "/auth/login",
        post(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "success": false, "message": "Invalid credentials", "code": "INVALID_CREDENTIALS" })),
            )
                .into_response()
        }),
    ))
    .await;

    let mut store = CredentialStore::default();
    let mut notices = Notices::default();
    let outcome = LoginForm::new("ama@cug.edu.gh", "wrong-password")
        .submit(&stub.client, &mut store, &mut notices)
        .await;

    assert_eq!(outcome, SubmitOutcome::Failed("Invalid credentials".to_string()));
    let all = notices.all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].level, NoticeLevel::Error);
    assert_eq!(all[0].message, "Invalid credentials");
    assert!(store.token().is_none());
    assert!(store.user().is_none());
    assert_eq!(stub.hits(), 1);
}

#[tokio::test]
async fn successful_login_stores_session_and_redirects_by_role() {
    let stub = spawn(Router::new().route(
        "/auth/login",
        post(|| async {
            Json(json!({
                "success": true,
                "data": { "user": user_json("lecturer"), "token": "issued-token" }
            }))
        }),
    ))
    .await;

    let mut store = CredentialStore::default();
    let mut notices = Notices::default();
    let mut form = LoginForm::new("k.boateng@cug.edu.gh", "Password123");
    form.remember_me = true;
    let outcome = form.submit(&stub.client, &mut store, &mut notices).await;

    assert_eq!(
        outcome,
        SubmitOutcome::SignedIn {
            redirect: "/lecturer/dashboard"
        }
    );
    assert_eq!(store.token(), Some("issued-token"));
    assert_eq!(store.remembered_email(), Some("k.boateng@cug.edu.gh"));

    store.sign_out();
    let refill = LoginForm::prefilled(&store);
    assert_eq!(refill.credentials.email, "k.boateng@cug.edu.gh");
    assert!(refill.remember_me);
}

#[tokio::test]
async fn ratings_browser_filters_in_memory_after_one_fetch() {
    let stub = spawn(Router::new().route(
        "/ratings",
        get(|| async {
            Json(json!({
                "success": true,
                "data": [
                    rating_json("course", "Data Structures", "2024/1"),
                    rating_json("course", "Operating Systems", "2024/2"),
                    rating_json("lecturer", "Dr. Kwame Boateng", "2024/1"),
                ]
            }))
        }),
    ))
    .await;

    let mut browser = RatingsBrowser::new();
    browser.load(&stub.client, &signed_in()).await;
    assert_eq!(browser.visible().len(), 3);
    assert_eq!(browser.semesters(), vec!["2024/1", "2024/2"]);

    browser.set_type(Some(RatingType::Course));
    assert_eq!(browser.visible().len(), 2);

    browser.set_semester(Some("2024/1".to_string()));
    let visible = browser.visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].subject.name(), "Data Structures");

    browser.set_type(None);
    browser.set_search("BOATENG");
    let visible = browser.visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].subject.kind(), RatingType::Lecturer);

    browser.set_search("   ");
    browser.set_semester(None);
    assert_eq!(browser.visible().len(), 3);

    assert_eq!(stub.hits(), 1);
}
