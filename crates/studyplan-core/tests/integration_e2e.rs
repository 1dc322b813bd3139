//! E2E tests for the remote collaborators.
//!
//! Both clients take a base URL, so they run against a local mockito server
//! without credentials or network access.
//!
//! | Service | Operation      | Covered                                              |
//! |---------|----------------|------------------------------------------------------|
//! | Udemy   | fetch_course   | slug -> id -> curriculum -> CourseData, HTTP errors  |
//! | Trello  | export_plan    | board, labels, day lists, cards, checklists, items   |

use std::time::Duration;

use mockito::{Matcher, Server};
use serde_json::json;
use studyplan_core::{build_plan, CoreError, CurriculumClient, Lesson, TrelloClient, TrelloCredentials};

// ============================================================================
// Udemy
// ============================================================================

fn curriculum_body() -> String {
    json!({
        "curriculum_context": {
            "data": {
                "title": "Understanding TypeScript",
                "sections": [
                    {
                        "title": "Getting Started",
                        "content_length": 2445,
                        "items": [
                            {"title": "How to Get Help", "content_summary": "10:30"},
                            {"title": "Join Our Community!", "content_summary": "05:15"},
                            {"title": "Course Resources", "content_length": 1500}
                        ]
                    },
                    {
                        "name": "What is a Type System?",
                        "items": [
                            {"title": "Do Not Skip - Course Overview", "content_summary": "45:00"},
                            {"title": "Types", "content_summary": "30:00"},
                            {"title": "Quiz", "content_summary": "4 questions"}
                        ]
                    }
                ]
            }
        }
    })
    .to_string()
}

#[tokio::test]
async fn udemy_fetch_course_resolves_slug_and_transforms() {
    let mut server = Server::new_async().await;

    let meta = server
        .mock("GET", "/api-2.0/courses/understanding-typescript/")
        .match_query(Matcher::UrlEncoded("fields[course]".into(), "id,title".into()))
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 947098, "title": "Understanding TypeScript - 2025 Edition"}"#)
        .create_async()
        .await;

    let curriculum = server
        .mock("GET", "/api-2.0/course-landing-components/947098/me/")
        .match_query(Matcher::UrlEncoded("components".into(), "curriculum_context".into()))
        .with_header("content-type", "application/json")
        .with_body(curriculum_body())
        .create_async()
        .await;

    let client = CurriculumClient::new(server.url());
    let course = client
        .fetch_course("https://www.udemy.com/course/understanding-typescript/learn/lecture/1")
        .await
        .unwrap();

    meta.assert_async().await;
    curriculum.assert_async().await;

    assert_eq!(
        course.course_title.as_deref(),
        Some("Understanding TypeScript - 2025 Edition")
    );
    assert_eq!(course.sections.len(), 2);
    assert_eq!(course.sections[0].time_required.as_deref(), Some("40:45"));
    assert_eq!(course.sections[1].title, "What is a Type System?");

    let lessons = course.lessons();
    assert_eq!(lessons.len(), 6);
    assert_eq!(lessons[2].duration, "25:00");
    assert_eq!(lessons[3].id, "1-0-Do Not Skip - Course Overview");

    let plan = build_plan(&lessons, 1.0);
    let totals: Vec<u64> = plan.iter().map(|d| d.total_seconds).collect();
    assert_eq!(totals, vec![2445, 2700, 1800]);
    assert_eq!(plan[2].lessons.len(), 2, "quiz rides along for free");
}

#[tokio::test]
async fn udemy_meta_failure_reports_status_and_body() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api-2.0/courses/missing-course/")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body("Not found.")
        .create_async()
        .await;

    let client = CurriculumClient::new(server.url());
    let err = client
        .fetch_course("https://www.udemy.com/course/missing-course/")
        .await
        .unwrap_err();

    match err {
        CoreError::Integration { service, message, .. } => {
            assert_eq!(service, "udemy");
            assert!(message.contains("404"), "{message}");
            assert!(message.contains("Not found."), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn udemy_metadata_without_id_is_an_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api-2.0/courses/odd/")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(r#"{"title": "No id here"}"#)
        .create_async()
        .await;

    let client = CurriculumClient::new(server.url());
    let err = client
        .fetch_course("https://www.udemy.com/course/odd/")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Course ID not found"), "{err}");
}

#[tokio::test]
async fn udemy_rejects_url_without_slug_before_any_request() {
    let client = CurriculumClient::new("http://127.0.0.1:9");
    let err = client.fetch_course("https://www.udemy.com/").await.unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

// ============================================================================
// Trello
// ============================================================================

fn auth() -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("key".into(), "test-key".into()),
        Matcher::UrlEncoded("token".into(), "test-token".into()),
    ])
}

fn query(pairs: &[(&str, &str)]) -> Matcher {
    let mut matchers: Vec<Matcher> = pairs
        .iter()
        .map(|(k, v)| Matcher::UrlEncoded(k.to_string(), v.to_string()))
        .collect();
    matchers.push(auth());
    Matcher::AllOf(matchers)
}

fn client(server: &Server) -> TrelloClient {
    TrelloClient::new(server.url(), TrelloCredentials::new("test-key", "test-token"))
        .with_request_delay(Duration::ZERO)
}

fn lesson(id: &str, title: &str, duration: &str, section: &str) -> Lesson {
    Lesson::new(id, title, duration, Some(section.to_string()))
}

#[tokio::test]
async fn trello_export_builds_board_lists_cards_and_checklists() {
    let mut server = Server::new_async().await;

    let board = server
        .mock("POST", "/boards")
        .match_query(query(&[
            ("name", "TypeScript"),
            ("defaultLists", "false"),
            ("defaultLabels", "true"),
        ]))
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "b1", "url": "https://trello.com/b/b1/typescript"}"#)
        .expect(1)
        .create_async()
        .await;

    server
        .mock("GET", "/boards/b1/labels")
        .match_query(auth())
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id": "g1", "name": "", "color": "green"}, {"id": "r1", "name": "", "color": "red"}, {"id": "n1", "color": null}]"#)
        .create_async()
        .await;

    let day1 = server
        .mock("POST", "/lists")
        .match_query(query(&[("name", "Day 1"), ("idBoard", "b1"), ("pos", "bottom")]))
        .with_body(r#"{"id": "l1"}"#)
        .expect(1)
        .create_async()
        .await;
    let day2 = server
        .mock("POST", "/lists")
        .match_query(query(&[("name", "Day 2"), ("idBoard", "b1"), ("pos", "bottom")]))
        .with_body(r#"{"id": "l2"}"#)
        .expect(1)
        .create_async()
        .await;

    // Day 1: "Intro" has a 12 minute lesson -> red label; "Setup" is short.
    let intro_card = server
        .mock("POST", "/cards")
        .match_query(query(&[("idList", "l1"), ("name", "Intro - 17m"), ("idLabels", "r1")]))
        .with_body(r#"{"id": "c1"}"#)
        .expect(1)
        .create_async()
        .await;
    let setup_card = server
        .mock("POST", "/cards")
        .match_query(query(&[("idList", "l1"), ("name", "Setup - 8m")]))
        .with_body(r#"{"id": "c2"}"#)
        .expect(1)
        .create_async()
        .await;
    let day2_card = server
        .mock("POST", "/cards")
        .match_query(query(&[("idList", "l2"), ("name", "Setup - 50m"), ("idLabels", "r1")]))
        .with_body(r#"{"id": "c3"}"#)
        .expect(1)
        .create_async()
        .await;

    let checklists = server
        .mock("POST", "/checklists")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("name".into(), "Lessons".into()),
            Matcher::Regex("idCard=c[123]".into()),
            auth(),
        ]))
        .with_body(r#"{"id": "k1"}"#)
        .expect(3)
        .create_async()
        .await;

    let welcome_item = server
        .mock("POST", "/checklists/k1/checkItems")
        .match_query(query(&[("name", "Welcome - 12:00")]))
        .with_body(r#"{"id": "i1"}"#)
        .expect(1)
        .create_async()
        .await;
    let other_items = server
        .mock("POST", "/checklists/k1/checkItems")
        .match_query(Matcher::AllOf(vec![
            Matcher::Regex("name=(Tour|Install|Configure)".into()),
            auth(),
        ]))
        .with_body(r#"{"id": "i2"}"#)
        .expect(3)
        .create_async()
        .await;

    let lessons = vec![
        lesson("0-0", "Welcome", "12:00", "Intro"),
        lesson("0-1", "Tour", "5:00", "Intro"),
        lesson("1-0", "Install", "8:00", "Setup"),
        lesson("1-1", "Configure", "50:00", "Setup"),
    ];
    let plan = build_plan(&lessons, 0.5);
    assert_eq!(plan.len(), 2);

    let summary = client(&server).export_plan("TypeScript", &plan).await.unwrap();

    board.assert_async().await;
    day1.assert_async().await;
    day2.assert_async().await;
    intro_card.assert_async().await;
    setup_card.assert_async().await;
    day2_card.assert_async().await;
    checklists.assert_async().await;
    welcome_item.assert_async().await;
    other_items.assert_async().await;

    assert_eq!(summary.board_id, "b1");
    assert_eq!(summary.board_url, "https://trello.com/b/b1/typescript");
    assert_eq!(summary.lists, 2);
    assert_eq!(summary.cards, 3);
    assert_eq!(summary.check_items, 4);
    assert_eq!(summary.failed_check_items, 0);
}

#[tokio::test]
async fn trello_board_failure_surfaces_trello_message() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/boards")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body("invalid key")
        .create_async()
        .await;

    let plan = build_plan(&[lesson("a", "A", "5:00", "S")], 1.0);
    let err = client(&server).export_plan("Course", &plan).await.unwrap_err();
    assert!(err.to_string().contains("invalid key"), "{err}");
}

#[tokio::test]
async fn trello_failed_check_items_are_counted_not_fatal() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/boards")
        .match_query(Matcher::Any)
        .with_body(r#"{"id": "b1", "url": "u"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/boards/b1/labels")
        .match_query(Matcher::Any)
        .with_body("[]")
        .create_async()
        .await;
    server
        .mock("POST", "/lists")
        .match_query(Matcher::Any)
        .with_body(r#"{"id": "l1"}"#)
        .create_async()
        .await;
    let card = server
        .mock("POST", "/cards")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("name".into(), "S - 25m".into()),
            auth(),
        ]))
        .with_body(r#"{"id": "c1"}"#)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("POST", "/checklists")
        .match_query(Matcher::Any)
        .with_body(r#"{"id": "k1"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/checklists/k1/checkItems")
        .match_query(Matcher::Any)
        .with_status(429)
        .with_body("rate limited")
        .create_async()
        .await;

    // Long lesson, but the board has no red label: the card goes out unlabelled.
    let plan = build_plan(&[lesson("a", "A", "20:00", "S"), lesson("b", "B", "5:00", "S")], 1.0);
    let summary = client(&server).export_plan("Course", &plan).await.unwrap();

    card.assert_async().await;
    assert_eq!(summary.cards, 1);
    assert_eq!(summary.check_items, 0);
    assert_eq!(summary.failed_check_items, 2);
}

#[tokio::test]
async fn trello_export_validates_inputs_before_calling_out() {
    let client = TrelloClient::new("http://127.0.0.1:9", TrelloCredentials::new("k", "t"));
    let plan = build_plan(&[lesson("a", "A", "5:00", "S")], 1.0);

    assert!(matches!(
        client.export_plan("   ", &plan).await,
        Err(CoreError::Validation(_))
    ));
    assert!(matches!(
        client.export_plan("Course", &[]).await,
        Err(CoreError::Validation(_))
    ));
}

#[tokio::test]
async fn trello_verify_accepts_valid_credentials() {
    let mut server = Server::new_async().await;
    let me = server
        .mock("GET", "/members/me")
        .match_query(auth())
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "m1", "username": "learner"}"#)
        .create_async()
        .await;

    TrelloCredentials::new("test-key", "test-token")
        .verify(&server.url())
        .await
        .unwrap();
    me.assert_async().await;
}

#[tokio::test]
async fn trello_verify_rejects_bad_credentials() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/members/me")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body("invalid key")
        .create_async()
        .await;

    let err = TrelloCredentials::new("wrong", "creds")
        .verify(&server.url())
        .await
        .unwrap_err();

    match err {
        CoreError::Integration { service, message, .. } => {
            assert_eq!(service, "trello");
            assert!(message.contains("401"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}
