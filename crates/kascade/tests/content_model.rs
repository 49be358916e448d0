//! Content identity, generated accessors, lookups, and edits, exercised
//! against a scripted HTTP client.

mod support;

use kascade::content::{self, MetaPathMap};
use kascade::dictpath::Seg;
use kascade::endpoint::Endpoint;
use kascade::{
    ClientError, Content, Editable, FieldError, KaSession, Program, ProgramComment,
    ProgramCommentReply, Questionable, Spinoffable, User,
};
use serde_json::json;
use support::{MockClient, body_json};

#[tokio::test]
async fn generated_accessors_resolve_declared_paths() {
    let client = MockClient::default();
    client.push_json(200, json!({"bio": "hi", "nickname": "Ben", "username": "ben"}));

    let user = User::new("kaid_1");
    assert_eq!(user.bio(&client).await.unwrap(), json!("hi"));

    let log = client.take_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].method(), http::Method::GET);
    assert_eq!(
        log[0].uri().to_string(),
        "https://www.khanacademy.org/api/internal/user/profile?kaid=kaid_1"
    );
}

#[tokio::test]
async fn every_field_access_refetches_metadata() {
    let client = MockClient::default();
    client.push_json(200, json!({"nickname": "Before"}));
    client.push_json(200, json!({"nickname": "After"}));

    let user = User::new("kaid_1");
    assert_eq!(user.name(&client).await.unwrap(), json!("Before"));
    assert_eq!(user.name(&client).await.unwrap(), json!("After"));
    assert_eq!(client.take_log().len(), 2);
}

#[tokio::test]
async fn an_accessor_whose_path_is_absent_reports_the_field() {
    let client = MockClient::default();
    client.push_json(200, json!({"nickname": "Ben"}));

    let err = User::new("kaid_1").bio(&client).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Field(FieldError::Unresolved { ref field, .. }) if field == "bio"
    ));
}

#[tokio::test]
async fn non_2xx_responses_propagate_as_http_errors() {
    let client = MockClient::default();
    client.push_json(404, json!({"error": "no such user"}));

    let err = User::new("kaid_1").bio(&client).await.unwrap_err();
    match err {
        ClientError::Http(http_err) => assert_eq!(http_err.status, 404),
        other => panic!("expected an HTTP error, got {other}"),
    }
}

#[test]
fn identity_is_the_id_alone_even_across_types() {
    let program = Program::new("shared-id");
    let comment = ProgramComment::new("shared-id", &Program::new("42"));
    assert!(program.same_content(&comment));
    assert!(comment.same_content(&program));
    assert!(!program.same_content(&Program::new("other")));
}

#[test]
fn equal_ids_make_equal_handles() {
    assert_eq!(User::new("kaid_1"), User::new("kaid_1"));
    assert_ne!(User::new("kaid_1"), User::new("kaid_2"));
}

#[test]
fn comment_equality_ignores_the_program_context() {
    let a = ProgramComment::new("kaencrypted_a", &Program::new("42"));
    let b = ProgramComment::new("kaencrypted_a", &Program::new("99"));
    assert!(a.same_content(&b));
    assert_eq!(a, b);

    let ra = ProgramCommentReply::new("kaencrypted_r", &Program::new("42"));
    let rb = ProgramCommentReply::new("kaencrypted_r", &Program::new("99"));
    assert!(ra.same_content(&rb));
    assert_eq!(ra, rb);
    assert_ne!(ra, ProgramCommentReply::new("kaencrypted_other", &Program::new("42")));
}

// A local type that redeclares an inherited field at a different path.
struct Wiki;

static WIKI_BASE: MetaPathMap = MetaPathMap {
    entries: &[("summary", &[Seg::Key("summary")])],
    parent: None,
};

static WIKI_MAP: MetaPathMap = MetaPathMap {
    entries: &[("summary", &[Seg::Key("revision"), Seg::Key("summary")])],
    parent: Some(&WIKI_BASE),
};

impl Content for Wiki {
    fn id(&self) -> &str {
        "wiki"
    }

    fn api_get(&self) -> Endpoint {
        Endpoint::get("https://example.org/wiki".to_owned())
    }

    fn path_map(&self) -> &'static MetaPathMap {
        &WIKI_MAP
    }
}

#[tokio::test]
async fn a_redeclared_field_resolves_through_the_nearest_path() {
    let client = MockClient::default();
    client.push_json(200, json!({"summary": "top", "revision": {"summary": "nested"}}));

    let value = content::field(&Wiki, &client, "summary").await.unwrap();
    assert_eq!(value, json!("nested"));
}

#[tokio::test]
async fn lookup_by_username_queries_the_profile_endpoint() {
    let client = MockClient::default();
    client.push_json(200, json!({"kaid": "kaid_42", "username": "ben"}));

    let user = User::from_username(&client, "ben").await.unwrap();
    assert_eq!(user.kaid(), "kaid_42");

    let log = client.take_log();
    assert_eq!(
        log[0].uri().to_string(),
        "https://www.khanacademy.org/api/internal/user/profile?username=ben"
    );
}

#[tokio::test]
async fn edit_submits_the_whole_document_with_named_fields_changed() {
    let client = MockClient::default();
    client.push_json(
        200,
        json!({
            "title": "Old title",
            "url": "https://www.khanacademy.org/cs/old/42",
            "imageUrl": "https://cdn.example/shot.png",
            "revision": {"code": "draw();"},
            "width": 400,
        }),
    );
    client.push_json(200, json!({}));

    let program = Program::new("42");
    program
        .edit(&client, &[("title", json!("New title"))])
        .await
        .unwrap();

    let log = client.take_log();
    assert_eq!(log.len(), 2);

    let put = &log[1];
    assert_eq!(put.method(), http::Method::PUT);
    assert_eq!(
        put.uri().to_string(),
        "https://www.khanacademy.org/api/internal/scratchpads/42"
    );
    assert_eq!(put.headers()[http::header::CONTENT_TYPE], "application/json");

    let body = body_json(put);
    assert_eq!(body["title"], json!("New title"));
    // untouched fields ride along unchanged
    assert_eq!(body["revision"]["code"], json!("draw();"));
    assert_eq!(body["width"], json!(400));
    // the top-level imageUrl was mirrored under revision before submission
    assert_eq!(body["revision"]["imageUrl"], json!("https://cdn.example/shot.png"));
}

#[tokio::test]
async fn editing_an_undeclared_field_fails_before_submitting() {
    let client = MockClient::default();
    client.push_json(200, json!({"title": "Old title"}));

    let err = Program::new("42")
        .edit(&client, &[("flavor", json!("grape"))])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Field(FieldError::Unknown { ref field }) if field == "flavor"
    ));
    // only the metadata fetch went out
    assert_eq!(client.take_log().len(), 1);
}

#[tokio::test]
async fn profile_edits_post_instead_of_put() {
    let client = MockClient::default();
    client.push_json(200, json!({"bio": "old", "nickname": "Ben"}));
    client.push_json(200, json!({}));

    let user = User::new("kaid_1");
    user.edit(&client, &[("bio", json!("new bio"))]).await.unwrap();

    let log = client.take_log();
    let post = &log[1];
    assert_eq!(post.method(), http::Method::POST);
    assert_eq!(
        post.uri().to_string(),
        "https://www.khanacademy.org/api/internal/user/profile"
    );
    let body = body_json(post);
    assert_eq!(body["bio"], json!("new bio"));
    assert_eq!(body["nickname"], json!("Ben"));
}

#[tokio::test]
async fn declared_but_unimplemented_capabilities_fail_loudly() {
    let client = MockClient::default();
    let program = Program::new("42");

    let errors = [
        program.ask_question(&client, "how?").await.unwrap_err(),
        program.questions(&client).await.unwrap_err(),
        program.spinoff(&client).await.unwrap_err(),
        program.spinoffs(&client).await.unwrap_err(),
    ];
    for err in errors {
        assert!(matches!(err, ClientError::Unimplemented { .. }), "{err}");
    }
    // none of them touched the network
    assert!(client.take_log().is_empty());
}

#[tokio::test]
async fn sessions_expose_the_logged_in_user() {
    let client = MockClient::default();
    client.push_json(200, json!({"kaid": "kaid_me", "email": "me@example.org"}));

    let session = KaSession::new(client.clone());
    let user = session.user().await.unwrap();
    assert_eq!(user.kaid(), "kaid_me");

    let log = client.take_log();
    assert_eq!(
        log[0].uri().to_string(),
        "https://www.khanacademy.org/api/v1/user"
    );
}
