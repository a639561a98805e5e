use research_notes::routes::{AppState, router};
use research_notes::{GitHubContentsClient, NoteSubmitter};
use research_notes_types::{RpcResponse, ServiceStatus, SubmitResult, ValidatedNote};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NOTE_PATH: &str = "/repos/acme/research/contents/2025-11-23-aws-lambda-best-practices.md";

const DOCUMENT: &str = "---\ntitle: \"AWS Lambda Best Practices\"\ndate: 2025-11-23\ntags: [aws]\n---\n# Lambda\n";

/// Serve the RPC router on an ephemeral port, backed by `github`
async fn spawn_service(github: &MockServer) -> String {
    let client = GitHubContentsClient::new(&github.uri(), "acme", "research", "ghp_test");
    let submitter =
        NoteSubmitter::new(client, "main").with_site_url("https://acme.github.io/research");
    let state = Arc::new(AppState {
        submitter,
        repository: "acme/research".to_string(),
        start_time: Instant::now(),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_validate_structured_note() {
    let github = MockServer::start().await;
    let base = spawn_service(&github).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/rpc/validate", base))
        .json(&json!({
            "filename": "2025-11-23-aws-lambda-best-practices.md",
            "title": "AWS Lambda Best Practices",
            "date": "2025-11-23",
            "tags": ["Serverless", "AWS", "aws"],
            "body": "# Lambda\n"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let body: RpcResponse<ValidatedNote> = resp.json().await.unwrap();
    let note = body.data.unwrap();
    assert_eq!(note.path, "2025-11-23-aws-lambda-best-practices.md");
    assert_eq!(note.slug, "aws-lambda-best-practices");
    assert_eq!(note.tags, vec!["aws", "serverless"]);
    assert!(note.document.ends_with("---\n# Lambda\n"));

    // Validation never reaches the remote API
    assert!(github.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_validate_rejects_generic_slug() {
    let github = MockServer::start().await;
    let base = spawn_service(&github).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/rpc/validate", base))
        .json(&json!({ "filename": "2025-11-23-notes.md", "markdown": DOCUMENT }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let body: RpcResponse<ValidatedNote> = resp.json().await.unwrap();
    assert!(!body.success);
    assert!(body.error.unwrap().contains("Invalid slug 'notes'"));
}

#[tokio::test]
async fn test_rejected_filename_suggests_one() {
    let github = MockServer::start().await;
    let base = spawn_service(&github).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/rpc/submit", base))
        .json(&json!({
            "filename": "2025-11-23-My Research!!!.md",
            "title": "My Research!!!",
            "date": "2025-11-23",
            "body": "Findings\n"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let body: RpcResponse<SubmitResult> = resp.json().await.unwrap();
    let error = body.error.unwrap();
    assert!(error.starts_with("Invalid slug 'My Research!!!'"), "{}", error);
    assert!(error.ends_with("(suggested filename: 2025-11-23-my-research.md)"), "{}", error);
    assert!(github.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_markdown_document() {
    let github = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(NOTE_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&github)
        .await;
    Mock::given(method("PUT"))
        .and(path(NOTE_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "content": { "path": "2025-11-23-aws-lambda-best-practices.md", "sha": "blob1" },
            "commit": { "sha": "commit1" }
        })))
        .expect(1)
        .mount(&github)
        .await;

    let base = spawn_service(&github).await;
    let http = reqwest::Client::new();

    let resp = http
        .post(format!("{}/rpc/submit", base))
        .json(&json!({
            "filename": "2025-11-23-aws-lambda-best-practices.md",
            "markdown": DOCUMENT
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let body: RpcResponse<SubmitResult> = resp.json().await.unwrap();
    let result = body.data.unwrap();
    assert!(result.created);
    assert_eq!(result.commit_sha, "commit1");
    assert_eq!(result.content_sha, "blob1");
    assert_eq!(
        result.published_url.as_deref(),
        Some("https://acme.github.io/research/2025/11/23/aws-lambda-best-practices.html")
    );

    let status: RpcResponse<ServiceStatus> = http
        .get(format!("{}/rpc/status", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let status = status.data.unwrap();
    assert_eq!(status.repository, "acme/research");
    assert_eq!(status.branch, "main");
    assert_eq!(status.total_submissions, 1);
    assert_eq!(status.total_conflicts, 0);
}

#[tokio::test]
async fn test_submit_conflict_maps_to_409() {
    let github = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(NOTE_PATH))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&github)
        .await;
    Mock::given(method("GET"))
        .and(path(NOTE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "path": "2025-11-23-aws-lambda-best-practices.md",
            "sha": "theirs"
        })))
        .mount(&github)
        .await;
    Mock::given(method("PUT"))
        .and(path(NOTE_PATH))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Invalid request.\n\n\"sha\" wasn't supplied."
        })))
        .expect(1)
        .mount(&github)
        .await;

    let base = spawn_service(&github).await;
    let resp = reqwest::Client::new()
        .post(format!("{}/rpc/submit", base))
        .json(&json!({
            "filename": "2025-11-23-aws-lambda-best-practices.md",
            "markdown": DOCUMENT
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);

    let body: RpcResponse<SubmitResult> = resp.json().await.unwrap();
    assert!(body.error.unwrap().starts_with("Conflicting update"));
}
