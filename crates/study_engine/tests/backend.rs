use pretty_assertions::assert_eq;
use serde_json::json;
use study_core::{Credential, JobId, StartRequest};
use study_engine::{BackendError, BackendSettings, JobBackend, JobStatus, ReqwestBackend};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> ReqwestBackend {
    let settings = BackendSettings::parse(&server.uri()).expect("mock uri parses");
    ReqwestBackend::new(settings).expect("client builds")
}

fn request(topic: &str) -> StartRequest {
    StartRequest {
        topic: topic.to_string(),
        credential: Credential::new("sk-test"),
    }
}

#[tokio::test]
async fn start_posts_topic_and_key_and_returns_session_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/start"))
        .and(body_json(json!({ "topic": "원격 근무", "api_key": "sk-test" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "session_id": "abc123" })))
        .expect(1)
        .mount(&server)
        .await;

    let job_id = backend_for(&server)
        .start(&request("원격 근무"))
        .await
        .expect("start ok");
    assert_eq!(job_id, JobId::new("abc123"));
}

#[tokio::test]
async fn start_error_body_is_passed_through_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/start"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "model quota exceeded" })),
        )
        .mount(&server)
        .await;

    let err = backend_for(&server).start(&request("t")).await.unwrap_err();
    assert_eq!(err, BackendError::Server("model quota exceeded".into()));
    assert_eq!(err.to_string(), "model quota exceeded");
}

#[tokio::test]
async fn start_without_session_id_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let err = backend_for(&server).start(&request("t")).await.unwrap_err();
    assert!(matches!(err, BackendError::MalformedResponse(_)), "{err:?}");
}

#[tokio::test]
async fn start_non_json_failure_reports_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/start"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = backend_for(&server).start(&request("t")).await.unwrap_err();
    assert_eq!(err, BackendError::HttpStatus(502));
}

#[tokio::test]
async fn status_decodes_running_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "running",
            "progress": 40,
            "current_step": "Step 3: 페르소나 생성",
            "logs": ["a", "b"],
            "result": null,
            "error": null
        })))
        .mount(&server)
        .await;

    let reply = backend_for(&server)
        .status(&JobId::new("abc123"))
        .await
        .expect("status ok");
    assert_eq!(reply.status, Some(JobStatus::Running));
    assert_eq!(reply.progress, Some(40));
    assert_eq!(reply.current_step.as_deref(), Some("Step 3: 페르소나 생성"));
    assert_eq!(reply.logs, Some(vec!["a".to_string(), "b".to_string()]));
    assert_eq!(reply.result, None);
}

#[tokio::test]
async fn unknown_status_string_decodes_as_other() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status/s1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "started", "progress": 0 })),
        )
        .mount(&server)
        .await;

    let reply = backend_for(&server).status(&JobId::new("s1")).await.unwrap();
    assert_eq!(reply.status, Some(JobStatus::Other("started".into())));
}

#[tokio::test]
async fn missing_session_maps_to_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status/gone"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "세션을 찾을 수 없습니다." })),
        )
        .mount(&server)
        .await;

    let err = backend_for(&server).status(&JobId::new("gone")).await.unwrap_err();
    assert_eq!(err, BackendError::Server("세션을 찾을 수 없습니다.".into()));
}

#[tokio::test]
async fn job_id_is_percent_encoded_as_one_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status/a%2Fb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "running" })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = backend_for(&server).status(&JobId::new("a/b")).await.unwrap();
    assert_eq!(reply.status, Some(JobStatus::Running));
}

#[tokio::test]
async fn connection_refused_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let settings = BackendSettings::parse(&format!("http://{addr}")).expect("url parses");
    let backend = ReqwestBackend::new(settings).expect("client builds");

    let err = backend.status(&JobId::new("x")).await.unwrap_err();
    assert!(
        matches!(err, BackendError::Network(_) | BackendError::Timeout),
        "{err:?}"
    );
}
