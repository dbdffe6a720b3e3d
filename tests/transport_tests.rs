//! End-to-end tests driving the reqwest transport against a mock Mandrill server.

use mandrill_transport::{
    AttachmentDescriptor, MailMessage, MandrillClient, MandrillError, MandrillOptions,
    MandrillTransport, MessageOptions, SendStatus, Transport,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "md_integration_key";

async fn setup() -> (MandrillTransport, MockServer) {
    let server = MockServer::start().await;

    let client = MandrillClient::builder()
        .api_key(API_KEY)
        .base_url(server.uri())
        .build()
        .unwrap();

    (MandrillTransport::new(client), server)
}

fn mail() -> MailMessage {
    MailMessage::new()
        .from("Gary the Snail <gary@bikini.bottom>")
        .to("SpongeBob SquarePants <spongebob@bikini.bottom>, patrick@bikini.bottom")
        .cc("Squidward Tentacles <squidward@bikini.bottom>")
        .bcc("krabs@bikini.bottom")
        .subject("Meow...")
        .text("Meow!")
}

async fn last_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    serde_json::from_slice(&requests.last().unwrap().body).unwrap()
}

#[tokio::test]
async fn test_plain_send_success() {
    let (transport, server) = setup().await;

    Mock::given(method("POST"))
        .and(path("/messages/send.json"))
        .and(body_partial_json(json!({"key": API_KEY})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"email": "spongebob@bikini.bottom", "status": "sent", "_id": "abc123"},
            {"email": "patrick@bikini.bottom", "status": "queued", "_id": "abc124"},
            {"email": "squidward@bikini.bottom", "status": "rejected", "reject_reason": "unsub", "_id": "abc125"},
            {"email": "krabs@bikini.bottom", "status": "invalid", "_id": "abc126"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let info = transport.send(&mail()).await.unwrap();

    assert_eq!(info.message_id.as_deref(), Some("abc123"));
    assert_eq!(info.accepted.len(), 2);
    assert_eq!(info.rejected.len(), 2);
    assert_eq!(info.rejected[0].reason, "unsub");
    assert_eq!(info.rejected[1].reason, "invalid");
    assert_eq!(info.rejected[1].status, SendStatus::Invalid);
}

#[tokio::test]
async fn test_plain_send_payload() {
    let (transport, server) = setup().await;

    Mock::given(method("POST"))
        .and(path("/messages/send.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mail = mail()
        .attachment(AttachmentDescriptor::raw("hello world!").filename("hello.txt"))
        .attachment(
            AttachmentDescriptor::data_uri("data:image/png;base64,iVBORw0KGgo=")
                .unwrap()
                .content_id("<logo>"),
        )
        .mandrill_options(
            MandrillOptions::new().message(MessageOptions::new().preserve_recipients(true)),
        );

    transport.send(&mail).await.unwrap();
    let body = last_body(&server).await;

    assert_eq!(body["key"], API_KEY);
    let message = &body["message"];
    assert_eq!(message["from_email"], "gary@bikini.bottom");
    assert_eq!(message["from_name"], "Gary the Snail");
    assert_eq!(message["subject"], "Meow...");
    assert_eq!(message["preserve_recipients"], true);
    assert_eq!(
        message["to"],
        json!([
            {"email": "spongebob@bikini.bottom", "name": "SpongeBob SquarePants", "type": "to"},
            {"email": "patrick@bikini.bottom", "name": "", "type": "to"},
            {"email": "squidward@bikini.bottom", "name": "Squidward Tentacles", "type": "cc"},
            {"email": "krabs@bikini.bottom", "name": "", "type": "bcc"}
        ])
    );
    assert_eq!(
        message["attachments"],
        json!([{"type": "text/plain", "name": "hello.txt", "content": "aGVsbG8gd29ybGQh"}])
    );
    assert_eq!(message["images"][0]["name"], "logo");
    assert_eq!(message["images"][0]["type"], "image/png");
    assert!(body.get("template_name").is_none());
}

#[tokio::test]
async fn test_template_send() {
    let (transport, server) = setup().await;

    Mock::given(method("POST"))
        .and(path("/messages/send-template.json"))
        .and(body_partial_json(json!({
            "template_name": "krusty-krab-newsletter",
            "template_content": [{"name": "header", "content": "<h1>Krabby Patty</h1>"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"email": "spongebob@bikini.bottom", "status": "scheduled", "_id": "tpl1"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/messages/send.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let mail = mail().mandrill_options(
        MandrillOptions::new()
            .template("krusty-krab-newsletter")
            .template_content("header", "<h1>Krabby Patty</h1>"),
    );

    let info = transport.send(&mail).await.unwrap();

    assert_eq!(info.message_id.as_deref(), Some("tpl1"));
    assert_eq!(info.accepted[0].status, SendStatus::Scheduled);
}

#[tokio::test]
async fn test_template_send_without_content_sends_empty_list() {
    let (transport, server) = setup().await;

    Mock::given(method("POST"))
        .and(path("/messages/send-template.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mail = mail().mandrill_options(MandrillOptions::new().template("plain-template"));
    transport.send(&mail).await.unwrap();

    let body = last_body(&server).await;
    assert_eq!(body["template_content"], json!([]));
}

#[tokio::test]
async fn test_invalid_key() {
    let (transport, server) = setup().await;

    Mock::given(method("POST"))
        .and(path("/messages/send.json"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "status": "error",
            "code": -1,
            "name": "Invalid_Key",
            "message": "Invalid API key"
        })))
        .mount(&server)
        .await;

    let result = transport.send(&mail()).await;

    match result {
        Err(MandrillError::Authentication { message, .. }) => {
            assert_eq!(message, "Invalid API key");
        }
        other => panic!("Expected authentication error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_template() {
    let (transport, server) = setup().await;

    Mock::given(method("POST"))
        .and(path("/messages/send-template.json"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "status": "error",
            "code": 5,
            "name": "Unknown_Template",
            "message": "No such template \"missing\""
        })))
        .mount(&server)
        .await;

    let mail = mail().mandrill_options(MandrillOptions::new().template("missing"));
    let result = transport.send(&mail).await;

    assert!(matches!(result, Err(MandrillError::UnknownTemplate { .. })));
}

#[tokio::test]
async fn test_unstructured_server_error() {
    let (transport, server) = setup().await;

    Mock::given(method("POST"))
        .and(path("/messages/send.json"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let result = transport.send(&mail()).await;

    assert!(matches!(
        result,
        Err(MandrillError::Server { status_code: 503, .. })
    ));
}

#[tokio::test]
async fn test_verify() {
    let (transport, server) = setup().await;

    Mock::given(method("POST"))
        .and(path("/users/ping2.json"))
        .and(body_partial_json(json!({"key": API_KEY})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"PING": "PONG!"})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(transport.verify().await.is_ok());
}

#[tokio::test]
async fn test_invalid_message_sends_nothing() {
    let (transport, server) = setup().await;

    let mail = MailMessage::new().from("gary@bikini.bottom").subject("Meow...");
    let result = transport.send(&mail).await;

    assert!(matches!(result, Err(MandrillError::Validation { .. })));
    assert!(server.received_requests().await.unwrap().is_empty());
}
