// Client behavior over a scripted in-memory transport.
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use cmskit::api::{
    ApiRequest, ApiResponse, Client, ClientConfig, Error, ErrorKind, ImageFormat,
    MemoryTokenStore, Parameter, TokenStore, Transport,
};
use cmskit::core::decode::{Decoder, DecodingError, ElementDecodable};
use cmskit::core::element::ElementType;
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Recording {
    requests: Arc<Mutex<Vec<ApiRequest>>>,
    responses: Arc<Mutex<VecDeque<ApiResponse>>>,
}

impl Recording {
    fn push(&self, response: ApiResponse) {
        self.responses.lock().expect("lock").push_back(response);
    }

    fn push_body(&self, body: Value) {
        self.push(ApiResponse::new(
            200,
            json!({"status_code": 0, "body": body}).to_string(),
        ));
    }

    fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

impl Transport for Recording {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, Error> {
        self.requests.lock().expect("lock").push(request.clone());
        self.responses
            .lock()
            .expect("lock")
            .pop_front()
            .ok_or_else(|| Error::new(ErrorKind::Io).with_message("connection refused"))
    }
}

fn client(transport: &Recording) -> Client<Recording> {
    let config = ClientConfig::new("project-token")
        .expect("config")
        .with_base_url("https://cms.example.test/api/")
        .expect("base url")
        .with_locale("en")
        .with_device_id("abc123");
    Client::new(config, transport.clone())
}

#[test]
fn sections_request_merges_parameters_and_includes() {
    let transport = Recording::default();
    transport.push_body(json!({
        "items": [
            {"id": 11, "order": 2, "available_at": 10, "in_evidence": false, "elements": {
                "title": {"id": 1, "name": "title", "type": "text", "value": "Second"}
            }},
            {"id": 10, "order": 1, "available_at": 5, "in_evidence": true}
        ],
        "meta": {"from": 0, "to": 2, "total": 2}
    }));
    let client = client(&transport);
    let (sections, meta) = client
        .get_sections(
            4,
            &[
                Parameter::sort("order", false),
                Parameter::ImageFormat(ImageFormat::Medium),
                Parameter::Pagination { skip: 0, take: 2 },
            ],
            true,
        )
        .expect("sections");

    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].section_id, 11);
    assert_eq!(
        sections[0].element("title").map(|element| element.element_type()),
        Some(ElementType::Text)
    );
    assert!(sections[1].elements.is_none());
    assert!(!meta.has_more());

    let request = &transport.requests()[0];
    assert_eq!(
        request.url.as_str(),
        "https://cms.example.test/api/blocks/4/sections"
    );
    let query: Vec<(&str, &str)> = request
        .query
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    assert_eq!(
        query,
        vec![
            ("sort", "-order"),
            ("image_format", "medium"),
            ("skip", "0"),
            ("take", "2"),
            ("include", "elements"),
            ("locale", "en"),
            ("os", "rust"),
            ("device_id", "abc123"),
        ]
    );
}

#[test]
fn block_detail_includes_nested_sections() {
    let transport = Recording::default();
    transport.push_body(json!({
        "id": 7, "title": "Home", "subtitle": "", "order": 1,
        "sections": [{"id": 2, "order": 2}, {"id": 1, "order": 1}]
    }));
    let block = client(&transport)
        .get_block(7, &[], true, false)
        .expect("block");
    assert_eq!(block.block_id, 7);
    let order: Vec<i64> = block
        .sorted_sections()
        .iter()
        .map(|section| section.section_id)
        .collect();
    assert_eq!(order, vec![1, 2]);
    let request = &transport.requests()[0];
    assert_eq!(request.url.path(), "/api/blocks/7");
    assert_eq!(request.query_value("include"), Some("sections"));
}

#[test]
fn project_with_contracts() {
    let transport = Recording::default();
    transport.push_body(json!({
        "id": 1, "name": "Demo",
        "contracts": [{"id": 9, "name": "Privacy", "link": "https://x.test/p", "active": true,
                       "created_at": 100, "updated_at": 200}]
    }));
    let project = client(&transport).get_project(true).expect("project");
    assert_eq!(project.project_name, "Demo");
    let contracts = project.contracts.expect("contracts");
    assert_eq!(contracts[0].contract_id, 9);
    assert!(contracts[0].active);
    assert_eq!(contracts[0].updated_at.unix_timestamp(), 200);
}

struct Promo {
    headline: String,
    visible: bool,
}

impl ElementDecodable for Promo {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodingError> {
        let container = decoder.container();
        Ok(Self {
            headline: container.decode("headline")?,
            visible: container.decode("visible")?,
        })
    }
}

#[test]
fn decode_section_fetches_elements_then_decodes() {
    let transport = Recording::default();
    transport.push_body(json!({"items": {
        "headline": {"id": 1, "name": "headline", "type": "markdown", "value": "# Sale"},
        "visible": {"id": 2, "name": "visible", "type": "checkbox", "value": false}
    }}));
    let promo: Promo = client(&transport).decode_section(31).expect("promo");
    assert_eq!(promo.headline, "# Sale");
    assert!(!promo.visible);
    assert_eq!(
        transport.requests()[0].url.path(),
        "/api/sections/31/elements"
    );

    transport.push_body(json!({"items": {
        "headline": {"id": 1, "name": "headline", "type": "text", "value": "x"},
        "visible": {"id": 2, "name": "visible", "type": "text", "value": "yes"}
    }}));
    let err = client(&transport)
        .decode_section::<Promo>(31)
        .err()
        .expect("mismatch");
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn api_errors_carry_status_and_message() {
    let transport = Recording::default();
    transport.push(ApiResponse::new(
        403,
        json!({"status_code": 403, "message": "invalid token"}).to_string(),
    ));
    let err = client(&transport).get_section(1, false).expect_err("forbidden");
    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.message(), Some("invalid token"));

    transport.push(ApiResponse::new(502, "<html>bad gateway</html>"));
    let err = client(&transport).get_section(1, false).expect_err("gateway");
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(err.status(), Some(502));
}

#[test]
fn token_store_is_shared_with_the_caller() {
    let transport = Recording::default();
    transport.push(
        ApiResponse::new(200, json!({"status_code": 0, "body": {"id": 1}}).to_string())
            .with_header("Authorization", "next-token"),
    );
    transport.push_body(json!({"id": 1}));
    let tokens = Arc::new(MemoryTokenStore::with_token("first-token"));
    let client = client(&transport).with_token_store(tokens.clone());

    client.get_section(1, false).expect("first");
    client.get_section(1, false).expect("second");
    let requests = transport.requests();
    assert_eq!(requests[0].header("Authorization"), Some("Bearer first-token"));
    assert_eq!(requests[1].header("Authorization"), Some("Bearer next-token"));

    tokens.clear();
    transport.push_body(json!({"id": 1}));
    client.get_section(1, false).expect("third");
    assert_eq!(transport.requests()[2].header("Authorization"), None);
}
