//! Purpose: Typed client for the CMS content endpoints.
//! Exports: `Client`.
//! Role: Builds requests from `ClientConfig`, sends them through a `Transport`, and
//! turns response envelopes into content entities.
//! Invariants: Every request carries the token/version headers and locale/os/device_id query.
//! Invariants: Envelope `status_code != 0` is always an `ErrorKind::Api` failure.
//! Invariants: Entities keep payload order; nothing is sorted implicitly.
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::auth::{MemoryTokenStore, TokenStore};
use super::config::ClientConfig;
use super::parameter::{Parameter, merge_pair, query_pairs};
use super::transport::{ApiRequest, ApiResponse, Method, Transport, UreqTransport};
use crate::core::content::{Block, PaginationInfo, Project, Section};
use crate::core::decode::{self, ElementDecodable};
use crate::core::element::{Element, elements_from_map};
use crate::core::error::{Error, ErrorKind};

type ApiResult<T> = Result<T, Error>;

pub const CLIENT_OS: &str = "rust";

pub struct Client<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
    tokens: Arc<dyn TokenStore>,
}

impl Client<UreqTransport> {
    /// Client over the default HTTP transport.
    pub fn connect(config: ClientConfig) -> Self {
        Self::new(config, UreqTransport::new())
    }
}

impl<T: Transport> Client<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            tokens: Arc::new(MemoryTokenStore::new()),
        }
    }

    pub fn with_token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn token_store(&self) -> &dyn TokenStore {
        self.tokens.as_ref()
    }

    pub fn get_project(&self, include_contracts: bool) -> ApiResult<Project> {
        let mut query = Vec::new();
        if include_contracts {
            query.push(include("contracts"));
        }
        let payload = self.get("project", query)?;
        Ok(Project::from_payload(&Value::Object(payload)))
    }

    pub fn get_blocks(
        &self,
        parameters: &[Parameter],
        include_sections: bool,
        include_elements: bool,
    ) -> ApiResult<(Vec<Block>, PaginationInfo)> {
        let mut query = query_pairs(parameters);
        if let Some(value) = block_include(include_sections, include_elements) {
            let (key, value) = include(value);
            merge_pair(&mut query, key, value);
        }
        let payload = self.get("blocks", query)?;
        let blocks = items(&payload).map(Block::from_payload).collect();
        Ok((blocks, pagination(&payload)))
    }

    pub fn get_block(
        &self,
        block_id: i64,
        parameters: &[Parameter],
        include_sections: bool,
        include_elements: bool,
    ) -> ApiResult<Block> {
        let mut query = query_pairs(parameters);
        if let Some(value) = block_include(include_sections, include_elements) {
            let (key, value) = include(value);
            merge_pair(&mut query, key, value);
        }
        let payload = self.get(&format!("blocks/{block_id}"), query)?;
        Ok(Block::from_payload(&Value::Object(payload)))
    }

    pub fn get_sections(
        &self,
        block_id: i64,
        parameters: &[Parameter],
        include_elements: bool,
    ) -> ApiResult<(Vec<Section>, PaginationInfo)> {
        let mut query = query_pairs(parameters);
        if include_elements {
            let (key, value) = include("elements");
            merge_pair(&mut query, key, value);
        }
        let payload = self.get(&format!("blocks/{block_id}/sections"), query)?;
        let sections = items(&payload).map(Section::from_payload).collect();
        Ok((sections, pagination(&payload)))
    }

    pub fn get_section(&self, section_id: i64, include_elements: bool) -> ApiResult<Section> {
        let mut query = Vec::new();
        if include_elements {
            query.push(include("elements"));
        }
        let payload = self.get(&format!("sections/{section_id}"), query)?;
        Ok(Section::from_payload(&Value::Object(payload)))
    }

    /// Element map of a section, keyed by element name.
    pub fn get_elements(&self, section_id: i64) -> ApiResult<HashMap<String, Element>> {
        let payload = self.get(&format!("sections/{section_id}/elements"), Vec::new())?;
        Ok(match payload.get("items") {
            Some(Value::Object(entries)) => elements_from_map(entries),
            _ => HashMap::new(),
        })
    }

    pub fn decode_section<R: ElementDecodable>(&self, section_id: i64) -> ApiResult<R> {
        let elements = self.get_elements(section_id)?;
        Ok(decode::decode::<R>(&elements)?)
    }

    fn get(&self, path: &str, query: Vec<(String, String)>) -> ApiResult<Map<String, Value>> {
        let request = self.build_request(Method::Get, path, query)?;
        tracing::debug!(method = %request.method, path, "sending request");
        let response = self.transport.send(&request)?;
        self.refresh_token(&response);
        parse_envelope(&response).inspect_err(|err| {
            tracing::warn!(path, status = response.status, error = %err, "request failed");
        })
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
    ) -> ApiResult<ApiRequest> {
        let mut request = ApiRequest::new(method, self.config.endpoint(path)?);
        request.headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            (
                "X-MBurger-Token".to_string(),
                self.config.api_token().to_string(),
            ),
            (
                "X-MBurger-Version".to_string(),
                self.config.api_version().to_string(),
            ),
        ];
        if let Some(token) = self.tokens.token() {
            request
                .headers
                .push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        request.query = query;
        let defaults = [
            ("locale", self.config.locale()),
            ("os", CLIENT_OS),
            ("device_id", self.config.device_id()),
        ];
        for (key, value) in defaults {
            merge_pair(&mut request.query, key.to_string(), value.to_string());
        }
        Ok(request)
    }

    fn refresh_token(&self, response: &ApiResponse) {
        if self.tokens.token().is_none() {
            return;
        }
        let Some(header) = response.header("Authorization") else {
            return;
        };
        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
        if !token.is_empty() {
            tracing::debug!("refreshed access token from response");
            self.tokens.save(token);
        }
    }
}

fn include(value: &str) -> (String, String) {
    ("include".to_string(), value.to_string())
}

fn block_include(sections: bool, elements: bool) -> Option<&'static str> {
    match (sections, elements) {
        (false, _) => None,
        (true, false) => Some("sections"),
        (true, true) => Some("sections.elements"),
    }
}

fn items(payload: &Map<String, Value>) -> impl Iterator<Item = &Value> {
    payload
        .get("items")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn pagination(payload: &Map<String, Value>) -> PaginationInfo {
    PaginationInfo::from_payload(payload.get("meta").unwrap_or(&Value::Null))
}

/// Unwraps the `{status_code, message, body}` envelope.
pub(crate) fn parse_envelope(response: &ApiResponse) -> ApiResult<Map<String, Value>> {
    let parsed = serde_json::from_str::<Value>(&response.body);
    let object = match parsed {
        Ok(Value::Object(object)) => object,
        Ok(_) if !response.is_success() => return Err(status_error(response.status)),
        Ok(_) => {
            return Err(
                Error::new(ErrorKind::Internal).with_message("response json is not an object")
            );
        }
        Err(_) if !response.is_success() => return Err(status_error(response.status)),
        Err(err) => {
            return Err(Error::new(ErrorKind::Internal)
                .with_message("invalid response json")
                .with_source(err));
        }
    };

    let status_code = object.get("status_code").and_then(Value::as_i64).unwrap_or(0);
    let message = object
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);
    if status_code != 0 {
        let mut err = Error::new(ErrorKind::Api).with_status(status_code);
        if let Some(message) = message {
            err = err.with_message(message);
        }
        return Err(err);
    }
    if !response.is_success() {
        let mut err = status_error(response.status);
        if let Some(message) = message {
            err = err.with_message(message);
        }
        return Err(err);
    }

    let mut object = object;
    match object.remove("body") {
        Some(Value::Object(body)) => Ok(body),
        Some(other) => {
            object.insert("body".to_string(), other);
            Ok(object)
        }
        None => Ok(object),
    }
}

fn status_error(status: u16) -> Error {
    Error::new(error_kind_from_status(status))
        .with_message(format!("request failed with http status {status}"))
        .with_status(i64::from(status))
}

fn error_kind_from_status(status: u16) -> ErrorKind {
    match status {
        401 | 403 => ErrorKind::Permission,
        404 => ErrorKind::NotFound,
        400..=499 => ErrorKind::Usage,
        500..=599 => ErrorKind::Internal,
        _ => ErrorKind::Io,
    }
}
