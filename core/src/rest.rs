//! A REST resource bound to one path template.
//!
//! # Design
//! `RestClient` mirrors the build/parse split of a host-does-IO client:
//! each verb has a `build_*` method producing an `HttpRequest` and a
//! `parse_*` step consuming the `HttpResponse`. The async verbs glue the two
//! together through the injected `Transport`.
//!
//! Parameters are a flat JSON map. Keys matching a `:name` placeholder fill
//! that path segment; everything else becomes the query string. A
//! placeholder without a value is left out of the path, so the same
//! template serves both the collection and the single-item URL.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ManagerOptions;
use crate::error::{ApiError, ConfigError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Per-call parameters: path placeholders and query values.
pub type Params = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// `{base_url}/<resource path>` where path segments starting with `:` are
/// placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    base_url: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn new(base_url: &str, resource_path: &str) -> Self {
        let segments = resource_path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Placeholder(name.to_string()),
                None => Segment::Literal(s.to_string()),
            })
            .collect();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            segments,
        }
    }

    /// Render the URL path, removing every parameter used by a placeholder.
    pub fn render(&self, params: &mut Params) -> Result<String, ApiError> {
        let mut url = self.base_url.clone();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => {
                    url.push('/');
                    url.push_str(text);
                }
                Segment::Placeholder(name) => match params.remove(name) {
                    None | Some(Value::Null) => {}
                    Some(Value::String(value)) => {
                        url.push('/');
                        url.push_str(&urlencoding::encode(&value));
                    }
                    Some(Value::Number(value)) => {
                        url.push('/');
                        url.push_str(&value.to_string());
                    }
                    Some(other) => {
                        return Err(ApiError::InvalidParams(format!(
                            "path parameter {name} must be a string or number, got {other}"
                        )))
                    }
                },
            }
        }
        Ok(url)
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base_url)?;
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => write!(f, "/{text}")?,
                Segment::Placeholder(name) => write!(f, "/:{name}")?,
            }
        }
        Ok(())
    }
}

/// How query strings are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryOptions {
    /// When false an array becomes one `key=a,b` pair instead of
    /// `key=a&key=b`.
    pub repeat_params: bool,
}

/// Settings applied to every request made through a `RestClient`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RestOptions {
    pub headers: Vec<(String, String)>,
    pub query: QueryOptions,
}

/// Serialize the remaining parameters into a query string.
///
/// Keys come out in sorted order. `null` values are dropped.
pub fn encode_query(params: &Params, options: &QueryOptions) -> Option<String> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        match value {
            Value::Null => {}
            Value::Array(items) if options.repeat_params => {
                for item in items.iter().filter(|v| !v.is_null()) {
                    pairs.push((key, scalar_text(item)));
                }
            }
            Value::Array(items) => {
                let joined = items
                    .iter()
                    .filter(|v| !v.is_null())
                    .map(scalar_text)
                    .collect::<Vec<_>>()
                    .join(",");
                pairs.push((key, joined));
            }
            other => pairs.push((key, scalar_text(other))),
        }
    }
    if pairs.is_empty() {
        return None;
    }
    let query = pairs
        .into_iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(&value)))
        .collect::<Vec<_>>()
        .join("&");
    Some(query)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A path template bound to a transport.
///
/// Cloning is cheap and shares the transport.
#[derive(Debug)]
pub struct RestClient<T> {
    template: Arc<PathTemplate>,
    options: Arc<RestOptions>,
    transport: Arc<T>,
}

impl<T> Clone for RestClient<T> {
    fn clone(&self) -> Self {
        Self {
            template: Arc::clone(&self.template),
            options: Arc::clone(&self.options),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> RestClient<T> {
    pub fn new(template: PathTemplate, options: RestOptions, transport: Arc<T>) -> Self {
        Self {
            template: Arc::new(template),
            options: Arc::new(options),
            transport,
        }
    }

    /// Validate manager options and bind `resource_path` under their base
    /// URL. Array query values are never repeated.
    pub fn for_manager(
        options: &ManagerOptions,
        resource_path: &str,
        transport: Arc<T>,
    ) -> Result<Self, ConfigError> {
        options.validate()?;
        let rest_options = RestOptions {
            headers: options.headers.clone(),
            query: QueryOptions {
                repeat_params: false,
            },
        };
        Ok(Self::new(
            PathTemplate::new(&options.base_url, resource_path),
            rest_options,
            transport,
        ))
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    pub fn options(&self) -> &RestOptions {
        &self.options
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // -----------------------------------------------------------------------
    // Request building
    // -----------------------------------------------------------------------

    pub fn build_get_all(&self, params: &Params) -> Result<HttpRequest, ApiError> {
        self.build(HttpMethod::Get, params, None)
    }

    pub fn build_get(&self, params: &Params) -> Result<HttpRequest, ApiError> {
        self.build(HttpMethod::Get, params, None)
    }

    pub fn build_create<B: Serialize + ?Sized>(
        &self,
        params: &Params,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        self.build(HttpMethod::Post, params, Some(to_json(body)?))
    }

    pub fn build_patch<B: Serialize + ?Sized>(
        &self,
        params: &Params,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        self.build(HttpMethod::Patch, params, Some(to_json(body)?))
    }

    pub fn build_delete(&self, params: &Params) -> Result<HttpRequest, ApiError> {
        self.build(HttpMethod::Delete, params, None)
    }

    fn build(
        &self,
        method: HttpMethod,
        params: &Params,
        body: Option<String>,
    ) -> Result<HttpRequest, ApiError> {
        let mut remaining = params.clone();
        let mut url = self.template.render(&mut remaining)?;
        if let Some(query) = encode_query(&remaining, &self.options.query) {
            url.push('?');
            url.push_str(&query);
        }

        let mut headers = self.options.headers.clone();
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    // -----------------------------------------------------------------------
    // Verbs
    // -----------------------------------------------------------------------

    pub async fn get_all<R: DeserializeOwned>(&self, params: &Params) -> Result<R, ApiError> {
        let request = self.build_get_all(params)?;
        parse_json(self.send(request).await?)
    }

    pub async fn get<R: DeserializeOwned>(&self, params: &Params) -> Result<R, ApiError> {
        let request = self.build_get(params)?;
        parse_json(self.send(request).await?)
    }

    pub async fn create<B, R>(&self, params: &Params, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.build_create(params, body)?;
        parse_json(self.send(request).await?)
    }

    pub async fn patch<B, R>(&self, params: &Params, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.build_patch(params, body)?;
        parse_json(self.send(request).await?)
    }

    pub async fn delete(&self, params: &Params) -> Result<(), ApiError> {
        let request = self.build_delete(params)?;
        parse_empty(self.send(request).await?)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        match self.transport.execute(request).await {
            Ok(response) => {
                debug!(status = response.status, "received response");
                Ok(response)
            }
            Err(err) => {
                warn!(error = %err, "transport failed");
                Err(err)
            }
        }
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Deserialize a 2xx JSON body.
pub fn parse_json<R: DeserializeOwned>(response: HttpResponse) -> Result<R, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Accept any 2xx response and ignore its body.
pub fn parse_empty(response: HttpResponse) -> Result<(), ApiError> {
    check_status(&response)
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    match response.status {
        200..=299 => Ok(()),
        404 => Err(ApiError::NotFound),
        status => Err(ApiError::Http {
            status,
            body: response.body.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use serde_json::json;

    const BASE_URL: &str = "http://localhost:3000/api/v2";

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    fn client(repeat_params: bool) -> RestClient<RecordingTransport> {
        RestClient::new(
            PathTemplate::new(BASE_URL, "resource-servers/:id"),
            RestOptions {
                headers: vec![("authorization".to_string(), "Bearer t".to_string())],
                query: QueryOptions { repeat_params },
            },
            Arc::new(RecordingTransport::new()),
        )
    }

    #[test]
    fn template_drops_unfilled_placeholder() {
        let template = PathTemplate::new(BASE_URL, "resource-servers/:id");
        let mut p = Params::new();
        assert_eq!(template.render(&mut p).unwrap(), format!("{BASE_URL}/resource-servers"));
    }

    #[test]
    fn template_fills_and_consumes_placeholder() {
        let template = PathTemplate::new(BASE_URL, "stats/:type");
        let mut p = params(json!({ "type": "daily", "from": "20200101" }));
        assert_eq!(template.render(&mut p).unwrap(), format!("{BASE_URL}/stats/daily"));
        assert_eq!(p, params(json!({ "from": "20200101" })));
    }

    #[test]
    fn template_encodes_placeholder_values() {
        let template = PathTemplate::new(BASE_URL, "resource-servers/:id");
        let mut p = params(json!({ "id": "a/b c" }));
        assert_eq!(
            template.render(&mut p).unwrap(),
            format!("{BASE_URL}/resource-servers/a%2Fb%20c")
        );
    }

    #[test]
    fn template_rejects_structured_placeholder_values() {
        let template = PathTemplate::new(BASE_URL, "resource-servers/:id");
        let mut p = params(json!({ "id": ["a", "b"] }));
        assert!(matches!(template.render(&mut p), Err(ApiError::InvalidParams(_))));
    }

    #[test]
    fn template_strips_trailing_slash_from_base() {
        let template = PathTemplate::new("http://localhost:3000/", "stats/:type");
        assert_eq!(template.to_string(), "http://localhost:3000/stats/:type");
    }

    #[test]
    fn arrays_collapse_to_one_occurrence_without_repeat() {
        let p = params(json!({ "fields": ["name", "identifier"], "page": 2 }));
        let query = encode_query(&p, &QueryOptions { repeat_params: false }).unwrap();
        assert_eq!(query, "fields=name%2Cidentifier&page=2");
    }

    #[test]
    fn arrays_repeat_key_when_enabled() {
        let p = params(json!({ "fields": ["name", "identifier"] }));
        let query = encode_query(&p, &QueryOptions { repeat_params: true }).unwrap();
        assert_eq!(query, "fields=name&fields=identifier");
    }

    #[test]
    fn null_values_are_skipped() {
        let p = params(json!({ "from": null }));
        assert_eq!(encode_query(&p, &QueryOptions::default()), None);
    }

    #[test]
    fn build_get_all_puts_filters_in_query() {
        let req = client(false)
            .build_get_all(&params(json!({ "include_totals": true })))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, format!("{BASE_URL}/resource-servers?include_totals=true"));
        assert_eq!(req.headers, vec![("authorization".to_string(), "Bearer t".to_string())]);
        assert!(req.body.is_none());
    }

    #[test]
    fn build_create_adds_json_body_and_content_type() {
        let req = client(false)
            .build_create(&Params::new(), &json!({ "identifier": "urn:api" }))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, format!("{BASE_URL}/resource-servers"));
        assert!(req
            .headers
            .contains(&("content-type".to_string(), "application/json".to_string())));
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["identifier"], "urn:api");
    }

    #[test]
    fn build_patch_and_delete_resolve_id() {
        let c = client(false);
        let id = params(json!({ "id": "abc" }));
        let patch = c.build_patch(&id, &json!({ "name": "x" })).unwrap();
        assert_eq!(patch.method, HttpMethod::Patch);
        assert_eq!(patch.url, format!("{BASE_URL}/resource-servers/abc"));
        let delete = c.build_delete(&id).unwrap();
        assert_eq!(delete.method, HttpMethod::Delete);
        assert_eq!(delete.url, format!("{BASE_URL}/resource-servers/abc"));
        assert!(delete.body.is_none());
    }

    #[test]
    fn parse_json_success() {
        let value: Vec<Value> = parse_json(HttpResponse::new(200, r#"[{"id":"1"}]"#)).unwrap();
        assert_eq!(value.len(), 1);
    }

    #[test]
    fn parse_json_not_found() {
        let err = parse_json::<Value>(HttpResponse::new(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_json_unexpected_status() {
        let err = parse_json::<Value>(HttpResponse::new(500, "internal error")).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 500, .. }));
    }

    #[test]
    fn parse_json_bad_body() {
        let err = parse_json::<Vec<Value>>(HttpResponse::new(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_empty_accepts_any_success() {
        assert!(parse_empty(HttpResponse::new(204, "")).is_ok());
        assert!(parse_empty(HttpResponse::new(200, "{}")).is_ok());
        assert!(matches!(parse_empty(HttpResponse::new(404, "")), Err(ApiError::NotFound)));
    }

    #[tokio::test]
    async fn verbs_send_exactly_one_request() {
        let c = client(false);
        c.transport().push_response(HttpResponse::new(200, r#"{"id":"abc"}"#));
        let record: Value = c.get(&params(json!({ "id": "abc" }))).await.unwrap();
        assert_eq!(record["id"], "abc");

        let sent = c.transport().requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, format!("{BASE_URL}/resource-servers/abc"));
    }

    #[tokio::test]
    async fn transport_errors_propagate_unchanged() {
        let c = client(false);
        c.transport()
            .push_error(ApiError::Transport("connection refused".to_string()));
        let err = c.delete(&params(json!({ "id": "abc" }))).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(msg) if msg == "connection refused"));
    }
}
