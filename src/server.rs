//! HTTP route layer for the reconciliation protocol.
//!
//! Exposes `/reconcile` the way OpenRefine expects it: a single `query`
//! parameter (raw text or a JSON object with a `query` member), a batched
//! `queries` parameter (JSON map of key -> query), or neither, which returns
//! the service metadata. Every response supports JSONP via `callback`.

use crate::client::IsniClient;
use crate::fields::FIELDS;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Shared state passed to the reconcile handler.
#[derive(Clone)]
pub struct AppState {
    pub client: IsniClient,
}

/// Build the reconciliation router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/reconcile", get(reconcile_get).post(reconcile_post))
        .with_state(state)
}

/// Parameters accepted on `/reconcile`, from the query string or a form body.
#[derive(Debug, Default, Deserialize)]
pub struct ReconcileParams {
    query: Option<String>,
    #[serde(rename = "type")]
    field: Option<String>,
    queries: Option<String>,
    callback: Option<String>,
}

impl ReconcileParams {
    /// Merge two parameter sources, preferring `self` (the form body).
    fn or(self, fallback: ReconcileParams) -> ReconcileParams {
        ReconcileParams {
            query: self.query.or(fallback.query),
            field: self.field.or(fallback.field),
            queries: self.queries.or(fallback.queries),
            callback: self.callback.or(fallback.callback),
        }
    }
}

/// One entry of a batched `queries` request.
#[derive(Debug, Deserialize)]
struct BatchQuery {
    query: String,
    #[serde(rename = "type")]
    field: Option<String>,
}

async fn reconcile_get(
    State(state): State<AppState>,
    Query(params): Query<ReconcileParams>,
) -> Response {
    reconcile(state, params).await
}

async fn reconcile_post(
    State(state): State<AppState>,
    Query(args): Query<ReconcileParams>,
    form: Result<Form<ReconcileParams>, FormRejection>,
) -> Response {
    // Form parameters win over query-string ones, matching the lookup order
    // OpenRefine clients rely on. A POST without a form body (missing or
    // non-urlencoded content type) still goes through with the query-string
    // parameters alone.
    let form = form.map(|Form(f)| f).unwrap_or_default();
    reconcile(state, form.or(args)).await
}

async fn reconcile(state: AppState, params: ReconcileParams) -> Response {
    let callback = params.callback.as_deref();

    if let Some(raw) = params.query {
        let text = unwrap_query_payload(&raw);
        let field_id = params.field.unwrap_or_default();
        let results = state.client.search(&text, &field_id).await;
        return jsonpify(callback, json!({ "result": results }));
    }

    if let Some(raw) = params.queries {
        let batch: HashMap<String, BatchQuery> = match serde_json::from_str(&raw) {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!("malformed queries parameter: {e}");
                return jsonpify(callback, service_metadata());
            }
        };
        // An entry without a type is the client's opening call; answer with
        // the metadata so it can pick a search field. Checked up front so no
        // remote searches are issued for the rest of the batch.
        if batch.values().any(|item| item.field.is_none()) {
            return jsonpify(callback, service_metadata());
        }
        let mut results = serde_json::Map::new();
        for (key, item) in batch {
            let field_id = item.field.unwrap_or_default();
            let data = state.client.search(&item.query, &field_id).await;
            results.insert(key, json!({ "result": data }));
        }
        return jsonpify(callback, Value::Object(results));
    }

    jsonpify(callback, service_metadata())
}

/// The `query` parameter is either the search text itself or, when it starts
/// with `{`, a JSON object whose `query` member is the search text.
fn unwrap_query_payload(raw: &str) -> String {
    if raw.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<Value>(raw) {
            if let Some(text) = value.get("query").and_then(Value::as_str) {
                return text.to_string();
            }
        }
    }
    raw.to_string()
}

/// Static service descriptor advertised to reconciliation clients.
pub fn service_metadata() -> Value {
    let default_types: Vec<Value> = FIELDS
        .iter()
        .map(|f| json!({ "id": f.id, "name": f.name }))
        .collect();
    json!({
        "name": "ISNI Reconciliation Service",
        "defaultTypes": default_types,
        "view": { "url": "{{id}}" },
    })
}

/// Wrap a JSON value in a JSONP callback when one was requested.
fn jsonpify(callback: Option<&str>, value: Value) -> Response {
    match callback {
        Some(cb) => (
            [(header::CONTENT_TYPE, "text/javascript")],
            format!("{cb}({value})"),
        )
            .into_response(),
        None => Json(value).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(AppState {
            client: IsniClient::new(),
        })
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_service_metadata_shape() {
        let meta = service_metadata();
        assert_eq!(meta["name"], "ISNI Reconciliation Service");
        assert_eq!(meta["defaultTypes"].as_array().unwrap().len(), 4);
        assert_eq!(meta["defaultTypes"][0]["id"], "/isni/name");
        assert!(meta["defaultTypes"][0].get("index").is_none());
        assert_eq!(meta["view"]["url"], "{{id}}");
    }

    #[test]
    fn test_unwrap_query_payload() {
        assert_eq!(unwrap_query_payload("Mark Twain"), "Mark Twain");
        assert_eq!(
            unwrap_query_payload(r#"{"query": "Mark Twain"}"#),
            "Mark Twain"
        );
        // Unusable JSON falls back to the raw string.
        assert_eq!(unwrap_query_payload("{broken"), "{broken");
    }

    #[tokio::test]
    async fn test_no_params_returns_metadata() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/reconcile")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let value = body_json(response).await;
        assert_eq!(value["name"], "ISNI Reconciliation Service");
        assert_eq!(value["defaultTypes"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_jsonp_callback_wrapping() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/reconcile?callback=jQuery123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/javascript"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("jQuery123("));
        assert!(text.ends_with(')'));
    }

    #[tokio::test]
    async fn test_batch_without_type_returns_metadata() {
        let queries = urlencoding::encode(r#"{"q0": {"query": "Mark Twain"}}"#).into_owned();
        let response = app()
            .oneshot(
                Request::builder()
                    .uri(format!("/reconcile?queries={queries}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let value = body_json(response).await;
        assert_eq!(value["name"], "ISNI Reconciliation Service");
    }

    #[tokio::test]
    async fn test_post_without_form_body_falls_back_to_query_string() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/reconcile?callback=jQuery123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("jQuery123("));
    }

    #[tokio::test]
    async fn test_untyped_batch_entry_skips_remote_searches() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let queries = urlencoding::encode(
            r#"{"q0": {"query": "Mark Twain", "type": "/isni/name"}, "q1": {"query": "Ada Lovelace"}}"#,
        )
        .into_owned();
        let app = create_router(AppState {
            client: IsniClient::new().with_base_url(server.url()),
        });
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/reconcile?queries={queries}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let value = body_json(response).await;
        assert_eq!(value["name"], "ISNI Reconciliation Service");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_single_query_returns_result_list() {
        const RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<srw:searchRetrieveResponse xmlns:srw="http://www.loc.gov/zing/srw/">
<srw:record><srw:recordData><responseRecord><ISNIAssigned>
<isniURI>https://isni.org/isni/1</isniURI>
<personalName><forename>Mark</forename><surname>Twain</surname></personalName>
</ISNIAssigned></responseRecord></srw:recordData></srw:record>
</srw:searchRetrieveResponse>"#;

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(RESPONSE)
            .create_async()
            .await;

        let app = create_router(AppState {
            client: IsniClient::new().with_base_url(server.url()),
        });
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/reconcile?query=Mark%20Twain")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let value = body_json(response).await;
        let results = value["result"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["name"], "Mark Twain ");
        assert_eq!(results[0]["match"], true);
    }

    #[tokio::test]
    async fn test_batch_fan_out_posted_as_form() {
        const RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<srw:searchRetrieveResponse xmlns:srw="http://www.loc.gov/zing/srw/">
<srw:record><srw:recordData><responseRecord><ISNIAssigned>
<isniURI>https://isni.org/isni/1</isniURI>
<personalName><forename>Mark</forename><surname>Twain</surname></personalName>
</ISNIAssigned></responseRecord></srw:recordData></srw:record>
</srw:searchRetrieveResponse>"#;

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(RESPONSE)
            .create_async()
            .await;

        let queries = r#"{"q0": {"query": "Mark Twain", "type": "/isni/name"}}"#;
        let body = format!("queries={}", urlencoding::encode(queries));
        let app = create_router(AppState {
            client: IsniClient::new().with_base_url(server.url()),
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/reconcile")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let value = body_json(response).await;
        let results = value["q0"]["result"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["id"], "https://isni.org/isni/1");
    }
}
