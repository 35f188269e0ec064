//! In-process stand-in for the REST backend.
//!
//! Serves JSON collections the way a `json-server` style backend does:
//! `GET /{collection}` with equality filters, `GET /{collection}/{id}`,
//! `POST`, `PUT` and `PATCH`. Records live in memory and every request is
//! logged so tests can assert what the storefront sent.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Map, Value};
use tokio::net::TcpListener;

/// Collections the backend knows about.
const COLLECTIONS: &[&str] = &["products", "carts", "users"];

#[derive(Default)]
struct MockState {
    collections: Mutex<HashMap<String, Vec<Value>>>,
    requests: Mutex<Vec<String>>,
    failing: AtomicBool,
    failing_collections: Mutex<HashSet<String>>,
}

impl MockState {
    fn collections(&self) -> MutexGuard<'_, HashMap<String, Vec<Value>>> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn log(&self, method: &Method, path: &str) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format!("{method} {path}"));
    }
}

/// A running mock backend.
#[derive(Clone)]
pub struct MockBackend {
    state: Arc<MockState>,
    url: String,
}

impl MockBackend {
    /// Start the backend on an ephemeral local port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        {
            let mut collections = state.collections();
            for name in COLLECTIONS {
                collections.insert((*name).to_string(), Vec::new());
            }
        }

        let app = Router::new()
            .route("/{collection}", get(list).post(create))
            .route(
                "/{collection}/{id}",
                get(fetch).put(replace).patch(update),
            )
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Mock backend has no address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            state,
            url: format!("http://{addr}"),
        }
    }

    /// Base URL of the backend.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Append records to a collection.
    pub fn seed(&self, collection: &str, records: Vec<Value>) {
        self.state
            .collections()
            .entry(collection.to_string())
            .or_default()
            .extend(records);
    }

    /// Current records of a collection.
    #[must_use]
    pub fn records(&self, collection: &str) -> Vec<Value> {
        self.state
            .collections()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Requests received so far, as `"METHOD /path"`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Make every request fail with 500 until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    /// Make requests to one collection fail with 500 until switched back.
    pub fn set_failing_collection(&self, collection: &str, failing: bool) {
        let mut failing_collections = self
            .state
            .failing_collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if failing {
            failing_collections.insert(collection.to_string());
        } else {
            failing_collections.remove(collection);
        }
    }
}

/// String form of a field for comparison with a query value.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn has_id(record: &Value, id: &str) -> bool {
    record
        .get("id")
        .and_then(field_text)
        .is_some_and(|own| own == id)
}

fn failure(state: &MockState, collection: &str) -> Option<Response> {
    let down = state.failing.load(Ordering::SeqCst)
        || state
            .failing_collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(collection);
    down.then(|| (StatusCode::INTERNAL_SERVER_ERROR, "backend down").into_response())
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(Value::Object(Map::new()))).into_response()
}

async fn list(
    State(state): State<Arc<MockState>>,
    Path(collection): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.log(&Method::GET, &format!("/{collection}"));
    if let Some(response) = failure(&state, &collection) {
        return response;
    }

    let collections = state.collections();
    let Some(records) = collections.get(&collection) else {
        return not_found();
    };

    let limit = params
        .get("_limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(usize::MAX);

    let matching: Vec<Value> = records
        .iter()
        .filter(|record| {
            params
                .iter()
                .filter(|(key, _)| !key.starts_with('_'))
                .all(|(key, expected)| {
                    record
                        .get(key)
                        .and_then(field_text)
                        .is_some_and(|actual| &actual == expected)
                })
        })
        .take(limit)
        .cloned()
        .collect();

    Json(Value::Array(matching)).into_response()
}

async fn fetch(
    State(state): State<Arc<MockState>>,
    Path((collection, id)): Path<(String, String)>,
) -> Response {
    state.log(&Method::GET, &format!("/{collection}/{id}"));
    if let Some(response) = failure(&state, &collection) {
        return response;
    }

    state
        .collections()
        .get(&collection)
        .and_then(|records| records.iter().find(|r| has_id(r, &id)).cloned())
        .map_or_else(not_found, |record| Json(record).into_response())
}

async fn create(
    State(state): State<Arc<MockState>>,
    Path(collection): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    state.log(&Method::POST, &format!("/{collection}"));
    if let Some(response) = failure(&state, &collection) {
        return response;
    }

    let Value::Object(mut record) = body else {
        return (StatusCode::BAD_REQUEST, "expected an object").into_response();
    };
    if record.get("id").and_then(field_text).is_none() {
        let id = uuid::Uuid::new_v4().simple().to_string();
        record.insert("id".to_string(), Value::String(id));
    }
    let record = Value::Object(record);

    let mut collections = state.collections();
    let Some(records) = collections.get_mut(&collection) else {
        return not_found();
    };
    records.push(record.clone());

    (StatusCode::CREATED, Json(record)).into_response()
}

async fn replace(
    State(state): State<Arc<MockState>>,
    Path((collection, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    state.log(&Method::PUT, &format!("/{collection}/{id}"));
    write(&state, &collection, &id, body, false)
}

async fn update(
    State(state): State<Arc<MockState>>,
    Path((collection, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    state.log(&Method::PATCH, &format!("/{collection}/{id}"));
    write(&state, &collection, &id, body, true)
}

/// Replace or merge into an existing record. The id always stays.
fn write(state: &MockState, collection: &str, id: &str, body: Value, merge: bool) -> Response {
    if let Some(response) = failure(state, collection) {
        return response;
    }
    let Value::Object(fields) = body else {
        return (StatusCode::BAD_REQUEST, "expected an object").into_response();
    };

    let mut collections = state.collections();
    let Some(record) = collections
        .get_mut(collection)
        .and_then(|records| records.iter_mut().find(|r| has_id(r, id)))
    else {
        return not_found();
    };

    let mut next = if merge {
        record.as_object().cloned().unwrap_or_default()
    } else {
        Map::new()
    };
    next.extend(fields);
    next.insert("id".to_string(), Value::String(id.to_string()));
    *record = Value::Object(next);

    Json(record.clone()).into_response()
}
