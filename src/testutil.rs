//! Local stand-in for a workflow-execution endpoint

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Router,
};
use parking_lot::Mutex;
use tokio::net::TcpListener;

/// A request received by the endpoint
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
}

/// Running endpoint that answers every GET on `/run` with a fixed status
pub struct TestEndpoint {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl TestEndpoint {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

pub async fn spawn_endpoint(status: StatusCode) -> TestEndpoint {
    let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::default();

    let app = Router::new()
        .route(
            "/run",
            get(
                move |State(requests): State<Arc<Mutex<Vec<RecordedRequest>>>>,
                      Query(query): Query<HashMap<String, String>>,
                      headers: HeaderMap| async move {
                    let authorization = headers
                        .get(header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .map(String::from);
                    requests.lock().push(RecordedRequest {
                        query,
                        authorization,
                    });
                    status
                },
            ),
        )
        .with_state(Arc::clone(&requests));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestEndpoint {
        url: format!("http://{}/run", addr),
        requests,
    }
}
