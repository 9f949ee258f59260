//! In-process fake dashboards for tests.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct FakeSatellite {
    id: String,
    success_count: u64,
    suspended: bool,
    disqualified: bool,
    egress: u64,
    ingress: u64,
    joined_at: String,
    failing: bool,
    stalled: bool,
}

impl FakeSatellite {
    pub fn new(id: &str, success_count: u64) -> Self {
        Self {
            id: id.to_string(),
            success_count,
            suspended: false,
            disqualified: false,
            egress: 0,
            ingress: 0,
            joined_at: "2020-01-01T00:00:00.000000Z".to_string(),
            failing: false,
            stalled: false,
        }
    }

    pub fn suspended(mut self) -> Self {
        self.suspended = true;
        self
    }

    pub fn disqualified(mut self) -> Self {
        self.disqualified = true;
        self
    }

    pub fn with_traffic(mut self, egress: u64, ingress: u64) -> Self {
        self.egress = egress;
        self.ingress = ingress;
        self
    }

    pub fn joined(mut self, at: &str) -> Self {
        self.joined_at = at.to_string();
        self
    }

    /// Answer the detail call with HTTP 500.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Hold the detail call open far longer than any test timeout.
    pub fn stalled(mut self) -> Self {
        self.stalled = true;
        self
    }

    fn listing(&self) -> Value {
        let marker = "2020-06-01T00:00:00Z";
        json!({
            "id": self.id,
            "disqualified": if self.disqualified { Some(marker) } else { None },
            "suspended": if self.suspended { Some(marker) } else { None },
        })
    }

    fn detail(&self) -> Value {
        json!({
            "audit": {"successCount": self.success_count},
            "egressSummary": self.egress,
            "ingressSummary": self.ingress,
            "nodeJoinedAt": self.joined_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FakeNode {
    version: String,
    up_to_date: bool,
    disk_used: u64,
    disk_allocated: u64,
    bandwidth: u64,
    started_at: String,
    satellites: Vec<FakeSatellite>,
    raw_status: Option<String>,
}

impl FakeNode {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            up_to_date: true,
            disk_used: 0,
            disk_allocated: 0,
            bandwidth: 0,
            started_at: "2020-10-01T00:00:00.000000000Z".to_string(),
            satellites: Vec::new(),
            raw_status: None,
        }
    }

    pub fn outdated(mut self) -> Self {
        self.up_to_date = false;
        self
    }

    pub fn with_disk(mut self, used: u64, allocated: u64) -> Self {
        self.disk_used = used;
        self.disk_allocated = allocated;
        self
    }

    pub fn with_bandwidth(mut self, used: u64) -> Self {
        self.bandwidth = used;
        self
    }

    pub fn with_satellite(mut self, satellite: FakeSatellite) -> Self {
        self.satellites.push(satellite);
        self
    }

    /// Serve this body as the status response instead of JSON.
    pub fn with_raw_status(mut self, body: &str) -> Self {
        self.raw_status = Some(body.to_string());
        self
    }

    fn status(&self) -> Value {
        json!({
            "nodeID": format!("node-{}", self.version),
            "version": self.version,
            "upToDate": self.up_to_date,
            "startedAt": self.started_at,
            "diskSpace": {"used": self.disk_used, "available": self.disk_allocated},
            "bandwidth": {"used": self.bandwidth},
            "satellites": self.satellites.iter().map(FakeSatellite::listing).collect::<Vec<_>>(),
        })
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Serve a fake node dashboard on an ephemeral port.
pub async fn spawn_dashboard(node: FakeNode) -> SocketAddr {
    let status_body = Arc::new(match &node.raw_status {
        Some(raw) => raw.clone(),
        None => node.status().to_string(),
    });

    let satellites: Arc<HashMap<String, FakeSatellite>> = Arc::new(
        node.satellites
            .iter()
            .map(|s| (s.id.clone(), s.clone()))
            .collect(),
    );

    let app = Router::new()
        .route(
            "/api/sno/",
            get(move || {
                let body = Arc::clone(&status_body);
                async move {
                    (
                        [(axum::http::header::CONTENT_TYPE, "application/json")],
                        body.as_str().to_string(),
                    )
                }
            }),
        )
        .route(
            "/api/sno/satellite/:id",
            get(move |Path(id): Path<String>| {
                let satellites = Arc::clone(&satellites);
                async move {
                    let Some(satellite) = satellites.get(&id) else {
                        return StatusCode::NOT_FOUND.into_response();
                    };
                    if satellite.stalled {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                    }
                    if satellite.failing {
                        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                    }
                    Json(satellite.detail()).into_response()
                }
            }),
        );

    serve(app).await
}

/// Serve a fixed JSON document at `path`.
pub async fn spawn_json(path: &str, body: Value) -> SocketAddr {
    let body = Arc::new(body);
    let app = Router::new().route(
        path,
        get(move || {
            let body = Arc::clone(&body);
            async move { Json(body.as_ref().clone()) }
        }),
    );
    serve(app).await
}

/// Accept connections and never answer them.
pub async fn spawn_hanging() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// A local port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
