use crate::{models::{DiagnosticsResponse, DocumentId, PresenceResponse}, session::presence, AppState};
use axum::{extract::{Path, State}, http::StatusCode, Json};
use std::sync::Arc;
use std::sync::{Mutex, OnceLock};
use sysinfo::System;
use tracing::info;

static SYSTEM_MONITOR: OnceLock<Mutex<System>> = OnceLock::new();

/// Aggregate relay and host statistics
pub async fn diagnostics(
    State(app_state): State<Arc<AppState>>,
) -> (StatusCode, Json<DiagnosticsResponse>) {
    let n_conn = app_state.outbox.len().await as u32;
    let n_sessions = app_state.registry.session_count().await as u32;
    let n_bound_conn = app_state.registry.bound_count().await as u32;

    // System stats
    let (cpu_usage, memory_alloc, memory_free, memory_total) = {
        let sys_lock = SYSTEM_MONITOR.get_or_init(|| {
            Mutex::new(System::new_all())
        });
        match sys_lock.lock() {
            Ok(mut sys) => {
                sys.refresh_cpu();
                sys.refresh_memory();
                (
                    sys.global_cpu_info().cpu_usage(),
                    sys.used_memory(),
                    sys.free_memory(),
                    sys.total_memory(),
                )
            }
            Err(_) => (0.0, 0, 0, 0)
        }
    };

    info!(
        "Diagnostics: CPU: {:.2}%, Mem: {}/{} MB (Free: {} MB), Conn: {}, Sessions: {}",
        cpu_usage,
        memory_alloc / 1024 / 1024,
        memory_total / 1024 / 1024,
        memory_free / 1024 / 1024,
        n_conn,
        n_sessions
    );

    (
        StatusCode::OK,
        Json(DiagnosticsResponse {
            n_conn,
            n_sessions,
            n_bound_conn,
            cpu_usage,
            memory_alloc,
            memory_total,
            memory_free,
        }),
    )
}

/// Number of connections currently viewing one document
pub async fn document_presence(
    State(app_state): State<Arc<AppState>>,
    Path(doc_id): Path<String>,
) -> Json<PresenceResponse> {
    let doc = DocumentId::from(doc_id.as_str());
    let active_users = presence::active_users(&app_state.registry, &doc).await;
    Json(PresenceResponse {
        document_id: doc_id,
        active_users,
    })
}
