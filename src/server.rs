use axum::{
    extract::{rejection::JsonRejection, Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use std::path::Path as FsPath;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::error::{ApiErrorResponse, TaskError};
use crate::service::TaskService;
use crate::store::Store;
use crate::task::{NewTask, Task, TaskPatch};

type AppState = Arc<TaskService>;
type ApiResult<T> = Result<T, ApiErrorResponse>;

pub fn router(service: AppState, ui_dir: &FsPath) -> Router {
    Router::new()
        .route("/api", get(api_index))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .with_state(service)
        .fallback_service(ServeDir::new(ui_dir))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(log_requests))
}

pub async fn start_server(config: Config) -> anyhow::Result<()> {
    let service = Arc::new(TaskService::new(Store::new(config.data_file.clone())));
    let app = router(service, &config.ui_dir);

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    log::info!(
        "task board running at http://{} (data: {}, ui: {})",
        listener.local_addr()?,
        config.data_file.display(),
        config.ui_dir.display()
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("shutdown requested");
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();
    let resp = next.run(req).await;
    log::info!("{} {} {} {:?}", method, path, resp.status().as_u16(), started.elapsed());
    resp
}

async fn api_index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Task board API",
        "endpoints": {
            "tasks": {
                "GET": "/api/tasks - List all tasks",
                "POST": "/api/tasks - Create a task",
                "GET_ONE": "/api/tasks/{id} - Get one task",
                "PUT": "/api/tasks/{id} - Update a task",
                "DELETE": "/api/tasks/{id} - Delete a task"
            }
        }
    }))
}

/// Runs a service call on the blocking pool; the service does file I/O under a lock.
async fn blocking<T, F>(svc: AppState, op: F) -> ApiResult<T>
where
    F: FnOnce(&TaskService) -> Result<T, TaskError> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(move || op(&svc)).await??)
}

async fn list_tasks(State(svc): State<AppState>) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(blocking(svc, |s| s.list_all()).await?))
}

async fn get_task(State(svc): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Task>> {
    Ok(Json(blocking(svc, move |s| s.get_by_id(&id)).await?))
}

async fn create_task(
    State(svc): State<AppState>,
    body: Result<Json<NewTask>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(input) = body?;
    let task = blocking(svc, move |s| s.create(input)).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<TaskPatch>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(patch) = body?;
    Ok(Json(blocking(svc, move |s| s.update(&id, patch)).await?))
}

async fn delete_task(State(svc): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    blocking(svc, move |s| s.delete(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
