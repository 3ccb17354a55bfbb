use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use scheduler_domain::{NewTask, TaskId};
use serde::Deserialize;

use crate::{
    error::ApiResult,
    response::{created, success, ApiResponse},
    routes::AppState,
};

/// 任务创建请求
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Option<i32>,
}

impl From<CreateTaskRequest> for NewTask {
    fn from(request: CreateTaskRequest) -> Self {
        NewTask {
            name: request.name,
            description: request.description.unwrap_or_default(),
            due_date: request.due_date,
            priority: request.priority.unwrap_or(0),
        }
    }
}

fn parse_id(id: &str) -> ApiResult<TaskId> {
    Ok(id.parse::<TaskId>()?)
}

/// 创建任务并入队
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    let task = state.dispatch_service.submit_task(request.into()).await?;
    Ok(created(task))
}

/// 按调度顺序列出队列中的任务
pub async fn list_queued_tasks(State(state): State<AppState>) -> impl IntoResponse {
    success(state.dispatch_service.queued_tasks())
}

pub async fn peek_next_task(State(state): State<AppState>) -> impl IntoResponse {
    let next = state.dispatch_service.peek_next();
    let message = next.is_none().then(|| "队列为空".to_string());
    ApiResponse::from_option(next, message)
}

/// 派发下一个任务
pub async fn dispatch_next_task(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let next = state.dispatch_service.dispatch_next().await?;
    let message = next.is_none().then(|| "队列为空".to_string());
    Ok(ApiResponse::from_option(next, message))
}

pub async fn get_statistics(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(success(state.dispatch_service.statistics().await?))
}

pub async fn list_stuck_tasks(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(success(state.stuck_detector.find_stuck_tasks().await?))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let task = state.dispatch_service.get_task(parse_id(&id)?).await?;
    Ok(success(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    if !state.dispatch_service.delete_task(id).await? {
        return Err(scheduler_errors::SchedulerError::task_not_found(id).into());
    }
    Ok(ApiResponse::success_with_message(id, "任务已删除"))
}

pub async fn enqueue_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let task = state.dispatch_service.enqueue_task(parse_id(&id)?).await?;
    Ok(success(task))
}

pub async fn start_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let task = state.dispatch_service.start_task(parse_id(&id)?).await?;
    Ok(success(task))
}

pub async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let task = state.dispatch_service.complete_task(parse_id(&id)?).await?;
    Ok(success(task))
}

pub async fn fail_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let task = state.dispatch_service.fail_task(parse_id(&id)?).await?;
    Ok(success(task))
}

pub async fn cancel_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let task = state.dispatch_service.cancel_task(parse_id(&id)?).await?;
    Ok(success(task))
}

/// 把已分配的任务退回队列
pub async fn release_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let task = state.dispatch_service.release_task(parse_id(&id)?).await?;
    Ok(success(task))
}
