use crate::auth::CurrentUser;
use crate::routine::{
    NewRoutine, Routine, RoutineEdit, RoutineService, RoutineServiceError, RoutineState, Task,
    TaskEdit,
};
use crate::web::api::v1::{ApiError, ApiJson, ApiPath, ApiQuery, ErrorResponse};
use axum::{
    Router,
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// JSON representation of a Routine for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoutineJson {
    /// Unique identifier for the routine
    id: i32,
    title: String,
    description: Option<String>,
    priority: i32,
    complete: bool,
    /// ID of the owning user
    owner_id: i32,
}

impl From<Routine> for RoutineJson {
    fn from(routine: Routine) -> Self {
        Self {
            id: routine.id(),
            title: routine.title().to_string(),
            description: routine.description().map(str::to_string),
            priority: routine.priority(),
            complete: routine.complete(),
            owner_id: routine.owner_id(),
        }
    }
}

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskJson {
    /// Unique identifier for the task
    id: i32,
    title: String,
    description: Option<String>,
    priority: i32,
    complete: bool,
    /// ID of the routine the task belongs to
    routine_id: i32,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_string(),
            description: task.description().map(str::to_string),
            priority: task.priority(),
            complete: task.complete(),
            routine_id: task.routine_id(),
        }
    }
}

/// Body of add-routine.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RoutineRequest {
    title: String,
    #[serde(default)]
    description: Option<String>,
    priority: i32,
    complete: bool,
}

/// Query string of edit-routine.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EditRoutineQuery {
    title: String,
    #[serde(default)]
    description: Option<String>,
    priority: i32,
}

/// Body of add-task and edit-task. A `complete` field is accepted but ignored.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TaskRequest {
    title: String,
    #[serde(default)]
    description: Option<String>,
    priority: i32,
    #[serde(default)]
    #[allow(dead_code)]
    complete: Option<bool>,
}

impl From<TaskRequest> for TaskEdit {
    fn from(request: TaskRequest) -> Self {
        TaskEdit {
            title: request.title,
            description: request.description,
            priority: request.priority,
        }
    }
}

impl From<RoutineServiceError> for ApiError {
    fn from(err: RoutineServiceError) -> Self {
        match err {
            RoutineServiceError::RoutineNotFound(_) | RoutineServiceError::TaskNotFound(_, _) => {
                ApiError::NotFound(err.to_string())
            }
            RoutineServiceError::Database(_) => ApiError::Internal(err.to_string()),
        }
    }
}

/// Handler for GET /routines/ - Lists the caller's routines.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/routines/",
    responses(
        (status = 200, description = "Routines of the caller", body = Vec<RoutineJson>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Routines"
)]
pub async fn list_routines_handler(
    State(state): State<Arc<RoutineState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<RoutineJson>>, ApiError> {
    let service = RoutineService::new(&state.db);
    let routines = service.list_routines(user.id).await?;
    Ok(Json(routines.into_iter().map(RoutineJson::from).collect()))
}

/// Handler for POST /routines/add-routine - Creates a routine for the caller.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/routines/add-routine",
    request_body = RoutineRequest,
    responses(
        (status = 200, description = "Routine created"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 422, description = "Malformed request body", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Routines"
)]
pub async fn add_routine_handler(
    State(state): State<Arc<RoutineState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<RoutineRequest>,
) -> Result<StatusCode, ApiError> {
    let service = RoutineService::new(&state.db);
    service
        .create_routine(
            user.id,
            NewRoutine {
                title: payload.title,
                description: payload.description,
                priority: payload.priority,
                complete: payload.complete,
            },
        )
        .await?;
    Ok(StatusCode::OK)
}

/// Handler for POST /routines/edit-routine/{routine_id} - Edits a routine from query parameters.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/routines/edit-routine/{routine_id}",
    params(
        ("routine_id" = i32, Path, description = "Routine to edit"),
        ("title" = String, Query, description = "New title"),
        ("description" = Option<String>, Query, description = "New description"),
        ("priority" = i32, Query, description = "New priority")
    ),
    responses(
        (status = 200, description = "Routine updated"),
        (status = 404, description = "Routine not found", body = ErrorResponse),
        (status = 422, description = "Malformed parameters", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Routines"
)]
pub async fn edit_routine_handler(
    State(state): State<Arc<RoutineState>>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(routine_id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<EditRoutineQuery>,
) -> Result<StatusCode, ApiError> {
    let service = RoutineService::new(&state.db);
    service
        .edit_routine(
            user.id,
            routine_id,
            RoutineEdit {
                title: query.title,
                description: query.description,
                priority: query.priority,
            },
        )
        .await?;
    Ok(StatusCode::OK)
}

/// Handler for POST /routines/delete-routine/{routine_id} - Deletes a routine if present.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/routines/delete-routine/{routine_id}",
    params(("routine_id" = i32, Path, description = "Routine to delete")),
    responses(
        (status = 200, description = "Routine deleted or already absent"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Routines"
)]
pub async fn delete_routine_handler(
    State(state): State<Arc<RoutineState>>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(routine_id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    let service = RoutineService::new(&state.db);
    service.delete_routine(user.id, routine_id).await?;
    Ok(StatusCode::OK)
}

/// Handler for GET /routines/{routine_id}/get-task/all - Lists the tasks of a routine.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/routines/{routine_id}/get-task/all",
    params(("routine_id" = i32, Path, description = "Parent routine")),
    responses(
        (status = 200, description = "Tasks of the routine", body = Vec<TaskJson>),
        (status = 404, description = "Routine not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn list_tasks_handler(
    State(state): State<Arc<RoutineState>>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(routine_id): ApiPath<i32>,
) -> Result<Json<Vec<TaskJson>>, ApiError> {
    let service = RoutineService::new(&state.db);
    let tasks = service.list_tasks(user.id, routine_id).await?;
    Ok(Json(tasks.into_iter().map(TaskJson::from).collect()))
}

/// Handler for POST /routines/{routine_id}/add-task - Adds a task to a routine.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/routines/{routine_id}/add-task",
    params(("routine_id" = i32, Path, description = "Parent routine")),
    request_body = TaskRequest,
    responses(
        (status = 200, description = "Task created"),
        (status = 404, description = "Routine not found", body = ErrorResponse),
        (status = 422, description = "Malformed request body", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn add_task_handler(
    State(state): State<Arc<RoutineState>>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(routine_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<TaskRequest>,
) -> Result<StatusCode, ApiError> {
    let service = RoutineService::new(&state.db);
    service
        .create_task(user.id, routine_id, TaskEdit::from(payload))
        .await?;
    Ok(StatusCode::OK)
}

/// Handler for GET /routines/{routine_id}/{task_id} - Fetches a single task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/routines/{routine_id}/{task_id}",
    params(
        ("routine_id" = i32, Path, description = "Parent routine"),
        ("task_id" = i32, Path, description = "Task to fetch")
    ),
    responses(
        (status = 200, description = "The task", body = TaskJson),
        (status = 404, description = "Routine or task not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn get_task_handler(
    State(state): State<Arc<RoutineState>>,
    Extension(user): Extension<CurrentUser>,
    ApiPath((routine_id, task_id)): ApiPath<(i32, i32)>,
) -> Result<Json<TaskJson>, ApiError> {
    let service = RoutineService::new(&state.db);
    let task = service.get_task(user.id, routine_id, task_id).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for POST /routines/{routine_id}/edit-task/{task_id} - Edits a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/routines/{routine_id}/edit-task/{task_id}",
    params(
        ("routine_id" = i32, Path, description = "Parent routine"),
        ("task_id" = i32, Path, description = "Task to edit")
    ),
    request_body = TaskRequest,
    responses(
        (status = 200, description = "Task updated"),
        (status = 404, description = "Routine or task not found", body = ErrorResponse),
        (status = 422, description = "Malformed request body", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn edit_task_handler(
    State(state): State<Arc<RoutineState>>,
    Extension(user): Extension<CurrentUser>,
    ApiPath((routine_id, task_id)): ApiPath<(i32, i32)>,
    ApiJson(payload): ApiJson<TaskRequest>,
) -> Result<StatusCode, ApiError> {
    let service = RoutineService::new(&state.db);
    service
        .edit_task(user.id, routine_id, task_id, TaskEdit::from(payload))
        .await?;
    Ok(StatusCode::OK)
}

/// Handler for POST /routines/{routine_id}/delete-task/{task_id} - Deletes a task if present.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/routines/{routine_id}/delete-task/{task_id}",
    params(
        ("routine_id" = i32, Path, description = "Parent routine"),
        ("task_id" = i32, Path, description = "Task to delete")
    ),
    responses(
        (status = 200, description = "Task deleted or already absent"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<RoutineState>>,
    Extension(user): Extension<CurrentUser>,
    ApiPath((routine_id, task_id)): ApiPath<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    let service = RoutineService::new(&state.db);
    service.delete_task(user.id, routine_id, task_id).await?;
    Ok(StatusCode::OK)
}

/// Creates and returns the `/routines` API router.
/// Handlers expect a [`CurrentUser`] extension, so the router must sit behind the auth middlewares.
pub fn create_api_router(state: Arc<RoutineState>) -> Router {
    Router::new()
        .route("/routines/", get(list_routines_handler))
        .route("/routines/add-routine", post(add_routine_handler))
        .route(
            "/routines/edit-routine/{routine_id}",
            post(edit_routine_handler),
        )
        .route(
            "/routines/delete-routine/{routine_id}",
            post(delete_routine_handler),
        )
        .route(
            "/routines/{routine_id}/get-task/all",
            get(list_tasks_handler),
        )
        .route("/routines/{routine_id}/add-task", post(add_task_handler))
        .route("/routines/{routine_id}/{task_id}", get(get_task_handler))
        .route(
            "/routines/{routine_id}/edit-task/{task_id}",
            post(edit_task_handler),
        )
        .route(
            "/routines/{routine_id}/delete-task/{task_id}",
            post(delete_task_handler),
        )
        .with_state(state)
}
