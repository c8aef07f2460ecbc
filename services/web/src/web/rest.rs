//! services/web/src/web/rest.rs
//!
//! Contains the Axum handlers for the job and dashboard endpoints and the
//! master definition for the OpenAPI specification.

use crate::notifications::{Toast, ToastKind};
use crate::web::auth::{self, AuthResponse, Credentials};
use crate::web::state::AppState;
use crate::web::views::{
    DashboardView, EmptyStateView, FilterOptionView, JobCardView, JobListView, SessionView,
    StatCardView, UserView,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::Utc;
use job_tracker_core::{JobForm, JobStatus, SortOrder, StatusFilter, User, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        dashboard_handler,
        list_jobs_handler,
        new_job_form_handler,
        edit_job_form_handler,
        create_job_handler,
        update_job_handler,
        delete_job_handler,
        update_preferences_handler,
        notifications_handler,
    ),
    components(
        schemas(
            Credentials, AuthResponse, SessionView, UserView,
            DashboardView, StatCardView, JobListView, JobCardView, FilterOptionView,
            EmptyStateView, JobFormBody, PreferencesRequest, ErrorResponse, FieldErrorBody,
            Toast, ToastKind,
        )
    ),
    tags(
        (name = "Job Tracker API", description = "Track job applications and their outcomes.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FieldErrorBody {
    pub field: String,
    pub message: String,
}

/// The body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldErrorBody>,
}

pub type HandlerError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            fields: Vec::new(),
        }),
    )
}

fn validation_failure(errors: ValidationErrors) -> HandlerError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse {
            error: errors.to_string(),
            fields: errors
                .errors
                .into_iter()
                .map(|e| FieldErrorBody {
                    field: e.field.to_string(),
                    message: e.message,
                })
                .collect(),
        }),
    )
}

/// The add/edit form, as submitted and as pre-filled.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobFormBody {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub job_title: String,
    /// One of Applied, Interview, Offer, Rejected, Accepted. Defaults to Applied.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub status: Option<JobStatus>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub applied_date: String,
    #[serde(default)]
    pub notes: String,
}

impl From<JobFormBody> for JobForm {
    fn from(body: JobFormBody) -> Self {
        JobForm {
            company_name: body.company_name,
            job_title: body.job_title,
            status: body.status.unwrap_or(JobStatus::Applied),
            applied_date: body.applied_date,
            notes: body.notes,
        }
    }
}

impl From<JobForm> for JobFormBody {
    fn from(form: JobForm) -> Self {
        JobFormBody {
            company_name: form.company_name,
            job_title: form.job_title,
            status: Some(form.status),
            applied_date: form.applied_date,
            notes: form.notes,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PreferencesRequest {
    /// `all` or a status name.
    #[schema(value_type = Option<String>)]
    pub filter: Option<StatusFilter>,
    /// `asc` or `desc`
    #[schema(value_type = Option<String>)]
    pub sort_by: Option<SortOrder>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// The four summary cards.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardView),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn dashboard_handler(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    Json(DashboardView::render(&state.jobs.jobs().await))
}

/// The filtered, sorted list of cached applications.
#[utoipa::path(
    get,
    path = "/api/jobs",
    responses(
        (status = 200, description = "Job list", body = JobListView),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn list_jobs_handler(State(state): State<Arc<AppState>>) -> Json<JobListView> {
    Json(JobListView::render(&state.jobs.snapshot().await))
}

/// Defaults for the add form: status Applied, dated today.
#[utoipa::path(
    get,
    path = "/api/jobs/form",
    responses(
        (status = 200, description = "Empty form", body = JobFormBody),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn new_job_form_handler() -> Json<JobFormBody> {
    Json(JobForm::new(Utc::now().date_naive()).into())
}

/// The edit form pre-filled from a cached application.
#[utoipa::path(
    get,
    path = "/api/jobs/{id}/form",
    responses(
        (status = 200, description = "Pre-filled form", body = JobFormBody),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "No such application")
    ),
    params(
        ("id" = Uuid, Path, description = "The application's id.")
    )
)]
pub async fn edit_job_form_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobFormBody>, HandlerError> {
    let job = state
        .jobs
        .get(id)
        .await
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Job application not found"))?;
    Ok(Json(JobForm::from_job(&job).into()))
}

/// Create an application for the signed-in user.
#[utoipa::path(
    post,
    path = "/api/jobs",
    request_body = JobFormBody,
    responses(
        (status = 201, description = "Application created", body = JobCardView),
        (status = 401, description = "Not signed in"),
        (status = 422, description = "Form validation failed", body = ErrorResponse),
        (status = 502, description = "Backend refused the write", body = ErrorResponse)
    )
)]
pub async fn create_job_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(body): Json<JobFormBody>,
) -> Result<impl IntoResponse, HandlerError> {
    let job = JobForm::from(body)
        .into_new(user.id)
        .map_err(validation_failure)?;

    match state.jobs.add_job(job).await {
        Some(created) => {
            info!("Created job application {}", created.id);
            Ok((StatusCode::CREATED, Json(JobCardView::from(&created))))
        }
        None => Err(error_response(
            StatusCode::BAD_GATEWAY,
            "Failed to add job application",
        )),
    }
}

/// Overwrite every editable field of a cached application.
#[utoipa::path(
    put,
    path = "/api/jobs/{id}",
    request_body = JobFormBody,
    responses(
        (status = 200, description = "Application updated", body = JobCardView),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "No such application", body = ErrorResponse),
        (status = 422, description = "Form validation failed", body = ErrorResponse),
        (status = 502, description = "Backend refused the write", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "The application's id.")
    )
)]
pub async fn update_job_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<JobFormBody>,
) -> Result<Json<JobCardView>, HandlerError> {
    if state.jobs.get(id).await.is_none() {
        return Err(error_response(
            StatusCode::NOT_FOUND,
            "Job application not found",
        ));
    }
    let update = JobForm::from(body)
        .into_update()
        .map_err(validation_failure)?;

    state
        .jobs
        .update_job(id, update)
        .await
        .map(|updated| Json(JobCardView::from(&updated)))
        .ok_or_else(|| {
            error_response(StatusCode::BAD_GATEWAY, "Failed to update job application")
        })
}

/// Delete an application.
#[utoipa::path(
    delete,
    path = "/api/jobs/{id}",
    responses(
        (status = 204, description = "Application deleted"),
        (status = 401, description = "Not signed in"),
        (status = 502, description = "Backend refused the delete", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "The application's id.")
    )
)]
pub async fn delete_job_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    if state.jobs.delete_job(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(error_response(
            StatusCode::BAD_GATEWAY,
            "Failed to delete job application",
        ))
    }
}

/// Change the status filter and/or the sort order. A sort change re-fetches
/// the list in the new order.
#[utoipa::path(
    put,
    path = "/api/preferences",
    request_body = PreferencesRequest,
    responses(
        (status = 200, description = "Updated job list", body = JobListView),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn update_preferences_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<PreferencesRequest>,
) -> Json<JobListView> {
    if let Some(filter) = req.filter {
        state.jobs.set_filter(filter).await;
    }
    if let Some(sort_by) = req.sort_by {
        if sort_by != state.jobs.sort_by().await {
            state.jobs.set_sort_by(sort_by).await;
            state.jobs.fetch_jobs(user.id).await;
        }
    }
    Json(JobListView::render(&state.jobs.snapshot().await))
}

/// Drain the pending toasts, oldest first.
#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "Pending toasts", body = Vec<Toast>)
    )
)]
pub async fn notifications_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Toast>> {
    Json(state.toasts.drain())
}
