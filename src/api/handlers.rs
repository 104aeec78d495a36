use crate::api::AppState;
use crate::error::AuditError;
use crate::models::{PageSize, ReportRequest, Selection};
use crate::service::ReportOutcome;
use axum::{
    body::Bytes,
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Local;
use serde::{Deserialize, Serialize};

/// 上传参数
#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub file_name: Option<String>,
}

/// 报表请求体, 缺省字段取配置默认值
#[derive(Debug, Default, Deserialize)]
pub struct ReportBody {
    pub categories: Option<Selection>,
    pub brands: Option<Selection>,
    pub page_size: Option<PageSize>,
}

impl ReportBody {
    fn into_request(self, default_page_size: PageSize) -> ReportRequest {
        ReportRequest {
            categories: self.categories.unwrap_or_default(),
            brands: self.brands.unwrap_or_default(),
            page_size: self.page_size.unwrap_or(default_page_size),
        }
    }
}

/// 通用响应体
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub code: Option<String>,
    pub message: String,
}

fn message_response(status: StatusCode, code: Option<&str>, message: impl Into<String>) -> Response {
    let response = ApiResponse {
        success: status.is_success(),
        code: code.map(str::to_string),
        message: message.into(),
    };
    (status, Json(response)).into_response()
}

fn error_response(error: &AuditError) -> Response {
    let status =
        StatusCode::from_u16(error.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    message_response(status, Some(error.error_code()), error.to_string())
}

fn not_found(id: u64) -> Response {
    message_response(
        StatusCode::NOT_FOUND,
        Some("NOT_FOUND"),
        format!("Dataset {} not found", id),
    )
}

fn join_failure(error: tokio::task::JoinError) -> Response {
    tracing::error!("Blocking task failed: {}", error);
    message_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        Some("INTERNAL_ERROR"),
        "Internal error",
    )
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 上传 CSV, 校验并聚合后保存为数据集
pub async fn upload_dataset(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Response {
    let file_name = params.file_name.unwrap_or_else(|| "upload.csv".to_string());
    tracing::info!("Received inventory upload {} ({} bytes)", file_name, body.len());

    let service = state.service.clone();
    let prepared = match tokio::task::spawn_blocking(move || service.prepare(&body)).await {
        Ok(result) => result,
        Err(e) => return join_failure(e),
    };

    match prepared {
        Ok(prepared) => {
            let dataset = state
                .store
                .insert(file_name, prepared.source_rows, prepared.table);
            (StatusCode::CREATED, Json(dataset.summary())).into_response()
        }
        Err(e) => {
            tracing::warn!("Rejected inventory upload {}: {}", file_name, e);
            error_response(&e)
        }
    }
}

/// 数据集概要 (可选分类、品牌)
pub async fn get_dataset(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    match state.store.get(id) {
        Some(dataset) => Json(dataset.summary()).into_response(),
        None => not_found(id),
    }
}

pub async fn delete_dataset(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    match state.store.remove(id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(id),
    }
}

/// 生成审计工作表 PDF
pub async fn generate_report(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<ReportBody>,
) -> Response {
    let Some(dataset) = state.store.get(id) else {
        return not_found(id);
    };

    let request = body.into_request(state.config.report.default_page_size);
    let generated_at = Local::now().naive_local();
    let service = state.service.clone();
    let table = dataset.table.clone();

    let outcome = match tokio::task::spawn_blocking(move || {
        service.generate(&table, &request, generated_at)
    })
    .await
    {
        Ok(result) => result,
        Err(e) => return join_failure(e),
    };

    match outcome {
        Ok(ReportOutcome::Rendered(document)) => {
            tracing::info!(
                "Dataset {}: generated {} ({} pages)",
                id,
                document.file_name,
                document.page_count
            );
            let headers = [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", document.file_name),
                ),
            ];
            (StatusCode::OK, headers, document.bytes).into_response()
        }
        Ok(ReportOutcome::NoRowsMatch) => message_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            Some("NO_ROWS_MATCH"),
            "No items match your selection",
        ),
        Err(e) => error_response(&AuditError::from(e)),
    }
}

