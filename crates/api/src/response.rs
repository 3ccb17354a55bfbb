use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

/// 统一响应包装
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T) -> Self {
        Self::from_option(Some(data), None)
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self::from_option(Some(data), Some(message.into()))
    }

    /// 队列为空等“没有结果”的情况仍是成功响应，`data` 为 `null`
    pub fn from_option(data: Option<T>, message: Option<String>) -> Self {
        Self {
            success: true,
            data,
            message,
            timestamp: chrono::Utc::now(),
        }
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}

pub fn success<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::OK, ApiResponse::success(data))
}

pub fn created<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::CREATED, ApiResponse::success(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let response = ApiResponse::success("ok");
        assert!(response.success);
        assert_eq!(response.data, Some("ok"));
        assert!(response.message.is_none());
    }

    #[test]
    fn test_empty_result_is_still_success() {
        let response: ApiResponse<u32> =
            ApiResponse::from_option(None, Some("队列为空".to_string()));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert!(json["data"].is_null());
        assert_eq!(json["message"], "队列为空");
    }

    #[test]
    fn test_created_status() {
        let response = created(1).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
