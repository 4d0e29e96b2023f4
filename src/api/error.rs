// ==========================================
// 装箱发货计划 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户可读的错误消息
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求错误
    // ==========================================
    #[error("{0}")]
    InvalidInput(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("箱型配置访问失败: {0}")]
    Repository(#[from] RepositoryError),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 是否为调用方输入错误（HTTP 400）
    pub fn is_client_error(&self) -> bool {
        matches!(self, ApiError::InvalidInput(_))
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::LockError("poisoned".to_string());
        let api_err: ApiError = repo_err.into();

        assert!(!api_err.is_client_error());
        assert!(api_err.to_string().contains("poisoned"));
    }

    #[test]
    fn test_invalid_input_is_client_error() {
        let err = ApiError::InvalidInput("Items must be > 0".to_string());
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "Items must be > 0");
    }
}
