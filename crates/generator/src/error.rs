//! Generator 错误类型

use contracts::ContractError;
use thiserror::Error;

/// Generator 错误
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// 采样间隔非法
    #[error("invalid sample interval for series {series}: must be > 0")]
    InvalidInterval {
        /// Series 名称
        series: String,
    },

    /// 已在运行
    #[error("series {series} is already running")]
    AlreadyRunning {
        /// Series 名称
        series: String,
    },
}

impl From<GeneratorError> for ContractError {
    fn from(err: GeneratorError) -> Self {
        let series = match &err {
            GeneratorError::InvalidInterval { series } | GeneratorError::AlreadyRunning { series } => {
                series.clone()
            }
        };
        ContractError::source(series, err.to_string())
    }
}

/// Generator Result 类型别名
pub type Result<T> = std::result::Result<T, GeneratorError>;
