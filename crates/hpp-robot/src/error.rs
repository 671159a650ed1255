//! 客户端层错误类型定义

use crate::config::ConfigError;
use hpp_service::ServiceError;
use thiserror::Error;

/// 客户端层错误类型
#[derive(Error, Debug)]
pub enum RobotError {
    /// 远程服务错误（原样传播）
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// 本地配置错误（在任何远程调用之前检测）
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 模型中不存在任何候选关节
    ///
    /// 例如在没有自由浮动根关节的模型上调用 `set_translation_bounds()`。
    #[error("None of the joints {candidates:?} exist in the model")]
    MissingJoint { candidates: Vec<String> },

    /// 服务器应答的形状与约定不符
    #[error("Malformed reply: {0}")]
    MalformedReply(String),
}

impl RobotError {
    /// 底层服务错误（如果有）
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            RobotError::Service(e) => Some(e),
            _ => None,
        }
    }
}
