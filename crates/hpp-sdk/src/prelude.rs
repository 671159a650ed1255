//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use hpp_sdk::prelude::*;
//! ```

// 客户端层
pub use hpp_robot::{ModelDescription, ModelKind, Robot, RobotBuilder, RobotConfig};

// 服务契约层（常用 Trait）
pub use hpp_service::{JointBound, RobotService, RootJointType, ServiceConnector};

// 错误类型
pub use hpp_robot::{ConfigError, RobotError};
pub use hpp_service::ServiceError;
