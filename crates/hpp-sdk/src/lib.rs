//! HPP SDK - 远程机器人模型服务客户端
//!
//! 通过分布式对象协议访问远程 HPP 模型服务器的 Rust SDK。运动学、碰撞检测、
//! 距离计算和动力学都在服务器进程内执行，本 SDK 只负责加载模型、缓存关节
//! 索引并转发查询。
//!
//! # 架构设计
//!
//! - **服务契约层** (`service`): `RobotService` trait、线上数据形状、错误类型
//! - **客户端层** (`robot`): `Robot` 门面、配置、关节位置索引
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use hpp_sdk::prelude::*;
//!
//! fn run<C: ServiceConnector>(connector: &C) -> Result<(), RobotError> {
//!     let mut robot = RobotBuilder::new("pr2")
//!         .root_joint_type(RootJointType::Planar)
//!         .description(ModelDescription::new("hpp_tutorial", "pr2"))
//!         .build(connector)?;
//!     let q = robot.shoot_random_config()?;
//!     robot.set_current_config(&q)?;
//!     Ok(())
//! }
//! ```

pub use hpp_robot as robot;
pub use hpp_service as service;

// Prelude 模块
pub mod prelude;

// 客户端层（推荐入口）
pub use hpp_robot::{
    DistancesToCollision, ModelDescription, ModelKind, RankIndex, Robot, RobotBuilder,
    RobotConfig,
};

// 服务契约层
pub use hpp_service::{JointBound, RobotService, RootJointType, ServiceConnector};

// 错误类型
pub use hpp_robot::{ConfigError, RobotError};
pub use hpp_service::{ServiceError, ServiceErrorKind};

#[cfg(feature = "mock")]
pub use hpp_service::mock;
