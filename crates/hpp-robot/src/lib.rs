//! # HPP Robot Client
//!
//! 远程机器人模型服务的强类型客户端。
//!
//! 构造时在服务器上加载一个命名模型，本地缓存关节名称以及每个关节在
//! 配置向量 / 速度向量中的位置；其余查询（边界、随机采样、碰撞检测、
//! 距离、质量、质心雅可比）全部一对一转发给远程服务。
//!
//! ## 模块
//!
//! - `robot`: `Robot` 门面
//! - `builder`: 链式构造
//! - `config`: 模型描述文件位置与加载配置（TOML）
//! - `rank`: 关节位置索引
//! - `types`: 应答的 `nalgebra` 视图
//!
//! 人形模型只是换一个远程加载操作，由 [`ModelKind`] 选择。

pub mod builder;
pub mod config;
pub mod error;
pub mod rank;
pub mod robot;
pub mod types;

// 重新导出常用类型
pub use builder::RobotBuilder;
pub use config::{ConfigError, ModelDescription, ModelKind, RobotConfig};
pub use error::RobotError;
pub use rank::{RankEntry, RankIndex};
pub use robot::{BASE_JOINT_RZ, BASE_JOINT_X, BASE_JOINT_Y, BASE_JOINT_Z, Robot};
pub use types::{CollisionPair, DistancesToCollision};

// 服务契约层
pub use hpp_service::{
    JointBound, RobotService, RootJointType, ServiceConnector, ServiceError, ServiceErrorKind,
};

#[cfg(feature = "mock")]
pub use hpp_service::mock;
