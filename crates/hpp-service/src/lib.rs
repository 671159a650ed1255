//! # HPP Service Contract Layer
//!
//! 远程机器人模型服务的契约层，提供统一的服务接口抽象。
//!
//! 所有运动学、碰撞检测、距离计算和动力学都在远程服务器进程内完成，
//! 本 crate 只描述调用形状：
//!
//! - `RobotService`: 远程模型服务的操作集合（一一对应服务器接口）
//! - `ServiceConnector`: 获取服务句柄的方式
//! - `types`: 线上数据形状（加载请求、关节边界、距离应答等）
//! - `mock`: 内存中的测试替身（需要 `mock` feature）

use thiserror::Error;

pub mod types;

#[cfg(feature = "mock")]
pub mod mock;

pub use types::{DistanceReply, JointBound, LoadRequest, Placement, RootJointType};

#[cfg(feature = "mock")]
pub use mock::{MockJoint, MockModel, MockRobotService, ServiceCall};

/// 服务错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// 服务器找不到指定名称的模型
    UnknownModel,
    /// 当前模型中不存在该关节
    UnknownJoint,
    /// 参数被服务器拒绝（长度不符、边界非法等）
    InvalidArgument,
    /// 模型描述文件加载失败
    LoadFailed,
    /// 尚未加载任何模型
    NotLoaded,
    /// 传输层故障（连接断开、超时等）
    Transport,
    /// 服务器内部错误
    Remote,
}

/// 远程服务错误
///
/// 所有错误都来源于远程服务，本地不做任何恢复，原样向上传播。
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind:?}: {message}")]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unknown_joint(joint_name: &str) -> Self {
        Self::new(
            ServiceErrorKind::UnknownJoint,
            format!("joint {joint_name} does not exist"),
        )
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::InvalidArgument, message)
    }

    /// 句柄是否已不可用（需要重新连接并重新加载模型）
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            ServiceErrorKind::Transport | ServiceErrorKind::LoadFailed
        )
    }
}

impl From<String> for ServiceError {
    fn from(message: String) -> Self {
        Self::new(ServiceErrorKind::Remote, message)
    }
}

impl From<&str> for ServiceError {
    fn from(message: &str) -> Self {
        Self::new(ServiceErrorKind::Remote, message)
    }
}

/// 远程机器人模型服务
///
/// 每个方法对应服务器上的一个操作，一次同步往返。实现者负责传输，
/// 调用方不做重试、超时或缓存。
///
/// 方法均取 `&mut self`：同一个句柄不能被多个调用方并发使用。
pub trait RobotService {
    /// 加载通用机器人模型
    fn load_robot_model(&mut self, request: &LoadRequest) -> Result<(), ServiceError>;

    /// 加载人形机器人模型（参数与 `load_robot_model` 相同）
    fn load_humanoid_model(&mut self, request: &LoadRequest) -> Result<(), ServiceError>;

    /// 配置向量长度
    fn config_size(&mut self) -> Result<usize, ServiceError>;

    /// 速度向量长度（自由度数）
    fn number_dof(&mut self) -> Result<usize, ServiceError>;

    /// 关节名称，顺序与配置向量一致
    fn joint_names(&mut self) -> Result<Vec<String>, ServiceError>;

    /// 关节在当前配置下的位姿
    fn joint_position(&mut self, joint_name: &str) -> Result<Placement, ServiceError>;

    fn joint_number_dof(&mut self, joint_name: &str) -> Result<usize, ServiceError>;

    fn joint_config_size(&mut self, joint_name: &str) -> Result<usize, ServiceError>;

    /// 设置关节边界，每个配置参数一对 `(lower, upper)`
    fn set_joint_bounds(
        &mut self,
        joint_name: &str,
        bounds: &[JointBound],
    ) -> Result<(), ServiceError>;

    fn set_current_config(&mut self, config: &[f64]) -> Result<(), ServiceError>;

    fn current_config(&mut self) -> Result<Vec<f64>, ServiceError>;

    /// 在当前关节边界内均匀采样一个配置
    fn shoot_random_config(&mut self) -> Result<Vec<f64>, ServiceError>;

    /// 当前配置是否有效（无自碰撞、无障碍物碰撞）
    fn collision_test(&mut self) -> Result<bool, ServiceError>;

    fn distances_to_collision(&mut self) -> Result<DistanceReply, ServiceError>;

    fn mass(&mut self) -> Result<f64, ServiceError>;

    /// 质心位置，服务器返回 3 个分量
    fn center_of_mass(&mut self) -> Result<Vec<f64>, ServiceError>;

    /// 质心雅可比矩阵，按行返回
    fn jacobian_center_of_mass(&mut self) -> Result<Vec<Vec<f64>>, ServiceError>;
}

impl<S: RobotService + ?Sized> RobotService for Box<S> {
    fn load_robot_model(&mut self, request: &LoadRequest) -> Result<(), ServiceError> {
        (**self).load_robot_model(request)
    }

    fn load_humanoid_model(&mut self, request: &LoadRequest) -> Result<(), ServiceError> {
        (**self).load_humanoid_model(request)
    }

    fn config_size(&mut self) -> Result<usize, ServiceError> {
        (**self).config_size()
    }

    fn number_dof(&mut self) -> Result<usize, ServiceError> {
        (**self).number_dof()
    }

    fn joint_names(&mut self) -> Result<Vec<String>, ServiceError> {
        (**self).joint_names()
    }

    fn joint_position(&mut self, joint_name: &str) -> Result<Placement, ServiceError> {
        (**self).joint_position(joint_name)
    }

    fn joint_number_dof(&mut self, joint_name: &str) -> Result<usize, ServiceError> {
        (**self).joint_number_dof(joint_name)
    }

    fn joint_config_size(&mut self, joint_name: &str) -> Result<usize, ServiceError> {
        (**self).joint_config_size(joint_name)
    }

    fn set_joint_bounds(
        &mut self,
        joint_name: &str,
        bounds: &[JointBound],
    ) -> Result<(), ServiceError> {
        (**self).set_joint_bounds(joint_name, bounds)
    }

    fn set_current_config(&mut self, config: &[f64]) -> Result<(), ServiceError> {
        (**self).set_current_config(config)
    }

    fn current_config(&mut self) -> Result<Vec<f64>, ServiceError> {
        (**self).current_config()
    }

    fn shoot_random_config(&mut self) -> Result<Vec<f64>, ServiceError> {
        (**self).shoot_random_config()
    }

    fn collision_test(&mut self) -> Result<bool, ServiceError> {
        (**self).collision_test()
    }

    fn distances_to_collision(&mut self) -> Result<DistanceReply, ServiceError> {
        (**self).distances_to_collision()
    }

    fn mass(&mut self) -> Result<f64, ServiceError> {
        (**self).mass()
    }

    fn center_of_mass(&mut self) -> Result<Vec<f64>, ServiceError> {
        (**self).center_of_mass()
    }

    fn jacobian_center_of_mass(&mut self) -> Result<Vec<Vec<f64>>, ServiceError> {
        (**self).jacobian_center_of_mass()
    }
}

/// 服务句柄的获取方式
///
/// 对应"连接到远程服务器"这一步：每次调用返回一个新的、独占的句柄。
pub trait ServiceConnector {
    type Service: RobotService;

    fn connect(&self) -> Result<Self::Service, ServiceError>;
}

impl<F, S> ServiceConnector for F
where
    F: Fn() -> Result<S, ServiceError>,
    S: RobotService,
{
    type Service = S;

    fn connect(&self) -> Result<S, ServiceError> {
        self()
    }
}
