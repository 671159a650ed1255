//! Builder 模式实现
//!
//! 提供链式构造 `Robot` 实例的便捷方式。

use crate::config::{ConfigError, DEFAULT_TF_ROOT, ModelDescription, ModelKind, RobotConfig};
use crate::error::RobotError;
use crate::robot::Robot;
use hpp_service::{RobotService, RootJointType, ServiceConnector};

/// Robot Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use hpp_robot::{ModelDescription, RobotBuilder};
/// use hpp_service::{RootJointType, ServiceConnector};
///
/// fn hrp2<C: ServiceConnector>(connector: &C) -> Result<(), hpp_robot::RobotError> {
///     let mut robot = RobotBuilder::new("hrp2_14")
///         .root_joint_type(RootJointType::FreeFlyer)
///         .humanoid()
///         .description(
///             ModelDescription::new("hrp2_14_description", "hrp2_14").with_urdf_suffix("_capsule"),
///         )
///         .build(connector)?;
///     println!("mass: {}", robot.mass()?);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RobotBuilder {
    /// 服务器上的模型名称
    robot_name: String,
    /// 根关节类型（默认自由浮动）
    root_joint_type: RootJointType,
    /// 加载策略（默认通用模型）
    model_kind: ModelKind,
    /// TF 根坐标系
    tf_root: String,
    /// 描述文件位置（必填）
    description: Option<ModelDescription>,
}

impl RobotBuilder {
    pub fn new(robot_name: impl Into<String>) -> Self {
        Self {
            robot_name: robot_name.into(),
            root_joint_type: RootJointType::default(),
            model_kind: ModelKind::default(),
            tf_root: DEFAULT_TF_ROOT.to_string(),
            description: None,
        }
    }

    pub fn root_joint_type(mut self, root_joint_type: RootJointType) -> Self {
        self.root_joint_type = root_joint_type;
        self
    }

    pub fn model_kind(mut self, model_kind: ModelKind) -> Self {
        self.model_kind = model_kind;
        self
    }

    /// 使用人形模型加载操作
    pub fn humanoid(self) -> Self {
        self.model_kind(ModelKind::Humanoid)
    }

    pub fn tf_root(mut self, tf_root: impl Into<String>) -> Self {
        self.tf_root = tf_root.into();
        self
    }

    pub fn description(mut self, description: ModelDescription) -> Self {
        self.description = Some(description);
        self
    }

    /// 生成并校验配置
    ///
    /// # Errors
    /// - `RobotError::Config`: 未设置描述文件位置，或必填字段为空
    pub fn into_config(self) -> Result<RobotConfig, RobotError> {
        let description = self
            .description
            .ok_or(ConfigError::MissingField("description"))?;
        let config = RobotConfig {
            robot_name: self.robot_name,
            root_joint_type: self.root_joint_type,
            model_kind: self.model_kind,
            tf_root: self.tf_root,
            description,
        };
        config.validate()?;
        Ok(config)
    }

    /// 连接服务并加载模型
    pub fn build<C: ServiceConnector>(self, connector: &C) -> Result<Robot<C::Service>, RobotError> {
        let config = self.into_config()?;
        Robot::connect(connector, &config)
    }

    /// 在已有的服务句柄上加载模型
    pub fn build_with_service<S: RobotService>(self, service: S) -> Result<Robot<S>, RobotError> {
        let config = self.into_config()?;
        Robot::load(service, &config)
    }
}

impl From<RobotConfig> for RobotBuilder {
    fn from(config: RobotConfig) -> Self {
        Self {
            robot_name: config.robot_name,
            root_joint_type: config.root_joint_type,
            model_kind: config.model_kind,
            tf_root: config.tf_root,
            description: Some(config.description),
        }
    }
}
