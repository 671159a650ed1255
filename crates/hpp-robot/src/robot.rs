//! 机器人模型客户端
//!
//! `Robot` 在构造时让远程服务加载一个命名模型，并在本地缓存关节名称和
//! 两张位置索引（配置向量、速度向量）。其余所有操作都是一次同步的远程
//! 调用，错误原样传播，不重试、不缓存。

use crate::config::{ModelDescription, ModelKind, RobotConfig};
use crate::error::RobotError;
use crate::rank::RankIndex;
use crate::types::{
    DistancesToCollision, matrix_from_rows, placement_to_isometry, vector3_from_reply,
};
use hpp_service::{JointBound, RobotService, RootJointType, ServiceConnector};
use nalgebra::{DMatrix, Isometry3, Vector3};
use tracing::{debug, info, trace, warn};

/// 自由浮动根关节的 x 方向平移关节
pub const BASE_JOINT_X: &str = "base_joint_x";
/// 自由浮动根关节的 y 方向平移关节
pub const BASE_JOINT_Y: &str = "base_joint_y";
/// 竖直方向平移关节（三维自由浮动基座）
pub const BASE_JOINT_Z: &str = "base_joint_z";
/// 绕竖直轴旋转的关节（平面基座）
pub const BASE_JOINT_RZ: &str = "base_joint_rz";

/// 远程机器人模型的本地门面
///
/// 独占一个服务句柄；不能被多个调用方并发使用。
///
/// # Example
///
/// ```no_run
/// use hpp_robot::{ModelDescription, Robot, RobotConfig};
/// use hpp_service::{RootJointType, ServiceConnector};
///
/// fn run<C: ServiceConnector>(connector: &C) -> Result<(), hpp_robot::RobotError> {
///     let config = RobotConfig::new(
///         "pr2",
///         RootJointType::Planar,
///         ModelDescription::new("hpp_tutorial", "pr2"),
///     );
///     let mut robot = Robot::connect(connector, &config)?;
///     robot.set_translation_bounds(-4.0, -3.0, -5.0, -3.0, -1.0, 1.0)?;
///     let q = robot.shoot_random_config()?;
///     robot.set_current_config(&q)?;
///     println!("valid: {}", robot.collision_test()?);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Robot<S: RobotService> {
    service: S,
    name: String,
    root_joint_type: RootJointType,
    model_kind: ModelKind,
    description: ModelDescription,
    tf_root: String,
    joint_names: Vec<String>,
    rank_in_configuration: RankIndex,
    rank_in_velocity: RankIndex,
}

impl<S: RobotService> Robot<S> {
    /// 通过连接器获取服务句柄并加载模型
    pub fn connect<C>(connector: &C, config: &RobotConfig) -> Result<Self, RobotError>
    where
        C: ServiceConnector<Service = S>,
    {
        config.validate()?;
        let service = connector.connect()?;
        Self::load(service, config)
    }

    /// 在给定的服务句柄上加载模型，并构建位置索引
    ///
    /// # Errors
    /// - `RobotError::Config`: 配置不完整（在任何远程调用之前）
    /// - `RobotError::Service`: 加载或查询关节信息失败
    pub fn load(mut service: S, config: &RobotConfig) -> Result<Self, RobotError> {
        config.validate()?;

        info!(
            robot = %config.robot_name,
            root_joint = %config.root_joint_type,
            kind = ?config.model_kind,
            package = %config.description.package_name,
            "Loading robot model"
        );
        config
            .model_kind
            .load(&mut service, &config.load_request())?;

        let joint_names = service.joint_names()?;
        let mut config_sizes = Vec::with_capacity(joint_names.len());
        let mut dofs = Vec::with_capacity(joint_names.len());
        for joint in &joint_names {
            config_sizes.push((joint.clone(), service.joint_config_size(joint)?));
            dofs.push((joint.clone(), service.joint_number_dof(joint)?));
        }
        let rank_in_configuration: RankIndex = config_sizes.into_iter().collect();
        let rank_in_velocity: RankIndex = dofs.into_iter().collect();

        debug!(
            joints = joint_names.len(),
            config_size = rank_in_configuration.total(),
            number_dof = rank_in_velocity.total(),
            "Built joint rank indices"
        );

        Ok(Self {
            service,
            name: config.robot_name.clone(),
            root_joint_type: config.root_joint_type,
            model_kind: config.model_kind,
            description: config.description.clone(),
            tf_root: config.tf_root.clone(),
            joint_names,
            rank_in_configuration,
            rank_in_velocity,
        })
    }

    // ==================== 本地缓存 ====================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_joint_type(&self) -> RootJointType {
        self.root_joint_type
    }

    pub fn model_kind(&self) -> ModelKind {
        self.model_kind
    }

    pub fn description(&self) -> &ModelDescription {
        &self.description
    }

    /// 显示客户端使用的 TF 根坐标系
    pub fn tf_root(&self) -> &str {
        &self.tf_root
    }

    /// 加载时获取的关节名称
    pub fn cached_joint_names(&self) -> &[String] {
        &self.joint_names
    }

    /// 每个关节在配置向量中的起始下标
    pub fn rank_in_configuration(&self) -> &RankIndex {
        &self.rank_in_configuration
    }

    /// 每个关节在速度向量中的起始下标
    pub fn rank_in_velocity(&self) -> &RankIndex {
        &self.rank_in_velocity
    }

    /// 配置向量中属于某个关节的部分
    pub fn joint_config<'q>(&self, q: &'q [f64], joint_name: &str) -> Option<&'q [f64]> {
        q.get(self.rank_in_configuration.range(joint_name)?)
    }

    /// 速度向量中属于某个关节的部分
    pub fn joint_velocity<'v>(&self, v: &'v [f64], joint_name: &str) -> Option<&'v [f64]> {
        v.get(self.rank_in_velocity.range(joint_name)?)
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }

    pub fn into_service(self) -> S {
        self.service
    }

    // ==================== 自由度 ====================

    /// 配置向量长度
    pub fn config_size(&mut self) -> Result<usize, RobotError> {
        Ok(self.service.config_size()?)
    }

    /// 速度向量长度
    pub fn number_dof(&mut self) -> Result<usize, RobotError> {
        Ok(self.service.number_dof()?)
    }

    // ==================== 关节 ====================

    /// 关节名称，顺序与配置向量一致
    pub fn joint_names(&mut self) -> Result<Vec<String>, RobotError> {
        Ok(self.service.joint_names()?)
    }

    /// 关节在当前配置下的位姿
    pub fn joint_position(&mut self, joint_name: &str) -> Result<Isometry3<f64>, RobotError> {
        trace!(joint = joint_name, "getJointPosition");
        let placement = self.service.joint_position(joint_name)?;
        placement_to_isometry(&placement)
    }

    pub fn joint_number_dof(&mut self, joint_name: &str) -> Result<usize, RobotError> {
        Ok(self.service.joint_number_dof(joint_name)?)
    }

    pub fn joint_config_size(&mut self, joint_name: &str) -> Result<usize, RobotError> {
        Ok(self.service.joint_config_size(joint_name)?)
    }

    /// 设置关节边界，每个配置参数一对 `(lower, upper)`
    pub fn set_joint_bounds(
        &mut self,
        joint_name: &str,
        bounds: &[JointBound],
    ) -> Result<(), RobotError> {
        debug!(joint = joint_name, ?bounds, "setJointBounds");
        Ok(self.service.set_joint_bounds(joint_name, bounds)?)
    }

    /// 设置自由浮动根关节平移部分的边界
    ///
    /// 先设置 `base_joint_x`、`base_joint_y`；竖直方向的边界设置在
    /// `base_joint_z` 上（如果存在），否则设置在 `base_joint_rz` 上。
    ///
    /// # Errors
    /// - `RobotError::MissingJoint`: 两者都不存在，此时不会发出任何远程调用
    pub fn set_translation_bounds(
        &mut self,
        xmin: f64,
        xmax: f64,
        ymin: f64,
        ymax: f64,
        zmin: f64,
        zmax: f64,
    ) -> Result<(), RobotError> {
        let vertical = self.vertical_base_joint().ok_or_else(|| {
            warn!(
                robot = %self.name,
                "No {} or {} joint, model has no free-flyer root",
                BASE_JOINT_Z,
                BASE_JOINT_RZ
            );
            RobotError::MissingJoint {
                candidates: vec![BASE_JOINT_Z.to_string(), BASE_JOINT_RZ.to_string()],
            }
        })?;

        self.set_joint_bounds(BASE_JOINT_X, &[JointBound::new(xmin, xmax)])?;
        self.set_joint_bounds(BASE_JOINT_Y, &[JointBound::new(ymin, ymax)])?;
        self.set_joint_bounds(vertical, &[JointBound::new(zmin, zmax)])
    }

    /// 竖直方向的基座关节名称
    fn vertical_base_joint(&self) -> Option<&'static str> {
        [BASE_JOINT_Z, BASE_JOINT_RZ]
            .into_iter()
            .find(|candidate| self.joint_names.iter().any(|j| j.contains(*candidate)))
    }

    // ==================== 配置 ====================

    /// 设置组合机器人的当前配置
    pub fn set_current_config(&mut self, q: &[f64]) -> Result<(), RobotError> {
        debug!(len = q.len(), "setCurrentConfig");
        Ok(self.service.set_current_config(q)?)
    }

    /// 组合机器人的当前配置
    pub fn current_config(&mut self) -> Result<Vec<f64>, RobotError> {
        Ok(self.service.current_config()?)
    }

    /// 在当前关节边界内随机采样一个配置
    pub fn shoot_random_config(&mut self) -> Result<Vec<f64>, RobotError> {
        Ok(self.service.shoot_random_config()?)
    }

    // ==================== 碰撞检测与距离 ====================

    /// 当前配置是否有效（与障碍物及自身均无碰撞）
    pub fn collision_test(&mut self) -> Result<bool, RobotError> {
        Ok(self.service.collision_test()?)
    }

    /// 计算各刚体与障碍物之间的距离
    pub fn distances_to_collision(&mut self) -> Result<DistancesToCollision, RobotError> {
        let reply = self.service.distances_to_collision()?;
        DistancesToCollision::try_from(reply)
    }

    // ==================== 质量与惯性 ====================

    pub fn mass(&mut self) -> Result<f64, RobotError> {
        Ok(self.service.mass()?)
    }

    /// 当前配置下的质心位置
    pub fn center_of_mass(&mut self) -> Result<Vector3<f64>, RobotError> {
        let com = self.service.center_of_mass()?;
        vector3_from_reply(&com, "center of mass")
    }

    /// 质心位置关于速度参数的雅可比矩阵
    pub fn jacobian_center_of_mass(&mut self) -> Result<DMatrix<f64>, RobotError> {
        let rows = self.service.jacobian_center_of_mass()?;
        matrix_from_rows(&rows, "center of mass jacobian")
    }
}
