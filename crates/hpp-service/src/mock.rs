//! Mock 模型服务
//!
//! 内存中的 `RobotService` 实现，用于在没有远程服务器的情况下测试上层代码。
//!
//! - 按名称注册模型（`register_model`），加载未注册的名称会失败
//! - 记录每一次调用（`calls` / `take_calls`），便于断言调用了哪个远程操作
//! - 支持注入一次性故障（`fail_next` / `fail_after`）
//!
//! 克隆出的句柄共享同一份状态：测试可以把一个克隆交给被测对象，
//! 用另一个克隆检查调用记录。

use crate::types::{DistanceReply, JointBound, LoadRequest, Placement};
use crate::{RobotService, ServiceConnector, ServiceError, ServiceErrorKind};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::Arc;
use tracing::trace;

/// 单位位姿（原点 + 单位四元数，w 在前）
const IDENTITY_PLACEMENT: Placement = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];

/// 默认随机种子（保证测试可复现）
const DEFAULT_SEED: u64 = 0x5eed;

/// Mock 服务记录的调用
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    LoadRobotModel(LoadRequest),
    LoadHumanoidModel(LoadRequest),
    ConfigSize,
    NumberDof,
    JointNames,
    JointPosition(String),
    JointNumberDof(String),
    JointConfigSize(String),
    SetJointBounds {
        joint_name: String,
        bounds: Vec<JointBound>,
    },
    SetCurrentConfig(Vec<f64>),
    CurrentConfig,
    ShootRandomConfig,
    CollisionTest,
    DistancesToCollision,
    Mass,
    CenterOfMass,
    JacobianCenterOfMass,
}

impl ServiceCall {
    /// 是否是模型加载调用（通用或人形）
    pub fn is_load(&self) -> bool {
        matches!(
            self,
            ServiceCall::LoadRobotModel(_) | ServiceCall::LoadHumanoidModel(_)
        )
    }
}

/// 模拟关节
#[derive(Debug, Clone, PartialEq)]
pub struct MockJoint {
    pub name: String,
    pub config_size: usize,
    pub number_dof: usize,
    /// 当前位姿（服务器不做运动学，固定值即可）
    pub placement: Placement,
    /// 每个配置参数一对边界
    pub bounds: Vec<JointBound>,
}

impl MockJoint {
    pub fn new(name: impl Into<String>, config_size: usize, number_dof: usize) -> Self {
        Self {
            name: name.into(),
            config_size,
            number_dof,
            placement: IDENTITY_PLACEMENT,
            bounds: vec![JointBound::new(-PI, PI); config_size],
        }
    }

    /// 单自由度关节（旋转或平移）
    pub fn revolute(name: impl Into<String>) -> Self {
        Self::new(name, 1, 1)
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }
}

/// 模拟模型
#[derive(Debug, Clone, PartialEq)]
pub struct MockModel {
    pub joints: Vec<MockJoint>,
    pub mass: f64,
    pub center_of_mass: [f64; 3],
    /// 质心雅可比（按行）；为 `None` 时返回 3 × dof 的零矩阵
    pub jacobian_center_of_mass: Option<Vec<Vec<f64>>>,
    /// `collision_test` 的返回值
    pub collision_free: bool,
    pub distances: DistanceReply,
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockModel {
    pub fn new() -> Self {
        Self {
            joints: Vec::new(),
            mass: 0.0,
            center_of_mass: [0.0; 3],
            jacobian_center_of_mass: None,
            collision_free: true,
            distances: DistanceReply::default(),
        }
    }

    /// 自由浮动基座：`base_joint_x/y/z` 平移 + `base_joint_SO3` 旋转（四元数，3 自由度）
    pub fn with_free_flyer_base(self) -> Self {
        self.joint(MockJoint::revolute("base_joint_x"))
            .joint(MockJoint::revolute("base_joint_y"))
            .joint(MockJoint::revolute("base_joint_z"))
            .joint(MockJoint::new("base_joint_SO3", 4, 3))
    }

    /// 平面基座：`base_joint_x/y` 平移 + `base_joint_rz` 绕竖直轴旋转
    pub fn with_planar_base(self) -> Self {
        self.joint(MockJoint::revolute("base_joint_x"))
            .joint(MockJoint::revolute("base_joint_y"))
            .joint(MockJoint::revolute("base_joint_rz"))
    }

    pub fn joint(mut self, joint: MockJoint) -> Self {
        self.joints.push(joint);
        self
    }

    pub fn mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn center_of_mass(mut self, com: [f64; 3]) -> Self {
        self.center_of_mass = com;
        self
    }

    pub fn jacobian_center_of_mass(mut self, rows: Vec<Vec<f64>>) -> Self {
        self.jacobian_center_of_mass = Some(rows);
        self
    }

    pub fn collision_free(mut self, collision_free: bool) -> Self {
        self.collision_free = collision_free;
        self
    }

    pub fn distances(mut self, distances: DistanceReply) -> Self {
        self.distances = distances;
        self
    }

    pub fn config_size(&self) -> usize {
        self.joints.iter().map(|j| j.config_size).sum()
    }

    pub fn number_dof(&self) -> usize {
        self.joints.iter().map(|j| j.number_dof).sum()
    }

    fn find_joint(&self, joint_name: &str) -> Result<&MockJoint, ServiceError> {
        self.joints
            .iter()
            .find(|j| j.name == joint_name)
            .ok_or_else(|| ServiceError::unknown_joint(joint_name))
    }

    fn find_joint_mut(&mut self, joint_name: &str) -> Result<&mut MockJoint, ServiceError> {
        self.joints
            .iter_mut()
            .find(|j| j.name == joint_name)
            .ok_or_else(|| ServiceError::unknown_joint(joint_name))
    }
}

/// 已加载到"服务器"上的模型
#[derive(Debug)]
struct LoadedModel {
    name: String,
    model: MockModel,
    current_config: Vec<f64>,
}

#[derive(Debug)]
struct MockState {
    models: HashMap<String, MockModel>,
    loaded: Option<LoadedModel>,
    calls: Vec<ServiceCall>,
    /// (还需放行的调用次数, 到期时返回的错误)
    scheduled_failures: Vec<(usize, ServiceError)>,
    rng: StdRng,
}

/// Mock 模型服务（线程安全，克隆共享状态）
#[derive(Debug, Clone)]
pub struct MockRobotService {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockRobotService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRobotService {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// 指定随机种子（影响 `shoot_random_config`）
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                models: HashMap::new(),
                loaded: None,
                calls: Vec::new(),
                scheduled_failures: Vec::new(),
                rng: StdRng::seed_from_u64(seed),
            })),
        }
    }

    /// 注册一个可加载的模型
    pub fn register_model(&self, name: impl Into<String>, model: MockModel) {
        self.state.lock().models.insert(name.into(), model);
    }

    /// 链式注册
    pub fn with_model(self, name: impl Into<String>, model: MockModel) -> Self {
        self.register_model(name, model);
        self
    }

    /// 下一次调用（任意操作）返回指定错误；可多次调用排队
    pub fn fail_next(&self, error: ServiceError) {
        self.fail_after(0, error);
    }

    /// 放行 `skip` 次调用后，让下一次调用返回指定错误
    pub fn fail_after(&self, skip: usize, error: ServiceError) {
        self.state.lock().scheduled_failures.push((skip, error));
    }

    /// 所有已记录的调用
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.state.lock().calls.clone()
    }

    /// 取出并清空调用记录
    pub fn take_calls(&self) -> Vec<ServiceCall> {
        std::mem::take(&mut self.state.lock().calls)
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// 当前已加载的模型名称
    pub fn loaded_model(&self) -> Option<String> {
        self.state.lock().loaded.as_ref().map(|l| l.name.clone())
    }

    /// 已加载模型中某关节的当前边界
    pub fn joint_bounds(&self, joint_name: &str) -> Option<Vec<JointBound>> {
        let state = self.state.lock();
        let loaded = state.loaded.as_ref()?;
        loaded
            .model
            .joints
            .iter()
            .find(|j| j.name == joint_name)
            .map(|j| j.bounds.clone())
    }

    /// 修改已加载模型的碰撞测试结果
    pub fn set_collision_free(&self, collision_free: bool) {
        if let Some(loaded) = self.state.lock().loaded.as_mut() {
            loaded.model.collision_free = collision_free;
        }
    }

    /// 记录调用并消费一个注入的故障，然后在已加载的模型上执行 `f`
    fn with_loaded<T>(
        &mut self,
        call: ServiceCall,
        f: impl FnOnce(&mut LoadedModel, &mut StdRng) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let mut state = self.state.lock();
        Self::record(&mut state, call)?;
        let MockState { loaded, rng, .. } = &mut *state;
        match loaded.as_mut() {
            Some(loaded) => f(loaded, rng),
            None => Err(ServiceError::new(
                ServiceErrorKind::NotLoaded,
                "no robot model loaded",
            )),
        }
    }

    fn record(state: &mut MockState, call: ServiceCall) -> Result<(), ServiceError> {
        trace!(?call, "mock service call");
        state.calls.push(call);
        let due = state
            .scheduled_failures
            .iter()
            .position(|(skip, _)| *skip == 0);
        let result = match due {
            Some(i) => Err(state.scheduled_failures.remove(i).1),
            None => Ok(()),
        };
        for (skip, _) in state.scheduled_failures.iter_mut() {
            *skip = skip.saturating_sub(1);
        }
        result
    }

    fn load(&mut self, call: ServiceCall, request: &LoadRequest) -> Result<(), ServiceError> {
        let mut state = self.state.lock();
        Self::record(&mut state, call)?;

        if request.package_name.is_empty() || request.urdf_name.is_empty() {
            return Err(ServiceError::new(
                ServiceErrorKind::LoadFailed,
                format!(
                    "cannot locate description of {}: package name and urdf name are required",
                    request.robot_name
                ),
            ));
        }

        let model = state.models.get(&request.robot_name).cloned().ok_or_else(|| {
            ServiceError::new(
                ServiceErrorKind::UnknownModel,
                format!("robot model {} not found", request.robot_name),
            )
        })?;

        let current_config = vec![0.0; model.config_size()];
        state.loaded = Some(LoadedModel {
            name: request.robot_name.clone(),
            model,
            current_config,
        });
        Ok(())
    }
}

impl ServiceConnector for MockRobotService {
    type Service = MockRobotService;

    fn connect(&self) -> Result<MockRobotService, ServiceError> {
        Ok(self.clone())
    }
}

impl RobotService for MockRobotService {
    fn load_robot_model(&mut self, request: &LoadRequest) -> Result<(), ServiceError> {
        self.load(ServiceCall::LoadRobotModel(request.clone()), request)
    }

    fn load_humanoid_model(&mut self, request: &LoadRequest) -> Result<(), ServiceError> {
        self.load(ServiceCall::LoadHumanoidModel(request.clone()), request)
    }

    fn config_size(&mut self) -> Result<usize, ServiceError> {
        self.with_loaded(ServiceCall::ConfigSize, |l, _| Ok(l.model.config_size()))
    }

    fn number_dof(&mut self) -> Result<usize, ServiceError> {
        self.with_loaded(ServiceCall::NumberDof, |l, _| Ok(l.model.number_dof()))
    }

    fn joint_names(&mut self) -> Result<Vec<String>, ServiceError> {
        self.with_loaded(ServiceCall::JointNames, |l, _| {
            Ok(l.model.joints.iter().map(|j| j.name.clone()).collect())
        })
    }

    fn joint_position(&mut self, joint_name: &str) -> Result<Placement, ServiceError> {
        self.with_loaded(ServiceCall::JointPosition(joint_name.to_string()), |l, _| {
            Ok(l.model.find_joint(joint_name)?.placement)
        })
    }

    fn joint_number_dof(&mut self, joint_name: &str) -> Result<usize, ServiceError> {
        self.with_loaded(ServiceCall::JointNumberDof(joint_name.to_string()), |l, _| {
            Ok(l.model.find_joint(joint_name)?.number_dof)
        })
    }

    fn joint_config_size(&mut self, joint_name: &str) -> Result<usize, ServiceError> {
        self.with_loaded(
            ServiceCall::JointConfigSize(joint_name.to_string()),
            |l, _| Ok(l.model.find_joint(joint_name)?.config_size),
        )
    }

    fn set_joint_bounds(
        &mut self,
        joint_name: &str,
        bounds: &[JointBound],
    ) -> Result<(), ServiceError> {
        let call = ServiceCall::SetJointBounds {
            joint_name: joint_name.to_string(),
            bounds: bounds.to_vec(),
        };
        self.with_loaded(call, |l, _| {
            let joint = l.model.find_joint_mut(joint_name)?;
            if bounds.len() != joint.config_size {
                return Err(ServiceError::invalid_argument(format!(
                    "joint {} expects {} bounds, got {}",
                    joint_name,
                    joint.config_size,
                    bounds.len()
                )));
            }
            if let Some(bad) = bounds
                .iter()
                .find(|b| !b.lower.is_finite() || !b.upper.is_finite() || b.lower > b.upper)
            {
                return Err(ServiceError::invalid_argument(format!(
                    "invalid bound [{}, {}] for joint {}",
                    bad.lower, bad.upper, joint_name
                )));
            }
            joint.bounds = bounds.to_vec();
            Ok(())
        })
    }

    fn set_current_config(&mut self, config: &[f64]) -> Result<(), ServiceError> {
        self.with_loaded(ServiceCall::SetCurrentConfig(config.to_vec()), |l, _| {
            let expected = l.model.config_size();
            if config.len() != expected {
                return Err(ServiceError::invalid_argument(format!(
                    "configuration has size {}, expected {}",
                    config.len(),
                    expected
                )));
            }
            l.current_config = config.to_vec();
            Ok(())
        })
    }

    fn current_config(&mut self) -> Result<Vec<f64>, ServiceError> {
        self.with_loaded(ServiceCall::CurrentConfig, |l, _| Ok(l.current_config.clone()))
    }

    fn shoot_random_config(&mut self) -> Result<Vec<f64>, ServiceError> {
        self.with_loaded(ServiceCall::ShootRandomConfig, |l, rng| {
            let config: Vec<f64> = l
                .model
                .joints
                .iter()
                .flat_map(|j| j.bounds.iter())
                .map(|b| {
                    if b.lower < b.upper {
                        rng.gen_range(b.lower..=b.upper)
                    } else {
                        b.lower
                    }
                })
                .collect();
            Ok(config)
        })
    }

    fn collision_test(&mut self) -> Result<bool, ServiceError> {
        self.with_loaded(ServiceCall::CollisionTest, |l, _| Ok(l.model.collision_free))
    }

    fn distances_to_collision(&mut self) -> Result<DistanceReply, ServiceError> {
        self.with_loaded(ServiceCall::DistancesToCollision, |l, _| {
            Ok(l.model.distances.clone())
        })
    }

    fn mass(&mut self) -> Result<f64, ServiceError> {
        self.with_loaded(ServiceCall::Mass, |l, _| Ok(l.model.mass))
    }

    fn center_of_mass(&mut self) -> Result<Vec<f64>, ServiceError> {
        self.with_loaded(ServiceCall::CenterOfMass, |l, _| {
            Ok(l.model.center_of_mass.to_vec())
        })
    }

    fn jacobian_center_of_mass(&mut self) -> Result<Vec<Vec<f64>>, ServiceError> {
        self.with_loaded(ServiceCall::JacobianCenterOfMass, |l, _| {
            Ok(match &l.model.jacobian_center_of_mass {
                Some(rows) => rows.clone(),
                None => vec![vec![0.0; l.model.number_dof()]; 3],
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RootJointType;

    fn request(name: &str) -> LoadRequest {
        LoadRequest {
            robot_name: name.to_string(),
            root_joint_type: RootJointType::FreeFlyer,
            package_name: "hpp_tutorial".to_string(),
            urdf_name: "pr2".to_string(),
            urdf_suffix: String::new(),
            srdf_suffix: String::new(),
        }
    }

    fn loaded_service() -> MockRobotService {
        let mut service = MockRobotService::new().with_model(
            "pr2",
            MockModel::new()
                .with_planar_base()
                .joint(MockJoint::revolute("torso_lift_joint")),
        );
        service.load_robot_model(&request("pr2")).unwrap();
        service
    }

    #[test]
    fn test_queries_before_load_fail() {
        let mut service = MockRobotService::new();
        let err = service.config_size().unwrap_err();
        assert_eq!(err.kind, ServiceErrorKind::NotLoaded);
        assert_eq!(service.calls(), vec![ServiceCall::ConfigSize]);
    }

    #[test]
    fn test_load_unknown_model() {
        let mut service = MockRobotService::new();
        let err = service.load_robot_model(&request("romeo")).unwrap_err();
        assert_eq!(err.kind, ServiceErrorKind::UnknownModel);
        assert_eq!(service.loaded_model(), None);
    }

    #[test]
    fn test_load_without_package_fails() {
        let mut service = MockRobotService::new().with_model("pr2", MockModel::new());
        let mut req = request("pr2");
        req.package_name.clear();
        let err = service.load_robot_model(&req).unwrap_err();
        assert_eq!(err.kind, ServiceErrorKind::LoadFailed);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_sizes() {
        let mut service = loaded_service();
        assert_eq!(service.config_size().unwrap(), 4);
        assert_eq!(service.number_dof().unwrap(), 4);
        assert_eq!(service.joint_config_size("base_joint_rz").unwrap(), 1);
        assert_eq!(service.joint_number_dof("base_joint_rz").unwrap(), 1);
        assert_eq!(
            service.joint_config_size("nope").unwrap_err().kind,
            ServiceErrorKind::UnknownJoint
        );
    }

    #[test]
    fn test_set_joint_bounds_validation() {
        let mut service = loaded_service();
        let err = service
            .set_joint_bounds(
                "base_joint_x",
                &[JointBound::new(-1.0, 1.0), JointBound::new(-1.0, 1.0)],
            )
            .unwrap_err();
        assert_eq!(err.kind, ServiceErrorKind::InvalidArgument);

        let err = service
            .set_joint_bounds("base_joint_x", &[JointBound::new(1.0, -1.0)])
            .unwrap_err();
        assert_eq!(err.kind, ServiceErrorKind::InvalidArgument);

        service
            .set_joint_bounds("base_joint_x", &[JointBound::new(-2.0, 3.0)])
            .unwrap();
        assert_eq!(
            service.joint_bounds("base_joint_x"),
            Some(vec![JointBound::new(-2.0, 3.0)])
        );
    }

    #[test]
    fn test_random_config_respects_bounds() {
        let mut service = loaded_service();
        service
            .set_joint_bounds("base_joint_x", &[JointBound::new(0.5, 0.75)])
            .unwrap();
        service
            .set_joint_bounds("base_joint_y", &[JointBound::new(2.0, 2.0)])
            .unwrap();
        for _ in 0..100 {
            let q = service.shoot_random_config().unwrap();
            assert_eq!(q.len(), 4);
            assert!((0.5..=0.75).contains(&q[0]), "q[0] = {}", q[0]);
            assert_eq!(q[1], 2.0);
        }
    }

    #[test]
    fn test_random_config_is_reproducible() {
        let mut a = loaded_service();
        let mut b = loaded_service();
        assert_eq!(
            a.shoot_random_config().unwrap(),
            b.shoot_random_config().unwrap()
        );
    }

    #[test]
    fn test_fail_next_is_consumed_once() {
        let mut service = loaded_service();
        service.fail_next(ServiceError::new(ServiceErrorKind::Transport, "COMM_FAILURE"));
        assert_eq!(
            service.mass().unwrap_err().kind,
            ServiceErrorKind::Transport
        );
        assert!(service.mass().is_ok());
    }

    #[test]
    fn test_fail_after_skips_calls() {
        let mut service = loaded_service();
        service.fail_after(2, ServiceError::invalid_argument("third call"));
        assert!(service.mass().is_ok());
        assert!(service.number_dof().is_ok());
        assert_eq!(
            service.config_size().unwrap_err().kind,
            ServiceErrorKind::InvalidArgument
        );
        assert!(service.config_size().is_ok());
    }

    #[test]
    fn test_queued_failures_keep_order() {
        let mut service = loaded_service();
        service.fail_next(ServiceError::invalid_argument("first"));
        service.fail_next(ServiceError::new(ServiceErrorKind::Remote, "second"));
        assert_eq!(service.mass().unwrap_err().message, "first");
        assert_eq!(service.mass().unwrap_err().message, "second");
        assert!(service.mass().is_ok());
    }

    #[test]
    fn test_clones_share_state() {
        let mut service = loaded_service();
        let observer = service.clone();
        observer.take_calls();
        service.collision_test().unwrap();
        observer.set_collision_free(false);
        assert!(!service.collision_test().unwrap());
        assert_eq!(observer.call_count(), 2);
    }

    #[test]
    fn test_free_flyer_sizes_differ() {
        let mut service = MockRobotService::new()
            .with_model("hrp2", MockModel::new().with_free_flyer_base());
        service.load_humanoid_model(&request("hrp2")).unwrap();
        assert_eq!(service.config_size().unwrap(), 7);
        assert_eq!(service.number_dof().unwrap(), 6);
        assert!(service.calls()[0].is_load());
    }

    #[test]
    fn test_default_jacobian_shape() {
        let mut service = loaded_service();
        let rows = service.jacobian_center_of_mass().unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.len() == 4));
    }
}
