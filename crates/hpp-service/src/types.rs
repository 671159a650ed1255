//! 线上数据形状
//!
//! 这些类型与服务器接口的参数、返回值一一对应，不做任何语义转换。
//! 强类型的视图（`nalgebra` 位姿、矩阵等）由上层 `hpp-robot` 提供。

use std::fmt;
use std::str::FromStr;

/// 关节位姿的线上形状：平移 `(x, y, z)` 加单位四元数 `(w, x, y, z)`
pub type Placement = [f64; 7];

/// 根关节类型
///
/// 决定模型如何挂接到世界坐标系上。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RootJointType {
    /// 固定在世界坐标系上
    Anchor,
    /// 自由浮动（三维平移 + 三维旋转）
    #[default]
    FreeFlyer,
    /// 平面运动（x, y 平移 + 绕 z 轴旋转）
    Planar,
}

impl RootJointType {
    /// 服务器使用的字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            RootJointType::Anchor => "anchor",
            RootJointType::FreeFlyer => "freeflyer",
            RootJointType::Planar => "planar",
        }
    }
}

impl fmt::Display for RootJointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RootJointType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anchor" => Ok(RootJointType::Anchor),
            "freeflyer" => Ok(RootJointType::FreeFlyer),
            "planar" => Ok(RootJointType::Planar),
            other => Err(format!("unknown root joint type: {other}")),
        }
    }
}

/// 模型加载请求
///
/// 通用加载与人形加载使用完全相同的参数。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadRequest {
    /// 模型名称
    pub robot_name: String,
    /// 根关节类型
    pub root_joint_type: RootJointType,
    /// 描述文件所在的 ROS package
    pub package_name: String,
    /// URDF 文件名（不含后缀）
    pub urdf_name: String,
    /// URDF 文件名后缀
    pub urdf_suffix: String,
    /// SRDF 文件名后缀
    pub srdf_suffix: String,
}

/// 单个配置参数的上下界
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointBound {
    pub lower: f64,
    pub upper: f64,
}

impl JointBound {
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// 展平为服务器接受的 `[min0, max0, min1, max1, ...]` 形式
    pub fn flatten(bounds: &[JointBound]) -> Vec<f64> {
        bounds.iter().flat_map(|b| [b.lower, b.upper]).collect()
    }
}

impl From<(f64, f64)> for JointBound {
    fn from((lower, upper): (f64, f64)) -> Self {
        Self { lower, upper }
    }
}

/// 距离查询应答
///
/// 五个序列按碰撞对下标对齐。外部对象也可能是另一个刚体的内部对象。
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceReply {
    /// 每个碰撞对的距离
    pub distances: Vec<f64>,
    /// 属于刚体的对象名称
    pub inner_objects: Vec<String>,
    /// 与内部对象一起测试的对象名称
    pub outer_objects: Vec<String>,
    /// 刚体上的最近点
    pub inner_points: Vec<[f64; 3]>,
    /// 障碍物上的最近点
    pub outer_points: Vec<[f64; 3]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_joint_type_strings() {
        for kind in [
            RootJointType::Anchor,
            RootJointType::FreeFlyer,
            RootJointType::Planar,
        ] {
            assert_eq!(kind.as_str().parse::<RootJointType>(), Ok(kind));
        }
        assert!("floating".parse::<RootJointType>().is_err());
        assert_eq!(RootJointType::default(), RootJointType::FreeFlyer);
        assert_eq!(format!("{}", RootJointType::Planar), "planar");
    }

    #[test]
    fn test_joint_bound_flatten() {
        let bounds = [JointBound::new(-1.0, 1.0), (0.0, 2.5).into()];
        assert_eq!(JointBound::flatten(&bounds), vec![-1.0, 1.0, 0.0, 2.5]);
        assert!(JointBound::flatten(&[]).is_empty());
    }
}
