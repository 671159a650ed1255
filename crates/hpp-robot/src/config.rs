//! # 模型配置
//!
//! 服务器定位模型描述文件所需的参数，以及加载一个模型的完整配置。
//!
//! 配置文件为 TOML 格式：
//!
//! ```toml
//! robot_name = "pr2"
//! root_joint_type = "planar"
//! model_kind = "generic"
//!
//! [description]
//! package_name = "hpp_tutorial"
//! urdf_name = "pr2"
//! urdf_suffix = ""
//! srdf_suffix = ""
//! ```

use hpp_service::{LoadRequest, RobotService, RootJointType, ServiceError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// 默认的 TF 根坐标系
pub const DEFAULT_TF_ROOT: &str = "base_link";

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// 必填字段为空
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// 模型加载策略
///
/// 人形模型使用服务器上专门的加载操作，参数完全相同。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    #[default]
    Generic,
    Humanoid,
}

impl ModelKind {
    /// 调用对应的远程加载操作
    pub fn load<S: RobotService + ?Sized>(
        &self,
        service: &mut S,
        request: &LoadRequest,
    ) -> Result<(), ServiceError> {
        match self {
            ModelKind::Generic => service.load_robot_model(request),
            ModelKind::Humanoid => service.load_humanoid_model(request),
        }
    }
}

/// 模型描述文件位置
///
/// 服务器据此在磁盘上找到 `<package>/urdf/<urdf_name><urdf_suffix>.urdf`
/// 与对应的 SRDF 文件。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescription {
    pub package_name: String,
    pub urdf_name: String,
    #[serde(default)]
    pub urdf_suffix: String,
    #[serde(default)]
    pub srdf_suffix: String,
}

impl ModelDescription {
    pub fn new(package_name: impl Into<String>, urdf_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            urdf_name: urdf_name.into(),
            urdf_suffix: String::new(),
            srdf_suffix: String::new(),
        }
    }

    pub fn with_urdf_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.urdf_suffix = suffix.into();
        self
    }

    pub fn with_srdf_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.srdf_suffix = suffix.into();
        self
    }

    /// 后缀可以为空，package 和 URDF 名称不行
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.package_name.trim().is_empty() {
            return Err(ConfigError::MissingField("package_name"));
        }
        if self.urdf_name.trim().is_empty() {
            return Err(ConfigError::MissingField("urdf_name"));
        }
        Ok(())
    }
}

/// 加载一个模型所需的完整配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotConfig {
    pub robot_name: String,
    #[serde(default)]
    pub root_joint_type: RootJointType,
    #[serde(default)]
    pub model_kind: ModelKind,
    #[serde(default = "default_tf_root")]
    pub tf_root: String,
    pub description: ModelDescription,
}

fn default_tf_root() -> String {
    DEFAULT_TF_ROOT.to_string()
}

impl RobotConfig {
    pub fn new(
        robot_name: impl Into<String>,
        root_joint_type: RootJointType,
        description: ModelDescription,
    ) -> Self {
        Self {
            robot_name: robot_name.into(),
            root_joint_type,
            model_kind: ModelKind::Generic,
            tf_root: default_tf_root(),
            description,
        }
    }

    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RobotConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.robot_name.trim().is_empty() {
            return Err(ConfigError::MissingField("robot_name"));
        }
        self.description.validate()
    }

    /// 构造发送给服务器的加载请求
    pub fn load_request(&self) -> LoadRequest {
        LoadRequest {
            robot_name: self.robot_name.clone(),
            root_joint_type: self.root_joint_type,
            package_name: self.description.package_name.clone(),
            urdf_name: self.description.urdf_name.clone(),
            urdf_suffix: self.description.urdf_suffix.clone(),
            srdf_suffix: self.description.srdf_suffix.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PR2_TOML: &str = r#"
robot_name = "pr2"
root_joint_type = "planar"

[description]
package_name = "hpp_tutorial"
urdf_name = "pr2"
srdf_suffix = "_manipulation"
"#;

    #[test]
    fn test_parse_with_defaults() {
        let config = RobotConfig::from_toml_str(PR2_TOML).unwrap();
        assert_eq!(config.robot_name, "pr2");
        assert_eq!(config.root_joint_type, RootJointType::Planar);
        assert_eq!(config.model_kind, ModelKind::Generic);
        assert_eq!(config.tf_root, DEFAULT_TF_ROOT);
        assert_eq!(config.description.urdf_suffix, "");
        assert_eq!(config.description.srdf_suffix, "_manipulation");
    }

    #[test]
    fn test_parse_humanoid() {
        let config = RobotConfig::from_toml_str(
            r#"
robot_name = "hrp2_14"
root_joint_type = "freeflyer"
model_kind = "humanoid"
tf_root = "base_footprint"

[description]
package_name = "hrp2_14_description"
urdf_name = "hrp2_14"
urdf_suffix = "_capsule"
"#,
        )
        .unwrap();
        assert_eq!(config.model_kind, ModelKind::Humanoid);
        assert_eq!(config.tf_root, "base_footprint");
    }

    #[test]
    fn test_parse_rejects_empty_package() {
        let err = RobotConfig::from_toml_str(
            r#"
robot_name = "pr2"
[description]
package_name = ""
urdf_name = "pr2"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("package_name")));
    }

    #[test]
    fn test_parse_rejects_missing_description() {
        let err = RobotConfig::from_toml_str(r#"robot_name = "pr2""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn test_parse_rejects_unknown_root_joint() {
        let err = RobotConfig::from_toml_str(
            r#"
robot_name = "pr2"
root_joint_type = "floating"
[description]
package_name = "hpp_tutorial"
urdf_name = "pr2"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PR2_TOML.as_bytes()).unwrap();
        let config = RobotConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.description.package_name, "hpp_tutorial");

        let err = RobotConfig::load_from_file("/nonexistent/hpp/robot.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_description_validate() {
        assert!(ModelDescription::new("pkg", "robot").validate().is_ok());
        assert!(matches!(
            ModelDescription::new("pkg", " ").validate(),
            Err(ConfigError::MissingField("urdf_name"))
        ));
    }

    #[test]
    fn test_load_request_carries_all_fields() {
        let config = RobotConfig::new(
            "romeo",
            RootJointType::FreeFlyer,
            ModelDescription::new("romeo_description", "romeo")
                .with_urdf_suffix("_small")
                .with_srdf_suffix("_moveit"),
        );
        let request = config.load_request();
        assert_eq!(
            request,
            LoadRequest {
                robot_name: "romeo".to_string(),
                root_joint_type: RootJointType::FreeFlyer,
                package_name: "romeo_description".to_string(),
                urdf_name: "romeo".to_string(),
                urdf_suffix: "_small".to_string(),
                srdf_suffix: "_moveit".to_string(),
            }
        );
    }
}
