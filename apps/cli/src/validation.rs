//! 输入验证模块
//!
//! 把命令行文本解析为关节角度和末端位姿，并检查文件路径

use anyhow::{Context, Result};
use jaka_teach::parse_joint_targets;
use jaka_types::{CartesianPose, Deg, JOINT_COUNT, JointArray};
use std::path::Path;

/// 解析逗号分隔的 6 个关节角度（度）
///
/// # 错误
/// 如果：
/// - 数量不是 6 个
/// - 任何一项不是数字
pub fn parse_joint_list(input: &str) -> Result<JointArray<Deg>> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    let parts: [&str; JOINT_COUNT] = parts
        .as_slice()
        .try_into()
        .map_err(|_| anyhow::anyhow!("需要 {} 个关节角度，得到 {} 个", JOINT_COUNT, parts.len()))?;

    Ok(parse_joint_targets(&parts)?)
}

/// 解析末端位姿 `x,y,z,rx,ry,rz`（mm / 度）
pub fn parse_cartesian(input: &str) -> Result<CartesianPose> {
    let values: Vec<f64> = input
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("无效的位姿格式: {input:?}"))?;

    let [x, y, z, rx, ry, rz] = values[..] else {
        anyhow::bail!("需要 6 个位姿分量 (x,y,z,rx,ry,rz)，得到 {} 个", values.len());
    };

    let pose = CartesianPose::from_degrees(x, y, z, Deg(rx), Deg(ry), Deg(rz));
    if !pose.is_finite() {
        anyhow::bail!("位姿分量必须为有限值");
    }
    Ok(pose)
}

/// 文件路径验证器
#[derive(Debug, Default)]
pub struct PathValidator {
    /// 是否检查文件存在
    check_exists: bool,
}

impl PathValidator {
    /// 创建新的路径验证器
    pub fn new() -> Self {
        Self::default()
    }

    /// 要求文件存在
    pub fn must_exist(mut self) -> Self {
        self.check_exists = true;
        self
    }

    /// 验证文件路径
    pub fn validate_path(&self, path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            anyhow::bail!("文件路径为空");
        }

        if self.check_exists && !path.is_file() {
            anyhow::bail!("文件不存在: {}", path.display());
        }

        Ok(())
    }

    /// 验证输出路径（目录必须存在）
    pub fn validate_output_path(&self, path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            anyhow::bail!("文件路径为空");
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            anyhow::bail!("输出目录不存在: {}", parent.display());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jaka_types::{Joint, Rad};

    #[test]
    fn test_parse_joint_list() {
        let targets = parse_joint_list("0, 90, -45.5, 90, 0, 0").unwrap();
        assert_eq!(targets[Joint::J2], Deg(90.0));
        assert_eq!(targets[Joint::J3], Deg(-45.5));
    }

    #[test]
    fn test_parse_joint_list_wrong_count() {
        let err = parse_joint_list("0,1,2").unwrap_err();
        assert!(err.to_string().contains("得到 3 个"));
    }

    #[test]
    fn test_parse_joint_list_not_a_number() {
        assert!(parse_joint_list("0,1,2,abc,4,5").is_err());
    }

    #[test]
    fn test_parse_cartesian() {
        let pose = parse_cartesian("100,200,300,0,0,180").unwrap();
        assert_eq!(pose.x, 100.0);
        assert_eq!(pose.z, 300.0);
        assert_eq!(pose.rx, Rad(0.0));
        assert!((pose.rz.0 - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_parse_cartesian_invalid() {
        assert!(parse_cartesian("1,2,3").is_err());
        assert!(parse_cartesian("1,2,x,0,0,0").is_err());
        assert!(parse_cartesian("1,2,inf,0,0,0").is_err());
    }

    #[test]
    fn test_path_validator() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("points.txt");

        assert!(PathValidator::new().validate_path(&file).is_ok());
        assert!(PathValidator::new().must_exist().validate_path(&file).is_err());

        std::fs::write(&file, "").unwrap();
        assert!(PathValidator::new().must_exist().validate_path(&file).is_ok());
        assert!(PathValidator::new().validate_path(Path::new("")).is_err());
    }

    #[test]
    fn test_output_path_parent_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let validator = PathValidator::new();

        assert!(validator.validate_output_path(&dir.path().join("out.txt")).is_ok());
        assert!(
            validator
                .validate_output_path(&dir.path().join("missing").join("out.txt"))
                .is_err()
        );
        assert!(validator.validate_output_path(Path::new("out.txt")).is_ok());
    }
}
