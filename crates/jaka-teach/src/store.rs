//! 示教点位存储与文件格式
//!
//! # 文件格式
//!
//! UTF-8 文本，每行一个点位：
//!
//! ```text
//! name|delaySeconds|j1,j2,j3,j4,j5,j6
//! ```
//!
//! - 关节角为弧度，保留 6 位小数
//! - 延时为最短的可往返十进制表示（`1.5`、`0`）
//! - 少于 3 个字段的行被跳过，空行被跳过
//! - 数字解析失败、关节数不是 6、延时不在 `[0, 86400]` 秒内：整个加载失败
//!
//! 加载先解析到新的列表，成功后才替换存储内容；失败时存储保持不变。

use crate::error::StoreError;
use jaka_actuator::ActuatorSession;
use jaka_types::{JOINT_COUNT, JointPose, Rad, ValidationError, validate_delay};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// 字段分隔符
const FIELD_SEPARATOR: char = '|';
/// 关节值分隔符
const JOINT_SEPARATOR: char = ',';

/// 示教点位
#[derive(Debug, Clone, PartialEq)]
pub struct TaughtPoint {
    name: String,
    pose: JointPose,
    delay_secs: f64,
}

impl TaughtPoint {
    /// 创建点位
    ///
    /// 名称中的分隔符和换行会被替换为 `_`，保证可以写入文件。
    ///
    /// # 错误
    ///
    /// 延时不在 `[0, MAX_DELAY_SECS]` 内时返回 [`ValidationError::InvalidDelay`]。
    pub fn new(
        name: impl Into<String>,
        pose: JointPose,
        delay_secs: f64,
    ) -> Result<Self, ValidationError> {
        validate_delay(delay_secs)?;
        let name = name
            .into()
            .replace([FIELD_SEPARATOR, '\n', '\r'], "_");
        Ok(Self {
            name,
            pose,
            delay_secs,
        })
    }

    /// 名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 关节位置（弧度）
    pub fn pose(&self) -> &JointPose {
        &self.pose
    }

    /// 到位后的停留时间（秒）
    pub fn delay_secs(&self) -> f64 {
        self.delay_secs
    }

    /// 到位后的停留时间
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_secs).unwrap_or(Duration::MAX)
    }

    /// 编码为文件中的一行（不含换行符）
    pub fn encode(&self) -> String {
        let joints = self
            .pose
            .iter()
            .map(|r| format!("{:.6}", r.0))
            .collect::<Vec<_>>()
            .join(",");
        format!("{}|{}|{}", self.name, self.delay_secs, joints)
    }
}

/// 操作员看到的列表行：`[name] (0.0°, ...) Delay: 1.5s`
impl fmt::Display for TaughtPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} Delay: {:.1}s",
            self.name,
            self.pose.to_degrees(),
            self.delay_secs
        )
    }
}

/// 解码一行
///
/// - `Ok(None)`：空行或字段不足，跳过
/// - `position`：该点在新列表中的序号（从 0 开始），用于生成默认名称
fn decode_line(
    line_number: usize,
    line: &str,
    position: usize,
) -> Result<Option<TaughtPoint>, StoreError> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() < 3 {
        warn!(
            "Skipping line {}: expected 3 fields, found {}",
            line_number,
            fields.len()
        );
        return Ok(None);
    }

    let malformed = |reason: String| StoreError::Malformed {
        line: line_number,
        reason,
    };

    let delay_secs: f64 = fields[1]
        .trim()
        .parse()
        .map_err(|_| malformed(format!("invalid delay {:?}", fields[1])))?;
    validate_delay(delay_secs).map_err(|e| malformed(e.to_string()))?;

    let joints = fields[2]
        .split(JOINT_SEPARATOR)
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .ok_or_else(|| malformed(format!("invalid joint value {:?}", v)))
        })
        .collect::<Result<Vec<f64>, StoreError>>()?;
    let joints: [f64; JOINT_COUNT] = joints.as_slice().try_into().map_err(|_| {
        malformed(format!(
            "expected {} joint values, found {}",
            JOINT_COUNT,
            joints.len()
        ))
    })?;

    let name = if fields[0].is_empty() {
        default_name(position)
    } else {
        fields[0].to_string()
    };

    let pose = JointPose::new(joints.map(Rad));
    TaughtPoint::new(name, pose, delay_secs)
        .map(Some)
        .map_err(|e| malformed(e.to_string()))
}

/// 第 `position` 个点的默认名称（`Point1`、`Point2`……）
fn default_name(position: usize) -> String {
    format!("Point{}", position + 1)
}

/// 解码整个文件内容
pub fn decode(content: &str) -> Result<Vec<TaughtPoint>, StoreError> {
    let mut points = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if let Some(point) = decode_line(i + 1, line, points.len())? {
            points.push(point);
        }
    }
    Ok(points)
}

/// 编码点位列表
pub fn encode(points: &[TaughtPoint]) -> String {
    let mut out = String::new();
    for point in points {
        out.push_str(&point.encode());
        out.push('\n');
    }
    out
}

/// 有序的示教点位列表
///
/// 插入顺序即回放顺序，允许重复点位。
#[derive(Debug, Clone, Default)]
pub struct PointStore {
    points: Vec<TaughtPoint>,
}

impl PointStore {
    /// 创建空存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 点位数
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 按序号获取
    pub fn get(&self, index: usize) -> Option<&TaughtPoint> {
        self.points.get(index)
    }

    /// 遍历
    pub fn iter(&self) -> std::slice::Iter<'_, TaughtPoint> {
        self.points.iter()
    }

    /// 拷贝一份快照（交给回放线程）
    pub fn snapshot(&self) -> Vec<TaughtPoint> {
        self.points.clone()
    }

    /// 下一个点的默认名称
    pub fn next_default_name(&self) -> String {
        default_name(self.points.len())
    }

    /// 追加点位
    pub fn push(&mut self, point: TaughtPoint) -> &TaughtPoint {
        self.points.push(point);
        &self.points[self.points.len() - 1]
    }

    /// 清空
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// 记录当前位置
    ///
    /// # 参数
    ///
    /// - `name`: 名称，`None` 或空白时使用 `Point<N>`
    /// - `delay_secs`: 到位后的停留时间，`None` 时为 0
    ///
    /// # 错误
    ///
    /// - 未连接：[`StoreError::NotReady`]
    /// - 延时无效：[`StoreError::Validation`]
    /// - 读取位置失败：[`StoreError::Actuator`]
    pub fn record(
        &mut self,
        session: &ActuatorSession,
        name: Option<&str>,
        delay_secs: Option<f64>,
    ) -> Result<&TaughtPoint, StoreError> {
        if !session.is_connected() {
            return Err(StoreError::NotReady);
        }
        let delay_secs = delay_secs.unwrap_or(0.0);
        validate_delay(delay_secs)?;

        let pose = session.actuator().joint_pose()?;
        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => self.next_default_name(),
        };
        let point = TaughtPoint::new(name, pose, delay_secs)?;
        info!("Recorded '{}' (delay {:.1}s)", point.name(), point.delay_secs());
        Ok(self.push(point))
    }

    /// 编码全部点位
    ///
    /// 存储为空时返回 [`StoreError::NothingToSave`]。
    pub fn encode(&self) -> Result<String, StoreError> {
        if self.points.is_empty() {
            return Err(StoreError::NothingToSave);
        }
        Ok(encode(&self.points))
    }

    /// 保存到文件，返回写入的点位数
    ///
    /// 存储为空时不触碰文件系统。
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<usize, StoreError> {
        let path = path.as_ref();
        let content = self.encode()?;
        fs::write(path, content).map_err(|e| StoreError::io(path, e))?;
        info!("Saved {} points to {}", self.points.len(), path.display());
        Ok(self.points.len())
    }

    /// 从文件加载并替换全部点位，返回加载的点位数
    ///
    /// 失败时存储保持不变。
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, StoreError> {
        let points = read_file(path.as_ref())?;
        self.points = points;
        Ok(self.points.len())
    }
}

/// 读取并解码点位文件（不修改任何存储）
pub fn read_file(path: &Path) -> Result<Vec<TaughtPoint>, StoreError> {
    let content = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let points = decode(&content)?;
    info!("Loaded {} points from {}", points.len(), path.display());
    Ok(points)
}

impl<'a> IntoIterator for &'a PointStore {
    type Item = &'a TaughtPoint;
    type IntoIter = std::slice::Iter<'a, TaughtPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
