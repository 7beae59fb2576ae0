//! check 命令
//!
//! 对给定角度执行关节限位校验，不连接执行器

use crate::validation::parse_joint_list;
use anyhow::Result;
use clap::{ArgGroup, Args};
use jaka_types::{Deg, JAKA_JOINT_LIMITS, Joint, ValidationError};

/// 校验命令参数
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["joint", "joints"])))]
pub struct CheckCommand {
    /// 关节编号（1-6）
    #[arg(long, requires = "deg")]
    pub joint: Option<usize>,

    /// 目标角度（度），与 --joint 配合使用
    #[arg(long, allow_hyphen_values = true, requires = "joint")]
    pub deg: Option<f64>,

    /// 全部 6 个关节的角度（度），逗号分隔
    #[arg(long, allow_hyphen_values = true)]
    pub joints: Option<String>,
}

/// 单项校验结果
#[derive(Debug)]
pub struct Verdict {
    pub joint_number: usize,
    pub value: Deg,
    pub result: Result<(), ValidationError>,
}

impl CheckCommand {
    /// 计算所有校验结果
    pub fn verdicts(&self) -> Result<Vec<Verdict>> {
        if let Some(joints) = &self.joints {
            let targets = parse_joint_list(joints)?;
            return Ok(Joint::ALL
                .iter()
                .map(|&joint| Verdict {
                    joint_number: joint.number(),
                    value: targets[joint],
                    result: JAKA_JOINT_LIMITS.check(joint, targets[joint]),
                })
                .collect());
        }

        match (self.joint, self.deg) {
            (Some(joint_number), Some(deg)) => Ok(vec![Verdict {
                joint_number,
                value: Deg(deg),
                result: JAKA_JOINT_LIMITS.validate(joint_number, Deg(deg)),
            }]),
            _ => anyhow::bail!("需要 --joint N --deg D 或 --joints a,b,c,d,e,f"),
        }
    }

    pub fn execute(&self) -> Result<()> {
        let verdicts = self.verdicts()?;
        let mut failures = 0;

        for verdict in &verdicts {
            match &verdict.result {
                Ok(()) => {
                    let range = Joint::from_number(verdict.joint_number)
                        .map(|joint| JAKA_JOINT_LIMITS.range(joint));
                    match range {
                        Some(range) => println!(
                            "✅ J{}: {} 在 [{}, {}]° 内",
                            verdict.joint_number, verdict.value, range.min, range.max
                        ),
                        None => println!("✅ J{}: {}", verdict.joint_number, verdict.value),
                    }
                },
                Err(e) => {
                    failures += 1;
                    println!("❌ {}", e);
                },
            }
        }

        if failures > 0 {
            anyhow::bail!("{} 项校验失败", failures);
        }
        Ok(())
    }
}
