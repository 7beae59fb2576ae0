//! 运行模式
//!
//! - One-shot 模式：`config` / `check` / `points` / `play`，见 [`crate::commands`]
//! - REPL 模式：交互式示教 Shell

pub mod repl;
