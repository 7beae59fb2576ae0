//! 命令定义和实现

pub mod check;
pub mod config;
pub mod play;
pub mod points;

pub use check::CheckCommand;
pub use config::ConfigCommand;
pub use play::PlayCommand;
pub use points::PointsCommand;
