//! ### English
//! Logger initialization for hosts that do not install their own `log` backend.
//!
//! ### 中文
//! 为未自行安装 `log` 后端的宿主提供日志初始化。
mod init;

pub use init::{LoggingConfig, init_logging};
