//! ### English
//! Minimal runtime loader for driver libraries (`libEGL`, GLFW).
//!
//! Loading at runtime keeps the crate free of link-time driver dependencies: a missing driver
//! becomes a reported negotiation failure instead of a startup error.
//!
//! ### 中文
//! 驱动库的最小运行时加载器（`libEGL`、GLFW）。
//!
//! 运行时加载使 crate 不依赖链接期驱动：缺失驱动只会成为一次被报告的协商失败，而不是启动错误。
#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub(crate) use unix::DynamicLibrary;
#[cfg(windows)]
pub(crate) use windows::DynamicLibrary;
