/// ### English
/// Engine internal modules (driver loading, context negotiation, deferred calls).
///
/// ### 中文
/// 引擎内部模块（驱动加载、上下文协商、延迟调用）。
pub mod config;
pub mod deferred;
pub mod diagnostics;
pub mod driver;
pub mod error;
pub(crate) mod glfw;
pub mod headless;
pub(crate) mod loader;
pub(crate) mod lockfree;
pub mod negotiator;
pub mod profile;
