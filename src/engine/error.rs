//! ### English
//! Error types for driver calls, runtime library loading and context negotiation.
//!
//! ### 中文
//! 驱动调用、运行时库加载与上下文协商的错误类型。

use thiserror::Error;

/// ### English
/// Failure of a single platform driver call.
///
/// ### 中文
/// 单次平台驱动调用的失败。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("{call} failed (error 0x{code:04x})")]
    Call { call: &'static str, code: i32 },

    #[error("{0} returned no result")]
    NoResult(&'static str),

    #[error("driver entry point `{0}` is not available")]
    MissingEntryPoint(&'static str),

    /// ### English
    /// Failure reported by a backend that has its own error type (e.g. surfman).
    ///
    /// ### 中文
    /// 自带错误类型的后端（例如 surfman）上报的失败。
    #[error("{call} failed: {message}")]
    Backend { call: &'static str, message: String },
}

/// ### English
/// Failure to load a driver library or one of its symbols at runtime.
///
/// ### 中文
/// 运行时加载驱动库或其符号失败。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("none of the libraries {0:?} could be loaded")]
    LibraryNotFound(Vec<String>),

    #[error("symbol `{0}` not found")]
    MissingSymbol(&'static str),

    #[error("{0}")]
    Unsupported(&'static str),
}

/// ### English
/// Terminal failure of the one-time context negotiation.
///
/// Each variant names the acquisition step that failed; the object stays inert afterwards.
///
/// ### 中文
/// 一次性上下文协商的终止性失败。
///
/// 每个变体对应失败的获取步骤；失败后对象保持惰性（不可用但安全）。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NegotiationError {
    #[error("driver is unavailable: {0}")]
    DriverUnavailable(#[from] LoadError),

    #[error("failed to find any devices: {0}")]
    NoDeviceFound(#[source] DriverError),

    #[error("failed to create display: {0}")]
    DisplayAcquisitionFailed(#[source] DriverError),

    #[error("failed to initialize display: {0}")]
    DisplayInitFailed(#[source] DriverError),

    #[error("failed to find a matching config: {0}")]
    NoMatchingConfiguration(#[source] DriverError),

    #[error("failed to create context: {0}")]
    ContextCreationFailed(#[source] DriverError),

    #[error("failed to create surface: {0}")]
    SurfaceCreationFailed(#[source] DriverError),

    #[error("negotiation was already attempted")]
    AlreadyAttempted,
}
