/// ### English
/// `headless_gl` crate root.
/// A windowless OpenGL context for rendering engines, plus a C ABI via `ffi`; the core
/// implementation lives under `engine`.
///
/// ### 中文
/// `headless_gl` 的 crate 根。
/// 为渲染引擎提供无窗口 OpenGL 上下文，并通过 `ffi` 导出 C ABI；核心实现位于 `engine` 模块。
mod engine;
mod ffi;
pub mod logging;

pub use engine::config::{Conformance, EGL_LIBRARY_ENV, HeadlessConfig};
pub use engine::deferred::{CallAsyncHandle, DeferredCall, DeferredCallQueue};
pub use engine::diagnostics::{Diagnostics, LogDiagnostics, Severity};
#[cfg(unix)]
pub use engine::driver::EglDriver;
pub use engine::driver::{ConfigAttribs, ContextAttribs, Driver};
pub use engine::error::{DriverError, LoadError, NegotiationError};
pub use engine::headless::{HeadlessContext, RenderEngine};
#[cfg(feature = "surfman")]
pub use engine::negotiator::SurfmanNegotiator;
pub use engine::negotiator::{ContextNegotiator, DefaultNegotiator, EglNegotiator, GlfwNegotiator};
pub use engine::profile::OpenGlProfile;
