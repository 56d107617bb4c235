//! ### English
//! Context negotiation: one-time acquisition of display, configuration, context and off-screen
//! surface, followed by `make_current` and ordered release.
//!
//! ### 中文
//! 上下文协商：一次性获取 display、配置、上下文与离屏 surface，随后提供 `make_current`
//! 与有序释放。
mod egl;
mod glfw;
#[cfg(feature = "surfman")]
mod surfman;

use std::ffi::{CStr, c_void};

use crate::engine::config::HeadlessConfig;
use crate::engine::diagnostics::Diagnostics;
use crate::engine::error::NegotiationError;

pub use egl::EglNegotiator;
pub use glfw::GlfwNegotiator;
#[cfg(feature = "surfman")]
pub use surfman::SurfmanNegotiator;

/// ### English
/// Negotiator used by [`crate::HeadlessContext`] when none is given explicitly.
///
/// ### 中文
/// 未显式指定时 [`crate::HeadlessContext`] 使用的协商器。
#[cfg(unix)]
pub type DefaultNegotiator = EglNegotiator<crate::engine::driver::EglDriver>;

#[cfg(windows)]
pub type DefaultNegotiator = GlfwNegotiator;

/// ### English
/// A backend that can acquire and own a headless GL context.
///
/// Implementations are driven from a single thread: the thread that calls `negotiate` owns the
/// context and must be the one calling `make_current` and `release`.
///
/// ### 中文
/// 能够获取并持有 headless GL 上下文的后端。
///
/// 实现由单一线程驱动：调用 `negotiate` 的线程持有上下文，也必须是调用 `make_current`
/// 与 `release` 的线程。
pub trait ContextNegotiator {
    /// ### English
    /// Runs the acquisition sequence once. Failures are terminal; later calls return
    /// [`NegotiationError::AlreadyAttempted`].
    ///
    /// ### 中文
    /// 只执行一次获取序列。失败是终止性的；之后的调用返回
    /// [`NegotiationError::AlreadyAttempted`]。
    fn negotiate(
        &mut self,
        config: &HeadlessConfig,
        diagnostics: &dyn Diagnostics,
    ) -> Result<(), NegotiationError>;

    fn is_ready(&self) -> bool;

    /// ### English
    /// Binds the context to the calling thread. No-op when not ready; failures are reported only.
    ///
    /// ### 中文
    /// 将上下文绑定到调用线程。未就绪时为 no-op；失败只上报，不升级。
    fn make_current(&self, diagnostics: &dyn Diagnostics);

    /// ### English
    /// GL `(major, minor)` of the bound context, when the backend can tell.
    ///
    /// ### 中文
    /// 已绑定上下文的 GL `(major, minor)`（后端能提供时）。
    fn gl_version(&self) -> Option<(i32, i32)>;

    /// ### English
    /// Resolves a GL entry point; NULL when not ready or unknown.
    ///
    /// ### 中文
    /// 解析 GL 入口点；未就绪或未知时返回 NULL。
    fn get_proc_address(&self, name: &CStr) -> *const c_void;

    /// ### English
    /// Unbinds (if ready) and releases every acquired handle in reverse dependency order.
    /// Idempotent.
    ///
    /// ### 中文
    /// 解除绑定（若已就绪），并按依赖的逆序释放所有已获取的句柄。幂等。
    fn release(&mut self, diagnostics: &dyn Diagnostics);
}
