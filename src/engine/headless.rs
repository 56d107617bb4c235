//! ### English
//! Headless context: composes a negotiator, a deferred call queue and the rendering engine into
//! the `create → make_current → poll → destroy` lifecycle.
//!
//! ### 中文
//! headless 上下文：将协商器、延迟调用队列与渲染引擎组合为
//! `create → make_current → poll → destroy` 生命周期。

use std::ffi::{CStr, c_void};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::engine::config::HeadlessConfig;
use crate::engine::deferred::{CallAsyncHandle, DeferredCallQueue};
use crate::engine::diagnostics::{Diagnostics, LogDiagnostics, Severity};
use crate::engine::negotiator::{ContextNegotiator, DefaultNegotiator};
use crate::engine::profile::OpenGlProfile;

/// ### English
/// Hooks the headless context calls on the rendering engine.
///
/// ### 中文
/// headless 上下文对渲染引擎调用的钩子。
pub trait RenderEngine {
    /// ### English
    /// Called exactly once, with the context current, after a successful negotiation.
    ///
    /// ### 中文
    /// 协商成功后、上下文处于 current 状态时恰好调用一次。
    fn initialize_gl(&mut self);

    /// ### English
    /// Called once on destruction, before any driver resource is released.
    ///
    /// ### 中文
    /// 销毁时调用一次，早于任何驱动资源的释放。
    fn pre_delete(&mut self);

    /// ### English
    /// Called at most once, before `initialize_gl`, when the GL version maps onto a profile tag.
    ///
    /// ### 中文
    /// 当 GL 版本能映射为 profile 标记时，在 `initialize_gl` 之前最多调用一次。
    fn set_opengl_profile(&mut self, profile: OpenGlProfile) {
        let _ = profile;
    }
}

/// ### English
/// Windowless GL context driving a [`RenderEngine`].
///
/// Negotiation happens in the constructor. A failed negotiation is reported through the
/// diagnostics sink and leaves the object inert: `make_current` does nothing, `poll` still runs
/// queued callbacks, and the engine never sees `initialize_gl`.
///
/// The context is bound to the thread that created it (`!Send`); other threads schedule work
/// with [`Self::call_async_handle`].
///
/// ### 中文
/// 驱动 [`RenderEngine`] 的无窗口 GL 上下文。
///
/// 协商在构造函数中完成。协商失败会通过诊断接口上报，并使对象保持惰性：`make_current`
/// 不做任何事，`poll` 仍会执行已排队的回调，引擎不会收到 `initialize_gl`。
///
/// 上下文绑定到创建它的线程（`!Send`）；其他线程通过 [`Self::call_async_handle`] 调度工作。
pub struct HeadlessContext<E: RenderEngine, N: ContextNegotiator = DefaultNegotiator> {
    engine: E,
    negotiator: N,
    queue: Arc<DeferredCallQueue>,
    diagnostics: Arc<dyn Diagnostics>,
    profile: Option<OpenGlProfile>,
    _thread_bound: PhantomData<*const ()>,
}

impl<E: RenderEngine> HeadlessContext<E> {
    /// ### English
    /// Creates a context with the platform default negotiator and the `log`-backed diagnostics.
    ///
    /// #### Parameters
    /// - `engine`: Rendering engine receiving the lifecycle hooks.
    /// - `enable_depth_buffer`: Request a 24-bit depth buffer.
    ///
    /// ### 中文
    /// 使用平台默认协商器与基于 `log` 的诊断创建上下文。
    ///
    /// #### 参数
    /// - `engine`：接收生命周期钩子的渲染引擎。
    /// - `enable_depth_buffer`：是否请求 24 位深度缓冲。
    pub fn new(engine: E, enable_depth_buffer: bool) -> Self {
        let config = HeadlessConfig::default().with_depth_buffer(enable_depth_buffer);
        Self::with_config(engine, &config)
    }

    pub fn with_config(engine: E, config: &HeadlessConfig) -> Self {
        Self::with_negotiator(
            engine,
            DefaultNegotiator::default(),
            config,
            Arc::new(LogDiagnostics),
        )
    }
}

impl<E: RenderEngine, N: ContextNegotiator> HeadlessContext<E, N> {
    /// ### English
    /// Creates a context on an explicit negotiator backend and diagnostics sink.
    ///
    /// ### 中文
    /// 使用显式指定的协商器后端与诊断接口创建上下文。
    pub fn with_negotiator(
        engine: E,
        negotiator: N,
        config: &HeadlessConfig,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        let mut ctx = Self {
            engine,
            negotiator,
            queue: Arc::new(DeferredCallQueue::new()),
            diagnostics,
            profile: None,
            _thread_bound: PhantomData,
        };
        ctx.initialize(config);
        ctx
    }

    fn initialize(&mut self, config: &HeadlessConfig) {
        if let Err(err) = self.negotiator.negotiate(config, &*self.diagnostics) {
            self.diagnostics
                .report(Severity::Error, &format!("headless context unavailable: {err}"));
            return;
        }

        self.negotiator.make_current(&*self.diagnostics);

        if let Some((major, minor)) = self.negotiator.gl_version() {
            match OpenGlProfile::from_version(major, minor) {
                Some(profile) => {
                    self.diagnostics.report(
                        Severity::Info,
                        &format!("GL {major}.{minor}, using profile {profile:?}"),
                    );
                    self.profile = Some(profile);
                    self.engine.set_opengl_profile(profile);
                }
                None => self.diagnostics.report(
                    Severity::Info,
                    &format!("GL {major}.{minor} has no profile tag; keeping the engine default"),
                ),
            }
        }

        self.engine.initialize_gl();
    }

    /// ### English
    /// Binds the context to the calling thread. No-op when negotiation failed.
    ///
    /// ### 中文
    /// 将上下文绑定到调用线程。协商失败时为 no-op。
    pub fn make_current(&self) {
        self.negotiator.make_current(&*self.diagnostics);
    }

    /// ### English
    /// Runs every queued callback on the calling thread, in submission order. Returns how many ran.
    ///
    /// ### 中文
    /// 在调用线程上按提交顺序执行所有已排队的回调。返回执行数量。
    pub fn poll(&self) -> usize {
        self.queue.drain()
    }

    /// ### English
    /// Schedules `callback` for the next [`Self::poll`].
    ///
    /// ### 中文
    /// 调度 `callback`，在下一次 [`Self::poll`] 时执行。
    pub fn call_async<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.submit(callback);
    }

    /// ### English
    /// Handle for scheduling callbacks from other threads.
    ///
    /// ### 中文
    /// 用于从其他线程调度回调的句柄。
    pub fn call_async_handle(&self) -> CallAsyncHandle {
        CallAsyncHandle::new(self.queue.clone())
    }

    pub fn is_ready(&self) -> bool {
        self.negotiator.is_ready()
    }

    /// ### English
    /// Profile tag passed to the engine, if the GL version was recognized.
    ///
    /// ### 中文
    /// 传给引擎的 profile 标记（GL 版本可识别时）。
    pub fn opengl_profile(&self) -> Option<OpenGlProfile> {
        self.profile
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// ### English
    /// Resolves a GL entry point for the engine's function loader; NULL when not ready.
    ///
    /// ### 中文
    /// 为引擎的函数加载器解析 GL 入口点；未就绪时返回 NULL。
    pub fn get_proc_address(&self, name: &CStr) -> *const c_void {
        self.negotiator.get_proc_address(name)
    }

    /// ### English
    /// Explicit destruction; equivalent to dropping the context.
    ///
    /// ### 中文
    /// 显式销毁；等价于 drop 该上下文。
    pub fn destroy(self) {
        drop(self);
    }
}

impl<E: RenderEngine, N: ContextNegotiator> Drop for HeadlessContext<E, N> {
    fn drop(&mut self) {
        if self.negotiator.is_ready() {
            self.negotiator.make_current(&*self.diagnostics);
        }
        self.engine.pre_delete();
        self.negotiator.release(&*self.diagnostics);
    }
}
