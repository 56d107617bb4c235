//! ### English
//! C ABI surface for `headless_gl`.
//!
//! All exported symbols are `extern "C"` functions; structs are `#[repr(C)]`.
//! Every function except `headless_gl_call_async` must be called on the thread that created
//! the context.
//!
//! ### 中文
//! `headless_gl` 的 C ABI 接口层。
//!
//! 所有导出符号均为 `extern "C"` 函数；结构体使用 `#[repr(C)]`。
//! 除 `headless_gl_call_async` 外，所有函数都必须在创建上下文的线程上调用。
mod abi;
mod context;

use std::ffi::c_void;

use crate::engine::deferred::CallAsyncHandle;
use crate::engine::headless::{HeadlessContext, RenderEngine};
use crate::engine::profile::OpenGlProfile;

/// ### English
/// C ABI version for `headless_gl`.
///
/// ### 中文
/// `headless_gl` 的 C ABI 版本号。
const HEADLESS_GL_ABI_VERSION: u32 = 1;

#[repr(C)]
#[derive(Clone, Copy)]
/// ### English
/// Engine hooks supplied by the host. Every function pointer may be NULL.
///
/// `set_opengl_profile` receives `100`, `300`, `310` or `320`.
///
/// ### 中文
/// 由宿主提供的引擎钩子。所有函数指针都可以为 NULL。
///
/// `set_opengl_profile` 收到的值为 `100`、`300`、`310` 或 `320`。
pub struct HeadlessGlEngineCallbacks {
    pub user_data: *mut c_void,
    pub initialize_gl: Option<unsafe extern "C" fn(user_data: *mut c_void)>,
    pub pre_delete: Option<unsafe extern "C" fn(user_data: *mut c_void)>,
    pub set_opengl_profile: Option<unsafe extern "C" fn(user_data: *mut c_void, profile: u32)>,
}

impl Default for HeadlessGlEngineCallbacks {
    fn default() -> Self {
        Self {
            user_data: std::ptr::null_mut(),
            initialize_gl: None,
            pre_delete: None,
            set_opengl_profile: None,
        }
    }
}

/// ### English
/// [`RenderEngine`] forwarding to host callbacks.
///
/// ### 中文
/// 转发到宿主回调的 [`RenderEngine`]。
struct ForeignEngine {
    callbacks: HeadlessGlEngineCallbacks,
}

impl RenderEngine for ForeignEngine {
    fn initialize_gl(&mut self) {
        if let Some(initialize_gl) = self.callbacks.initialize_gl {
            unsafe { initialize_gl(self.callbacks.user_data) };
        }
    }

    fn pre_delete(&mut self) {
        if let Some(pre_delete) = self.callbacks.pre_delete {
            unsafe { pre_delete(self.callbacks.user_data) };
        }
    }

    fn set_opengl_profile(&mut self, profile: OpenGlProfile) {
        if let Some(set_opengl_profile) = self.callbacks.set_opengl_profile {
            unsafe { set_opengl_profile(self.callbacks.user_data, profile.as_raw()) };
        }
    }
}

/// ### English
/// Opaque headless context handle.
///
/// ### 中文
/// 不透明的 headless 上下文句柄。
pub struct HeadlessGl {
    context: HeadlessContext<ForeignEngine>,
    /// ### English
    /// Thread-safe submission side of the context's queue, used by `headless_gl_call_async`.
    ///
    /// ### 中文
    /// 上下文队列的线程安全提交端，供 `headless_gl_call_async` 使用。
    calls: CallAsyncHandle,
}

/// ### English
/// Host callback plus its user data, moved onto the GL thread.
///
/// ### 中文
/// 宿主回调及其 user data，被移交到 GL 线程执行。
struct ForeignCall {
    callback: unsafe extern "C" fn(*mut c_void),
    user_data: *mut c_void,
}

// The host guarantees `user_data` may be used from the thread that polls.
unsafe impl Send for ForeignCall {}

impl ForeignCall {
    fn run(self) {
        unsafe { (self.callback)(self.user_data) };
    }
}
