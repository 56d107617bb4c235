//! ### English
//! GLFW-backed negotiator: an invisible 640x480 window owns the GL context.
//!
//! GLFW reports a desktop GL version that does not map onto the ES profile tags, so this
//! backend never reports a GL version.
//!
//! ### 中文
//! 基于 GLFW 的协商器：由一个不可见的 640x480 window 持有 GL 上下文。
//!
//! GLFW 上报的是桌面 GL 版本，无法映射到 ES profile 标记，因此该后端不上报 GL 版本。
use std::ffi::{CStr, c_void};

use super::ContextNegotiator;
use crate::engine::config::HeadlessConfig;
use crate::engine::diagnostics::{Diagnostics, LogDiagnostics, Severity};
use crate::engine::error::NegotiationError;
use crate::engine::glfw::{GlfwApi, GlfwWindowPtr, HiddenWindowRequest};

const WINDOW_WIDTH: i32 = 640;
const WINDOW_HEIGHT: i32 = 480;

/// ### English
/// Negotiator owning a hidden GLFW window.
///
/// ### 中文
/// 持有隐藏 GLFW window 的协商器。
#[derive(Default)]
pub struct GlfwNegotiator {
    api: Option<GlfwApi>,
    initialized: bool,
    window: Option<GlfwWindowPtr>,
    ready: bool,
    attempted: bool,
}

impl ContextNegotiator for GlfwNegotiator {
    fn negotiate(
        &mut self,
        config: &HeadlessConfig,
        diagnostics: &dyn Diagnostics,
    ) -> Result<(), NegotiationError> {
        if self.attempted {
            return Err(NegotiationError::AlreadyAttempted);
        }
        self.attempted = true;

        let api = GlfwApi::load(&config.glfw_library_candidates())?;
        diagnostics.report(
            Severity::Info,
            &format!("loaded GLFW from {}", api.library_name()),
        );
        let api = self.api.insert(api);

        api.init().map_err(NegotiationError::DisplayInitFailed)?;
        self.initialized = true;
        diagnostics.report(Severity::Info, "initialized GLFW");

        let request = HiddenWindowRequest {
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
            depth_bits: config.requested_depth_bits(),
            debug: config.debug_context,
        };
        let window = unsafe { api.create_hidden_window(request) }
            .map_err(NegotiationError::ContextCreationFailed)?;
        self.window = Some(window);
        diagnostics.report(
            Severity::Info,
            &format!("created hidden {WINDOW_WIDTH}x{WINDOW_HEIGHT} window"),
        );

        self.ready = true;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn make_current(&self, _diagnostics: &dyn Diagnostics) {
        if !self.ready {
            return;
        }
        if let (Some(api), Some(window)) = (&self.api, self.window) {
            unsafe { api.make_current(window) };
        }
    }

    fn gl_version(&self) -> Option<(i32, i32)> {
        None
    }

    fn get_proc_address(&self, name: &CStr) -> *const c_void {
        match (&self.api, self.ready) {
            (Some(api), true) => unsafe { api.get_proc_address(name) },
            _ => std::ptr::null(),
        }
    }

    fn release(&mut self, _diagnostics: &dyn Diagnostics) {
        let Some(api) = self.api.as_ref() else {
            return;
        };
        if self.ready {
            unsafe { api.make_current(std::ptr::null_mut()) };
        }
        self.ready = false;
        if let Some(window) = self.window.take() {
            unsafe { api.destroy_window(window) };
        }
        if std::mem::take(&mut self.initialized) {
            unsafe { api.terminate() };
        }
    }
}

impl Drop for GlfwNegotiator {
    fn drop(&mut self) {
        self.release(&LogDiagnostics);
    }
}
