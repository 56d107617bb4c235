//! ### English
//! Minimal GLFW dynamic loader.
//! Used by the GLFW negotiator to own an invisible window whose context acts as the headless
//! context.
//!
//! ### 中文
//! 最小化的 GLFW 动态加载器。
//! 供 GLFW 协商器使用：持有一个不可见 window，其上下文作为 headless 上下文。

use std::ffi::{CStr, c_char, c_int, c_void};

use crate::engine::error::{DriverError, LoadError};
use crate::engine::loader::DynamicLibrary;

#[repr(C)]
/// ### English
/// Opaque GLFW window type (`GLFWwindow`).
///
/// ### 中文
/// 不透明 GLFW window 类型（`GLFWwindow`）。
pub(crate) struct GLFWwindow {
    _private: [u8; 0],
}

#[repr(C)]
pub(crate) struct GLFWmonitor {
    _private: [u8; 0],
}

/// ### English
/// Raw window pointer type used by this crate (alias for `*mut GLFWwindow`).
///
/// ### 中文
/// 本 crate 使用的 window 裸指针类型（`*mut GLFWwindow` 的别名）。
pub(crate) type GlfwWindowPtr = *mut GLFWwindow;

type GLFWglproc = *const c_void;
type GlfwInit = unsafe extern "C" fn() -> c_int;
type GlfwTerminate = unsafe extern "C" fn();
type GlfwGetError = unsafe extern "C" fn(*mut *const c_char) -> c_int;
type GlfwGetProcAddress = unsafe extern "C" fn(*const c_char) -> GLFWglproc;
type GlfwMakeContextCurrent = unsafe extern "C" fn(*mut GLFWwindow);
type GlfwDefaultWindowHints = unsafe extern "C" fn();
type GlfwWindowHint = unsafe extern "C" fn(c_int, c_int);
type GlfwCreateWindow = unsafe extern "C" fn(
    c_int,
    c_int,
    *const c_char,
    *mut GLFWmonitor,
    *mut GLFWwindow,
) -> *mut GLFWwindow;
type GlfwDestroyWindow = unsafe extern "C" fn(*mut GLFWwindow);

const GLFW_FALSE: c_int = 0;
const GLFW_TRUE: c_int = 1;

const GLFW_VISIBLE: c_int = 0x0002_0004;
const GLFW_FOCUSED: c_int = 0x0002_0001;
const GLFW_DEPTH_BITS: c_int = 0x0002_1005;
const GLFW_OPENGL_DEBUG_CONTEXT: c_int = 0x0002_2007;

/// ### English
/// Parameters of the hidden window backing the context.
///
/// ### 中文
/// 承载上下文的隐藏 window 参数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HiddenWindowRequest {
    pub(crate) width: c_int,
    pub(crate) height: c_int,
    pub(crate) depth_bits: c_int,
    pub(crate) debug: bool,
}

/// ### English
/// Loaded minimal GLFW API (init/terminate, hidden window, context control, proc loading).
///
/// ### 中文
/// 已加载的最小 GLFW API（初始化/终止、隐藏 window、上下文控制、函数指针加载）。
pub(crate) struct GlfwApi {
    init: GlfwInit,
    terminate: GlfwTerminate,
    /// ### English
    /// `glfwGetError` only exists since GLFW 3.3.
    ///
    /// ### 中文
    /// `glfwGetError` 自 GLFW 3.3 起才存在。
    get_error: Option<GlfwGetError>,
    get_proc_address: GlfwGetProcAddress,
    make_context_current: GlfwMakeContextCurrent,
    default_window_hints: GlfwDefaultWindowHints,
    window_hint: GlfwWindowHint,
    create_window: GlfwCreateWindow,
    destroy_window: GlfwDestroyWindow,
    library: DynamicLibrary,
}

/// # Safety
/// `T` must be the function pointer type of the symbol `name`.
unsafe fn required<T: Copy>(lib: &DynamicLibrary, name: &'static CStr) -> Result<T, LoadError> {
    unsafe { lib.symbol(name) }.ok_or(LoadError::MissingSymbol(name.to_str().unwrap_or("?")))
}

impl GlfwApi {
    /// ### English
    /// Opens the first loadable GLFW library of `names` and resolves the required symbols.
    ///
    /// ### 中文
    /// 打开 `names` 中第一个可加载的 GLFW 库，并解析所需符号。
    pub(crate) fn load(names: &[String]) -> Result<Self, LoadError> {
        let library = DynamicLibrary::open_first(names)?;
        Ok(Self {
            init: unsafe { required(&library, c"glfwInit")? },
            terminate: unsafe { required(&library, c"glfwTerminate")? },
            get_error: unsafe { library.symbol(c"glfwGetError") },
            get_proc_address: unsafe { required(&library, c"glfwGetProcAddress")? },
            make_context_current: unsafe { required(&library, c"glfwMakeContextCurrent")? },
            default_window_hints: unsafe { required(&library, c"glfwDefaultWindowHints")? },
            window_hint: unsafe { required(&library, c"glfwWindowHint")? },
            create_window: unsafe { required(&library, c"glfwCreateWindow")? },
            destroy_window: unsafe { required(&library, c"glfwDestroyWindow")? },
            library,
        })
    }

    pub(crate) fn library_name(&self) -> &str {
        self.library.name()
    }

    fn error(&self, call: &'static str) -> DriverError {
        let code = match self.get_error {
            Some(get_error) => unsafe { get_error(std::ptr::null_mut()) },
            None => 0,
        };
        DriverError::Call { call, code }
    }

    /// ### English
    /// Calls `glfwInit`.
    ///
    /// ### 中文
    /// 调用 `glfwInit`。
    pub(crate) fn init(&self) -> Result<(), DriverError> {
        if unsafe { (self.init)() } == GLFW_TRUE {
            Ok(())
        } else {
            Err(self.error("glfwInit"))
        }
    }

    /// # Safety
    /// Must run on the thread that called [`GlfwApi::init`], after every window was destroyed.
    pub(crate) unsafe fn terminate(&self) {
        unsafe { (self.terminate)() };
    }

    /// ### English
    /// Creates an invisible, unfocused window. Window hints are reset afterwards.
    ///
    /// ### 中文
    /// 创建一个不可见、不获取焦点的 window。创建后重置 window hints。
    pub(crate) unsafe fn create_hidden_window(
        &self,
        request: HiddenWindowRequest,
    ) -> Result<GlfwWindowPtr, DriverError> {
        unsafe {
            (self.default_window_hints)();
            (self.window_hint)(GLFW_VISIBLE, GLFW_FALSE);
            (self.window_hint)(GLFW_FOCUSED, GLFW_FALSE);
            (self.window_hint)(GLFW_DEPTH_BITS, request.depth_bits);
            if request.debug {
                (self.window_hint)(GLFW_OPENGL_DEBUG_CONTEXT, GLFW_TRUE);
            }
        }

        let title = c"headless_gl";
        let window = unsafe {
            (self.create_window)(
                request.width,
                request.height,
                title.as_ptr(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            )
        };
        unsafe { (self.default_window_hints)() };

        if window.is_null() {
            return Err(self.error("glfwCreateWindow"));
        }
        Ok(window)
    }

    /// ### English
    /// Makes `window` current on the calling thread; NULL releases the current context.
    ///
    /// ### 中文
    /// 将 `window` 设为调用线程的 current 上下文；NULL 表示释放当前上下文。
    pub(crate) unsafe fn make_current(&self, window: GlfwWindowPtr) {
        unsafe { (self.make_context_current)(window) };
    }

    /// # Safety
    /// A context created through this API must be current on the calling thread.
    pub(crate) unsafe fn get_proc_address(&self, name: &CStr) -> *const c_void {
        unsafe { (self.get_proc_address)(name.as_ptr()) }
    }

    pub(crate) unsafe fn destroy_window(&self, window: GlfwWindowPtr) {
        unsafe { (self.destroy_window)(window) };
    }
}
