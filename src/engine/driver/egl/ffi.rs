//! ### English
//! EGL types, constants and the function table resolved from `libEGL` at runtime.
//!
//! ### 中文
//! EGL 类型、常量，以及运行时从 `libEGL` 解析出的函数表。
#![allow(non_camel_case_types)]

use std::ffi::{CStr, c_char, c_void};

use crate::engine::error::LoadError;
use crate::engine::loader::DynamicLibrary;

pub(crate) type EGLDisplay = *mut c_void;
pub(crate) type EGLConfig = *mut c_void;
pub(crate) type EGLContext = *mut c_void;
pub(crate) type EGLSurface = *mut c_void;
pub(crate) type EGLDeviceEXT = *mut c_void;
pub(crate) type EGLint = i32;
pub(crate) type EGLBoolean = u32;
pub(crate) type EGLenum = u32;
pub(crate) type EGLAttrib = isize;

pub(crate) const EGL_TRUE: EGLBoolean = 1;
pub(crate) const EGL_NONE: EGLint = 0x3038;
pub(crate) const EGL_NO_CONTEXT: EGLContext = std::ptr::null_mut();
pub(crate) const EGL_NO_SURFACE: EGLSurface = std::ptr::null_mut();

pub(crate) const EGL_SURFACE_TYPE: EGLint = 0x3033;
pub(crate) const EGL_PBUFFER_BIT: EGLint = 0x0001;
pub(crate) const EGL_RED_SIZE: EGLint = 0x3024;
pub(crate) const EGL_GREEN_SIZE: EGLint = 0x3023;
pub(crate) const EGL_BLUE_SIZE: EGLint = 0x3022;
pub(crate) const EGL_DEPTH_SIZE: EGLint = 0x3025;
pub(crate) const EGL_CONFORMANT: EGLint = 0x3042;
pub(crate) const EGL_OPENGL_BIT: EGLint = 0x0008;
pub(crate) const EGL_OPENGL_ES2_BIT: EGLint = 0x0004;
pub(crate) const EGL_OPENGL_ES3_BIT: EGLint = 0x0040;

pub(crate) const EGL_CONTEXT_CLIENT_VERSION: EGLint = 0x3098;
pub(crate) const EGL_CONTEXT_OPENGL_DEBUG: EGLint = 0x31B0;

pub(crate) const EGL_WIDTH: EGLint = 0x3057;
pub(crate) const EGL_HEIGHT: EGLint = 0x3056;

pub(crate) const EGL_EXTENSIONS: EGLint = 0x3055;
pub(crate) const EGL_PLATFORM_DEVICE_EXT: EGLenum = 0x313F;
pub(crate) const EGL_DEVICE_EXT: EGLint = 0x322C;

type EglGetProcAddress = unsafe extern "C" fn(*const c_char) -> *const c_void;
type EglGetError = unsafe extern "C" fn() -> EGLint;
type EglInitialize = unsafe extern "C" fn(EGLDisplay, *mut EGLint, *mut EGLint) -> EGLBoolean;
type EglTerminate = unsafe extern "C" fn(EGLDisplay) -> EGLBoolean;
type EglChooseConfig = unsafe extern "C" fn(
    EGLDisplay,
    *const EGLint,
    *mut EGLConfig,
    EGLint,
    *mut EGLint,
) -> EGLBoolean;
type EglCreateContext =
    unsafe extern "C" fn(EGLDisplay, EGLConfig, EGLContext, *const EGLint) -> EGLContext;
type EglDestroyContext = unsafe extern "C" fn(EGLDisplay, EGLContext) -> EGLBoolean;
type EglCreatePbufferSurface =
    unsafe extern "C" fn(EGLDisplay, EGLConfig, *const EGLint) -> EGLSurface;
type EglDestroySurface = unsafe extern "C" fn(EGLDisplay, EGLSurface) -> EGLBoolean;
type EglMakeCurrent =
    unsafe extern "C" fn(EGLDisplay, EGLSurface, EGLSurface, EGLContext) -> EGLBoolean;

pub(crate) type EglQueryDevicesExt =
    unsafe extern "C" fn(EGLint, *mut EGLDeviceEXT, *mut EGLint) -> EGLBoolean;
pub(crate) type EglQueryDeviceStringExt =
    unsafe extern "C" fn(EGLDeviceEXT, EGLint) -> *const c_char;
pub(crate) type EglQueryDisplayAttribExt =
    unsafe extern "C" fn(EGLDisplay, EGLint, *mut EGLAttrib) -> EGLBoolean;
pub(crate) type EglGetPlatformDisplayExt =
    unsafe extern "C" fn(EGLenum, *mut c_void, *const EGLint) -> EGLDisplay;

/// ### English
/// Resolved EGL entry points.
///
/// Core EGL 1.4 functions are mandatory; the device-platform extensions are resolved through
/// `eglGetProcAddress` and may be missing on drivers without `EGL_EXT_device_enumeration`.
///
/// ### 中文
/// 已解析的 EGL 入口点。
///
/// EGL 1.4 核心函数为必需；device platform 扩展通过 `eglGetProcAddress` 解析，在不支持
/// `EGL_EXT_device_enumeration` 的驱动上可能缺失。
#[derive(Clone, Copy)]
pub(crate) struct EglApi {
    pub(crate) get_proc_address: EglGetProcAddress,
    pub(crate) get_error: EglGetError,
    pub(crate) initialize: EglInitialize,
    pub(crate) terminate: EglTerminate,
    pub(crate) choose_config: EglChooseConfig,
    pub(crate) create_context: EglCreateContext,
    pub(crate) destroy_context: EglDestroyContext,
    pub(crate) create_pbuffer_surface: EglCreatePbufferSurface,
    pub(crate) destroy_surface: EglDestroySurface,
    pub(crate) make_current: EglMakeCurrent,

    pub(crate) query_devices: Option<EglQueryDevicesExt>,
    pub(crate) query_device_string: Option<EglQueryDeviceStringExt>,
    pub(crate) query_display_attrib: Option<EglQueryDisplayAttribExt>,
    pub(crate) get_platform_display: Option<EglGetPlatformDisplayExt>,
}

impl EglApi {
    /// ### English
    /// Resolves the table from an opened `libEGL`.
    ///
    /// ### 中文
    /// 从已打开的 `libEGL` 解析函数表。
    pub(crate) fn load(lib: &DynamicLibrary) -> Result<Self, LoadError> {
        let get_proc_address: EglGetProcAddress = unsafe { required(lib, c"eglGetProcAddress")? };

        let extension = |name: &CStr| -> *const c_void {
            let addr = unsafe { get_proc_address(name.as_ptr()) };
            if addr.is_null() {
                lib.raw_symbol(name)
            } else {
                addr
            }
        };

        Ok(Self {
            get_proc_address,
            get_error: unsafe { required(lib, c"eglGetError")? },
            initialize: unsafe { required(lib, c"eglInitialize")? },
            terminate: unsafe { required(lib, c"eglTerminate")? },
            choose_config: unsafe { required(lib, c"eglChooseConfig")? },
            create_context: unsafe { required(lib, c"eglCreateContext")? },
            destroy_context: unsafe { required(lib, c"eglDestroyContext")? },
            create_pbuffer_surface: unsafe { required(lib, c"eglCreatePbufferSurface")? },
            destroy_surface: unsafe { required(lib, c"eglDestroySurface")? },
            make_current: unsafe { required(lib, c"eglMakeCurrent")? },

            query_devices: unsafe { cast_proc(extension(c"eglQueryDevicesEXT")) },
            query_device_string: unsafe { cast_proc(extension(c"eglQueryDeviceStringEXT")) },
            query_display_attrib: unsafe { cast_proc(extension(c"eglQueryDisplayAttribEXT")) },
            get_platform_display: unsafe { cast_proc(extension(c"eglGetPlatformDisplayEXT")) },
        })
    }
}

/// # Safety
/// `T` must be the function pointer type of the symbol `name`.
unsafe fn required<T: Copy>(lib: &DynamicLibrary, name: &'static CStr) -> Result<T, LoadError> {
    unsafe { lib.symbol(name) }.ok_or(LoadError::MissingSymbol(name.to_str().unwrap_or("?")))
}

/// # Safety
/// `T` must be the function pointer type of the entry point behind `addr`.
unsafe fn cast_proc<T: Copy>(addr: *const c_void) -> Option<T> {
    if addr.is_null() {
        return None;
    }
    Some(unsafe { std::mem::transmute_copy(&addr) })
}
