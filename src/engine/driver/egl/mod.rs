//! ### English
//! [`Driver`] implementation on top of a runtime-loaded `libEGL` using the EGL device platform
//! (`EGL_EXT_device_enumeration` + `EGL_EXT_platform_device`). No display server is needed.
//!
//! ### 中文
//! 基于运行时加载的 `libEGL` 与 EGL device platform（`EGL_EXT_device_enumeration` +
//! `EGL_EXT_platform_device`）的 [`Driver`] 实现，无需显示服务器。
mod ffi;

use std::ffi::{CStr, c_void};

use dpi::PhysicalSize;

use self::ffi::*;
use super::{ConfigAttribs, ContextAttribs, Driver};
use crate::engine::config::{Conformance, HeadlessConfig};
use crate::engine::error::{DriverError, LoadError};
use crate::engine::loader::DynamicLibrary;

/// ### English
/// GLES client libraries searched for GL entry points `eglGetProcAddress` does not export.
///
/// ### 中文
/// `eglGetProcAddress` 未导出 GL 入口点时，额外查找的 GLES 客户端库。
const GLES_LIBRARIES: [&str; 2] = ["libGLESv2.so.2", "libGLESv2.so"];

/// ### English
/// EGL driver loaded at runtime.
///
/// ### 中文
/// 运行时加载的 EGL 驱动。
pub struct EglDriver {
    api: EglApi,
    gles: Option<DynamicLibrary>,
    // Declared last: the function table points into this library.
    egl: DynamicLibrary,
}

impl EglDriver {
    fn call_error(&self, call: &'static str) -> DriverError {
        DriverError::Call {
            call,
            code: unsafe { (self.api.get_error)() },
        }
    }

    fn check(&self, call: &'static str, result: EGLBoolean) -> Result<(), DriverError> {
        if result == EGL_TRUE {
            Ok(())
        } else {
            Err(self.call_error(call))
        }
    }
}

/// ### English
/// `EGL_NONE`-terminated attribute list for `eglChooseConfig`.
///
/// ### 中文
/// 用于 `eglChooseConfig` 的、以 `EGL_NONE` 结尾的属性列表。
fn config_attrib_list(attribs: &ConfigAttribs) -> Vec<EGLint> {
    let mut list = Vec::with_capacity(16);
    if attribs.pbuffer {
        list.extend([EGL_SURFACE_TYPE, EGL_PBUFFER_BIT]);
    }
    list.extend([
        EGL_RED_SIZE,
        attribs.red_bits,
        EGL_GREEN_SIZE,
        attribs.green_bits,
        EGL_BLUE_SIZE,
        attribs.blue_bits,
        EGL_DEPTH_SIZE,
        attribs.depth_bits,
    ]);
    let conformant = match attribs.conformance {
        Conformance::OpenGl => EGL_OPENGL_BIT,
        Conformance::OpenGlEs2 => EGL_OPENGL_ES2_BIT,
        Conformance::OpenGlEs3 => EGL_OPENGL_ES3_BIT,
    };
    list.extend([EGL_CONFORMANT, conformant, EGL_NONE]);
    list
}

fn context_attrib_list(attribs: &ContextAttribs) -> Vec<EGLint> {
    let mut list = vec![EGL_CONTEXT_CLIENT_VERSION, attribs.client_version];
    if attribs.debug {
        list.extend([EGL_CONTEXT_OPENGL_DEBUG, EGL_TRUE as EGLint]);
    }
    list.push(EGL_NONE);
    list
}

fn surface_attrib_list(size: PhysicalSize<u32>) -> [EGLint; 5] {
    let clamp = |v: u32| EGLint::try_from(v).unwrap_or(EGLint::MAX);
    [
        EGL_WIDTH,
        clamp(size.width),
        EGL_HEIGHT,
        clamp(size.height),
        EGL_NONE,
    ]
}

impl Driver for EglDriver {
    type Device = EGLDeviceEXT;
    type Display = EGLDisplay;
    type Config = EGLConfig;
    type Context = EGLContext;
    type Surface = EGLSurface;

    fn load(config: &HeadlessConfig) -> Result<Self, LoadError> {
        let egl = DynamicLibrary::open_first(&config.egl_library_candidates())?;
        let api = EglApi::load(&egl)?;
        let gles_names: Vec<String> = GLES_LIBRARIES.iter().map(|s| s.to_string()).collect();
        let gles = DynamicLibrary::open_first(&gles_names).ok();
        Ok(Self { api, gles, egl })
    }

    fn describe(&self) -> String {
        match &self.gles {
            Some(gles) => format!("{} (+{})", self.egl.name(), gles.name()),
            None => self.egl.name().to_string(),
        }
    }

    fn query_devices(&self, max_devices: usize) -> Result<Vec<Self::Device>, DriverError> {
        let query = self
            .api
            .query_devices
            .ok_or(DriverError::MissingEntryPoint("eglQueryDevicesEXT"))?;
        let max = EGLint::try_from(max_devices).unwrap_or(EGLint::MAX);
        let mut devices: Vec<EGLDeviceEXT> = vec![std::ptr::null_mut(); max.max(0) as usize];
        let mut count: EGLint = 0;
        self.check("eglQueryDevicesEXT", unsafe {
            query(max, devices.as_mut_ptr(), &mut count)
        })?;
        devices.truncate(count.clamp(0, max) as usize);
        Ok(devices)
    }

    fn query_device_string(&self, device: Self::Device) -> Option<String> {
        let query = self.api.query_device_string?;
        let raw = unsafe { query(device, EGL_EXTENSIONS) };
        if raw.is_null() {
            return None;
        }
        Some(unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned())
    }

    fn get_platform_display(&self, device: Self::Device) -> Result<Self::Display, DriverError> {
        let get_display = self
            .api
            .get_platform_display
            .ok_or(DriverError::MissingEntryPoint("eglGetPlatformDisplayEXT"))?;
        let display = unsafe { get_display(EGL_PLATFORM_DEVICE_EXT, device, std::ptr::null()) };
        if display.is_null() {
            return Err(self.call_error("eglGetPlatformDisplayEXT"));
        }
        Ok(display)
    }

    fn initialize(&self, display: Self::Display) -> Result<(i32, i32), DriverError> {
        let (mut major, mut minor) = (0, 0);
        self.check("eglInitialize", unsafe {
            (self.api.initialize)(display, &mut major, &mut minor)
        })?;
        Ok((major, minor))
    }

    fn query_display_device(&self, display: Self::Display) -> Result<Self::Device, DriverError> {
        let query = self
            .api
            .query_display_attrib
            .ok_or(DriverError::MissingEntryPoint("eglQueryDisplayAttribEXT"))?;
        let mut device: EGLAttrib = 0;
        self.check("eglQueryDisplayAttribEXT", unsafe {
            query(display, EGL_DEVICE_EXT, &mut device)
        })?;
        Ok(device as EGLDeviceEXT)
    }

    fn choose_config(
        &self,
        display: Self::Display,
        attribs: &ConfigAttribs,
    ) -> Result<Self::Config, DriverError> {
        let list = config_attrib_list(attribs);
        let mut config: EGLConfig = std::ptr::null_mut();
        let mut num_configs: EGLint = 0;
        self.check("eglChooseConfig", unsafe {
            (self.api.choose_config)(display, list.as_ptr(), &mut config, 1, &mut num_configs)
        })?;
        if num_configs < 1 {
            return Err(DriverError::NoResult("eglChooseConfig"));
        }
        Ok(config)
    }

    fn create_context(
        &self,
        display: Self::Display,
        config: Self::Config,
        attribs: &ContextAttribs,
    ) -> Result<Self::Context, DriverError> {
        let list = context_attrib_list(attribs);
        let context =
            unsafe { (self.api.create_context)(display, config, EGL_NO_CONTEXT, list.as_ptr()) };
        if context == EGL_NO_CONTEXT {
            return Err(self.call_error("eglCreateContext"));
        }
        Ok(context)
    }

    fn create_pbuffer_surface(
        &self,
        display: Self::Display,
        config: Self::Config,
        size: PhysicalSize<u32>,
    ) -> Result<Self::Surface, DriverError> {
        let list = surface_attrib_list(size);
        let surface = unsafe { (self.api.create_pbuffer_surface)(display, config, list.as_ptr()) };
        if surface == EGL_NO_SURFACE {
            return Err(self.call_error("eglCreatePbufferSurface"));
        }
        Ok(surface)
    }

    fn make_current(
        &self,
        display: Self::Display,
        surface: Option<Self::Surface>,
        context: Option<Self::Context>,
    ) -> Result<(), DriverError> {
        let surface = surface.unwrap_or(EGL_NO_SURFACE);
        let context = context.unwrap_or(EGL_NO_CONTEXT);
        self.check("eglMakeCurrent", unsafe {
            (self.api.make_current)(display, surface, surface, context)
        })
    }

    fn get_proc_address(&self, name: &CStr) -> *const c_void {
        let addr = unsafe { (self.api.get_proc_address)(name.as_ptr()) };
        if !addr.is_null() {
            return addr;
        }
        if let Some(gles) = &self.gles {
            let addr = gles.raw_symbol(name);
            if !addr.is_null() {
                return addr;
            }
        }
        self.egl.raw_symbol(name)
    }

    fn destroy_context(
        &self,
        display: Self::Display,
        context: Self::Context,
    ) -> Result<(), DriverError> {
        self.check("eglDestroyContext", unsafe {
            (self.api.destroy_context)(display, context)
        })
    }

    fn destroy_surface(
        &self,
        display: Self::Display,
        surface: Self::Surface,
    ) -> Result<(), DriverError> {
        self.check("eglDestroySurface", unsafe {
            (self.api.destroy_surface)(display, surface)
        })
    }

    fn terminate(&self, display: Self::Display) -> Result<(), DriverError> {
        self.check("eglTerminate", unsafe { (self.api.terminate)(display) })
    }
}

#[cfg(test)]
mod tests {
    use dpi::PhysicalSize;

    use super::ffi::*;
    use super::{config_attrib_list, context_attrib_list, surface_attrib_list};
    use crate::engine::config::{Conformance, HeadlessConfig};
    use crate::engine::driver::{ConfigAttribs, ContextAttribs};

    #[test]
    fn default_config_list_requests_pbuffer_rgb_depth_and_desktop_conformance() {
        let list = config_attrib_list(&ConfigAttribs::from_config(&HeadlessConfig::default()));
        assert_eq!(
            list,
            vec![
                EGL_SURFACE_TYPE,
                EGL_PBUFFER_BIT,
                EGL_RED_SIZE,
                1,
                EGL_GREEN_SIZE,
                1,
                EGL_BLUE_SIZE,
                1,
                EGL_DEPTH_SIZE,
                24,
                EGL_CONFORMANT,
                EGL_OPENGL_BIT,
                EGL_NONE,
            ]
        );
    }

    #[test]
    fn config_list_follows_depth_and_conformance() {
        let config = HeadlessConfig::default()
            .with_depth_buffer(false)
            .with_conformance(Conformance::OpenGlEs3);
        let list = config_attrib_list(&ConfigAttribs::from_config(&config));
        let depth = list.iter().position(|&v| v == EGL_DEPTH_SIZE).unwrap();
        assert_eq!(list[depth + 1], 0);
        assert_eq!(&list[list.len() - 3..], &[EGL_CONFORMANT, EGL_OPENGL_ES3_BIT, EGL_NONE]);
    }

    #[test]
    fn context_list_adds_debug_flag_only_when_requested() {
        let plain = ContextAttribs {
            client_version: 3,
            debug: false,
        };
        assert_eq!(
            context_attrib_list(&plain),
            vec![EGL_CONTEXT_CLIENT_VERSION, 3, EGL_NONE]
        );

        let debug = ContextAttribs {
            client_version: 2,
            debug: true,
        };
        assert_eq!(
            context_attrib_list(&debug),
            vec![
                EGL_CONTEXT_CLIENT_VERSION,
                2,
                EGL_CONTEXT_OPENGL_DEBUG,
                1,
                EGL_NONE
            ]
        );
    }

    #[test]
    fn surface_list_uses_the_configured_size() {
        assert_eq!(
            surface_attrib_list(PhysicalSize::new(100, 100)),
            [EGL_WIDTH, 100, EGL_HEIGHT, 100, EGL_NONE]
        );
        assert_eq!(surface_attrib_list(PhysicalSize::new(u32::MAX, 1))[1], i32::MAX);
    }
}
