//! ### English
//! Platform driver interface consumed by the EGL-style negotiator.
//!
//! The trait mirrors the EGL device-platform call sequence; [`EglDriver`] implements it against a
//! runtime-loaded `libEGL`, tests implement it with a simulated driver.
//!
//! ### 中文
//! EGL 风格协商器所使用的平台驱动接口。
//!
//! 该 trait 对应 EGL device platform 的调用序列；[`EglDriver`] 基于运行时加载的 `libEGL` 实现，
//! 测试中使用模拟驱动实现。
#[cfg(unix)]
mod egl;
#[cfg(test)]
pub(crate) mod simulated;

use std::ffi::{CStr, c_void};

use dpi::PhysicalSize;

use crate::engine::config::{Conformance, HeadlessConfig};
use crate::engine::error::{DriverError, LoadError};

#[cfg(unix)]
pub use egl::EglDriver;

/// ### English
/// Framebuffer attributes requested from `choose_config`.
///
/// ### 中文
/// 向 `choose_config` 请求的 framebuffer 属性。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigAttribs {
    pub red_bits: i32,
    pub green_bits: i32,
    pub blue_bits: i32,
    pub depth_bits: i32,
    /// ### English
    /// The config must support pbuffer (off-screen) surfaces.
    ///
    /// ### 中文
    /// 配置必须支持 pbuffer（离屏）surface。
    pub pbuffer: bool,
    pub conformance: Conformance,
}

impl ConfigAttribs {
    pub fn from_config(config: &HeadlessConfig) -> Self {
        Self {
            red_bits: config.color_bits,
            green_bits: config.color_bits,
            blue_bits: config.color_bits,
            depth_bits: config.requested_depth_bits(),
            pbuffer: true,
            conformance: config.conformance,
        }
    }
}

/// ### English
/// Attributes passed to `create_context`.
///
/// ### 中文
/// 传给 `create_context` 的属性。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextAttribs {
    pub client_version: i32,
    pub debug: bool,
}

impl ContextAttribs {
    pub fn from_config(config: &HeadlessConfig) -> Self {
        Self {
            client_version: config.client_version,
            debug: config.debug_context,
        }
    }
}

/// ### English
/// Outbound operations required from the platform driver.
///
/// Handles are plain copyable values; ownership (and release order) is tracked by the
/// negotiator, not by the driver.
///
/// ### 中文
/// 需要平台驱动提供的外部操作。
///
/// 句柄都是可复制的普通值；所有权（以及释放顺序）由协商器跟踪，而不是由驱动跟踪。
pub trait Driver {
    type Device: Copy;
    type Display: Copy;
    type Config: Copy;
    type Context: Copy;
    type Surface: Copy;

    /// ### English
    /// Loads the driver for the given configuration.
    ///
    /// ### 中文
    /// 按给定配置加载驱动。
    fn load(config: &HeadlessConfig) -> Result<Self, LoadError>
    where
        Self: Sized;

    /// ### English
    /// Human-readable driver identity (library name) for diagnostics.
    ///
    /// ### 中文
    /// 用于诊断的驱动标识（库名）。
    fn describe(&self) -> String;

    fn query_devices(&self, max_devices: usize) -> Result<Vec<Self::Device>, DriverError>;

    /// ### English
    /// Extension string of `device`, when the driver can report it.
    ///
    /// ### 中文
    /// `device` 的扩展字符串（驱动可提供时）。
    fn query_device_string(&self, device: Self::Device) -> Option<String>;

    fn get_platform_display(&self, device: Self::Device) -> Result<Self::Display, DriverError>;

    /// ### English
    /// Initializes `display`, returning the driver's `(major, minor)` version.
    ///
    /// ### 中文
    /// 初始化 `display`，返回驱动的 `(major, minor)` 版本。
    fn initialize(&self, display: Self::Display) -> Result<(i32, i32), DriverError>;

    fn query_display_device(&self, display: Self::Display) -> Result<Self::Device, DriverError>;

    fn choose_config(
        &self,
        display: Self::Display,
        attribs: &ConfigAttribs,
    ) -> Result<Self::Config, DriverError>;

    fn create_context(
        &self,
        display: Self::Display,
        config: Self::Config,
        attribs: &ContextAttribs,
    ) -> Result<Self::Context, DriverError>;

    fn create_pbuffer_surface(
        &self,
        display: Self::Display,
        config: Self::Config,
        size: PhysicalSize<u32>,
    ) -> Result<Self::Surface, DriverError>;

    /// ### English
    /// Binds `(surface, surface, context)` on the calling thread; `None` for both unbinds.
    ///
    /// ### 中文
    /// 在调用线程绑定 `(surface, surface, context)`；两者均为 `None` 时解除绑定。
    fn make_current(
        &self,
        display: Self::Display,
        surface: Option<Self::Surface>,
        context: Option<Self::Context>,
    ) -> Result<(), DriverError>;

    /// ### English
    /// Resolves a GL/driver entry point; NULL when unknown.
    ///
    /// ### 中文
    /// 解析 GL/驱动入口点；未知时返回 NULL。
    fn get_proc_address(&self, name: &CStr) -> *const c_void;

    /// ### English
    /// Advertised GL `(major, minor)` of the context current on this thread.
    ///
    /// ### 中文
    /// 当前线程 current 上下文所声明的 GL `(major, minor)`。
    fn gl_version(&self) -> Option<(i32, i32)> {
        unsafe { crate::engine::profile::query_gl_version(|name| self.get_proc_address(name)) }
    }

    fn destroy_context(
        &self,
        display: Self::Display,
        context: Self::Context,
    ) -> Result<(), DriverError>;

    fn destroy_surface(
        &self,
        display: Self::Display,
        surface: Self::Surface,
    ) -> Result<(), DriverError>;

    fn terminate(&self, display: Self::Display) -> Result<(), DriverError>;
}

#[cfg(test)]
mod tests {
    use super::{ConfigAttribs, ContextAttribs};
    use crate::engine::config::{Conformance, HeadlessConfig};

    #[test]
    fn attribs_follow_the_config() {
        let config = HeadlessConfig::default()
            .with_depth_buffer(false)
            .with_conformance(Conformance::OpenGlEs3)
            .with_debug_context(true);

        let attribs = ConfigAttribs::from_config(&config);
        assert_eq!(attribs.red_bits, 1);
        assert_eq!(attribs.depth_bits, 0);
        assert!(attribs.pbuffer);
        assert_eq!(attribs.conformance, Conformance::OpenGlEs3);

        let context = ContextAttribs::from_config(&config);
        assert_eq!(context.client_version, 3);
        assert!(context.debug);
    }
}
