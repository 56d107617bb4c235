use dpi::PhysicalSize;

/// ### English
/// Environment variable naming an EGL library to try before the default search list.
///
/// ### 中文
/// 指定 EGL 库路径的环境变量；会在默认搜索列表之前尝试。
pub const EGL_LIBRARY_ENV: &str = "HEADLESS_GL_EGL_LIBRARY";

/// ### English
/// Default EGL library names tried in order.
///
/// ### 中文
/// 默认按顺序尝试的 EGL 库名。
const DEFAULT_EGL_LIBRARIES: [&str; 2] = ["libEGL.so.1", "libEGL.so"];

#[cfg(windows)]
const DEFAULT_GLFW_LIBRARIES: [&str; 2] = ["glfw3.dll", "glfw.dll"];
#[cfg(not(windows))]
const DEFAULT_GLFW_LIBRARIES: [&str; 2] = ["libglfw.so.3", "libglfw.so"];

/// ### English
/// API conformance a framebuffer configuration must advertise.
///
/// ### 中文
/// framebuffer 配置必须声明的 API 一致性标记。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conformance {
    OpenGl,
    OpenGlEs2,
    OpenGlEs3,
}

/// ### English
/// Parameters of the headless context negotiation.
///
/// Defaults reproduce the classic headless setup: a 100x100 pbuffer, 24-bit depth, client
/// version 3 and desktop-GL conformance. The pbuffer size does not limit rendering; the engine
/// renders into its own framebuffers.
///
/// ### 中文
/// headless 上下文协商参数。
///
/// 默认值对应经典 headless 配置：100x100 pbuffer、24 位深度、client version 3、桌面 GL 一致性。
/// pbuffer 尺寸不限制渲染；引擎会渲染到自身的 framebuffer。
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// ### English
    /// Request a depth buffer of `depth_bits` bits; `false` requests none.
    ///
    /// ### 中文
    /// 请求 `depth_bits` 位的深度缓冲；`false` 表示不需要。
    pub enable_depth_buffer: bool,

    /// ### English
    /// Off-screen pbuffer size in pixels.
    ///
    /// ### 中文
    /// 离屏 pbuffer 尺寸（像素）。
    pub surface_size: PhysicalSize<u32>,

    /// ### English
    /// Requested context client version (`EGL_CONTEXT_CLIENT_VERSION`).
    ///
    /// ### 中文
    /// 请求的上下文 client version（`EGL_CONTEXT_CLIENT_VERSION`）。
    pub client_version: i32,

    /// ### English
    /// Minimum bits per color channel.
    ///
    /// ### 中文
    /// 每个颜色通道的最少位数。
    pub color_bits: i32,

    pub depth_bits: i32,

    pub conformance: Conformance,

    /// ### English
    /// Request a debug context.
    ///
    /// ### 中文
    /// 请求调试上下文。
    pub debug_context: bool,

    /// ### English
    /// Upper bound on the number of enumerated devices.
    ///
    /// ### 中文
    /// 枚举设备数量的上限。
    pub max_devices: usize,

    /// ### English
    /// Explicit driver library names; empty means the platform default list.
    ///
    /// ### 中文
    /// 显式指定的驱动库名；为空则使用平台默认列表。
    pub library_names: Vec<String>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            enable_depth_buffer: true,
            surface_size: PhysicalSize::new(100, 100),
            client_version: 3,
            color_bits: 1,
            depth_bits: 24,
            conformance: Conformance::OpenGl,
            debug_context: false,
            max_devices: 10,
            library_names: Vec::new(),
        }
    }
}

impl HeadlessConfig {
    pub fn with_depth_buffer(mut self, enable: bool) -> Self {
        self.enable_depth_buffer = enable;
        self
    }

    pub fn with_surface_size(mut self, width: u32, height: u32) -> Self {
        self.surface_size = PhysicalSize::new(width.max(1), height.max(1));
        self
    }

    pub fn with_client_version(mut self, version: i32) -> Self {
        self.client_version = version;
        self
    }

    pub fn with_conformance(mut self, conformance: Conformance) -> Self {
        self.conformance = conformance;
        self
    }

    pub fn with_debug_context(mut self, debug: bool) -> Self {
        self.debug_context = debug;
        self
    }

    pub fn with_library(mut self, name: impl Into<String>) -> Self {
        self.library_names.push(name.into());
        self
    }

    /// ### English
    /// Depth buffer bits actually requested (`0` when the depth buffer is disabled).
    ///
    /// ### 中文
    /// 实际请求的深度位数（禁用深度缓冲时为 `0`）。
    pub fn requested_depth_bits(&self) -> i32 {
        if self.enable_depth_buffer {
            self.depth_bits
        } else {
            0
        }
    }

    /// ### English
    /// EGL library candidates: `HEADLESS_GL_EGL_LIBRARY`, then explicit names, then defaults.
    ///
    /// ### 中文
    /// EGL 库候选列表：先 `HEADLESS_GL_EGL_LIBRARY`，再显式名称，最后默认列表。
    pub fn egl_library_candidates(&self) -> Vec<String> {
        self.library_candidates_with(std::env::var(EGL_LIBRARY_ENV).ok())
    }

    /// ### English
    /// GLFW library candidates: explicit names, then the platform default.
    ///
    /// ### 中文
    /// GLFW 库候选列表：先显式名称，再平台默认值。
    pub fn glfw_library_candidates(&self) -> Vec<String> {
        if self.library_names.is_empty() {
            DEFAULT_GLFW_LIBRARIES.iter().map(|name| name.to_string()).collect()
        } else {
            self.library_names.clone()
        }
    }

    fn library_candidates_with(&self, env_override: Option<String>) -> Vec<String> {
        let mut names: Vec<String> = env_override
            .filter(|name| !name.trim().is_empty())
            .into_iter()
            .collect();
        if self.library_names.is_empty() {
            names.extend(DEFAULT_EGL_LIBRARIES.iter().map(|name| name.to_string()));
        } else {
            names.extend(self.library_names.iter().cloned());
        }
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::{Conformance, HeadlessConfig};

    #[test]
    fn defaults_match_the_classic_headless_setup() {
        let config = HeadlessConfig::default();
        assert!(config.enable_depth_buffer);
        assert_eq!(config.surface_size.width, 100);
        assert_eq!(config.surface_size.height, 100);
        assert_eq!(config.client_version, 3);
        assert_eq!(config.requested_depth_bits(), 24);
        assert_eq!(config.conformance, Conformance::OpenGl);
        assert_eq!(config.max_devices, 10);
    }

    #[test]
    fn disabling_depth_requests_zero_bits() {
        let config = HeadlessConfig::default().with_depth_buffer(false);
        assert_eq!(config.requested_depth_bits(), 0);
    }

    #[test]
    fn surface_size_is_never_zero() {
        let config = HeadlessConfig::default().with_surface_size(0, 0);
        assert_eq!(config.surface_size.width, 1);
        assert_eq!(config.surface_size.height, 1);
    }

    #[test]
    fn library_candidates_put_the_override_first() {
        let config = HeadlessConfig::default();
        assert_eq!(
            config.library_candidates_with(None),
            vec!["libEGL.so.1".to_string(), "libEGL.so".to_string()]
        );
        assert_eq!(
            config.library_candidates_with(Some("/opt/egl/libEGL.so".into()))[0],
            "/opt/egl/libEGL.so"
        );
        assert_eq!(config.library_candidates_with(Some("  ".into())).len(), 2);

        let config = HeadlessConfig::default().with_library("libEGL_nvidia.so.0");
        assert_eq!(
            config.library_candidates_with(None),
            vec!["libEGL_nvidia.so.0".to_string()]
        );
    }

    #[test]
    fn glfw_candidates_prefer_explicit_names() {
        assert_eq!(HeadlessConfig::default().glfw_library_candidates().len(), 2);
        let config = HeadlessConfig::default().with_library("custom-glfw");
        assert_eq!(config.glfw_library_candidates(), vec!["custom-glfw".to_string()]);
    }
}
