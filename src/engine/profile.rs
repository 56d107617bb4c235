//! ### English
//! OpenGL profile tags reported to the rendering engine, and the GL version query behind them.
//!
//! ### 中文
//! 上报给渲染引擎的 OpenGL profile 标记，以及其背后的 GL 版本查询。

use std::ffi::{CStr, c_char, c_void};

/// ### English
/// GL version/feature tier detected on the bound context.
///
/// ### 中文
/// 在已绑定上下文上检测到的 GL 版本/特性层级。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum OpenGlProfile {
    Version100Es = 100,
    Version300Es = 300,
    Version310Es = 310,
    Version320Es = 320,
}

impl OpenGlProfile {
    /// ### English
    /// Maps an advertised `major.minor` pair onto a profile tag.
    ///
    /// Unrecognized pairs return `None`; the engine keeps its own default profile.
    ///
    /// ### 中文
    /// 将上报的 `major.minor` 映射为 profile 标记。
    ///
    /// 无法识别的组合返回 `None`；引擎保留其默认 profile。
    pub fn from_version(major: i32, minor: i32) -> Option<Self> {
        if !(0..10).contains(&minor) {
            return None;
        }
        match major.checked_mul(10)?.checked_add(minor)? {
            10 => Some(Self::Version100Es),
            30 => Some(Self::Version300Es),
            31 => Some(Self::Version310Es),
            32 => Some(Self::Version320Es),
            _ => None,
        }
    }

    /// ### English
    /// Raw tag value used by the C ABI (`100`, `300`, `310`, `320`).
    ///
    /// ### 中文
    /// C ABI 使用的原始标记值（`100`、`300`、`310`、`320`）。
    pub fn as_raw(self) -> u32 {
        self as u32
    }
}

/// ### English
/// Extracts `(major, minor)` from a `GL_VERSION` string.
///
/// Expected forms: `"4.6.0 NVIDIA 550.54"` or `"OpenGL ES 3.2 Mesa 24.0"`. The first
/// whitespace-separated token starting with a digit is read; a missing minor reads as 0.
///
/// ### 中文
/// 从 `GL_VERSION` 字符串中提取 `(major, minor)`。
///
/// 期望形式：`"4.6.0 NVIDIA 550.54"` 或 `"OpenGL ES 3.2 Mesa 24.0"`。读取第一个以数字开头的
/// 空白分隔片段；缺少 minor 时视为 0。
fn parse_gl_version(version: &str) -> Option<(i32, i32)> {
    let token = version
        .split_whitespace()
        .find(|t| t.starts_with(|c: char| c.is_ascii_digit()))?;
    let mut parts = token.split('.');
    let major = parts.next()?.parse::<i32>().ok()?;
    let minor = parts
        .next()
        .map(|s| {
            s.chars()
                .take_while(char::is_ascii_digit)
                .collect::<String>()
        })
        .and_then(|s| s.parse::<i32>().ok())
        .unwrap_or(0);
    Some((major, minor))
}

/// ### English
/// Queries `GL_MAJOR_VERSION`/`GL_MINOR_VERSION` on the context current on this thread.
///
/// Falls back to parsing `GL_VERSION` when the integer query reports 0 (GLES 2 contexts do not
/// know these enums). Returns `None` if the entry points cannot be resolved, no context is
/// current, or the version string is unrecognized.
///
/// # Safety
/// A GL context must be current on the calling thread and `loader` must return entry points
/// valid for it.
///
/// ### 中文
/// 在当前线程的 current 上下文上查询 `GL_MAJOR_VERSION`/`GL_MINOR_VERSION`。
///
/// 若整数查询返回 0（GLES 2 上下文不认识这些枚举），回退为解析 `GL_VERSION` 字符串。
/// 无法解析入口点、没有 current 上下文或版本字符串无法识别时返回 `None`。
///
/// # Safety
/// 调用线程上必须有 current 的 GL 上下文，且 `loader` 返回的入口点对其有效。
pub(crate) unsafe fn query_gl_version<F>(mut loader: F) -> Option<(i32, i32)>
where
    F: FnMut(&CStr) -> *const c_void,
{
    type GlGetString = unsafe extern "system" fn(u32) -> *const c_char;
    type GlGetIntegerv = unsafe extern "system" fn(u32, *mut i32);

    let get_string = loader(c"glGetString");
    let get_integerv = loader(c"glGetIntegerv");
    if get_string.is_null() || get_integerv.is_null() {
        return None;
    }
    let get_string: GlGetString = unsafe { std::mem::transmute(get_string) };
    let get_integerv: GlGetIntegerv = unsafe { std::mem::transmute(get_integerv) };

    let version = unsafe { get_string(glow::VERSION) };
    if version.is_null() {
        return None;
    }

    let mut major = 0;
    let mut minor = 0;
    unsafe {
        get_integerv(glow::MAJOR_VERSION, &mut major);
        get_integerv(glow::MINOR_VERSION, &mut minor);
    }
    if major > 0 {
        return Some((major, minor));
    }

    let version = unsafe { CStr::from_ptr(version) };
    parse_gl_version(&version.to_string_lossy())
}
