use std::ffi::{CStr, c_char};

use crate::engine::profile::OpenGlProfile;
use crate::logging::{LoggingConfig, init_logging};

#[unsafe(no_mangle)]
/// ### English
/// Returns the C ABI version.
///
/// ### 中文
/// 返回 C ABI 版本号。
pub extern "C" fn headless_gl_abi_version() -> u32 {
    super::HEADLESS_GL_ABI_VERSION
}

#[unsafe(no_mangle)]
/// ### English
/// Installs `env_logger` once. `filter` is an optional `env_logger` filter string (NULL means
/// `RUST_LOG`, then `info`).
///
/// ### 中文
/// 安装一次 `env_logger`。`filter` 为可选的 `env_logger` 过滤字符串（NULL 表示使用
/// `RUST_LOG`，再回退到 `info`）。
pub unsafe extern "C" fn headless_gl_init_logging(filter: *const c_char) {
    let env_filter = if filter.is_null() {
        None
    } else {
        unsafe { CStr::from_ptr(filter) }
            .to_str()
            .ok()
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    };
    init_logging(LoggingConfig {
        env_filter,
        ..LoggingConfig::default()
    });
}

#[unsafe(no_mangle)]
/// ### English
/// Returns whether `major.minor` maps onto a profile tag, writing the tag into `out_profile`.
///
/// ### 中文
/// 返回 `major.minor` 是否能映射为 profile 标记，并将标记写入 `out_profile`。
pub unsafe extern "C" fn headless_gl_profile_from_version(
    major: i32,
    minor: i32,
    out_profile: *mut u32,
) -> bool {
    let Some(profile) = OpenGlProfile::from_version(major, minor) else {
        return false;
    };
    if !out_profile.is_null() {
        unsafe { out_profile.write(profile.as_raw()) };
    }
    true
}
