use std::ffi::{CStr, OsStr, c_char, c_void};
use std::os::windows::ffi::OsStrExt as _;
use std::ptr::NonNull;

use crate::engine::error::LoadError;

#[link(name = "kernel32")]
unsafe extern "system" {
    fn GetModuleHandleW(lp_module_name: *const u16) -> *mut c_void;
    fn GetProcAddress(h_module: *mut c_void, lp_proc_name: *const c_char) -> *mut c_void;
    fn LoadLibraryW(lp_lib_file_name: *const u16) -> *mut c_void;
    fn FreeLibrary(h_lib_module: *mut c_void) -> i32;
}

fn to_wide_nul(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(Some(0)).collect()
}

/// ### English
/// A loaded DLL. Modules that the host had already loaded are borrowed and never freed.
///
/// ### 中文
/// 已加载的 DLL。宿主已加载的模块仅被借用，不会被释放。
pub(crate) struct DynamicLibrary {
    module: NonNull<c_void>,
    owned: bool,
    name: String,
}

impl DynamicLibrary {
    /// ### English
    /// Prefers a module already loaded by the host (any of `names`), then tries `LoadLibraryW`.
    ///
    /// ### 中文
    /// 优先使用宿主已加载的模块（`names` 中任意一个），否则尝试 `LoadLibraryW`。
    pub(crate) fn open_first(names: &[String]) -> Result<Self, LoadError> {
        for name in names {
            let wide = to_wide_nul(name);
            if let Some(module) = NonNull::new(unsafe { GetModuleHandleW(wide.as_ptr()) }) {
                return Ok(Self {
                    module,
                    owned: false,
                    name: name.clone(),
                });
            }
        }
        for name in names {
            let wide = to_wide_nul(name);
            if let Some(module) = NonNull::new(unsafe { LoadLibraryW(wide.as_ptr()) }) {
                return Ok(Self {
                    module,
                    owned: true,
                    name: name.clone(),
                });
            }
        }
        Err(LoadError::LibraryNotFound(names.to_vec()))
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn raw_symbol(&self, name: &CStr) -> *const c_void {
        unsafe { GetProcAddress(self.module.as_ptr(), name.as_ptr()) as *const c_void }
    }

    /// # Safety
    /// `T` must be a function pointer type matching the symbol's real signature.
    pub(crate) unsafe fn symbol<T: Copy>(&self, name: &CStr) -> Option<T> {
        debug_assert_eq!(size_of::<T>(), size_of::<*const c_void>());
        let addr = self.raw_symbol(name);
        if addr.is_null() {
            return None;
        }
        Some(unsafe { std::mem::transmute_copy(&addr) })
    }
}

impl Drop for DynamicLibrary {
    fn drop(&mut self) {
        if self.owned {
            unsafe {
                FreeLibrary(self.module.as_ptr());
            }
        }
    }
}
