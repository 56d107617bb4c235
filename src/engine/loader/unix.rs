use std::ffi::{CStr, CString, c_char, c_int, c_void};
use std::ptr::NonNull;

use crate::engine::error::LoadError;

unsafe extern "C" {
    fn dlopen(filename: *const c_char, flag: c_int) -> *mut c_void;
    fn dlsym(handle: *mut c_void, symbol: *const c_char) -> *mut c_void;
    fn dlclose(handle: *mut c_void) -> c_int;
}

const RTLD_NOW: c_int = 0x2;

/// ### English
/// A `dlopen`ed shared library, closed on drop.
///
/// ### 中文
/// 通过 `dlopen` 打开的共享库，drop 时关闭。
pub(crate) struct DynamicLibrary {
    handle: NonNull<c_void>,
    name: String,
}

impl DynamicLibrary {
    /// ### English
    /// Opens the first library of `names` that loads.
    ///
    /// ### 中文
    /// 打开 `names` 中第一个能成功加载的库。
    pub(crate) fn open_first(names: &[String]) -> Result<Self, LoadError> {
        for name in names {
            let Ok(c_name) = CString::new(name.as_str()) else {
                continue;
            };
            let handle = unsafe { dlopen(c_name.as_ptr(), RTLD_NOW) };
            if let Some(handle) = NonNull::new(handle) {
                return Ok(Self {
                    handle,
                    name: name.clone(),
                });
            }
        }
        Err(LoadError::LibraryNotFound(names.to_vec()))
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// ### English
    /// Looks up `name`; returns NULL when the symbol is absent.
    ///
    /// ### 中文
    /// 查找 `name`；符号不存在时返回 NULL。
    pub(crate) fn raw_symbol(&self, name: &CStr) -> *const c_void {
        unsafe { dlsym(self.handle.as_ptr(), name.as_ptr()) as *const c_void }
    }

    /// ### English
    /// Looks up `name` and reinterprets it as the function pointer type `T`.
    ///
    /// # Safety
    /// `T` must be a function pointer type matching the symbol's real signature.
    ///
    /// ### 中文
    /// 查找 `name` 并将其解释为函数指针类型 `T`。
    ///
    /// # Safety
    /// `T` 必须是与符号真实签名一致的函数指针类型。
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
        unsafe {
            dlclose(self.handle.as_ptr());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DynamicLibrary;
    use crate::engine::error::LoadError;

    #[test]
    fn missing_libraries_report_every_candidate() {
        let names = vec![
            "libheadless-gl-does-not-exist.so.7".to_string(),
            "also\0invalid".to_string(),
        ];
        match DynamicLibrary::open_first(&names) {
            Err(LoadError::LibraryNotFound(tried)) => assert_eq!(tried, names),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("library unexpectedly loaded"),
        }
    }
}
