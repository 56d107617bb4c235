//! ### English
//! C ABI bindings for the headless context lifecycle (create/make_current/poll/destroy).
//!
//! ### 中文
//! headless 上下文生命周期相关的 C ABI 绑定（create/make_current/poll/destroy）。

use std::ffi::{CStr, c_char, c_void};

use super::{ForeignCall, ForeignEngine, HeadlessGl, HeadlessGlEngineCallbacks};
use crate::engine::headless::HeadlessContext;

#[unsafe(no_mangle)]
/// ### English
/// Creates a headless context on the calling thread, which becomes its owning thread.
///
/// `callbacks` may be NULL (no engine hooks). The table is copied. A negotiation failure still
/// returns a valid, inert handle; query it with `headless_gl_is_ready`.
///
/// ### 中文
/// 在调用线程上创建 headless 上下文，该线程即为其持有线程。
///
/// `callbacks` 可以为 NULL（无引擎钩子）。函数表会被复制。协商失败时仍返回有效的惰性句柄；
/// 可通过 `headless_gl_is_ready` 查询。
pub unsafe extern "C" fn headless_gl_create(
    enable_depth_buffer: bool,
    callbacks: *const HeadlessGlEngineCallbacks,
) -> *mut HeadlessGl {
    let callbacks = if callbacks.is_null() {
        HeadlessGlEngineCallbacks::default()
    } else {
        unsafe { *callbacks }
    };

    let context = HeadlessContext::new(ForeignEngine { callbacks }, enable_depth_buffer);
    let calls = context.call_async_handle();
    Box::into_raw(Box::new(HeadlessGl { context, calls }))
}

#[unsafe(no_mangle)]
/// ### English
/// Destroys a context created by `headless_gl_create`: `pre_delete` runs, then every driver
/// resource is released. Callbacks still queued are dropped without running.
///
/// ### 中文
/// 销毁由 `headless_gl_create` 创建的上下文：先执行 `pre_delete`，再释放所有驱动资源。
/// 仍在队列中的回调会被丢弃，不再执行。
pub unsafe extern "C" fn headless_gl_destroy(ctx: *mut HeadlessGl) {
    if ctx.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(ctx));
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn headless_gl_is_ready(ctx: *const HeadlessGl) -> bool {
    if ctx.is_null() {
        return false;
    }
    unsafe { (*ctx).context.is_ready() }
}

#[unsafe(no_mangle)]
/// ### English
/// Binds the context to the calling thread (no-op when not ready).
///
/// ### 中文
/// 将上下文绑定到调用线程（未就绪时为 no-op）。
pub unsafe extern "C" fn headless_gl_make_current(ctx: *const HeadlessGl) {
    if ctx.is_null() {
        return;
    }
    unsafe { (*ctx).context.make_current() };
}

#[unsafe(no_mangle)]
/// ### English
/// Runs queued callbacks; returns how many ran.
///
/// ### 中文
/// 执行已排队的回调；返回执行数量。
pub unsafe extern "C" fn headless_gl_poll(ctx: *const HeadlessGl) -> u32 {
    if ctx.is_null() {
        return 0;
    }
    let ran = unsafe { (*ctx).context.poll() };
    u32::try_from(ran).unwrap_or(u32::MAX)
}

#[unsafe(no_mangle)]
/// ### English
/// Schedules `callback(user_data)` for the next `headless_gl_poll`. Callable from any thread.
///
/// Returns `false` (and schedules nothing) when `ctx` or `callback` is NULL.
///
/// ### 中文
/// 调度 `callback(user_data)`，在下一次 `headless_gl_poll` 时执行。可在任意线程调用。
///
/// `ctx` 或 `callback` 为 NULL 时返回 `false`（不调度任何内容）。
pub unsafe extern "C" fn headless_gl_call_async(
    ctx: *const HeadlessGl,
    callback: Option<unsafe extern "C" fn(user_data: *mut c_void)>,
    user_data: *mut c_void,
) -> bool {
    let Some(callback) = callback else {
        return false;
    };
    if ctx.is_null() {
        return false;
    }

    let call = ForeignCall {
        callback,
        user_data,
    };
    let calls = unsafe { &(*ctx).calls };
    calls.call_async(move || call.run());
    true
}

#[unsafe(no_mangle)]
/// ### English
/// Resolves a GL entry point by NUL-terminated name; NULL when not ready or unknown.
///
/// ### 中文
/// 按 NUL 结尾的名字解析 GL 入口点；未就绪或未知时返回 NULL。
pub unsafe extern "C" fn headless_gl_get_proc_address(
    ctx: *const HeadlessGl,
    name: *const c_char,
) -> *const c_void {
    if ctx.is_null() || name.is_null() {
        return std::ptr::null();
    }
    let name = unsafe { CStr::from_ptr(name) };
    unsafe { (*ctx).context.get_proc_address(name) }
}

#[unsafe(no_mangle)]
/// ### English
/// Profile tag passed to the engine (`100`/`300`/`310`/`320`), or `0` when unset.
///
/// ### 中文
/// 传给引擎的 profile 标记（`100`/`300`/`310`/`320`），未设置时为 `0`。
pub unsafe extern "C" fn headless_gl_opengl_profile(ctx: *const HeadlessGl) -> u32 {
    if ctx.is_null() {
        return 0;
    }
    unsafe { (*ctx).context.opengl_profile() }.map_or(0, |profile| profile.as_raw())
}

#[cfg(test)]
mod tests {
    use std::ffi::c_void;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::ffi::HeadlessGlEngineCallbacks;

    unsafe extern "C" fn bump(user_data: *mut c_void) {
        let counter = unsafe { &*(user_data as *const AtomicUsize) };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn null_handles_are_ignored() {
        unsafe {
            headless_gl_destroy(std::ptr::null_mut());
            headless_gl_make_current(std::ptr::null());
            assert!(!headless_gl_is_ready(std::ptr::null()));
            assert_eq!(headless_gl_poll(std::ptr::null()), 0);
            assert_eq!(headless_gl_opengl_profile(std::ptr::null()), 0);
            assert!(!headless_gl_call_async(
                std::ptr::null(),
                Some(bump),
                std::ptr::null_mut()
            ));
            assert!(headless_gl_get_proc_address(std::ptr::null(), c"glClear".as_ptr()).is_null());
        }
    }

    #[test]
    fn queued_callbacks_run_on_poll_whether_or_not_a_driver_exists() {
        let counter = AtomicUsize::new(0);
        let pre_delete = AtomicUsize::new(0);
        let callbacks = HeadlessGlEngineCallbacks {
            user_data: &pre_delete as *const AtomicUsize as *mut c_void,
            pre_delete: Some(bump),
            ..HeadlessGlEngineCallbacks::default()
        };

        unsafe {
            let ctx = headless_gl_create(true, &callbacks);
            assert!(!ctx.is_null());

            let user_data = &counter as *const AtomicUsize as *mut c_void;
            assert!(headless_gl_call_async(ctx, Some(bump), user_data));
            assert!(headless_gl_call_async(ctx, Some(bump), user_data));
            assert!(!headless_gl_call_async(ctx, None, user_data));
            assert_eq!(counter.load(Ordering::SeqCst), 0);

            assert_eq!(headless_gl_poll(ctx), 2);
            assert_eq!(counter.load(Ordering::SeqCst), 2);
            assert_eq!(headless_gl_poll(ctx), 0);

            headless_gl_destroy(ctx);
        }
        assert_eq!(pre_delete.load(Ordering::SeqCst), 1);
    }
}
