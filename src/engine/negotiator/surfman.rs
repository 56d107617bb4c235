//! ### English
//! surfman-backed negotiator (feature `surfman`): hardware adapter → device → context descriptor
//! → context → generic GPU-only surface.
//!
//! ### 中文
//! 基于 surfman 的协商器（feature `surfman`）：硬件 adapter → device → context descriptor
//! → context → 仅 GPU 访问的通用 surface。
use std::ffi::{CStr, c_void};

use euclid::default::Size2D;
use surfman::{
    Connection, Context, ContextAttributeFlags, ContextAttributes, Device, GLVersion,
    SurfaceAccess, SurfaceType,
};

use super::ContextNegotiator;
use crate::engine::config::HeadlessConfig;
use crate::engine::diagnostics::{Diagnostics, LogDiagnostics, Severity};
use crate::engine::error::{DriverError, NegotiationError};

fn backend(call: &'static str) -> impl FnOnce(surfman::Error) -> DriverError {
    move |err| DriverError::Backend {
        call,
        message: format!("{err:?}"),
    }
}

/// ### English
/// Negotiator delegating to surfman's platform backend.
///
/// surfman contexts own their bound surface, so releasing the context also releases the surface.
///
/// ### 中文
/// 委托给 surfman 平台后端的协商器。
///
/// surfman 的上下文持有其绑定的 surface，因此释放上下文时也会释放 surface。
#[derive(Default)]
pub struct SurfmanNegotiator {
    device: Option<Device>,
    context: Option<Context>,
    ready: bool,
    attempted: bool,
}

impl ContextNegotiator for SurfmanNegotiator {
    fn negotiate(
        &mut self,
        config: &HeadlessConfig,
        diagnostics: &dyn Diagnostics,
    ) -> Result<(), NegotiationError> {
        if self.attempted {
            return Err(NegotiationError::AlreadyAttempted);
        }
        self.attempted = true;

        let connection = Connection::new()
            .map_err(backend("Connection::new"))
            .map_err(NegotiationError::NoDeviceFound)?;
        let adapter = connection
            .create_hardware_adapter()
            .map_err(backend("create_hardware_adapter"))
            .map_err(NegotiationError::NoDeviceFound)?;
        let device = connection
            .create_device(&adapter)
            .map_err(backend("create_device"))
            .map_err(NegotiationError::DisplayAcquisitionFailed)?;
        diagnostics.report(
            Severity::Info,
            &format!("created surfman device ({:?})", device.gl_api()),
        );
        let device = self.device.insert(device);

        let mut flags = ContextAttributeFlags::empty();
        if config.enable_depth_buffer {
            flags |= ContextAttributeFlags::DEPTH;
        }
        let major = u8::try_from(config.client_version).unwrap_or(3);
        let descriptor = device
            .create_context_descriptor(&ContextAttributes {
                version: GLVersion::new(major, 0),
                flags,
            })
            .map_err(backend("create_context_descriptor"))
            .map_err(NegotiationError::NoMatchingConfiguration)?;

        let context = device
            .create_context(&descriptor, None)
            .map_err(backend("create_context"))
            .map_err(NegotiationError::ContextCreationFailed)?;
        let context = self.context.insert(context);
        diagnostics.report(Severity::Info, "created surfman context");

        let size = Size2D::new(
            i32::try_from(config.surface_size.width).unwrap_or(i32::MAX),
            i32::try_from(config.surface_size.height).unwrap_or(i32::MAX),
        );
        let surface = device
            .create_surface(context, SurfaceAccess::GPUOnly, SurfaceType::Generic { size })
            .map_err(backend("create_surface"))
            .map_err(NegotiationError::SurfaceCreationFailed)?;
        if let Err((err, mut surface)) = device.bind_surface_to_context(context, surface) {
            let _ = device.destroy_surface(context, &mut surface);
            return Err(NegotiationError::SurfaceCreationFailed(backend(
                "bind_surface_to_context",
            )(err)));
        }
        diagnostics.report(
            Severity::Info,
            &format!("created {}x{} surface", size.width, size.height),
        );

        self.ready = true;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn make_current(&self, diagnostics: &dyn Diagnostics) {
        if !self.ready {
            return;
        }
        if let (Some(device), Some(context)) = (&self.device, &self.context)
            && let Err(err) = device.make_context_current(context)
        {
            diagnostics.report(
                Severity::Error,
                &format!("failed to make context current: {err:?}"),
            );
        }
    }

    fn gl_version(&self) -> Option<(i32, i32)> {
        if !self.ready {
            return None;
        }
        let (device, context) = (self.device.as_ref()?, self.context.as_ref()?);
        unsafe {
            crate::engine::profile::query_gl_version(|name| match name.to_str() {
                Ok(name) => device.get_proc_address(context, name),
                Err(_) => std::ptr::null(),
            })
        }
    }

    fn get_proc_address(&self, name: &CStr) -> *const c_void {
        match (&self.device, &self.context, self.ready, name.to_str()) {
            (Some(device), Some(context), true, Ok(name)) => device.get_proc_address(context, name),
            _ => std::ptr::null(),
        }
    }

    fn release(&mut self, diagnostics: &dyn Diagnostics) {
        let Some(device) = self.device.as_mut() else {
            return;
        };
        if self.ready
            && let Err(err) = device.make_no_context_current()
        {
            diagnostics.report(
                Severity::Warning,
                &format!("failed to release current context: {err:?}"),
            );
        }
        self.ready = false;
        if let Some(mut context) = self.context.take()
            && let Err(err) = device.destroy_context(&mut context)
        {
            diagnostics.report(
                Severity::Warning,
                &format!("failed to destroy context: {err:?}"),
            );
        }
        self.device = None;
    }
}

impl Drop for SurfmanNegotiator {
    fn drop(&mut self) {
        self.release(&LogDiagnostics);
    }
}
