//! In-memory [`Driver`] for tests: hands out numbered handles, can fail any step on request and
//! records every call into a shared journal.

use std::ffi::{CStr, c_void};
use std::sync::{Arc, Mutex};

use dpi::PhysicalSize;

use super::{ConfigAttribs, ContextAttribs, Driver};
use crate::engine::config::HeadlessConfig;
use crate::engine::error::{DriverError, LoadError};

/// EGL_BAD_ALLOC, used as the code of every simulated failure.
pub(crate) const SIMULATED_ERROR: i32 = 0x3003;

pub(crate) type Journal = Arc<Mutex<Vec<String>>>;

pub(crate) fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    QueryDevices,
    GetPlatformDisplay,
    Initialize,
    QueryDisplayDevice,
    ChooseConfig,
    CreateContext,
    CreatePbufferSurface,
    MakeCurrent,
}

pub(crate) struct SimulatedDriver {
    journal: Journal,
    fail_at: Option<Step>,
    devices: usize,
    gl_version: Option<(i32, i32)>,
}

impl SimulatedDriver {
    pub(crate) fn new(journal: Journal) -> Self {
        Self {
            journal,
            fail_at: None,
            devices: 1,
            gl_version: Some((3, 2)),
        }
    }

    pub(crate) fn failing_at(mut self, step: Step) -> Self {
        self.fail_at = Some(step);
        self
    }

    pub(crate) fn with_devices(mut self, devices: usize) -> Self {
        self.devices = devices;
        self
    }

    pub(crate) fn with_gl_version(mut self, version: Option<(i32, i32)>) -> Self {
        self.gl_version = version;
        self
    }

    fn record(&self, entry: String) {
        self.journal.lock().unwrap().push(entry);
    }

    fn step(&self, step: Step, call: &'static str) -> Result<(), DriverError> {
        if self.fail_at == Some(step) {
            Err(DriverError::Call {
                call,
                code: SIMULATED_ERROR,
            })
        } else {
            Ok(())
        }
    }
}

impl Driver for SimulatedDriver {
    type Device = usize;
    type Display = u32;
    type Config = u32;
    type Context = u32;
    type Surface = u32;

    fn load(_config: &HeadlessConfig) -> Result<Self, LoadError> {
        Err(LoadError::Unsupported("the simulated driver is injected, not loaded"))
    }

    fn describe(&self) -> String {
        "simulated".to_string()
    }

    fn query_devices(&self, max_devices: usize) -> Result<Vec<usize>, DriverError> {
        self.record(format!("query_devices(max={max_devices})"));
        self.step(Step::QueryDevices, "eglQueryDevicesEXT")?;
        Ok((0..self.devices.min(max_devices)).map(|i| 100 + i).collect())
    }

    fn query_device_string(&self, device: usize) -> Option<String> {
        Some(format!("EGL_EXT_device_drm device{device}"))
    }

    fn get_platform_display(&self, device: usize) -> Result<u32, DriverError> {
        self.record(format!("get_platform_display({device})"));
        self.step(Step::GetPlatformDisplay, "eglGetPlatformDisplayEXT")?;
        Ok(1)
    }

    fn initialize(&self, display: u32) -> Result<(i32, i32), DriverError> {
        self.record(format!("initialize({display})"));
        self.step(Step::Initialize, "eglInitialize")?;
        Ok((1, 5))
    }

    fn query_display_device(&self, display: u32) -> Result<usize, DriverError> {
        self.record(format!("query_display_device({display})"));
        self.step(Step::QueryDisplayDevice, "eglQueryDisplayAttribEXT")?;
        Ok(100)
    }

    fn choose_config(&self, display: u32, attribs: &ConfigAttribs) -> Result<u32, DriverError> {
        self.record(format!(
            "choose_config({display}, depth={}, pbuffer={})",
            attribs.depth_bits, attribs.pbuffer
        ));
        self.step(Step::ChooseConfig, "eglChooseConfig")?;
        Ok(7)
    }

    fn create_context(
        &self,
        display: u32,
        config: u32,
        attribs: &ContextAttribs,
    ) -> Result<u32, DriverError> {
        self.record(format!(
            "create_context({display}, {config}, version={})",
            attribs.client_version
        ));
        self.step(Step::CreateContext, "eglCreateContext")?;
        Ok(20)
    }

    fn create_pbuffer_surface(
        &self,
        display: u32,
        config: u32,
        size: PhysicalSize<u32>,
    ) -> Result<u32, DriverError> {
        self.record(format!(
            "create_pbuffer_surface({display}, {config}, {}x{})",
            size.width, size.height
        ));
        self.step(Step::CreatePbufferSurface, "eglCreatePbufferSurface")?;
        Ok(30)
    }

    fn make_current(
        &self,
        display: u32,
        surface: Option<u32>,
        context: Option<u32>,
    ) -> Result<(), DriverError> {
        match (surface, context) {
            (Some(surface), Some(context)) => {
                self.record(format!("make_current({display}, {surface}, {context})"))
            }
            _ => self.record(format!("make_current({display}, none)")),
        }
        self.step(Step::MakeCurrent, "eglMakeCurrent")
    }

    fn get_proc_address(&self, name: &CStr) -> *const c_void {
        self.record(format!("get_proc_address({})", name.to_string_lossy()));
        std::ptr::null()
    }

    fn gl_version(&self) -> Option<(i32, i32)> {
        self.record("gl_version".to_string());
        self.gl_version
    }

    fn destroy_context(&self, display: u32, context: u32) -> Result<(), DriverError> {
        self.record(format!("destroy_context({display}, {context})"));
        Ok(())
    }

    fn destroy_surface(&self, display: u32, surface: u32) -> Result<(), DriverError> {
        self.record(format!("destroy_surface({display}, {surface})"));
        Ok(())
    }

    fn terminate(&self, display: u32) -> Result<(), DriverError> {
        self.record(format!("terminate({display})"));
        Ok(())
    }
}
