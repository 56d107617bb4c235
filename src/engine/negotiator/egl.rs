use std::ffi::{CStr, c_void};

use super::ContextNegotiator;
use crate::engine::config::HeadlessConfig;
use crate::engine::diagnostics::{Diagnostics, LogDiagnostics, Severity};
use crate::engine::driver::{ConfigAttribs, ContextAttribs, Driver};
use crate::engine::error::{DriverError, NegotiationError};

/// ### English
/// Negotiator for EGL-shaped drivers: device → display → initialize → configuration → context →
/// pbuffer surface.
///
/// The driver is loaded lazily on `negotiate` unless one was injected with
/// [`EglNegotiator::with_driver`]. Always the first enumerated device is used.
///
/// ### 中文
/// 面向 EGL 形态驱动的协商器：device → display → initialize → 配置 → 上下文 → pbuffer surface。
///
/// 除非通过 [`EglNegotiator::with_driver`] 注入，驱动会在 `negotiate` 时延迟加载。
/// 始终使用枚举到的第一个设备。
pub struct EglNegotiator<D: Driver> {
    driver: Option<D>,
    display: Option<D::Display>,
    context: Option<D::Context>,
    surface: Option<D::Surface>,
    ready: bool,
    attempted: bool,
}

impl<D: Driver> Default for EglNegotiator<D> {
    fn default() -> Self {
        Self {
            driver: None,
            display: None,
            context: None,
            surface: None,
            ready: false,
            attempted: false,
        }
    }
}

impl<D: Driver> EglNegotiator<D> {
    pub fn with_driver(driver: D) -> Self {
        Self {
            driver: Some(driver),
            ..Self::default()
        }
    }

    /// ### English
    /// Steps 1–7 of the acquisition. Each acquired handle is stored immediately so that a later
    /// failure still releases it.
    ///
    /// ### 中文
    /// 获取流程的第 1–7 步。每个已获取的句柄立即保存，后续步骤失败时仍会被释放。
    fn acquire(
        &mut self,
        driver: &D,
        config: &HeadlessConfig,
        diagnostics: &dyn Diagnostics,
    ) -> Result<(), NegotiationError> {
        let devices = driver
            .query_devices(config.max_devices)
            .map_err(NegotiationError::NoDeviceFound)?;
        if devices.is_empty() {
            return Err(NegotiationError::NoDeviceFound(DriverError::NoResult(
                "eglQueryDevicesEXT",
            )));
        }
        diagnostics.report(Severity::Info, &format!("found {} device(s)", devices.len()));
        for (index, device) in devices.iter().enumerate() {
            let extensions = driver
                .query_device_string(*device)
                .unwrap_or_else(|| "<no extension string>".to_string());
            diagnostics.report(Severity::Info, &format!("device {index}: {extensions}"));
        }

        let display = driver
            .get_platform_display(devices[0])
            .map_err(NegotiationError::DisplayAcquisitionFailed)?;
        self.display = Some(display);
        diagnostics.report(Severity::Info, "acquired platform display for device 0");

        let (major, minor) = driver
            .initialize(display)
            .map_err(NegotiationError::DisplayInitFailed)?;
        diagnostics.report(Severity::Info, &format!("initialized EGL {major}.{minor}"));

        match driver.query_display_device(display) {
            Ok(device) => {
                let extensions = driver
                    .query_device_string(device)
                    .unwrap_or_else(|| "<no extension string>".to_string());
                diagnostics.report(
                    Severity::Info,
                    &format!("display is backed by device: {extensions}"),
                );
            }
            Err(err) => diagnostics.report(
                Severity::Warning,
                &format!("failed to query display device: {err}"),
            ),
        }

        let chosen = driver
            .choose_config(display, &ConfigAttribs::from_config(config))
            .map_err(NegotiationError::NoMatchingConfiguration)?;
        diagnostics.report(
            Severity::Info,
            &format!(
                "selected framebuffer configuration (depth {} bits)",
                config.requested_depth_bits()
            ),
        );

        let context = driver
            .create_context(display, chosen, &ContextAttribs::from_config(config))
            .map_err(NegotiationError::ContextCreationFailed)?;
        self.context = Some(context);
        diagnostics.report(
            Severity::Info,
            &format!("created context (client version {})", config.client_version),
        );

        let surface = driver
            .create_pbuffer_surface(display, chosen, config.surface_size)
            .map_err(NegotiationError::SurfaceCreationFailed)?;
        self.surface = Some(surface);
        diagnostics.report(
            Severity::Info,
            &format!(
                "created {}x{} pbuffer surface",
                config.surface_size.width, config.surface_size.height
            ),
        );

        Ok(())
    }
}

impl<D: Driver> ContextNegotiator for EglNegotiator<D> {
    fn negotiate(
        &mut self,
        config: &HeadlessConfig,
        diagnostics: &dyn Diagnostics,
    ) -> Result<(), NegotiationError> {
        if self.attempted {
            return Err(NegotiationError::AlreadyAttempted);
        }
        self.attempted = true;

        let driver = match self.driver.take() {
            Some(driver) => driver,
            None => {
                let driver = D::load(config)?;
                diagnostics.report(
                    Severity::Info,
                    &format!("loaded driver {}", driver.describe()),
                );
                driver
            }
        };
        let result = self.acquire(&driver, config, diagnostics);
        self.driver = Some(driver);

        result?;
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
        let (Some(driver), Some(display)) = (self.driver.as_ref(), self.display) else {
            return;
        };
        if let Err(err) = driver.make_current(display, self.surface, self.context) {
            diagnostics.report(
                Severity::Error,
                &format!("failed to make context current: {err}"),
            );
        }
    }

    fn gl_version(&self) -> Option<(i32, i32)> {
        if !self.ready {
            return None;
        }
        self.driver.as_ref()?.gl_version()
    }

    fn get_proc_address(&self, name: &CStr) -> *const c_void {
        match (&self.driver, self.ready) {
            (Some(driver), true) => driver.get_proc_address(name),
            _ => std::ptr::null(),
        }
    }

    fn release(&mut self, diagnostics: &dyn Diagnostics) {
        let Some(driver) = self.driver.as_ref() else {
            return;
        };

        if self.ready
            && let Some(display) = self.display
            && let Err(err) = driver.make_current(display, None, None)
        {
            diagnostics.report(
                Severity::Warning,
                &format!("failed to release current context: {err}"),
            );
        }
        self.ready = false;

        if let (Some(display), Some(context)) = (self.display, self.context.take())
            && let Err(err) = driver.destroy_context(display, context)
        {
            diagnostics.report(Severity::Warning, &format!("failed to destroy context: {err}"));
        }
        if let (Some(display), Some(surface)) = (self.display, self.surface.take())
            && let Err(err) = driver.destroy_surface(display, surface)
        {
            diagnostics.report(Severity::Warning, &format!("failed to destroy surface: {err}"));
        }
        if let Some(display) = self.display.take()
            && let Err(err) = driver.terminate(display)
        {
            diagnostics.report(Severity::Warning, &format!("failed to terminate display: {err}"));
        }
    }
}

impl<D: Driver> Drop for EglNegotiator<D> {
    fn drop(&mut self) {
        self.release(&LogDiagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::EglNegotiator;
    use crate::engine::config::HeadlessConfig;
    use crate::engine::diagnostics::Severity;
    use crate::engine::diagnostics::recording::RecordingDiagnostics;
    use crate::engine::driver::simulated::{Journal, SimulatedDriver, Step, journal};
    use crate::engine::error::NegotiationError;
    use crate::engine::negotiator::ContextNegotiator;

    fn entries(journal: &Journal) -> Vec<String> {
        journal.lock().unwrap().clone()
    }

    type Outcome = (
        EglNegotiator<SimulatedDriver>,
        RecordingDiagnostics,
        Result<(), NegotiationError>,
    );

    fn negotiate(driver: SimulatedDriver) -> Outcome {
        let diagnostics = RecordingDiagnostics::default();
        let mut negotiator = EglNegotiator::with_driver(driver);
        let result = negotiator.negotiate(&HeadlessConfig::default(), &diagnostics);
        (negotiator, diagnostics, result)
    }

    #[test]
    fn successful_negotiation_runs_steps_in_order() {
        let journal = journal();
        let (negotiator, diagnostics, result) = negotiate(SimulatedDriver::new(journal.clone()));

        assert_eq!(result, Ok(()));
        assert!(negotiator.is_ready());
        assert_eq!(
            entries(&journal),
            vec![
                "query_devices(max=10)",
                "get_platform_display(100)",
                "initialize(1)",
                "query_display_device(1)",
                "choose_config(1, depth=24, pbuffer=true)",
                "create_context(1, 7, version=3)",
                "create_pbuffer_surface(1, 7, 100x100)",
            ]
        );
        assert!(diagnostics.contains(Severity::Info, "device 0: EGL_EXT_device_drm device100"));
        assert!(diagnostics.contains(Severity::Info, "initialized EGL 1.5"));
    }

    #[test]
    fn first_device_is_used_even_when_several_exist() {
        let journal = journal();
        let (_negotiator, diagnostics, result) =
            negotiate(SimulatedDriver::new(journal.clone()).with_devices(3));

        assert_eq!(result, Ok(()));
        assert!(entries(&journal).contains(&"get_platform_display(100)".to_string()));
        assert!(diagnostics.contains(Severity::Info, "found 3 device(s)"));
        assert!(diagnostics.contains(Severity::Info, "device 2:"));
    }

    #[test]
    fn zero_devices_is_no_device_found() {
        let journal = journal();
        let (negotiator, _diagnostics, result) =
            negotiate(SimulatedDriver::new(journal.clone()).with_devices(0));

        assert!(matches!(result, Err(NegotiationError::NoDeviceFound(_))));
        assert!(!negotiator.is_ready());
        assert_eq!(entries(&journal), vec!["query_devices(max=10)"]);
    }

    #[test]
    fn each_failing_step_stops_every_later_step() {
        let cases = [
            (Step::QueryDevices, "query_devices"),
            (Step::GetPlatformDisplay, "get_platform_display"),
            (Step::Initialize, "initialize"),
            (Step::ChooseConfig, "choose_config"),
            (Step::CreateContext, "create_context"),
            (Step::CreatePbufferSurface, "create_pbuffer_surface"),
        ];
        for (step, last_call) in cases {
            let journal = journal();
            let (negotiator, _diagnostics, result) =
                negotiate(SimulatedDriver::new(journal.clone()).failing_at(step));

            assert!(result.is_err(), "{step:?}");
            assert!(!negotiator.is_ready(), "{step:?}");
            let calls = entries(&journal);
            assert!(calls.last().unwrap().starts_with(last_call), "{step:?}: {calls:?}");
        }
    }

    #[test]
    fn failures_map_to_the_step_error() {
        let (_, _, result) = negotiate(SimulatedDriver::new(journal()).failing_at(Step::Initialize));
        assert!(matches!(result, Err(NegotiationError::DisplayInitFailed(_))));

        let (_, _, result) = negotiate(SimulatedDriver::new(journal()).failing_at(Step::ChooseConfig));
        assert!(matches!(result, Err(NegotiationError::NoMatchingConfiguration(_))));

        let (_, _, result) =
            negotiate(SimulatedDriver::new(journal()).failing_at(Step::CreateContext));
        assert!(matches!(result, Err(NegotiationError::ContextCreationFailed(_))));
    }

    #[test]
    fn display_device_query_failure_is_only_a_warning() {
        let (negotiator, diagnostics, result) =
            negotiate(SimulatedDriver::new(journal()).failing_at(Step::QueryDisplayDevice));

        assert_eq!(result, Ok(()));
        assert!(negotiator.is_ready());
        assert!(diagnostics.contains(Severity::Warning, "failed to query display device"));
    }

    #[test]
    fn release_after_success_unbinds_then_destroys_in_order() {
        let journal = journal();
        let (mut negotiator, diagnostics, _) = negotiate(SimulatedDriver::new(journal.clone()));
        journal.lock().unwrap().clear();

        negotiator.release(&diagnostics);
        negotiator.release(&diagnostics);

        assert!(!negotiator.is_ready());
        assert_eq!(
            entries(&journal),
            vec![
                "make_current(1, none)",
                "destroy_context(1, 20)",
                "destroy_surface(1, 30)",
                "terminate(1)",
            ]
        );
    }

    #[test]
    fn release_after_context_failure_only_terminates_the_display() {
        let journal = journal();
        let (mut negotiator, diagnostics, _) =
            negotiate(SimulatedDriver::new(journal.clone()).failing_at(Step::CreateContext));
        journal.lock().unwrap().clear();

        negotiator.release(&diagnostics);

        assert_eq!(entries(&journal), vec!["terminate(1)"]);
    }

    #[test]
    fn make_current_is_a_no_op_until_ready() {
        let journal = journal();
        let (negotiator, diagnostics, _) =
            negotiate(SimulatedDriver::new(journal.clone()).failing_at(Step::CreatePbufferSurface));
        journal.lock().unwrap().clear();

        negotiator.make_current(&diagnostics);
        assert!(negotiator.get_proc_address(c"glClear").is_null());
        assert_eq!(negotiator.gl_version(), None);
        assert!(entries(&journal).is_empty());
    }

    #[test]
    fn bind_failure_is_reported_not_escalated() {
        let (negotiator, diagnostics, result) =
            negotiate(SimulatedDriver::new(journal()).failing_at(Step::MakeCurrent));
        assert_eq!(result, Ok(()));

        negotiator.make_current(&diagnostics);
        assert!(diagnostics.contains(Severity::Error, "failed to make context current"));
    }

    #[test]
    fn second_negotiation_is_rejected() {
        let (mut negotiator, diagnostics, result) = negotiate(SimulatedDriver::new(journal()));
        assert_eq!(result, Ok(()));
        assert_eq!(
            negotiator.negotiate(&HeadlessConfig::default(), &diagnostics),
            Err(NegotiationError::AlreadyAttempted)
        );
        assert!(negotiator.is_ready());
    }

    #[test]
    fn missing_driver_library_is_driver_unavailable() {
        let diagnostics = RecordingDiagnostics::default();
        let mut negotiator = EglNegotiator::<SimulatedDriver>::default();
        let result = negotiator.negotiate(&HeadlessConfig::default(), &diagnostics);
        assert!(matches!(result, Err(NegotiationError::DriverUnavailable(_))));
        assert!(!negotiator.is_ready());
    }
}
