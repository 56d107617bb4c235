//! ### English
//! Diagnostics sink injected into the negotiator and the headless context.
//!
//! ### 中文
//! 注入到协商器与 headless 上下文的诊断输出接口。

/// ### English
/// Severity of one diagnostic report.
///
/// ### 中文
/// 单条诊断报告的严重级别。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// ### English
    /// Informational progress (device enumeration, versions).
    ///
    /// ### 中文
    /// 信息性进度（设备枚举、版本号等）。
    Info,
    /// ### English
    /// Anomaly that does not stop the current operation.
    ///
    /// ### 中文
    /// 不会中断当前操作的异常。
    Warning,
    /// ### English
    /// Hard failure of an acquisition step.
    ///
    /// ### 中文
    /// 获取步骤的硬性失败。
    Error,
}

/// ### English
/// Receives one report per negotiation step and per anomalous condition.
///
/// ### 中文
/// 每个协商步骤以及每个异常情况都会产生一条报告。
pub trait Diagnostics: Send + Sync {
    fn report(&self, severity: Severity, message: &str);
}

/// ### English
/// Default sink forwarding to the `log` facade under the `headless_gl` target.
///
/// ### 中文
/// 默认实现：以 `headless_gl` target 转发到 `log` 门面。
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => log::info!(target: "headless_gl", "{message}"),
            Severity::Warning => log::warn!(target: "headless_gl", "{message}"),
            Severity::Error => log::error!(target: "headless_gl", "{message}"),
        }
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use std::sync::Mutex;

    use super::{Diagnostics, Severity};

    /// Test sink keeping every report in order.
    #[derive(Default)]
    pub(crate) struct RecordingDiagnostics {
        entries: Mutex<Vec<(Severity, String)>>,
    }

    impl RecordingDiagnostics {
        pub(crate) fn contains(&self, severity: Severity, needle: &str) -> bool {
            self.entries
                .lock()
                .unwrap()
                .iter()
                .any(|(s, m)| *s == severity && m.contains(needle))
        }
    }

    impl Diagnostics for RecordingDiagnostics {
        fn report(&self, severity: Severity, message: &str) {
            self.entries
                .lock()
                .unwrap()
                .push((severity, message.to_string()));
        }
    }
}
