//! 断点暂停检测
//! 仅用于无法拦截开发者工具事件的移动端外壳（iOS Chrome/Edge）

use crate::detector::base::{DetectContext, Detector};
use crate::detector::kind::DetectorKind;
use crate::detector::thresholds::DEBUGGER_PAUSE_THRESHOLD;
use crate::env::EnvProbe;

pub struct DebuggerStatementDetector {
    enabled: bool,
}

impl DebuggerStatementDetector {
    pub fn new(probe: &EnvProbe) -> Self {
        Self {
            enabled: probe.is_ios_chrome || probe.is_ios_edge,
        }
    }
}

impl Detector for DebuggerStatementDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::DebuggerStatement
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init(&mut self, _ctx: &mut DetectContext<'_>) {}

    fn detect(&mut self, _tick: u64, ctx: &mut DetectContext<'_>) {
        let start = ctx.platform.now();
        ctx.platform.debugger_pause();
        let paused = ctx.platform.now().saturating_duration_since(start);
        if paused > DEBUGGER_PAUSE_THRESHOLD {
            ctx.report_open(self.kind());
        }
    }
}
