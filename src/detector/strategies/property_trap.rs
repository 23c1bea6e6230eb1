//! 元素属性陷阱检测
//! 控制台实时展开元素时会读取其 `id`，普通输出不会

use crate::detector::base::{DetectContext, Detector};
use crate::detector::kind::DetectorKind;
use crate::env::{ConsoleValue, ElementTrap, EnvProbe};

pub struct PropertyTrapDetector {
    enabled: bool,
    trap: ElementTrap,
}

impl PropertyTrapDetector {
    pub fn new(_probe: &EnvProbe) -> Self {
        Self {
            enabled: true,
            trap: ElementTrap::new(),
        }
    }

    /// 宿主侧持有的陷阱句柄（异步展开时同样生效）
    pub fn trap(&self) -> &ElementTrap {
        &self.trap
    }
}

impl Detector for PropertyTrapDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::PropertyTrap
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init(&mut self, _ctx: &mut DetectContext<'_>) {
        self.trap.take_read();
    }

    fn detect(&mut self, _tick: u64, ctx: &mut DetectContext<'_>) {
        ctx.platform.console_log(ConsoleValue::Element(&self.trap));
        // 包含上一周期输出后被异步读取的情况
        if self.trap.take_read() {
            ctx.report_open(self.kind());
        }
        ctx.clear_console();
    }
}
