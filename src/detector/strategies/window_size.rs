//! 窗口尺寸差检测
//! 开发者工具停靠在窗口内时，outer 与 inner 尺寸差会明显超出正常边框

use crate::detector::base::{DetectContext, Detector};
use crate::detector::kind::DetectorKind;
use crate::detector::thresholds::{SIZE_SKEW_HEIGHT_PX, SIZE_SKEW_WIDTH_PX};
use crate::env::{EnvProbe, WindowMetrics};

pub struct WindowSizeSkewDetector {
    enabled: bool,
}

impl WindowSizeSkewDetector {
    pub fn new(probe: &EnvProbe) -> Self {
        Self {
            enabled: !probe.is_in_iframe && !probe.is_edge,
        }
    }

    /// 判断尺寸是否失衡；缩放比不可用时返回 None（无法判断）
    pub fn is_skewed(metrics: &WindowMetrics) -> Option<bool> {
        let ratio = metrics.zoom_ratio()?;
        let width_skew = metrics.outer_width - metrics.inner_width * ratio > SIZE_SKEW_WIDTH_PX;
        let height_skew = metrics.outer_height - metrics.inner_height * ratio > SIZE_SKEW_HEIGHT_PX;
        Some(width_skew || height_skew)
    }

    fn check(&self, ctx: &mut DetectContext<'_>) {
        let Some(metrics) = ctx.platform.window_metrics() else {
            return;
        };
        match Self::is_skewed(&metrics) {
            Some(true) => ctx.report_open(self.kind()),
            Some(false) => ctx.report_closed(self.kind()),
            None => {}
        }
    }
}

impl Detector for WindowSizeSkewDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::WindowSizeSkew
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init(&mut self, ctx: &mut DetectContext<'_>) {
        self.check(ctx);
    }

    fn detect(&mut self, _tick: u64, ctx: &mut DetectContext<'_>) {
        self.check(ctx);
    }

    fn on_resize(&mut self, ctx: &mut DetectContext<'_>) {
        self.check(ctx);
    }
}
