//! 日期诱饵检测：一次输出中被字符串化两次及以上即判定

use crate::detector::base::{DetectContext, Detector};
use crate::detector::kind::DetectorKind;
use crate::detector::thresholds::MIN_STRINGIFY_HITS;
use crate::env::{Decoy, DecoyShape, EnvProbe};

pub struct DateStringifyDetector {
    enabled: bool,
    decoy: Decoy,
}

impl DateStringifyDetector {
    pub fn new(probe: &EnvProbe) -> Self {
        Self {
            enabled: (probe.is_chrome && !probe.is_ios_chrome) || probe.is_edge,
            decoy: Decoy::new(DecoyShape::Date),
        }
    }
}

impl Detector for DateStringifyDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::DateStringify
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init(&mut self, _ctx: &mut DetectContext<'_>) {
        self.decoy.take_hits();
    }

    fn detect(&mut self, _tick: u64, ctx: &mut DetectContext<'_>) {
        if ctx.render_decoy(&self.decoy) >= MIN_STRINGIFY_HITS {
            ctx.report_open(self.kind());
        }
    }
}
