//! 函数诱饵检测：与日期诱饵相同的双次字符串化判定

use crate::detector::base::{DetectContext, Detector};
use crate::detector::kind::DetectorKind;
use crate::detector::thresholds::MIN_STRINGIFY_HITS;
use crate::env::{Decoy, DecoyShape, EnvProbe};

pub struct FunctionStringifyDetector {
    enabled: bool,
    decoy: Decoy,
}

impl FunctionStringifyDetector {
    pub fn new(probe: &EnvProbe) -> Self {
        Self {
            enabled: !probe.is_ios_chrome && !probe.is_ios_edge,
            decoy: Decoy::new(DecoyShape::Function),
        }
    }
}

impl Detector for FunctionStringifyDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::FunctionStringify
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::base::test_support::run_detect;
    use crate::env::mock::MockPlatform;

    #[test]
    fn test_fires_on_three_renders() {
        let platform = MockPlatform::new("https://a.com/");
        let probe = EnvProbe::detect(&platform);
        let mut detector = FunctionStringifyDetector::new(&probe);

        platform.update(|s| s.stringify_per_log = 3);
        let (opened, _) = run_detect(&mut detector, 0, &platform, &probe);
        assert_eq!(opened, vec![DetectorKind::FunctionStringify]);
        assert_eq!(platform.read(|s| s.rendered.clone()), vec![DecoyShape::Function]);
    }

    #[test]
    fn test_disabled_in_ios_shells() {
        let probe = EnvProbe { is_ios_edge: true, ..Default::default() };
        assert!(!FunctionStringifyDetector::new(&probe).enabled());
    }
}
