//! 正则诱饵检测
//! 控制台渲染正则对象时会调用其字符串化方法：
//! - Firefox：出现一次即判定
//! - QQ浏览器：两次调用间隔小于阈值才判定（普通输出也会调用一次）

use std::time::Instant;

use crate::detector::base::{DetectContext, Detector};
use crate::detector::kind::DetectorKind;
use crate::detector::thresholds::DOUBLE_FIRE_WINDOW;
use crate::env::{ConsoleValue, Decoy, DecoyShape, EnvProbe};

pub struct RegexStringifyDetector {
    enabled: bool,
    timing_mode: bool,
    decoy: Decoy,
    last_hit: Option<Instant>,
}

impl RegexStringifyDetector {
    pub fn new(probe: &EnvProbe) -> Self {
        Self {
            enabled: probe.is_qq_browser || probe.is_firefox,
            timing_mode: probe.is_qq_browser,
            decoy: Decoy::new(DecoyShape::Regex),
            last_hit: None,
        }
    }

    fn check_hits(&mut self, ctx: &mut DetectContext<'_>) {
        let hits = self.decoy.take_hits();
        let fired = if self.timing_mode {
            // 相邻两次调用配对判定，配对成功后清空，下一次调用重新开始计时
            let mut fired = false;
            for hit in hits {
                match self.last_hit {
                    Some(last) if hit.saturating_duration_since(last) < DOUBLE_FIRE_WINDOW => {
                        fired = true;
                        self.last_hit = None;
                    }
                    _ => self.last_hit = Some(hit),
                }
            }
            fired
        } else {
            !hits.is_empty()
        };

        if fired {
            ctx.report_open(self.kind());
        }
    }
}

impl Detector for RegexStringifyDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::RegexStringify
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init(&mut self, ctx: &mut DetectContext<'_>) {
        self.last_hit = None;
        ctx.platform.console_log(ConsoleValue::Decoy(&self.decoy));
        self.check_hits(ctx);
    }

    fn detect(&mut self, _tick: u64, ctx: &mut DetectContext<'_>) {
        ctx.platform.console_log(ConsoleValue::Decoy(&self.decoy));
        self.check_hits(ctx);
        ctx.clear_console();
    }
}
