//! 控制台渲染耗时检测
//! 开发者工具打开时表格输出远慢于普通日志输出：记录日志输出的最大耗时，
//! 表格输出耗时超过其 `PERFORMANCE_RATIO` 倍即判定

use std::time::Duration;

use serde_json::{Map, Value};

use crate::detector::base::{DetectContext, Detector};
use crate::detector::kind::DetectorKind;
use crate::detector::thresholds::{PAYLOAD_COLUMNS, PAYLOAD_ROWS, PERFORMANCE_RATIO};
use crate::env::{ConsoleValue, EnvProbe};

pub struct PerformanceTimingDetector {
    enabled: bool,
    payload: Value,
    max_log_time: Duration,
}

impl PerformanceTimingDetector {
    pub fn new(probe: &EnvProbe) -> Self {
        Self {
            enabled: probe.is_chrome || !probe.is_mobile,
            payload: Value::Null,
            max_log_time: Duration::ZERO,
        }
    }

    pub fn max_log_time(&self) -> Duration {
        self.max_log_time
    }
}

/// 生成大体积的二维对象数组
pub fn build_payload(rows: usize, columns: usize) -> Value {
    let row: Map<String, Value> = (0..columns)
        .map(|i| (i.to_string(), Value::String(i.to_string())))
        .collect();
    Value::Array((0..rows).map(|_| Value::Object(row.clone())).collect())
}

impl Detector for PerformanceTimingDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::PerformanceTiming
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init(&mut self, _ctx: &mut DetectContext<'_>) {
        self.payload = build_payload(PAYLOAD_ROWS, PAYLOAD_COLUMNS);
        self.max_log_time = Duration::ZERO;
    }

    fn detect(&mut self, _tick: u64, ctx: &mut DetectContext<'_>) {
        let platform = ctx.platform;

        let start = platform.now();
        platform.console_table(&self.payload);
        let table_time = platform.now().saturating_duration_since(start);

        let start = platform.now();
        platform.console_log(ConsoleValue::Payload(&self.payload));
        let log_time = platform.now().saturating_duration_since(start);

        self.max_log_time = self.max_log_time.max(log_time);
        ctx.clear_console();

        if table_time.is_zero() || self.max_log_time.is_zero() {
            return;
        }
        if table_time > self.max_log_time * PERFORMANCE_RATIO {
            ctx.report_open(self.kind());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::base::test_support::{run_detect, run_init};
    use crate::env::mock::MockPlatform;

    #[test]
    fn test_payload_shape() {
        let payload = build_payload(3, 4);
        let rows = payload.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_slow_table_fires() {
        let platform = MockPlatform::new("https://a.com/");
        let probe = EnvProbe::detect(&platform);
        let mut detector = PerformanceTimingDetector::new(&probe);
        assert!(detector.enabled());
        run_init(&mut detector, &platform, &probe);

        platform.update(|s| {
            s.table_cost = Duration::from_millis(5);
            s.log_cost = Duration::from_millis(2);
        });
        let (opened, _) = run_detect(&mut detector, 0, &platform, &probe);
        assert!(opened.is_empty());
        assert_eq!(detector.max_log_time(), Duration::from_millis(2));

        platform.update(|s| {
            s.table_cost = Duration::from_millis(50);
            s.log_cost = Duration::from_millis(1);
        });
        let (opened, _) = run_detect(&mut detector, 1, &platform, &probe);
        assert_eq!(opened, vec![DetectorKind::PerformanceTiming]);
        // 最大值是滚动的，不会被更快的输出拉低
        assert_eq!(detector.max_log_time(), Duration::from_millis(2));
    }

    #[test]
    fn test_zero_timing_is_ignored() {
        let platform = MockPlatform::new("https://a.com/");
        let probe = EnvProbe::detect(&platform);
        let mut detector = PerformanceTimingDetector::new(&probe);
        run_init(&mut detector, &platform, &probe);

        platform.update(|s| s.table_cost = Duration::from_millis(50));
        let (opened, _) = run_detect(&mut detector, 0, &platform, &probe);
        assert!(opened.is_empty());
    }
}
