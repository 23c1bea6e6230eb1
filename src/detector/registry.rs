//! 检测器注册表
//! 检测器类型 → 构造函数；按启用列表构造实例，未启用的实例被排除在轮询之外

use tracing::debug;

use super::base::Detector;
use super::kind::{DetectorKind, DetectorSelection};
use super::strategies::{
    DateStringifyDetector, DebuggerStatementDetector, ExternalDebugLibraryDetector, FunctionStringifyDetector,
    PerformanceTimingDetector, PropertyTrapDetector, RegexStringifyDetector, WindowSizeSkewDetector,
};
use crate::env::EnvProbe;

/// 检测器构造函数
pub type DetectorFactory = fn(&EnvProbe) -> Box<dyn Detector>;

/// 类型与构造函数对照表（按编号升序）
const FACTORIES: [(DetectorKind, DetectorFactory); 8] = [
    (DetectorKind::RegexStringify, |p: &EnvProbe| -> Box<dyn Detector> { Box::new(RegexStringifyDetector::new(p)) }),
    (DetectorKind::PropertyTrap, |p: &EnvProbe| -> Box<dyn Detector> { Box::new(PropertyTrapDetector::new(p)) }),
    (DetectorKind::WindowSizeSkew, |p: &EnvProbe| -> Box<dyn Detector> { Box::new(WindowSizeSkewDetector::new(p)) }),
    (DetectorKind::DateStringify, |p: &EnvProbe| -> Box<dyn Detector> { Box::new(DateStringifyDetector::new(p)) }),
    (DetectorKind::FunctionStringify, |p: &EnvProbe| -> Box<dyn Detector> { Box::new(FunctionStringifyDetector::new(p)) }),
    (DetectorKind::DebuggerStatement, |p: &EnvProbe| -> Box<dyn Detector> { Box::new(DebuggerStatementDetector::new(p)) }),
    (DetectorKind::PerformanceTiming, |p: &EnvProbe| -> Box<dyn Detector> { Box::new(PerformanceTimingDetector::new(p)) }),
    (DetectorKind::ExternalDebugLibrary, |p: &EnvProbe| -> Box<dyn Detector> { Box::new(ExternalDebugLibraryDetector::new(p)) }),
];

/// 构造结果
pub struct RegisteredDetectors {
    /// 参与轮询的检测器（每种类型至多一个）
    pub active: Vec<Box<dyn Detector>>,
    /// 当前环境下未启用的类型
    pub disabled: Vec<DetectorKind>,
}

impl RegisteredDetectors {
    pub fn active_kinds(&self) -> Vec<DetectorKind> {
        self.active.iter().map(|d| d.kind()).collect()
    }
}

/// 检测器注册表
pub struct DetectorRegistry;

impl DetectorRegistry {
    pub fn factory(kind: DetectorKind) -> DetectorFactory {
        FACTORIES[kind.id() as usize].1
    }

    /// 构造单个检测器
    pub fn create(kind: DetectorKind, probe: &EnvProbe) -> Box<dyn Detector> {
        (Self::factory(kind))(probe)
    }

    /// 按启用列表构造检测器
    pub fn build(selection: &DetectorSelection, probe: &EnvProbe) -> RegisteredDetectors {
        let mut active = Vec::new();
        let mut disabled = Vec::new();

        for kind in selection.kinds() {
            let detector = Self::create(kind, probe);
            if detector.enabled() {
                active.push(detector);
            } else {
                disabled.push(kind);
            }
        }

        debug!(
            "检测器构造完成，启用：{:?}，当前环境未启用：{:?}",
            active.iter().map(|d| d.kind()).collect::<Vec<_>>(),
            disabled
        );

        RegisteredDetectors { active, disabled }
    }
}
