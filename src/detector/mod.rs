//! 检测模块：检测器约定、注册表与各启发式策略
pub mod base;
pub mod kind;
pub mod registry;
pub mod strategies;
pub mod thresholds;

// 导出核心接口
pub use self::base::{DetectContext, Detector};
pub use self::kind::{DetectorKind, DetectorSelection};
pub use self::registry::{DetectorFactory, DetectorRegistry, RegisteredDetectors};
pub use self::strategies::{DebugLibrary, debug_library_in_use};
