//! 环境模块：宿主平台能力抽象与运行环境探测
pub mod platform;
pub mod probe;

#[cfg(test)]
pub(crate) mod mock;

// 导出核心接口
pub use self::platform::{
    ConsoleValue, Decoy, DecoyShape, ElementTrap, NoopPlatform, Platform, WindowMetrics,
};
pub use self::probe::EnvProbe;
