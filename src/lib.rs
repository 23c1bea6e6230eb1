//! rsdisable-devtool - 开发者工具检测引擎
//! 启发式检测器 + 可挂起的轮询调度 + 绕过策略（令牌/忽略规则/爬虫豁免）

// 导出全局错误类型
pub use self::error::{GuardError, GuardResult};

// 导出配置模块
pub use self::config::{CloseCallback, Config, ConfigBuilder, OpenCallback, Options};

// 导出环境模块核心接口
pub use self::env::{ConsoleValue, Decoy, DecoyShape, ElementTrap, EnvProbe, NoopPlatform, Platform, WindowMetrics};

// 导出检测模块核心接口
pub use self::detector::{
    DebugLibrary, DetectContext, Detector, DetectorKind, DetectorRegistry, DetectorSelection, RegisteredDetectors,
};

// 导出引擎模块核心接口
pub use self::engine::{DefaultAction, DevtoolGuard, EngineState, StartOutcome};

// 导出策略模块核心接口
pub use self::policy::{BypassPolicy, BypassReason, DomEvent, GuardSet, IgnorePattern, IgnoreRule, KeyChord, token_digest};

// 导出工具模块核心接口
pub use self::utils::{UrlParam, config_patch_from_attributes};

// 声明所有子模块
pub mod config;
pub mod detector;
pub mod engine;
pub mod env;
pub mod error;
pub mod policy;
pub mod utils;
