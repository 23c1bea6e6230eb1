//! 引擎模块：轮询调度、开启状态汇总与默认处理动作
pub mod action;
pub mod open_state;
pub mod scheduler;

// 导出核心接口
pub use self::action::{BLOCKED_PAGE_URL, CLOSE_FALLBACK_DELAY, DefaultAction};
pub use self::open_state::OpenStateMap;
pub use self::scheduler::{DevtoolGuard, EngineState, StartOutcome};
