//! 具体检测策略
pub mod date_stringify;
pub mod debug_lib;
pub mod debugger;
pub mod function_stringify;
pub mod performance;
pub mod property_trap;
pub mod regex_stringify;
pub mod window_size;

// 导出核心接口
pub use self::date_stringify::DateStringifyDetector;
pub use self::debug_lib::{DebugLibrary, ExternalDebugLibraryDetector, debug_library_in_use};
pub use self::debugger::DebuggerStatementDetector;
pub use self::function_stringify::FunctionStringifyDetector;
pub use self::performance::PerformanceTimingDetector;
pub use self::property_trap::PropertyTrapDetector;
pub use self::regex_stringify::RegexStringifyDetector;
pub use self::window_size::WindowSizeSkewDetector;
