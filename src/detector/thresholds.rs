//! 启发式阈值常量（经验值，保持与浏览器端行为一致）

use std::time::Duration;

/// 正则诱饵两次字符串化的最大间隔（QQ浏览器）
pub const DOUBLE_FIRE_WINDOW: Duration = Duration::from_millis(100);

/// 单次输出中诱饵被字符串化的最少次数
pub const MIN_STRINGIFY_HITS: usize = 2;

/// 窗口宽度差阈值（px）
pub const SIZE_SKEW_WIDTH_PX: f64 = 200.0;

/// 窗口高度差阈值（px）
pub const SIZE_SKEW_HEIGHT_PX: f64 = 300.0;

/// resize 事件去抖时间
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

/// 断点暂停判定阈值
pub const DEBUGGER_PAUSE_THRESHOLD: Duration = Duration::from_millis(100);

/// 表格输出耗时超过日志输出最大耗时的倍数
pub const PERFORMANCE_RATIO: u32 = 10;

/// 性能探测负载规模
pub const PAYLOAD_ROWS: usize = 50;
pub const PAYLOAD_COLUMNS: usize = 500;
