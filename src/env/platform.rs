//! 宿主平台能力抽象
//! 检测器与调度器只通过 `Platform` 读取环境、输出控制台、安装事件拦截与执行跳转，
//! 浏览器之外的宿主可直接使用 `NoopPlatform`（所有探针均视为不存在）

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde_json::Value;

use crate::policy::GuardSet;

/// 窗口尺寸信息（对应 outer/inner 宽高与缩放比）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowMetrics {
    pub outer_width: f64,
    pub inner_width: f64,
    pub outer_height: f64,
    pub inner_height: f64,
    pub device_pixel_ratio: Option<f64>,
    // 旧版IE系缩放比来源
    pub device_xdpi: Option<f64>,
    pub logical_xdpi: Option<f64>,
}

impl WindowMetrics {
    /// 计算屏幕缩放比：优先 devicePixelRatio，其次 deviceXDPI/logicalXDPI，均不可用返回 None
    pub fn zoom_ratio(&self) -> Option<f64> {
        if let Some(ratio) = self.device_pixel_ratio.filter(|r| *r > 0.0) {
            return Some(ratio);
        }
        match (self.device_xdpi, self.logical_xdpi) {
            (Some(device), Some(logical)) if device > 0.0 && logical > 0.0 => Some(device / logical),
            _ => None,
        }
    }
}

/// 诱饵对象的外形（宿主控制台据此决定如何渲染）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoyShape {
    Regex,
    Date,
    Function,
}

/// 字符串化诱饵
/// 控制台每次渲染诱饵都应调用 `stringify`，检测器根据调用次数与时间点判断
#[derive(Debug, Clone)]
pub struct Decoy {
    shape: DecoyShape,
    hits: Arc<Mutex<Vec<Instant>>>,
}

impl Decoy {
    pub fn new(shape: DecoyShape) -> Self {
        Self {
            shape,
            hits: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn shape(&self) -> DecoyShape {
        self.shape
    }

    /// 被宿主字符串化时调用，返回空串
    pub fn stringify(&self) -> String {
        if let Ok(mut hits) = self.hits.lock() {
            hits.push(Instant::now());
        }
        String::new()
    }

    pub fn hit_count(&self) -> usize {
        self.hits.lock().map(|hits| hits.len()).unwrap_or(0)
    }

    /// 取出并清空已记录的调用时间点
    pub fn take_hits(&self) -> Vec<Instant> {
        self.hits
            .lock()
            .map(|mut hits| std::mem::take(&mut *hits))
            .unwrap_or_default()
    }
}

/// 元素属性陷阱：宿主在控制台实时展开元素时读取其 `id`
#[derive(Debug, Clone, Default)]
pub struct ElementTrap {
    read: Arc<AtomicBool>,
}

impl ElementTrap {
    pub fn new() -> Self {
        Self::default()
    }

    /// `id` 的 getter
    pub fn read_id(&self) -> &'static str {
        self.read.store(true, Ordering::SeqCst);
        ""
    }

    /// 返回自上次调用以来是否被读取过，并复位
    pub fn take_read(&self) -> bool {
        self.read.swap(false, Ordering::SeqCst)
    }
}

/// 输出到控制台的值
#[derive(Debug, Clone, Copy)]
pub enum ConsoleValue<'a> {
    Decoy(&'a Decoy),
    Element(&'a ElementTrap),
    Payload(&'a Value),
}

/// 宿主平台能力
/// 除 `location`/`user_agent` 外均带默认实现，默认即“能力不存在”
pub trait Platform: Send + Sync {
    /// 当前页面完整URL
    fn location(&self) -> String;

    fn user_agent(&self) -> String;

    /// navigator.platform
    fn platform_name(&self) -> String {
        String::new()
    }

    fn max_touch_points(&self) -> u32 {
        0
    }

    /// 当前窗口到顶层窗口之间的祖先框架层数，顶层窗口为 0
    fn frame_depth(&self) -> usize {
        0
    }

    fn window_metrics(&self) -> Option<WindowMetrics> {
        None
    }

    /// 按API名读取可见性标志（hidden/mozHidden/...），不支持返回 None
    fn visibility_flag(&self, _api: &str) -> Option<bool> {
        None
    }

    fn console_log(&self, _value: ConsoleValue<'_>) {}

    fn console_table(&self, _value: &Value) {}

    fn console_clear(&self) {}

    /// 宿主时钟，检测器用于计时
    fn now(&self) -> Instant {
        Instant::now()
    }

    /// 执行一次断点语句（调试器打开时会在此阻塞）
    fn debugger_pause(&self) {}

    /// 读取全局变量路径，如 `eruda._devTools._isShow`
    fn global_value(&self, _path: &str) -> Option<Value> {
        None
    }

    fn query_selector(&self, _selector: &str) -> bool {
        false
    }

    /// 在指定层级的窗口上安装事件拦截，层级 0 为当前窗口
    fn install_guards(&self, _frame_level: usize, _guards: &GuardSet) {}

    fn navigate(&self, _url: &str) {}

    fn rewrite_body(&self, _html: &str) {}

    fn close_window(&self) {}

    fn history_back(&self) {}
}

/// 非浏览器宿主的空实现
#[derive(Debug, Clone, Default)]
pub struct NoopPlatform {
    location: String,
    user_agent: String,
}

impl NoopPlatform {
    pub fn new(location: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            user_agent: user_agent.into(),
        }
    }
}

impl Platform for NoopPlatform {
    fn location(&self) -> String {
        self.location.clone()
    }

    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }
}
