//! 调度引擎：轮询定时器、挂起/恢复、无活动自停与检测结果汇总
//! 状态流转：Stopped → Running ⇄ Suspended → Stopped
//! 所有检测均在同一把锁内串行执行，周期之间不会重叠；用户回调在锁外调用

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::action::DefaultAction;
use super::open_state::OpenStateMap;
use crate::config::{CloseCallback, Config, OpenCallback};
use crate::detector::thresholds::RESIZE_DEBOUNCE;
use crate::detector::{DetectContext, Detector, DetectorKind, DetectorRegistry, debug_library_in_use};
use crate::env::{EnvProbe, Platform};
use crate::error::{GuardError, GuardResult};
use crate::policy::{BypassPolicy, BypassReason, GuardSet};
use crate::utils::{config_patch_from_attributes, has_auto_start_marker};

/// 页面可见性API的兼容名称（按优先级）
const VISIBILITY_APIS: [&str; 4] = ["hidden", "mozHidden", "msHidden", "webkitHidden"];

/// 引擎状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngineState {
    Stopped,
    Running,
    Suspended,
}

/// `start()` 的返回结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StartOutcome {
    fn started() -> Self {
        Self { success: true, reason: None }
    }

    fn already_running() -> Self {
        Self { success: false, reason: Some("running".to_string()) }
    }

    fn bypassed(reason: BypassReason) -> Self {
        Self { success: false, reason: Some(reason.as_str().to_string()) }
    }
}

/// 待在锁外触发的通知
enum Notification {
    Open(DetectorKind),
    Close,
}

/// 锁内收集、锁外执行的回调批次
struct PendingCallbacks {
    events: Vec<Notification>,
    on_open: Option<OpenCallback>,
    on_close: Option<CloseCallback>,
    action: DefaultAction,
}

impl PendingCallbacks {
    fn fire(self) {
        for event in self.events {
            match event {
                Notification::Open(kind) => match &self.on_open {
                    Some(callback) => callback(kind, &self.action),
                    None => self.action.run(),
                },
                Notification::Close => {
                    if let Some(callback) = &self.on_close {
                        callback();
                    }
                }
            }
        }
    }
}

/// 引擎内部状态
#[derive(Default)]
struct Core {
    running: bool,
    suspended: bool,
    config: Config,
    probe: EnvProbe,
    policy: BypassPolicy,
    detectors: Vec<Box<dyn Detector>>,
    open_state: OpenStateMap,
    last_open: bool,
    tick_counter: u64,
    tick_task: Option<JoinHandle<()>>,
    idle_task: Option<JoinHandle<()>>,
    resize_task: Option<JoinHandle<()>>,
    visibility_warned: bool,
}

impl Core {
    fn abort_tick_loop(&mut self) {
        if let Some(task) = self.tick_task.take() {
            task.abort();
        }
    }

    fn abort_idle_timer(&mut self) {
        if let Some(task) = self.idle_task.take() {
            task.abort();
        }
    }

    fn abort_all(&mut self) {
        self.abort_tick_loop();
        self.abort_idle_timer();
        if let Some(task) = self.resize_task.take() {
            task.abort();
        }
    }

    /// 处理检测器上报的打开/关闭
    fn apply_reports(&mut self, opened: Vec<DetectorKind>, closed: Vec<DetectorKind>, events: &mut Vec<Notification>) {
        for kind in closed {
            self.open_state.mark_closed(kind);
        }
        // 同一周期内同一检测器只触发一次
        let mut seen = Vec::with_capacity(opened.len());
        for kind in opened {
            if seen.contains(&kind) {
                continue;
            }
            seen.push(kind);

            warn!("You don't have permission to use DEVTOOL!【type = {}】", kind);
            if self.config.options.clear_interval_when_dev_open_trigger {
                debug!("检测到开发者工具后停止轮询");
                self.abort_tick_loop();
            }
            self.abort_idle_timer();
            self.open_state.mark_open(kind);
            events.push(Notification::Open(kind));
        }
    }

    /// 重新计算整体状态，打开 → 关闭时追加关闭通知
    fn settle_aggregate(&mut self, events: &mut Vec<Notification>) {
        let now_open = self.open_state.any_open();
        if self.last_open && !now_open {
            debug!("开发者工具已关闭");
            events.push(Notification::Close);
        }
        self.last_open = now_open;
    }

    /// 以受保护方式对所有检测器执行同一操作
    fn sweep<F>(&mut self, platform: &dyn Platform, stage: &str, clear_first: bool, mut f: F) -> Vec<Notification>
    where
        F: FnMut(&mut dyn Detector, &mut DetectContext<'_>),
    {
        let mut events = Vec::new();
        let mut detectors = std::mem::take(&mut self.detectors);

        for detector in detectors.iter_mut() {
            let kind = detector.kind();
            if clear_first {
                self.open_state.clear(kind);
            }
            let (opened, closed) = {
                let mut ctx = DetectContext::new(platform, &self.probe, &self.config.options);
                let result = catch_unwind(AssertUnwindSafe(|| f(detector.as_mut(), &mut ctx)));
                if let Err(panic) = result {
                    warn!("检测器 {} 在 {} 阶段异常，本次结果忽略：{}", kind, stage, panic_message(panic.as_ref()));
                }
                ctx.take_reports()
            };
            self.apply_reports(opened, closed, &mut events);
        }

        self.detectors = detectors;
        events
    }

    fn pending(&self, events: Vec<Notification>, platform: &Arc<dyn Platform>) -> PendingCallbacks {
        PendingCallbacks {
            events,
            on_open: self.config.on_devtool_open.clone(),
            on_close: self.config.on_devtool_close.clone(),
            action: DefaultAction::new(platform.clone(), &self.config.options),
        }
    }
}

impl Drop for Core {
    fn drop(&mut self) {
        self.abort_all();
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "未知异常".to_string()
    }
}

struct Shared {
    core: Mutex<Core>,
    platform: Arc<dyn Platform>,
}

/// 开发者工具检测引擎
/// 克隆得到的是同一个引擎的句柄
#[derive(Clone)]
pub struct DevtoolGuard {
    shared: Arc<Shared>,
}

impl DevtoolGuard {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self {
            shared: Arc::new(Shared {
                core: Mutex::new(Core::default()),
                platform,
            }),
        }
    }

    fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    fn lock(&self) -> MutexGuard<'_, Core> {
        self.shared.core.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn platform(&self) -> &dyn Platform {
        self.shared.platform.as_ref()
    }

    /// 启动检测
    /// 已在运行或命中绕过策略时返回 `success = false` 且不产生任何副作用
    pub fn start(&self, config: Config) -> GuardResult<StartOutcome> {
        if self.lock().running {
            debug!("检测引擎已在运行，忽略重复启动");
            return Ok(StartOutcome::already_running());
        }

        // 忽略判定函数由调用方提供，必须在锁外执行
        let platform = self.platform();
        let probe = EnvProbe::detect(platform);
        let url = platform.location();
        let mut policy = BypassPolicy::new();
        if let Some(reason) = policy.evaluate(&config, &probe, &url)? {
            info!("命中绕过策略（{}），跳过检测：{}", reason, url);
            return Ok(StartOutcome::bypassed(reason));
        }

        let mut core = self.lock();
        if core.running {
            debug!("检测引擎已在运行，忽略重复启动");
            return Ok(StartOutcome::already_running());
        }

        let handle = Handle::try_current().map_err(|_| GuardError::RuntimeUnavailable)?;

        // 事件拦截：当前窗口，以及（可选）所有祖先框架
        let guards = GuardSet::from_options(&config.options, &probe);
        let top_level = if config.options.disable_iframe_parents { platform.frame_depth() } else { 0 };
        for level in 0..=top_level {
            platform.install_guards(level, &guards);
        }

        let registered = DetectorRegistry::build(&config.options.detectors, &probe);
        let period = config.options.interval_duration();
        let idle_after = config.options.stop_interval_duration();

        core.config = config;
        core.probe = probe;
        core.policy = policy;
        core.detectors = registered.active;
        core.open_state.reset();
        core.last_open = false;
        core.tick_counter = 0;
        core.running = true;
        core.suspended = false;

        let mut events = core.sweep(platform, "init", false, |detector, ctx| detector.init(ctx));
        core.settle_aggregate(&mut events);

        core.tick_task = Some(self.spawn_tick_loop(&handle, period));
        core.idle_task = idle_after.map(|delay| self.spawn_idle_timer(&handle, delay));

        info!(
            "检测引擎已启动，轮询间隔：{:?}，检测器：{:?}",
            period,
            core.detectors.iter().map(|d| d.kind()).collect::<Vec<_>>()
        );

        let pending = core.pending(events, &self.shared.platform);
        drop(core);
        pending.fire();

        Ok(StartOutcome::started())
    }

    /// 声明式启动：属性中带有自动启动标记时，按属性生成配置并启动
    pub fn auto_start<I, K, V>(&self, attributes: I) -> GuardResult<Option<StartOutcome>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let attributes: Vec<(String, String)> = attributes
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();
        if !has_auto_start_marker(attributes.iter().map(|(k, _)| k.as_str())) {
            return Ok(None);
        }

        let patch = config_patch_from_attributes(attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        let mut config = Config::default();
        config.merge(&patch);
        self.start(config).map(Some)
    }

    /// 停止检测：清除所有定时器并销毁检测器
    pub fn stop(&self) {
        let mut core = self.lock();
        if !core.running {
            return;
        }
        core.abort_all();
        core.running = false;
        core.suspended = false;
        core.detectors.clear();
        core.open_state.reset();
        core.last_open = false;
        info!("检测引擎已停止");
    }

    /// 执行一个检测周期（定时器触发，也可由宿主手动调用）
    pub fn tick(&self) {
        // 单页应用中URL可能变化，每周期复查忽略规则（结果按URL缓存），判定函数在锁外执行
        let url = self.platform().location();
        let uncached_rule = {
            let core = self.lock();
            if !core.running || core.suspended {
                return;
            }
            match core.policy.cached_ignore(&url) {
                Some(true) => return,
                Some(false) => None,
                None => core.config.ignore.clone(),
            }
        };
        let verdict = uncached_rule.map(|rule| rule.matches(&url));

        let mut core = self.lock();
        if !core.running || core.suspended {
            return;
        }
        match verdict {
            Some(Ok(ignored)) => {
                core.policy.remember_ignore(&url, ignored);
                if ignored {
                    return;
                }
            }
            Some(Err(e)) => warn!("忽略规则判定失败，按未忽略处理：{}", e),
            None => {}
        }

        let tick = core.tick_counter;
        core.tick_counter += 1;

        let mut events = core.sweep(self.platform(), "detect", true, |detector, ctx| detector.detect(tick, ctx));
        core.settle_aggregate(&mut events);

        let pending = core.pending(events, &self.shared.platform);
        drop(core);
        pending.fire();
    }

    /// 宿主上报窗口尺寸变化，去抖后交给检测器处理
    pub fn notify_resize(&self) {
        let mut core = self.lock();
        if !core.running {
            return;
        }

        let Ok(handle) = Handle::try_current() else {
            drop(core);
            self.handle_resize();
            return;
        };

        if let Some(previous) = core.resize_task.take() {
            previous.abort();
        }
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        core.resize_task = Some(handle.spawn(async move {
            tokio::time::sleep(RESIZE_DEBOUNCE).await;
            if let Some(shared) = weak.upgrade() {
                DevtoolGuard::from_shared(shared).handle_resize();
            }
        }));
    }

    fn handle_resize(&self) {
        let mut core = self.lock();
        core.resize_task = None;
        if !core.running || core.suspended {
            return;
        }

        let mut events = core.sweep(self.platform(), "resize", false, |detector, ctx| detector.on_resize(ctx));
        core.settle_aggregate(&mut events);

        let pending = core.pending(events, &self.shared.platform);
        drop(core);
        pending.fire();
    }

    /// 挂起检测（幂等），定时器继续运行但周期内不做任何事
    pub fn suspend(&self) {
        let mut core = self.lock();
        if !core.suspended {
            debug!("检测已挂起");
            core.suspended = true;
        }
    }

    /// 恢复检测（幂等），不会重新初始化检测器
    pub fn resume(&self) {
        let mut core = self.lock();
        if core.suspended {
            debug!("检测已恢复");
            core.suspended = false;
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.lock().suspended
    }

    /// 宿主上报页面可见性变化，按兼容API依次读取隐藏状态
    pub fn notify_visibility_change(&self) {
        let hidden = VISIBILITY_APIS
            .iter()
            .find_map(|api| self.platform().visibility_flag(api));

        match hidden {
            Some(true) => self.suspend(),
            Some(false) => self.resume(),
            None => {
                let mut core = self.lock();
                if !core.visibility_warned {
                    warn!("宿主不支持页面可见性API，无法根据可见性挂起检测");
                    core.visibility_warned = true;
                }
            }
        }
    }

    /// 在阻塞式对话框（alert/confirm/prompt）期间挂起检测，结束后还原挂起状态
    pub fn intercept_dialog<R>(&self, dialog: impl FnOnce() -> R) -> R {
        let was_suspended = self.is_suspended();
        self.suspend();
        let result = dialog();
        if !was_suspended {
            self.resume();
        }
        result
    }

    pub fn state(&self) -> EngineState {
        let core = self.lock();
        match (core.running, core.suspended) {
            (false, _) => EngineState::Stopped,
            (true, false) => EngineState::Running,
            (true, true) => EngineState::Suspended,
        }
    }

    /// 轮询定时器是否仍在运行（无活动自停或检测后停止时为 false）
    pub fn is_polling(&self) -> bool {
        self.lock().tick_task.is_some()
    }

    /// 任一检测器认为开发者工具处于打开状态
    pub fn is_devtool_opened(&self) -> bool {
        self.lock().open_state.any_open()
    }

    pub fn open_state(&self) -> BTreeMap<DetectorKind, bool> {
        self.lock().open_state.snapshot()
    }

    pub fn active_detectors(&self) -> Vec<DetectorKind> {
        self.lock().detectors.iter().map(|d| d.kind()).collect()
    }

    /// 已执行的检测周期数
    pub fn tick_count(&self) -> u64 {
        self.lock().tick_counter
    }

    pub fn env_probe(&self) -> EnvProbe {
        self.lock().probe.clone()
    }

    fn spawn_tick_loop(&self, handle: &Handle, period: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.shared);
        handle.spawn(async move {
            // 首次触发在一个周期之后
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(shared) = weak.upgrade() else {
                    break;
                };
                DevtoolGuard::from_shared(shared).tick();
            }
        })
    }

    fn spawn_idle_timer(&self, handle: &Handle, delay: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.shared);
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let guard = DevtoolGuard::from_shared(shared);
            let debug_lib = debug_library_in_use(guard.platform());
            let mut core = guard.lock();
            core.idle_task = None;
            if core.running && core.probe.is_pc && !debug_lib {
                core.abort_tick_loop();
                info!("{:?} 内无检测结果，停止轮询，仅保留事件驱动的检测", delay);
            }
        })
    }
}
