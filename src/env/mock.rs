//! 测试用宿主平台：可控的控制台行为、时钟与窗口尺寸

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::Value;

use super::platform::{ConsoleValue, DecoyShape, Platform, WindowMetrics};
use crate::policy::GuardSet;

pub(crate) const DESKTOP_CHROME_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug)]
pub(crate) struct MockState {
    pub location: String,
    pub user_agent: String,
    pub platform_name: String,
    pub frame_depth: usize,
    pub metrics: Option<WindowMetrics>,
    pub visibility: HashMap<String, bool>,
    // 控制台每次输出诱饵时的字符串化次数
    pub stringify_per_log: usize,
    pub inspect_elements: bool,
    pub debugger_cost: Duration,
    pub table_cost: Duration,
    pub log_cost: Duration,
    pub clock_offset: Duration,
    pub globals: HashMap<String, Value>,
    pub selectors: HashSet<String>,
    // 控制台渲染过的诱饵外形
    pub rendered: Vec<DecoyShape>,
    pub guard_levels: Vec<usize>,
    pub navigations: Vec<String>,
    pub rewrites: Vec<String>,
    pub closes: usize,
    pub backs: usize,
    pub clears: usize,
    pub panic_on_log: bool,
}

pub(crate) struct MockPlatform {
    base: Instant,
    pub state: Mutex<MockState>,
}

impl MockPlatform {
    pub fn new(location: &str) -> Self {
        Self::with_user_agent(location, DESKTOP_CHROME_UA)
    }

    pub fn with_user_agent(location: &str, user_agent: &str) -> Self {
        Self {
            base: Instant::now(),
            state: Mutex::new(MockState {
                location: location.to_string(),
                user_agent: user_agent.to_string(),
                platform_name: "Win32".to_string(),
                frame_depth: 0,
                metrics: None,
                visibility: HashMap::new(),
                stringify_per_log: 0,
                inspect_elements: false,
                debugger_cost: Duration::ZERO,
                table_cost: Duration::ZERO,
                log_cost: Duration::ZERO,
                clock_offset: Duration::ZERO,
                globals: HashMap::new(),
                selectors: HashSet::new(),
                rendered: Vec::new(),
                guard_levels: Vec::new(),
                navigations: Vec::new(),
                rewrites: Vec::new(),
                closes: 0,
                backs: 0,
                clears: 0,
                panic_on_log: false,
            }),
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut MockState)) {
        let mut state = self.state.lock().unwrap();
        f(&mut state);
    }

    pub fn read<R>(&self, f: impl FnOnce(&MockState) -> R) -> R {
        let state = self.state.lock().unwrap();
        f(&state)
    }

    fn advance(&self, cost: Duration) {
        self.state.lock().unwrap().clock_offset += cost;
    }
}

impl Platform for MockPlatform {
    fn location(&self) -> String {
        self.read(|s| s.location.clone())
    }

    fn user_agent(&self) -> String {
        self.read(|s| s.user_agent.clone())
    }

    fn platform_name(&self) -> String {
        self.read(|s| s.platform_name.clone())
    }

    fn frame_depth(&self) -> usize {
        self.read(|s| s.frame_depth)
    }

    fn window_metrics(&self) -> Option<WindowMetrics> {
        self.read(|s| s.metrics)
    }

    fn visibility_flag(&self, api: &str) -> Option<bool> {
        self.read(|s| s.visibility.get(api).copied())
    }

    fn console_log(&self, value: ConsoleValue<'_>) {
        let (times, inspect, cost, panic_on_log) =
            self.read(|s| (s.stringify_per_log, s.inspect_elements, s.log_cost, s.panic_on_log));
        if panic_on_log {
            panic!("模拟控制台异常");
        }
        match value {
            ConsoleValue::Decoy(decoy) => {
                self.update(|s| s.rendered.push(decoy.shape()));
                for _ in 0..times {
                    decoy.stringify();
                }
            }
            ConsoleValue::Element(trap) => {
                if inspect {
                    trap.read_id();
                }
            }
            ConsoleValue::Payload(_) => self.advance(cost),
        }
    }

    fn console_table(&self, _value: &Value) {
        let cost = self.read(|s| s.table_cost);
        self.advance(cost);
    }

    fn console_clear(&self) {
        self.update(|s| s.clears += 1);
    }

    fn now(&self) -> Instant {
        self.base + self.read(|s| s.clock_offset)
    }

    fn debugger_pause(&self) {
        let cost = self.read(|s| s.debugger_cost);
        self.advance(cost);
    }

    fn global_value(&self, path: &str) -> Option<Value> {
        self.read(|s| s.globals.get(path).cloned())
    }

    fn query_selector(&self, selector: &str) -> bool {
        self.read(|s| s.selectors.contains(selector))
    }

    fn install_guards(&self, frame_level: usize, _guards: &GuardSet) {
        self.update(|s| s.guard_levels.push(frame_level));
    }

    fn navigate(&self, url: &str) {
        self.update(|s| s.navigations.push(url.to_string()));
    }

    fn rewrite_body(&self, html: &str) {
        self.update(|s| s.rewrites.push(html.to_string()));
    }

    fn close_window(&self) {
        self.update(|s| s.closes += 1);
    }

    fn history_back(&self) {
        self.update(|s| s.backs += 1);
    }
}
