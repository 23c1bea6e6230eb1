//! 全局配置管理，存储所有可配置项
//! 外部配置（JSON/声明式属性）合并时做类型校验：类型与默认值不一致的项直接忽略

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::detector::{DetectorKind, DetectorSelection};
use crate::engine::DefaultAction;
use crate::policy::IgnoreRule;

/// 检测到开发者工具打开时的回调：检测器类型 + 默认处理动作
pub type OpenCallback = Arc<dyn Fn(DetectorKind, &DefaultAction) + Send + Sync>;
/// 开发者工具关闭时的回调
pub type CloseCallback = Arc<dyn Fn() + Send + Sync>;

/// 不做类型校验、始终接受的配置键
const ALWAYS_ACCEPTED_KEYS: [&str; 3] = ["detectors", "ignore", "onDevToolClose"];

/// 可序列化的配置项（键名与声明式属性一致，camelCase）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    // 轮询间隔（毫秒）
    pub interval: u64,
    pub detectors: DetectorSelection,
    // 无活动自停时间（毫秒），0 表示不自停
    pub stop_interval_time: u64,
    pub clear_interval_when_dev_open_trigger: bool,
    pub disable_menu: bool,
    pub disable_select: bool,
    pub disable_copy: bool,
    pub disable_cut: bool,
    pub disable_paste: bool,
    pub clear_log: bool,
    pub disable_iframe_parents: bool,
    pub seo: bool,
    // 绕过令牌摘要
    pub md5: String,
    // 绕过令牌的URL参数名
    pub tk_name: String,
    // 检测到后跳转地址
    pub url: String,
    // 关闭页面失败后的兜底跳转地址
    pub time_out_url: String,
    // 检测到后替换页面内容的HTML
    #[serde(rename = "rewriteHTML")]
    pub rewrite_html: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: 500,
            detectors: DetectorSelection::All,
            stop_interval_time: 5000,
            clear_interval_when_dev_open_trigger: false,
            disable_menu: true,
            disable_select: false,
            disable_copy: false,
            disable_cut: false,
            disable_paste: false,
            clear_log: true,
            disable_iframe_parents: true,
            seo: true,
            md5: String::new(),
            tk_name: "ddtk".to_string(),
            url: String::new(),
            time_out_url: String::new(),
            rewrite_html: String::new(),
        }
    }
}

impl Options {
    /// 轮询周期，最小 1ms
    pub fn interval_duration(&self) -> Duration {
        Duration::from_millis(self.interval.max(1))
    }

    pub fn stop_interval_duration(&self) -> Option<Duration> {
        (self.stop_interval_time > 0).then(|| Duration::from_millis(self.stop_interval_time))
    }
}

/// 完整配置：可序列化项 + 回调 + 忽略规则
#[derive(Clone, Default)]
pub struct Config {
    pub options: Options,
    pub ignore: Option<IgnoreRule>,
    pub on_devtool_open: Option<OpenCallback>,
    pub on_devtool_close: Option<CloseCallback>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("options", &self.options)
            .field("ignore", &self.ignore)
            .field("on_devtool_open", &self.on_devtool_open.is_some())
            .field("on_devtool_close", &self.on_devtool_close.is_some())
            .finish()
    }
}

impl Config {
    /// 自定义配置
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// 合并外部配置补丁，返回实际生效的键数量
    /// 规则：值的JSON类型与默认值一致才覆盖；白名单键按各自格式解析
    pub fn merge(&mut self, patch: &Map<String, Value>) -> usize {
        let defaults = match serde_json::to_value(Options::default()) {
            Ok(Value::Object(map)) => map,
            _ => return 0,
        };
        let mut applied = 0;

        for (key, value) in patch {
            match key.as_str() {
                "ignore" => match IgnoreRule::from_json(value) {
                    Ok(rule) => {
                        self.ignore = rule;
                        applied += 1;
                    }
                    Err(e) => debug!("ignore 配置无法解析，已忽略：{}", e),
                },
                "onDevToolClose" | "onDevToolOpen" | "ondevtoolopen" | "ondevtoolclose" => {
                    debug!("回调配置 {} 只能通过构建器设置，JSON取值已忽略", key);
                }
                _ => {
                    let Some(default) = defaults.get(key) else {
                        debug!("未知配置项 {}，已忽略", key);
                        continue;
                    };
                    if !ALWAYS_ACCEPTED_KEYS.contains(&key.as_str()) && !same_json_type(default, value) {
                        debug!("配置项 {} 类型不匹配（默认值：{}，传入：{}），已忽略", key, default, value);
                        continue;
                    }
                    if self.apply_option(key, value) {
                        applied += 1;
                    }
                }
            }
        }

        applied
    }

    /// 从JSON对象合并（非对象输入直接忽略）
    pub fn merge_json(&mut self, patch: &Value) -> usize {
        match patch {
            Value::Object(map) => self.merge(map),
            other => {
                debug!("配置补丁不是JSON对象，已忽略：{}", other);
                0
            }
        }
    }

    /// 写入单个选项，反序列化失败（如负数间隔、未知检测器编号）时保持原值
    fn apply_option(&mut self, key: &str, value: &Value) -> bool {
        let Ok(Value::Object(mut current)) = serde_json::to_value(&self.options) else {
            return false;
        };
        current.insert(key.to_string(), value.clone());
        match serde_json::from_value::<Options>(Value::Object(current)) {
            Ok(options) => {
                self.options = options;
                true
            }
            Err(e) => {
                debug!("配置项 {} 取值非法，已忽略：{}", key, e);
                false
            }
        }
    }
}

/// 判断两个JSON值是否同一类型（数字不区分整数/浮点，由反序列化再校验）
fn same_json_type(a: &Value, b: &Value) -> bool {
    matches!(
        (a, b),
        (Value::Null, Value::Null)
            | (Value::Bool(_), Value::Bool(_))
            | (Value::Number(_), Value::Number(_))
            | (Value::String(_), Value::String(_))
            | (Value::Array(_), Value::Array(_))
            | (Value::Object(_), Value::Object(_))
    )
}

/// 配置构建器（链式 API）
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interval(mut self, millis: u64) -> Self {
        self.config.options.interval = millis;
        self
    }

    pub fn detectors(mut self, detectors: DetectorSelection) -> Self {
        self.config.options.detectors = detectors;
        self
    }

    pub fn only_detectors(self, kinds: impl IntoIterator<Item = DetectorKind>) -> Self {
        self.detectors(DetectorSelection::Only(kinds.into_iter().collect()))
    }

    pub fn stop_interval_time(mut self, millis: u64) -> Self {
        self.config.options.stop_interval_time = millis;
        self
    }

    pub fn clear_interval_when_dev_open_trigger(mut self, clear: bool) -> Self {
        self.config.options.clear_interval_when_dev_open_trigger = clear;
        self
    }

    pub fn disable_menu(mut self, disable: bool) -> Self {
        self.config.options.disable_menu = disable;
        self
    }

    pub fn disable_select(mut self, disable: bool) -> Self {
        self.config.options.disable_select = disable;
        self
    }

    pub fn disable_copy(mut self, disable: bool) -> Self {
        self.config.options.disable_copy = disable;
        self
    }

    pub fn disable_cut(mut self, disable: bool) -> Self {
        self.config.options.disable_cut = disable;
        self
    }

    pub fn disable_paste(mut self, disable: bool) -> Self {
        self.config.options.disable_paste = disable;
        self
    }

    pub fn clear_log(mut self, clear: bool) -> Self {
        self.config.options.clear_log = clear;
        self
    }

    pub fn disable_iframe_parents(mut self, disable: bool) -> Self {
        self.config.options.disable_iframe_parents = disable;
        self
    }

    pub fn seo(mut self, seo: bool) -> Self {
        self.config.options.seo = seo;
        self
    }

    /// 绕过令牌：摘要与URL参数名
    pub fn token(mut self, md5: impl Into<String>, tk_name: impl Into<String>) -> Self {
        self.config.options.md5 = md5.into();
        self.config.options.tk_name = tk_name.into();
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.options.url = url.into();
        self
    }

    pub fn time_out_url(mut self, url: impl Into<String>) -> Self {
        self.config.options.time_out_url = url.into();
        self
    }

    pub fn rewrite_html(mut self, html: impl Into<String>) -> Self {
        self.config.options.rewrite_html = html.into();
        self
    }

    pub fn ignore(mut self, rule: IgnoreRule) -> Self {
        self.config.ignore = Some(rule);
        self
    }

    pub fn on_devtool_open(mut self, callback: impl Fn(DetectorKind, &DefaultAction) + Send + Sync + 'static) -> Self {
        self.config.on_devtool_open = Some(Arc::new(callback));
        self
    }

    pub fn on_devtool_close(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.config.on_devtool_close = Some(Arc::new(callback));
        self
    }

    /// 合并外部JSON补丁
    pub fn patch(mut self, patch: &Value) -> Self {
        self.config.merge_json(patch);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
