//! 检测器公共约定
//! 每个检测器只负责自身启发式判断，通过 `DetectContext` 上报结果，由调度器统一处理

use crate::config::Options;
use crate::env::{ConsoleValue, Decoy, EnvProbe, Platform};

use super::kind::DetectorKind;

/// 检测器生命周期
pub trait Detector: Send {
    fn kind(&self) -> DetectorKind;

    /// 未启用的检测器不会注册到轮询中
    fn enabled(&self) -> bool;

    /// 一次性初始化（安装诱饵、首次检查等）
    fn init(&mut self, ctx: &mut DetectContext<'_>);

    /// 每个轮询周期调用一次
    fn detect(&mut self, tick: u64, ctx: &mut DetectContext<'_>);

    /// 窗口尺寸变化（去抖后）时调用
    fn on_resize(&mut self, _ctx: &mut DetectContext<'_>) {}
}

/// 检测上下文：宿主能力 + 结果收集
pub struct DetectContext<'a> {
    pub platform: &'a dyn Platform,
    pub probe: &'a EnvProbe,
    pub options: &'a Options,
    opened: Vec<DetectorKind>,
    closed: Vec<DetectorKind>,
}

impl<'a> DetectContext<'a> {
    pub fn new(platform: &'a dyn Platform, probe: &'a EnvProbe, options: &'a Options) -> Self {
        Self {
            platform,
            probe,
            options,
            opened: Vec::new(),
            closed: Vec::new(),
        }
    }

    /// 上报“开发者工具已打开”
    pub fn report_open(&mut self, kind: DetectorKind) {
        self.opened.push(kind);
    }

    /// 上报“开发者工具已关闭”（仅尺寸类检测器使用）
    pub fn report_closed(&mut self, kind: DetectorKind) {
        self.closed.push(kind);
    }

    /// 按配置清空控制台
    pub fn clear_console(&self) {
        if self.options.clear_log {
            self.platform.console_clear();
        }
    }

    /// 输出诱饵并返回本次被字符串化的次数
    pub fn render_decoy(&self, decoy: &Decoy) -> usize {
        decoy.take_hits();
        self.platform.console_log(ConsoleValue::Decoy(decoy));
        let hits = decoy.take_hits().len();
        self.clear_console();
        hits
    }

    pub(crate) fn take_reports(&mut self) -> (Vec<DetectorKind>, Vec<DetectorKind>) {
        (std::mem::take(&mut self.opened), std::mem::take(&mut self.closed))
    }
}
