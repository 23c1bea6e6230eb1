//! 页内调试面板检测（eruda / vConsole）
//! 面板处于展开状态等同于开发者工具打开

use serde_json::Value;

use crate::detector::base::{DetectContext, Detector};
use crate::detector::kind::DetectorKind;
use crate::env::{EnvProbe, Platform};

/// 已知的页内调试库
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugLibrary {
    Eruda,
    VConsole,
}

impl DebugLibrary {
    pub const ALL: [DebugLibrary; 2] = [DebugLibrary::Eruda, DebugLibrary::VConsole];

    /// 全局变量是否存在
    pub fn is_present(&self, platform: &dyn Platform) -> bool {
        match self {
            DebugLibrary::Eruda => platform.global_value("eruda").is_some(),
            DebugLibrary::VConsole => platform.global_value("_vcOrigConsole").is_some(),
        }
    }

    /// 调试面板是否处于展开状态
    pub fn is_visible(&self, platform: &dyn Platform) -> bool {
        match self {
            DebugLibrary::Eruda => platform.global_value("eruda._devTools._isShow") == Some(Value::Bool(true)),
            DebugLibrary::VConsole => self.is_present(platform) && platform.query_selector("#__vconsole.vc-toggle"),
        }
    }
}

/// 页面是否引入了任一调试库
pub fn debug_library_in_use(platform: &dyn Platform) -> bool {
    DebugLibrary::ALL.iter().any(|lib| lib.is_present(platform))
}

pub struct ExternalDebugLibraryDetector {
    enabled: bool,
}

impl ExternalDebugLibraryDetector {
    pub fn new(_probe: &EnvProbe) -> Self {
        Self { enabled: true }
    }
}

impl Detector for ExternalDebugLibraryDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::ExternalDebugLibrary
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn init(&mut self, _ctx: &mut DetectContext<'_>) {}

    fn detect(&mut self, _tick: u64, ctx: &mut DetectContext<'_>) {
        if DebugLibrary::ALL.iter().any(|lib| lib.is_visible(ctx.platform)) {
            ctx.report_open(self.kind());
        }
    }
}
