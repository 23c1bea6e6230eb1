//! 运行环境探测
//! 启动时根据 UA、平台信息与框架层级一次性计算，供各检测器决定自身是否启用

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::platform::Platform;
use crate::policy::seo::is_crawler;

/// 移动端UA特征
static MOBILE_UA_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(iphone|ipad|ipod|ios|android|mobile|harmonyos|windows phone)").expect("移动端UA正则无效")
});

/// 环境探测结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvProbe {
    pub is_pc: bool,
    pub is_mobile: bool,
    pub is_macos: bool,
    pub is_qq_browser: bool,
    pub is_firefox: bool,
    // 旧版（非Chromium内核）Edge
    pub is_edge: bool,
    pub is_ios_chrome: bool,
    pub is_ios_edge: bool,
    pub is_chrome: bool,
    pub is_seo_bot: bool,
    pub is_in_iframe: bool,
}

impl EnvProbe {
    /// 从宿主平台读取环境信息
    pub fn detect(platform: &dyn Platform) -> Self {
        Self::from_parts(
            &platform.user_agent(),
            &platform.platform_name(),
            platform.max_touch_points(),
            platform.frame_depth() > 0,
        )
    }

    /// 纯函数版本，便于离线判断（CLI 与测试使用）
    pub fn from_parts(user_agent: &str, platform_name: &str, max_touch_points: u32, in_iframe: bool) -> Self {
        let ua = user_agent.to_lowercase();
        let platform_name = platform_name.to_lowercase();

        let is_macos = platform_name.contains("mac") || ua.contains("macintosh");
        // iPadOS 13+ 伪装为 Mac，依靠触点数区分
        let is_ios = ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod") || (is_macos && max_touch_points > 1);
        let is_mobile = is_ios || MOBILE_UA_REGEX.is_match(&ua);
        let is_ios_chrome = ua.contains("crios");
        let is_ios_edge = ua.contains("edgios");
        // EdgeHTML 的UA同样带有 Chrome/ 标记；Chromium 内核 Edge 为 Edg/
        let is_edge = (ua.contains("edge/") && !ua.contains("edg/")) || ua.contains("trident") || ua.contains("msie");
        let is_chrome = ua.contains("chrome") || is_ios_chrome;

        Self {
            is_pc: !is_mobile,
            is_mobile,
            is_macos: is_macos && !is_ios,
            is_qq_browser: ua.contains("qqbrowser"),
            is_firefox: ua.contains("firefox") || ua.contains("fxios"),
            is_edge,
            is_ios_chrome,
            is_ios_edge,
            is_chrome,
            is_seo_bot: is_crawler(&ua),
            is_in_iframe: in_iframe,
        }
    }
}
