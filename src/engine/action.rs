//! 检测到开发者工具后的默认处理动作
//! 优先级：跳转配置地址 → 替换页面内容 → 关闭页面（失败则延时跳转到拦截页）

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use url::form_urlencoded;

use crate::config::Options;
use crate::env::Platform;
use crate::utils::UrlParam;

/// 关闭页面失败后的通用拦截页
pub const BLOCKED_PAGE_URL: &str = "https://theajack.github.io/disable-devtool/404.html";

/// 关闭页面后等待兜底跳转的时间
pub const CLOSE_FALLBACK_DELAY: Duration = Duration::from_millis(500);

/// 默认处理动作，作为回调的第二个参数传给调用方
#[derive(Clone)]
pub struct DefaultAction {
    platform: Arc<dyn Platform>,
    url: String,
    rewrite_html: String,
    time_out_url: String,
}

impl fmt::Debug for DefaultAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultAction")
            .field("url", &self.url)
            .field("rewrite_html", &self.rewrite_html)
            .field("time_out_url", &self.time_out_url)
            .finish()
    }
}

impl DefaultAction {
    pub fn new(platform: Arc<dyn Platform>, options: &Options) -> Self {
        Self {
            platform,
            url: options.url.clone(),
            rewrite_html: options.rewrite_html.clone(),
            time_out_url: options.time_out_url.clone(),
        }
    }

    /// 执行默认动作
    pub fn run(&self) {
        if !self.url.is_empty() {
            debug!("默认动作：跳转到 {}", self.url);
            self.platform.navigate(&self.url);
        } else if !self.rewrite_html.is_empty() {
            debug!("默认动作：替换页面内容");
            self.platform.rewrite_body(&self.rewrite_html);
        } else {
            self.close_window();
        }
    }

    /// 兜底跳转地址：配置的 timeOutUrl，否则为带当前域名的通用拦截页
    pub fn fallback_url(&self) -> String {
        if !self.time_out_url.is_empty() {
            return self.time_out_url.clone();
        }
        let host = UrlParam::host(&self.platform.location());
        let encoded: String = form_urlencoded::byte_serialize(host.as_bytes()).collect();
        format!("{}?h={}", BLOCKED_PAGE_URL, encoded)
    }

    fn close_window(&self) {
        debug!("默认动作：关闭页面");
        self.platform.close_window();
        self.platform.history_back();

        let platform = self.platform.clone();
        let fallback = self.fallback_url();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(CLOSE_FALLBACK_DELAY).await;
                    platform.navigate(&fallback);
                });
            }
            // 无运行时无法延时，直接跳转
            Err(_) => platform.navigate(&fallback),
        }
    }
}
