//! 策略模块：决定检测是否需要运行（令牌、忽略规则、爬虫豁免）以及页面事件拦截
pub mod guard;
pub mod ignore;
pub mod seo;
pub mod token;

use std::fmt;

use serde::Serialize;
use tracing::debug;

// 导出核心接口
pub use self::guard::{DomEvent, GuardSet, KeyChord};
pub use self::ignore::{IgnorePattern, IgnorePredicate, IgnoreRule};
pub use self::token::{check_token, token_digest};

use crate::config::Config;
use crate::env::EnvProbe;
use crate::error::GuardResult;

/// 跳过检测的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BypassReason {
    Token,
    Ignore,
    Seo,
}

impl BypassReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BypassReason::Token => "token",
            BypassReason::Ignore => "ignore",
            BypassReason::Seo => "seo",
        }
    }
}

impl fmt::Display for BypassReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 绕过策略（按URL缓存判定结果）
#[derive(Debug, Default)]
pub struct BypassPolicy {
    token_cache: Option<(String, bool)>,
    ignore_cache: Option<(String, bool)>,
}

impl BypassPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// 依次判定 令牌 → 忽略规则 → 爬虫，命中返回原因
    pub fn evaluate(&mut self, config: &Config, probe: &EnvProbe, url: &str) -> GuardResult<Option<BypassReason>> {
        if self.is_token_valid(config, url) {
            return Ok(Some(BypassReason::Token));
        }
        if self.is_ignored(config, url)? {
            return Ok(Some(BypassReason::Ignore));
        }
        if config.options.seo && probe.is_seo_bot {
            return Ok(Some(BypassReason::Seo));
        }
        Ok(None)
    }

    pub fn is_token_valid(&mut self, config: &Config, url: &str) -> bool {
        if let Some((cached_url, result)) = &self.token_cache {
            if cached_url == url {
                return *result;
            }
        }
        let result = check_token(url, &config.options.tk_name, &config.options.md5);
        debug!("令牌校验：url={}，结果={}", url, result);
        self.token_cache = Some((url.to_string(), result));
        result
    }

    /// 判定函数出错时不写入缓存，错误交给调用方
    pub fn is_ignored(&mut self, config: &Config, url: &str) -> GuardResult<bool> {
        let Some(rule) = &config.ignore else {
            return Ok(false);
        };
        if let Some(result) = self.cached_ignore(url) {
            return Ok(result);
        }
        let result = rule.matches(url)?;
        self.remember_ignore(url, result);
        Ok(result)
    }

    /// 读取忽略判定缓存（仅当URL一致时命中）
    pub fn cached_ignore(&self, url: &str) -> Option<bool> {
        self.ignore_cache
            .as_ref()
            .filter(|(cached_url, _)| cached_url == url)
            .map(|(_, result)| *result)
    }

    /// 写入忽略判定缓存，供在锁外执行判定的调用方回填
    pub fn remember_ignore(&mut self, url: &str, result: bool) {
        debug!("忽略规则判定：url={}，结果={}", url, result);
        self.ignore_cache = Some((url.to_string(), result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const BOT: &str = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

    #[test]
    fn test_token_bypass() {
        let config = Config::builder().token(token_digest("letmein"), "ddtk").build();
        let probe = EnvProbe::from_parts(CHROME, "Win32", 0, false);
        let mut policy = BypassPolicy::new();
        assert_eq!(
            policy.evaluate(&config, &probe, "https://a.com/?ddtk=letmein").unwrap(),
            Some(BypassReason::Token)
        );
        assert_eq!(policy.evaluate(&config, &probe, "https://a.com/").unwrap(), None);
    }

    #[test]
    fn test_ignore_bypass_is_cached_per_url() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let config = Config::builder()
            .ignore(IgnoreRule::predicate(move |url| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(url.contains("/safe"))
            }))
            .build();
        let mut policy = BypassPolicy::new();
        assert!(policy.is_ignored(&config, "https://a.com/safe").unwrap());
        assert!(policy.is_ignored(&config, "https://a.com/safe").unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!policy.is_ignored(&config, "https://a.com/other").unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_remembered_ignore_result() {
        let mut policy = BypassPolicy::new();
        assert_eq!(policy.cached_ignore("https://a.com/safe"), None);
        policy.remember_ignore("https://a.com/safe", true);
        assert_eq!(policy.cached_ignore("https://a.com/safe"), Some(true));
        assert_eq!(policy.cached_ignore("https://a.com/other"), None);
    }

    #[test]
    fn test_seo_bypass_respects_flag() {
        let probe = EnvProbe::from_parts(BOT, "", 0, false);
        let mut policy = BypassPolicy::new();
        let config = Config::default();
        assert_eq!(policy.evaluate(&config, &probe, "https://a.com/").unwrap(), Some(BypassReason::Seo));

        let config = Config::builder().seo(false).build();
        assert_eq!(policy.evaluate(&config, &probe, "https://a.com/").unwrap(), None);
    }

    #[test]
    fn test_reason_serializes_lowercase() {
        assert_eq!(serde_json::to_value(BypassReason::Ignore).unwrap(), serde_json::json!("ignore"));
    }
}
