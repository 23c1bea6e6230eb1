//! URL忽略规则
//! 支持判定函数，或子串/正则（`/pattern/flags`）列表

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::error::{GuardError, GuardResult};

/// 忽略判定函数：返回 true 表示跳过检测，错误会透传给 `start()` 调用方
pub type IgnorePredicate = Arc<dyn Fn(&str) -> anyhow::Result<bool> + Send + Sync>;

/// 单条忽略模式
#[derive(Debug, Clone)]
pub enum IgnorePattern {
    Substring(String),
    Regex(Regex),
}

impl IgnorePattern {
    /// 解析模式串：`/.../` 包裹（可带 i 标志）视为正则，其余视为子串
    pub fn parse(pattern: &str) -> GuardResult<Self> {
        let trimmed = pattern.trim();
        if trimmed.len() >= 2 && trimmed.starts_with('/') {
            if let Some(end) = trimmed.rfind('/').filter(|end| *end > 0) {
                let body = &trimmed[1..end];
                let flags = &trimmed[end + 1..];
                if flags.chars().all(|c| matches!(c, 'i' | 'g' | 'm')) {
                    let source = if flags.contains('i') { format!("(?i){}", body) } else { body.to_string() };
                    return Ok(IgnorePattern::Regex(Regex::new(&source)?));
                }
            }
        }
        Ok(IgnorePattern::Substring(trimmed.to_string()))
    }

    pub fn is_match(&self, url: &str) -> bool {
        match self {
            IgnorePattern::Substring(s) => !s.is_empty() && url.contains(s.as_str()),
            IgnorePattern::Regex(re) => re.is_match(url),
        }
    }
}

/// 忽略规则
#[derive(Clone)]
pub enum IgnoreRule {
    Predicate(IgnorePredicate),
    Patterns(Vec<IgnorePattern>),
}

impl fmt::Debug for IgnoreRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreRule::Predicate(_) => f.write_str("IgnoreRule::Predicate(..)"),
            IgnoreRule::Patterns(patterns) => f.debug_tuple("IgnoreRule::Patterns").field(patterns).finish(),
        }
    }
}

impl IgnoreRule {
    pub fn predicate(f: impl Fn(&str) -> anyhow::Result<bool> + Send + Sync + 'static) -> Self {
        IgnoreRule::Predicate(Arc::new(f))
    }

    pub fn patterns<I, S>(patterns: I) -> GuardResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = patterns
            .into_iter()
            .map(|p| IgnorePattern::parse(p.as_ref()))
            .collect::<GuardResult<Vec<_>>>()?;
        Ok(IgnoreRule::Patterns(parsed))
    }

    /// 从JSON解析：null → 无规则；字符串（逗号分隔）或字符串数组 → 模式列表
    pub fn from_json(value: &Value) -> GuardResult<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => {
                let parts: Vec<&str> = s.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
                if parts.is_empty() {
                    return Ok(None);
                }
                Self::patterns(parts).map(Some)
            }
            Value::Array(items) => {
                let patterns = items
                    .iter()
                    .map(|item| {
                        item.as_str()
                            .ok_or_else(|| GuardError::InvalidConfig(format!("ignore 项必须为字符串：{}", item)))
                    })
                    .collect::<GuardResult<Vec<_>>>()?;
                Self::patterns(patterns).map(Some)
            }
            other => Err(GuardError::InvalidConfig(format!("ignore 不支持的取值：{}", other))),
        }
    }

    /// 判断URL是否命中
    pub fn matches(&self, url: &str) -> GuardResult<bool> {
        match self {
            IgnoreRule::Predicate(f) => f(url).map_err(GuardError::IgnorePredicate),
            IgnoreRule::Patterns(patterns) => Ok(patterns.iter().any(|p| p.is_match(url))),
        }
    }
}
