//! 搜索引擎爬虫识别

use once_cell::sync::Lazy;
use regex::Regex;

/// 搜索引擎爬虫UA特征
static CRAWLER_UA_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(googlebot|baiduspider|bingbot|applebot|petalbot|yandexbot|bytespider|sogou|360spider|yisouspider|duckduckbot|slurp|chrome-lighthouse|moto g power)",
    )
    .expect("爬虫UA正则无效")
});

/// 判断UA是否属于已知搜索引擎爬虫
pub fn is_crawler(user_agent: &str) -> bool {
    CRAWLER_UA_REGEX.is_match(user_agent)
}
