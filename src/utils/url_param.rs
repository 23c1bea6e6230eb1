//! URL参数读取工具
//! 依次查找 query 与 fragment（支持 `#k=v` 与 `#/path?k=v` 两种哈希路由写法），值自动URL解码

use url::{Url, form_urlencoded};

/// URL参数读取工具
pub struct UrlParam;

impl UrlParam {
    /// 读取参数值，未找到返回 None
    pub fn get(url: &str, name: &str) -> Option<String> {
        if name.is_empty() {
            return None;
        }

        let (query, fragment) = match Url::parse(url) {
            Ok(parsed) => (
                parsed.query().map(str::to_string),
                parsed.fragment().map(str::to_string),
            ),
            // 相对地址等无法解析的输入，手动拆分
            Err(_) => Self::split_raw(url),
        };

        query
            .as_deref()
            .and_then(|q| Self::find_pair(q, name))
            .or_else(|| {
                fragment.as_deref().and_then(|f| {
                    let hash_query = f.split_once('?').map(|(_, q)| q).unwrap_or(f);
                    Self::find_pair(hash_query, name)
                })
            })
    }

    /// 返回URL的 host 部分（无法解析时为空串）
    pub fn host(url: &str) -> String {
        Url::parse(url)
            .ok()
            .and_then(|u| {
                u.host_str().map(|h| match u.port() {
                    Some(port) => format!("{}:{}", h, port),
                    None => h.to_string(),
                })
            })
            .unwrap_or_default()
    }

    fn find_pair(query: &str, name: &str) -> Option<String> {
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    fn split_raw(url: &str) -> (Option<String>, Option<String>) {
        let (before_hash, fragment) = match url.split_once('#') {
            Some((head, frag)) => (head, Some(frag.to_string())),
            None => (url, None),
        };
        let query = before_hash.split_once('?').map(|(_, q)| q.to_string());
        (query, fragment)
    }
}
