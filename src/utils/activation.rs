//! 声明式启动
//! 标记元素上的 kebab-case 属性转换为 camelCase 配置补丁，属性值按字面量推断类型

use serde_json::{Map, Number, Value};

use crate::config::Options;

/// 标记元素上表示自动启动的属性名
pub const AUTO_START_ATTRIBUTE: &str = "disable-devtool-auto";

/// 不参与配置转换的属性
const SKIPPED_ATTRIBUTES: [&str; 3] = [AUTO_START_ATTRIBUTE, "src", "type"];

/// 属性集合中是否带有自动启动标记
pub fn has_auto_start_marker<'a>(attribute_names: impl IntoIterator<Item = &'a str>) -> bool {
    attribute_names
        .into_iter()
        .any(|name| name.eq_ignore_ascii_case(AUTO_START_ATTRIBUTE))
}

/// 将属性列表转换为配置补丁
pub fn config_patch_from_attributes<I, K, V>(attributes: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let known_keys = known_config_keys();
    let mut patch = Map::new();

    for (name, value) in attributes {
        let name = name.as_ref().trim();
        if name.is_empty() || SKIPPED_ATTRIBUTES.iter().any(|s| s.eq_ignore_ascii_case(name)) {
            continue;
        }
        let camel = kebab_to_camel(name);
        // 与已知配置键做大小写无关的对齐（如 rewrite-html → rewriteHTML）
        let key = known_keys
            .iter()
            .find(|k| k.eq_ignore_ascii_case(&camel))
            .cloned()
            .unwrap_or(camel);
        patch.insert(key, parse_attribute_value(value.as_ref()));
    }

    patch
}

/// `tk-name` → `tkName`
pub fn kebab_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// 属性值类型推断：空串/true → true，false → false，整数 → 数字，其余保持字符串
pub fn parse_attribute_value(raw: &str) -> Value {
    let value = raw.trim();
    match value {
        "" | "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => value
            .parse::<u64>()
            .map(|n| Value::Number(Number::from(n)))
            .or_else(|_| value.parse::<i64>().map(|n| Value::Number(Number::from(n))))
            .unwrap_or_else(|_| Value::String(value.to_string())),
    }
}

fn known_config_keys() -> Vec<String> {
    let mut keys: Vec<String> = match serde_json::to_value(Options::default()) {
        Ok(Value::Object(map)) => map.keys().cloned().collect(),
        _ => Vec::new(),
    };
    keys.push("ignore".to_string());
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::detector::{DetectorKind, DetectorSelection};
    use serde_json::json;

    #[test]
    fn test_kebab_to_camel() {
        assert_eq!(kebab_to_camel("tk-name"), "tkName");
        assert_eq!(kebab_to_camel("clear-interval-when-dev-open-trigger"), "clearIntervalWhenDevOpenTrigger");
        assert_eq!(kebab_to_camel("md5"), "md5");
    }

    #[test]
    fn test_value_inference() {
        assert_eq!(parse_attribute_value(""), json!(true));
        assert_eq!(parse_attribute_value("false"), json!(false));
        assert_eq!(parse_attribute_value("300"), json!(300));
        assert_eq!(parse_attribute_value("1,3"), json!("1,3"));
    }

    #[test]
    fn test_patch_from_attributes() {
        let patch = config_patch_from_attributes([
            ("disable-devtool-auto", ""),
            ("src", "disable-devtool.js"),
            ("interval", "200"),
            ("disable-copy", ""),
            ("rewrite-html", "<p>no</p>"),
            ("detectors", "1,3"),
        ]);
        assert!(!patch.contains_key("src"));
        assert!(!patch.contains_key("disableDevtoolAuto"));
        assert_eq!(patch["interval"], json!(200));
        assert_eq!(patch["disableCopy"], json!(true));
        assert_eq!(patch["rewriteHTML"], json!("<p>no</p>"));

        let mut config = Config::default();
        config.merge(&patch);
        assert_eq!(config.options.interval, 200);
        assert!(config.options.disable_copy);
        assert_eq!(
            config.options.detectors,
            DetectorSelection::Only(vec![DetectorKind::PropertyTrap, DetectorKind::DateStringify])
        );
    }

    #[test]
    fn test_marker_detection() {
        assert!(has_auto_start_marker(["src", "disable-devtool-auto"]));
        assert!(!has_auto_start_marker(["src", "type"]));
    }
}
