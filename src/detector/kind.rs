//! 检测器类型枚举与启用列表
//! 类型编号会出现在配置与开启状态表中，数值必须保持稳定

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GuardError, GuardResult};

/// 检测器类型（编号稳定，禁止调整顺序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub enum DetectorKind {
    RegexStringify = 0,
    PropertyTrap = 1,
    WindowSizeSkew = 2,
    DateStringify = 3,
    FunctionStringify = 4,
    DebuggerStatement = 5,
    PerformanceTiming = 6,
    ExternalDebugLibrary = 7,
}

impl DetectorKind {
    /// 全部检测器类型（按编号升序）
    pub const ALL: [DetectorKind; 8] = [
        DetectorKind::RegexStringify,
        DetectorKind::PropertyTrap,
        DetectorKind::WindowSizeSkew,
        DetectorKind::DateStringify,
        DetectorKind::FunctionStringify,
        DetectorKind::DebuggerStatement,
        DetectorKind::PerformanceTiming,
        DetectorKind::ExternalDebugLibrary,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: i64) -> GuardResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| i64::from(kind.id()) == id)
            .ok_or(GuardError::UnknownDetector(id))
    }

    pub fn name(self) -> &'static str {
        match self {
            DetectorKind::RegexStringify => "RegexStringify",
            DetectorKind::PropertyTrap => "PropertyTrap",
            DetectorKind::WindowSizeSkew => "WindowSizeSkew",
            DetectorKind::DateStringify => "DateStringify",
            DetectorKind::FunctionStringify => "FunctionStringify",
            DetectorKind::DebuggerStatement => "DebuggerStatement",
            DetectorKind::PerformanceTiming => "PerformanceTiming",
            DetectorKind::ExternalDebugLibrary => "ExternalDebugLibrary",
        }
    }
}

impl TryFrom<i64> for DetectorKind {
    type Error = GuardError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        Self::from_id(id)
    }
}

impl From<DetectorKind> for u8 {
    fn from(kind: DetectorKind) -> Self {
        kind.id()
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.id())
    }
}

/// 启用的检测器列表：`"all"` 或编号数组
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum DetectorSelection {
    #[default]
    All,
    Only(Vec<DetectorKind>),
}

impl DetectorSelection {
    /// 展开为去重后的检测器类型列表（保持首次出现顺序）
    pub fn kinds(&self) -> Vec<DetectorKind> {
        match self {
            DetectorSelection::All => DetectorKind::ALL.to_vec(),
            DetectorSelection::Only(kinds) => {
                let mut unique = Vec::with_capacity(kinds.len());
                for kind in kinds {
                    if !unique.contains(kind) {
                        unique.push(*kind);
                    }
                }
                unique
            }
        }
    }
}

impl TryFrom<Value> for DetectorSelection {
    type Error = GuardError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) if s.trim().eq_ignore_ascii_case("all") => Ok(DetectorSelection::All),
            // 声明式配置中常见的 "1,3,5" 写法
            Value::String(s) => {
                let kinds = s
                    .split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(|part| {
                        part.parse::<i64>()
                            .map_err(|_| GuardError::InvalidConfig(format!("detectors 项无法解析为编号：{}", part)))
                            .and_then(DetectorKind::from_id)
                    })
                    .collect::<GuardResult<Vec<_>>>()?;
                Ok(DetectorSelection::Only(kinds))
            }
            Value::Number(n) => {
                let id = n.as_i64().ok_or_else(|| GuardError::InvalidConfig(format!("detectors 编号非整数：{}", n)))?;
                Ok(DetectorSelection::Only(vec![DetectorKind::from_id(id)?]))
            }
            Value::Array(items) => {
                let kinds = items
                    .iter()
                    .map(|item| {
                        item.as_i64()
                            .ok_or_else(|| GuardError::InvalidConfig(format!("detectors 项非整数：{}", item)))
                            .and_then(DetectorKind::from_id)
                    })
                    .collect::<GuardResult<Vec<_>>>()?;
                Ok(DetectorSelection::Only(kinds))
            }
            other => Err(GuardError::InvalidConfig(format!("detectors 不支持的取值：{}", other))),
        }
    }
}

impl From<DetectorSelection> for Value {
    fn from(selection: DetectorSelection) -> Self {
        match selection {
            DetectorSelection::All => Value::String("all".to_string()),
            DetectorSelection::Only(kinds) => Value::Array(kinds.into_iter().map(|k| Value::from(k.id())).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_ids_are_stable() {
        let ids: Vec<u8> = DetectorKind::ALL.iter().map(|k| k.id()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(DetectorKind::from_id(3).unwrap(), DetectorKind::DateStringify);
        assert!(matches!(DetectorKind::from_id(8), Err(GuardError::UnknownDetector(8))));
    }

    #[test]
    fn test_kind_serializes_as_integer() {
        assert_eq!(serde_json::to_value(DetectorKind::PerformanceTiming).unwrap(), json!(6));
        let kind: DetectorKind = serde_json::from_value(json!(2)).unwrap();
        assert_eq!(kind, DetectorKind::WindowSizeSkew);
    }

    #[test]
    fn test_selection_parsing() {
        assert_eq!(DetectorSelection::try_from(json!("all")).unwrap(), DetectorSelection::All);
        assert_eq!(
            DetectorSelection::try_from(json!([3, 1])).unwrap(),
            DetectorSelection::Only(vec![DetectorKind::DateStringify, DetectorKind::PropertyTrap])
        );
        assert_eq!(
            DetectorSelection::try_from(json!("0, 7")).unwrap(),
            DetectorSelection::Only(vec![DetectorKind::RegexStringify, DetectorKind::ExternalDebugLibrary])
        );
        assert!(DetectorSelection::try_from(json!([1, 42])).is_err());
        assert!(DetectorSelection::try_from(json!(true)).is_err());
    }

    #[test]
    fn test_selection_kinds_dedup() {
        let selection = DetectorSelection::Only(vec![
            DetectorKind::DateStringify,
            DetectorKind::DateStringify,
            DetectorKind::PropertyTrap,
        ]);
        assert_eq!(selection.kinds(), vec![DetectorKind::DateStringify, DetectorKind::PropertyTrap]);
        assert_eq!(DetectorSelection::All.kinds().len(), 8);
    }
}
