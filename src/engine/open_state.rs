//! 各检测器的开启状态表，整体状态为所有检测器的逻辑或

use std::collections::BTreeMap;

use crate::detector::DetectorKind;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenStateMap {
    states: BTreeMap<DetectorKind, bool>,
}

impl OpenStateMap {
    /// 检测前清除该检测器的状态
    pub fn clear(&mut self, kind: DetectorKind) {
        self.states.insert(kind, false);
    }

    pub fn mark_open(&mut self, kind: DetectorKind) {
        self.states.insert(kind, true);
    }

    pub fn mark_closed(&mut self, kind: DetectorKind) {
        self.states.insert(kind, false);
    }

    pub fn any_open(&self) -> bool {
        self.states.values().any(|open| *open)
    }

    pub fn snapshot(&self) -> BTreeMap<DetectorKind, bool> {
        self.states.clone()
    }

    pub fn reset(&mut self) {
        self.states.clear();
    }
}
