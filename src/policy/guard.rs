//! 页面事件拦截
//! 右键菜单、选择、复制、剪切、粘贴按配置拦截；打开开发者工具的快捷键始终拦截

use serde::Serialize;

use crate::config::Options;
use crate::env::EnvProbe;

const KEY_F12: u32 = 123;
const KEY_C: u32 = 67;
const KEY_I: u32 = 73;
const KEY_J: u32 = 74;
const KEY_U: u32 = 85;

/// 按键组合（keyCode + 修饰键）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyChord {
    pub key_code: u32,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyChord {
    pub fn new(key_code: u32) -> Self {
        Self { key_code, ..Default::default() }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// 是否为打开开发者工具/查看源码的快捷键
    pub fn is_devtool_shortcut(&self, is_macos: bool) -> bool {
        if self.key_code == KEY_F12 {
            return true;
        }
        if is_macos {
            (self.meta && self.alt && matches!(self.key_code, KEY_I | KEY_J | KEY_C))
                || (self.meta && self.shift && self.key_code == KEY_C)
                || (self.meta && self.key_code == KEY_U)
        } else {
            (self.ctrl && self.shift && matches!(self.key_code, KEY_I | KEY_J | KEY_C))
                || (self.ctrl && self.key_code == KEY_U)
        }
    }
}

/// 宿主上报的页面事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomEvent {
    ContextMenu,
    SelectStart,
    Copy,
    Cut,
    Paste,
    KeyDown(KeyChord),
}

/// 事件拦截集合，宿主在事件监听中调用 `blocks` 决定是否阻止默认行为
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GuardSet {
    pub menu: bool,
    pub select: bool,
    pub copy: bool,
    pub cut: bool,
    pub paste: bool,
    pub is_macos: bool,
}

impl GuardSet {
    pub fn from_options(options: &Options, probe: &EnvProbe) -> Self {
        Self {
            menu: options.disable_menu,
            select: options.disable_select,
            copy: options.disable_copy,
            cut: options.disable_cut,
            paste: options.disable_paste,
            is_macos: probe.is_macos,
        }
    }

    pub fn blocks(&self, event: &DomEvent) -> bool {
        match event {
            DomEvent::ContextMenu => self.menu,
            DomEvent::SelectStart => self.select,
            DomEvent::Copy => self.copy,
            DomEvent::Cut => self.cut,
            DomEvent::Paste => self.paste,
            DomEvent::KeyDown(chord) => chord.is_devtool_shortcut(self.is_macos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_block_menu_only() {
        let guards = GuardSet::from_options(&Options::default(), &EnvProbe::default());
        assert!(guards.blocks(&DomEvent::ContextMenu));
        assert!(!guards.blocks(&DomEvent::Copy));
        assert!(!guards.blocks(&DomEvent::Paste));
        assert!(!guards.blocks(&DomEvent::SelectStart));
    }

    #[test]
    fn test_windows_shortcuts() {
        let guards = GuardSet::default();
        assert!(guards.blocks(&DomEvent::KeyDown(KeyChord::new(KEY_F12))));
        assert!(guards.blocks(&DomEvent::KeyDown(KeyChord::new(KEY_I).ctrl().shift())));
        assert!(guards.blocks(&DomEvent::KeyDown(KeyChord::new(KEY_U).ctrl())));
        assert!(!guards.blocks(&DomEvent::KeyDown(KeyChord::new(KEY_I).ctrl())));
        assert!(!guards.blocks(&DomEvent::KeyDown(KeyChord::new(KEY_I).meta().alt())));
    }

    #[test]
    fn test_macos_shortcuts() {
        let guards = GuardSet { is_macos: true, ..Default::default() };
        assert!(guards.blocks(&DomEvent::KeyDown(KeyChord::new(KEY_J).meta().alt())));
        assert!(guards.blocks(&DomEvent::KeyDown(KeyChord::new(KEY_C).meta().shift())));
        assert!(guards.blocks(&DomEvent::KeyDown(KeyChord::new(KEY_U).meta())));
        assert!(!guards.blocks(&DomEvent::KeyDown(KeyChord::new(KEY_I).ctrl().shift())));
    }
}
