//! 全局错误类型定义

use thiserror::Error;
use regex::Error as RegexError;

#[derive(Error, Debug)]
pub enum GuardError {
    // 运行环境相关错误
    #[error("未找到tokio运行时，无法启动轮询定时器")]
    RuntimeUnavailable,

    // 策略相关错误
    #[error("忽略规则判定函数执行失败：{0}")]
    IgnorePredicate(#[source] anyhow::Error),

    // 配置相关错误
    #[error("无效配置：{0}")]
    InvalidConfig(String),
    #[error("未知检测器编号：{0}")]
    UnknownDetector(i64),

    // 基础错误
    #[error("正则编译失败：{0}")]
    RegexError(#[from] RegexError),
}

// 全局Result类型
pub type GuardResult<T> = Result<T, GuardError>;
