//! 工具模块：URL参数读取、声明式启动属性转换
pub mod activation;
pub mod url_param;

// 导出核心接口
pub use self::activation::{config_patch_from_attributes, has_auto_start_marker, kebab_to_camel};
pub use self::url_param::UrlParam;
