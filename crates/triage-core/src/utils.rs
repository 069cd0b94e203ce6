//! 通用工具函数

/// 规范化患者名称：去除首尾空白，结果为空时返回 `None`
pub fn normalize_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
