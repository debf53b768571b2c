pub mod url_validator;

/// 短链接 ID 的合法长度范围
pub const MIN_ID_LENGTH: usize = 3;
pub const MAX_ID_LENGTH: usize = 20;

pub fn generate_random_id(length: usize) -> String {
    use std::iter;

    // 随机选择字母和数字
    let chars = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    iter::repeat_with(|| chars[rand::random_range(0..chars.len())] as char)
        .take(length)
        .collect()
}

/// 校验短链接 ID 格式：3-20 位字母、数字、连字符或下划线
pub fn is_valid_short_id(id: &str) -> bool {
    if id.len() < MIN_ID_LENGTH || id.len() > MAX_ID_LENGTH {
        return false;
    }
    id.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
