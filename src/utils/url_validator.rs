//! URL 验证模块
//!
//! 验证目标 URL 安全性，阻止危险协议

use url::Url;

/// 目标 URL 最大长度
const MAX_URL_LENGTH: usize = 2048;

/// 危险协议列表
const DANGEROUS_PROTOCOLS: &[&str] = &[
    "javascript:",
    "data:",
    "file:",
    "vbscript:",
    "about:",
    "blob:",
];

/// 验证目标 URL
///
/// 检查项目：
/// 1. URL 不为空、不超长
/// 2. 不是危险协议（javascript:, data:, file: 等）
/// 3. 必须是 http:// 或 https://
/// 4. URL 格式有效
pub fn validate_url(url: &str) -> Result<(), String> {
    let url = url.trim();

    if url.is_empty() {
        return Err("URL cannot be empty".to_string());
    }

    if url.len() > MAX_URL_LENGTH {
        return Err(format!("URL cannot exceed {} characters", MAX_URL_LENGTH));
    }

    let url_lower = url.to_lowercase();

    for proto in DANGEROUS_PROTOCOLS {
        if url_lower.starts_with(proto) {
            return Err(format!("Dangerous protocol blocked: {}", proto));
        }
    }

    if !url_lower.starts_with("http://") && !url_lower.starts_with("https://") {
        return Err("Only http:// and https:// URLs are allowed".to_string());
    }

    Url::parse(url).map_err(|e| format!("Invalid URL format: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://example.com/path?q=1").is_ok());
        assert!(validate_url("  https://example.com  ").is_ok());
    }

    #[test]
    fn test_rejects_dangerous_protocols() {
        assert!(validate_url("javascript:alert(1)").is_err());
        assert!(validate_url("data:text/html,<h1>x</h1>").is_err());
        assert!(validate_url("file:///etc/passwd").is_err());
    }

    #[test]
    fn test_rejects_other_schemes_and_garbage() {
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("").is_err());
        assert!(validate_url("not a url").is_err());
    }

    #[test]
    fn test_rejects_oversized_url() {
        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert!(validate_url(&long).is_err());
    }
}
