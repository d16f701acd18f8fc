/// Path processing utility functions / 路径处理工具函数

/// Prefixes of ID, revision and namespace addressed paths / ID、版本、命名空间路径前缀
const ADDRESS_PREFIXES: [&str; 3] = ["id:", "rev:", "ns:"];

/// Convert a root-relative path to the form the API expects / 转换为API路径
/// 1. `id:`, `rev:` and `ns:` paths are sent verbatim / ID形式路径原样发送
/// 2. Replace backslashes with forward slashes / 将反斜杠替换为正斜杠
/// 3. `""` and `"/"` both mean the root, sent as `""` / 根目录统一为空串
/// 4. Ensure a leading `/`, drop trailing ones / 保证以 / 开头，去掉末尾 /
pub fn to_api_path(path: &str) -> String {
    if ADDRESS_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return path.to_string();
    }

    let path = path.replace('\\', "/");
    let trimmed = path.trim_end_matches('/');

    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Encode JSON for an HTTP header / 将JSON编码为HTTP头安全格式
///
/// Every char above 0x7E is written as `\uXXXX` (a surrogate pair beyond
/// the BMP), so the value is plain ASCII.
pub fn header_safe_json(value: &serde_json::Value) -> String {
    let json = value.to_string();
    let mut out = String::with_capacity(json.len());
    let mut units = [0u16; 2];

    for c in json.chars() {
        if (c as u32) < 0x7F {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}
