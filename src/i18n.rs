// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认）和印尼文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 默认语言
pub const DEFAULT_LOCALE: &str = "en";

/// 规范化语言代码
///
/// 接受大小写及地区后缀（en-US、id_ID）,以及印尼语旧代码 "in"
///
/// # 返回
/// - Some(code): 支持的语言
/// - None: 不支持
pub fn normalize_locale(code: &str) -> Option<&'static str> {
    let lowered = code.trim().to_ascii_lowercase();
    let primary = lowered.split(['-', '_']).next().unwrap_or_default();
    match primary {
        "en" => Some("en"),
        "id" | "in" => Some("id"),
        _ => None,
    }
}

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码；不支持时使用默认语言
///
/// # 返回
/// 实际生效的语言代码
pub fn set_locale(locale: &str) -> &'static str {
    let applied = normalize_locale(locale).unwrap_or_else(|| {
        tracing::warn!(locale, "不支持的语言,使用 {}", DEFAULT_LOCALE);
        DEFAULT_LOCALE
    });
    rust_i18n::set_locale(applied);
    applied
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use device_stock::i18n::t;
/// let label = t("status.adequate");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）,占位符形如 %{name}
///
/// # 示例
/// ```no_run
/// use device_stock::i18n::t_with_args;
/// let msg = t_with_args("import.applied", &[("count", "12")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter()
        .fold(rust_i18n::t!(key).to_string(), |text, (name, value)| {
            text.replace(&format!("%{{{}}}", name), value)
        })
}
