//! Short media-type tokens (`"html"`, `"png"`, ...) to MIME strings.

/// Resolve a reply media-type hint to a MIME type.
///
/// Accepts a file-extension style token (case-insensitive, optional
/// leading `.`) or an already complete `type/subtype`, optionally with
/// `; param=value` parameters.  Unknown tokens resolve to `""`.
pub fn media_type(hint: &str) -> &str {
    let token = hint.trim();
    let token = token.strip_prefix('.').unwrap_or(token);
    if let Some(mime) = lookup(token) {
        return mime;
    }
    if is_full_mime(token) {
        return token;
    }
    ""
}

fn lookup(token: &str) -> Option<&'static str> {
    let mime = match token.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "txt" | "text" => "text/plain",
        "xml" => "text/xml",
        "js" => "application/javascript",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "wasm" => "application/wasm",
        "bin" => "application/octet-stream",
        "ttf" | "font" => "application/x-font",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "mp4" => "video/mp4",
        _ => return None,
    };
    Some(mime)
}

fn is_full_mime(token: &str) -> bool {
    let mut pieces = token.split(';');
    let essence = pieces.next().unwrap_or("").trim();
    let params_ok = pieces.all(|p| {
        p.split_once('=')
            .is_some_and(|(k, v)| !k.trim().is_empty() && !v.trim().is_empty())
    });
    params_ok && is_type_subtype(essence)
}

fn is_type_subtype(token: &str) -> bool {
    match token.split_once('/') {
        Some((ty, sub)) => {
            let ok = |s: &str| {
                !s.is_empty()
                    && s.chars()
                        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-' | '_'))
            };
            ok(ty) && ok(sub)
        }
        None => false,
    }
}

/// Whether a diagnostic reply preview should be printed for `mime`.
///
/// Stylesheets, scripts, fonts, images and documents are binary for
/// this purpose.  An unresolved (empty) type is previewed, since nothing
/// says it is binary.  Parameters after `;` are ignored.
pub fn has_preview(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    match essence.as_str() {
        "" => true,
        "text/css" => false,
        "application/json" | "application/xml" | "application/xhtml+xml" => true,
        m => m.starts_with("text/"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_tokens() {
        assert_eq!(media_type("html"), "text/html");
        assert_eq!(media_type("png"), "image/png");
        assert_eq!(media_type("pdf"), "application/pdf");
        assert_eq!(media_type("js"), "application/javascript");
    }

    #[test]
    fn lookup_is_forgiving() {
        assert_eq!(media_type(" .PNG "), "image/png");
        assert_eq!(media_type("Jpeg"), "image/jpeg");
    }

    #[test]
    fn unknown_token_is_empty() {
        assert_eq!(media_type("zzz"), "");
        assert_eq!(media_type(""), "");
        assert_eq!(media_type("a/"), "");
    }

    #[test]
    fn full_mime_passes_through() {
        assert_eq!(media_type("application/vnd.api+json"), "application/vnd.api+json");
    }

    #[test]
    fn full_mime_with_parameters_passes_through() {
        assert_eq!(media_type("text/html; charset=utf-8"), "text/html; charset=utf-8");
        assert_eq!(
            media_type(" multipart/form-data; boundary=xyz "),
            "multipart/form-data; boundary=xyz"
        );
        assert_eq!(media_type("text/html; charset"), "");
        assert_eq!(media_type("text/html;"), "");
    }

    #[test]
    fn preview_classification() {
        assert!(has_preview("text/html"));
        assert!(has_preview("application/json"));
        assert!(has_preview("application/json; charset=utf-8"));
        assert!(has_preview(""));
        assert!(!has_preview("text/css"));
        assert!(!has_preview("application/javascript"));
        assert!(!has_preview("image/png"));
    }
}
