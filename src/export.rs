//! Standalone HTML export of the rendered document.

use std::sync::OnceLock;

use regex::Regex;

const FALLBACK_TITLE: &str = "Markdown Document";
const FALLBACK_FILE_STEM: &str = "document";

const BASE_STYLE: &str = "\
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; max-width: 800px; margin: 0 auto; padding: 2rem; }
h1, h2, h3, h4, h5, h6 { color: #1a202c; }
code { background: #f7fafc; padding: 0.2rem 0.4rem; border-radius: 0.25rem; font-family: monospace; }
pre { padding: 1rem; border-radius: 0.5rem; overflow-x: auto; }
pre code { background: transparent; padding: 0; }
blockquote { border-left: 4px solid #3b82f6; padding-left: 1rem; margin: 1.5rem 0; font-style: italic; }
table { width: 100%; border-collapse: collapse; margin: 1.5rem 0; }
th, td { padding: 0.75rem; text-align: left; border-bottom: 1px solid #e2e8f0; }
th { background: #f7fafc; font-weight: 600; }
";

fn strip_extension(file_name: &str) -> &str {
    static RE_EXTENSION: OnceLock<Regex> = OnceLock::new();
    let re = RE_EXTENSION.get_or_init(|| Regex::new(r"\.[^.]+$").expect("valid extension regex"));
    match re.find(file_name) {
        Some(m) if m.start() > 0 => &file_name[..m.start()],
        _ => file_name,
    }
}

/// The source file name without its extension.
pub fn document_title(file_name: Option<&str>) -> String {
    file_name
        .map(strip_extension)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(FALLBACK_TITLE)
        .to_string()
}

pub fn download_name(file_name: Option<&str>) -> String {
    let stem = file_name
        .map(strip_extension)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(FALLBACK_FILE_STEM);
    format!("{stem}.html")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// A self-contained page: inline styles, `body_html` verbatim as the body.
pub fn standalone_html(title: &str, body_html: &str, highlight_css: &str) -> String {
    format!(
        "<!DOCTYPE html>
<html lang=\"en\">
<head>
<meta charset=\"UTF-8\">
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">
<title>{title}</title>
<style>
{BASE_STYLE}{highlight_css}
</style>
</head>
<body>
{body_html}
</body>
</html>
",
        title = escape_html(title),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_drops_the_extension() {
        assert_eq!(document_title(Some("notes.md")), "notes");
        assert_eq!(document_title(Some("release.v2.markdown")), "release.v2");
        assert_eq!(document_title(Some("README")), "README");
        assert_eq!(document_title(Some(".profile")), ".profile");
        assert_eq!(document_title(None), "Markdown Document");
    }

    #[test]
    fn download_name_uses_html_extension() {
        assert_eq!(download_name(Some("guide.txt")), "guide.html");
        assert_eq!(download_name(None), "document.html");
    }

    #[test]
    fn document_wraps_rendered_body() {
        let body = "<h1>Title</h1>\n<p>text</p>\n";
        let page = standalone_html("notes", body, ".syn-code { color: #323232; }");

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>notes</title>"));
        assert!(page.contains("<body>\n<h1>Title</h1>\n<p>text</p>\n\n</body>"));
        assert!(page.contains(".syn-code { color: #323232; }"));
        assert!(!page.contains("<link"));
    }

    #[test]
    fn title_is_escaped() {
        let page = standalone_html("a<b>&c", "", "");
        assert!(page.contains("<title>a&lt;b&gt;&amp;c</title>"));
    }
}
