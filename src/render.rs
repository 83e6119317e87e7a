//! Markdown to HTML, with code blocks handed to the highlighter.

use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::highlight::Highlighter;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("could not highlight {language} code block: {source}")]
    Highlight {
        language: String,
        #[source]
        source: syntect::Error,
    },
}

pub trait MarkdownRenderer {
    fn render(&self, markdown: &str) -> Result<String, RenderError>;
}

/// pulldown-cmark with the GitHub extensions, soft breaks rendered as `<br>`
/// and syntect-highlighted code blocks.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkdownPipeline;

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_GFM
}

struct PendingBlock {
    language: Option<String>,
    code: String,
}

impl PendingBlock {
    fn new(kind: CodeBlockKind<'_>) -> Self {
        let language = match kind {
            CodeBlockKind::Fenced(info) => info
                .split(|c: char| c.is_whitespace() || c == ',')
                .next()
                .filter(|lang| !lang.is_empty())
                .map(str::to_string),
            CodeBlockKind::Indented => None,
        };
        Self {
            language,
            code: String::new(),
        }
    }
}

fn language_class(language: &str) -> String {
    language
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '#'))
        .collect()
}

fn code_block_html(block: PendingBlock) -> Result<String, RenderError> {
    let highlighted = Highlighter::global()
        .highlight(&block.code, block.language.as_deref())
        .map_err(|source| RenderError::Highlight {
            language: block.language.clone().unwrap_or_else(|| "untagged".to_string()),
            source,
        })?;
    let class = match block.language.as_deref().map(language_class) {
        Some(lang) if !lang.is_empty() => format!("language-{lang}"),
        _ => "language-auto".to_string(),
    };
    Ok(format!(
        "<pre class=\"syn-code\"><code class=\"{class}\" data-syntax=\"{}\">{}</code></pre>\n",
        highlighted.syntax.replace('"', "&quot;"),
        highlighted.html
    ))
}

impl MarkdownRenderer for MarkdownPipeline {
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let mut events = Vec::new();
        let mut pending: Option<PendingBlock> = None;

        for event in Parser::new_ext(markdown, options()) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => pending = Some(PendingBlock::new(kind)),
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(block) = pending.take() {
                        events.push(Event::Html(code_block_html(block)?.into()));
                    }
                }
                Event::Text(text) => match pending.as_mut() {
                    Some(block) => block.code.push_str(&text),
                    None => events.push(Event::Text(text)),
                },
                Event::SoftBreak => events.push(Event::HardBreak),
                other => events.push(other),
            }
        }

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(markdown: &str) -> String {
        MarkdownPipeline.render(markdown).unwrap()
    }

    #[test]
    fn heading_and_highlighted_js_block() {
        let html = render("# Title\n\n```js\nconst x = 1;\n```");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<code class=\"language-js\" data-syntax=\"JavaScript\">"));
        assert!(html.contains("syn-js"));
        assert!(!html.contains("```"));
    }

    #[test]
    fn soft_breaks_become_line_breaks() {
        let html = render("first line\nsecond line");
        assert!(html.contains("first line<br />"));
        assert_eq!(html.matches("<p>").count(), 1);
    }

    #[test]
    fn github_extensions_are_enabled() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\n- [x] done\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("type=\"checkbox\""));
    }

    #[test]
    fn untagged_and_indented_blocks_are_detected() {
        let html = render("```\n#!/usr/bin/env python\nprint(1)\n```\n\n    plain indented\n");
        assert!(html.contains("syn-python"));
        assert!(html.contains("data-syntax=\"Python\""));
        assert!(html.contains("data-syntax=\"Plain Text\""));
        assert_eq!(html.matches("language-auto").count(), 2);
    }

    #[test]
    fn fence_info_is_sanitized() {
        let html = render("```rust,ignore\nfn main() {}\n```\n\n```\"><script>\nx\n```");
        assert!(html.contains("language-rust"));
        assert!(!html.contains("<script>"));
    }
}
