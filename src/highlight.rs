//! Code block highlighting backed by syntect's class-based HTML output.

use std::sync::OnceLock;

use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "syn-" };
const LIGHT_THEME: &str = "InspiredGitHub";
const DARK_THEME: &str = "base16-ocean.dark";

pub struct HighlightedCode {
    pub html: String,
    /// Name of the syntax that was applied, e.g. `JavaScript`.
    pub syntax: String,
}

pub struct Highlighter {
    syntax_set: SyntaxSet,
    light_css: String,
    dark_css: String,
}

impl Highlighter {
    pub fn new() -> Self {
        let themes = ThemeSet::load_defaults();
        let css_for = |name: &str| {
            themes
                .themes
                .get(name)
                .and_then(|theme| css_for_theme_with_class_style(theme, CLASS_STYLE).ok())
                .unwrap_or_default()
        };
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            light_css: css_for(LIGHT_THEME),
            dark_css: css_for(DARK_THEME),
        }
    }

    /// Shared instance; loading the syntax definitions is expensive.
    pub fn global() -> &'static Highlighter {
        static HIGHLIGHTER: OnceLock<Highlighter> = OnceLock::new();
        HIGHLIGHTER.get_or_init(Highlighter::new)
    }

    fn syntax_for_language(&self, language: &str) -> Option<&SyntaxReference> {
        self.syntax_set
            .find_syntax_by_token(language)
            .or_else(|| self.syntax_set.find_syntax_by_extension(language))
    }

    /// Guesses the syntax of an untagged block from its first line
    /// (shebangs, modelines, XML prologs and the like).
    fn detect(&self, code: &str) -> &SyntaxReference {
        code.lines()
            .next()
            .and_then(|line| self.syntax_set.find_syntax_by_first_line(line))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    /// Highlights `code` with the fence language when it is known, otherwise
    /// with a detected syntax.
    pub fn highlight(
        &self,
        code: &str,
        language: Option<&str>,
    ) -> Result<HighlightedCode, syntect::Error> {
        let syntax = language
            .and_then(|lang| self.syntax_for_language(lang))
            .unwrap_or_else(|| self.detect(code));

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        Ok(HighlightedCode {
            html: generator.finalize(),
            syntax: syntax.name.clone(),
        })
    }

    /// Stylesheet for both palettes, keyed on the `data-theme` attribute of `<html>`.
    pub fn theme_css(&self) -> String {
        let mut css = scope_css(&self.light_css, r#"[data-theme="light"]"#);
        css.push_str(&scope_css(&self.dark_css, r#"[data-theme="dark"]"#));
        css
    }

    /// Unscoped light palette, for standalone exports.
    pub fn light_css(&self) -> &str {
        &self.light_css
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Prefixes every selector of a flat stylesheet with `scope`.
fn scope_css(css: &str, scope: &str) -> String {
    let mut out = String::with_capacity(css.len() + 64);
    for line in css.lines() {
        let trimmed = line.trim_end();
        match trimmed.strip_suffix('{') {
            Some(selectors) if !trimmed.trim_start().starts_with('@') => {
                let scoped: Vec<String> = selectors
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| format!("{scope} {s}"))
                    .collect();
                out.push_str(&scoped.join(", "));
                out.push_str(" {");
            }
            _ => out.push_str(line),
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_language_is_used() {
        let code = Highlighter::global()
            .highlight("const x = 1;\n", Some("js"))
            .unwrap();
        assert_eq!(code.syntax, "JavaScript");
        assert!(code.html.contains("syn-js"));
        assert!(code.html.contains("const"));
    }

    #[test]
    fn unknown_language_falls_back_to_detection() {
        let code = Highlighter::global()
            .highlight("#!/bin/bash\necho hi\n", Some("no-such-lang"))
            .unwrap();
        assert!(code.syntax.contains("bash"));

        let plain = Highlighter::global().highlight("just words\n", None).unwrap();
        assert_eq!(plain.syntax, "Plain Text");
    }

    #[test]
    fn markup_in_code_is_escaped() {
        let code = Highlighter::global()
            .highlight("<b>&</b>\n", None)
            .unwrap();
        assert!(code.html.contains("&lt;b&gt;&amp;&lt;/b&gt;"));
    }

    #[test]
    fn scopes_every_selector() {
        let css = "/* header */\n.syn-code {\n color: #000;\n}\n.syn-a, .syn-b.syn-c {\n color: red;\n}\n";
        let scoped = scope_css(css, "[data-theme=\"dark\"]");
        assert!(scoped.contains("[data-theme=\"dark\"] .syn-code {"));
        assert!(scoped.contains("[data-theme=\"dark\"] .syn-a, [data-theme=\"dark\"] .syn-b.syn-c {"));
        assert!(scoped.contains("/* header */"));
    }

    #[test]
    fn theme_css_covers_both_palettes() {
        let css = Highlighter::global().theme_css();
        assert!(css.contains("[data-theme=\"light\"] .syn-code"));
        assert!(css.contains("[data-theme=\"dark\"] .syn-code"));
    }
}
