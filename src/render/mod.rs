use std::iter;

use clap::ValueEnum;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};

pub trait Renderer {
    fn render(&self, markdown: &str) -> String;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PreviewFormat {
    Html,
    #[default]
    Text,
}

impl PreviewFormat {
    pub fn renderer(self) -> Box<dyn Renderer> {
        match self {
            Self::Html => Box::new(HtmlRenderer::default()),
            Self::Text => Box::new(TextRenderer),
        }
    }
}

pub struct HtmlRenderer {
    options: Options,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_FOOTNOTES,
        }
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, markdown: &str) -> String {
        let mut html = String::with_capacity(markdown.len() * 3 / 2);
        pulldown_cmark::html::push_html(&mut html, Parser::new_ext(markdown, self.options));
        html
    }
}

/// Plain terminal text: underlined headings, indented bullets, no markup.
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, markdown: &str) -> String {
        let mut out = String::new();
        let mut lists: Vec<Option<u64>> = Vec::new();
        let mut heading_start = None;

        let parser = Parser::new_ext(
            markdown,
            Options::ENABLE_TASKLISTS | Options::ENABLE_STRIKETHROUGH,
        );
        for event in parser {
            match event {
                Event::Start(Tag::Heading { .. }) => {
                    start_block(&mut out);
                    heading_start = Some(out.len());
                }
                Event::End(TagEnd::Heading(level)) => {
                    if let Some(start) = heading_start.take() {
                        let width = out[start..].chars().count();
                        let rule = if level == HeadingLevel::H1 { '=' } else { '-' };
                        out.push('\n');
                        out.extend(iter::repeat(rule).take(width));
                        out.push('\n');
                    }
                }
                Event::Start(Tag::Paragraph) if lists.is_empty() => start_block(&mut out),
                Event::End(TagEnd::Paragraph) => end_line(&mut out),
                Event::Start(Tag::List(first)) => {
                    if lists.is_empty() {
                        start_block(&mut out);
                    }
                    lists.push(first);
                }
                Event::End(TagEnd::List(_)) => {
                    lists.pop();
                    end_line(&mut out);
                }
                Event::Start(Tag::Item) => {
                    end_line(&mut out);
                    out.push_str(&"  ".repeat(lists.len().saturating_sub(1)));
                    match lists.last_mut() {
                        Some(Some(n)) => {
                            out.push_str(&format!("{n}. "));
                            *n += 1;
                        }
                        _ => out.push_str("- "),
                    }
                }
                Event::Start(Tag::CodeBlock(_)) => start_block(&mut out),
                Event::End(TagEnd::CodeBlock) => end_line(&mut out),
                Event::Text(text) | Event::Code(text) => out.push_str(&text),
                Event::SoftBreak => out.push(' '),
                Event::HardBreak => out.push('\n'),
                Event::Rule => {
                    start_block(&mut out);
                    out.push_str("----\n");
                }
                Event::TaskListMarker(done) => out.push_str(if done { "[x] " } else { "[ ] " }),
                _ => {}
            }
        }

        let trimmed = out.trim_end();
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}\n")
        }
    }
}

fn end_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn start_block(out: &mut String) {
    end_line(out);
    if !out.is_empty() && !out.ends_with("\n\n") {
        out.push('\n');
    }
}
