//! Markdown rendering for assistant messages.
//!
//! Walks pulldown-cmark events and produces styled ratatui lines: headings,
//! emphasis, inline and fenced code, lists, rules, and pipe tables. Tables
//! get width-balanced columns; cells that still do not fit are truncated
//! with an ellipsis. Image messages never pass through here.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

const MIN_TABLE_COLUMN_WIDTH: usize = 5;
const RULE_WIDTH: usize = 40;

fn heading_style(depth: u8) -> Style {
    let style = Style::default().add_modifier(Modifier::BOLD);
    if depth <= 2 {
        style.add_modifier(Modifier::UNDERLINED)
    } else {
        style
    }
}

fn inline_code_style() -> Style {
    Style::default().fg(Color::Yellow)
}

fn code_block_style() -> Style {
    Style::default().fg(Color::Green)
}

fn frame_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Render a markdown body into display lines, balancing tables against the
/// given content width.
pub fn render_markdown(text: &str, width: usize) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut renderer = MarkdownRenderer::new(width);
    for event in Parser::new_ext(text, options) {
        renderer.handle(event);
    }
    renderer.finish()
}

struct MarkdownRenderer {
    width: usize,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    list_stack: Vec<Option<u64>>,
    in_code_block: bool,
    code_buffer: String,
    table: Option<TableBuilder>,
}

impl MarkdownRenderer {
    fn new(width: usize) -> Self {
        MarkdownRenderer {
            width: width.max(MIN_TABLE_COLUMN_WIDTH),
            lines: Vec::new(),
            current: Vec::new(),
            style_stack: Vec::new(),
            list_stack: Vec::new(),
            in_code_block: false,
            code_buffer: String::new(),
            table: None,
        }
    }

    fn current_style(&self) -> Style {
        self.style_stack
            .iter()
            .fold(Style::default(), |acc, style| acc.patch(*style))
    }

    fn flush_current(&mut self) {
        if !self.current.is_empty() {
            let spans = std::mem::take(&mut self.current);
            self.lines.push(Line::from(spans));
        }
    }

    fn blank_line(&mut self) {
        if matches!(self.lines.last(), Some(line) if line.width() == 0) {
            return;
        }
        self.lines.push(Line::from(""));
    }

    fn push_span(&mut self, span: Span<'static>) {
        if let Some(table) = &mut self.table {
            table.add_span(span);
        } else {
            self.current.push(span);
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => {
                if self.in_code_block {
                    self.code_buffer.push_str(&text);
                } else {
                    let style = self.current_style();
                    self.push_span(Span::styled(text.into_string(), style));
                }
            }
            Event::Code(code) => {
                let style = self.current_style().patch(inline_code_style());
                self.push_span(Span::styled(code.into_string(), style));
            }
            Event::SoftBreak | Event::HardBreak => {
                if self.table.is_some() {
                    self.push_span(Span::raw(" "));
                } else {
                    self.flush_current();
                }
            }
            Event::Rule => {
                self.flush_current();
                let rule = "─".repeat(self.width.min(RULE_WIDTH));
                self.lines.push(Line::from(Span::styled(rule, frame_style())));
                self.blank_line();
            }
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_current();
                self.style_stack.push(heading_style(level as u8));
            }
            Tag::CodeBlock(kind) => {
                self.flush_current();
                self.in_code_block = true;
                self.code_buffer.clear();
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.lines.push(Line::from(Span::styled(
                            format!("({lang})"),
                            frame_style(),
                        )));
                    }
                }
            }
            Tag::List(start) => {
                self.flush_current();
                self.list_stack.push(start);
            }
            Tag::Item => {
                self.flush_current();
                let depth = self.list_stack.len().max(1);
                let indent = "  ".repeat(depth - 1);
                let marker = match self.list_stack.last_mut() {
                    Some(Some(counter)) => {
                        let marker = format!("{indent}{counter}. ");
                        *counter += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.current.push(Span::raw(marker));
            }
            Tag::Strong => self
                .style_stack
                .push(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Emphasis => self
                .style_stack
                .push(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strikethrough => self
                .style_stack
                .push(Style::default().add_modifier(Modifier::CROSSED_OUT)),
            Tag::Table(_) => {
                self.flush_current();
                self.table = Some(TableBuilder::new());
            }
            Tag::TableHead => {
                if let Some(table) = &mut self.table {
                    table.start_header();
                }
            }
            Tag::TableCell => {
                if let Some(table) = &mut self.table {
                    table.start_cell();
                }
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_current();
                if self.list_stack.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Heading(_) => {
                self.flush_current();
                self.style_stack.pop();
                self.blank_line();
            }
            TagEnd::CodeBlock => {
                let buffer = std::mem::take(&mut self.code_buffer);
                for line in buffer.trim_end_matches('\n').split('\n') {
                    self.lines.push(Line::from(Span::styled(
                        line.to_string(),
                        code_block_style(),
                    )));
                }
                self.in_code_block = false;
                self.blank_line();
            }
            TagEnd::List(_) => {
                self.flush_current();
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Item => self.flush_current(),
            TagEnd::Strong | TagEnd::Emphasis | TagEnd::Strikethrough => {
                self.style_stack.pop();
            }
            TagEnd::TableHead => {
                if let Some(table) = &mut self.table {
                    table.end_header();
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = &mut self.table {
                    table.end_row();
                }
            }
            TagEnd::TableCell => {
                if let Some(table) = &mut self.table {
                    table.end_cell();
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.lines.extend(table.render(self.width));
                    self.blank_line();
                }
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush_current();
        while matches!(self.lines.last(), Some(line) if line.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Collects table cell spans and renders the table with balanced column
/// widths once the closing tag arrives.
struct TableBuilder {
    rows: Vec<Vec<Vec<Span<'static>>>>,
    current_row: Vec<Vec<Span<'static>>>,
    current_cell: Vec<Span<'static>>,
    has_header: bool,
}

impl TableBuilder {
    fn new() -> Self {
        TableBuilder {
            rows: Vec::new(),
            current_row: Vec::new(),
            current_cell: Vec::new(),
            has_header: false,
        }
    }

    fn start_header(&mut self) {}

    fn end_header(&mut self) {
        self.has_header = true;
        if !self.current_row.is_empty() {
            self.rows.push(std::mem::take(&mut self.current_row));
        }
    }

    fn start_cell(&mut self) {
        self.current_cell.clear();
    }

    fn end_cell(&mut self) {
        self.current_row
            .push(std::mem::take(&mut self.current_cell));
    }

    fn end_row(&mut self) {
        if !self.current_row.is_empty() {
            self.rows.push(std::mem::take(&mut self.current_row));
        }
    }

    fn add_span(&mut self, span: Span<'static>) {
        self.current_cell.push(span);
    }

    fn cell_width(cell: &[Span<'_>]) -> usize {
        cell.iter()
            .map(|span| UnicodeWidthStr::width(span.content.as_ref()))
            .sum()
    }

    /// Natural column widths, shrunk one column at a time (widest first)
    /// until the table fits the available width or every column is at the
    /// minimum.
    fn balanced_widths(&self, available: usize) -> Vec<usize> {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![MIN_TABLE_COLUMN_WIDTH.min(available); columns];
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(Self::cell_width(cell));
            }
        }

        let separators = 3 * columns.saturating_sub(1);
        loop {
            let total: usize = widths.iter().sum::<usize>() + separators;
            if total <= available {
                break;
            }
            let Some((widest, _)) = widths
                .iter()
                .enumerate()
                .filter(|(_, w)| **w > MIN_TABLE_COLUMN_WIDTH)
                .max_by_key(|(_, w)| **w)
            else {
                break;
            };
            widths[widest] -= 1;
        }
        widths
    }

    fn render(&self, available: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        if self.rows.is_empty() {
            return lines;
        }

        let widths = self.balanced_widths(available);
        for (row_index, row) in self.rows.iter().enumerate() {
            let mut spans: Vec<Span<'static>> = Vec::new();
            for (i, width) in widths.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::styled(" │ ", frame_style()));
                }
                let empty = Vec::new();
                let cell = row.get(i).unwrap_or(&empty);
                let header = self.has_header && row_index == 0;
                spans.extend(fit_cell(cell, *width, header));
            }
            lines.push(Line::from(spans));

            if self.has_header && row_index == 0 && self.rows.len() > 1 {
                let mut separator = String::new();
                for (i, width) in widths.iter().enumerate() {
                    if i > 0 {
                        separator.push_str("─┼─");
                    }
                    separator.push_str(&"─".repeat(*width));
                }
                lines.push(Line::from(Span::styled(separator, frame_style())));
            }
        }
        lines
    }
}

/// Fit a cell's spans into a fixed display width: truncate with an ellipsis
/// when too wide, pad with spaces when too narrow.
fn fit_cell(cell: &[Span<'static>], width: usize, header: bool) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut used = 0usize;
    let mut truncated = false;

    for span in cell {
        if truncated {
            break;
        }
        let span_width = UnicodeWidthStr::width(span.content.as_ref());
        if used + span_width <= width {
            spans.push(span.clone());
            used += span_width;
            continue;
        }

        // Reserve one cell for the ellipsis marker.
        let remaining = width.saturating_sub(used).saturating_sub(1);
        let mut clipped = String::new();
        let mut clipped_width = 0usize;
        for ch in span.content.chars() {
            let ch_width = UnicodeWidthStr::width(ch.to_string().as_str());
            if clipped_width + ch_width > remaining {
                break;
            }
            clipped.push(ch);
            clipped_width += ch_width;
        }
        clipped.push('…');
        used += clipped_width + 1;
        spans.push(Span::styled(clipped, span.style));
        truncated = true;
    }

    if header {
        for span in &mut spans {
            span.style = span.style.add_modifier(Modifier::BOLD);
        }
    }
    if used < width {
        spans.push(Span::raw(" ".repeat(width - used)));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn rendered_text(lines: &[Line<'_>]) -> Vec<String> {
        lines.iter().map(line_text).collect()
    }

    #[test]
    fn plain_paragraphs_pass_through() {
        let lines = render_markdown("hello world", 80);
        assert_eq!(rendered_text(&lines), vec!["hello world"]);
    }

    #[test]
    fn headings_are_bold() {
        let lines = render_markdown("# Title", 80);
        assert_eq!(line_text(&lines[0]), "Title");
        assert!(lines[0].spans[0]
            .style
            .add_modifier
            .contains(Modifier::BOLD));
    }

    #[test]
    fn emphasis_styles_nest() {
        let lines = render_markdown("some **bold** and *italic* text", 80);
        let bold = lines[0]
            .spans
            .iter()
            .find(|s| s.content.as_ref() == "bold")
            .unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
        let italic = lines[0]
            .spans
            .iter()
            .find(|s| s.content.as_ref() == "italic")
            .unwrap();
        assert!(italic.style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn bullet_and_ordered_lists_get_markers() {
        let lines = render_markdown("- one\n- two\n\n1. first\n2. second", 80);
        let text = rendered_text(&lines);
        assert!(text.contains(&"• one".to_string()));
        assert!(text.contains(&"• two".to_string()));
        assert!(text.contains(&"1. first".to_string()));
        assert!(text.contains(&"2. second".to_string()));
    }

    #[test]
    fn fenced_code_keeps_its_lines() {
        let lines = render_markdown("```rust\nlet x = 1;\nlet y = 2;\n```", 80);
        let text = rendered_text(&lines);
        assert!(text.contains(&"let x = 1;".to_string()));
        assert!(text.contains(&"let y = 2;".to_string()));
    }

    #[test]
    fn tables_render_with_aligned_columns_and_separator() {
        let md = "| id | blurb |\n|---|---|\n| gpt-4o | general |\n| o3 | reasoning |";
        let lines = render_markdown(md, 80);
        let text = rendered_text(&lines);

        assert!(text[0].contains("id"));
        assert!(text[0].contains("│"));
        assert!(text[1].contains("┼"));
        assert!(text[2].starts_with("gpt-4o"));
        // Both data rows are padded to the same display width.
        assert_eq!(
            UnicodeWidthStr::width(text[2].as_str()),
            UnicodeWidthStr::width(text[3].as_str())
        );
    }

    #[test]
    fn wide_tables_shrink_to_the_available_width() {
        let md =
            "| a | b |\n|---|---|\n| short | this cell is much wider than the viewport allows |";
        let lines = render_markdown(md, 30);
        for line in &lines {
            assert!(
                UnicodeWidthStr::width(line_text(line).as_str()) <= 30,
                "line overflows: {:?}",
                line_text(line)
            );
        }
        assert!(rendered_text(&lines).iter().any(|l| l.contains('…')));
    }

    #[test]
    fn trailing_blank_lines_are_dropped() {
        let lines = render_markdown("one paragraph\n\nand another\n", 80);
        assert!(lines.last().map(|l| l.width() > 0).unwrap_or(false));
    }
}
