//! Terminal UI rendering for the query form.
//!
//! Design philosophy:
//! - Minimal chrome: no box drawing, whitespace and weight create hierarchy
//! - Grayscale plus reversed selection, red only for errors
//! - Everything is drawn from a `RenderState` snapshot; nothing here mutates state
//!
//! Screen, top to bottom: header, query input (grows with content),
//! example chips, separator, the one active panel, status bar.

use std::time::Duration;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::display::{submit_hint, ResponseView, LOADING_STEP, NO_WORKFLOW_STEPS};
use crate::render::{PanelView, RenderState};
use crate::tea::Focus;

// Color tokens (selection uses REVERSED modifier to adapt to terminal theme)
const COLOR_TEXT_DIMMED: Color = Color::Gray;
const COLOR_TEXT_MUTED: Color = Color::DarkGray;
const COLOR_SEPARATOR: Color = Color::White;
const COLOR_ERROR: Color = Color::Red;
const COLOR_ACCENT: Color = Color::Cyan;
const COLOR_NODE: Color = Color::Green;

// Input grows between these heights
pub const MIN_INPUT_ROWS: u16 = 3;
pub const MAX_INPUT_ROWS: u16 = 8;

const EXAMPLE_CHIP_WIDTH: usize = 36;
const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SPINNER_FRAME: Duration = Duration::from_millis(80);

/// A single keybinding entry for display.
struct Keybinding(&'static str, &'static str);

/// A group of related keybindings (separated by │).
struct KeybindingGroup(Vec<Keybinding>);

fn keybindings_for_focus(focus: Focus) -> Vec<KeybindingGroup> {
    match focus {
        Focus::Input => vec![
            KeybindingGroup(vec![
                Keybinding(submit_hint(), "submit"),
                Keybinding("Enter", "newline"),
                Keybinding("^L", "clear"),
            ]),
            KeybindingGroup(vec![Keybinding("Tab", "examples")]),
            KeybindingGroup(vec![Keybinding("PgUp/PgDn", "scroll")]),
            KeybindingGroup(vec![Keybinding("Esc", "quit")]),
        ],
        Focus::Examples => vec![
            KeybindingGroup(vec![Keybinding("←/→", "choose"), Keybinding("Enter", "ask")]),
            KeybindingGroup(vec![Keybinding("Tab", "input")]),
            KeybindingGroup(vec![Keybinding("Esc", "back")]),
        ],
    }
}

/// Main render function - entry point for all UI drawing.
pub fn draw(frame: &mut Frame, state: &RenderState) {
    let area = frame.area();
    if area.height < 6 {
        render_panel(frame, state, area);
        return;
    }

    let input_height = input_rows(&state.input, area.width.saturating_sub(2) as usize) + 1;
    let examples_height = if state.examples.is_empty() { 0 } else { 1 };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(input_height),
        Constraint::Length(examples_height),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    render_header(frame, state, chunks[0]);
    render_input(frame, state, chunks[1]);
    if examples_height > 0 {
        render_examples(frame, state, chunks[2]);
    }
    render_separator(frame, chunks[3]);
    render_panel(frame, state, chunks[4]);
    render_statusbar(frame, state, chunks[5]);
}

fn render_header(frame: &mut Frame, state: &RenderState, area: Rect) {
    let line = Line::from(vec![
        Span::styled("medq", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled("  ", Style::default()),
        Span::styled(state.endpoint.clone(), Style::default().fg(COLOR_TEXT_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the query input: a label row, then the text (or placeholder).
fn render_input(frame: &mut Frame, state: &RenderState, area: Rect) {
    let focused = state.focus == Focus::Input;
    let label_style = if focused {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(COLOR_TEXT_DIMMED)
    };

    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).split(area);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled("Query", label_style))),
        chunks[0],
    );

    let text_area = Rect {
        x: chunks[1].x + 2,
        width: chunks[1].width.saturating_sub(2),
        ..chunks[1]
    };

    if state.input.is_empty() {
        let placeholder_style = Style::default().fg(COLOR_TEXT_MUTED);
        let mut lines = vec![
            Line::from(Span::styled(
                "Example: What are the treatments for Kawasaki disease?",
                placeholder_style,
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("Press {} to submit", submit_hint()),
                placeholder_style,
            )),
        ];
        if focused {
            lines[0].spans.insert(0, cursor_span());
        }
        frame.render_widget(Paragraph::new(lines), text_area);
        return;
    }

    let input_style = Style::default().fg(Color::White);
    let mut lines: Vec<Line> = state
        .input
        .split('\n')
        .map(|l| Line::from(Span::styled(l.to_string(), input_style)))
        .collect();
    if focused {
        if let Some(last) = lines.last_mut() {
            last.spans.push(cursor_span());
        }
    }

    // Keep the end of the text (where the cursor is) visible once capped
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    let total = saturating_rows(paragraph.line_count(text_area.width));
    let offset = total.saturating_sub(text_area.height);
    frame.render_widget(paragraph.scroll((offset, 0)), text_area);
}

fn cursor_span() -> Span<'static> {
    Span::styled(
        "_",
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::SLOW_BLINK),
    )
}

/// Render the example chips on one line; the selected chip is reversed
/// while the examples row has focus.
fn render_examples(frame: &mut Frame, state: &RenderState, area: Rect) {
    let focused = state.focus == Focus::Examples;
    let mut spans = vec![Span::styled(
        "Try: ",
        Style::default().fg(COLOR_TEXT_DIMMED),
    )];

    for (idx, example) in state.examples.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  ", Style::default()));
        }
        let style = if focused && idx == state.selected_example {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(COLOR_TEXT_DIMMED)
        };
        spans.push(Span::styled(
            format!("[{}]", truncate(example, EXAMPLE_CHIP_WIDTH)),
            style,
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the separator - solid divider line between form and panel.
fn render_separator(frame: &mut Frame, area: Rect) {
    let solid = "─".repeat(area.width as usize);
    let line = Line::from(Span::styled(solid, Style::default().fg(COLOR_SEPARATOR)));
    frame.render_widget(Paragraph::new(line), area);
}

/// Render whichever panel the state carries. Exactly one is ever drawn.
fn render_panel(frame: &mut Frame, state: &RenderState, area: Rect) {
    match &state.panel {
        PanelView::Idle => {
            let line = Line::from(Span::styled(
                "Ask a medical question above, or pick an example.",
                Style::default().fg(COLOR_TEXT_DIMMED),
            ));
            frame.render_widget(Paragraph::new(line), area);
        }
        PanelView::Loading { elapsed } => render_loading(frame, *elapsed, area),
        PanelView::Error { message } => render_error(frame, message, area),
        PanelView::Response {
            view,
            visible_steps,
        } => render_response(frame, view, *visible_steps, state.scroll, area),
    }
}

fn render_loading(frame: &mut Frame, elapsed: Duration, area: Rect) {
    let lines = vec![
        Line::from(vec![
            Span::styled(
                spinner_frame(elapsed),
                Style::default().fg(COLOR_ACCENT),
            ),
            Span::styled(" Processing your query...", Style::default()),
            Span::styled(
                format!("  {:.1}s", elapsed.as_secs_f64()),
                Style::default().fg(COLOR_TEXT_MUTED),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", LOADING_STEP),
            Style::default().fg(COLOR_TEXT_DIMMED),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_error(frame: &mut Frame, message: &str, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            "Error: ",
            Style::default().fg(COLOR_ERROR).add_modifier(Modifier::BOLD),
        ),
        Span::styled(message.to_string(), Style::default().fg(COLOR_ERROR)),
    ]);
    frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: false }), area);
}

/// Render metadata, the workflow trail, then the answer (scrollable).
fn render_response(
    frame: &mut Frame,
    view: &ResponseView,
    visible_steps: usize,
    scroll: u16,
    area: Rect,
) {
    let label_style = Style::default().fg(COLOR_TEXT_DIMMED);
    let mut lines = vec![
        meta_line("Route", &view.route, label_style),
        meta_line("Source", &view.source, label_style),
        meta_line("Relevant", &view.relevance, label_style),
        Line::from(""),
        workflow_line(&view.steps, visible_steps),
        Line::from(""),
    ];
    lines.extend(
        view.body
            .split('\n')
            .map(|l| Line::from(Span::raw(l.to_string()))),
    );

    // Counted after wrapping, so a long route or trail still leaves the
    // last answer line reachable
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    let content_rows = saturating_rows(paragraph.line_count(area.width));
    let max_scroll = content_rows.saturating_sub(area.height);
    frame.render_widget(paragraph.scroll((scroll.min(max_scroll), 0)), area);
}

fn meta_line(label: &str, value: &str, label_style: Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<10}", label), label_style),
        Span::styled(
            value.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ])
}

/// Workflow trail: revealed nodes joined by arrows, or the placeholder.
fn workflow_line(steps: &[String], visible: usize) -> Line<'static> {
    let label = Span::styled(
        format!("{:<10}", "Workflow"),
        Style::default().fg(COLOR_TEXT_DIMMED),
    );

    if steps.is_empty() {
        return Line::from(vec![
            label,
            Span::styled(NO_WORKFLOW_STEPS, Style::default().fg(COLOR_TEXT_MUTED)),
        ]);
    }

    let mut spans = vec![label];
    for (idx, step) in steps.iter().take(visible).enumerate() {
        if idx > 0 {
            spans.push(Span::styled(" → ", Style::default().fg(COLOR_TEXT_MUTED)));
        }
        spans.push(Span::styled(
            format!("[{}]", step),
            Style::default().fg(COLOR_NODE),
        ));
    }
    Line::from(spans)
}

/// Status bar: keymap on the left, submit button right-aligned.
fn render_statusbar(frame: &mut Frame, state: &RenderState, area: Rect) {
    let key_style = Style::default().fg(COLOR_TEXT_DIMMED);
    let desc_style = Style::default().fg(COLOR_TEXT_MUTED);
    let sep_style = Style::default().fg(COLOR_TEXT_MUTED);

    let mut spans: Vec<Span> = Vec::new();
    for group in keybindings_for_focus(state.focus) {
        if !spans.is_empty() {
            spans.push(Span::styled(" │ ", sep_style));
        }
        for (key_idx, keybinding) in group.0.iter().enumerate() {
            if key_idx > 0 {
                spans.push(Span::styled(" • ", sep_style));
            }
            spans.push(Span::styled(keybinding.0, key_style));
            spans.push(Span::styled(format!(" {}", keybinding.1), desc_style));
        }
    }

    let (label, style) = submit_button(state);
    let content_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let spacer_width = (area.width as usize)
        .saturating_sub(content_width)
        .saturating_sub(label.chars().count());
    if spacer_width > 0 {
        spans.push(Span::raw(" ".repeat(spacer_width)));
    }
    spans.push(Span::styled(label, style));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Label and style of the submit button for the current state.
fn submit_button(state: &RenderState) -> (&'static str, Style) {
    if !state.submit_enabled {
        (" Sending… ", Style::default().fg(COLOR_TEXT_MUTED))
    } else if state.button_pressed {
        (
            " Submit ",
            Style::default()
                .add_modifier(Modifier::REVERSED)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (" Submit ", Style::default().fg(Color::Black).bg(COLOR_ACCENT))
    }
}

fn spinner_frame(elapsed: Duration) -> &'static str {
    let idx = (elapsed.as_millis() / SPINNER_FRAME.as_millis()) as usize % SPINNER.len();
    SPINNER[idx]
}

// Helper functions

/// Rows `text` occupies when wrapped at `width` columns. Every line,
/// including an empty trailing one, takes at least one row.
pub fn wrapped_rows(text: &str, width: usize) -> usize {
    if width == 0 {
        return text.split('\n').count();
    }
    text.split('\n')
        .map(|line| line.chars().count().div_ceil(width).max(1))
        .sum()
}

/// Height of the input text area: fits the content, within bounds.
pub fn input_rows(text: &str, width: usize) -> u16 {
    // +1 column for the cursor
    let rows = saturating_rows(wrapped_rows(&format!("{text} "), width));
    rows.clamp(MIN_INPUT_ROWS, MAX_INPUT_ROWS)
}

fn saturating_rows(rows: usize) -> u16 {
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn truncate(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 1).collect();
        format!("{}…", truncated)
    }
}
