use ratatui::{prelude::*, widgets::*};
use rconsole_engine::{ControlKind, ExecutionPhase, FormControl};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Focus, tr};
use crate::theme;

const THROBBER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(8), Constraint::Length(1)])
        .split(f.area());

    draw_header(f, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[1]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((app.subsets().len() as u16 + 3).min(11)),
            Constraint::Min(3),
        ])
        .split(body[0]);
    draw_subsets(f, app, left[0]);
    draw_commands(f, app, left[1]);
    draw_command_panel(f, app, body[1]);
    draw_footer(f, app, chunks[2]);

    match app.controller.phase().clone() {
        ExecutionPhase::Idle => {}
        ExecutionPhase::AwaitingConfirmation => draw_confirmation_modal(f, app),
        ExecutionPhase::Executing { .. } => draw_executing_modal(f, app),
        ExecutionPhase::Succeeded { command_label, response } => draw_result_modal(f, app, true, &command_label, &response),
        ExecutionPhase::Failed { message } => draw_result_modal(f, app, false, &message, ""),
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let header = Line::from(vec![
        Span::styled(" rconsole ", theme::title_style().fg(theme::ACCENT)),
        Span::styled(format!(" {} ", app.user_label), theme::text_style()),
        Span::styled(format!(" [{}]", app.locale()), theme::text_muted()),
    ]);
    f.render_widget(Paragraph::new(header), area);
}

fn draw_subsets(f: &mut Frame, app: &mut App, area: Rect) {
    let locale = app.locale();
    let mut items = vec![ListItem::new(tr(locale, "All commands", "Todos los comandos"))];
    items.extend(app.subsets().iter().map(|subset| ListItem::new(subset.name.clone())));

    let block = Block::default()
        .title(Span::styled(tr(locale, "Subsets", "Subconjuntos"), theme::title_style()))
        .borders(Borders::ALL)
        .border_style(theme::border_style(app.focus == Focus::Subsets));
    let list = List::new(items)
        .block(block)
        .style(theme::text_style())
        .highlight_style(theme::selection_style())
        .highlight_symbol("› ");
    f.render_stateful_widget(list, area, &mut app.subset_state);
}

fn draw_commands(f: &mut Frame, app: &mut App, area: Rect) {
    let locale = app.locale();
    let selected_id = app.controller.command().map(|command| command.id.clone());
    let items: Vec<ListItem> = app
        .commands
        .iter()
        .map(|command| {
            let marker = if selected_id.as_deref() == Some(command.id.as_str()) { "● " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(marker, theme::key_style()),
                Span::raw(command.name.clone()),
            ]))
        })
        .collect();

    let block = Block::default()
        .title(Span::styled(tr(locale, "Commands", "Comandos"), theme::title_style()))
        .borders(Borders::ALL)
        .border_style(theme::border_style(app.focus == Focus::Commands));
    let list = List::new(items)
        .block(block)
        .style(theme::text_style())
        .highlight_style(theme::selection_style());
    f.render_stateful_widget(list, area, &mut app.command_state);
}

fn draw_command_panel(f: &mut Frame, app: &App, area: Rect) {
    let locale = app.locale();
    let Some(command) = app.controller.command() else {
        let hint = Paragraph::new(tr(
            locale,
            "Pick a command from the list and press Enter.",
            "Elige un comando de la lista y pulsa Enter.",
        ))
        .style(theme::text_muted())
        .block(Block::default().borders(Borders::ALL).border_style(theme::border_style(false)));
        f.render_widget(hint, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let description = Paragraph::new(command.description.clone())
        .style(theme::text_style())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(Span::styled(command.name.clone(), theme::title_style().fg(theme::ACCENT)))
                .borders(Borders::ALL)
                .border_style(theme::border_style(false)),
        );
    f.render_widget(description, chunks[0]);

    draw_form(f, app, chunks[1]);

    let enabled = app.controller.can_execute();
    let focused = app.focus == Focus::Trigger;
    let label = format!(" {} ", tr(locale, "Execute", "Ejecutar"));
    let trigger = Paragraph::new(Line::from(Span::styled(label, theme::trigger_style(enabled, focused))))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(theme::border_style(focused)));
    f.render_widget(trigger, chunks[2]);
}

fn draw_form(f: &mut Frame, app: &App, area: Rect) {
    let locale = app.locale();
    let form = app.controller.form();
    let block = Block::default()
        .title(Span::styled(tr(locale, "Parameters", "Parámetros"), theme::title_style()))
        .borders(Borders::ALL)
        .border_style(theme::border_style(app.focus == Focus::Form));

    if form.is_empty() {
        let empty = Paragraph::new(tr(
            locale,
            "This command has no parameters.",
            "Este comando no tiene parámetros.",
        ))
        .style(theme::text_muted())
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let mut lines = Vec::with_capacity(form.len() * 3);
    for (index, control) in form.iter().enumerate() {
        let focused = app.focus == Focus::Form && index == app.field_idx;
        let mut label = vec![Span::styled(
            if focused { "› " } else { "  " },
            theme::key_style(),
        )];
        label.push(Span::styled(control.label.clone(), theme::title_style()));
        if control.required {
            label.push(Span::styled(" *", theme::error_style()));
        }
        lines.push(Line::from(label));
        lines.push(Line::from(vec![Span::raw("    "), value_span(app, control, focused)]));
        if let Some(error) = &control.error {
            lines.push(Line::from(Span::styled(format!("    {error}"), theme::error_style())));
        }
    }

    let paragraph = Paragraph::new(lines).block(block).scroll((scroll_offset(app, &form, area), 0));
    f.render_widget(paragraph, area);
}

fn value_span<'a>(app: &App, control: &FormControl, focused: bool) -> Span<'a> {
    let locale = app.locale();
    let style = if focused { theme::selection_style() } else { theme::text_style() };
    let text = match &control.kind {
        ControlKind::YesNo { value } => {
            let yes = tr(locale, "Yes", "Sí");
            let no = tr(locale, "No", "No");
            match value {
                Some(true) => format!("(•) {yes}  ( ) {no}"),
                Some(false) => format!("( ) {yes}  (•) {no}"),
                None => format!("( ) {yes}  ( ) {no}"),
            }
        }
        ControlKind::Select { .. } => format!("‹ {} ›", control.display_value()),
        ControlKind::Text { masked: true, .. } => match app.draft(&control.param_id) {
            Some(draft) => "•".repeat(draft.chars().count()),
            None => control.display_value(),
        },
        ControlKind::Text { .. } | ControlKind::Number { .. } => app
            .draft(&control.param_id)
            .map(str::to_string)
            .unwrap_or_else(|| control.display_value()),
    };
    if text.is_empty() || text == "‹  ›" {
        let placeholder = control.placeholder.clone().unwrap_or_else(|| "…".into());
        return Span::styled(placeholder, theme::text_muted());
    }
    Span::styled(text, style)
}

/// Keep the focused field visible when the form is taller than its panel.
fn scroll_offset(app: &App, form: &[FormControl], area: Rect) -> u16 {
    let visible = area.height.saturating_sub(2);
    let rows_before: u16 = form
        .iter()
        .take(app.field_idx)
        .map(|control| if control.error.is_some() { 3 } else { 2 })
        .sum();
    (rows_before + 3).saturating_sub(visible)
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    if let Some(status) = &app.status {
        f.render_widget(Paragraph::new(Span::styled(status.clone(), theme::error_style())), area);
        return;
    }
    let locale = app.locale();
    let mut spans = Vec::new();
    let mut hint = |key: &'static str, text: &'static str| {
        spans.push(Span::styled(key, theme::key_style()));
        spans.push(Span::styled(format!(" {text}  "), theme::text_muted()));
    };
    hint("Tab", tr(locale, "focus", "foco"));
    match app.focus {
        Focus::Form => {
            hint("↑/↓", tr(locale, "field", "campo"));
            hint("←/→", tr(locale, "choose", "elegir"));
            hint("Del", tr(locale, "clear", "borrar"));
            hint("Enter", tr(locale, "execute", "ejecutar"));
        }
        _ => {
            hint("↑/↓", tr(locale, "move", "mover"));
            hint("Enter", tr(locale, "select", "seleccionar"));
            hint("q", tr(locale, "quit", "salir"));
        }
    }
    hint("F2", tr(locale, "language", "idioma"));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_confirmation_modal(f: &mut Frame, app: &App) {
    let locale = app.locale();
    let name = app.controller.command().map(|command| command.name.clone()).unwrap_or_default();
    let question = format!("{} \"{name}\"?", tr(locale, "Execute", "¿Ejecutar"));
    let lines = vec![
        Line::from(Span::styled(question, theme::text_style())),
        Line::default(),
        Line::from(vec![
            Span::styled("Enter/y", theme::key_style()),
            Span::styled(format!(" {}   ", tr(locale, "confirm", "confirmar")), theme::text_muted()),
            Span::styled("Esc/n", theme::key_style()),
            Span::styled(format!(" {}", tr(locale, "cancel", "cancelar")), theme::text_muted()),
        ]),
    ];
    draw_modal(f, tr(locale, "Confirm", "Confirmar"), lines, theme::ACCENT, 50, 7);
}

fn draw_executing_modal(f: &mut Frame, app: &App) {
    let locale = app.locale();
    let lines = vec![
        Line::from(vec![
            Span::styled(THROBBER[app.throbber_idx % THROBBER.len()], theme::key_style()),
            Span::styled(format!(" {}", tr(locale, "Executing…", "Ejecutando…")), theme::text_style()),
        ]),
        Line::default(),
        Line::from(vec![
            Span::styled("Esc", theme::key_style()),
            Span::styled(format!(" {}", tr(locale, "close", "cerrar")), theme::text_muted()),
        ]),
    ];
    draw_modal(f, tr(locale, "Working", "Procesando"), lines, theme::ACCENT, 40, 7);
}

fn draw_result_modal(f: &mut Frame, app: &App, success: bool, headline: &str, detail: &str) {
    let locale = app.locale();
    let (title, color) = if success {
        (tr(locale, "Success", "Éxito"), theme::OK)
    } else {
        (tr(locale, "Error", "Error"), theme::WARN)
    };
    let mut lines = vec![Line::from(Span::styled(headline.to_string(), Style::default().fg(color)))];
    if !detail.is_empty() {
        lines.push(Line::default());
        lines.extend(detail.lines().map(|line| Line::from(Span::styled(line.to_string(), theme::text_style()))));
    }
    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled("Enter", theme::key_style()),
        Span::styled(format!(" {}", tr(locale, "close", "cerrar")), theme::text_muted()),
    ]));
    let height = (lines.len() as u16 + 2).min(f.area().height);
    draw_modal(f, title, lines, color, 70, height);
}

fn draw_modal(f: &mut Frame, title: &str, lines: Vec<Line>, color: Color, width_percent: u16, height: u16) {
    let widest = lines.iter().map(|line| line.width()).max().unwrap_or(0) as u16;
    let area = centered_rect(width_percent, height, widest.max(title.width() as u16) + 4, f.area());
    let block = Block::default()
        .title(Span::styled(format!(" {title} "), theme::title_style().fg(color)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), area);
}

/// A box `height` rows tall and at least `min_width` columns wide (capped at
/// `percent_x` of the screen), centered in `r`.
fn centered_rect(percent_x: u16, height: u16, min_width: u16, r: Rect) -> Rect {
    let width = (r.width * percent_x / 100).max(min_width).min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::backend::TestBackend;
    use rconsole_engine::ExecutionController;
    use rconsole_registry::{CommandCatalog, InMemorySubsetStore};
    use rconsole_types::Locale;

    use super::*;

    fn rendered(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 32)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn renders_selected_command_form_and_confirmation() {
        let controller = ExecutionController::new(CommandCatalog::new(Locale::En));
        let mut app = App::new(controller, Arc::new(InMemorySubsetStore::new()), "ana", "Ana");
        app.controller.select_command(Some("vl_enable")).unwrap();
        let screen = rendered(&mut app);
        assert!(screen.contains("Enable volume license"));
        assert!(screen.contains("License key"));
        assert!(screen.contains("Execute"));

        app.controller
            .edit("licenseKey", rconsole_engine::FieldEdit::Text("ABC".into()))
            .unwrap();
        app.controller.submit().unwrap();
        assert!(rendered(&mut app).contains("Confirm"));
    }

    #[test]
    fn centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 80, 24);
        let rect = centered_rect(50, 7, 10, area);
        assert_eq!((rect.width, rect.height), (40, 7));
        assert_eq!(rect.x, 20);
        assert_eq!(centered_rect(50, 40, 200, area), area);
    }
}
