//! Chart panel card: title row, tab/action bar, and the active pane.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::cache_pane::CachePaneState;
use crate::config::Theme;
use crate::panel::{ActivePane, ChartPanel, PanelProps, RenderFn, RenderRequest, ViewMode};
use crate::sql::SqlPaneState;

/// Render the full panel card. The chart pane body is delegated to the
/// caller-supplied render callback.
#[allow(clippy::too_many_arguments)]
pub fn render_chart_panel(
    area: Rect,
    buf: &mut Buffer,
    panel: &ChartPanel,
    props: &PanelProps,
    theme: &Theme,
    error: Option<&str>,
    has_dashboard: bool,
    render: &RenderFn,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title row
            Constraint::Length(1), // Tab/action bar
            Constraint::Fill(1),   // Pane body
        ])
        .split(area);

    render_title_row(layout[0], buf, panel, props, theme);
    render_tab_bar(layout[1], buf, panel, props, theme, has_dashboard);
    render_pane(layout[2], buf, panel, props, theme, error, render);
}

fn pane_title(pane: ActivePane) -> &'static str {
    match pane {
        ActivePane::Code => "Code",
        ActivePane::Query => "Query",
        ActivePane::Sql => "SQL",
        ActivePane::Cache => "Cache",
        ActivePane::Chart | ActivePane::Unsupported(_) => "Chart",
    }
}

fn render_title_row(
    area: Rect,
    buf: &mut Buffer,
    panel: &ChartPanel,
    props: &PanelProps,
    theme: &Theme,
) {
    let selection = format!(
        " {} · {} · {} ",
        pane_title(panel.active_pane()),
        panel.framework.title(),
        props.library_title().unwrap_or(&props.charting_library),
    );
    Paragraph::new(selection)
        .style(
            Style::default()
                .fg(theme.get("text_primary"))
                .bg(theme.get("controls_bg")),
        )
        .render(area, buf);
}

fn render_tab_bar(
    area: Rect,
    buf: &mut Buffer,
    panel: &ChartPanel,
    props: &PanelProps,
    theme: &Theme,
    has_dashboard: bool,
) {
    let tabs: [(&str, &str, ViewMode); 5] = [
        ("1", "Chart", ViewMode::Chart),
        ("2", "JSON Query", ViewMode::Query),
        ("3", "Code", ViewMode::Code),
        ("4", "SQL", ViewMode::Sql),
        ("5", "Cache", ViewMode::Cache),
    ];
    let dashboard_label = panel.dashboard.label();
    let mut actions: Vec<(&str, String)> = vec![
        ("f", format!("Framework: {}", panel.framework.title())),
        (
            "l",
            format!(
                "Library: {}",
                props.library_title().unwrap_or(&props.charting_library)
            ),
        ),
        ("y", "Copy".to_string()),
        ("e", "Sandbox".to_string()),
    ];
    if has_dashboard {
        actions.push(("d", dashboard_label.to_string()));
    }
    actions.push(("q", "Quit".to_string()));

    let mut constraints = Vec::new();
    for (key, action, _) in tabs.iter() {
        constraints.push(Constraint::Length(key.chars().count() as u16 + 2));
        constraints.push(Constraint::Length(action.chars().count() as u16 + 1));
    }
    for (key, action) in actions.iter() {
        constraints.push(Constraint::Length(key.chars().count() as u16 + 2));
        constraints.push(Constraint::Length(action.chars().count() as u16 + 1));
    }
    constraints.push(Constraint::Fill(1));

    let layout = Layout::new(Direction::Horizontal, constraints).split(area);
    let bg = theme.get("controls_bg");

    // Tab buttons are disabled while the framework is unsupported; the
    // informational pane overrides the selection anyway.
    let supported = panel.framework.supported();
    let base_style = if supported {
        Style::default()
    } else {
        Style::default().fg(theme.get("dimmed"))
    };

    let mut idx = 0;
    for (key, action, mode) in tabs.iter() {
        Paragraph::new(*key)
            .style(base_style.bold())
            .centered()
            .render(layout[idx], buf);
        let action_style = if supported && panel.view_mode == *mode {
            base_style.bg(bg).fg(theme.get("primary"))
        } else {
            base_style.bg(bg)
        };
        Paragraph::new(*action)
            .style(action_style)
            .render(layout[idx + 1], buf);
        idx += 2;
    }

    for (key, action) in actions.iter() {
        Paragraph::new(*key)
            .style(Style::default().bold())
            .centered()
            .render(layout[idx], buf);
        Paragraph::new(action.as_str())
            .style(Style::default().bg(bg))
            .render(layout[idx + 1], buf);
        idx += 2;
    }

    Paragraph::new("")
        .style(Style::default().bg(bg))
        .render(layout[idx], buf);
}

fn render_pane(
    area: Rect,
    buf: &mut Buffer,
    panel: &ChartPanel,
    props: &PanelProps,
    theme: &Theme,
    error: Option<&str>,
    render: &RenderFn,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.get("panel_border")));
    let inner = block.inner(area);
    block.render(area, buf);

    match panel.active_pane() {
        ActivePane::Unsupported(framework) => {
            let lines = vec![
                Line::from(""),
                Line::from(format!(
                    "We do not support {} code generation here yet.",
                    framework.title()
                )),
                Line::from(format!(
                    "Please refer to the {} docs to see how to use it with the playground:",
                    framework.title()
                )),
                Line::from(framework.docs_link().unwrap_or_default().to_string())
                    .style(Style::default().fg(theme.get("primary"))),
            ];
            Paragraph::new(lines)
                .centered()
                .wrap(Wrap { trim: true })
                .render(inner, buf);
        }
        ActivePane::Code => {
            let text = match panel.bundle() {
                Some(bundle) => bundle.code.text(),
                None => "Waiting for the chart renderer...".to_string(),
            };
            Paragraph::new(text)
                .style(Style::default().fg(theme.get("text_primary")))
                .render(inner, buf);
        }
        ActivePane::Query => {
            Paragraph::new(ChartPanel::query_text(props))
                .style(Style::default().fg(theme.get("text_primary")))
                .render(inner, buf);
        }
        ActivePane::Sql => {
            let (text, color) = match &panel.sql {
                SqlPaneState::Idle | SqlPaneState::Loading => {
                    ("Loading SQL...".to_string(), theme.get("text_secondary"))
                }
                SqlPaneState::Loaded(sql) => (sql.clone(), theme.get("text_primary")),
                SqlPaneState::Failed(e) => (e.clone(), theme.get("error")),
            };
            Paragraph::new(text)
                .style(Style::default().fg(color))
                .render(inner, buf);
        }
        ActivePane::Cache => render_cache_pane(inner, buf, &panel.cache, theme),
        ActivePane::Chart => render(
            RenderRequest::Chart {
                framework: panel.framework,
                error,
            },
            inner,
            buf,
        ),
    }
}

fn render_cache_pane(area: Rect, buf: &mut Buffer, state: &CachePaneState, theme: &Theme) {
    match state {
        CachePaneState::Idle => {
            Paragraph::new("Inspecting cache...")
                .style(Style::default().fg(theme.get("text_secondary")))
                .render(area, buf);
        }
        CachePaneState::Failed(e) => {
            Paragraph::new(e.as_str())
                .style(Style::default().fg(theme.get("error")))
                .render(area, buf);
        }
        CachePaneState::Loaded(report) => {
            let status = if report.hit { "Hit" } else { "Miss" };
            let mut lines = vec![
                Line::from(format!("Cache key:       {}", report.cache_key)),
                Line::from(format!("Status:          {}", status)),
            ];
            if let Some(pre_agg) = &report.pre_aggregation {
                lines.push(Line::from(format!("Pre-aggregation: {}", pre_agg)));
            }
            if let Some(age) = report.age_seconds {
                let age = chrono::Duration::seconds(age);
                lines.push(Line::from(format!(
                    "Age:             {}m {}s",
                    age.num_minutes(),
                    age.num_seconds() % 60
                )));
            }
            Paragraph::new(lines)
                .style(Style::default().fg(theme.get("text_primary")))
                .render(area, buf);
        }
    }
}
