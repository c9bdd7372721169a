use crate::state::{App, Pane};
use crate::theme::{icons, zebra_row_style};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use tfviz_core::detail::{ResourceDetail, NO_SELECTION};
use tfviz_core::label::resource_label;

const HELP: &str =
    "q: quit | tab/←/→: switch panes | ↑/↓ j/k: navigate | PgUp/PgDn: scroll details";

pub fn render(f: &mut Frame, app: &mut App) {
    let area = f.size();
    if app.width == 0 {
        f.render_widget(Paragraph::new("Initializing..."), area);
        return;
    }

    let mut constraints = vec![Constraint::Length(1), Constraint::Min(3)];
    if app.config.show_help {
        constraints.push(Constraint::Length(1));
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    render_header(f, app, rows[0]);

    let layout = app.config.layout;
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(layout.group_percent),
            Constraint::Percentage(layout.resource_percent),
            Constraint::Percentage(layout.detail_percent()),
        ])
        .split(rows[1]);

    render_groups(f, app, panes[0]);
    render_resources(f, app, panes[1]);
    render_details(f, app, panes[2]);

    if app.config.show_help {
        let help = Paragraph::new(Span::styled(HELP, app.config.theme.muted));
        f.render_widget(help, rows[2]);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.config.theme;
    let version = if app.state.terraform_version.is_empty() {
        "unknown".to_string()
    } else {
        app.state.terraform_version.clone()
    };
    let line = Line::from(vec![
        Span::styled("tfviz ", theme.header),
        Span::styled(
            format!(
                "terraform {} | serial {} | {} resources in {} groups",
                version,
                app.state.serial,
                app.state.resources.len(),
                app.group_keys.len()
            ),
            theme.muted,
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn pane_block(app: &App, title: &'static str, pane: Pane) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(app.config.theme.border(app.focus == pane))
}

fn render_groups(f: &mut Frame, app: &mut App, area: Rect) {
    let block = pane_block(app, "Groups", Pane::Groups);
    let theme = app.config.theme;

    if app.group_keys.is_empty() {
        let p = Paragraph::new(Span::styled("No resources in snapshot", theme.muted))
            .block(block)
            .wrap(Wrap { trim: true });
        f.render_widget(p, area);
        return;
    }

    let items: Vec<ListItem> = app
        .tree
        .groups()
        .iter()
        .zip(&app.group_keys)
        .enumerate()
        .map(|(idx, (node_id, key))| {
            let label = app
                .tree
                .node(*node_id)
                .map(|node| node.label.as_str())
                .unwrap_or(key.as_str());
            let count = app.groups.get(key).map_or(0, |g| g.resources.len());
            let mut spans = vec![Span::raw(label.to_string())];
            if key != label {
                spans.push(Span::styled(format!(" {key}"), theme.muted));
            }
            spans.push(Span::raw(format!(" ({count})")));
            ListItem::new(Line::from(spans)).style(zebra_row_style(idx))
        })
        .collect();

    app.group_list.select(Some(app.group_cursor));
    let list = List::new(items)
        .block(block)
        .highlight_style(theme.selected)
        .highlight_symbol(icons::CURSOR);
    f.render_stateful_widget(list, area, &mut app.group_list);
}

fn render_resources(f: &mut Frame, app: &mut App, area: Rect) {
    let block = pane_block(app, "Resources", Pane::Resources);
    let theme = app.config.theme;

    let items: Vec<ListItem> = app
        .resource_nodes()
        .iter()
        .filter_map(|id| app.tree.node(*id))
        .enumerate()
        .map(|(idx, node)| {
            let mut spans = vec![Span::raw(node.label.clone())];
            if let Some(res) = &node.resource {
                spans.push(Span::styled(format!("  {}", resource_label(res)), theme.muted));
            }
            ListItem::new(Line::from(spans)).style(zebra_row_style(idx))
        })
        .collect();

    if items.is_empty() {
        app.resource_list.select(None);
    } else {
        app.resource_list.select(Some(app.resource_cursor));
    }
    let list = List::new(items)
        .block(block)
        .highlight_style(theme.selected)
        .highlight_symbol(icons::CURSOR);
    f.render_stateful_widget(list, area, &mut app.resource_list);
}

fn render_details(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Details");
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let lines = match app.detail() {
        Some(detail) => detail_lines(app, &detail),
        None => vec![Line::from(Span::styled(NO_SELECTION, app.config.theme.muted))],
    };

    let p = Paragraph::new(lines).wrap(Wrap { trim: false });
    let total_height = p.line_count(inner_area.width).min(u16::MAX as usize) as u16;
    app.set_detail_max_scroll(total_height.saturating_sub(inner_area.height));
    f.render_widget(p.scroll((app.detail_scroll, 0)), inner_area);
}

fn detail_lines(app: &App, detail: &ResourceDetail) -> Vec<Line<'static>> {
    let theme = &app.config.theme;
    let mut lines = vec![
        Line::from(Span::styled(
            format!("Details for: {}", detail.address),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    lines.extend(detail.summary.iter().cloned().map(Line::from));
    lines.push(Line::from(vec![
        Span::styled("Provider: ", theme.muted),
        Span::raw(detail.provider.clone()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Mode: ", theme.muted),
        Span::raw(detail.mode.clone()),
    ]));

    for (title, icon, addresses) in [
        ("Depends on:", icons::DEPENDS_ON, &detail.depends_on),
        ("Required by:", icons::REQUIRED_BY, &detail.required_by),
    ] {
        if addresses.is_empty() {
            continue;
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(title, theme.section)));
        for address in addresses {
            lines.push(Line::from(vec![
                Span::styled(format!("{icon} "), theme.muted),
                Span::styled(address.clone(), theme.link),
            ]));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Attributes:", theme.section)));
    for block in &detail.attributes {
        if let Some(heading) = &block.heading {
            lines.push(Line::from(Span::styled(heading.clone(), theme.link)));
        }
        lines.extend(block.body.lines().map(|line| Line::from(line.to_string())));
    }
    lines
}
