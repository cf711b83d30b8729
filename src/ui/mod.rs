use chrono::{DateTime, Utc};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

pub mod layout;
pub mod tabs;

use crate::app::{App, InputMode};
use crate::core::NotifyLevel;
use crate::domain::{network_name, short_hex};

pub fn draw(f: &mut Frame, app: &App, now: DateTime<Utc>) {
    let areas = layout::areas(f.size());

    draw_header(f, areas.header, app);
    draw_overview(f, areas.overview, app);
    tabs::draw_tab_bar(f, areas.tab_bar, app);
    tabs::draw_body(f, areas.body, app, now);
    draw_status_line(f, areas.status_line, app);
    draw_command_line(f, areas.command_line, app);

    if app.help_open {
        draw_help_popup(f, areas.size);
    }
    if let Some(alert) = app.state.alert.as_deref() {
        draw_alert_popup(f, areas.size, alert);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let state = &app.state;
    let title = Line::from(vec![
        Span::styled(
            "DAO Dashboard",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("RPC", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(
            " {} ",
            state.endpoint.as_deref().unwrap_or("--")
        )),
        Span::styled("Network", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(
            " {}",
            state
                .chain_id
                .map(network_name)
                .unwrap_or_else(|| "--".to_string())
        )),
    ]);

    let left = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    let (dot, wallet) = if state.wallet_connected {
        let account = state
            .account
            .map(|a| short_hex(&a.to_string()))
            .unwrap_or_else(|| "read-only".to_string());
        (Span::styled("●", Style::default().fg(Color::Green)), account)
    } else {
        (
            Span::styled("●", Style::default().fg(Color::Red)),
            "not connected (c)".to_string(),
        )
    };
    let right = Paragraph::new(Line::from(vec![
        dot,
        Span::raw(" "),
        Span::styled("Wallet ", Style::default().fg(Color::DarkGray)),
        Span::raw(wallet),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Left);

    f.render_widget(left, chunks[0]);
    f.render_widget(right, chunks[1]);
}

fn draw_overview(f: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let label = Style::default().fg(Color::DarkGray);
    let lines = vec![
        Line::from(vec![
            Span::styled(" Your membership NFT balance: ", label),
            Span::raw(state.membership_balance.to_string()),
        ]),
        Line::from(vec![
            Span::styled(" Treasury balance: ", label),
            Span::raw(format!("{} ETH", state.treasury_ether())),
        ]),
        Line::from(vec![
            Span::styled(" Total number of proposals: ", label),
            Span::raw(state.proposal_count.to_string()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title("Welcome to the DAO!");
    f.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let line = match app.state.notice.as_ref() {
        Some(notice) => {
            let color = match notice.level {
                NotifyLevel::Info => Color::LightGreen,
                NotifyLevel::Warn => Color::LightYellow,
                NotifyLevel::Error => Color::LightRed,
            };
            Line::from(vec![
                Span::styled("msg: ", Style::default().fg(Color::DarkGray)),
                Span::styled(notice.text.clone(), Style::default().fg(color)),
            ])
        }
        None => Line::from(""),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_command_line(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Command => Line::from(vec![
            Span::styled(": ", Style::default().fg(Color::Yellow)),
            Span::raw(app.command_input.clone()),
            Span::styled(
                "  create <id> | vote <id> <yay|nay> | execute <id> | tab <create|view> | refresh",
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        InputMode::TokenId => Line::from(vec![
            Span::styled("> token id ", Style::default().fg(Color::LightCyan)),
            Span::styled(
                "digits, Enter=create Esc=cancel",
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        InputMode::Normal => action_hints(),
    };

    let paragraph = Paragraph::new(content).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

fn action_hints() -> Line<'static> {
    let key = Style::default().fg(Color::Yellow);
    let text = Style::default().fg(Color::DarkGray);
    Line::from(vec![
        Span::styled("1/2", key),
        Span::styled(" tabs  ", text),
        Span::styled("j/k", key),
        Span::styled(" select  ", text),
        Span::styled("r", key),
        Span::styled(" refresh  ", text),
        Span::styled("c/d", key),
        Span::styled(" connect/disconnect  ", text),
        Span::styled(":", key),
        Span::styled(" command  ", text),
        Span::styled("?", key),
        Span::styled(" help  ", text),
        Span::styled("q", key),
        Span::styled(" quit", text),
    ])
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = layout::centered_rect(60, 60, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from("Navigation"),
        Line::from("  1 / 2 / Tab  Create Proposal / View Proposals"),
        Line::from("  j / k        Move selection"),
        Line::from("  r            Refresh"),
        Line::from("  Esc          Close"),
        Line::from(""),
        Line::from("Governance"),
        Line::from("  e            Edit token id (Create)"),
        Line::from("  Enter        Create proposal (Create)"),
        Line::from("  y / n        Vote YAY / NAY (View)"),
        Line::from("  x            Execute proposal (View)"),
        Line::from(""),
        Line::from("Wallet"),
        Line::from("  c / d        Connect / disconnect"),
        Line::from(""),
        Line::from("  :            Command line"),
        Line::from("  ?            Toggle help"),
        Line::from("  q            Quit"),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, popup_area);
}

fn draw_alert_popup(f: &mut Frame, area: Rect, alert: &str) {
    let popup_area = layout::centered_rect(50, 30, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            alert.to_string(),
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Switch the wallet's network, then press c to reconnect. Esc to dismiss.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title("Network")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}
