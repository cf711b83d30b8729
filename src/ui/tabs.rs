//! Tab bar and the two tab bodies

use chrono::{DateTime, Local, Utc};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs as RataTabs};
use ratatui::Frame;

use crate::app::{App, InputMode};
use crate::core::{Tab, ViewState};
use crate::domain::{Proposal, RowMode};

pub const LOADING_TEXT: &str = "Loading... Waiting for transaction...";
pub const NOT_A_MEMBER_TEXT: &str = "You do not own any membership NFTs.";
pub const NOT_A_MEMBER_DETAIL: &str = "You cannot create or vote on proposals";
pub const NO_PROPOSALS_TEXT: &str = "No proposals have been created";

/// What the create tab shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateView {
    Loading,
    NotAMember,
    Form { token_id: String, editing: bool },
}

pub fn create_view(state: &ViewState, input_mode: InputMode) -> CreateView {
    if state.loading {
        CreateView::Loading
    } else if !state.is_member() {
        CreateView::NotAMember
    } else {
        CreateView::Form {
            token_id: state.candidate_token_id.clone(),
            editing: input_mode == InputMode::TokenId,
        }
    }
}

/// What the proposals tab shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalsView<'a> {
    Loading,
    Empty,
    Rows(Vec<(&'a Proposal, RowMode)>),
}

pub fn proposals_view(state: &ViewState, now: DateTime<Utc>) -> ProposalsView<'_> {
    if state.loading {
        ProposalsView::Loading
    } else if state.proposals.is_empty() {
        ProposalsView::Empty
    } else {
        ProposalsView::Rows(
            state
                .proposals
                .iter()
                .map(|p| (p, p.row_mode(now)))
                .collect(),
        )
    }
}

/// Draw the tab bar
pub fn draw_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = Tab::SELECTABLE
        .iter()
        .map(|tab| {
            Line::from(vec![
                Span::styled(
                    format!("{}:", tab.shortcut()),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(tab.title()),
            ])
        })
        .collect();

    let mut tabs = RataTabs::new(titles)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" │ ");
    if let Some(selected) = Tab::SELECTABLE.iter().position(|t| *t == app.state.tab) {
        tabs = tabs.select(selected);
    }

    f.render_widget(tabs, area);
}

pub fn draw_body(f: &mut Frame, area: Rect, app: &App, now: DateTime<Utc>) {
    match app.state.tab {
        Tab::None => {
            let hint = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    " Press 1 to create a proposal or 2 to view proposals",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .block(Block::default().borders(Borders::ALL));
            f.render_widget(hint, area);
        }
        Tab::CreateProposal => draw_create_tab(f, area, app),
        Tab::ViewProposals => draw_proposals_tab(f, area, app, now),
    }
}

fn draw_create_tab(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Tab::CreateProposal.title());

    let lines = match create_view(&app.state, app.input_mode) {
        CreateView::Loading => vec![Line::from(""), description(LOADING_TEXT)],
        CreateView::NotAMember => vec![
            Line::from(""),
            description(NOT_A_MEMBER_TEXT),
            Line::from(Span::styled(
                format!(" {NOT_A_MEMBER_DETAIL}"),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )),
        ],
        CreateView::Form { token_id, editing } => {
            let input_style = if editing {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            };
            let shown = if token_id.is_empty() && !editing {
                "0".to_string()
            } else {
                token_id
            };
            vec![
                Line::from(""),
                Line::from(vec![
                    Span::raw(" NFT Token ID to Purchase: "),
                    Span::styled(format!(" {shown:<12}"), input_style),
                ]),
                Line::from(""),
                Line::from(vec![
                    Span::styled(" [e]", Style::default().fg(Color::Yellow)),
                    Span::raw(" Edit  "),
                    Span::styled("[Enter]", Style::default().fg(Color::Yellow)),
                    Span::raw(" Create"),
                ]),
            ]
        }
    };

    f.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

fn draw_proposals_tab(f: &mut Frame, area: Rect, app: &App, now: DateTime<Utc>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Tab::ViewProposals.title());

    let rows = match proposals_view(&app.state, now) {
        ProposalsView::Loading => {
            let text = vec![Line::from(""), description(LOADING_TEXT)];
            f.render_widget(Paragraph::new(text).block(block), area);
            return;
        }
        ProposalsView::Empty => {
            let text = vec![Line::from(""), description(NO_PROPOSALS_TEXT)];
            f.render_widget(Paragraph::new(text).block(block), area);
            return;
        }
        ProposalsView::Rows(rows) => rows,
    };

    let member = app.state.is_member();
    let items: Vec<ListItem> = rows
        .into_iter()
        .map(|(proposal, mode)| ListItem::new(proposal_card(proposal, mode, member)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Rgb(30, 40, 60)))
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default();
    list_state.select(Some(app.state.selected));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn proposal_card(p: &Proposal, mode: RowMode, member: bool) -> Text<'static> {
    let label = Style::default().fg(Color::DarkGray);
    let deadline = p.deadline.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");

    let action = match mode {
        RowMode::Executed => Line::from(Span::styled(
            "Proposal Executed",
            Style::default().fg(Color::LightGreen),
        )),
        // Voting and executing are membership-gated
        _ if !member => Line::from(Span::styled(
            NOT_A_MEMBER_DETAIL,
            Style::default().fg(Color::LightRed),
        )),
        RowMode::Voting => Line::from(vec![
            Span::styled("[y]", Style::default().fg(Color::Yellow)),
            Span::raw(" Vote YAY  "),
            Span::styled("[n]", Style::default().fg(Color::Yellow)),
            Span::raw(" Vote NAY"),
        ]),
        RowMode::Executable { outcome } => Line::from(vec![
            Span::styled("[x]", Style::default().fg(Color::Yellow)),
            Span::raw(format!(" Execute Proposal ({outcome})")),
        ]),
    };

    Text::from(vec![
        Line::from(vec![
            Span::styled("Proposal ID: ", label),
            Span::styled(
                p.id.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled("   NFT to Purchase: ", label),
            Span::raw(p.nft_token_id.clone()),
        ]),
        Line::from(vec![
            Span::styled("Deadline: ", label),
            Span::raw(deadline.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Yay Votes: ", label),
            Span::raw(p.yay_votes.to_string()),
            Span::styled("   Nay Votes: ", label),
            Span::raw(p.nay_votes.to_string()),
            Span::styled("   Executed?: ", label),
            Span::raw(p.executed.to_string()),
        ]),
        action,
        Line::from(""),
    ])
}

fn description(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        format!(" {text}"),
        Style::default().fg(Color::White),
    ))
}
