//! Application shell: view state plus terminal input handling

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::{parse_command, reduce, Action, Command, NotifyLevel, Tab, ViewState};
use crate::domain::VoteChoice;
use crate::infrastructure::runtime::{RuntimeCommand, RuntimeEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the token id field of the create form
    TokenId,
    /// Typing a `:` command
    Command,
}

pub struct App {
    pub state: ViewState,
    pub input_mode: InputMode,
    pub command_input: String,
    pub should_quit: bool,
    pub help_open: bool,
    outbox: Vec<RuntimeCommand>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            state: ViewState::new(),
            input_mode: InputMode::Normal,
            command_input: String::new(),
            should_quit: false,
            help_open: false,
            outbox: Vec::new(),
        }
    }

    /// Run the reducer and queue the resulting commands for the worker
    pub fn dispatch(&mut self, action: Action) {
        let (next, commands) = reduce(&self.state, action);
        self.state = next;
        self.outbox.extend(commands);
    }

    pub fn apply_event(&mut self, event: RuntimeEvent) {
        self.dispatch(Action::Runtime(event));
    }

    /// Drain the commands queued since the last call
    pub fn take_commands(&mut self) -> Vec<RuntimeCommand> {
        std::mem::take(&mut self.outbox)
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: DateTime<Utc>) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key, now),
            InputMode::TokenId => self.handle_token_key(key),
            InputMode::Command => self.handle_command_key(key, now),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent, now: DateTime<Utc>) {
        if self.state.alert.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.dispatch(Action::DismissAlert);
            }
            return;
        }
        if self.help_open {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.help_open = false;
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.help_open = true,
            KeyCode::Char(':') => {
                self.input_mode = InputMode::Command;
                self.command_input.clear();
            }
            KeyCode::Char('1') => self.dispatch(Action::SelectTab(Tab::CreateProposal)),
            KeyCode::Char('2') => self.dispatch(Action::SelectTab(Tab::ViewProposals)),
            KeyCode::Tab => {
                let tab = match self.state.tab {
                    Tab::CreateProposal => Tab::ViewProposals,
                    _ => Tab::CreateProposal,
                };
                self.dispatch(Action::SelectTab(tab));
            }
            KeyCode::Char('c') => self.dispatch(Action::Connect),
            KeyCode::Char('d') => self.dispatch(Action::Disconnect),
            KeyCode::Char('r') => self.dispatch(Action::Refresh),
            KeyCode::Char('j') | KeyCode::Down => self.dispatch(Action::SelectNext),
            KeyCode::Char('k') | KeyCode::Up => self.dispatch(Action::SelectPrev),
            KeyCode::Char('e') | KeyCode::Char('i') if self.create_form_open() => {
                self.input_mode = InputMode::TokenId;
            }
            KeyCode::Enter if self.create_form_open() => self.dispatch(Action::SubmitProposal),
            KeyCode::Char('y') => self.vote_selected(VoteChoice::Yay, now),
            KeyCode::Char('n') => self.vote_selected(VoteChoice::Nay, now),
            KeyCode::Char('x') => {
                if let Some(proposal_id) = self.selected_row() {
                    self.dispatch(Action::Execute { proposal_id, now });
                }
            }
            _ => {}
        }
    }

    fn handle_token_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                self.dispatch(Action::SubmitProposal);
            }
            KeyCode::Backspace => self.dispatch(Action::TokenBackspace),
            KeyCode::Char(c) => self.dispatch(Action::TokenInput(c)),
            _ => {}
        }
    }

    fn handle_command_key(&mut self, key: KeyEvent, now: DateTime<Utc>) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.command_input.clear();
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                let input = std::mem::take(&mut self.command_input);
                self.run_command(parse_command(&input), now);
            }
            KeyCode::Backspace => {
                self.command_input.pop();
            }
            KeyCode::Char(c) => self.command_input.push(c),
            _ => {}
        }
    }

    pub fn run_command(&mut self, command: Command, now: DateTime<Utc>) {
        match command {
            Command::Create(token_id) => {
                self.dispatch(Action::SetTokenId(token_id));
                self.dispatch(Action::SubmitProposal);
            }
            Command::Vote(proposal_id, choice) => self.dispatch(Action::Vote {
                proposal_id,
                choice,
                now,
            }),
            Command::Execute(proposal_id) => self.dispatch(Action::Execute { proposal_id, now }),
            Command::Tab(tab) => self.dispatch(Action::SelectTab(tab)),
            Command::Refresh => self.dispatch(Action::Refresh),
            Command::Connect => self.dispatch(Action::Connect),
            Command::Disconnect => self.dispatch(Action::Disconnect),
            Command::Quit => self.should_quit = true,
            Command::Unknown(input) => {
                self.dispatch(Action::Notify(
                    format!("Unknown command: {input}"),
                    NotifyLevel::Warn,
                ));
            }
        }
    }

    fn vote_selected(&mut self, choice: VoteChoice, now: DateTime<Utc>) {
        if let Some(proposal_id) = self.selected_row() {
            self.dispatch(Action::Vote {
                proposal_id,
                choice,
                now,
            });
        }
    }

    /// Id of the highlighted proposal, when the list is on screen
    fn selected_row(&self) -> Option<u64> {
        if self.state.tab != Tab::ViewProposals || self.state.loading {
            return None;
        }
        self.state.selected_proposal().map(|p| p.id)
    }

    fn create_form_open(&self) -> bool {
        self.state.tab == Tab::CreateProposal && self.state.is_member() && !self.state.loading
    }
}
