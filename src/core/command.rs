//! Command parser for the : command system

use super::action::Tab;
use crate::domain::VoteChoice;

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Governance
    Create(String),
    Vote(u64, VoteChoice),
    Execute(u64),

    // Navigation
    Tab(Tab),
    Refresh,

    // Wallet
    Connect,
    Disconnect,

    Quit,

    // Unknown command
    Unknown(String),
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let mut parts = input.split_whitespace();
    let cmd = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();
    let unknown = || Command::Unknown(input.to_string());

    match (cmd.to_lowercase().as_str(), args.as_slice()) {
        ("create" | "new", [token_id]) => Command::Create(token_id.to_string()),
        ("vote", [id, side]) => match id.parse() {
            Ok(id) => Command::Vote(id, VoteChoice::from_label(&side.to_uppercase())),
            Err(_) => unknown(),
        },
        ("execute" | "exec", [id]) => id.parse().map(Command::Execute).unwrap_or_else(|_| unknown()),

        ("tab", [name]) => match name.to_lowercase().as_str() {
            "create" | "1" => Command::Tab(Tab::CreateProposal),
            "view" | "proposals" | "2" => Command::Tab(Tab::ViewProposals),
            _ => unknown(),
        },
        ("refresh" | "r", []) => Command::Refresh,

        ("connect" | "conn", []) => Command::Connect,
        ("disconnect", []) => Command::Disconnect,

        ("quit" | "q", []) => Command::Quit,

        _ => unknown(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_governance_commands() {
        assert_eq!(parse_command("create 12"), Command::Create("12".to_string()));
        assert_eq!(parse_command("vote 3 yay"), Command::Vote(3, VoteChoice::Yay));
        assert_eq!(parse_command("vote 3 NAY"), Command::Vote(3, VoteChoice::Nay));
        assert_eq!(parse_command("vote 3 maybe"), Command::Vote(3, VoteChoice::Nay));
        assert_eq!(parse_command("exec 0"), Command::Execute(0));
    }

    #[test]
    fn test_parse_navigation_commands() {
        assert_eq!(parse_command("tab view"), Command::Tab(Tab::ViewProposals));
        assert_eq!(parse_command("tab 1"), Command::Tab(Tab::CreateProposal));
        assert_eq!(parse_command("  refresh "), Command::Refresh);
        assert_eq!(parse_command("connect"), Command::Connect);
        assert_eq!(parse_command("q"), Command::Quit);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            parse_command("notacommand"),
            Command::Unknown("notacommand".to_string())
        );
        assert_eq!(
            parse_command("vote x yay"),
            Command::Unknown("vote x yay".to_string())
        );
        assert_eq!(parse_command("create"), Command::Unknown("create".to_string()));
    }
}
