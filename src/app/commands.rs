use crate::utils::error::LocatorError;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    List,
    Map,
}

/// Everything a user can do with the locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    Search(String),
    View(ViewMode),
    Locate,
    /// 1-based position within the currently visible list.
    Open(usize),
    Close,
    Reload,
    Help,
    Quit,
}

pub const HELP_TEXT: &str = "\
Commands:
  next | n               load the next page
  prev | p               load the previous page
  search <text> | s      filter by name, city or street (empty clears)
  view list|map          switch between list and map view
  locate | l             sort by distance from your location
  open <n> | o <n>       show details for the n-th listed branch
  close | c              close the detail view
  reload | r             fetch the current page again
  help | h               show this help
  quit | q               exit";

impl FromStr for Command {
    type Err = LocatorError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let (word, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (trimmed, ""),
        };

        let invalid = |reason: &str| LocatorError::InvalidCommand {
            input: trimmed.to_string(),
            reason: reason.to_string(),
        };

        match word.to_lowercase().as_str() {
            "next" | "n" => Ok(Command::Next),
            "prev" | "previous" | "p" => Ok(Command::Previous),
            "search" | "s" | "/" => Ok(Command::Search(rest.to_string())),
            "view" | "v" => match rest.to_lowercase().as_str() {
                "list" => Ok(Command::View(ViewMode::List)),
                "map" => Ok(Command::View(ViewMode::Map)),
                _ => Err(invalid("expected 'list' or 'map'")),
            },
            "list" => Ok(Command::View(ViewMode::List)),
            "map" => Ok(Command::View(ViewMode::Map)),
            "locate" | "l" => Ok(Command::Locate),
            "open" | "o" => rest
                .parse::<usize>()
                .ok()
                .filter(|n| *n >= 1)
                .map(Command::Open)
                .ok_or_else(|| invalid("expected a branch number starting at 1")),
            "close" | "c" => Ok(Command::Close),
            "reload" | "r" => Ok(Command::Reload),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            "" => Err(invalid("empty command")),
            _ => Err(invalid("unknown command")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation() {
        assert_eq!("next".parse::<Command>().unwrap(), Command::Next);
        assert_eq!(" P ".parse::<Command>().unwrap(), Command::Previous);
        assert_eq!("reload".parse::<Command>().unwrap(), Command::Reload);
    }

    #[test]
    fn test_parse_search_keeps_inner_spaces() {
        assert_eq!(
            "search  Spring Branch ".parse::<Command>().unwrap(),
            Command::Search("Spring Branch".to_string())
        );
        assert_eq!("search".parse::<Command>().unwrap(), Command::Search(String::new()));
    }

    #[test]
    fn test_parse_view() {
        assert_eq!("view map".parse::<Command>().unwrap(), Command::View(ViewMode::Map));
        assert_eq!("list".parse::<Command>().unwrap(), Command::View(ViewMode::List));
        assert!("view globe".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_open() {
        assert_eq!("open 3".parse::<Command>().unwrap(), Command::Open(3));
        assert!("open 0".parse::<Command>().is_err());
        assert!("open x".parse::<Command>().is_err());
    }

    #[test]
    fn test_unknown_command() {
        let err = "dance".parse::<Command>().unwrap_err();
        assert!(matches!(err, LocatorError::InvalidCommand { .. }));
        assert!("".parse::<Command>().is_err());
    }
}
