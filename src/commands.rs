/// Available commands and autocomplete logic

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "home",
    aliases: &["h", "dashboard"],
    description: "Home dashboard with charts and task table",
  },
  Command {
    name: "board",
    aliases: &["b"],
    description: "Task board for the default project",
  },
  Command {
    name: "projects",
    aliases: &["p", "proj"],
    description: "Browse projects",
  },
  Command {
    name: "search",
    aliases: &["s", "find"],
    description: "Search tasks, projects and users",
  },
  Command {
    name: "theme",
    aliases: &["dark"],
    description: "Toggle dark mode",
  },
  Command {
    name: "sidebar",
    aliases: &["sb"],
    description: "Toggle the project sidebar",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit taskdeck",
  },
];

/// How well a command matches the typed input. Lower is better; None means
/// no match at all.
fn match_score(cmd: &Command, input: &str) -> Option<u32> {
  if cmd.name == input {
    return Some(0);
  }
  if cmd.aliases.contains(&input) {
    return Some(1);
  }
  if cmd.name.starts_with(input) {
    return Some(2);
  }
  if cmd.aliases.iter().any(|a| a.starts_with(input)) {
    return Some(3);
  }
  if cmd.name.contains(input) {
    return Some(4);
  }
  if cmd.aliases.iter().any(|a| a.contains(input)) {
    return Some(5);
  }
  None
}

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input = input.trim().to_lowercase();

  if input.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = COMMANDS
    .iter()
    .filter_map(|cmd| match_score(cmd, &input).map(|score| (cmd, score)))
    .collect();

  matches.sort_by_key(|(_, score)| *score);
  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match_ranks_first() {
    let suggestions = get_suggestions("board");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "board");
  }

  #[test]
  fn test_alias_match() {
    let suggestions = get_suggestions("p");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "projects");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("proj");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "projects");
  }

  #[test]
  fn test_fuzzy_match() {
    let suggestions = get_suggestions("oard");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "board");
  }

  #[test]
  fn test_no_match() {
    assert!(get_suggestions("xyzzy").is_empty());
  }
}
