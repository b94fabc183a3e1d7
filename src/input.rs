//! Translation from device tokens (key characters, typed words) to game commands.

use crate::engine::Direction;

/// One thing the player asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Restart,
    Quit,
}

impl Command {
    /// Map a single key to a command: `w/a/s/d` move, `y` restarts, `n`/`q` quit.
    ///
    /// ```
    /// use twenty48_rules::engine::Direction;
    /// use twenty48_rules::input::Command;
    /// assert_eq!(Command::from_key('a'), Some(Command::Move(Direction::Left)));
    /// assert_eq!(Command::from_key('x'), None);
    /// ```
    pub fn from_key(key: char) -> Option<Command> {
        match key.to_ascii_lowercase() {
            'w' => Some(Command::Move(Direction::Up)),
            'a' => Some(Command::Move(Direction::Left)),
            's' => Some(Command::Move(Direction::Down)),
            'd' => Some(Command::Move(Direction::Right)),
            'y' => Some(Command::Restart),
            'n' | 'q' => Some(Command::Quit),
            _ => None,
        }
    }
}

/// Whole-word command: a direction name, `yes`/`restart`, or `no`/`quit`/`exit`.
fn from_word(word: &str) -> Option<Command> {
    match word.to_ascii_lowercase().as_str() {
        "yes" | "restart" => Some(Command::Restart),
        "no" | "quit" | "exit" => Some(Command::Quit),
        other => other.parse::<Direction>().ok().map(Command::Move),
    }
}

/// Commands in a typed line. A recognised word is one command; otherwise
/// a string made only of command keys (`"ddw"`) is one command per key.
/// Anything else yields nothing.
pub fn parse_line(line: &str) -> Vec<Command> {
    let word = line.trim();
    if let Some(cmd) = from_word(word) {
        return vec![cmd];
    }
    word.chars().map(Command::from_key).collect::<Option<Vec<_>>>().unwrap_or_default()
}
