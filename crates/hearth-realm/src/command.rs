//! Parsing a line of player input into a [`Command`].

/// A parsed player action.
///
/// Parsing never fails: anything unrecognized becomes
/// [`Command::Unknown`] and the dispatcher answers it with the list of
/// supported verbs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `say <text>`. The text keeps its case; it may be empty.
    Say(String),
    /// `look` / `l`.
    Look,
    /// `who`.
    Who,
    /// `go <dir>`, `move <dir>`, or a bare direction. Always a full,
    /// lowercase direction name when it came from an abbreviation.
    Move(String),
    /// `attack <name>` / `kill <name>`.
    Attack(String),
    /// `inventory` / `i`.
    Inventory,
    /// `talk <name>`.
    Talk(String),
    /// Anything else. Carries the lowercased verb (empty for blank input).
    Unknown(String),
}

impl Command {
    /// Parses one line of input.
    ///
    /// The verb is matched case-insensitively; the rest of the line is
    /// trimmed but otherwise kept as typed.
    ///
    /// ```rust
    /// use hearth_realm::Command;
    ///
    /// assert_eq!(Command::parse("SAY Hello there"), Command::Say("Hello there".into()));
    /// assert_eq!(Command::parse("n"), Command::Move("north".into()));
    /// assert_eq!(Command::parse("go East"), Command::Move("east".into()));
    /// assert_eq!(Command::parse("dance"), Command::Unknown("dance".into()));
    /// ```
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let (verb, rest) = match input.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (input, ""),
        };
        let verb = verb.to_lowercase();

        if let Some(direction) = expand_direction(&verb) {
            return Self::Move(direction.to_string());
        }
        match verb.as_str() {
            "say" => Self::Say(rest.to_string()),
            "look" | "l" => Self::Look,
            "who" => Self::Who,
            "go" | "move" => {
                let direction = rest.to_lowercase();
                match expand_direction(&direction) {
                    Some(full) => Self::Move(full.to_string()),
                    None => Self::Move(direction),
                }
            }
            "attack" | "kill" => Self::Attack(rest.to_string()),
            "inventory" | "inv" | "i" => Self::Inventory,
            "talk" => Self::Talk(rest.to_string()),
            _ => Self::Unknown(verb),
        }
    }
}

/// Maps a direction or its one-letter abbreviation to the full name.
fn expand_direction(word: &str) -> Option<&'static str> {
    match word {
        "north" | "n" => Some("north"),
        "south" | "s" => Some("south"),
        "east" | "e" => Some("east"),
        "west" | "w" => Some("west"),
        "up" | "u" => Some("up"),
        "down" | "d" => Some("down"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_say_keeps_argument_case() {
        assert_eq!(
            Command::parse("Say  Hi, Bram!  "),
            Command::Say("Hi, Bram!".into())
        );
    }

    #[test]
    fn test_parse_say_without_text_is_empty_say() {
        assert_eq!(Command::parse("say"), Command::Say(String::new()));
    }

    #[test]
    fn test_parse_look_aliases() {
        assert_eq!(Command::parse("look"), Command::Look);
        assert_eq!(Command::parse("L"), Command::Look);
    }

    #[test]
    fn test_parse_bare_directions_and_abbreviations() {
        for (input, dir) in [
            ("north", "north"),
            ("S", "south"),
            ("e", "east"),
            ("West", "west"),
            ("u", "up"),
            ("down", "down"),
        ] {
            assert_eq!(Command::parse(input), Command::Move(dir.into()));
        }
    }

    #[test]
    fn test_parse_go_and_move_lowercase_direction() {
        assert_eq!(Command::parse("go NORTH"), Command::Move("north".into()));
        assert_eq!(Command::parse("move w"), Command::Move("west".into()));
        assert_eq!(
            Command::parse("go Portal"),
            Command::Move("portal".into()),
            "non-compass exits pass through lowercased"
        );
        assert_eq!(Command::parse("go"), Command::Move(String::new()));
    }

    #[test]
    fn test_parse_attack_and_kill_aliases() {
        assert_eq!(
            Command::parse("attack giant rat"),
            Command::Attack("giant rat".into())
        );
        assert_eq!(Command::parse("KILL Rat"), Command::Attack("Rat".into()));
    }

    #[test]
    fn test_parse_inventory_aliases() {
        assert_eq!(Command::parse("inventory"), Command::Inventory);
        assert_eq!(Command::parse("i"), Command::Inventory);
    }

    #[test]
    fn test_parse_talk_takes_name() {
        assert_eq!(
            Command::parse("talk Elder"),
            Command::Talk("Elder".into())
        );
    }

    #[test]
    fn test_parse_unknown_and_empty_input() {
        assert_eq!(Command::parse("Dance wildly"), Command::Unknown("dance".into()));
        assert_eq!(Command::parse("   "), Command::Unknown(String::new()));
    }
}
