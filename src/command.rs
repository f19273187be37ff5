/// One line of input from the interactive browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    More,
    All,
    Search(String),
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        match word {
            "" | "more" | "m" | "n" => Command::More,
            "all" => Command::All,
            "search" | "s" | "/" => Command::Search(rest.to_string()),
            "help" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            _ => match line.strip_prefix('/') {
                Some(query) => Command::Search(query.trim().to_string()),
                None => Command::Unknown(line.to_string()),
            },
        }
    }
}

pub const HELP: &str = "\
commands:
  <enter> | more     load the next page
  all                load every remaining page
  search <text>      start a new search (empty text lists everyone)
  /<text>            shorthand for search
  quit               leave";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_loads_more() {
        assert_eq!(Command::parse(""), Command::More);
        assert_eq!(Command::parse("   "), Command::More);
        assert_eq!(Command::parse("more"), Command::More);
    }

    #[test]
    fn search_variants() {
        assert_eq!(Command::parse("search luke"), Command::Search("luke".into()));
        assert_eq!(
            Command::parse("search  darth vader "),
            Command::Search("darth vader".into())
        );
        assert_eq!(Command::parse("/ leia"), Command::Search("leia".into()));
        assert_eq!(Command::parse("/leia"), Command::Search("leia".into()));
        assert_eq!(Command::parse("search"), Command::Search(String::new()));
    }

    #[test]
    fn other_commands() {
        assert_eq!(Command::parse("all"), Command::All);
        assert_eq!(Command::parse("q"), Command::Quit);
        assert_eq!(Command::parse("?"), Command::Help);
        assert_eq!(Command::parse("jump 3"), Command::Unknown("jump 3".into()));
    }
}
