// Console command parsing.
//
//   post <line> | <line> ...   share up to five resolutions
//   sign <name> | sign --anon  choose how new posts are signed
//   list                       show the gallery
//   like <id>                  like a card (id prefix is enough)
//   delete <id>                remove a card (owner only)
//   help, quit

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Post(Vec<String>),
    /// `None` signs anonymously.
    Sign(Option<String>),
    List,
    Like(String),
    Delete(String),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command '{0}'. Type 'help' for the list of commands.")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "\
Commands:
  post <resolution> | <resolution> ...   share up to five resolutions
  sign <name>                            sign new posts with a name
  sign --anon                            post anonymously
  list                                   show the gallery
  like <id>                              like a card
  delete <id>                            remove a card (owner only)
  help                                   show this help
  quit                                   leave";

pub fn parse(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "post" | "add" => Ok(Command::Post(
            rest.split('|').map(|part| part.to_string()).collect(),
        )),
        "sign" => match rest {
            "" => Err(ParseError::Usage("sign <name> | sign --anon")),
            "--anon" | "-a" => Ok(Command::Sign(None)),
            name => Ok(Command::Sign(Some(name.to_string()))),
        },
        "list" | "ls" => Ok(Command::List),
        "like" => single_argument(rest, "like <id>").map(Command::Like),
        "delete" | "rm" => single_argument(rest, "delete <id>").map(Command::Delete),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        _ => Err(ParseError::Unknown(word.to_string())),
    }
}

fn single_argument(rest: &str, usage: &'static str) -> Result<String, ParseError> {
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(arg), None) => Ok(arg.to_string()),
        _ => Err(ParseError::Usage(usage)),
    }
}
