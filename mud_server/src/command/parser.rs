//! The command parser (spec.md §4.6): splits a line into a verb and an
//! argument-rest string, resolves the verb against the dispatch table (exact
//! keyword, then reserved direction keywords as an implicit `GO <dir>`, then
//! prefix autocomplete over the declared verb list), and tokenizes arguments
//! for handlers that need individual words rather than a single rest string.

use crate::room::Direction;

/// The dispatch table (spec.md §4.6): "LOOK, GO, GET, DROP, INVENTORY, SAY,
/// TELL, QUIT, KILL, SAVE". Order is significant: it's the fallback order
/// prefix autocomplete walks when no exact keyword or abbreviation matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
  Look,
  Go,
  Get,
  Drop,
  Inventory,
  Say,
  Tell,
  Quit,
  Kill,
  Save,
}

impl Verb {
  const ALL: [Verb; 10] = [
    Verb::Look,
    Verb::Go,
    Verb::Get,
    Verb::Drop,
    Verb::Inventory,
    Verb::Say,
    Verb::Tell,
    Verb::Quit,
    Verb::Kill,
    Verb::Save,
  ];

  fn name(self) -> &'static str {
    match self {
      Verb::Look => "look",
      Verb::Go => "go",
      Verb::Get => "get",
      Verb::Drop => "drop",
      Verb::Inventory => "inventory",
      Verb::Say => "say",
      Verb::Tell => "tell",
      Verb::Quit => "quit",
      Verb::Kill => "kill",
      Verb::Save => "save",
    }
  }

  /// Single-word synonyms beyond the canonical keyword, carried over from
  /// the original prototype's keyword table (`commands/tokens.go`: `l` for
  /// look, `i`/`inv` for inventory).
  fn synonym(word: &str) -> Option<Verb> {
    match word {
      "l" => Some(Verb::Look),
      "i" | "inv" => Some(Verb::Inventory),
      _ => None,
    }
  }
}

/// What a line resolves to: an ordinary verb, an implicit `GO <dir>` from a
/// bare direction word, or nothing the interpreter recognizes.
pub enum Resolved {
  Verb(Verb),
  Direction(Direction),
  Unknown,
}

/// One argument token (spec.md §4.6, §6's reserved identifiers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
  Here,
  All,
  Me,
  In,
  From,
  Ident(String),
}

impl Token {
  fn lookup(word: &str) -> Token {
    match word {
      "here" => Token::Here,
      "all" => Token::All,
      "self" | "me" => Token::Me,
      "in" => Token::In,
      "from" => Token::From,
      _ => Token::Ident(word.to_string()),
    }
  }
}

/// A parsed input line: the resolved verb/direction plus both
/// representations of the argument-rest a handler might need: the raw
/// string (SAY, TELL's message body) and the tokenized word list (GO, GET,
/// DROP, LOOK, KILL).
pub struct ParsedCommand {
  pub resolved: Resolved,
  pub rest:     String,
  pub tokens:   Vec<Token>,
}

/// Splits `input` on the first space into a verb word and an argument-rest
/// string (spec.md §4.6), resolves the verb, and tokenizes the rest.
pub fn parse(input: &str) -> ParsedCommand {
  let input = input.trim();
  let (verb_word, rest) = match input.split_once(' ') {
    Some((v, r)) => (v, r.trim_start()),
    None => (input, ""),
  };
  let verb_word = verb_word.to_lowercase();

  let resolved = resolve_verb(&verb_word);
  let tokens = rest.split_whitespace().map(|w| Token::lookup(&w.to_lowercase())).collect();

  ParsedCommand { resolved, rest: rest.to_string(), tokens }
}

fn resolve_verb(word: &str) -> Resolved {
  if word.is_empty() {
    return Resolved::Unknown;
  }
  if let Some(v) = Verb::ALL.iter().find(|v| v.name() == word) {
    return Resolved::Verb(*v);
  }
  if let Some(v) = Verb::synonym(word) {
    return Resolved::Verb(v);
  }
  if let Some(d) = Direction::parse_prefix(word) {
    return Resolved::Direction(d);
  }
  if let Some(v) = Verb::ALL.iter().find(|v| v.name().starts_with(word)) {
    return Resolved::Verb(*v);
  }
  Resolved::Unknown
}

#[cfg(test)]
mod tests {
  use super::*;

  fn verb_of(input: &str) -> Option<Verb> {
    match parse(input).resolved {
      Resolved::Verb(v) => Some(v),
      _ => None,
    }
  }

  #[test]
  fn exact_keyword_matches() {
    assert_eq!(verb_of("look"), Some(Verb::Look));
    assert_eq!(verb_of("inventory"), Some(Verb::Inventory));
    assert_eq!(verb_of("quit"), Some(Verb::Quit));
  }

  #[test]
  fn synonyms_match() {
    assert_eq!(verb_of("l"), Some(Verb::Look));
    assert_eq!(verb_of("inv"), Some(Verb::Inventory));
  }

  #[test]
  fn prefix_autocomplete_picks_first_declared_match() {
    // "g" is a prefix of both "go" and "get"; "go" is declared first.
    assert_eq!(verb_of("g"), Some(Verb::Go));
    assert_eq!(verb_of("sa"), Some(Verb::Say));
  }

  #[test]
  fn bare_direction_word_resolves_to_direction_not_verb() {
    match parse("north").resolved {
      Resolved::Direction(Direction::North) => {}
      _ => panic!("expected Direction::North"),
    }
    match parse("s").resolved {
      Resolved::Direction(Direction::South) => {}
      _ => panic!("expected Direction::South"),
    }
  }

  #[test]
  fn unknown_verb_is_unknown() {
    assert!(matches!(parse("xyzzy").resolved, Resolved::Unknown));
  }

  #[test]
  fn argument_tokens_recognize_reserved_identifiers() {
    let parsed = parse("look Here");
    assert_eq!(parsed.tokens, vec![Token::Here]);
    let parsed = parse("get sword from Chest");
    assert_eq!(
      parsed.tokens,
      vec![Token::Ident("sword".into()), Token::From, Token::Ident("chest".into())]
    );
  }

  #[test]
  fn rest_preserves_original_case_for_say_and_tell() {
    let parsed = parse("say Hello There");
    assert_eq!(parsed.rest, "Hello There");
  }
}
