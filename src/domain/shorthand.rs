//! Chat shorthand recognised inside plain text runs.
//!
//! Supported forms:
//! - `@name` user mention
//! - `@@name` group mention
//! - `#123` and `owner/repo#123` issue references
//! - `owner/repo@0123abc` commit references (7 to 40 hex digits)
//!
//! A token only counts when it starts the run or follows a character that
//! cannot be part of a name, so `bob@host` and `issue#4` stay plain text.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static SHORTHAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
          (?P<commit_repo>[A-Za-z0-9_-]+/[A-Za-z0-9_.-]+)@(?P<sha>[0-9a-f]{7,40})\b
        | (?P<issue_repo>[A-Za-z0-9_-]+/[A-Za-z0-9_.-]+)?\#(?P<number>[0-9]+)\b
        | @@(?P<group>[A-Za-z0-9_-]+)
        | @(?P<user>[A-Za-z0-9_-]+)
        ",
    )
    .expect("shorthand pattern must compile")
});

/// A recognised shorthand token. `text` is the source slice as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shorthand<'a> {
    Mention {
        screen_name: &'a str,
        text: &'a str,
    },
    GroupMention {
        name: &'a str,
        text: &'a str,
    },
    Issue {
        repo: Option<&'a str>,
        number: &'a str,
        text: &'a str,
    },
    Commit {
        repo: &'a str,
        sha: &'a str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Shorthand(Shorthand<'a>),
}

/// Split `text` into plain runs and shorthand tokens, in source order.
pub fn scan(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut emitted = 0;
    let mut search = 0;

    while search < text.len() {
        let Some(captures) = SHORTHAND.captures_at(text, search) else {
            break;
        };
        let Some(whole) = captures.get(0) else {
            break;
        };

        if !starts_token(text, whole.start()) {
            search = next_char_boundary(text, whole.start());
            continue;
        }

        let Some(shorthand) = shorthand_from(&captures, whole.as_str()) else {
            search = next_char_boundary(text, whole.start());
            continue;
        };

        if whole.start() > emitted {
            segments.push(Segment::Text(&text[emitted..whole.start()]));
        }
        segments.push(Segment::Shorthand(shorthand));
        emitted = whole.end();
        search = whole.end();
    }

    if emitted < text.len() {
        segments.push(Segment::Text(&text[emitted..]));
    }

    segments
}

/// Whether `text` contains at least one shorthand token.
pub fn contains_shorthand(text: &str) -> bool {
    scan(text)
        .iter()
        .any(|segment| matches!(segment, Segment::Shorthand(_)))
}

fn shorthand_from<'a>(captures: &Captures<'a>, text: &'a str) -> Option<Shorthand<'a>> {
    if let (Some(repo), Some(sha)) = (captures.name("commit_repo"), captures.name("sha")) {
        return Some(Shorthand::Commit {
            repo: repo.as_str(),
            sha: sha.as_str(),
        });
    }

    if let Some(number) = captures.name("number") {
        return Some(Shorthand::Issue {
            repo: captures.name("issue_repo").map(|repo| repo.as_str()),
            number: number.as_str(),
            text,
        });
    }

    if let Some(group) = captures.name("group") {
        return Some(Shorthand::GroupMention {
            name: group.as_str(),
            text,
        });
    }

    captures.name("user").map(|user| Shorthand::Mention {
        screen_name: user.as_str(),
        text,
    })
}

fn starts_token(text: &str, start: usize) -> bool {
    match text[..start].chars().next_back() {
        None => true,
        Some(prev) => {
            !(prev.is_alphanumeric() || matches!(prev, '_' | '-' | '.' | '/' | '@' | '#'))
        }
    }
}

fn next_char_boundary(text: &str, from: usize) -> usize {
    from + text[from..].chars().next().map_or(1, char::len_utf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<Shorthand<'_>> {
        scan(text)
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Shorthand(shorthand) => Some(shorthand),
                Segment::Text(_) => None,
            })
            .collect()
    }

    #[test]
    fn mention_is_split_from_surrounding_text() {
        assert_eq!(
            scan("ping @alice, thanks"),
            vec![
                Segment::Text("ping "),
                Segment::Shorthand(Shorthand::Mention {
                    screen_name: "alice",
                    text: "@alice",
                }),
                Segment::Text(", thanks"),
            ]
        );
    }

    #[test]
    fn group_mention_wins_over_user_mention() {
        assert_eq!(
            tokens("@@backend please look"),
            vec![Shorthand::GroupMention {
                name: "backend",
                text: "@@backend",
            }]
        );
    }

    #[test]
    fn local_and_qualified_issues() {
        assert_eq!(
            tokens("fixes #42 and myorg/repo#7"),
            vec![
                Shorthand::Issue {
                    repo: None,
                    number: "42",
                    text: "#42",
                },
                Shorthand::Issue {
                    repo: Some("myorg/repo"),
                    number: "7",
                    text: "myorg/repo#7",
                },
            ]
        );
    }

    #[test]
    fn commit_reference() {
        assert_eq!(
            tokens("landed in myorg/repo@deadbeef01"),
            vec![Shorthand::Commit {
                repo: "myorg/repo",
                sha: "deadbeef01",
            }]
        );
    }

    #[test]
    fn tokens_glued_to_words_are_ignored() {
        assert!(tokens("mail bob@localhost").is_empty());
        assert!(tokens("issue#4 is not a reference").is_empty());
        assert!(tokens("#42abc").is_empty());
        assert!(tokens("").is_empty());
    }

    #[test]
    fn rejected_candidate_does_not_hide_later_tokens() {
        assert_eq!(
            tokens("x@y then @carol"),
            vec![Shorthand::Mention {
                screen_name: "carol",
                text: "@carol",
            }]
        );
    }

    #[test]
    fn punctuation_delimits_tokens() {
        assert_eq!(
            tokens("(@dave) [#9]."),
            vec![
                Shorthand::Mention {
                    screen_name: "dave",
                    text: "@dave",
                },
                Shorthand::Issue {
                    repo: None,
                    number: "9",
                    text: "#9",
                },
            ]
        );
    }

    #[test]
    fn non_ascii_text_is_preserved() {
        assert_eq!(
            scan("héllo @zoe, ça va"),
            vec![
                Segment::Text("héllo "),
                Segment::Shorthand(Shorthand::Mention {
                    screen_name: "zoe",
                    text: "@zoe",
                }),
                Segment::Text(", ça va"),
            ]
        );
        assert!(contains_shorthand("héllo @zoe"));
        assert!(!contains_shorthand("héllo"));
    }
}
