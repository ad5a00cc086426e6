//! Recognition of code-hosting issue and commit URLs.

use url::Url;

pub const DEFAULT_GITHUB_HOST: &str = "github.com";

const MIN_SHA_LEN: usize = 7;
const MAX_SHA_LEN: usize = 40;

/// What a link target points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// An ordinary URL.
    None,
    /// An issue or pull request. `repo` is `None` for references local to the room.
    Issue {
        repo: Option<String>,
        id: String,
        display_text: String,
    },
    /// A commit in a specific repository.
    Commit {
        repo: String,
        sha: String,
        display_text: String,
    },
}

/// Maps a sanitised href to a [`Reference`]. Implementations must be pure.
pub trait ReferenceClassifier: Send + Sync {
    fn classify(&self, href: &str) -> Reference;
}

/// Classifies `https://<host>/<owner>/<repo>/{issues,pull}/<n>` and
/// `https://<host>/<owner>/<repo>/commit/<sha>` URLs.
#[derive(Debug, Clone)]
pub struct GithubUrlClassifier {
    host: String,
}

impl GithubUrlClassifier {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into().trim().to_ascii_lowercase(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn matches_host(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        host == self.host || host.strip_prefix("www.") == Some(self.host.as_str())
    }
}

impl Default for GithubUrlClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_GITHUB_HOST)
    }
}

impl ReferenceClassifier for GithubUrlClassifier {
    fn classify(&self, href: &str) -> Reference {
        let Some(url) = parse_absolute(href) else {
            return Reference::None;
        };

        if !matches!(url.scheme(), "http" | "https") || !self.matches_host(&url) {
            return Reference::None;
        }

        let Some(segments) = url.path_segments() else {
            return Reference::None;
        };
        let segments: Vec<&str> = segments.filter(|segment| !segment.is_empty()).collect();

        match segments.as_slice() {
            [owner, repo, "issues" | "pull", number] if is_issue_number(number) => {
                let repo = format!("{owner}/{repo}");
                Reference::Issue {
                    display_text: format!("{repo}#{number}"),
                    repo: Some(repo),
                    id: (*number).to_string(),
                }
            }
            [owner, repo, "commit", sha] if is_commit_sha(sha) => {
                let repo = format!("{owner}/{repo}");
                Reference::Commit {
                    display_text: format!("{repo}@{}", abbreviate_sha(sha)),
                    repo,
                    sha: (*sha).to_string(),
                }
            }
            _ => Reference::None,
        }
    }
}

/// First seven characters of a commit hash.
pub fn abbreviate_sha(sha: &str) -> &str {
    match sha.char_indices().nth(MIN_SHA_LEN) {
        Some((idx, _)) => &sha[..idx],
        None => sha,
    }
}

fn parse_absolute(href: &str) -> Option<Url> {
    if href.starts_with("//") {
        return Url::parse(&format!("https:{href}")).ok();
    }
    Url::parse(href).ok()
}

fn is_issue_number(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn is_commit_sha(value: &str) -> bool {
    (MIN_SHA_LEN..=MAX_SHA_LEN).contains(&value.len())
        && value.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_issue_and_pull_urls() {
        let classifier = GithubUrlClassifier::default();

        assert_eq!(
            classifier.classify("https://github.com/myorg/repo/issues/42"),
            Reference::Issue {
                repo: Some("myorg/repo".into()),
                id: "42".into(),
                display_text: "myorg/repo#42".into(),
            }
        );
        assert_eq!(
            classifier.classify("http://www.github.com/myorg/repo/pull/7/"),
            Reference::Issue {
                repo: Some("myorg/repo".into()),
                id: "7".into(),
                display_text: "myorg/repo#7".into(),
            }
        );
    }

    #[test]
    fn classifies_commit_urls_with_abbreviated_display() {
        let classifier = GithubUrlClassifier::default();
        let sha = "0123456789abcdef0123456789abcdef01234567";

        assert_eq!(
            classifier.classify(&format!("https://github.com/myorg/repo/commit/{sha}")),
            Reference::Commit {
                repo: "myorg/repo".into(),
                sha: sha.into(),
                display_text: "myorg/repo@0123456".into(),
            }
        );
    }

    #[test]
    fn protocol_relative_urls_are_understood() {
        let classifier = GithubUrlClassifier::default();
        assert!(matches!(
            classifier.classify("//github.com/a/b/issues/1"),
            Reference::Issue { .. }
        ));
    }

    #[test]
    fn other_urls_are_plain_links() {
        let classifier = GithubUrlClassifier::default();

        for href in [
            "https://example.com/myorg/repo/issues/1",
            "https://github.com/myorg/repo",
            "https://github.com/myorg/repo/issues/abc",
            "https://github.com/myorg/repo/commit/xyz",
            "https://github.com/myorg/repo/issues/1/comments",
            "ftp://github.com/myorg/repo/issues/1",
            "http://goo.gl/a7HIYr",
            "",
        ] {
            assert_eq!(classifier.classify(href), Reference::None, "href: {href:?}");
        }
    }

    #[test]
    fn custom_host_is_respected() {
        let classifier = GithubUrlClassifier::new("GIT.Example.org");
        assert_eq!(classifier.host(), "git.example.org");
        assert!(matches!(
            classifier.classify("https://git.example.org/team/app/issues/3"),
            Reference::Issue { .. }
        ));
        assert_eq!(
            classifier.classify("https://github.com/team/app/issues/3"),
            Reference::None
        );
    }

    #[test]
    fn abbreviate_sha_handles_short_input() {
        assert_eq!(abbreviate_sha("abc"), "abc");
        assert_eq!(abbreviate_sha("abcdef0123"), "abcdef0");
    }
}
