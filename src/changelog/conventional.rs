//! Conventional commit parsing.

use crate::git::CommitInfo;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>[a-zA-Z]+)(?:\((?P<scope>[^)]*)\))?(?P<bang>!)?:\s*(?P<desc>.+)$")
        .expect("conventional commit regex is valid")
});

static BREAKING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^BREAKING[ -]CHANGE:").expect("breaking change regex is valid")
});

/// Changelog bucket, declared in rendering order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// `security:`
    Security,
    /// `feat:`
    Added,
    /// `fix:`
    Fixed,
    /// `!` or `BREAKING CHANGE:`
    Breaking,
    /// `perf:`
    Performance,
    /// `refactor:`
    Changed,
    /// `docs:`
    Documentation,
    /// `style:`
    Style,
    /// `test:`
    Tests,
    /// `build:`
    Build,
    /// `ci:`
    Ci,
    /// `chore:`
    Chores,
    /// Anything else
    Other,
}

impl Category {
    /// All categories in rendering order
    pub const ALL: [Category; 13] = [
        Category::Security,
        Category::Added,
        Category::Fixed,
        Category::Breaking,
        Category::Performance,
        Category::Changed,
        Category::Documentation,
        Category::Style,
        Category::Tests,
        Category::Build,
        Category::Ci,
        Category::Chores,
        Category::Other,
    ];

    /// Category for a commit type prefix, case-insensitive
    pub fn from_type(kind: &str) -> Option<Self> {
        let category = match kind.to_ascii_lowercase().as_str() {
            "security" => Category::Security,
            "feat" => Category::Added,
            "fix" => Category::Fixed,
            "perf" => Category::Performance,
            "refactor" => Category::Changed,
            "docs" => Category::Documentation,
            "style" => Category::Style,
            "test" => Category::Tests,
            "build" => Category::Build,
            "ci" => Category::Ci,
            "chore" => Category::Chores,
            _ => return None,
        };
        Some(category)
    }

    /// Section heading
    pub fn heading(&self) -> &'static str {
        match self {
            Category::Security => "Security",
            Category::Added => "Added",
            Category::Fixed => "Fixed",
            Category::Breaking => "Breaking Changes",
            Category::Performance => "Performance",
            Category::Changed => "Changed",
            Category::Documentation => "Documentation",
            Category::Style => "Style",
            Category::Tests => "Tests",
            Category::Build => "Build",
            Category::Ci => "CI",
            Category::Chores => "Chores",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}

/// A commit classified for the changelog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalCommit {
    /// Bucket the commit is listed under
    pub category: Category,
    /// Optional `(scope)`
    pub scope: Option<String>,
    /// Description, or the whole subject for unrecognized commits
    pub description: String,
    /// Marked breaking by `!` or a `BREAKING CHANGE:` footer
    pub breaking: bool,
    /// Abbreviated hash
    pub short_hash: String,
}

impl ConventionalCommit {
    /// Markdown list item text (without the leading `- `)
    pub fn line(&self) -> String {
        let mut line = match &self.scope {
            Some(scope) => format!("**{scope}:** {}", self.description),
            None => self.description.clone(),
        };
        if !self.short_hash.is_empty() {
            line.push_str(&format!(" ({})", self.short_hash));
        }
        line
    }
}

/// Stateless conventional commit parser
#[derive(Debug, Default, Clone, Copy)]
pub struct CommitParser;

impl CommitParser {
    /// Classify one commit. Never fails: unrecognized commits become
    /// [`Category::Other`].
    pub fn parse(&self, commit: &CommitInfo) -> ConventionalCommit {
        let subject = commit.subject.trim();
        let footer_breaking =
            BREAKING_RE.is_match(subject) || BREAKING_RE.is_match(&commit.body);

        let header = HEADER_RE.captures(subject).and_then(|caps| {
            let category = Category::from_type(&caps["type"])?;
            let scope = caps
                .name("scope")
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty());
            Some((category, scope, caps.name("bang").is_some(), caps["desc"].trim().to_string()))
        });

        match header {
            Some((category, scope, bang, description)) => {
                let breaking = bang || footer_breaking;
                ConventionalCommit {
                    category: if breaking { Category::Breaking } else { category },
                    scope,
                    description,
                    breaking,
                    short_hash: commit.short_hash.clone(),
                }
            }
            None => ConventionalCommit {
                category: if footer_breaking {
                    Category::Breaking
                } else {
                    Category::Other
                },
                scope: None,
                description: subject.to_string(),
                breaking: footer_breaking,
                short_hash: commit.short_hash.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(subject: &str, body: &str) -> CommitInfo {
        CommitInfo {
            hash: "a".repeat(40),
            short_hash: "abc1234".into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    fn parse(subject: &str) -> ConventionalCommit {
        CommitParser.parse(&commit(subject, ""))
    }

    #[test]
    fn test_feature() {
        let parsed = parse("feat: add bulk import");
        assert_eq!(parsed.category, Category::Added);
        assert_eq!(parsed.description, "add bulk import");
        assert!(!parsed.breaking);
    }

    #[test]
    fn test_scope_and_case() {
        let parsed = parse("Fix(export): handle empty sheets");
        assert_eq!(parsed.category, Category::Fixed);
        assert_eq!(parsed.scope.as_deref(), Some("export"));
        assert_eq!(parsed.line(), "**export:** handle empty sheets (abc1234)");
    }

    #[test]
    fn test_breaking_markers() {
        assert_eq!(parse("feat(api)!: drop v1 endpoints").category, Category::Breaking);

        let footer = CommitParser.parse(&commit(
            "refactor: rename config keys",
            "BREAKING CHANGE: dist_dir replaces output",
        ));
        assert_eq!(footer.category, Category::Breaking);
        assert!(footer.breaking);

        let hyphen = CommitParser.parse(&commit("chore: bump", "BREAKING-CHANGE: python 3.12"));
        assert!(hyphen.breaking);
    }

    #[test]
    fn test_unrecognized_goes_to_other() {
        for subject in ["Update README", "wip: stuff", "feat add thing", "Merge branch 'main'"] {
            let parsed = parse(subject);
            assert_eq!(parsed.category, Category::Other, "{subject}");
            assert_eq!(parsed.description, subject);
        }
    }

    #[test]
    fn test_all_prefixes() {
        let expected = [
            ("security", Category::Security),
            ("perf", Category::Performance),
            ("docs", Category::Documentation),
            ("style", Category::Style),
            ("test", Category::Tests),
            ("build", Category::Build),
            ("ci", Category::Ci),
            ("chore", Category::Chores),
        ];
        for (kind, category) in expected {
            assert_eq!(parse(&format!("{kind}: something")).category, category);
        }
    }

    #[test]
    fn test_render_order() {
        let mut sorted = Category::ALL;
        sorted.sort();
        assert_eq!(sorted, Category::ALL);
        assert_eq!(Category::ALL[0], Category::Security);
        assert_eq!(Category::ALL[12], Category::Other);
    }
}
