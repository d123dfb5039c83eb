//! # Patch Model
//!
//! A `Patch` is one logical change: a named diff plus the metadata needed to
//! commit it again (author, subject, body), an optional path prefix, and the
//! descriptive set of patches it depends on.
//!
//! ## File Format
//!
//! Patch files use a mail-style header block, a blank line, an optional
//! message body, a `---` separator line and then the diff:
//!
//! ```text
//! From: Jane Doe <jane@example.com>
//! Subject: Add feature flag parsing
//! Ply-Depends: fix-typo.patch
//! Ply-Prefix: src/lib
//!
//! Longer description of the change.
//! ---
//! diff --git a/flags.c b/flags.c
//! ...
//! ```
//!
//! A file that starts directly with `diff --git` is read as a bare diff whose
//! subject is the patch name.
//!
//! Body lines made only of dashes are written with one extra `-` so a `---`
//! line in a commit message never reads as the separator.

use std::borrow::Cow;
use std::collections::BTreeSet;

use regex::Regex;

use crate::defaults::{MAX_SLUG_LEN, PATCH_EXTENSION, SERIES_FILE};
use crate::error::{Error, Result};

const HEADER_FROM: &str = "From";
const HEADER_SUBJECT: &str = "Subject";
const HEADER_DEPENDS: &str = "Ply-Depends";
const HEADER_PREFIX: &str = "Ply-Prefix";

/// A single patch stored in a patch-repo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Unique name within the patch-repo, also the file name.
    pub name: String,
    /// Author in `Name <email>` form, if recorded.
    pub author: Option<String>,
    /// First line of the commit message.
    pub subject: String,
    /// Remainder of the commit message, without surrounding blank lines.
    pub body: String,
    /// Subtree the diff paths are relative to.
    pub prefix: Option<String>,
    /// Names of patches this one logically requires. Descriptive only.
    pub depends_on: BTreeSet<String>,
    /// The diff itself.
    pub diff: String,
}

impl Patch {
    /// Creates a patch with no author, body, prefix or dependencies.
    pub fn new(name: impl Into<String>, subject: impl Into<String>, diff: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            author: None,
            subject: subject.into(),
            body: String::new(),
            prefix: None,
            depends_on: BTreeSet::new(),
            diff: diff.into(),
        }
    }

    /// Parses the contents of a patch file.
    pub fn parse(name: &str, text: &str) -> Result<Self> {
        if text.starts_with("diff --git") || text.trim().is_empty() {
            return Ok(Self::new(name, name, text));
        }

        let (head, diff) = if let Some(rest) = text.strip_prefix("---\n") {
            ("", rest)
        } else {
            match text.find("\n---\n") {
                Some(idx) => (&text[..=idx], &text[idx + 5..]),
                None => {
                    return Err(Error::MalformedPatch {
                        name: name.to_string(),
                        message: "missing `---` line before the diff".to_string(),
                    })
                }
            }
        };

        let mut patch = Self::new(name, "", diff);
        let mut lines = head.lines();
        for line in lines.by_ref() {
            if line.is_empty() {
                break;
            }
            let (key, value) = line.split_once(':').ok_or_else(|| Error::MalformedPatch {
                name: name.to_string(),
                message: format!("bad header line {:?}", line),
            })?;
            let value = value.trim();
            match key.trim() {
                HEADER_FROM => patch.author = Some(value.to_string()),
                HEADER_SUBJECT => patch.subject = value.to_string(),
                HEADER_PREFIX if !value.is_empty() => patch.prefix = Some(value.to_string()),
                HEADER_DEPENDS => patch.depends_on.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|dep| !dep.is_empty())
                        .map(str::to_string),
                ),
                other => log::debug!("{}: ignoring header {}", name, other),
            }
        }
        patch.body = lines
            .map(unescape_body_line)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();

        if patch.subject.is_empty() {
            patch.subject = name.to_string();
        }
        Ok(patch)
    }

    /// Renders the patch in the on-disk format understood by [`Patch::parse`].
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(author) = &self.author {
            out.push_str(&format!("{}: {}\n", HEADER_FROM, author));
        }
        out.push_str(&format!("{}: {}\n", HEADER_SUBJECT, self.subject));
        for dep in &self.depends_on {
            out.push_str(&format!("{}: {}\n", HEADER_DEPENDS, dep));
        }
        if let Some(prefix) = &self.prefix {
            out.push_str(&format!("{}: {}\n", HEADER_PREFIX, prefix));
        }
        out.push('\n');
        for line in self.body.lines() {
            out.push_str(&escape_body_line(line));
            out.push('\n');
        }
        out.push_str("---\n");
        out.push_str(&self.diff);
        if !self.diff.is_empty() && !self.diff.ends_with('\n') {
            out.push('\n');
        }
        out
    }

    /// The commit message used when the patch is applied.
    pub fn commit_message(&self) -> String {
        if self.body.is_empty() {
            self.subject.clone()
        } else {
            format!("{}\n\n{}", self.subject, self.body)
        }
    }

    /// Repository-relative paths touched by the diff, with the prefix applied.
    pub fn touched_files(&self) -> Result<BTreeSet<String>> {
        let header = Regex::new(r"(?m)^diff --git a/(\S+) b/(\S+)$")?;
        let mut files = BTreeSet::new();
        for caps in header.captures_iter(&self.diff) {
            for idx in 1..=2 {
                let path = &caps[idx];
                let full = match &self.prefix {
                    Some(prefix) => format!("{}/{}", prefix.trim_end_matches('/'), path),
                    None => path.to_string(),
                };
                files.insert(full);
            }
        }
        Ok(files)
    }
}

fn is_dash_rule(line: &str, min: usize) -> bool {
    line.len() >= min && line.bytes().all(|b| b == b'-')
}

fn escape_body_line(line: &str) -> Cow<'_, str> {
    if is_dash_rule(line, 3) {
        Cow::Owned(format!("-{}", line))
    } else {
        Cow::Borrowed(line)
    }
}

fn unescape_body_line(line: &str) -> &str {
    if is_dash_rule(line, 4) {
        &line[1..]
    } else {
        line
    }
}

/// Checks that `name` can be used as a patch file name.
pub fn validate_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == SERIES_FILE
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_whitespace);
    if invalid {
        return Err(Error::InvalidPatchName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Derives a file-name-safe slug from a commit subject.
///
/// The result is lower-case ASCII with runs of other characters collapsed to
/// a single `-`, at most [`MAX_SLUG_LEN`] characters long.
pub fn slugify(subject: &str) -> Result<String> {
    let separators = Regex::new(r"[^a-z0-9]+")?;
    let lowered = subject.to_lowercase();
    let slug = separators.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    let slug: String = slug.chars().take(MAX_SLUG_LEN).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        Ok("patch".to_string())
    } else {
        Ok(slug.to_string())
    }
}

/// Patch name for a subject, before de-duplication.
pub fn name_for_subject(subject: &str) -> Result<String> {
    Ok(format!("{}{}", slugify(subject)?, PATCH_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DIFF: &str = "diff --git a/foo.c b/foo.c\nindex 1111111..2222222 100644\n--- a/foo.c\n+++ b/foo.c\n@@ -1 +1 @@\n-old\n+new\n";

    #[test]
    fn test_parse_full_header() {
        let text = format!(
            "From: Jane Doe <jane@example.com>\nSubject: Add feature\nPly-Depends: a.patch, b.patch\nPly-Depends: c.patch\nPly-Prefix: src\n\nSome body\ntext\n---\n{}",
            DIFF
        );
        let patch = Patch::parse("add-feature.patch", &text).unwrap();
        assert_eq!(patch.author.as_deref(), Some("Jane Doe <jane@example.com>"));
        assert_eq!(patch.subject, "Add feature");
        assert_eq!(patch.body, "Some body\ntext");
        assert_eq!(patch.prefix.as_deref(), Some("src"));
        assert_eq!(
            patch.depends_on.iter().map(String::as_str).collect::<Vec<_>>(),
            ["a.patch", "b.patch", "c.patch"]
        );
        assert_eq!(patch.diff, DIFF);
    }

    #[test]
    fn test_parse_bare_diff_uses_name_as_subject() {
        let patch = Patch::parse("raw.patch", DIFF).unwrap();
        assert_eq!(patch.subject, "raw.patch");
        assert_eq!(patch.diff, DIFF);
        assert!(patch.depends_on.is_empty());
    }

    #[test]
    fn test_parse_without_separator_is_malformed() {
        let err = Patch::parse("bad.patch", "Subject: nope\n\nno diff here\n").unwrap_err();
        assert!(matches!(err, Error::MalformedPatch { .. }));
    }

    #[test]
    fn test_parse_bad_header_line_is_malformed() {
        let err = Patch::parse("bad.patch", "not a header\n---\n").unwrap_err();
        assert!(matches!(err, Error::MalformedPatch { .. }));
    }

    #[test]
    fn test_diff_removing_dash_line_survives_render() {
        // A removed line "--" renders as "---" inside the diff.
        let diff = "diff --git a/x b/x\n--- a/x\n+++ b/x\n@@ -1,2 +1 @@\n keep\n---\n";
        let mut patch = Patch::new("x.patch", "Drop separator", diff);
        patch.body = "Body".to_string();
        let parsed = Patch::parse("x.patch", &patch.render()).unwrap();
        assert_eq!(parsed, patch);
    }

    #[test]
    fn test_render_then_parse_keeps_metadata() {
        let mut patch = Patch::new("add-feature.patch", "Add feature", DIFF);
        patch.author = Some("A U Thor <author@example.com>".to_string());
        patch.prefix = Some("lib".to_string());
        patch.depends_on.insert("fix-typo.patch".to_string());
        let parsed = Patch::parse("add-feature.patch", &patch.render()).unwrap();
        assert_eq!(parsed, patch);
    }

    #[test]
    fn test_body_with_dash_rules_survives_render() {
        let mut patch = Patch::new("change.patch", "Change", DIFF);
        patch.body = "Intro\n---\nNotes\n\n-----\n- item".to_string();
        let rendered = patch.render();
        assert_eq!(rendered.matches("\n---\n").count(), 1);

        let parsed = Patch::parse("change.patch", &rendered).unwrap();
        assert_eq!(parsed, patch);
        assert_eq!(parsed.commit_message(), "Change\n\nIntro\n---\nNotes\n\n-----\n- item");
    }

    #[test]
    fn test_commit_message() {
        let mut patch = Patch::new("p.patch", "Subject line", "");
        assert_eq!(patch.commit_message(), "Subject line");
        patch.body = "Body".to_string();
        assert_eq!(patch.commit_message(), "Subject line\n\nBody");
    }

    #[test]
    fn test_touched_files_applies_prefix() {
        let mut patch = Patch::new("p.patch", "s", DIFF);
        assert!(patch.touched_files().unwrap().contains("foo.c"));
        patch.prefix = Some("src/".to_string());
        let files = patch.touched_files().unwrap();
        assert_eq!(files.into_iter().collect::<Vec<_>>(), ["src/foo.c"]);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("fix-typo.patch").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("series").is_err());
        assert!(validate_name(".hidden").is_err());
        assert!(validate_name("dir/name").is_err());
        assert!(validate_name("with space").is_err());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Fix typo in README").unwrap(), "fix-typo-in-readme");
        assert_eq!(slugify("  --Hello, World!--  ").unwrap(), "hello-world");
        assert_eq!(slugify("!!!").unwrap(), "patch");
        assert_eq!(name_for_subject("Add feature").unwrap(), "add-feature.patch");
    }

    proptest! {
        /// Property: generated names are always valid patch names
        #[test]
        fn generated_names_are_valid(subject in ".*") {
            let name = name_for_subject(&subject).unwrap();
            prop_assert!(validate_name(&name).is_ok(), "invalid name {:?}", name);
        }

        /// Property: slugs never exceed the maximum length and never start or end with '-'
        #[test]
        fn slug_is_bounded_and_trimmed(subject in ".*") {
            let slug = slugify(&subject).unwrap();
            prop_assert!(slug.len() <= MAX_SLUG_LEN);
            prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        }
    }
}
