//! The content catalog: an ordered, validated list of sections.
//!
//! Catalog order is load-bearing. It is the scroll order of the notes and the
//! index into the rendered-results list, so a catalog never changes shape
//! after construction.

use std::collections::{BTreeSet, HashSet};
use std::ops::Index;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::CatalogError;

/// One unit of content: a code snippet paired with its explanatory note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Stable identifier, unique within a catalog.
    pub id: SmolStr,
    /// Short heading shown above the note.
    pub title: String,
    /// Explanatory prose.
    pub note: String,
    /// Raw source text. This is what gets highlighted and what gets copied.
    pub code: String,
    /// Display label for the code pane header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// 1-based line numbers to emphasize.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub highlight_lines: BTreeSet<u32>,
}

impl Section {
    pub fn new(
        id: impl Into<SmolStr>,
        title: impl Into<String>,
        note: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            note: note.into(),
            code: code.into(),
            filename: None,
            highlight_lines: BTreeSet::new(),
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_highlight_lines(mut self, lines: impl IntoIterator<Item = u32>) -> Self {
        self.highlight_lines = lines.into_iter().collect();
        self
    }

    /// Whether the 1-based `line` should carry the emphasis marker.
    pub fn is_emphasized(&self, line: u32) -> bool {
        self.highlight_lines.contains(&line)
    }
}

/// Fixed-length, ordered sequence of sections.
///
/// Cheap to clone; all clones share the same sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    sections: Arc<[Section]>,
}

impl Catalog {
    /// Validate and freeze a list of sections.
    ///
    /// Rejects an empty list, duplicate ids and a highlight line of `0`.
    pub fn new(sections: Vec<Section>) -> Result<Self, CatalogError> {
        if sections.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::with_capacity(sections.len());
        for section in &sections {
            if !seen.insert(section.id.clone()) {
                return Err(CatalogError::DuplicateId(section.id.clone()));
            }
            if section.highlight_lines.contains(&0) {
                return Err(CatalogError::ZeroHighlightLine {
                    id: section.id.clone(),
                });
            }
        }

        Ok(Self {
            sections: sections.into(),
        })
    }

    /// Decode a JSON array of sections (camelCase keys) and validate it.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let sections: Vec<Section> = serde_json::from_str(json)?;
        Self::new(sections)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Always false for a constructed catalog; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    /// Position of the section with the given id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }
}

impl Index<usize> for Catalog {
    type Output = Section;

    fn index(&self, index: usize) -> &Section {
        &self.sections[index]
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}

const DEBOUNCE_EXAMPLE: &str = r#"function debounce(fn, t) {
    let timeout;
    // Every time the returned function is called,
    // clearTimeout is called to reset the timer to t milliseconds.
    return function(...args) {
      // every time the function is triggered again before the delay is over,
      // reset the timer since the delay hasn't actually happened yet.
        clearTimeout(timeout);
        timeout = setTimeout(() => fn(...args), t);
    }
};"#;

const FETCH_EXAMPLE: &str = r#"function fetchUserProfileWithPermissionsAndPreferences(
  userId,
  includeSensitiveData,
  fallbackToCache = true,
  options = { retries: 3, timeout: 15000 }
) {
  const requestUrl = `https://api.example.com/v1/users/${userId}?includeSensitive=${includeSensitiveData}&fallback=${fallbackToCache}&retries=${options.retries}&timeout=${options.timeout}`;

  return fetch(requestUrl, {
    method: "GET",
    headers: {
      "Content-Type": "application/json",
      "X-Client-Metadata": JSON.stringify({
        appVersion: "1.42.7-production-app-version-with-a-very-very-long-name",
        environment: "stg-us-east-1-env-with-a-very-very-long-name",
        featureFlags: ["experimental-user-preferences-synchronization", "extended-audit-logging-enabled"],
      }),
    },
  }).then(response =>
    response.ok
      ? response.json()
      : Promise.reject(
          new Error(
            `Request failed with status ${response.status} while fetching metadata for userId=${userId} from ${requestUrl}`
          )
        )
  );
}"#;

/// A two-section walkthrough (debounce helper, then a long fetch call).
pub fn demo() -> Catalog {
    let sections = vec![
        Section::new(
            "intro",
            "Debounce utility",
            "A simple debounce helper to avoid frequent calls. For a given delay of t \
             milliseconds, it ensures that a function is only called once no calls have been \
             made for t milliseconds. We use timeout to store the timer id and clearTimeout to \
             reset it. Mnemonic: debounce delays until the bouncing stops.",
            DEBOUNCE_EXAMPLE,
        )
        .with_filename("debounce.js")
        .with_highlight_lines([9]),
        Section::new(
            "fetch",
            "Fetch user profile",
            "A longer example showing options, headers, and error handling.",
            FETCH_EXAMPLE,
        )
        .with_filename("fetchUser.js")
        .with_highlight_lines([2, 4, 5]),
    ];

    Catalog {
        sections: sections.into(),
    }
}
