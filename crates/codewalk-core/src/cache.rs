//! Precomputed highlight results for a catalog.
//!
//! Every section is highlighted once, all invocations are started together
//! and the combined list is handed out only after each one has settled. A
//! failure marks that one section as [`RenderedResult::Failed`]; its
//! siblings are unaffected.

use std::ops::Index;
use std::sync::Arc;

use crate::annotate::EmphasisAnnotator;
use crate::catalog::{Catalog, Section};
use crate::config::HighlightConfig;
use crate::platform::{HighlightRequest, Highlighter};

/// Outcome of highlighting one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedResult {
    /// Highlighted markup, inserted into the page as-is.
    Markup(String),
    /// Highlighting failed; render the raw code instead.
    Failed,
}

impl RenderedResult {
    pub fn markup(&self) -> Option<&str> {
        match self {
            RenderedResult::Markup(html) => Some(html),
            RenderedResult::Failed => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RenderedResult::Failed)
    }
}

/// Immutable, index-aligned results for a catalog.
///
/// Cheap to clone; built once and then only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightCache {
    results: Arc<[RenderedResult]>,
}

impl HighlightCache {
    /// Wrap results computed elsewhere (e.g. before first paint).
    pub fn from_results(results: Vec<RenderedResult>) -> Self {
        Self {
            results: results.into(),
        }
    }

    /// Highlight every section of `catalog` concurrently.
    pub async fn build<H: Highlighter>(
        catalog: &Catalog,
        highlighter: &H,
        config: &HighlightConfig,
    ) -> Self {
        let started = web_time::Instant::now();

        let pending = catalog
            .iter()
            .map(|section| highlight_section(section, highlighter, config));
        let results: Vec<RenderedResult> = n0_future::join_all(pending).await;

        let failed = results.iter().filter(|r| r.is_failed()).count();
        tracing::info!(
            target: "codewalk::cache",
            sections = results.len(),
            failed,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "highlight cache built"
        );

        Self::from_results(results)
    }

    /// [`build`](Self::build), driven to completion on the current thread.
    pub fn build_blocking<H: Highlighter>(
        catalog: &Catalog,
        highlighter: &H,
        config: &HighlightConfig,
    ) -> Self {
        n0_future::future::block_on(Self::build(catalog, highlighter, config))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RenderedResult> {
        self.results.get(index)
    }

    pub fn results(&self) -> &[RenderedResult] {
        &self.results
    }
}

impl Index<usize> for HighlightCache {
    type Output = RenderedResult;

    fn index(&self, index: usize) -> &RenderedResult {
        &self.results[index]
    }
}

async fn highlight_section<H: Highlighter>(
    section: &Section,
    highlighter: &H,
    config: &HighlightConfig,
) -> RenderedResult {
    let annotator = EmphasisAnnotator::new(&section.highlight_lines);
    let request = HighlightRequest {
        code: &section.code,
        language: &config.language,
        theme: &config.theme,
        annotator: &annotator,
    };

    match highlighter.highlight(request).await {
        Ok(html) => RenderedResult::Markup(html),
        Err(e) => {
            tracing::warn!(
                target: "codewalk::cache",
                section = %section.id,
                "highlighting failed, falling back to raw code: {e}"
            );
            RenderedResult::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::catalog::{self, Section};
    use crate::error::HighlightError;
    use crate::highlight::SyntectHighlighter;

    /// Fails for any code containing "boom", counts invocations.
    #[derive(Default)]
    struct FlakyHighlighter {
        calls: Cell<usize>,
    }

    impl Highlighter for FlakyHighlighter {
        async fn highlight(
            &self,
            request: HighlightRequest<'_>,
        ) -> Result<String, HighlightError> {
            self.calls.set(self.calls.get() + 1);
            if request.code.contains("boom") {
                Err(HighlightError::Other("boom".into()))
            } else {
                Ok(format!("<pre>{}</pre>", request.code))
            }
        }
    }

    #[test]
    fn test_failure_is_isolated_to_its_section() {
        let catalog = Catalog::new(vec![
            Section::new("a", "A", "", "fine"),
            Section::new("b", "B", "", "boom"),
        ])
        .unwrap();
        let hl = FlakyHighlighter::default();

        let cache = HighlightCache::build_blocking(&catalog, &hl, &HighlightConfig::default());

        assert_eq!(hl.calls.get(), 2);
        assert_eq!(
            cache.results(),
            &[
                RenderedResult::Markup("<pre>fine</pre>".into()),
                RenderedResult::Failed
            ]
        );
    }

    #[test]
    fn test_first_failure_does_not_abort_later_sections() {
        let catalog = Catalog::new(vec![
            Section::new("a", "A", "", "boom"),
            Section::new("b", "B", "", "one"),
            Section::new("c", "C", "", "two"),
        ])
        .unwrap();

        let cache = HighlightCache::build_blocking(
            &catalog,
            &FlakyHighlighter::default(),
            &HighlightConfig::default(),
        );

        assert_eq!(cache.len(), 3);
        assert!(cache[0].is_failed());
        assert_eq!(cache[1].markup(), Some("<pre>one</pre>"));
        assert_eq!(cache[2].markup(), Some("<pre>two</pre>"));
    }

    #[test]
    fn test_syntect_cache_is_index_aligned() {
        let demo = catalog::demo();
        let hl = SyntectHighlighter::load_defaults();
        let cache = HighlightCache::build_blocking(&demo, &hl, &HighlightConfig::default());

        assert_eq!(cache.len(), demo.len());
        for (section, result) in demo.iter().zip(cache.results()) {
            let html = result.markup().expect("demo sections highlight");
            let lines = section.code.split('\n').count();
            assert_eq!(html.matches("data-line=").count(), lines);
        }
    }

    #[test]
    fn test_bad_theme_fails_every_section() {
        let demo = catalog::demo();
        let hl = SyntectHighlighter::load_defaults();
        let config = HighlightConfig {
            theme: "nord".into(),
            ..HighlightConfig::default()
        };
        let cache = HighlightCache::build_blocking(&demo, &hl, &config);

        assert!(cache.results().iter().all(RenderedResult::is_failed));
    }
}
