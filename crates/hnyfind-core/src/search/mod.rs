//! Ranked fuzzy search over the cached dataset list.

pub mod fuzzy;

pub use fuzzy::MatchOptions;

#[cfg(test)]
use crate::models::Dataset;

/// Number of results handed to the launcher for a non-empty query
pub const MAX_RESULTS: usize = 200;

#[derive(Debug, PartialEq)]
pub struct Ranked<'a, T> {
    pub item: &'a T,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct Filter {
    options: MatchOptions,
    max_results: usize,
}

impl Default for Filter {
    fn default() -> Self {
        Self::new(MatchOptions::default(), MAX_RESULTS)
    }
}

impl Filter {
    pub fn new(options: MatchOptions, max_results: usize) -> Self {
        Self {
            options,
            max_results,
        }
    }

    /// Rank datasets by how well their names match `query`.
    #[cfg(test)]
    pub(crate) fn apply<'a>(
        &self,
        datasets: &'a [Dataset],
        query: &str,
    ) -> Vec<Ranked<'a, Dataset>> {
        self.apply_by(datasets, query, |d| d.name.as_str())
    }

    /// Rank `items` by how well `key(item)` matches `query`.
    ///
    /// A blank query returns every item in its original order. Otherwise
    /// non-matching items are dropped, the rest sorted by descending score
    /// (ties keep their original order) and truncated to `max_results`.
    pub fn apply_by<'a, T>(
        &self,
        items: &'a [T],
        query: &str,
        key: impl Fn(&T) -> &str,
    ) -> Vec<Ranked<'a, T>> {
        if query.trim().is_empty() {
            return items.iter().map(|item| Ranked { item, score: 0.0 }).collect();
        }

        let mut ranked: Vec<Ranked<'a, T>> = items
            .iter()
            .filter_map(|item| {
                self.options
                    .score(key(item), query)
                    .map(|score| Ranked { item, score })
            })
            .collect();

        // sort_by is stable, so equal scores stay in original order
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(self.max_results);
        ranked
    }
}
