use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub slug: String,
    /// Base URL of the Honeycomb UI, e.g. `https://ui.honeycomb.io`
    pub ui_host: String,
}

/// A dataset as stored in the local cache.
///
/// Every dataset of one download shares the same `Team`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub slug: String,
    pub team: Arc<Team>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, slug: impl Into<String>, team: Arc<Team>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            team,
        }
    }

    /// Stable identity across downloads: `<team>-<dataset>`.
    pub fn uid(&self) -> String {
        format!("{}-{}", self.team.slug, self.slug)
    }

    /// Link to the dataset's home page: `<ui_host>/<team>/home/<dataset>`.
    pub fn url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.team.ui_host)?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
            segments
                .pop_if_empty()
                .push(&self.team.slug)
                .push("home")
                .push(&self.slug);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme(ui_host: &str) -> Arc<Team> {
        Arc::new(Team {
            slug: "acme".to_string(),
            ui_host: ui_host.to_string(),
        })
    }

    #[test]
    fn test_uid_joins_team_and_dataset_slugs() {
        let dataset = Dataset::new("Prod Traces", "prod", acme("https://ui.honeycomb.io"));
        assert_eq!(dataset.uid(), "acme-prod");
    }

    #[test]
    fn test_uid_is_stable_across_downloads() {
        let first = Dataset::new("Prod Traces", "prod", acme("https://ui.honeycomb.io"));
        let second = Dataset::new("Renamed", "prod", acme("https://ui.eu1.honeycomb.io"));
        assert_eq!(first.uid(), second.uid());
    }

    #[test]
    fn test_url() {
        let dataset = Dataset::new("Prod Traces", "prod", acme("https://ui.honeycomb.io"));
        assert_eq!(
            dataset.url().unwrap().as_str(),
            "https://ui.honeycomb.io/acme/home/prod"
        );

        // Trailing slash on the host must not produce an empty segment
        let dataset = Dataset::new("Prod Traces", "prod", acme("https://ui.honeycomb.io/"));
        assert_eq!(
            dataset.url().unwrap().as_str(),
            "https://ui.honeycomb.io/acme/home/prod"
        );
    }

    #[test]
    fn test_url_escapes_slug() {
        let dataset = Dataset::new("Odd", "a b", acme("https://ui.honeycomb.io"));
        assert_eq!(
            dataset.url().unwrap().as_str(),
            "https://ui.honeycomb.io/acme/home/a%20b"
        );
    }

    #[test]
    fn test_url_malformed_host() {
        let dataset = Dataset::new("Prod Traces", "prod", acme("not a url"));
        assert!(dataset.url().is_err());

        let dataset = Dataset::new("Prod Traces", "prod", acme("mailto:ops@example.com"));
        assert!(dataset.url().is_err());
    }

    #[test]
    fn test_cache_json_shape() {
        let dataset = Dataset::new("Prod Traces", "prod", acme("https://ui.honeycomb.io"));
        let json = serde_json::to_value(&dataset).unwrap();
        assert_eq!(json["name"], "Prod Traces");
        assert_eq!(json["slug"], "prod");
        assert_eq!(json["team"]["slug"], "acme");
        assert_eq!(json["team"]["ui_host"], "https://ui.honeycomb.io");
    }
}
