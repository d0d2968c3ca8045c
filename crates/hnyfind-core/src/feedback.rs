//! Result document for the launcher (Alfred Script Filter JSON).
//!
//! ```json
//! {"rerun": 0.3, "items": [{"uid": "acme-prod", "title": "Prod Traces", ...}]}
//! ```

use std::io::Write;

use serde::Serialize;

const SYSTEM_ICONS: &str = "/System/Library/CoreServices/CoreTypes.bundle/Contents/Resources";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Icon {
    pub path: String,
}

impl Icon {
    fn system(name: &str) -> Self {
        Self {
            path: format!("{SYSTEM_ICONS}/{name}"),
        }
    }

    pub fn info() -> Self {
        Self::system("ToolbarInfo.icns")
    }

    pub fn warning() -> Self {
        Self::system("AlertCautionIcon.icns")
    }

    pub fn error() -> Self {
        Self::system("AlertStopIcon.icns")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub title: String,
    pub subtitle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
}

impl Item {
    /// A selectable result
    pub fn action(
        uid: impl Into<String>,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        arg: impl Into<String>,
    ) -> Self {
        Self {
            uid: Some(uid.into()),
            title: title.into(),
            subtitle: subtitle.into(),
            arg: Some(arg.into()),
            valid: true,
            icon: None,
        }
    }

    /// A non-selectable message row
    pub fn notice(title: impl Into<String>, subtitle: impl Into<String>, icon: Icon) -> Self {
        Self {
            uid: None,
            title: title.into(),
            subtitle: subtitle.into(),
            arg: None,
            valid: false,
            icon: Some(icon),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Feedback {
    /// Ask the launcher to run the query again after this many seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerun: Option<f64>,
    pub items: Vec<Item>,
}

impl Feedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document holding only an error row
    pub fn error(err: &anyhow::Error) -> Self {
        Self {
            rerun: None,
            items: vec![Item::notice(err.to_string(), format!("{err:#}"), Icon::error())],
        }
    }

    pub fn rerun(&mut self, seconds: f64) {
        self.rerun = Some(seconds);
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a warning row if there are no items, so an empty result is never
    /// mistaken for a crash.
    pub fn warn_empty(&mut self, title: &str, subtitle: &str) {
        if self.is_empty() {
            self.push(Item::notice(title, subtitle, Icon::warning()));
        }
    }

    pub fn write_to<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer(writer, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_item_json() {
        let mut feedback = Feedback::new();
        feedback.push(Item::action(
            "acme-prod",
            "Prod Traces",
            "acme",
            "https://ui.honeycomb.io/acme/home/prod",
        ));

        let json = serde_json::to_value(&feedback).unwrap();
        assert!(json.get("rerun").is_none());
        assert_eq!(json["items"][0]["uid"], "acme-prod");
        assert_eq!(json["items"][0]["title"], "Prod Traces");
        assert_eq!(json["items"][0]["subtitle"], "acme");
        let arg = json["items"][0]["arg"].as_str();
        assert_eq!(arg, Some("https://ui.honeycomb.io/acme/home/prod"));
        assert_eq!(json["items"][0]["valid"], true);
        assert!(json["items"][0].get("icon").is_none());
    }

    #[test]
    fn test_rerun_serialized() {
        let mut feedback = Feedback::new();
        feedback.rerun(0.3);
        let json = serde_json::to_value(&feedback).unwrap();
        assert_eq!(json["rerun"], 0.3);
    }

    #[test]
    fn test_warn_empty_only_when_empty() {
        let mut feedback = Feedback::new();
        feedback.warn_empty("No datasets found", "Try a different query?");
        assert_eq!(feedback.items.len(), 1);
        assert!(!feedback.items[0].valid);

        feedback.warn_empty("No datasets found", "Try a different query?");
        assert_eq!(feedback.items.len(), 1);
    }

    #[test]
    fn test_error_document() {
        let err = anyhow::anyhow!("disk on fire").context("Failed to load cache");
        let feedback = Feedback::error(&err);
        assert_eq!(feedback.items.len(), 1);
        assert_eq!(feedback.items[0].title, "Failed to load cache");
        let subtitle = feedback.items[0].subtitle.as_str();
        assert_eq!(subtitle, "Failed to load cache: disk on fire");
        assert_eq!(feedback.items[0].icon, Some(Icon::error()));
    }
}
