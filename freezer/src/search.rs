//! Free-text sample search.
//!
//! Stateless: every call tokenizes the query and scans the samples it is
//! given. A sample matches when each token is a substring of its searchable
//! text (name, notes, solvent, coating, box name). Deleted samples never
//! match.

use std::collections::BTreeMap;

use crate::model::{BoxId, FreezerBox, Sample, SampleStatus};

/// Lower-cased whitespace-separated tokens of `query`.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .trim()
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Lower-cased text a query is matched against.
pub fn searchable_text(sample: &Sample, boxes: &BTreeMap<BoxId, FreezerBox>) -> String {
    let box_name = sample
        .box_id()
        .and_then(|id| boxes.get(id))
        .map_or("", |b| b.name.as_str());

    [
        sample.details.name.as_str(),
        sample.details.notes.as_deref().unwrap_or(""),
        sample.details.solvent.as_str(),
        sample.details.coating.as_str(),
        box_name,
    ]
    .join("\n")
    .to_lowercase()
}

/// Samples matching every token of `query`, in input order.
///
/// An empty or blank query returns nothing.
pub fn search<'a, I>(samples: I, boxes: &BTreeMap<BoxId, FreezerBox>, query: &str) -> Vec<&'a Sample>
where
    I: IntoIterator<Item = &'a Sample>,
{
    let tokens = tokenize(query);
    if tokens.is_empty() {
        return Vec::new();
    }
    tracing::debug!(tokens = tokens.len(), "Searching samples");

    samples
        .into_iter()
        .filter(|s| s.status != SampleStatus::Deleted)
        .filter(|s| {
            let text = searchable_text(s, boxes);
            tokens.iter().all(|t| text.contains(t.as_str()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoxLayout, Location, SampleDetails, SampleId};
    use chrono::Utc;

    fn boxes() -> BTreeMap<BoxId, FreezerBox> {
        let b = FreezerBox {
            id: BoxId::new("b1"),
            name: "Rack North".into(),
            description: None,
            layout: BoxLayout::Grid10x10,
            created_at: Utc::now(),
        };
        BTreeMap::from([(b.id.clone(), b)])
    }

    fn sample(id: &str, name: &str, notes: Option<&str>, status: SampleStatus) -> Sample {
        Sample {
            id: SampleId::new(id),
            location: (status == SampleStatus::Active).then(|| Location::new(BoxId::new("b1"), 0)),
            details: SampleDetails {
                notes: notes.map(str::to_string),
                ..SampleDetails::new(id, name)
            },
            status,
            created_at: Utc::now(),
        }
    }

    fn ids(found: Vec<&Sample>) -> Vec<&str> {
        found.into_iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_tokenize_collapses_whitespace() {
        assert_eq!(tokenize("  NaYF4 \t 20nm\n"), vec!["nayf4", "20nm"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let samples = vec![sample("s1", "NaYF4", None, SampleStatus::Active)];
        assert!(search(&samples, &boxes(), "").is_empty());
        assert!(search(&samples, &boxes(), "   ").is_empty());
    }

    #[test]
    fn test_all_tokens_must_match() {
        let samples = vec![
            sample("s1", "NaYF4", Some("20nm core"), SampleStatus::Active),
            sample("s2", "NaYF4", Some("40nm shell"), SampleStatus::Active),
            sample("s3", "ErYF4", Some("20nm"), SampleStatus::Active),
        ];
        assert_eq!(ids(search(&samples, &boxes(), "nayf4 20NM")), vec!["s1"]);
        assert_eq!(ids(search(&samples, &boxes(), "nayf4")), vec!["s1", "s2"]);
    }

    #[test]
    fn test_matches_coating_solvent_and_box_name() {
        let samples = vec![sample("s1", "NaYF4", None, SampleStatus::Active)];
        assert_eq!(ids(search(&samples, &boxes(), "oleic cyclohexane")), vec!["s1"]);
        assert_eq!(ids(search(&samples, &boxes(), "north")), vec!["s1"]);
    }

    #[test]
    fn test_deleted_never_match_archived_do() {
        let samples = vec![
            sample("s1", "NaYF4", None, SampleStatus::Deleted),
            sample("s2", "NaYF4", None, SampleStatus::Archived),
        ];
        assert_eq!(ids(search(&samples, &boxes(), "nayf4")), vec!["s2"]);
    }

    #[test]
    fn test_archived_sample_has_no_box_name() {
        let archived = sample("s2", "NaYF4", None, SampleStatus::Archived);
        assert!(!searchable_text(&archived, &boxes()).contains("rack"));
    }
}
