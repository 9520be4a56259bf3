// SPDX-License-Identifier: PMPL-1.0-or-later

//! Translation coverage of one catalog against a reference key set.

use crate::catalog::Catalog;
use serde::Serialize;
use std::collections::HashSet;

/// Per-status message counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoverageCounts {
    /// Keys in the reference.
    pub total: usize,
    /// Keys with a finished, non-empty translation.
    pub finished: usize,
    /// Keys present but unfinished or empty.
    pub unfinished: usize,
    /// Keys absent from the candidate.
    pub missing: usize,
    /// Obsolete or vanished entries carried by the candidate.
    pub obsolete: usize,
}

impl CoverageCounts {
    /// Finished share of `total`, as a percentage.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.finished as f64 * 100.0 / self.total as f64
        }
    }

    fn add(&mut self, other: &CoverageCounts) {
        self.total += other.total;
        self.finished += other.finished;
        self.unfinished += other.unfinished;
        self.missing += other.missing;
        self.obsolete += other.obsolete;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextCoverage {
    pub name: String,
    #[serde(flatten)]
    pub counts: CoverageCounts,
}

/// A reference key with no entry in the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingKey {
    pub context: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    pub generated_at: String,
    pub candidate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub totals: CoverageCounts,
    pub percent: f64,
    pub contexts: Vec<ContextCoverage>,
    pub missing: Vec<MissingKey>,
}

/// Measure `candidate` against the live keys of `reference`.
///
/// Without a reference the candidate is measured against its own keys,
/// so nothing can be missing.
pub fn coverage(candidate: &Catalog, reference: Option<&Catalog>) -> CoverageReport {
    let keys_from = reference.unwrap_or(candidate);
    let mut contexts = Vec::new();
    let mut missing = Vec::new();
    let mut totals = CoverageCounts::default();

    for context in keys_from.contexts() {
        let mut counts = CoverageCounts::default();
        for message in context.live_messages() {
            counts.total += 1;
            match candidate.find(context.name(), &message.source, message.comment.as_deref()) {
                Some(found) if found.is_finished() => counts.finished += 1,
                Some(_) => counts.unfinished += 1,
                None => {
                    counts.missing += 1;
                    missing.push(MissingKey {
                        context: context.name().to_string(),
                        source: message.source.clone(),
                        comment: message.comment.clone(),
                    });
                }
            }
        }
        counts.obsolete = obsolete_in(candidate, context.name());
        totals.add(&counts);
        contexts.push(ContextCoverage {
            name: context.name().to_string(),
            counts,
        });
    }

    // Contexts only the candidate still carries hold nothing but leftovers.
    let seen: HashSet<&str> = keys_from.contexts().iter().map(|c| c.name()).collect();
    for context in candidate.contexts() {
        if seen.contains(context.name()) {
            continue;
        }
        let obsolete = obsolete_in(candidate, context.name());
        if obsolete > 0 {
            let counts = CoverageCounts {
                obsolete,
                ..CoverageCounts::default()
            };
            totals.add(&counts);
            contexts.push(ContextCoverage {
                name: context.name().to_string(),
                counts,
            });
        }
    }

    tracing::debug!(
        candidate = candidate.origin(),
        total = totals.total,
        finished = totals.finished,
        missing = totals.missing,
        "computed coverage"
    );

    CoverageReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        candidate: candidate.origin().to_string(),
        reference: reference.map(|r| r.origin().to_string()),
        language: candidate.language().map(str::to_string),
        percent: totals.percent(),
        totals,
        contexts,
        missing,
    }
}

fn obsolete_in(catalog: &Catalog, context: &str) -> usize {
    catalog
        .context(context)
        .map(|c| c.messages().iter().filter(|m| !m.is_live()).count())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Message, TranslationStatus};

    fn reference() -> Catalog {
        let mut catalog = Catalog::new(Some("zh_CN"));
        for (source, comment) in [
            ("起始时间: ", "f_start_time"),
            ("小时", "f_time_hour"),
            ("天", "f_time_day"),
        ] {
            catalog
                .insert("SidePanel", Message::new(source, Some(comment), source))
                .unwrap();
        }
        catalog
            .insert("AxisConfigPanel", Message::new("自动", Some("f_auto"), "自动"))
            .unwrap();
        catalog
    }

    fn candidate() -> Catalog {
        let mut catalog = Catalog::new(Some("en_US"));
        catalog
            .insert("SidePanel", Message::new("起始时间: ", Some("f_start_time"), "Start Time"))
            .unwrap();
        catalog
            .insert(
                "SidePanel",
                Message::new("小时", Some("f_time_hour"), "")
                    .with_status(TranslationStatus::Unfinished),
            )
            .unwrap();
        catalog
            .insert(
                "SidePanel",
                Message::new("周", Some("f_time_week"), "Week")
                    .with_status(TranslationStatus::Obsolete),
            )
            .unwrap();
        catalog
            .insert(
                "LegacyPanel",
                Message::new("旧", None, "Old").with_status(TranslationStatus::Vanished),
            )
            .unwrap();
        catalog
    }

    #[test]
    fn counts_against_reference() {
        let report = coverage(&candidate(), Some(&reference()));
        assert_eq!(
            report.totals,
            CoverageCounts {
                total: 4,
                finished: 1,
                unfinished: 1,
                missing: 2,
                obsolete: 2,
            }
        );
        assert_eq!(report.percent, 25.0);
        assert_eq!(report.contexts.len(), 3);
        assert_eq!(report.contexts[2].name, "LegacyPanel");
        assert_eq!(
            report.missing[0],
            MissingKey {
                context: "SidePanel".into(),
                source: "天".into(),
                comment: Some("f_time_day".into()),
            }
        );
    }

    #[test]
    fn self_coverage_has_no_missing_keys() {
        let report = coverage(&candidate(), None);
        assert_eq!(report.totals.total, 2);
        assert_eq!(report.totals.missing, 0);
        assert!(report.missing.is_empty());
        assert!(report.reference.is_none());
    }

    #[test]
    fn empty_catalog_is_fully_covered() {
        let report = coverage(&Catalog::new(None), None);
        assert_eq!(report.percent, 100.0);
    }
}
