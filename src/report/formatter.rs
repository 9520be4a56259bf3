// SPDX-License-Identifier: PMPL-1.0-or-later

//! Console formatting for check results and coverage

use crate::check::{CheckOutcome, CheckSummary};
use crate::coverage::CoverageReport;
use colored::*;
use std::fmt::Write;

pub struct ReportFormatter {
    verbose: bool,
}

impl ReportFormatter {
    pub fn new() -> Self {
        Self { verbose: false }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn print_check(&self, outcomes: &[CheckOutcome]) {
        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        for outcome in outcomes {
            match &outcome.result {
                Ok(summary) => {
                    println!("{} {}", "ok".green().bold(), outcome.path.display());
                    if self.verbose {
                        self.print_summary(summary);
                    }
                }
                Err(message) => {
                    println!("{} {}", "FAIL".red().bold(), outcome.path.display());
                    println!("    {}", message.red());
                }
            }
        }
        println!();
        let line = format!(
            "{} file(s) checked, {} failed",
            outcomes.len(),
            failed
        );
        if failed == 0 {
            println!("{}", line.green());
        } else {
            println!("{}", line.red().bold());
        }
    }

    fn print_summary(&self, summary: &CheckSummary) {
        println!(
            "    language: {}",
            summary.language.as_deref().unwrap_or("-")
        );
        println!(
            "    contexts: {}  messages: {}  unfinished: {}  obsolete: {}",
            summary.contexts, summary.messages, summary.unfinished, summary.obsolete
        );
        println!("    fingerprint: {}", summary.fingerprint.dimmed());
    }

    pub fn print_coverage(&self, report: &CoverageReport) {
        println!("\n{}", "=== TRANSLATION COVERAGE ===".bold().cyan());
        println!("  Catalog: {}", report.candidate);
        if let Some(reference) = &report.reference {
            println!("  Reference: {}", reference);
        }
        println!();

        for context in &report.contexts {
            let counts = &context.counts;
            let percent = format!("{:5.1}%", counts.percent());
            let percent = if counts.missing > 0 {
                percent.red()
            } else if counts.unfinished > 0 {
                percent.yellow()
            } else {
                percent.green()
            };
            println!(
                "  {} {:<28} {:>4}/{:<4} unfinished {:>3}  missing {:>3}  obsolete {:>3}",
                percent,
                context.name.bold(),
                counts.finished,
                counts.total,
                counts.unfinished,
                counts.missing,
                counts.obsolete
            );
        }

        if self.verbose && !report.missing.is_empty() {
            println!();
            println!("  {}", "Missing:".yellow().bold());
            for key in &report.missing {
                match &key.comment {
                    Some(comment) => println!("    - {} / {:?} ({})", key.context, key.source, comment),
                    None => println!("    - {} / {:?}", key.context, key.source),
                }
            }
        }

        let score_color = if report.percent >= 95.0 {
            "green"
        } else if report.percent >= 60.0 {
            "yellow"
        } else {
            "red"
        };
        println!();
        println!(
            "  Overall: {} ({} of {} finished)",
            format!("{:.1}%", report.percent).color(score_color).bold(),
            report.totals.finished,
            report.totals.total
        );
    }

    /// Plain-text coverage table for files.
    pub fn coverage_text(&self, report: &CoverageReport) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "catalog: {}", report.candidate);
        if let Some(reference) = &report.reference {
            let _ = writeln!(out, "reference: {}", reference);
        }
        let _ = writeln!(out, "generated: {}", report.generated_at);
        for context in &report.contexts {
            let c = &context.counts;
            let _ = writeln!(
                out,
                "{:6.1}% {} finished={} unfinished={} missing={} obsolete={} total={}",
                c.percent(),
                context.name,
                c.finished,
                c.unfinished,
                c.missing,
                c.obsolete,
                c.total
            );
        }
        for key in &report.missing {
            let _ = writeln!(
                out,
                "missing: {} {:?}{}",
                key.context,
                key.source,
                key.comment
                    .as_deref()
                    .map(|c| format!(" ({c})"))
                    .unwrap_or_default()
            );
        }
        let _ = writeln!(
            out,
            "overall: {:.1}% ({}/{})",
            report.percent, report.totals.finished, report.totals.total
        );
        out
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::coverage::coverage;
    use crate::types::Message;

    #[test]
    fn text_table_lists_contexts_and_missing_keys() {
        let mut reference = Catalog::new(Some("zh_CN"));
        reference
            .insert("SidePanel", Message::new("小时", Some("f_time_hour"), "小时"))
            .unwrap();
        reference
            .insert("SidePanel", Message::new("天", Some("f_time_day"), "天"))
            .unwrap();
        let mut candidate = Catalog::new(Some("en_US"));
        candidate
            .insert("SidePanel", Message::new("小时", Some("f_time_hour"), "Hour"))
            .unwrap();

        let text = ReportFormatter::new().coverage_text(&coverage(&candidate, Some(&reference)));
        assert!(text.contains(" 50.0% SidePanel finished=1 unfinished=0 missing=1"));
        assert!(text.contains("missing: SidePanel \"天\" (f_time_day)"));
        assert!(text.contains("overall: 50.0% (1/2)"));
    }
}
