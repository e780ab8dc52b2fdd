//! Ranking report generation.
//!
//! This module renders the top repliers ranking as Markdown or JSON.

use crate::models::{ChatSummary, RankingReport, ReportMetadata, UserTally};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &RankingReport) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# ChatStat Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.summary));
    output.push_str(&generate_ranking_section(
        &report.top_users,
        report.metadata.top_n,
    ));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    if let Some(ref name) = metadata.chat_name {
        section.push_str(&format!("- **Chat:** {}\n", name));
    }
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the summary section.
fn generate_summary_section(summary: &ChatSummary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Messages | With Text | Questions | Replies to Questions |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        summary.messages, summary.text_messages, summary.questions, summary.replies_to_questions
    ));

    section
}

/// Generate the ranking table.
fn generate_ranking_section(top_users: &[UserTally], top_n: usize) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "## Top {} Users in Replying to Questions\n\n",
        top_n
    ));

    if top_users.is_empty() {
        section.push_str("Nobody replied to a question in this chat.\n\n");
        return section;
    }

    section.push_str("| # | User | Replies |\n");
    section.push_str("|:---:|:---|:---:|\n");
    for (i, tally) in top_users.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            i + 1,
            escape_cell(&tally.user),
            tally.replies
        ));
    }
    section.push('\n');

    section
}

/// Keep user names from breaking the table.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by ChatStat*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &RankingReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_report(top_users: Vec<UserTally>) -> RankingReport {
        RankingReport {
            metadata: ReportMetadata {
                chat_name: Some("Rust Iran".to_string()),
                source: "data/online.json".to_string(),
                generated_at: Utc::now(),
                top_n: 10,
                duration_seconds: 1.5,
            },
            summary: ChatSummary {
                messages: 120,
                text_messages: 100,
                questions: 20,
                replies_to_questions: 35,
            },
            top_users,
        }
    }

    fn tally(user: &str, replies: usize) -> UserTally {
        UserTally {
            user: user.to_string(),
            replies,
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report(vec![tally("Ali", 12), tally("Sara", 7)]);
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# ChatStat Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("Rust Iran"));
        assert!(markdown.contains("| 120 | 100 | 20 | 35 |"));
        assert!(markdown.contains("## Top 10 Users in Replying to Questions"));

        let ali = markdown.find("| 1 | Ali | 12 |").unwrap();
        let sara = markdown.find("| 2 | Sara | 7 |").unwrap();
        assert!(ali < sara);
    }

    #[test]
    fn test_empty_ranking_message() {
        let report = create_test_report(vec![]);
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("Nobody replied to a question"));
        assert!(!markdown.contains("| # | User | Replies |"));
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("a|b\nc"), "a\\|b c");
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report(vec![tally("u1", 2), tally("u2", 1)]);
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"top_users\""));
        assert!(json.contains("\"replies_to_questions\""));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["top_users"][0]["user"], "u1");
        assert_eq!(value["top_users"][0]["replies"], 2);
        assert_eq!(value["top_users"][1]["user"], "u2");
    }
}
