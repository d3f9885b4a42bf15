//! Console output formatter for analysis sessions

use crate::output::formatter::OutputFormatter;
use crate::output::markdown::render_markdown;
use colored::Colorize;
use shoplens_application::{ChatOutcome, SelectionOutcome};
use shoplens_domain::{AnalysisOutcome, AnalysisSession, DetectedObject, Role};

/// Formats analysis sessions for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete session: detections, report and conversation
    pub fn format(session: &AnalysisSession) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("shoplens"));
        output.push('\n');

        if let Some(source) = session.image().source() {
            output.push_str(&format!(
                "{} {} ({} bytes)\n\n",
                "Image:".cyan().bold(),
                source.file_name,
                source.byte_len
            ));
        }

        output.push_str(&Self::format_detections(session));

        if session.report().is_some() {
            output.push_str(&Self::format_report(session));
        } else if let Some(summary) = session.summary() {
            output.push_str(&format!("\n{}\n", summary.dimmed()));
        }

        if !session.conversation().is_empty() {
            output.push_str(&Self::format_conversation(session));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format the session as JSON
    pub fn format_json(session: &AnalysisSession) -> String {
        serde_json::to_string_pretty(session).unwrap_or_else(|_| "{}".to_string())
    }

    /// Detected objects with their overlay rectangles
    pub fn format_detections(session: &AnalysisSession) -> String {
        let mut output = Self::section_header("Detected Objects");
        let objects = session.detected_objects();

        if objects.is_empty() {
            output.push_str("  No objects detected. Ask a question to analyze the image.\n");
            return output;
        }

        let targeted = session.targeted_object().map(|(index, _)| index);
        for (index, object) in objects.iter().enumerate() {
            output.push_str(&Self::detection_line(index, object, targeted == Some(index)));
            output.push('\n');
        }
        output
    }

    fn detection_line(index: usize, object: &DetectedObject, targeted: bool) -> String {
        let marker = if targeted { ">" } else { " " };
        let label = if object.is_identified() {
            object.label().as_str().green().bold()
        } else {
            object.label().as_str().normal()
        };
        let position = match object.bounding_box {
            Some(bbox) => {
                let rect = bbox.to_overlay();
                format!(
                    "top {:.0}% left {:.0}% {:.0}x{:.0}%",
                    rect.top, rect.left, rect.width, rect.height
                )
            }
            None => "no region".to_string(),
        };
        format!(
            "{} [{}] {}  {}",
            marker.yellow().bold(),
            index,
            label,
            position.dimmed()
        )
    }

    /// Verdict, pricing, sentiment and alternatives of the latest report
    pub fn format_report(session: &AnalysisSession) -> String {
        let Some(report) = session.report() else {
            return String::new();
        };
        let mut output = Self::section_header("Analysis");

        let badge = session.outcome().badge();
        let badge = match session.outcome() {
            AnalysisOutcome::HighlyRecommended | AnalysisOutcome::Recommended => {
                badge.green().bold()
            }
            AnalysisOutcome::NeedsAlternatives => badge.yellow().bold(),
            AnalysisOutcome::PendingSelection => badge.dimmed(),
        };
        output.push_str(&format!("{}\n", badge));

        if let Some(product) = session.identified_product() {
            output.push_str(&format!("{} {}\n", "Product:".cyan().bold(), product));
        }
        output.push_str(&format!("{} {}\n", "Price:".cyan().bold(), report.price_text()));
        output.push_str(&format!("{} {}\n", "Verdict:".cyan().bold(), report.verdict()));
        if let Some(score) = report.price_analysis.as_ref().and_then(|p| p.price_score) {
            output.push_str(&format!("{} {:.1}\n", "Price score:".cyan().bold(), score));
        }
        if let Some(details) = report
            .price_analysis
            .as_ref()
            .and_then(|p| p.details.as_deref())
            .filter(|d| !d.trim().is_empty())
        {
            output.push_str(&format!("  {}\n", details.dimmed()));
        }

        output.push_str(&format!("\n{}\n", render_markdown(report.summary_text())));

        if let Some(sentiment) = &report.community_sentiment {
            output.push_str(&format!("\n{}", "Community:".cyan().bold()));
            match sentiment.trust_score {
                Some(score) => output.push_str(&format!(" trust {:.1}/10\n", score)),
                None => output.push('\n'),
            }
            if let Some(summary) = sentiment.summary.as_deref() {
                output.push_str(&format!("  {}\n", summary));
            }
            for flag in &sentiment.red_flags {
                output.push_str(&format!("  {} {}\n", "!".red().bold(), flag));
            }
        }

        if !report.alternatives.is_empty() {
            output.push_str(&format!("\n{}\n", "Alternatives:".cyan().bold()));
            for alternative in &report.alternatives {
                let score = alternative
                    .score
                    .map(|s| format!(" ({:.0}/100)", s))
                    .unwrap_or_default();
                output.push_str(&format!(
                    "  * {}{} - {}\n",
                    alternative.name.bold(),
                    score,
                    alternative.price_label()
                ));
                if let Some(reason) = alternative.reason.as_deref() {
                    output.push_str(&format!("    {}\n", reason.dimmed()));
                }
                if let Some(link) = alternative.link.as_deref() {
                    output.push_str(&format!("    {}\n", link.underline()));
                }
            }
        }

        if let Some(link) = report.purchase_link() {
            output.push_str(&format!("\n{} {}\n", "Buy:".cyan().bold(), link.underline()));
        }

        output
    }

    /// The conversation so far, assistant turns rendered as markdown
    pub fn format_conversation(session: &AnalysisSession) -> String {
        let mut output = Self::section_header("Conversation");
        for turn in session.conversation() {
            match turn.role {
                Role::User => {
                    output.push_str(&format!("{} {}\n", "You:".blue().bold(), turn.text()));
                }
                Role::Assistant if turn.is_pending => {
                    output.push_str(&format!("{} {}\n", "Assistant:".green().bold(), "...".dimmed()));
                }
                Role::Assistant => {
                    output.push_str(&format!(
                        "{}\n{}\n",
                        "Assistant:".green().bold(),
                        render_markdown(turn.text())
                    ));
                }
            }
        }
        output
    }

    /// One analyzed selection
    pub fn format_selection(session: &AnalysisSession, outcome: &SelectionOutcome) -> String {
        let mut output = String::new();
        if let Some(object) = session.detected_objects().get(outcome.index) {
            let cached = if outcome.from_cache {
                format!(" {}", "(cached)".dimmed())
            } else {
                String::new()
            };
            output.push_str(&format!(
                "{} [{}] {}{}\n",
                "Selected".cyan().bold(),
                outcome.index,
                object.label(),
                cached
            ));
        }
        output.push_str(&Self::format_report(session));
        output
    }

    /// One answered chat turn
    pub fn format_chat(session: &AnalysisSession, outcome: &ChatOutcome) -> String {
        let mut output = format!(
            "{}\n{}\n",
            "Assistant:".green().bold(),
            render_markdown(&outcome.reply)
        );
        if let Some(index) = outcome.targeted_index
            && let Some(object) = session.detected_objects().get(index)
        {
            output.push_str(&format!(
                "{} [{}] {}\n",
                "Looking at".dimmed(),
                index,
                object.label()
            ));
        }
        output
    }

    pub fn format_error(message: &str) -> String {
        format!("{} {}", "Error:".red().bold(), message)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, session: &AnalysisSession) -> String {
        Self::format(session)
    }

    fn format_json(&self, session: &AnalysisSession) -> String {
        Self::format_json(session)
    }
}
