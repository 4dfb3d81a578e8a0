use std::time::Duration;

use colored::Colorize;
use comfy_table::{presets::ASCII_BORDERS_ONLY, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use upnqr_core::{Field, FieldIssue};

use crate::output::{CommandOutput, FieldRow, OutputHandler};

const SPINNER_TICKS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SPINNER_TICK_MS: u64 = 80;
const VALUE_TRUNCATE_LEN: usize = 42;

pub struct OperatorOutput {
    quiet: bool,
    no_color: bool,
    spinner: Option<ProgressBar>,
}

impl OperatorOutput {
    pub fn new(quiet: bool, no_color: bool) -> Self {
        Self {
            quiet,
            no_color,
            spinner: None,
        }
    }

    fn success_text(&self, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            text.green().to_string()
        }
    }

    fn error_text(&self, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            text.red().to_string()
        }
    }

    fn dim_text(&self, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            text.dimmed().to_string()
        }
    }

    fn start_spinner(&mut self, operation: &str) {
        if self.quiet {
            return;
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style.tick_strings(&SPINNER_TICKS));
        }
        spinner.set_message(format!("{operation}..."));
        spinner.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
        self.spinner = Some(spinner);
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn truncate(value: &str, max_len: usize) -> String {
        let mut chars = value.chars();
        let truncated: String = chars.by_ref().take(max_len).collect();
        if chars.next().is_some() {
            format!("{truncated}...")
        } else {
            truncated
        }
    }

    pub fn render_field_table(&self, rows: &[FieldRow]) -> String {
        let mut table = Table::new();
        table
            .load_preset(ASCII_BORDERS_ONLY)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Field", "Value"]);

        for row in rows {
            let value = if row.value.is_empty() {
                self.dim_text("-")
            } else {
                Self::truncate(&row.value, VALUE_TRUNCATE_LEN)
            };
            table.add_row(vec![row.label.to_string(), value]);
        }

        table.to_string()
    }

    fn suggestion_for(field: Field) -> &'static str {
        match field {
            Field::PayerIban | Field::RecipientIban => {
                "Suggestion: use two letters and 17 digits, e.g. SI56 0203 6025 3863 406."
            }
            Field::PayerReference | Field::RecipientReference => {
                "Suggestion: start with SI or RF and two check digits, e.g. SI00 12345."
            }
            Field::Amount => "Suggestion: pass a positive amount in euros, e.g. \"55.58\".",
            Field::PaymentDate | Field::PaymentDueDate => {
                "Suggestion: write dates as YYYY-MM-DD."
            }
            Field::PurposeCode => "Suggestion: use a four letter ISO 20022 code such as OTHR.",
            _ => "Suggestion: shorten the value or remove it from the order.",
        }
    }

    pub fn format_field_issues(issues: &[FieldIssue]) -> Vec<String> {
        issues
            .iter()
            .map(|issue| {
                format!(
                    "{}: {}\n  {}",
                    issue.field,
                    issue.message,
                    Self::suggestion_for(issue.field)
                )
            })
            .collect()
    }
}

impl OutputHandler for OperatorOutput {
    fn start_operation(&mut self, operation: &str) {
        self.start_spinner(operation);
    }

    fn progress(&mut self, message: &str) {
        if self.quiet {
            return;
        }

        if let Some(spinner) = &self.spinner {
            spinner.set_message(message.to_string());
        } else {
            eprintln!("{message}");
        }
    }

    fn display_order(&mut self, rows: &[FieldRow]) {
        if self.quiet {
            return;
        }

        self.stop_spinner();
        println!("{}", self.render_field_table(rows));
    }

    fn display_field_issues(&mut self, issues: &[FieldIssue]) {
        self.stop_spinner();
        for formatted in Self::format_field_issues(issues) {
            eprintln!("{}", self.error_text(&formatted));
        }
    }

    fn complete(&mut self, output: &CommandOutput) {
        self.stop_spinner();

        if let Some(body) = &output.body {
            print!("{body}");
            if !body.ends_with('\n') {
                println!();
            }
        }

        if output.ok {
            if !self.quiet {
                eprintln!("{}", self.success_text(&output.message));
            }
        } else {
            eprintln!("{}", self.error_text(&output.message));
        }

        if !self.quiet {
            for detail in &output.details {
                eprintln!("{detail}");
            }
        }
    }
}
