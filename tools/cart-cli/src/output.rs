//! Output formatting for the CLI.

use cart_model::Money;
use cart_sync::MutationOutcome;
use console::style;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| format!("{:width$}", col, width = width))
            .collect();
        println!("  {}", formatted.join("  "));
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Badge for how a mutation settled.
pub fn outcome_badge(outcome: MutationOutcome) -> String {
    match outcome {
        MutationOutcome::Synced => style("synced").green().to_string(),
        MutationOutcome::Local => style("local").cyan().to_string(),
        MutationOutcome::Refreshed => style("refreshed").yellow().to_string(),
        MutationOutcome::Skipped => style("skipped").dim().to_string(),
        MutationOutcome::NotFound => style("not in cart").dim().to_string(),
    }
}

/// Format a price, striking through a higher reference price.
pub fn format_price(display: Money, reference: Money, discount_percent: u32) -> String {
    if reference.amount_minor > display.amount_minor {
        format!(
            "{} {} {}",
            display.display(),
            style(reference.display()).dim().strikethrough(),
            style(format!("-{}%", discount_percent)).green()
        )
    } else {
        display.display()
    }
}

/// Format an optional fee, `free` for zero.
pub fn format_fee(fee: Option<Money>) -> String {
    match fee {
        Some(m) if m.is_zero() => style("free").green().to_string(),
        Some(m) => m.display(),
        None => style("-").dim().to_string(),
    }
}
