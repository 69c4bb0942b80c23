//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command. Results that scripts might
//! capture (keys, ciphertext, plaintext) go to stdout unadorned via
//! [`value`]; everything decorative goes to stderr.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::bench::BenchReport;

/// Print a raw result line to stdout.
pub fn value(msg: &str) {
    println!("{msg}");
}

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    eprintln!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    eprintln!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    eprintln!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print benchmark results (Case, Runs, Total, Mean).
pub fn print_bench_table(reports: &[BenchReport]) {
    if reports.is_empty() {
        info("No benchmark cases ran.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Case", "Runs", "Total", "Mean"]);

    for r in reports {
        table.add_row(vec![
            r.label.clone(),
            r.runs.to_string(),
            format!("{:.2?}", r.total),
            format!("{:.2?}", r.mean()),
        ]);
    }

    println!("{table}");
}
