use anyhow::Error;
use pathwatch_core::input::xml::TokenizationError;
use yansi::{Condition, Paint};

fn stderr_colors() -> Condition {
    Condition::from(|| Condition::stderr_is_tty() && Condition::clicolor() && Condition::no_color())
}

/// Formats an error for the terminal. Problems in the document are
/// reported with their line number.
pub fn render_error(err: &Error) -> String {
    render(err, stderr_colors())
}

fn render(err: &Error, colors: Condition) -> String {
    match err.downcast_ref::<TokenizationError>() {
        Some(te) => format!(
            "{}\n  {} ({})",
            format!("XML error on line {}:", te.line())
                .red()
                .bold()
                .whenever(colors),
            te.message(),
            te.code().description().dim().whenever(colors),
        ),
        None => format!("{} {err:#}", "Error:".red().bold().whenever(colors)),
    }
}
