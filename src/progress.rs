use indicatif::{ProgressBar, ProgressStyle};

/// Bar over the DBF records of one extraction. Draws to stderr and stays
/// invisible when stderr is not a terminal.
pub fn record_bar(total: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{elapsed_precise}] {wide_bar:.cyan/blue} {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    bar.set_message("Extracting DBF records");
    bar
}
