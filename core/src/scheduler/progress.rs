use indicatif::{ProgressBar, ProgressStyle};

/// Overall progress bar for interactive text runs. Disabled for structured
/// output formats and quiet mode so it never pollutes machine-read streams.
pub struct ProgressMonitor {
    bar: ProgressBar,
    enabled: bool,
}

impl ProgressMonitor {
    pub fn new(total_items: usize, enabled: bool) -> Self {
        if !enabled {
            return Self {
                bar: ProgressBar::hidden(),
                enabled: false,
            };
        }

        let bar = ProgressBar::new(total_items as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} items ({percent}%) {msg}")
                .unwrap()
                .progress_chars("█▓▒░  "),
        );
        Self { bar, enabled: true }
    }

    pub fn item_done(&self, item: &str, success: bool) {
        if !self.enabled {
            return;
        }
        self.bar.inc(1);
        let marker = if success { "ok" } else { "fail" };
        self.bar.set_message(format!("{marker}: {item}"));
    }

    pub fn finish(&self, cancelled: bool) {
        if !self.enabled {
            return;
        }
        if cancelled {
            self.bar.abandon_with_message("cancelled");
        } else {
            self.bar.finish_and_clear();
        }
    }
}
