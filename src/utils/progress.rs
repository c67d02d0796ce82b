//! Terminal spinner for the build, crawl and query phases.
//!
//! Becomes a no-op when the `progress` feature is disabled.

#[cfg(feature = "progress")]
mod spinner {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Duration;

    pub struct Activity {
        bar: ProgressBar,
    }

    impl Activity {
        pub fn start(message: impl Into<String>) -> Self {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
                bar.set_style(style);
            }
            bar.set_message(message.into());
            bar.enable_steady_tick(Duration::from_millis(80));
            Self { bar }
        }

        pub fn finish(self, message: impl Into<String>) {
            self.bar.finish_with_message(message.into());
        }
    }
}

#[cfg(not(feature = "progress"))]
mod spinner {
    pub struct Activity;

    impl Activity {
        pub fn start(_message: impl Into<String>) -> Self {
            Activity
        }

        pub fn finish(self, _message: impl Into<String>) {}
    }
}

pub use spinner::Activity;
