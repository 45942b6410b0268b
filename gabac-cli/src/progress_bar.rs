use std::io::Read;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

#[derive(Debug, Clone)]
pub(crate) struct CodingProgressBar {
    bar: ProgressBar,
}

impl CodingProgressBar {
    pub fn new() -> CodingProgressBar {
        let bar = ProgressBar::hidden();
        bar.set_style(ProgressStyle::default_spinner());
        bar.enable_steady_tick(Duration::from_millis(50));

        Self { bar }
    }

    pub fn show(&self) {
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    pub fn println(&self, msg: String) {
        self.bar.println(msg);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear()
    }

    pub fn set_bytes(&self, length: Option<u64>) {
        match length {
            Some(length) => {
                self.bar.set_length(length);
                self.bar.set_style(
                    ProgressStyle::default_bar()
                        .template("{wide_bar} {bytes}/{total_bytes} [ETA {eta}]")
                        .expect("Invalid progress bar template"),
                );
            }
            None => {
                self.bar.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner} {bytes}/? ({bytes_per_sec}) {msg}")
                        .expect("Invalid progress bar template"),
                );
            }
        }
        self.bar.set_position(0);
    }

    pub fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }
}

/// A reader wrapper that advances the progress bar as bytes are consumed.
pub(crate) struct ProgressRead<R> {
    inner: R,
    bar: CodingProgressBar,
}

impl<R: Read> ProgressRead<R> {
    pub fn new(inner: R, bar: CodingProgressBar) -> Self {
        Self { inner, bar }
    }
}

impl<R: Read> Read for ProgressRead<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let num_read = self.inner.read(buf)?;
        self.bar.inc(num_read as u64);
        Ok(num_read)
    }
}
