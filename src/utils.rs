/// Group numeric digits to facilitate reading long numbers
pub fn group_digits<F: std::fmt::Display>(n: F) -> String {
    use numsep::{separate, Locale};
    separate(n, Locale::English)
}


pub mod timing {

    use super::group_digits;
    use std::time::{Duration, Instant};
    use tracing::info;

    /// Reports the time taken by consecutive stages of a computation.
    ///
    /// Stages are always timed, but only reported when the progress is
    /// `verbose`.
    pub struct Progress {
        previous: Instant,
        verbose: bool,
    }

    impl Progress {

        pub fn new(verbose: bool) -> Self { Self { previous: Instant::now(), verbose } }

        // Report message followed by time elapsed since the previous stage
        pub fn done_with_message(&mut self, message: &str) -> Duration {
            let elapsed = self.previous.elapsed();
            if self.verbose { info!("{message}: {} ms", group_digits(elapsed.as_millis())) }
            self.start_timer();
            elapsed
        }

        fn start_timer(&mut self) { self.previous = Instant::now() }
    }
}
