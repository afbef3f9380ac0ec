use std::time::{Duration, Instant};

/// Host wall-clock timer around one measured region.
#[derive(Debug, Default)]
pub struct Timer {
    start: Option<Instant>,
    elapsed: Duration,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn measure_start(&mut self) {
        self.start = Some(Instant::now());
    }

    pub fn measure_end(&mut self) {
        if let Some(start) = self.start.take() {
            self.elapsed = start.elapsed();
        } else {
            log::warn!("Timer::measure_end called without measure_start");
        }
    }

    pub fn get(&self) -> Duration {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_without_start_keeps_previous_value() {
        let mut timer = Timer::new();
        timer.measure_end();
        assert_eq!(timer.get(), Duration::ZERO);
    }

    #[test]
    fn measures_a_sleep() {
        let mut timer = Timer::new();
        timer.measure_start();
        std::thread::sleep(Duration::from_millis(2));
        timer.measure_end();
        assert!(timer.get() >= Duration::from_millis(2));
    }
}
