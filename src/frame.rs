use instant::Instant;

/// Wall-clock delta between consecutive frames.
#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous tick. The first tick has no baseline and
    /// reports 0.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let dt = match self.last {
            Some(last) if now > last => (now - last).as_secs_f32(),
            _ => 0.0,
        };
        self.last = Some(now);
        dt
    }
}

/// Counts frames and reports once per accumulated second.
#[derive(Debug, Default)]
pub struct FpsCounter {
    elapsed: f32,
    frames: u32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the frame count when more than a second has accumulated.
    /// Only one second is removed from the accumulator so the remainder
    /// carries into the next window.
    pub fn tick(&mut self, dt: f32) -> Option<u32> {
        self.elapsed += dt;
        self.frames += 1;

        if self.elapsed > 1.0 {
            let frames = self.frames;
            self.frames = 0;
            self.elapsed -= 1.0;
            return Some(frames);
        }
        None
    }

    pub fn residual(&self) -> f32 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn first_tick_reports_zero() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        assert_eq!(clock.tick(start), 0.0);
        let dt = clock.tick(start + Duration::from_millis(250));
        assert!((dt - 0.25).abs() < 1e-6);
    }

    #[test]
    fn clock_never_goes_negative() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick(start + Duration::from_millis(10));
        assert_eq!(clock.tick(start), 0.0);
    }

    #[test]
    fn fps_keeps_sub_second_remainder() {
        let mut fps = FpsCounter::new();
        let reports: Vec<_> = [0.5, 0.5, 0.5, 0.5, 0.3]
            .into_iter()
            .filter_map(|dt| fps.tick(dt))
            .collect();
        assert_eq!(reports, vec![3, 2]);
        assert!((fps.residual() - 0.3).abs() < 1e-5);
    }

    #[test]
    fn exactly_one_second_does_not_report() {
        let mut fps = FpsCounter::new();
        assert_eq!(fps.tick(0.5), None);
        assert_eq!(fps.tick(0.5), None);
        assert_eq!(fps.tick(0.01), Some(3));
    }
}
