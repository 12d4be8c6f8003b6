use std::{fmt::Display, ops::Add};

/// Running min / max / mean of a non-negative count.
/// Mergeable, so per-thread accumulators can be reduced at the end of a parallel loop.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Stats {
    pub count: usize,
    pub min: usize,
    pub max: usize,
    pub avg: f32,
}

impl Stats {
    pub fn new_single(v: usize) -> Self {
        Stats {
            count: 1,
            min: v,
            max: v,
            avg: v as f32,
        }
    }

    pub fn add_sample(&mut self, value: usize) {
        *self = *self + Stats::new_single(value);
    }
}

impl Add for Stats {
    type Output = Stats;

    fn add(self, other: Stats) -> Stats {
        let count = self.count + other.count;
        Stats {
            count,
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            avg: if count > 0 {
                (self.avg * self.count as f32 + other.avg * other.count as f32) / count as f32
            } else {
                0.0
            },
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            count: 0,
            min: usize::MAX,
            max: 0,
            avg: 0.0,
        }
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "no samples")
        } else {
            write!(
                f,
                "{} - {}; avg {:.1}; {} samples",
                self.min, self.max, self.avg, self.count
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;

    #[test]
    fn add_sample_to_empty() {
        let mut s = Stats::default();
        s.add_sample(20);
        assert!(s == Stats::new_single(20));
    }

    #[test]
    fn merge() {
        let mut b = Stats::new_single(30);
        b.add_sample(50);
        let m = Stats::new_single(10) + b;
        assert!(m.count == 3);
        assert!(m.min == 10);
        assert!(m.max == 50);
        assert!(m.avg == 30.0);
    }

    #[test]
    fn default_is_neutral() {
        let s = Stats::new_single(5);
        assert!(Stats::default() + s == s);
        assert!(s + Stats::default() == s);
        assert!(Stats::default() + Stats::default() == Stats::default());
    }

    #[test]
    fn display_format() {
        let output = format!("{}", Stats::new_single(42));
        assert!(output == "42 - 42; avg 42.0; 1 samples");
        assert!(format!("{}", Stats::default()) == "no samples");
    }
}
