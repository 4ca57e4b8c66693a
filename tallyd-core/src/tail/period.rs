use chrono::NaiveDateTime;

/// Half-open time interval `[start, end)` of records in scope for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Period {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// An empty period whose successor starts at `at`.
    pub fn ending_at(at: NaiveDateTime) -> Self {
        Self { start: at, end: at }
    }

    /// The period following this one, up to `round_start`.
    pub fn next(&self, round_start: NaiveDateTime) -> Self {
        Self {
            start: self.end,
            end: round_start,
        }
    }

    pub fn contains(&self, time: NaiveDateTime) -> bool {
        self.start <= time && time < self.end
    }
}
