use core::cmp::Ordering;
use num::{Integer, One};
use serde::{Deserialize, Serialize};

/// Inclusive [start, end] range of clock offsets
/// <N>: Any integer type
#[derive(Deserialize, Serialize, Debug, Copy, Clone, Eq)]
pub struct TimeRange<N>(pub N, pub N)
where
    N: Integer + One + Copy;

impl<N> TimeRange<N>
where
    N: Integer + One + Copy,
{
    /// Construct a new Time Range
    /// Range is inclusive on [start, end]
    /// # Examples
    /// ```
    /// use treffzeit_libs::time::TimeRange;
    ///
    /// let test = TimeRange::new(540, 600);
    ///
    /// assert_eq!(test.0, 540);
    /// assert_eq!(test.1, 600);
    /// ```
    pub fn new(start: N, end: N) -> TimeRange<N> {
        TimeRange(start, end)
    }

    /// Convenience function for readability
    /// Returns the start of the TimeRange
    ///
    /// # Examples
    /// ```
    /// use treffzeit_libs::time::TimeRange;
    ///
    /// let test = TimeRange::new(540, 600);
    /// assert_eq!(test.0, test.start());
    /// ```
    pub fn start(self) -> N {
        self.0
    }

    /// Convenience function for readability
    /// Returns the end of the TimeRange
    ///
    /// # Examples
    /// ```
    /// use treffzeit_libs::time::TimeRange;
    ///
    /// let test = TimeRange::new(540, 600);
    /// assert_eq!(test.1, test.end());
    /// ```
    pub fn end(self) -> N {
        self.1
    }
}

impl<N> Ord for TimeRange<N>
where
    N: Integer + Copy,
{
    /// Custom comparison of TimeRange
    /// TimeRanges are equivalent if the times overlap
    /// TimeRanges are less IIF start and end are less
    /// TimeRanges are greater IIF start and end are greater
    ///
    /// # Examples
    /// ```
    /// use treffzeit_libs::time::TimeRange;
    ///
    /// let a = TimeRange::new(0, 0);
    /// let b = TimeRange::new(30, 30);
    ///
    /// assert!(a < b);
    ///
    /// let a = TimeRange::new(0, 30);
    /// assert_eq!(a, b);
    ///
    /// let a = TimeRange::new(30, 60);
    /// let b = TimeRange::new(0, 0);
    /// assert!(a > b);
    /// ```
    fn cmp(&self, other: &Self) -> Ordering {
        match self.start().cmp(&other.start()) {
            Ordering::Less if self.end() < other.start() => Ordering::Less,
            Ordering::Greater if self.start() > other.end() => Ordering::Greater,
            _ => Ordering::Equal,
        }
    }
}

impl<N> PartialOrd for TimeRange<N>
where
    N: Integer + Copy,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N> PartialEq for TimeRange<N>
where
    N: Integer + Copy,
{
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

pub trait TimeMerge<N>
where
    N: Integer + Copy,
{
    fn time_merge(self, step: N) -> Vec<TimeRange<N>>;
}

impl<'a, T, N> TimeMerge<N> for T
where
    T: Iterator<Item = &'a TimeRange<N>>,
    N: 'a + Integer + One + Copy,
{
    /// Combines overlapping and adjacent TimeRanges together.
    /// Two ranges are adjacent when they are exactly `step` apart;
    /// the grid uses its slot granularity here so consecutive slot
    /// starts coalesce into one run. Input must be sorted by start.
    ///
    /// # Examples
    /// ```
    /// use treffzeit_libs::time::{TimeMerge, TimeRange};
    ///
    /// let unmerged = vec![
    ///     TimeRange::new(540, 540),
    ///     TimeRange::new(570, 570),
    ///     TimeRange::new(600, 600),
    ///     TimeRange::new(690, 690),
    /// ];
    ///
    /// assert_eq!(
    ///     unmerged.iter().time_merge(30),
    ///     vec![TimeRange::new(540, 600), TimeRange::new(690, 690)]
    /// );
    /// ```
    fn time_merge(self, step: N) -> Vec<TimeRange<N>> {
        let size_hint = self.size_hint().1.unwrap_or(0);
        let (last, mut acc) = self.fold(
            (None, Vec::with_capacity(size_hint)),
            |(last, mut acc), &curr| match last {
                None => (Some(curr), acc),
                Some(time) => {
                    if TimeRange::new(time.start(), time.end() + step) == curr {
                        (
                            Some(TimeRange::new(
                                time.start().min(curr.start()),
                                time.end().max(curr.end()),
                            )),
                            acc,
                        )
                    } else {
                        acc.push(time);
                        (Some(curr), acc)
                    }
                }
            },
        );

        if let Some(time) = last {
            acc.push(time);
        }

        acc
    }
}
