use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::models::{Booking, Lesson};
use crate::records::{booking_times, lesson_times};
use crate::tally::Tally;
use crate::time::TimeOfDay;

pub const TOP_TIMES_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TimeCount {
    #[schema(value_type = String, example = "12:00")]
    pub time: TimeOfDay,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PopularTimeReport {
    #[schema(value_type = Option<String>, example = "12:00")]
    pub most_popular_time: Option<TimeOfDay>,
    pub count: u64,
    pub total_lessons: usize,
    pub total_bookings: usize,
    pub total_time_entries: usize,
    pub unique_times: usize,
    pub top_10_times: Vec<TimeCount>,
    #[schema(value_type = Object)]
    pub all_time_counts: Tally<TimeOfDay>,
}

/// Finds the most frequent start times across lessons and bookings.
///
/// Every extracted time counts once, whether it came from a lesson or a
/// booking.
#[derive(Clone, Default)]
pub struct PopularTimeAggregator;

impl PopularTimeAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, lessons: &[Lesson], bookings: &[Booking]) -> PopularTimeReport {
        let mut times = lesson_times(lessons);
        times.extend(booking_times(bookings));

        let total_time_entries = times.len();
        let tally: Tally<TimeOfDay> = times.into_iter().collect();

        let (most_popular_time, count) = match tally.most_common() {
            Some((time, count)) => (Some(*time), count),
            None => (None, 0),
        };
        let top_10_times = tally
            .ranked(TOP_TIMES_LIMIT)
            .into_iter()
            .map(|(time, count)| TimeCount { time, count })
            .collect();

        info!(
            lessons = lessons.len(),
            bookings = bookings.len(),
            entries = total_time_entries,
            unique = tally.len(),
            "analyzed popular times"
        );

        PopularTimeReport {
            most_popular_time,
            count,
            total_lessons: lessons.len(),
            total_bookings: bookings.len(),
            total_time_entries,
            unique_times: tally.len(),
            top_10_times,
            all_time_counts: tally,
        }
    }
}
