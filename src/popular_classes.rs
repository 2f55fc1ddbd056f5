use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::models::{Booking, Lesson};
use crate::records::Record;
use crate::tally::Tally;
use crate::time::TimeOfDay;

/// Weight of a scheduled lesson.
pub const LESSON_WEIGHT: u64 = 1;
/// Weight of a booking; confirmed attendance counts double.
pub const BOOKING_WEIGHT: u64 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ClassPopularity {
    pub class_name: String,
    #[schema(value_type = String, example = "18:00")]
    pub peak_time: TimeOfDay,
    pub peak_count: u64,
}

impl From<ClassPopularity> for (String, TimeOfDay, u64) {
    fn from(value: ClassPopularity) -> Self {
        (value.class_name, value.peak_time, value.peak_count)
    }
}

/// Per-class weighted start-time counts, classes kept in first-seen order.
#[derive(Default)]
struct ClassTimes<'a> {
    classes: Vec<(&'a str, Tally<TimeOfDay>)>,
    index: HashMap<&'a str, usize>,
}

impl<'a> ClassTimes<'a> {
    fn record(&mut self, record: Record<'a>, weight: u64) {
        let Some(class_name) = record.class_name_of().filter(|name| !name.is_empty()) else {
            return;
        };
        let Some(time) = record.time_of() else {
            return;
        };

        let position = *self.index.entry(class_name).or_insert_with(|| {
            self.classes.push((class_name, Tally::new()));
            self.classes.len() - 1
        });
        self.classes[position].1.add(time, weight);
    }

    fn peaks(&self) -> Vec<ClassPopularity> {
        self.classes
            .iter()
            .filter_map(|(class_name, times)| {
                let (peak_time, peak_count) = times.most_common()?;
                debug!(class = *class_name, peak = %peak_time, count = peak_count, "class peak");
                Some(ClassPopularity {
                    class_name: class_name.to_string(),
                    peak_time: *peak_time,
                    peak_count,
                })
            })
            .collect()
    }
}

/// Finds the most popular start time of every class.
///
/// Lessons add [`LESSON_WEIGHT`] and bookings add [`BOOKING_WEIGHT`] to the
/// class/time pair they resolve to. Records without both a class name and a
/// start time are ignored.
#[derive(Clone, Default)]
pub struct PopularClassAggregator;

impl PopularClassAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Returns one entry per class, most popular class first.
    pub fn analyze(&self, lessons: &[Lesson], bookings: &[Booking]) -> Vec<ClassPopularity> {
        let mut class_times = ClassTimes::default();
        for lesson in lessons {
            class_times.record(Record::Lesson(lesson), LESSON_WEIGHT);
        }
        for booking in bookings {
            class_times.record(Record::Booking(booking), BOOKING_WEIGHT);
        }

        let mut results = class_times.peaks();
        results.sort_by(|a, b| b.peak_count.cmp(&a.peak_count));

        info!(
            lessons = lessons.len(),
            bookings = bookings.len(),
            classes = results.len(),
            "analyzed class popularity"
        );
        results
    }
}
