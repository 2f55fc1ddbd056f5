use crate::models::{Booking, ClassOptionRef, Lesson};
use crate::time::{TimeOfDay, extract_time_of_day};

/// Either input shape, viewed through the fields the aggregators need.
#[derive(Debug, Clone, Copy)]
pub enum Record<'a> {
    Lesson(&'a Lesson),
    Booking(&'a Booking),
}

impl<'a> Record<'a> {
    /// Bookings only resolve when their lesson was expanded, not when it is an id.
    fn lesson(self) -> Option<&'a Lesson> {
        match self {
            Record::Lesson(lesson) => Some(lesson),
            Record::Booking(booking) => booking.expanded_lesson(),
        }
    }

    pub fn time_of(self) -> Option<TimeOfDay> {
        let start_time = self.lesson()?.start_time.as_ref()?;
        if !start_time.is_set() {
            return None;
        }
        extract_time_of_day(start_time)
    }

    pub fn class_name_of(self) -> Option<&'a str> {
        match self.lesson()?.class_option.as_ref()? {
            ClassOptionRef::Expanded(option) => option.name.as_deref(),
            ClassOptionRef::Reference(_) => None,
        }
    }
}

pub fn lesson_times(lessons: &[Lesson]) -> Vec<TimeOfDay> {
    lessons
        .iter()
        .filter_map(|lesson| Record::Lesson(lesson).time_of())
        .collect()
}

pub fn booking_times(bookings: &[Booking]) -> Vec<TimeOfDay> {
    bookings
        .iter()
        .filter_map(|booking| Record::Booking(booking).time_of())
        .collect()
}
