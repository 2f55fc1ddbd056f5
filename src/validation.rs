use crate::error::ApiError;
use crate::models::AnalysisRequest;

pub fn validate_batch(request: &AnalysisRequest, max_records: usize) -> Result<(), ApiError> {
    let total = request.lessons.len() + request.bookings.len();
    if total <= max_records {
        Ok(())
    } else {
        Err(ApiError::PayloadTooLarge(format!(
            "at most {max_records} lessons and bookings may be analyzed at once, got {total}"
        )))
    }
}
