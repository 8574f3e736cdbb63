use crate::domain::model::{Appointment, SearchCriterion};

/// 依服務端回傳順序找出第一個符合條件的時段，不排序、不挑「最好」的。
/// 每個被排除的候選都會以 debug 等級記錄原因。
pub fn first_match<'a>(
    appointments: &'a [Appointment],
    criterion: &SearchCriterion,
) -> Option<&'a Appointment> {
    appointments.iter().find(|appointment| match criterion.check(appointment) {
        None => true,
        Some(reason) => {
            tracing::debug!(
                "rejecting appointment {} {} due to {}",
                appointment.start_time,
                appointment.location_name,
                reason
            );
            false
        }
    })
}
