// Local validation of a booking before anything goes over the wire.
//
// The grid may have been classified a while ago, so "now" is checked again
// here. A slot that turned past since the last load is rejected like any other
// unavailable slot.

use crate::modules::schedule::core::schedule_config::Role;
use crate::modules::schedule::core::slot::{SlotKey, SlotState};
use crate::modules::schedule::core::time_slot_grid::SlotGrid;
use crate::modules::schedule::use_cases::book_appointment::command::{
    BookAppointment, BookingRequest,
};
use crate::modules::schedule::use_cases::decide_error::DecideError;
use chrono::{FixedOffset, NaiveDateTime, TimeZone};

pub fn decide_selection(
    grid: &SlotGrid,
    slot: SlotKey,
    now: NaiveDateTime,
) -> Result<SlotKey, DecideError> {
    if grid.state(&slot) != SlotState::Available || slot.instant() <= now {
        return Err(DecideError::SlotNotAvailable(slot));
    }
    Ok(slot)
}

pub fn decide_booking(
    grid: &SlotGrid,
    command: BookAppointment,
    role: Role,
    now: NaiveDateTime,
    offset: FixedOffset,
) -> Result<BookingRequest, DecideError> {
    let slot = command.slot.ok_or(DecideError::NoSelection)?;
    let slot = decide_selection(grid, slot, now)?;

    let member_id = if role.books_for_member() {
        let id = command
            .member_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(DecideError::MemberRequired)?;
        Some(id)
    } else {
        None
    };

    let appointment_time = offset
        .from_local_datetime(&slot.instant())
        .single()
        .ok_or(DecideError::UnrepresentableTime(slot))?;

    Ok(BookingRequest {
        slot,
        appointment_time,
        member_id,
    })
}

#[cfg(test)]
mod book_appointment_decide_tests {
    use super::*;
    use crate::modules::schedule::core::slot::{SlotGranularity, WorkingHours};
    use crate::modules::schedule::core::time_slot_grid::classify;
    use crate::modules::schedule::core::week_window::WeekWindow;
    use crate::tests::fixtures::appointments::{AppointmentBuilder, local};
    use chrono::{NaiveDate, NaiveTime};
    use rstest::{fixture, rstest};

    fn key(day: u32, h: u32) -> SlotKey {
        SlotKey::new(
            NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            NaiveTime::from_hms_opt(h, 0, 0).unwrap(),
        )
    }

    fn offset(hours: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600).unwrap()
    }

    #[fixture]
    fn grid() -> SlotGrid {
        let window = WeekWindow::starting(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        let hours = WorkingHours::between_hours(9, 17, SlotGranularity::Hourly).unwrap();
        let booked = vec![AppointmentBuilder::new().at(2024, 6, 11, 14, 0).build()];
        classify(&window, &hours, &booked, local(2024, 6, 10, 12, 0))
    }

    fn command(slot: Option<SlotKey>, member_id: Option<&str>) -> BookAppointment {
        BookAppointment {
            slot,
            member_id: member_id.map(String::from),
        }
    }

    #[rstest]
    fn it_should_turn_an_available_slot_into_an_absolute_booking_time(grid: SlotGrid) {
        let request = decide_booking(
            &grid,
            command(Some(key(12, 10)), None),
            Role::Member,
            local(2024, 6, 10, 12, 0),
            offset(2),
        )
        .unwrap();
        assert_eq!(request.slot, key(12, 10));
        assert_eq!(request.appointment_time.naive_local(), key(12, 10).instant());
        assert_eq!(request.appointment_time.offset(), &offset(2));
        assert_eq!(request.member_id, None);
    }

    #[rstest]
    fn it_should_drop_a_member_id_for_the_member_role(grid: SlotGrid) {
        let request = decide_booking(
            &grid,
            command(Some(key(12, 10)), Some("7")),
            Role::Member,
            local(2024, 6, 10, 12, 0),
            offset(0),
        )
        .unwrap();
        assert_eq!(request.member_id, None);
    }

    #[rstest]
    #[case(None, Err(DecideError::MemberRequired))]
    #[case(Some("  "), Err(DecideError::MemberRequired))]
    #[case(Some("7"), Ok(Some("7".to_string())))]
    fn personal_trainers_book_for_a_chosen_member(
        grid: SlotGrid,
        #[case] member_id: Option<&str>,
        #[case] expected: Result<Option<String>, DecideError>,
    ) {
        let result = decide_booking(
            &grid,
            command(Some(key(12, 10)), member_id),
            Role::PersonalTrainer,
            local(2024, 6, 10, 12, 0),
            offset(0),
        )
        .map(|request| request.member_id);
        assert_eq!(result, expected);
    }

    #[rstest]
    #[case::booked(key(11, 14))]
    #[case::past(key(10, 9))]
    #[case::outside_working_hours(key(12, 20))]
    #[case::outside_window(key(17, 10))]
    fn it_should_reject_slots_that_are_not_available(grid: SlotGrid, #[case] slot: SlotKey) {
        let result = decide_booking(
            &grid,
            command(Some(slot), None),
            Role::Member,
            local(2024, 6, 10, 12, 0),
            offset(0),
        );
        assert_eq!(result, Err(DecideError::SlotNotAvailable(slot)));
    }

    #[rstest]
    fn it_should_reject_a_slot_that_turned_past_since_the_last_load(grid: SlotGrid) {
        let result = decide_booking(
            &grid,
            command(Some(key(10, 13)), None),
            Role::Member,
            local(2024, 6, 10, 13, 0),
            offset(0),
        );
        assert_eq!(result, Err(DecideError::SlotNotAvailable(key(10, 13))));
    }

    #[rstest]
    fn it_should_require_a_selection(grid: SlotGrid) {
        let result = decide_booking(
            &grid,
            command(None, None),
            Role::Member,
            local(2024, 6, 10, 12, 0),
            offset(0),
        );
        assert_eq!(result, Err(DecideError::NoSelection));
    }
}
