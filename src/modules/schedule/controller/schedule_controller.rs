// ScheduleController: owns the displayed window and its appointments.
//
// Responsibilities
// - Drive the phase machine (see core::phase) for load, navigate, book and cancel.
// - Fetch appointments for the displayed window and classify them.
// - Never patch local state after a write. Every booking or cancellation
//   ends in a full reload.
//
// Concurrency
// - State sits behind one async mutex that is never held across a service call.
// - Every load carries a ticket. A result whose ticket is not the latest is
//   discarded, so a slow fetch for an old window cannot overwrite a newer one.
// - Navigation while Loading supersedes that load. Anything arriving during
//   Booking or Cancelling is rejected with Busy.

use crate::modules::schedule::controller::errors::ScheduleError;
use crate::modules::schedule::core::appointment::{Appointment, parse_records};
use crate::modules::schedule::core::appointment_index::AppointmentIndex;
use crate::modules::schedule::core::member::Member;
use crate::modules::schedule::core::phase::{Intent, SchedulePhase};
use crate::modules::schedule::core::render_model::{Notice, RenderInput, RenderModel};
use crate::modules::schedule::core::schedule_config::ScheduleConfig;
use crate::modules::schedule::core::slot::{SlotKey, SlotState};
use crate::modules::schedule::core::time_slot_grid::{SlotGrid, classify};
use crate::modules::schedule::core::week_window::{WeekNavigator, WeekWindow};
use crate::modules::schedule::use_cases::book_appointment::command::BookAppointment;
use crate::modules::schedule::use_cases::book_appointment::decide::{
    decide_booking, decide_selection,
};
use crate::modules::schedule::use_cases::cancel_appointment::command::CancelAppointment;
use crate::modules::schedule::use_cases::cancel_appointment::decide::decide_cancellation;
use crate::modules::schedule::use_cases::decide_error::DecideError;
use crate::shared::core::clock::Clock;
use crate::shared::infrastructure::appointment_service::{
    AppointmentService, AppointmentServiceError, MemberDirectory,
};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load started while this one was in flight.
    Discarded,
}

#[derive(Debug, Clone, Copy)]
struct LoadTicket {
    id: u64,
    window: WeekWindow,
}

#[derive(Debug)]
struct ControllerState {
    phase: SchedulePhase,
    /// Last window that loaded successfully.
    window: Option<WeekWindow>,
    appointments: Vec<Appointment>,
    grid: SlotGrid,
    selection: Option<SlotKey>,
    members: Vec<Member>,
    selected_member: Option<String>,
    notice: Option<Notice>,
    load_ticket: u64,
    pending_window: Option<WeekWindow>,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            phase: SchedulePhase::Idle,
            window: None,
            appointments: Vec::new(),
            grid: SlotGrid::default(),
            selection: None,
            members: Vec::new(),
            selected_member: None,
            notice: None,
            load_ticket: 0,
            pending_window: None,
        }
    }
}

pub struct ScheduleController<TService, TClock>
where
    TService: AppointmentService + ?Sized,
    TClock: Clock + ?Sized,
{
    config: ScheduleConfig,
    navigator: WeekNavigator,
    service: Arc<TService>,
    clock: Arc<TClock>,
    state: Mutex<ControllerState>,
}

fn admit(phase: SchedulePhase, intent: Intent) -> Result<(), ScheduleError> {
    if phase.accepts(intent) {
        Ok(())
    } else if phase.is_busy() {
        Err(ScheduleError::Busy(phase))
    } else {
        Err(ScheduleError::NotReady(phase))
    }
}

impl<TService, TClock> ScheduleController<TService, TClock>
where
    TService: AppointmentService + ?Sized,
    TClock: Clock + ?Sized,
{
    pub fn new(config: ScheduleConfig, service: Arc<TService>, clock: Arc<TClock>) -> Self {
        Self {
            navigator: config.navigator(),
            config,
            service,
            clock,
            state: Mutex::new(ControllerState::default()),
        }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub async fn phase(&self) -> SchedulePhase {
        self.state.lock().await.phase
    }

    /// Last successfully loaded window, if any.
    pub async fn window(&self) -> Option<WeekWindow> {
        self.state.lock().await.window
    }

    pub async fn selection(&self) -> Option<SlotKey> {
        self.state.lock().await.selection
    }

    /// Opens the window containing today.
    pub async fn load(&self) -> Result<LoadOutcome, ScheduleError> {
        let ticket = {
            let mut state = self.state.lock().await;
            admit(state.phase, Intent::Load)?;
            state.notice = None;
            let window = self.today_window();
            self.begin_load(&mut state, window)
        };
        self.run_load(ticket).await
    }

    /// Fetches the displayed window again. Used as the retry after a failure.
    pub async fn reload(&self) -> Result<LoadOutcome, ScheduleError> {
        let ticket = {
            let mut state = self.state.lock().await;
            admit(state.phase, Intent::Load)?;
            state.notice = None;
            self.begin_reload(&mut state)
        };
        self.run_load(ticket).await
    }

    pub async fn navigate(&self, delta_weeks: i32) -> Result<LoadOutcome, ScheduleError> {
        let ticket = {
            let mut state = self.state.lock().await;
            admit(state.phase, Intent::Navigate)?;
            let base = self.target_window(&state);
            let Some(window) = self.navigator.shift(base, delta_weeks) else {
                let reason = DecideError::WeekOutOfRange(delta_weeks);
                tracing::warn!(
                    delta_weeks,
                    from = %base.start_date(),
                    "navigation off the calendar"
                );
                state.notice = Some(Notice::error(reason.to_string()));
                return Err(reason.into());
            };
            state.notice = None;
            tracing::info!(
                delta_weeks,
                from = %base.start_date(),
                to = %window.start_date(),
                "navigating schedule"
            );
            self.begin_load(&mut state, window)
        };
        self.run_load(ticket).await
    }

    pub async fn select_slot(&self, slot: SlotKey) -> Result<(), ScheduleError> {
        let mut state = self.state.lock().await;
        admit(state.phase, Intent::Select)?;
        let slot = decide_selection(&state.grid, slot, self.clock.now())?;
        state.selection = Some(slot);
        state.notice = None;
        tracing::debug!(%slot, "slot selected");
        Ok(())
    }

    pub async fn clear_selection(&self) {
        let mut state = self.state.lock().await;
        state.selection = None;
    }

    pub async fn set_members(&self, members: Vec<Member>) {
        let mut state = self.state.lock().await;
        let still_listed = state
            .selected_member
            .as_ref()
            .is_some_and(|selected| members.iter().any(|m| &m.id == selected));
        if !still_listed {
            state.selected_member = None;
        }
        state.members = members;
    }

    /// Fetches the member list a personal trainer books on behalf of.
    pub async fn load_members<TDirectory>(
        &self,
        directory: &TDirectory,
    ) -> Result<usize, ScheduleError>
    where
        TDirectory: MemberDirectory + ?Sized,
    {
        let records = directory.list_members().await.map_err(|e| {
            tracing::warn!(error = %e, "could not load members");
            ScheduleError::FetchFailure(e)
        })?;
        let members: Vec<Member> = records.iter().filter_map(Member::from_record).collect();
        let skipped = records.len() - members.len();
        if skipped > 0 {
            tracing::warn!(skipped, "skipping member records without an id");
        }
        let count = members.len();
        self.set_members(members).await;
        tracing::info!(count, "members loaded");
        Ok(count)
    }

    pub async fn select_member(&self, member_id: &str) -> Result<(), ScheduleError> {
        let mut state = self.state.lock().await;
        if !state.members.iter().any(|m| m.id == member_id) {
            return Err(ScheduleError::UnknownMember(member_id.to_string()));
        }
        state.selected_member = Some(member_id.to_string());
        Ok(())
    }

    pub async fn confirm_booking(&self) -> Result<(), ScheduleError> {
        let request = {
            let mut state = self.state.lock().await;
            admit(state.phase, Intent::Book)?;
            let command = BookAppointment {
                slot: state.selection,
                member_id: state.selected_member.clone(),
            };
            let decided = decide_booking(
                &state.grid,
                command,
                self.config.role,
                self.clock.now(),
                self.config.utc_offset,
            );
            match decided {
                Ok(request) => {
                    state.phase = SchedulePhase::Booking;
                    state.notice = None;
                    request
                }
                Err(reason) => {
                    if matches!(reason, DecideError::SlotNotAvailable(_)) {
                        state.selection = None;
                    }
                    state.notice = Some(Notice::error(reason.to_string()));
                    return Err(reason.into());
                }
            }
        };

        tracing::info!(
            slot = %request.slot,
            appointment_time = %request.appointment_time,
            member_id = request.member_id.as_deref(),
            "booking appointment"
        );
        let result = self
            .service
            .book_appointment(request.appointment_time, request.member_id.as_deref())
            .await;

        match result {
            Ok(_) => {
                let ticket = {
                    let mut state = self.state.lock().await;
                    state.selection = None;
                    state.notice = Some(Notice::success(format!(
                        "Booked {}",
                        request.appointment_time.format("%a %b %-d, %H:%M")
                    )));
                    self.begin_reload(&mut state)
                };
                tracing::info!(slot = %request.slot, "appointment booked");
                self.reload_after_write(ticket).await;
                Ok(())
            }
            Err(AppointmentServiceError::Conflict(reason)) => {
                let ticket = {
                    let mut state = self.state.lock().await;
                    state.selection = None;
                    state.notice = Some(Notice::error(
                        "That slot was just taken. The schedule has been refreshed.",
                    ));
                    self.begin_reload(&mut state)
                };
                tracing::warn!(slot = %request.slot, %reason, "booking conflict");
                self.reload_after_write(ticket).await;
                Err(ScheduleError::BookingConflict(reason))
            }
            Err(e) => {
                let mut state = self.state.lock().await;
                state.selection = None;
                state.phase = SchedulePhase::Ready;
                state.notice = Some(Notice::error(format!("Booking failed: {e}")));
                tracing::warn!(slot = %request.slot, error = %e, "booking failed");
                Err(ScheduleError::Booking(e))
            }
        }
    }

    pub async fn cancel_slot(&self, slot: SlotKey) -> Result<(), ScheduleError> {
        let appointment_id = {
            let mut state = self.state.lock().await;
            admit(state.phase, Intent::Cancel)?;
            let decided = {
                let index = AppointmentIndex::build(&state.appointments);
                decide_cancellation(
                    &state.grid,
                    &index,
                    CancelAppointment { slot },
                    self.clock.now(),
                )
            };
            match decided {
                Ok(id) => {
                    state.phase = SchedulePhase::Cancelling;
                    state.notice = None;
                    id
                }
                Err(reason) => {
                    state.notice = Some(Notice::error(reason.to_string()));
                    return Err(reason.into());
                }
            }
        };

        tracing::info!(%slot, %appointment_id, "cancelling appointment");
        let result = self.service.cancel_appointment(&appointment_id.0).await;

        let ticket = {
            let mut state = self.state.lock().await;
            state.notice = Some(match &result {
                Ok(()) => Notice::success("Appointment cancelled"),
                Err(e) => Notice::error(format!("Cancellation failed: {e}")),
            });
            if state.selection == Some(slot) {
                state.selection = None;
            }
            self.begin_reload(&mut state)
        };
        if let Err(e) = &result {
            tracing::warn!(%slot, %appointment_id, error = %e, "cancellation failed");
        }
        self.reload_after_write(ticket).await;
        result.map_err(ScheduleError::Cancellation)
    }

    /// Snapshot for the view, classified against the clock as it reads now.
    pub async fn render(&self) -> RenderModel {
        let state = self.state.lock().await;
        let now = self.clock.now();

        let (window, grid) = match state.window {
            Some(window) => (
                window,
                classify(
                    &window,
                    &self.config.working_hours,
                    &state.appointments,
                    now,
                ),
            ),
            // Nothing loaded yet: show the target window with no slot states.
            None => (
                state
                    .pending_window
                    .unwrap_or_else(|| self.navigator.window_for(now.date())),
                SlotGrid::default(),
            ),
        };

        RenderModel::build(RenderInput {
            role: self.config.role,
            phase: state.phase,
            window,
            working_hours: &self.config.working_hours,
            grid: &grid,
            appointments: &state.appointments,
            today: now.date(),
            selection: state.selection,
            members: &state.members,
            selected_member: state.selected_member.as_deref(),
            notice: state.notice.as_ref(),
        })
    }

    fn today_window(&self) -> WeekWindow {
        self.navigator.window_for(self.clock.now().date())
    }

    // Window a new load or navigation starts from: the one being loaded, else
    // the one displayed, else today's.
    fn target_window(&self, state: &ControllerState) -> WeekWindow {
        state
            .pending_window
            .or(state.window)
            .unwrap_or_else(|| self.today_window())
    }

    fn begin_load(&self, state: &mut ControllerState, window: WeekWindow) -> LoadTicket {
        state.load_ticket += 1;
        state.pending_window = Some(window);
        state.phase = SchedulePhase::Loading;
        tracing::info!(
            ticket = state.load_ticket,
            window_start = %window.start_date(),
            window_end = %window.end_date(),
            "loading appointments"
        );
        LoadTicket {
            id: state.load_ticket,
            window,
        }
    }

    fn begin_reload(&self, state: &mut ControllerState) -> LoadTicket {
        let window = self.target_window(state);
        self.begin_load(state, window)
    }

    async fn reload_after_write(&self, ticket: LoadTicket) {
        if let Err(e) = self.run_load(ticket).await {
            tracing::warn!(error = %e, "reload after write failed");
        }
    }

    async fn run_load(&self, ticket: LoadTicket) -> Result<LoadOutcome, ScheduleError> {
        let result = self
            .service
            .fetch_appointments(ticket.window.start_date(), ticket.window.end_date())
            .await;

        let mut state = self.state.lock().await;
        if state.load_ticket != ticket.id {
            tracing::debug!(
                ticket = ticket.id,
                latest = state.load_ticket,
                window_start = %ticket.window.start_date(),
                "discarding stale appointments response"
            );
            return Ok(LoadOutcome::Discarded);
        }
        state.pending_window = None;

        match result {
            Ok(records) => {
                let (appointments, malformed) = parse_records(&records, self.config.utc_offset);
                for problem in &malformed {
                    tracing::warn!(error = %problem, "skipping malformed appointment");
                }

                let grid = classify(
                    &ticket.window,
                    &self.config.working_hours,
                    &appointments,
                    self.clock.now(),
                );
                if let Some(selected) = state.selection
                    && grid.state(&selected) != SlotState::Available
                {
                    state.selection = None;
                }

                tracing::info!(
                    window_start = %ticket.window.start_date(),
                    appointments = appointments.len(),
                    skipped = malformed.len(),
                    booked = grid.count(SlotState::Booked),
                    available = grid.count(SlotState::Available),
                    "schedule ready"
                );
                state.window = Some(ticket.window);
                state.appointments = appointments;
                state.grid = grid;
                state.phase = SchedulePhase::Ready;
                Ok(LoadOutcome::Applied)
            }
            Err(e) => {
                tracing::warn!(
                    window_start = %ticket.window.start_date(),
                    error = %e,
                    "loading appointments failed"
                );
                state.phase = SchedulePhase::Error;
                state.notice = Some(Notice::error(format!("Could not load appointments: {e}")));
                Err(ScheduleError::FetchFailure(e))
            }
        }
    }
}
