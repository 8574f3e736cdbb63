use crate::core::html;
use crate::core::session::{CALENDAR_PARAM, SESSION_PARAM};
use crate::domain::model::{Appointment, BookingOutcome, CalendarEndpoint, SessionContext};
use crate::domain::ports::Transport;
use crate::utils::error::{Result, SniperError};

/// 兩階段預約：先取得此時段專屬的 token，再送出預約。
/// 只嘗試一次，失敗不會自動重送，避免重複預約。
pub struct BookingExecutor<'a, T: Transport + ?Sized> {
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> BookingExecutor<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    pub async fn book(
        &self,
        endpoint: &CalendarEndpoint,
        session: SessionContext,
        appointment: &Appointment,
        contact_address: &str,
    ) -> BookingOutcome {
        match self.try_book(endpoint, session, appointment, contact_address).await {
            Ok(()) => BookingOutcome::Booked(appointment.clone()),
            Err(e) => {
                tracing::error!("booking {} failed: {}", appointment, e);
                BookingOutcome::Failed(e.to_string())
            }
        }
    }

    async fn try_book(
        &self,
        endpoint: &CalendarEndpoint,
        session: SessionContext,
        appointment: &Appointment,
        contact_address: &str,
    ) -> Result<()> {
        let url = endpoint.booking_url();
        let start_time = appointment.start_time_param();

        tracing::debug!("requesting booking token for {}", appointment);
        let query = [
            (CALENDAR_PARAM, endpoint.calendar_uid.as_str()),
            (SESSION_PARAM, session.session_id()),
            ("appointment_datetime", start_time.as_str()),
            ("location", appointment.location_uid.as_str()),
        ];
        let page = self.transport.get(&url, &query).await?;
        if !page.is_success() {
            return Err(SniperError::BookingFailure {
                reason: format!("booking page returned HTTP {}", page.status),
            });
        }
        let session = session.with_token(html::extract_token(&page.body)?);

        tracing::debug!("submitting booking for {}", appointment);
        let token = session.token();
        let query = [
            (CALENDAR_PARAM, endpoint.calendar_uid.as_str()),
            (SESSION_PARAM, session.session_id()),
            ("appointment_datetime", start_time.as_str()),
            ("location", appointment.location_uid.as_str()),
        ];
        let page = self
            .transport
            .post_form(
                &url,
                &query,
                &[
                    (token.name.as_str(), token.value.as_str()),
                    ("mail", contact_address),
                ],
            )
            .await?;
        if !page.is_success() {
            return Err(SniperError::BookingFailure {
                reason: format!("booking submission returned HTTP {}", page.status),
            });
        }
        Ok(())
    }
}
