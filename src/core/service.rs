use crate::core::session::{CALENDAR_PARAM, SESSION_PARAM};
use crate::domain::model::{CalendarEndpoint, ServiceRequest, SessionContext};
use crate::domain::ports::Transport;
use crate::utils::error::{Result, SniperError};

/// 告訴服務端這個 session 要搜尋哪一種服務
pub struct ServiceSubmitter<'a, T: Transport + ?Sized> {
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> ServiceSubmitter<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    pub async fn submit(
        &self,
        endpoint: &CalendarEndpoint,
        session: &SessionContext,
        request: &ServiceRequest,
    ) -> Result<()> {
        tracing::debug!("submitting wanted service {}", request.service_uid);

        let amount_field = format!("service_{}_amount", request.service_uid);
        let quantity = request.quantity.to_string();
        let token = session.token();

        let page = self
            .transport
            .post_form(
                endpoint.landing_url(),
                &[
                    (CALENDAR_PARAM, endpoint.calendar_uid.as_str()),
                    (SESSION_PARAM, session.session_id()),
                ],
                &[
                    (token.name.as_str(), token.value.as_str()),
                    ("services", request.service_uid.as_str()),
                    (amount_field.as_str(), quantity.as_str()),
                ],
            )
            .await?;

        if !page.is_success() {
            return Err(SniperError::protocol(format!(
                "service submission returned HTTP {}",
                page.status
            )));
        }
        Ok(())
    }
}
