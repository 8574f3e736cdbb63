use crate::core::html;
use crate::domain::model::{CalendarEndpoint, SessionContext};
use crate::domain::ports::Transport;
use crate::utils::error::{Result, SniperError};

pub const SESSION_PARAM: &str = "wsid";
pub const CALENDAR_PARAM: &str = "uid";

/// 取得新的 session：wsid 來自最終網址，token 來自頁面內容
pub struct TokenAcquirer<'a, T: Transport + ?Sized> {
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> TokenAcquirer<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    pub async fn acquire(&self, endpoint: &CalendarEndpoint) -> Result<SessionContext> {
        tracing::debug!("requesting anti-forgery token and session id");

        let page = self
            .transport
            .get(
                endpoint.landing_url(),
                &[(CALENDAR_PARAM, endpoint.calendar_uid.as_str())],
            )
            .await?;

        if !page.is_success() {
            return Err(SniperError::protocol(format!(
                "calendar landing page returned HTTP {}",
                page.status
            )));
        }

        let session_id = page.query_param(SESSION_PARAM).ok_or_else(|| {
            SniperError::protocol(format!(
                "no '{}' parameter in final URL {}",
                SESSION_PARAM, page.final_url
            ))
        })?;
        let token = html::extract_token(&page.body)?;

        tracing::debug!("acquired session {}", session_id);
        Ok(SessionContext::new(session_id, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{landing_page, page, ScriptedTransport, BASE, CALENDAR};

    #[tokio::test]
    async fn test_acquire_reads_session_and_token() {
        let transport = ScriptedTransport::new();
        transport.reply("GET", BASE, landing_page("W1", "tok-1"));

        let endpoint = CalendarEndpoint::new(BASE, CALENDAR);
        let session = TokenAcquirer::new(&transport).acquire(&endpoint).await.unwrap();

        assert_eq!(session.session_id(), "W1");
        assert_eq!(session.token().value, "tok-1");
        let requests = transport.requests();
        assert_eq!(requests[0].query_value("uid"), Some(CALENDAR));
    }

    #[tokio::test]
    async fn test_missing_session_id_is_protocol_error() {
        let transport = ScriptedTransport::new();
        transport.reply(
            "GET",
            BASE,
            page(
                &format!("{}?uid={}", BASE, CALENDAR),
                200,
                r#"<input id="RequestVerificationToken" name="t" value="v">"#,
            ),
        );

        let endpoint = CalendarEndpoint::new(BASE, CALENDAR);
        let err = TokenAcquirer::new(&transport).acquire(&endpoint).await.unwrap_err();
        assert!(matches!(err, SniperError::Protocol { .. }));
        assert!(err.to_string().contains("wsid"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_protocol_error() {
        let transport = ScriptedTransport::new();
        transport.reply("GET", BASE, page(BASE, 503, ""));

        let endpoint = CalendarEndpoint::new(BASE, CALENDAR);
        let err = TokenAcquirer::new(&transport).acquire(&endpoint).await.unwrap_err();
        assert!(!err.is_recoverable());
    }
}
