use crate::core::html::{self, APPOINTMENT_LIST_ELEMENT_ID};
use crate::core::session::{CALENDAR_PARAM, SESSION_PARAM};
use crate::domain::model::{Appointment, CalendarEndpoint, RawAppointment, SearchResult, SessionContext};
use crate::domain::ports::Transport;
use crate::utils::error::{Result, SniperError};
use chrono::DateTime;
use serde_json::Value;

/// 服務端沒有任何可預約時段時，`appointments` 欄位是這個字串而不是陣列
pub const NOTHING_FOUND: &str = "nothing_Found";

pub struct AppointmentSearcher<'a, T: Transport + ?Sized> {
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> AppointmentSearcher<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    pub async fn search(
        &self,
        endpoint: &CalendarEndpoint,
        session: &SessionContext,
    ) -> Result<SearchResult> {
        tracing::debug!("requesting appointment list");

        let page = self
            .transport
            .get(
                &endpoint.search_result_url(),
                &[
                    (CALENDAR_PARAM, endpoint.calendar_uid.as_str()),
                    (SESSION_PARAM, session.session_id()),
                ],
            )
            .await?;

        if !page.is_success() {
            return Err(SniperError::protocol(format!(
                "search result page returned HTTP {}",
                page.status
            )));
        }

        let payload = html::element_text(&page.body, APPOINTMENT_LIST_ELEMENT_ID)?.ok_or_else(|| {
            SniperError::protocol(format!(
                "element #{} not found in search result page",
                APPOINTMENT_LIST_ELEMENT_ID
            ))
        })?;

        parse_appointment_list(&payload)
    }
}

/// Parses the embedded JSON payload. One malformed entry fails the whole list.
pub fn parse_appointment_list(payload: &str) -> Result<SearchResult> {
    let document: Value = serde_json::from_str(payload.trim())
        .map_err(|e| SniperError::parse(format!("appointment list is not valid JSON: {}", e)))?;

    let appointments = document
        .get("appointments")
        .ok_or_else(|| SniperError::parse("payload has no 'appointments' field"))?;

    match appointments {
        Value::String(s) if s == NOTHING_FOUND => Ok(SearchResult::NoneOffered),
        Value::Array(entries) => {
            let parsed = entries
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    let raw: RawAppointment = serde_json::from_value(entry.clone()).map_err(|e| {
                        SniperError::parse(format!("appointment #{}: {}", index, e))
                    })?;
                    parse_appointment(raw)
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(SearchResult::Offered(parsed))
        }
        other => Err(SniperError::parse(format!(
            "unexpected 'appointments' value: {}",
            other
        ))),
    }
}

pub fn parse_appointment(raw: RawAppointment) -> Result<Appointment> {
    let start_time = DateTime::parse_from_rfc3339(raw.datetime_iso86001.trim()).map_err(|e| {
        SniperError::parse(format!(
            "invalid timestamp '{}' for {}: {}",
            raw.datetime_iso86001, raw.unit_uid, e
        ))
    })?;

    Ok(Appointment {
        location_name: raw.unit.trim().to_string(),
        location_uid: raw.unit_uid,
        start_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{page, search_page, session, ScriptedTransport, BASE, CALENDAR};

    #[test]
    fn test_parse_trims_location_and_keeps_offset() {
        let result = parse_appointment_list(
            r#"{"appointments": [{"unit": " Rathaus ", "unit_uid": "U1", "datetime_iso86001": "2025-03-01T10:00:00+01:00"}]}"#,
        )
        .unwrap();

        let expected = Appointment {
            location_name: "Rathaus".to_string(),
            location_uid: "U1".to_string(),
            start_time: DateTime::parse_from_rfc3339("2025-03-01T10:00:00+01:00").unwrap(),
        };
        assert_eq!(result, SearchResult::Offered(vec![expected]));
    }

    #[test]
    fn test_sentinel_means_none_offered() {
        let result = parse_appointment_list(r#"{"appointments": "nothing_Found"}"#).unwrap();
        assert_eq!(result, SearchResult::NoneOffered);
    }

    #[test]
    fn test_empty_array_is_offered_but_empty() {
        let result = parse_appointment_list(r#"{"appointments": []}"#).unwrap();
        assert_eq!(result, SearchResult::Offered(vec![]));
    }

    #[test]
    fn test_malformed_entry_fails_whole_list() {
        let payload = r#"{"appointments": [
            {"unit": "Rathaus", "unit_uid": "U1", "datetime_iso86001": "2025-03-01T10:00:00+01:00"},
            {"unit": "Nordbad", "unit_uid": "U2", "datetime_iso86001": "tomorrow"}
        ]}"#;
        let err = parse_appointment_list(payload).unwrap_err();
        assert!(matches!(err, SniperError::Parse { .. }));
        assert!(err.to_string().contains("tomorrow"));

        let err = parse_appointment_list(r#"{"appointments": [{"unit": "Rathaus"}]}"#).unwrap_err();
        assert!(err.to_string().contains("appointment #0"));
    }

    #[test]
    fn test_unknown_string_is_parse_error() {
        let err = parse_appointment_list(r#"{"appointments": "maintenance"}"#).unwrap_err();
        assert!(matches!(err, SniperError::Parse { .. }));
        assert!(parse_appointment_list("not json").is_err());
        assert!(parse_appointment_list("{}").is_err());
    }

    #[tokio::test]
    async fn test_search_reads_embedded_payload() {
        let transport = ScriptedTransport::new();
        let url = format!("{}/search_result", BASE);
        transport.reply("GET", &url, search_page(r#"{"appointments": "nothing_Found"}"#));

        let endpoint = CalendarEndpoint::new(BASE, CALENDAR);
        let result = AppointmentSearcher::new(&transport)
            .search(&endpoint, &session("W3", "tok"))
            .await
            .unwrap();

        assert_eq!(result, SearchResult::NoneOffered);
        assert_eq!(transport.requests()[0].query_value("wsid"), Some("W3"));
    }

    #[tokio::test]
    async fn test_missing_payload_element_is_protocol_error() {
        let transport = ScriptedTransport::new();
        let url = format!("{}/search_result", BASE);
        transport.reply("GET", &url, page(&url, 200, "<html><body>Session expired</body></html>"));

        let endpoint = CalendarEndpoint::new(BASE, CALENDAR);
        let err = AppointmentSearcher::new(&transport)
            .search(&endpoint, &session("W3", "tok"))
            .await
            .unwrap_err();
        assert!(matches!(err, SniperError::Protocol { .. }));
    }
}
