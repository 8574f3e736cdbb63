//! Scripted in-memory `Transport` for component and orchestrator tests.

use crate::domain::model::{AntiForgeryToken, SessionContext};
use crate::domain::ports::{Page, Transport};
use crate::utils::error::{Result, SniperError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::time::Instant;
use url::Url;

pub const BASE: &str = "https://cal.example.com/m/calendar";
pub const CALENDAR: &str = "cal-1";
pub const TOKEN_NAME: &str = "__RequestVerificationToken";

#[derive(Debug, Clone)]
pub enum Reply {
    Page(Page),
    Transient(String),
}

impl From<Page> for Reply {
    fn from(page: Page) -> Self {
        Reply::Page(page)
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
    pub at: Instant,
}

impl RecordedRequest {
    pub fn query_value(&self, key: &str) -> Option<&str> {
        lookup(&self.query, key)
    }

    pub fn form_value(&self, key: &str) -> Option<&str> {
        lookup(&self.form, key)
    }
}

fn lookup<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Replies are queued per (method, url). The last reply of a queue is
/// repeated once the others are used up.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<(&'static str, String), VecDeque<Reply>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, method: &'static str, url: &str, reply: impl Into<Reply>) {
        self.replies
            .lock()
            .unwrap()
            .entry((method, url.to_string()))
            .or_default()
            .push_back(reply.into());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }

    fn respond(
        &self,
        method: &'static str,
        url: &str,
        query: &[(&str, &str)],
        form: &[(&str, &str)],
    ) -> Result<Page> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            url: url.to_string(),
            query: owned(query),
            form: owned(form),
            at: Instant::now(),
        });

        let mut replies = self.replies.lock().unwrap();
        let queue = replies
            .get_mut(&(method, url.to_string()))
            .unwrap_or_else(|| panic!("no scripted reply for {} {}", method, url));
        let reply = if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap()
        };

        match reply {
            Reply::Page(page) => Ok(page),
            Reply::Transient(message) => Err(SniperError::Transient { message }),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Page> {
        self.respond("GET", url, query, &[])
    }

    async fn post_form(
        &self,
        url: &str,
        query: &[(&str, &str)],
        form: &[(&str, &str)],
    ) -> Result<Page> {
        self.respond("POST", url, query, form)
    }
}

pub fn page(url: &str, status: u16, body: &str) -> Page {
    Page {
        final_url: Url::parse(url).unwrap(),
        status,
        body: body.to_string(),
    }
}

pub fn token_html(token: &str) -> String {
    format!(
        r#"<html><body><form><input type="hidden" id="RequestVerificationToken" name="{}" value="{}"></form></body></html>"#,
        TOKEN_NAME, token
    )
}

/// Landing page as seen after the redirect that appends the session id.
pub fn landing_page(wsid: &str, token: &str) -> Page {
    page(
        &format!("{}?uid={}&wsid={}", BASE, CALENDAR, wsid),
        200,
        &token_html(token),
    )
}

pub fn search_page(payload: &str) -> Page {
    page(
        &format!("{}/search_result", BASE),
        200,
        &format!(
            r#"<html><body><script type="application/json" id="json_appointment_list">{}</script></body></html>"#,
            payload
        ),
    )
}

pub fn session(wsid: &str, token: &str) -> SessionContext {
    SessionContext::new(
        wsid,
        AntiForgeryToken {
            name: TOKEN_NAME.to_string(),
            value: token.to_string(),
        },
    )
}
