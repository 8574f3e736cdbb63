pub mod booking;
pub mod catalog;
pub mod html;
pub mod matcher;
pub mod orchestrator;
pub mod search;
pub mod service;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::model::{
    Appointment, BookingJob, BookingOutcome, CalendarEndpoint, SearchCriterion, SearchResult,
    SessionContext,
};
pub use crate::domain::ports::{Page, Transport};
pub use crate::utils::error::Result;
