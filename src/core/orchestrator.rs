use crate::core::booking::BookingExecutor;
use crate::core::matcher;
use crate::core::search::AppointmentSearcher;
use crate::core::service::ServiceSubmitter;
use crate::core::session::TokenAcquirer;
use crate::domain::model::{BookingJob, BookingOutcome, CalendarEndpoint, SearchResult};
use crate::domain::ports::Transport;
use crate::utils::error::Result;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct PollingSettings {
    pub interval: Duration,
    pub dry_run: bool,
}

/// 輪詢主迴圈：取得 session → 送出服務 → 搜尋 → 比對 → 預約或等待後重試。
///
/// 每一輪都重新取得 session，不沿用上一輪的 wsid 或 token。
/// 可恢復的網路錯誤等到下一輪再試；協定或解析錯誤直接中止。
pub struct PollingOrchestrator<T: Transport> {
    transport: T,
    endpoint: CalendarEndpoint,
    job: BookingJob,
    settings: PollingSettings,
    cancel: CancellationToken,
}

impl<T: Transport> PollingOrchestrator<T> {
    pub fn new(
        transport: T,
        endpoint: CalendarEndpoint,
        job: BookingJob,
        settings: PollingSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            transport,
            endpoint,
            job,
            settings,
            cancel,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs until a slot is booked (or matched, in dry-run mode), booking
    /// fails, a fatal error occurs or the cancellation token fires.
    pub async fn run(&self) -> Result<BookingOutcome> {
        let mut attempt: u64 = 0;

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("🛑 Stopped before attempt #{}", attempt + 1);
                return Ok(BookingOutcome::NoMatch);
            }
            attempt += 1;
            tracing::info!("🔍 Checking for available appointments, try #{}", attempt);

            match self.attempt().await {
                Ok(Some(outcome)) => return Ok(outcome),
                Ok(None) => {}
                Err(e) if e.is_recoverable() => {
                    tracing::warn!("⚠️ Attempt #{} interrupted, retrying later: {}", attempt, e);
                }
                Err(e) => return Err(e),
            }

            if !self.wait().await {
                tracing::info!("🛑 Stopped while waiting after {} attempts", attempt);
                return Ok(BookingOutcome::NoMatch);
            }
        }
    }

    /// One pass through the state machine. `None` means nothing matched.
    async fn attempt(&self) -> Result<Option<BookingOutcome>> {
        let session = TokenAcquirer::new(&self.transport)
            .acquire(&self.endpoint)
            .await?;

        ServiceSubmitter::new(&self.transport)
            .submit(&self.endpoint, &session, &self.job.service)
            .await?;

        let appointments = match AppointmentSearcher::new(&self.transport)
            .search(&self.endpoint, &session)
            .await?
        {
            SearchResult::NoneOffered => {
                tracing::info!("no appointments available");
                return Ok(None);
            }
            SearchResult::Offered(appointments) => appointments,
        };
        tracing::debug!("{} appointments offered", appointments.len());

        let Some(chosen) = matcher::first_match(&appointments, &self.job.criterion) else {
            tracing::info!("no matching appointments available");
            return Ok(None);
        };
        tracing::info!("📅 Selected appointment on {} at {}", chosen.start_time, chosen.location_name);

        if self.settings.dry_run {
            tracing::info!("skipping booking (dry run)");
            return Ok(Some(BookingOutcome::DryRun(chosen.clone())));
        }

        let outcome = BookingExecutor::new(&self.transport)
            .book(&self.endpoint, session, chosen, &self.job.contact_address)
            .await;
        Ok(Some(outcome))
    }

    /// 可取消的等待；回傳 `false` 表示等待期間收到取消
    async fn wait(&self) -> bool {
        tracing::info!("sleeping for {}s", self.settings.interval.as_secs());
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(self.settings.interval) => true,
        }
    }
}
