use crate::core::session::CALENDAR_PARAM;
use crate::domain::model::{CalendarEndpoint, ServiceListResponse, ServiceType};
use crate::domain::ports::Transport;
use crate::utils::error::{Result, SniperError};

/// 沒有分類的服務歸到這一類
pub const FALLBACK_CATEGORY: &str = "Sonstiges";

/// Read-only listing of the service types a calendar offers.
pub struct ServiceCatalog {
    services: Vec<ServiceType>,
}

impl ServiceCatalog {
    pub fn new(services: Vec<ServiceType>) -> Self {
        Self { services }
    }

    pub async fn fetch<T: Transport + ?Sized>(
        transport: &T,
        endpoint: &CalendarEndpoint,
    ) -> Result<Self> {
        tracing::debug!("requesting service list for calendar {}", endpoint.calendar_uid);

        let page = transport
            .get(
                &endpoint.service_list_url(),
                &[(CALENDAR_PARAM, endpoint.calendar_uid.as_str())],
            )
            .await?;

        if !page.is_success() {
            return Err(SniperError::protocol(format!(
                "service list returned HTTP {}",
                page.status
            )));
        }

        let response: ServiceListResponse = serde_json::from_str(&page.body)
            .map_err(|e| SniperError::protocol(format!("service list is not valid JSON: {}", e)))?;
        if !response.success {
            return Err(SniperError::protocol("service list reported success = false"));
        }

        tracing::debug!("calendar offers {} service types", response.results.len());
        Ok(Self::new(response.results))
    }

    pub fn services(&self) -> &[ServiceType] {
        &self.services
    }

    /// Services grouped by their first category, categories sorted
    /// case-insensitively, services kept in response order.
    pub fn grouped(&self) -> Vec<(String, Vec<&ServiceType>)> {
        let mut groups: Vec<(String, Vec<&ServiceType>)> = Vec::new();

        for service in &self.services {
            let category = service
                .categories
                .first()
                .map(|c| c.display_name.trim().to_string())
                .unwrap_or_else(|| FALLBACK_CATEGORY.to_string());

            match groups.iter().position(|(name, _)| *name == category) {
                Some(index) => groups[index].1.push(service),
                None => groups.push((category, vec![service])),
            }
        }

        groups.sort_by_key(|(name, _)| name.to_uppercase());
        groups
    }

    /// 每個分類一段，分類之間以空行分隔，每個服務一行 `uid name`
    pub fn render(&self) -> String {
        self.grouped()
            .iter()
            .map(|(category, services)| {
                let mut block = vec![category.clone()];
                block.extend(
                    services
                        .iter()
                        .map(|s| format!("{} {}", s.uid, s.service_name)),
                );
                block.join("\n")
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
