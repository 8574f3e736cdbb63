use crate::domain::model::AntiForgeryToken;
use crate::utils::error::{Result, SniperError};
use scraper::{Html, Selector};

pub const TOKEN_ELEMENT_ID: &str = "RequestVerificationToken";
pub const APPOINTMENT_LIST_ELEMENT_ID: &str = "json_appointment_list";

fn id_selector(id: &str) -> Result<Selector> {
    Selector::parse(&format!("#{}", id))
        .map_err(|e| SniperError::protocol(format!("Invalid selector for #{}: {:?}", id, e)))
}

/// 讀取防偽 token 元素的 `name` 與 `value` 屬性
pub fn extract_token(body: &str) -> Result<AntiForgeryToken> {
    let document = Html::parse_document(body);
    let selector = id_selector(TOKEN_ELEMENT_ID)?;

    let element = document.select(&selector).next().ok_or_else(|| {
        SniperError::protocol(format!("element #{} not found in page", TOKEN_ELEMENT_ID))
    })?;

    let attr = |key: &str| {
        element.value().attr(key).map(str::to_string).ok_or_else(|| {
            SniperError::protocol(format!(
                "element #{} has no '{}' attribute",
                TOKEN_ELEMENT_ID, key
            ))
        })
    };

    Ok(AntiForgeryToken {
        name: attr("name")?,
        value: attr("value")?,
    })
}

/// Text content of the element with the given id, if present.
pub fn element_text(body: &str, id: &str) -> Result<Option<String>> {
    let document = Html::parse_document(body);
    let selector = id_selector(id)?;

    Ok(document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>()))
}
