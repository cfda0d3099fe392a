use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::adapters::{fields, HttpSource};
use crate::data_source::{RawResponse, SourceAdapter, SourceError};
use crate::domain::{SummaryData, WeatherSummary};
use crate::http_client::HttpClient;
use crate::source::SourceSpec;

/// Current conditions feed (OpenWeatherMap `weather` endpoint shape).
#[derive(Clone)]
pub struct WeatherAdapter {
    source: HttpSource,
}

impl WeatherAdapter {
    pub fn new(spec: SourceSpec, http_client: Arc<dyn HttpClient>, timeout_ms: u64) -> Self {
        Self {
            source: HttpSource::new(spec, http_client, timeout_ms),
        }
    }
}

impl SourceAdapter for WeatherAdapter {
    fn spec(&self) -> &SourceSpec {
        self.source.spec()
    }

    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, SourceError>> + Send + 'a>> {
        Box::pin(self.source.fetch())
    }

    fn summarize(&self, raw: &RawResponse) -> Result<SummaryData, SourceError> {
        summarize_weather(raw).map(SummaryData::from)
    }
}

pub fn summarize_weather(raw: &RawResponse) -> Result<WeatherSummary, SourceError> {
    let payload = fields::object(raw, "weather payload")?;
    let main = fields::optional_object(payload, "main")?;
    let wind = fields::optional_object(payload, "wind")?;

    let conditions = match payload.get("weather") {
        None | Some(Value::Null) => None,
        Some(entries) => fields::array(entries, "weather")?
            .first()
            .and_then(Value::as_object)
            .map(|entry| fields::text_or_unknown(entry, "description")),
    };

    Ok(WeatherSummary {
        city: fields::text_or_unknown(payload, "name"),
        temperature: fields::optional_f64(main.and_then(|m| m.get("temp")), "main.temp")?,
        humidity: fields::optional_f64(main.and_then(|m| m.get("humidity")), "main.humidity")?,
        conditions: conditions.unwrap_or_else(|| fields::UNKNOWN.to_owned()),
        wind_speed: fields::optional_f64(wind.and_then(|w| w.get("speed")), "wind.speed")?,
    })
}
