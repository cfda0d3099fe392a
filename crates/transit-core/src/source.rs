use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Kinds of upstream dataset the pipeline knows how to summarize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Traffic,
    BikeShare,
    AircraftPosition,
    VesselArrival,
    Weather,
}

impl SourceKind {
    pub const ALL: [Self; 5] = [
        Self::Traffic,
        Self::BikeShare,
        Self::AircraftPosition,
        Self::VesselArrival,
        Self::Weather,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Traffic => "traffic",
            Self::BikeShare => "bike_share",
            Self::AircraftPosition => "aircraft_position",
            Self::VesselArrival => "vessel_arrival",
            Self::Weather => "weather",
        }
    }
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "traffic" => Ok(Self::Traffic),
            "bike_share" | "bikeshare" => Ok(Self::BikeShare),
            "aircraft_position" | "aircraft" => Ok(Self::AircraftPosition),
            "vessel_arrival" | "vessel" => Ok(Self::VesselArrival),
            "weather" => Ok(Self::Weather),
            other => Err(ValidationError::InvalidSourceKind {
                value: other.to_owned(),
            }),
        }
    }
}

/// One configured upstream: where to call and with which fixed query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Unique key of the source within a run envelope.
    pub name: String,
    pub kind: SourceKind,
    pub endpoint: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl SourceSpec {
    pub fn new(
        name: impl Into<String>,
        kind: SourceKind,
        endpoint: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let spec = Self {
            name: name.into(),
            kind,
            endpoint: endpoint.into(),
            params: BTreeMap::new(),
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptySourceName);
        }

        let endpoint = self.endpoint.trim();
        let has_host = ["https://", "http://"]
            .iter()
            .find_map(|scheme| endpoint.strip_prefix(scheme))
            .is_some_and(|rest| !rest.is_empty());
        if !has_host {
            return Err(ValidationError::InvalidEndpoint {
                name: self.name.clone(),
                value: self.endpoint.clone(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_aliases() {
        assert_eq!("Bike-Share".parse::<SourceKind>(), Ok(SourceKind::BikeShare));
        assert_eq!("aircraft".parse::<SourceKind>(), Ok(SourceKind::AircraftPosition));
        for kind in SourceKind::ALL {
            assert_eq!(kind.as_str().parse::<SourceKind>(), Ok(kind));
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = "subway".parse::<SourceKind>().expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidSourceKind { .. }));
    }

    #[test]
    fn spec_requires_http_endpoint() {
        let err = SourceSpec::new("NYC_Traffic", SourceKind::Traffic, "ftp://example.test")
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidEndpoint { .. }));

        let err = SourceSpec::new("NYC_Traffic", SourceKind::Traffic, "https://")
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidEndpoint { .. }));

        let err = SourceSpec::new(" ", SourceKind::Traffic, "https://example.test")
            .expect_err("must fail");
        assert_eq!(err, ValidationError::EmptySourceName);
    }
}
