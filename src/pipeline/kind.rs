use crate::error::OteError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of operation kinds a pipeline stage can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    DataResource,
    Parser,
    Filter,
    Function,
    Mapping,
    Transformation,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::DataResource,
        StrategyKind::Parser,
        StrategyKind::Filter,
        StrategyKind::Function,
        StrategyKind::Mapping,
        StrategyKind::Transformation,
    ];

    /// Name used in REST paths and session keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataResource => "dataresource",
            Self::Parser => "parser",
            Self::Filter => "filter",
            Self::Function => "function",
            Self::Mapping => "mapping",
            Self::Transformation => "transformation",
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            Self::DataResource => "DataResource",
            Self::Parser => "Parser",
            Self::Filter => "Filter",
            Self::Function => "Function",
            Self::Mapping => "Mapping",
            Self::Transformation => "Transformation",
        }
    }

    /// Key holding the new strategy id in a create response
    pub fn id_key(&self) -> String {
        match self {
            Self::DataResource => "resource_id".to_string(),
            other => format!("{}_id", other.as_str()),
        }
    }

    /// Session key listing the ids of the strategies of this kind created in a session
    pub fn info_key(&self) -> String {
        format!("{}_info", self.as_str())
    }

    /// Configuration field naming the concrete strategy type
    pub fn type_field(&self) -> &'static str {
        match self {
            Self::DataResource => "resourceType",
            Self::Parser => "parserType",
            Self::Filter => "filterType",
            Self::Function => "functionType",
            Self::Mapping => "mappingType",
            Self::Transformation => "transformationType",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = OteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| OteError::InvalidStrategy(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!("filter".parse::<StrategyKind>().unwrap(), StrategyKind::Filter);
        assert_eq!(
            "DataResource".parse::<StrategyKind>().unwrap(),
            StrategyKind::DataResource
        );
        assert_eq!(
            " Transformation ".parse::<StrategyKind>().unwrap(),
            StrategyKind::Transformation
        );

        let err = "resource".parse::<StrategyKind>().unwrap_err();
        assert!(matches!(err, OteError::InvalidStrategy(name) if name == "resource"));
    }

    #[test]
    fn test_kind_keys() {
        assert_eq!(StrategyKind::DataResource.id_key(), "resource_id");
        assert_eq!(StrategyKind::Filter.id_key(), "filter_id");
        assert_eq!(StrategyKind::Mapping.info_key(), "mapping_info");
        assert_eq!(StrategyKind::DataResource.info_key(), "dataresource_info");
        assert_eq!(StrategyKind::Parser.type_field(), "parserType");
    }

    #[test]
    fn test_kind_serde_matches_wire_name() {
        for kind in StrategyKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.as_str());
        }
    }
}
