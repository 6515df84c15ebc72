use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// One `category:name` stage reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StageRef {
    pub category: String,
    pub name: String,
}

impl fmt::Display for StageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.name)
    }
}

impl FromStr for StageRef {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, ':');
        let category = parts.next().unwrap_or("").trim();
        let name = parts.next().unwrap_or("").trim();
        if category.is_empty() || name.is_empty() {
            return Err(EngineError::Config(format!(
                "invalid module reference '{s}', expected category:name"
            )));
        }
        Ok(Self {
            category: category.to_string(),
            name: name.to_string(),
        })
    }
}

/// Ordered list of stages parsed from `cat:name|cat:name|...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpec {
    pub stages: Vec<StageRef>,
}

impl ModuleSpec {
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl FromStr for ModuleSpec {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(EngineError::Config("empty module specification".into()));
        }
        let stages = s
            .split('|')
            .map(|part| part.parse::<StageRef>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { stages })
    }
}

impl fmt::Display for ModuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .stages
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join("|");
        f.write_str(&joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_stage() {
        let spec: ModuleSpec = "ext:email".parse().unwrap();
        assert_eq!(spec.len(), 1);
        assert_eq!(spec.stages[0].category, "ext");
        assert_eq!(spec.stages[0].name, "email");
    }

    #[test]
    fn parses_chain_in_order() {
        let spec: ModuleSpec = "ext:email|clc:dns|out:json".parse().unwrap();
        let labels: Vec<String> = spec.stages.iter().map(|s| s.to_string()).collect();
        assert_eq!(labels, vec!["ext:email", "clc:dns", "out:json"]);
    }

    #[test]
    fn rejects_malformed_references() {
        assert!("".parse::<ModuleSpec>().is_err());
        assert!("email".parse::<ModuleSpec>().is_err());
        assert!("ext:".parse::<ModuleSpec>().is_err());
        assert!(":email".parse::<ModuleSpec>().is_err());
        assert!("ext:email||clc:dns".parse::<ModuleSpec>().is_err());
    }

    #[test]
    fn display_round_trips() {
        let spec: ModuleSpec = "ext:url|cnc:tcp".parse().unwrap();
        assert_eq!(spec.to_string(), "ext:url|cnc:tcp");
    }
}
