//! Output file naming
//!
//! Every selection slot gets a fixed, predictable name so consumers can
//! fetch the latest file without knowing its original name.
//! All derived names are reserved: files carrying them are never
//! candidates themselves.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::{config::ConfigError, period::Period};

/// Which modification times a [Target] accepts
#[derive(Debug, Clone, PartialEq, Eq)]
enum Rule {
    /// Any time of day
    Any,
    /// Only times of day within the period
    Within(Period),
}

/// A selection slot with its derived output name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    name: String,
    rule: Rule,
}

impl Target {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accepts(&self, modified: DateTime<Utc>) -> bool {
        match &self.rule {
            Rule::Any => true,
            Rule::Within(period) => period.contains(modified),
        }
    }
}

/// Name for the newest file in `period`, e.g. `recent-morning.jpg`
pub fn period_name(label: &str, period: &Period, file_type: &str) -> String {
    format!("{label}-{}{file_type}", period.name())
}

/// Derived targets of a job together with the reserved names
#[derive(Debug, Clone)]
pub struct Targets {
    targets: Vec<Target>,
    reserved: HashSet<String>,
}

impl Targets {
    /// Derive the targets.
    ///
    /// Without periods there is a single slot called `target_name`.
    /// With periods there is one slot per period. `overall_name` adds a slot
    /// for the newest file regardless of time of day in both cases.
    /// `target_name` is reserved even when periods are configured.
    pub fn derive(
        label: &str,
        file_type: &str,
        target_name: &str,
        overall_name: Option<&str>,
        periods: &[Period],
    ) -> Result<Self, ConfigError> {
        let mut targets = Vec::new();

        if periods.is_empty() {
            targets.push(Target {
                name: target_name.to_owned(),
                rule: Rule::Any,
            });
        } else {
            targets.extend(periods.iter().map(|period| Target {
                name: period_name(label, period, file_type),
                rule: Rule::Within(period.clone()),
            }));
        }

        if let Some(overall) = overall_name {
            targets.push(Target {
                name: overall.to_owned(),
                rule: Rule::Any,
            });
        }

        let mut reserved = HashSet::new();
        for target in &targets {
            if !reserved.insert(target.name.clone()) {
                return Err(ConfigError::DuplicateName(target.name.clone()));
            }
        }
        reserved.insert(target_name.to_owned());

        Ok(Self { targets, reserved })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether `file_name` is one of our own outputs
    pub fn is_reserved(&self, file_name: &str) -> bool {
        self.reserved.contains(file_name)
    }
}
