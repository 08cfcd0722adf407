use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Existing,
    /// Insert lost a uniqueness race; the concurrently written record was adopted.
    Raced,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Created => "created",
            Outcome::Existing => "existing",
            Outcome::Raced => "raced",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedStep {
    pub collection: &'static str,
    pub key: String,
    pub outcome: Outcome,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub steps: Vec<SeedStep>,
    pub catalog_saved: bool,
}

impl SeedReport {
    pub(crate) fn record(&mut self, collection: &'static str, key: &str, outcome: Outcome) {
        self.steps.push(SeedStep {
            collection,
            key: key.to_string(),
            outcome,
        });
    }

    pub fn outcome(&self, collection: &str) -> Option<Outcome> {
        self.steps
            .iter()
            .find(|s| s.collection == collection)
            .map(|s| s.outcome)
    }

    pub fn created(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.outcome == Outcome::Created)
            .count()
    }

    /// True when the pass wrote nothing.
    pub fn is_noop(&self) -> bool {
        self.created() == 0 && !self.catalog_saved
    }
}
