/// Optional substring test applied to raw work items and partial results.
#[derive(Debug, Clone, Default)]
pub struct FilterPredicate {
    needle: Option<String>,
}

impl FilterPredicate {
    pub fn new(needle: Option<String>) -> Self {
        Self {
            needle: needle.filter(|n| !n.is_empty()),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.needle.is_some()
    }

    pub fn accepts(&self, value: &str) -> bool {
        match &self.needle {
            Some(n) => value.contains(n.as_str()),
            None => true,
        }
    }
}
