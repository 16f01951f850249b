//! Step predicates for conditional execution

use std::fmt;
use std::sync::Arc;

use crate::model::{ActionKind, Step};

type Predicate = Arc<dyn Fn(&Step) -> bool + Send + Sync>;

/// Decides which steps a conditional strategy passes on
#[derive(Clone, Default)]
pub enum StepFilter {
    /// Accept every step
    #[default]
    Always,
    /// Skip steps whose name contains any of the fragments
    SkipNamesContaining(Vec<String>),
    /// Accept only steps of the listed kinds
    OnlyKinds(Vec<ActionKind>),
    /// Arbitrary predicate with a label for logs
    Custom { label: String, predicate: Predicate },
}

impl StepFilter {
    pub fn custom(
        label: impl Into<String>,
        predicate: impl Fn(&Step) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::Custom {
            label: label.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn matches(&self, step: &Step) -> bool {
        match self {
            Self::Always => true,
            Self::SkipNamesContaining(fragments) => {
                let name = step.display_name();
                !fragments.iter().any(|f| name.contains(f.as_str()))
            }
            Self::OnlyKinds(kinds) => kinds.contains(&step.kind()),
            Self::Custom { predicate, .. } => predicate(step),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::Always => "all steps".to_string(),
            Self::SkipNamesContaining(fragments) => {
                format!("skip names containing {}", fragments.join(", "))
            }
            Self::OnlyKinds(kinds) => {
                let kinds: Vec<_> = kinds.iter().map(|k| k.as_str()).collect();
                format!("only {}", kinds.join(", "))
            }
            Self::Custom { label, .. } => label.clone(),
        }
    }
}

impl fmt::Debug for StepFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StepFilter({})", self.description())
    }
}
