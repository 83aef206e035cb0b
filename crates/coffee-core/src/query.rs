//! Query results.

/// Outcome of [`Facade::query`](crate::Facade::query).
///
/// Exactly one responder yields `Single`. Zero or several responders yield
/// `Many` in subscription order, so a query nobody answers resolves to
/// `Many(vec![])` instead of waiting forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResponse<R> {
    Single(R),
    Many(Vec<R>),
}

impl<R> QueryResponse<R> {
    pub(crate) fn from_results(mut results: Vec<R>) -> Self {
        if results.len() == 1 {
            if let Some(only) = results.pop() {
                return Self::Single(only);
            }
        }
        Self::Many(results)
    }

    /// Number of responder results carried.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(results) => results.len(),
        }
    }

    /// True when nobody answered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn single(self) -> Option<R> {
        match self {
            Self::Single(result) => Some(result),
            Self::Many(_) => None,
        }
    }

    /// Flatten into subscription-ordered results.
    pub fn into_vec(self) -> Vec<R> {
        match self {
            Self::Single(result) => vec![result],
            Self::Many(results) => results,
        }
    }

    pub(crate) fn outcome(&self) -> &'static str {
        match self {
            Self::Single(_) => "single",
            Self::Many(results) if results.is_empty() => "empty",
            Self::Many(_) => "many",
        }
    }
}
