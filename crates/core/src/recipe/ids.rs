#![forbid(unsafe_code)]

/// Store-assigned recipe identifier. Always positive once assigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecipeId(i64);

impl RecipeId {
    pub fn as_i64(self) -> i64 {
        self.0
    }

    pub fn try_new(value: i64) -> Result<Self, RecipeIdError> {
        if value <= 0 {
            return Err(RecipeIdError::NonPositive);
        }
        Ok(Self(value))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecipeIdError {
    NonPositive,
}

impl RecipeIdError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NonPositive => "recipe id must be a positive integer",
        }
    }
}
