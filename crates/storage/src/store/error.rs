#![forbid(unsafe_code)]

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    InvalidInput(&'static str),
    RecipeNotFound,
    ParentNotFound,
    RecipeHasForks,
    LineageCycle,
    LineageDepthExceeded,
}

impl StoreError {
    /// Stable machine-readable code for transport layers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO_ERROR",
            Self::Sql(_) => "STORAGE_ERROR",
            Self::InvalidInput(message) if message.starts_with("RESET_REQUIRED") => {
                "RESET_REQUIRED"
            }
            Self::InvalidInput(_) => "VALIDATION_ERROR",
            Self::RecipeNotFound => "RECIPE_NOT_FOUND",
            Self::ParentNotFound => "PARENT_NOT_FOUND",
            Self::RecipeHasForks => "RECIPE_HAS_FORKS",
            Self::LineageCycle => "LINEAGE_CYCLE",
            Self::LineageDepthExceeded => "LINEAGE_DEPTH_EXCEEDED",
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::RecipeNotFound => write!(f, "recipe not found"),
            Self::ParentNotFound => write!(f, "parent recipe not found"),
            Self::RecipeHasForks => {
                write!(f, "cannot delete a recipe with existing forks")
            }
            Self::LineageCycle => write!(f, "recipe lineage cycle"),
            Self::LineageDepthExceeded => write!(f, "recipe lineage depth exceeded"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}
