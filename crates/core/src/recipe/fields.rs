#![forbid(unsafe_code)]

const MAX_TITLE_LEN: usize = 256;
const MAX_AUTHOR_LEN: usize = 128;
const MAX_TEXT_LEN: usize = 64 * 1024;

pub const DEFAULT_AUTHOR: &str = "Anonymous";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequiredField {
    Title,
    Ingredients,
    Instructions,
}

impl RequiredField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Ingredients => "ingredients",
            Self::Instructions => "instructions",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecipeFieldError {
    Empty { field: RequiredField },
    TooLong { field: RequiredField },
    AuthorTooLong,
    DescriptionTooLong,
    ChangesTooLong,
}

impl RecipeFieldError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty { field: RequiredField::Title } => "title must not be empty",
            Self::Empty {
                field: RequiredField::Ingredients,
            } => "ingredients must not be empty",
            Self::Empty {
                field: RequiredField::Instructions,
            } => "instructions must not be empty",
            Self::TooLong { field: RequiredField::Title } => "title is too long",
            Self::TooLong {
                field: RequiredField::Ingredients,
            } => "ingredients is too long",
            Self::TooLong {
                field: RequiredField::Instructions,
            } => "instructions is too long",
            Self::AuthorTooLong => "author is too long",
            Self::DescriptionTooLong => "description is too long",
            Self::ChangesTooLong => "changes is too long",
        }
    }
}

/// Canonical form of a required content field: trimmed, non-empty, bounded.
pub fn canonical_required(field: RequiredField, value: &str) -> Result<String, RecipeFieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RecipeFieldError::Empty { field });
    }
    let limit = match field {
        RequiredField::Title => MAX_TITLE_LEN,
        RequiredField::Ingredients | RequiredField::Instructions => MAX_TEXT_LEN,
    };
    if trimmed.len() > limit {
        return Err(RecipeFieldError::TooLong { field });
    }
    Ok(trimmed.to_string())
}

/// Canonical form of an optional free-text field: trimmed, empty collapses to None.
pub fn canonical_description(value: Option<&str>) -> Result<Option<String>, RecipeFieldError> {
    canonical_optional(value, MAX_TEXT_LEN, RecipeFieldError::DescriptionTooLong)
}

pub fn canonical_changes(value: Option<&str>) -> Result<Option<String>, RecipeFieldError> {
    canonical_optional(value, MAX_TEXT_LEN, RecipeFieldError::ChangesTooLong)
}

/// Canonical author attribution; absent or blank falls back to [`DEFAULT_AUTHOR`].
pub fn canonical_author(value: Option<&str>) -> Result<String, RecipeFieldError> {
    let trimmed = value.map(str::trim).unwrap_or("");
    if trimmed.is_empty() {
        return Ok(DEFAULT_AUTHOR.to_string());
    }
    if trimmed.len() > MAX_AUTHOR_LEN {
        return Err(RecipeFieldError::AuthorTooLong);
    }
    Ok(trimmed.to_string())
}

fn canonical_optional(
    value: Option<&str>,
    limit: usize,
    too_long: RecipeFieldError,
) -> Result<Option<String>, RecipeFieldError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.len() > limit {
        return Err(too_long);
    }
    Ok(Some(trimmed.to_string()))
}
