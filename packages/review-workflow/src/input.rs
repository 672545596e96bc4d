//! Review input parsing.
//!
//! Reviews arrive either as a JSON array of strings or as free text with one
//! review per line. Text that looks like a JSON array (`[` ... `]`) must parse
//! as one; it is never silently re-read as lines.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewInputError {
    #[error("No reviews were provided.")]
    Empty,

    #[error(
        "The review input looks like JSON but could not be parsed. Please check the format \
         for errors (e.g., missing commas, incorrect quotes, invalid escape sequences). ({0})"
    )]
    MalformedJson(String),

    #[error("The review input looks like JSON but is not an array of strings.")]
    NotStringArray,

    #[error("Could not parse reviews. Please ensure format is correct (JSON array or one review per line).")]
    NoReviews,
}

/// Parse raw review text into a list of trimmed, non-empty reviews.
pub fn parse_reviews(text: &str) -> Result<Vec<String>, ReviewInputError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ReviewInputError::Empty);
    }

    let reviews: Vec<String> = if trimmed.starts_with('[') && trimmed.ends_with(']') {
        let value: serde_json::Value = serde_json::from_str(trimmed)
            .map_err(|e| ReviewInputError::MalformedJson(e.to_string()))?;
        let items = value.as_array().ok_or(ReviewInputError::NotStringArray)?;
        items
            .iter()
            .map(|item| item.as_str().ok_or(ReviewInputError::NotStringArray))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(str::trim)
            .filter(|review| !review.is_empty())
            .map(String::from)
            .collect()
    } else {
        trimmed
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()
    };

    if reviews.is_empty() {
        return Err(ReviewInputError::NoReviews);
    }

    tracing::debug!(count = reviews.len(), "Parsed review input");
    Ok(reviews)
}
