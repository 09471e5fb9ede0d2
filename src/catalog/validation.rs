//! Request validation for the catalog routes.
//!
//! Two layers run in order:
//! 1. Field rules on the raw body. Every broken field is collected and
//!    reported together as [`ApiError::ValidationFailed`].
//! 2. Sanitization and content screening on the surviving values. The
//!    first problem found is reported as [`ApiError::BusinessRuleViolation`].

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::model::{DetailsQuery, DetailsRequest, SearchQuery, SearchRequest};
use crate::error::{ApiError, FieldError};

pub const DEFAULT_LIMIT: usize = 100;
pub const MAX_LIMIT: i64 = 1000;

const MAX_NAME_LENGTH: usize = 200;
const MAX_BOROUGH_LENGTH: usize = 50;
const MAX_CUISINE_LENGTH: usize = 100;

pub const MALICIOUS_CONTENT_MESSAGE: &str = "Input contains potentially malicious content";

static NAME_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\s\-',.&()]+$").expect("valid regex literal"));

static BOROUGH_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s]*$").expect("valid regex literal"));

static BOROUGH_SANITIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z\s]+$").expect("valid regex literal"));

static GRADE_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]?$").expect("valid regex literal"));

static SQL_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(union|select|insert|update|delete|drop|create|alter|exec|script|javascript|<|>)")
        .expect("valid regex literal")
});

static SCRIPT_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(<script|javascript:|onerror=|onload=|eval\(|expression\()")
        .expect("valid regex literal")
});

static CONTROL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{Cc}&&[^\r\n\t]]").expect("valid regex literal"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex literal"));

/// Validate and normalize a search body.
pub fn validate_search(request: SearchRequest) -> Result<SearchQuery, ApiError> {
    let mut errors = Vec::new();

    if let Some(borough) = &request.borough {
        check_borough_field(borough, &mut errors);
    }
    if let Some(cuisine) = &request.cuisine {
        if char_len(cuisine) > MAX_CUISINE_LENGTH {
            errors.push(FieldError::new("cuisine", "Cuisine description is too long"));
        } else if !cuisine.is_empty() && !NAME_CHARSET.is_match(cuisine) {
            errors.push(FieldError::new("cuisine", "Cuisine contains invalid characters"));
        }
    }
    if let Some(grade) = &request.min_grade {
        if char_len(grade) > 1 {
            errors.push(FieldError::new("minGrade", "Grade must be a single character"));
        } else if !GRADE_FIELD.is_match(grade) {
            errors.push(FieldError::new("minGrade", "Grade must be a single uppercase letter"));
        }
    }
    if let Some(limit) = request.limit {
        if limit < 1 {
            errors.push(FieldError::new("limit", "Limit must be at least 1"));
        } else if limit > MAX_LIMIT {
            errors.push(FieldError::new("limit", "Limit cannot exceed 1000"));
        }
    }

    if !errors.is_empty() {
        return Err(ApiError::ValidationFailed(errors));
    }

    Ok(SearchQuery {
        borough: screen_borough(request.borough.as_deref())?,
        cuisine: screen_text(request.cuisine.as_deref(), "Cuisine description")?,
        min_grade: screen_grade(request.min_grade.as_deref())?,
        limit: request
            .limit
            .and_then(|limit| usize::try_from(limit).ok())
            .unwrap_or(DEFAULT_LIMIT),
    })
}

/// Validate and normalize a details body.
pub fn validate_details(request: DetailsRequest) -> Result<DetailsQuery, ApiError> {
    let mut errors = Vec::new();

    match request.restaurant_name.as_deref() {
        None => errors.push(FieldError::new("restaurantName", "Restaurant name is required")),
        Some(name) if name.trim().is_empty() => {
            errors.push(FieldError::new("restaurantName", "Restaurant name is required"))
        }
        Some(name) if char_len(name) > MAX_NAME_LENGTH => {
            errors.push(FieldError::new("restaurantName", "Restaurant name is too long"))
        }
        Some(name) if !NAME_CHARSET.is_match(name) => errors.push(FieldError::new(
            "restaurantName",
            "Restaurant name contains invalid characters",
        )),
        Some(_) => {}
    }
    if let Some(borough) = &request.borough {
        check_borough_field(borough, &mut errors);
    }

    if !errors.is_empty() {
        return Err(ApiError::ValidationFailed(errors));
    }

    let restaurant_name = screen_text(request.restaurant_name.as_deref(), "Restaurant name")?
        .ok_or_else(|| ApiError::BusinessRuleViolation("Restaurant name is required".into()))?;

    Ok(DetailsQuery {
        restaurant_name,
        borough: screen_borough(request.borough.as_deref())?,
    })
}

/// Trim, drop control characters other than `\r`, `\n` and `\t`, then
/// collapse whitespace runs to a single space.
pub fn sanitize(input: &str) -> String {
    let stripped = CONTROL_CHARS.replace_all(input.trim(), "");
    WHITESPACE_RUN.replace_all(&stripped, " ").into_owned()
}

/// Reject input that looks like SQL or script injection.
pub fn check_for_injection(input: &str) -> Result<(), ApiError> {
    if SQL_KEYWORDS.is_match(input) {
        tracing::error!(input = %input, "Potential SQL injection detected");
        return Err(ApiError::BusinessRuleViolation(MALICIOUS_CONTENT_MESSAGE.into()));
    }
    if SCRIPT_MARKERS.is_match(input) {
        tracing::error!(input = %input, "Potential XSS attack detected");
        return Err(ApiError::BusinessRuleViolation(MALICIOUS_CONTENT_MESSAGE.into()));
    }
    Ok(())
}

fn check_borough_field(borough: &str, errors: &mut Vec<FieldError>) {
    if char_len(borough) > MAX_BOROUGH_LENGTH {
        errors.push(FieldError::new("borough", "Borough name is too long"));
    } else if !BOROUGH_FIELD.is_match(borough) {
        errors.push(FieldError::new(
            "borough",
            "Borough can only contain letters and spaces",
        ));
    }
}

fn non_blank(input: Option<&str>) -> Option<&str> {
    input.filter(|value| !value.trim().is_empty())
}

fn screen_text(input: Option<&str>, field: &str) -> Result<Option<String>, ApiError> {
    let Some(raw) = non_blank(input) else {
        return Ok(None);
    };
    let sanitized = sanitize(raw);
    if !NAME_CHARSET.is_match(&sanitized) {
        tracing::warn!(field, input = %sanitized, "Input contains invalid characters");
        return Err(ApiError::BusinessRuleViolation(format!(
            "{field} contains invalid characters"
        )));
    }
    check_for_injection(&sanitized)?;
    Ok(Some(sanitized))
}

fn screen_borough(input: Option<&str>) -> Result<Option<String>, ApiError> {
    let Some(raw) = non_blank(input) else {
        return Ok(None);
    };
    let sanitized = sanitize(raw).to_uppercase();
    if !BOROUGH_SANITIZED.is_match(&sanitized) {
        return Err(ApiError::BusinessRuleViolation(
            "Borough name contains invalid characters".into(),
        ));
    }
    Ok(Some(sanitized))
}

fn screen_grade(input: Option<&str>) -> Result<Option<String>, ApiError> {
    let Some(raw) = non_blank(input) else {
        return Ok(None);
    };
    let sanitized = sanitize(raw).to_uppercase();
    if char_len(&sanitized) != 1 {
        return Err(ApiError::BusinessRuleViolation(
            "Grade must be a single character".into(),
        ));
    }
    Ok(Some(sanitized))
}

fn char_len(input: &str) -> usize {
    input.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(borough: Option<&str>, cuisine: Option<&str>, grade: Option<&str>, limit: Option<i64>) -> SearchRequest {
        SearchRequest {
            borough: borough.map(Into::into),
            cuisine: cuisine.map(Into::into),
            min_grade: grade.map(Into::into),
            limit,
        }
    }

    fn field_errors(result: Result<SearchQuery, ApiError>) -> Vec<FieldError> {
        match result {
            Err(ApiError::ValidationFailed(fields)) => fields,
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_search_uses_defaults() {
        let query = validate_search(SearchRequest::default()).unwrap();
        assert_eq!(query.borough, None);
        assert_eq!(query.cuisine, None);
        assert_eq!(query.min_grade, None);
        assert_eq!(query.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_search_is_normalized() {
        let query = validate_search(search(
            Some("  staten   island "),
            Some(" Pizza "),
            Some("B"),
            Some(5),
        ))
        .unwrap();
        assert_eq!(query.borough.as_deref(), Some("STATEN ISLAND"));
        assert_eq!(query.cuisine.as_deref(), Some("Pizza"));
        assert_eq!(query.min_grade.as_deref(), Some("B"));
        assert_eq!(query.limit, 5);
    }

    #[test]
    fn test_every_invalid_field_is_reported() {
        let fields = field_errors(validate_search(search(
            Some("Brooklyn 11"),
            Some("Pizza;"),
            Some("AB"),
            Some(0),
        )));
        let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["borough", "cuisine", "minGrade", "limit"]);
        assert_eq!(fields[0].message, "Borough can only contain letters and spaces");
        assert_eq!(fields[1].message, "Cuisine contains invalid characters");
        assert_eq!(fields[2].message, "Grade must be a single character");
        assert_eq!(fields[3].message, "Limit must be at least 1");
    }

    #[test]
    fn test_limit_bounds() {
        let fields = field_errors(validate_search(search(None, None, None, Some(1001))));
        assert_eq!(fields, vec![FieldError::new("limit", "Limit cannot exceed 1000")]);
        assert_eq!(validate_search(search(None, None, None, Some(1000))).unwrap().limit, 1000);
        assert_eq!(validate_search(search(None, None, None, Some(1))).unwrap().limit, 1);
    }

    #[test]
    fn test_lowercase_grade_is_a_field_error() {
        let fields = field_errors(validate_search(search(None, None, Some("a"), None)));
        assert_eq!(fields[0].message, "Grade must be a single uppercase letter");
    }

    #[test]
    fn test_long_borough_is_a_field_error() {
        let long = "A".repeat(51);
        let fields = field_errors(validate_search(search(Some(&long), None, None, None)));
        assert_eq!(fields[0].message, "Borough name is too long");
    }

    #[test]
    fn test_sql_keywords_are_rejected() {
        let result = validate_search(search(None, Some("Pizza union all"), None, None));
        match result {
            Err(ApiError::BusinessRuleViolation(message)) => {
                assert_eq!(message, MALICIOUS_CONTENT_MESSAGE)
            }
            other => panic!("expected business rule violation, got {other:?}"),
        }
    }

    #[test]
    fn test_details_requires_name() {
        for name in [None, Some("   ")] {
            let result = validate_details(DetailsRequest {
                restaurant_name: name.map(Into::into),
                borough: None,
            });
            match result {
                Err(ApiError::ValidationFailed(fields)) => {
                    assert_eq!(fields, vec![FieldError::new("restaurantName", "Restaurant name is required")]);
                }
                other => panic!("expected validation failure, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_details_rejects_markup() {
        let result = validate_details(DetailsRequest {
            restaurant_name: Some("<script>alert(1)</script>".into()),
            borough: Some("Queens".into()),
        });
        match result {
            Err(ApiError::ValidationFailed(fields)) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].message, "Restaurant name contains invalid characters");
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_details_keeps_apostrophes() {
        let query = validate_details(DetailsRequest {
            restaurant_name: Some("Joe's  Pizza".into()),
            borough: Some("manhattan".into()),
        })
        .unwrap();
        assert_eq!(query.restaurant_name, "Joe's Pizza");
        assert_eq!(query.borough.as_deref(), Some("MANHATTAN"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize("  Golden\u{0007} \t Dragon \n"), "Golden Dragon");
    }

    #[test]
    fn test_script_markers_are_rejected() {
        assert!(check_for_injection("eval(1)").is_err());
        assert!(check_for_injection("Harbor Sushi").is_ok());
    }
}
