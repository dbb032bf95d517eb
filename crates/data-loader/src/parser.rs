//! Parser for the recipe dataset files.
//!
//! The store is fed from two JSON-lines files, one document per line:
//! - recipes.jsonl: `{"id": 1, "original_id": 137739, "name": "...", "ingredients": [...], ...}`
//! - reviews.jsonl: `{"recipe_id": 1, "user_id": 38094, "date": "2003-02-17", "rating": 4, "review": "..."}`
//!
//! Blank lines are skipped. Any malformed line aborts the load with the file
//! name and line number in the error.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Read a file into lines, mapping a missing file to `FileNotFound`
fn read_lines(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path)?;
    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// Deserialize every non-blank line of a JSON-lines file
fn parse_json_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file_name = path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let lines = read_lines(path)?;
    let mut records = Vec::with_capacity(lines.len());

    for (idx, line) in lines.iter().enumerate() {
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue; // Skip empty lines
        }
        let record = serde_json::from_str(line_trimmed).map_err(|e| DataLoadError::ParseError {
            file: file_name.clone(),
            line: idx + 1,
            reason: e.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Parse the recipes.jsonl file
pub fn parse_recipes(path: &Path) -> Result<Vec<Recipe>> {
    parse_json_lines(path)
}

/// Parse the reviews.jsonl file
///
/// Ratings outside 1..=5 are rejected here, at the store boundary.
pub fn parse_reviews(path: &Path) -> Result<Vec<Review>> {
    let reviews: Vec<Review> = parse_json_lines(path)?;
    if let Some(bad) = reviews.iter().find(|r| !(1..=5).contains(&r.rating)) {
        return Err(DataLoadError::InvalidValue {
            field: "rating".to_string(),
            value: bad.rating.to_string(),
        });
    }
    Ok(reviews)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_recipes_with_optional_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "recipes.jsonl",
            concat!(
                r#"{"id": 1, "original_id": 137739, "name": "arriba baked winter squash", "ingredients": ["winter squash", "butter"], "tags": ["60-minutes-or-less"], "minutes": 55}"#,
                "\n\n",
                r#"{"id": 2, "original_id": 31490, "name": "breakfast pizza", "nutrition": {"calories": 173.4, "total_fat": 18.0, "sugar": 0.0, "sodium": 17.0, "protein": 22.0, "saturated_fat": 35.0, "carbohydrates": 1.0}, "avg_rating": 3.5, "review_count": 2}"#,
            ),
        );

        let recipes = parse_recipes(&path).unwrap();
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].ingredients.len(), 2);
        assert!(recipes[0].nutrition.is_none());
        assert_eq!(recipes[1].calories(), Some(173.4));
        assert_eq!(recipes[1].review_count, Some(2));
    }

    #[test]
    fn test_parse_error_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "reviews.jsonl",
            "{\"recipe_id\": 1, \"user_id\": 5, \"date\": \"2010-01-01\", \"rating\": 4}\nnot json\n",
        );

        match parse_reviews(&path) {
            Err(DataLoadError::ParseError { file, line, .. }) => {
                assert_eq!(file, "reviews.jsonl");
                assert_eq!(line, 2);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_rating_out_of_range_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "reviews.jsonl",
            "{\"recipe_id\": 1, \"user_id\": 5, \"date\": \"2010-01-01\", \"rating\": 0}\n",
        );
        assert!(matches!(parse_reviews(&path), Err(DataLoadError::InvalidValue { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = parse_recipes(Path::new("/definitely/not/here/recipes.jsonl"));
        assert!(matches!(result, Err(DataLoadError::FileNotFound { .. })));
    }
}
