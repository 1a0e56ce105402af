// ==========================================
// Vendi Backoffice - Composite duplicate key
// ==========================================
// Identity of a catalog row for duplicate detection:
// name + size + brand + color. Same name with a different
// size/brand/color is NOT a duplicate.
// ==========================================

use crate::domain::product_import::{RawRow, RowError};
use crate::domain::slug::slugify;
use std::collections::HashMap;

pub struct DuplicateKey;

impl DuplicateKey {
    /// Composite key for one parsed row. A blank name yields no key
    /// (the row can never be a duplicate).
    pub fn from_row(row: &RawRow) -> Option<String> {
        Self::build(
            row.name.as_deref(),
            row.size.as_deref(),
            row.brand.as_deref(),
            row.color.as_deref(),
        )
    }

    /// Composite key from loose attributes (catalog side).
    pub fn from_attributes(
        name: &str,
        size: Option<&str>,
        brand: Option<&str>,
        color: Option<&str>,
    ) -> Option<String> {
        Self::build(Some(name), size, brand, color)
    }

    /// Consistent normalization for the non-name parts: trim, blank
    /// coalesced to "".
    pub fn normalize_part(value: Option<&str>) -> String {
        value.map(str::trim).unwrap_or("").to_string()
    }

    fn build(
        name: Option<&str>,
        size: Option<&str>,
        brand: Option<&str>,
        color: Option<&str>,
    ) -> Option<String> {
        let name = name.map(str::trim).unwrap_or("");
        if name.is_empty() {
            return None;
        }

        Some(
            [
                slugify(name),
                Self::normalize_part(size),
                Self::normalize_part(brand),
                Self::normalize_part(color),
            ]
            .join("|"),
        )
    }

    /// Detect duplicate composite keys inside one parsed file.
    ///
    /// Every row of a conflict group is reported (not just the later
    /// occurrences), each cross-referencing the other offending row
    /// numbers, so the user can fix whichever copy is wrong.
    pub fn detect_in_rows(rows: &[RawRow]) -> Vec<RowError> {
        let mut key_map: HashMap<String, Vec<usize>> = HashMap::new();

        for (index, row) in rows.iter().enumerate() {
            if let Some(key) = Self::from_row(row) {
                key_map.entry(key).or_default().push(index + 1);
            }
        }

        let mut errors = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            let row_number = index + 1;
            let Some(key) = Self::from_row(row) else {
                continue;
            };
            let Some(group) = key_map.get(&key) else {
                continue;
            };
            if group.len() <= 1 {
                continue;
            }

            let others: Vec<String> = group
                .iter()
                .filter(|n| **n != row_number)
                .map(|n| n.to_string())
                .collect();
            let name = row.name.as_deref().unwrap_or("");
            errors.push(RowError::new(
                row_number,
                Some(row.clone()),
                vec![format!(
                    "Produto duplicado: \"{}\" com mesmo tamanho/marca/cor (também na linha {})",
                    name,
                    others.join(", ")
                )],
            ));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, size: Option<&str>, brand: Option<&str>, color: Option<&str>) -> RawRow {
        RawRow {
            name: Some(name.to_string()),
            size: size.map(String::from),
            brand: brand.map(String::from),
            color: color.map(String::from),
            ..RawRow::default()
        }
    }

    #[test]
    fn test_key_symmetry() {
        let a = DuplicateKey::from_row(&row("Camisa Polo", Some("M"), Some("X"), None));
        let b = DuplicateKey::from_row(&row("camisa POLO", Some(" M "), Some("X"), Some("")));
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_size_is_not_duplicate() {
        let a = DuplicateKey::from_row(&row("Camisa", Some("M"), None, None));
        let b = DuplicateKey::from_row(&row("Camisa", Some("G"), None, None));
        assert_ne!(a, b);
    }

    #[test]
    fn test_blank_name_has_no_key() {
        assert_eq!(DuplicateKey::from_row(&RawRow::default()), None);
        assert_eq!(DuplicateKey::from_row(&row("   ", None, None, None)), None);
    }

    #[test]
    fn test_accented_names_collide_after_slugify() {
        let a = DuplicateKey::from_row(&row("Calça Jeans", None, None, None));
        let b = DuplicateKey::from_row(&row("calca jeans", None, None, None));
        assert_eq!(a, b);
    }

    #[test]
    fn test_detect_in_rows_reports_every_member() {
        let rows = vec![
            row("Camisa", Some("M"), None, None),
            row("Bermuda", None, None, None),
            row("camisa", Some("M"), None, None),
        ];

        let errors = DuplicateKey::detect_in_rows(&rows);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].row, 1);
        assert!(errors[0].errors[0].contains("também na linha 3"));
        assert_eq!(errors[1].row, 3);
        assert!(errors[1].errors[0].contains("também na linha 1"));
    }

    #[test]
    fn test_detect_in_rows_three_way_group() {
        let rows = vec![
            row("Meia", None, None, None),
            row("Meia", None, None, None),
            row("Meia", None, None, None),
        ];

        let errors = DuplicateKey::detect_in_rows(&rows);
        assert_eq!(errors.len(), 3);
        assert!(errors[0].errors[0].contains("também na linha 2, 3"));
        assert!(errors[2].errors[0].contains("também na linha 1, 2"));
    }
}
