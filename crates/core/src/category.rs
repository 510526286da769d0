//! Category kinds and naming rules.

/// Categories classify either incomes or expenses, never both.
pub const KIND_INCOME: &str = "income";
pub const KIND_EXPENSE: &str = "expense";

pub const VALID_KINDS: &[&str] = &[KIND_INCOME, KIND_EXPENSE];

/// Maximum length of a category name.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 60;

/// Categories created for every new family.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    (KIND_INCOME, "Salary"),
    (KIND_INCOME, "Freelance"),
    (KIND_INCOME, "Other income"),
    (KIND_EXPENSE, "Housing"),
    (KIND_EXPENSE, "Groceries"),
    (KIND_EXPENSE, "Transport"),
    (KIND_EXPENSE, "Health"),
    (KIND_EXPENSE, "Education"),
    (KIND_EXPENSE, "Leisure"),
    (KIND_EXPENSE, "Utilities"),
    (KIND_EXPENSE, "Other expenses"),
];

pub fn validate_kind(kind: &str) -> Result<(), String> {
    if VALID_KINDS.contains(&kind) {
        Ok(())
    } else {
        Err(format!(
            "Invalid category kind '{kind}'. Must be one of: {}",
            VALID_KINDS.join(", ")
        ))
    }
}

/// Validate a category name. Leading/trailing whitespace is ignored.
pub fn validate_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Category name cannot be empty".to_string());
    }
    if trimmed.chars().count() > MAX_CATEGORY_NAME_LENGTH {
        return Err(format!(
            "Category name exceeds maximum length of {MAX_CATEGORY_NAME_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate an optional `#RRGGBB` color.
pub fn validate_color(color: &str) -> Result<(), String> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(format!("Invalid color '{color}'. Expected #RRGGBB"))
    }
}

/// Ensure a referenced category has the kind the referencing record needs.
pub fn ensure_kind(expected: &str, actual: &str) -> Result<(), String> {
    if expected == actual {
        Ok(())
    } else {
        Err(format!(
            "Category must be an {expected} category, got an {actual} category"
        ))
    }
}
