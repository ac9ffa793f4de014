use serde::Deserialize;
use std::collections::HashMap;

shared_kernel::string_key!(CauseCode);

pub const UNKNOWN_CAUSE: &str = "Unknown / Not published";

const SEPARATOR: &str = " : ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CauseCodeName {
    pub code: CauseCode,
    pub name: Option<String>,
}

/// Metadata records occasionally come without a code; those are skipped
/// instead of failing the whole list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCodeDto {
    pub category_code: Option<String>,
    pub category_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedCategoryCodeDto {
    pub detailed_category_code: Option<String>,
    pub detailed_category_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThirdCategoryCodeDto {
    pub third_category_code: Option<String>,
    pub third_category_name: Option<String>,
}

fn code_name(code: Option<String>, name: Option<String>) -> Option<CauseCodeName> {
    code.map(|code| CauseCodeName {
        code: code.into(),
        name,
    })
}

impl CategoryCodeDto {
    pub fn into_code_name(self) -> Option<CauseCodeName> {
        code_name(self.category_code, self.category_name)
    }
}

impl DetailedCategoryCodeDto {
    pub fn into_code_name(self) -> Option<CauseCodeName> {
        code_name(self.detailed_category_code, self.detailed_category_name)
    }
}

impl ThirdCategoryCodeDto {
    pub fn into_code_name(self) -> Option<CauseCodeName> {
        code_name(self.third_category_code, self.third_category_name)
    }
}

/// Three independent code tables, most general first. A code whose record
/// carries no name is kept in the table but contributes nothing when resolved.
#[derive(Debug, Default, Clone)]
pub struct CauseCodeRegistry {
    categories: HashMap<CauseCode, Option<String>>,
    detailed: HashMap<CauseCode, Option<String>>,
    third: HashMap<CauseCode, Option<String>>,
}

fn table(codes: Vec<CauseCodeName>) -> HashMap<CauseCode, Option<String>> {
    codes
        .into_iter()
        .map(|CauseCodeName { code, name }| (code, name))
        .collect()
}

fn lookup<'a>(table: &'a HashMap<CauseCode, Option<String>>, code: &str) -> Option<&'a str> {
    table.get(code).and_then(|name| name.as_deref())
}

impl CauseCodeRegistry {
    pub fn load(
        categories: Vec<CauseCodeName>,
        detailed: Vec<CauseCodeName>,
        third: Vec<CauseCodeName>,
    ) -> Self {
        Self {
            categories: table(categories),
            detailed: table(detailed),
            third: table(third),
        }
    }

    /// Resolves `[category, detailed?, third?]` into a display string. Every
    /// resolved level below the category is prefixed with `" : "`; unknown
    /// codes are skipped level by level.
    pub fn resolve<S: AsRef<str>>(&self, causes: &[S]) -> String {
        let Some((category, rest)) = causes.split_first() else {
            return UNKNOWN_CAUSE.to_string();
        };

        let mut resolved = String::new();
        if let Some(name) = lookup(&self.categories, category.as_ref()) {
            resolved.push_str(name);
        }
        let deeper_levels = [&self.detailed, &self.third];
        for (table, code) in deeper_levels.into_iter().zip(rest) {
            if let Some(name) = lookup(table, code.as_ref()) {
                resolved.push_str(SEPARATOR);
                resolved.push_str(name);
            }
        }
        resolved
    }
}
