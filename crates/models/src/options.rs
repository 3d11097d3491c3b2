use serde::{Deserialize, Serialize};

/// One entry of a dropdown: a label and the wire value it stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub name: String,
    pub value: String,
}

/// Enumerated values served by `GET /options` to populate form dropdowns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    #[serde(default)]
    pub roles: Vec<OptionItem>,
    #[serde(default)]
    pub departments: Vec<OptionItem>,
    #[serde(default)]
    pub days_of_week: Vec<OptionItem>,
    #[serde(default)]
    pub terms: Vec<OptionItem>,
    #[serde(default)]
    pub seasons: Vec<OptionItem>,
}

impl Options {
    /// Looks up the label of `value` in `items`, falling back to the value
    pub fn label<'a>(items: &'a [OptionItem], value: &'a str) -> &'a str {
        items
            .iter()
            .find(|item| item.value == value)
            .map_or(value, |item| item.name.as_str())
    }
}
