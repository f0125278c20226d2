use serde::{Deserialize, Serialize};

/// Entry of the category index served alongside the question sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub subcategories: Vec<QuizSubcategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSubcategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
}

/// Wire shape of `categories.json`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CategoryIndex {
    #[serde(default)]
    pub categories: Vec<QuizCategory>,
}
