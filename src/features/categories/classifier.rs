//! Keyword-root category classifier.

use regex::Regex;

use super::config::{CategoryConfig, CategoryRule};

/// Catch-all label
pub const DEFAULT_LABEL: &str = "Другое";

/// Shortest word allowed to match as the prefix of a longer root
pub const MIN_PARTIAL_WORD_LEN: usize = 3;

const BUILTIN: &[(&str, &[&str])] = &[
    (
        "Работа",
        &[
            "код", "проект", "встреч", "дедлайн", "отчет", "отчёт", "созвон", "работ", "офис",
            "code", "project", "meeting", "deadline", "report", "office", "work",
        ],
    ),
    (
        "Учёба",
        &[
            "лекц", "дз", "экзамен", "школ", "урок", "учеб", "учёб", "семинар", "lecture",
            "homework", "exam", "school", "lesson", "study",
        ],
    ),
    (
        "Здоровье",
        &[
            "врач", "лекарств", "здоров", "таблет", "аптек", "больниц", "доктор", "doctor",
            "medicine", "pill", "pharmacy", "health", "dentist",
        ],
    ),
    (
        "Дом",
        &[
            "купи", "убор", "стирк", "посуд", "молок", "продукт", "магазин", "buy", "clean",
            "laundry", "dishes", "milk", "grocer",
        ],
    ),
    (
        "Финансы",
        &[
            "оплат", "счет", "счёт", "банк", "кредит", "налог", "деньг", "pay", "bill", "bank",
            "rent", "tax", "invoice",
        ],
    ),
    (
        "Развлечения",
        &[
            "кино", "фильм", "игр", "концерт", "сериал", "прогулк", "гулять", "movie", "film",
            "game", "concert", "party", "walk",
        ],
    ),
];

/// Built-in table in priority order
pub fn default_categories() -> Vec<CategoryRule> {
    BUILTIN
        .iter()
        .map(|(label, roots)| CategoryRule {
            label: label.to_string(),
            roots: roots.iter().map(|root| root.to_string()).collect(),
        })
        .collect()
}

/// Whether `word` and `root` share a prefix in either direction
pub fn matches_root(word: &str, root: &str) -> bool {
    if word.starts_with(root) {
        return true;
    }
    word.chars().count() >= MIN_PARTIAL_WORD_LEN && root.starts_with(word)
}

#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    word_pattern: Regex,
    config: CategoryConfig,
}

impl CategoryClassifier {
    pub fn new(config: CategoryConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            word_pattern: Regex::new(r"\p{L}+")?,
            config,
        })
    }

    pub fn with_defaults() -> Result<Self, regex::Error> {
        Self::new(CategoryConfig::default())
    }

    pub fn default_label(&self) -> &str {
        &self.config.default_label
    }

    /// Lowercased letter runs of `text`
    pub fn words(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        self.word_pattern
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Label of the first category with a root matching any word of `note`
    pub fn classify(&self, note: &str) -> String {
        let words = self.words(note);
        self.config
            .categories
            .iter()
            .find(|rule| {
                words
                    .iter()
                    .any(|word| rule.roots.iter().any(|root| matches_root(word, root)))
            })
            .map(|rule| rule.label.clone())
            .unwrap_or_else(|| self.config.default_label.clone())
    }
}
