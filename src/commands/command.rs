//! Recognition of menu buttons and slash-style commands in inbound text.

/// Menu button captions, shown in the welcome message
pub const MENU_REMIND: &str = "📝 Напомни мне";
pub const MENU_ADD_CATEGORY: &str = "➕ Добавить категорию";
pub const MENU_LIST: &str = "📋 Список";
pub const MENU_REPEAT_ON: &str = "🔁 Повтор включён";
pub const MENU_REPEAT_OFF: &str = "🔁 Повтор выключен";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// Start a new reminder dialogue
    Remind,
    /// Ask for a category name
    AddCategory,
    List,
    RepeatOn,
    RepeatOff,
    /// `/category <name>`
    SetCategory(String),
    /// `/category auto`
    ClearCategory,
    /// Anything else: a note, a time reply or a category name
    Text(String),
}

impl Command {
    pub fn parse(input: &str) -> Command {
        let text = input.trim();
        let lower = text.to_lowercase();

        match lower.as_str() {
            "/start" | "привет" | "hi" | "hello" => return Command::Start,
            "/help" | "помощь" => return Command::Help,
            "/remind" => return Command::Remind,
            "/list" | "/reminders" => return Command::List,
            "/addcategory" | "/category" => return Command::AddCategory,
            "/repeat on" => return Command::RepeatOn,
            "/repeat off" => return Command::RepeatOff,
            _ => {}
        }

        // Both spellings of "включён" show up in menu captions
        match text {
            MENU_REMIND => return Command::Remind,
            MENU_ADD_CATEGORY => return Command::AddCategory,
            MENU_LIST => return Command::List,
            MENU_REPEAT_ON | "🔁 Повтор включен" => return Command::RepeatOn,
            MENU_REPEAT_OFF => return Command::RepeatOff,
            _ => {}
        }

        if let Some(rest) = lower.strip_prefix("/category ") {
            let name = text.get("/category ".len()..).unwrap_or_default().trim();
            if rest.trim() == "auto" || name.is_empty() {
                return Command::ClearCategory;
            }
            return Command::SetCategory(name.to_string());
        }

        Command::Text(text.to_string())
    }
}
