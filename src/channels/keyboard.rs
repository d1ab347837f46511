//! Fixed reply keyboard shown under the chat input

/// A button of the main reply keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuButton {
    /// Ask for a photo to recognize
    RecognizePhoto,
    /// About the bot
    About,
    /// Support contacts
    Support,
    /// Start the language-change flow
    ChangeLanguage,
}

impl MenuButton {
    /// Every button, in layout order
    pub const ALL: [Self; 4] = [
        Self::RecognizePhoto,
        Self::About,
        Self::Support,
        Self::ChangeLanguage,
    ];

    /// Caption the transport shows and echoes back when pressed
    #[must_use]
    pub const fn caption(self) -> &'static str {
        match self {
            Self::RecognizePhoto => "🖼 Распознать текст с фото",
            Self::About => "ℹ️ Кто ты, бот?",
            Self::Support => "🆘 SOS! Нужна помощь!",
            Self::ChangeLanguage => "🌐 Сменить язык",
        }
    }

    /// Match an incoming text against the captions exactly
    #[must_use]
    pub fn from_caption(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.caption() == text)
    }
}

/// Placeholder shown in the input field while the keyboard is visible
pub const INPUT_PLACEHOLDER: &str = "Выберите действие...";

/// Main keyboard layout: photo button alone, then the other three
#[must_use]
pub fn main_layout() -> Vec<Vec<MenuButton>> {
    vec![
        vec![MenuButton::RecognizePhoto],
        vec![
            MenuButton::About,
            MenuButton::Support,
            MenuButton::ChangeLanguage,
        ],
    ]
}

/// What to do with the reply keyboard when sending a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyboardAction {
    /// Show the main keyboard
    Main,
    /// Hide the keyboard
    Remove,
    /// Leave whatever the client currently shows
    #[default]
    Keep,
}
