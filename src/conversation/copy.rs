//! Static reply copy

use rand::seq::SliceRandom;

pub const ABOUT_TEXT: &str = "🤖 **Привет, я Квантовый Квест!**\n\n\
    Я — твой верный помощник в мире сложных задач и головоломок! 🚀\n\n\
    Просто брось мне текст или фото, и я сделаю все возможное, чтобы найти ответ! 🔍\n\n\
    Хочешь узнать больше о моих возможностях? Жми кнопки внизу! 😉";

pub const SUPPORT_TEXT: &str = "🆘 **Нужна помощь? Не беда!**\n\n\
    Если что-то пошло не так или у тебя есть идеи, как я могу стать лучше, пиши сюда: xcommander67@gmail.com.\n\n\
    Или просто нажми /start, чтобы вернуться в главное меню! ✨";

pub const PHOTO_REQUEST_TEXT: &str = "📸 Отправь фото с текстом, и я помогу распознать его!";

pub const ONBOARDING_PROMPT: &str = "🌟 Приветствую, искатель знаний! 🌟\n\n\
    Я — Квантовый Квест, бот, который поможет тебе найти ответы на самые сложные вопросы! 📚\n\n\
    Как я могу к тебе обращаться? ✨";

pub const EMPTY_NAME_PROMPT: &str = "✍️ Напиши, пожалуйста, как к тебе обращаться.";

pub const LANGUAGE_PROMPT: &str = "Выберите язык (en, ru):";

pub const INVALID_LANGUAGE: &str = "Неверный язык. Пожалуйста, выберите 'en' или 'ru'.";

pub const EMPTY_TASK: &str = "✍️ Эй! А где же текст задачи? Напишите мне что-нибудь! 😉";

pub const VIDEO_UNSUPPORTED: &str =
    "Извините, я пока не умею обрабатывать видео. Попробуйте отправить фотографию! 📸";

pub const GREETINGS: &[&str] = &[
    "Приветствую, искатель знаний! 🌟",
    "Здравствуй, мой друг! Готов к новым открытиям? 🚀",
    "Привет! Что привело тебя в мой квантовый мир? ✨",
    "И снова здравствуйте! Чем могу помочь сегодня? 😉",
];

pub const PROCESSING_MESSAGES: &[&str] = &[
    "⏳ Запускаю свои квантовые процессоры... Щас подумаем! 🧠",
    "🤔 Хм... Дайте-ка подумать... 💡",
    "🧐 Сейчас посмотрим, что тут у нас... 🔍",
    "⚙️ Шестеренки крутятся, алгоритмы работают... 🤖",
];

pub const OCR_ERROR_MESSAGES: &[&str] = &[
    "😞 Увы, не смог разобрать текст на картинке! Может, попробуем еще раз? 🖼️",
    "😕 Что-то не получается с OCR... Попробуйте другое фото! 📸",
    "😔 Не могу прочитать этот текст... Может, он написан на другом языке? 🌐",
];

pub const NO_TEXT_MESSAGES: &[&str] = &[
    "🤔 Хм... Кажется, на фото нет текста! 🤷‍♂️",
    "🧐 Не вижу здесь никакого текста... Может, попробуем что-то другое? 🖼️",
    "🙄 Где же текст? Может, он спрятался? 🙈",
];

pub const API_ERROR_MESSAGES: &[&str] = &[
    "🔌 Ой-ой! Проблемы с подключением... Попробуйте еще раз! 😬",
    "🚫 Что-то не так с сетью... Сейчас починю! 🛠️",
    "🚧 Кажется, сервер немного занят... Попробуйте через минутку! ⏳",
];

pub const UNEXPECTED_ERROR_MESSAGES: &[&str] = &[
    "💥 Бабах! Что-то пошло не по плану... Я уже разбираюсь! 👨‍💻",
    "🤯 Ой, что-то сломалось! Но я уже на пути к восстановлению! 🚀",
    "😕 Упс! Произошла какая-то ошибка... Не волнуйтесь, я все исправлю! 😉",
];

/// Pick a random variant
#[must_use]
pub fn pick(variants: &[&'static str]) -> &'static str {
    variants.choose(&mut rand::thread_rng()).copied().unwrap_or_default()
}

#[must_use]
pub fn welcome_back(name: &str) -> String {
    format!("{}\nРад снова видеть тебя, {name}! 😉", pick(GREETINGS))
}

#[must_use]
pub fn nice_to_meet(name: &str) -> String {
    format!("Приятно познакомиться, {name}! Что будем делать сегодня? 😉")
}

#[must_use]
pub fn language_changed(code: &str) -> String {
    format!("Язык изменен на {code}!")
}
