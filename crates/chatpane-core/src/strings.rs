//! Fixed user-facing strings, one table per locale.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    English,
    Chinese,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strings {
    pub greeting: &'static str,
    pub pending: &'static str,
    pub not_understood: &'static str,
    pub error: &'static str,
    pub input_placeholder: &'static str,
    pub send_label: &'static str,
    pub input_title: &'static str,
    pub waiting_title: &'static str,
    pub user_label: &'static str,
    pub assistant_label: &'static str,
}

static EN: Strings = Strings {
    greeting: "Hello! I'm your AI assistant. How can I help you today?",
    pending: "AI is thinking",
    not_understood: "Sorry, I didn't understand your question.",
    error: "Sorry, something went wrong. Please try again later.",
    input_placeholder: "Type a message...",
    send_label: "Send",
    input_title: "Message (Enter to send, Alt+Enter for newline)",
    waiting_title: "Waiting for reply...",
    user_label: "You:",
    assistant_label: "AI:",
};

static ZH: Strings = Strings {
    greeting: "您好！我是AI助手，有什么我可以帮您的吗？",
    pending: "AI正在思考中",
    not_understood: "抱歉，我没有理解您的问题。",
    error: "抱歉，出现了错误，请稍后再试。",
    input_placeholder: "输入消息...",
    send_label: "发送",
    input_title: "消息（Enter 发送，Alt+Enter 换行）",
    waiting_title: "等待回复中...",
    user_label: "你：",
    assistant_label: "AI：",
};

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::Chinese => "zh",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Some(Locale::English),
            "zh" | "zh-cn" | "chinese" => Some(Locale::Chinese),
            _ => None,
        }
    }

    pub fn all() -> Vec<Locale> {
        vec![Locale::English, Locale::Chinese]
    }

    pub fn strings(&self) -> &'static Strings {
        match self {
            Locale::English => &EN,
            Locale::Chinese => &ZH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_names_parse_back() {
        for locale in Locale::all() {
            assert_eq!(Locale::from_str(locale.as_str()), Some(locale));
        }
        assert_eq!(Locale::from_str("ZH-CN"), Some(Locale::Chinese));
        assert_eq!(Locale::from_str("fr"), None);
    }

    #[test]
    fn fallback_and_error_differ() {
        for locale in Locale::all() {
            let s = locale.strings();
            assert_ne!(s.not_understood, s.error);
            assert!(!s.greeting.is_empty());
        }
    }
}
