use std::str::FromStr;

// Message-box texts the nest sends, matched exactly.
pub const PLACED_TEXT: &str = "You place your item in the nest.";
pub const VALUABLE_REJECTED_TEXT: &str =
    "That item is quite valuable. It's probably not a good idea to put it in a random nest.";
pub const RETRIEVED_UNCHANGED_TEXT: &str = "You retrieve your item from the nest.";
pub const RETRIEVED_REPLACED_TEXT: &str =
    "You go to retrieve your item from the nest, but find that it has been replaced with something else.";
/// Variant of the replaced message without "go to", classified the same way.
pub const RETRIEVED_REPLACED_ALT_TEXT: &str =
    "You retrieve your item from the nest, but find that it has been replaced with something else.";

/// Channel a chat message arrived on. Nest messages only ever arrive in the
/// message box, so everything else is ignored by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMessageKind {
    MessageBox,
    Game,
    Public,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub kind: ChatMessageKind,
    pub text: String,
}

impl ChatMessage {
    pub fn message_box(text: impl Into<String>) -> Self {
        Self {
            kind: ChatMessageKind::MessageBox,
            text: text.into(),
        }
    }

    pub fn new(kind: ChatMessageKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into() }
    }
}

/// Client connection state as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    LoginScreen,
    LoggingIn,
    Loading,
    LoggedIn,
    Hopping,
    ConnectionLost,
}

impl GameState {
    /// World hops and returning to the login screen end the session.
    pub fn is_session_boundary(self) -> bool {
        matches!(self, GameState::Hopping | GameState::LoginScreen)
    }
}

impl FromStr for GameState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "login" | "login-screen" | "login_screen" => Ok(GameState::LoginScreen),
            "logging-in" | "logging_in" => Ok(GameState::LoggingIn),
            "loading" => Ok(GameState::Loading),
            "logged-in" | "logged_in" => Ok(GameState::LoggedIn),
            "hopping" => Ok(GameState::Hopping),
            "connection-lost" | "connection_lost" => Ok(GameState::ConnectionLost),
            other => Err(format!("unknown game state '{}'", other)),
        }
    }
}

/// Nest-related outcome carried by a message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestEvent {
    Placed,
    ValuableRejected,
    RetrievedUnchanged,
    RetrievedReplaced,
}

impl NestEvent {
    /// Exact-match classification; any other text is not a nest event.
    pub fn classify(text: &str) -> Option<Self> {
        match text {
            PLACED_TEXT => Some(NestEvent::Placed),
            VALUABLE_REJECTED_TEXT => Some(NestEvent::ValuableRejected),
            RETRIEVED_UNCHANGED_TEXT => Some(NestEvent::RetrievedUnchanged),
            RETRIEVED_REPLACED_TEXT | RETRIEVED_REPLACED_ALT_TEXT => Some(NestEvent::RetrievedReplaced),
            _ => None,
        }
    }

    pub fn is_retrieval(self) -> bool {
        matches!(self, NestEvent::RetrievedUnchanged | NestEvent::RetrievedReplaced)
    }
}
