//! Chat colors and styled system messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The sixteen named text colors understood by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatColor {
    /// `black`
    Black,
    /// `dark_blue`
    DarkBlue,
    /// `dark_green`
    DarkGreen,
    /// `dark_aqua`
    DarkAqua,
    /// `dark_red`
    DarkRed,
    /// `dark_purple`
    DarkPurple,
    /// `gold`
    Gold,
    /// `gray`
    Gray,
    /// `dark_gray`
    DarkGray,
    /// `blue`
    Blue,
    /// `green`
    Green,
    /// `aqua`
    Aqua,
    /// `red`
    Red,
    /// `light_purple`
    LightPurple,
    /// `yellow`
    Yellow,
    /// `white`
    White,
}

/// Colors a glowing shiny can be assigned when random team colors are on.
///
/// Black is left out; it makes the glow outline unreadable at night.
pub const TEAM_PALETTE: [ChatColor; 15] = [
    ChatColor::DarkBlue,
    ChatColor::DarkGreen,
    ChatColor::DarkAqua,
    ChatColor::DarkRed,
    ChatColor::DarkPurple,
    ChatColor::Gold,
    ChatColor::Gray,
    ChatColor::DarkGray,
    ChatColor::Blue,
    ChatColor::Green,
    ChatColor::Aqua,
    ChatColor::Red,
    ChatColor::LightPurple,
    ChatColor::Yellow,
    ChatColor::White,
];

impl ChatColor {
    /// Every named color, in protocol order.
    pub const ALL: [ChatColor; 16] = [
        ChatColor::Black,
        ChatColor::DarkBlue,
        ChatColor::DarkGreen,
        ChatColor::DarkAqua,
        ChatColor::DarkRed,
        ChatColor::DarkPurple,
        ChatColor::Gold,
        ChatColor::Gray,
        ChatColor::DarkGray,
        ChatColor::Blue,
        ChatColor::Green,
        ChatColor::Aqua,
        ChatColor::Red,
        ChatColor::LightPurple,
        ChatColor::Yellow,
        ChatColor::White,
    ];

    /// Lowercase snake_case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            ChatColor::Black => "black",
            ChatColor::DarkBlue => "dark_blue",
            ChatColor::DarkGreen => "dark_green",
            ChatColor::DarkAqua => "dark_aqua",
            ChatColor::DarkRed => "dark_red",
            ChatColor::DarkPurple => "dark_purple",
            ChatColor::Gold => "gold",
            ChatColor::Gray => "gray",
            ChatColor::DarkGray => "dark_gray",
            ChatColor::Blue => "blue",
            ChatColor::Green => "green",
            ChatColor::Aqua => "aqua",
            ChatColor::Red => "red",
            ChatColor::LightPurple => "light_purple",
            ChatColor::Yellow => "yellow",
            ChatColor::White => "white",
        }
    }

    /// Parse a color name (case-insensitive).
    pub fn parse(input: &str) -> Option<Self> {
        let key = input.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|color| color.as_str() == key)
    }
}

impl fmt::Display for ChatColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A styled single-line system message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message text.
    pub text: String,
    /// Text color.
    pub color: ChatColor,
    /// Bold styling.
    pub bold: bool,
}

impl ChatMessage {
    /// Plain colored message.
    pub fn new(text: impl Into<String>, color: ChatColor) -> Self {
        Self {
            text: text.into(),
            color,
            bold: false,
        }
    }

    /// Make the message bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(ChatColor::parse("DARK_GREEN"), Some(ChatColor::DarkGreen));
        assert_eq!(ChatColor::parse(" gold "), Some(ChatColor::Gold));
        assert_eq!(ChatColor::parse("Light_Purple"), Some(ChatColor::LightPurple));
        assert_eq!(ChatColor::parse("bold"), None);
        assert_eq!(ChatColor::parse(""), None);
    }

    #[test]
    fn palette_excludes_black() {
        assert_eq!(TEAM_PALETTE.len(), 15);
        assert!(!TEAM_PALETTE.contains(&ChatColor::Black));
    }

    #[test]
    fn bold_builder() {
        let msg = ChatMessage::new("hi", ChatColor::Gold).bold();
        assert!(msg.bold);
        assert_eq!(msg.to_string(), "hi");
    }
}
