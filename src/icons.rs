//! Icon vocabulary and keyword-based icon inference for notes.
//!
//! Icons are a closed set. Stored or model-supplied keys that are not part of
//! the vocabulary resolve to [`IconKind::FileText`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! icon_kinds {
    ($($variant:ident => $glyph:literal),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum IconKind {
            $($variant,)*
        }

        impl IconKind {
            pub const ALL: &'static [IconKind] = &[$(IconKind::$variant,)*];

            /// Stable identifier, used on the wire and in storage.
            pub fn name(self) -> &'static str {
                match self {
                    $(IconKind::$variant => stringify!($variant),)*
                }
            }

            /// Terminal rendering of the icon.
            pub fn glyph(self) -> &'static str {
                match self {
                    $(IconKind::$variant => $glyph,)*
                }
            }
        }
    };
}

icon_kinds! {
    Briefcase => "💼",
    Building2 => "🏢",
    Users => "👥",
    FolderOpen => "📂",
    CheckSquare => "☑️",
    Calendar => "📅",
    Presentation => "📽️",
    FileText => "📄",
    DollarSign => "💲",
    TrendingUp => "📈",
    Lightbulb => "💡",
    Palette => "🎨",
    PenTool => "🖋️",
    Image => "🖼️",
    Music => "🎵",
    Pen => "🖊️",
    BookOpen => "📖",
    Feather => "🪶",
    Cpu => "🖥️",
    Code => "⌨️",
    Smartphone => "📱",
    Globe => "🌐",
    Database => "🗄️",
    Shield => "🛡️",
    Brain => "🧠",
    BarChart3 => "📊",
    User => "👤",
    Heart => "❤️",
    Activity => "🏃",
    Plane => "✈️",
    MapPin => "📍",
    Home => "🏠",
    Utensils => "🍴",
    ChefHat => "🧑‍🍳",
    ShoppingCart => "🛒",
    Book => "📕",
    Search => "🔍",
    GraduationCap => "🎓",
    Languages => "🈯",
    Calculator => "🧮",
    Microscope => "🔬",
    Clock => "🕰️",
    Target => "🎯",
    Map => "🗺️",
    Chess => "♟️",
    Eye => "👁️",
    Star => "⭐",
    Rocket => "🚀",
    Trophy => "🏆",
    Award => "🏅",
    AlertTriangle => "⚠️",
    CheckCircle => "✅",
    Bug => "🐛",
    Wrench => "🔧",
    Zap => "⚡",
    Mail => "✉️",
    Phone => "📞",
    MessageSquare => "💬",
    MessageCircle => "🗨️",
    Share2 => "🔗",
    Network => "🕸️",
}

impl IconKind {
    /// Case-insensitive lookup of a vocabulary name.
    pub fn from_name(name: &str) -> Option<IconKind> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Like [`IconKind::from_name`], but unknown keys map to the default icon.
    pub fn from_key(key: &str) -> IconKind {
        Self::from_name(key).unwrap_or_default()
    }

    pub fn is_default(self) -> bool {
        self == IconKind::default()
    }
}

impl Default for IconKind {
    fn default() -> Self {
        IconKind::FileText
    }
}

impl std::fmt::Display for IconKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for IconKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for IconKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(IconKind::from_key(&key))
    }
}

/// Keyword table scanned in order; the first keyword contained in the text wins.
pub const KEYWORD_ICONS: &[(&str, IconKind)] = &[
    // Work & business
    ("work", IconKind::Briefcase),
    ("business", IconKind::Building2),
    ("meeting", IconKind::Users),
    ("project", IconKind::FolderOpen),
    ("task", IconKind::CheckSquare),
    ("deadline", IconKind::Calendar),
    ("presentation", IconKind::Presentation),
    ("report", IconKind::FileText),
    ("budget", IconKind::DollarSign),
    ("finance", IconKind::TrendingUp),
    // Ideas & creativity
    ("idea", IconKind::Lightbulb),
    ("creative", IconKind::Palette),
    ("design", IconKind::PenTool),
    ("art", IconKind::Image),
    ("music", IconKind::Music),
    ("writing", IconKind::Pen),
    ("story", IconKind::BookOpen),
    ("poetry", IconKind::Feather),
    // Technology
    ("tech", IconKind::Cpu),
    ("code", IconKind::Code),
    ("app", IconKind::Smartphone),
    ("website", IconKind::Globe),
    ("database", IconKind::Database),
    ("security", IconKind::Shield),
    ("ai", IconKind::Brain),
    ("data", IconKind::BarChart3),
    // Personal & life
    ("personal", IconKind::User),
    ("family", IconKind::Users),
    ("health", IconKind::Heart),
    ("fitness", IconKind::Activity),
    ("travel", IconKind::Plane),
    ("vacation", IconKind::MapPin),
    ("home", IconKind::Home),
    ("food", IconKind::Utensils),
    ("recipe", IconKind::ChefHat),
    ("shopping", IconKind::ShoppingCart),
    // Learning & education
    ("study", IconKind::Book),
    ("research", IconKind::Search),
    ("course", IconKind::GraduationCap),
    ("language", IconKind::Languages),
    ("math", IconKind::Calculator),
    ("science", IconKind::Microscope),
    ("history", IconKind::Clock),
    ("philosophy", IconKind::Brain),
    // Goals & planning
    ("goal", IconKind::Target),
    ("plan", IconKind::Map),
    ("strategy", IconKind::Chess),
    ("vision", IconKind::Eye),
    ("dream", IconKind::Star),
    ("future", IconKind::Rocket),
    ("success", IconKind::Trophy),
    ("achievement", IconKind::Award),
    // Problems & solutions
    ("problem", IconKind::AlertTriangle),
    ("solution", IconKind::CheckCircle),
    ("bug", IconKind::Bug),
    ("fix", IconKind::Wrench),
    ("improvement", IconKind::TrendingUp),
    ("optimization", IconKind::Zap),
    // Communication
    ("email", IconKind::Mail),
    ("phone", IconKind::Phone),
    ("message", IconKind::MessageSquare),
    ("chat", IconKind::MessageCircle),
    ("social", IconKind::Share2),
    ("network", IconKind::Network),
    // Default
    ("default", IconKind::FileText),
];

/// Looser patterns tried after the keyword table.
const SECONDARY_PATTERNS: &[(&[&str], IconKind)] = &[
    (&["todo", "task"], IconKind::CheckSquare),
    (&["meeting", "call"], IconKind::Users),
    (&["idea", "thought"], IconKind::Lightbulb),
    (&["recipe", "cook"], IconKind::ChefHat),
    (&["travel", "trip"], IconKind::Plane),
    (&["work", "job"], IconKind::Briefcase),
    (&["study", "learn"], IconKind::Book),
    (&["goal", "target"], IconKind::Target),
    (&["problem", "issue"], IconKind::AlertTriangle),
    (&["code", "programming"], IconKind::Code),
];

/// Returns the icon for the first matching keyword or pattern, or `None` when
/// nothing in the text is recognised.
pub fn match_icon(content: &str) -> Option<IconKind> {
    let lower = content.to_lowercase();

    if let Some((_, icon)) = KEYWORD_ICONS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
    {
        return Some(*icon);
    }

    SECONDARY_PATTERNS
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, icon)| *icon)
}

/// Total version of [`match_icon`]: unrecognised text gets the default icon.
pub fn infer_icon(content: &str) -> IconKind {
    match_icon(content).unwrap_or_default()
}
