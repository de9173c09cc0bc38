/// Closed set of icon identifiers referenced by the catalog and the shell.
/// Unknown keys resolve to [`IconKey::HelpCircle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IconKey {
    Code,
    PenTool,
    Image,
    Briefcase,
    GraduationCap,
    Gamepad2,
    Sparkles,
    Zap,
    UserCheck,
    Search,
    Wand2,
    Download,
    Copy,
    Bot,
    Cpu,
    HelpCircle,
}

const ICON_TABLE: &[(&str, IconKey, &str)] = &[
    ("Code", IconKey::Code, "</>"),
    ("PenTool", IconKey::PenTool, "✎"),
    ("Image", IconKey::Image, "▣"),
    ("Briefcase", IconKey::Briefcase, "▤"),
    ("GraduationCap", IconKey::GraduationCap, "◭"),
    ("Gamepad2", IconKey::Gamepad2, "◈"),
    ("Sparkles", IconKey::Sparkles, "✦"),
    ("Zap", IconKey::Zap, "ϟ"),
    ("UserCheck", IconKey::UserCheck, "☺"),
    ("Search", IconKey::Search, "⌕"),
    ("Wand2", IconKey::Wand2, "⚝"),
    ("Download", IconKey::Download, "↓"),
    ("Copy", IconKey::Copy, "⧉"),
    ("Bot", IconKey::Bot, "◉"),
    ("Cpu", IconKey::Cpu, "▦"),
    ("HelpCircle", IconKey::HelpCircle, "?"),
];

impl IconKey {
    pub fn from_key(key: &str) -> IconKey {
        ICON_TABLE
            .iter()
            .find(|(name, _, _)| *name == key)
            .map(|(_, icon, _)| *icon)
            .unwrap_or(IconKey::HelpCircle)
    }

    pub fn key(self) -> &'static str {
        self.entry().0
    }

    /// Single-cell terminal rendering of the icon.
    pub fn glyph(self) -> &'static str {
        self.entry().2
    }

    fn entry(self) -> &'static (&'static str, IconKey, &'static str) {
        ICON_TABLE
            .iter()
            .find(|(_, icon, _)| *icon == self)
            .unwrap_or(&ICON_TABLE[ICON_TABLE.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::IconKey;
    use crate::catalog::{categories, TOOLS};

    #[test]
    fn unknown_key_falls_back_to_help_circle() {
        assert_eq!(IconKey::from_key("SwissFranc"), IconKey::HelpCircle);
        assert_eq!(IconKey::from_key(""), IconKey::HelpCircle);
        assert_eq!(IconKey::from_key("code"), IconKey::HelpCircle);
        assert_eq!(IconKey::HelpCircle.glyph(), "?");
    }

    #[test]
    fn catalog_icons_are_all_known() {
        for category in categories() {
            let icon = IconKey::from_key(&category.icon);
            assert_ne!(icon, IconKey::HelpCircle, "category {}", category.id);
            assert_eq!(icon.key(), category.icon);
        }
        for tool in TOOLS {
            assert_ne!(IconKey::from_key(tool.icon), IconKey::HelpCircle);
        }
    }
}
