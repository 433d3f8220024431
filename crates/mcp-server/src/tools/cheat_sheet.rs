/// Markdown quick reference for the D2 language, compiled into the binary.
pub(crate) const CHEAT_SHEET: &str = include_str!("../../assets/CHEATSHEET.md");
