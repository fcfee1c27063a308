use std::collections::HashMap;
use std::fmt;

/// Error returned by [`FontSystem::load_font`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// Opaque handle to a font loaded into a [`FontSystem`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub(crate) usize);

/// Fonts registered under face names.
///
/// Text runs name a face ("Helvetica"); lookups are case-insensitive and
/// fall back to the first font loaded, so a missing face still renders.
#[derive(Default)]
pub struct FontSystem {
    fonts: Vec<fontdue::Font>,
    names: HashMap<String, FontId>,
}

impl FontSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a TrueType/OpenType font and registers it under `name`.
    ///
    /// Re-registering a name points it at the new font.
    pub fn load_font(&mut self, name: &str, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        self.names.insert(name.to_ascii_lowercase(), id);
        Ok(id)
    }

    /// Registers another name for an already loaded font.
    pub fn alias(&mut self, name: &str, id: FontId) {
        if id.0 < self.fonts.len() {
            self.names.insert(name.to_ascii_lowercase(), id);
        }
    }

    /// Resolves a face name, falling back to the first loaded font.
    pub fn resolve(&self, name: &str) -> Option<FontId> {
        self.names
            .get(&name.to_ascii_lowercase())
            .copied()
            .or_else(|| (!self.fonts.is_empty()).then_some(FontId(0)))
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub(crate) fn get(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_system_resolves_nothing() {
        let fs = FontSystem::new();
        assert!(fs.resolve("Helvetica").is_none());
        assert!(fs.is_empty());
    }

    #[test]
    fn garbage_bytes_fail_to_load() {
        let mut fs = FontSystem::new();
        assert!(fs.load_font("broken", b"not a font").is_err());
        assert!(fs.is_empty());
    }

    #[test]
    fn alias_ignores_unknown_ids() {
        let mut fs = FontSystem::new();
        fs.alias("Helvetica", FontId(3));
        assert!(fs.resolve("helvetica").is_none());
    }
}
