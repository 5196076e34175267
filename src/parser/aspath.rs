use crate::models::AsPath;
use std::collections::HashMap;
use std::sync::Arc;

/// Canonical store of AS paths keyed by their exact text.
///
/// Every distinct text is parsed once; later requests for the same text get the same shared
/// [AsPath]. Dumps list consecutive prefixes with identical paths, so the most recent path is
/// checked before the map.
#[derive(Debug, Default)]
pub struct AsPathInterner {
    paths: HashMap<Box<str>, Arc<AsPath>>,
    last: Option<Arc<AsPath>>,
}

impl AsPathInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, text: &str) -> Arc<AsPath> {
        if let Some(last) = &self.last {
            if last.text() == text {
                return last.clone();
            }
        }

        let path = match self.paths.get(text) {
            Some(path) => path.clone(),
            None => {
                let path = Arc::new(AsPath::parse(text));
                self.paths.insert(text.into(), path.clone());
                path
            }
        };
        self.last = Some(path.clone());
        path
    }

    /// Number of distinct path texts seen.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_identical_text_is_shared() {
        let mut interner = AsPathInterner::new();
        let a = interner.intern("65001 65002");
        let b = interner.intern("65001 65002");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn test_intern_is_syntactic() {
        let mut interner = AsPathInterner::new();
        let a = interner.intern("65001 65002");
        let b = interner.intern("65001  65002");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.asns(), b.asns());
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn test_intern_after_other_path() {
        let mut interner = AsPathInterner::new();
        let a = interner.intern("174 3356");
        interner.intern("6939 13335");
        let c = interner.intern("174 3356");
        assert!(Arc::ptr_eq(&a, &c));
        assert_eq!(c.origin(), 3356);
    }
}
