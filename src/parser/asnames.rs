use crate::error::OriginAsError;
use crate::io::{get_reader, read_line};
use crate::models::Asn;
use log::{debug, info};
use std::collections::HashMap;
use std::io::{self, BufRead};

/// Display names of AS numbers, loaded from a text file with one `<asn> <name>` entry per line.
///
/// The separator is the first tab on the line, or the first space if there is no tab. Lines
/// starting with `#` are comments. When an AS number appears more than once the first entry is
/// kept.
#[derive(Debug, Default, Clone)]
pub struct AsNameDirectory {
    names: HashMap<Asn, String>,
}

impl AsNameDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a directory file. Failing to open it is an error; malformed lines are skipped.
    pub fn load(path: &str) -> Result<Self, OriginAsError> {
        let mut reader = get_reader(path)?;
        let directory =
            Self::from_reader(&mut reader).map_err(|e| OriginAsError::read_failed(path, e))?;
        info!("loaded {} AS names from {}", directory.len(), path);
        Ok(directory)
    }

    pub fn from_reader<R: BufRead>(mut reader: R) -> io::Result<Self> {
        let mut directory = AsNameDirectory::new();
        let mut buf = vec![];
        let mut line_no = 0;
        while read_line(&mut reader, &mut buf)? {
            line_no += 1;
            let line = String::from_utf8_lossy(&buf);
            match parse_entry(&line) {
                Some((asn, name)) => {
                    if !directory.insert(asn, name) {
                        debug!("AS{} already named, ignoring line {}", asn, line_no);
                    }
                }
                None => debug!("skipping AS name line {}: {:?}", line_no, line.trim_end()),
            }
        }
        Ok(directory)
    }

    /// Add a name unless the AS already has one. Returns whether the name was stored.
    pub fn insert(&mut self, asn: Asn, name: &str) -> bool {
        match self.names.contains_key(&asn) {
            true => false,
            false => {
                self.names.insert(asn, name.to_string());
                true
            }
        }
    }

    pub fn get(&self, asn: Asn) -> Option<&str> {
        self.names.get(&asn).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn parse_entry(line: &str) -> Option<(Asn, &str)> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (asn, name) = match line.split_once('\t') {
        Some((asn, name)) => (asn, name),
        None => {
            let (asn, name) = line.split_once(' ')?;
            (asn, name.trim_start())
        }
    };
    Some((Asn::parse_token(asn.trim())?, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_entry() {
        assert_eq!(
            parse_entry("13335\tCLOUDFLARENET - Cloudflare, Inc., US\n"),
            Some((Asn::new(13335), "CLOUDFLARENET - Cloudflare, Inc., US"))
        );
        assert_eq!(
            parse_entry("65001   Example Net\r\n"),
            Some((Asn::new(65001), "Example Net"))
        );
        assert_eq!(
            parse_entry("1.10\tDotted"),
            Some((Asn::new(65546), "Dotted"))
        );
        assert_eq!(parse_entry("# comment\tline"), None);
        assert_eq!(parse_entry("noseparator"), None);
        assert_eq!(parse_entry("AS65001 named"), None);
        assert_eq!(parse_entry("\n"), None);
    }

    #[test]
    fn test_first_entry_wins() {
        let text = "# asn names\n65001\tFirst\n65001\tSecond\n65002 Other Net\nbogus line\n";
        let directory = AsNameDirectory::from_reader(Cursor::new(text)).unwrap();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.get(Asn::new(65001)), Some("First"));
        assert_eq!(directory.get(Asn::new(65002)), Some("Other Net"));
        assert_eq!(directory.get(Asn::new(65003)), None);
    }

    #[test]
    fn test_insert_reports_shadowed_name() {
        let mut directory = AsNameDirectory::new();
        assert!(directory.insert(Asn::new(65001), "First"));
        assert!(!directory.insert(Asn::new(65001), "Second"));
        assert_eq!(directory.get(Asn::new(65001)), Some("First"));
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AsNameDirectory::load("/nonexistent/asn.txt").unwrap_err();
        assert!(matches!(err, OriginAsError::OpenFailed { .. }));
    }
}
