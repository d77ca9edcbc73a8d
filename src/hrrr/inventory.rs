use crate::error::{GnomyError, Result};
use crate::hrrr::variables::GribVariable;

/// One line of a `.grib2.idx` sidecar:
/// `6:938144:d=2022010100:DPT:2 m above ground:anl:`
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryEntry {
    pub message: u32,
    pub start: u64,
    /// Byte offset of the next message; None for the last entry.
    pub end: Option<u64>,
    pub variable: String,
    pub level: String,
    raw: String,
}

impl InventoryEntry {
    fn parse(line: &str) -> Result<Self> {
        let mut parts = line.splitn(6, ':');
        let message = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| GnomyError::Inventory(format!("bad message number in '{}'", line)))?;
        let start = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| GnomyError::Inventory(format!("bad byte offset in '{}'", line)))?;
        let _cycle = parts
            .next()
            .ok_or_else(|| GnomyError::Inventory(format!("missing cycle in '{}'", line)))?;
        let variable = parts
            .next()
            .ok_or_else(|| GnomyError::Inventory(format!("missing variable in '{}'", line)))?
            .to_string();
        let level = parts
            .next()
            .ok_or_else(|| GnomyError::Inventory(format!("missing level in '{}'", line)))?
            .to_string();

        Ok(Self {
            message,
            start,
            end: None,
            variable,
            level,
            raw: line.to_string(),
        })
    }

    pub fn matches(&self, search: &str) -> bool {
        self.raw.contains(search)
    }

    /// HTTP Range header selecting this message's bytes.
    pub fn range_header(&self) -> String {
        match self.end {
            Some(end) => format!("bytes={}-{}", self.start, end.saturating_sub(1)),
            None => format!("bytes={}-", self.start),
        }
    }
}

/// A parsed `.idx` sidecar; entry byte ranges are closed by the following
/// entry's offset.
#[derive(Debug, Clone)]
pub struct Inventory {
    entries: Vec<InventoryEntry>,
}

impl Inventory {
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            entries.push(InventoryEntry::parse(line)?);
        }
        if entries.is_empty() {
            return Err(GnomyError::Inventory("empty index file".to_string()));
        }

        for i in 0..entries.len() - 1 {
            let next_start = entries[i + 1].start;
            entries[i].end = Some(next_start);
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry whose line contains the search needle.
    pub fn find(&self, search: &str) -> Option<&InventoryEntry> {
        self.entries.iter().find(|e| e.matches(search))
    }

    /// Pair each variable with its inventory entry; variables absent from
    /// this file are simply skipped.
    pub fn select<'a>(
        &'a self,
        variables: &'a [GribVariable],
    ) -> Vec<(&'a GribVariable, &'a InventoryEntry)> {
        variables
            .iter()
            .filter_map(|v| self.find(v.search).map(|e| (v, e)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
1:0:d=2022010100:REFC:entire atmosphere:anl:
2:375155:d=2022010100:TMP:2 m above ground:anl:
3:565892:d=2022010100:DPT:2 m above ground:anl:
4:781326:d=2022010100:TMP:surface:anl:
";

    #[test]
    fn test_parse_assigns_byte_ranges() {
        let inv = Inventory::parse(SAMPLE).unwrap();
        assert_eq!(inv.len(), 4);

        let t2m = inv.find(":TMP:2 m above ground:anl").unwrap();
        assert_eq!(t2m.message, 2);
        assert_eq!(t2m.start, 375155);
        assert_eq!(t2m.end, Some(565892));
        assert_eq!(t2m.range_header(), "bytes=375155-565891");

        let last = inv.find(":TMP:surface:anl").unwrap();
        assert_eq!(last.end, None);
        assert_eq!(last.range_header(), "bytes=781326-");
    }

    #[test]
    fn test_level_disambiguates_variables() {
        let inv = Inventory::parse(SAMPLE).unwrap();
        // the 2 m and surface TMP lines must resolve to different messages
        let m2 = inv.find(":TMP:2 m above ground:anl").unwrap();
        let sfc = inv.find(":TMP:surface:anl").unwrap();
        assert_ne!(m2.message, sfc.message);
    }

    #[test]
    fn test_select_skips_missing_variables() {
        let inv = Inventory::parse(SAMPLE).unwrap();
        let vars = [
            GribVariable {
                short_name: "t2m",
                search: ":TMP:2 m above ground:anl",
            },
            GribVariable {
                short_name: "sde",
                search: ":SNOD:surface:anl",
            },
        ];
        let selected = inv.select(&vars);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].0.short_name, "t2m");
    }

    #[test]
    fn test_garbage_line_is_an_error() {
        assert!(Inventory::parse("not an index line").is_err());
        assert!(Inventory::parse("").is_err());
    }
}
