use bimap::BiBTreeMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::encode;
use crate::error::Error;

/// One label-map record, the YAML exchange format between the two tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDef {
    pub name: String,
    pub addr: u32,
}

/// Two-way name <-> address map.
///
/// Names are unique; addresses are not. When a second name lands on an
/// already-mapped address, the earlier name moves to `aliases` and keeps
/// resolving, while the later one wins the reverse lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolTable {
    map: BiBTreeMap<String, u32>,
    aliases: BTreeMap<String, u32>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            map: BiBTreeMap::new(),
            aliases: BTreeMap::new(),
        }
    }

    pub fn define(&mut self, name: &str, addr: u32) -> Result<(), Error> {
        if self.map.contains_left(name) || self.aliases.contains_key(name) {
            return Err(Error::DuplicateLabel(name.to_string()));
        }
        if let Some(prev) = self.map.get_by_right(&addr).cloned() {
            self.map.remove_by_left(&prev);
            self.aliases.insert(prev, addr);
        }
        self.map.insert(name.to_string(), addr);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<u32> {
        self.map
            .get_by_left(name)
            .or_else(|| self.aliases.get(name))
            .copied()
    }

    pub fn reverse_lookup(&self, addr: u32) -> Option<&str> {
        self.map.get_by_right(&addr).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len() + self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty() && self.aliases.is_empty()
    }

    /// All definitions, ordered by address then name.
    pub fn defs(&self) -> Vec<LabelDef> {
        let mut defs: Vec<LabelDef> = self
            .map
            .iter()
            .map(|(name, addr)| LabelDef {
                name: name.clone(),
                addr: *addr,
            })
            .chain(self.aliases.iter().map(|(name, addr)| LabelDef {
                name: name.clone(),
                addr: *addr,
            }))
            .collect();
        defs.sort_by(|a, b| (a.addr, &a.name).cmp(&(b.addr, &b.name)));
        defs
    }

    pub fn from_defs(defs: &[LabelDef]) -> Result<Self, Error> {
        let mut table = Self::new();
        for def in defs {
            table.define(&def.name, def.addr)?;
        }
        Ok(table)
    }

    /// Pass 1: walk the source once, assigning each label the address of
    /// the next emitted word. Errors carry the 1-based source line.
    pub fn scan(src: &str, base: u32) -> Result<Self, (usize, Error)> {
        let mut table = Self::new();
        let mut pc = base;
        for (idx, raw) in src.lines().enumerate() {
            if let Some(name) = encode::label_def(raw) {
                table.define(name, pc).map_err(|e| (idx + 1, e))?;
            } else {
                pc = pc.wrapping_add(4 * encode::line_width(raw));
            }
        }
        Ok(table)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
