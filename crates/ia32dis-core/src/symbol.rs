//! Symbols and address-to-label resolution.

use std::collections::BTreeMap;

/// Maps addresses to human readable labels when rendering branch targets.
pub trait SymbolResolver {
    /// Returns the label for an address, if one is known.
    fn lookup(&self, address: u64) -> Option<String>;

    /// Returns the textual form of an address: `0x1000 <main>` or `0x1000`.
    fn describe(&self, address: u64) -> String {
        match self.lookup(address) {
            Some(label) => format!("{:#x} <{}>", address, label),
            None => format!("{:#x}", address),
        }
    }
}

/// A resolver that knows no symbols.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSymbols;

impl SymbolResolver for NoSymbols {
    fn lookup(&self, _address: u64) -> Option<String> {
        None
    }
}

impl<F> SymbolResolver for F
where
    F: Fn(u64) -> Option<String>,
{
    fn lookup(&self, address: u64) -> Option<String> {
        self(address)
    }
}

/// A named code or data symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Symbol {
    /// Symbol name.
    pub name: String,
    /// Start address.
    pub address: u64,
    /// Size in bytes (0 if unknown).
    pub size: u64,
}

impl Symbol {
    /// Creates a new symbol.
    pub fn new(name: impl Into<String>, address: u64, size: u64) -> Self {
        Self {
            name: name.into(),
            address,
            size,
        }
    }

    /// Returns true if `address` falls inside this symbol.
    ///
    /// A symbol of unknown size only contains its own start address.
    pub fn contains(&self, address: u64) -> bool {
        if self.size == 0 {
            address == self.address
        } else {
            address >= self.address && address - self.address < self.size
        }
    }
}

/// Address-ordered symbol table.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: BTreeMap<u64, Symbol>,
}

impl SymbolTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a symbol, replacing any symbol at the same address.
    pub fn insert(&mut self, symbol: Symbol) {
        self.symbols.insert(symbol.address, symbol);
    }

    /// Returns the symbol containing `address`, if any.
    pub fn containing(&self, address: u64) -> Option<&Symbol> {
        self.symbols
            .range(..=address)
            .next_back()
            .map(|(_, sym)| sym)
            .filter(|sym| sym.contains(address))
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterates symbols in address order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }
}

impl FromIterator<Symbol> for SymbolTable {
    fn from_iter<T: IntoIterator<Item = Symbol>>(iter: T) -> Self {
        let mut table = Self::new();
        for sym in iter {
            table.insert(sym);
        }
        table
    }
}

impl SymbolResolver for SymbolTable {
    fn lookup(&self, address: u64) -> Option<String> {
        let sym = self.containing(address)?;
        let offset = address - sym.address;
        if offset == 0 {
            Some(sym.name.clone())
        } else {
            Some(format!("{}+{:#x}", sym.name, offset))
        }
    }
}
