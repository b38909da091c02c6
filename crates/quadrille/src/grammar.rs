//! Grammar types.

use crate::{types::Map, util::display_fn};
use std::fmt;

/// Display name of the end-of-input terminal.
pub const END_OF_INPUT: &str = "#";

/// Display name of the empty-string marker used in FIRST sets.
pub const EPSILON: &str = "ε";

/// Display name of the synthetic start symbol of an augmented grammar.
pub const SYNTHETIC_START: &str = "S'";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TerminalID {
    raw: u16,
}

impl TerminalID {
    /// Reserved terminal meaning the end of input; injected by `augment`.
    pub const EOI: Self = Self::new(0);

    /// Reserved marker for the empty string. It never occurs in any
    /// production or parse table, only inside FIRST sets.
    pub const EPSILON: Self = Self::new(1);

    const OFFSET: u16 = 2;

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    id: TerminalID,
    name: String,
}

impl Terminal {
    pub fn id(&self) -> TerminalID {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NonterminalID {
    raw: u16,
}

impl NonterminalID {
    /// Reserved synthetic start symbol; injected by `augment`.
    pub const START: Self = Self::new(0);

    const OFFSET: u16 = 1;

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nonterminal {
    id: NonterminalID,
    name: String,
}

impl Nonterminal {
    pub fn id(&self) -> NonterminalID {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Nonterminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolID {
    T(TerminalID),
    N(NonterminalID),
}

/// Identity of a production rule: its 0-based position in declaration
/// order. Reduce actions and semantic-action tables address rules by this
/// index, so it must stay stable across augmentation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct RuleID {
    raw: u16,
}

impl RuleID {
    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }

    pub fn index(self) -> usize {
        self.raw as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        u16::try_from(index).ok().map(Self::new)
    }
}

impl fmt::Display for RuleID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

/// The type that represents a production rule in grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    id: RuleID,
    left: NonterminalID,
    right: Vec<SymbolID>,
}

impl Rule {
    pub fn id(&self) -> RuleID {
        self.id
    }

    /// Return the left-hand side of this production.
    pub fn left(&self) -> NonterminalID {
        self.left
    }

    /// Return the right-hand side of this production; empty for an
    /// ε-production.
    pub fn right(&self) -> &[SymbolID] {
        &self.right[..]
    }

    // `"LHS := R1 R2 R3"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            write!(f, "{} :=", g.nonterminal_name(self.left).unwrap_or("?"))?;
            if self.right.is_empty() {
                write!(f, " {}", EPSILON)?;
            }
            for symbol in &self.right {
                write!(f, " {}", g.symbol_name(*symbol).unwrap_or("?"))?;
            }
            Ok(())
        })
    }
}

/// The grammar definition used to derive the parser tables. Immutable
/// once built; `augment` derives a fresh grammar rather than mutating.
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    terminals: Map<TerminalID, Terminal>,
    nonterminals: Map<NonterminalID, Nonterminal>,
    rules: Map<RuleID, Rule>,
    start: NonterminalID,
}

impl Grammar {
    /// Define a grammar using the specified function.
    pub fn define<F>(f: F) -> Result<Self, GrammarError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarError>,
    {
        let mut def = GrammarDef {
            terminals: Map::default(),
            nonterminals: Map::default(),
            rules: Map::default(),
            start: None,
            next_terminal_id: TerminalID::OFFSET,
            next_nonterminal_id: NonterminalID::OFFSET,
            next_rule_id: 0,
        };
        f(&mut def)?;
        def.end()
    }

    pub fn terminals(&self) -> impl Iterator<Item = (TerminalID, &Terminal)> + '_ {
        self.terminals.iter().map(|(id, t)| (*id, t))
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = (NonterminalID, &Nonterminal)> + '_ {
        self.nonterminals.iter().map(|(id, n)| (*id, n))
    }

    pub fn rules(&self) -> impl Iterator<Item = (RuleID, &Rule)> + '_ {
        self.rules.iter().map(|(id, rule)| (*id, rule))
    }

    pub fn rule(&self, id: RuleID) -> Option<&Rule> {
        self.rules.get(&id)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn start(&self) -> NonterminalID {
        self.start
    }

    pub fn terminal_name(&self, id: TerminalID) -> Option<&str> {
        match id {
            TerminalID::EPSILON => Some(EPSILON),
            id => self.terminals.get(&id).map(|t| t.name()),
        }
    }

    pub fn nonterminal_name(&self, id: NonterminalID) -> Option<&str> {
        self.nonterminals.get(&id).map(|n| n.name())
    }

    pub fn symbol_name(&self, id: SymbolID) -> Option<&str> {
        match id {
            SymbolID::T(t) => self.terminal_name(t),
            SymbolID::N(n) => self.nonterminal_name(n),
        }
    }

    pub fn terminal_id(&self, name: &str) -> Option<TerminalID> {
        self.terminals
            .values()
            .find(|t| t.name() == name)
            .map(|t| t.id())
    }

    pub fn nonterminal_id(&self, name: &str) -> Option<NonterminalID> {
        self.nonterminals
            .values()
            .find(|n| n.name() == name)
            .map(|n| n.id())
    }

    /// The synthetic `S' := start` rule, present only after `augment`.
    pub fn accept_rule(&self) -> Option<RuleID> {
        self.rules
            .values()
            .find(|rule| rule.left() == NonterminalID::START)
            .map(|rule| rule.id())
    }

    /// Derive the augmented grammar: the synthetic start symbol, the end
    /// marker and the appended rule `S' := start`. Everything is added as
    /// a union, so augmenting an augmented grammar changes nothing and the
    /// indices of the original rules are preserved.
    pub fn augment(&self) -> Grammar {
        let mut augmented = self.clone();
        augmented
            .terminals
            .entry(TerminalID::EOI)
            .or_insert_with(|| Terminal {
                id: TerminalID::EOI,
                name: END_OF_INPUT.to_owned(),
            });
        augmented
            .nonterminals
            .entry(NonterminalID::START)
            .or_insert_with(|| Nonterminal {
                id: NonterminalID::START,
                name: SYNTHETIC_START.to_owned(),
            });
        if augmented.accept_rule().is_none() {
            let id = RuleID::new(augmented.rules.len() as u16);
            augmented.rules.insert(
                id,
                Rule {
                    id,
                    left: NonterminalID::START,
                    right: vec![SymbolID::N(self.start)],
                },
            );
        }
        augmented
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## terminals:")?;
        for terminal in self.terminals.values() {
            writeln!(f, "{}", terminal)?;
        }

        writeln!(f, "\n## nonterminals:")?;
        for nonterminal in self.nonterminals.values() {
            write!(f, "{}", nonterminal)?;
            if nonterminal.id() == self.start {
                write!(f, " (start)")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## rules:")?;
        for rule in self.rules.values() {
            writeln!(f, "{}: {}", rule.id(), rule.display(self))?;
        }

        Ok(())
    }
}

/// The contextural values for building a `Grammar`.
#[derive(Debug)]
pub struct GrammarDef {
    terminals: Map<TerminalID, Terminal>,
    nonterminals: Map<NonterminalID, Nonterminal>,
    rules: Map<RuleID, Rule>,
    start: Option<NonterminalID>,
    next_terminal_id: u16,
    next_nonterminal_id: u16,
    next_rule_id: u16,
}

impl GrammarDef {
    /// Declare a terminal symbol used in this grammar.
    pub fn terminal(&mut self, name: &str) -> Result<TerminalID, GrammarError> {
        verify_symbol_name(name)?;
        if self.terminals.values().any(|t| t.name() == name) {
            return Err(GrammarError::DuplicateTerminal(name.to_owned()));
        }

        let id = TerminalID::new(self.next_terminal_id);
        self.next_terminal_id += 1;
        self.terminals.insert(
            id,
            Terminal {
                id,
                name: name.to_owned(),
            },
        );
        Ok(id)
    }

    /// Declare a nonterminal symbol used in this grammar.
    pub fn nonterminal(&mut self, name: &str) -> Result<NonterminalID, GrammarError> {
        verify_symbol_name(name)?;
        if self.nonterminals.values().any(|n| n.name() == name) {
            return Err(GrammarError::DuplicateNonterminal(name.to_owned()));
        }

        let id = NonterminalID::new(self.next_nonterminal_id);
        self.next_nonterminal_id += 1;
        self.nonterminals.insert(
            id,
            Nonterminal {
                id,
                name: name.to_owned(),
            },
        );
        Ok(id)
    }

    /// Specify a production rule into this grammar. The returned `RuleID`
    /// is the production's position in declaration order.
    pub fn rule<I>(&mut self, left: NonterminalID, right: I) -> Result<RuleID, GrammarError>
    where
        I: IntoIterator<Item = SymbolID>,
    {
        if !self.nonterminals.contains_key(&left) {
            return Err(GrammarError::UnknownSymbol);
        }
        let right: Vec<SymbolID> = right.into_iter().collect();
        for symbol in &right {
            let known = match symbol {
                SymbolID::T(t) => self.terminals.contains_key(t),
                SymbolID::N(n) => self.nonterminals.contains_key(n),
            };
            if !known {
                return Err(GrammarError::UnknownSymbol);
            }
        }
        if self
            .rules
            .values()
            .any(|rule| rule.left == left && rule.right == right)
        {
            return Err(GrammarError::DuplicateRule);
        }

        let id = RuleID::new(self.next_rule_id);
        self.next_rule_id += 1;
        self.rules.insert(id, Rule { id, left, right });
        Ok(id)
    }

    /// Specify the start symbol for this grammar.
    pub fn start_symbol(&mut self, symbol: NonterminalID) -> Result<(), GrammarError> {
        if !self.nonterminals.contains_key(&symbol) {
            return Err(GrammarError::UnknownSymbol);
        }
        self.start.replace(symbol);
        Ok(())
    }

    fn end(mut self) -> Result<Grammar, GrammarError> {
        // Fall back to the first declared nonterminal when no start symbol
        // was specified.
        let start = match self.start.take() {
            Some(start) => start,
            None => self
                .nonterminals
                .keys()
                .next()
                .copied()
                .ok_or(GrammarError::MissingStart)?,
        };

        Ok(Grammar {
            terminals: self.terminals,
            nonterminals: self.nonterminals,
            rules: self.rules,
            start,
        })
    }
}

fn verify_symbol_name(name: &str) -> Result<(), GrammarError> {
    if name.is_empty() {
        return Err(GrammarError::EmptyName);
    }
    if matches!(name, END_OF_INPUT | EPSILON | SYNTHETIC_START) {
        return Err(GrammarError::ReservedName(name.to_owned()));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("malformed grammar: symbol name may not be empty")]
    EmptyName,

    #[error("malformed grammar: `{0}` is a reserved symbol name")]
    ReservedName(String),

    #[error("malformed grammar: the terminal `{0}` has already been declared")]
    DuplicateTerminal(String),

    #[error("malformed grammar: the nonterminal `{0}` has already been declared")]
    DuplicateNonterminal(String),

    #[error("malformed grammar: duplicate production rule detected")]
    DuplicateRule,

    #[error("malformed grammar: production references an undeclared symbol")]
    UnknownSymbol,

    #[error("malformed grammar: no nonterminal to use as the start symbol")]
    MissingStart,
}
