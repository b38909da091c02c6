//! Intermediate representation: symbol table, quadruples and the
//! backpatch lists threaded through the attributed-symbol stack.

use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum SemanticError {
    #[error("undeclared identifier `{0}`")]
    UndeclaredIdentifier(String),

    #[error("missing `{attribute}` attribute on `{symbol}`")]
    MissingAttribute {
        symbol: String,
        attribute: &'static str,
    },

    #[error("no symbol table entry at index {0}")]
    UnknownPlace(usize),

    #[error("quadruple index {0} out of range")]
    QuadOutOfRange(usize),

    #[error("broken backpatch chain at quadruple {0}")]
    BrokenChain(usize),
}

/// Storage type of a declared variable or temporary.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Ty {
    Int,
    Double,
}

impl Ty {
    /// Storage width in bytes.
    pub fn width(self) -> usize {
        match self {
            Ty::Int => 4,
            Ty::Double => 8,
        }
    }

    /// Single-letter suffix used in temporary names.
    fn suffix(self) -> char {
        match self {
            Ty::Int => 'i',
            Ty::Double => 'd',
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Int => f.write_str("int"),
            Ty::Double => f.write_str("double"),
        }
    }
}

/// Where a symbol-table entry lives.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Storage {
    /// A fixed offset from the activation record base.
    Slot(usize),

    /// A translation temporary; the target-code generator assigns its slot.
    Temp,
}

/// One symbol-table entry. Entries are appended during translation and
/// never removed; an entry's index is its identity (`place` attribute).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymEntry {
    pub name: String,
    pub ty: Ty,
    /// Literal text, for entries that hold a constant.
    pub value: Option<String>,
    pub storage: Storage,
}

impl SymEntry {
    pub fn is_temp(&self) -> bool {
        matches!(self.storage, Storage::Temp)
    }
}

/// The result field of a quadruple.
///
/// Beside naming an ordinary operand, the field doubles as a jump target
/// or as the "next" pointer of a pending backpatch list; keeping the roles
/// as distinct variants removes any ambiguity between a resolved target
/// and a chain link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultSlot {
    /// No result operand.
    None,

    /// An ordinary operand (assignment target, temporary name, ...).
    Name(String),

    /// A resolved jump target: the index of the destination quadruple.
    Target(usize),

    /// Link to the next quadruple of a pending backpatch list.
    Chain(usize),

    /// Terminator of a pending backpatch list; the target is not yet known.
    Unset,
}

impl fmt::Display for ResultSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultSlot::None => f.write_str("-"),
            ResultSlot::Name(name) => f.write_str(name),
            ResultSlot::Target(index) | ResultSlot::Chain(index) => {
                fmt::Display::fmt(index, f)
            }
            ResultSlot::Unset => f.write_str("null"),
        }
    }
}

/// One three-address instruction `(op, arg1, arg2, result)`.
///
/// `arg1`/`arg2` are operand names or literal text, `-` when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quadruple {
    pub op: String,
    pub arg1: String,
    pub arg2: String,
    pub result: ResultSlot,
}

impl fmt::Display for Quadruple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{},{})", self.op, self.arg1, self.arg2, self.result)
    }
}

/// Head of a pending backpatch list.
///
/// The list itself is threaded through the `result` fields of the listed
/// quadruples; an empty list has no head.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PatchList {
    head: Option<usize>,
}

impl PatchList {
    pub fn empty() -> Self {
        Self { head: None }
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn head(&self) -> Option<usize> {
        self.head
    }
}

/// The intermediate code produced by one parse: the owned symbol table
/// and the quadruple list.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Ir {
    pub symbols: Vec<SymEntry>,
    pub quads: Vec<Quadruple>,
}

impl Ir {
    /// Index of the next quadruple to be generated.
    pub fn next_quad(&self) -> usize {
        self.quads.len()
    }

    pub fn temp_count(&self) -> usize {
        self.symbols.iter().filter(|entry| entry.is_temp()).count()
    }
}

// Listing format consumed by the target-code generator: the non-temporary
// entry count and entries, the temporary count, then the indexed quadruples.
impl fmt::Display for Ir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let temps = self.temp_count();
        writeln!(f, "{}", self.symbols.len() - temps)?;
        for entry in self.symbols.iter().filter(|entry| !entry.is_temp()) {
            let offset = match entry.storage {
                Storage::Slot(offset) => offset,
                Storage::Temp => continue,
            };
            writeln!(
                f,
                "{} {} {} {}",
                entry.name,
                entry.ty,
                entry.value.as_deref().unwrap_or("null"),
                offset,
            )?;
        }
        writeln!(f, "{}", temps)?;
        writeln!(f, "{}", self.quads.len())?;
        for (index, quad) in self.quads.iter().enumerate() {
            writeln!(f, "{}: {}", index, quad)?;
        }
        Ok(())
    }
}

/// A grammar symbol instance on the translation stack, together with the
/// synthesized attributes computed so far.
#[derive(Debug, Clone, Default)]
pub struct AttrSymbol {
    /// Name of the grammar symbol this slot holds.
    pub symbol: String,

    /// Token text, present on shifted terminals.
    pub text: Option<String>,

    /// Source-level identifier carried upward from an `id` token.
    pub name: Option<String>,

    pub ty: Option<Ty>,
    pub width: Option<usize>,

    /// Operator spelling carried by operator nonterminals.
    pub op: Option<String>,

    /// Symbol-table index of the value computed for this symbol.
    pub place: Option<usize>,

    /// Snapshot of the next-quad counter taken by marker nonterminals.
    pub quad: Option<usize>,

    pub nextlist: PatchList,
    pub truelist: PatchList,
    pub falselist: PatchList,
}

impl AttrSymbol {
    pub(crate) fn token(terminal: &str, lexeme: &str) -> Self {
        Self {
            symbol: terminal.to_owned(),
            text: Some(lexeme.to_owned()),
            ..Self::default()
        }
    }

    pub(crate) fn marker(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_owned(),
            ..Self::default()
        }
    }

    fn missing(&self, attribute: &'static str) -> SemanticError {
        SemanticError::MissingAttribute {
            symbol: self.symbol.clone(),
            attribute,
        }
    }

    pub fn text(&self) -> Result<&str, SemanticError> {
        self.text.as_deref().ok_or_else(|| self.missing("text"))
    }

    pub fn ident(&self) -> Result<&str, SemanticError> {
        self.name.as_deref().ok_or_else(|| self.missing("name"))
    }

    pub fn ty(&self) -> Result<Ty, SemanticError> {
        self.ty.ok_or_else(|| self.missing("type"))
    }

    pub fn width(&self) -> Result<usize, SemanticError> {
        self.width.ok_or_else(|| self.missing("width"))
    }

    pub fn op(&self) -> Result<&str, SemanticError> {
        self.op.as_deref().ok_or_else(|| self.missing("op"))
    }

    pub fn place(&self) -> Result<usize, SemanticError> {
        self.place.ok_or_else(|| self.missing("place"))
    }

    pub fn quad(&self) -> Result<usize, SemanticError> {
        self.quad.ok_or_else(|| self.missing("quad"))
    }
}

/// Mutable state threaded through every semantic action: the attributed
/// stack mirrored with the driver's state stack, the growing IR, the
/// storage offset counter and the temporary-name counter.
#[derive(Debug, Default)]
pub struct TranslationContext {
    pub(crate) stack: Vec<AttrSymbol>,
    ir: Ir,
    offset: usize,
    temp_count: usize,
    frame: usize,
}

impl TranslationContext {
    pub(crate) fn new(end_symbol: &str) -> Self {
        Self {
            stack: vec![AttrSymbol::marker(end_symbol)],
            ..Self::default()
        }
    }

    /// Called by the driver before the action runs: for an ε-production a
    /// placeholder slot is pushed so the result slot exists on the stack.
    pub(crate) fn begin_production(&mut self, arity: usize) {
        if arity == 0 {
            self.stack.push(AttrSymbol::default());
        }
        self.frame = arity.max(1);
    }

    /// Called by the driver after the action: collapse the operand slots
    /// into the leftmost one and rename it to the reduced nonterminal.
    /// Attributes already stored in that slot are preserved.
    pub(crate) fn finish_production(&mut self, left: &str) {
        let result = self.stack.len() - self.frame;
        self.stack.truncate(result + 1);
        if let Some(slot) = self.stack.last_mut() {
            slot.symbol.clear();
            slot.symbol.push_str(left);
        }
        self.frame = 0;
    }

    pub(crate) fn push_token(&mut self, terminal: &str, lexeme: &str) {
        self.stack.push(AttrSymbol::token(terminal, lexeme));
    }

    pub(crate) fn into_ir(self) -> Ir {
        self.ir
    }

    /// The `index`-th right-hand-side symbol of the production being
    /// reduced, counted from the left.
    pub fn arg(&self, index: usize) -> &AttrSymbol {
        &self.stack[self.stack.len() - self.frame + index]
    }

    /// The slot that will hold the reduced nonterminal.
    pub fn result_mut(&mut self) -> &mut AttrSymbol {
        let index = self.stack.len() - self.frame;
        &mut self.stack[index]
    }

    pub fn ir(&self) -> &Ir {
        &self.ir
    }

    /// Index of the next quadruple to be generated.
    pub fn next_quad(&self) -> usize {
        self.ir.next_quad()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    pub fn advance_offset(&mut self, width: usize) {
        self.offset += width;
    }

    /// Append a declared variable to the symbol table.
    pub fn enter(&mut self, name: &str, ty: Ty, offset: usize) -> usize {
        self.ir.symbols.push(SymEntry {
            name: name.to_owned(),
            ty,
            value: None,
            storage: Storage::Slot(offset),
        });
        self.ir.symbols.len() - 1
    }

    /// Append a fresh temporary and return its symbol-table index.
    pub fn newtemp(&mut self, ty: Ty) -> usize {
        let name = format!("T{}_{}", self.temp_count, ty.suffix());
        self.temp_count += 1;
        self.ir.symbols.push(SymEntry {
            name,
            ty,
            value: None,
            storage: Storage::Temp,
        });
        self.ir.symbols.len() - 1
    }

    /// Record the literal text loaded into the entry at `place`.
    pub fn note_literal(&mut self, place: usize, text: &str) -> Result<(), SemanticError> {
        let entry = self
            .ir
            .symbols
            .get_mut(place)
            .ok_or(SemanticError::UnknownPlace(place))?;
        entry.value = Some(text.to_owned());
        Ok(())
    }

    pub fn entry(&self, place: usize) -> Result<&SymEntry, SemanticError> {
        self.ir
            .symbols
            .get(place)
            .ok_or(SemanticError::UnknownPlace(place))
    }

    /// Find the most recent symbol-table entry with the given name.
    pub fn lookup(&self, name: &str) -> Result<usize, SemanticError> {
        self.ir
            .symbols
            .iter()
            .rposition(|entry| entry.name == name)
            .ok_or_else(|| SemanticError::UndeclaredIdentifier(name.to_owned()))
    }

    /// Append one quadruple and return its index.
    pub fn gen(
        &mut self,
        op: impl Into<String>,
        arg1: impl Into<String>,
        arg2: impl Into<String>,
        result: ResultSlot,
    ) -> usize {
        self.ir.quads.push(Quadruple {
            op: op.into(),
            arg1: arg1.into(),
            arg2: arg2.into(),
            result,
        });
        self.ir.quads.len() - 1
    }

    /// Make a one-element pending list out of quad `index`, marking its
    /// result field as the list terminator. `None` yields the empty list.
    pub fn mklist(&mut self, index: Option<usize>) -> Result<PatchList, SemanticError> {
        let Some(index) = index else {
            return Ok(PatchList::empty());
        };
        let quad = self
            .ir
            .quads
            .get_mut(index)
            .ok_or(SemanticError::QuadOutOfRange(index))?;
        quad.result = ResultSlot::Unset;
        Ok(PatchList { head: Some(index) })
    }

    /// Concatenate two pending lists. The chain of `second` is walked to
    /// its terminator, which is rewritten to point at `first`.
    pub fn merge(&mut self, first: PatchList, second: PatchList) -> Result<PatchList, SemanticError> {
        let Some(first_head) = first.head else {
            return Ok(second);
        };
        let Some(mut cursor) = second.head else {
            return Ok(first);
        };
        loop {
            let quad = self
                .ir
                .quads
                .get_mut(cursor)
                .ok_or(SemanticError::BrokenChain(cursor))?;
            match quad.result {
                ResultSlot::Chain(next) => cursor = next,
                ResultSlot::Unset => {
                    quad.result = ResultSlot::Chain(first_head);
                    return Ok(second);
                }
                _ => return Err(SemanticError::BrokenChain(cursor)),
            }
        }
    }

    /// Resolve every quadruple on `list`'s chain to jump to `target`.
    /// The whole chain is walked, not only its head; re-patching an
    /// already resolved list is a no-op.
    pub fn backpatch(&mut self, list: PatchList, target: usize) -> Result<(), SemanticError> {
        let mut cursor = list.head;
        while let Some(index) = cursor {
            let quad = self
                .ir
                .quads
                .get_mut(index)
                .ok_or(SemanticError::BrokenChain(index))?;
            cursor = match quad.result {
                ResultSlot::Chain(next) => Some(next),
                _ => None,
            };
            quad.result = ResultSlot::Target(target);
        }
        Ok(())
    }
}
