//! Parser definition.

use std::fmt;

/// The trait for abstracting a loaded LR(1) parse table.
///
/// Lookahead and goto lookups are keyed by the *name* of the grammar symbol,
/// which is what the token stream carries. The table behind this trait is
/// read-only for the lifetime of a parse.
pub trait ParserDef {
    /// The number identifying a state of the LR(1) automaton.
    type State: Copy + fmt::Display;

    /// Return the initial state number.
    fn initial_state(&self) -> Self::State;

    /// Return the action for the specified state and lookahead terminal,
    /// or `None` if the cell is empty.
    fn action(&self, current: Self::State, lookahead: &str) -> Option<ParseAction<Self::State>>;

    /// Return the goto target for the specified state and nonterminal,
    /// or `None` if the cell is empty.
    fn goto(&self, current: Self::State, left: &str) -> Option<Self::State>;

    /// Describe the production with the specified index.
    fn production(&self, index: usize) -> Option<Production<'_>>;

    /// The name of the end-of-input terminal appended after the last token.
    fn end_symbol(&self) -> &str;
}

impl<T: ?Sized> ParserDef for &T
where
    T: ParserDef,
{
    type State = T::State;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn action(&self, current: Self::State, lookahead: &str) -> Option<ParseAction<Self::State>> {
        (**self).action(current, lookahead)
    }

    fn goto(&self, current: Self::State, left: &str) -> Option<Self::State> {
        (**self).goto(current, left)
    }

    fn production(&self, index: usize) -> Option<Production<'_>> {
        (**self).production(index)
    }

    fn end_symbol(&self) -> &str {
        (**self).end_symbol()
    }
}

impl<T: ?Sized> ParserDef for std::sync::Arc<T>
where
    T: ParserDef,
{
    type State = T::State;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn action(&self, current: Self::State, lookahead: &str) -> Option<ParseAction<Self::State>> {
        (**self).action(current, lookahead)
    }

    fn goto(&self, current: Self::State, left: &str) -> Option<Self::State> {
        (**self).goto(current, left)
    }

    fn production(&self, index: usize) -> Option<Production<'_>> {
        (**self).production(index)
    }

    fn end_symbol(&self) -> &str {
        (**self).end_symbol()
    }
}

/// A single parse-table action.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParseAction<TState> {
    /// Read the lookahead and transition to the specified state.
    Shift(TState),

    /// Reduce by the production with the specified index.
    Reduce(usize),

    Accept,
}

/// The shape of a production as seen by the driver.
#[derive(Debug, Copy, Clone)]
pub struct Production<'a> {
    /// Name of the nonterminal on the left-hand side.
    pub left: &'a str,

    /// Number of symbols on the right-hand side.
    pub arity: usize,
}
