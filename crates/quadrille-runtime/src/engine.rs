//! The shift-reduce driver.

use crate::definition::{ParseAction, ParserDef};
use crate::ir::{Ir, SemanticError, TranslationContext};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("syntax error: no action for state {state} and token `{token}`")]
    Syntax { state: String, token: String },

    #[error("no goto for state {state} and symbol `{symbol}`")]
    MissingGoto { state: String, symbol: String },

    #[error("reduction references unknown production {index}")]
    UnknownProduction { index: usize },

    #[error("input exhausted past the end marker")]
    UnexpectedEnd,

    #[error("state stack underflow during reduction")]
    StackUnderflow,

    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

/// One input token: the terminal category it belongs to plus the matched
/// source text, exactly as handed over by the scanner.
#[derive(Debug, Clone)]
pub struct Token {
    pub terminal: String,
    pub lexeme: String,
}

impl Token {
    pub fn new(terminal: impl Into<String>, lexeme: impl Into<String>) -> Self {
        Self {
            terminal: terminal.into(),
            lexeme: lexeme.into(),
        }
    }
}

/// Semantic actions invoked on every reduction, before the operand slots
/// are collapsed. Parser variants differ only in the value plugged in
/// here, not in the driver itself.
pub trait SemanticActions {
    fn on_reduce(
        &mut self,
        production: usize,
        cx: &mut TranslationContext,
    ) -> Result<(), SemanticError>;
}

/// Recognize-only variant: every reduction is a no-op.
#[derive(Debug, Default)]
pub struct NoActions;

impl SemanticActions for NoActions {
    fn on_reduce(&mut self, _: usize, _: &mut TranslationContext) -> Result<(), SemanticError> {
        Ok(())
    }
}

/// A semantic action: computes the attributes of the reduced nonterminal
/// from the operands still present on the stack, emitting quadruples as a
/// side effect.
pub type ActionFn = fn(&mut TranslationContext) -> Result<(), SemanticError>;

// A fixed-size table of actions addressed by production index; indices
// without an entry (the synthetic start production) reduce silently.
impl SemanticActions for &[ActionFn] {
    fn on_reduce(
        &mut self,
        production: usize,
        cx: &mut TranslationContext,
    ) -> Result<(), SemanticError> {
        match self.get(production) {
            Some(action) => action(cx),
            None => Ok(()),
        }
    }
}

/// The table-driven parser: a stack of state numbers synchronized with a
/// stack of attributed symbols, consuming tokens via the parse table.
#[derive(Debug)]
pub struct Driver<TDef, TActions>
where
    TDef: ParserDef,
    TActions: SemanticActions,
{
    def: TDef,
    actions: TActions,
}

impl<TDef, TActions> Driver<TDef, TActions>
where
    TDef: ParserDef,
    TActions: SemanticActions,
{
    pub fn new(def: TDef, actions: TActions) -> Self {
        Self { def, actions }
    }

    pub fn actions(&self) -> &TActions {
        &self.actions
    }

    /// Run one parse over the token sequence, with the end marker appended
    /// after the last token. A fresh translation context is built per call;
    /// on success the accumulated IR is returned, on any error the parse is
    /// abandoned and the partial IR discarded.
    pub fn parse<I>(&mut self, tokens: I) -> Result<Ir, ParseError>
    where
        I: IntoIterator<Item = Token>,
    {
        let end_symbol = self.def.end_symbol().to_owned();
        let mut input = tokens
            .into_iter()
            .chain(std::iter::once(Token::new(&*end_symbol, &*end_symbol)));

        let mut cx = TranslationContext::new(&end_symbol);
        let mut states = vec![self.def.initial_state()];
        let mut lookahead = input.next();

        loop {
            let current = *states.last().ok_or(ParseError::StackUnderflow)?;

            let action = {
                let token = lookahead.as_ref().ok_or(ParseError::UnexpectedEnd)?;
                self.def
                    .action(current, &token.terminal)
                    .ok_or_else(|| ParseError::Syntax {
                        state: current.to_string(),
                        token: token.terminal.clone(),
                    })?
            };

            match action {
                ParseAction::Shift(next) => {
                    let token = lookahead.take().ok_or(ParseError::UnexpectedEnd)?;
                    cx.push_token(&token.terminal, &token.lexeme);
                    states.push(next);
                    lookahead = input.next();
                }

                ParseAction::Reduce(index) => {
                    let production = self
                        .def
                        .production(index)
                        .ok_or(ParseError::UnknownProduction { index })?;

                    if states.len() <= production.arity {
                        return Err(ParseError::StackUnderflow);
                    }

                    // The action reads operand attributes in place, so it
                    // runs before the stacks are popped.
                    cx.begin_production(production.arity);
                    self.actions.on_reduce(index, &mut cx)?;
                    cx.finish_production(production.left);

                    states.truncate(states.len() - production.arity);
                    let current = *states.last().ok_or(ParseError::StackUnderflow)?;

                    let next = self.def.goto(current, production.left).ok_or_else(|| {
                        ParseError::MissingGoto {
                            state: current.to_string(),
                            symbol: production.left.to_owned(),
                        }
                    })?;
                    states.push(next);
                }

                ParseAction::Accept => return Ok(cx.into_ir()),
            }
        }
    }
}
