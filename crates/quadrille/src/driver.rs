//! Adapter exposing a generated (or reloaded) parse table to the runtime
//! shift-reduce driver.

use crate::{
    grammar::{Grammar, NonterminalID, TerminalID, END_OF_INPUT},
    lr1::StateID,
    parse_table::{ActionEntry, ParseTable},
    types::Map,
};
use quadrille_runtime::definition::{ParseAction, ParserDef, Production};

/// A parse table bound to the augmented grammar it was generated from.
/// Symbol names coming from the token stream are resolved to grammar
/// identities once, at construction.
#[derive(Debug)]
pub struct TableDef<'g> {
    grammar: &'g Grammar,
    table: &'g ParseTable,
    terminals: Map<&'g str, TerminalID>,
    nonterminals: Map<&'g str, NonterminalID>,
}

impl<'g> TableDef<'g> {
    pub fn new(grammar: &'g Grammar, table: &'g ParseTable) -> Self {
        let terminals = grammar
            .terminals()
            .map(|(id, terminal)| (terminal.name(), id))
            .collect();
        let nonterminals = grammar
            .nonterminals()
            .map(|(id, nonterminal)| (nonterminal.name(), id))
            .collect();
        Self {
            grammar,
            table,
            terminals,
            nonterminals,
        }
    }
}

impl ParserDef for TableDef<'_> {
    type State = StateID;

    fn initial_state(&self) -> StateID {
        StateID::START
    }

    fn action(&self, current: StateID, lookahead: &str) -> Option<ParseAction<StateID>> {
        let terminal = *self.terminals.get(lookahead)?;
        Some(match self.table.action(current, terminal)? {
            ActionEntry::Shift(next) => ParseAction::Shift(next),
            ActionEntry::Reduce(rule) => ParseAction::Reduce(rule.index()),
            ActionEntry::Accept => ParseAction::Accept,
        })
    }

    fn goto(&self, current: StateID, left: &str) -> Option<StateID> {
        let nonterminal = *self.nonterminals.get(left)?;
        self.table.goto(current, nonterminal)
    }

    fn production(&self, index: usize) -> Option<Production<'_>> {
        let rule = self
            .grammar
            .rule(crate::grammar::RuleID::from_index(index)?)?;
        Some(Production {
            left: self.grammar.nonterminal_name(rule.left())?,
            arity: rule.right().len(),
        })
    }

    fn end_symbol(&self) -> &str {
        END_OF_INPUT
    }
}
