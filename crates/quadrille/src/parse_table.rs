//! Synthesis of the action and goto tables from the item-set collection.

use crate::{
    grammar::{Grammar, NonterminalID, RuleID, SymbolID, TerminalID},
    lr1::{Automaton, StateID},
    types::Map,
    util::display_fn,
};
use std::fmt;

/// One resolved action-table cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActionEntry {
    /// Read the lookahead symbol and transition to the specified state.
    Shift(StateID),

    /// Reduce by the production with the specified index.
    Reduce(RuleID),

    Accept,
}

impl fmt::Display for ActionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionEntry::Shift(target) => write!(f, "s{}", target),
            ActionEntry::Reduce(rule) => write!(f, "r{}", rule),
            ActionEntry::Accept => f.write_str("acc"),
        }
    }
}

/// A cell received more than one derivable action: the grammar is not
/// LR(1). Both candidates are reported; nothing is dropped or resolved.
#[derive(Debug, thiserror::Error)]
#[error("conflicting actions for state {state} on `{symbol}`: {}", display_entries(.entries))]
pub struct TableConflict {
    pub state: StateID,
    pub symbol: String,
    pub entries: Vec<ActionEntry>,
}

fn display_entries(entries: &[ActionEntry]) -> impl fmt::Display + '_ {
    display_fn(|f| {
        for (i, entry) in entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" / ")?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    })
}

/// The action and goto tables of one grammar, keyed by state and symbol
/// identity. Read-only while parsing; equality compares every populated
/// cell, irrespective of insertion order.
#[derive(Debug, PartialEq)]
pub struct ParseTable {
    actions: Map<(StateID, TerminalID), ActionEntry>,
    gotos: Map<(StateID, NonterminalID), StateID>,
}

impl ParseTable {
    /// Derive the tables from the item-set collection of an augmented
    /// grammar: terminal goto edges become shifts, nonterminal edges
    /// become gotos, completed items become reductions, and the completed
    /// synthetic start item becomes the accept entry.
    pub fn generate(automaton: &Automaton, grammar: &Grammar) -> Result<Self, TableConflict> {
        let mut pending: Map<(StateID, TerminalID), Vec<ActionEntry>> = Map::default();
        let mut gotos = Map::default();

        for ((state, symbol), target) in automaton.gotos() {
            match symbol {
                SymbolID::T(t) => {
                    push_entry(&mut pending, (state, t), ActionEntry::Shift(target));
                }
                SymbolID::N(n) => {
                    gotos.insert((state, n), target);
                }
            }
        }

        for (state, items) in automaton.states() {
            for item in items {
                let rule = match grammar.rule(item.rule) {
                    Some(rule) => rule,
                    None => continue,
                };
                if item.marker < rule.right().len() {
                    continue;
                }
                let entry = if rule.left() == NonterminalID::START {
                    ActionEntry::Accept
                } else {
                    ActionEntry::Reduce(item.rule)
                };
                push_entry(&mut pending, (state, item.lookahead), entry);
            }
        }

        let mut actions = Map::default();
        for ((state, terminal), entries) in pending {
            if entries.len() > 1 {
                return Err(TableConflict {
                    state,
                    symbol: grammar
                        .terminal_name(terminal)
                        .unwrap_or("?")
                        .to_owned(),
                    entries,
                });
            }
            if let Some(entry) = entries.into_iter().next() {
                actions.insert((state, terminal), entry);
            }
        }

        tracing::debug!(
            actions = actions.len(),
            gotos = gotos.len(),
            "synthesized parse table"
        );

        Ok(Self { actions, gotos })
    }

    pub(crate) fn from_parts(
        actions: Map<(StateID, TerminalID), ActionEntry>,
        gotos: Map<(StateID, NonterminalID), StateID>,
    ) -> Self {
        Self { actions, gotos }
    }

    pub fn action(&self, state: StateID, terminal: TerminalID) -> Option<ActionEntry> {
        self.actions.get(&(state, terminal)).copied()
    }

    pub fn goto(&self, state: StateID, nonterminal: NonterminalID) -> Option<StateID> {
        self.gotos.get(&(state, nonterminal)).copied()
    }

    pub fn actions(&self) -> impl Iterator<Item = ((StateID, TerminalID), ActionEntry)> + '_ {
        self.actions.iter().map(|(cell, entry)| (*cell, *entry))
    }

    pub fn gotos(&self) -> impl Iterator<Item = ((StateID, NonterminalID), StateID)> + '_ {
        self.gotos.iter().map(|(cell, target)| (*cell, *target))
    }

    /// Number of states mentioned by any populated cell.
    pub fn state_count(&self) -> usize {
        let actions = self.actions.keys().map(|(state, _)| state.index() + 1);
        let gotos = self.gotos.keys().map(|(state, _)| state.index() + 1);
        actions.chain(gotos).max().unwrap_or(0)
    }
}

fn push_entry(
    pending: &mut Map<(StateID, TerminalID), Vec<ActionEntry>>,
    cell: (StateID, TerminalID),
    entry: ActionEntry,
) {
    let entries = pending.entry(cell).or_default();
    // The same reduction can be derived from several items; only distinct
    // actions constitute a conflict.
    if !entries.contains(&entry) {
        entries.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::first_sets::FirstSets;
    use crate::grammar::SymbolID::{N, T};

    fn tables_for(grammar: &Grammar) -> Result<(ParseTable, Automaton), TableConflict> {
        let first = FirstSets::new(grammar);
        let automaton = Automaton::generate(grammar, &first).unwrap();
        ParseTable::generate(&automaton, grammar).map(|table| (table, automaton))
    }

    #[test]
    fn arithmetic_grammar_is_conflict_free() {
        let grammar = Grammar::define(|g| {
            let plus = g.terminal("plus")?;
            let star = g.terminal("star")?;
            let lparen = g.terminal("lparen")?;
            let rparen = g.terminal("rparen")?;
            let id = g.terminal("id")?;

            let e = g.nonterminal("E")?;
            let t = g.nonterminal("T")?;
            let f = g.nonterminal("F")?;

            g.start_symbol(e)?;

            g.rule(e, [N(e), T(plus), N(t)])?;
            g.rule(e, [N(t)])?;
            g.rule(t, [N(t), T(star), N(f)])?;
            g.rule(t, [N(f)])?;
            g.rule(f, [T(lparen), N(e), T(rparen)])?;
            g.rule(f, [T(id)])?;

            Ok(())
        })
        .unwrap()
        .augment();

        let (table, automaton) = tables_for(&grammar).unwrap();

        // The start state shifts on the tokens that can begin an expression
        // and has gotos for every expression nonterminal.
        let id = grammar.terminal_id("id").unwrap();
        assert!(matches!(
            table.action(StateID::START, id),
            Some(ActionEntry::Shift(_))
        ));
        let e = grammar.nonterminal_id("E").unwrap();
        assert!(table.goto(StateID::START, e).is_some());

        // Accept lives at (goto(0, E), #).
        let accept_state = table.goto(StateID::START, e).unwrap();
        assert_eq!(
            table.action(accept_state, TerminalID::EOI),
            Some(ActionEntry::Accept)
        );

        assert_eq!(table.state_count(), automaton.state_count());
    }

    #[test]
    fn ambiguous_grammar_reports_the_conflicting_cell() {
        // E := E plus E | id is ambiguous: on `plus` after E plus E the
        // parser could shift or reduce.
        let grammar = Grammar::define(|g| {
            let plus = g.terminal("plus")?;
            let id = g.terminal("id")?;
            let e = g.nonterminal("E")?;
            g.start_symbol(e)?;
            g.rule(e, [N(e), T(plus), N(e)])?;
            g.rule(e, [T(id)])?;
            Ok(())
        })
        .unwrap()
        .augment();

        let err = tables_for(&grammar).unwrap_err();
        assert_eq!(err.symbol, "plus");
        assert_eq!(err.entries.len(), 2);
        assert!(err
            .entries
            .iter()
            .any(|entry| matches!(entry, ActionEntry::Shift(_))));
        assert!(err
            .entries
            .iter()
            .any(|entry| matches!(entry, ActionEntry::Reduce(_))));
    }
}
