//! The canonical LR(1) item-set collection.

use crate::{
    first_sets::FirstSets,
    grammar::{Grammar, RuleID, SymbolID, TerminalID},
    types::{Map, Set},
    util::display_fn,
};
use std::{collections::BTreeSet, fmt};

#[derive(Debug, thiserror::Error)]
pub enum AutomatonError {
    #[error("the grammar has no synthetic start production; augment it first")]
    NotAugmented,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StateID {
    raw: u32,
}

impl StateID {
    pub const START: Self = Self::new(0);

    const fn new(raw: u32) -> Self {
        Self { raw }
    }

    pub fn index(self) -> usize {
        self.raw as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self::new)
    }
}

impl fmt::Display for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

/// One LR(1) item: a production, a marker position inside its right-hand
/// side and a lookahead terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    pub rule: RuleID,
    pub marker: usize,
    pub lookahead: TerminalID,
}

impl Item {
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            let Some(rule) = g.rule(self.rule) else {
                return write!(f, "(unknown rule {})", self.rule);
            };
            write!(f, "({} :=", g.nonterminal_name(rule.left()).unwrap_or("?"))?;
            for (i, symbol) in rule.right().iter().enumerate() {
                if i == self.marker {
                    f.write_str(" .")?;
                }
                write!(f, " {}", g.symbol_name(*symbol).unwrap_or("?"))?;
            }
            if self.marker == rule.right().len() {
                f.write_str(" .")?;
            }
            write!(f, ") [{}]", g.terminal_name(self.lookahead).unwrap_or("?"))
        })
    }
}

/// A parser state. Two states are the same iff their item sets are equal;
/// the ordered set makes that comparison structural.
pub type ItemSet = BTreeSet<Item>;

/// The canonical collection of LR(1) states together with the goto
/// function over both terminals and nonterminals. A state's position in
/// `states` is its identity.
#[derive(Debug)]
pub struct Automaton {
    states: Vec<ItemSet>,
    gotos: Map<(StateID, SymbolID), StateID>,
}

impl Automaton {
    /// Build the canonical collection for an augmented grammar.
    pub fn generate(grammar: &Grammar, first_sets: &FirstSets) -> Result<Self, AutomatonError> {
        let accept = grammar.accept_rule().ok_or(AutomatonError::NotAugmented)?;

        let initial = closure(
            grammar,
            first_sets,
            BTreeSet::from([Item {
                rule: accept,
                marker: 0,
                lookahead: TerminalID::EOI,
            }]),
        );

        let mut states = vec![initial];
        let mut index: Map<ItemSet, StateID> = Map::default();
        index.insert(states[0].clone(), StateID::START);
        let mut gotos = Map::default();

        // Worklist over states by index; appending while iterating is what
        // drives the construction to its fixpoint.
        let mut cursor = 0;
        while cursor < states.len() {
            let current = states[cursor].clone();
            let state_id = StateID::new(cursor as u32);

            for symbol in next_symbols(grammar, &current) {
                let mut advanced = ItemSet::new();
                for item in &current {
                    let rule = match grammar.rule(item.rule) {
                        Some(rule) => rule,
                        None => continue,
                    };
                    if rule.right().get(item.marker) == Some(&symbol) {
                        advanced.insert(Item {
                            marker: item.marker + 1,
                            ..*item
                        });
                    }
                }
                let candidate = closure(grammar, first_sets, advanced);

                let target = match index.get(&candidate) {
                    Some(id) => *id,
                    None => {
                        let id = StateID::new(states.len() as u32);
                        index.insert(candidate.clone(), id);
                        states.push(candidate);
                        id
                    }
                };
                gotos.insert((state_id, symbol), target);
            }

            cursor += 1;
        }

        tracing::debug!(
            states = states.len(),
            edges = gotos.len(),
            "generated LR(1) item-set collection"
        );

        Ok(Self { states, gotos })
    }

    pub fn states(&self) -> impl Iterator<Item = (StateID, &ItemSet)> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(|(i, set)| (StateID::new(i as u32), set))
    }

    pub fn state(&self, id: StateID) -> Option<&ItemSet> {
        self.states.get(id.index())
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn goto(&self, state: StateID, symbol: SymbolID) -> Option<StateID> {
        self.gotos.get(&(state, symbol)).copied()
    }

    pub fn gotos(&self) -> impl Iterator<Item = ((StateID, SymbolID), StateID)> + '_ {
        self.gotos.iter().map(|(edge, target)| (*edge, *target))
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            for (i, (id, items)) in self.states().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "#### State {:02}", id)?;
                writeln!(f, "## items")?;
                for item in items {
                    writeln!(f, "- {}", item.display(g))?;
                }
                writeln!(f, "## gotos")?;
                for ((state, symbol), target) in self.gotos() {
                    if state == id {
                        writeln!(
                            f,
                            "- {} => {:02}",
                            g.symbol_name(symbol).unwrap_or("?"),
                            target
                        )?;
                    }
                }
            }
            Ok(())
        })
    }
}

/// The symbols occurring immediately after a marker somewhere in the set.
fn next_symbols(grammar: &Grammar, items: &ItemSet) -> Set<SymbolID> {
    let mut symbols = Set::default();
    for item in items {
        if let Some(rule) = grammar.rule(item.rule) {
            if let Some(symbol) = rule.right().get(item.marker) {
                symbols.insert(*symbol);
            }
        }
    }
    symbols
}

/// Expand an item set to its closure: for every `(A := α . B β, la)` and
/// every rule `B := γ`, the items `(B := . γ, l)` are added for each
/// `l ∈ First(β la)`, until nothing new can be added. The universe of
/// (rule, marker, lookahead) triples is finite, so this terminates.
fn closure(grammar: &Grammar, first_sets: &FirstSets, mut items: ItemSet) -> ItemSet {
    let mut changed = true;
    while changed {
        changed = false;

        let mut added = Vec::new();
        for item in &items {
            let rule = match grammar.rule(item.rule) {
                Some(rule) => rule,
                None => continue,
            };
            let (b, beta) = match &rule.right()[item.marker..] {
                [SymbolID::N(b), beta @ ..] => (*b, beta),
                _ => continue,
            };

            let lookaheads = first_sets.lookaheads(beta, item.lookahead);
            for (id, candidate) in grammar.rules() {
                if candidate.left() != b {
                    continue;
                }
                for lookahead in &lookaheads {
                    added.push(Item {
                        rule: id,
                        marker: 0,
                        lookahead: *lookahead,
                    });
                }
            }
        }

        for item in added {
            changed |= items.insert(item);
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::SymbolID::{N, T};

    // The classic reduce-reduce lookahead exercise: after `a a` the parser
    // must pick A or B purely from the next terminal.
    fn lookahead_grammar() -> Grammar {
        Grammar::define(|g| {
            let a = g.terminal("a")?;
            let b = g.terminal("b")?;

            let s = g.nonterminal("S")?;
            let na = g.nonterminal("A")?;
            let nb = g.nonterminal("B")?;

            g.start_symbol(s)?;

            g.rule(s, [T(a), N(na), T(a), N(na), T(b)])?;
            g.rule(s, [T(a), N(nb), T(b)])?;
            g.rule(na, [T(a)])?;
            g.rule(nb, [T(a)])?;

            Ok(())
        })
        .unwrap()
        .augment()
    }

    #[test]
    fn initial_state_contains_the_accept_item() {
        let grammar = lookahead_grammar();
        let first = FirstSets::new(&grammar);
        let automaton = Automaton::generate(&grammar, &first).unwrap();

        let accept = grammar.accept_rule().unwrap();
        let initial = automaton.state(StateID::START).unwrap();
        assert!(initial.contains(&Item {
            rule: accept,
            marker: 0,
            lookahead: TerminalID::EOI,
        }));
    }

    #[test]
    fn distinguishes_reductions_by_lookahead() {
        let grammar = lookahead_grammar();
        let first = FirstSets::new(&grammar);
        let automaton = Automaton::generate(&grammar, &first).unwrap();

        let na = grammar.rules().nth(2).map(|(id, _)| id).unwrap();
        let nb = grammar.rules().nth(3).map(|(id, _)| id).unwrap();

        // Some state holds both completed items, separated only by their
        // lookaheads.
        let a = grammar.terminal_id("a").unwrap();
        let b = grammar.terminal_id("b").unwrap();
        let found = automaton.states().any(|(_, items)| {
            items.contains(&Item {
                rule: na,
                marker: 1,
                lookahead: a,
            }) && items.contains(&Item {
                rule: nb,
                marker: 1,
                lookahead: b,
            })
        });
        assert!(found);
    }

    #[test]
    fn construction_is_deterministic() {
        let grammar = lookahead_grammar();
        let first = FirstSets::new(&grammar);
        let one = Automaton::generate(&grammar, &first).unwrap();
        let two = Automaton::generate(&grammar, &first).unwrap();

        assert_eq!(one.state_count(), two.state_count());
        let edges_one: Vec<_> = one.gotos().collect();
        let edges_two: Vec<_> = two.gotos().collect();
        assert_eq!(edges_one, edges_two);
    }

    #[test]
    fn unaugmented_grammar_is_rejected() {
        let grammar = Grammar::define(|g| {
            let a = g.terminal("a")?;
            let s = g.nonterminal("S")?;
            g.rule(s, [T(a)])?;
            Ok(())
        })
        .unwrap();
        let first = FirstSets::new(&grammar);
        assert!(matches!(
            Automaton::generate(&grammar, &first),
            Err(AutomatonError::NotAugmented)
        ));
    }

    #[test]
    fn smoketest_display() {
        let grammar = lookahead_grammar();
        let first = FirstSets::new(&grammar);
        let automaton = Automaton::generate(&grammar, &first).unwrap();
        eprintln!("{}", grammar);
        eprintln!("states:\n---\n{}", automaton.display(&grammar));
    }
}
