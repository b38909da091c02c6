//! External tabular form of the parse table.
//!
//! Row 1 names every column: `id`, the terminals, then the nonterminals,
//! in grammar iteration order. Each following row is one state: the state
//! id and one cell per column, `s<k>` for shift, `r<k>` for reduce, `acc`
//! for accept, a bare integer for goto and the empty string for an absent
//! cell. Reloading validates the header against the (augmented) grammar
//! before any cell is interpreted.

use crate::{
    grammar::{Grammar, SymbolID},
    lr1::StateID,
    parse_table::{ActionEntry, ParseTable},
    types::{Map, Set},
};
use std::fmt::Write as _;

// The column delimiter itself can be a terminal (the mini language has a
// `,` token), so that one name is aliased in the header.
const COMMA_ALIAS: &str = "<comma>";

fn escape(name: &str) -> &str {
    if name == "," {
        COMMA_ALIAS
    } else {
        name
    }
}

fn unescape(name: &str) -> &str {
    if name == COMMA_ALIAS {
        ","
    } else {
        name
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TableFormatError {
    #[error("the table file is empty")]
    Empty,

    #[error("the header must start with `id`, found `{found}`")]
    BadHeader { found: String },

    #[error("header symbol `{name}` is not part of the grammar")]
    UnknownSymbol { name: String },

    #[error("header symbol `{name}` names both a terminal and a nonterminal")]
    AmbiguousSymbol { name: String },

    #[error("header symbol `{name}` occurs twice")]
    DuplicateSymbol { name: String },

    #[error("grammar symbol `{name}` is missing from the header")]
    MissingSymbol { name: String },

    #[error("line {line}: expected {expected} cells")]
    RowWidth { line: usize, expected: usize },

    #[error("line {line}: `{found}` is not a state id")]
    BadStateId { line: usize, found: String },

    #[error("line {line}: state {state} is defined twice")]
    DuplicateState { line: usize, state: StateID },

    #[error("line {line}: cell `{cell}` is not valid under column `{column}`")]
    BadCell {
        line: usize,
        column: String,
        cell: String,
    },

    #[error("line {line}: cell `{cell}` references an unknown production")]
    UnknownRule { line: usize, cell: String },
}

/// Serialize the table against the grammar it was generated from.
pub fn encode(grammar: &Grammar, table: &ParseTable) -> String {
    let mut out = String::new();

    out.push_str("id");
    for (_, terminal) in grammar.terminals() {
        out.push(',');
        out.push_str(escape(terminal.name()));
    }
    for (_, nonterminal) in grammar.nonterminals() {
        out.push(',');
        out.push_str(escape(nonterminal.name()));
    }
    out.push('\n');

    for index in 0..table.state_count() {
        let state = match StateID::from_index(index) {
            Some(state) => state,
            None => break,
        };
        let _ = write!(out, "{}", state);
        for (id, _) in grammar.terminals() {
            out.push(',');
            if let Some(entry) = table.action(state, id) {
                let _ = write!(out, "{}", entry);
            }
        }
        for (id, _) in grammar.nonterminals() {
            out.push(',');
            if let Some(target) = table.goto(state, id) {
                let _ = write!(out, "{}", target);
            }
        }
        out.push('\n');
    }

    out
}

/// Reconstruct a table, validating that the header's symbol set matches
/// the grammar's terminal and nonterminal sets exactly (order-independent).
pub fn decode(grammar: &Grammar, input: &str) -> Result<ParseTable, TableFormatError> {
    let mut lines = input.lines().enumerate();

    let (_, header) = lines.next().ok_or(TableFormatError::Empty)?;
    let columns = parse_header(grammar, header)?;

    let mut actions = Map::default();
    let mut gotos = Map::default();
    let mut seen_states = Set::default();

    for (index, row) in lines {
        let line = index + 1;
        if row.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = row.split(',').map(str::trim).collect();
        if cells.len() != columns.len() + 1 {
            return Err(TableFormatError::RowWidth {
                line,
                expected: columns.len() + 1,
            });
        }

        let state = cells[0]
            .parse::<usize>()
            .ok()
            .and_then(StateID::from_index)
            .ok_or_else(|| TableFormatError::BadStateId {
                line,
                found: cells[0].to_owned(),
            })?;
        if !seen_states.insert(state) {
            return Err(TableFormatError::DuplicateState { line, state });
        }

        for (column, cell) in columns.iter().zip(&cells[1..]) {
            if cell.is_empty() {
                continue;
            }
            let bad_cell = || TableFormatError::BadCell {
                line,
                column: grammar.symbol_name(*column).unwrap_or("?").to_owned(),
                cell: (*cell).to_owned(),
            };
            match column {
                SymbolID::T(terminal) => {
                    let entry = parse_action(grammar, cell)
                        .map_err(|unknown_rule| {
                            if unknown_rule {
                                TableFormatError::UnknownRule {
                                    line,
                                    cell: (*cell).to_owned(),
                                }
                            } else {
                                bad_cell()
                            }
                        })?;
                    actions.insert((state, *terminal), entry);
                }
                SymbolID::N(nonterminal) => {
                    let target = cell
                        .parse::<usize>()
                        .ok()
                        .and_then(StateID::from_index)
                        .ok_or_else(bad_cell)?;
                    gotos.insert((state, *nonterminal), target);
                }
            }
        }
    }

    Ok(ParseTable::from_parts(actions, gotos))
}

fn parse_header(grammar: &Grammar, header: &str) -> Result<Vec<SymbolID>, TableFormatError> {
    let mut cells = header.split(',').map(str::trim);

    let first = cells.next().unwrap_or_default();
    if first != "id" {
        return Err(TableFormatError::BadHeader {
            found: first.to_owned(),
        });
    }

    let mut columns = Vec::new();
    let mut seen = Set::default();
    for cell in cells {
        let name = unescape(cell);
        let symbol = match (grammar.terminal_id(name), grammar.nonterminal_id(name)) {
            (Some(_), Some(_)) => {
                return Err(TableFormatError::AmbiguousSymbol {
                    name: name.to_owned(),
                })
            }
            (Some(t), None) => SymbolID::T(t),
            (None, Some(n)) => SymbolID::N(n),
            (None, None) => {
                return Err(TableFormatError::UnknownSymbol {
                    name: name.to_owned(),
                })
            }
        };
        if !seen.insert(symbol) {
            return Err(TableFormatError::DuplicateSymbol {
                name: name.to_owned(),
            });
        }
        columns.push(symbol);
    }

    // Exact coverage: every grammar symbol must have its column.
    for (id, terminal) in grammar.terminals() {
        if !seen.contains(&SymbolID::T(id)) {
            return Err(TableFormatError::MissingSymbol {
                name: terminal.name().to_owned(),
            });
        }
    }
    for (id, nonterminal) in grammar.nonterminals() {
        if !seen.contains(&SymbolID::N(id)) {
            return Err(TableFormatError::MissingSymbol {
                name: nonterminal.name().to_owned(),
            });
        }
    }

    Ok(columns)
}

// `Err(true)` flags a reduce entry whose production index is out of range.
fn parse_action(grammar: &Grammar, cell: &str) -> Result<ActionEntry, bool> {
    if cell == "acc" {
        return Ok(ActionEntry::Accept);
    }
    if let Some(rest) = cell.strip_prefix('s') {
        let target = rest
            .parse::<usize>()
            .ok()
            .and_then(StateID::from_index)
            .ok_or(false)?;
        return Ok(ActionEntry::Shift(target));
    }
    if let Some(rest) = cell.strip_prefix('r') {
        let index = rest.parse::<usize>().map_err(|_| false)?;
        if index >= grammar.rule_count() {
            return Err(true);
        }
        let rule = crate::grammar::RuleID::from_index(index).ok_or(true)?;
        return Ok(ActionEntry::Reduce(rule));
    }
    Err(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{first_sets::FirstSets, lr1::Automaton};
    use crate::grammar::SymbolID::{N, T};

    fn arithmetic() -> Grammar {
        Grammar::define(|g| {
            let plus = g.terminal("plus")?;
            let star = g.terminal("star")?;
            let comma = g.terminal(",")?;
            let id = g.terminal("id")?;

            let e = g.nonterminal("E")?;
            let t = g.nonterminal("T")?;

            g.start_symbol(e)?;

            g.rule(e, [N(e), T(plus), N(t)])?;
            g.rule(e, [N(t)])?;
            g.rule(t, [N(t), T(star), T(id)])?;
            g.rule(t, [T(id)])?;
            // A comma-separated tail keeps the aliased terminal exercised.
            g.rule(e, [N(e), T(comma), N(t)])?;

            Ok(())
        })
        .unwrap()
        .augment()
    }

    fn table_for(grammar: &Grammar) -> ParseTable {
        let first = FirstSets::new(grammar);
        let automaton = Automaton::generate(grammar, &first).unwrap();
        ParseTable::generate(&automaton, grammar).unwrap()
    }

    #[test]
    fn round_trip_reproduces_every_cell() {
        let grammar = arithmetic();
        let table = table_for(&grammar);

        let text = encode(&grammar, &table);
        let reloaded = decode(&grammar, &text).unwrap();

        assert_eq!(reloaded, table);
    }

    #[test]
    fn comma_terminal_is_aliased_in_the_header() {
        let grammar = arithmetic();
        let table = table_for(&grammar);

        let text = encode(&grammar, &table);
        let header = text.lines().next().unwrap();
        assert!(header.contains(COMMA_ALIAS));
        assert_eq!(header.split(',').filter(|cell| cell.is_empty()).count(), 0);
    }

    #[test]
    fn header_mismatch_is_rejected() {
        let grammar = arithmetic();
        let table = table_for(&grammar);
        let text = encode(&grammar, &table);

        // A grammar with one more terminal does not match the header.
        let other = Grammar::define(|g| {
            let plus = g.terminal("plus")?;
            let star = g.terminal("star")?;
            let comma = g.terminal(",")?;
            let id = g.terminal("id")?;
            let extra = g.terminal("extra")?;

            let e = g.nonterminal("E")?;
            let t = g.nonterminal("T")?;

            g.start_symbol(e)?;
            g.rule(e, [N(e), T(plus), N(t)])?;
            g.rule(e, [N(t)])?;
            g.rule(t, [N(t), T(star), T(id)])?;
            g.rule(t, [T(id)])?;
            g.rule(e, [N(e), T(comma), N(t)])?;
            g.rule(t, [T(extra)])?;

            Ok(())
        })
        .unwrap()
        .augment();

        assert!(matches!(
            decode(&other, &text),
            Err(TableFormatError::MissingSymbol { name }) if name == "extra"
        ));
    }

    #[test]
    fn malformed_cells_are_rejected() {
        let grammar = arithmetic();
        let table = table_for(&grammar);
        let text = encode(&grammar, &table);

        let broken = text.replacen("acc", "xyz", 1);
        assert!(matches!(
            decode(&grammar, &broken),
            Err(TableFormatError::BadCell { .. })
        ));

        let broken = text.replacen("r1", "r99", 1);
        if broken != text {
            assert!(matches!(
                decode(&grammar, &broken),
                Err(TableFormatError::UnknownRule { .. })
            ));
        }
    }

    #[test]
    fn missing_header_is_rejected() {
        let grammar = arithmetic();
        assert!(matches!(
            decode(&grammar, ""),
            Err(TableFormatError::Empty)
        ));
    }
}
