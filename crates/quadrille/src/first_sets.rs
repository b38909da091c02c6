//! Calculation of the FIRST set function.

use crate::grammar::{Grammar, SymbolID, TerminalID};
use crate::types::{Map, Set};

/// `FIRST(X)` for every grammar symbol: the terminals that can begin a
/// string derived from `X`, with `ε` standing in for the empty string.
///
/// Computed once per (augmented) grammar by iterating the defining
/// equations to a fixpoint; read-only afterwards.
#[derive(Debug)]
pub struct FirstSets {
    map: Map<SymbolID, Set<TerminalID>>,
}

impl FirstSets {
    pub fn new(grammar: &Grammar) -> Self {
        let mut map: Map<SymbolID, Set<TerminalID>> = Map::default();

        // First(t) = {t} for terminal symbols.
        for (id, _) in grammar.terminals() {
            map.insert(SymbolID::T(id), Some(id).into_iter().collect());
        }

        // First(A) = {} for nonterminal symbols.
        for (id, _) in grammar.nonterminals() {
            map.insert(SymbolID::N(id), Set::default());
        }

        // For every rule A := Y1 .. Yk, fold First(Y1 .. Yk) into First(A)
        // until a whole sweep adds nothing.
        while sweep(grammar, &mut map) {}

        Self { map }
    }

    /// `First(X)` of a single symbol.
    pub fn first(&self, symbol: SymbolID) -> &Set<TerminalID> {
        self.map.get(&symbol).expect("unexpected symbol")
    }

    /// `First(Y1 .. Yk)` of a sequence: the empty sequence yields `{ε}`,
    /// and `ε` stays in the result only while every symbol is nullable.
    pub fn sequence(&self, symbols: &[SymbolID]) -> Set<TerminalID> {
        sequence_first(&self.map, symbols)
    }

    /// `First(β la)` for closure lookaheads: `ε` is stripped and the
    /// lookahead terminal takes its place when all of `β` is nullable.
    pub fn lookaheads(&self, beta: &[SymbolID], la: TerminalID) -> Set<TerminalID> {
        let mut res = self.sequence(beta);
        if res.swap_remove(&TerminalID::EPSILON) {
            res.insert(la);
        }
        res
    }
}

fn sequence_first(
    map: &Map<SymbolID, Set<TerminalID>>,
    symbols: &[SymbolID],
) -> Set<TerminalID> {
    let mut res = Set::default();
    for symbol in symbols {
        let first = map.get(symbol).expect("unexpected symbol");
        res.extend(first.iter().copied().filter(|t| *t != TerminalID::EPSILON));
        if !first.contains(&TerminalID::EPSILON) {
            return res;
        }
    }
    res.insert(TerminalID::EPSILON);
    res
}

fn sweep(grammar: &Grammar, map: &mut Map<SymbolID, Set<TerminalID>>) -> bool {
    let mut changed = false;
    for (_, rule) in grammar.rules() {
        let addition = sequence_first(map, rule.right());
        let target = map
            .get_mut(&SymbolID::N(rule.left()))
            .expect("unexpected symbol");
        for t in addition {
            changed |= target.insert(t);
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::NonterminalID;
    use crate::grammar::SymbolID::{N, T};

    struct Fixture {
        grammar: Grammar,
    }

    impl Fixture {
        fn t(&self, name: &str) -> TerminalID {
            self.grammar.terminal_id(name).unwrap()
        }

        fn n(&self, name: &str) -> NonterminalID {
            self.grammar.nonterminal_id(name).unwrap()
        }
    }

    // E := E plus T | T ; T := T star F | F ; F := lparen E rparen | id
    fn arithmetic() -> Fixture {
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
        Fixture { grammar }
    }

    // S := A B c ; A := a | ε ; B := A A
    fn nullable() -> Fixture {
        let grammar = Grammar::define(|g| {
            let a = g.terminal("a")?;
            let c = g.terminal("c")?;

            let s = g.nonterminal("S")?;
            let na = g.nonterminal("A")?;
            let nb = g.nonterminal("B")?;

            g.start_symbol(s)?;

            g.rule(s, [N(na), N(nb), T(c)])?;
            g.rule(na, [T(a)])?;
            g.rule(na, [])?;
            g.rule(nb, [N(na), N(na)])?;

            Ok(())
        })
        .unwrap()
        .augment();
        Fixture { grammar }
    }

    #[test]
    fn terminals_begin_with_themselves() {
        let fx = arithmetic();
        let first = FirstSets::new(&fx.grammar);
        let id = fx.t("id");
        assert_eq!(
            first.first(T(id)).iter().copied().collect::<Vec<_>>(),
            vec![id]
        );
    }

    #[test]
    fn nonterminals_collect_leading_terminals() {
        let fx = arithmetic();
        let first = FirstSets::new(&fx.grammar);
        let expected: Set<TerminalID> = [fx.t("lparen"), fx.t("id")].into_iter().collect();
        for name in ["E", "T", "F"] {
            assert_eq!(first.first(N(fx.n(name))), &expected, "FIRST({})", name);
        }
    }

    #[test]
    fn epsilon_marks_exactly_the_nullable_symbols() {
        let fx = nullable();
        let first = FirstSets::new(&fx.grammar);

        // A and B derive ε directly or transitively, S does not.
        assert!(first.first(N(fx.n("A"))).contains(&TerminalID::EPSILON));
        assert!(first.first(N(fx.n("B"))).contains(&TerminalID::EPSILON));
        assert!(!first.first(N(fx.n("S"))).contains(&TerminalID::EPSILON));

        // FIRST(S) sees through the nullable prefix to c.
        assert!(first.first(N(fx.n("S"))).contains(&fx.t("c")));
    }

    #[test]
    fn solver_reaches_a_fixpoint() {
        let fx = nullable();
        let first = FirstSets::new(&fx.grammar);
        let mut map = first.map.clone();
        assert!(!sweep(&fx.grammar, &mut map));
        assert_eq!(map, first.map);
    }

    #[test]
    fn sequence_of_empty_is_epsilon() {
        let fx = nullable();
        let first = FirstSets::new(&fx.grammar);
        let seq = first.sequence(&[]);
        assert_eq!(seq.len(), 1);
        assert!(seq.contains(&TerminalID::EPSILON));
    }

    #[test]
    fn lookaheads_substitute_for_epsilon() {
        let fx = nullable();
        let first = FirstSets::new(&fx.grammar);
        let c = fx.t("c");
        let a = fx.t("a");

        // β = A is nullable, so the lookahead shows through.
        let las = first.lookaheads(&[N(fx.n("A"))], c);
        assert!(las.contains(&a));
        assert!(las.contains(&c));
        assert!(!las.contains(&TerminalID::EPSILON));

        // β = c is not, so it masks the lookahead.
        let las = first.lookaheads(&[T(c)], a);
        assert!(las.contains(&c));
        assert!(!las.contains(&a));
    }
}
