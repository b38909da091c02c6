use quadrille::{
    codec,
    driver::TableDef,
    first_sets::FirstSets,
    grammar::{
        Grammar, GrammarDef, GrammarError,
        SymbolID::{N, T},
    },
    lr1::Automaton,
    parse_table::ParseTable,
};
use quadrille_runtime::engine::{Driver, NoActions, ParseError, SemanticActions, Token};
use quadrille_runtime::ir::{SemanticError, TranslationContext};

fn build(f: impl FnOnce(&mut GrammarDef) -> Result<(), GrammarError>) -> (Grammar, ParseTable) {
    let grammar = Grammar::define(f).unwrap().augment();
    let first_sets = FirstSets::new(&grammar);
    let automaton = Automaton::generate(&grammar, &first_sets).unwrap();
    let table = ParseTable::generate(&automaton, &grammar).unwrap();
    (grammar, table)
}

fn tok(terminal: &str) -> Token {
    Token::new(terminal, terminal)
}

// S := a A a A b | a B b ; A := a ; B := a — after `a a` the choice
// between reducing A and B is made by the lookahead alone.
fn lookahead_grammar(g: &mut GrammarDef) -> Result<(), GrammarError> {
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
}

#[test]
fn lookahead_grammar_accepts_the_short_form() {
    let (grammar, table) = build(lookahead_grammar);
    let mut driver = Driver::new(TableDef::new(&grammar, &table), NoActions);
    driver.parse(["a", "a", "b"].map(tok)).unwrap();
}

#[test]
fn lookahead_grammar_accepts_the_long_form() {
    let (grammar, table) = build(lookahead_grammar);
    let mut driver = Driver::new(TableDef::new(&grammar, &table), NoActions);
    driver.parse(["a", "a", "a", "a", "b"].map(tok)).unwrap();
}

#[test]
fn lookahead_grammar_rejects_between_the_forms() {
    let (grammar, table) = build(lookahead_grammar);
    let mut driver = Driver::new(TableDef::new(&grammar, &table), NoActions);
    let err = driver.parse(["a", "a", "a", "b"].map(tok)).unwrap_err();
    assert!(matches!(err, ParseError::Syntax { .. }));
}

/// Records the reduce sequence, leaving the attributes untouched.
#[derive(Default)]
struct Recorder {
    reduces: Vec<usize>,
}

impl SemanticActions for Recorder {
    fn on_reduce(
        &mut self,
        production: usize,
        _: &mut TranslationContext,
    ) -> Result<(), SemanticError> {
        self.reduces.push(production);
        Ok(())
    }
}

// E := E + T | T ; T := T * F | F ; F := ( E ) | id
fn arithmetic_grammar(g: &mut GrammarDef) -> Result<(), GrammarError> {
    let plus = g.terminal("+")?;
    let star = g.terminal("*")?;
    let lparen = g.terminal("(")?;
    let rparen = g.terminal(")")?;
    let id = g.terminal("id")?;

    let e = g.nonterminal("E")?;
    let t = g.nonterminal("T")?;
    let f = g.nonterminal("F")?;

    g.start_symbol(e)?;

    g.rule(e, [N(e), T(plus), N(t)])?; // 0
    g.rule(e, [N(t)])?; // 1
    g.rule(t, [N(t), T(star), N(f)])?; // 2
    g.rule(t, [N(f)])?; // 3
    g.rule(f, [T(lparen), N(e), T(rparen)])?; // 4
    g.rule(f, [T(id)])?; // 5

    Ok(())
}

#[test]
fn star_binds_tighter_than_plus() {
    let (grammar, table) = build(arithmetic_grammar);
    let mut driver = Driver::new(TableDef::new(&grammar, &table), Recorder::default());

    driver.parse(["id", "+", "id", "*", "id"].map(tok)).unwrap();

    // F:=id T:=F E:=T / F:=id T:=F / F:=id T:=T*F / E:=E+T
    let reduces = &driver.actions().reduces;
    assert_eq!(reduces, &[5, 3, 1, 5, 3, 5, 2, 0]);

    // The multiplication is reduced before the addition.
    let star = reduces.iter().position(|&r| r == 2).unwrap();
    let plus = reduces.iter().position(|&r| r == 0).unwrap();
    assert!(star < plus);
}

#[test]
fn parenthesized_input_drives_the_inner_reduction_first() {
    let (grammar, table) = build(arithmetic_grammar);
    let mut driver = Driver::new(TableDef::new(&grammar, &table), Recorder::default());

    driver
        .parse(["(", "id", "+", "id", ")", "*", "id"].map(tok))
        .unwrap();

    let reduces = &driver.actions().reduces;
    let addition = reduces.iter().position(|&r| r == 0).unwrap();
    let grouping = reduces.iter().position(|&r| r == 4).unwrap();
    let multiplication = reduces.iter().position(|&r| r == 2).unwrap();
    assert!(addition < grouping);
    assert!(grouping < multiplication);
}

#[test]
fn reloaded_table_drives_the_same_parse() {
    let (grammar, table) = build(arithmetic_grammar);

    let text = codec::encode(&grammar, &table);
    let reloaded = codec::decode(&grammar, &text).unwrap();
    assert_eq!(reloaded, table);

    let mut driver = Driver::new(TableDef::new(&grammar, &reloaded), NoActions);
    driver
        .parse(["id", "*", "(", "id", "+", "id", ")"].map(tok))
        .unwrap();
}
