//! The built-in source language: declarations, assignment, `while`/`if`
//! control flow, `scanf`/`printf` and boolean/arithmetic expressions,
//! together with the semantic actions that translate it to quadruples.
//!
//! The grammar is declared in one place through the validated builder and
//! the actions live in a fixed-size table addressed by production index,
//! so the two line up by construction order.

use crate::grammar::{Grammar, GrammarError};
use quadrille_runtime::engine::{ActionFn, Token};
use quadrille_runtime::ir::{ResultSlot, SemanticError, TranslationContext, Ty};

/// Build the source-language grammar. Production indices follow the
/// declaration order below and address the entries of [`ACTIONS`].
pub fn grammar() -> Result<Grammar, GrammarError> {
    use crate::grammar::SymbolID::{N, T};

    Grammar::define(|g| {
        let t_int = g.terminal("int")?;
        let t_double = g.terminal("double")?;
        let t_scanf = g.terminal("scanf")?;
        let t_printf = g.terminal("printf")?;
        let t_if = g.terminal("if")?;
        let t_then = g.terminal("then")?;
        let t_while = g.terminal("while")?;
        let t_do = g.terminal("do")?;
        let t_comma = g.terminal(",")?;
        let t_semi = g.terminal(";")?;
        let t_plus = g.terminal("+")?;
        let t_minus = g.terminal("-")?;
        let t_star = g.terminal("*")?;
        let t_slash = g.terminal("/")?;
        let t_assign = g.terminal("=")?;
        let t_eq = g.terminal("==")?;
        let t_ne = g.terminal("!=")?;
        let t_lt = g.terminal("<")?;
        let t_le = g.terminal("<=")?;
        let t_gt = g.terminal(">")?;
        let t_ge = g.terminal(">=")?;
        let t_lparen = g.terminal("(")?;
        let t_rparen = g.terminal(")")?;
        let t_lbrace = g.terminal("{")?;
        let t_rbrace = g.terminal("}")?;
        let t_not = g.terminal("!")?;
        let t_and = g.terminal("&&")?;
        let t_or = g.terminal("||")?;
        let t_id = g.terminal("id")?;
        let t_uint = g.terminal("UINT")?;
        let t_ufloat = g.terminal("UFLOAT")?;

        let prog = g.nonterminal("PROG")?;
        let subprog = g.nonterminal("SUBPROG")?;
        let m = g.nonterminal("M")?;
        let n = g.nonterminal("N")?;
        let variables = g.nonterminal("VARIABLES")?;
        let statement = g.nonterminal("STATEMENT")?;
        let variable = g.nonterminal("VARIABLE")?;
        let ty = g.nonterminal("T")?;
        let assign = g.nonterminal("ASSIGN")?;
        let scanf = g.nonterminal("SCANF")?;
        let printf = g.nonterminal("PRINTF")?;
        let list = g.nonterminal("L")?;
        let b = g.nonterminal("B")?;
        let expr = g.nonterminal("EXPR")?;
        let oritem = g.nonterminal("ORITEM")?;
        let anditem = g.nonterminal("ANDITEM")?;
        let relitem = g.nonterminal("RELITEM")?;
        let noitem = g.nonterminal("NOITEM")?;
        let item = g.nonterminal("ITEM")?;
        let factor = g.nonterminal("FACTOR")?;
        let borterm = g.nonterminal("BORTERM")?;
        let bandterm = g.nonterminal("BANDTERM")?;
        let plus_minus = g.nonterminal("PLUS_MINUS")?;
        let mul_div = g.nonterminal("MUL_DIV")?;
        let rel = g.nonterminal("REL")?;
        let scanf_begin = g.nonterminal("SCANF_BEGIN")?;
        let printf_begin = g.nonterminal("PRINTF_BEGIN")?;
        let id = g.nonterminal("ID")?;
        let bfactor = g.nonterminal("BFACTOR")?;

        g.start_symbol(prog)?;

        g.rule(prog, [N(subprog)])?; // 0
        g.rule(subprog, [N(m), N(variables), N(statement)])?; // 1
        g.rule(m, [])?; // 2
        g.rule(n, [])?; // 3
        g.rule(variables, [N(variables), N(variable), T(t_semi)])?; // 4
        g.rule(variables, [N(variable), T(t_semi)])?; // 5
        g.rule(ty, [T(t_int)])?; // 6
        g.rule(ty, [T(t_double)])?; // 7
        g.rule(id, [T(t_id)])?; // 8
        g.rule(variable, [N(ty), N(id)])?; // 9
        g.rule(variable, [N(variable), T(t_comma), N(id)])?; // 10
        g.rule(statement, [N(assign)])?; // 11
        g.rule(statement, [N(scanf)])?; // 12
        g.rule(statement, [N(printf)])?; // 13
        g.rule(statement, [])?; // 14
        g.rule(statement, [T(t_lbrace), N(list), T(t_semi), T(t_rbrace)])?; // 15
        g.rule(
            statement,
            [T(t_while), N(n), N(b), T(t_do), N(n), N(statement)],
        )?; // 16
        g.rule(statement, [T(t_if), N(b), T(t_then), N(n), N(statement)])?; // 17
        g.rule(assign, [N(id), T(t_assign), N(expr)])?; // 18
        g.rule(list, [N(list), T(t_semi), N(n), N(statement)])?; // 19
        g.rule(list, [N(statement)])?; // 20
        g.rule(expr, [N(expr), T(t_or), N(oritem)])?; // 21
        g.rule(expr, [N(oritem)])?; // 22
        g.rule(oritem, [N(oritem), T(t_and), N(anditem)])?; // 23
        g.rule(oritem, [N(anditem)])?; // 24
        g.rule(anditem, [N(noitem)])?; // 25
        g.rule(anditem, [T(t_not), N(noitem)])?; // 26
        g.rule(noitem, [N(noitem), N(rel), N(relitem)])?; // 27
        g.rule(noitem, [N(relitem)])?; // 28
        g.rule(relitem, [N(relitem), N(plus_minus), N(item)])?; // 29
        g.rule(relitem, [N(item)])?; // 30
        g.rule(item, [N(factor)])?; // 31
        g.rule(item, [N(item), N(mul_div), N(factor)])?; // 32
        g.rule(factor, [N(id)])?; // 33
        g.rule(factor, [T(t_uint)])?; // 34
        g.rule(factor, [T(t_ufloat)])?; // 35
        g.rule(factor, [T(t_lparen), N(expr), T(t_rparen)])?; // 36
        g.rule(factor, [N(plus_minus), N(factor)])?; // 37
        g.rule(b, [N(b), T(t_or), N(n), N(borterm)])?; // 38
        g.rule(b, [N(borterm)])?; // 39
        g.rule(borterm, [N(borterm), T(t_and), N(n), N(bandterm)])?; // 40
        g.rule(borterm, [N(bandterm)])?; // 41
        g.rule(bandterm, [T(t_lparen), N(b), T(t_rparen)])?; // 42
        g.rule(bandterm, [T(t_not), N(bandterm)])?; // 43
        g.rule(bandterm, [N(bfactor), N(rel), N(bfactor)])?; // 44
        g.rule(bandterm, [N(bfactor)])?; // 45
        g.rule(bfactor, [T(t_uint)])?; // 46
        g.rule(bfactor, [T(t_ufloat)])?; // 47
        g.rule(bfactor, [N(id)])?; // 48
        g.rule(plus_minus, [T(t_plus)])?; // 49
        g.rule(plus_minus, [T(t_minus)])?; // 50
        g.rule(mul_div, [T(t_star)])?; // 51
        g.rule(mul_div, [T(t_slash)])?; // 52
        g.rule(rel, [T(t_eq)])?; // 53
        g.rule(rel, [T(t_ne)])?; // 54
        g.rule(rel, [T(t_lt)])?; // 55
        g.rule(rel, [T(t_le)])?; // 56
        g.rule(rel, [T(t_gt)])?; // 57
        g.rule(rel, [T(t_ge)])?; // 58
        g.rule(scanf, [N(scanf_begin), T(t_rparen)])?; // 59
        g.rule(scanf_begin, [N(scanf_begin), T(t_comma), N(id)])?; // 60
        g.rule(scanf_begin, [T(t_scanf), T(t_lparen), N(id)])?; // 61
        g.rule(printf, [N(printf_begin), T(t_rparen)])?; // 62
        g.rule(printf_begin, [T(t_printf), T(t_lparen), N(id)])?; // 63
        g.rule(printf_begin, [N(printf_begin), T(t_comma), N(id)])?; // 64

        Ok(())
    })
}

/// Map one scanner pair onto a parser token: literal and identifier
/// categories collapse onto their terminal class, anything else is the
/// terminal spelled by the lexeme itself.
pub fn token(lexeme: &str, category: &str) -> Token {
    match category {
        "IDENT" => Token::new("id", lexeme),
        "INT" => Token::new("UINT", lexeme),
        "DOUBLE" => Token::new("UFLOAT", lexeme),
        _ => Token::new(lexeme, lexeme),
    }
}

// ---- semantic actions ----

fn nothing(_cx: &mut TranslationContext) -> Result<(), SemanticError> {
    Ok(())
}

// SUBPROG := M VARIABLES STATEMENT
// Resolve the pending exits of the program body to the End quad.
fn finish_program(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let pending = cx.arg(2).nextlist;
    let target = cx.next_quad();
    cx.backpatch(pending, target)?;
    cx.gen("End", "-", "-", ResultSlot::None);
    Ok(())
}

// M := ε
fn reset_offset(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    cx.set_offset(0);
    Ok(())
}

// N := ε — snapshot the index of the next quad to be generated.
fn mark_quad(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let quad = cx.next_quad();
    cx.result_mut().quad = Some(quad);
    Ok(())
}

// T := int | double
fn type_int(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let result = cx.result_mut();
    result.ty = Some(Ty::Int);
    result.width = Some(Ty::Int.width());
    Ok(())
}

fn type_double(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let result = cx.result_mut();
    result.ty = Some(Ty::Double);
    result.width = Some(Ty::Double.width());
    Ok(())
}

// ID := id
fn capture_id(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let text = cx.arg(0).text()?.to_owned();
    cx.result_mut().name = Some(text);
    Ok(())
}

fn declare(cx: &mut TranslationContext, id_slot: usize) -> Result<(), SemanticError> {
    let name = cx.arg(id_slot).ident()?.to_owned();
    let ty = cx.arg(0).ty()?;
    let width = cx.arg(0).width()?;
    let offset = cx.offset();
    cx.enter(&name, ty, offset);
    cx.advance_offset(width);
    let result = cx.result_mut();
    result.ty = Some(ty);
    result.width = Some(width);
    Ok(())
}

// VARIABLE := T ID
fn declare_first(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    declare(cx, 1)
}

// VARIABLE := VARIABLE , ID — the declared type rides along the list head.
fn declare_more(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    declare(cx, 2)
}

// STATEMENT := ASSIGN | SCANF | PRINTF | ε — nothing pending afterwards.
fn empty_nextlist(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let empty = cx.mklist(None)?;
    cx.result_mut().nextlist = empty;
    Ok(())
}

// STATEMENT := { L ; }
fn block(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let pending = cx.arg(1).nextlist;
    cx.result_mut().nextlist = pending;
    Ok(())
}

// STATEMENT := while N B do N STATEMENT
fn while_loop(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let cond_quad = cx.arg(1).quad()?;
    let cond_true = cx.arg(2).truelist;
    let cond_false = cx.arg(2).falselist;
    let body_quad = cx.arg(4).quad()?;
    let body_next = cx.arg(5).nextlist;

    cx.backpatch(body_next, cond_quad)?;
    cx.backpatch(cond_true, body_quad)?;
    cx.result_mut().nextlist = cond_false;
    cx.gen("j", "-", "-", ResultSlot::Target(cond_quad));
    Ok(())
}

// STATEMENT := if B then N STATEMENT
fn if_statement(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let cond_true = cx.arg(1).truelist;
    let cond_false = cx.arg(1).falselist;
    let then_quad = cx.arg(3).quad()?;
    let body_next = cx.arg(4).nextlist;

    cx.backpatch(cond_true, then_quad)?;
    let pending = cx.merge(cond_false, body_next)?;
    cx.result_mut().nextlist = pending;
    Ok(())
}

// ASSIGN := ID = EXPR
fn assign(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let name = cx.arg(0).ident()?.to_owned();
    let value = cx.arg(2).place()?;
    let value_name = cx.entry(value)?.name.clone();
    let target = cx.lookup(&name)?;
    let target_name = cx.entry(target)?.name.clone();
    cx.gen("=", value_name, "-", ResultSlot::Name(target_name));
    Ok(())
}

// L := L ; N STATEMENT — the earlier statements fall through to here.
fn sequence_append(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let pending = cx.arg(0).nextlist;
    let here = cx.arg(2).quad()?;
    let tail = cx.arg(3).nextlist;
    cx.backpatch(pending, here)?;
    cx.result_mut().nextlist = tail;
    Ok(())
}

// L := STATEMENT
fn sequence_first(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let pending = cx.arg(0).nextlist;
    cx.result_mut().nextlist = pending;
    Ok(())
}

fn emit_binary(cx: &mut TranslationContext, op: String, ty: Ty) -> Result<(), SemanticError> {
    let left = cx.arg(0).place()?;
    let right = cx.arg(2).place()?;
    let left_name = cx.entry(left)?.name.clone();
    let right_name = cx.entry(right)?.name.clone();
    let temp = cx.newtemp(ty);
    let temp_name = cx.entry(temp)?.name.clone();
    cx.gen(op, left_name, right_name, ResultSlot::Name(temp_name));
    let result = cx.result_mut();
    result.place = Some(temp);
    result.ty = Some(ty);
    Ok(())
}

// EXPR := EXPR || ORITEM
fn value_or(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    emit_binary(cx, "||".to_owned(), Ty::Int)
}

// ORITEM := ORITEM && ANDITEM
fn value_and(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    emit_binary(cx, "&&".to_owned(), Ty::Int)
}

// ANDITEM := ! NOITEM
fn value_not(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let operand = cx.arg(1).place()?;
    let operand_name = cx.entry(operand)?.name.clone();
    let temp = cx.newtemp(Ty::Int);
    let temp_name = cx.entry(temp)?.name.clone();
    cx.gen("!", operand_name, "-", ResultSlot::Name(temp_name));
    let result = cx.result_mut();
    result.place = Some(temp);
    result.ty = Some(Ty::Int);
    Ok(())
}

// NOITEM := NOITEM REL RELITEM — a relation used as a value.
fn value_relation(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let op = cx.arg(1).op()?.to_owned();
    emit_binary(cx, op, Ty::Int)
}

// RELITEM := RELITEM PLUS_MINUS ITEM
fn add_sub(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let op = cx.arg(1).op()?.to_owned();
    let ty = cx.arg(0).ty()?;
    emit_binary(cx, op, ty)
}

// ITEM := ITEM MUL_DIV FACTOR
fn mul_div(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let op = cx.arg(1).op()?.to_owned();
    let ty = cx.arg(2).ty()?;
    emit_binary(cx, op, ty)
}

// Unit productions: the result slot is the operand slot, so `place`,
// `ty` and the pending lists are already in position.
fn propagate(_cx: &mut TranslationContext) -> Result<(), SemanticError> {
    Ok(())
}

// FACTOR := ID | BFACTOR := ID
fn load_variable(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let name = cx.arg(0).ident()?.to_owned();
    let place = cx.lookup(&name)?;
    let ty = cx.entry(place)?.ty;
    let result = cx.result_mut();
    result.place = Some(place);
    result.ty = Some(ty);
    Ok(())
}

fn load_literal(cx: &mut TranslationContext, ty: Ty) -> Result<(), SemanticError> {
    let text = cx.arg(0).text()?.to_owned();
    let temp = cx.newtemp(ty);
    cx.note_literal(temp, &text)?;
    let temp_name = cx.entry(temp)?.name.clone();
    cx.gen("=", text, "-", ResultSlot::Name(temp_name));
    let result = cx.result_mut();
    result.place = Some(temp);
    result.ty = Some(ty);
    Ok(())
}

// FACTOR := UINT | BFACTOR := UINT
fn load_int(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    load_literal(cx, Ty::Int)
}

// FACTOR := UFLOAT | BFACTOR := UFLOAT
fn load_float(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    load_literal(cx, Ty::Double)
}

// FACTOR := ( EXPR )
fn grouped_value(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let place = cx.arg(1).place;
    let ty = cx.arg(1).ty;
    let result = cx.result_mut();
    result.place = place;
    result.ty = ty;
    Ok(())
}

// FACTOR := PLUS_MINUS FACTOR — unary sign as `0 op x`.
fn unary_sign(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let op = cx.arg(0).op()?.to_owned();
    let operand = cx.arg(1).place()?;
    let ty = cx.arg(1).ty()?;
    let operand_name = cx.entry(operand)?.name.clone();
    let temp = cx.newtemp(ty);
    let temp_name = cx.entry(temp)?.name.clone();
    cx.gen(op, "0", operand_name, ResultSlot::Name(temp_name));
    let result = cx.result_mut();
    result.place = Some(temp);
    result.ty = Some(ty);
    Ok(())
}

// B := B || N BORTERM — if the left side is false, retry at the right.
fn cond_or(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let left_false = cx.arg(0).falselist;
    let left_true = cx.arg(0).truelist;
    let right_quad = cx.arg(2).quad()?;
    let right_true = cx.arg(3).truelist;
    let right_false = cx.arg(3).falselist;

    cx.backpatch(left_false, right_quad)?;
    let truelist = cx.merge(left_true, right_true)?;
    let result = cx.result_mut();
    result.truelist = truelist;
    result.falselist = right_false;
    Ok(())
}

// BORTERM := BORTERM && N BANDTERM — if the left side is true, go on.
fn cond_and(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let left_true = cx.arg(0).truelist;
    let left_false = cx.arg(0).falselist;
    let right_quad = cx.arg(2).quad()?;
    let right_true = cx.arg(3).truelist;
    let right_false = cx.arg(3).falselist;

    cx.backpatch(left_true, right_quad)?;
    let falselist = cx.merge(left_false, right_false)?;
    let result = cx.result_mut();
    result.falselist = falselist;
    result.truelist = right_true;
    Ok(())
}

// BANDTERM := ( B )
fn cond_group(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let truelist = cx.arg(1).truelist;
    let falselist = cx.arg(1).falselist;
    let result = cx.result_mut();
    result.truelist = truelist;
    result.falselist = falselist;
    Ok(())
}

// BANDTERM := ! BANDTERM
fn cond_not(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let truelist = cx.arg(1).falselist;
    let falselist = cx.arg(1).truelist;
    let result = cx.result_mut();
    result.truelist = truelist;
    result.falselist = falselist;
    Ok(())
}

// BANDTERM := BFACTOR REL BFACTOR — a conditional jump with both exits
// pending until the surrounding construct knows the targets.
fn cond_relation(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let left = cx.arg(0).place()?;
    let right = cx.arg(2).place()?;
    let op = cx.arg(1).op()?.to_owned();
    let left_name = cx.entry(left)?.name.clone();
    let right_name = cx.entry(right)?.name.clone();

    let on_true = cx.gen(format!("j{}", op), left_name, right_name, ResultSlot::Unset);
    let on_false = cx.gen("j", "-", "-", ResultSlot::Unset);
    let truelist = cx.mklist(Some(on_true))?;
    let falselist = cx.mklist(Some(on_false))?;
    let result = cx.result_mut();
    result.truelist = truelist;
    result.falselist = falselist;
    Ok(())
}

// BANDTERM := BFACTOR — nonzero means true.
fn cond_value(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    let place = cx.arg(0).place()?;
    let place_name = cx.entry(place)?.name.clone();

    let on_true = cx.gen("jnz", place_name, "-", ResultSlot::Unset);
    let on_false = cx.gen("j", "-", "-", ResultSlot::Unset);
    let truelist = cx.mklist(Some(on_true))?;
    let falselist = cx.mklist(Some(on_false))?;
    let result = cx.result_mut();
    result.truelist = truelist;
    result.falselist = falselist;
    Ok(())
}

fn set_op(cx: &mut TranslationContext, op: &str) -> Result<(), SemanticError> {
    cx.result_mut().op = Some(op.to_owned());
    Ok(())
}

fn op_plus(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    set_op(cx, "+")
}

fn op_minus(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    set_op(cx, "-")
}

fn op_star(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    set_op(cx, "*")
}

fn op_slash(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    set_op(cx, "/")
}

fn op_eq(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    set_op(cx, "==")
}

fn op_ne(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    set_op(cx, "!=")
}

fn op_lt(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    set_op(cx, "<")
}

fn op_le(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    set_op(cx, "<=")
}

fn op_gt(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    set_op(cx, ">")
}

fn op_ge(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    set_op(cx, ">=")
}

fn emit_io(cx: &mut TranslationContext, op: &str) -> Result<(), SemanticError> {
    let name = cx.arg(2).ident()?.to_owned();
    let place = cx.lookup(&name)?;
    let entry_name = cx.entry(place)?.name.clone();
    cx.gen(op, "-", "-", ResultSlot::Name(entry_name));
    Ok(())
}

// SCANF_BEGIN := scanf ( ID | SCANF_BEGIN , ID
fn read_id(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    emit_io(cx, "R")
}

// PRINTF_BEGIN := printf ( ID | PRINTF_BEGIN , ID
fn write_id(cx: &mut TranslationContext) -> Result<(), SemanticError> {
    emit_io(cx, "W")
}

/// The semantic action of every production, addressed by production
/// index. One entry per grammar rule, in declaration order.
pub static ACTIONS: [ActionFn; 65] = [
    nothing,         // 0: PROG := SUBPROG
    finish_program,  // 1: SUBPROG := M VARIABLES STATEMENT
    reset_offset,    // 2: M := ε
    mark_quad,       // 3: N := ε
    nothing,         // 4: VARIABLES := VARIABLES VARIABLE ;
    nothing,         // 5: VARIABLES := VARIABLE ;
    type_int,        // 6: T := int
    type_double,     // 7: T := double
    capture_id,      // 8: ID := id
    declare_first,   // 9: VARIABLE := T ID
    declare_more,    // 10: VARIABLE := VARIABLE , ID
    empty_nextlist,  // 11: STATEMENT := ASSIGN
    empty_nextlist,  // 12: STATEMENT := SCANF
    empty_nextlist,  // 13: STATEMENT := PRINTF
    empty_nextlist,  // 14: STATEMENT := ε
    block,           // 15: STATEMENT := { L ; }
    while_loop,      // 16: STATEMENT := while N B do N STATEMENT
    if_statement,    // 17: STATEMENT := if B then N STATEMENT
    assign,          // 18: ASSIGN := ID = EXPR
    sequence_append, // 19: L := L ; N STATEMENT
    sequence_first,  // 20: L := STATEMENT
    value_or,        // 21: EXPR := EXPR || ORITEM
    propagate,       // 22: EXPR := ORITEM
    value_and,       // 23: ORITEM := ORITEM && ANDITEM
    propagate,       // 24: ORITEM := ANDITEM
    propagate,       // 25: ANDITEM := NOITEM
    value_not,       // 26: ANDITEM := ! NOITEM
    value_relation,  // 27: NOITEM := NOITEM REL RELITEM
    propagate,       // 28: NOITEM := RELITEM
    add_sub,         // 29: RELITEM := RELITEM PLUS_MINUS ITEM
    propagate,       // 30: RELITEM := ITEM
    propagate,       // 31: ITEM := FACTOR
    mul_div,         // 32: ITEM := ITEM MUL_DIV FACTOR
    load_variable,   // 33: FACTOR := ID
    load_int,        // 34: FACTOR := UINT
    load_float,      // 35: FACTOR := UFLOAT
    grouped_value,   // 36: FACTOR := ( EXPR )
    unary_sign,      // 37: FACTOR := PLUS_MINUS FACTOR
    cond_or,         // 38: B := B || N BORTERM
    propagate,       // 39: B := BORTERM
    cond_and,        // 40: BORTERM := BORTERM && N BANDTERM
    propagate,       // 41: BORTERM := BANDTERM
    cond_group,      // 42: BANDTERM := ( B )
    cond_not,        // 43: BANDTERM := ! BANDTERM
    cond_relation,   // 44: BANDTERM := BFACTOR REL BFACTOR
    cond_value,      // 45: BANDTERM := BFACTOR
    load_int,        // 46: BFACTOR := UINT
    load_float,      // 47: BFACTOR := UFLOAT
    load_variable,   // 48: BFACTOR := ID
    op_plus,         // 49: PLUS_MINUS := +
    op_minus,        // 50: PLUS_MINUS := -
    op_star,         // 51: MUL_DIV := *
    op_slash,        // 52: MUL_DIV := /
    op_eq,           // 53: REL := ==
    op_ne,           // 54: REL := !=
    op_lt,           // 55: REL := <
    op_le,           // 56: REL := <=
    op_gt,           // 57: REL := >
    op_ge,           // 58: REL := >=
    nothing,         // 59: SCANF := SCANF_BEGIN )
    read_id,         // 60: SCANF_BEGIN := SCANF_BEGIN , ID
    read_id,         // 61: SCANF_BEGIN := scanf ( ID
    nothing,         // 62: PRINTF := PRINTF_BEGIN )
    write_id,        // 63: PRINTF_BEGIN := printf ( ID
    write_id,        // 64: PRINTF_BEGIN := PRINTF_BEGIN , ID
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_action_per_production() {
        let grammar = grammar().unwrap();
        assert_eq!(grammar.rule_count(), ACTIONS.len());
    }

    #[test]
    fn token_categories_map_onto_terminal_classes() {
        assert_eq!(token("x", "IDENT").terminal, "id");
        assert_eq!(token("3", "INT").terminal, "UINT");
        assert_eq!(token("1.5", "DOUBLE").terminal, "UFLOAT");
        assert_eq!(token("while", "KW").terminal, "while");
        assert_eq!(token("x", "IDENT").lexeme, "x");
    }
}
