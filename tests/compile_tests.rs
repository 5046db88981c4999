//! End-to-end tests for the Slate compiler.
//!
//! Programs are built with `AstBuilder` the way the external parser would
//! and compiled through the public entry points.

use slate::compiler::{CompilationContext, InstructionEmitter, StmtCompiler};
use slate::ir::{AssignOp, Stmt};
use slate::prelude::*;

fn entry<'ast>(decl: FunctionDecl<'ast>) -> FunctionDecl<'ast> {
    FunctionDecl {
        attributes: FunctionAttributes::ENTRY,
        ..decl
    }
}

fn ops(code: &[Instruction]) -> Vec<OpCode> {
    code.iter().map(|i| i.op).collect()
}

/// Assert every `Call` lands on a recorded function entry.
fn assert_calls_resolved(program: &CompiledProgram) {
    for (index, instruction) in program.instructions.iter().enumerate() {
        if instruction.op != OpCode::Call {
            continue;
        }
        assert!(instruction.operand0.is_some(), "unpatched call at {index}");
        let target = instruction.target(index).unwrap();
        assert!(target < program.instructions.len());
        assert!(
            program.function_offsets.values().any(|entry| *entry == target),
            "call at {index} targets {target}, which is no function entry"
        );
    }
}

// =============================================================================
// Calls
// =============================================================================

#[test]
fn test_every_call_targets_an_entry() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);

    let init = b.function(
        "init",
        &[("start", "int")],
        "void",
        &[b.assign(b.field(b.var_ref("this"), "n"), b.var_ref("start"))],
    );
    let get = b.function("get", &[], "int", &[b.ret(Some(b.field(b.var_ref("this"), "n")))]);
    let counter = b.type_decl("Counter", &[("n", "int")], &[init, get]);

    let fib = b.function(
        "fib",
        &[("n", "int")],
        "int",
        &[
            b.if_(
                b.binary(b.var_ref("n"), BinaryOp::Less, b.int(2)),
                &[b.ret(Some(b.var_ref("n")))],
                None,
            ),
            b.ret(Some(b.binary(
                b.call("fib", &[b.binary(b.var_ref("n"), BinaryOp::Sub, b.int(1))]),
                BinaryOp::Add,
                b.call("fib", &[b.binary(b.var_ref("n"), BinaryOp::Sub, b.int(2))]),
            ))),
        ],
    );
    let main = entry(b.function(
        "main",
        &[],
        "void",
        &[
            b.var(Some("Counter"), "c", Some(b.new_obj("Counter", &[b.int(5)]))),
            b.var(Some("int"), "v", Some(b.method_call(b.var_ref("c"), "get", &[]))),
            b.expr(b.call("fib", &[b.var_ref("v")])),
        ],
    ));
    let program = b.program(&[b.fn_item(main), b.class_item(counter), b.fn_item(fib)]);

    let output = Compiler::default()
        .compile("main.sl", program, &mut NoImports)
        .unwrap();

    assert!(output.is_valid(), "{:?}", output.diagnostics.errors());
    assert_calls_resolved(&output.program);
    assert!(output.program.entry_of("fib,int").is_some());
    assert!(output.program.entry_of("Counter.get").is_some());
    assert!(output.program.entry_of("Counter.init,int").is_some());
}

#[test]
fn test_builtin_functions_are_never_compiled() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let main = entry(b.function("main", &[], "void", &[b.expr(b.call("print", &[b.str("hi")]))]));
    let program = b.program(&[b.tag("bf", "print void string;"), b.fn_item(main)]);

    let output = Compiler::default()
        .compile("main.sl", program, &mut NoImports)
        .unwrap();

    assert!(output.is_valid());
    assert!(output.program.entry_of("print,string").is_none());
    let builtin = output
        .program
        .instructions
        .iter()
        .find(|i| i.op == OpCode::CallBuiltin)
        .unwrap();
    assert_eq!(builtin.operand0, Some(Value::string("print")));
    assert_eq!(builtin.operand1, Some(Value::Int(1)));
}

// =============================================================================
// Constant Folding
// =============================================================================

/// Lower one statement outside any function.
fn lower_statement<F>(options: CompilerOptions, build: F) -> (Vec<Instruction>, Diagnostics)
where
    F: for<'a> Fn(&AstBuilder<'a>) -> Stmt<'a>,
{
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let stmt = build(&b);
    let mut ctx = CompilationContext::new(options);
    let mut emitter = InstructionEmitter::new(false, false);
    StmtCompiler::new(&mut ctx, &mut emitter).compile(&stmt);
    (emitter.finish(), ctx.diagnostics)
}

#[test]
fn test_folded_addition_is_one_push() {
    let (code, _) = lower_statement(CompilerOptions::default(), |b| {
        b.expr(b.binary(b.int(1), BinaryOp::Add, b.int(2)))
    });

    assert_eq!(ops(&code), vec![OpCode::Push, OpCode::Pop]);
    assert_eq!(code[0].operand0, Some(Value::Int(3)));
}

#[test]
fn test_unfolded_addition_keeps_operands() {
    let (code, _) = lower_statement(CompilerOptions::unoptimized(), |b| {
        b.expr(b.binary(b.int(1), BinaryOp::Add, b.int(2)))
    });

    assert_eq!(
        ops(&code),
        vec![OpCode::Push, OpCode::Push, OpCode::Add, OpCode::Pop]
    );
    assert_eq!(code[0].operand0, Some(Value::Int(1)));
    assert_eq!(code[1].operand0, Some(Value::Int(2)));
}

#[test]
fn test_folding_does_not_change_types() {
    let compile = |options: CompilerOptions| {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let main = entry(b.function(
            "main",
            &[],
            "void",
            &[
                b.var(None, "z", Some(b.binary(b.int(2), BinaryOp::Mul, b.float(1.5)))),
                b.expr(b.call("take", &[b.var_ref("z")])),
                b.var(Some("int"), "y", Some(b.binary(b.int(2), BinaryOp::Mul, b.float(1.5)))),
                b.expr(b.call("take", &[b.binary(b.float(0.5), BinaryOp::Add, b.float(1.0))])),
            ],
        ));
        let take = b.function("take", &[("v", "float")], "void", &[]);
        let program = b.program(&[b.fn_item(main), b.fn_item(take)]);

        let output = Compiler::new(options)
            .compile("main.sl", program, &mut NoImports)
            .unwrap();
        output
            .diagnostics
            .errors()
            .iter()
            .map(|e| e.detail.to_string())
            .collect::<Vec<_>>()
    };

    let folded = compile(CompilerOptions::default());
    let unfolded = compile(CompilerOptions::unoptimized());

    assert_eq!(folded, unfolded);
    assert_eq!(folded.len(), 1);
    assert!(folded[0].contains("take(any)"), "{folded:?}");
}

// =============================================================================
// Backpatching
// =============================================================================

#[test]
fn test_pending_call_keeps_the_globals_it_saw() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let abs = FunctionDecl {
        namespace: Some("math"),
        ..b.function("abs", &[("n", "int")], "int", &[b.ret(Some(b.var_ref("n")))])
    };
    let program = b.program(&[
        b.global(Some("int"), "x", Some(b.path_call("math", "abs", &[b.int(1)]))),
        b.global(Some("int"), "math", Some(b.int(0))),
        b.fn_item(abs),
    ]);

    let output = Compiler::default()
        .compile("main.sl", program, &mut NoImports)
        .unwrap();

    assert!(output.is_valid(), "{:?}", output.diagnostics.errors());
    assert_calls_resolved(&output.program);
    let entry = output.program.entry_of("math.abs,int").unwrap();
    let call = output.program.instructions[..output.program.global_teardown_index]
        .iter()
        .enumerate()
        .find(|(_, i)| i.op == OpCode::Call)
        .map(|(index, i)| i.target(index))
        .unwrap();
    assert_eq!(call, Some(entry));
}

// =============================================================================
// Loops
// =============================================================================

#[test]
fn test_while_false_emits_nothing() {
    let (code, diagnostics) = lower_statement(CompilerOptions::default(), |b| {
        b.while_(
            b.bool(false),
            &[
                b.var(Some("int"), "x", Some(b.int(1))),
                b.compound_assign(b.var_ref("x"), AssignOp::AddAssign, b.int(1)),
            ],
        )
    });

    assert!(code.is_empty());
    assert!(
        diagnostics
            .notes()
            .iter()
            .any(|n| matches!(n.detail, Note::UnreachableCode { .. }))
    );
}

#[test]
fn test_while_true_without_break_warns() {
    let (_, diagnostics) =
        lower_statement(CompilerOptions::default(), |b| b.while_(b.bool(true), &[]));

    assert_eq!(diagnostics.warnings().len(), 1);
    assert!(matches!(
        diagnostics.warnings()[0].detail,
        CompileWarning::InfiniteLoop { .. }
    ));
}

#[test]
fn test_break_outside_loop() {
    let (code, diagnostics) = lower_statement(CompilerOptions::default(), |b| b.brk());

    assert!(code.iter().all(|i| i.op != OpCode::Jump));
    assert!(matches!(
        diagnostics.errors()[0].detail,
        CompileError::BreakOutsideLoop { .. }
    ));
}

// =============================================================================
// Scopes
// =============================================================================

#[test]
fn test_block_pops_its_locals_in_reverse() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let mut ctx = CompilationContext::new(CompilerOptions::default());
    let mut emitter = InstructionEmitter::new(false, true);

    let block = b.block(&[
        b.var(Some("int"), "a", Some(b.int(1))),
        b.var(Some("int"), "b", Some(b.int(2))),
    ]);
    let before = ctx.scope.locals().len();
    StmtCompiler::new(&mut ctx, &mut emitter).compile_block(&block);

    let code = emitter.instructions();
    let pops: Vec<_> = code.iter().filter(|i| i.op == OpCode::Pop).collect();
    assert_eq!(pops.len(), 2);
    assert_eq!(pops[1].tag.as_deref(), Some("drop b, a"));
    assert_eq!(ctx.scope.locals().len(), before);
    assert!(ctx.scope.lookup("a").is_none());
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn test_duplicate_struct_across_imports() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let root = b.program(&[
        b.using("lib"),
        b.struct_item(b.type_decl("Foo", &[("a", "int")], &[])),
    ]);
    let lib = b.program(&[b.at(3).struct_item(b.type_decl("Foo", &[("a", "int")], &[]))]);

    let mut resolver = |_: &str, _: &str| ImportResolution::Resolved {
        path: "lib.sl".to_string(),
        program: lib,
    };
    let output = Compiler::default()
        .compile("main.sl", root, &mut resolver)
        .unwrap();

    let errors = output.diagnostics.errors();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0].detail,
        CompileError::DuplicateDefinition { name, span, .. } if name == "Foo" && span.line == 3
    ));
    assert_eq!(errors[0].section.as_deref(), Some("lib.sl"));
    assert_eq!(output.program.type_named("Foo").unwrap().source_file, "main.sl");
}

#[test]
fn test_malformed_compile_tag_is_fatal() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = b.program(&[b.tag("bf", "print")]);

    let result = Compiler::default().compile("main.sl", program, &mut NoImports);

    assert!(matches!(result, Err(FatalError::MalformedCompileTag { .. })));
}

// =============================================================================
// Dead Functions
// =============================================================================

#[test]
fn test_uncalled_function_is_not_emitted() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let main = entry(b.function("main", &[], "void", &[]));
    let unused = b.function("unused", &[("x", "int")], "int", &[b.ret(Some(b.var_ref("x")))]);
    let program = b.program(&[b.fn_item(main), b.fn_item(unused)]);

    let output = Compiler::default()
        .compile("main.sl", program, &mut NoImports)
        .unwrap();

    assert!(output.program.entry_of("unused,int").is_none());
    assert!(
        output
            .program
            .debug_info
            .functions()
            .iter()
            .all(|f| f.identifier != "unused,int")
    );
    let notes = output.diagnostics.notes();
    assert_eq!(notes.len(), 1);
    assert!(notes[0].detail.to_string().contains("unused(int)"));
}

#[test]
fn test_unoptimized_keeps_uncalled_functions() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = b.program(&[b.fn_item(b.function("unused", &[], "void", &[]))]);

    let output = Compiler::new(CompilerOptions::unoptimized())
        .compile("main.sl", program, &mut NoImports)
        .unwrap();

    assert!(output.program.entry_of("unused").is_some());
    assert!(output.diagnostics.notes().is_empty());
}

// =============================================================================
// Backend
// =============================================================================

#[test]
fn test_backend_is_reusable_across_source_sets() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let first = b.program(&[b.fn_item(entry(b.function("main", &[], "void", &[])))]);
    let second = b.program(&[b.global(Some("int"), "g", Some(b.int(7)))]);

    let mut backend = BytecodeBackend::default();
    let a = backend.compile(&SourceSet::new("a.sl", first)).unwrap();
    let c = backend.compile(&SourceSet::new("b.sl", second)).unwrap();

    assert!(a.program.entry_of("main").is_some());
    assert!(c.program.entry_of("main").is_none());
    assert_eq!(c.program.global_teardown_index, 1);
}
