use std::ops::ControlFlow;

use zetri::{
    parse_program, Coordinate, Cursor, Interpreter, InterpreterOptions, RuntimeError,
    RuntimeErrorKind, StepLimit, Value, ZetriError,
};

fn run(source: &str) -> Interpreter {
    let mut interpreter = Interpreter::new();
    interpreter
        .eval_source(source)
        .expect("evaluation should succeed");
    interpreter
}

fn run_error(source: &str) -> (Interpreter, RuntimeError) {
    let mut interpreter = Interpreter::new();
    match interpreter.eval_source(source) {
        Ok(()) => panic!("expected runtime error, canvas {:?}", interpreter.canvas()),
        Err(ZetriError::Runtime(err)) => (interpreter, err),
        Err(other) => panic!("expected runtime error, received {other}"),
    }
}

fn points(raw: &[(i64, i64, i64)]) -> Vec<Coordinate> {
    raw.iter()
        .map(|&(x, y, z)| Coordinate::new(x, y, z))
        .collect()
}

#[test]
fn line_sweep_is_end_exclusive() {
    let interpreter = run(
        "ZetriScript! [0:0:0]:
            edge = LINE([0:0:0], [1:0:0], 0, 3, 1);
            edge!
         ZetriScript",
    );
    let expected = points(&[(0, 0, 0), (1, 0, 0), (2, 0, 0)]);
    assert_eq!(
        interpreter.symbols().get("edge"),
        Some(&Value::Line(expected.clone()))
    );
    assert_eq!(interpreter.canvas(), expected.as_slice());
}

#[test]
fn line_sweep_honours_offset_and_step() {
    let interpreter = run(
        "ZetriScript! [0:0:0]:
            diag = LINE([1:1:1], [1:2:3], 1, 6, 2);
            diag!
         ZetriScript",
    );
    assert_eq!(
        interpreter.canvas(),
        points(&[(2, 3, 4), (4, 7, 10), (6, 11, 16)]).as_slice()
    );
}

#[test]
fn empty_range_yields_empty_line() {
    let interpreter = run(
        "ZetriScript! [0:0:0]:
            nothing = LINE([0:0:0], [1:0:0], 4, 4, 1);
            nothing!
         ZetriScript",
    );
    assert_eq!(interpreter.symbols().get("nothing"), Some(&Value::Line(vec![])));
    assert!(interpreter.canvas().is_empty());
}

#[test]
fn bare_line_instruction_plots_points() {
    let interpreter = run(
        "ZetriScript! [0:0:0]:
            LINE([0:5:0], [0:0:1], 0, 2, 1);
            drawPixel([9:9:9])!
         ZetriScript",
    );
    assert_eq!(
        interpreter.canvas(),
        points(&[(0, 5, 0), (0, 5, 1), (9, 9, 9)]).as_slice()
    );
}

#[test]
fn zero_step_is_an_invalid_range() {
    let (interpreter, err) = run_error(
        "ZetriScript! [0:0:0]:
            edge = LINE([0:0:0], [1:0:0], 0, 3, 0);
            edge!
         ZetriScript",
    );
    assert_eq!(err.kind, RuntimeErrorKind::InvalidLineRange);
    assert!(!interpreter.symbols().contains("edge"));
}

#[test]
fn descending_range_with_positive_step_is_empty() {
    let interpreter = run(
        "ZetriScript! [0:0:0]:
            edge = LINE([0:0:0], [1:0:0], 5, 0, 1);
            edge!
         ZetriScript",
    );
    assert_eq!(interpreter.symbols().get("edge"), Some(&Value::Line(vec![])));
    assert!(interpreter.canvas().is_empty());
}

#[test]
fn fractional_step_truncating_to_zero_is_invalid() {
    let (_, err) = run_error(
        "ZetriScript! [0:0:0]:
            edge = LINE([0:0:0], [1:0:0], 0, 3, 0.5);
            edge!
         ZetriScript",
    );
    assert_eq!(err.kind, RuntimeErrorKind::InvalidLineRange);
}

#[test]
fn goto_jumps_to_matching_label() {
    let interpreter = run(
        "ZetriScript! [0:0:0]
         [5:5:5]: drawPixel([5:5:5])!
         [0:0:0]: goto [1:2:3]!
         [1:2:3]: drawPixel([1:2:3])!
         ZetriScript",
    );
    assert_eq!(interpreter.canvas(), points(&[(1, 2, 3)]).as_slice());
    assert_eq!(
        interpreter.cursor(),
        Some(Cursor {
            statement: 2,
            label: Coordinate::new(1, 2, 3)
        })
    );
    assert_eq!(interpreter.steps(), 2);
}

#[test]
fn computed_and_literal_targets_are_interchangeable() {
    let literal = run(
        "ZetriScript! [0:0:0]:
            goto [1:2:3]!
         [1:2:3]: drawPixel([7:7:7])!
         ZetriScript",
    );
    let computed = run(
        "ZetriScript! [0:0:0]:
            goto [0+1:1+1:1*3]!
         [1:2:3]: drawPixel([7:7:7])!
         ZetriScript",
    );
    assert_eq!(literal.cursor(), computed.cursor());
    assert_eq!(literal.canvas(), computed.canvas());
}

#[test]
fn goto_target_may_use_variables() {
    let interpreter = run(
        "ZetriScript! [0:0:0]:
            n = 4;
            goto [n / 2:n - 4:n * 0]!
         [2:0:0]: drawPixel([n:n:n])!
         ZetriScript",
    );
    assert_eq!(interpreter.canvas(), points(&[(4, 4, 4)]).as_slice());
}

#[test]
fn duplicate_labels_resolve_to_first_match() {
    let interpreter = run(
        "ZetriScript! [0:0:0]:
            goto [1:1:1]!
         [1:1:1]: drawPixel([1:0:0])!
         [1:1:1]: drawPixel([2:0:0])!
         ZetriScript",
    );
    assert_eq!(interpreter.canvas(), points(&[(1, 0, 0)]).as_slice());
}

#[test]
fn backward_goto_loops_until_exec() {
    let interpreter = run(
        "ZetriScript! [0:0:0]
         [1:0:0]: drawPixel([i:0:0])!
         [0:0:0]:
            i = 0;
            goto [0:0:1]!
         [0:0:1]:
            i = i + 1;
            goto [i / 3:0:1 - i / 3]!
         ZetriScript",
    );
    assert_eq!(interpreter.symbols().get("i"), Some(&Value::Number(3)));
    assert_eq!(interpreter.canvas(), points(&[(3, 0, 0)]).as_slice());
    assert_eq!(interpreter.steps(), 5);
}

#[test]
fn unmatched_goto_target_is_an_error() {
    let (interpreter, err) = run_error(
        "ZetriScript! [0:0:0]:
            goto [9:9:9]!
         ZetriScript",
    );
    assert_eq!(err.kind, RuntimeErrorKind::UnreachableGotoTarget);
    assert!(err.span.is_some());
    assert_eq!(interpreter.cursor().map(|c| c.statement), Some(0));
}

#[test]
fn missing_entry_point_is_an_error() {
    let (_, err) = run_error(
        "ZetriScript! [1:1:1]
         [0:0:0]: drawPixel([0:0:0])!
         ZetriScript",
    );
    assert_eq!(err.kind, RuntimeErrorKind::UndefinedEntryPoint);
}

#[test]
fn empty_program_has_no_entry_point() {
    let (_, err) = run_error("ZetriScript! [0:0:0] ZetriScript");
    assert_eq!(err.kind, RuntimeErrorKind::UndefinedEntryPoint);
}

#[test]
fn labels_cannot_reference_variables() {
    let (_, err) = run_error(
        "ZetriScript! [0:0:0]: n = 1; goto [n:0:0]!
         [n:0:0]: drawPixel([0:0:0])!
         ZetriScript",
    );
    assert_eq!(err.kind, RuntimeErrorKind::UndefinedVariable);
}

#[test]
fn undefined_variable_is_reported() {
    let (_, err) = run_error("ZetriScript! [0:0:0]: missing! ZetriScript");
    assert_eq!(err.kind, RuntimeErrorKind::UndefinedVariable);
    assert!(err.message.contains("missing"));
}

#[test]
fn division_by_zero_leaves_binding_untouched() {
    let (interpreter, err) = run_error(
        "ZetriScript! [0:0:0]:
            x = 5;
            x = 10 / (x - 5);
            x!
         ZetriScript",
    );
    assert_eq!(err.kind, RuntimeErrorKind::DivisionByZero);
    assert_eq!(interpreter.symbols().get("x"), Some(&Value::Number(5)));
}

#[test]
fn division_truncates_toward_zero() {
    let interpreter = run(
        "ZetriScript! [0:0:0]:
            x = 7 / 2;
            y = 0 - 7 / 2;
            drawPixel([x:y:0])!
         ZetriScript",
    );
    assert_eq!(interpreter.canvas(), points(&[(3, -3, 0)]).as_slice());
}

#[test]
fn overflow_is_an_error() {
    let (_, err) = run_error(
        "ZetriScript! [0:0:0]:
            x = 9223372036854775807 + 1;
            x!
         ZetriScript",
    );
    assert_eq!(err.kind, RuntimeErrorKind::ArithmeticOverflow);
}

#[test]
fn float_literals_truncate_in_arithmetic() {
    let interpreter = run(
        "ZetriScript! [0:0:0]:
            x = 2.9 + 1.5;
            drawPixel([x:0:0])!
         ZetriScript",
    );
    assert_eq!(interpreter.symbols().get("x"), Some(&Value::Number(3)));
}

#[test]
fn allocation_and_copy_bind_values() {
    let interpreter = run(
        "ZetriScript! [0:0:0]:
            allocSpace(buffer);
            other = allocSpace(spare);
            edge = LINE([0:0:0], [0:1:0], 0, 2, 1);
            copy = edge;
            buffer!
         ZetriScript",
    );
    let symbols = interpreter.symbols();
    assert_eq!(symbols.get("buffer"), Some(&Value::Empty));
    assert_eq!(symbols.get("other"), Some(&Value::Empty));
    assert!(!symbols.contains("spare"));
    assert_eq!(symbols.get("copy"), symbols.get("edge"));
    let names: Vec<_> = symbols.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["buffer", "other", "edge", "copy"]);
    assert!(interpreter.canvas().is_empty());
}

#[test]
fn lines_are_not_numbers() {
    let (_, err) = run_error(
        "ZetriScript! [0:0:0]:
            edge = LINE([0:0:0], [1:0:0], 0, 1, 1);
            x = edge + 1;
            x!
         ZetriScript",
    );
    assert_eq!(err.kind, RuntimeErrorKind::TypeMismatch);
}

#[test]
fn executing_a_number_is_an_error() {
    let (_, err) = run_error("ZetriScript! [0:0:0]: x = 1; x! ZetriScript");
    assert_eq!(err.kind, RuntimeErrorKind::TypeMismatch);
}

#[test]
fn step_limit_cancels_endless_loop() {
    let mut interpreter = Interpreter::with_options(InterpreterOptions {
        step_limit: Some(10),
    });
    let err = interpreter
        .eval_source("ZetriScript! [0:0:0]: allocSpace(x); goto [0:0:0]! ZetriScript")
        .expect_err("loop never exits");
    match err {
        ZetriError::Runtime(err) => assert_eq!(err.kind, RuntimeErrorKind::Cancelled),
        other => panic!("expected cancellation, received {other}"),
    }
    assert_eq!(interpreter.steps(), 10);
    assert_eq!(interpreter.cursor().map(|c| c.statement), Some(0));
}

#[test]
fn closure_hooks_observe_every_statement() {
    let program = parse_program(
        "ZetriScript! [0:0:0]:
            goto [0:0:1]!
         [0:0:1]: goto [0:0:2]!
         [0:0:2]: drawPixel([0:0:0])!
         ZetriScript",
    )
    .expect("parse should succeed");
    let mut visited = Vec::new();
    let mut hook = |_step: u64, cursor: &Cursor| {
        visited.push(cursor.label.z);
        ControlFlow::Continue(())
    };
    let mut interpreter = Interpreter::new();
    interpreter
        .execute_with_hook(&program, &mut hook)
        .expect("execution should succeed");
    assert_eq!(visited, vec![0, 1, 2]);
}

#[test]
fn explicit_step_limit_hook() {
    let program = parse_program("ZetriScript! [0:0:0]: goto [0:0:0]! ZetriScript")
        .expect("parse should succeed");
    let mut interpreter = Interpreter::new();
    let err = interpreter
        .execute_with_hook(&program, &mut StepLimit(3))
        .expect_err("loop never exits");
    assert_eq!(err.kind, RuntimeErrorKind::Cancelled);
    assert_eq!(interpreter.steps(), 3);
}

#[test]
fn each_run_starts_with_fresh_state() {
    let program = parse_program("ZetriScript! [0:0:0]: x = 1; drawPixel([x:0:0])! ZetriScript")
        .expect("parse should succeed");
    let mut interpreter = Interpreter::new();
    interpreter.execute(&program).expect("first run");
    interpreter.execute(&program).expect("second run");
    assert_eq!(interpreter.canvas().len(), 1);
    assert_eq!(interpreter.symbols().len(), 1);
}
