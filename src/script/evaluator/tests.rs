use std::cell::RefCell;
use std::rc::Rc;
use pretty_assertions::assert_eq;
use crate::script::lexer::Tokenizer;
use crate::script::parser::Parser;
use super::*;

fn parse(source: &str) -> Node {
    Parser::new(Tokenizer::new(source)).parse().unwrap()
}

fn run(source: &str, env: &mut Environment) -> EvalResult<Value> {
    parse(source).eval(env, &FunctionEnvironment::new())
}

/// Registers `name` as a function that records every argument list it receives.
fn recorder(fenv: &mut FunctionEnvironment, name: &str) -> Rc<RefCell<Vec<Vec<Value>>>> {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let captured = Rc::clone(&calls);

    fenv.register(name, move |args: &[Value]| {
        captured.borrow_mut().push(args.to_vec());
        Value::Bool(true)
    });

    calls
}

mod arithmetic {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn assignment_stores_and_yields() {
        let mut env = Environment::new();
        assert_eq!(run("a = 1 + 2", &mut env), Ok(Value::Number(3)));
        assert_eq!(env.get("a"), Some(&Value::Number(3)));
    }

    #[test]
    fn right_associative() {
        let mut env = Environment::new();
        assert_eq!(run("2 * 3 + 1", &mut env), Ok(Value::Number(8)));
        assert_eq!(run("10 - 4 - 3", &mut env), Ok(Value::Number(9)));
        assert_eq!(run("(2 * 3) + 1", &mut env), Ok(Value::Number(7)));
    }

    #[test]
    fn division_truncates() {
        let mut env = Environment::new();
        assert_eq!(run("7 / 2", &mut env), Ok(Value::Number(3)));
        assert_eq!(run("x = 0 x - 7 / 2", &mut env), Ok(Value::Number(-3)));
        assert_eq!(run("1 / 0", &mut env), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn string_concatenation() {
        let mut env: Environment = [("name", "world")].into_iter().collect();
        assert_eq!(run("\"hello \" + name", &mut env), Ok(Value::from("hello world")));
    }

    #[test]
    fn comparisons() {
        let mut env = Environment::new();
        assert_eq!(run("1 < 2", &mut env), Ok(Value::Bool(true)));
        assert_eq!(run("2 <= 2", &mut env), Ok(Value::Bool(true)));
        assert_eq!(run("1 >= 2", &mut env), Ok(Value::Bool(false)));
        assert_eq!(run("\"b\" > \"a\"", &mut env), Ok(Value::Bool(true)));
        assert_eq!(run("\"1\" == 1", &mut env), Ok(Value::Bool(false)));
    }

    #[test]
    fn mixed_operands_are_rejected() {
        let mut env = Environment::new();
        assert_eq!(run("\"a\" + 1", &mut env), Err(EvalError::TypeMismatch {
            operator: Operator::Add,
            left: "string",
            right: "number",
        }));
        assert!(matches!(run("\"a\" < 1", &mut env), Err(EvalError::TypeMismatch { .. })));
    }
}

mod control_flow {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn if_else() {
        let mut env: Environment = [("key", "a")].into_iter().collect();
        run("if (key == \"a\") x = 1 else x = 2", &mut env).unwrap();
        assert_eq!(env.get("x"), Some(&Value::Number(1)));

        env.set("key", "b");
        run("if (key == \"a\") x = 1 else x = 2", &mut env).unwrap();
        assert_eq!(env.get("x"), Some(&Value::Number(2)));
    }

    #[test]
    fn if_without_else_yields_none() {
        let mut env = Environment::new();
        assert_eq!(run("if (0) x = 1", &mut env), Ok(Value::None));
        assert!(!env.contains("x"));
    }

    #[test]
    fn unbraced_block_assigns() {
        let mut env = Environment::new();
        run("if (1 == 1) x = 5", &mut env).unwrap();
        assert_eq!(env.get("x"), Some(&Value::Number(5)));
    }

    #[test]
    fn block_yields_last_statement() {
        let mut env = Environment::new();
        assert_eq!(run("{ a = 1 b = \"two\" }", &mut env), Ok(Value::from("two")));
        assert_eq!(run("", &mut env), Ok(Value::None));
    }

    #[test]
    fn state_persists_between_evaluations() {
        let ast = parse("if (toggle) toggle = 0 else toggle = 1");
        let mut env: Environment = [("toggle", 0)].into_iter().map(|(k, v)| (k, Value::Number(v))).collect();
        let fenv = FunctionEnvironment::new();

        ast.eval(&mut env, &fenv).unwrap();
        assert_eq!(env.get("toggle"), Some(&Value::Number(1)));
        ast.eval(&mut env, &fenv).unwrap();
        assert_eq!(env.get("toggle"), Some(&Value::Number(0)));
    }

    #[test]
    fn logic_yields_deciding_operand() {
        let mut env = Environment::new();
        assert_eq!(run("0 or \"x\"", &mut env), Ok(Value::from("x")));
        assert_eq!(run("\"\" and 1", &mut env), Ok(Value::from("")));
        assert_eq!(run("1 and 2", &mut env), Ok(Value::Number(2)));
    }
}

mod short_circuit {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn false_and_skips_right() {
        let mut fenv = FunctionEnvironment::new();
        let calls = recorder(&mut fenv, "f");
        let mut env: Environment = [("flag", false)].into_iter().collect();

        assert_eq!(parse("flag and f()").eval(&mut env, &fenv), Ok(Value::Bool(false)));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn true_or_skips_right() {
        let mut fenv = FunctionEnvironment::new();
        let calls = recorder(&mut fenv, "f");
        let mut env: Environment = [("flag", true)].into_iter().collect();

        assert_eq!(parse("flag or f()").eval(&mut env, &fenv), Ok(Value::Bool(true)));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn skipped_assignment_does_not_happen() {
        let mut env = Environment::new();
        run("0 and x = 1", &mut env).unwrap();
        assert!(!env.contains("x"));
    }

    #[test]
    fn true_and_evaluates_right() {
        let mut fenv = FunctionEnvironment::new();
        let calls = recorder(&mut fenv, "f");
        let mut env = Environment::new();

        parse("1 and f()").eval(&mut env, &fenv).unwrap();
        assert_eq!(calls.borrow().len(), 1);
    }
}

mod functions {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn arguments_are_evaluated_values() {
        let mut fenv = FunctionEnvironment::new();
        let calls = recorder(&mut fenv, "printf");
        let mut env: Environment = [("name", "world")].into_iter().collect();

        let result = parse("{ printf(\"hello %s\", name) }").eval(&mut env, &fenv);

        assert_eq!(result, Ok(Value::Bool(true)));
        assert_eq!(*calls.borrow(), vec![vec![Value::from("hello %s"), Value::from("world")]]);
    }

    #[test]
    fn arguments_evaluate_left_to_right() {
        let mut fenv = FunctionEnvironment::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for name in ["first", "second"] {
            let order = Rc::clone(&order);
            fenv.register(name, move |_: &[Value]| {
                order.borrow_mut().push(name);
                Value::None
            });
        }
        let calls = recorder(&mut fenv, "f");

        parse("f(first(), second(), 1 + 1)").eval(&mut Environment::new(), &fenv).unwrap();

        assert_eq!(*order.borrow(), vec!["first", "second"]);
        assert_eq!(*calls.borrow(), vec![vec![Value::None, Value::None, Value::Number(2)]]);
    }

    #[test]
    fn absent_return_is_a_value() {
        let mut fenv = FunctionEnvironment::new();
        fenv.register("nothing", |_: &[Value]| Value::None);
        let mut env = Environment::new();

        assert_eq!(parse("x = nothing()").eval(&mut env, &fenv), Ok(Value::None));
        assert_eq!(env.get("x"), Some(&Value::None));
    }
}

mod errors {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unknown_variable() {
        let mut env = Environment::new();
        let error = run("a + 1", &mut env).unwrap_err();

        assert_eq!(error, EvalError::UnknownVariable(String::from("a")));
        assert_eq!(error.to_string(), "unknown variable: a");
    }

    #[test]
    fn unknown_function() {
        let mut env = Environment::new();
        assert_eq!(run("missing(1)", &mut env), Err(EvalError::UnknownFunction(String::from("missing"))));
    }

    #[test]
    fn error_stops_block_and_keeps_environment() {
        let mut env = Environment::new();

        assert!(run("{ a = 1 b = c d = 2 }", &mut env).is_err());
        assert_eq!(env.get("a"), Some(&Value::Number(1)));
        assert!(!env.contains("b"));
        assert!(!env.contains("d"));
    }

    #[test]
    fn assignment_to_non_symbol() {
        let node = Node::BinOp {
            operator: Operator::Assign,
            left: Box::new(Node::NumberLiteral(1)),
            right: Box::new(Node::NumberLiteral(2)),
        };

        assert_eq!(node.eval(&mut Environment::new(), &FunctionEnvironment::new()),
                   Err(EvalError::InvalidAssignmentTarget(String::from("1"))));
    }
}
