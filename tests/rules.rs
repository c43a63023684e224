use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use pretty_assertions::assert_eq;
use keyrules::events::{EventReader, KeyState};
use keyrules::script::environment::FunctionEnvironment;
use keyrules::script::value::Value;
use keyrules::script::{self, LoadError};
use keyrules::Engine;

const REMOTE_RULES: &str = r#"
# Toggle the living room light with the red button, speak the volume keys.
if (action == "initialize") {
    light = 0
    printf("rules loaded")
} else if (state == "down") {
    if (key == "red") {
        if (light) light = 0 else light = 1
        if (light) openhab("LivingRoom", "ON") else openhab("LivingRoom", "OFF")
    }
    if (key == "ctrl-volumeup") say("louder")
}
"#;

type Calls = Rc<RefCell<Vec<(String, Vec<Value>)>>>;

fn recording_functions(names: &[&'static str]) -> (FunctionEnvironment, Calls) {
    let calls: Calls = Rc::new(RefCell::new(Vec::new()));
    let mut fenv = FunctionEnvironment::new();

    for &name in names {
        let calls = Rc::clone(&calls);
        fenv.register(name, move |args: &[Value]| {
            calls.borrow_mut().push((name.to_owned(), args.to_vec()));
            Value::Bool(true)
        });
    }

    (fenv, calls)
}

fn rules_file(source: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(source.as_bytes()).unwrap();
    file
}

#[test]
fn remote_control_session() {
    let file = rules_file(REMOTE_RULES);
    let rules = script::load(file.path()).unwrap();
    let (fenv, calls) = recording_functions(&["printf", "say", "openhab"]);

    let mut engine = Engine::new(rules, fenv);
    engine.initialize().unwrap();
    assert_eq!(engine.env().get("light"), Some(&Value::Number(0)));

    let events = "KEY_RED 1\nKEY_RED 0\nKEY_LEFTCTRL 1\nKEY_VOLUMEUP 1\nKEY_LEFTCTRL 0\nKEY_RED 1\n";
    engine.run_events(EventReader::new(events.as_bytes())).unwrap();

    assert_eq!(engine.env().get("light"), Some(&Value::Number(0)));
    assert_eq!(engine.env().get("key"), Some(&Value::from("red")));
    assert_eq!(*calls.borrow(), vec![
        (String::from("printf"), vec![Value::from("rules loaded")]),
        (String::from("openhab"), vec![Value::from("LivingRoom"), Value::from("ON")]),
        (String::from("say"), vec![Value::from("louder")]),
        (String::from("openhab"), vec![Value::from("LivingRoom"), Value::from("OFF")]),
    ]);
}

#[test]
fn failing_event_does_not_stop_the_loop() {
    let rules = script::parse_source(
        "if (action == \"initialize\") count = 0 else if (key == \"a\") missing() else count = count + 1").unwrap();
    let (fenv, _) = recording_functions(&[]);
    let mut engine = Engine::new(rules, fenv);

    engine.initialize().unwrap();
    engine.run_events(EventReader::new("KEY_B 1\nKEY_A 1\nKEY_B 0\n".as_bytes())).unwrap();

    assert_eq!(engine.env().get("count"), Some(&Value::Number(2)));
}

#[test]
fn handle_event_sets_event_variables() {
    let rules = script::parse_source("seen = key").unwrap();
    let (fenv, _) = recording_functions(&[]);
    let mut engine = Engine::new(rules, fenv);

    engine.handle_event("alt-x", KeyState::Hold).unwrap();

    assert_eq!(engine.env().get("action"), Some(&Value::from("event")));
    assert_eq!(engine.env().get("state"), Some(&Value::from("hold")));
    assert_eq!(engine.env().get("seen"), Some(&Value::from("alt-x")));
}

#[test]
fn read_errors_end_the_loop() {
    let rules = script::parse_source(
        "if (action == \"initialize\") count = 0 else count = count + 1").unwrap();
    let (fenv, _) = recording_functions(&[]);
    let mut engine = Engine::new(rules, fenv);
    let events = vec![
        Ok((String::from("a"), KeyState::Down)),
        Err(std::io::Error::new(std::io::ErrorKind::Other, "device gone")),
        Ok((String::from("b"), KeyState::Down)),
    ];

    engine.initialize().unwrap();
    assert!(matches!(engine.run_events(events), Err(keyrules::Error::Io(_))));
    assert_eq!(engine.env().get("count"), Some(&Value::Number(1)));
}

#[test]
fn load_errors() {
    let missing = script::load(std::path::Path::new("/nonexistent/keyrules.rules"));
    assert!(matches!(missing, Err(LoadError::Io { .. })));

    let file = rules_file("{ printf(\"x\")");
    let error = script::load(file.path()).unwrap_err();
    assert!(matches!(error, LoadError::Parse { .. }));
    assert!(error.to_string().ends_with("Unexpected end of input, expecting \"}\""), "{}", error);
}

#[test]
fn tokens_and_check() {
    let file = rules_file("if (a > 1) { b = 2 }");

    assert_eq!(keyrules::tokens(file.path()).unwrap(),
               vec!["if", "(", "a", ">", "1", ")", "{", "b", "=", "2", "}"]);
    assert_eq!(keyrules::check(file.path()).unwrap(),
               "block (1)\n  if\n    >\n      symbol a\n      number 1\n    block (1)\n      =\n        symbol b\n        number 2\n");
}

#[test]
fn demo_rules_run() {
    let rules = script::parse_source(include_str!("../demos/remote.rules")).unwrap();
    let (fenv, calls) = recording_functions(&["printf", "say", "openhab"]);
    let mut engine = Engine::new(rules, fenv);

    engine.initialize().unwrap();
    engine.run_events(EventReader::new("KEY_RED 1\nKEY_LEFTCTRL 1\nKEY_I 1\n".as_bytes())).unwrap();

    let names: Vec<String> = calls.borrow().iter().map(|(name, _)| name.clone()).collect();
    assert_eq!(names, vec!["printf", "printf", "openhab", "printf", "say"]);
}
