use super::*;
use crate::ir::error::ModelError;
use crate::ir::expr::Expression;

fn neuron() -> DynamicsBuilder {
    Dynamics::builder("Neuron")
        .with_parameter(Parameter::new("tau", Dimension::time()))
        .with_parameter(Parameter::new("v_threshold", Dimension::voltage()))
        .with_state_variable(StateVariable::new("v", Dimension::voltage()))
        .with_alias(Alias::parse("v_rel := v - v_threshold").expect("parse"))
        .with_analog_port(AnalogPort::send("v", Dimension::voltage()))
        .with_analog_port(AnalogPort::receive("i_in", Dimension::current()))
        .with_event_port(EventPort::send("spike"))
        .with_event_port(EventPort::receive("reset"))
        .with_regime(
            Regime::new("active")
                .with_time_derivative(TimeDerivative::parse("dv/dt = (i_in - v) / tau").expect("parse"))
                .with_transition(
                    Transition::on_condition("v > v_threshold")
                        .expect("parse")
                        .with_state_assignment(StateAssignment::parse("v = 0").expect("parse"))
                        .with_output_event("spike"),
                )
                .with_transition(
                    Transition::on_event("reset")
                        .with_state_assignment(StateAssignment::parse("v = v_rel").expect("parse")),
                ),
        )
}

#[test]
fn test_identifiers() {
    assert!(is_valid_identifier("v_threshold"));
    assert!(is_valid_identifier("V2"));
    assert!(!is_valid_identifier("2v"));
    assert!(!is_valid_identifier("_v"));
    assert!(!is_valid_identifier("v_"));
    assert!(!is_valid_identifier("v-1"));
    assert!(!is_valid_identifier(""));
    assert!(is_reserved("t"));
    assert!(is_reserved("exp"));
    assert!(!is_reserved("tau"));
}

#[test]
fn test_builder_accepts_send_port_named_after_state() {
    let dynamics = neuron().build().expect("build");
    assert_eq!(dynamics.name(), "Neuron");
    assert_eq!(dynamics.num_regimes(), 1);
    assert!(dynamics.declares("v_rel"));
    assert!(matches!(dynamics.port("v"), Some(PortKind::Analog(_))));
    assert!(matches!(dynamics.port("spike"), Some(PortKind::Event(_))));
    assert_eq!(
        dynamics
            .analog_ports_with_mode(|m| *m == AnalogMode::Receive)
            .count(),
        1
    );
    assert_eq!(dynamics.event_ports_with_mode(EventMode::Send).count(), 1);
}

#[test]
fn test_builder_rejects_duplicates_across_kinds() {
    let err = neuron()
        .with_constant(Constant::new("tau", 1.0, Dimension::time()))
        .build()
        .unwrap_err();
    assert!(matches!(err, ModelError::DuplicateName { name, .. } if name == "tau"));

    let err = neuron()
        .with_parameter(Parameter::new("tau", Dimension::time()))
        .build()
        .unwrap_err();
    assert!(matches!(err, ModelError::DuplicateName { .. }));

    let err = neuron()
        .with_analog_port(AnalogPort::send("spike", Dimension::voltage()))
        .build()
        .unwrap_err();
    assert!(matches!(err, ModelError::DuplicateName { .. }));
}

#[test]
fn test_builder_rejects_bad_names() {
    let err = neuron()
        .with_parameter(Parameter::new("t", Dimension::time()))
        .build()
        .unwrap_err();
    assert!(matches!(err, ModelError::ReservedName { .. }));

    let err = neuron()
        .with_state_variable(StateVariable::new("u_", Dimension::voltage()))
        .build()
        .unwrap_err();
    assert!(matches!(err, ModelError::InvalidIdentifier { .. }));

    assert!(matches!(
        Dynamics::builder("bad name").build(),
        Err(ModelError::InvalidIdentifier { .. })
    ));
}

#[test]
fn test_rename_symbol_rewrites_every_use() {
    let mut dynamics = neuron().build().expect("build");
    dynamics.rename_symbol("v", "u").expect("rename");
    dynamics.rename_symbol("reset", "clear").expect("rename");

    assert!(dynamics.state_variable("u").is_some());
    assert!(dynamics.analog_port("u").is_some());
    assert!(!dynamics.declares("v"));
    assert_eq!(
        dynamics.alias("v_rel").expect("alias").rhs,
        "u - v_threshold".parse::<Expression>().expect("parse")
    );

    let regime = dynamics.regime("active").expect("regime");
    assert_eq!(regime.time_derivatives["u"].rhs.to_string(), "(i_in - u) / tau");
    let Transition::OnCondition(on_condition) = &regime.transitions[0] else {
        panic!("expected an OnCondition");
    };
    assert_eq!(on_condition.trigger.key(), "u > v_threshold");
    assert!(on_condition.body.state_assignments.contains_key("u"));
    assert!(regime.on_event("clear").is_some());

    dynamics.bind().expect("renamed model binds");
}

#[test]
fn test_rename_symbol_errors() {
    let mut dynamics = neuron().build().expect("build");
    assert!(matches!(
        dynamics.rename_symbol("w", "x"),
        Err(ModelError::UnknownSymbol { .. })
    ));
    assert!(matches!(
        dynamics.rename_symbol("v", "tau"),
        Err(ModelError::DuplicateName { .. })
    ));
    assert!(matches!(
        dynamics.rename_symbol("v", "exp"),
        Err(ModelError::ReservedName { .. })
    ));
    assert!(dynamics.rename_symbol("v", "v").is_ok());
}

#[test]
fn test_json_round_trip() {
    let dynamics = neuron().build().expect("build");
    let json = serde_json::to_string(&dynamics).expect("serialize");
    let back: Dynamics = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, dynamics);

    let value = serde_json::to_value(&dynamics).expect("serialize");
    assert_eq!(value["parameters"][0]["name"], "tau");
    assert_eq!(value["regimes"][0]["transitions"][0]["on_condition"]["trigger"], "v > v_threshold");
}

#[test]
fn test_json_rejects_invalid_documents() {
    let repeated = r#"{
        "name": "X",
        "parameters": [
            {"name": "a", "dimension": "time"},
            {"name": "a", "dimension": "time"}
        ]
    }"#;
    assert!(serde_json::from_str::<Dynamics>(repeated).is_err());

    let reserved = r#"{"name": "X", "state_variables": [{"name": "t", "dimension": "time"}]}"#;
    assert!(serde_json::from_str::<Dynamics>(reserved).is_err());

    let bad_expression = r#"{"name": "X", "aliases": [{"name": "a", "rhs": "1 +"}]}"#;
    assert!(serde_json::from_str::<Dynamics>(bad_expression).is_err());
}

#[test]
fn test_bound_json_round_trip() {
    let bound = neuron().build().expect("build").bind().expect("bind");
    let json = serde_json::to_string(&bound).expect("serialize");
    let back: BoundDynamics = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, bound);
}

#[test]
fn test_bound_json_is_rebound() {
    let document = |target: &str| {
        format!(
            r#"{{
                "name": "X",
                "event_ports": [{{"name": "spike", "mode": "send"}}],
                "regimes": [
                    {{"name": "a"}},
                    {{"name": "b", "transitions": [{{"on_condition": {{"trigger": "t > 1"{target}}}}}]}}
                ]
            }}"#
        )
    };

    // A missing target stays in the source regime.
    let bound: BoundDynamics = serde_json::from_str(&document("")).expect("deserialize");
    let b = bound.regime_id("b").expect("regime");
    assert_eq!(*bound.regime("b").expect("regime").transitions[0].target(), b);

    let bound: BoundDynamics =
        serde_json::from_str(&document(r#", "target": 0"#)).expect("deserialize");
    assert_eq!(
        *bound.regime("b").expect("regime").transitions[0].target(),
        RegimeId(0)
    );

    assert!(serde_json::from_str::<BoundDynamics>(&document(r#", "target": 2"#)).is_err());

    // Port references are checked as well.
    let json = document(r#", "output_events": ["missing"]"#);
    assert!(serde_json::from_str::<BoundDynamics>(&json).is_err());
}
