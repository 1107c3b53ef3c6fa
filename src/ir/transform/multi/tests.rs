use super::*;
use crate::ir::ast::{
    Alias, AnalogPort, Dimension, EventPort, Parameter, ReduceOperator, Regime, StateAssignment,
    StateVariable, TimeDerivative, Transition,
};
use crate::ir::error::ModelError;
use crate::ir::expr::Expression;

// =============================================================================
// Fixtures
// =============================================================================

/// `regimes` regimes `r0..`, each jumping to the next when `x > 1`.
fn ring(name: &str, regimes: usize) -> BoundDynamics {
    let mut builder = Dynamics::builder(name)
        .with_state_variable(StateVariable::new("x", Dimension::dimensionless()));
    for i in 0..regimes {
        builder = builder.with_regime(
            Regime::new(format!("r{i}"))
                .with_time_derivative(TimeDerivative::parse("dx/dt = 1").expect("parse"))
                .with_transition(
                    Transition::on_condition("x > 1")
                        .expect("parse")
                        .with_state_assignment(StateAssignment::parse("x = 0").expect("parse"))
                        .to(format!("r{}", (i + 1) % regimes)),
                ),
        );
    }
    builder.build().expect("build").bind().expect("bind")
}

/// Emits `spike` when `v > 1`.
fn source() -> BoundDynamics {
    Dynamics::builder("Source")
        .with_state_variable(StateVariable::new("v", Dimension::voltage()))
        .with_event_port(EventPort::send("spike"))
        .with_regime(
            Regime::new("idle").with_transition(
                Transition::on_condition("v > 1")
                    .expect("parse")
                    .with_state_assignment(StateAssignment::parse("v = 0").expect("parse"))
                    .with_output_event("spike"),
            ),
        )
        .build()
        .expect("build")
        .bind()
        .expect("bind")
}

/// Counts a `trigger` event and reports it on `done`.
fn counter() -> BoundDynamics {
    Dynamics::builder("Counter")
        .with_state_variable(StateVariable::new("w", Dimension::dimensionless()))
        .with_event_port(EventPort::receive("trigger"))
        .with_event_port(EventPort::send("done"))
        .with_regime(
            Regime::new("waiting").with_transition(
                Transition::on_event("trigger")
                    .with_state_assignment(StateAssignment::parse("w = w + 1").expect("parse"))
                    .with_output_event("done")
                    .to("fired"),
            ),
        )
        .with_regime(Regime::new("fired"))
        .build()
        .expect("build")
        .bind()
        .expect("bind")
}

/// Re-emits `out` whenever `in` arrives.
fn relay() -> BoundDynamics {
    Dynamics::builder("Relay")
        .with_event_port(EventPort::receive("in"))
        .with_event_port(EventPort::send("out"))
        .with_regime(
            Regime::new("r").with_transition(Transition::on_event("in").with_output_event("out")),
        )
        .build()
        .expect("build")
        .bind()
        .expect("bind")
}

/// Membrane with a summing current input.
fn membrane() -> BoundDynamics {
    Dynamics::builder("Membrane")
        .with_state_variable(StateVariable::new("v", Dimension::voltage()))
        .with_analog_port(AnalogPort::reduce(
            "i_syn",
            ReduceOperator::Add,
            Dimension::current(),
        ))
        .with_analog_port(AnalogPort::send("v", Dimension::voltage()))
        .with_regime(
            Regime::new("sub").with_time_derivative(TimeDerivative::parse("dv/dt = i_syn").expect("parse")),
        )
        .build()
        .expect("build")
        .bind()
        .expect("bind")
}

/// Publishes a current `i` of the given dimension.
fn synapse(dimension: Dimension) -> BoundDynamics {
    Dynamics::builder("Synapse")
        .with_parameter(Parameter::new("g", Dimension::dimensionless()))
        .with_alias(Alias::parse("i := 2 * g").expect("parse"))
        .with_analog_port(AnalogPort::send("i", dimension))
        .build()
        .expect("build")
        .bind()
        .expect("bind")
}

/// Reads a voltage on `v_in`.
fn reader() -> BoundDynamics {
    Dynamics::builder("Reader")
        .with_state_variable(StateVariable::new("y", Dimension::voltage()))
        .with_analog_port(AnalogPort::receive("v_in", Dimension::voltage()))
        .with_regime(
            Regime::new("follow").with_time_derivative(TimeDerivative::parse("dy/dt = v_in - y").expect("parse")),
        )
        .build()
        .expect("build")
        .bind()
        .expect("bind")
}

fn sequential() -> ComposeOptions {
    ComposeOptions {
        parallel: false,
        ..ComposeOptions::default()
    }
}

fn expr(source: &str) -> Expression {
    source.parse().expect("parse")
}

// =============================================================================
// Regime product
// =============================================================================

#[test]
fn test_regime_product_size_and_names() {
    let composite = MultiDynamics::compose(
        "Pair",
        [("a", ring("A", 2)), ("b", ring("B", 3))],
        vec![],
        vec![],
        &ComposeOptions::default(),
    )
    .expect("compose");

    assert_eq!(composite.num_regimes(), 6);
    let names: Vec<&str> = composite.regimes().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "r0__r0_regime",
            "r0__r1_regime",
            "r0__r2_regime",
            "r1__r0_regime",
            "r1__r1_regime",
            "r1__r2_regime",
        ]
    );

    let regime = composite.regime("r0__r2_regime").expect("regime");
    assert_eq!(regime.time_derivatives.len(), 2);
    assert!(regime.time_derivatives.contains_key("x__a"));
    assert!(regime.time_derivatives.contains_key("x__b"));

    let targets: Vec<Option<&str>> = regime
        .transitions
        .iter()
        .map(|t| t.target().as_deref())
        .collect();
    assert_eq!(targets, vec![Some("r1__r2_regime"), Some("r0__r0_regime")]);

    let Transition::OnCondition(first) = &regime.transitions[0] else {
        panic!("expected an OnCondition");
    };
    assert_eq!(first.trigger.key(), "x__a > 1");
    assert!(first.body.state_assignments.contains_key("x__a"));

    composite.bind().expect("composite binds");
}

#[test]
fn test_composite_is_independent_of_insertion_order() {
    let forward = MultiDynamics::compose(
        "Pair",
        [("a", ring("A", 2)), ("b", ring("B", 3))],
        vec![],
        vec![],
        &sequential(),
    )
    .expect("compose");
    let backward = MultiDynamics::compose(
        "Pair",
        [("b", ring("B", 3)), ("a", ring("A", 2))],
        vec![],
        vec![],
        &sequential(),
    )
    .expect("compose");
    assert_eq!(forward, backward);
}

#[test]
fn test_parallel_and_sequential_agree() {
    let subs = || [("a", ring("A", 3)), ("b", ring("B", 4)), ("c", ring("C", 2))];
    let parallel =
        MultiDynamics::compose("Trio", subs(), vec![], vec![], &ComposeOptions::default()).expect("compose");
    let serial = MultiDynamics::compose("Trio", subs(), vec![], vec![], &sequential()).expect("compose");
    assert_eq!(parallel.num_regimes(), 24);
    assert_eq!(parallel, serial);
}

#[test]
fn test_regimeless_components_contribute_default() {
    let composite = MultiDynamics::compose(
        "Net",
        [("s", synapse(Dimension::current())), ("r", ring("A", 2))],
        vec![],
        vec![],
        &ComposeOptions::default(),
    )
    .expect("compose");
    let names: Vec<&str> = composite.regimes().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["r0__default_regime", "r1__default_regime"]);
}

// =============================================================================
// Event cascades
// =============================================================================

#[test]
fn test_cascade_merges_assignments_and_target() {
    let composite = MultiDynamics::compose(
        "Net",
        [("src", source()), ("dst", counter())],
        vec![PortExposure::new("dst", "done")],
        vec![PortConnection::event(
            PortRef::new("src", "spike"),
            PortRef::new("dst", "trigger"),
        )],
        &ComposeOptions::default(),
    )
    .expect("compose");

    // Sub-components are ordered by name: dst, then src.
    let waiting = composite.regime("waiting__idle_regime").expect("regime");
    assert_eq!(waiting.transitions.len(), 1, "unexposed OnEvent has no counterpart");
    let transition = &waiting.transitions[0];
    let body = transition.body();
    assert_eq!(
        body.state_assignments.keys().collect::<Vec<_>>(),
        vec!["v__src", "w__dst"]
    );
    assert_eq!(body.state_assignments["w__dst"].rhs.to_string(), "w__dst + 1");
    assert_eq!(
        body.output_events.keys().collect::<Vec<_>>(),
        vec!["done__dst"],
        "only exposed events leave the composite"
    );
    assert_eq!(body.target.as_deref(), Some("fired__idle_regime"));

    let fired = composite.regime("fired__idle_regime").expect("regime");
    let body = fired.transitions[0].body();
    assert_eq!(body.state_assignments.keys().collect::<Vec<_>>(), vec!["v__src"]);
    assert!(body.output_events.is_empty());
    assert_eq!(body.target.as_deref(), Some("fired__idle_regime"));

    assert!(composite.event_port("done__dst").is_some());
    composite.bind().expect("composite binds");
}

#[test]
fn test_exposed_on_event_becomes_composite_on_event() {
    let composite = MultiDynamics::compose(
        "Net",
        [("dst", counter())],
        vec![PortExposure::new("dst", "trigger").named("input")],
        vec![],
        &ComposeOptions::default(),
    )
    .expect("compose");
    let waiting = composite.regime("waiting_regime").expect("regime");
    let Transition::OnEvent(on_event) = &waiting.transitions[0] else {
        panic!("expected an OnEvent");
    };
    assert_eq!(on_event.src_port_name, "input");
    assert_eq!(on_event.body.target.as_deref(), Some("fired_regime"));
    composite.bind().expect("composite binds");
}

#[test]
fn test_cascade_cycle_is_detected() {
    // Neither relay starts on its own: the loop is only reachable through
    // the internal connections.
    let err = MultiDynamics::compose(
        "Loop",
        [("a", relay()), ("b", relay())],
        vec![],
        vec![
            PortConnection::event(PortRef::new("a", "out"), PortRef::new("b", "in")),
            PortConnection::event(PortRef::new("b", "out"), PortRef::new("a", "in")),
        ],
        &ComposeOptions::default(),
    )
    .unwrap_err();
    match err {
        ComposeError::EventCascadeCycle {
            component,
            regime,
            sub_component,
            port,
        } => {
            assert_eq!(component, "Loop");
            assert_eq!(regime, "r__r_regime");
            assert_eq!(sub_component, "a");
            assert_eq!(port, "in__a");
        }
        other => panic!("expected a cascade cycle, got {other:?}"),
    }
}

#[test]
fn test_internal_handlers_without_cycle_compose() {
    let composite = MultiDynamics::compose(
        "Chain",
        [("a", relay()), ("b", relay())],
        vec![PortExposure::new("a", "in"), PortExposure::new("b", "out")],
        vec![PortConnection::event(
            PortRef::new("a", "out"),
            PortRef::new("b", "in"),
        )],
        &ComposeOptions::default(),
    )
    .expect("compose");
    let regime = composite.regime("r__r_regime").expect("regime");
    let on_events: Vec<String> = regime.on_events().map(|t| t.describe()).collect();
    assert_eq!(on_events, vec!["OnEvent(in__a)"]);
    assert!(regime.transitions[0].body().output_events.contains_key("out__b"));
}

#[test]
fn test_fan_in_is_not_reported_as_cycle() {
    let err = MultiDynamics::compose(
        "Diamond",
        [("a", relay()), ("b", relay()), ("counter", counter()), ("src", source())],
        vec![],
        vec![
            PortConnection::event(PortRef::new("src", "spike"), PortRef::new("a", "in")),
            PortConnection::event(PortRef::new("src", "spike"), PortRef::new("b", "in")),
            PortConnection::event(PortRef::new("a", "out"), PortRef::new("counter", "trigger")),
            PortConnection::event(PortRef::new("b", "out"), PortRef::new("counter", "trigger")),
        ],
        &ComposeOptions::default(),
    )
    .unwrap_err();
    match err {
        ComposeError::EventFanIn {
            regime,
            sub_component,
            port,
            ..
        } => {
            assert_eq!(regime, "r__r__waiting__idle_regime");
            assert_eq!(sub_component, "counter");
            assert_eq!(port, "trigger__counter");
        }
        other => panic!("expected a fan-in, got {other:?}"),
    }
}

#[test]
fn test_self_loop_later_assignment_wins() {
    let component = Dynamics::builder("Looper")
        .with_state_variable(StateVariable::new("x", Dimension::dimensionless()))
        .with_event_port(EventPort::send("out"))
        .with_event_port(EventPort::receive("in"))
        .with_regime(
            Regime::new("r0").with_transition(
                Transition::on_condition("x > 1")
                    .expect("parse")
                    .with_state_assignment(StateAssignment::parse("x = 0").expect("parse"))
                    .with_output_event("out")
                    .to("r1"),
            ),
        )
        .with_regime(
            Regime::new("r1").with_transition(
                Transition::on_event("in")
                    .with_state_assignment(StateAssignment::parse("x = 5").expect("parse")),
            ),
        )
        .build()
        .expect("build")
        .bind()
        .expect("bind");

    let composite = MultiDynamics::compose(
        "Net",
        [("a", component)],
        vec![],
        vec![PortConnection::event(
            PortRef::new("a", "out"),
            PortRef::new("a", "in"),
        )],
        &ComposeOptions::default(),
    )
    .expect("compose");
    let body = composite.regime("r0_regime").expect("regime").transitions[0].body();
    assert_eq!(body.state_assignments["x__a"].rhs.to_string(), "5");
    assert_eq!(body.target.as_deref(), Some("r1_regime"));
}

#[test]
fn test_transition_order_policy() {
    let component = Dynamics::builder("Mixed")
        .with_state_variable(StateVariable::new("x", Dimension::dimensionless()))
        .with_event_port(EventPort::receive("reset"))
        .with_regime(
            Regime::new("r")
                .with_transition(
                    Transition::on_event("reset")
                        .with_state_assignment(StateAssignment::parse("x = 0").expect("parse")),
                )
                .with_transition(Transition::on_condition("x > 1").expect("parse")),
        )
        .build()
        .expect("build")
        .bind()
        .expect("bind");
    let compose = |order| {
        let options = ComposeOptions {
            transition_order: order,
            ..ComposeOptions::default()
        };
        MultiDynamics::compose(
            "Net",
            [("m", component.clone())],
            vec![PortExposure::new("m", "reset")],
            vec![],
            &options,
        )
        .expect("compose")
    };
    let kinds = |composite: &Dynamics| -> Vec<String> {
        composite
            .regime("r_regime")
            .expect("regime")
            .transitions
            .iter()
            .map(|t| t.describe())
            .collect()
    };

    assert_eq!(
        kinds(&compose(TransitionOrder::ComponentMajor)),
        vec!["OnEvent(reset__m)", "OnCondition(x__m > 1)"]
    );
    assert_eq!(
        kinds(&compose(TransitionOrder::KindMajor)),
        vec!["OnCondition(x__m > 1)", "OnEvent(reset__m)"]
    );
}

#[test]
fn test_event_delay_is_stored() {
    let multi = MultiDynamics::new(
        "Net",
        [("src", source()), ("dst", counter())],
        vec![],
        vec![PortConnection::event(
            PortRef::new("src", "spike"),
            PortRef::new("dst", "trigger"),
        )
        .with_delay(expr("2 * d"))],
        &ComposeOptions::default(),
    )
    .expect("compose");
    let incoming = &multi.event_connections()[&PortRef::new("dst", "trigger")];
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].sender, PortRef::new("src", "spike"));
    assert_eq!(incoming[0].delay.to_string(), "2 * d");
}

// =============================================================================
// Analog connections
// =============================================================================

#[test]
fn test_reduce_combines_senders() {
    let composite = MultiDynamics::compose(
        "Net",
        [
            ("cell", membrane()),
            ("s1", synapse(Dimension::current())),
            ("s2", synapse(Dimension::current())),
            ("s3", synapse(Dimension::current())),
        ],
        vec![],
        ["s1", "s2", "s3"]
            .into_iter()
            .map(|s| PortConnection::reduce(PortRef::new(s, "i"), PortRef::new("cell", "i_syn")))
            .collect(),
        &ComposeOptions::default(),
    )
    .expect("compose");
    let alias = composite.alias("i_syn__cell").expect("alias");
    assert!(alias.rhs.equivalent(&expr("i__s3 + i__s1 + i__s2")));
    assert!(composite.alias("i__s1").is_some());
    assert!(composite.parameter("g__s2").is_some());
}

#[test]
fn test_unconnected_reduce_is_identity() {
    let composite = MultiDynamics::compose(
        "Net",
        [("cell", membrane())],
        vec![],
        vec![],
        &ComposeOptions::default(),
    )
    .expect("compose");
    assert!(composite
        .alias("i_syn__cell")
        .expect("alias")
        .rhs
        .equivalent(&expr("0")));
}

#[test]
fn test_exposed_reduce_port_is_first_term() {
    let composite = MultiDynamics::compose(
        "Net",
        [("cell", membrane()), ("s1", synapse(Dimension::current()))],
        vec![PortExposure::new("cell", "i_syn")],
        vec![PortConnection::reduce(
            PortRef::new("s1", "i"),
            PortRef::new("cell", "i_syn"),
        )],
        &ComposeOptions::default(),
    )
    .expect("compose");
    let port = composite.analog_port("i_syn__cell__reduce").expect("port");
    assert_eq!(port.reduce_operator(), Some(ReduceOperator::Add));
    assert_eq!(
        composite.alias("i_syn__cell").expect("alias").rhs.to_string(),
        "i_syn__cell__reduce + i__s1"
    );
    composite.bind().expect("composite binds");
}

#[test]
fn test_direct_connection_and_send_exposure() {
    let composite = MultiDynamics::compose(
        "Net",
        [("cell", membrane()), ("probe", reader())],
        vec![PortExposure::new("cell", "v").named("V")],
        vec![PortConnection::analog(
            PortRef::new("cell", "v"),
            PortRef::new("probe", "v_in"),
        )],
        &ComposeOptions::default(),
    )
    .expect("compose");
    assert_eq!(
        composite.alias("v_in__probe").expect("alias").rhs,
        Expression::symbol("v__cell")
    );
    assert_eq!(composite.alias("V").expect("alias").rhs, Expression::symbol("v__cell"));
    assert!(composite.analog_port("V").is_some());
    composite.bind().expect("composite binds");
}

#[test]
fn test_receive_exposure_aliases_namespaced_port() {
    let composite = MultiDynamics::compose(
        "Net",
        [("probe", reader())],
        vec![PortExposure::new("probe", "v_in").named("V_ext")],
        vec![],
        &ComposeOptions::default(),
    )
    .expect("compose");
    assert_eq!(
        composite.alias("v_in__probe").expect("alias").rhs,
        Expression::symbol("V_ext")
    );
}

#[test]
fn test_duplicate_direct_target_is_rejected() {
    let err = MultiDynamics::compose(
        "Net",
        [("a", membrane()), ("b", membrane()), ("probe", reader())],
        vec![],
        vec![
            PortConnection::analog(PortRef::new("a", "v"), PortRef::new("probe", "v_in")),
            PortConnection::analog(PortRef::new("b", "v"), PortRef::new("probe", "v_in")),
        ],
        &ComposeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ComposeError::Connection(ConnectionError::InvalidPortConnection { .. })
    ));
}

#[test]
fn test_exposed_and_connected_receive_is_rejected() {
    let err = MultiDynamics::compose(
        "Net",
        [("cell", membrane()), ("probe", reader())],
        vec![PortExposure::new("probe", "v_in")],
        vec![PortConnection::analog(
            PortRef::new("cell", "v"),
            PortRef::new("probe", "v_in"),
        )],
        &ComposeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ComposeError::InvalidPortConnection { .. }));
}

#[test]
fn test_dimension_mismatch() {
    let err = MultiDynamics::compose(
        "Net",
        [("cell", membrane()), ("s1", synapse(Dimension::voltage()))],
        vec![],
        vec![PortConnection::reduce(
            PortRef::new("s1", "i"),
            PortRef::new("cell", "i_syn"),
        )],
        &ComposeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ComposeError::Connection(ConnectionError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_pairwise_sender_policy() {
    let pairwise = ComposeOptions {
        reduce_dimensions: ReduceDimensionPolicy::PairwiseSenders,
        ..ComposeOptions::default()
    };
    let connect = |senders: &[&str]| -> Vec<PortConnection> {
        senders
            .iter()
            .map(|s| PortConnection::reduce(PortRef::new(*s, "i"), PortRef::new("cell", "i_syn")))
            .collect()
    };

    // Uniform voltage senders pass even though the port is a current.
    MultiDynamics::compose(
        "Net",
        [
            ("cell", membrane()),
            ("s1", synapse(Dimension::voltage())),
            ("s2", synapse(Dimension::voltage())),
        ],
        vec![],
        connect(&["s1", "s2"]),
        &pairwise,
    )
    .expect("uniform senders");

    let err = MultiDynamics::compose(
        "Net",
        [
            ("cell", membrane()),
            ("s1", synapse(Dimension::voltage())),
            ("s2", synapse(Dimension::current())),
        ],
        vec![],
        connect(&["s1", "s2"]),
        &pairwise,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ComposeError::Connection(ConnectionError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_wrong_port_kinds_are_rejected() {
    let err = MultiDynamics::compose(
        "Net",
        [("src", source()), ("probe", reader())],
        vec![],
        vec![PortConnection::event(
            PortRef::new("src", "spike"),
            PortRef::new("probe", "v_in"),
        )],
        &ComposeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ComposeError::Connection(ConnectionError::InvalidPortConnection { .. })
    ));

    let err = MultiDynamics::compose(
        "Net",
        [("src", source())],
        vec![],
        vec![PortConnection::event(
            PortRef::new("src", "spike"),
            PortRef::new("ghost", "in"),
        )],
        &ComposeOptions::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        ComposeError::Connection(ConnectionError::UnknownSubComponent {
            name: "ghost".into()
        })
    );

    let err = MultiDynamics::compose(
        "Net",
        [("src", source())],
        vec![],
        vec![PortConnection::event(
            PortRef::new("src", "missing"),
            PortRef::new("src", "spike"),
        )],
        &ComposeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ComposeError::Connection(ConnectionError::UnknownPort { .. })
    ));
}

// =============================================================================
// Exposures and names
// =============================================================================

#[test]
fn test_exposure_errors() {
    let compose = |exposures: Vec<PortExposure>| {
        MultiDynamics::compose(
            "Net",
            [("dst", counter())],
            exposures,
            vec![],
            &ComposeOptions::default(),
        )
    };
    assert!(matches!(
        compose(vec![PortExposure::new("dst", "nope")]),
        Err(ComposeError::InvalidExposure { .. })
    ));
    assert!(matches!(
        compose(vec![
            PortExposure::new("dst", "trigger"),
            PortExposure::new("dst", "trigger").named("again"),
        ]),
        Err(ComposeError::InvalidExposure { .. })
    ));
    assert!(matches!(
        compose(vec![
            PortExposure::new("dst", "trigger").named("io"),
            PortExposure::new("dst", "done").named("io"),
        ]),
        Err(ComposeError::DuplicateName { .. })
    ));
    assert!(matches!(
        compose(vec![PortExposure::new("dst", "done").named("t")]),
        Err(ComposeError::Model(ModelError::ReservedName { .. }))
    ));
}

#[test]
fn test_duplicate_sub_component_name() {
    let err = MultiDynamics::compose(
        "Net",
        [("a", ring("A", 1)), ("a", ring("B", 1))],
        vec![],
        vec![],
        &ComposeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ComposeError::DuplicateName { .. }));
}

#[test]
fn test_sub_component_views_are_shared_and_read_only() {
    let shared = Arc::new(ring("A", 2));
    let multi = MultiDynamics::new(
        "Net",
        [("a", Arc::clone(&shared)), ("b", Arc::clone(&shared))],
        vec![],
        vec![],
        &ComposeOptions::default(),
    )
    .expect("compose");
    assert_eq!(multi.sub_components().count(), 2);
    assert_eq!(multi.dynamics().num_regimes(), 4);

    let mut view = multi.sub_component("a").expect("sub-component").clone();
    assert!(matches!(
        view.rename_symbol("x", "y"),
        Err(ModelError::Immutable { .. })
    ));
    assert_eq!(shared.state_variable("x").expect("state variable").name, "x");
}
