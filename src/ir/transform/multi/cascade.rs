//! Event cascade resolution.
//!
//! When a sub-component transition fires it may emit events that are wired
//! to `OnEvent`s of other sub-components (or itself). Those fire within the
//! same composite transition, possibly emitting more events. The cascade is
//! resolved breadth-first; each `(sub-component, receive port)` pair may
//! fire at most once. A second delivery is a cycle when the port lies on
//! the chain of deliveries that led back to it, and a fan-in otherwise.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;

use super::connections::EventConnection;
use super::exposures::Exposures;
use super::sub_dynamics::SubDynamics;
use crate::ir::ast::{OutputEvent, PortRef, RegimeId, StateAssignment, TransitionBody};
use crate::ir::error::ComposeError;

/// Event wiring keyed by `(sender index, namespaced send port)`.
#[derive(Debug, Clone, Default)]
pub(super) struct EventRoutes {
    routes: HashMap<(usize, String), Vec<(usize, String)>>,
    connected: HashSet<(usize, String)>,
}

impl EventRoutes {
    pub fn new(
        subs: &IndexMap<String, SubDynamics>,
        event_connections: &IndexMap<PortRef, Vec<EventConnection>>,
    ) -> Self {
        let mut routes: HashMap<(usize, String), Vec<(usize, String)>> = HashMap::new();
        let mut connected = HashSet::new();
        for (receiver, connections) in event_connections {
            let Some((r, _, receive_sub)) = subs.get_full(&receiver.component) else {
                continue;
            };
            if !connections.is_empty() {
                connected.insert((r, receive_sub.namespaced(&receiver.port)));
            }
            for connection in connections {
                let Some((s, _, send_sub)) = subs.get_full(&connection.sender.component) else {
                    continue;
                };
                routes
                    .entry((s, send_sub.namespaced(&connection.sender.port)))
                    .or_default()
                    .push((r, receive_sub.namespaced(&receiver.port)));
            }
        }
        Self { routes, connected }
    }

    /// True if some sub-component sends into receive port `port` of `sub`.
    pub fn is_connected(&self, sub: usize, port: &str) -> bool {
        self.connected.contains(&(sub, port.to_string()))
    }

    fn receivers(&self, sub: usize, port: &str) -> &[(usize, String)] {
        self.routes
            .get(&(sub, port.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Accumulated effect of one composite transition.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Cascade {
    pub state_assignments: IndexMap<String, StateAssignment>,
    pub output_events: IndexMap<String, OutputEvent>,
    /// Regime index of every sub-component after the transition.
    pub next: Vec<usize>,
}

/// Read-only inputs shared by every cascade of a composition.
pub(super) struct CascadeContext<'a> {
    pub component: &'a str,
    pub subs: Vec<&'a SubDynamics>,
    pub routes: &'a EventRoutes,
    pub exposures: &'a Exposures,
}

impl CascadeContext<'_> {
    /// Resolve the transition `body` of sub-component `origin` fired from
    /// the composite regime `tuple`. `trigger_port` is the namespaced
    /// receive port when the transition is an `OnEvent`.
    pub fn resolve(
        &self,
        regime_name: &str,
        tuple: &[usize],
        origin: usize,
        trigger_port: Option<&str>,
        body: &TransitionBody<RegimeId>,
    ) -> Result<Cascade, ComposeError> {
        let mut cascade = Cascade {
            state_assignments: IndexMap::new(),
            output_events: IndexMap::new(),
            next: tuple.to_vec(),
        };
        // Every delivery made so far, with the delivery that caused it.
        let mut deliveries: Vec<((usize, String), Option<usize>)> = Vec::new();
        let mut fired: HashSet<(usize, String)> = HashSet::new();
        let mut root = None;
        if let Some(port) = trigger_port {
            let key = (origin, port.to_string());
            fired.insert(key.clone());
            deliveries.push((key, None));
            root = Some(0);
        }

        let mut queue = VecDeque::from([(origin, body, root)]);
        while let Some((i, body, delivery)) = queue.pop_front() {
            for assignment in body.state_assignments.values() {
                let previous = cascade
                    .state_assignments
                    .insert(assignment.variable.clone(), assignment.clone());
                if let Some(previous) = previous {
                    log::debug!(
                        "in regime '{regime_name}' of '{}': '{}' assigned '{}' overrides '{}'",
                        self.component,
                        assignment.variable,
                        assignment.rhs,
                        previous.rhs
                    );
                }
            }
            cascade.next[i] = body.target.0;

            for event in body.output_events.values() {
                if let Some(exposed) = self.exposures.event_send_name(&event.port_name) {
                    cascade
                        .output_events
                        .insert(exposed.to_string(), OutputEvent::new(exposed));
                }
                for (j, port) in self.routes.receivers(i, &event.port_name) {
                    let Some(on_event) = self.subs[*j].on_event(cascade.next[*j], port) else {
                        continue;
                    };
                    let key = (*j, port.clone());
                    if fired.contains(&key) {
                        let component = self.component.to_string();
                        let regime = regime_name.to_string();
                        let sub_component = self.subs[*j].name().to_string();
                        let port = port.clone();
                        return Err(if caused_by(&deliveries, delivery, &key) {
                            ComposeError::EventCascadeCycle {
                                component,
                                regime,
                                sub_component,
                                port,
                            }
                        } else {
                            ComposeError::EventFanIn {
                                component,
                                regime,
                                sub_component,
                                port,
                            }
                        });
                    }
                    fired.insert(key.clone());
                    deliveries.push((key, delivery));
                    log::debug!(
                        "in regime '{regime_name}' of '{}': '{}' delivered to '{}'",
                        self.component,
                        event.port_name,
                        port
                    );
                    queue.push_back((*j, &on_event.body, Some(deliveries.len() - 1)));
                }
            }
        }
        Ok(cascade)
    }
}

/// True if `key` lies on the chain of deliveries leading to `delivery`.
fn caused_by(
    deliveries: &[((usize, String), Option<usize>)],
    mut delivery: Option<usize>,
    key: &(usize, String),
) -> bool {
    while let Some(index) = delivery {
        let (fired, parent) = &deliveries[index];
        if fired == key {
            return true;
        }
        delivery = *parent;
    }
    false
}
