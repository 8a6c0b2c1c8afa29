// ABOUTME: Blue/green topology validator.
// ABOUTME: Resolves the named records and checks load balancer, port, registration and controller rules.

use snafu::ensure;
use std::collections::HashSet;

use super::error::{InvalidTopologySnafu, InvalidTrafficShiftSnafu, TopologyError, Violation};
use super::model::{
    BlueGreenTopology, DeploymentControllerType, ListenerProtocol, ListenerRecord, ServiceRecord,
    TargetGroupRecord, TopologyResources,
};
use super::traffic::TrafficShift;
use crate::diagnostics::Warning;
use crate::types::LoadBalancerRef;

/// A topology whose records all resolved and passed every check.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedTopology<'a> {
    pub service: &'a ServiceRecord,
    pub listener: &'a ListenerRecord,
    pub test_listener: &'a ListenerRecord,
    pub blue_target_group: &'a TargetGroupRecord,
    pub green_target_group: &'a TargetGroupRecord,
    pub traffic_shift: TrafficShift,
}

impl ValidatedTopology<'_> {
    /// The load balancer fronting both listeners.
    pub fn load_balancer(&self) -> &LoadBalancerRef {
        &self.listener.load_balancer
    }

    pub fn controller(&self) -> DeploymentControllerType {
        // Validation guarantees exactly one controller type.
        self.service.deployment_controllers[0]
    }

    /// Legal but questionable choices worth showing to the operator.
    pub fn warnings(&self) -> Vec<Warning> {
        let mut warnings = Vec::new();

        if self.controller() == DeploymentControllerType::Ecs {
            warnings.push(Warning::ecs_controller(format!(
                "service '{}' uses the ECS deployment controller; blue/green traffic shifting needs CODE_DEPLOY",
                self.service.name
            )));
        }

        if self.service.is_spot_only() {
            warnings.push(Warning::spot_only_capacity(format!(
                "service '{}' runs on spot capacity only; tasks may be interrupted mid-shift",
                self.service.name
            )));
        }

        warnings
    }
}

/// Check a blue/green topology against the declared resource records.
pub fn validate_topology<'a>(
    topology: &BlueGreenTopology,
    resources: &'a TopologyResources,
) -> Result<ValidatedTopology<'a>, TopologyError> {
    let service = resources.service(&topology.service).ok_or_else(|| {
        InvalidTopologySnafu {
            reason: Violation::UnknownService(topology.service.clone()),
        }
        .build()
    })?;
    let listener = find_listener(resources, &topology.listener)?;
    let test_listener = find_listener(resources, &topology.test_listener)?;
    let blue = find_target_group(resources, &topology.blue_target_group)?;
    let green = find_target_group(resources, &topology.green_target_group)?;

    ensure!(
        listener.name != test_listener.name,
        InvalidTopologySnafu {
            reason: Violation::SameListener(listener.name.clone()),
        }
    );
    ensure!(
        blue.name != green.name,
        InvalidTopologySnafu {
            reason: Violation::SameTargetGroup(blue.name.clone()),
        }
    );

    for l in [listener, test_listener] {
        ensure!(
            l.protocol != ListenerProtocol::Https || l.certificate.is_some(),
            InvalidTopologySnafu {
                reason: Violation::MissingCertificate(l.name.clone()),
            }
        );
    }

    let load_balancer = &listener.load_balancer;
    let fronted = [
        (format!("test listener '{}'", test_listener.name), &test_listener.load_balancer),
        (format!("blue target group '{}'", blue.name), &blue.load_balancer),
        (format!("green target group '{}'", green.name), &green.load_balancer),
    ];
    for (resource, found) in fronted {
        ensure!(
            found == load_balancer,
            InvalidTopologySnafu {
                reason: Violation::LoadBalancerMismatch {
                    resource,
                    expected: load_balancer.clone(),
                    found: found.clone(),
                },
            }
        );
    }

    ensure!(
        listener.port != test_listener.port,
        InvalidTopologySnafu {
            reason: Violation::SamePort(listener.port),
        }
    );

    for group in [blue, green] {
        ensure!(
            group.registers(&service.name),
            InvalidTopologySnafu {
                reason: Violation::ServiceNotRegistered {
                    target_group: group.name.clone(),
                    service: service.name.clone(),
                },
            }
        );
    }

    let controllers: HashSet<DeploymentControllerType> =
        service.deployment_controllers.iter().copied().collect();
    match controllers.len() {
        0 => {
            return InvalidTopologySnafu {
                reason: Violation::NoDeploymentController(service.name.clone()),
            }
            .fail();
        }
        1 => {}
        _ => {
            return InvalidTopologySnafu {
                reason: Violation::MultipleDeploymentControllers(service.name.clone()),
            }
            .fail();
        }
    }

    ensure!(
        service.capacity_providers.iter().any(|s| s.weight > 0),
        InvalidTopologySnafu {
            reason: Violation::NoCapacity(service.name.clone()),
        }
    );

    if let Err(reason) = topology.traffic_shift.check() {
        return InvalidTrafficShiftSnafu {
            policy: topology.traffic_shift.to_string(),
            reason,
        }
        .fail();
    }

    tracing::debug!(
        "topology valid: service '{}' behind '{}' (ports {} / {})",
        service.name,
        load_balancer,
        listener.port,
        test_listener.port
    );

    Ok(ValidatedTopology {
        service,
        listener,
        test_listener,
        blue_target_group: blue,
        green_target_group: green,
        traffic_shift: topology.traffic_shift,
    })
}

fn find_listener<'a>(
    resources: &'a TopologyResources,
    name: &crate::types::ListenerRef,
) -> Result<&'a ListenerRecord, TopologyError> {
    resources.listener(name).ok_or_else(|| {
        InvalidTopologySnafu {
            reason: Violation::UnknownListener(name.clone()),
        }
        .build()
    })
}

fn find_target_group<'a>(
    resources: &'a TopologyResources,
    name: &crate::types::TargetGroupRef,
) -> Result<&'a TargetGroupRecord, TopologyError> {
    resources.target_group(name).ok_or_else(|| {
        InvalidTopologySnafu {
            reason: Violation::UnknownTargetGroup(name.clone()),
        }
        .build()
    })
}
