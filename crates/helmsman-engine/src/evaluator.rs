//! Matches an `OfferRequirement` against a list of offers (§4.a). Pure functions over plain
//! records, in the style of a planner module rather than a stateful service — grounded on the
//! same "pure decision functions + fixture-builder tests" shape used elsewhere in this ecosystem
//! for offer/placement-adjacent logic.

use helmsman_kernel::model::PlacementRule;
use helmsman_kernel::offer::{CommandInfo, Offer, Resource, TaskInfo};
use helmsman_kernel::operation::{OfferRecommendation, OfferRequirement, Operation};

#[derive(Debug, Default, Clone, Copy)]
pub struct OfferEvaluator;

impl OfferEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// The first offer (in the given order) that fully satisfies the requirement wins; never
    /// emits a partial plan. Returns an empty vector if no offer satisfies it.
    pub fn evaluate(&self, requirement: &OfferRequirement, offers: &[Offer]) -> Vec<OfferRecommendation> {
        for offer in offers {
            if !Self::satisfies_placement(requirement.placement.as_ref(), offer) {
                continue;
            }
            if let Some(recommendations) = Self::try_satisfy(requirement, offer) {
                return recommendations;
            }
        }
        Vec::new()
    }

    fn satisfies_placement(rule: Option<&PlacementRule>, offer: &Offer) -> bool {
        match rule {
            None => true,
            Some(PlacementRule::AttributeEquals { name, value }) => offer.attribute(name) == Some(value.as_str()),
            Some(PlacementRule::AnyOf(rules)) => rules.iter().any(|r| Self::satisfies_placement(Some(r), offer)),
            Some(PlacementRule::AllOf(rules)) => rules.iter().all(|r| Self::satisfies_placement(Some(r), offer)),
        }
    }

    fn try_satisfy(requirement: &OfferRequirement, offer: &Offer) -> Option<Vec<OfferRecommendation>> {
        let cpus_needed = requirement.total_cpus();
        let mem_needed = requirement.total_mem();
        // Prefer already-reserved resources belonging to this framework over unreserved ones:
        // the reserved pool is checked first and only the shortfall must come from unreserved
        // capacity, matching §4.a(ii).
        let mut reserved_cpus = offer.reserved_scalar_total("cpus");
        let mut reserved_mem = offer.reserved_scalar_total("mem");
        let unreserved_cpus = offer.scalar_total("cpus") - reserved_cpus;
        let unreserved_mem = offer.scalar_total("mem") - reserved_mem;
        let cpus_shortfall = (cpus_needed - reserved_cpus.min(cpus_needed)).max(0.0);
        let mem_shortfall = (mem_needed - reserved_mem.min(mem_needed)).max(0.0);
        if cpus_shortfall > unreserved_cpus || mem_shortfall > unreserved_mem {
            return None;
        }

        let mut recommendations = Vec::new();

        if let Some(teardown) = &requirement.teardown {
            recommendations.push(OfferRecommendation {
                offer_id: offer.id.clone(),
                operation: Operation::Destroy { volume_bytes: teardown.persistent_volume_bytes.unwrap_or(0) },
            });
            recommendations.push(OfferRecommendation {
                offer_id: offer.id.clone(),
                operation: Operation::Unreserve { resources: teardown.clone() },
            });
        }

        if requirement.needs_persistent_volume() {
            for task in &requirement.tasks {
                if let Some(bytes) = task.resources.persistent_volume_bytes {
                    // Already reserved under this framework/principal from a prior cycle: no need
                    // to reserve again, only to (re-)create the volume.
                    let already_reserved = reserved_cpus >= task.resources.cpus && reserved_mem >= task.resources.mem;
                    if already_reserved {
                        reserved_cpus -= task.resources.cpus;
                        reserved_mem -= task.resources.mem;
                    } else {
                        recommendations.push(OfferRecommendation {
                            offer_id: offer.id.clone(),
                            operation: Operation::Reserve { resources: task.resources.clone() },
                        });
                    }
                    recommendations.push(OfferRecommendation {
                        offer_id: offer.id.clone(),
                        operation: Operation::Create { volume_bytes: bytes },
                    });
                }
            }
        }

        for task in &requirement.tasks {
            let task_info = TaskInfo {
                task_id: task.task_id.clone(),
                name: task.name.clone(),
                agent_id: offer.agent_id.clone(),
                resources: vec![Resource::scalar("cpus", task.resources.cpus), Resource::scalar("mem", task.resources.mem)],
                command: CommandInfo { value: String::new(), arguments: Vec::new(), env: Vec::new() },
                executor: task.executor.clone(),
            };
            recommendations.push(OfferRecommendation {
                offer_id: offer.id.clone(),
                operation: Operation::Launch { task: task_info },
            });
        }

        Some(recommendations)
    }
}
