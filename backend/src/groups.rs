//! Round-robin group order
//!
//! Records the finishing order inside one group and re-derives every slot
//! that POSITION links fill from the group's container. The call is guarded
//! and atomic exactly like an outcome: a playoff slot that changes occupant
//! while it (or anything after it) shows genuine play rejects the call.

use crate::error::DrawError;
use crate::graph::targets::position_fed_match_ups;
use crate::models::draw::DrawDefinition;
use crate::models::event::ApplyResult;
use crate::models::outcome::PropagationOptions;
use crate::propagation::{is_active, is_active_downstream, propagate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Finishing order of one participant inside its group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupFinish {
    pub participant_id: String,

    /// 1-based order; `None` clears it
    #[serde(default)]
    pub group_order: Option<u32>,
}

impl GroupFinish {
    pub fn new(participant_id: impl Into<String>, group_order: u32) -> Self {
        Self {
            participant_id: participant_id.into(),
            group_order: Some(group_order),
        }
    }
}

/// Set group order for participants of one group and re-seed playoffs
pub fn apply_group_order(
    draw: &mut DrawDefinition,
    group_id: &str,
    finishes: &[GroupFinish],
    options: &PropagationOptions,
) -> Result<ApplyResult, DrawError> {
    if draw.structures.is_empty() {
        return Err(DrawError::MissingDrawDefinition);
    }
    let container_id = draw
        .container_of(group_id)
        .map(|c| c.structure_id.clone())
        .ok_or_else(|| DrawError::invalid(format!("{} is not a round-robin group", group_id)))?;

    let mut working = draw.clone();
    {
        let group = working
            .bracket_mut(group_id)
            .ok_or_else(|| DrawError::invalid(format!("{} is not a round-robin group", group_id)))?;
        let size = group.position_assignments.len() as u32;
        for finish in finishes {
            if let Some(order) = finish.group_order {
                if order == 0 || order > size {
                    return Err(DrawError::invalid(format!(
                        "groupOrder {} outside 1..={} for {}",
                        order, size, finish.participant_id
                    )));
                }
            }
            let assignment = group
                .position_assignments
                .iter_mut()
                .find(|a| a.participant_id.as_deref() == Some(finish.participant_id.as_str()))
                .ok_or_else(|| {
                    DrawError::invalid(format!(
                        "{} is not in group {}",
                        finish.participant_id, group_id
                    ))
                })?;
            assignment.group_order = finish.group_order;
        }

        let mut seen = HashSet::new();
        for order in group.position_assignments.iter().filter_map(|a| a.group_order) {
            if !seen.insert(order) {
                return Err(DrawError::invalid(format!(
                    "groupOrder {} used twice in {}",
                    order, group_id
                )));
            }
        }
    }

    let seeds = position_fed_match_ups(&working, &container_id);
    let result = propagate(draw, &mut working, &seeds, options)?;

    for updated in &result.updated_match_ups {
        if !seeds.contains(&updated.match_up_id) {
            continue;
        }
        let Some(prior) = draw.match_up(&updated.match_up_id) else {
            continue;
        };
        if prior.sides == updated.sides {
            continue;
        }
        if is_active(prior) || is_active_downstream(draw, &prior.match_up_id)? {
            warn!(
                group = %group_id,
                match_up = %prior.match_up_id,
                "rejected group order: playoff play depends on it"
            );
            return Err(DrawError::incompatible(format!(
                "{}: playoff match-up {} already depends on the current group order",
                group_id, prior.match_up_id
            )));
        }
    }

    debug!(group = %group_id, changes = result.len(), "applied group order");
    *draw = working;
    Ok(result)
}
