//! crates/rural_ed_core/src/planner.rs
//!
//! Greedy weekly planner. The weekly bandwidth is split evenly over seven days
//! (remainder on day 0) and resources are placed first-fit in priority order.

use std::cmp::Reverse;
use tracing::{debug, warn};

use crate::domain::{DayPlan, Resource, StudentProfile, StudyPlan};

pub const DAYS_PER_WEEK: usize = 7;

/// Per-day budgets for a weekly bandwidth.
pub fn day_budgets(weekly_bandwidth_kb: u64) -> [u64; DAYS_PER_WEEK] {
    let days = DAYS_PER_WEEK as u64;
    let mut budgets = [weekly_bandwidth_kb / days; DAYS_PER_WEEK];
    budgets[0] += weekly_bandwidth_kb % days;
    budgets
}

fn relevance(resource: &Resource, profile: &StudentProfile) -> usize {
    resource
        .tags
        .iter()
        .filter(|t| profile.known_topics.contains(*t))
        .count()
}

/// Builds the weekly plan. Pure: identical inputs give identical plans.
///
/// Priority: preferred language first, then more known-topic overlap, then
/// smaller size. Ties keep catalog order. A resource that fits no remaining day
/// is deferred.
pub fn build_plan(resources: &[Resource], profile: &StudentProfile) -> StudyPlan {
    let mut days: Vec<DayPlan> = day_budgets(profile.weekly_bandwidth_kb)
        .iter()
        .enumerate()
        .map(|(day_index, &budget_kb)| DayPlan {
            day_index,
            budget_kb,
            assigned_resources: Vec::new(),
            cumulative_size_kb: 0,
        })
        .collect();

    let mut ordered: Vec<&Resource> = resources.iter().collect();
    ordered.sort_by_key(|r| {
        (
            r.language != profile.preferred_language,
            Reverse(relevance(r, profile)),
            r.size_kb,
        )
    });

    let mut plan = StudyPlan::default();
    let mut seen = std::collections::HashSet::new();
    for resource in ordered {
        if !seen.insert(resource.id.as_str()) {
            debug!("Resource {} listed twice; keeping first placement", resource.id);
            continue;
        }
        match days.iter_mut().find(|d| d.remaining_kb() >= resource.size_kb) {
            Some(day) => {
                day.assigned_resources.push(resource.id.clone());
                day.cumulative_size_kb += resource.size_kb;
            }
            None => {
                warn!(
                    "Deferred resource {} ({} KB): no day has enough remaining bandwidth",
                    resource.id, resource.size_kb
                );
                plan.deferred.push(resource.id.clone());
            }
        }
    }

    plan.days = days;
    plan
}
