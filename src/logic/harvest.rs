use crate::models::{DailyForecast, HarvestTask};
use chrono::NaiveDate;
use std::collections::VecDeque;

/// Smallest usable daily capacity; non-positive inputs are raised to this.
pub const MIN_HARVEST_CAPACITY_KG_DAY: f64 = 0.001;

/// Backlog below this is floating-point residue, not fruit.
const BACKLOG_EPSILON_KG: f64 = 1e-9;

/// Ready mass waiting in the field, tagged with the day it became ready
#[derive(Debug, Clone, PartialEq)]
struct ReadyLot {
    ready_on: NaiveDate,
    kg: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HarvestSchedule {
    pub tasks: Vec<HarvestTask>,
    /// Ready mass still in the field after the last day
    pub unharvested_kg: f64,
    /// Ready date of the oldest unharvested lot, if any remain
    pub oldest_unharvested: Option<NaiveDate>,
    /// Longest wait, in days, between a lot turning ready and being picked
    pub max_wait_days: i64,
}

impl HarvestSchedule {
    pub fn is_cleared(&self) -> bool {
        self.unharvested_kg <= 0.0
    }
}

/// Greedy first-in-first-out schedule under a daily capacity ceiling.
///
/// Day 0 is `as_of` and starts with `yield_now_kg` in the backlog; each entry
/// of `daily` is one subsequent day. Days with nothing picked produce no task.
pub fn schedule_harvest(
    as_of: NaiveDate,
    yield_now_kg: f64,
    daily: &[DailyForecast],
    capacity_kg_day: f64,
) -> HarvestSchedule {
    let mut backlog: VecDeque<ReadyLot> = VecDeque::new();
    let mut tasks = Vec::with_capacity(daily.len() + 1);
    let mut max_wait_days = 0;

    let days = std::iter::once((as_of, yield_now_kg))
        .chain(daily.iter().map(|d| (d.date, d.ready_kg)));

    for (date, ready_kg) in days {
        if ready_kg > BACKLOG_EPSILON_KG {
            backlog.push_back(ReadyLot {
                ready_on: date,
                kg: ready_kg,
            });
        }

        let mut room = capacity_kg_day;
        let mut picked = 0.0;
        while room > BACKLOG_EPSILON_KG {
            let Some(lot) = backlog.front_mut() else {
                break;
            };
            let take = lot.kg.min(room);
            lot.kg -= take;
            room -= take;
            picked += take;
            max_wait_days = max_wait_days.max((date - lot.ready_on).num_days());
            if lot.kg <= BACKLOG_EPSILON_KG {
                backlog.pop_front();
            }
        }

        if picked > BACKLOG_EPSILON_KG {
            tasks.push(HarvestTask {
                date,
                harvest_kg: picked.min(capacity_kg_day),
            });
        }
    }

    let unharvested_kg: f64 = backlog.iter().map(|lot| lot.kg).sum();
    let unharvested_kg = if unharvested_kg > BACKLOG_EPSILON_KG {
        unharvested_kg
    } else {
        0.0
    };

    HarvestSchedule {
        tasks,
        unharvested_kg,
        oldest_unharvested: backlog.front().map(|lot| lot.ready_on),
        max_wait_days,
    }
}
