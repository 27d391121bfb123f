//! Read-only projection of the collection into the displayed list.
//!
//! Search and sort are independent: a search always projects over the whole
//! collection with no sort, and a sort always projects over the whole
//! collection with no search. [`ViewState::search`] and [`ViewState::sorted`]
//! build the two shapes the controller uses.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shared::domain::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortCriterion {
    #[default]
    None,
    Completed,
    NotCompleted,
}

impl SortCriterion {
    fn keeps(self, task: &Task) -> bool {
        match self {
            Self::None => true,
            Self::Completed => task.completed,
            Self::NotCompleted => !task.completed,
        }
    }
}

impl FromStr for SortCriterion {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "" | "none" => Ok(Self::None),
            "completed" => Ok(Self::Completed),
            "notCompleted" | "not-completed" | "not_completed" => Ok(Self::NotCompleted),
            other => Err(format!("unknown sort criterion '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub search_query: String,
    pub sort: SortCriterion,
}

impl ViewState {
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            search_query: query.into(),
            sort: SortCriterion::None,
        }
    }

    pub fn sorted(sort: SortCriterion) -> Self {
        Self {
            search_query: String::new(),
            sort,
        }
    }

    pub fn project(&self, tasks: &[Task]) -> Vec<Task> {
        project(tasks, &self.search_query, self.sort)
    }
}

/// Case-insensitive title search, then completion filter. Relative order of
/// the kept tasks is the collection order.
pub fn project(tasks: &[Task], search_query: &str, sort: SortCriterion) -> Vec<Task> {
    let needle = search_query.to_lowercase();
    tasks
        .iter()
        .filter(|task| needle.is_empty() || task.title.to_lowercase().contains(&needle))
        .filter(|task| sort.keeps(task))
        .cloned()
        .collect()
}
