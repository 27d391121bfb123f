use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(TaskId);
id_newtype!(UserId);

/// One to-do item as the remote service reports it.
///
/// `description` is not part of every remote payload, so it defaults to an
/// empty string when the field is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub completed: bool,
    pub user_id: UserId,
}

impl Task {
    pub fn status_label(&self) -> &'static str {
        if self.completed {
            "Completed"
        } else {
            "Not Completed"
        }
    }
}
