//! Financial goals, e.g. paying off a loan, whose balance is reconstructed
//! from the transactions linked to them.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;
mod view;

pub use create::{create_goal_endpoint, get_new_goal_page};
pub use db::{
    NewGoal, create_goal, create_goal_table, delete_goal, get_goal, get_goal_summaries, get_goals,
    update_goal,
};
pub use delete::delete_goal_endpoint;
pub use domain::{
    CreateGoalFormData, EditGoalFormData, Goal, GoalSummary, GoalType, check_target_amount,
};
pub use edit::{get_edit_goal_page, update_goal_endpoint};
pub use list::get_goals_page;
pub use view::get_goal_page;
