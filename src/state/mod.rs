// Turtle table and snapshot reconciliation

mod entity;
mod reconcile;

pub use entity::{
    Snapshot, Turtle, TurtlePatch, BATTERY_VOLTAGE, ENABLED, HOME_GOAL, ROLE, TEAM_COLOR,
};
pub use reconcile::{reconcile, TurtleTable};

#[cfg(test)]
mod tests;
