/// Tactical micro-analysis used by the critical and brilliant checks
/// Each layer builds on the one before: attackers -> defenders -> safety
/// -> {danger levels, trapped pieces}

pub mod attackers;
pub mod danger_levels;
pub mod defenders;
pub mod safety;
pub mod trapped;
