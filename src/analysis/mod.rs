//! Pure computations over fetched catalogs and stored snapshots.

pub mod activity;
pub mod classify;
pub mod team;

pub use activity::{format_relative_time, parse_timestamp};
pub use classify::classify;
pub use team::{aggregate_team, load_roster, Member, MemberRow, TeamSummary};
