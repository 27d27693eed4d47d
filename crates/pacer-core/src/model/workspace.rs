//! The in-memory team/activity tree held by each client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::activity::{Activity, ActivityId, ActivityStatus};
use super::member::{MemberId, TeamMember};
use super::team::Team;

/// One decoded membership row: a member plus the team it declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// The member.
    pub member: TeamMember,
    /// Name of the team the member belongs to.
    pub team: String,
    /// Manager email declared on this row, if any.
    pub manager_email: Option<String>,
}

/// All teams known to a client, with their members and activities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    teams: Vec<Team>,
}

impl Workspace {
    /// Creates an empty workspace.
    #[must_use]
    pub const fn new() -> Self {
        Self { teams: Vec::new() }
    }

    /// Builds a workspace from flat membership rows and a flat activity
    /// collection.
    ///
    /// Members are grouped by their declared team name, in order of first
    /// appearance. A team's manager email is the first non-empty one
    /// declared by any of its rows. Each activity goes to the team that
    /// holds its assignee; activities whose assignee is on no team are
    /// dropped with a warning.
    #[must_use]
    pub fn assemble(roster: Vec<RosterEntry>, activities: Vec<Activity>) -> Self {
        let mut teams: Vec<Team> = Vec::new();
        for entry in roster {
            let index = match teams.iter().position(|t| t.name() == entry.team) {
                Some(index) => index,
                None => {
                    teams.push(Team::new(entry.team.clone()));
                    teams.len() - 1
                },
            };
            let team = &mut teams[index];
            team.set_manager_email_if_absent(entry.manager_email);
            team.push_member_unchecked(entry.member);
        }

        for activity in activities {
            match teams
                .iter_mut()
                .find(|t| t.has_member(activity.assigned_member()))
            {
                Some(team) => team.push_activity_unchecked(activity),
                None => warn!(
                    activity_id = %activity.id(),
                    member_id = %activity.assigned_member(),
                    "dropping activity assigned to a member on no team"
                ),
            }
        }

        Self { teams }
    }

    /// Returns the teams.
    #[must_use]
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Adds a team.
    pub fn add_team(&mut self, team: Team) {
        self.teams.push(team);
    }

    /// Looks up a team by name.
    #[must_use]
    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.name() == name)
    }

    /// Looks up a team by name for mutation.
    pub fn team_mut(&mut self, name: &str) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.name() == name)
    }

    /// Iterates over every member of every team.
    pub fn members(&self) -> impl Iterator<Item = &TeamMember> {
        self.teams.iter().flat_map(|t| t.members().iter())
    }

    /// Looks up a member by id across all teams.
    #[must_use]
    pub fn member(&self, id: MemberId) -> Option<&TeamMember> {
        self.members().find(|m| m.id() == id)
    }

    /// Flattens the teams back into membership rows.
    #[must_use]
    pub fn roster(&self) -> Vec<RosterEntry> {
        self.teams
            .iter()
            .flat_map(|team| {
                team.members().iter().map(|member| RosterEntry {
                    member: member.clone(),
                    team: team.name().to_string(),
                    manager_email: team.manager_email().map(str::to_string),
                })
            })
            .collect()
    }

    /// Iterates over every activity of every team.
    pub fn activities(&self) -> impl Iterator<Item = &Activity> {
        self.teams.iter().flat_map(|t| t.activities().iter())
    }

    /// Returns the total number of activities.
    #[must_use]
    pub fn activity_count(&self) -> usize {
        self.teams.iter().map(|t| t.activities().len()).sum()
    }

    /// Finds an activity by id.
    #[must_use]
    pub fn find_activity(&self, id: ActivityId) -> Option<&Activity> {
        self.activities().find(|a| a.id() == id)
    }

    /// Finds an activity by id for mutation.
    pub fn find_activity_mut(&mut self, id: ActivityId) -> Option<&mut Activity> {
        self.teams
            .iter_mut()
            .flat_map(|t| t.activities_mut().iter_mut())
            .find(|a| a.id() == id)
    }

    /// Returns the activities assigned to `member`.
    #[must_use]
    pub fn activities_for_member(&self, member: MemberId) -> Vec<&Activity> {
        self.activities()
            .filter(|a| a.assigned_member() == member)
            .collect()
    }

    /// Returns activities awaiting approval from the manager with `email`.
    ///
    /// An activity's own manager email takes precedence; the team's manager
    /// email applies when the activity has none. Comparison ignores ASCII
    /// case.
    #[must_use]
    pub fn awaiting_approval(&self, email: &str) -> Vec<&Activity> {
        self.teams
            .iter()
            .flat_map(|team| {
                team.activities().iter().filter(move |a| {
                    a.status() == ActivityStatus::ManagerPending
                        && a.manager_email()
                            .or_else(|| team.manager_email())
                            .is_some_and(|m| m.eq_ignore_ascii_case(email))
                })
            })
            .collect()
    }

    /// Returns the activities that are overdue at `now`.
    #[must_use]
    pub fn overdue_at(&self, now: DateTime<Utc>) -> Vec<&Activity> {
        self.activities()
            .filter(|a| a.deadline() < now && !a.is_terminal())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};

    use super::*;

    fn entry(name: &str, team: &str, manager: Option<&str>) -> RosterEntry {
        RosterEntry {
            member: TeamMember::with_id(
                TeamMember::derived_id(team, name),
                name,
                format!("{}@example.com", name.to_lowercase()),
            ),
            team: team.to_string(),
            manager_email: manager.map(str::to_string),
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_assemble_groups_members_by_team() {
        let roster = vec![
            entry("Ada", "Platform", None),
            entry("Lin", "Mobile", Some("m@example.com")),
            entry("Grace", "Platform", Some("p@example.com")),
        ];
        let workspace = Workspace::assemble(roster, Vec::new());

        assert_eq!(workspace.teams().len(), 2);
        let platform = workspace.team("Platform").unwrap();
        assert_eq!(platform.members().len(), 2);
        assert_eq!(platform.manager_email(), Some("p@example.com"));
        assert_eq!(
            workspace.team("Mobile").unwrap().manager_email(),
            Some("m@example.com")
        );
    }

    #[test]
    fn test_assemble_partitions_activities_by_assignee() {
        let roster = vec![entry("Ada", "Platform", None), entry("Lin", "Mobile", None)];
        let ada = roster[0].member.id();
        let lin = roster[1].member.id();
        let activities = vec![
            Activity::new_with_timestamp("a", ada, at(12), at(8)),
            Activity::new_with_timestamp("b", lin, at(12), at(8)),
            Activity::new_with_timestamp("c", ada, at(12), at(8)),
            Activity::new_with_timestamp("orphan", MemberId::new_v4(), at(12), at(8)),
        ];

        let workspace = Workspace::assemble(roster, activities);
        assert_eq!(workspace.team("Platform").unwrap().activities().len(), 2);
        assert_eq!(workspace.team("Mobile").unwrap().activities().len(), 1);
        assert_eq!(workspace.activity_count(), 3);
        assert_eq!(workspace.activities_for_member(ada).len(), 2);
    }

    #[test]
    fn test_roster_flattens_with_team_manager() {
        let roster = vec![
            entry("Ada", "Platform", Some("p@example.com")),
            entry("Grace", "Platform", None),
        ];
        let workspace = Workspace::assemble(roster, Vec::new());
        let flat = workspace.roster();
        assert_eq!(flat.len(), 2);
        assert!(
            flat.iter()
                .all(|e| e.manager_email.as_deref() == Some("p@example.com"))
        );
    }

    #[test]
    fn test_overdue_excludes_terminal() {
        let roster = vec![entry("Ada", "Platform", None)];
        let ada = roster[0].member.id();
        let late = Activity::new_with_timestamp("late", ada, at(9), at(8));
        let mut canceled = Activity::new_with_timestamp("canceled", ada, at(9), at(8));
        canceled.cancel_at(at(8) + TimeDelta::minutes(5)).unwrap();
        let workspace = Workspace::assemble(roster, vec![late, canceled]);

        let overdue = workspace.overdue_at(at(10));
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].name(), "late");
    }

    #[test]
    fn test_awaiting_approval_uses_team_manager_fallback() {
        let roster = vec![entry("Ada", "Platform", Some("Boss@Example.com"))];
        let ada = roster[0].member.id();
        let mut pending = Activity::new_with_timestamp("pending", ada, at(12), at(8));
        pending.start_at(at(9)).unwrap();
        pending.request_completion_at(None, at(10)).unwrap();
        let running = Activity::new_with_timestamp("running", ada, at(12), at(8));
        let workspace = Workspace::assemble(roster, vec![pending, running]);

        let awaiting = workspace.awaiting_approval("boss@example.com");
        assert_eq!(awaiting.len(), 1);
        assert_eq!(awaiting[0].name(), "pending");
        assert!(workspace.awaiting_approval("other@example.com").is_empty());
    }
}
