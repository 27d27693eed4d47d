//! Activity queries and lifecycle commands.
//!
//! # Commands
//!
//! - `pacer list [--member NAME] [--awaiting EMAIL] [--overdue] [--status S]`
//! - `pacer show <ID>`
//! - `pacer add <NAME> --member NAME --deadline RFC3339`
//! - `pacer start|approve|reject|cancel <ID>`
//! - `pacer request|complete <ID> [--outcome O]`
//!
//! `<ID>` is a full activity id or an unambiguous prefix of one. Every
//! command pulls first; mutating commands push the whole collection after.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use pacer_core::{
    Activity, ActivityId, ActivityStatus, ActivityTiming, Outcome, Priority, Transition,
    Workspace,
};
use pacer_sync::SyncCoordinator;
use serde::Serialize;
use uuid::Uuid;

/// Shortest id prefix accepted for lookup.
const MIN_ID_PREFIX: usize = 4;

/// Arguments for `pacer list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only activities assigned to this member name.
    #[arg(long)]
    pub member: Option<String>,

    /// Only activities awaiting approval by this manager email.
    #[arg(long)]
    pub awaiting: Option<String>,

    /// Only activities past their deadline and not finished.
    #[arg(long)]
    pub overdue: bool,

    /// Only activities in this status.
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `pacer show`.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Activity id or unique prefix.
    pub id: String,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// A single activity reference.
#[derive(Debug, Args)]
pub struct IdArg {
    /// Activity id or unique prefix.
    pub id: String,
}

/// An activity reference with an optional explicit outcome.
#[derive(Debug, Args)]
pub struct OutcomeArgs {
    /// Activity id or unique prefix.
    pub id: String,

    /// Outcome to record; classified from the deadline when omitted.
    #[arg(long, value_enum)]
    pub outcome: Option<OutcomeArg>,
}

/// Arguments for `pacer add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Activity name.
    pub name: String,

    /// Name of the assigned team member.
    #[arg(long)]
    pub member: String,

    /// Deadline in RFC 3339 form, e.g. `2024-06-03T17:00:00+02:00`.
    #[arg(long)]
    pub deadline: String,

    /// Priority level.
    #[arg(long, value_enum, default_value = "p4")]
    pub priority: PriorityArg,

    /// Free-text description.
    #[arg(long, default_value = "")]
    pub description: String,

    /// Manager email for approval routing (defaults to the team's).
    #[arg(long)]
    pub manager_email: Option<String>,
}

/// Outcome values accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutcomeArg {
    /// Finished well before the deadline.
    Ahead,
    /// Finished close to the deadline.
    JustInTime,
    /// Finished after the deadline.
    Overrun,
}

impl From<OutcomeArg> for Outcome {
    fn from(arg: OutcomeArg) -> Self {
        match arg {
            OutcomeArg::Ahead => Self::Ahead,
            OutcomeArg::JustInTime => Self::JustInTime,
            OutcomeArg::Overrun => Self::Overrun,
        }
    }
}

/// Priority values accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PriorityArg {
    /// Most urgent.
    P1,
    /// High.
    P2,
    /// Normal.
    P3,
    /// Least urgent.
    P4,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::P1 => Self::P1,
            PriorityArg::P2 => Self::P2,
            PriorityArg::P3 => Self::P3,
            PriorityArg::P4 => Self::P4,
        }
    }
}

/// Status filter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Waiting for the assignee to start.
    Pending,
    /// Being worked on.
    Running,
    /// Waiting for the manager's decision.
    AwaitingApproval,
    /// Finished and approved.
    Completed,
    /// Abandoned.
    Canceled,
}

impl From<StatusArg> for ActivityStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => Self::TeamMemberPending,
            StatusArg::Running => Self::Running,
            StatusArg::AwaitingApproval => Self::ManagerPending,
            StatusArg::Completed => Self::Completed,
            StatusArg::Canceled => Self::Canceled,
        }
    }
}

// ============================================================================
// Output
// ============================================================================

/// JSON view of an activity with derived timings.
#[derive(Debug, Serialize)]
pub struct ActivityView {
    id: ActivityId,
    name: String,
    description: String,
    member: Option<String>,
    team: Option<String>,
    priority: &'static str,
    status: &'static str,
    outcome: Option<&'static str>,
    created_at: DateTime<Utc>,
    deadline: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    manager_email: Option<String>,
    overdue: bool,
    time_remaining: String,
    time_progress: f64,
    completion_delta_secs: Option<i64>,
}

impl ActivityView {
    fn new(workspace: &Workspace, activity: &Activity, now: DateTime<Utc>) -> Self {
        let timing = ActivityTiming::new(activity, now);
        let team = workspace
            .teams()
            .iter()
            .find(|t| t.has_member(activity.assigned_member()));
        Self {
            id: activity.id(),
            name: activity.name().to_string(),
            description: activity.description().to_string(),
            member: workspace
                .member(activity.assigned_member())
                .map(|m| m.name().to_string()),
            team: team.map(|t| t.name().to_string()),
            priority: activity.priority().as_token(),
            status: activity.status().as_label(),
            outcome: activity.outcome().map(Outcome::as_label),
            created_at: activity.created_at(),
            deadline: activity.deadline(),
            started_at: activity.started_at(),
            completed_at: activity.completed_at(),
            manager_email: activity
                .manager_email()
                .or_else(|| team.and_then(|t| t.manager_email()))
                .map(str::to_string),
            overdue: timing.is_overdue(),
            time_remaining: timing.time_remaining(),
            time_progress: timing.time_progress(),
            completion_delta_secs: timing.completion_delta().map(|d| d.num_seconds()),
        }
    }

    fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }

    fn line(&self) -> String {
        format!(
            "{}  {:<19}  {}  {}  ({}, {})",
            self.short_id(),
            self.status,
            self.priority,
            self.name,
            self.member.as_deref().unwrap_or("?"),
            self.time_remaining,
        )
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize output")?
    );
    Ok(())
}

// ============================================================================
// Lookup
// ============================================================================

/// Resolves a full id or unambiguous id prefix to an activity id.
pub(crate) fn resolve_activity(workspace: &Workspace, query: &str) -> Result<ActivityId> {
    let query = query.trim();
    if let Ok(id) = Uuid::parse_str(query) {
        if workspace.find_activity(id).is_some() {
            return Ok(id);
        }
        bail!("no activity with id {id}");
    }

    let prefix: String = query
        .chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if prefix.len() < MIN_ID_PREFIX {
        bail!("activity id prefix {query:?} is too short (need at least {MIN_ID_PREFIX} characters)");
    }

    let mut matches = workspace
        .activities()
        .map(Activity::id)
        .filter(|id| id.simple().to_string().starts_with(&prefix));
    match (matches.next(), matches.next()) {
        (Some(id), None) => Ok(id),
        (None, _) => bail!("no activity matches {query:?}"),
        (Some(_), Some(_)) => bail!("activity id prefix {query:?} is ambiguous"),
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Execute `pacer list`.
pub async fn list(coordinator: &mut SyncCoordinator, args: &ListArgs) -> Result<()> {
    coordinator.pull().await.context("failed to pull workspace")?;
    let workspace = coordinator.workspace();
    let now = coordinator.clock().now();

    let mut selected: Vec<&Activity> = match &args.awaiting {
        Some(email) => workspace.awaiting_approval(email),
        None => workspace.activities().collect(),
    };
    if let Some(name) = &args.member {
        selected.retain(|a| {
            workspace
                .member(a.assigned_member())
                .is_some_and(|m| m.name() == name.as_str())
        });
    }
    if args.overdue {
        selected.retain(|a| ActivityTiming::new(a, now).is_overdue());
    }
    if let Some(status) = args.status {
        let status = ActivityStatus::from(status);
        selected.retain(|a| a.status() == status);
    }
    selected.sort_by_key(|a| (a.priority(), a.deadline()));

    let views: Vec<ActivityView> = selected
        .into_iter()
        .map(|a| ActivityView::new(workspace, a, now))
        .collect();
    if args.json {
        return print_json(&views);
    }
    if views.is_empty() {
        println!("No activities.");
    }
    for view in &views {
        println!("{}", view.line());
    }
    Ok(())
}

/// Execute `pacer show`.
pub async fn show(coordinator: &mut SyncCoordinator, args: &ShowArgs) -> Result<()> {
    coordinator.pull().await.context("failed to pull workspace")?;
    let workspace = coordinator.workspace();
    let id = resolve_activity(workspace, &args.id)?;
    let activity = workspace
        .find_activity(id)
        .context("activity disappeared after lookup")?;
    let view = ActivityView::new(workspace, activity, coordinator.clock().now());

    if args.json {
        return print_json(&view);
    }
    println!("{}", view.name);
    println!("  id:         {}", view.id);
    println!("  status:     {}", view.status);
    if let Some(outcome) = view.outcome {
        println!("  outcome:    {outcome}");
    }
    println!("  priority:   {}", view.priority);
    println!(
        "  member:     {} ({})",
        view.member.as_deref().unwrap_or("?"),
        view.team.as_deref().unwrap_or("no team")
    );
    println!("  deadline:   {} ({})", view.deadline, view.time_remaining);
    println!("  progress:   {:.0}%", view.time_progress * 100.0);
    if !view.description.is_empty() {
        println!("  {}", view.description);
    }
    Ok(())
}

/// Execute `pacer add`.
pub async fn add(coordinator: &mut SyncCoordinator, args: &AddArgs) -> Result<()> {
    let deadline = DateTime::parse_from_rfc3339(&args.deadline)
        .with_context(|| format!("invalid deadline {:?}", args.deadline))?
        .with_timezone(&Utc);

    coordinator.pull().await.context("failed to pull workspace")?;
    let workspace = coordinator.workspace();
    let mut candidates = workspace.teams().iter().filter_map(|team| {
        team.members()
            .iter()
            .find(|m| m.name() == args.member)
            .map(|m| (team.name().to_string(), m.id()))
    });
    let (team_name, member_id) = match (candidates.next(), candidates.next()) {
        (Some(found), None) => found,
        (None, _) => bail!("no team member named {:?}", args.member),
        (Some(_), Some(_)) => bail!("member name {:?} exists on several teams", args.member),
    };

    let mut activity =
        Activity::new_with_timestamp(&args.name, member_id, deadline, coordinator.clock().now())
            .with_description(&args.description)
            .with_priority(args.priority.into());
    if let Some(email) = &args.manager_email {
        activity = activity.with_manager_email(email);
    }
    let id = activity.id();

    coordinator
        .mutate(|workspace| {
            workspace
                .team_mut(&team_name)
                .map(|team| team.add_activity(activity))
        })
        .context("team disappeared after lookup")??;
    coordinator.push().await.context("failed to push activities")?;

    println!("{id}");
    Ok(())
}

async fn run_transition(
    coordinator: &mut SyncCoordinator,
    query: &str,
    transition: Transition,
) -> Result<()> {
    coordinator.pull().await.context("failed to pull workspace")?;
    let id = resolve_activity(coordinator.workspace(), query)?;
    let activity = coordinator.transition(id, transition)?;
    let (name, status, outcome) = (
        activity.name().to_string(),
        activity.status(),
        activity.outcome(),
    );
    coordinator.push().await.context("failed to push activities")?;

    match outcome {
        Some(outcome) => println!("{name}: {status} ({outcome})"),
        None => println!("{name}: {status}"),
    }
    Ok(())
}

/// Execute `pacer start`.
pub async fn start(coordinator: &mut SyncCoordinator, args: &IdArg) -> Result<()> {
    run_transition(coordinator, &args.id, Transition::Start).await
}

/// Execute `pacer request`.
pub async fn request(coordinator: &mut SyncCoordinator, args: &OutcomeArgs) -> Result<()> {
    let transition = Transition::RequestCompletion {
        outcome: args.outcome.map(Outcome::from),
    };
    run_transition(coordinator, &args.id, transition).await
}

/// Execute `pacer approve`.
pub async fn approve(coordinator: &mut SyncCoordinator, args: &IdArg) -> Result<()> {
    run_transition(coordinator, &args.id, Transition::Approve).await
}

/// Execute `pacer reject`.
pub async fn reject(coordinator: &mut SyncCoordinator, args: &IdArg) -> Result<()> {
    run_transition(coordinator, &args.id, Transition::Reject).await
}

/// Execute `pacer cancel`.
pub async fn cancel(coordinator: &mut SyncCoordinator, args: &IdArg) -> Result<()> {
    run_transition(coordinator, &args.id, Transition::Cancel).await
}

/// Execute `pacer complete`.
pub async fn complete(coordinator: &mut SyncCoordinator, args: &OutcomeArgs) -> Result<()> {
    let transition = Transition::CompleteDirectly {
        outcome: args.outcome.map(Outcome::from),
    };
    run_transition(coordinator, &args.id, transition).await
}
