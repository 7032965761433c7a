//! `player`, `team`, `venue`, `series` and `match` subcommands.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use rusqlite::Connection;

use cricstat_catalog::types::*;
use cricstat_db::{
    Cell, Confirmation, EntityKind, ListOptions, OperationError, ResultTable, delete_impact,
};

use crate::CliError;
use crate::cli_types::{
    ClearArgs, ListArgs, MatchAction, MatchFields, OutputArgs, PlayerAction, SeriesAction,
    TeamAction, VenueAction,
};

use super::output;

// ── Patch helpers ───────────────────────────────────────────────────────────

/// Validated `--clear` field names.
pub(crate) struct Clears(HashSet<&'static str>);

impl Clears {
    /// Accept only names from `allowed`.
    pub(crate) fn parse(args: &ClearArgs, allowed: &[&'static str]) -> Result<Self, CliError> {
        let mut set = HashSet::new();
        for name in &args.clear {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            match allowed.iter().find(|a| a.eq_ignore_ascii_case(name)) {
                Some(field) => {
                    set.insert(*field);
                }
                None => {
                    return Err(CliError::invalid(format!(
                        "cannot clear '{}' (clearable fields: {})",
                        name,
                        allowed.join(", "),
                    )));
                }
            }
        }
        Ok(Self(set))
    }

    fn none() -> Self {
        Self(HashSet::new())
    }

    /// Build a patch: cleared, set, or kept when absent.
    pub(crate) fn patch<T>(&self, field: &'static str, value: Option<T>) -> Result<Patch<T>, CliError> {
        match (self.0.contains(field), value) {
            (true, Some(_)) => Err(CliError::invalid(format!(
                "'{}' cannot be both set and cleared",
                field
            ))),
            (true, None) => Ok(Patch::Clear),
            (false, value) => Ok(Patch::from(value)),
        }
    }

    /// Like [`Clears::patch`], treating a blank string as absent.
    pub(crate) fn text(&self, field: &'static str, value: Option<String>) -> Result<Patch<String>, CliError> {
        self.patch(field, value.filter(|v| !v.trim().is_empty()))
    }
}

fn list_options(args: &ListArgs) -> ListOptions {
    ListOptions {
        search: args.search.clone(),
        limit: args.limit,
        offset: args.offset,
    }
}

fn report_update(kind: EntityKind, id: i64, changed: &[&str]) {
    if changed.is_empty() {
        log::info!("No changes to {} {}", kind.label(), id);
    } else {
        log::info!(
            "Updated {} {}: {}",
            kind.label(),
            id,
            changed.join(", ").if_supports_color(Stdout, |t| t.cyan()),
        );
    }
}

fn report_added(kind: EntityKind, id: i64, label: &str) {
    log::info!(
        "{} {} {} {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        "Added".if_supports_color(Stdout, |t| t.bold()),
        kind.label(),
        format!("{} ({})", id, label).if_supports_color(Stdout, |t| t.cyan()),
    );
}

fn not_found(kind: EntityKind, id: i64) -> CliError {
    OperationError::NotFound {
        entity_type: kind.label(),
        id: id.to_string(),
    }
    .into()
}

fn field(name: &str, value: impl std::fmt::Display) {
    log::info!(
        "  {} {}",
        format!("{:<14}", format!("{}:", name)).if_supports_color(Stdout, |t| t.cyan()),
        value,
    );
}

fn opt<T: std::fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Team names by id, loaded on demand.
struct TeamNames<'a> {
    conn: &'a Connection,
    names: HashMap<i64, String>,
}

impl<'a> TeamNames<'a> {
    fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            names: HashMap::new(),
        }
    }

    fn get(&mut self, id: Option<i64>) -> Result<Option<String>, CliError> {
        let Some(id) = id else {
            return Ok(None);
        };
        if let Some(name) = self.names.get(&id) {
            return Ok(Some(name.clone()));
        }
        let name = cricstat_db::get_team(self.conn, id)?.map(|t| t.name);
        if let Some(n) = &name {
            self.names.insert(id, n.clone());
        }
        Ok(name)
    }
}

// ── Delete ──────────────────────────────────────────────────────────────────

fn run_delete(
    conn: &Connection,
    kind: EntityKind,
    id: i64,
    confirm: bool,
    delete: fn(&Connection, i64, Confirmation) -> Result<(), OperationError>,
) -> Result<(), CliError> {
    let impact = delete_impact(conn, kind, id)?;

    let mut effects = Vec::new();
    if impact.matches > 0 {
        effects.push(match kind {
            EntityKind::Match => "the match row will be removed".to_string(),
            _ => format!(
                "{} match(es) will lose their {} reference",
                impact.matches,
                kind.label()
            ),
        });
    }
    if impact.players > 0 {
        effects.push(format!("{} player(s) will lose their team reference", impact.players));
    }
    if impact.performances > 0 {
        effects.push(format!(
            "{} performance row(s) will be removed",
            impact.performances
        ));
    }

    if !confirm {
        log::warn!("This will permanently delete {} {}.", kind.label(), id);
        for effect in &effects {
            log::info!("  {}", effect);
        }
        log::info!("Re-run with --confirm to proceed:");
        log::info!("  cricstat {} delete {} --confirm", kind.label(), id);
        return Ok(());
    }

    delete(conn, id, Confirmation::Confirmed)?;
    log::info!(
        "{}",
        format!("Deleted {} {}.", kind.label(), id).if_supports_color(Stdout, |t| t.bold()),
    );
    for effect in &effects {
        log::info!("  {}", effect);
    }
    Ok(())
}

// ── Player ──────────────────────────────────────────────────────────────────

const PLAYER_CLEARABLE: &[&str] = &["batting_style", "bowling_style", "team"];

pub(crate) fn run_player(db: Option<PathBuf>, action: PlayerAction) -> Result<(), CliError> {
    let (conn, _) = super::open_db(db)?;
    match action {
        PlayerAction::Add {
            name,
            country,
            role,
            batting_style,
            bowling_style,
            team,
        } => {
            let player = NewPlayer {
                batting_style,
                bowling_style,
                team_id: team,
                ..NewPlayer::new(&name, &country, role)
            };
            let id = cricstat_db::insert_player(&conn, &player)?;
            report_added(EntityKind::Player, id, &name);
        }
        PlayerAction::Show { id } => show_player(&conn, id)?,
        PlayerAction::List(args) => {
            let players = cricstat_db::list_players(&conn, &list_options(&args))?;
            let mut teams = TeamNames::new(&conn);
            let mut table = ResultTable::new(&["id", "name", "country", "role", "team"]);
            for p in players {
                table.rows.push(vec![
                    Cell::from(p.id),
                    Cell::from(p.full_name),
                    Cell::from(p.country),
                    Cell::from(p.playing_role.as_str()),
                    Cell::from(teams.get(p.team_id)?),
                ]);
            }
            output::emit(&table, &args.output)?;
        }
        PlayerAction::Update {
            id,
            name,
            country,
            role,
            batting_style,
            bowling_style,
            team,
            clear,
        } => {
            let clears = Clears::parse(&clear, PLAYER_CLEARABLE)?;
            let patch = PlayerPatch {
                full_name: clears.text("name", name)?,
                country: clears.text("country", country)?,
                playing_role: clears.patch("role", role)?,
                batting_style: clears.text("batting_style", batting_style)?,
                bowling_style: clears.text("bowling_style", bowling_style)?,
                team_id: clears.patch("team", team)?,
            };
            let changed = cricstat_db::update_player(&conn, id, &patch)?;
            report_update(EntityKind::Player, id, &changed);
        }
        PlayerAction::Delete { id, confirm } => {
            run_delete(&conn, EntityKind::Player, id, confirm, cricstat_db::delete_player)?
        }
    }
    Ok(())
}

fn show_player(conn: &Connection, id: i64) -> Result<(), CliError> {
    let player = cricstat_db::get_player(conn, id)?.ok_or_else(|| not_found(EntityKind::Player, id))?;
    let team = TeamNames::new(conn).get(player.team_id)?;

    log::info!("{}", player.full_name.if_supports_color(Stdout, |t| t.bold()));
    field("id", player.id);
    field("country", &player.country);
    field("role", player.playing_role);
    field("batting style", opt(&player.batting_style));
    field("bowling style", opt(&player.bowling_style));
    field("team", opt(&team));
    if let Some(ext) = &player.external_id {
        field("external id", ext);
    }

    let careers = cricstat_db::player_career(conn, id, None)?;
    if careers.is_empty() {
        crate::log_blank();
        log::info!("{}", "No recorded performances.".if_supports_color(Stdout, |t| t.dimmed()));
        return Ok(());
    }

    let mut table = ResultTable::new(&[
        "format", "matches", "innings", "runs", "hs", "100s", "50s", "avg", "sr", "wkts",
        "bowl_avg", "econ",
    ]);
    for c in careers {
        table.rows.push(vec![
            Cell::from(c.format.as_str()),
            Cell::from(c.matches),
            Cell::from(c.innings),
            Cell::from(c.runs),
            Cell::from(c.highest_score),
            Cell::from(c.hundreds),
            Cell::from(c.fifties),
            Cell::from(c.batting_average),
            Cell::from(c.strike_rate),
            Cell::from(c.wickets),
            Cell::from(c.bowling_average),
            Cell::from(c.economy_rate),
        ]);
    }
    crate::log_blank();
    output::emit(&table, &OutputArgs::default())
}

// ── Team ────────────────────────────────────────────────────────────────────

pub(crate) fn run_team(db: Option<PathBuf>, action: TeamAction) -> Result<(), CliError> {
    let (conn, _) = super::open_db(db)?;
    match action {
        TeamAction::Add { name, country } => {
            let team = NewTeam {
                country: country
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| name.clone()),
                name,
            };
            let id = cricstat_db::insert_team(&conn, &team)?;
            report_added(EntityKind::Team, id, &team.name);
        }
        TeamAction::Show { id } => {
            let team = cricstat_db::get_team(&conn, id)?.ok_or_else(|| not_found(EntityKind::Team, id))?;
            log::info!("{}", team.name.if_supports_color(Stdout, |t| t.bold()));
            field("id", team.id);
            field("country", &team.country);
            field("matches", team.total_matches);
            field("wins", team.total_wins);
            field("losses", team.total_losses);
        }
        TeamAction::List(args) => {
            let teams = cricstat_db::list_teams(&conn, &list_options(&args))?;
            let mut table =
                ResultTable::new(&["id", "name", "country", "matches", "wins", "losses"]);
            for t in teams {
                table.rows.push(vec![
                    Cell::from(t.id),
                    Cell::from(t.name),
                    Cell::from(t.country),
                    Cell::from(t.total_matches),
                    Cell::from(t.total_wins),
                    Cell::from(t.total_losses),
                ]);
            }
            output::emit(&table, &args.output)?;
        }
        TeamAction::Update { id, name, country } => {
            let clears = Clears::none();
            let patch = TeamPatch {
                name: clears.text("name", name)?,
                country: clears.text("country", country)?,
            };
            let changed = cricstat_db::update_team(&conn, id, &patch)?;
            report_update(EntityKind::Team, id, &changed);
        }
        TeamAction::Delete { id, confirm } => {
            run_delete(&conn, EntityKind::Team, id, confirm, cricstat_db::delete_team)?
        }
    }
    Ok(())
}

// ── Venue ───────────────────────────────────────────────────────────────────

const VENUE_CLEARABLE: &[&str] = &["capacity"];

pub(crate) fn run_venue(db: Option<PathBuf>, action: VenueAction) -> Result<(), CliError> {
    let (conn, _) = super::open_db(db)?;
    match action {
        VenueAction::Add {
            name,
            city,
            country,
            capacity,
        } => {
            let venue = NewVenue {
                name,
                city,
                country,
                capacity,
            };
            let id = cricstat_db::insert_venue(&conn, &venue)?;
            report_added(EntityKind::Venue, id, &venue.name);
        }
        VenueAction::Show { id } => {
            let venue =
                cricstat_db::get_venue(&conn, id)?.ok_or_else(|| not_found(EntityKind::Venue, id))?;
            log::info!("{}", venue.name.if_supports_color(Stdout, |t| t.bold()));
            field("id", venue.id);
            field("city", &venue.city);
            field("country", &venue.country);
            field("capacity", opt(&venue.capacity));
        }
        VenueAction::List(args) => {
            let venues = cricstat_db::list_venues(&conn, &list_options(&args))?;
            let mut table = ResultTable::new(&["id", "name", "city", "country", "capacity"]);
            for v in venues {
                table.rows.push(vec![
                    Cell::from(v.id),
                    Cell::from(v.name),
                    Cell::from(v.city),
                    Cell::from(v.country),
                    Cell::from(v.capacity),
                ]);
            }
            output::emit(&table, &args.output)?;
        }
        VenueAction::Update {
            id,
            name,
            city,
            country,
            capacity,
            clear,
        } => {
            let clears = Clears::parse(&clear, VENUE_CLEARABLE)?;
            let patch = VenuePatch {
                name: clears.text("name", name)?,
                city: clears.text("city", city)?,
                country: clears.text("country", country)?,
                capacity: clears.patch("capacity", capacity)?,
            };
            let changed = cricstat_db::update_venue(&conn, id, &patch)?;
            report_update(EntityKind::Venue, id, &changed);
        }
        VenueAction::Delete { id, confirm } => {
            run_delete(&conn, EntityKind::Venue, id, confirm, cricstat_db::delete_venue)?
        }
    }
    Ok(())
}

// ── Series ──────────────────────────────────────────────────────────────────

const SERIES_CLEARABLE: &[&str] = &["host_country", "match_type", "start", "end", "total_matches"];

pub(crate) fn run_series(db: Option<PathBuf>, action: SeriesAction) -> Result<(), CliError> {
    let (conn, _) = super::open_db(db)?;
    match action {
        SeriesAction::Add {
            name,
            host_country,
            match_type,
            start,
            end,
            total_matches,
        } => {
            let series = NewSeries {
                external_id: None,
                name,
                host_country: host_country.filter(|h| !h.trim().is_empty()),
                match_type,
                start_date: start,
                end_date: end,
                total_matches,
            };
            let id = cricstat_db::insert_series(&conn, &series)?;
            report_added(EntityKind::Series, id, &series.name);
        }
        SeriesAction::Show { id } => {
            let s = cricstat_db::get_series(&conn, id)?
                .ok_or_else(|| not_found(EntityKind::Series, id))?;
            log::info!("{}", s.name.if_supports_color(Stdout, |t| t.bold()));
            field("id", s.id);
            field("host country", opt(&s.host_country));
            field("match type", opt(&s.match_type));
            field("start", opt(&s.start_date));
            field("end", opt(&s.end_date));
            field("matches", opt(&s.total_matches));
            if let Some(ext) = &s.external_id {
                field("external id", ext);
            }
        }
        SeriesAction::List(args) => {
            let series = cricstat_db::list_series(&conn, &list_options(&args))?;
            let mut table =
                ResultTable::new(&["id", "name", "host", "type", "start", "end", "matches"]);
            for s in series {
                table.rows.push(vec![
                    Cell::from(s.id),
                    Cell::from(s.name),
                    Cell::from(s.host_country),
                    Cell::from(s.match_type.map(|f| f.as_str())),
                    Cell::from(s.start_date.map(|d| d.to_string())),
                    Cell::from(s.end_date.map(|d| d.to_string())),
                    Cell::from(s.total_matches),
                ]);
            }
            output::emit(&table, &args.output)?;
        }
        SeriesAction::Update {
            id,
            name,
            host_country,
            match_type,
            start,
            end,
            total_matches,
            clear,
        } => {
            let clears = Clears::parse(&clear, SERIES_CLEARABLE)?;
            let patch = SeriesPatch {
                name: clears.text("name", name)?,
                host_country: clears.text("host_country", host_country)?,
                match_type: clears.patch("match_type", match_type)?,
                start_date: clears.patch("start", start)?,
                end_date: clears.patch("end", end)?,
                total_matches: clears.patch("total_matches", total_matches)?,
            };
            let changed = cricstat_db::update_series(&conn, id, &patch)?;
            report_update(EntityKind::Series, id, &changed);
        }
        SeriesAction::Delete { id, confirm } => {
            run_delete(&conn, EntityKind::Series, id, confirm, cricstat_db::delete_series)?
        }
    }
    Ok(())
}

// ── Match ───────────────────────────────────────────────────────────────────

const MATCH_CLEARABLE: &[&str] = &[
    "series",
    "venue",
    "description",
    "toss_winner",
    "toss_decision",
    "winner",
    "margin",
];

fn match_patch(
    clears: &Clears,
    fields: MatchFields,
    team1: Option<i64>,
    team2: Option<i64>,
    date: Option<chrono::NaiveDate>,
    format: Option<MatchFormat>,
) -> Result<MatchPatch, CliError> {
    Ok(MatchPatch {
        series_id: clears.patch("series", fields.series)?,
        team1_id: Patch::from(team1),
        team2_id: Patch::from(team2),
        venue_id: clears.patch("venue", fields.venue)?,
        match_date: Patch::from(date),
        format: Patch::from(format),
        description: clears.text("description", fields.description)?,
        toss_winner_id: clears.patch("toss_winner", fields.toss_winner)?,
        toss_decision: clears.patch("toss_decision", fields.toss_decision)?,
        winner_id: clears.patch("winner", fields.winner)?,
        victory: clears.patch("margin", fields.margin)?,
        status: Patch::from(fields.status),
    })
}

pub(crate) fn run_match(db: Option<PathBuf>, action: MatchAction) -> Result<(), CliError> {
    let (conn, _) = super::open_db(db)?;
    match action {
        MatchAction::Add {
            team1,
            team2,
            date,
            format,
            fields,
        } => {
            let m = NewMatch {
                series_id: fields.series,
                venue_id: fields.venue,
                description: fields.description.filter(|d| !d.trim().is_empty()),
                toss_winner_id: fields.toss_winner,
                toss_decision: fields.toss_decision,
                winner_id: fields.winner,
                victory: fields.margin,
                status: fields.status.unwrap_or_default(),
                ..NewMatch::new(team1, team2, date, format)
            };
            let id = cricstat_db::insert_match(&conn, &m)?;
            let mut teams = TeamNames::new(&conn);
            let label = format!(
                "{} v {}, {}",
                opt(&teams.get(Some(team1))?),
                opt(&teams.get(Some(team2))?),
                date
            );
            report_added(EntityKind::Match, id, &label);
        }
        MatchAction::Show { id } => show_match(&conn, id)?,
        MatchAction::List(args) => {
            let matches = cricstat_db::list_matches(&conn, &list_options(&args))?;
            let mut teams = TeamNames::new(&conn);
            let mut table = ResultTable::new(&[
                "id", "date", "format", "team1", "team2", "status", "winner", "margin",
            ]);
            for m in matches {
                table.rows.push(vec![
                    Cell::from(m.id),
                    Cell::from(m.match_date.to_string()),
                    Cell::from(m.format.as_str()),
                    Cell::from(teams.get(m.team1_id)?),
                    Cell::from(teams.get(m.team2_id)?),
                    Cell::from(m.status.as_str()),
                    Cell::from(teams.get(m.winner_id)?),
                    Cell::from(m.victory.map(|v| v.to_string())),
                ]);
            }
            output::emit(&table, &args.output)?;
        }
        MatchAction::Update {
            id,
            team1,
            team2,
            date,
            format,
            fields,
            clear,
        } => {
            let clears = Clears::parse(&clear, MATCH_CLEARABLE)?;
            let patch = match_patch(&clears, fields, team1, team2, date, format)?;
            let changed = cricstat_db::update_match(&conn, id, &patch)?;
            report_update(EntityKind::Match, id, &changed);
        }
        MatchAction::Delete { id, confirm } => {
            run_delete(&conn, EntityKind::Match, id, confirm, cricstat_db::delete_match)?
        }
    }
    Ok(())
}

fn show_match(conn: &Connection, id: i64) -> Result<(), CliError> {
    let m = cricstat_db::get_match(conn, id)?.ok_or_else(|| not_found(EntityKind::Match, id))?;
    let mut teams = TeamNames::new(conn);
    let team1 = teams.get(m.team1_id)?;
    let team2 = teams.get(m.team2_id)?;

    log::info!(
        "{}",
        format!("{} v {}", opt(&team1), opt(&team2)).if_supports_color(Stdout, |t| t.bold()),
    );
    field("id", m.id);
    field("date", m.match_date);
    field("format", m.format);
    field("status", m.status);
    field("description", opt(&m.description));
    if let Some(series_id) = m.series_id {
        let name = cricstat_db::get_series(conn, series_id)?.map(|s| s.name);
        field("series", opt(&name));
    }
    if let Some(venue_id) = m.venue_id {
        let venue = cricstat_db::get_venue(conn, venue_id)?.map(|v| format!("{}, {}", v.name, v.city));
        field("venue", opt(&venue));
    }
    if let Some(toss) = m.toss_winner_id {
        let decision = m.toss_decision.map(|d| format!(" (chose to {})", d)).unwrap_or_default();
        field("toss", format!("{}{}", opt(&teams.get(Some(toss))?), decision));
    }
    if let Some(winner) = m.winner_id {
        let margin = m.victory.map(|v| format!(" by {}", v)).unwrap_or_default();
        field("result", format!("{} won{}", opt(&teams.get(Some(winner))?), margin));
    }
    if let Some(ext) = &m.external_id {
        field("external id", ext);
    }

    let mut players: HashMap<i64, String> = HashMap::new();
    let mut player_name = |pid: i64| -> Result<Cell, CliError> {
        if let Some(name) = players.get(&pid) {
            return Ok(Cell::from(name.as_str()));
        }
        let name = cricstat_db::get_player(conn, pid)?
            .map(|p| p.full_name)
            .unwrap_or_else(|| format!("#{}", pid));
        players.insert(pid, name.clone());
        Ok(Cell::from(name))
    };

    let batting = cricstat_db::list_batting_for_match(conn, id)?;
    let innings: BTreeSet<u32> = batting.iter().map(|b| b.innings).collect();
    for number in innings {
        if !cricstat_db::innings_positions_contiguous(conn, id, number)? {
            log::warn!(
                "Innings {}: batting positions are not contiguous from 1; partnerships in this innings are incomplete",
                number
            );
        }
    }
    if !batting.is_empty() {
        let mut table =
            ResultTable::new(&["inn", "pos", "batsman", "runs", "balls", "4s", "6s", "sr", "out"]);
        for b in batting {
            table.rows.push(vec![
                Cell::from(b.innings),
                Cell::from(b.batting_position),
                player_name(b.player_id)?,
                Cell::from(b.runs),
                Cell::from(b.balls_faced),
                Cell::from(b.fours),
                Cell::from(b.sixes),
                Cell::from(b.strike_rate),
                Cell::from(if b.dismissed { "yes" } else { "no" }),
            ]);
        }
        crate::log_blank();
        output::emit(&table, &OutputArgs::default())?;
    }

    let bowling = cricstat_db::list_bowling_for_match(conn, id)?;
    if !bowling.is_empty() {
        let mut table =
            ResultTable::new(&["inn", "bowler", "overs", "maidens", "runs", "wkts", "econ"]);
        for b in bowling {
            table.rows.push(vec![
                Cell::from(b.innings),
                player_name(b.player_id)?,
                Cell::from(b.overs),
                Cell::from(b.maidens),
                Cell::from(b.runs_conceded),
                Cell::from(b.wickets),
                Cell::from(b.economy_rate),
            ]);
        }
        crate::log_blank();
        output::emit(&table, &OutputArgs::default())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_args(names: &[&str]) -> ClearArgs {
        ClearArgs {
            clear: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn blank_text_keeps_value() {
        let clears = Clears::none();
        assert_eq!(clears.text("name", Some("   ".to_string())).unwrap(), Patch::Keep);
        assert_eq!(clears.text("name", None).unwrap(), Patch::Keep);
        assert_eq!(
            clears.text("name", Some("Australia".to_string())).unwrap(),
            Patch::Set("Australia".to_string())
        );
    }

    #[test]
    fn clear_requires_known_field() {
        let clears = Clears::parse(&clear_args(&["Team", ""]), PLAYER_CLEARABLE).unwrap();
        assert_eq!(clears.patch::<i64>("team", None).unwrap(), Patch::Clear);
        assert!(clears.patch("team", Some(3)).is_err());
        assert!(Clears::parse(&clear_args(&["full_name"]), PLAYER_CLEARABLE).is_err());
    }

    #[test]
    fn match_patch_sets_and_clears() {
        let clears = Clears::parse(&clear_args(&["winner", "margin"]), MATCH_CLEARABLE).unwrap();
        let fields = MatchFields {
            status: Some(MatchStatus::Abandoned),
            ..MatchFields::default()
        };
        let patch = match_patch(&clears, fields, None, None, None, None).unwrap();
        assert_eq!(patch.winner_id, Patch::Clear);
        assert_eq!(patch.victory, Patch::Clear);
        assert_eq!(patch.status, Patch::Set(MatchStatus::Abandoned));
        assert_eq!(patch.team1_id, Patch::Keep);
    }

    #[test]
    fn unconfirmed_delete_leaves_row() {
        let conn = cricstat_db::open_memory().unwrap();
        let id = cricstat_db::insert_team(
            &conn,
            &NewTeam {
                name: "India".to_string(),
                country: "India".to_string(),
            },
        )
        .unwrap();
        run_delete(&conn, EntityKind::Team, id, false, cricstat_db::delete_team).unwrap();
        assert!(cricstat_db::get_team(&conn, id).unwrap().is_some());
        run_delete(&conn, EntityKind::Team, id, true, cricstat_db::delete_team).unwrap();
        assert!(cricstat_db::get_team(&conn, id).unwrap().is_none());
    }
}
