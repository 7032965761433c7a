//! `fetch` subcommands: show API data without touching the database.

use std::future::Future;
use std::path::PathBuf;

use cricstat_api::{
    ApiError, CricbuzzClient, LeaderboardResponse, MatchesResponse, RankingsResponse,
    ScorecardResponse, SeriesListResponse, TeamsResponse,
};
use cricstat_db::{Cell, ResultTable};
use cricstat_import::normalize_timestamp;

use crate::CliError;
use crate::cli_types::FetchAction;
use crate::spinner;

use super::output;

pub(crate) fn run_fetch(db: Option<PathBuf>, action: FetchAction, quiet: bool) -> Result<(), CliError> {
    let (config, _) = super::load_config(db)?;
    let client = CricbuzzClient::new(&config)?;
    let rt = super::runtime()?;

    match action {
        FetchAction::Matches { feed, output } => {
            let response = with_spinner(&rt, format!("Fetching {} matches", feed), quiet, client.matches(feed))?;
            output::emit(&matches_table(&response), &output)
        }
        FetchAction::Rankings {
            category,
            format,
            output,
        } => {
            let response = with_spinner(
                &rt,
                format!("Fetching {} rankings ({})", category, format),
                quiet,
                client.rankings(category, format),
            )?;
            output::emit(&rankings_table(&response), &output)
        }
        FetchAction::Leaderboard {
            stat,
            format,
            output,
        } => {
            let response = with_spinner(
                &rt,
                format!("Fetching {} leaderboard ({})", stat, format),
                quiet,
                client.leaderboard(stat, format),
            )?;
            output::emit(&leaderboard_table(&response), &output)
        }
        FetchAction::Teams { output } => {
            let response = with_spinner(&rt, "Fetching international teams".to_string(), quiet, client.teams())?;
            output::emit(&teams_table(&response), &output)
        }
        FetchAction::Series { output } => {
            let response = with_spinner(&rt, "Fetching international series".to_string(), quiet, client.series())?;
            output::emit(&series_table(&response), &output)
        }
        FetchAction::Scorecard {
            match_id,
            bowling,
            output,
        } => {
            let response = with_spinner(
                &rt,
                format!("Fetching scorecard for match {}", match_id),
                quiet,
                client.scorecard(&match_id),
            )?;
            if let Some(status) = response.match_header.as_ref().and_then(|h| h.status.as_deref()) {
                log::info!("{}", status);
            }
            let table = if bowling {
                bowling_card_table(&response)
            } else {
                batting_card_table(&response)
            };
            output::emit(&table, &output)
        }
    }
}

fn with_spinner<T>(
    rt: &tokio::runtime::Runtime,
    message: String,
    quiet: bool,
    request: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    let pb = spinner::spinner(message, quiet);
    let result = rt.block_on(request);
    pb.finish_and_clear();
    result
}

pub(crate) fn matches_table(response: &MatchesResponse) -> ResultTable {
    let mut table = ResultTable::new(&[
        "match_id", "date", "format", "series", "team1", "team2", "venue", "status",
    ]);
    for listed in response.matches() {
        let info = listed.info;
        let team = |t: &Option<cricstat_api::types::TeamInfo>| {
            Cell::from(t.as_ref().and_then(|t| t.team_name.clone()))
        };
        table.rows.push(vec![
            Cell::from(info.match_id.clone()),
            Cell::from(
                info.start_date
                    .as_deref()
                    .and_then(normalize_timestamp)
                    .map(|d| d.to_string()),
            ),
            Cell::from(info.match_format.clone()),
            Cell::from(listed.series_name),
            team(&info.team1),
            team(&info.team2),
            Cell::from(info.venue_info.as_ref().and_then(|v| v.ground.clone())),
            Cell::from(info.status.clone().or_else(|| info.state.clone())),
        ]);
    }
    table
}

pub(crate) fn rankings_table(response: &RankingsResponse) -> ResultTable {
    let mut table = ResultTable::new(&["rank", "name", "country", "rating", "player_id"]);
    for entry in &response.rank {
        table.rows.push(vec![
            Cell::from(entry.rank_number()),
            Cell::from(entry.name.clone()),
            Cell::from(entry.country.clone()),
            Cell::from(entry.rating_number()),
            Cell::from(entry.id.clone()),
        ]);
    }
    table
}

pub(crate) fn leaderboard_table(response: &LeaderboardResponse) -> ResultTable {
    let mut columns: Vec<String> = response.headers.clone();
    let width = response
        .values
        .iter()
        .map(|r| r.values.len())
        .max()
        .unwrap_or(0);
    for i in columns.len()..width {
        columns.push(format!("col{}", i + 1));
    }

    let rows = response
        .values
        .iter()
        .map(|row| {
            let mut cells: Vec<Cell> = row.cells().into_iter().map(Cell::from).collect();
            cells.resize(columns.len(), Cell::Null);
            cells
        })
        .collect();
    ResultTable { columns, rows }
}

pub(crate) fn teams_table(response: &TeamsResponse) -> ResultTable {
    let mut table = ResultTable::new(&["team_id", "name", "short_name"]);
    for team in response.teams() {
        table.rows.push(vec![
            Cell::from(team.team_id.clone()),
            Cell::from(team.team_name.clone()),
            Cell::from(team.team_s_name.clone()),
        ]);
    }
    table
}

pub(crate) fn series_table(response: &SeriesListResponse) -> ResultTable {
    let mut table = ResultTable::new(&["series_id", "name", "start_date", "end_date"]);
    let day = |raw: &Option<String>| {
        Cell::from(raw.as_deref().and_then(normalize_timestamp).map(|d| d.to_string()))
    };
    for series in response.series() {
        table.rows.push(vec![
            Cell::from(series.id.clone()),
            Cell::from(series.name.clone()),
            day(&series.start_dt),
            day(&series.end_dt),
        ]);
    }
    table
}

pub(crate) fn batting_card_table(response: &ScorecardResponse) -> ResultTable {
    let mut table = ResultTable::new(&[
        "innings", "team", "position", "batter", "dismissal", "runs", "balls", "fours",
        "sixes", "strike_rate",
    ]);
    for (i, innings) in response.score_card.iter().enumerate() {
        let number = innings.innings_id.unwrap_or(i as u32 + 1);
        for (position, batter) in innings.batters() {
            table.rows.push(vec![
                Cell::from(number),
                Cell::from(innings.batting_team()),
                Cell::from(position),
                Cell::from(batter.bat_name.clone()),
                Cell::from(batter.out_desc.clone()),
                Cell::from(batter.runs),
                Cell::from(batter.balls),
                Cell::from(batter.fours),
                Cell::from(batter.sixes),
                Cell::from(batter.strike_rate),
            ]);
        }
    }
    table
}

pub(crate) fn bowling_card_table(response: &ScorecardResponse) -> ResultTable {
    let mut table = ResultTable::new(&[
        "innings", "team", "bowler", "overs", "maidens", "runs", "wickets", "economy",
    ]);
    for (i, innings) in response.score_card.iter().enumerate() {
        let number = innings.innings_id.unwrap_or(i as u32 + 1);
        for bowler in innings.bowlers() {
            table.rows.push(vec![
                Cell::from(number),
                Cell::from(innings.bowling_team()),
                Cell::from(bowler.bowl_name.clone()),
                Cell::from(bowler.overs),
                Cell::from(bowler.maidens),
                Cell::from(bowler.runs),
                Cell::from(bowler.wickets),
                Cell::from(bowler.economy),
            ]);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaderboard_pads_short_rows() {
        let response: LeaderboardResponse = serde_json::from_str(
            r#"{"headers":["Batter","M","Runs"],
                "values":[{"values":["1","Joe Root","40","3500"]},{"values":["2","Kane"]}]}"#,
        )
        .unwrap();
        let table = leaderboard_table(&response);
        assert_eq!(table.columns, vec!["Batter", "M", "Runs", "col4"]);
        assert_eq!(table.rows[0][1], Cell::from("Joe Root"));
        assert_eq!(table.rows[1][3], Cell::Null);
    }

    #[test]
    fn rankings_use_numeric_rank() {
        let response: RankingsResponse = serde_json::from_str(
            r#"{"rank":[{"id":"8019","rank":"1","name":"Joe Root","country":"England","rating":"899"}]}"#,
        )
        .unwrap();
        let table = rankings_table(&response);
        assert_eq!(table.get(0, "rank"), Some(&Cell::Integer(1)));
        assert_eq!(table.get(0, "rating"), Some(&Cell::Integer(899)));
        assert_eq!(table.get(0, "player_id"), Some(&Cell::from("8019")));
    }

    const CARD: &str = r#"{"scoreCard": [{
        "inningsId": 2,
        "batTeamDetails": {"batTeamName": "Australia", "batsmenData": {
            "bat_2": {"batName": "David Warner", "runs": 7, "balls": 3, "outDesc": "c Kohli b Shami"},
            "bat_1": {"batName": "Travis Head", "runs": "137", "balls": "120", "strikeRate": "114.17", "outDesc": "c Gill b Siraj"}
        }},
        "bowlTeamDetails": {"bowlTeamName": "India", "bowlersData": {
            "bowl_1": {"bowlName": "Mohammed Siraj", "overs": "7", "runs": 45, "wickets": 1, "economy": "6.43"}
        }}
    }]}"#;

    #[test]
    fn batting_card_rows_follow_batting_order() {
        let response: ScorecardResponse = serde_json::from_str(CARD).unwrap();
        let table = batting_card_table(&response);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "batter"), Some(&Cell::from("Travis Head")));
        assert_eq!(table.get(0, "position"), Some(&Cell::Integer(1)));
        assert_eq!(table.get(0, "runs"), Some(&Cell::Integer(137)));
        assert_eq!(table.get(1, "innings"), Some(&Cell::Integer(2)));
        assert_eq!(table.get(1, "team"), Some(&Cell::from("Australia")));
        assert_eq!(table.get(1, "strike_rate"), Some(&Cell::Null));
    }

    #[test]
    fn bowling_card_lists_bowling_side() {
        let response: ScorecardResponse = serde_json::from_str(CARD).unwrap();
        let table = bowling_card_table(&response);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "team"), Some(&Cell::from("India")));
        assert_eq!(table.get(0, "wickets"), Some(&Cell::Integer(1)));
    }

    #[test]
    fn series_dates_are_normalized() {
        let response: SeriesListResponse = serde_json::from_str(
            r#"{"seriesMapProto":[{"series":[{"id":7476,"name":"ICC Cricket World Cup 2023","startDt":"1696464000000"}]}]}"#,
        )
        .unwrap();
        let table = series_table(&response);
        assert_eq!(table.get(0, "series_id"), Some(&Cell::from("7476")));
        assert_eq!(table.get(0, "start_date"), Some(&Cell::from("2023-10-05")));
        assert_eq!(table.get(0, "end_date"), Some(&Cell::Null));
    }

    #[test]
    fn team_table_skips_headings() {
        let response: TeamsResponse = serde_json::from_str(
            r#"{"list":[{"teamName":"Test Teams"},{"teamId":2,"teamName":"India","teamSName":"IND"}]}"#,
        )
        .unwrap();
        let table = teams_table(&response);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "short_name"), Some(&Cell::from("IND")));
    }
}
