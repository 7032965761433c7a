use chrono::NaiveDate;
use cricstat_catalog::parse_dataset;
use cricstat_catalog::types::*;
use cricstat_db::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn team(conn: &rusqlite::Connection, name: &str) -> i64 {
    insert_team(
        conn,
        &NewTeam {
            name: name.to_string(),
            country: name.to_string(),
        },
    )
    .unwrap()
}

fn venue(conn: &rusqlite::Connection, name: &str, city: &str, country: &str) -> i64 {
    insert_venue(
        conn,
        &NewVenue {
            name: name.to_string(),
            city: city.to_string(),
            country: country.to_string(),
            capacity: Some(60_000),
        },
    )
    .unwrap()
}

fn completed(team1: i64, team2: i64, winner: i64, on: NaiveDate) -> NewMatch {
    NewMatch {
        winner_id: Some(winner),
        victory: Some(VictoryMargin::runs(20)),
        status: MatchStatus::Completed,
        ..NewMatch::new(team1, team2, on, MatchFormat::Odi)
    }
}

// ── Players ─────────────────────────────────────────────────────────────────

#[test]
fn player_crud_round_trip() {
    let conn = open_memory().unwrap();
    let id = insert_player(
        &conn,
        &NewPlayer::new("Test Player", "India", PlayingRole::Batsman),
    )
    .unwrap();

    let player = get_player(&conn, id).unwrap().unwrap();
    assert_eq!(player.full_name, "Test Player");
    assert_eq!(player.country, "India");
    assert_eq!(player.playing_role, PlayingRole::Batsman);

    let changed = update_player(
        &conn,
        id,
        &PlayerPatch {
            country: Patch::Set("Australia".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(changed, vec!["country"]);
    let player = get_player(&conn, id).unwrap().unwrap();
    assert_eq!(player.country, "Australia");
    assert_eq!(player.full_name, "Test Player");

    delete_player(&conn, id, Confirmation::Confirmed).unwrap();
    assert!(get_player(&conn, id).unwrap().is_none());
}

#[test]
fn player_requires_name_and_country() {
    let conn = open_memory().unwrap();
    let err = insert_player(&conn, &NewPlayer::new("   ", "India", PlayingRole::Bowler)).unwrap_err();
    assert!(matches!(
        err,
        OperationError::Validation {
            field: "full_name",
            ..
        }
    ));

    let err = insert_player(&conn, &NewPlayer::new("Someone", "", PlayingRole::Bowler)).unwrap_err();
    assert!(matches!(err, OperationError::Validation { field: "country", .. }));
}

#[test]
fn player_with_unknown_team_is_rejected() {
    let conn = open_memory().unwrap();
    let mut p = NewPlayer::new("Someone", "India", PlayingRole::Bowler);
    p.team_id = Some(99);
    let err = insert_player(&conn, &p).unwrap_err();
    assert!(matches!(err, OperationError::Validation { field: "team_id", .. }));
}

#[test]
fn blank_patch_fields_keep_stored_values() {
    let conn = open_memory().unwrap();
    let mut p = NewPlayer::new("Steady Batter", "India", PlayingRole::Batsman);
    p.batting_style = Some("Right-hand bat".to_string());
    let id = insert_player(&conn, &p).unwrap();

    let changed = update_player(
        &conn,
        id,
        &PlayerPatch {
            full_name: Patch::Set("  ".to_string()),
            batting_style: Patch::Set(String::new()),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(changed.is_empty());

    let player = get_player(&conn, id).unwrap().unwrap();
    assert_eq!(player.full_name, "Steady Batter");
    assert_eq!(player.batting_style.as_deref(), Some("Right-hand bat"));

    // Explicit clear is honoured for optional columns.
    update_player(
        &conn,
        id,
        &PlayerPatch {
            batting_style: Patch::Clear,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(get_player(&conn, id).unwrap().unwrap().batting_style, None);

    // ...and refused for required ones.
    let err = update_player(
        &conn,
        id,
        &PlayerPatch {
            full_name: Patch::Clear,
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, OperationError::Validation { .. }));
}

#[test]
fn deleting_player_removes_performances() {
    let conn = open_memory().unwrap();
    let india = team(&conn, "India");
    let aus = team(&conn, "Australia");
    let m = insert_match(&conn, &NewMatch::new(india, aus, date(2024, 1, 5), MatchFormat::Odi)).unwrap();
    let p = insert_player(&conn, &NewPlayer::new("Opener", "India", PlayingRole::Batsman)).unwrap();
    insert_batting(
        &conn,
        &NewBatting {
            match_id: m,
            player_id: p,
            innings: 1,
            batting_position: 1,
            runs: 30,
            balls_faced: 25,
            fours: 4,
            sixes: 0,
            dismissed: true,
        },
    )
    .unwrap();

    let impact = delete_impact(&conn, EntityKind::Player, p).unwrap();
    assert_eq!(impact.performances, 1);

    delete_player(&conn, p, Confirmation::Confirmed).unwrap();
    assert!(list_batting_for_match(&conn, m).unwrap().is_empty());
}

// ── Teams ───────────────────────────────────────────────────────────────────

#[test]
fn duplicate_team_name_is_a_conflict() {
    let conn = open_memory().unwrap();
    team(&conn, "India");
    let err = insert_team(
        &conn,
        &NewTeam {
            name: "INDIA".to_string(),
            country: "India".to_string(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, OperationError::Conflict { entity_type: "team", .. }));
}

#[test]
fn renaming_team_onto_existing_name_is_a_conflict() {
    let conn = open_memory().unwrap();
    team(&conn, "India");
    let other = team(&conn, "Pakistan");
    let err = update_team(
        &conn,
        other,
        &TeamPatch {
            name: Patch::Set("india".to_string()),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, OperationError::Conflict { .. }));
}

#[test]
fn delete_requires_confirmation() {
    let conn = open_memory().unwrap();
    let id = team(&conn, "India");
    let err = delete_team(&conn, id, Confirmation::Unconfirmed).unwrap_err();
    assert!(matches!(
        err,
        OperationError::ConfirmationRequired {
            entity_type: "team",
            ..
        }
    ));
    assert!(get_team(&conn, id).unwrap().is_some());

    let err = delete_team(&conn, 999, Confirmation::Confirmed).unwrap_err();
    assert!(matches!(err, OperationError::NotFound { .. }));
}

#[test]
fn deleting_team_clears_match_references() {
    let conn = open_memory().unwrap();
    let india = team(&conn, "India");
    let aus = team(&conn, "Australia");
    let m = insert_match(&conn, &completed(india, aus, aus, date(2024, 2, 1))).unwrap();

    let impact = delete_impact(&conn, EntityKind::Team, india).unwrap();
    assert_eq!(impact.matches, 1);

    delete_team(&conn, india, Confirmation::Confirmed).unwrap();
    let stored = get_match(&conn, m).unwrap().unwrap();
    assert_eq!(stored.team1_id, None);
    assert_eq!(stored.team2_id, Some(aus));
    assert_eq!(stored.winner_id, Some(aus));
}

#[test]
fn deleting_venue_and_series_clears_match_references() {
    let conn = open_memory().unwrap();
    let india = team(&conn, "India");
    let aus = team(&conn, "Australia");
    let v = venue(&conn, "Eden Gardens", "Kolkata", "India");
    let s = insert_series(
        &conn,
        &NewSeries {
            external_id: None,
            name: "Border-Gavaskar Trophy".to_string(),
            host_country: Some("India".to_string()),
            match_type: Some(MatchFormat::Test),
            start_date: Some(date(2024, 2, 1)),
            end_date: Some(date(2024, 3, 10)),
            total_matches: Some(4),
        },
    )
    .unwrap();
    let mut nm = NewMatch::new(india, aus, date(2024, 2, 9), MatchFormat::Test);
    nm.venue_id = Some(v);
    nm.series_id = Some(s);
    let m = insert_match(&conn, &nm).unwrap();

    delete_venue(&conn, v, Confirmation::Confirmed).unwrap();
    delete_series(&conn, s, Confirmation::Confirmed).unwrap();
    let stored = get_match(&conn, m).unwrap().unwrap();
    assert_eq!(stored.venue_id, None);
    assert_eq!(stored.series_id, None);
}

#[test]
fn refresh_team_records_counts_completed_matches() {
    let conn = open_memory().unwrap();
    let india = team(&conn, "India");
    let aus = team(&conn, "Australia");
    insert_match(&conn, &completed(india, aus, india, date(2024, 1, 1))).unwrap();
    insert_match(&conn, &completed(india, aus, india, date(2024, 1, 3))).unwrap();
    insert_match(&conn, &completed(aus, india, aus, date(2024, 1, 5))).unwrap();
    insert_match(&conn, &NewMatch::new(india, aus, date(2024, 2, 1), MatchFormat::T20i)).unwrap();

    refresh_team_records(&conn).unwrap();
    let t = get_team(&conn, india).unwrap().unwrap();
    assert_eq!((t.total_matches, t.total_wins, t.total_losses), (3, 2, 1));
    let t = get_team(&conn, aus).unwrap().unwrap();
    assert_eq!((t.total_matches, t.total_wins, t.total_losses), (3, 1, 2));
}

// ── Venues and series ───────────────────────────────────────────────────────

#[test]
fn venue_capacity_can_be_cleared() {
    let conn = open_memory().unwrap();
    let id = venue(&conn, "MCG", "Melbourne", "Australia");
    let changed = update_venue(
        &conn,
        id,
        &VenuePatch {
            capacity: Patch::Clear,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(changed, vec!["capacity"]);
    assert_eq!(get_venue(&conn, id).unwrap().unwrap().capacity, None);
}

#[test]
fn venue_name_is_unique_per_city() {
    let conn = open_memory().unwrap();
    venue(&conn, "Central Ground", "Melbourne", "Australia");
    venue(&conn, "Central Ground", "Perth", "Australia");
    let err = insert_venue(
        &conn,
        &NewVenue {
            name: "central ground".to_string(),
            city: "MELBOURNE".to_string(),
            country: "Australia".to_string(),
            capacity: None,
        },
    )
    .unwrap_err();
    assert!(matches!(err, OperationError::Conflict { entity_type: "venue", .. }));
}

#[test]
fn series_end_before_start_is_invalid() {
    let conn = open_memory().unwrap();
    let err = insert_series(
        &conn,
        &NewSeries {
            external_id: None,
            name: "Backwards Cup".to_string(),
            host_country: None,
            match_type: None,
            start_date: Some(date(2024, 5, 1)),
            end_date: Some(date(2024, 4, 1)),
            total_matches: None,
        },
    )
    .unwrap_err();
    assert!(matches!(err, OperationError::Validation { field: "end_date", .. }));
}

// ── Matches ─────────────────────────────────────────────────────────────────

#[test]
fn match_team_invariants() {
    let conn = open_memory().unwrap();
    let india = team(&conn, "India");
    let aus = team(&conn, "Australia");
    let eng = team(&conn, "England");

    let err = insert_match(&conn, &NewMatch::new(india, india, date(2024, 1, 1), MatchFormat::Odi))
        .unwrap_err();
    assert!(matches!(err, OperationError::Validation { field: "team2_id", .. }));

    let err = insert_match(&conn, &completed(india, aus, eng, date(2024, 1, 1))).unwrap_err();
    assert!(matches!(err, OperationError::Validation { field: "winner_id", .. }));

    let mut nm = NewMatch::new(india, aus, date(2024, 1, 1), MatchFormat::Odi);
    nm.toss_winner_id = Some(eng);
    let err = insert_match(&conn, &nm).unwrap_err();
    assert!(matches!(
        err,
        OperationError::Validation {
            field: "toss_winner_id",
            ..
        }
    ));
}

#[test]
fn match_update_checks_winner_against_current_teams() {
    let conn = open_memory().unwrap();
    let india = team(&conn, "India");
    let aus = team(&conn, "Australia");
    let eng = team(&conn, "England");
    let m = insert_match(&conn, &NewMatch::new(india, aus, date(2024, 1, 1), MatchFormat::Odi)).unwrap();

    let err = update_match(
        &conn,
        m,
        &MatchPatch {
            winner_id: Patch::Set(eng),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, OperationError::Validation { .. }));

    let changed = update_match(
        &conn,
        m,
        &MatchPatch {
            winner_id: Patch::Set(aus),
            victory: Patch::Set(VictoryMargin::wickets(4)),
            status: Patch::Set(MatchStatus::Completed),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(
        changed,
        vec!["winner_id", "victory_margin", "victory_type", "status"]
    );
    let stored = get_match(&conn, m).unwrap().unwrap();
    assert_eq!(stored.victory, Some(VictoryMargin::wickets(4)));
    assert_eq!(stored.status, MatchStatus::Completed);
}

#[test]
fn duplicate_external_match_id_is_a_conflict() {
    let conn = open_memory().unwrap();
    let india = team(&conn, "India");
    let aus = team(&conn, "Australia");
    let mut nm = NewMatch::new(india, aus, date(2024, 1, 1), MatchFormat::Odi);
    nm.external_id = Some("cb-1001".to_string());
    insert_match(&conn, &nm).unwrap();
    let err = insert_match(&conn, &nm).unwrap_err();
    assert!(matches!(err, OperationError::Conflict { entity_type: "match", .. }));
}

#[test]
fn deleting_match_cascades_performances() {
    let conn = open_memory().unwrap();
    let india = team(&conn, "India");
    let aus = team(&conn, "Australia");
    let m = insert_match(&conn, &NewMatch::new(india, aus, date(2024, 1, 1), MatchFormat::Odi)).unwrap();
    let p = insert_player(&conn, &NewPlayer::new("Quick", "Australia", PlayingRole::Bowler)).unwrap();
    insert_bowling(
        &conn,
        &NewBowling {
            match_id: m,
            player_id: p,
            innings: 1,
            overs: 10.0,
            maidens: 1,
            runs_conceded: 42,
            wickets: 3,
        },
    )
    .unwrap();

    let impact = delete_impact(&conn, EntityKind::Match, m).unwrap();
    assert_eq!(impact.performances, 1);
    delete_match(&conn, m, Confirmation::Confirmed).unwrap();
    let left: i64 = conn
        .query_row("SELECT COUNT(*) FROM bowling_performance", [], |r| r.get(0))
        .unwrap();
    assert_eq!(left, 0);
}

// ── Performances ────────────────────────────────────────────────────────────

#[test]
fn batting_rows_are_validated_and_unique() {
    let conn = open_memory().unwrap();
    let india = team(&conn, "India");
    let aus = team(&conn, "Australia");
    let m = insert_match(&conn, &NewMatch::new(india, aus, date(2024, 1, 1), MatchFormat::Odi)).unwrap();
    let a = insert_player(&conn, &NewPlayer::new("A", "India", PlayingRole::Batsman)).unwrap();
    let b = insert_player(&conn, &NewPlayer::new("B", "India", PlayingRole::Batsman)).unwrap();

    let row = NewBatting {
        match_id: m,
        player_id: a,
        innings: 1,
        batting_position: 1,
        runs: 45,
        balls_faced: 38,
        fours: 5,
        sixes: 1,
        dismissed: true,
    };
    let id = insert_batting(&conn, &row).unwrap();

    let err = insert_batting(&conn, &NewBatting { player_id: b, ..row.clone() }).unwrap_err();
    assert!(matches!(err, OperationError::Conflict { .. }));

    let err = insert_batting(&conn, &NewBatting { innings: 5, ..row.clone() }).unwrap_err();
    assert!(matches!(err, OperationError::Validation { field: "innings", .. }));

    let err = insert_batting(
        &conn,
        &NewBatting {
            batting_position: 12,
            ..row.clone()
        },
    )
    .unwrap_err();
    assert!(matches!(
        err,
        OperationError::Validation {
            field: "batting_position",
            ..
        }
    ));

    let rows = list_batting_for_match(&conn, m).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].strike_rate, strike_rate(45, 38));

    delete_batting(&conn, id).unwrap();
    assert!(matches!(
        delete_batting(&conn, id).unwrap_err(),
        OperationError::NotFound { .. }
    ));
}

#[test]
fn bowling_economy_matches_formula() {
    let conn = open_memory().unwrap();
    let india = team(&conn, "India");
    let aus = team(&conn, "Australia");
    let m = insert_match(&conn, &NewMatch::new(india, aus, date(2024, 1, 1), MatchFormat::T20i)).unwrap();
    let p = insert_player(&conn, &NewPlayer::new("Spinner", "India", PlayingRole::Bowler)).unwrap();
    insert_bowling(
        &conn,
        &NewBowling {
            match_id: m,
            player_id: p,
            innings: 2,
            overs: 3.0,
            maidens: 0,
            runs_conceded: 20,
            wickets: 2,
        },
    )
    .unwrap();

    let rows = list_bowling_for_match(&conn, m).unwrap();
    assert_eq!(rows[0].economy_rate, economy_rate(20, 3.0));
    assert_eq!(rows[0].economy_rate, 6.67);

    let err = insert_bowling(
        &conn,
        &NewBowling {
            match_id: m,
            player_id: p,
            innings: 1,
            overs: 4.0,
            maidens: 0,
            runs_conceded: 30,
            wickets: 11,
        },
    )
    .unwrap_err();
    assert!(matches!(err, OperationError::Validation { field: "wickets", .. }));
}

// ── Seeding ─────────────────────────────────────────────────────────────────

#[test]
fn seed_is_repeatable_and_refreshes_records() {
    let conn = open_memory().unwrap();
    let data = parse_dataset(
        r#"
teams:
  - { id: 1, name: India, country: India, total_wins: 99 }
  - { id: 2, name: Australia, country: Australia }
venues:
  - { id: 1, name: Wankhede Stadium, city: Mumbai, country: India, capacity: 33000 }
players:
  - { id: 1, full_name: Rohit Sharma, country: India, playing_role: Batsman, team_id: 1 }
matches:
  - id: 1
    team1_id: 1
    team2_id: 2
    venue_id: 1
    match_date: 2023-11-19
    format: ODI
    winner_id: 2
    victory: { margin: 6, type: wickets }
    status: Completed
batting:
  - { match_id: 1, player_id: 1, innings: 1, batting_position: 1, runs: 47, balls_faced: 31 }
"#,
    )
    .unwrap();

    let stats = seed_from_dataset(&conn, &data).unwrap();
    assert_eq!(stats.teams, 2);
    assert_eq!(stats.matches, 1);
    assert_eq!(stats.batting, 1);
    assert!(stats.position_gaps.is_empty());

    // Second run upserts instead of duplicating.
    seed_from_dataset(&conn, &data).unwrap();
    let db = database_stats(&conn).unwrap();
    assert_eq!(db.teams, 2);
    assert_eq!(db.batting_rows, 1);

    let india = get_team(&conn, 1).unwrap().unwrap();
    assert_eq!(india.total_wins, 0);
    assert_eq!(india.total_losses, 1);
}

#[test]
fn seed_reports_innings_with_position_gaps() {
    let conn = open_memory().unwrap();
    let data = parse_dataset(
        r#"
teams:
  - { id: 1, name: India, country: India }
  - { id: 2, name: Australia, country: Australia }
players:
  - { id: 1, full_name: Rohit Sharma, country: India, playing_role: Batsman }
  - { id: 2, full_name: Shubman Gill, country: India, playing_role: Batsman }
  - { id: 3, full_name: Travis Head, country: Australia, playing_role: Batsman }
  - { id: 4, full_name: David Warner, country: Australia, playing_role: Batsman }
matches:
  - { id: 1, team1_id: 1, team2_id: 2, match_date: 2023-11-19, format: ODI }
batting:
  - { match_id: 1, player_id: 1, innings: 1, batting_position: 3, runs: 47, balls_faced: 31 }
  - { match_id: 1, player_id: 2, innings: 1, batting_position: 5, runs: 4, balls_faced: 7 }
  - { match_id: 1, player_id: 3, innings: 2, batting_position: 1, runs: 137, balls_faced: 120 }
  - { match_id: 1, player_id: 4, innings: 2, batting_position: 2, runs: 7, balls_faced: 3 }
"#,
    )
    .unwrap();

    // Gaps are reported, not rejected: every row is stored.
    let stats = seed_from_dataset(&conn, &data).unwrap();
    assert_eq!(stats.batting, 4);
    assert_eq!(stats.position_gaps, vec![(1, 1)]);
    assert_eq!(database_stats(&conn).unwrap().batting_rows, 4);
    assert!(innings_positions_contiguous(&conn, 1, 2).unwrap());
}

#[test]
fn ingest_log_is_listed_newest_first() {
    let conn = open_memory().unwrap();
    insert_ingest_log(
        &conn,
        "cricbuzz",
        "recent",
        &BatchCounts {
            created: 3,
            ..Default::default()
        },
    )
    .unwrap();
    insert_ingest_log(
        &conn,
        "cricbuzz",
        "live",
        &BatchCounts {
            skipped: 1,
            ..Default::default()
        },
    )
    .unwrap();

    let logs = list_ingest_logs(&conn, 10).unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].feed, "live");
    assert_eq!(logs[0].skipped, 1);
    assert_eq!(logs[1].created, 3);
}

#[test]
fn deleting_winning_team_clears_winner_and_toss() {
    let conn = open_memory().unwrap();
    let india = team(&conn, "India");
    let aus = team(&conn, "Australia");
    let mut nm = completed(india, aus, india, date(2024, 3, 1));
    nm.toss_winner_id = Some(india);
    nm.toss_decision = Some(TossDecision::Bat);
    let m = insert_match(&conn, &nm).unwrap();

    delete_team(&conn, india, Confirmation::Confirmed).unwrap();
    let stored = get_match(&conn, m).unwrap().unwrap();
    assert_eq!(stored.team1_id, None);
    assert_eq!(stored.winner_id, None);
    assert_eq!(stored.toss_winner_id, None);
    assert_eq!(stored.victory, Some(VictoryMargin::runs(20)));
}
