use chrono::NaiveDate;
use cricstat_catalog::types::*;
use cricstat_db::analytics::{population_stddev, run_query_with, Cell, Query, QueryId, Strategy};
use cricstat_db::*;
use rusqlite::Connection;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct Db {
    conn: Connection,
    india: i64,
    aus: i64,
}

fn setup() -> Db {
    let conn = open_memory().unwrap();
    let india = insert_team(
        &conn,
        &NewTeam {
            name: "India".to_string(),
            country: "India".to_string(),
        },
    )
    .unwrap();
    let aus = insert_team(
        &conn,
        &NewTeam {
            name: "Australia".to_string(),
            country: "Australia".to_string(),
        },
    )
    .unwrap();
    Db { conn, india, aus }
}

fn player(conn: &Connection, name: &str) -> i64 {
    insert_player(conn, &NewPlayer::new(name, "India", PlayingRole::Batsman)).unwrap()
}

fn game(db: &Db, on: NaiveDate, format: MatchFormat) -> i64 {
    insert_match(&db.conn, &NewMatch::new(db.india, db.aus, on, format)).unwrap()
}

fn decided(db: &Db, on: NaiveDate, winner: i64, victory: VictoryMargin) -> i64 {
    let m = NewMatch {
        winner_id: Some(winner),
        victory: Some(victory),
        status: MatchStatus::Completed,
        ..NewMatch::new(db.india, db.aus, on, MatchFormat::Odi)
    };
    insert_match(&db.conn, &m).unwrap()
}

fn bat(conn: &Connection, match_id: i64, player_id: i64, innings: u32, position: u32, runs: u32, balls: u32) {
    insert_batting(
        conn,
        &NewBatting {
            match_id,
            player_id,
            innings,
            batting_position: position,
            runs,
            balls_faced: balls,
            fours: 0,
            sixes: 0,
            dismissed: true,
        },
    )
    .unwrap();
}

fn text(table: &ResultTable, row: usize, column: &str) -> String {
    table.get(row, column).and_then(Cell::as_str).unwrap().to_string()
}

fn number(table: &ResultTable, row: usize, column: &str) -> f64 {
    table.get(row, column).and_then(Cell::as_f64).unwrap()
}

// ── Catalog ─────────────────────────────────────────────────────────────────

#[test]
fn query_ids_parse_and_describe() {
    assert_eq!(QueryId::parse("Q13").unwrap(), QueryId::Q13);
    assert_eq!(QueryId::parse("q7").unwrap(), QueryId::Q7);
    assert_eq!(QueryId::parse(" 25 ").unwrap(), QueryId::Q25);
    assert!(matches!(QueryId::parse("Q26"), Err(QueryError::UnknownQuery(_))));
    assert!(matches!(QueryId::parse("Q0"), Err(QueryError::UnknownQuery(_))));
    assert!(QueryId::parse("partnerships").is_err());

    assert_eq!(QueryId::ALL.len(), 25);
    for (i, id) in QueryId::ALL.iter().enumerate() {
        assert_eq!(id.number(), i + 1);
        assert_eq!(id.to_string(), format!("Q{}", i + 1));
        assert!(!id.title().is_empty());
        assert!(!id.description().is_empty());
    }
    assert_eq!(QueryId::Q8.tier(), Tier::Basic);
    assert_eq!(QueryId::Q9.tier(), Tier::Intermediate);
    assert_eq!(QueryId::Q17.tier(), Tier::Advanced);
}

#[test]
fn defaults_carry_their_own_id() {
    let as_of = date(2024, 12, 31);
    for id in QueryId::ALL {
        let q = Query::defaults(id, as_of);
        assert_eq!(q.id(), id);
        q.validate().unwrap();
    }
}

#[test]
fn overrides_apply_or_are_rejected() {
    let as_of = date(2024, 12, 31);
    let q = Query::defaults(QueryId::Q1, as_of)
        .with_overrides(&QueryOverrides {
            country: Some("Australia".to_string()),
            limit: Some(5),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(
        q,
        Query::PlayersByCountry {
            country: "Australia".to_string(),
            limit: 5
        }
    );

    let err = Query::defaults(QueryId::Q5, as_of)
        .with_overrides(&QueryOverrides {
            limit: Some(3),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        QueryError::UnsupportedParameter {
            query: QueryId::Q5,
            name: "limit"
        }
    ));

    let q = Query::defaults(QueryId::Q13, as_of)
        .with_overrides(&QueryOverrides {
            threshold: Some(50),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(q, Query::Partnerships { threshold: 50 });
}

#[test]
fn invalid_parameters_are_reported_before_running() {
    let db = setup();
    let err = run_query(
        &db.conn,
        &Query::PlayersByCountry {
            country: " ".to_string(),
            limit: 10,
        },
    )
    .unwrap_err();
    assert!(matches!(
        err,
        QueryError::InvalidParameter {
            query: QueryId::Q1,
            name: "country",
            ..
        }
    ));

    let err = run_query(&db.conn, &Query::RecentMatches { limit: 0 }).unwrap_err();
    assert!(matches!(err, QueryError::InvalidParameter { name: "limit", .. }));
}

#[test]
fn every_query_runs_on_an_empty_database() {
    let db = setup();
    let as_of = date(2024, 12, 31);
    for id in QueryId::ALL {
        let table = run_query(&db.conn, &Query::defaults(id, as_of)).unwrap();
        assert!(!table.columns.is_empty(), "{id} has no columns");
    }
}

#[test]
fn every_query_runs_on_sample_data() {
    let db = setup();
    let v = insert_venue(
        &db.conn,
        &NewVenue {
            name: "Wankhede Stadium".to_string(),
            city: "Mumbai".to_string(),
            country: "India".to_string(),
            capacity: Some(33_000),
        },
    )
    .unwrap();
    let a = player(&db.conn, "Rohit Sharma");
    let b = player(&db.conn, "Shubman Gill");
    for day in 1..=12 {
        let mut nm = NewMatch::new(db.india, db.aus, date(2024, day, 10), MatchFormat::Odi);
        nm.venue_id = Some(v);
        nm.status = MatchStatus::Completed;
        nm.winner_id = Some(db.india);
        nm.toss_winner_id = Some(db.aus);
        nm.toss_decision = Some(TossDecision::Field);
        nm.victory = Some(VictoryMargin::runs(day * 4));
        let m = insert_match(&db.conn, &nm).unwrap();
        bat(&db.conn, m, a, 1, 1, 40 + day, 35);
        bat(&db.conn, m, b, 1, 2, 20 + day * 2, 30);
        insert_bowling(
            &db.conn,
            &NewBowling {
                match_id: m,
                player_id: b,
                innings: 2,
                overs: 5.0,
                maidens: 0,
                runs_conceded: 25 + day,
                wickets: day % 3,
            },
        )
        .unwrap();
    }

    for id in QueryId::ALL {
        run_query(&db.conn, &Query::defaults(id, date(2024, 12, 31))).unwrap();
    }

    let q3 = run_query(
        &db.conn,
        &Query::TopRunScorers {
            format: MatchFormat::Odi,
            limit: 10,
        },
    )
    .unwrap();
    assert_eq!(q3.len(), 2);
    assert_eq!(text(&q3, 0, "Player"), "Rohit Sharma");

    let q12 = run_query(&db.conn, &Query::HomeAway).unwrap();
    let india_row = (0..q12.len())
        .find(|&r| text(&q12, r, "Team") == "India")
        .unwrap();
    assert_eq!(number(&q12, india_row, "Home Wins"), 12.0);
    assert_eq!(number(&q12, india_row, "Away Matches"), 0.0);
}

// ── Tier 1 and 2 ────────────────────────────────────────────────────────────

#[test]
fn players_by_country_and_roles() {
    let db = setup();
    insert_player(&db.conn, &NewPlayer::new("Pat Cummins", "Australia", PlayingRole::Bowler)).unwrap();
    insert_player(&db.conn, &NewPlayer::new("Travis Head", "Australia", PlayingRole::Batsman)).unwrap();
    insert_player(&db.conn, &NewPlayer::new("KL Rahul", "India", PlayingRole::WicketKeeper)).unwrap();

    let q1 = run_query(
        &db.conn,
        &Query::PlayersByCountry {
            country: "australia".to_string(),
            limit: 10,
        },
    )
    .unwrap();
    assert_eq!(q1.len(), 2);
    assert_eq!(text(&q1, 0, "Player"), "Pat Cummins");

    let q6 = run_query(&db.conn, &Query::PlayersByRole).unwrap();
    assert_eq!(q6.len(), 3);
    let roles: Vec<String> = (0..q6.len()).map(|r| text(&q6, r, "Role")).collect();
    assert!(roles.contains(&"Wicket-keeper".to_string()));
}

#[test]
fn large_venues_exclude_unknown_capacity() {
    let db = setup();
    for (name, capacity) in [("MCG", Some(100_024)), ("Lord's", Some(31_100)), ("Unknown Oval", None)] {
        insert_venue(
            &db.conn,
            &NewVenue {
                name: name.to_string(),
                city: name.to_string(),
                country: "Somewhere".to_string(),
                capacity,
            },
        )
        .unwrap();
    }
    let q4 = run_query(&db.conn, &Query::LargeVenues { min_capacity: 50_000 }).unwrap();
    assert_eq!(q4.len(), 1);
    assert_eq!(text(&q4, 0, "Venue"), "MCG");
}

#[test]
fn partnerships_pair_adjacent_positions() {
    let db = setup();
    let m = game(&db, date(2024, 3, 1), MatchFormat::Odi);
    let p1 = player(&db.conn, "Opener One");
    let p2 = player(&db.conn, "Opener Two");
    let p3 = player(&db.conn, "Number Three");
    let p4 = player(&db.conn, "Number Four");
    bat(&db.conn, m, p1, 1, 1, 10, 12);
    bat(&db.conn, m, p2, 1, 2, 5, 9);
    bat(&db.conn, m, p3, 1, 3, 60, 55);
    bat(&db.conn, m, p4, 1, 4, 45, 38);

    let table = run_query(&db.conn, &Query::Partnerships { threshold: 100 }).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(number(&table, 0, "Partnership Runs"), 105.0);
    assert_eq!(number(&table, 0, "Position 1"), 3.0);
    assert_eq!(number(&table, 0, "Position 2"), 4.0);
    assert_eq!(text(&table, 0, "Batsman 1"), "Number Three");

    let none = run_query(&db.conn, &Query::Partnerships { threshold: 150 }).unwrap();
    assert!(none.is_empty());

    let lower = run_query(&db.conn, &Query::Partnerships { threshold: 50 }).unwrap();
    assert_eq!(lower.len(), 2);
}

#[test]
fn close_matches_use_structured_margins() {
    let db = setup();
    let p = player(&db.conn, "Finisher");
    let margins = [
        VictoryMargin::runs(12),
        VictoryMargin::wickets(2),
        VictoryMargin::runs(49),
        VictoryMargin::runs(50),
        VictoryMargin::wickets(5),
    ];
    for (i, margin) in margins.into_iter().enumerate() {
        let m = decided(&db, date(2024, 1, 1 + i as u32), db.india, margin);
        bat(&db.conn, m, p, 1, 6, 30, 20);
    }

    let table = run_query(
        &db.conn,
        &Query::CloseMatches {
            max_runs: 50,
            max_wickets: 5,
            min_matches: 1,
        },
    )
    .unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(number(&table, 0, "Close Matches"), 3.0);
}

// ── Tier 3 ──────────────────────────────────────────────────────────────────

#[test]
fn toss_advantage_percentage() {
    let db = setup();
    for i in 0..10u32 {
        let winner = if i < 6 { db.india } else { db.aus };
        let m = NewMatch {
            toss_winner_id: Some(db.india),
            toss_decision: Some(TossDecision::Bat),
            winner_id: Some(winner),
            victory: Some(VictoryMargin::runs(15)),
            status: MatchStatus::Completed,
            ..NewMatch::new(db.india, db.aus, date(2024, 1, 1 + i), MatchFormat::T20i)
        };
        insert_match(&db.conn, &m).unwrap();
    }

    let table = run_query(&db.conn, &Query::TossAdvantage { format: None }).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(text(&table, 0, "Decision"), "bat");
    assert_eq!(table.get(0, "Tosses"), Some(&Cell::Integer(10)));
    assert_eq!(table.get(0, "Win %"), Some(&Cell::Real(60.0)));

    let odi_only = run_query(
        &db.conn,
        &Query::TossAdvantage {
            format: Some(MatchFormat::Odi),
        },
    )
    .unwrap();
    assert!(odi_only.is_empty());
}

#[test]
fn consistency_ranks_by_standard_deviation() {
    let db = setup();
    let steady = player(&db.conn, "Steady");
    let streaky = player(&db.conn, "Streaky");
    let rookie = player(&db.conn, "Rookie");
    let streaky_runs = [0, 60, 10, 50];
    for (i, runs) in streaky_runs.into_iter().enumerate() {
        let m = game(&db, date(2024, 2, 1 + i as u32), MatchFormat::Odi);
        bat(&db.conn, m, steady, 1, 1, 30, 40);
        bat(&db.conn, m, streaky, 1, 2, runs, 40);
        if i < 2 {
            bat(&db.conn, m, rookie, 1, 3, 99, 60);
        }
    }

    let query = Query::defaults(QueryId::Q19, date(2024, 12, 31))
        .with_overrides(&QueryOverrides {
            min_matches: Some(4),
            ..Default::default()
        })
        .unwrap();
    let table = run_query(&db.conn, &query).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(text(&table, 0, "Player"), "Steady");
    assert_eq!(number(&table, 0, "Std Dev"), 0.0);
    assert_eq!(text(&table, 1, "Player"), "Streaky");
    assert_eq!(number(&table, 1, "Average Runs"), 30.0);

    let expected = population_stddev(&[0.0, 60.0, 10.0, 50.0]).unwrap();
    assert_eq!(number(&table, 1, "Std Dev"), round2(expected));
}

#[test]
fn consistency_defaults_to_innings_from_2022() {
    let db = setup();
    let veteran = player(&db.conn, "Veteran");
    for (i, runs) in [0, 100, 0, 100].into_iter().enumerate() {
        let m = game(&db, date(2021, 3, 1 + i as u32), MatchFormat::Odi);
        bat(&db.conn, m, veteran, 1, 1, runs, 40);
    }
    for i in 0..4u32 {
        let m = game(&db, date(2022, 1, 1 + i), MatchFormat::Odi);
        bat(&db.conn, m, veteran, 1, 1, 40, 40);
    }

    let overrides = QueryOverrides {
        min_matches: Some(4),
        ..Default::default()
    };
    let query = Query::defaults(QueryId::Q19, date(2024, 12, 31))
        .with_overrides(&overrides)
        .unwrap();
    let table = run_query(&db.conn, &query).unwrap();
    assert_eq!(number(&table, 0, "Innings"), 4.0);
    assert_eq!(number(&table, 0, "Std Dev"), 0.0);

    // An explicit earlier year brings the 2021 innings back.
    let everything = Query::defaults(QueryId::Q19, date(2024, 12, 31))
        .with_overrides(&QueryOverrides {
            year: Some(2021),
            ..overrides
        })
        .unwrap();
    let table = run_query(&db.conn, &everything).unwrap();
    assert_eq!(number(&table, 0, "Innings"), 8.0);
    assert_eq!(number(&table, 0, "Average Runs"), 45.0);
}

#[test]
fn head_to_head_counts_unordered_pairs_in_window() {
    let db = setup();
    decided(&db, date(2023, 3, 1), db.india, VictoryMargin::runs(10));
    decided(&db, date(2023, 9, 1), db.india, VictoryMargin::runs(20));
    decided(&db, date(2024, 2, 1), db.india, VictoryMargin::runs(30));
    // Sides swapped: still the same pair.
    let swapped = NewMatch {
        winner_id: Some(db.aus),
        victory: Some(VictoryMargin::wickets(4)),
        status: MatchStatus::Completed,
        ..NewMatch::new(db.aus, db.india, date(2024, 5, 1), MatchFormat::Odi)
    };
    insert_match(&db.conn, &swapped).unwrap();
    decided(&db, date(2024, 8, 1), db.aus, VictoryMargin::wickets(6));
    // Outside the three-year window.
    decided(&db, date(2020, 1, 1), db.aus, VictoryMargin::wickets(9));

    let table = run_query(&db.conn, &Query::defaults(QueryId::Q22, date(2024, 12, 31))).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(text(&table, 0, "Team A"), "India");
    assert_eq!(number(&table, 0, "Matches"), 5.0);
    assert_eq!(number(&table, 0, "Team A Wins"), 3.0);
    assert_eq!(number(&table, 0, "Team B Wins"), 2.0);
    assert_eq!(number(&table, 0, "Avg Margin (runs)"), 20.0);
    assert_eq!(number(&table, 0, "Avg Margin (wickets)"), 5.0);
}

fn recent_form_fixture() -> Db {
    let db = setup();
    let a = player(&db.conn, "In Form");
    let b = player(&db.conn, "Patchy");
    // Before the window; must not count.
    let old = game(&db, date(2023, 6, 1), MatchFormat::Odi);
    bat(&db.conn, old, a, 1, 1, 0, 10);

    for month in 1..=12u32 {
        let m = game(&db, date(2024, month, 15), MatchFormat::Odi);
        bat(&db.conn, m, a, 1, 1, 60, 50);
        bat(&db.conn, m, b, 1, 2, month * 3, 30);
    }
    // Two innings in one Test: the later innings is the more recent.
    let test = game(&db, date(2024, 12, 20), MatchFormat::Test);
    bat(&db.conn, test, a, 1, 1, 100, 150);
    bat(&db.conn, test, a, 3, 1, 0, 4);
    db
}

#[test]
fn recent_form_strategies_agree() {
    let db = recent_form_fixture();
    let query = Query::defaults(QueryId::Q23, date(2024, 12, 31));

    let sql = run_query_with(&db.conn, &query, Strategy::Sql).unwrap();
    let two_pass = run_query_with(&db.conn, &query, Strategy::TwoPass).unwrap();
    let auto = run_query_with(&db.conn, &query, Strategy::Auto).unwrap();
    assert_eq!(sql, two_pass);
    assert_eq!(sql, auto);

    assert_eq!(sql.len(), 2);
    assert_eq!(text(&sql, 0, "Player"), "In Form");
    assert_eq!(number(&sql, 0, "Innings"), 14.0);
    assert_eq!(number(&sql, 0, "Last 5 Avg"), 56.0);
    assert_eq!(number(&sql, 0, "Last 10 Avg"), 58.0);
    assert_eq!(text(&sql, 0, "Form"), "Excellent");

    assert_eq!(text(&sql, 1, "Player"), "Patchy");
    assert_eq!(number(&sql, 1, "Last 5 Avg"), 30.0);
    assert_eq!(number(&sql, 1, "Last 10 Avg"), 22.5);
    assert_eq!(text(&sql, 1, "Form"), "Average");
}

#[test]
fn recent_strike_rate_averages_innings_rates() {
    let db = recent_form_fixture();
    let query = Query::defaults(QueryId::Q23, date(2024, 12, 31));
    for strategy in [Strategy::Sql, Strategy::TwoPass] {
        let table = run_query_with(&db.conn, &query, strategy).unwrap();
        // Last ten: 0 (0 off 4), 66.67 (100 off 150) and eight innings at 120.
        // Runs over balls would give 580 * 100 / 554 = 104.69.
        assert_eq!(number(&table, 0, "Recent Strike Rate"), 102.67);
        assert_eq!(number(&table, 1, "Recent Strike Rate"), 75.0);
    }
}

#[test]
fn recent_form_respects_minimum_innings() {
    let db = recent_form_fixture();
    let query = Query::RecentForm {
        as_of: date(2024, 12, 31),
        min_innings: 13,
    };
    for strategy in [Strategy::Sql, Strategy::TwoPass] {
        let table = run_query_with(&db.conn, &query, strategy).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(text(&table, 0, "Player"), "In Form");
    }
}

#[test]
fn career_trajectory_classifies_phases() {
    let db = setup();
    let steady = player(&db.conn, "Pat Steady");
    let swing = player(&db.conn, "Quinn Swing");
    let quarters = [(2023, 1), (2023, 4), (2023, 7), (2023, 10), (2024, 1), (2024, 4)];
    for (qi, (year, month)) in quarters.into_iter().enumerate() {
        for day in [5, 10, 15] {
            let m = game(&db, date(year, month, day), MatchFormat::Odi);
            bat(&db.conn, m, steady, 1, 1, 45, 50);
            bat(&db.conn, m, swing, 1, 2, if qi % 2 == 0 { 60 } else { 30 }, 50);
        }
    }

    let table = run_query(&db.conn, &Query::defaults(QueryId::Q25, date(2024, 12, 31))).unwrap();
    assert_eq!(table.len(), 2);

    assert_eq!(text(&table, 0, "Player"), "Pat Steady");
    assert_eq!(number(&table, 0, "Quarters"), 6.0);
    assert_eq!(number(&table, 0, "Volatility"), 0.0);
    assert_eq!(text(&table, 0, "Phase"), "Stable");

    assert_eq!(text(&table, 1, "Player"), "Quinn Swing");
    assert_eq!(number(&table, 1, "Average"), 45.0);
    assert_eq!(number(&table, 1, "Volatility"), 15.0);
    assert_eq!(text(&table, 1, "Phase"), "Ascending");

    // One quarter fewer than required drops everyone.
    let strict = Query::CareerTrajectory {
        as_of: date(2024, 12, 31),
        years: 3,
        min_quarter_matches: 3,
        min_quarters: 7,
    };
    assert!(run_query(&db.conn, &strict).unwrap().is_empty());
}

#[test]
fn career_phase_uses_unrounded_volatility() {
    let db = setup();
    let late = player(&db.conn, "Late Bloomer");
    // Five quarters averaging 5.00, then one averaging 191 / 6 = 31.83.
    // Population stddev is 9.99895: below 10 unrounded, 10.00 once rounded.
    let quiet = [(2023, 1), (2023, 4), (2023, 7), (2023, 10), (2024, 1)];
    for (year, month) in quiet {
        for day in [5, 10, 15] {
            let m = game(&db, date(year, month, day), MatchFormat::Odi);
            bat(&db.conn, m, late, 1, 1, 5, 20);
        }
    }
    for (day, runs) in [(2, 31), (6, 32), (10, 32), (14, 32), (18, 32), (22, 32)] {
        let m = game(&db, date(2024, 4, day), MatchFormat::Odi);
        bat(&db.conn, m, late, 1, 1, runs, 40);
    }

    let table = run_query(&db.conn, &Query::defaults(QueryId::Q25, date(2024, 12, 31))).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(number(&table, 0, "Last Quarter Avg"), 31.83);
    assert_eq!(number(&table, 0, "Average"), 9.47);
    assert_eq!(number(&table, 0, "Volatility"), 10.0);
    assert_eq!(text(&table, 0, "Phase"), "Stable");
}

#[test]
fn best_partnerships_aggregate_unordered_pairs() {
    let db = setup();
    let x = player(&db.conn, "Left Hand");
    let y = player(&db.conn, "Right Hand");
    let totals = [(40, 30), (20, 10), (35, 30), (5, 5), (60, 40)];
    for (i, (rx, ry)) in totals.into_iter().enumerate() {
        let m = game(&db, date(2024, 4, 1 + i as u32), MatchFormat::T20i);
        // Alternate who bats first; the pair is the same.
        if i % 2 == 0 {
            bat(&db.conn, m, x, 1, 1, rx, 30);
            bat(&db.conn, m, y, 1, 2, ry, 30);
        } else {
            bat(&db.conn, m, y, 1, 1, ry, 30);
            bat(&db.conn, m, x, 1, 2, rx, 30);
        }
    }

    let table = run_query(&db.conn, &Query::defaults(QueryId::Q24, date(2024, 12, 31))).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(number(&table, 0, "Partnerships"), 5.0);
    // 70, 30, 65, 10, 100
    assert_eq!(number(&table, 0, "Average"), 55.0);
    assert_eq!(number(&table, 0, "Successful"), 3.0);
    assert_eq!(number(&table, 0, "Highest"), 100.0);
    assert_eq!(number(&table, 0, "Success Rate %"), 60.0);
}

#[test]
fn composite_ranking_uses_fixed_weights() {
    let db = setup();
    let p = player(&db.conn, "All Round");
    let m = game(&db, date(2024, 1, 1), MatchFormat::Odi);
    bat(&db.conn, m, p, 1, 4, 100, 80);
    insert_bowling(
        &db.conn,
        &NewBowling {
            match_id: m,
            player_id: p,
            innings: 2,
            overs: 10.0,
            maidens: 0,
            runs_conceded: 40,
            wickets: 2,
        },
    )
    .unwrap();

    let table = run_query(&db.conn, &Query::PerformanceRanking { min_matches: 1 }).unwrap();
    assert_eq!(table.len(), 1);
    // 100 * 0.01 + 100 * 0.5 + 125 * 0.3
    assert_eq!(number(&table, 0, "Batting Points"), 88.5);
    // 2 * 2 + (50 - 20) * 0.5
    assert_eq!(number(&table, 0, "Bowling Points"), 19.0);
    assert_eq!(number(&table, 0, "Total Points"), 107.5);
}

#[test]
fn results_serialize_as_records() {
    let db = setup();
    let table = run_query(&db.conn, &Query::TeamWins).unwrap();
    let json = serde_json::to_value(table.records()).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[0]["Wins"], 0);
}
