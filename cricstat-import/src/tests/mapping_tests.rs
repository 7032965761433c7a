use super::*;
use cricstat_api::types::{MatchInfo, TeamInfo, VenueInfo};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn team(name: &str, short: &str) -> Option<TeamInfo> {
    Some(TeamInfo {
        team_id: None,
        team_name: Some(name.to_string()),
        team_s_name: Some(short.to_string()),
    })
}

fn completed_info() -> MatchInfo {
    MatchInfo {
        match_id: Some("75651".to_string()),
        match_desc: Some("Final".to_string()),
        match_format: Some("ODI".to_string()),
        start_date: Some("1700384400000".to_string()),
        state: Some("Complete".to_string()),
        status: Some("Australia won by 6 wkts".to_string()),
        team1: team("India", "IND"),
        team2: team("Australia", "AUS"),
        venue_info: Some(VenueInfo {
            ground: Some("Narendra Modi Stadium".to_string()),
            city: Some("Ahmedabad".to_string()),
            ..VenueInfo::default()
        }),
        ..MatchInfo::default()
    }
}

fn listed(info: &MatchInfo) -> ListedMatch<'_> {
    ListedMatch {
        series_id: Some("7476"),
        series_name: Some("ICC Cricket World Cup 2023"),
        info,
    }
}

#[test]
fn timestamps_in_seconds_and_millis() {
    assert_eq!(normalize_timestamp("1700384400000"), Some(date(2023, 11, 19)));
    assert_eq!(normalize_timestamp("1700384400"), Some(date(2023, 11, 19)));
    assert_eq!(normalize_timestamp(" 1704067200 "), Some(date(2024, 1, 1)));
    assert_eq!(normalize_timestamp("1.7043840e12"), Some(date(2024, 1, 4)));
    // Exactly at the threshold is still seconds.
    assert_eq!(normalize_timestamp("100000000000"), Some(date(5138, 11, 16)));
    assert_eq!(normalize_timestamp("100000000001"), Some(date(1973, 3, 3)));
    assert_eq!(normalize_timestamp("yesterday"), None);
    assert_eq!(normalize_timestamp("-5"), None);
    assert_eq!(normalize_timestamp(""), None);
}

#[test]
fn formats_default_to_t20i() {
    assert_eq!(map_format(Some("TEST")), MatchFormat::Test);
    assert_eq!(map_format(Some("ODI")), MatchFormat::Odi);
    assert_eq!(map_format(Some("T20")), MatchFormat::T20i);
    assert_eq!(map_format(Some("T10")), MatchFormat::T20i);
    assert_eq!(map_format(None), MatchFormat::T20i);
}

#[test]
fn statuses_from_state_and_text() {
    assert_eq!(map_status(Some("Complete"), None), MatchStatus::Completed);
    assert_eq!(map_status(Some("In Progress"), None), MatchStatus::Live);
    assert_eq!(map_status(Some("Stumps"), None), MatchStatus::Live);
    assert_eq!(map_status(Some("Upcoming"), None), MatchStatus::Scheduled);
    assert_eq!(map_status(Some("Preview"), None), MatchStatus::Scheduled);
    assert_eq!(map_status(Some("Abandon"), None), MatchStatus::Abandoned);
    assert_eq!(map_status(None, Some("No result")), MatchStatus::Abandoned);
    assert_eq!(map_status(None, Some("India won by 5 wkts")), MatchStatus::Completed);
    assert_eq!(map_status(Some("Mystery"), Some("Match drawn")), MatchStatus::Completed);
    assert_eq!(map_status(Some("Mystery"), None), MatchStatus::Scheduled);
    assert_eq!(map_status(None, None), MatchStatus::Scheduled);
}

#[test]
fn result_text_parsing() {
    assert_eq!(
        parse_result("India won by 5 wkts"),
        Some(ParsedResult {
            winner: "India".to_string(),
            victory: Some(VictoryMargin::wickets(5)),
        })
    );
    assert_eq!(
        parse_result("Australia won by 70 runs"),
        Some(ParsedResult {
            winner: "Australia".to_string(),
            victory: Some(VictoryMargin::runs(70)),
        })
    );
    assert_eq!(
        parse_result("England won by an innings and 32 runs").and_then(|r| r.victory),
        Some(VictoryMargin::runs(32))
    );
    assert_eq!(
        parse_result("South Africa won by 1 wkt (with 3 balls remaining)").and_then(|r| r.victory),
        Some(VictoryMargin::wickets(1))
    );
    assert_eq!(
        parse_result("NZ Won by 4 Wickets (DLS method)").map(|r| r.winner),
        Some("NZ".to_string())
    );

    let super_over = parse_result("India won the Super Over").unwrap();
    assert_eq!(super_over.winner, "India");
    assert_eq!(super_over.victory, None);

    assert_eq!(parse_result("India won the toss and opted to bat"), None);
    assert_eq!(parse_result("Match tied"), None);
    assert_eq!(parse_result("Match drawn"), None);
}

#[test]
fn winner_matches_full_or_short_name() {
    let india = ExternalTeam {
        name: "India".to_string(),
        short_name: Some("IND".to_string()),
    };
    let aus = ExternalTeam {
        name: "Australia".to_string(),
        short_name: Some("AUS".to_string()),
    };
    let result = |w: &str| ParsedResult {
        winner: w.to_string(),
        victory: None,
    };
    assert_eq!(winning_side(&result("india"), &india, &aus), Some(Side::Team1));
    assert_eq!(winning_side(&result("AUS"), &india, &aus), Some(Side::Team2));
    assert_eq!(winning_side(&result("England"), &india, &aus), None);
}

#[test]
fn normalizes_completed_match() {
    let info = completed_info();
    let m = normalize_match(&listed(&info)).unwrap();
    assert_eq!(m.external_id, "75651");
    assert_eq!(m.series_external_id.as_deref(), Some("7476"));
    assert_eq!(m.format, MatchFormat::Odi);
    assert_eq!(m.match_date, date(2023, 11, 19));
    assert_eq!(m.status, MatchStatus::Completed);
    assert_eq!(m.winner, Some(Side::Team2));
    assert_eq!(m.victory, Some(VictoryMargin::wickets(6)));
    assert_eq!(
        m.venue,
        Some(ExternalVenue {
            name: "Narendra Modi Stadium".to_string(),
            city: "Ahmedabad".to_string(),
        })
    );
}

#[test]
fn live_match_has_no_winner() {
    let mut info = completed_info();
    info.state = Some("In Progress".to_string());
    info.status = Some("Australia need 40 runs".to_string());
    let m = normalize_match(&listed(&info)).unwrap();
    assert_eq!(m.status, MatchStatus::Live);
    assert_eq!(m.winner, None);
    assert_eq!(m.victory, None);
}

#[test]
fn missing_venue_city_defaults_to_unknown() {
    let mut info = completed_info();
    info.venue_info = Some(VenueInfo {
        ground: Some("Lord's".to_string()),
        ..VenueInfo::default()
    });
    let m = normalize_match(&listed(&info)).unwrap();
    assert_eq!(m.venue.unwrap().city, "Unknown");

    info.venue_info = None;
    assert_eq!(normalize_match(&listed(&info)).unwrap().venue, None);
}

#[test]
fn data_quality_failures_are_skipped() {
    let mut info = completed_info();
    info.match_id = Some("  ".to_string());
    assert_eq!(normalize_match(&listed(&info)), Err(SkipReason::MissingId));

    let mut info = completed_info();
    info.start_date = Some("soon".to_string());
    assert_eq!(normalize_match(&listed(&info)), Err(SkipReason::InvalidDate));

    let mut info = completed_info();
    info.start_date = None;
    assert_eq!(normalize_match(&listed(&info)), Err(SkipReason::InvalidDate));

    let mut info = completed_info();
    info.team2 = None;
    assert_eq!(normalize_match(&listed(&info)), Err(SkipReason::MissingTeams));

    let mut info = completed_info();
    info.team2 = team("INDIA", "IND");
    assert_eq!(normalize_match(&listed(&info)), Err(SkipReason::SameTeams));
}
