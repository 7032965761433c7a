use cricstat_catalog::*;

#[test]
fn strike_rate_formula() {
    assert_eq!(strike_rate(60, 40), 150.0);
    assert_eq!(strike_rate(45, 38), 118.42);
    assert_eq!(strike_rate(0, 0), 0.0);
    assert_eq!(strike_rate(12, 0), 0.0);
}

#[test]
fn economy_rate_formula() {
    assert_eq!(economy_rate(42, 10.0), 4.2);
    assert_eq!(economy_rate(31, 4.0), 7.75);
    assert_eq!(economy_rate(20, 3.0), 6.67);
    assert_eq!(economy_rate(5, 0.0), 0.0);
}

#[test]
fn parse_playing_role_variants() {
    assert_eq!("Batsman".parse::<PlayingRole>(), Ok(PlayingRole::Batsman));
    assert_eq!("all-rounder".parse::<PlayingRole>(), Ok(PlayingRole::AllRounder));
    assert_eq!("Allrounder".parse::<PlayingRole>(), Ok(PlayingRole::AllRounder));
    assert_eq!("WK-Batsman".parse::<PlayingRole>(), Ok(PlayingRole::WicketKeeper));
    let err = "Umpire".parse::<PlayingRole>().unwrap_err();
    assert_eq!(err.kind, "playing role");
    assert_eq!(err.value, "Umpire");
}

#[test]
fn parse_format_treats_t20_as_t20i() {
    assert_eq!("t20".parse::<MatchFormat>(), Ok(MatchFormat::T20i));
    assert_eq!("T20I".parse::<MatchFormat>(), Ok(MatchFormat::T20i));
    assert_eq!("odi".parse::<MatchFormat>(), Ok(MatchFormat::Odi));
    assert!("Hundred".parse::<MatchFormat>().is_err());
    assert_eq!(MatchFormat::T20i.to_string(), "T20I");
}

#[test]
fn parse_status_aliases() {
    assert_eq!("upcoming".parse::<MatchStatus>(), Ok(MatchStatus::Scheduled));
    assert_eq!("inprogress".parse::<MatchStatus>(), Ok(MatchStatus::Live));
    assert_eq!("Complete".parse::<MatchStatus>(), Ok(MatchStatus::Completed));
    assert_eq!("washout".parse::<MatchStatus>(), Ok(MatchStatus::Abandoned));
}

#[test]
fn margin_display() {
    assert_eq!(VictoryMargin::runs(49).to_string(), "49 runs");
    assert_eq!(VictoryMargin::wickets(5).to_string(), "5 wickets");
}

#[test]
fn patch_apply_optional() {
    let current = Some("Right-hand bat".to_string());
    assert_eq!(Patch::<String>::Keep.apply_optional(&current), None);
    assert_eq!(
        Patch::Set("Right-hand bat".to_string()).apply_optional(&current),
        None
    );
    assert_eq!(
        Patch::Set("Left-hand bat".to_string()).apply_optional(&current),
        Some(Some("Left-hand bat".to_string()))
    );
    assert_eq!(Patch::<String>::Clear.apply_optional(&current), Some(None));
    assert_eq!(Patch::<String>::Clear.apply_optional(&None), None);
}

#[test]
fn patch_from_option() {
    assert_eq!(Patch::from(Some(3u32)), Patch::Set(3));
    assert_eq!(Patch::<u32>::from(None), Patch::Keep);
    assert_eq!(PlayerPatch::default().full_name, Patch::Keep);
}
