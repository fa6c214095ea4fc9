// Genre starter defaults
// Applied once when a game registers without any custom actions or
// rules. Operators are expected to tune these afterwards; unlisted
// genres start empty.

use crate::entities::profile::{ActionDefinition, GameProfile, ValueType};
use crate::entities::rule::{DetectionRule, RuleParams};
use crate::value_objects::{ActionCategory, Genre};

pub fn apply_genre_defaults(profile: &mut GameProfile) {
    match profile.genre {
        Genre::Mmorpg => apply_mmorpg(profile),
        Genre::MobileRpg => apply_mobile_rpg(profile),
        Genre::Fps | Genre::BattleRoyale => apply_fps(profile),
        Genre::Idle => apply_idle(profile),
        Genre::Card => apply_card(profile),
        Genre::Puzzle => apply_puzzle(profile),
        _ => {}
    }
}

fn rule(
    rule_id: &str,
    name: &str,
    action_types: &[&str],
    params: RuleParams,
    severity: f64,
) -> DetectionRule {
    DetectionRule {
        rule_id: rule_id.to_string(),
        name: name.to_string(),
        action_types: action_types.iter().map(|t| t.to_string()).collect(),
        params,
        severity,
        enabled: true,
    }
}

fn apply_mmorpg(profile: &mut GameProfile) {
    for definition in [
        ActionDefinition::new("kill_monster", ActionCategory::Combat, ValueType::Integer)
            .with_range(1.0, 1_000.0),
        ActionDefinition::new("gain_exp", ActionCategory::Progression, ValueType::Number)
            .with_range(1.0, 10_000.0),
        ActionDefinition::new("level_up", ActionCategory::Progression, ValueType::Integer)
            .with_range(1.0, 500.0),
        ActionDefinition::new("acquire_item", ActionCategory::Resource, ValueType::Integer)
            .with_range(1.0, 100.0),
        ActionDefinition::new("trade_item", ActionCategory::Economy, ValueType::Number)
            .with_range(1.0, 1_000_000.0),
        ActionDefinition::new("complete_quest", ActionCategory::Achievement, ValueType::Integer)
            .with_range(1.0, 50.0),
        ActionDefinition::new("move_location", ActionCategory::Movement, ValueType::Number)
            .with_range(0.0, 10_000.0),
        ActionDefinition::new("use_skill", ActionCategory::Combat, ValueType::Integer)
            .with_range(1.0, 100.0),
        ActionDefinition::new("join_guild", ActionCategory::Social, ValueType::Flag),
        ActionDefinition::new("pvp_battle", ActionCategory::Competitive, ValueType::Integer)
            .with_range(1.0, 100.0),
    ] {
        profile.add_action(definition);
    }

    profile.add_rule(rule(
        "mmorpg_exp_farm",
        "Experience farming",
        &["gain_exp"],
        RuleParams::RateLimit {
            window_secs: 60.0,
            max_per_minute: Some(20),
            max_value_per_minute: Some(50_000.0),
        },
        3.0,
    ));
    profile.add_rule(rule(
        "mmorpg_item_dupe",
        "Item duplication",
        &["acquire_item"],
        RuleParams::Pattern {
            pattern_length: 3,
            repetition_threshold: Some(10),
            perfect_timing_threshold: None,
        },
        4.5,
    ));
    profile.add_rule(rule(
        "mmorpg_teleport",
        "Teleport hack",
        &["move_location"],
        RuleParams::Threshold {
            max_value: Some(1_000.0),
            min_value: None,
        },
        5.0,
    ));
    profile.add_rule(rule(
        "mmorpg_skill_spam",
        "Skill cooldown bypass",
        &["use_skill"],
        RuleParams::RateLimit {
            window_secs: 60.0,
            max_per_minute: Some(60),
            max_value_per_minute: None,
        },
        2.5,
    ));
}

fn apply_mobile_rpg(profile: &mut GameProfile) {
    for definition in [
        ActionDefinition::new("auto_battle", ActionCategory::Combat, ValueType::Integer)
            .with_range(1.0, 1_000.0),
        ActionDefinition::new("reward_collection", ActionCategory::Resource, ValueType::Number)
            .with_range(1.0, 100_000.0),
        ActionDefinition::new("upgrade_equipment", ActionCategory::Customization, ValueType::Integer)
            .with_range(1.0, 20.0),
        ActionDefinition::new("summon_hero", ActionCategory::Gacha, ValueType::Integer)
            .with_range(1.0, 100.0),
        ActionDefinition::new("complete_stage", ActionCategory::Progression, ValueType::Integer)
            .with_range(1.0, 10_000.0),
        ActionDefinition::new("claim_daily", ActionCategory::Achievement, ValueType::Integer)
            .with_range(1.0, 50.0),
        ActionDefinition::new("spend_currency", ActionCategory::Economy, ValueType::Number)
            .with_range(1.0, 1_000_000.0),
        ActionDefinition::new("idle_farming", ActionCategory::Resource, ValueType::Number)
            .with_range(1.0, 100_000.0),
    ] {
        profile.add_action(definition);
    }

    profile.add_rule(rule(
        "mobile_reward_abuse",
        "Reward collection abuse",
        &["reward_collection"],
        RuleParams::RateLimit {
            window_secs: 60.0,
            max_per_minute: Some(10),
            max_value_per_minute: Some(1_000.0),
        },
        3.5,
    ));
    profile.add_rule(rule(
        "mobile_gacha_exploit",
        "Summon pattern anomaly",
        &["summon_hero"],
        RuleParams::Statistical {
            z_threshold: 3.0,
            min_samples: 10,
        },
        4.0,
    ));
    profile.add_rule(rule(
        "mobile_stage_rush",
        "Impossible stage clear rate",
        &["complete_stage"],
        RuleParams::RateLimit {
            window_secs: 60.0,
            max_per_minute: Some(10),
            max_value_per_minute: None,
        },
        4.5,
    ));
}

fn apply_fps(profile: &mut GameProfile) {
    for definition in [
        ActionDefinition::new("player_kill", ActionCategory::Combat, ValueType::Integer)
            .with_range(1.0, 100.0),
        ActionDefinition::new("headshot", ActionCategory::Combat, ValueType::Integer)
            .with_range(1.0, 50.0),
        ActionDefinition::new("move_position", ActionCategory::Movement, ValueType::Number),
        ActionDefinition::new("fire_weapon", ActionCategory::Combat, ValueType::Integer)
            .with_range(1.0, 1_000.0),
        ActionDefinition::new("reload_weapon", ActionCategory::Combat, ValueType::Integer)
            .with_range(1.0, 100.0),
        ActionDefinition::new("match_result", ActionCategory::Competitive, ValueType::Text),
        ActionDefinition::new("accuracy_shot", ActionCategory::Combat, ValueType::Number)
            .with_range(0.0, 1.0),
    ] {
        profile.add_action(definition);
    }

    profile.add_rule(rule(
        "fps_headshot_ratio",
        "Headshot ratio anomaly",
        &["headshot", "accuracy_shot"],
        RuleParams::Statistical {
            z_threshold: 3.0,
            min_samples: 10,
        },
        5.0,
    ));
    profile.add_rule(rule(
        "fps_trigger_timing",
        "Scripted trigger timing",
        &["fire_weapon"],
        RuleParams::Pattern {
            pattern_length: 3,
            repetition_threshold: None,
            perfect_timing_threshold: Some(0.05),
        },
        4.5,
    ));
    profile.add_rule(rule(
        "fps_speed_hack",
        "Movement speed hack",
        &["move_position"],
        RuleParams::Threshold {
            max_value: Some(1_000.0),
            min_value: None,
        },
        4.0,
    ));
}

fn apply_idle(profile: &mut GameProfile) {
    for definition in [
        ActionDefinition::new("idle_income", ActionCategory::Resource, ValueType::Number)
            .with_range(0.0, 1_000_000.0),
        ActionDefinition::new("prestige", ActionCategory::Progression, ValueType::Integer)
            .with_range(1.0, 1_000.0),
        ActionDefinition::new("upgrade_building", ActionCategory::Customization, ValueType::Integer)
            .with_range(1.0, 10_000.0),
        ActionDefinition::new("collect_offline", ActionCategory::Resource, ValueType::Number)
            .with_range(0.0, 10_000_000.0),
        ActionDefinition::new("watch_ad", ActionCategory::Resource, ValueType::Integer)
            .with_range(1.0, 100.0),
        ActionDefinition::new("purchase_boost", ActionCategory::Economy, ValueType::Number)
            .with_range(1.0, 1_000.0),
    ] {
        profile.add_action(definition);
    }

    profile.add_rule(rule(
        "idle_income_hack",
        "Idle income anomaly",
        &["idle_income"],
        RuleParams::Statistical {
            z_threshold: 3.0,
            min_samples: 10,
        },
        4.0,
    ));
    profile.add_rule(rule(
        "idle_offline_exploit",
        "Offline income cap breach",
        &["collect_offline"],
        RuleParams::Threshold {
            max_value: Some(10_000_000.0),
            min_value: None,
        },
        3.5,
    ));
    profile.add_rule(rule(
        "idle_ad_spam",
        "Ad reward spam",
        &["watch_ad"],
        RuleParams::RateLimit {
            window_secs: 3_600.0,
            max_per_minute: Some(50),
            max_value_per_minute: None,
        },
        2.0,
    ));
}

fn apply_card(profile: &mut GameProfile) {
    for definition in [
        ActionDefinition::new("play_card", ActionCategory::Competitive, ValueType::Text),
        ActionDefinition::new("win_match", ActionCategory::Competitive, ValueType::Flag),
        ActionDefinition::new("earn_coins", ActionCategory::Economy, ValueType::Number)
            .with_range(1.0, 10_000.0),
        ActionDefinition::new("open_pack", ActionCategory::Gacha, ValueType::Integer)
            .with_range(1.0, 100.0),
        ActionDefinition::new("craft_card", ActionCategory::Customization, ValueType::Integer)
            .with_range(1.0, 10.0),
        ActionDefinition::new("rank_change", ActionCategory::Competitive, ValueType::Integer)
            .with_range(-1_000.0, 1_000.0),
    ] {
        profile.add_action(definition);
    }

    profile.add_rule(rule(
        "card_win_streak",
        "Win streak anomaly",
        &["win_match"],
        RuleParams::Pattern {
            pattern_length: 3,
            repetition_threshold: Some(5),
            perfect_timing_threshold: None,
        },
        4.0,
    ));
    profile.add_rule(rule(
        "card_pack_exploit",
        "Pack opening exploit",
        &["open_pack"],
        RuleParams::RateLimit {
            window_secs: 60.0,
            max_per_minute: Some(10),
            max_value_per_minute: None,
        },
        3.0,
    ));
    profile.add_rule(rule(
        "card_rank_boost",
        "Rank boosting",
        &["rank_change"],
        RuleParams::Threshold {
            max_value: Some(500.0),
            min_value: None,
        },
        3.5,
    ));
}

fn apply_puzzle(profile: &mut GameProfile) {
    for definition in [
        ActionDefinition::new("solve_puzzle", ActionCategory::Achievement, ValueType::Integer)
            .with_range(1.0, 10_000.0),
        ActionDefinition::new("use_hint", ActionCategory::Resource, ValueType::Integer)
            .with_range(1.0, 100.0),
        ActionDefinition::new("complete_level", ActionCategory::Progression, ValueType::Integer)
            .with_range(1.0, 10_000.0),
        ActionDefinition::new("earn_stars", ActionCategory::Achievement, ValueType::Integer)
            .with_range(1.0, 3.0),
        ActionDefinition::new("buy_moves", ActionCategory::Economy, ValueType::Integer)
            .with_range(1.0, 100.0),
        ActionDefinition::new("solve_time", ActionCategory::Competitive, ValueType::Number)
            .with_range(1.0, 3_600.0),
    ] {
        profile.add_action(definition);
    }

    profile.add_rule(rule(
        "puzzle_solve_speed",
        "Inhuman solve speed",
        &["solve_time"],
        RuleParams::Threshold {
            max_value: None,
            min_value: Some(5.0),
        },
        4.0,
    ));
    profile.add_rule(rule(
        "puzzle_perfect_timing",
        "Scripted solve cadence",
        &["solve_puzzle"],
        RuleParams::Pattern {
            pattern_length: 3,
            repetition_threshold: None,
            perfect_timing_threshold: Some(0.05),
        },
        3.5,
    ));
    profile.add_rule(rule(
        "puzzle_level_skip",
        "Level progression abuse",
        &["complete_level"],
        RuleParams::RateLimit {
            window_secs: 60.0,
            max_per_minute: Some(20),
            max_value_per_minute: None,
        },
        3.0,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_for(genre: Genre) -> GameProfile {
        let mut profile = GameProfile::new("g1", "Test", genre, "");
        apply_genre_defaults(&mut profile);
        profile
    }

    #[test]
    fn fps_defaults_include_headshot_ratio_rule() {
        let profile = profile_for(Genre::Fps);
        assert!(profile.has_rule("fps_headshot_ratio"));
        assert!(profile.actions.contains_key("headshot"));
        assert!(profile.actions.contains_key("accuracy_shot"));
    }

    #[test]
    fn battle_royale_shares_fps_defaults() {
        assert!(profile_for(Genre::BattleRoyale).has_rule("fps_headshot_ratio"));
    }

    #[test]
    fn mobile_rpg_limits_reward_collection() {
        let profile = profile_for(Genre::MobileRpg);
        assert!(profile.actions.contains_key("reward_collection"));
        let abuse = profile
            .detection_rules
            .iter()
            .find(|r| r.rule_id == "mobile_reward_abuse")
            .expect("rule");
        match abuse.params {
            RuleParams::RateLimit { max_per_minute, .. } => {
                assert_eq!(max_per_minute, Some(10));
            }
            _ => panic!("expected rate limit"),
        }
    }

    #[test]
    fn unlisted_genre_starts_empty() {
        let profile = profile_for(Genre::Casino);
        assert!(profile.actions.is_empty());
        assert!(profile.detection_rules.is_empty());
    }

    #[test]
    fn all_default_rules_are_valid() {
        for genre in [
            Genre::Mmorpg,
            Genre::MobileRpg,
            Genre::Fps,
            Genre::Idle,
            Genre::Card,
            Genre::Puzzle,
        ] {
            for rule in &profile_for(genre).detection_rules {
                assert!(rule.validate().is_ok(), "rule {} invalid", rule.rule_id);
            }
        }
    }
}
