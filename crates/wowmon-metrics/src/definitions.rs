//! Every metric exported by the AzerothCore exporter.
//!
//! Names and label keys are part of the public contract with existing
//! dashboards and must not change.

use crate::registry::MetricDesc;

// ── Players ────────────────────────────────────────────────────

pub static PLAYERS_ONLINE: MetricDesc = MetricDesc::gauge_vec(
    "wow_players_online",
    "Number of players currently online",
    &["faction"],
);

pub static PLAYERS_TOTAL: MetricDesc =
    MetricDesc::gauge_vec("wow_players_total", "Total number of players", &["faction"]);

pub static PLAYERS_BY_LEVEL: MetricDesc = MetricDesc::gauge_vec(
    "wow_players_by_level",
    "Number of players by level",
    &["level", "faction"],
);

pub static PLAYERS_BY_CLASS: MetricDesc = MetricDesc::gauge_vec(
    "wow_players_by_class",
    "Number of players by class",
    &["class", "faction"],
);

pub static ONLINE_PLAYERS_BY_LEVEL: MetricDesc = MetricDesc::gauge_vec(
    "wow_online_players_by_level",
    "Level of each online character, labeled with its account",
    &["character", "account"],
);

// ── Mail ───────────────────────────────────────────────────────

pub static MAIL_TOTAL: MetricDesc =
    MetricDesc::gauge("wow_mail_total", "Total number of mail messages");

pub static MAIL_BY_FACTION: MetricDesc = MetricDesc::gauge_vec(
    "wow_mail_by_faction",
    "Number of mail messages by faction",
    &["faction"],
);

pub static MAIL_WITH_ITEMS: MetricDesc =
    MetricDesc::gauge("wow_mail_with_items", "Number of mail messages with items");

pub static UNREAD_MAIL: MetricDesc =
    MetricDesc::gauge("wow_unread_mail_count", "Number of unread mail messages");

// ── Accounts ───────────────────────────────────────────────────

pub static ACCOUNTS_TOTAL: MetricDesc =
    MetricDesc::gauge("wow_accounts_total", "Total number of accounts");

pub static ACCOUNTS_ONLINE: MetricDesc =
    MetricDesc::gauge("wow_accounts_online", "Number of accounts currently online");

pub static ACCOUNTS_BANNED: MetricDesc =
    MetricDesc::gauge("wow_accounts_banned", "Number of banned accounts");

pub static GM_ACCOUNTS: MetricDesc =
    MetricDesc::gauge("wow_gm_account_count", "Number of accounts with GM level");

// ── Server ─────────────────────────────────────────────────────

pub static SERVER_UPTIME: MetricDesc =
    MetricDesc::gauge("wow_server_uptime_seconds", "Server uptime in seconds");

pub static SERVER_MAX_PLAYERS: MetricDesc =
    MetricDesc::gauge("wow_server_max_players", "Maximum number of players recorded");

pub static LAST_RESTART: MetricDesc = MetricDesc::gauge(
    "wow_server_last_restart_timestamp",
    "Timestamp of the last server restart (unix time)",
);

// ── Economy and social ─────────────────────────────────────────

pub static AUCTIONS: MetricDesc = MetricDesc::gauge_vec(
    "wow_auction_count",
    "Number of active auctions by house (faction)",
    &["house"],
);

pub static GUILDS: MetricDesc = MetricDesc::gauge("wow_guild_count", "Number of guilds");

pub static MAX_LEVEL_CHARACTERS: MetricDesc = MetricDesc::gauge_vec(
    "wow_max_level_characters",
    "Number of max-level characters by faction",
    &["faction"],
);

pub static BANNED_CHARACTERS: MetricDesc =
    MetricDesc::gauge("wow_banned_characters", "Number of banned characters");

// ── Chat and logs ──────────────────────────────────────────────

pub static CHANNELS: MetricDesc = MetricDesc::gauge("wow_channel_count", "Number of chat channels");

pub static CHANNEL_BANS: MetricDesc =
    MetricDesc::gauge("wow_channel_bans", "Number of channel bans");

pub static LOGS_BY_TYPE: MetricDesc =
    MetricDesc::gauge_vec("wow_log_count", "Number of log entries by type", &["type"]);

pub static GUILD_EVENTS: MetricDesc = MetricDesc::gauge("wow_guild_events", "Number of guild events");

pub static MONEY_LOGS: MetricDesc =
    MetricDesc::gauge("wow_money_logs", "Number of money transaction logs");

pub static ENCOUNTER_LOGS: MetricDesc =
    MetricDesc::gauge("wow_encounter_logs", "Number of encounter logs");

pub static ARENA_LOGS: MetricDesc = MetricDesc::gauge("wow_arena_logs", "Number of arena fight logs");

pub static IP_ACTION_LOGS: MetricDesc =
    MetricDesc::gauge("wow_ip_action_logs", "Number of IP action logs");

// ── Instances ──────────────────────────────────────────────────

pub static ACTIVE_INSTANCES: MetricDesc =
    MetricDesc::gauge("wow_active_instances", "Number of active instances");

pub static INSTANCES_BY_DIFFICULTY: MetricDesc = MetricDesc::gauge_vec(
    "wow_instances_by_difficulty",
    "Number of instances by difficulty",
    &["difficulty"],
);

pub static COMPLETED_ENCOUNTERS: MetricDesc = MetricDesc::gauge_vec(
    "wow_completed_encounters",
    "Number of completed encounters by instance",
    &["instance_id"],
);

pub static INSTANCE_RESETS: MetricDesc = MetricDesc::gauge_vec(
    "wow_instance_resets",
    "Instance reset times by map and difficulty",
    &["map_id", "difficulty"],
);

pub static CHARACTERS_IN_INSTANCES: MetricDesc = MetricDesc::gauge(
    "wow_characters_in_instances",
    "Number of characters currently in instances",
);

pub static LFG_DATA: MetricDesc =
    MetricDesc::gauge_vec("wow_lfg_data", "Number of LFG entries by state", &["state"]);

pub static LAG_REPORTS: MetricDesc = MetricDesc::gauge("wow_lag_reports", "Number of lag reports");

pub static INSTANCE_SAVES: MetricDesc =
    MetricDesc::gauge("wow_instance_saves", "Number of saved instance states");

// ── Network ────────────────────────────────────────────────────

pub static PLAYER_LATENCY: MetricDesc =
    MetricDesc::gauge_vec("wow_player_latency", "Player latency statistics", &["stat"]);

pub static IP_BANNED: MetricDesc =
    MetricDesc::gauge("wow_ip_banned_count", "Number of banned IP addresses");

pub static IP_ACTIONS_BY_TYPE: MetricDesc = MetricDesc::gauge_vec(
    "wow_ip_action_logs_by_type",
    "Number of IP action logs by type",
    &["type"],
);

pub static LAG_REPORTS_BY_TYPE: MetricDesc = MetricDesc::gauge_vec(
    "wow_lag_reports_by_type",
    "Number of lag reports by type",
    &["lag_type"],
);

pub static AVERAGE_LATENCY: MetricDesc =
    MetricDesc::gauge("wow_average_latency_ms", "Average player latency in milliseconds");

pub static HIGH_LATENCY_PLAYERS: MetricDesc = MetricDesc::gauge(
    "wow_high_latency_players",
    "Number of players with high latency (>200ms)",
);

pub static NETWORK_ACTIVITY_BY_IP: MetricDesc = MetricDesc::gauge_vec(
    "wow_network_activity_by_ip",
    "Network activity by IP address (top 10)",
    &["ip"],
);

// ── Battlegrounds ──────────────────────────────────────────────

pub static BG_DESERTERS: MetricDesc =
    MetricDesc::gauge("wow_battleground_deserters", "Number of battleground deserters");

pub static BG_DESERTERS_BY_TYPE: MetricDesc = MetricDesc::gauge_vec(
    "wow_battleground_deserters_by_type",
    "Number of battleground deserters by type",
    &["desertion_type"],
);

pub static RANDOM_BG_QUEUE: MetricDesc = MetricDesc::gauge(
    "wow_random_battleground_queue",
    "Number of players in random battleground queue",
);

pub static BG_STATS: MetricDesc =
    MetricDesc::gauge_vec("wow_battleground_stats", "Battleground statistics", &["stat"]);

pub static BGS_BY_TYPE: MetricDesc = MetricDesc::gauge_vec(
    "wow_battlegrounds_by_type",
    "Number of battlegrounds by type",
    &["battleground_type"],
);

pub static BGS_BY_BRACKET: MetricDesc = MetricDesc::gauge_vec(
    "wow_battlegrounds_by_bracket",
    "Number of battlegrounds by bracket",
    &["bracket"],
);

pub static BG_WINS_BY_FACTION: MetricDesc = MetricDesc::gauge_vec(
    "wow_battleground_wins_by_faction",
    "Number of battleground wins by faction",
    &["faction"],
);

pub static BG_PLAYER_STATS: MetricDesc = MetricDesc::gauge_vec(
    "wow_battleground_player_stats",
    "Battleground player statistics",
    &["stat"],
);

pub static BG_TEMPLATES: MetricDesc = MetricDesc::gauge_vec(
    "wow_battleground_templates",
    "Battleground template information",
    &["template_id", "script_name"],
);

pub static BG_TEMPLATE_DETAILS: MetricDesc = MetricDesc::gauge_vec(
    "wow_battleground_template_details",
    "Detailed battleground template information",
    &["template_id", "name", "min_level", "max_level", "min_players", "max_players"],
);

pub static RECENT_BGS: MetricDesc = MetricDesc::gauge_vec(
    "wow_recent_battlegrounds",
    "Recent battleground activity",
    &["time_period"],
);

// ── Exporter self-observability ────────────────────────────────

pub static COLLECTOR_SUCCESS: MetricDesc = MetricDesc::gauge_vec(
    "wow_exporter_collector_success",
    "Whether the metric group published during the last scrape (1) or failed (0)",
    &["collector"],
);

pub static COLLECTOR_DURATION: MetricDesc = MetricDesc::gauge_vec(
    "wow_exporter_collector_duration_seconds",
    "Time spent collecting the metric group during the last scrape",
    &["collector"],
);

/// The full catalogue, in registration order.
pub static ALL: &[&MetricDesc] = &[
    &PLAYERS_ONLINE,
    &PLAYERS_TOTAL,
    &PLAYERS_BY_LEVEL,
    &PLAYERS_BY_CLASS,
    &ONLINE_PLAYERS_BY_LEVEL,
    &MAIL_TOTAL,
    &MAIL_BY_FACTION,
    &MAIL_WITH_ITEMS,
    &UNREAD_MAIL,
    &ACCOUNTS_TOTAL,
    &ACCOUNTS_ONLINE,
    &ACCOUNTS_BANNED,
    &GM_ACCOUNTS,
    &SERVER_UPTIME,
    &SERVER_MAX_PLAYERS,
    &LAST_RESTART,
    &AUCTIONS,
    &GUILDS,
    &MAX_LEVEL_CHARACTERS,
    &BANNED_CHARACTERS,
    &CHANNELS,
    &CHANNEL_BANS,
    &LOGS_BY_TYPE,
    &GUILD_EVENTS,
    &MONEY_LOGS,
    &ENCOUNTER_LOGS,
    &ARENA_LOGS,
    &IP_ACTION_LOGS,
    &ACTIVE_INSTANCES,
    &INSTANCES_BY_DIFFICULTY,
    &COMPLETED_ENCOUNTERS,
    &INSTANCE_RESETS,
    &CHARACTERS_IN_INSTANCES,
    &LFG_DATA,
    &LAG_REPORTS,
    &INSTANCE_SAVES,
    &PLAYER_LATENCY,
    &IP_BANNED,
    &IP_ACTIONS_BY_TYPE,
    &LAG_REPORTS_BY_TYPE,
    &AVERAGE_LATENCY,
    &HIGH_LATENCY_PLAYERS,
    &NETWORK_ACTIVITY_BY_IP,
    &BG_DESERTERS,
    &BG_DESERTERS_BY_TYPE,
    &RANDOM_BG_QUEUE,
    &BG_STATS,
    &BGS_BY_TYPE,
    &BGS_BY_BRACKET,
    &BG_WINS_BY_FACTION,
    &BG_PLAYER_STATS,
    &BG_TEMPLATES,
    &BG_TEMPLATE_DETAILS,
    &RECENT_BGS,
    &COLLECTOR_SUCCESS,
    &COLLECTOR_DURATION,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use std::collections::HashSet;

    #[test]
    fn catalogue_registers_cleanly() {
        let registry = Registry::with_metrics(ALL).unwrap();
        assert_eq!(registry.len(), ALL.len());
    }

    #[test]
    fn names_are_unique_and_prefixed() {
        let mut seen = HashSet::new();
        for desc in ALL {
            assert!(desc.name.starts_with("wow_"), "{} lacks prefix", desc.name);
            assert!(seen.insert(desc.name), "{} defined twice", desc.name);
        }
    }

    #[test]
    fn label_names_are_lowercase_identifiers() {
        for desc in ALL {
            for label in desc.label_names() {
                assert!(
                    label.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                    "{}: bad label {label}",
                    desc.name
                );
            }
        }
    }
}
