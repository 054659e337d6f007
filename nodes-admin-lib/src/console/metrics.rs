//! Dashboard metric cards

use crate::format::compact_bytes;
use crate::format::number_value;
use crate::model::Analytics;

/// Icon shown in a card's header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricIcon {
    #[default]
    Users,
    Activity,
    Nodes,
    Data,
}

/// Which user statistic a drill-down shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStat {
    NewUsers,
    ActiveUsers,
}

/// What selecting a card opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricAction {
    /// User statistics limited to the last `days` days.
    UserStats { stat: UserStat, days: u32 },
    /// The users page.
    UsersPage,
}

/// One card on the analytics dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetricCard {
    pub header: String,
    pub value: String,
    pub description: String,
    pub icon: MetricIcon,
    /// ORCID sub-count shown next to the value.
    pub orcid: Option<i64>,
    pub action: Option<MetricAction>,
}

impl MetricCard {
    fn new(header: &str, value: String, description: &str, icon: MetricIcon) -> Self {
        Self {
            header: header.to_string(),
            value,
            description: description.to_string(),
            icon,
            orcid: None,
            action: None,
        }
    }

    fn orcid(mut self, count: i64) -> Self {
        self.orcid = Some(count);
        self
    }

    fn action(mut self, action: MetricAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Returns `true` for the empty spacer card.
    pub fn is_spacer(&self) -> bool {
        self.header.is_empty() && self.value.is_empty()
    }
}

const WINDOWS: [(&str, u32); 3] = [("Today", 1), ("Last 7 days", 7), ("Last 30 days", 30)];

/// Builds the dashboard cards in display order.
pub fn metric_cards(analytics: &Analytics) -> Vec<MetricCard> {
    let a = analytics;
    let mut cards = Vec::with_capacity(18);

    let new_users = [
        (a.new_users_today, a.new_orcid_users_today),
        (a.new_users_in_last_7_days, a.new_orcid_users_in_last_7_days),
        (a.new_users_in_last_30_days, a.new_orcid_users_in_last_30_days),
    ];
    for ((description, days), (count, orcid)) in WINDOWS.into_iter().zip(new_users) {
        cards.push(
            MetricCard::new("New users", number_value(count), description, MetricIcon::Users)
                .orcid(orcid)
                .action(MetricAction::UserStats {
                    stat: UserStat::NewUsers,
                    days,
                }),
        );
    }

    let active_users = [
        (a.active_users_today, a.active_orcid_users_today),
        (a.active_users_in_last_7_days, a.active_orcid_users_in_last_7_days),
        (a.active_users_in_last_30_days, a.active_orcid_users_in_last_30_days),
    ];
    for ((description, days), (count, orcid)) in WINDOWS.into_iter().zip(active_users) {
        cards.push(
            MetricCard::new("Active users", number_value(count), description, MetricIcon::Activity)
                .orcid(orcid)
                .action(MetricAction::UserStats {
                    stat: UserStat::ActiveUsers,
                    days,
                }),
        );
    }

    cards.push(
        MetricCard::new("All Users", number_value(a.all_users), "Platform", MetricIcon::Users)
            .orcid(a.all_orcid_users)
            .action(MetricAction::UsersPage),
    );
    // The backend has no external-user counter yet; the weekly active count stands in.
    cards.push(MetricCard::new(
        "All External Users",
        number_value(a.active_users_in_last_7_days),
        "Non Desci users",
        MetricIcon::Users,
    ));
    cards.push(MetricCard::default());

    let new_nodes = [a.new_nodes_today, a.new_nodes_in_last_7_days, a.new_nodes_in_last_30_days];
    for ((description, _), count) in WINDOWS.into_iter().zip(new_nodes) {
        cards.push(MetricCard::new("New Nodes", number_value(count), description, MetricIcon::Nodes));
    }

    let node_views = [a.node_views_today, a.node_views_in_last_7_days, a.node_views_in_last_30_days];
    for ((description, _), count) in WINDOWS.into_iter().zip(node_views) {
        cards.push(MetricCard::new("Node views", number_value(count), description, MetricIcon::Nodes));
    }

    let bytes = [a.bytes_today, a.bytes_in_last_7_days, a.bytes_in_last_30_days];
    for ((description, _), count) in WINDOWS.into_iter().zip(bytes) {
        cards.push(MetricCard::new("Uploaded Data", compact_bytes(count), description, MetricIcon::Data));
    }

    cards
}
