//! Resource payloads of the Pulse API

use crate::types::UserProfile;
use serde::{Deserialize, Serialize};

/// A user as returned by the admin endpoints
pub type User = UserProfile;

/// List response: either DRF-style paginated or a bare array
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Paginated {
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<T>,
    },
    Bare(Vec<T>),
}

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Listing<T>")]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> From<Listing<T>> for Page<T> {
    fn from(listing: Listing<T>) -> Self {
        match listing {
            Listing::Paginated {
                count,
                next,
                previous,
                results,
            } => Page {
                count: count.unwrap_or(results.len() as u64),
                next,
                previous,
                results,
            },
            Listing::Bare(results) => Page {
                count: results.len() as u64,
                next: None,
                previous: None,
                results,
            },
        }
    }
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub team_name: String,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTeam {
    pub team_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct MemberChange {
    pub user_id: i64,
}

/// Rating option shared by moods and workloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleOption {
    pub id: i64,
    pub value: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

pub type Mood = ScaleOption;
pub type Workload = ScaleOption;

#[derive(Debug, Clone, Serialize)]
pub struct NewScaleOption {
    pub value: i32,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A weekly check-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseLog {
    pub id: i64,
    #[serde(default)]
    pub user: Option<i64>,
    #[serde(default)]
    pub team: Option<i64>,
    pub mood: i64,
    pub workload: i64,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub week_index: Option<u32>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPulseLog {
    pub team: i64,
    pub mood: i64,
    pub workload: i64,
    pub comment: String,
}

/// Query filters for `GET /pulse-logs/`
#[derive(Debug, Clone, Default)]
pub struct PulseLogFilter {
    pub user: Option<i64>,
    pub team: Option<i64>,
    pub year: Option<i32>,
    pub week_index: Option<u32>,
    pub mood: Option<i64>,
    pub workload: Option<i64>,
    pub page: Option<u32>,
}

impl PulseLogFilter {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(v) = self.user {
            query.push(("user", v.to_string()));
        }
        if let Some(v) = self.team {
            query.push(("team", v.to_string()));
        }
        if let Some(v) = self.year {
            query.push(("year", v.to_string()));
        }
        if let Some(v) = self.week_index {
            query.push(("week_index", v.to_string()));
        }
        if let Some(v) = self.mood {
            query.push(("mood", v.to_string()));
        }
        if let Some(v) = self.workload {
            query.push(("workload", v.to_string()));
        }
        if let Some(v) = self.page {
            query.push(("page", v.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamFeedback {
    pub id: i64,
    pub message: String,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub user: Option<i64>,
    #[serde(default)]
    pub team: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTeamFeedback {
    pub message: String,
    pub is_anonymous: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_accepts_paginated_and_bare() {
        let paginated: Page<Team> = serde_json::from_str(
            r#"{"count": 12, "next": "http://x/teams/?page=2", "previous": null,
                "results": [{"id": 1, "team_name": "Core"}]}"#,
        )
        .unwrap();
        assert_eq!(paginated.count, 12);
        assert!(paginated.has_next());
        assert_eq!(paginated.results[0].team_name, "Core");

        let bare: Page<Team> =
            serde_json::from_str(r#"[{"id": 1, "team_name": "Core"}, {"id": 2, "team_name": "Ops"}]"#)
                .unwrap();
        assert_eq!(bare.count, 2);
        assert!(!bare.has_next());
    }

    #[test]
    fn test_pulse_log_filter_query() {
        let filter = PulseLogFilter {
            team: Some(4),
            year: Some(2025),
            week_index: Some(17),
            page: Some(2),
            ..Default::default()
        };
        assert_eq!(
            filter.to_query(),
            vec![
                ("team", "4".to_string()),
                ("year", "2025".to_string()),
                ("week_index", "17".to_string()),
                ("page", "2".to_string()),
            ]
        );
        assert!(PulseLogFilter::default().to_query().is_empty());
    }
}
