//! Endpoint router
//!
//! Turns a base address and a logical operation into a request target.
//! Pure string construction: a malformed base is not detected here and
//! surfaces later as a transport failure.

use std::fmt::Write;

/// Logical operations exposed by the AgentOS service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Agents,
    Status,
    Sessions,
    Session(&'a str),
    Teams,
    TeamSession { team_id: &'a str, session_id: &'a str },
    KnowledgeUpload,
}

impl Route<'_> {
    /// Path relative to the base address, always starting with `/`
    pub fn path(&self) -> String {
        match self {
            Route::Agents => "/agents".to_string(),
            Route::Status => "/status".to_string(),
            Route::Sessions => "/sessions".to_string(),
            Route::Session(id) => format!("/sessions/{}", urlencoding::encode(id)),
            Route::Teams => "/teams".to_string(),
            Route::TeamSession {
                team_id,
                session_id,
            } => format!(
                "/teams/{}/sessions/{}",
                urlencoding::encode(team_id),
                urlencoding::encode(session_id)
            ),
            Route::KnowledgeUpload => "/knowledge/upload".to_string(),
        }
    }
}

/// Ordered query parameters with unique keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameter the operation contract requires, serialized even when empty
    pub fn required(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key.into(), value.into());
        self
    }

    /// Parameter dropped when absent or empty
    pub fn optional<V: Into<String>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        if let Some(value) = value {
            let value = value.into();
            if !value.is_empty() {
                self.set(key.into(), value);
            }
        }
        self
    }

    // Re-setting a key keeps its original position.
    fn set(&mut self, key: String, value: String) {
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `k1=v1&k2=v2`, percent-encoded, without a leading `?`
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                out.push('&');
            }
            let _ = write!(
                out,
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            );
        }
        out
    }
}

/// Build the fully-qualified target for an operation
pub fn build_target(base: &str, route: Route<'_>, query: &Query) -> String {
    let mut url = format!("{}{}", base.trim_end_matches('/'), route.path());
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query.encode());
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Url;

    const BASE: &str = "http://localhost:7777";

    #[test]
    fn test_agents_url() {
        let url = build_target(BASE, Route::Agents, &Query::new());
        assert_eq!(url, "http://localhost:7777/agents");
    }

    #[test]
    fn test_trailing_slash_not_doubled() {
        let url = build_target("http://localhost:7777/", Route::Teams, &Query::new());
        assert_eq!(url, "http://localhost:7777/teams");

        let url = build_target("http://localhost:7777///", Route::Status, &Query::new());
        assert_eq!(url, "http://localhost:7777/status");
    }

    #[test]
    fn test_base_with_path_prefix() {
        let url = build_target("https://os.example.com/api/", Route::Agents, &Query::new());
        assert_eq!(url, "https://os.example.com/api/agents");
    }

    #[test]
    fn test_session_url_encodes_id() {
        let url = build_target(BASE, Route::Session("abc/def 1"), &Query::new());
        assert_eq!(url, "http://localhost:7777/sessions/abc%2Fdef%201");
    }

    #[test]
    fn test_team_session_url() {
        let route = Route::TeamSession {
            team_id: "team-1",
            session_id: "s-9",
        };
        let url = build_target(BASE, route, &Query::new());
        assert_eq!(url, "http://localhost:7777/teams/team-1/sessions/s-9");
    }

    #[test]
    fn test_knowledge_upload_url() {
        let url = build_target(BASE, Route::KnowledgeUpload, &Query::new());
        assert_eq!(url, "http://localhost:7777/knowledge/upload");
    }

    #[test]
    fn test_sessions_query_preserves_order() {
        let query = Query::new()
            .required("type", "agent")
            .required("component_id", "assist")
            .required("db_id", "pg");
        let url = build_target(BASE, Route::Sessions, &query);
        assert_eq!(
            url,
            "http://localhost:7777/sessions?type=agent&component_id=assist&db_id=pg"
        );
    }

    #[test]
    fn test_required_param_kept_when_empty() {
        let query = Query::new().required("type", "team").required("db_id", "");
        assert_eq!(query.encode(), "type=team&db_id=");
    }

    #[test]
    fn test_optional_param_omitted_when_absent_or_empty() {
        let query = Query::new()
            .required("type", "agent")
            .optional("db_id", None::<&str>)
            .optional("other", Some(""));
        assert_eq!(query.encode(), "type=agent");

        let url = build_target(BASE, Route::Session("s1"), &query);
        assert_eq!(url, "http://localhost:7777/sessions/s1?type=agent");
    }

    #[test]
    fn test_no_query_no_question_mark() {
        let query = Query::new().optional("db_id", None::<String>);
        let url = build_target(BASE, Route::Session("s1"), &query);
        assert!(!url.contains('?'));
    }

    #[test]
    fn test_duplicate_key_replaces_in_place() {
        let query = Query::new()
            .required("type", "agent")
            .required("db_id", "a")
            .required("type", "team");
        assert_eq!(query.encode(), "type=team&db_id=a");
        assert_eq!(query.pairs().len(), 2);
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let query = Query::new().required("component_id", "a&b=c d");
        assert_eq!(query.encode(), "component_id=a%26b%3Dc%20d");
    }

    #[test]
    fn test_query_parses_back_to_present_inputs() {
        let inputs: Vec<(&str, Option<&str>)> = vec![
            ("type", Some("agent")),
            ("component_id", None),
            ("db_id", Some("main db")),
            ("page", Some("")),
            ("sort", Some("desc&x")),
        ];

        let mut query = Query::new();
        for (k, v) in &inputs {
            query = query.optional(*k, *v);
        }

        let url = Url::parse(&build_target(BASE, Route::Sessions, &query)).unwrap();
        let parsed: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        let expected: Vec<(String, String)> = inputs
            .iter()
            .filter_map(|(k, v)| match v {
                Some(v) if !v.is_empty() => Some((k.to_string(), v.to_string())),
                _ => None,
            })
            .collect();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_empty_base_does_not_panic() {
        let url = build_target("", Route::Agents, &Query::new());
        assert_eq!(url, "/agents");
    }
}
