//! GraphQL query documents and their response shapes
//!
//! The repository overview query walks two independent cursor streams in a
//! single round-trip: the viewer's own repositories and the repositories the
//! viewer has contributed to. The contribution queries sum the viewer's
//! contribution calendar across all years GitHub knows about.

use serde::Deserialize;

/// Build the paginated repository overview query.
///
/// Each cursor is spliced in as `after: "..."` or `after: null` for the first
/// page of its stream.
pub fn repos_overview(owned_cursor: Option<&str>, contrib_cursor: Option<&str>) -> String {
    let owned_after = cursor_literal(owned_cursor);
    let contrib_after = cursor_literal(contrib_cursor);

    format!(
        r#"{{
  viewer {{
    login
    name
    repositories(first: 100, orderBy: {{field: UPDATED_AT, direction: DESC}}, after: {owned_after}) {{
      pageInfo {{ hasNextPage endCursor }}
      nodes {{
        nameWithOwner
        stargazers {{ totalCount }}
        forkCount
        isFork
        isArchived
        isPrivate
        isEmpty
        languages(first: 10, orderBy: {{field: SIZE, direction: DESC}}) {{
          edges {{ size node {{ name color }} }}
        }}
      }}
    }}
    repositoriesContributedTo(first: 100, includeUserRepositories: false, orderBy: {{field: UPDATED_AT, direction: DESC}}, contributionTypes: [COMMIT, PULL_REQUEST, REPOSITORY, PULL_REQUEST_REVIEW], after: {contrib_after}) {{
      pageInfo {{ hasNextPage endCursor }}
      nodes {{
        nameWithOwner
        stargazers {{ totalCount }}
        forkCount
        isFork
        isArchived
        isPrivate
        isEmpty
        languages(first: 10, orderBy: {{field: SIZE, direction: DESC}}) {{
          edges {{ size node {{ name color }} }}
        }}
      }}
    }}
  }}
}}"#
    )
}

/// Query listing every year the viewer has contributions for.
pub const fn contribution_years() -> &'static str {
    r"{
  viewer {
    contributionsCollection {
      contributionYears
    }
  }
}"
}

/// Build a query that sums the contribution calendar for each given year,
/// using one aliased `contributionsCollection` field per year.
pub fn contributions_by_year(years: &[i32]) -> String {
    let mut fields = String::new();
    for year in years {
        fields.push_str(&format!(
            r#"
    year{year}: contributionsCollection(from: "{year}-01-01T00:00:00Z", to: "{year}-12-31T23:59:59Z") {{
      contributionCalendar {{ totalContributions }}
    }}"#
        ));
    }

    format!("{{\n  viewer {{{fields}\n  }}\n}}")
}

fn cursor_literal(cursor: Option<&str>) -> String {
    cursor.map_or_else(|| "null".to_string(), |c| format!("\"{c}\""))
}

/// Per-repository boolean attributes captured at ingestion time.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoFlags {
    #[serde(default)]
    pub is_fork: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_empty: bool,
}

/// One repository as returned by the overview query
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoNode {
    pub name_with_owner: String,
    #[serde(default)]
    pub stargazers: TotalCount,
    #[serde(default)]
    pub fork_count: u64,
    #[serde(flatten)]
    pub flags: RepoFlags,
    #[serde(default)]
    pub languages: LanguageConnection,
}

/// Wrapper for GraphQL `{ totalCount }` objects
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCount {
    pub total_count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanguageConnection {
    #[serde(default)]
    pub edges: Vec<LanguageEdge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageEdge {
    #[serde(default)]
    pub size: u64,
    pub node: LanguageNode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageNode {
    pub name: String,
    pub color: Option<String>,
}

/// A language slice of a repository: name, byte size, display color
#[derive(Debug, Clone)]
pub struct RepoLanguage {
    pub name: String,
    pub size: u64,
    pub color: Option<String>,
}

impl RepoNode {
    /// Flatten the language connection into (name, size, color) entries.
    pub fn language_slices(&self) -> impl Iterator<Item = RepoLanguage> + '_ {
        self.languages.edges.iter().map(|edge| RepoLanguage {
            name: edge.node.name.clone(),
            size: edge.size,
            color: edge.node.color.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// One page of a repository stream; `nodes` may contain nulls for
/// repositories the token cannot see.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoConnection {
    #[serde(default)]
    pub page_info: PageInfo,
    #[serde(default)]
    pub nodes: Vec<Option<RepoNode>>,
}

#[derive(Debug, Deserialize)]
pub struct OverviewData {
    pub viewer: OverviewViewer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewViewer {
    pub login: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub repositories: RepoConnection,
    #[serde(default)]
    pub repositories_contributed_to: RepoConnection,
}

/// One page of each repository stream, as consumed by the collector
#[derive(Debug, Default)]
pub struct OverviewPage {
    pub viewer_name: Option<String>,
    pub viewer_login: Option<String>,
    pub owned: RepoPage,
    pub contributed: RepoPage,
}

/// A single page of one repository stream
#[derive(Debug, Default)]
pub struct RepoPage {
    pub repos: Vec<RepoNode>,
    pub has_next: bool,
    pub cursor: Option<String>,
}

impl From<RepoConnection> for RepoPage {
    fn from(conn: RepoConnection) -> Self {
        Self {
            repos: conn.nodes.into_iter().flatten().collect(),
            has_next: conn.page_info.has_next_page,
            cursor: conn.page_info.end_cursor,
        }
    }
}

impl From<OverviewData> for OverviewPage {
    fn from(data: OverviewData) -> Self {
        Self {
            viewer_name: data.viewer.name,
            viewer_login: data.viewer.login,
            owned: data.viewer.repositories.into(),
            contributed: data.viewer.repositories_contributed_to.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct YearsData {
    pub viewer: YearsViewer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearsViewer {
    pub contributions_collection: YearsCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearsCollection {
    #[serde(default)]
    pub contribution_years: Vec<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ContributionsData {
    pub viewer: std::collections::BTreeMap<String, YearBucket>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearBucket {
    pub contribution_calendar: ContributionCalendar,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionCalendar {
    #[serde(default)]
    pub total_contributions: u64,
}
