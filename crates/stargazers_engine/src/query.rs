use serde::{Deserialize, Serialize};
use stargazers_core::PageRequest;

/// Which repositories count when picking a stargazer's top repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipPolicy {
    /// Only repositories the user owns.
    #[default]
    Owner,
    /// Owned, collaborated-on, and organization repositories.
    Affiliated,
}

impl OwnershipPolicy {
    fn argument(self) -> &'static str {
        match self {
            OwnershipPolicy::Owner => "OWNER",
            OwnershipPolicy::Affiliated => "[OWNER, COLLABORATOR, ORGANIZATION_MEMBER]",
        }
    }
}

/// GitHub caps connection pages at 100 nodes.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Builds the stargazers query document.
pub fn stargazers_query(page_size: u32, ownership: OwnershipPolicy) -> String {
    let first = page_size.clamp(1, MAX_PAGE_SIZE);
    let affiliations = ownership.argument();
    format!(
        r#"query ($owner: String!, $repoName: String!, $endCursor: String) {{
  repository(owner: $owner, name: $repoName) {{
    stargazers(
      first: {first}
      orderBy: {{ direction: ASC, field: STARRED_AT }}
      after: $endCursor
    ) {{
      pageInfo {{
        endCursor
        startCursor
        hasNextPage
        hasPreviousPage
      }}
      edges {{
        node {{
          id
          login
          avatarUrl
          url
          followers {{
            totalCount
          }}
          repositories(
            first: 1
            orderBy: {{ direction: DESC, field: STARGAZERS }}
            ownerAffiliations: {affiliations}
          ) {{
            edges {{
              node {{
                name
                languages(first: 1) {{
                  edges {{
                    node {{
                      name
                    }}
                  }}
                }}
                stargazers {{
                  totalCount
                }}
                watchers {{
                  totalCount
                }}
                forks {{
                  totalCount
                }}
              }}
            }}
          }}
        }}
      }}
    }}
  }}
}}
"#
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: Variables<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variables<'a> {
    pub owner: &'a str,
    pub repo_name: &'a str,
    pub end_cursor: Option<&'a str>,
}

impl<'a> Variables<'a> {
    pub fn for_request(request: &'a PageRequest) -> Self {
        Self {
            owner: &request.target.owner,
            repo_name: &request.target.name,
            end_cursor: request.cursor.as_deref(),
        }
    }
}
