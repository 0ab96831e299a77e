use crate::utils::error::{DigestError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hard cap on entries in a single digest email.
pub const MAX_DIGEST_ENTRIES: usize = 15;

pub const ARXIV_QUERIES: &[&str] = &[
    r#"all:"kernel fusion" AND (GPU OR CUDA OR tensor)"#,
    r#"all:"CuTe" AND (CUTLASS OR NVIDIA OR kernel)"#,
    r#"all:"automated kernel" AND (GPU OR CUDA OR generation)"#,
    r#"all:"kernel compilation" AND (GPU OR tensor OR fusion)"#,
    r#"all:CUTLASS AND (fusion OR optimization OR automat*)"#,
    r#"all:"triton" AND ("kernel fusion" OR "code generation")"#,
    r#"all:"tensor compiler" AND (fusion OR GPU OR autotuning)"#,
];

pub const SEMANTIC_SCHOLAR_QUERIES: &[&str] = &[
    "CuTe DSL CUTLASS kernel fusion GPU",
    "automated kernel generation CUDA LLM",
    "kernel fusion compiler GPU optimization",
    "tensor compiler autotuning GPU kernels",
];

pub const KEYWORDS: &[&str] = &[
    "cute",
    "cutlass",
    "kernel fusion",
    "automated kernel",
    "kernel generation",
    "gpu kernel",
    "tensor compiler",
    "triton",
    "tma",
    "wgmma",
    "hopper",
    "blackwell",
    "flash attention",
    "cuda",
    "llm kernel",
    "agentic",
    "autotuning",
];

pub const LOOKBACK_DAYS: u32 = 3;
pub const MAX_LOOKBACK_DAYS: u32 = 3650;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    pub queries: QueryConfig,
    pub ranking: RankingConfig,
    pub endpoints: EndpointConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub arxiv: Vec<String>,
    pub semantic_scholar: Vec<String>,
    pub arxiv_max_results: usize,
    pub semantic_scholar_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub lookback_days: u32,
    pub top_n: usize,
    pub keywords: Vec<String>,
    pub title_weight: u32,
    pub abstract_weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub arxiv: String,
    pub semantic_scholar: String,
    pub oauth_token: String,
    pub gmail_send: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            arxiv: ARXIV_QUERIES.iter().map(|q| q.to_string()).collect(),
            semantic_scholar: SEMANTIC_SCHOLAR_QUERIES
                .iter()
                .map(|q| q.to_string())
                .collect(),
            arxiv_max_results: 15,
            semantic_scholar_limit: 10,
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            lookback_days: LOOKBACK_DAYS,
            top_n: MAX_DIGEST_ENTRIES,
            keywords: KEYWORDS.iter().map(|k| k.to_string()).collect(),
            title_weight: 3,
            abstract_weight: 1,
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            arxiv: "https://export.arxiv.org/api/query".to_string(),
            semantic_scholar: "https://api.semanticscholar.org/graph/v1/paper/search".to_string(),
            oauth_token: "https://oauth2.googleapis.com/token".to_string(),
            gmail_send: "https://gmail.googleapis.com/gmail/v1/users/me/messages/send"
                .to_string(),
        }
    }
}

impl DigestConfig {
    /// Loads a TOML file; sections that are left out keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| DigestError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DigestError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown names are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DigestError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Applies `LOOKBACK_DAYS` from the given environment lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("LOOKBACK_DAYS") {
            let days = raw
                .trim()
                .parse::<u32>()
                .map_err(|e| DigestError::InvalidConfigValueError {
                    field: "LOOKBACK_DAYS".to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
            tracing::debug!("LOOKBACK_DAYS override: {}", days);
            self.ranking.lookback_days = days;
        }
        Ok(())
    }

    pub fn lookback_days(&self) -> u32 {
        self.ranking.lookback_days
    }

    pub fn top_n(&self) -> usize {
        self.ranking.top_n.min(MAX_DIGEST_ENTRIES)
    }
}

impl Validate for DigestConfig {
    fn validate(&self) -> Result<()> {
        if self.queries.arxiv.is_empty() && self.queries.semantic_scholar.is_empty() {
            return Err(DigestError::InvalidConfigValueError {
                field: "queries".to_string(),
                value: "[]".to_string(),
                reason: "At least one arXiv or Semantic Scholar query is required".to_string(),
            });
        }
        for query in self.queries.arxiv.iter() {
            validate_non_empty_string("queries.arxiv", query)?;
        }
        for query in self.queries.semantic_scholar.iter() {
            validate_non_empty_string("queries.semantic_scholar", query)?;
        }
        validate_positive_number("queries.arxiv_max_results", self.queries.arxiv_max_results, 1)?;
        validate_positive_number(
            "queries.semantic_scholar_limit",
            self.queries.semantic_scholar_limit,
            1,
        )?;

        validate_positive_number("ranking.lookback_days", self.ranking.lookback_days as usize, 1)?;
        if self.ranking.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(DigestError::InvalidConfigValueError {
                field: "ranking.lookback_days".to_string(),
                value: self.ranking.lookback_days.to_string(),
                reason: format!("Lookback is limited to {} days", MAX_LOOKBACK_DAYS),
            });
        }
        validate_positive_number("ranking.top_n", self.ranking.top_n, 1)?;
        if self.ranking.top_n > MAX_DIGEST_ENTRIES {
            return Err(DigestError::InvalidConfigValueError {
                field: "ranking.top_n".to_string(),
                value: self.ranking.top_n.to_string(),
                reason: format!("A digest holds at most {} papers", MAX_DIGEST_ENTRIES),
            });
        }
        for keyword in self.ranking.keywords.iter() {
            validate_non_empty_string("ranking.keywords", keyword)?;
        }
        if self.ranking.title_weight <= self.ranking.abstract_weight {
            return Err(DigestError::InvalidConfigValueError {
                field: "ranking.title_weight".to_string(),
                value: self.ranking.title_weight.to_string(),
                reason: "Title hits must weigh more than abstract hits".to_string(),
            });
        }

        validate_url("endpoints.arxiv", &self.endpoints.arxiv)?;
        validate_url("endpoints.semantic_scholar", &self.endpoints.semantic_scholar)?;
        validate_url("endpoints.oauth_token", &self.endpoints.oauth_token)?;
        validate_url("endpoints.gmail_send", &self.endpoints.gmail_send)?;
        Ok(())
    }
}
